//! Stable application-wide constants.
//!
//! Values here are structural invariants of the scoring model and default
//! fallbacks for env-var-based configuration. The scoring values are fixed:
//! changing any of them changes every stored composite score.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";
/// Default connection pool size for SQL storage backends.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

// --- Level → score mapping ---

pub const SCORE_EXCELLENT: f64 = 5.0;
pub const SCORE_GOOD: f64 = 4.0;
pub const SCORE_AVERAGE: f64 = 3.0;
pub const SCORE_POOR: f64 = 2.0;

/// Category score used when an assessment carries no values for a category.
/// Equal to the "average" score so an incomplete assessment still produces a
/// composite inside [2, 5].
pub const MISSING_CATEGORY_SCORE: f64 = SCORE_AVERAGE;

// --- Category weights ---
// Kept as integer percentages so the sum is exactly 100; the float weight is
// derived by dividing by 100 at the point of use.

pub const WEIGHT_PCT_PHYSICAL: u32 = 20;
pub const WEIGHT_PCT_TECHNICAL: u32 = 40;
pub const WEIGHT_PCT_TACTICAL: u32 = 30;
pub const WEIGHT_PCT_PSYCHOLOGICAL: u32 = 10;

// --- Age bracket boundaries (inclusive) ---

pub const AGE_BRACKET_YOUTH_MIN: u32 = 12;
pub const AGE_BRACKET_YOUTH_MAX: u32 = 14;
pub const AGE_BRACKET_CADET_MIN: u32 = 15;
pub const AGE_BRACKET_CADET_MAX: u32 = 16;
pub const AGE_BRACKET_JUNIOR_MIN: u32 = 17;
pub const AGE_BRACKET_JUNIOR_MAX: u32 = 18;

// --- Performance level cut-offs ---
// Applied to the composite expressed as a percentage of the maximum score
// (overall / 5 * 100).

pub const PERFORMANCE_ELITE_PCT: f64 = 85.0;
pub const PERFORMANCE_ADVANCED_PCT: f64 = 75.0;
pub const PERFORMANCE_INTERMEDIATE_PCT: f64 = 65.0;
pub const PERFORMANCE_DEVELOPING_PCT: f64 = 50.0;

/// Header carrying the already-authenticated owner id.
pub const OWNER_ID_HEADER: &str = "x-owner-id";

/// Round to two decimal places, the precision of every reported score and
/// percentage.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

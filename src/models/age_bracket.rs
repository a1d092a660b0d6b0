use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    AGE_BRACKET_CADET_MAX, AGE_BRACKET_CADET_MIN, AGE_BRACKET_JUNIOR_MAX, AGE_BRACKET_JUNIOR_MIN,
    AGE_BRACKET_YOUTH_MAX, AGE_BRACKET_YOUTH_MIN,
};

/// Age band that selects which row of reference thresholds applies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AgeBracket {
    #[serde(rename = "12-14")]
    U14,
    #[serde(rename = "15-16")]
    U16,
    #[serde(rename = "17-18")]
    U18,
    #[serde(rename = "elite")]
    Elite,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::U14,
        AgeBracket::U16,
        AgeBracket::U18,
        AgeBracket::Elite,
    ];

    /// Total over all ages: anything outside 12-18 falls into `Elite`,
    /// including implausibly young or old values.
    pub fn from_age(age: u32) -> Self {
        match age {
            AGE_BRACKET_YOUTH_MIN..=AGE_BRACKET_YOUTH_MAX => AgeBracket::U14,
            AGE_BRACKET_CADET_MIN..=AGE_BRACKET_CADET_MAX => AgeBracket::U16,
            AGE_BRACKET_JUNIOR_MIN..=AGE_BRACKET_JUNIOR_MAX => AgeBracket::U18,
            _ => {
                if age < AGE_BRACKET_YOUTH_MIN {
                    tracing::warn!(
                        age,
                        "Age {} is below the youngest bracket, scoring against elite standards",
                        age
                    );
                }
                AgeBracket::Elite
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBracket::U14 => "12-14",
            AgeBracket::U16 => "15-16",
            AgeBracket::U18 => "17-18",
            AgeBracket::Elite => "elite",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AgeBracket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "12-14" => Ok(AgeBracket::U14),
            "15-16" => Ok(AgeBracket::U16),
            "17-18" => Ok(AgeBracket::U18),
            "elite" => Ok(AgeBracket::Elite),
            _ => Err(format!("Invalid age bracket: '{}'", s)),
        }
    }
}

// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use db::BenchmarkRepository;
use services::{BenchmarkTracker, ScoringEngine};
use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub engine: ScoringEngine,
    pub tracker: BenchmarkTracker,
}

impl AppState {
    pub fn new(repo: Arc<dyn BenchmarkRepository>) -> Self {
        Self {
            engine: ScoringEngine::default(),
            tracker: BenchmarkTracker::new(repo),
        }
    }
}

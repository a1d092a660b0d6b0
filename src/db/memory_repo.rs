use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Benchmark, OwnerProfile};

use super::benchmark_repository::BenchmarkRepository;

#[derive(Default)]
struct Store {
    /// Insertion order; ties on `benchmark_date` resolve to the later insert.
    benchmarks: Vec<Benchmark>,
    profiles: HashMap<String, OwnerProfile>,
}

impl Store {
    fn for_player<'a>(
        &'a self,
        owner_id: &'a str,
        player_name: &'a str,
    ) -> impl Iterator<Item = &'a Benchmark> + 'a {
        self.benchmarks
            .iter()
            .filter(move |b| b.owner_id == owner_id && b.player_name == player_name)
    }
}

/// Process-local benchmark store. Used when no database is configured and in
/// tests; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryBenchmarkRepository {
    store: RwLock<Store>,
}

impl InMemoryBenchmarkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BenchmarkRepository for InMemoryBenchmarkRepository {
    async fn insert(&self, benchmark: &Benchmark) -> Result<()> {
        let mut store = self.store.write().await;

        if store.benchmarks.iter().any(|b| b.id == benchmark.id) {
            return Err(AppError::Internal(format!(
                "Duplicate benchmark id {}",
                benchmark.id
            )));
        }

        if benchmark.is_baseline
            && store
                .for_player(&benchmark.owner_id, &benchmark.player_name)
                .any(|b| b.is_baseline)
        {
            return Err(AppError::BaselineConflict {
                owner_id: benchmark.owner_id.clone(),
                player_name: benchmark.player_name.clone(),
            });
        }

        // Neither write can fail, so holding one guard keeps them atomic.
        store.benchmarks.push(benchmark.clone());
        store
            .profiles
            .entry(benchmark.owner_id.clone())
            .or_insert_with(|| OwnerProfile::new(benchmark.owner_id.clone()))
            .add_benchmark(benchmark.id, &benchmark.player_name, benchmark.is_baseline);
        Ok(())
    }

    async fn count_for_player(&self, owner_id: &str, player_name: &str) -> Result<i64> {
        let store = self.store.read().await;
        let count = store.for_player(owner_id, player_name).count();
        Ok(count as i64)
    }

    async fn find_latest(&self, owner_id: &str, player_name: &str) -> Result<Option<Benchmark>> {
        let store = self.store.read().await;
        // max_by_key keeps the last of equal keys
        let latest = store
            .for_player(owner_id, player_name)
            .max_by_key(|b| b.benchmark_date)
            .cloned();
        Ok(latest)
    }

    async fn find_baseline(
        &self,
        owner_id: &str,
        player_name: &str,
    ) -> Result<Option<Benchmark>> {
        let store = self.store.read().await;
        let baseline = store
            .for_player(owner_id, player_name)
            .find(|b| b.is_baseline)
            .cloned();
        Ok(baseline)
    }

    async fn find_by_id(&self, owner_id: &str, id: Uuid) -> Result<Option<Benchmark>> {
        let store = self.store.read().await;
        let found = store
            .benchmarks
            .iter()
            .find(|b| b.id == id && b.owner_id == owner_id)
            .cloned();
        Ok(found)
    }

    async fn list(&self, owner_id: &str, player_name: Option<&str>) -> Result<Vec<Benchmark>> {
        let store = self.store.read().await;
        let mut benchmarks: Vec<Benchmark> = store
            .benchmarks
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .filter(|b| player_name.map_or(true, |p| b.player_name == p))
            .cloned()
            .collect();

        // Newest first; reverse before the stable sort so equal dates keep
        // later inserts ahead.
        benchmarks.reverse();
        benchmarks.sort_by(|a, b| b.benchmark_date.cmp(&a.benchmark_date));
        Ok(benchmarks)
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool> {
        let mut store = self.store.write().await;
        let before = store.benchmarks.len();
        store
            .benchmarks
            .retain(|b| !(b.id == id && b.owner_id == owner_id));
        if store.benchmarks.len() == before {
            return Ok(false);
        }

        if let Some(profile) = store.profiles.get_mut(owner_id) {
            profile.remove_benchmark(id);
        }
        Ok(true)
    }

    async fn get_profile(&self, owner_id: &str) -> Result<OwnerProfile> {
        let store = self.store.read().await;
        let profile = store
            .profiles
            .get(owner_id)
            .cloned()
            .unwrap_or_else(|| OwnerProfile::new(owner_id));
        Ok(profile)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

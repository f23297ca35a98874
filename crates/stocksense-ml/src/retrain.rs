//! Bounded background retraining with one in-flight job per symbol.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use stocksense_core::Symbol;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::predictor::{Predictor, TrainOutcome};

pub const DEFAULT_RETRAIN_WORKERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrainStatus {
    Scheduled,
    AlreadyInFlight,
}

impl RetrainStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::AlreadyInFlight => "already_in_flight",
        }
    }
}

pub struct RetrainPool {
    predictor: Arc<Predictor>,
    permits: Arc<Semaphore>,
    in_flight: Arc<Mutex<HashSet<Symbol>>>,
    tasks: Mutex<JoinSet<()>>,
}

/// Clears the in-flight marker when the job ends, panics included.
struct InFlightGuard {
    symbol: Symbol,
    in_flight: Arc<Mutex<HashSet<Symbol>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(&self.symbol);
        }
    }
}

impl RetrainPool {
    pub fn new(predictor: Arc<Predictor>, max_workers: usize) -> Self {
        Self {
            predictor,
            permits: Arc::new(Semaphore::new(max_workers.max(1))),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Queue a forced refit. Must be called inside a tokio runtime.
    pub fn schedule(&self, symbol: Symbol) -> RetrainStatus {
        {
            let mut in_flight = self.lock_in_flight();
            if !in_flight.insert(symbol.clone()) {
                tracing::debug!(%symbol, "retrain already in flight");
                return RetrainStatus::AlreadyInFlight;
            }
        }

        let guard = InFlightGuard {
            symbol: symbol.clone(),
            in_flight: Arc::clone(&self.in_flight),
        };
        let predictor = Arc::clone(&self.predictor);
        let permits = Arc::clone(&self.permits);

        tracing::info!(%symbol, "retrain scheduled");
        let mut tasks = self.lock_tasks();
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            let _guard = guard;
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };

            match predictor.retrain(&symbol).await {
                Ok(TrainOutcome::Fitted { samples, .. }) => {
                    tracing::info!(%symbol, samples, "background retrain finished");
                }
                Ok(outcome) => {
                    tracing::warn!(%symbol, ?outcome, "background retrain produced no model");
                }
                Err(error) => {
                    tracing::warn!(%symbol, %error, "background retrain failed");
                }
            }
        });

        RetrainStatus::Scheduled
    }

    pub fn in_flight(&self) -> usize {
        self.lock_in_flight().len()
    }

    pub fn is_in_flight(&self, symbol: &Symbol) -> bool {
        self.lock_in_flight().contains(symbol)
    }

    /// Wait for every scheduled retrain to finish.
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.lock_tasks());
        while let Some(result) = tasks.join_next().await {
            if let Err(error) = result {
                tracing::warn!(%error, "retrain task aborted");
            }
        }
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<Symbol>> {
        self.in_flight
            .lock()
            .expect("retrain registry lock is not poisoned")
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().expect("retrain task lock is not poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PredictorConfig;
    use crate::forest::ForestConfig;
    use crate::predictor::ModelState;
    use std::time::Duration;
    use stocksense_core::{AcquisitionConfig, MarketData, NoopHttpClient};

    fn pool(model_dir: &std::path::Path) -> RetrainPool {
        let market =
            MarketData::from_config(Arc::new(NoopHttpClient), &AcquisitionConfig::default());
        let config = PredictorConfig::default()
            .with_model_dir(model_dir)
            .with_forest(ForestConfig {
                n_trees: 4,
                ..ForestConfig::default()
            });
        RetrainPool::new(Arc::new(Predictor::new(market, config)), 2)
    }

    #[tokio::test]
    async fn duplicate_schedule_is_collapsed() {
        let temp = tempfile::tempdir().expect("temp dir");
        let pool = pool(temp.path());
        let symbol = Symbol::parse("TCS").expect("valid symbol");

        assert_eq!(pool.schedule(symbol.clone()), RetrainStatus::Scheduled);
        assert_eq!(pool.schedule(symbol.clone()), RetrainStatus::AlreadyInFlight);
        assert_eq!(pool.in_flight(), 1);

        pool.drain().await;
        assert_eq!(pool.in_flight(), 0);
        assert_eq!(pool.predictor.state(&symbol), ModelState::Trained);

        assert_eq!(pool.schedule(symbol), RetrainStatus::Scheduled);
        pool.drain().await;
    }

    #[tokio::test]
    async fn distinct_symbols_run_independently() {
        let temp = tempfile::tempdir().expect("temp dir");
        let pool = pool(temp.path());

        for name in ["TCS", "INFY", "RELIANCE"] {
            let symbol = Symbol::parse(name).expect("valid symbol");
            assert_eq!(pool.schedule(symbol), RetrainStatus::Scheduled);
        }

        tokio::time::timeout(Duration::from_secs(30), pool.drain())
            .await
            .expect("retrains finish");
        assert_eq!(pool.in_flight(), 0);
        assert!(pool.predictor.store().exists(&Symbol::parse("INFY").expect("valid symbol")));
    }
}

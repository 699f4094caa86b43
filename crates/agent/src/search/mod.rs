//! Deterministic search strategy.
//!
//! The model is asked once what the customer wants. Everything after that is
//! plain code:
//!
//! 1. Page through the catalog
//! 2. Interpret the task (units, candidate SKUs, coupon codes)
//! 3. Enumerate pack combinations that hit the unit count exactly
//! 4. Price every combination with every coupon, and without one, on the live basket
//! 5. Rebuild the cheapest basket and check out

pub mod combos;
pub mod intent;
pub mod optimizer;

use async_trait::async_trait;
use shopbot_config::SearchConfig;
use shopbot_core::provider::Provider;
use shopbot_core::store::{MAX_PAGE_SIZE, Product, StoreApi};
use shopbot_core::task::{SolveReport, TaskInfo, TaskSolver};
use shopbot_core::Error;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub use combos::{Combination, Line};
pub use intent::Intent;
pub use optimizer::Trial;

pub struct SearchSolver {
    provider: Arc<dyn Provider>,
    model: String,
    config: SearchConfig,
}

impl SearchSolver {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl TaskSolver for SearchSolver {
    async fn solve(&self, task: &TaskInfo, store: Arc<dyn StoreApi>) -> shopbot_core::Result<SolveReport> {
        let started = Instant::now();
        let store = store.as_ref();

        let page_size = self.config.page_size.clamp(1, MAX_PAGE_SIZE);
        let catalog = optimizer::fetch_catalog(store, page_size, self.config.max_pages).await?;
        info!(task_id = %task.task_id, products = catalog.len(), "Catalog loaded");

        let (intent, usage, model) =
            intent::interpret(self.provider.as_ref(), &self.model, &task.task_text, &catalog).await?;
        let candidates: Vec<Product> = intent.candidates(&catalog).into_iter().cloned().collect();
        let coupons = intent.coupon_codes();

        let combinations = combos::enumerate(&candidates, intent.units, self.config.max_combinations);
        info!(
            task_id = %task.task_id,
            units = intent.units,
            candidates = candidates.len(),
            coupons = coupons.len(),
            combinations = combinations.len(),
            "Search space"
        );
        if combinations.is_empty() {
            return Err(Error::Internal(format!(
                "no combination of {} product(s) adds up to {} units",
                candidates.len(),
                intent.units
            )));
        }

        let trials = optimizer::run_trials(store, &combinations, &coupons).await?;
        let best = optimizer::cheapest(&trials)
            .ok_or_else(|| Error::Internal("every trial was rejected by the store".into()))?;
        info!(
            combination = %best.combination,
            coupon = best.coupon.as_deref().unwrap_or("-"),
            total = best.total,
            trials = trials.len(),
            "Cheapest trial"
        );

        let order = optimizer::execute(store, best).await?;
        let completion = format!(
            "Ordered {} with {} for a total of {:.2} (order {}).",
            best.combination,
            best.coupon
                .as_deref()
                .map(|c| format!("coupon {c}"))
                .unwrap_or_else(|| "no coupon".into()),
            order.total.unwrap_or(best.total),
            order.order_id
        );

        Ok(SolveReport {
            completion,
            model,
            usage,
            duration: started.elapsed(),
            checked_out: true,
        })
    }
}

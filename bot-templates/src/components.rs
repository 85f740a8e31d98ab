//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use anyhow::Result;
use scheduler::TokioScheduler;
use std::sync::Arc;
use storage::{
    BlueprintRepository, FaqRepository, InMemoryFaqIndex, SqlitePoolManager, StateRepository,
};
use tracing::{error, info, instrument};

use crate::config::BotConfig;
use crate::loader::BotDeps;
use crate::modules::ModuleCatalog;

/// SQLite-backed stores sharing one pool, plus the process-wide scheduler.
#[derive(Clone)]
pub struct BotComponents {
    pub blueprints: Arc<BlueprintRepository>,
    pub states: Arc<StateRepository>,
    pub faq: Arc<FaqRepository>,
    pub scheduler: Arc<TokioScheduler>,
}

impl BotComponents {
    /// Loader dependencies over these components.
    pub fn deps(&self, catalog: ModuleCatalog) -> BotDeps {
        BotDeps {
            blueprints: self.blueprints.clone(),
            faq: self.faq.clone(),
            state: self.states.clone(),
            scheduler: self.scheduler.clone(),
            catalog,
        }
    }

    /// Like [`deps`](Self::deps) but the FAQ reset goes to a throwaway in-memory index,
    /// so a load leaves the stored FAQ data as it was.
    pub fn preview_deps(&self, catalog: ModuleCatalog) -> BotDeps {
        BotDeps {
            faq: Arc::new(InMemoryFaqIndex::new()),
            ..self.deps(catalog)
        }
    }
}

#[instrument(skip(config))]
pub async fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let pool = SqlitePoolManager::new(config.database_url())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to open database");
            anyhow::anyhow!("Failed to open database {}: {}", config.database_url(), e)
        })?;
    info!(database_url = %config.database_url(), "Database ready");

    let blueprints = Arc::new(BlueprintRepository::with_pool(pool.clone()).await?);
    let states = Arc::new(StateRepository::with_pool(pool.clone()).await?);
    let faq = Arc::new(FaqRepository::with_pool(pool).await?);

    Ok(BotComponents {
        blueprints,
        states,
        faq,
        scheduler: Arc::new(TokioScheduler::new()),
    })
}

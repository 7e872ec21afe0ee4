use async_trait::async_trait;
use biblio_kernel::{InitCtx, Module};

use crate::Database;

/// Core module owning the database handle lifecycle.
pub struct DbModule {
    db: Database,
}

impl DbModule {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.db.ping().await?;
        tracing::info!(
            module = self.name(),
            path = %self.db.location(),
            "database reachable"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "database module stopped");
        Ok(())
    }

    fn mounts_routes(&self) -> bool {
        false
    }
}

//! Service bootstrap: database, module registry, lifecycle and HTTP surface.

use anyhow::Context;
use axum::Router;
use std::sync::Arc;

use biblio_db::{AppliedMigration, Database, DbModule};
use biblio_kernel::settings::Settings;
use biblio_kernel::{InitCtx, ModuleRegistry};

use crate::modules;

/// A fully initialized service: migrated database and started modules.
pub struct App {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl App {
    /// Open the database, register every module, run migrations and start
    /// the module lifecycle.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        tracing::info!(
            env = ?settings.environment,
            db = %settings.database.path,
            "biblio bootstrap starting"
        );

        let db = Database::open(&settings.database)
            .with_context(|| format!("failed to open database '{}'", settings.database.path))?;
        let registry = registry_for(&db, &settings);

        let ctx = InitCtx {
            settings: &settings,
        };
        registry.init_core_modules(&ctx).await?;
        registry.init_custom_modules(&ctx).await?;

        let applied = db
            .apply_migrations(registry.collect_migrations())
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied = applied.len(), "migrations up to date");

        registry.start_core_modules(&ctx).await?;
        registry.start_custom_modules(&ctx).await?;

        tracing::info!(
            core = registry.core_module_count(),
            custom = registry.custom_module_count(),
            "biblio bootstrap complete"
        );

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    /// Apply pending migrations without starting any module.
    pub async fn migrate(settings: &Settings) -> anyhow::Result<Vec<AppliedMigration>> {
        let db = Database::open(&settings.database)
            .with_context(|| format!("failed to open database '{}'", settings.database.path))?;
        let registry = registry_for(&db, settings);

        db.apply_migrations(registry.collect_migrations())
            .await
            .context("failed to apply migrations")
    }

    /// Merged OpenAPI document. Builds the registry over a throwaway
    /// in-memory database so nothing on disk is touched.
    pub fn openapi(settings: &Settings) -> anyhow::Result<serde_json::Value> {
        let db = Database::open_in_memory().context("failed to open in-memory database")?;
        let registry = registry_for(&db, settings);
        Ok(biblio_http::openapi::merged_spec(&registry))
    }

    /// HTTP router with every module mounted under `/api/{module}`.
    pub fn router(&self) -> Router {
        biblio_http::build_router(&self.registry, &self.settings)
    }

    /// Serve HTTP until shutdown is signalled, then stop all modules.
    pub async fn serve(self) -> anyhow::Result<()> {
        let served = biblio_http::start_server(self.router(), &self.settings).await;
        self.shutdown().await?;
        served
    }

    /// Stop custom modules, then core modules, in reverse order.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.registry.stop_custom_modules().await?;
        self.registry.stop_core_modules().await?;
        tracing::info!("biblio shutdown complete");
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }
}

/// Registry holding the core database module plus every resource module.
pub fn registry_for(db: &Database, settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(DbModule::new(db.clone())));
    modules::register_all(&mut registry, db, settings);
    registry
}

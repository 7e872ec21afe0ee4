pub mod authors;
pub mod books;
pub mod error;
pub mod validation;

use biblio_db::Database;
use biblio_kernel::settings::Settings;
use biblio_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Database, settings: &Settings) {
    registry.register_custom(authors::create_module(
        db.clone(),
        settings.library.author_delete_policy,
    ));
    registry.register_custom(books::create_module(db.clone()));
}

pub mod fs_ops;
pub mod preference_store;
pub mod settings_loader;

pub use preference_store::PreferenceStore;
pub use settings_loader::load_settings;

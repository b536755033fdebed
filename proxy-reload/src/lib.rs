pub mod loader;
pub mod reloader;
pub mod settings;

pub use loader::LoadedConfig;
pub use reloader::{initial_load, ReloadPaths, Reloader};
pub use settings::EnvSettings;

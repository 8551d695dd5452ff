//! Application layer: the command dispatcher and the settings store it
//! mutates on behalf of clients.

pub mod dispatch;
pub mod settings;

pub use dispatch::Dispatcher;
pub use settings::SettingsStore;

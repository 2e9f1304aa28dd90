pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod progress;
pub mod store;
pub mod tui;
pub mod utils;

pub use api::ApiClient;
pub use config::Config;
pub use store::Store;
pub use utils::Profile;

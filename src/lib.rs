pub mod app;
pub mod chart;
pub mod cli;
pub mod errors;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod seed;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use state::AppState;
pub use storage::{load_dataset, DEFAULT_DB_PATH};

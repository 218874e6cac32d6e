pub mod app;
pub mod calendar;
pub mod errors;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod series;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};

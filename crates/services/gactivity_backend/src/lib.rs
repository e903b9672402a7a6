// --- File: crates/services/gactivity_backend/src/lib.rs ---
pub mod app_state;
pub mod handlers;
pub mod pipelines;
pub mod routes;
pub mod service_factory;
pub mod views;


pub use app_state::{AppState, AppStateBuilder};
pub use routes::routes;

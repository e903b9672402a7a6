// --- File: crates/gactivity_gcal/src/lib.rs ---
pub mod auth;
pub mod logic;
pub mod service;

pub use service::GoogleCalendarCollector;

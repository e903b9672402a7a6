// --- File: crates/gactivity_drive/src/lib.rs ---
pub mod client;
pub mod logic;
pub mod models;
pub mod service;


pub use client::DriveActivityClient;
pub use logic::DriveError;
pub use service::{time_filter, DriveActivityCollector};

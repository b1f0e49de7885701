pub mod client;
pub mod controller;
pub mod model;
pub mod render;
pub mod shell;
pub mod utils;
pub mod view;

// Re-export common items
pub use client::{Backend, HttpBackend};
pub use controller::DashboardController;
pub use model::{Filter, Stats, TestResult, TestStatus};
pub use utils::Config;

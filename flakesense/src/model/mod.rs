pub mod filter;
pub mod result;
pub mod stats;

pub use filter::{filter_results, Filter};
pub use result::{decode_results, TestResult, TestStatus};
pub use stats::{compute_stats, Stats};

pub mod chart;
pub mod error;
pub mod race_result;

pub mod config;
pub mod error;
pub mod latency;
pub mod storage;

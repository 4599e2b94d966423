pub mod config;
pub mod convert;
pub mod history;
pub mod log;
pub mod metadata;
pub mod pivot;
pub mod rate;

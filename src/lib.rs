pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod report;
pub mod store;

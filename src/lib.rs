pub mod chain;
pub mod config;
pub mod directory;
pub mod draft;
pub mod error;
pub mod finance;
pub mod query;
pub mod requisition;
pub mod resolver;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod utils;
pub mod workflow;

pub mod analytics;
pub mod collector;
pub mod config;
pub mod currency;
pub mod error;
pub mod format;
pub mod kpi;
pub mod planner;
pub mod query;

// Core modules
pub mod analysis;
pub mod cli;
pub mod config;
pub mod models;
pub mod notification;
pub mod report;
pub mod scraper;
pub mod snapshot;

// Library for tests to access modules

pub mod config;
pub mod error;
pub mod filter;
pub mod formatters;
pub mod models;
pub mod reconcile;
pub mod runner;
pub mod series;
pub mod text_report;
pub mod tracking_repo;
pub mod version;

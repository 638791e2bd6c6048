//! Scheduling, identity, configuration and the storage layer.

pub mod broker;
pub mod config;
pub mod curriculum;
pub mod db;
pub mod error;
pub mod logging;
pub mod namespace;
pub mod output;
pub mod schedule;
pub mod schemas;
pub mod service;
pub mod session;
pub mod store;
pub mod time;

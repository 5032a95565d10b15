pub mod config;
pub mod error;
pub mod matcher;
pub mod registry;
pub mod roster;
pub mod scheduler;
pub mod service;

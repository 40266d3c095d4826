//! Service plumbing shared by every route: errors, state, config, database and bootstrapping.

pub mod app_error;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod extract;
pub mod outbox;
pub mod swagger;

pub mod api;
pub mod core;
pub mod domain;
pub mod models;
pub mod notifications;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

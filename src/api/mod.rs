//! Clients for services this one calls out to.

pub mod notifications;

use std::sync::Arc;

use crate::{notifications::NotificationDispatcher, services::OrderService};

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub notifier: Arc<dyn NotificationDispatcher>,
}

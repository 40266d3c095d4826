#![allow(dead_code)]

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chaihouse_orderservice::{
    core::{app_state::AppState, config::OrderSettings},
    models::MenuItemEntity,
    notifications::{
        ChannelResult, NotificationDispatcher, NotificationError, NotificationRequest,
        NotificationResults,
    },
    services::{
        OrderService,
        submission::{SubmitOrderItem, SubmitOrderReq},
    },
    store::MemoryStore,
};
use chrono::Utc;

pub fn decimal(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

pub fn menu_item(id: i32, name: &str, price: &str, category: &str) -> MenuItemEntity {
    MenuItemEntity {
        id,
        name: name.into(),
        description: format!("{name} from the Chai House kitchen"),
        price: decimal(price),
        category: category.into(),
        image_url: format!("/images/{id}.jpg"),
        is_available: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn menu() -> Vec<MenuItemEntity> {
    vec![
        menu_item(1, "Masala Chai", "2.50", "Hot Teas"),
        menu_item(2, "Kulhad Chai", "3.00", "Hot Teas"),
        menu_item(3, "Samosa", "1.50", "Snacks"),
        menu_item(4, "Iced Lemon Tea", "3.50", "Cold Drinks"),
    ]
}

/// Records every request and answers with a fixed outcome.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub requests: Mutex<Vec<NotificationRequest>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        Self {
            requests: Mutex::default(),
            fail: true,
        }
    }

    pub fn requests(&self) -> Vec<NotificationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationResults, NotificationError> {
        self.requests.lock().unwrap().push(request.clone());

        if self.fail {
            return Err(NotificationError::GatewayUnreachable(
                "connection refused".into(),
            ));
        }

        Ok(NotificationResults {
            email: if request.email {
                ChannelResult::sent()
            } else {
                ChannelResult::skipped()
            },
            sms: if request.phone {
                ChannelResult::sent()
            } else {
                ChannelResult::skipped()
            },
        })
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingDispatcher>,
    pub service: OrderService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_notifier(RecordingDispatcher::default())
    }

    pub fn with_notifier(notifier: RecordingDispatcher) -> Self {
        let store = Arc::new(MemoryStore::with_menu(menu()));
        let notifier = Arc::new(notifier);
        let service = OrderService::new(
            store.clone(),
            store.clone(),
            notifier.clone(),
            OrderSettings::default(),
        );

        Self {
            store,
            notifier,
            service,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            orders: self.service.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

pub fn item(menu_item_id: i32, quantity: i32) -> SubmitOrderItem {
    SubmitOrderItem {
        menu_item_id,
        name: None,
        quantity,
        price: None,
        customizations: vec![],
    }
}

pub fn takeaway(name: &str, items: Vec<SubmitOrderItem>) -> SubmitOrderReq {
    SubmitOrderReq {
        customer_name: Some(name.into()),
        customer_phone: Some("+44 7700 900123".into()),
        order_type: Some("takeaway".into()),
        items,
        ..Default::default()
    }
}

pub fn dine_in(table: Option<&str>, items: Vec<SubmitOrderItem>) -> SubmitOrderReq {
    SubmitOrderReq {
        order_type: Some("dine-in".into()),
        table_number: table.map(Into::into),
        items,
        ..Default::default()
    }
}

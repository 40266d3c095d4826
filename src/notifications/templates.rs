use super::{NotificationKind, NotificationRequest};
use crate::domain::status::OrderStatus;

const BRAND: &str = "The Chai House";

pub fn status_message(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Received => "Your order has been received and will be prepared shortly.",
        OrderStatus::Preparing => "Your order is now being prepared by our team.",
        OrderStatus::Ready => "Your order is ready for pickup!",
        OrderStatus::Completed => "Your order has been completed. Thank you!",
        OrderStatus::Cancelled => "Your order has been cancelled.",
    }
}

pub fn email_subject(request: &NotificationRequest) -> String {
    let number = &request.order_details.order_number;
    match request.kind {
        NotificationKind::OrderConfirmation => format!("Order Confirmation - #{number}"),
        NotificationKind::StatusUpdate => format!("Order Update - #{number}"),
    }
}

pub fn email_body(request: &NotificationRequest, site_url: &str) -> String {
    let details = &request.order_details;
    let greeting = match request.customer_info.name.as_deref() {
        Some(name) => format!("Hi {name},"),
        None => "Hi,".to_string(),
    };

    let lead = match request.kind {
        NotificationKind::OrderConfirmation => {
            "Thank you for your order! We've received it and will start preparing it shortly."
        }
        NotificationKind::StatusUpdate => status_message(request.effective_status()),
    };

    let mut body = format!(
        "{greeting}\n\n{lead}\n\nOrder Number: {}\nStatus: {}\nTotal: {}\n",
        details.order_number,
        request.effective_status(),
        details.total_amount.with_scale(2),
    );

    if let Some(eta) = details.estimated_completion_time {
        body.push_str(&format!("Estimated completion: {}\n", eta.format("%H:%M")));
    }

    body.push_str(&format!(
        "\nTrack your order at {site_url}/track\n\n{BRAND} - Brewing memories, one cup at a time\n"
    ));
    body
}

pub fn sms_text(request: &NotificationRequest) -> String {
    let details = &request.order_details;
    match request.kind {
        NotificationKind::OrderConfirmation => format!(
            "Order #{} confirmed. Total: {}",
            details.order_number,
            details.total_amount.with_scale(2)
        ),
        NotificationKind::StatusUpdate => {
            let mut text = format!(
                "Order #{} status updated to: {}",
                details.order_number,
                request.effective_status()
            );
            if let Some(eta) = details.estimated_completion_time {
                text.push_str(&format!(" (ETA {})", eta.format("%H:%M")));
            }
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::notifications::{CustomerInfo, OrderDetails};

    fn request(kind: NotificationKind, status: Option<OrderStatus>) -> NotificationRequest {
        NotificationRequest {
            kind,
            email: true,
            phone: true,
            order_details: OrderDetails {
                order_number: "TCH-1718000000000-K3F9".into(),
                total_amount: BigDecimal::from_str("8").unwrap(),
                status: OrderStatus::Received,
                estimated_completion_time: None,
            },
            customer_info: CustomerInfo {
                name: Some("Asha".into()),
                ..Default::default()
            },
            status,
        }
    }

    #[test]
    fn test_confirmation_copy() {
        let req = request(NotificationKind::OrderConfirmation, None);
        assert_eq!(email_subject(&req), "Order Confirmation - #TCH-1718000000000-K3F9");
        assert_eq!(sms_text(&req), "Order #TCH-1718000000000-K3F9 confirmed. Total: 8.00");
        assert!(email_body(&req, "https://thechai.house").contains("https://thechai.house/track"));
    }

    #[test]
    fn test_status_update_copy() {
        let req = request(NotificationKind::StatusUpdate, Some(OrderStatus::Ready));
        assert_eq!(email_subject(&req), "Order Update - #TCH-1718000000000-K3F9");
        assert!(sms_text(&req).ends_with("status updated to: ready"));
        assert!(email_body(&req, "").contains(status_message(OrderStatus::Ready)));
    }
}

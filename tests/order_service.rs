mod common;

use std::collections::HashSet;

use chaihouse_orderservice::{
    domain::{cart::Cart, errors::OrderError, order_number, status::OrderStatus},
    services::feedback::SubmitFeedbackReq,
    store::{OrderFilter, OrderStore, StoreError},
};
use common::{Harness, RecordingDispatcher, decimal, dine_in, item, menu, takeaway};

fn feedback(order_id: i32) -> SubmitFeedbackReq {
    SubmitFeedbackReq {
        order_id,
        food_quality_rating: 5,
        service_speed_rating: 4,
        value_rating: 4,
        overall_rating: 5,
        comments: Some("  Lovely chai  ".into()),
    }
}

#[tokio::test]
async fn test_takeaway_order_is_priced_from_the_menu() {
    let harness = Harness::new();

    let mut chai = item(1, 2);
    chai.price = Some(decimal("0.10"));
    let submitted = harness
        .service
        .submit_order(takeaway("Asha", vec![chai, item(2, 1)]))
        .await
        .unwrap();

    assert_eq!(submitted.total_amount, decimal("8.00"));
    assert_eq!(submitted.total_amount.to_string(), "8.00");
    assert_eq!(submitted.estimated_time, "15-20 minutes");
    assert!(order_number::is_well_formed(&submitted.order_number, "TCH"));
    assert!(submitted.notification.delivered);

    let view = harness.service.get_order(submitted.order_id).await.unwrap();
    assert_eq!(view.order.status, "received");
    assert_eq!(view.order.order_type, "takeaway");
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[0].price, decimal("2.50"));
    assert_eq!(
        view.items[0].menu_item.as_ref().map(|m| m.name.as_str()),
        Some("Masala Chai")
    );

    let requests = harness.notifier.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].order_details.order_number, submitted.order_number);
    assert!(requests[0].phone);
    assert!(!requests[0].email);
}

#[tokio::test]
async fn test_cart_total_matches_submitted_total() {
    let harness = Harness::new();
    let menu = menu();

    let mut cart = Cart::new();
    cart.add(menu[0].clone(), vec!["Less Sugar".into()]);
    cart.add(menu[0].clone(), vec!["Less Sugar".into()]);
    cart.add(menu[0].clone(), vec!["Extra Ginger".into()]);
    cart.add(menu[2].clone(), vec![]);

    let submitted = harness
        .service
        .submit_order(takeaway("Ravi", cart.to_submission_items()))
        .await
        .unwrap();

    assert_eq!(submitted.total_amount, cart.total());
    assert_eq!(submitted.total_amount, decimal("9.00"));

    let view = harness.service.get_order(submitted.order_id).await.unwrap();
    assert_eq!(view.items.len(), 3);
    assert_eq!(view.items[0].customizations, vec!["Less Sugar".to_string()]);
}

#[tokio::test]
async fn test_dine_in_without_table_is_rejected() {
    let harness = Harness::new();

    let err = harness
        .service
        .submit_order(dine_in(None, vec![item(1, 1)]))
        .await
        .unwrap_err();

    match err {
        OrderError::Validation { field, .. } => assert_eq!(field, "table_number"),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(harness.store.outbox_events().is_empty());
    assert!(harness.notifier.requests().is_empty());
}

#[tokio::test]
async fn test_status_moves_through_the_kitchen_flow() {
    let harness = Harness::new();
    let submitted = harness
        .service
        .submit_order(dine_in(Some("7"), vec![item(3, 2)]))
        .await
        .unwrap();
    let id = submitted.order_id;

    for next in [
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ] {
        let changed = harness.service.transition(id, next, None).await.unwrap();
        assert_eq!(changed.order.status, next.as_str());
        assert!(changed.notification.delivered);
    }

    let err = harness
        .service
        .transition(id, OrderStatus::Received, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Received
        }
    ));

    let kinds: Vec<String> = harness
        .store
        .outbox_events()
        .into_iter()
        .map(|event| event.event_type)
        .collect();
    assert_eq!(
        kinds,
        vec![
            "order_confirmation",
            "status_update",
            "status_update",
            "status_update"
        ]
    );
}

#[tokio::test]
async fn test_ready_cannot_go_back_to_received() {
    let harness = Harness::new();
    let id = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap()
        .order_id;

    harness
        .service
        .transition(id, OrderStatus::Preparing, None)
        .await
        .unwrap();
    harness
        .service
        .transition(id, OrderStatus::Ready, None)
        .await
        .unwrap();

    let err = harness
        .service
        .transition(id, OrderStatus::Received, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));

    let order = harness.store.find_order(id).await.unwrap().unwrap();
    assert_eq!(order.status, "ready");
}

#[tokio::test]
async fn test_eta_is_stored_with_the_transition() {
    let harness = Harness::new();
    let id = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap()
        .order_id;

    let eta = chrono::Utc::now() + chrono::Duration::minutes(12);
    let changed = harness
        .service
        .transition(id, OrderStatus::Preparing, Some(eta))
        .await
        .unwrap();

    assert_eq!(changed.order.estimated_completion_time, Some(eta));
    let last = harness.notifier.requests().pop().unwrap();
    assert_eq!(last.status, Some(OrderStatus::Preparing));
    assert_eq!(last.order_details.estimated_completion_time, Some(eta));
}

#[tokio::test]
async fn test_cancellation_only_before_ready() {
    let harness = Harness::new();
    let early = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap()
        .order_id;
    let late = harness
        .service
        .submit_order(takeaway("Ravi", vec![item(2, 1)]))
        .await
        .unwrap()
        .order_id;

    harness
        .service
        .transition(early, OrderStatus::Preparing, None)
        .await
        .unwrap();
    let cancelled = harness.service.cancel(early).await.unwrap();
    assert_eq!(cancelled.order.status, "cancelled");

    harness
        .service
        .transition(late, OrderStatus::Preparing, None)
        .await
        .unwrap();
    harness
        .service
        .transition(late, OrderStatus::Ready, None)
        .await
        .unwrap();
    let err = harness.service.cancel(late).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));

    let err = harness.service.cancel(early).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let harness = Harness::new();

    assert!(matches!(
        harness.service.get_order(42).await.unwrap_err(),
        OrderError::NotFound(_)
    ));
    assert!(matches!(
        harness
            .service
            .transition(42, OrderStatus::Preparing, None)
            .await
            .unwrap_err(),
        OrderError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_failed_item_write_leaves_nothing_behind() {
    let harness = Harness::new();
    harness.store.fail_item_writes(true);

    let err = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Persistence(_)));

    let orders = harness
        .service
        .list_orders(OrderFilter::default())
        .await
        .unwrap();
    assert!(orders.is_empty());
    assert!(harness.store.find_order(1).await.unwrap().is_none());
    assert!(harness.store.outbox_events().is_empty());
    assert!(harness.notifier.requests().is_empty());

    harness.store.fail_item_writes(false);
    let submitted = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap();
    assert_eq!(submitted.order_id, 1);
}

#[tokio::test]
async fn test_concurrent_submissions_get_distinct_numbers() {
    let harness = Harness::new();

    let handles: Vec<_> = (0..100)
        .map(|n| {
            let service = harness.service.clone();
            tokio::spawn(async move {
                service
                    .submit_order(takeaway(&format!("Guest {n}"), vec![item(1, 1)]))
                    .await
            })
        })
        .collect();

    let mut numbers = HashSet::new();
    let mut ids = HashSet::new();
    for handle in handles {
        let submitted = handle.await.unwrap().unwrap();
        assert!(order_number::is_well_formed(&submitted.order_number, "TCH"));
        numbers.insert(submitted.order_number);
        ids.insert(submitted.order_id);
    }

    assert_eq!(numbers.len(), 100);
    assert_eq!(ids.len(), 100);
}

#[tokio::test]
async fn test_tracking_by_order_number() {
    let harness = Harness::new();
    let submitted = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap();
    harness
        .service
        .submit_order(takeaway("Ravi", vec![item(2, 1)]))
        .await
        .unwrap();

    let found = harness
        .service
        .list_orders(OrderFilter {
            order_number: Some(format!("  {}  ", submitted.order_number)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].order.id, submitted.order_id);

    let missing = harness
        .service
        .list_orders(OrderFilter {
            order_number: Some("TCH-0-ZZZZ".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(missing.is_empty());
}

#[tokio::test]
async fn test_lookup_by_phone_status_and_limit() {
    let harness = Harness::new();

    let mut first = takeaway("Asha", vec![item(1, 1)]);
    first.customer_phone = Some("07700 900001".into());
    let first = harness.service.submit_order(first).await.unwrap();

    let mut second = takeaway("Asha", vec![item(3, 2)]);
    second.customer_phone = Some("07700 900001".into());
    let second = harness.service.submit_order(second).await.unwrap();

    let mut other = takeaway("Ravi", vec![item(2, 1)]);
    other.customer_phone = Some("07700 900002".into());
    harness.service.submit_order(other).await.unwrap();

    let by_phone = harness
        .service
        .list_orders(OrderFilter {
            phone: Some("07700 900001".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<i32> = by_phone.iter().map(|view| view.order.id).collect();
    assert_eq!(ids, vec![second.order_id, first.order_id]);

    harness
        .service
        .transition(first.order_id, OrderStatus::Preparing, None)
        .await
        .unwrap();
    let preparing = harness
        .service
        .list_orders(OrderFilter {
            status: Some(OrderStatus::Preparing),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(preparing.len(), 1);
    assert_eq!(preparing[0].order.id, first.order_id);

    let newest = harness
        .service
        .list_orders(OrderFilter {
            limit: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(newest.len(), 1);

    let err = harness
        .service
        .list_orders(OrderFilter {
            limit: Some(0),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation { .. }));
}

#[tokio::test]
async fn test_failed_confirmation_keeps_the_order() {
    let harness = Harness::with_notifier(RecordingDispatcher::failing());

    let submitted = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap();

    assert!(!submitted.notification.delivered);
    assert!(submitted.notification.error.is_some());
    assert!(harness.store.find_order(submitted.order_id).await.unwrap().is_some());

    let events = harness.store.outbox_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, "FAILED");
}

#[tokio::test]
async fn test_delivered_confirmation_marks_outbox_dispatched() {
    let harness = Harness::new();
    harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap();

    let events = harness.store.outbox_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, "DISPATCHED");
    assert!(events[0].payload.contains("order_confirmation"));
}

#[tokio::test]
async fn test_feedback_only_for_completed_orders() {
    let harness = Harness::new();
    let id = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap()
        .order_id;

    let err = harness.service.submit_feedback(feedback(id)).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::FeedbackNotAllowed(OrderStatus::Received)
    ));

    for next in [
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ] {
        harness.service.transition(id, next, None).await.unwrap();
    }

    let saved = harness.service.submit_feedback(feedback(id)).await.unwrap();
    assert_eq!(saved.order_id, id);
    assert_eq!(saved.overall_rating, 5);
    assert_eq!(saved.comments.as_deref(), Some("Lovely chai"));
}

#[tokio::test]
async fn test_feedback_ratings_are_bounded() {
    let harness = Harness::new();

    let mut bad = feedback(1);
    bad.value_rating = 6;
    match harness.service.submit_feedback(bad).await.unwrap_err() {
        OrderError::Validation { field, .. } => assert_eq!(field, "value_rating"),
        other => panic!("expected validation error, got {other:?}"),
    }

    assert!(matches!(
        harness.service.submit_feedback(feedback(99)).await.unwrap_err(),
        OrderError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_order_number_collisions_are_retried() {
    let harness = Harness::new();
    harness.store.collide_order_numbers(2);

    let submitted = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap();
    assert!(order_number::is_well_formed(&submitted.order_number, "TCH"));

    let orders = harness
        .service
        .list_orders(OrderFilter::default())
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(harness.store.outbox_events().len(), 1);
}

#[tokio::test]
async fn test_order_number_retries_are_bounded() {
    let harness = Harness::new();
    harness.store.collide_order_numbers(3);

    let err = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::Persistence(StoreError::Duplicate(_))
    ));

    let orders = harness
        .service
        .list_orders(OrderFilter::default())
        .await
        .unwrap();
    assert!(orders.is_empty());
    assert!(harness.notifier.requests().is_empty());
}

#[tokio::test]
async fn test_status_change_rejudged_after_concurrent_cancel() {
    let harness = Harness::new();
    let id = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap()
        .order_id;

    harness
        .store
        .move_before_next_status_change(id, OrderStatus::Cancelled);
    let err = harness
        .service
        .transition(id, OrderStatus::Preparing, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Preparing
        }
    ));

    let order = harness.store.find_order(id).await.unwrap().unwrap();
    assert_eq!(order.status, "cancelled");
    assert_eq!(harness.store.outbox_events().len(), 1);
}

#[tokio::test]
async fn test_cancel_still_applies_after_concurrent_compatible_move() {
    let harness = Harness::new();
    let id = harness
        .service
        .submit_order(takeaway("Asha", vec![item(1, 1)]))
        .await
        .unwrap()
        .order_id;

    harness
        .store
        .move_before_next_status_change(id, OrderStatus::Preparing);
    let changed = harness.service.cancel(id).await.unwrap();
    assert_eq!(changed.order.status, "cancelled");

    let status_updates = harness
        .store
        .outbox_events()
        .into_iter()
        .filter(|event| event.event_type == "status_update")
        .count();
    assert_eq!(status_updates, 1);
}

use storefront_api::domain::order_status::{OrderStatus, TransitionError};

#[test]
fn statuses_advance_one_step_at_a_time() {
    assert_eq!(
        OrderStatus::Received.transition_to(OrderStatus::Preparing),
        Ok(OrderStatus::Preparing)
    );
    assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Ready));
    assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Delivered));
    assert!(!OrderStatus::Received.can_transition_to(OrderStatus::Ready));
    assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Preparing));
}

#[test]
fn any_open_order_can_be_cancelled() {
    for status in OrderStatus::ACTIVE {
        assert!(status.can_transition_to(OrderStatus::Cancelled), "{status}");
    }
}

#[test]
fn terminal_statuses_are_final() {
    let err = OrderStatus::Delivered
        .transition_to(OrderStatus::Cancelled)
        .unwrap_err();
    assert_eq!(
        err,
        TransitionError::NotAllowed {
            from: OrderStatus::Delivered,
            to: OrderStatus::Cancelled,
        }
    );
    assert_eq!(err.to_string(), "Cannot move order from delivered to cancelled");
    assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Received));
    assert_eq!(OrderStatus::Delivered.next(), None);
}

#[test]
fn statuses_parse_from_their_wire_names() {
    for status in [
        OrderStatus::Received,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
    }
    assert_eq!(
        "shipped".parse::<OrderStatus>(),
        Err(TransitionError::UnknownStatus("shipped".into()))
    );
}

#[test]
fn pending_statuses_are_a_subset_of_active() {
    assert!(
        OrderStatus::PENDING
            .iter()
            .all(|status| OrderStatus::ACTIVE.contains(status))
    );
    assert!(!OrderStatus::ACTIVE.contains(&OrderStatus::Delivered));
}

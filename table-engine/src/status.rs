//! Status State Machine
//!
//! | From | Event | To | Guard |
//! |------|-------|----|-------|
//! | empty | server: orders > 0 | ordered | only from empty |
//! | ordered | server: orders == 0 | empty | only from ordered |
//! | any | staff: print | preparing | always |
//! | preparing | timer: escalate | toPay | still preparing |
//! | any | staff: confirm payment | paid | always |
//! | paid | timer: settle | empty | still paid |
//!
//! Server events may only move a table between `empty` and `ordered`. They
//! never touch `preparing`, `toPay` or `paid`.

use shared::TableStatus;
use std::fmt;

/// Who produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// Reconciliation tick observing the order feed
    Server,
    /// Explicit staff action
    Staff,
    /// Escalation or settle deadline
    Timer,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSource::Server => write!(f, "server"),
            EventSource::Staff => write!(f, "staff"),
            EventSource::Timer => write!(f, "timer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// Orders currently attributed to the table in the latest snapshot
    OrdersObserved { order_count: usize },
    PrintRequested,
    EscalationDue,
    PaymentConfirmed,
    SettleElapsed,
}

impl StatusEvent {
    pub fn source(self) -> EventSource {
        match self {
            StatusEvent::OrdersObserved { .. } => EventSource::Server,
            StatusEvent::PrintRequested | StatusEvent::PaymentConfirmed => EventSource::Staff,
            StatusEvent::EscalationDue | StatusEvent::SettleElapsed => EventSource::Timer,
        }
    }
}

/// Apply `event` to `current`
///
/// Returns the destination status when the event is accepted (it may equal
/// `current` for staff actions, e.g. printing twice), `None` when a guard
/// rejects it.
pub fn next_status(current: TableStatus, event: StatusEvent) -> Option<TableStatus> {
    use TableStatus::*;

    match (current, event) {
        // staff-asserted statuses are sticky against the feed
        (_, StatusEvent::OrdersObserved { .. }) if current.is_staff_asserted() => None,
        (Empty, StatusEvent::OrdersObserved { order_count }) if order_count > 0 => Some(Ordered),
        (Ordered, StatusEvent::OrdersObserved { order_count: 0 }) => Some(Empty),
        (_, StatusEvent::OrdersObserved { .. }) => None,

        (_, StatusEvent::PrintRequested) => Some(Preparing),
        (_, StatusEvent::PaymentConfirmed) => Some(Paid),

        (Preparing, StatusEvent::EscalationDue) => Some(ToPay),
        (_, StatusEvent::EscalationDue) => None,

        (Paid, StatusEvent::SettleElapsed) => Some(Empty),
        (_, StatusEvent::SettleElapsed) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TableStatus::*;

    const ALL: [TableStatus; 5] = [Empty, Ordered, Preparing, ToPay, Paid];

    fn observed(order_count: usize) -> StatusEvent {
        StatusEvent::OrdersObserved { order_count }
    }

    #[test]
    fn test_server_advances_only_from_empty() {
        assert_eq!(next_status(Empty, observed(1)), Some(Ordered));
        assert_eq!(next_status(Empty, observed(0)), None);
        assert_eq!(next_status(Ordered, observed(3)), None);
        for status in [Preparing, ToPay, Paid] {
            assert_eq!(next_status(status, observed(2)), None);
        }
    }

    #[test]
    fn test_server_retracts_only_from_ordered() {
        assert_eq!(next_status(Ordered, observed(0)), Some(Empty));
        for status in [Preparing, ToPay, Paid] {
            assert_eq!(next_status(status, observed(0)), None, "{status} must be sticky");
        }
    }

    #[test]
    fn test_feed_never_moves_staff_asserted_status() {
        for status in ALL.into_iter().filter(|s| s.is_staff_asserted()) {
            for count in [0, 1, 5] {
                assert_eq!(next_status(status, observed(count)), None);
            }
        }
        assert!(!Empty.is_staff_asserted() && !Ordered.is_staff_asserted());
    }

    #[test]
    fn test_staff_actions_always_allowed() {
        for status in ALL {
            assert_eq!(next_status(status, StatusEvent::PrintRequested), Some(Preparing));
            assert_eq!(next_status(status, StatusEvent::PaymentConfirmed), Some(Paid));
        }
    }

    #[test]
    fn test_escalation_only_from_preparing() {
        for status in ALL {
            let expected = (status == Preparing).then_some(ToPay);
            assert_eq!(next_status(status, StatusEvent::EscalationDue), expected);
        }
    }

    #[test]
    fn test_settle_only_from_paid() {
        for status in ALL {
            let expected = (status == Paid).then_some(Empty);
            assert_eq!(next_status(status, StatusEvent::SettleElapsed), expected);
        }
    }

    #[test]
    fn test_event_sources() {
        assert_eq!(observed(0).source(), EventSource::Server);
        assert_eq!(StatusEvent::PrintRequested.source(), EventSource::Staff);
        assert_eq!(StatusEvent::SettleElapsed.source(), EventSource::Timer);
    }
}

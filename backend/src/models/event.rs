//! Event logging for dispatch replay and auditing.
//!
//! This module defines the Event enum which captures every significant state
//! change made by the scheduler. Events enable:
//! - Debugging (understand what happened and when)
//! - Auditing (verify who was served ahead of whom)
//! - Analysis (completion waits, alert counts, emergency boosts)
//!
//! # Event Types
//!
//! - **Arrival**: new order enters the queue
//! - **Assignment**: order handed to a barista (primary pass or forced)
//! - **Completion**: prep finished; carries the order's wait
//! - **Emergency**: wait crossed the warning threshold
//! - **Alert**: near-timeout manager alert
//! - **Skip**: order excluded from a tick because of a bad worker reference
//!
//! # Example
//!
//! ```rust
//! use barista_dispatch_core_rs::models::Event;
//!
//! let event = Event::OrderCompleted {
//!     time: 12.5,
//!     order_id: 42,
//!     worker_id: Some(1),
//!     wait_minutes: 3.0,
//!     prep_minutes: 4.0,
//! };
//!
//! println!("Event at minute {}: {:?}", event.time(), event);
//! ```

use crate::core::time::Minutes;
use crate::models::catalog::{DrinkType, LoyaltyTier};
use crate::models::order::OrderId;
use crate::models::worker::WorkerId;

/// Dispatch event capturing a state change.
///
/// Events are logged in the order they occur within a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// New order entered the queue
    OrderArrived {
        time: Minutes,
        order_id: OrderId,
        customer: String,
        drink: DrinkType,
        loyalty: LoyaltyTier,
    },

    /// Order handed to a worker
    OrderAssigned {
        time: Minutes,
        order_id: OrderId,
        worker_id: WorkerId,
        priority_score: f64,
        wait_minutes: Minutes,
        /// Assigned by the emergency sweep rather than the primary pass
        forced: bool,
        reason: String,
    },

    /// Prep finished
    OrderCompleted {
        time: Minutes,
        order_id: OrderId,
        worker_id: Option<WorkerId>,
        wait_minutes: Minutes,
        prep_minutes: Minutes,
    },

    /// Wait crossed the warning threshold for the first time
    EmergencyBoost {
        time: Minutes,
        order_id: OrderId,
        wait_minutes: Minutes,
    },

    /// Order is about to time out
    ManagerAlert {
        time: Minutes,
        order_id: OrderId,
        customer: String,
        wait_minutes: Minutes,
        max_wait_minutes: Minutes,
    },

    /// Order left out of this tick's candidates
    AssignmentSkipped {
        time: Minutes,
        order_id: OrderId,
        worker_id: WorkerId,
        reason: String,
    },
}

impl Event {
    /// Time at which this event occurred
    pub fn time(&self) -> Minutes {
        match self {
            Event::OrderArrived { time, .. } => *time,
            Event::OrderAssigned { time, .. } => *time,
            Event::OrderCompleted { time, .. } => *time,
            Event::EmergencyBoost { time, .. } => *time,
            Event::ManagerAlert { time, .. } => *time,
            Event::AssignmentSkipped { time, .. } => *time,
        }
    }

    /// Short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::OrderArrived { .. } => "OrderArrived",
            Event::OrderAssigned { .. } => "OrderAssigned",
            Event::OrderCompleted { .. } => "OrderCompleted",
            Event::EmergencyBoost { .. } => "EmergencyBoost",
            Event::ManagerAlert { .. } => "ManagerAlert",
            Event::AssignmentSkipped { .. } => "AssignmentSkipped",
        }
    }

    /// Order this event relates to
    pub fn order_id(&self) -> OrderId {
        match self {
            Event::OrderArrived { order_id, .. } => *order_id,
            Event::OrderAssigned { order_id, .. } => *order_id,
            Event::OrderCompleted { order_id, .. } => *order_id,
            Event::EmergencyBoost { order_id, .. } => *order_id,
            Event::ManagerAlert { order_id, .. } => *order_id,
            Event::AssignmentSkipped { order_id, .. } => *order_id,
        }
    }

    /// Worker ID if the event involves a specific worker
    pub fn worker_id(&self) -> Option<WorkerId> {
        match self {
            Event::OrderAssigned { worker_id, .. } => Some(*worker_id),
            Event::OrderCompleted { worker_id, .. } => *worker_id,
            Event::AssignmentSkipped { worker_id, .. } => Some(*worker_id),
            _ => None,
        }
    }
}

/// Event log for storing and querying dispatch events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,

    /// Oldest events are dropped past this many; `None` keeps everything
    limit: Option<usize>,
    dropped: u64,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log that keeps only the most recent `limit` events
    pub fn bounded(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
        self.enforce_limit();
    }

    /// Append a batch of events, preserving their order
    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            let excess = self.events.len().saturating_sub(limit);
            if excess > 0 {
                self.events.drain(..excess);
                self.dropped += excess as u64;
            }
        }
    }

    /// Get the number of events currently held
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events discarded to stay within the limit
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific order
    pub fn events_for_order(&self, order_id: OrderId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.order_id() == order_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assigned(time: Minutes, order_id: OrderId, worker_id: WorkerId) -> Event {
        Event::OrderAssigned {
            time,
            order_id,
            worker_id,
            priority_score: 50.0,
            wait_minutes: 1.0,
            forced: false,
            reason: "Priority=50.0".to_string(),
        }
    }

    #[test]
    fn test_event_accessors() {
        let event = assigned(4.5, 7, 2);
        assert_eq!(event.time(), 4.5);
        assert_eq!(event.event_type(), "OrderAssigned");
        assert_eq!(event.order_id(), 7);
        assert_eq!(event.worker_id(), Some(2));
    }

    #[test]
    fn test_event_log_queries() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.log(assigned(1.0, 1, 1));
        log.log(Event::EmergencyBoost {
            time: 1.0,
            order_id: 2,
            wait_minutes: 8.5,
        });
        log.extend(vec![assigned(1.5, 2, 3)]);

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_of_type("OrderAssigned").len(), 2);
        assert_eq!(log.events_for_order(2).len(), 2);
        assert_eq!(log.dropped(), 0);
    }

    #[test]
    fn test_bounded_log_drops_oldest() {
        let mut log = EventLog::bounded(2);
        log.log(assigned(1.0, 1, 1));
        log.extend(vec![assigned(2.0, 2, 1), assigned(3.0, 3, 1)]);

        assert_eq!(log.len(), 2);
        assert_eq!(log.dropped(), 1);
        assert_eq!(log.events()[0].order_id(), 2);
        assert_eq!(log.events()[1].order_id(), 3);
    }
}

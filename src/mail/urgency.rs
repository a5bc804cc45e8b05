//! Urgency queue
//!
//! Holds copies of urgent messages, most recent first. The order is rebuilt
//! through a max-heap keyed by creation time on every insertion; messages
//! created at the same instant keep their insertion order.

use super::{Message, MessageId};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Heap entry: newer messages are greater, earlier insertions win ties
struct Ranked {
    message: Message,
    seq: Reverse<usize>,
}

impl Ranked {
    fn key(&self) -> (chrono::DateTime<chrono::Utc>, Reverse<usize>) {
        (self.message.created_at, self.seq)
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Messages flagged urgent, ordered by descending creation time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrgencyQueue {
    messages: Vec<Message>,
}

impl UrgencyQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message and restore most-recent-first order
    pub fn enqueue(&mut self, message: Message) {
        tracing::debug!(subject = %message.subject, "Enqueuing urgent message");
        self.messages.push(message);
        self.reorder();
    }

    fn reorder(&mut self) {
        let mut heap: BinaryHeap<Ranked> = self
            .messages
            .drain(..)
            .enumerate()
            .map(|(i, message)| Ranked {
                message,
                seq: Reverse(i),
            })
            .collect();

        while let Some(top) = heap.pop() {
            self.messages.push(top.message);
        }
    }

    /// Remove the message with the given id
    pub fn remove(&mut self, id: &MessageId) -> Option<Message> {
        let pos = self.messages.iter().position(|m| &m.id == id)?;
        Some(self.messages.remove(pos))
    }

    /// Check whether a message is queued
    pub fn contains(&self, id: &MessageId) -> bool {
        self.messages.iter().any(|m| &m.id == id)
    }

    /// Most recent message, if any
    pub fn peek(&self) -> Option<&Message> {
        self.messages.first()
    }

    /// Iterate in queue order
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Queued messages in order
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drain the queue in order, handing each message to `handler`
    ///
    /// Returns the number of messages processed. The queue is empty
    /// afterwards.
    pub fn process_all<F>(&mut self, mut handler: F) -> usize
    where
        F: FnMut(&Message),
    {
        let drained: Vec<Message> = self.messages.drain(..).collect();
        for message in &drained {
            handler(message);
        }
        drained.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::UserId;
    use chrono::{Duration, TimeZone, Utc};

    fn at(offset_secs: i64, subject: &str) -> Message {
        let alice: UserId = "alice".parse().unwrap();
        let bob: UserId = "bob".parse().unwrap();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Message::new(alice, bob, subject, "")
            .with_urgent(true)
            .with_created_at(base + Duration::seconds(offset_secs))
    }

    fn subjects(queue: &UrgencyQueue) -> Vec<&str> {
        queue.iter().map(|m| m.subject.as_str()).collect()
    }

    #[test]
    fn test_enqueue_orders_most_recent_first() {
        let mut queue = UrgencyQueue::new();
        queue.enqueue(at(1, "t1"));
        queue.enqueue(at(2, "t2"));
        queue.enqueue(at(3, "t3"));

        assert_eq!(subjects(&queue), vec!["t3", "t2", "t1"]);
        assert_eq!(queue.peek().unwrap().subject, "t3");
    }

    #[test]
    fn test_out_of_order_insertion() {
        let mut queue = UrgencyQueue::new();
        queue.enqueue(at(20, "b"));
        queue.enqueue(at(30, "c"));
        queue.enqueue(at(10, "a"));
        queue.enqueue(at(25, "bc"));

        assert_eq!(subjects(&queue), vec!["c", "bc", "b", "a"]);
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let mut queue = UrgencyQueue::new();
        queue.enqueue(at(5, "first"));
        queue.enqueue(at(5, "second"));
        queue.enqueue(at(9, "newest"));
        queue.enqueue(at(5, "third"));

        assert_eq!(subjects(&queue), vec!["newest", "first", "second", "third"]);
    }

    #[test]
    fn test_process_all_drains_in_order() {
        let mut queue = UrgencyQueue::new();
        queue.enqueue(at(1, "old"));
        queue.enqueue(at(2, "new"));

        let mut seen = Vec::new();
        let count = queue.process_all(|m| seen.push(m.subject.clone()));

        assert_eq!(count, 2);
        assert_eq!(seen, vec!["new", "old"]);
        assert!(queue.is_empty());
        assert_eq!(queue.process_all(|_| panic!("queue should be empty")), 0);
    }

    #[test]
    fn test_remove() {
        let mut queue = UrgencyQueue::new();
        let m = at(1, "gone");
        let id = m.id.clone();
        queue.enqueue(m);
        queue.enqueue(at(2, "stays"));

        assert!(queue.contains(&id));
        assert_eq!(queue.remove(&id).map(|m| m.subject), Some("gone".to_string()));
        assert!(queue.remove(&id).is_none());
        assert_eq!(queue.len(), 1);
    }
}

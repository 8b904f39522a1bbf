// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! jdp-broker
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Location of one message on the broker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageCoordinates {
    /// Topic name.
    pub topic: String,
    /// Partition number.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: i64,
}

/// One consumed message.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Where the message sits on the broker.
    pub coordinates: MessageCoordinates,
    /// Producer key, when one was set.
    pub key: Option<String>,
    /// UTF-8 value.
    pub value: String,
}

/// Broker-side failures.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Produce was rejected or timed out.
    #[error("publish to '{topic}' failed: {reason}")]
    Publish {
        /// Target topic.
        topic: String,
        /// Failure detail.
        reason: String,
    },

    /// Offset commit failed.
    #[error("commit failed: {0}")]
    Commit(String),

    /// Poll failed.
    #[error("poll failed: {0}")]
    Poll(String),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Blocking consumer bound to one topic within a consumer group.
pub trait BrokerConsumer: Send {
    /// Wait up to `timeout` for the next message.
    fn poll(&mut self, timeout: Duration) -> Result<Option<InboundMessage>, BrokerError>;

    /// Advance the group offset past the given message.
    fn commit(&mut self, coordinates: &MessageCoordinates) -> Result<(), BrokerError>;

    /// Leave the group and release the assignment.
    fn close(&mut self);
}

/// Producer shared by every worker; publish must be callable
/// concurrently.
pub trait BrokerProducer: Send + Sync {
    /// Fire one record at a topic, keyed for partition affinity.
    fn publish(&self, topic: &str, key: &str, value: &str) -> Result<(), BrokerError>;

    /// Block until buffered records are on the wire.
    fn flush(&self, timeout: Duration) -> Result<(), BrokerError>;
}

// ---------------------------------------------------------------------------
// In-memory broker
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct TopicLog {
    records: Vec<(Option<String>, String)>,
}

#[derive(Debug, Default)]
struct BrokerState {
    topics: BTreeMap<String, TopicLog>,
    committed: HashMap<(String, String), i64>,
    failing_topics: HashSet<String>,
}

/// Single-partition in-memory broker for tests and local runs.
///
/// Topics are append-only logs; consumers track their own position and
/// commits are recorded per `(group, topic)`. Publishing to a topic put
/// into failure mode returns [`BrokerError::Publish`], which is how the
/// producer-outage paths are exercised.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl InMemoryBroker {
    /// Fresh broker with no topics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, as an external producer would.
    pub fn seed(&self, topic: &str, key: Option<&str>, value: &str) {
        let mut state = self.state.lock().expect("broker lock");
        state
            .topics
            .entry(topic.to_string())
            .or_default()
            .records
            .push((key.map(String::from), value.to_string()));
    }

    /// Make every publish to `topic` fail until cleared.
    pub fn fail_topic(&self, topic: &str) {
        let mut state = self.state.lock().expect("broker lock");
        state.failing_topics.insert(topic.to_string());
    }

    /// Clear failure mode for `topic`.
    pub fn restore_topic(&self, topic: &str) {
        let mut state = self.state.lock().expect("broker lock");
        state.failing_topics.remove(topic);
    }

    /// All records currently on `topic`.
    pub fn records(&self, topic: &str) -> Vec<(Option<String>, String)> {
        let state = self.state.lock().expect("broker lock");
        state
            .topics
            .get(topic)
            .map(|log| log.records.clone())
            .unwrap_or_default()
    }

    /// Committed offset for a group on a topic, if any.
    pub fn committed_offset(&self, group: &str, topic: &str) -> Option<i64> {
        let state = self.state.lock().expect("broker lock");
        state.committed.get(&(group.to_string(), topic.to_string())).copied()
    }

    /// A consumer over one topic in `group`, starting at the beginning.
    pub fn consumer(&self, topic: &str, group: &str) -> InMemoryConsumer {
        InMemoryConsumer {
            state: Arc::clone(&self.state),
            topic: topic.to_string(),
            group: group.to_string(),
            position: 0,
            closed: false,
        }
    }

    /// A producer handle onto this broker.
    pub fn producer(&self) -> InMemoryProducer {
        InMemoryProducer {
            state: Arc::clone(&self.state),
        }
    }
}

/// Consumer half of [`InMemoryBroker`].
#[derive(Debug)]
pub struct InMemoryConsumer {
    state: Arc<Mutex<BrokerState>>,
    topic: String,
    group: String,
    position: i64,
    closed: bool,
}

impl BrokerConsumer for InMemoryConsumer {
    fn poll(&mut self, _timeout: Duration) -> Result<Option<InboundMessage>, BrokerError> {
        if self.closed {
            return Err(BrokerError::Poll("consumer closed".into()));
        }
        let state = self.state.lock().expect("broker lock");
        let Some(log) = state.topics.get(&self.topic) else {
            return Ok(None);
        };
        let Some((key, value)) = log.records.get(self.position as usize) else {
            return Ok(None);
        };
        let message = InboundMessage {
            coordinates: MessageCoordinates {
                topic: self.topic.clone(),
                partition: 0,
                offset: self.position,
            },
            key: key.clone(),
            value: value.clone(),
        };
        self.position += 1;
        Ok(Some(message))
    }

    fn commit(&mut self, coordinates: &MessageCoordinates) -> Result<(), BrokerError> {
        if self.closed {
            return Err(BrokerError::Commit("consumer closed".into()));
        }
        let mut state = self.state.lock().expect("broker lock");
        state
            .committed
            .insert((self.group.clone(), self.topic.clone()), coordinates.offset + 1);
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Producer half of [`InMemoryBroker`].
#[derive(Debug, Clone)]
pub struct InMemoryProducer {
    state: Arc<Mutex<BrokerState>>,
}

impl BrokerProducer for InMemoryProducer {
    fn publish(&self, topic: &str, key: &str, value: &str) -> Result<(), BrokerError> {
        let mut state = self.state.lock().expect("broker lock");
        if state.failing_topics.contains(topic) {
            return Err(BrokerError::Publish {
                topic: topic.to_string(),
                reason: "topic in failure mode".into(),
            });
        }
        state
            .topics
            .entry(topic.to_string())
            .or_default()
            .records
            .push((Some(key.to_string()), value.to_string()));
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> Result<(), BrokerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: Duration = Duration::from_millis(10);

    #[test]
    fn seeded_records_are_polled_in_order() {
        let broker = InMemoryBroker::new();
        broker.seed("t", Some("k1"), "v1");
        broker.seed("t", None, "v2");

        let mut consumer = broker.consumer("t", "g");
        let m1 = consumer.poll(POLL).unwrap().unwrap();
        assert_eq!(m1.value, "v1");
        assert_eq!(m1.coordinates.offset, 0);
        let m2 = consumer.poll(POLL).unwrap().unwrap();
        assert_eq!(m2.value, "v2");
        assert!(consumer.poll(POLL).unwrap().is_none());
    }

    #[test]
    fn commit_records_next_offset_per_group() {
        let broker = InMemoryBroker::new();
        broker.seed("t", None, "v1");
        let mut consumer = broker.consumer("t", "g");
        let m = consumer.poll(POLL).unwrap().unwrap();
        consumer.commit(&m.coordinates).unwrap();
        assert_eq!(broker.committed_offset("g", "t"), Some(1));
        assert_eq!(broker.committed_offset("other", "t"), None);
    }

    #[test]
    fn producer_appends_and_failure_mode_rejects() {
        let broker = InMemoryBroker::new();
        let producer = broker.producer();
        producer.publish("out", "req-1", "{}").unwrap();
        assert_eq!(broker.records("out").len(), 1);

        broker.fail_topic("out");
        assert!(matches!(
            producer.publish("out", "req-2", "{}"),
            Err(BrokerError::Publish { .. })
        ));
        broker.restore_topic("out");
        producer.publish("out", "req-2", "{}").unwrap();
        assert_eq!(broker.records("out").len(), 2);
    }

    #[test]
    fn closed_consumer_rejects_poll() {
        let broker = InMemoryBroker::new();
        let mut consumer = broker.consumer("t", "g");
        consumer.close();
        assert!(consumer.poll(POLL).is_err());
    }
}

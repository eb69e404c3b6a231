use serde::{Deserialize, Serialize};

/// A unit of work waiting in a sequential queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem<T> {
    pub index: u64,
    pub item: T,
}

/// Persisted form of a queue item.
///
/// `processed` flips from false to true exactly once and never back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingRecord<T> {
    pub index: u64,
    pub payload: T,
    pub processed: bool,
}

impl<T> ProcessingRecord<T> {
    pub fn new(index: u64, payload: T) -> Self {
        ProcessingRecord {
            index,
            payload,
            processed: false,
        }
    }

    pub fn into_item(self) -> QueueItem<T> {
        QueueItem {
            index: self.index,
            item: self.payload,
        }
    }
}

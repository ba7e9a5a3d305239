//! Bounded three-priority work queue.
//!
//! Dequeue order is strict priority: all high before any normal, all normal
//! before any low, FIFO within a level. A paused queue dequeues nothing.
//! Items are plain values and are lost on restart.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::metrics::Metrics;

/// Returned when the queue has reached its maximum depth.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("queue is full")]
pub struct QueueFull;

/// Item priority, strictly ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }

    /// Strict parse for request validation.
    pub fn from_name(name: &str) -> Option<Priority> {
        match name {
            "high" => Some(Priority::High),
            "normal" => Some(Priority::Normal),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    /// Lenient parse used on enqueue: unrecognized names become Normal.
    pub fn normalize(name: &str) -> Priority {
        Priority::from_name(name).unwrap_or(Priority::Normal)
    }
}

/// A work item in the queue.
#[derive(Debug, Clone)]
pub struct Item {
    /// Unique identifier
    pub id: String,
    /// Item priority
    pub priority: Priority,
    /// How long processing should take
    pub processing_time: Duration,
    /// When the item was added to the queue
    pub enqueued_at: Instant,
}

#[derive(Default)]
struct Levels {
    high: VecDeque<Item>,
    normal: VecDeque<Item>,
    low: VecDeque<Item>,
}

impl Levels {
    fn depth(&self) -> usize {
        self.high.len() + self.normal.len() + self.low.len()
    }

    fn oldest(&self) -> Option<Instant> {
        [&self.high, &self.normal, &self.low]
            .iter()
            .filter_map(|level| level.front().map(|item| item.enqueued_at))
            .min()
    }
}

/// Queue statistics snapshot.
#[derive(Debug, Clone)]
pub struct Stats {
    pub depth: usize,
    pub high_depth: usize,
    pub normal_depth: usize,
    pub low_depth: usize,
    pub enqueued_total: i64,
    pub processed_total: i64,
    pub failed_total: i64,
    pub paused: bool,
    pub oldest_item_age: Duration,
}

/// Thread-safe priority queue.
pub struct Queue {
    max_depth: usize,
    levels: Mutex<Levels>,

    enqueued_total: AtomicI64,
    processed_total: AtomicI64,
    failed_total: AtomicI64,
    paused: AtomicBool,

    metrics: Arc<Metrics>,
}

impl Queue {
    /// Create a queue with the given maximum depth.
    pub fn new(max_depth: usize, metrics: Arc<Metrics>) -> Self {
        Self {
            max_depth,
            levels: Mutex::default(),
            enqueued_total: AtomicI64::new(0),
            processed_total: AtomicI64::new(0),
            failed_total: AtomicI64::new(0),
            paused: AtomicBool::new(false),
            metrics,
        }
    }

    /// Add an item to the tail of its priority level.
    pub fn enqueue(&self, item: Item) -> Result<(), QueueFull> {
        let mut levels = self.levels.lock().unwrap_or_else(PoisonError::into_inner);

        if levels.depth() >= self.max_depth {
            return Err(QueueFull);
        }

        match item.priority {
            Priority::High => levels.high.push_back(item),
            Priority::Normal => levels.normal.push_back(item),
            Priority::Low => levels.low.push_back(item),
        }

        self.enqueued_total.fetch_add(1, Ordering::Relaxed);
        self.metrics.queue_items_enqueued_total.inc();
        self.update_metrics(&levels);
        Ok(())
    }

    /// Remove and return the head of the highest non-empty priority level.
    /// Returns `None` when the queue is empty or paused.
    pub fn dequeue(&self) -> Option<Item> {
        if self.paused.load(Ordering::Relaxed) {
            return None;
        }

        let mut levels = self.levels.lock().unwrap_or_else(PoisonError::into_inner);

        let item = levels
            .high
            .pop_front()
            .or_else(|| levels.normal.pop_front())
            .or_else(|| levels.low.pop_front());

        if item.is_some() {
            self.update_metrics(&levels);
        }
        item
    }

    /// Record an item as processed successfully.
    pub fn mark_processed(&self) {
        self.processed_total.fetch_add(1, Ordering::Relaxed);
        self.metrics.queue_items_processed_total.inc();
    }

    /// Record an item as failed.
    pub fn mark_failed(&self) {
        self.failed_total.fetch_add(1, Ordering::Relaxed);
        self.metrics.queue_items_failed_total.inc();
    }

    /// Current total queue depth.
    pub fn depth(&self) -> usize {
        self.levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .depth()
    }

    /// Current queue statistics.
    pub fn stats(&self) -> Stats {
        let levels = self.levels.lock().unwrap_or_else(PoisonError::into_inner);

        Stats {
            depth: levels.depth(),
            high_depth: levels.high.len(),
            normal_depth: levels.normal.len(),
            low_depth: levels.low.len(),
            enqueued_total: self.enqueued_total.load(Ordering::Relaxed),
            processed_total: self.processed_total.load(Ordering::Relaxed),
            failed_total: self.failed_total.load(Ordering::Relaxed),
            paused: self.paused.load(Ordering::Relaxed),
            oldest_item_age: levels
                .oldest()
                .map(|at| at.elapsed())
                .unwrap_or(Duration::ZERO),
        }
    }

    /// Remove all items, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let mut levels = self.levels.lock().unwrap_or_else(PoisonError::into_inner);
        let count = levels.depth();
        *levels = Levels::default();
        self.update_metrics(&levels);
        count
    }

    /// Stop dequeue operations.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    /// Allow dequeue operations again.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    fn update_metrics(&self, levels: &Levels) {
        self.metrics.queue_depth.set(levels.depth() as i64);
        self.metrics
            .queue_depth_by_priority
            .with_label_values(&["high"])
            .set(levels.high.len() as i64);
        self.metrics
            .queue_depth_by_priority
            .with_label_values(&["normal"])
            .set(levels.normal.len() as i64);
        self.metrics
            .queue_depth_by_priority
            .with_label_values(&["low"])
            .set(levels.low.len() as i64);
        self.metrics.queue_oldest_item_age_seconds.set(
            levels
                .oldest()
                .map(|at| at.elapsed().as_secs_f64())
                .unwrap_or(0.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_queue(max_depth: usize) -> Queue {
        Queue::new(max_depth, Arc::new(Metrics::new().unwrap()))
    }

    fn item(id: &str, priority: Priority) -> Item {
        Item {
            id: id.to_string(),
            priority,
            processing_time: Duration::from_millis(50),
            enqueued_at: Instant::now(),
        }
    }

    #[tokio::test]
    async fn strict_priority_ordering() {
        let queue = test_queue(10);
        queue.enqueue(item("low", Priority::Low)).unwrap();
        queue.enqueue(item("normal", Priority::Normal)).unwrap();
        queue.enqueue(item("high", Priority::High)).unwrap();

        assert_eq!(queue.dequeue().unwrap().id, "high");
        assert_eq!(queue.dequeue().unwrap().id, "normal");
        assert_eq!(queue.dequeue().unwrap().id, "low");
        assert!(queue.dequeue().is_none());
    }

    #[tokio::test]
    async fn fifo_within_a_level() {
        let queue = test_queue(10);
        for id in ["a", "b", "c"] {
            queue.enqueue(item(id, Priority::Normal)).unwrap();
        }

        assert_eq!(queue.dequeue().unwrap().id, "a");
        assert_eq!(queue.dequeue().unwrap().id, "b");
        assert_eq!(queue.dequeue().unwrap().id, "c");
    }

    #[tokio::test]
    async fn rejects_when_full() {
        let queue = test_queue(2);
        queue.enqueue(item("1", Priority::Normal)).unwrap();
        queue.enqueue(item("2", Priority::High)).unwrap();

        assert_eq!(queue.enqueue(item("3", Priority::Low)), Err(QueueFull));
        assert_eq!(queue.depth(), 2);

        // Draining frees capacity again.
        queue.dequeue().unwrap();
        assert!(queue.enqueue(item("4", Priority::Low)).is_ok());
    }

    #[tokio::test]
    async fn paused_queue_dequeues_nothing() {
        let queue = test_queue(10);
        queue.enqueue(item("a", Priority::High)).unwrap();

        queue.pause();
        assert!(queue.is_paused());
        assert!(queue.dequeue().is_none());
        assert_eq!(queue.depth(), 1);

        queue.resume();
        assert_eq!(queue.dequeue().unwrap().id, "a");
    }

    #[tokio::test]
    async fn unknown_priority_normalizes() {
        assert_eq!(Priority::normalize("urgent"), Priority::Normal);
        assert_eq!(Priority::normalize("high"), Priority::High);
        assert_eq!(Priority::from_name("urgent"), None);
    }

    #[tokio::test]
    async fn clear_returns_count() {
        let queue = test_queue(10);
        for i in 0..5 {
            queue.enqueue(item(&i.to_string(), Priority::Normal)).unwrap();
        }

        assert_eq!(queue.clear(), 5);
        assert_eq!(queue.depth(), 0);
        assert_eq!(queue.clear(), 0);
    }

    #[tokio::test]
    async fn dequeues_match_enqueues() {
        let queue = test_queue(1000);
        let mut enqueued = 0;
        for i in 0..100 {
            let priority = match i % 3 {
                0 => Priority::High,
                1 => Priority::Normal,
                _ => Priority::Low,
            };
            if queue.enqueue(item(&i.to_string(), priority)).is_ok() {
                enqueued += 1;
            }
        }

        let mut dequeued = 0;
        let mut last_rank = 0;
        while let Some(it) = queue.dequeue() {
            let rank = match it.priority {
                Priority::High => 0,
                Priority::Normal => 1,
                Priority::Low => 2,
            };
            assert!(rank >= last_rank, "priority order violated");
            last_rank = rank;
            dequeued += 1;
        }
        assert_eq!(dequeued, enqueued);
    }

    #[tokio::test(start_paused = true)]
    async fn oldest_item_age_tracks_head() {
        let queue = test_queue(10);
        assert_eq!(queue.stats().oldest_item_age, Duration::ZERO);

        queue.enqueue(item("a", Priority::Low)).unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;
        queue.enqueue(item("b", Priority::High)).unwrap();

        // The low item was enqueued first and is the oldest, even though the
        // high item is the next to dequeue.
        let stats = queue.stats();
        assert_eq!(stats.oldest_item_age, Duration::from_secs(3));
        assert_eq!(stats.high_depth, 1);
        assert_eq!(stats.low_depth, 1);

        queue.dequeue().unwrap();
        queue.dequeue().unwrap();
        assert_eq!(queue.stats().oldest_item_age, Duration::ZERO);
    }

    #[tokio::test]
    async fn totals_are_monotone() {
        let queue = test_queue(10);
        queue.enqueue(item("a", Priority::Normal)).unwrap();
        queue.enqueue(item("b", Priority::Normal)).unwrap();
        queue.dequeue().unwrap();
        queue.mark_processed();
        queue.dequeue().unwrap();
        queue.mark_failed();

        let stats = queue.stats();
        assert_eq!(stats.enqueued_total, 2);
        assert_eq!(stats.processed_total, 1);
        assert_eq!(stats.failed_total, 1);
    }
}

//! Background worker pool for queue processing.
//!
//! A pool owns at most one live set of workers. `start` replaces any
//! running set (stop, join, then launch), so the latest call's worker count
//! and per-item costs always win. Workers inherit a pool-wide cancellation
//! token independent of any request.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::metrics::Metrics;
use crate::queue::Queue;

/// How long an idle worker waits before re-checking the queue.
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// Processing time assumed for items that carry none.
const DEFAULT_PROCESSING_TIME: Duration = Duration::from_millis(100);

#[derive(Default)]
struct PoolInner {
    token: Option<CancellationToken>,
    handles: Vec<JoinHandle<()>>,
}

/// Manages background workers that process queue items.
pub struct WorkerPool {
    queue: Arc<Queue>,
    metrics: Arc<Metrics>,

    inner: tokio::sync::Mutex<PoolInner>,
    active_workers: AtomicI64,

    // Per-item resource cost, stored atomically so workers read without a lock.
    cpu_per_item_nanos: AtomicI64,
    memory_per_item: AtomicI64,
}

impl WorkerPool {
    /// Create a worker pool for the given queue.
    pub fn new(queue: Arc<Queue>, metrics: Arc<Metrics>) -> Self {
        Self {
            queue,
            metrics,
            inner: tokio::sync::Mutex::default(),
            active_workers: AtomicI64::new(0),
            cpu_per_item_nanos: AtomicI64::new(0),
            memory_per_item: AtomicI64::new(0),
        }
    }

    /// Launch workers to process queue items, stopping any prior set first.
    /// Workers stop when the parent token is cancelled or `stop` is called.
    pub async fn start(
        self: &Arc<Self>,
        parent: &CancellationToken,
        worker_count: usize,
        cpu_per_item: Duration,
        memory_per_item: i64,
    ) {
        self.stop().await;

        let mut inner = self.inner.lock().await;

        self.cpu_per_item_nanos
            .store(cpu_per_item.as_nanos() as i64, Ordering::Relaxed);
        self.memory_per_item
            .store(memory_per_item, Ordering::Relaxed);

        let token = parent.child_token();
        for id in 0..worker_count {
            let pool = self.clone();
            let worker_token = token.clone();
            inner
                .handles
                .push(tokio::spawn(async move { pool.worker(worker_token, id).await }));
        }
        inner.token = Some(token);

        info!(
            workers = worker_count,
            cpu_per_item = ?cpu_per_item,
            memory_per_item,
            "worker pool started"
        );
    }

    /// Gracefully stop all workers, joining them before returning. Safe to
    /// call when the pool is not running.
    pub async fn stop(&self) {
        let (token, handles) = {
            let mut inner = self.inner.lock().await;
            (inner.token.take(), std::mem::take(&mut inner.handles))
        };

        let Some(token) = token else { return };
        token.cancel();
        for handle in handles {
            let _ = handle.await;
        }
        info!("worker pool stopped");
    }

    /// Number of workers currently processing an item.
    pub fn active_workers(&self) -> i64 {
        self.active_workers.load(Ordering::Relaxed)
    }

    async fn worker(self: Arc<Self>, token: CancellationToken, id: usize) {
        debug!(worker_id = id, "worker started");

        loop {
            if token.is_cancelled() {
                debug!(worker_id = id, "worker stopping");
                return;
            }

            let item = match self.queue.dequeue() {
                Some(item) => item,
                None => {
                    // Queue is empty or paused, wait a bit.
                    tokio::select! {
                        _ = token.cancelled() => return,
                        _ = tokio::time::sleep(IDLE_WAIT) => {}
                    }
                    continue;
                }
            };

            self.active_workers.fetch_add(1, Ordering::Relaxed);
            self.metrics
                .queue_active_workers
                .set(self.active_workers());

            self.process_item(&token, item).await;

            self.active_workers.fetch_sub(1, Ordering::Relaxed);
            self.metrics
                .queue_active_workers
                .set(self.active_workers());
        }
    }

    async fn process_item(&self, token: &CancellationToken, item: crate::queue::Item) {
        let start = Instant::now();

        let processing_time = if item.processing_time.is_zero() {
            DEFAULT_PROCESSING_TIME
        } else {
            item.processing_time
        };

        let memory_per_item = self.memory_per_item.load(Ordering::Relaxed);
        let cpu_per_item =
            Duration::from_nanos(self.cpu_per_item_nanos.load(Ordering::Relaxed).max(0) as u64);

        // Allocate and touch per-item memory; an untouched allocation is not
        // guaranteed to occupy RSS.
        let mem_sink = if memory_per_item > 0 {
            let size = memory_per_item as usize;
            tokio::task::spawn_blocking(move || {
                let mut buf = vec![0u8; size];
                for (i, b) in buf.iter_mut().enumerate() {
                    *b = i as u8;
                }
                buf
            })
            .await
            .ok()
        } else {
            None
        };

        if !cpu_per_item.is_zero() {
            let burn_token = token.clone();
            let cancelled = tokio::task::spawn_blocking(move || {
                let deadline = std::time::Instant::now() + cpu_per_item;
                while std::time::Instant::now() < deadline {
                    if burn_token.is_cancelled() {
                        return true;
                    }
                    for i in 0..1000u64 {
                        std::hint::black_box(i.wrapping_mul(i));
                    }
                }
                false
            })
            .await
            .unwrap_or(false);

            if cancelled {
                self.queue.mark_failed();
                return;
            }
        }

        // Sleep out the remainder of the simulated processing time.
        let remaining = processing_time.saturating_sub(start.elapsed());
        if !remaining.is_zero() {
            tokio::select! {
                _ = token.cancelled() => {
                    self.queue.mark_failed();
                    return;
                }
                _ = tokio::time::sleep(remaining) => {}
            }
        }

        // The memory buffer stays alive until after the processing sleep.
        drop(mem_sink);

        self.queue.mark_processed();
        self.metrics
            .queue_processing_seconds
            .observe(start.elapsed().as_secs_f64());

        debug!(
            item_id = %item.id,
            priority = item.priority.as_str(),
            duration = ?start.elapsed(),
            "item processed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{Item, Priority};

    fn fixture() -> (Arc<Queue>, Arc<WorkerPool>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        let queue = Arc::new(Queue::new(1000, metrics.clone()));
        let pool = Arc::new(WorkerPool::new(queue.clone(), metrics));
        (queue, pool)
    }

    fn enqueue_items(queue: &Queue, count: usize, processing_time: Duration) {
        for i in 0..count {
            queue
                .enqueue(Item {
                    id: format!("item-{i}"),
                    priority: Priority::Normal,
                    processing_time,
                    enqueued_at: Instant::now(),
                })
                .unwrap();
        }
    }

    async fn wait_until(deadline: Duration, mut check: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn processes_all_items() {
        let (queue, pool) = fixture();
        enqueue_items(&queue, 5, Duration::from_millis(10));

        let token = CancellationToken::new();
        pool.start(&token, 2, Duration::ZERO, 0).await;

        let done = wait_until(Duration::from_secs(5), || {
            queue.stats().processed_total == 5
        })
        .await;
        assert!(done, "workers did not drain the queue");
        assert_eq!(queue.depth(), 0);

        pool.stop().await;
        assert_eq!(pool.active_workers(), 0);
    }

    #[tokio::test]
    async fn restart_replaces_the_worker_set() {
        let (queue, pool) = fixture();
        enqueue_items(&queue, 10, Duration::from_millis(50));

        let token = CancellationToken::new();
        pool.start(&token, 1, Duration::ZERO, 0).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Restart with more workers; the single worker is stopped first.
        pool.start(&token, 4, Duration::ZERO, 0).await;

        let done = wait_until(Duration::from_secs(5), || {
            let stats = queue.stats();
            stats.processed_total + stats.failed_total == 10
        })
        .await;
        assert!(done, "restarted pool did not finish the backlog");

        // Only the latest set exists; at most 4 were ever active at once.
        assert!(pool.active_workers() <= 4);
        pool.stop().await;
        assert_eq!(pool.active_workers(), 0);
    }

    #[tokio::test]
    async fn stop_without_start_is_safe() {
        let (_queue, pool) = fixture();
        pool.stop().await;
        pool.stop().await;
    }

    #[tokio::test]
    async fn cancellation_mid_item_marks_failed() {
        let (queue, pool) = fixture();
        enqueue_items(&queue, 1, Duration::from_secs(30));

        let token = CancellationToken::new();
        pool.start(&token, 1, Duration::ZERO, 0).await;

        let picked_up = wait_until(Duration::from_secs(2), || pool.active_workers() == 1).await;
        assert!(picked_up, "worker never picked up the item");

        pool.stop().await;
        assert_eq!(queue.stats().failed_total, 1);
        assert_eq!(queue.stats().processed_total, 0);
    }

    #[tokio::test]
    async fn parent_token_cancellation_stops_workers() {
        let (queue, pool) = fixture();
        enqueue_items(&queue, 1, Duration::from_secs(30));

        let token = CancellationToken::new();
        pool.start(&token, 2, Duration::ZERO, 0).await;
        let picked_up = wait_until(Duration::from_secs(2), || pool.active_workers() >= 1).await;
        assert!(picked_up);

        token.cancel();
        let idle = wait_until(Duration::from_secs(2), || pool.active_workers() == 0).await;
        assert!(idle, "workers survived parent cancellation");
    }

    #[tokio::test]
    async fn memory_and_cpu_costs_are_applied() {
        let (queue, pool) = fixture();
        enqueue_items(&queue, 2, Duration::from_millis(1));

        let token = CancellationToken::new();
        pool.start(&token, 1, Duration::from_millis(5), 64 * 1024).await;

        let done = wait_until(Duration::from_secs(5), || {
            queue.stats().processed_total == 2
        })
        .await;
        assert!(done);
        pool.stop().await;
    }
}

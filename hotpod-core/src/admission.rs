//! Concurrency admission tracking.
//!
//! Caps the number of simultaneous operations per class with a lock-free
//! compare-and-swap loop. Classes are independent: saturating the CPU class
//! never blocks memory operations.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use thiserror::Error;

/// Coarse operation classes used for admission control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpClass {
    Cpu,
    Memory,
    Io,
    Latency,
    Work,
}

impl OpClass {
    pub const ALL: [OpClass; 5] = [
        OpClass::Cpu,
        OpClass::Memory,
        OpClass::Io,
        OpClass::Latency,
        OpClass::Work,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpClass::Cpu => "cpu",
            OpClass::Memory => "memory",
            OpClass::Io => "io",
            OpClass::Latency => "latency",
            OpClass::Work => "work",
        }
    }

    fn index(&self) -> usize {
        match self {
            OpClass::Cpu => 0,
            OpClass::Memory => 1,
            OpClass::Io => 2,
            OpClass::Latency => 3,
            OpClass::Work => 4,
        }
    }
}

impl fmt::Display for OpClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when the concurrent operation limit is exceeded.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("too many concurrent operations")]
pub struct TooManyOps;

/// Tracks concurrent operations and enforces per-class limits.
pub struct AdmissionTracker {
    /// Maximum concurrent operations per class (<= 0 means unlimited)
    max_ops: i64,
    counts: [AtomicI64; 5],
}

/// Guard for an admitted operation; releases its slot exactly once on drop.
#[derive(Debug)]
pub struct OpGuard<'a> {
    counter: &'a AtomicI64,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AdmissionTracker {
    /// Create a tracker with the given per-class cap.
    pub fn new(max_ops: i64) -> Self {
        Self {
            max_ops,
            counts: Default::default(),
        }
    }

    /// Attempt to start an operation of the given class. Returns a guard on
    /// success, or [`TooManyOps`] once the class is at its cap.
    pub fn acquire(&self, class: OpClass) -> Result<OpGuard<'_>, TooManyOps> {
        let counter = &self.counts[class.index()];

        loop {
            let current = counter.load(Ordering::SeqCst);
            if self.max_ops > 0 && current >= self.max_ops {
                return Err(TooManyOps);
            }

            if counter
                .compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return Ok(OpGuard { counter });
            }
        }
    }

    /// Current operation count for the given class.
    pub fn count(&self, class: OpClass) -> i64 {
        self.counts[class.index()].load(Ordering::SeqCst)
    }

    /// Snapshot of all current operation counts.
    pub fn counts(&self) -> Vec<(OpClass, i64)> {
        OpClass::ALL
            .iter()
            .map(|class| (*class, self.count(*class)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn acquire_and_release() {
        let tracker = AdmissionTracker::new(10);

        let guard = tracker.acquire(OpClass::Cpu).unwrap();
        assert_eq!(tracker.count(OpClass::Cpu), 1);
        drop(guard);
        assert_eq!(tracker.count(OpClass::Cpu), 0);
    }

    #[test]
    fn cap_is_enforced() {
        let tracker = AdmissionTracker::new(2);

        let _a = tracker.acquire(OpClass::Cpu).unwrap();
        let _b = tracker.acquire(OpClass::Cpu).unwrap();
        assert_eq!(tracker.acquire(OpClass::Cpu).unwrap_err(), TooManyOps);
        assert_eq!(tracker.count(OpClass::Cpu), 2);
    }

    #[test]
    fn classes_are_independent() {
        let tracker = AdmissionTracker::new(1);

        let _cpu = tracker.acquire(OpClass::Cpu).unwrap();
        assert!(tracker.acquire(OpClass::Cpu).is_err());
        // Exhausting CPU does not block memory.
        let _mem = tracker.acquire(OpClass::Memory).unwrap();
        assert_eq!(tracker.count(OpClass::Memory), 1);
    }

    #[test]
    fn non_positive_cap_is_unlimited() {
        let tracker = AdmissionTracker::new(0);
        let guards: Vec<_> = (0..500)
            .map(|_| tracker.acquire(OpClass::Io).unwrap())
            .collect();
        assert_eq!(tracker.count(OpClass::Io), 500);
        drop(guards);
        assert_eq!(tracker.count(OpClass::Io), 0);
    }

    #[test]
    fn count_never_exceeds_cap_under_contention() {
        let tracker = Arc::new(AdmissionTracker::new(8));
        let mut handles = Vec::new();

        for _ in 0..16 {
            let tracker = tracker.clone();
            handles.push(std::thread::spawn(move || {
                let mut admitted = 0u32;
                for _ in 0..1000 {
                    if let Ok(guard) = tracker.acquire(OpClass::Work) {
                        let observed = tracker.count(OpClass::Work);
                        assert!(observed <= 8, "count {observed} exceeded cap");
                        admitted += 1;
                        drop(guard);
                    }
                }
                admitted
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert!(total > 0);
        // All guards dropped; every class back to zero.
        assert_eq!(tracker.count(OpClass::Work), 0);
    }
}

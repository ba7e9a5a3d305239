//! Memory hold executor.
//!
//! Allocates a buffer, fills it so the OS actually backs it with pages,
//! then holds it for the requested duration or until cancellation.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::RngCore;
use tokio_util::sync::CancellationToken;

/// Fill pattern for allocated memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Rely on zero-initialized allocation
    Zero,
    /// PRNG bytes
    Random,
    /// Each byte holds its index modulo 256
    Sequential,
}

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Zero => "zero",
            Pattern::Random => "random",
            Pattern::Sequential => "sequential",
        }
    }
}

impl FromStr for Pattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(Pattern::Zero),
            "random" => Ok(Pattern::Random),
            "sequential" => Ok(Pattern::Sequential),
            _ => Err("pattern must be zero, random, or sequential".to_string()),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allocate `size` bytes, fill them per `pattern`, and hold the buffer for
/// `duration`. Returns true if the hold was cancelled early. The buffer is
/// released when this function returns, on every path.
pub async fn hold(
    token: &CancellationToken,
    size: i64,
    duration: Duration,
    pattern: Pattern,
) -> bool {
    let size = size.max(0) as usize;

    // Fill off the async runtime; large buffers take a while to touch.
    let buf = tokio::task::spawn_blocking(move || {
        let mut data = vec![0u8; size];
        fill(&mut data, pattern);
        data
    })
    .await
    .unwrap_or_default();

    let cancelled = tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = token.cancelled() => true,
    };

    drop(buf);
    cancelled
}

/// Fill the buffer according to the pattern.
pub(crate) fn fill(data: &mut [u8], pattern: Pattern) {
    match pattern {
        Pattern::Zero => {
            // Already zero-initialized.
        }
        Pattern::Random => {
            rand::thread_rng().fill_bytes(data);
        }
        Pattern::Sequential => {
            for (i, b) in data.iter_mut().enumerate() {
                *b = i as u8;
            }
        }
    }
}

//! File I/O executor.
//!
//! Works against a unique temp file in the configured directory, in 64 KiB
//! blocks with a cancellation check between blocks. The temp file is
//! removed on every exit path, including mid-operation drops. Internal I/O
//! errors are logged and produce zeroed counters; they are not surfaced to
//! the caller as request errors.

use std::fmt;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::Rng;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use super::memory::{fill, Pattern};

/// Block size for I/O operations.
const BLOCK_SIZE: usize = 64 * 1024;

/// I/O operation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Write,
    Read,
    /// Alternate writing a block and reading it back
    Mixed,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Write => "write",
            Operation::Read => "read",
            Operation::Mixed => "mixed",
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "write" => Ok(Operation::Write),
            "read" => Ok(Operation::Read),
            "mixed" => Ok(Operation::Mixed),
            _ => Err("operation must be write, read, or mixed".to_string()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an I/O run.
#[derive(Debug, Clone, Copy, Default)]
pub struct IoOutcome {
    pub bytes_written: i64,
    pub bytes_read: i64,
    pub cancelled: bool,
}

/// Removes the temp file when dropped, whatever path got us here.
struct TempFileGuard {
    path: PathBuf,
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(file = %self.path.display(), error = %e, "failed to remove temp file");
            }
        }
    }
}

/// Perform `size` bytes of file I/O in the given directory.
pub async fn run(
    token: &CancellationToken,
    dir: &Path,
    size: i64,
    operation: Operation,
    sync: bool,
) -> IoOutcome {
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        error!(path = %dir.display(), error = %e, "failed to create I/O directory");
        return IoOutcome::default();
    }

    let filename = dir.join(format!(
        "hotpod-{}-{}.tmp",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        rand::thread_rng().gen::<u64>(),
    ));
    let _guard = TempFileGuard {
        path: filename.clone(),
    };

    let mut outcome = IoOutcome::default();
    match operation {
        Operation::Write => {
            (outcome.bytes_written, outcome.cancelled) =
                write_file(token, &filename, size, sync).await;
        }
        Operation::Read => {
            (outcome.bytes_written, outcome.cancelled) =
                write_file(token, &filename, size, false).await;
            if !outcome.cancelled {
                (outcome.bytes_read, outcome.cancelled) = read_file(token, &filename, size).await;
            }
        }
        Operation::Mixed => {
            outcome = mixed_io(token, &filename, size, sync).await;
        }
    }

    outcome
}

async fn write_file(
    token: &CancellationToken,
    filename: &Path,
    size: i64,
    sync: bool,
) -> (i64, bool) {
    let mut file = match File::create(filename).await {
        Ok(f) => f,
        Err(e) => {
            error!(file = %filename.display(), error = %e, "failed to create file");
            return (0, false);
        }
    };

    let mut block = vec![0u8; BLOCK_SIZE];
    fill(&mut block, Pattern::Random);

    let mut written: i64 = 0;
    let mut remaining = size;
    while remaining > 0 {
        if token.is_cancelled() {
            return (written, true);
        }

        let to_write = (BLOCK_SIZE as i64).min(remaining) as usize;
        if let Err(e) = file.write_all(&block[..to_write]).await {
            error!(file = %filename.display(), error = %e, "failed to write to file");
            return (written, false);
        }
        written += to_write as i64;
        remaining -= to_write as i64;
    }

    if sync {
        if let Err(e) = file.sync_all().await {
            error!(file = %filename.display(), error = %e, "failed to sync file");
        }
    }

    (written, false)
}

async fn read_file(token: &CancellationToken, filename: &Path, size: i64) -> (i64, bool) {
    let mut file = match File::open(filename).await {
        Ok(f) => f,
        Err(e) => {
            error!(file = %filename.display(), error = %e, "failed to open file for reading");
            return (0, false);
        }
    };

    let mut block = vec![0u8; BLOCK_SIZE];
    let mut read: i64 = 0;
    let mut remaining = size;
    while remaining > 0 {
        if token.is_cancelled() {
            return (read, true);
        }

        let to_read = (BLOCK_SIZE as i64).min(remaining) as usize;
        match file.read(&mut block[..to_read]).await {
            Ok(0) => break,
            Ok(n) => {
                read += n as i64;
                remaining -= n as i64;
            }
            Err(e) => {
                error!(file = %filename.display(), error = %e, "failed to read from file");
                break;
            }
        }
    }

    (read, false)
}

async fn mixed_io(
    token: &CancellationToken,
    filename: &Path,
    size: i64,
    sync: bool,
) -> IoOutcome {
    let mut file = match OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(filename)
        .await
    {
        Ok(f) => f,
        Err(e) => {
            error!(file = %filename.display(), error = %e, "failed to create file for mixed I/O");
            return IoOutcome::default();
        }
    };

    let mut write_block = vec![0u8; BLOCK_SIZE];
    fill(&mut write_block, Pattern::Random);
    let mut read_block = vec![0u8; BLOCK_SIZE];

    let mut outcome = IoOutcome::default();
    let mut remaining = size;
    let mut write_phase = true;

    while remaining > 0 {
        if token.is_cancelled() {
            outcome.cancelled = true;
            return outcome;
        }

        let block_size = (BLOCK_SIZE as i64).min(remaining) as usize;

        if write_phase {
            if let Err(e) = file.write_all(&write_block[..block_size]).await {
                error!(file = %filename.display(), error = %e, "failed to write in mixed mode");
                return outcome;
            }
            outcome.bytes_written += block_size as i64;
            remaining -= block_size as i64;

            if sync {
                if let Err(e) = file.sync_all().await {
                    error!(file = %filename.display(), error = %e, "failed to sync in mixed mode");
                }
            }
        } else {
            // Seek back to read the block just written.
            if let Err(e) = file.seek(SeekFrom::Current(-(block_size as i64))).await {
                error!(file = %filename.display(), error = %e, "failed to seek for read in mixed mode");
                return outcome;
            }

            match file.read_exact(&mut read_block[..block_size]).await {
                Ok(_) => outcome.bytes_read += block_size as i64,
                Err(e) => {
                    error!(file = %filename.display(), error = %e, "failed to read in mixed mode");
                    return outcome;
                }
            }

            // Back to the end to continue writing.
            if let Err(e) = file.seek(SeekFrom::End(0)).await {
                error!(file = %filename.display(), error = %e, "failed to seek to end in mixed mode");
                return outcome;
            }
        }

        write_phase = !write_phase;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hotpod-io-test-{name}-{}", std::process::id()))
    }

    fn leftover_files(dir: &Path) -> usize {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    #[tokio::test]
    async fn write_produces_the_requested_bytes() {
        let dir = test_dir("write");
        let token = CancellationToken::new();

        let outcome = run(&token, &dir, 200 * 1024, Operation::Write, false).await;
        assert_eq!(outcome.bytes_written, 200 * 1024);
        assert_eq!(outcome.bytes_read, 0);
        assert!(!outcome.cancelled);
        assert_eq!(leftover_files(&dir), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn read_mode_writes_then_reads_back() {
        let dir = test_dir("read");
        let token = CancellationToken::new();

        let outcome = run(&token, &dir, 100 * 1024, Operation::Read, false).await;
        assert_eq!(outcome.bytes_written, 100 * 1024);
        assert_eq!(outcome.bytes_read, 100 * 1024);
        assert_eq!(leftover_files(&dir), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn mixed_mode_alternates_and_syncs() {
        let dir = test_dir("mixed");
        let token = CancellationToken::new();

        let outcome = run(&token, &dir, 256 * 1024, Operation::Mixed, true).await;
        // Every block is written; read-backs trail the writes by one block.
        assert_eq!(outcome.bytes_written, 256 * 1024);
        assert_eq!(outcome.bytes_read, 192 * 1024);
        assert_eq!(leftover_files(&dir), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn cancellation_still_removes_the_temp_file() {
        let dir = test_dir("cancel");
        let token = CancellationToken::new();
        token.cancel();

        let outcome = run(&token, &dir, 10 << 20, Operation::Write, false).await;
        assert!(outcome.cancelled);
        assert_eq!(leftover_files(&dir), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unwritable_directory_yields_zeroed_counters() {
        let token = CancellationToken::new();
        // A path under a file cannot be created.
        let bogus = PathBuf::from("/dev/null/hotpod");

        let outcome = run(&token, &bogus, 1024, Operation::Write, false).await;
        assert_eq!(outcome.bytes_written, 0);
        assert_eq!(outcome.bytes_read, 0);
        assert!(!outcome.cancelled);
    }

    #[tokio::test]
    async fn zero_size_is_a_no_op() {
        let dir = test_dir("zero");
        let token = CancellationToken::new();

        let outcome = run(&token, &dir, 0, Operation::Write, false).await;
        assert_eq!(outcome.bytes_written, 0);
        assert_eq!(leftover_files(&dir), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}

//! Process memory statistics, read from /proc on Linux.

/// Point-in-time process memory stats, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Resident set size
    pub rss_bytes: u64,
    /// Virtual memory size
    pub vsize_bytes: u64,
    /// Number of OS threads
    pub threads: u64,
}

/// Snapshot current process memory usage. Returns zeroed stats on platforms
/// without /proc.
#[cfg(target_os = "linux")]
pub fn memory_stats() -> MemoryStats {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
        return MemoryStats::default();
    };

    let mut stats = MemoryStats::default();
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            stats.rss_bytes = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("VmSize:") {
            stats.vsize_bytes = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("Threads:") {
            stats.threads = rest.trim().parse().unwrap_or(0);
        }
    }
    stats
}

#[cfg(not(target_os = "linux"))]
pub fn memory_stats() -> MemoryStats {
    MemoryStats::default()
}

/// Ask the allocator to return free memory to the OS. Only effective on
/// glibc; elsewhere this is a no-op. Returns whether a trim was attempted.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
pub fn release_memory() -> bool {
    // SAFETY: malloc_trim has no preconditions; 0 trims the whole heap.
    unsafe { libc::malloc_trim(0) };
    true
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
pub fn release_memory() -> bool {
    false
}

#[cfg(target_os = "linux")]
fn parse_kb(s: &str) -> u64 {
    s.trim()
        .trim_end_matches("kB")
        .trim()
        .parse::<u64>()
        .unwrap_or(0)
        * 1024
}

//! Workload executors: the code that actually consumes CPU, memory and I/O.
//!
//! Executors are stateless async functions parameterized by request inputs
//! and a cancellation token. Buffers and file handles live only for the
//! duration of one call and are released on every exit path.

pub mod cpu;
pub mod io;
pub mod latency;
pub mod memory;
pub mod work;

pub use cpu::{burn, BurnOutcome, Intensity};
pub use io::{IoOutcome, Operation};
pub use latency::sleep_for;
pub use memory::{hold, Pattern};
pub use work::{apply_variance, apply_variance_size, profile, WorkOutcome, WorkProfile};

//! Centralized timeout and retry policies for the viewer read path.
//!
//! Keeping these values in one place makes it clear that liveness probes and
//! read sessions share the same deadline, and gives us a single knob to turn
//! if we need to tighten or relax limits.

use std::time::Duration;

/// Connect and read deadline for data-transfer sockets.
pub const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Liveness probes use the same deadline as real reads.
pub const PROBE_TIMEOUT: Duration = READ_TIMEOUT;

/// Transient read failures tolerated per streaming call.
pub const DEFAULT_READ_RETRIES: u32 = 2;

/// Default number of block bytes shown per viewer page.
pub const DEFAULT_CHUNK_SIZE_TO_VIEW: u64 = 32 * 1024;

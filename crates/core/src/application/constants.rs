// Polling/dispatch constants (no magic values)
use std::time::Duration;

/// Upper bound for a single poll run before its process group is killed (10s)
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for a dispatched command (30s)
/// `systemctl`/`loginctl` calls can block on polkit prompts
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Time between SIGTERM and SIGKILL when terminating a timed-out child (2s)
pub const KILL_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Time the daemon waits for pollers to stop on shutdown (5s)
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Buffered poll change notifications before forwarders apply backpressure
pub const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Maximum stderr characters carried into a dispatch failure log line
pub const MAX_LOGGED_STDERR_CHARS: usize = 512;

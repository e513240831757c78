// Command Runner Port
// Abstraction over "hand this shell text to a shell and collect the result"

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A single shell execution request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Shell text, passed verbatim to `<shell> -c`
    pub script: String,
    /// Run under `set -euo pipefail` (abort on first error, unset vars fail)
    pub strict: bool,
    /// Kill the process group if it runs longer than this
    pub timeout: Option<Duration>,
}

impl CommandRequest {
    /// Poll snippet: strict mode, bounded runtime
    pub fn poll(script: impl Into<String>, timeout: Duration) -> Self {
        Self {
            script: script.into(),
            strict: true,
            timeout: Some(timeout),
        }
    }

    /// Dispatched action: plain shell semantics, bounded runtime
    pub fn dispatch(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            script: command.into(),
            strict: false,
            timeout: Some(timeout),
        }
    }
}

/// Result of a completed execution (never stored, only inspected)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// None when terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: i64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Execution errors (the process did not run to completion)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process timeout after {0}ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Command Runner trait
///
/// Implementations:
/// - ShellCommandRunner (infra-system): spawns `<shell> -c <script>`
/// - mocks::MockCommandRunner: scripted responses for tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a request to completion
    ///
    /// A non-zero exit is NOT an error here; it is reported through
    /// `CommandOutput::exit_code`. Errors mean the process could not be
    /// started, was killed, or exceeded its timeout.
    async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with the given code and stdout
        Exit { code: i32, stdout: String },
        /// Return an execution error
        Error(ExecutionError),
    }

    impl MockBehavior {
        pub fn stdout(stdout: impl Into<String>) -> Self {
            MockBehavior::Exit {
                code: 0,
                stdout: stdout.into(),
            }
        }

        pub fn exit(code: i32) -> Self {
            MockBehavior::Exit {
                code,
                stdout: String::new(),
            }
        }

        fn into_result(self) -> Result<CommandOutput, ExecutionError> {
            match self {
                MockBehavior::Exit { code, stdout } => Ok(CommandOutput {
                    exit_code: Some(code),
                    stdout,
                    stderr: if code == 0 {
                        String::new()
                    } else {
                        format!("mock exit {}", code)
                    },
                    duration_ms: 1,
                }),
                MockBehavior::Error(e) => Err(e),
            }
        }
    }

    /// Mock Command Runner for testing
    ///
    /// Resolution order per request: first route whose key is contained in
    /// the script, then the queued behaviors (FIFO), then the default.
    pub struct MockCommandRunner {
        routes: Mutex<Vec<(String, MockBehavior)>>,
        queue: Mutex<VecDeque<MockBehavior>>,
        default: MockBehavior,
        delay: Option<Duration>,
        calls: Mutex<Vec<CommandRequest>>,
    }

    impl MockCommandRunner {
        pub fn new(default: MockBehavior) -> Self {
            Self {
                routes: Mutex::new(Vec::new()),
                queue: Mutex::new(VecDeque::new()),
                default,
                delay: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success(stdout: impl Into<String>) -> Self {
            Self::new(MockBehavior::stdout(stdout))
        }

        pub fn new_exit(code: i32) -> Self {
            Self::new(MockBehavior::exit(code))
        }

        /// Sleep before answering each request
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Answer scripts containing `key` with `behavior`
        pub fn route(self, key: impl Into<String>, behavior: MockBehavior) -> Self {
            self.routes.lock().unwrap().push((key.into(), behavior));
            self
        }

        /// Queue a one-shot behavior for the next unrouted request
        pub fn push(&self, behavior: MockBehavior) {
            self.queue.lock().unwrap().push_back(behavior);
        }

        /// Replace the behavior of an existing route
        pub fn set_route(&self, key: &str, behavior: MockBehavior) {
            let mut routes = self.routes.lock().unwrap();
            match routes.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = behavior,
                None => routes.push((key.to_string(), behavior)),
            }
        }

        pub fn calls(&self) -> Vec<CommandRequest> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Number of requests whose script contains `key`
        pub fn calls_matching(&self, key: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.script.contains(key))
                .count()
        }

        fn resolve(&self, request: &CommandRequest) -> MockBehavior {
            let routed = self
                .routes
                .lock()
                .unwrap()
                .iter()
                .find(|(key, _)| request.script.contains(key.as_str()))
                .map(|(_, behavior)| behavior.clone());

            routed
                .or_else(|| self.queue.lock().unwrap().pop_front())
                .unwrap_or_else(|| self.default.clone())
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, ExecutionError> {
            self.calls.lock().unwrap().push(request.clone());
            let behavior = self.resolve(request);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            behavior.into_result()
        }
    }
}

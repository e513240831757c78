// dashpanel Infrastructure - System Adapters
// Implements: CommandRunner (shell), ToolProbe (PATH lookup)

pub mod shell_runner;
pub mod tool_probe_impl;

pub use shell_runner::ShellCommandRunner;
pub use tool_probe_impl::PathToolProbe;

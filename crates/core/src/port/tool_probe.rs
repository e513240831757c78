// Tool Probe Port
// Locates the external utilities widget snippets shell out to

use std::path::PathBuf;

/// Tool availability lookup
///
/// Missing tools never fail a mount (snippets fall back on their own); the
/// probe only feeds warnings and `dashpanel doctor`.
pub trait ToolProbe: Send + Sync {
    /// Resolve a tool name to the executable that would run
    fn locate(&self, tool: &str) -> Option<PathBuf>;

    /// Subset of `tools` that cannot be located
    fn missing(&self, tools: &[String]) -> Vec<String> {
        tools
            .iter()
            .filter(|tool| self.locate(tool).is_none())
            .cloned()
            .collect()
    }
}

pub mod mocks {
    use super::*;
    use std::collections::HashSet;

    /// Probe that knows a fixed set of installed tools
    pub struct StaticToolProbe {
        installed: HashSet<String>,
    }

    impl StaticToolProbe {
        pub fn new(installed: &[&str]) -> Self {
            Self {
                installed: installed.iter().map(|t| t.to_string()).collect(),
            }
        }
    }

    impl ToolProbe for StaticToolProbe {
        fn locate(&self, tool: &str) -> Option<PathBuf> {
            self.installed
                .contains(tool)
                .then(|| PathBuf::from("/usr/bin").join(tool))
        }
    }

}

// PATH-based tool probe
use std::path::{Path, PathBuf};

use dashpanel_core::port::ToolProbe;

/// Resolves tools the way the shell would: first executable match on PATH
pub struct PathToolProbe {
    dirs: Vec<PathBuf>,
}

impl PathToolProbe {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Probe the current process `PATH`
    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).collect())
            .unwrap_or_default();
        Self::new(dirs)
    }
}

impl ToolProbe for PathToolProbe {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        if tool.contains('/') {
            let path = PathBuf::from(tool);
            return is_executable(&path).then_some(path);
        }

        self.dirs
            .iter()
            .map(|dir| dir.join(tool))
            .find(|candidate| is_executable(candidate))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locates_shell_on_path() {
        let probe = PathToolProbe::from_env();
        let sh = probe.locate("sh").expect("sh should be on PATH");
        assert!(sh.ends_with("sh"));
    }

    #[test]
    fn test_unknown_tool_is_missing() {
        let probe = PathToolProbe::from_env();
        let tools = vec!["sh".to_string(), "dashpanel-no-such-tool".to_string()];
        assert_eq!(probe.missing(&tools), vec!["dashpanel-no-such-tool".to_string()]);
    }

    #[test]
    fn test_empty_path_finds_nothing_but_absolute_paths() {
        let probe = PathToolProbe::new(Vec::new());
        assert!(probe.locate("sh").is_none());
        assert!(probe.locate("/bin/sh").is_some());
    }

    #[test]
    fn test_directories_and_non_executables_are_skipped() {
        let probe = PathToolProbe::new(vec![PathBuf::from("/")]);
        // /etc is a directory, not a tool
        assert!(probe.locate("etc").is_none());
        assert!(probe.locate("/etc/hostname").is_none());
    }
}

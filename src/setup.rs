use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;

/// Name of the per-project state directory (logs, history).
pub const STATE_DIR: &str = ".setm";

pub struct SetupManager {
    setm_dir: PathBuf,
}

/// Whether an external collaborator can be used.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyStatus {
    pub name: String,
    pub available: bool,
    /// Version line when available, error text otherwise
    pub detail: String,
}

impl DependencyStatus {
    pub fn from_result<T: std::fmt::Display, E: std::fmt::Display>(
        name: &str,
        result: std::result::Result<T, E>,
    ) -> Self {
        match result {
            Ok(detail) => Self {
                name: name.to_string(),
                available: true,
                detail: detail.to_string(),
            },
            Err(e) => Self {
                name: name.to_string(),
                available: false,
                detail: e.to_string(),
            },
        }
    }
}

impl SetupManager {
    /// Create the state directory structure under `base` if it doesn't exist
    pub fn new<P: AsRef<Path>>(base: P) -> Result<Self> {
        let setm_dir = base.as_ref().join(STATE_DIR);
        fs::create_dir_all(setm_dir.join("log"))?;
        Ok(Self { setm_dir })
    }

    pub fn setm_dir(&self) -> &Path {
        &self.setm_dir
    }

    pub fn log_dir(&self) -> PathBuf {
        self.setm_dir.join("log")
    }

    /// Print a dependency table and return whether everything is usable
    pub fn print_report(&self, statuses: &[DependencyStatus]) -> bool {
        println!("\nExternal Dependencies:");
        println!("{:<12} {:<10} {:<50}", "Name", "Status", "Detail");
        println!("{}", "-".repeat(72));

        for status in statuses {
            let state = if status.available { "OK" } else { "Missing" };
            let detail = status.detail.lines().next().unwrap_or("");
            println!("{:<12} {:<10} {:<50}", status.name, state, detail);
        }

        let all_ok = statuses.iter().all(|s| s.available);
        info!("Dependency check finished: {}", if all_ok { "all available" } else { "some missing" });
        all_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_state_dirs() {
        let dir = assert_fs::TempDir::new().unwrap();
        let setup = SetupManager::new(dir.path()).unwrap();
        assert!(setup.log_dir().is_dir());
        assert_eq!(setup.setm_dir(), dir.path().join(".setm"));
    }

    #[test]
    fn test_status_from_result() {
        let ok = DependencyStatus::from_result::<_, String>("ffmpeg", Ok("ffmpeg version 6.1"));
        assert!(ok.available);
        assert_eq!(ok.detail, "ffmpeg version 6.1");

        let missing = DependencyStatus::from_result::<String, _>("yt-dlp", Err("not found"));
        assert!(!missing.available);
        assert_eq!(missing.detail, "not found");
    }
}

//! Startup configuration for the server and the safe-rm adapter.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the safe-rm binary to invoke.
pub const SAFE_RM_PATH_ENV: &str = "SAFE_RM_PATH";
/// Environment variable overriding the trash directory location.
pub const TRASH_DIR_ENV: &str = "SAFE_RM_TRASH_DIR";

const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the external safe-rm tool lives, where its trash directory is,
/// and how long a single invocation may run. Built once at startup and
/// passed by value; nothing reads the environment after that.
#[derive(Debug, Clone)]
pub struct Config {
    pub safe_rm_path: PathBuf,
    pub trash_dir: PathBuf,
    pub exec_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::resolve(
            dirs::home_dir(),
            env::var_os(SAFE_RM_PATH_ENV),
            env::var_os(TRASH_DIR_ENV),
        )
    }

    fn resolve(
        home: Option<PathBuf>,
        tool_override: Option<OsString>,
        trash_override: Option<OsString>,
    ) -> Self {
        let home = home.unwrap_or_else(|| PathBuf::from("."));
        let safe_rm_path = tool_override
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("bin").join("safe-rm"));
        let trash_dir = trash_override
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".safe-rm-trash"));

        Self {
            safe_rm_path,
            trash_dir,
            exec_timeout: DEFAULT_EXEC_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_from_home() {
        let config = Config::resolve(Some(PathBuf::from("/home/alice")), None, None);
        assert_eq!(config.safe_rm_path, PathBuf::from("/home/alice/bin/safe-rm"));
        assert_eq!(config.trash_dir, PathBuf::from("/home/alice/.safe-rm-trash"));
        assert_eq!(config.exec_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_win_over_home() {
        let config = Config::resolve(
            Some(PathBuf::from("/home/alice")),
            Some(OsString::from("/opt/safe-rm/bin/safe-rm")),
            Some(OsString::from("/tmp/scratch-trash")),
        );
        assert_eq!(config.safe_rm_path, PathBuf::from("/opt/safe-rm/bin/safe-rm"));
        assert_eq!(config.trash_dir, PathBuf::from("/tmp/scratch-trash"));
    }

    #[test]
    fn missing_home_falls_back_to_cwd() {
        let config = Config::resolve(None, None, None);
        assert_eq!(config.safe_rm_path, PathBuf::from("./bin/safe-rm"));
        assert_eq!(config.trash_dir, PathBuf::from("./.safe-rm-trash"));
    }
}

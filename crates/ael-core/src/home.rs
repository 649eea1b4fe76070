//! Home directory resolution for AEL tooling
//!
//! # Precedence
//!
//! 1. `AEL_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default
//!
//! Integration tests set `AEL_HOME` to a temp directory so the global
//! config and the file-backed configuration admin never touch the real
//! home directory.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the home directory for AEL operations
///
/// # Errors
///
/// Returns an error if `AEL_HOME` is unset (or blank) and the platform
/// home directory cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("AEL_HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().context("Could not determine home directory")
}

/// Directory holding the global config and the default admin store
pub fn config_dir(home: &std::path::Path) -> PathBuf {
    home.join(".config").join("ael")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn with_ael_home<F: FnOnce()>(value: Option<&str>, f: F) {
        let original = env::var("AEL_HOME").ok();
        unsafe {
            match value {
                Some(v) => env::set_var("AEL_HOME", v),
                None => env::remove_var("AEL_HOME"),
            }
        }

        f();

        unsafe {
            match original {
                Some(v) => env::set_var("AEL_HOME", v),
                None => env::remove_var("AEL_HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_ael_home_set() {
        with_ael_home(Some("/custom/home"), || {
            assert_eq!(get_home_dir().unwrap(), PathBuf::from("/custom/home"));
        });
    }

    #[test]
    #[serial]
    fn test_ael_home_blank_uses_platform_default() {
        with_ael_home(Some("   "), || {
            assert_eq!(get_home_dir().unwrap(), dirs::home_dir().unwrap());
        });
    }

    #[test]
    #[serial]
    fn test_ael_home_trims_whitespace() {
        with_ael_home(Some("  /custom/home  "), || {
            assert_eq!(get_home_dir().unwrap(), PathBuf::from("/custom/home"));
        });
    }

    #[test]
    fn test_config_dir_layout() {
        let dir = config_dir(std::path::Path::new("/h"));
        assert_eq!(dir, PathBuf::from("/h/.config/ael"));
    }
}

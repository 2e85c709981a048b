use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::{RC_NAME, RC_VERSION};
use crate::error::{Result, TokenError};

/// Contents of the `~/.stokenrc` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub version: u32,
    pub token: String,
    /// Plain PIN, or the hex-encoded encrypted PIN for password protected tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
}

impl TokenConfig {
    pub fn new(token: String, pin: Option<String>) -> Self {
        TokenConfig {
            version: RC_VERSION,
            token,
            pin,
        }
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .ok_or(TokenError::NoHomeDir)?;
        Ok(PathBuf::from(home).join(RC_NAME))
    }

    fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    pub fn read(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve(path)?;
        debug!(path = %path.display(), "reading rcfile");

        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(TokenError::NotFound(path));
            }
            Err(err) => return Err(err.into()),
        };

        let config = toml::from_str::<TokenConfig>(&data)?;
        if config.version != RC_VERSION {
            warn!(version = config.version, "rcfile version mismatch, ignoring contents");
            return Err(TokenError::TokenVersion);
        }
        Ok(config)
    }

    pub fn write(&self, path: Option<&Path>) -> Result<()> {
        let path = Self::resolve(path)?;
        let serialized = toml::to_string(self)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path)?;
        file.write_all(serialized.as_bytes())?;
        debug!(path = %path.display(), "wrote rcfile");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rc");

        let config = TokenConfig::new("2000123".into(), Some("1234".into()));
        config.write(Some(&path)).unwrap();
        assert_eq!(TokenConfig::read(Some(&path)).unwrap(), config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn pin_is_optional() {
        let config: TokenConfig = toml::from_str("version = 1\ntoken = \"abc\"\n").unwrap();
        assert_eq!(config.pin, None);
        assert!(!toml::to_string(&config).unwrap().contains("pin"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        assert!(matches!(
            TokenConfig::read(Some(&path)),
            Err(TokenError::NotFound(_))
        ));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rc");
        fs::write(&path, "version = 2\ntoken = \"abc\"\n").unwrap();
        assert!(matches!(
            TokenConfig::read(Some(&path)),
            Err(TokenError::TokenVersion)
        ));
    }
}

//! TOML configuration file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Deserialize the TOML file at `path`, or return `T::default()` when the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, and
/// [`ConfigError::Parse`] if its contents do not deserialize into `T`.
pub fn load_config<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq, Eq)]
    #[serde(deny_unknown_fields)]
    struct Sample {
        #[serde(default)]
        names: Vec<String>,
    }

    #[test]
    fn missing_file_yields_default() {
        let tmp = tempfile::tempdir().unwrap();
        let loaded: Sample = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn parses_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sample.toml");
        std::fs::write(&path, "names = [\"a\", \"b\"]\n").unwrap();
        let loaded: Sample = load_config(&path).unwrap();
        assert_eq!(loaded.names, vec!["a", "b"]);
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sample.toml");
        std::fs::write(&path, "nmes = []\n").unwrap();
        let err = load_config::<Sample>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("sample.toml"));
    }

    #[test]
    fn directory_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config::<Sample>(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new_cs();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new_cs();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// A config with no sections; every lookup falls back to defaults.
    pub fn empty() -> Self {
        Self {
            config: Ini::new_cs(),
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::FeatError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[input]
path = data/ES.csv

[moving]
ema_smoothing = 2.5
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("input", "path"),
            Some("data/ES.csv".to_string())
        );
        assert_eq!(adapter.get_double("moving", "ema_smoothing").unwrap(), Some(2.5));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[trend]\nwindows = 10,30\n").unwrap();
        assert_eq!(adapter.get_string("trend", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_double_rejects_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[moving]\nema_smoothing = fast\n").unwrap();
        let err = adapter.get_double("moving", "ema_smoothing").unwrap_err();
        assert!(matches!(err, FeatError::ConfigInvalid { key, .. } if key == "ema_smoothing"));
        assert_eq!(adapter.get_double("moving", "absent").unwrap(), None);
    }

    #[test]
    fn get_usize_list_parses_windows() {
        let adapter =
            FileConfigAdapter::from_string("[trend]\nwindows = 10, 30,60\n").unwrap();
        assert_eq!(
            adapter.get_usize_list("trend", "windows").unwrap(),
            Some(vec![10, 30, 60])
        );
        assert_eq!(adapter.get_usize_list("trend", "absent").unwrap(), None);
    }

    #[test]
    fn get_usize_list_rejects_garbage() {
        let adapter = FileConfigAdapter::from_string("[trend]\nwindows = 10,x\n").unwrap();
        let err = adapter.get_usize_list("trend", "windows").unwrap_err();
        assert!(matches!(err, FeatError::ConfigInvalid { key, .. } if key == "windows"));
    }

    #[test]
    fn blank_list_is_absent() {
        let adapter = FileConfigAdapter::from_string("[returns]\nfuture_periods =\n").unwrap();
        assert_eq!(adapter.get_usize_list("returns", "future_periods").unwrap(), None);
    }

    #[test]
    fn get_double_list() {
        let adapter =
            FileConfigAdapter::from_string("[counter_trend]\nretracements = 0.6,1.0\n").unwrap();
        assert_eq!(
            adapter.get_double_list("counter_trend", "retracements").unwrap(),
            Some(vec![0.6, 1.0])
        );
    }

    #[test]
    fn get_string_list_trims() {
        let adapter = FileConfigAdapter::from_string("[trend]\nma_types = SMA , EMA\n").unwrap();
        assert_eq!(
            adapter.get_string_list("trend", "ma_types"),
            Some(vec!["SMA".to_string(), "EMA".to_string()])
        );
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[output]\npath = /tmp/features.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("output", "path"),
            Some("/tmp/features.csv".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        assert!(FileConfigAdapter::from_file("/nonexistent/path/config.ini").is_err());
    }

    #[test]
    fn empty_config_has_no_values() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("trend", "windows"), None);
    }
}

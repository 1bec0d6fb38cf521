//! Configuration access port trait.

use crate::domain::error::FeatError;
use std::str::FromStr;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// A single number. `Ok(None)` when the key is absent or blank.
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, FeatError> {
        let Some(raw) = self
            .get_string(section, key)
            .filter(|r| !r.trim().is_empty())
        else {
            return Ok(None);
        };
        raw.trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| FeatError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("cannot parse number {:?}", raw.trim()),
            })
    }

    /// Comma-separated window lengths. `Ok(None)` when the key is absent or blank.
    fn get_usize_list(&self, section: &str, key: &str) -> Result<Option<Vec<usize>>, FeatError> {
        parse_list(self.get_string(section, key), section, key)
    }

    fn get_double_list(&self, section: &str, key: &str) -> Result<Option<Vec<f64>>, FeatError> {
        parse_list(self.get_string(section, key), section, key)
    }

    fn get_string_list(&self, section: &str, key: &str) -> Option<Vec<String>> {
        let raw = self.get_string(section, key)?;
        let items: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        (!items.is_empty()).then_some(items)
    }
}

fn parse_list<T: FromStr>(
    raw: Option<String>,
    section: &str,
    key: &str,
) -> Result<Option<Vec<T>>, FeatError> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(|token| {
            token.trim().parse::<T>().map_err(|_| FeatError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("cannot parse list element {:?}", token.trim()),
            })
        })
        .collect::<Result<Vec<T>, FeatError>>()
        .map(Some)
}

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;

use crate::bus::DEFAULT_CAPACITY;
use crate::classifier::TransitionClassifier;
use crate::dispatcher::{Dispatcher, DEFAULT_PUBLISH_TIMEOUT};
use crate::event::RegionsEncoding;
use crate::resolver::{LabelResolver, StringTable};
use crate::sink::PublishSink;
use crate::worker::DEFAULT_QUEUE_CAPACITY;

/// Bridge configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub publish_timeout: Duration,
    pub queue_capacity: usize,
    pub bus_capacity: usize,
    pub regions_encoding: RegionsEncoding,
    pub strings_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            bus_capacity: DEFAULT_CAPACITY,
            regions_encoding: RegionsEncoding::default(),
            strings_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            publish_timeout: match lookup("GEOFENCE_PUBLISH_TIMEOUT_MS") {
                Some(raw) => Duration::from_millis(
                    raw.trim()
                        .parse()
                        .context("GEOFENCE_PUBLISH_TIMEOUT_MS must be a number of milliseconds")?,
                ),
                None => defaults.publish_timeout,
            },
            queue_capacity: match lookup("GEOFENCE_QUEUE_CAPACITY") {
                Some(raw) => parse_capacity("GEOFENCE_QUEUE_CAPACITY", &raw)?,
                None => defaults.queue_capacity,
            },
            bus_capacity: match lookup("GEOFENCE_BUS_CAPACITY") {
                Some(raw) => parse_capacity("GEOFENCE_BUS_CAPACITY", &raw)?,
                None => defaults.bus_capacity,
            },
            regions_encoding: match lookup("GEOFENCE_REGIONS_ENCODING") {
                Some(raw) => raw
                    .parse::<RegionsEncoding>()
                    .map_err(|err| anyhow!(err))
                    .context("GEOFENCE_REGIONS_ENCODING must be `legacy` or `json-array`")?,
                None => defaults.regions_encoding,
            },
            strings_path: lookup("GEOFENCE_STRINGS_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// String table for this configuration: English, plus overrides if configured.
    pub fn string_table(&self) -> Result<StringTable> {
        match &self.strings_path {
            Some(path) => StringTable::from_json_file(path),
            None => Ok(StringTable::english()),
        }
    }

    /// Dispatcher wired with this configuration's encoding and publish bound.
    pub fn dispatcher(
        &self,
        resolver: Arc<dyn LabelResolver>,
        sink: Arc<dyn PublishSink>,
    ) -> Dispatcher {
        let classifier = TransitionClassifier::new(resolver).with_encoding(self.regions_encoding);
        Dispatcher::new(classifier, sink).with_publish_timeout(self.publish_timeout)
    }
}

fn parse_capacity(key: &str, raw: &str) -> Result<usize> {
    let capacity: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a positive integer"))?;
    if capacity == 0 {
        return Err(anyhow!("{key} must be greater than zero"));
    }
    Ok(capacity)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;
    use crate::resolver::KEY_TRANSITION_EXITED;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.publish_timeout, Duration::from_secs(5));
        assert_eq!(config.regions_encoding, RegionsEncoding::Legacy);
    }

    #[test]
    fn test_reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            ("GEOFENCE_PUBLISH_TIMEOUT_MS", "250"),
            ("GEOFENCE_QUEUE_CAPACITY", "8"),
            ("GEOFENCE_BUS_CAPACITY", "16"),
            ("GEOFENCE_REGIONS_ENCODING", "json-array"),
            ("GEOFENCE_STRINGS_PATH", "/etc/geofence/strings.json"),
        ]))
        .unwrap();

        assert_eq!(config.publish_timeout, Duration::from_millis(250));
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.bus_capacity, 16);
        assert_eq!(config.regions_encoding, RegionsEncoding::JsonArray);
        assert_eq!(
            config.strings_path,
            Some(PathBuf::from("/etc/geofence/strings.json"))
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Config::from_lookup(lookup(&[("GEOFENCE_PUBLISH_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("GEOFENCE_PUBLISH_TIMEOUT_MS"));

        let err = Config::from_lookup(lookup(&[("GEOFENCE_QUEUE_CAPACITY", "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        let err =
            Config::from_lookup(lookup(&[("GEOFENCE_REGIONS_ENCODING", "xml")])).unwrap_err();
        assert!(err.to_string().contains("GEOFENCE_REGIONS_ENCODING"));
    }

    #[test]
    fn test_blank_strings_path_is_ignored() {
        let config = Config::from_lookup(lookup(&[("GEOFENCE_STRINGS_PATH", "  ")])).unwrap();
        assert_eq!(config.strings_path, None);
    }

    #[test]
    fn test_string_table_uses_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"geofence_transition_exited": "Left"}}"#).unwrap();

        let config = Config {
            strings_path: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let table = config.string_table().unwrap();

        assert_eq!(table.resolve(KEY_TRANSITION_EXITED).unwrap(), "Left");
    }

    #[test]
    fn test_dispatcher_uses_configured_encoding() {
        let config = Config {
            regions_encoding: RegionsEncoding::JsonArray,
            ..Config::default()
        };
        let dispatcher = config.dispatcher(
            Arc::new(StringTable::english()),
            Arc::new(crate::testing::RecordingSink::new()),
        );

        assert_eq!(
            dispatcher.classifier().encoding(),
            RegionsEncoding::JsonArray
        );
    }
}

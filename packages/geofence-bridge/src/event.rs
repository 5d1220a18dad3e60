//! Normalized events handed to the publish sink.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::notification::RegionId;

/// Attribute carrying the human-readable error message.
pub const ATTR_ERROR: &str = "error";
/// Attribute carrying the decimal error code.
pub const ATTR_ERROR_CODE: &str = "errorcode";
/// Attribute carrying the encoded triggering regions.
pub const ATTR_REGIONS: &str = "regions";

/// The closed set of event names listeners can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "enterregions")]
    EnterRegions,
    #[serde(rename = "exitregions")]
    ExitRegions,
}

impl EventName {
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::Error => "error",
            EventName::EnterRegions => "enterregions",
            EventName::ExitRegions => "exitregions",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named event with string attributes, built fresh per notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub name: EventName,
    pub attributes: BTreeMap<String, String>,
}

impl NormalizedEvent {
    pub fn new(name: EventName) -> Self {
        Self {
            name,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// How the `regions` attribute of enter/exit events is rendered.
///
/// `Legacy` joins individually encoded JSON objects the way a generic list
/// renders itself: `[{"identifier":"a"}, {"identifier":"b"}]`. Existing
/// listeners parse this shape, so it is the default. `JsonArray` emits a
/// well-formed JSON array instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionsEncoding {
    #[default]
    Legacy,
    JsonArray,
}

impl FromStr for RegionsEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(RegionsEncoding::Legacy),
            "json-array" | "json_array" | "json" => Ok(RegionsEncoding::JsonArray),
            other => Err(format!("unknown regions encoding: {other}")),
        }
    }
}

#[derive(Serialize)]
struct RegionRecord<'a> {
    identifier: &'a str,
}

impl RegionsEncoding {
    /// Render the triggering regions of an enter/exit transition.
    pub fn encode(self, regions: &[RegionId]) -> Result<String, serde_json::Error> {
        let records: Vec<RegionRecord<'_>> = regions
            .iter()
            .map(|region| RegionRecord {
                identifier: region.as_str(),
            })
            .collect();

        match self {
            RegionsEncoding::JsonArray => serde_json::to_string(&records),
            RegionsEncoding::Legacy => {
                let encoded = records
                    .iter()
                    .map(serde_json::to_string)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(render_list(&encoded))
            }
        }
    }
}

/// Render region descriptors attached to a provider error.
pub fn describe_regions(regions: &[RegionId]) -> String {
    render_list(regions)
}

fn render_list<T: fmt::Display>(items: &[T]) -> String {
    let joined = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions(ids: &[&str]) -> Vec<RegionId> {
        ids.iter().copied().map(RegionId::from).collect()
    }

    #[test]
    fn test_legacy_single_region_is_valid_json() {
        let encoded = RegionsEncoding::Legacy.encode(&regions(&["home"])).unwrap();
        assert_eq!(encoded, r#"[{"identifier":"home"}]"#);
    }

    #[test]
    fn test_legacy_joins_with_comma_space() {
        let encoded = RegionsEncoding::Legacy
            .encode(&regions(&["r1", "r2"]))
            .unwrap();
        assert_eq!(encoded, r#"[{"identifier":"r1"}, {"identifier":"r2"}]"#);
    }

    #[test]
    fn test_json_array_encoding() {
        let encoded = RegionsEncoding::JsonArray
            .encode(&regions(&["r1", "r2"]))
            .unwrap();
        assert_eq!(encoded, r#"[{"identifier":"r1"},{"identifier":"r2"}]"#);

        let parsed: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed[1]["identifier"], "r2");
    }

    #[test]
    fn test_empty_region_list() {
        assert_eq!(RegionsEncoding::Legacy.encode(&[]).unwrap(), "[]");
        assert_eq!(RegionsEncoding::JsonArray.encode(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_identifier_is_json_escaped() {
        let encoded = RegionsEncoding::Legacy
            .encode(&regions(&["say \"hi\""]))
            .unwrap();
        assert_eq!(encoded, r#"[{"identifier":"say \"hi\""}]"#);
    }

    #[test]
    fn test_describe_regions() {
        assert_eq!(describe_regions(&regions(&["a", "b"])), "[a, b]");
    }

    #[test]
    fn test_regions_encoding_from_str() {
        assert_eq!("legacy".parse::<RegionsEncoding>(), Ok(RegionsEncoding::Legacy));
        assert_eq!(
            "JSON-ARRAY".parse::<RegionsEncoding>(),
            Ok(RegionsEncoding::JsonArray)
        );
        assert!("yaml".parse::<RegionsEncoding>().is_err());
    }

    #[test]
    fn test_event_name_serializes_as_wire_name() {
        let event =
            NormalizedEvent::new(EventName::EnterRegions).with_attribute(ATTR_REGIONS, "[]");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["name"], "enterregions");
        assert_eq!(json["attributes"]["regions"], "[]");
    }
}

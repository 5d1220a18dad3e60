//! Label and message lookup keyed by string resource names.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::ResolveError;
use crate::notification::{
    GEOFENCE_NOT_AVAILABLE, GEOFENCE_TOO_MANY_GEOFENCES, GEOFENCE_TOO_MANY_PENDING_INTENTS,
    TransitionKind,
};

pub const KEY_NOT_AVAILABLE: &str = "geofence_not_available";
pub const KEY_TOO_MANY_GEOFENCES: &str = "geofence_too_many_geofences";
pub const KEY_TOO_MANY_PENDING_INTENTS: &str = "geofence_too_many_pending_intents";
pub const KEY_UNKNOWN_ERROR: &str = "unknown_geofence_error";
pub const KEY_TRANSITION_ENTERED: &str = "geofence_transition_entered";
pub const KEY_TRANSITION_EXITED: &str = "geofence_transition_exited";
pub const KEY_UNKNOWN_TRANSITION: &str = "unknown_geofence_transition";
pub const KEY_TRANSITION_INVALID_TYPE: &str = "geofence_transition_invalid_type";

/// Placeholder for the raw transition code in the invalid-type template.
pub const CODE_PLACEHOLDER: &str = "%1$d";

const ENGLISH: &[(&str, &str)] = &[
    (KEY_NOT_AVAILABLE, "Geofence service is not available now"),
    (
        KEY_TOO_MANY_GEOFENCES,
        "Your app has registered too many geofences",
    ),
    (
        KEY_TOO_MANY_PENDING_INTENTS,
        "You have provided too many PendingIntents to the addGeofences() call",
    ),
    (
        KEY_UNKNOWN_ERROR,
        "Unknown error: the Geofence service is not available now",
    ),
    (KEY_TRANSITION_ENTERED, "Entered"),
    (KEY_TRANSITION_EXITED, "Exited"),
    (KEY_UNKNOWN_TRANSITION, "Unknown Transition"),
    (
        KEY_TRANSITION_INVALID_TYPE,
        "Geofence transition type is invalid: %1$d",
    ),
];

/// Resolves string resources by key.
///
/// Implementations report a missing key as [`ResolveError::NotFound`]; the
/// caller decides what to do without the string.
pub trait LabelResolver: Send + Sync {
    fn resolve(&self, key: &str) -> Result<String, ResolveError>;
}

/// Resource key holding the message for a provider error code.
///
/// Unrecognized codes share the generic unknown-error message.
pub fn error_message_key(code: i32) -> &'static str {
    match code {
        GEOFENCE_NOT_AVAILABLE => KEY_NOT_AVAILABLE,
        GEOFENCE_TOO_MANY_GEOFENCES => KEY_TOO_MANY_GEOFENCES,
        GEOFENCE_TOO_MANY_PENDING_INTENTS => KEY_TOO_MANY_PENDING_INTENTS,
        _ => KEY_UNKNOWN_ERROR,
    }
}

/// Resource key holding the human-readable label of a transition kind.
///
/// The classifier only looks up labels for enter and exit; `Other` maps to
/// the unknown-transition string so every kind has an entry.
pub fn transition_label_key(kind: TransitionKind) -> &'static str {
    match kind {
        TransitionKind::Enter => KEY_TRANSITION_ENTERED,
        TransitionKind::Exit => KEY_TRANSITION_EXITED,
        TransitionKind::Other(_) => KEY_UNKNOWN_TRANSITION,
    }
}

/// Built-in English text for a key, if the key is one of ours.
pub fn english_default(key: &str) -> Option<&'static str> {
    ENGLISH
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, text)| *text)
}

/// Map-backed resolver.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: HashMap<String, String>,
}

impl StringTable {
    /// Empty table; every lookup fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded with the default English strings.
    pub fn english() -> Self {
        let strings = ENGLISH
            .iter()
            .map(|(key, text)| (key.to_string(), text.to_string()))
            .collect();
        Self { strings }
    }

    /// English defaults with the overrides from a JSON object file merged on top.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read string table {}", path.display()))?;
        let overrides: HashMap<String, String> =
            serde_json::from_str(&raw).with_context(|| {
                format!("String table {} is not a JSON object of strings", path.display())
            })?;

        Ok(Self::english().with_overrides(overrides))
    }

    pub fn with_string(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.strings.insert(key.into(), text.into());
        self
    }

    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.strings
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Drop a key so lookups for it fail.
    pub fn without(mut self, key: &str) -> Self {
        self.strings.remove(key);
        self
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl LabelResolver for StringTable {
    fn resolve(&self, key: &str) -> Result<String, ResolveError> {
        self.strings
            .get(key)
            .cloned()
            .ok_or_else(|| ResolveError::not_found(key))
    }
}

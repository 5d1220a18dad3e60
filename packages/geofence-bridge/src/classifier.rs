//! Transition classification: decide which event a notification becomes.
//!
//! The classifier is pure. It never logs or publishes; everything it wants
//! an operator to see comes back in the [`Classification`] as diagnostics
//! and lookup failures, and the dispatcher turns those into log lines.
//!
//! ```text
//! Error { code }            ─► "error"        { error, errorcode, [regions] }
//! Transition { Enter, .. }  ─► "enterregions" { regions }
//! Transition { Exit, .. }   ─► "exitregions"  { regions }
//! Transition { Other(n) }   ─► nothing, one error diagnostic
//! ```

use std::sync::Arc;

use crate::error::ResolveError;
use crate::event::{
    describe_regions, EventName, NormalizedEvent, RegionsEncoding, ATTR_ERROR, ATTR_ERROR_CODE,
    ATTR_REGIONS,
};
use crate::notification::{RegionId, TransitionKind, TransitionNotification};
use crate::resolver::{
    english_default, error_message_key, transition_label_key, LabelResolver, CODE_PLACEHOLDER,
    KEY_TRANSITION_INVALID_TYPE,
};

/// Severity of a classifier diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

/// A log line the dispatcher should write for this notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Result of classifying one notification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    /// Event to publish, if the notification maps to one.
    pub event: Option<NormalizedEvent>,
    /// Resolved label of the transition kind, for enter/exit transitions.
    pub transition_label: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Strings that could not be resolved; fallbacks were used instead.
    pub lookup_failures: Vec<ResolveError>,
}

/// Maps provider notifications to normalized events.
#[derive(Clone)]
pub struct TransitionClassifier {
    resolver: Arc<dyn LabelResolver>,
    encoding: RegionsEncoding,
}

impl TransitionClassifier {
    pub fn new(resolver: Arc<dyn LabelResolver>) -> Self {
        Self {
            resolver,
            encoding: RegionsEncoding::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: RegionsEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> RegionsEncoding {
        self.encoding
    }

    pub fn classify(&self, notification: &TransitionNotification) -> Classification {
        match notification {
            TransitionNotification::Error { code, regions } => {
                self.classify_error(*code, regions.as_deref())
            }
            TransitionNotification::Transition { kind, regions } => {
                self.classify_transition(*kind, regions)
            }
        }
    }

    fn classify_error(&self, code: i32, regions: Option<&[RegionId]>) -> Classification {
        let mut out = Classification::default();

        let key = error_message_key(code);
        let message = match self.resolver.resolve(key) {
            Ok(message) => message,
            Err(err) => {
                out.lookup_failures.push(err);
                english_default(key)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("geofence error {code}"))
            }
        };

        let mut event = NormalizedEvent::new(EventName::Error)
            .with_attribute(ATTR_ERROR, message)
            .with_attribute(ATTR_ERROR_CODE, code.to_string());
        if let Some(regions) = regions {
            event = event.with_attribute(ATTR_REGIONS, describe_regions(regions));
        }

        out.event = Some(event);
        out.diagnostics.push(Diagnostic::new(
            Severity::Warn,
            format!("geofence provider reported error code {code}"),
        ));
        out
    }

    fn classify_transition(&self, kind: TransitionKind, regions: &[RegionId]) -> Classification {
        let mut out = Classification::default();

        let name = match kind {
            TransitionKind::Enter => EventName::EnterRegions,
            TransitionKind::Exit => EventName::ExitRegions,
            TransitionKind::Other(code) => {
                let message = match self.resolver.resolve(KEY_TRANSITION_INVALID_TYPE) {
                    Ok(template) => template.replace(CODE_PLACEHOLDER, &code.to_string()),
                    Err(err) => {
                        out.lookup_failures.push(err);
                        format!("invalid geofence transition type: {code}")
                    }
                };
                out.diagnostics.push(Diagnostic::new(Severity::Error, message));
                return out;
            }
        };

        match self.resolver.resolve(transition_label_key(kind)) {
            Ok(label) => out.transition_label = Some(label),
            Err(err) => out.lookup_failures.push(err),
        }

        match self.encoding.encode(regions) {
            Ok(encoded) => {
                out.event = Some(NormalizedEvent::new(name).with_attribute(ATTR_REGIONS, encoded));
            }
            Err(err) => out.diagnostics.push(Diagnostic::new(
                Severity::Error,
                format!("failed to encode regions for {name}: {err}"),
            )),
        }
        out
    }
}

impl std::fmt::Debug for TransitionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionClassifier")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

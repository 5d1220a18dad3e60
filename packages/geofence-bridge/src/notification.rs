//! Raw transition notifications as delivered by the location provider.
//!
//! A notification is either an error code or a transition carrying the
//! regions that triggered it. Raw integer codes follow the provider's
//! constants so a notification source can pass them through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Geofence service is not available (location disabled, provider down).
pub const GEOFENCE_NOT_AVAILABLE: i32 = 1000;
/// The app registered more geofences than the provider allows.
pub const GEOFENCE_TOO_MANY_GEOFENCES: i32 = 1001;
/// Too many pending intents were handed to the provider.
pub const GEOFENCE_TOO_MANY_PENDING_INTENTS: i32 = 1002;

/// Raw transition code for entering a region.
pub const GEOFENCE_TRANSITION_ENTER: i32 = 1;
/// Raw transition code for leaving a region.
pub const GEOFENCE_TRANSITION_EXIT: i32 = 2;
/// Raw transition code for lingering inside a region.
pub const GEOFENCE_TRANSITION_DWELL: i32 = 4;

/// Identifier assigned to a region when it was registered with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of boundary crossing reported by the provider.
///
/// Only `Enter` and `Exit` are republished. Everything else (dwell, or codes
/// a newer provider might add) is carried as `Other` with its raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum TransitionKind {
    Enter,
    Exit,
    Other(i32),
}

impl TransitionKind {
    /// Raw provider code for this kind.
    pub fn code(self) -> i32 {
        match self {
            TransitionKind::Enter => GEOFENCE_TRANSITION_ENTER,
            TransitionKind::Exit => GEOFENCE_TRANSITION_EXIT,
            TransitionKind::Other(code) => code,
        }
    }
}

impl From<i32> for TransitionKind {
    fn from(code: i32) -> Self {
        match code {
            GEOFENCE_TRANSITION_ENTER => TransitionKind::Enter,
            GEOFENCE_TRANSITION_EXIT => TransitionKind::Exit,
            other => TransitionKind::Other(other),
        }
    }
}

impl From<TransitionKind> for i32 {
    fn from(kind: TransitionKind) -> Self {
        kind.code()
    }
}

/// One callback from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionNotification {
    /// The provider reported a failure instead of a transition.
    Error {
        code: i32,
        /// Triggering regions, when the provider attached them to the error.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regions: Option<Vec<RegionId>>,
    },
    /// The device crossed one or more region boundaries.
    Transition {
        kind: TransitionKind,
        #[serde(default)]
        regions: Vec<RegionId>,
    },
}

impl TransitionNotification {
    /// Error notification without region information.
    pub fn error(code: i32) -> Self {
        TransitionNotification::Error {
            code,
            regions: None,
        }
    }

    pub fn enter<I, R>(regions: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RegionId>,
    {
        Self::transition(TransitionKind::Enter, regions)
    }

    pub fn exit<I, R>(regions: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RegionId>,
    {
        Self::transition(TransitionKind::Exit, regions)
    }

    pub fn transition<I, R>(kind: TransitionKind, regions: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RegionId>,
    {
        TransitionNotification::Transition {
            kind,
            regions: regions.into_iter().map(Into::into).collect(),
        }
    }

    /// Regions attached to the notification, if any.
    pub fn regions(&self) -> Option<&[RegionId]> {
        match self {
            TransitionNotification::Error { regions, .. } => regions.as_deref(),
            TransitionNotification::Transition { regions, .. } => Some(regions),
        }
    }
}

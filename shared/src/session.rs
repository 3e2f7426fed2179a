//! Live GPS tracking session: permission, subscription ownership and speed
//! derivation for one mounted screen.
//!
//! The session is pure state. It never talks to the shell itself; methods
//! that give up a subscription hand the [`SubscriptionHandle`] back so the
//! caller can issue exactly one release for it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::capabilities::{
    LocationError, LocationFix, LocationOutput, LocationResult, PermissionResult, SubscriptionId,
};
use crate::{
    MPS_TO_KMH, MSG_PERMISSION_DENIED, MSG_PERMISSION_REQUEST_FAILED, MSG_PROVIDER_UNAVAILABLE,
    MSG_START_FAILED,
};

/// Converts a raw provider speed to km/h. Absent, negative and NaN readings
/// all count as standing still.
#[must_use]
pub fn kmh_from_mps(speed_mps: Option<f64>) -> f64 {
    let mps = speed_mps.filter(|s| !s.is_nan()).unwrap_or(0.0);
    (mps * MPS_TO_KMH).max(0.0)
}

/// Identifies one mount of a tracking screen. Every asynchronous result is
/// tagged with the token of the session that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub Uuid);

impl SessionToken {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exclusive ownership of a live OS subscription. Not `Clone`: moving it out
/// of the session is the only way to release it.
#[derive(Debug, PartialEq, Eq)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
}

impl SubscriptionHandle {
    #[must_use]
    pub fn acquire(id: SubscriptionId) -> Self {
        Self { id }
    }

    #[must_use]
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    /// Consumes the handle, yielding the id the shell must be told to release.
    #[must_use]
    pub fn release(self) -> SubscriptionId {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    #[default]
    Unrequested,
    Granted,
    Denied,
}

impl PermissionStatus {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Denied)
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("permission request failed: {reason}")]
    PermissionRequestFailed { reason: String },

    #[error("location provider failed to start: {reason}")]
    ProviderStartFailure { reason: String },

    #[error("location provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },
}

impl SessionError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "LOCATION_PERMISSION_DENIED",
            Self::PermissionRequestFailed { .. } => "LOCATION_PERMISSION_REQUEST_FAILED",
            Self::ProviderStartFailure { .. } => "LOCATION_START_FAILED",
            Self::ProviderUnavailable { .. } => "LOCATION_UNAVAILABLE",
        }
    }

    #[must_use]
    pub const fn user_facing_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => MSG_PERMISSION_DENIED,
            Self::PermissionRequestFailed { .. } => MSG_PERMISSION_REQUEST_FAILED,
            Self::ProviderStartFailure { .. } => MSG_START_FAILED,
            Self::ProviderUnavailable { .. } => MSG_PROVIDER_UNAVAILABLE,
        }
    }

    fn from_permission_failure(error: LocationError) -> Self {
        match error {
            LocationError::PermissionDenied => Self::PermissionDenied,
            LocationError::NotSupported => Self::ProviderUnavailable {
                reason: error.to_string(),
            },
            LocationError::Unavailable { reason } => Self::ProviderUnavailable { reason },
            LocationError::StartFailed { reason } => Self::PermissionRequestFailed { reason },
        }
    }

    fn from_start_failure(error: LocationError) -> Self {
        match error {
            LocationError::NotSupported => Self::ProviderUnavailable {
                reason: error.to_string(),
            },
            LocationError::Unavailable { reason } => Self::ProviderUnavailable { reason },
            LocationError::PermissionDenied => Self::ProviderStartFailure {
                reason: error.to_string(),
            },
            LocationError::StartFailed { reason } => Self::ProviderStartFailure { reason },
        }
    }
}

#[derive(Debug)]
pub struct LocationSession {
    token: SessionToken,
    permission: PermissionStatus,
    subscription: Option<SubscriptionHandle>,
    last_fix: Option<LocationFix>,
    error: Option<SessionError>,
    torn_down: bool,
    fixes_received: u64,
}

impl LocationSession {
    #[must_use]
    pub fn new(token: SessionToken) -> Self {
        Self {
            token,
            permission: PermissionStatus::Unrequested,
            subscription: None,
            last_fix: None,
            error: None,
            torn_down: false,
            fixes_received: 0,
        }
    }

    #[must_use]
    pub const fn token(&self) -> SessionToken {
        self.token
    }

    #[must_use]
    pub const fn permission(&self) -> PermissionStatus {
        self.permission
    }

    #[must_use]
    pub const fn last_fix(&self) -> Option<&LocationFix> {
        self.last_fix.as_ref()
    }

    #[must_use]
    pub const fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn subscription(&self) -> Option<&SubscriptionId> {
        self.subscription.as_ref().map(SubscriptionHandle::id)
    }

    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    #[must_use]
    pub const fn fixes_received(&self) -> u64 {
        self.fixes_received
    }

    /// True while results tagged with `token` may still change this session.
    #[must_use]
    pub fn accepts(&self, token: SessionToken) -> bool {
        !self.torn_down && self.token == token
    }

    #[must_use]
    pub fn derived_speed_kmh(&self) -> f64 {
        self.last_fix.map_or(0.0, |fix| kmh_from_mps(fix.speed_mps))
    }

    /// Only a refused session may ask again; an unresolved request is still in flight.
    #[must_use]
    pub const fn can_request_permission(&self) -> bool {
        !self.torn_down && self.permission.is_denied()
    }

    /// Resets a refused session before a user-initiated re-request. The
    /// permission goes back to `Unrequested` until the new answer arrives.
    pub fn prepare_retry(&mut self) {
        if self.can_request_permission() {
            self.permission = PermissionStatus::Unrequested;
            self.error = None;
        }
    }

    /// Applies the shell's answer to a permission request. Anything other than
    /// an explicit grant resolves to `Denied`. A torn-down session is left
    /// untouched and reports `Denied` so nothing gets started for it.
    pub fn resolve_permission(&mut self, result: LocationResult) -> PermissionResult {
        if self.torn_down {
            return PermissionResult::Denied;
        }

        match result {
            Ok(LocationOutput::Permission(PermissionResult::Granted)) => {
                self.permission = PermissionStatus::Granted;
                self.error = None;
                PermissionResult::Granted
            }
            Ok(LocationOutput::Permission(PermissionResult::Denied)) => {
                self.deny(SessionError::PermissionDenied);
                PermissionResult::Denied
            }
            Ok(other) => {
                self.deny(SessionError::PermissionRequestFailed {
                    reason: format!("unexpected provider output: {other:?}"),
                });
                PermissionResult::Denied
            }
            Err(e) => {
                self.deny(SessionError::from_permission_failure(e));
                PermissionResult::Denied
            }
        }
    }

    fn deny(&mut self, error: SessionError) {
        self.permission = PermissionStatus::Denied;
        self.error = Some(error);
    }

    /// Takes ownership of a freshly started subscription. The handle comes back
    /// as `Err` when the session cannot hold it (torn down, not granted, start
    /// already failed, or already subscribed); the caller must release it.
    pub fn attach_subscription(
        &mut self,
        handle: SubscriptionHandle,
    ) -> Result<(), SubscriptionHandle> {
        if self.torn_down
            || !self.permission.is_granted()
            || self.error.is_some()
            || self.subscription.is_some()
        {
            return Err(handle);
        }
        self.subscription = Some(handle);
        Ok(())
    }

    /// Records a provider failure while starting or streaming. Any held
    /// subscription is returned for release.
    pub fn fail_start(&mut self, error: LocationError) -> Option<SubscriptionHandle> {
        if self.torn_down {
            return None;
        }
        self.error = Some(SessionError::from_start_failure(error));
        self.subscription.take()
    }

    /// Supersedes the previous fix. Returns `false` when the fix was dropped
    /// because the session is torn down or its updates already failed.
    pub fn on_fix_received(&mut self, fix: LocationFix) -> bool {
        if self.torn_down || self.error.is_some() {
            return false;
        }
        self.last_fix = Some(fix);
        self.fixes_received += 1;
        true
    }

    /// Idempotent. Yields the handle at most once over the session's life.
    pub fn stop(&mut self) -> Option<SubscriptionHandle> {
        self.subscription.take()
    }

    /// Marks the session dead and stops it. Late results for this session are
    /// ignored from here on.
    pub fn teardown(&mut self) -> Option<SubscriptionHandle> {
        self.torn_down = true;
        self.stop()
    }
}

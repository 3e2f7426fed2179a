use crux_core::capability::{Capability, CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone)]
pub struct Location<E> {
    context: CapabilityContext<LocationOperation, E>,
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<E> Location<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, E>) -> Self {
        Self { context }
    }

    pub fn request_permission<F>(&self, callback: F)
    where
        F: FnOnce(LocationResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(LocationOperation::RequestForegroundPermission)
                .await;
            context.update_app(callback(result));
        });
    }

    /// Opens a continuous watch. The shell answers with `Started` once the
    /// subscription exists, then one `Fix` per sample, in provider order.
    pub fn watch<F>(&self, options: WatchOptions, callback: F)
    where
        F: Fn(LocationResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let mut updates = context.stream_from_shell(LocationOperation::Watch { options });
            while let Some(result) = updates.next().await {
                context.update_app(callback(result));
            }
        });
    }

    pub fn release(&self, subscription: SubscriptionId) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context
                .notify_shell(LocationOperation::Release { subscription })
                .await;
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LocationOperation {
    RequestForegroundPermission,
    Watch { options: WatchOptions },
    Release { subscription: SubscriptionId },
}

impl Operation for LocationOperation {
    type Output = LocationResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    Lowest,
    Low,
    Balanced,
    High,
    Highest,
    #[default]
    BestForNavigation,
}

/// Zero intervals mean "as fast as the provider supplies fixes".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    pub accuracy: Accuracy,
    pub distance_interval_m: f64,
    pub time_interval_ms: u64,
}

impl WatchOptions {
    #[must_use]
    pub const fn navigation() -> Self {
        Self {
            accuracy: Accuracy::BestForNavigation,
            distance_interval_m: 0.0,
            time_interval_ms: 0,
        }
    }

    #[must_use]
    pub fn is_unthrottled(&self) -> bool {
        self.distance_interval_m == 0.0 && self.time_interval_ms == 0
    }
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self::navigation()
    }
}

/// Identifier the shell assigns to a live OS subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct UnixTimeMs(pub u64);

/// One GPS sample as reported by the platform provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres per second. Providers report `None` or a negative sentinel
    /// when speed is unknown.
    #[serde(default)]
    pub speed_mps: Option<f64>,
    pub timestamp: UnixTimeMs,
}

impl LocationFix {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, speed_mps: Option<f64>, timestamp: UnixTimeMs) -> Self {
        Self {
            latitude,
            longitude,
            speed_mps,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionResult {
    Granted,
    Denied,
}

impl PermissionResult {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationOutput {
    Permission(PermissionResult),
    Started { subscription: SubscriptionId },
    Fix(LocationFix),
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location provider unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("failed to start location updates: {reason}")]
    StartFailed { reason: String },

    #[error("location services not supported on this platform")]
    NotSupported,
}

pub type LocationResult = Result<LocationOutput, LocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_options_are_unthrottled() {
        let options = WatchOptions::default();
        assert_eq!(options.accuracy, Accuracy::BestForNavigation);
        assert!(options.is_unthrottled());
    }

    #[test]
    fn test_throttled_options_detected() {
        let options = WatchOptions {
            time_interval_ms: 1000,
            ..WatchOptions::navigation()
        };
        assert!(!options.is_unthrottled());
    }

    #[test]
    fn test_fix_without_speed_deserializes() {
        let fix: LocationFix =
            serde_json::from_str(r#"{"latitude":1.5,"longitude":2.5,"timestamp":10}"#).unwrap();
        assert_eq!(fix.speed_mps, None);
        assert_eq!(fix.timestamp, UnixTimeMs(10));
    }
}

use serde::{Deserialize, Serialize};

use crate::capabilities::{ColorScheme, LocationFix, Route, WatchOptions};
use crate::session::{LocationSession, PermissionStatus, SessionToken};
use crate::theme::{StatusBarStyle, ThemePalette, ThemeState};
use crate::{SPEED_BAND_FAST_KMH, SPEED_BAND_MODERATE_KMH, SPEED_BAND_SLOW_KMH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Ios,
    Android,
    Web,
    #[default]
    Unknown,
}

/// Startup configuration the shell passes in `Event::AppStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub watch: WatchOptions,
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: CoreConfig,
    pub theme: ThemeState,
    /// Present while the home screen is mounted.
    pub location: Option<LocationSession>,
    pub route: Route,
}

impl Model {
    /// The mounted session, if `token` still names it.
    pub fn live_session_mut(&mut self, token: SessionToken) -> Option<&mut LocationSession> {
        self.location.as_mut().filter(|s| s.accepts(token))
    }

    #[must_use]
    pub fn current_fix(&self) -> Option<LocationFix> {
        self.location.as_ref().and_then(|s| s.last_fix().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBand {
    Slow,
    Moderate,
    Fast,
    VeryFast,
}

impl SpeedBand {
    #[must_use]
    pub fn classify(kmh: f64) -> Self {
        if kmh < SPEED_BAND_SLOW_KMH {
            Self::Slow
        } else if kmh < SPEED_BAND_MODERATE_KMH {
            Self::Moderate
        } else if kmh < SPEED_BAND_FAST_KMH {
            Self::Fast
        } else {
            Self::VeryFast
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ErrorView {
    pub code: String,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HomeView {
    pub title: String,
    pub speed_text: String,
    pub speed_kmh: f64,
    pub speed_band: SpeedBand,
    pub permission: PermissionStatus,
    pub error: Option<ErrorView>,
    pub has_fix: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub can_open_in_maps: bool,
    pub can_show_on_map: bool,
    pub can_share: bool,
    pub can_retry_permission: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapView {
    Unavailable {
        message: String,
    },
    Ready {
        title: String,
        latitude: f64,
        longitude: f64,
        latitude_delta: f64,
        longitude_delta: f64,
        marker_title: String,
        marker_description: String,
        dark_map: bool,
    },
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ThemeView {
    pub is_dark_mode: bool,
    pub follows_system: bool,
    pub scheme: ColorScheme,
    pub status_bar: StatusBarStyle,
    pub palette: ThemePalette,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ViewModel {
    pub route: String,
    pub title: String,
    pub home: HomeView,
    pub map: Option<MapView>,
    pub theme: ThemeView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Accuracy;

    #[test]
    fn test_speed_band_thresholds() {
        assert_eq!(SpeedBand::classify(0.0), SpeedBand::Slow);
        assert_eq!(SpeedBand::classify(19.9), SpeedBand::Slow);
        assert_eq!(SpeedBand::classify(20.0), SpeedBand::Moderate);
        assert_eq!(SpeedBand::classify(59.9), SpeedBand::Moderate);
        assert_eq!(SpeedBand::classify(60.0), SpeedBand::Fast);
        assert_eq!(SpeedBand::classify(100.0), SpeedBand::VeryFast);
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: CoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.platform, Platform::Unknown);
        assert_eq!(config.watch.accuracy, Accuracy::BestForNavigation);
        assert!(config.watch.is_unthrottled());
    }

    #[test]
    fn test_config_platform_parsed() {
        let config: CoreConfig = serde_json::from_str(r#"{"platform":"android"}"#).unwrap();
        assert_eq!(config.platform, Platform::Android);
    }

    #[test]
    fn test_config_rejects_unknown_platform() {
        assert!(serde_json::from_str::<CoreConfig>(r#"{"platform":"symbian"}"#).is_err());
    }

    #[test]
    fn test_live_session_requires_matching_token() {
        let token = SessionToken::generate();
        let mut model = Model {
            location: Some(LocationSession::new(token)),
            ..Model::default()
        };

        assert!(model.live_session_mut(token).is_some());
        assert!(model.live_session_mut(SessionToken::generate()).is_none());
    }
}

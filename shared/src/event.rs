use serde::{Deserialize, Serialize};

use crate::capabilities::{ActionResult, ColorScheme, ExternalAction, LocationResult};
use crate::model::CoreConfig;
use crate::session::SessionToken;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Event {
    #[default]
    Noop,

    AppStarted {
        #[serde(default)]
        config: CoreConfig,
    },

    // Screen lifecycle
    HomeMounted,
    HomeUnmounted,
    MapDismissed,

    // Location session
    LocationPermissionResolved {
        session: SessionToken,
        result: LocationResult,
    },
    LocationPermissionRetryRequested,
    LocationWatchUpdate {
        session: SessionToken,
        result: LocationResult,
    },

    // Theme
    SystemAppearanceResolved(ColorScheme),
    SystemAppearanceChanged(ColorScheme),
    ToggleTheme,
    SetDarkMode(bool),
    FollowSystemAppearance,

    // Actions on the current fix
    ShowOnMapRequested,
    OpenInMapsRequested,
    ShareLocationRequested,
    ExternalActionCompleted {
        action: ExternalAction,
        result: ActionResult,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted { .. } => "app_started",
            Self::HomeMounted => "home_mounted",
            Self::HomeUnmounted => "home_unmounted",
            Self::MapDismissed => "map_dismissed",
            Self::LocationPermissionResolved { .. } => "location_permission_resolved",
            Self::LocationPermissionRetryRequested => "location_permission_retry_requested",
            Self::LocationWatchUpdate { .. } => "location_watch_update",
            Self::SystemAppearanceResolved(_) => "system_appearance_resolved",
            Self::SystemAppearanceChanged(_) => "system_appearance_changed",
            Self::ToggleTheme => "toggle_theme",
            Self::SetDarkMode(_) => "set_dark_mode",
            Self::FollowSystemAppearance => "follow_system_appearance",
            Self::ShowOnMapRequested => "show_on_map_requested",
            Self::OpenInMapsRequested => "open_in_maps_requested",
            Self::ShareLocationRequested => "share_location_requested",
            Self::ExternalActionCompleted { .. } => "external_action_completed",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::LocationPermissionRetryRequested
                | Self::ToggleTheme
                | Self::SetDarkMode(_)
                | Self::FollowSystemAppearance
                | Self::ShowOnMapRequested
                | Self::OpenInMapsRequested
                | Self::ShareLocationRequested
        )
    }
}

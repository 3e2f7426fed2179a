// lib.rs - GPS speed tracker shared core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capabilities;
pub mod event;
pub mod links;
pub mod model;
pub mod session;
pub mod theme;

use thiserror::Error;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::{CoreConfig, Model, Platform, ViewModel};

pub const MPS_TO_KMH: f64 = 3.6;
pub const SPEED_BAND_SLOW_KMH: f64 = 20.0;
pub const SPEED_BAND_MODERATE_KMH: f64 = 60.0;
pub const SPEED_BAND_FAST_KMH: f64 = 100.0;
pub const MAP_REGION_DELTA: f64 = 0.01;

pub const HOME_TITLE: &str = "GPS Speed Tracker";
pub const MAP_TITLE: &str = "My Location Map";
pub const MAP_MARKER_TITLE: &str = "My Location";
pub const MAPS_PIN_LABEL: &str = "My Current Location";
pub const SHARE_TITLE: &str = "My Location";
pub const GOOGLE_MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

pub const MSG_PERMISSION_DENIED: &str =
    "Location permission denied. Please enable location services to use this app.";
pub const MSG_PERMISSION_DENIED_SHORT: &str =
    "Location permission denied. Please enable location services.";
pub const MSG_PERMISSION_REQUEST_FAILED: &str = "Failed to request location permission.";
pub const MSG_START_FAILED: &str = "Failed to start location tracking.";
pub const MSG_PROVIDER_UNAVAILABLE: &str =
    "Location services are not available on this platform.";
pub const MSG_WAITING_FOR_SPEED: &str = "Waiting for speed...";
pub const MSG_MAP_UNAVAILABLE_WEB: &str = "Map is not available on web.";

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("external action error: {0}")]
    Action(#[from] capabilities::ActionError),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Home screen headline. An error outranks a denial, which outranks a reading.
#[must_use]
pub fn speed_text(
    error: Option<&session::SessionError>,
    permission: session::PermissionStatus,
    speed_kmh: Option<f64>,
) -> String {
    if let Some(error) = error {
        return error.user_facing_message().to_string();
    }
    if permission.is_denied() {
        return MSG_PERMISSION_DENIED_SHORT.to_string();
    }
    match speed_kmh {
        Some(kmh) => format!("Speed: {kmh:.1} km/h"),
        None => MSG_WAITING_FOR_SPEED.to_string(),
    }
}

pub mod app {
    use tracing::{debug, info, warn};

    use super::*;
    use crate::capabilities::{
        ExternalAction, LocationFix, LocationOutput, Route, SubscriptionId, WatchOptions,
    };
    use crate::model::{ErrorView, HomeView, MapView, SpeedBand};
    use crate::session::{
        kmh_from_mps, LocationSession, PermissionStatus, SessionError, SessionToken,
        SubscriptionHandle,
    };
    use crate::theme::ThemeState;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn request_permission(token: SessionToken, caps: &Capabilities) {
            caps.location
                .request_permission(move |result| Event::LocationPermissionResolved {
                    session: token,
                    result,
                });
        }

        fn start_watch(token: SessionToken, options: WatchOptions, caps: &Capabilities) {
            caps.location.watch(options, move |result| Event::LocationWatchUpdate {
                session: token,
                result,
            });
        }

        fn release(handle: SubscriptionHandle, caps: &Capabilities) {
            let id = handle.release();
            debug!(subscription = %id, "releasing location subscription");
            caps.location.release(id);
        }

        fn teardown_session(model: &mut Model, caps: &Capabilities) {
            model.route = Route::Home;
            if let Some(mut session) = model.location.take() {
                if let Some(handle) = session.teardown() {
                    Self::release(handle, caps);
                }
                info!(
                    session = %session.token(),
                    fixes = session.fixes_received(),
                    "location session torn down"
                );
            }
        }

        fn accept_subscription(
            model: &mut Model,
            caps: &Capabilities,
            token: SessionToken,
            subscription: SubscriptionId,
        ) {
            let handle = SubscriptionHandle::acquire(subscription);
            let rejected = match model.live_session_mut(token) {
                Some(session) => session.attach_subscription(handle).err(),
                None => Some(handle),
            };

            match rejected {
                Some(handle) => {
                    debug!(session = %token, "subscription arrived for inactive session");
                    Self::release(handle, caps);
                }
                None => info!(session = %token, "location updates started"),
            }
        }

        fn handle_watch_update(
            model: &mut Model,
            caps: &Capabilities,
            token: SessionToken,
            result: crate::capabilities::LocationResult,
        ) {
            match result {
                Ok(LocationOutput::Started { subscription }) => {
                    Self::accept_subscription(model, caps, token, subscription);
                    caps.render.render();
                }
                Ok(LocationOutput::Fix(fix)) => {
                    let applied = model
                        .live_session_mut(token)
                        .is_some_and(|session| session.on_fix_received(fix));
                    if applied {
                        caps.render.render();
                    } else {
                        debug!(session = %token, "dropping fix for inactive session");
                    }
                }
                Ok(other) => {
                    warn!(session = %token, output = ?other, "unexpected output on watch stream");
                }
                Err(e) => match model.live_session_mut(token) {
                    Some(session) => {
                        warn!(session = %token, error = %e, "location updates failed");
                        if let Some(handle) = session.fail_start(e) {
                            Self::release(handle, caps);
                        }
                        caps.render.render();
                    }
                    None => debug!(session = %token, error = %e, "ignoring failure for inactive session"),
                },
            }
        }

        fn with_current_fix(model: &Model, action: &str) -> Option<LocationFix> {
            let fix = model.current_fix();
            if fix.is_none() {
                debug!(action, "no fix yet; ignoring request");
            }
            fix
        }

        fn build_home_view(model: &Model) -> HomeView {
            let session = model.location.as_ref();
            let fix = session.and_then(LocationSession::last_fix);
            let permission = session.map_or(PermissionStatus::Unrequested, LocationSession::permission);
            let error = session.and_then(LocationSession::error);
            let speed_kmh = session.map_or(0.0, LocationSession::derived_speed_kmh);
            let has_fix = fix.is_some();

            HomeView {
                title: HOME_TITLE.to_string(),
                speed_text: speed_text(error, permission, has_fix.then_some(speed_kmh)),
                speed_kmh,
                speed_band: SpeedBand::classify(speed_kmh),
                permission,
                error: error.map(|e| ErrorView {
                    code: e.code().to_string(),
                    message: e.user_facing_message().to_string(),
                }),
                has_fix,
                latitude: fix.map(|f| f.latitude),
                longitude: fix.map(|f| f.longitude),
                can_open_in_maps: has_fix,
                can_show_on_map: has_fix,
                can_share: has_fix,
                can_retry_permission: session.is_some_and(LocationSession::can_request_permission),
            }
        }

        fn build_map_view(model: &Model) -> Option<MapView> {
            let Route::Map { fix } = model.route else {
                return None;
            };

            if model.config.platform == Platform::Web {
                return Some(MapView::Unavailable {
                    message: MSG_MAP_UNAVAILABLE_WEB.to_string(),
                });
            }

            Some(MapView::Ready {
                title: model.route.title().to_string(),
                latitude: fix.latitude,
                longitude: fix.longitude,
                latitude_delta: MAP_REGION_DELTA,
                longitude_delta: MAP_REGION_DELTA,
                marker_title: MAP_MARKER_TITLE.to_string(),
                marker_description: format!("Speed: {:.1} km/h", kmh_from_mps(fix.speed_mps)),
                dark_map: model.theme.is_dark_mode(),
            })
        }

        fn build_theme_view(theme: &ThemeState) -> crate::model::ThemeView {
            crate::model::ThemeView {
                is_dark_mode: theme.is_dark_mode(),
                follows_system: theme.follows_system(),
                scheme: theme.scheme(),
                status_bar: theme.status_bar(),
                palette: *theme.palette(),
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            let event_name = event.name();
            let _span = tracing::debug_span!("update", event = event_name).entered();

            if event.is_user_initiated() {
                debug!(event = event_name, "user action");
            }

            match event {
                Event::Noop => {}

                Event::AppStarted { config } => {
                    model.config = config;
                    caps.appearance.current(Event::SystemAppearanceResolved);
                    caps.appearance.on_change(Event::SystemAppearanceChanged);

                    info!(platform = ?config.platform, "core started");
                    caps.render.render();
                }

                Event::HomeMounted => {
                    Self::teardown_session(model, caps);

                    let token = SessionToken::generate();
                    model.location = Some(LocationSession::new(token));
                    Self::request_permission(token, caps);

                    info!(session = %token, "location session mounted");
                    caps.render.render();
                }

                Event::HomeUnmounted => {
                    Self::teardown_session(model, caps);
                    caps.render.render();
                }

                Event::MapDismissed => {
                    model.route = Route::Home;
                    caps.render.render();
                }

                Event::LocationPermissionResolved { session, result } => {
                    let options = model.config.watch;
                    let Some(live) = model.live_session_mut(session) else {
                        debug!(session = %session, "discarding permission result for inactive session");
                        return;
                    };

                    if live.resolve_permission(result).is_granted() {
                        info!(session = %session, "location permission granted");
                        Self::start_watch(session, options, caps);
                    } else {
                        warn!(
                            session = %session,
                            error = ?live.error().map(SessionError::code),
                            "location permission not granted"
                        );
                    }
                    caps.render.render();
                }

                Event::LocationPermissionRetryRequested => {
                    let Some(live) = model.location.as_mut() else {
                        debug!("no mounted session to retry");
                        return;
                    };
                    if !live.can_request_permission() {
                        debug!(permission = ?live.permission(), "permission retry not applicable");
                        return;
                    }

                    live.prepare_retry();
                    Self::request_permission(live.token(), caps);
                    caps.render.render();
                }

                Event::LocationWatchUpdate { session, result } => {
                    Self::handle_watch_update(model, caps, session, result);
                }

                Event::SystemAppearanceResolved(scheme) | Event::SystemAppearanceChanged(scheme) => {
                    if model.theme.on_system_change(scheme) {
                        info!(scheme = ?scheme, "theme follows system appearance");
                    }
                    caps.render.render();
                }

                Event::ToggleTheme => {
                    model.theme.toggle();
                    caps.render.render();
                }

                Event::SetDarkMode(value) => {
                    model.theme.set_explicit(value);
                    caps.render.render();
                }

                Event::FollowSystemAppearance => {
                    model.theme.follow_system();
                    caps.render.render();
                }

                Event::ShowOnMapRequested => {
                    let Some(fix) = Self::with_current_fix(model, "show_on_map") else {
                        return;
                    };
                    let route = Route::Map { fix };
                    model.route = route;
                    caps.navigation.navigate(route);
                    caps.render.render();
                }

                Event::OpenInMapsRequested => {
                    let Some(fix) = Self::with_current_fix(model, "open_in_maps") else {
                        return;
                    };
                    match links::maps_app_url(model.config.platform, &fix) {
                        Ok(url) => caps.linking.open_url(url.to_string(), |result| {
                            Event::ExternalActionCompleted {
                                action: ExternalAction::OpenInMaps,
                                result,
                            }
                        }),
                        Err(e) => warn!(error = %e, "could not build maps url"),
                    }
                }

                Event::ShareLocationRequested => {
                    let Some(fix) = Self::with_current_fix(model, "share_location") else {
                        return;
                    };
                    match links::share_content(&fix) {
                        Ok(content) => caps.share.share(content, |result| {
                            Event::ExternalActionCompleted {
                                action: ExternalAction::ShareLocation,
                                result,
                            }
                        }),
                        Err(e) => warn!(error = %e, "could not build share content"),
                    }
                }

                Event::ExternalActionCompleted { action, result } => match result {
                    Ok(outcome) => debug!(action = action.name(), outcome = ?outcome, "external action finished"),
                    Err(e) => {
                        let error = CoreError::from(e);
                        warn!(action = action.name(), error = %error, "external action failed");
                    }
                },
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel {
                route: model.route.name().to_string(),
                title: model.route.title().to_string(),
                home: Self::build_home_view(model),
                map: Self::build_map_view(model),
                theme: Self::build_theme_view(&model.theme),
            }
        }
    }
}

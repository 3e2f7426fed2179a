mod action;
mod appearance;
mod linking;
mod location;
mod navigation;
mod share;

pub use self::action::{ActionError, ActionOutcome, ActionResult, ExternalAction};
pub use self::appearance::{AppearanceOperation, ColorScheme};
pub use self::linking::LinkingOperation;
pub use self::location::{
    Accuracy, LocationError, LocationFix, LocationOperation, LocationOutput, LocationResult,
    PermissionResult, SubscriptionId, UnixTimeMs, WatchOptions,
};
pub use self::navigation::{NavigationOperation, Route};
pub use self::share::{ShareContent, ShareOperation};

// Crux's built-in Render capability covers view updates.
pub use crux_core::render::Render;

pub use self::appearance::Appearance;
pub use self::linking::Linking;
pub use self::location::Location;
pub use self::navigation::Navigation;
pub use self::share::Share;

use crate::app::App;
use crate::event::Event;

// Field names mirror the capability type names so the derived `Effect`
// variants read `Effect::Location`, `Effect::Appearance`, ...
#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub location: Location<Event>,
    pub appearance: Appearance<Event>,
    pub navigation: Navigation<Event>,
    pub linking: Linking<Event>,
    pub share: Share<Event>,
}

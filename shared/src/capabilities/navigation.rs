use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use super::location::LocationFix;

#[derive(Clone)]
pub struct Navigation<E> {
    context: CapabilityContext<NavigationOperation, E>,
}

impl<Ev> Capability<Ev> for Navigation<Ev> {
    type Operation = NavigationOperation;
    type MappedSelf<MappedEv> = Navigation<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Navigation::new(self.context.map_event(f))
    }
}

impl<E> Navigation<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<NavigationOperation, E>) -> Self {
        Self { context }
    }

    pub fn navigate(&self, route: Route) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(NavigationOperation::Navigate { route }).await;
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum NavigationOperation {
    Navigate { route: Route },
}

impl Operation for NavigationOperation {
    type Output = ();
}

/// Named stack routes. The map route carries the fix it was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Route {
    #[default]
    Home,
    Map {
        fix: LocationFix,
    },
}

impl Route {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Map { .. } => "map",
        }
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Home => crate::HOME_TITLE,
            Self::Map { .. } => crate::MAP_TITLE,
        }
    }
}

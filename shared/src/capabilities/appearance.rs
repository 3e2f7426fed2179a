use crux_core::capability::{Capability, CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct Appearance<E> {
    context: CapabilityContext<AppearanceOperation, E>,
}

impl<Ev> Capability<Ev> for Appearance<Ev> {
    type Operation = AppearanceOperation;
    type MappedSelf<MappedEv> = Appearance<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Appearance::new(self.context.map_event(f))
    }
}

impl<E> Appearance<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<AppearanceOperation, E>) -> Self {
        Self { context }
    }

    pub fn current<F>(&self, callback: F)
    where
        F: FnOnce(ColorScheme) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let scheme = context.request_from_shell(AppearanceOperation::Current).await;
            context.update_app(callback(scheme));
        });
    }

    /// Lives for the whole process; the shell keeps pushing changes until exit.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(ColorScheme) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let mut changes = context.stream_from_shell(AppearanceOperation::Subscribe);
            while let Some(scheme) = changes.next().await {
                context.update_app(callback(scheme));
            }
        });
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppearanceOperation {
    Current,
    Subscribe,
}

impl Operation for AppearanceOperation {
    type Output = ColorScheme;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    #[must_use]
    pub const fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

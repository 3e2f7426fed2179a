use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use super::action::ActionResult;

#[derive(Clone)]
pub struct Share<E> {
    context: CapabilityContext<ShareOperation, E>,
}

impl<Ev> Capability<Ev> for Share<Ev> {
    type Operation = ShareOperation;
    type MappedSelf<MappedEv> = Share<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Share::new(self.context.map_event(f))
    }
}

impl<E> Share<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<ShareOperation, E>) -> Self {
        Self { context }
    }

    pub fn share<F>(&self, content: ShareContent, callback: F)
    where
        F: FnOnce(ActionResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(ShareOperation::Share(content)).await;
            context.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShareContent {
    pub message: String,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareOperation {
    Share(ShareContent),
}

impl Operation for ShareOperation {
    type Output = ActionResult;
}

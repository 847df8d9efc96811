use crate::application::bridge::Bridge;
use crate::infrastructure::model::ModelProvider;
use std::sync::Arc;

pub(crate) struct ServerState<P: ModelProvider> {
    bridge: Arc<Bridge<P>>,
}

impl<P: ModelProvider> ServerState<P> {
    pub(crate) fn new(bridge: Arc<Bridge<P>>) -> Self {
        Self { bridge }
    }

    pub(crate) fn bridge(&self) -> &Bridge<P> {
        &self.bridge
    }
}

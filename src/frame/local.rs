use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::FrameAgent;
use crate::dom::Page;
use crate::protocol::{
    FrameDirectory, FrameId, FrameRequest, FrameResponse, FrameTransport, TabId, TransportError,
};

pub type SharedFrame<P> = Arc<Mutex<FrameAgent<P>>>;

/// A tab whose frames live in the same process. Requests are delivered by
/// locking the addressed frame.
pub struct LocalTab<P> {
    tab: TabId,
    frames: Vec<SharedFrame<P>>,
    ids: Vec<FrameId>,
}

impl<P: Page + Send + 'static> LocalTab<P> {
    pub fn new(tab: TabId) -> Self {
        Self {
            tab,
            frames: Vec::new(),
            ids: Vec::new(),
        }
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    /// Attaches a frame and returns a handle for driving its input.
    pub fn attach(&mut self, agent: FrameAgent<P>) -> SharedFrame<P> {
        let id = agent.id();
        let frame = Arc::new(Mutex::new(agent));
        self.ids.push(id);
        self.frames.push(frame.clone());
        frame
    }

    pub fn frame(&self, id: FrameId) -> Option<SharedFrame<P>> {
        self.ids
            .iter()
            .position(|candidate| *candidate == id)
            .and_then(|index| self.frames.get(index).cloned())
    }
}

#[async_trait]
impl<P: Page + Send + 'static> FrameDirectory for LocalTab<P> {
    async fn frames(&self, tab: TabId) -> Vec<FrameId> {
        if tab == self.tab {
            self.ids.clone()
        } else {
            Vec::new()
        }
    }
}

#[async_trait]
impl<P: Page + Send + 'static> FrameTransport for LocalTab<P> {
    async fn send(
        &self,
        tab: TabId,
        frame: FrameId,
        request: FrameRequest,
    ) -> Result<FrameResponse, TransportError> {
        let target = (tab == self.tab)
            .then(|| self.frame(frame))
            .flatten()
            .ok_or(TransportError::UnknownFrame { tab, frame })?;
        let mut agent = target.lock().await;
        Ok(agent.handle_request(request))
    }
}

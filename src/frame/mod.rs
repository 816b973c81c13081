mod local;

pub use local::{LocalTab, SharedFrame};

use std::sync::Arc;

use thiserror::Error;

use crate::capture::{CaptureAgent, Clock};
use crate::clipboard::ClipboardWriter;
use crate::config::AppConfig;
use crate::dom::Page;
use crate::geometry::Point;
use crate::input::{
    EventDisposition, InteractionKind, PaletteKey, PointerInteraction, TriggerPredicate,
};
use crate::palette::{ActionPalette, ActivationOutcome, PaletteError};
use crate::protocol::{FrameId, FrameRequest, FrameResponse, OpenResponse, QueryResponse};
use crate::resolve::{resolve_chain, revalidate, ResolveError};

#[derive(Debug, Error)]
pub enum OpenError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
}

impl OpenError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Resolve(err) => err.reason(),
            Self::Palette(err) => err.reason(),
        }
    }

    /// Declines are expected outcomes; anything else is a fault in the frame.
    fn is_decline(&self) -> bool {
        !matches!(self, Self::Palette(PaletteError::State(_)))
    }
}

pub struct FrameAgent<P> {
    id: FrameId,
    page: P,
    capture: CaptureAgent,
    direct_trigger: Option<TriggerPredicate>,
    palette: ActionPalette,
    clipboard: ClipboardWriter,
    clock: Arc<dyn Clock>,
}

impl<P: Page> FrameAgent<P> {
    pub fn new(
        id: FrameId,
        page: P,
        config: &AppConfig,
        clipboard: ClipboardWriter,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            id,
            page,
            capture: CaptureAgent::new(config.capture_trigger, config.context_ttl_ms),
            direct_trigger: config.direct_trigger,
            palette: ActionPalette::new(config.palette),
            clipboard,
            clock,
        }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn palette(&self) -> &ActionPalette {
        &self.palette
    }

    pub fn capture(&self) -> &CaptureAgent {
        &self.capture
    }

    /// Pointer interaction delivered to the frame.
    ///
    /// Capture is pure observation and never changes the disposition. The
    /// event is consumed only when the palette is open or the direct trigger
    /// opens one.
    pub fn on_pointer(&mut self, interaction: PointerInteraction) -> EventDisposition {
        let now = self.clock.now_ms();
        self.capture.capture(&interaction, now);

        if self.palette.is_open() {
            if interaction.kind == InteractionKind::PointerDown {
                return self.palette.pointer_down(&mut self.page, interaction.position);
            }
            return EventDisposition::PassThrough;
        }

        let direct = self
            .direct_trigger
            .is_some_and(|trigger| trigger.matches(&interaction));
        if !direct {
            return EventDisposition::PassThrough;
        }
        match self.open_at(interaction.position) {
            Ok(()) => EventDisposition::Consumed,
            Err(err) => {
                tracing::debug!(frame = ?self.id, %err, "direct open declined");
                EventDisposition::PassThrough
            }
        }
    }

    pub fn handle_query(&self) -> QueryResponse {
        QueryResponse::from(self.capture.query(self.clock.now_ms()))
    }

    /// Opens the palette for the elected capture, if it is still this
    /// frame's fresh capture.
    pub fn handle_open(&mut self, timestamp: u64) -> OpenResponse {
        match self.open_from_context(timestamp) {
            Ok(()) => OpenResponse::opened(),
            Err(err) if err.is_decline() => {
                tracing::debug!(frame = ?self.id, %err, "open request declined");
                OpenResponse::declined(err.reason())
            }
            Err(err) => {
                tracing::warn!(frame = ?self.id, %err, "open request failed");
                OpenResponse::failed(err.to_string())
            }
        }
    }

    pub fn handle_request(&mut self, request: FrameRequest) -> FrameResponse {
        match request {
            FrameRequest::QueryContext => FrameResponse::Query(self.handle_query()),
            FrameRequest::OpenFromContext { timestamp } => {
                FrameResponse::Open(self.handle_open(timestamp))
            }
        }
    }

    fn open_from_context(&mut self, timestamp: u64) -> Result<(), OpenError> {
        if self.palette.is_open() {
            return Err(PaletteError::AlreadyOpen.into());
        }
        let context = revalidate(&self.capture, timestamp, self.clock.now_ms())?;
        self.open_at(context.position)
    }

    fn open_at(&mut self, position: Point) -> Result<(), OpenError> {
        if self.palette.is_open() {
            return Err(PaletteError::AlreadyOpen.into());
        }
        let chain = resolve_chain(&self.page, position)?;
        self.palette.open(&mut self.page, chain, position)?;
        tracing::info!(frame = ?self.id, x = position.x, y = position.y, "palette opened");
        Ok(())
    }

    pub async fn on_key(&mut self, key: PaletteKey) -> EventDisposition {
        self.palette
            .handle_key(&mut self.page, &self.clipboard, key)
            .await
    }

    pub async fn activate(&mut self, index: usize) -> Option<ActivationOutcome> {
        self.palette
            .activate(&mut self.page, &self.clipboard, index)
            .await
    }

    pub fn hover_item(&mut self, index: usize) {
        self.palette.hover_item(&mut self.page, index);
    }

    pub fn hover_group(&mut self, group: usize) {
        self.palette.hover_group(&mut self.page, group);
    }

    pub fn hover_sticky(&mut self) {
        self.palette.hover_sticky(&mut self.page);
    }

    pub fn on_list_scroll(&mut self, scroll_top: f64) {
        self.palette.on_list_scroll(scroll_top);
    }

    /// Page scroll or window resize.
    pub fn on_viewport_changed(&mut self) {
        self.palette.on_viewport_changed(&mut self.page);
    }
}

impl<P> std::fmt::Debug for FrameAgent<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameAgent")
            .field("id", &self.id)
            .field("palette", &self.palette.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ManualClock;
    use crate::clipboard::MemoryClipboard;
    use crate::dom::{Document, NodeId};
    use crate::geometry::{Rect, Viewport};
    use crate::input::{Modifiers, PointerButton};

    struct Harness {
        agent: FrameAgent<Document>,
        clock: Arc<ManualClock>,
        clipboard: MemoryClipboard,
        link: NodeId,
    }

    fn harness(config: AppConfig) -> Harness {
        let mut doc = Document::new(Viewport::new(800.0, 600.0));
        let body = doc.create_root("body");
        doc.set_rect(body, Rect::new(0.0, 0.0, 800.0, 300.0));
        let link = doc.append_element(body, "a");
        doc.set_attribute(link, "href", "/a");
        doc.set_rect(link, Rect::new(10.0, 10.0, 100.0, 20.0));
        doc.append_text(link, "docs");

        let clock = Arc::new(ManualClock::new(1_000));
        let clipboard = MemoryClipboard::new();
        let agent = FrameAgent::new(
            FrameId(0),
            doc,
            &config,
            ClipboardWriter::new().with_strategy(clipboard.clone()),
            clock.clone(),
        );
        Harness {
            agent,
            clock,
            clipboard,
            link,
        }
    }

    fn right_click(x: f64, y: f64) -> PointerInteraction {
        PointerInteraction::pointer_down(PointerButton::Secondary, Modifiers::NONE, Point::new(x, y))
    }

    #[test]
    fn capture_is_passive() {
        let mut h = harness(AppConfig::default());
        assert_eq!(
            h.agent.on_pointer(right_click(20.0, 20.0)),
            EventDisposition::PassThrough
        );
        let query = h.agent.handle_query();
        assert!(query.ok && query.has_context);
        assert_eq!(query.timestamp, 1_000);
    }

    #[test]
    fn open_with_matching_timestamp_opens_palette() {
        let mut h = harness(AppConfig::default());
        h.agent.on_pointer(right_click(20.0, 20.0));
        h.clock.advance(50);

        assert_eq!(h.agent.handle_open(1_000), OpenResponse::opened());
        assert!(h.agent.palette().is_open());
        assert_eq!(
            h.agent.palette().highlight().tracked_element,
            Some(h.link)
        );
    }

    #[test]
    fn open_with_other_timestamp_is_stale() {
        let mut h = harness(AppConfig::default());
        h.agent.on_pointer(right_click(20.0, 20.0));
        assert_eq!(
            h.agent.handle_open(999),
            OpenResponse::declined("stale-election")
        );
        assert!(!h.agent.palette().is_open());
    }

    #[test]
    fn expired_capture_never_opens_even_with_exact_timestamp() {
        let mut h = harness(AppConfig::default());
        h.agent.on_pointer(right_click(20.0, 20.0));
        h.clock.advance(30_001);
        assert_eq!(
            h.agent.handle_open(1_000),
            OpenResponse::declined("stale-election")
        );
        assert!(!h.agent.palette().is_open());
    }

    #[test]
    fn capture_outside_every_element_reports_no_target() {
        let mut h = harness(AppConfig::default());
        h.agent.on_pointer(right_click(20.0, 500.0));
        assert_eq!(h.agent.handle_open(1_000), OpenResponse::declined("no-target"));
    }

    #[test]
    fn repeated_open_is_ignored() {
        let mut h = harness(AppConfig::default());
        h.agent.on_pointer(right_click(20.0, 20.0));
        assert!(h.agent.handle_open(1_000).opened);
        assert_eq!(
            h.agent.handle_open(1_000),
            OpenResponse::declined("already-open")
        );
        assert_eq!(h.agent.palette().history().len(), 1);
    }

    #[test]
    fn direct_trigger_opens_in_place_and_consumes_event() {
        let config = AppConfig {
            direct_trigger: Some(TriggerPredicate::command_click()),
            ..AppConfig::default()
        };
        let mut h = harness(config);
        let click = PointerInteraction::pointer_down(
            PointerButton::Primary,
            Modifiers::ctrl(),
            Point::new(20.0, 20.0),
        );
        assert_eq!(h.agent.on_pointer(click), EventDisposition::Consumed);
        assert!(h.agent.palette().is_open());
        assert_eq!(
            h.agent.palette().chain().and_then(|chain| chain.target()),
            Some(h.link)
        );
    }

    #[test]
    fn pointer_down_outside_open_palette_cancels() {
        let mut h = harness(AppConfig::default());
        h.agent.on_pointer(right_click(20.0, 20.0));
        h.agent.handle_open(1_000);
        let outside = PointerInteraction::pointer_down(
            PointerButton::Primary,
            Modifiers::NONE,
            Point::new(790.0, 5.0),
        );
        assert_eq!(h.agent.on_pointer(outside), EventDisposition::Consumed);
        assert!(!h.agent.palette().is_open());
        assert!(h.agent.page().ui_nodes().is_empty());
    }

    #[tokio::test]
    async fn enter_copies_live_attribute_value() {
        let mut h = harness(AppConfig::default());
        h.agent.on_pointer(right_click(20.0, 20.0));
        h.agent.handle_open(1_000);
        for _ in 0..5 {
            h.agent.on_key(PaletteKey::ArrowDown).await;
        }
        h.agent.page_mut().set_attribute(h.link, "href", "/b");

        assert_eq!(h.agent.on_key(PaletteKey::Enter).await, EventDisposition::Consumed);
        assert_eq!(h.clipboard.contents().as_deref(), Some("/b"));
        assert!(!h.agent.palette().is_open());
    }
}

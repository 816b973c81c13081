//! Interactive list of copy actions over an ancestor chain.

mod layout;
mod list;

pub use layout::ListLayout;
pub use list::{ActionGroup, FlattenedActionList, PaletteItem};

use thiserror::Error;

use crate::catalog::{payload_for, ActionKind};
use crate::clipboard::ClipboardWriter;
use crate::config::PaletteSettings;
use crate::dom::{NodeId, Page, UiNodeId, UiNodeKind};
use crate::geometry::{clamp_to_viewport, Point, Rect, Viewport};
use crate::input::{resolve_palette_key, EventDisposition, PaletteCommand, PaletteKey};
use crate::overlay::{HighlightOverlay, HighlightState};
use crate::resolve::AncestorChain;
use crate::state::{PaletteEvent, PaletteState, StateError, StateMachine, StateTransition};

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("palette is already open")]
    AlreadyOpen,
    #[error("ancestor chain is empty")]
    EmptyChain,
    #[error(transparent)]
    State(#[from] StateError),
}

impl PaletteError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::AlreadyOpen => "already-open",
            Self::EmptyChain => "empty-chain",
            Self::State(_) => "invalid-state",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationOutcome {
    pub element: NodeId,
    pub kind: ActionKind,
    pub payload: String,
    /// Whether any clipboard strategy accepted the payload.
    pub copied: bool,
}

#[derive(Debug)]
struct PaletteSession {
    chain: AncestorChain,
    list: FlattenedActionList,
    layout: ListLayout,
    active_index: usize,
    scroll_top: f64,
    sticky_group: Option<usize>,
    bounds: Rect,
    backdrop: UiNodeId,
    panel: UiNodeId,
}

/// Per-frame palette controller. At most one session exists at a time; it
/// is created on open and dropped on close together with every node it
/// inserted into the page.
#[derive(Debug)]
pub struct ActionPalette {
    settings: PaletteSettings,
    machine: StateMachine,
    session: Option<PaletteSession>,
    overlay: HighlightOverlay,
}

impl ActionPalette {
    pub fn new(settings: PaletteSettings) -> Self {
        Self {
            overlay: HighlightOverlay::new(settings.highlight_padding_px),
            settings,
            machine: StateMachine::new(),
            session: None,
        }
    }

    pub fn state(&self) -> PaletteState {
        self.machine.state()
    }

    pub fn is_open(&self) -> bool {
        self.machine.state().is_open()
    }

    pub fn history(&self) -> &[StateTransition] {
        self.machine.history()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.session.as_ref().map(|session| session.active_index)
    }

    pub fn active_item(&self) -> Option<&PaletteItem> {
        let session = self.session.as_ref()?;
        session.list.get(session.active_index)
    }

    pub fn list(&self) -> Option<&FlattenedActionList> {
        self.session.as_ref().map(|session| &session.list)
    }

    pub fn chain(&self) -> Option<&AncestorChain> {
        self.session.as_ref().map(|session| &session.chain)
    }

    pub fn scroll_top(&self) -> Option<f64> {
        self.session.as_ref().map(|session| session.scroll_top)
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.session.as_ref().map(|session| session.bounds)
    }

    pub fn sticky_label(&self) -> Option<&str> {
        let session = self.session.as_ref()?;
        let group = session.sticky_group?;
        session.list.groups().get(group).map(|group| group.label.as_str())
    }

    pub fn highlight(&self) -> HighlightState {
        self.overlay.state()
    }

    /// Opens the palette near `anchor`. A second open while a session is
    /// live is rejected and leaves that session untouched.
    pub fn open<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        chain: AncestorChain,
        anchor: Point,
    ) -> Result<(), PaletteError> {
        if self.is_open() {
            tracing::debug!("ignoring open request while palette is open");
            return Err(PaletteError::AlreadyOpen);
        }
        if chain.is_empty() {
            return Err(PaletteError::EmptyChain);
        }

        let list = FlattenedActionList::build(&*page, &chain, &self.settings);
        let layout = ListLayout::new(&list, &self.settings);
        let viewport = page.viewport();
        let bounds = self.panel_bounds(viewport, &layout, anchor);

        self.machine.transition(PaletteEvent::Open)?;

        let backdrop = page.mount_ui(UiNodeKind::Backdrop);
        page.place_ui(backdrop, viewport.bounds(), true);
        let panel = page.mount_ui(UiNodeKind::Palette);
        page.place_ui(panel, bounds, true);

        tracing::info!(
            groups = list.groups().len(),
            items = list.len(),
            "opened action palette"
        );
        let sticky_group = layout.sticky_group(0.0);
        self.session = Some(PaletteSession {
            chain,
            list,
            layout,
            active_index: 0,
            scroll_top: 0.0,
            sticky_group,
            bounds,
            backdrop,
            panel,
        });
        self.set_active(page, 0);
        Ok(())
    }

    fn panel_bounds(
        &self,
        viewport: Viewport,
        layout: &ListLayout,
        anchor: Point,
    ) -> Rect {
        let settings = &self.settings;
        let pad = settings.viewport_padding_px;
        let width = settings
            .max_width
            .min(viewport.width - pad * 2.0)
            .max(settings.min_width);
        let height = settings.header_height + layout.viewport_height();
        let origin = clamp_to_viewport(
            anchor.offset(settings.cursor_offset_px, settings.cursor_offset_px),
            (width, height),
            viewport,
            pad,
        );
        Rect::new(origin.x, origin.y, width, height)
    }

    pub fn cancel<P: Page + ?Sized>(&mut self, page: &mut P) {
        self.close(page, PaletteEvent::Cancel);
    }

    fn close<P: Page + ?Sized>(&mut self, page: &mut P, event: PaletteEvent) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.overlay.teardown(page);
        page.unmount_ui(session.backdrop);
        page.unmount_ui(session.panel);
        if let Err(err) = self.machine.transition(event) {
            tracing::warn!(%err, "palette closed from unexpected state");
        }
        tracing::debug!(?event, "closed action palette");
    }

    fn set_active<P: Page + ?Sized>(&mut self, page: &mut P, index: usize) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.list.is_empty() {
            return;
        }
        let clamped = index.min(session.list.len() - 1);
        session.active_index = clamped;
        session.scroll_top = session.layout.reveal(session.scroll_top, clamped);
        session.sticky_group = session.layout.sticky_group(session.scroll_top);
        let element = session.list.items()[clamped].element;
        self.overlay.show(page, element);
    }

    /// Moves the active item by `delta`, stopping at either end.
    pub fn move_active<P: Page + ?Sized>(&mut self, page: &mut P, delta: isize) {
        let Some(current) = self.active_index() else {
            return;
        };
        let target = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        self.set_active(page, target);
    }

    pub fn move_to_first<P: Page + ?Sized>(&mut self, page: &mut P) {
        if self.is_open() {
            self.set_active(page, 0);
        }
    }

    pub fn move_to_last<P: Page + ?Sized>(&mut self, page: &mut P) {
        if let Some(len) = self.list().map(FlattenedActionList::len) {
            self.set_active(page, len.saturating_sub(1));
        }
    }

    pub fn hover_item<P: Page + ?Sized>(&mut self, page: &mut P, index: usize) {
        let in_range = self.list().is_some_and(|list| index < list.len());
        if in_range {
            self.set_active(page, index);
        }
    }

    /// Highlights a group's element without moving the active item.
    pub fn hover_group<P: Page + ?Sized>(&mut self, page: &mut P, group: usize) {
        let element = self
            .list()
            .and_then(|list| list.groups().get(group))
            .map(|group| group.element);
        if let Some(element) = element {
            self.overlay.show(page, element);
        }
    }

    pub fn hover_sticky<P: Page + ?Sized>(&mut self, page: &mut P) {
        if let Some(group) = self.session.as_ref().and_then(|session| session.sticky_group) {
            self.hover_group(page, group);
        }
    }

    /// Scroll event from the palette's own list.
    pub fn on_list_scroll(&mut self, scroll_top: f64) {
        if let Some(session) = self.session.as_mut() {
            session.scroll_top = session.layout.clamp_scroll(scroll_top);
            session.sticky_group = session.layout.sticky_group(session.scroll_top);
        }
    }

    /// Page scroll or resize: the highlight follows its element.
    pub fn on_viewport_changed<P: Page + ?Sized>(&mut self, page: &mut P) {
        if self.is_open() {
            self.overlay.refresh(page);
        }
    }

    /// Pointer press while open. Presses outside the panel cancel.
    pub fn pointer_down<P: Page + ?Sized>(&mut self, page: &mut P, point: Point) -> EventDisposition {
        let Some(bounds) = self.bounds() else {
            return EventDisposition::PassThrough;
        };
        if !bounds.contains(point) {
            self.cancel(page);
        }
        EventDisposition::Consumed
    }

    pub async fn handle_key<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        clipboard: &ClipboardWriter,
        key: PaletteKey,
    ) -> EventDisposition {
        if !self.is_open() {
            return EventDisposition::PassThrough;
        }
        let Some(command) = resolve_palette_key(key) else {
            return EventDisposition::PassThrough;
        };
        match command {
            PaletteCommand::MoveNext => self.move_active(page, 1),
            PaletteCommand::MovePrevious => self.move_active(page, -1),
            PaletteCommand::MoveFirst => self.move_to_first(page),
            PaletteCommand::MoveLast => self.move_to_last(page),
            PaletteCommand::Cancel => self.cancel(page),
            PaletteCommand::Activate => {
                if let Some(index) = self.active_index() {
                    self.activate(page, clipboard, index).await;
                }
            }
        }
        EventDisposition::Consumed
    }

    /// Copies the payload of item `index` from the element's current state,
    /// flashes the highlight on it and closes the palette. The clipboard
    /// outcome is reported, never raised.
    pub async fn activate<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        clipboard: &ClipboardWriter,
        index: usize,
    ) -> Option<ActivationOutcome> {
        let item = self.list()?.get(index)?.clone();
        let element = item.element;

        page.scroll_into_view(element);
        let payload = payload_for(&*page, element, &item.action);
        let copied = clipboard.write(&payload).await;
        if !copied {
            tracing::warn!(?element, kind = ?item.action.kind, "copy failed; highlighting anyway");
        }

        self.overlay.show(page, element);
        self.close(page, PaletteEvent::Activated);

        Some(ActivationOutcome {
            element,
            kind: item.action.kind,
            payload,
            copied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::dom::Document;
    use crate::geometry::Viewport;
    use crate::resolve::resolve_chain;

    struct Fixture {
        doc: Document,
        link: NodeId,
        nav: NodeId,
        body: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new(Viewport::new(1024.0, 768.0));
        let body = doc.create_root("body");
        doc.set_rect(body, Rect::new(0.0, 0.0, 1024.0, 2000.0));
        let nav = doc.append_element(body, "nav");
        doc.set_attribute(nav, "class", "top");
        doc.set_rect(nav, Rect::new(0.0, 0.0, 1024.0, 60.0));
        let link = doc.append_element(nav, "a");
        doc.set_attribute(link, "href", "/a");
        doc.set_attribute(link, "id", "home");
        doc.set_rect(link, Rect::new(20.0, 20.0, 80.0, 20.0));
        doc.append_text(link, " Home ");
        Fixture {
            doc,
            link,
            nav,
            body,
        }
    }

    fn open(fixture: &mut Fixture) -> ActionPalette {
        let mut palette = ActionPalette::new(PaletteSettings::default());
        let chain = resolve_chain(&fixture.doc, Point::new(30.0, 30.0)).expect("chain");
        palette
            .open(&mut fixture.doc, chain, Point::new(30.0, 30.0))
            .expect("open");
        palette
    }

    #[test]
    fn open_activates_first_item_and_highlights_target() {
        let mut fx = fixture();
        let palette = open(&mut fx);

        assert!(palette.is_open());
        assert_eq!(palette.active_index(), Some(0));
        assert_eq!(palette.highlight().tracked_element, Some(fx.link));
        assert!(palette.highlight().is_visible);
        assert_eq!(palette.sticky_label(), Some("a#home"));
        assert_eq!(palette.list().map(FlattenedActionList::len), Some(7 + 6 + 5));
        assert_eq!(fx.doc.ui_nodes().len(), 3);
    }

    #[test]
    fn open_places_panel_near_pointer_inside_viewport() {
        let mut fx = fixture();
        let mut palette = ActionPalette::new(PaletteSettings::default());
        let chain = resolve_chain(&fx.doc, Point::new(30.0, 30.0)).expect("chain");
        palette
            .open(&mut fx.doc, chain, Point::new(1000.0, 30.0))
            .expect("open");
        let bounds = palette.bounds().expect("bounds");
        assert_eq!(bounds.width, 560.0);
        assert_eq!(bounds.x, 1024.0 - 560.0 - 8.0);
        assert_eq!(bounds.y, 42.0);
    }

    #[test]
    fn second_open_is_ignored_while_open() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        palette.move_active(&mut fx.doc, 3);

        let chain = resolve_chain(&fx.doc, Point::new(500.0, 500.0)).expect("chain");
        let err = palette
            .open(&mut fx.doc, chain, Point::new(500.0, 500.0))
            .expect_err("already open");
        assert!(matches!(err, PaletteError::AlreadyOpen));
        assert_eq!(palette.active_index(), Some(3));
        assert_eq!(palette.chain().and_then(AncestorChain::target), Some(fx.link));
    }

    #[test]
    fn navigation_clamps_without_wraparound() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);

        palette.move_active(&mut fx.doc, -1);
        assert_eq!(palette.active_index(), Some(0));

        palette.move_to_last(&mut fx.doc);
        let last = palette.list().map(FlattenedActionList::len).expect("len") - 1;
        assert_eq!(palette.active_index(), Some(last));
        palette.move_active(&mut fx.doc, 1);
        assert_eq!(palette.active_index(), Some(last));
        assert_eq!(palette.highlight().tracked_element, Some(fx.body));

        palette.move_to_first(&mut fx.doc);
        assert_eq!(palette.active_index(), Some(0));
    }

    #[test]
    fn moving_into_next_group_reveals_its_header() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        palette.move_active(&mut fx.doc, 7);

        assert_eq!(palette.active_index(), Some(7));
        assert_eq!(palette.highlight().tracked_element, Some(fx.nav));
        // Header of the nav group (424) and item 7 (452..504) both end up
        // inside the 316px list viewport, so the sticky row still shows "a".
        assert_eq!(palette.scroll_top(), Some(188.0));
        assert_eq!(palette.sticky_label(), Some("a#home"));
    }

    #[test]
    fn hover_item_sets_active_index() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        palette.hover_item(&mut fx.doc, 9);
        assert_eq!(palette.active_index(), Some(9));
        palette.hover_item(&mut fx.doc, 999);
        assert_eq!(palette.active_index(), Some(9));
    }

    #[test]
    fn hover_group_highlights_without_moving_selection() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        palette.hover_group(&mut fx.doc, 2);
        assert_eq!(palette.active_index(), Some(0));
        assert_eq!(palette.highlight().tracked_element, Some(fx.body));
    }

    #[test]
    fn list_scroll_recomputes_sticky_group() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        let settings = PaletteSettings::default();
        let second_header = settings.sticky_height
            + settings.section_height
            + 7.0 * settings.item_height;

        palette.on_list_scroll(second_header - settings.sticky_height);
        assert_eq!(palette.sticky_label(), Some("nav.top"));
        palette.on_list_scroll(0.0);
        assert_eq!(palette.sticky_label(), Some("a#home"));
    }

    #[test]
    fn viewport_change_refreshes_highlight_position() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        fx.doc.scroll_by(0.0, 10.0);
        palette.on_viewport_changed(&mut fx.doc);
        let highlight = fx
            .doc
            .ui_nodes()
            .values()
            .find(|record| record.kind == UiNodeKind::Highlight)
            .and_then(|record| record.rect)
            .expect("highlight rect");
        assert_eq!(highlight, Rect::new(18.0, 8.0, 84.0, 24.0));
    }

    #[test]
    fn cancel_hides_highlight_and_removes_every_node() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        palette.cancel(&mut fx.doc);

        assert!(!palette.is_open());
        assert!(!palette.highlight().is_visible);
        assert_eq!(palette.active_index(), None);
        assert!(fx.doc.ui_nodes().is_empty());
    }

    #[test]
    fn pointer_down_outside_panel_cancels() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        let bounds = palette.bounds().expect("bounds");

        let inside = Point::new(bounds.x + 1.0, bounds.y + 1.0);
        assert_eq!(
            palette.pointer_down(&mut fx.doc, inside),
            EventDisposition::Consumed
        );
        assert!(palette.is_open());

        assert_eq!(
            palette.pointer_down(&mut fx.doc, Point::new(1.0, 700.0)),
            EventDisposition::Consumed
        );
        assert!(!palette.is_open());
        assert!(fx.doc.ui_nodes().is_empty());
        assert_eq!(
            palette.pointer_down(&mut fx.doc, Point::new(1.0, 700.0)),
            EventDisposition::PassThrough
        );
    }

    #[tokio::test]
    async fn activate_copies_live_attribute_value() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        let clipboard = MemoryClipboard::new();
        let writer = ClipboardWriter::new().with_strategy(clipboard.clone());

        fx.doc.set_attribute(fx.link, "href", "/b");
        let outcome = palette
            .activate(&mut fx.doc, &writer, 5)
            .await
            .expect("activation");

        assert_eq!(outcome.kind, ActionKind::Attribute);
        assert_eq!(outcome.payload, "/b");
        assert!(outcome.copied);
        assert_eq!(clipboard.contents().as_deref(), Some("/b"));
        assert_eq!(fx.doc.last_scrolled_into_view(), Some(fx.link));
        assert!(!palette.is_open());
        assert!(fx.doc.ui_nodes().is_empty());
    }

    #[tokio::test]
    async fn activate_reports_clipboard_failure_and_still_closes() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        let writer = ClipboardWriter::new().with_strategy(MemoryClipboard::unavailable());

        let outcome = palette
            .activate(&mut fx.doc, &writer, 0)
            .await
            .expect("activation");
        assert_eq!(outcome.payload, "Home");
        assert!(!outcome.copied);
        assert!(!palette.is_open());
        assert_eq!(
            palette.history().last().map(|transition| transition.event),
            Some(PaletteEvent::Activated)
        );
    }

    #[tokio::test]
    async fn keys_drive_navigation_activation_and_cancel() {
        let mut fx = fixture();
        let mut palette = open(&mut fx);
        let clipboard = MemoryClipboard::new();
        let writer = ClipboardWriter::new().with_strategy(clipboard.clone());

        for key in [PaletteKey::ArrowDown, PaletteKey::ArrowDown, PaletteKey::ArrowUp] {
            assert_eq!(
                palette.handle_key(&mut fx.doc, &writer, key).await,
                EventDisposition::Consumed
            );
        }
        assert_eq!(palette.active_index(), Some(1));
        assert_eq!(
            palette
                .handle_key(&mut fx.doc, &writer, PaletteKey::Character('x'))
                .await,
            EventDisposition::PassThrough
        );

        palette.handle_key(&mut fx.doc, &writer, PaletteKey::Enter).await;
        assert_eq!(clipboard.contents().as_deref(), Some("Home"));
        assert!(!palette.is_open());
        assert_eq!(
            palette.handle_key(&mut fx.doc, &writer, PaletteKey::Escape).await,
            EventDisposition::PassThrough
        );
    }

    #[tokio::test]
    async fn activate_when_closed_does_nothing() {
        let mut fx = fixture();
        let mut palette = ActionPalette::new(PaletteSettings::default());
        let writer = ClipboardWriter::new().with_strategy(MemoryClipboard::new());
        assert!(palette.activate(&mut fx.doc, &writer, 0).await.is_none());
    }
}

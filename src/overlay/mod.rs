use crate::dom::{NodeId, Page, UiNodeId, UiNodeKind};
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlightState {
    pub tracked_element: Option<NodeId>,
    pub is_visible: bool,
}

/// Non-interactive box drawn over one element at a time.
///
/// The position is recomputed on demand (`refresh`) from scroll and resize
/// events; nothing polls it.
#[derive(Debug, Default)]
pub struct HighlightOverlay {
    node: Option<UiNodeId>,
    state: HighlightState,
    padding: f64,
    last_rect: Option<Rect>,
}

impl HighlightOverlay {
    pub fn new(padding: f64) -> Self {
        Self {
            padding,
            ..Self::default()
        }
    }

    pub fn state(&self) -> HighlightState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_visible
    }

    pub fn tracked_element(&self) -> Option<NodeId> {
        self.state.tracked_element
    }

    /// Last box drawn, padding included.
    pub fn last_rect(&self) -> Option<Rect> {
        self.last_rect
    }

    pub fn show<P: Page + ?Sized>(&mut self, page: &mut P, element: NodeId) {
        if self.node.is_none() {
            self.node = Some(page.mount_ui(UiNodeKind::Highlight));
        }
        self.state.tracked_element = Some(element);
        self.refresh(page);
    }

    pub fn hide<P: Page + ?Sized>(&mut self, page: &mut P) {
        self.state = HighlightState::default();
        self.last_rect = None;
        if let Some(node) = self.node {
            page.place_ui(node, Rect::default(), false);
        }
    }

    /// Re-measures the tracked element; an element without area hides the box.
    pub fn refresh<P: Page + ?Sized>(&mut self, page: &mut P) {
        let (Some(node), Some(element)) = (self.node, self.state.tracked_element) else {
            return;
        };
        match page.bounding_rect(element).filter(Rect::has_area) {
            Some(rect) => {
                let padded = rect.inflate(self.padding);
                page.place_ui(node, padded, true);
                self.last_rect = Some(padded);
                self.state.is_visible = true;
            }
            None => {
                tracing::trace!(?element, "tracked element has no area; hiding highlight");
                self.hide(page);
            }
        }
    }

    /// Hides and removes the overlay node from the page.
    pub fn teardown<P: Page + ?Sized>(&mut self, page: &mut P) {
        self.hide(page);
        if let Some(node) = self.node.take() {
            page.unmount_ui(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::geometry::Viewport;

    fn page_with_box(rect: Rect) -> (Document, NodeId) {
        let mut doc = Document::new(Viewport::default());
        let body = doc.create_root("body");
        let div = doc.append_element(body, "div");
        doc.set_rect(div, rect);
        (doc, div)
    }

    #[test]
    fn show_draws_padded_box_over_element() {
        let (mut doc, div) = page_with_box(Rect::new(10.0, 20.0, 100.0, 50.0));
        let mut overlay = HighlightOverlay::new(2.0);
        overlay.show(&mut doc, div);

        assert!(overlay.is_visible());
        assert_eq!(overlay.tracked_element(), Some(div));
        assert_eq!(overlay.last_rect(), Some(Rect::new(8.0, 18.0, 104.0, 54.0)));
        let record = doc.ui_nodes().values().next().expect("highlight node");
        assert!(record.visible);
        assert_eq!(record.kind, UiNodeKind::Highlight);
    }

    #[test]
    fn show_on_zero_area_element_hides_instead() {
        let (mut doc, div) = page_with_box(Rect::new(10.0, 20.0, 0.0, 50.0));
        let mut overlay = HighlightOverlay::new(2.0);
        overlay.show(&mut doc, div);

        assert_eq!(overlay.state(), HighlightState::default());
    }

    #[test]
    fn refresh_follows_scrolling_without_changing_target() {
        let (mut doc, div) = page_with_box(Rect::new(10.0, 100.0, 100.0, 50.0));
        let mut overlay = HighlightOverlay::new(0.0);
        overlay.show(&mut doc, div);

        doc.scroll_by(0.0, 40.0);
        overlay.refresh(&mut doc);
        assert_eq!(overlay.tracked_element(), Some(div));
        assert_eq!(overlay.last_rect(), Some(Rect::new(10.0, 60.0, 100.0, 50.0)));
    }

    #[test]
    fn teardown_removes_the_overlay_node() {
        let (mut doc, div) = page_with_box(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut overlay = HighlightOverlay::new(2.0);
        overlay.show(&mut doc, div);
        overlay.teardown(&mut doc);

        assert!(!overlay.is_visible());
        assert!(doc.ui_nodes().is_empty());
    }
}

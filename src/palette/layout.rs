use super::list::FlattenedActionList;
use crate::config::PaletteSettings;

/// Vertical geometry of the scrollable list: a sticky label row first, then
/// each group's header followed by its items.
#[derive(Debug, Clone, PartialEq)]
pub struct ListLayout {
    section_offsets: Vec<f64>,
    item_offsets: Vec<f64>,
    item_groups: Vec<usize>,
    content_height: f64,
    viewport_height: f64,
    item_height: f64,
    sticky_height: f64,
}

impl ListLayout {
    pub fn new(list: &FlattenedActionList, settings: &PaletteSettings) -> Self {
        let mut offset = settings.sticky_height;
        let mut section_offsets = Vec::with_capacity(list.groups().len());
        let mut item_offsets = Vec::with_capacity(list.len());
        let mut item_groups = Vec::with_capacity(list.len());

        for (index, group) in list.groups().iter().enumerate() {
            section_offsets.push(offset);
            offset += settings.section_height;
            for _ in 0..group.len {
                item_offsets.push(offset);
                item_groups.push(index);
                offset += settings.item_height;
            }
        }

        let available = (settings.max_height - settings.header_height).max(settings.sticky_height);
        Self {
            section_offsets,
            item_offsets,
            item_groups,
            content_height: offset,
            viewport_height: offset.min(available),
            item_height: settings.item_height,
            sticky_height: settings.sticky_height,
        }
    }

    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Height of the visible part of the list.
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn max_scroll(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    pub fn clamp_scroll(&self, scroll_top: f64) -> f64 {
        scroll_top.clamp(0.0, self.max_scroll())
    }

    pub fn item_offset(&self, index: usize) -> Option<f64> {
        self.item_offsets.get(index).copied()
    }

    pub fn section_offset(&self, group: usize) -> Option<f64> {
        self.section_offsets.get(group).copied()
    }

    /// Last group whose header starts at or above the bottom edge of the
    /// sticky label row.
    pub fn sticky_group(&self, scroll_top: f64) -> Option<usize> {
        if self.section_offsets.is_empty() {
            return None;
        }
        let threshold = scroll_top + self.sticky_height;
        let passed = self
            .section_offsets
            .iter()
            .take_while(|offset| **offset <= threshold)
            .count();
        Some(passed.saturating_sub(1))
    }

    /// Scroll position that shows item `index` together with its group
    /// header, or just the item when both do not fit.
    pub fn reveal(&self, scroll_top: f64, index: usize) -> f64 {
        let (Some(item_top), Some(group)) = (self.item_offset(index), self.item_groups.get(index))
        else {
            return scroll_top;
        };
        let item_bottom = item_top + self.item_height;
        let header_top = self.section_offset(*group).unwrap_or(item_top);
        let band = self.viewport_height - self.sticky_height;

        let next = if item_bottom - header_top <= band {
            self.nearest(scroll_top, header_top, item_bottom)
        } else {
            self.nearest(scroll_top, item_top, item_bottom)
        };
        self.clamp_scroll(next)
    }

    fn nearest(&self, scroll_top: f64, top: f64, bottom: f64) -> f64 {
        let visible_top = scroll_top + self.sticky_height;
        let visible_bottom = scroll_top + self.viewport_height;
        if top < visible_top {
            top - self.sticky_height
        } else if bottom > visible_bottom {
            bottom - self.viewport_height
        } else {
            scroll_top
        }
    }
}

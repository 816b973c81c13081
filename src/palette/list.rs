use crate::catalog::{build_actions, element_identifier, Action};
use crate::config::PaletteSettings;
use crate::dom::{NodeId, Page};
use crate::resolve::AncestorChain;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteItem {
    pub element: NodeId,
    pub group: usize,
    pub action: Action,
}

/// A run of consecutive items that belong to one ancestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionGroup {
    pub element: NodeId,
    pub label: String,
    pub start: usize,
    pub len: usize,
}

impl ActionGroup {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Actions of every ancestor concatenated in chain order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedActionList {
    items: Vec<PaletteItem>,
    groups: Vec<ActionGroup>,
}

impl FlattenedActionList {
    pub fn build<P: Page + ?Sized>(
        page: &P,
        chain: &AncestorChain,
        settings: &PaletteSettings,
    ) -> Self {
        let mut list = Self::default();
        for (group, element) in chain.iter().enumerate() {
            let start = list.items.len();
            list.items.extend(
                build_actions(page, element, settings)
                    .into_iter()
                    .map(|action| PaletteItem {
                        element,
                        group,
                        action,
                    }),
            );
            list.groups.push(ActionGroup {
                element,
                label: element_identifier(page, element, settings),
                start,
                len: list.items.len() - start,
            });
        }
        list
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PaletteItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[PaletteItem] {
        &self.items
    }

    pub fn groups(&self) -> &[ActionGroup] {
        &self.groups
    }

    pub fn group_of(&self, index: usize) -> Option<&ActionGroup> {
        self.items
            .get(index)
            .and_then(|item| self.groups.get(item.group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionKind;
    use crate::dom::Document;
    use crate::geometry::{Point, Rect, Viewport};
    use crate::resolve::resolve_chain;

    #[test]
    fn chain_with_zero_two_and_one_attributes_groups_five_seven_six() {
        let mut doc = Document::new(Viewport::default());
        let body = doc.create_root("body");
        doc.set_attribute(body, "class", "page");
        doc.set_rect(body, Rect::new(0.0, 0.0, 800.0, 600.0));
        let list_el = doc.append_element(body, "ul");
        doc.set_attribute(list_el, "id", "menu");
        doc.set_attribute(list_el, "role", "list");
        doc.set_rect(list_el, Rect::new(0.0, 0.0, 200.0, 200.0));
        let item = doc.append_element(list_el, "li");
        doc.set_rect(item, Rect::new(0.0, 0.0, 200.0, 20.0));

        let chain = resolve_chain(&doc, Point::new(5.0, 5.0)).expect("chain");
        let list = FlattenedActionList::build(&doc, &chain, &PaletteSettings::default());

        assert_eq!(list.len(), 18);
        let sizes: Vec<_> = list.groups().iter().map(|group| group.len).collect();
        assert_eq!(sizes, vec![5, 7, 6]);
        let owners: Vec<_> = list.groups().iter().map(|group| group.element).collect();
        assert_eq!(owners, vec![item, list_el, body]);
        assert_eq!(list.groups()[1].label, "ul#menu");
        assert_eq!(list.groups()[2].start, 12);
    }

    #[test]
    fn group_of_recovers_owning_ancestor() {
        let mut doc = Document::new(Viewport::default());
        let body = doc.create_root("body");
        let span = doc.append_element(body, "span");
        doc.set_attribute(span, "title", "t");

        let chain = crate::resolve::build_ancestor_chain(&doc, span);
        let list = FlattenedActionList::build(&doc, &chain, &PaletteSettings::default());

        assert_eq!(list.group_of(5).map(|group| group.element), Some(span));
        assert_eq!(list.get(5).map(|item| item.action.kind), Some(ActionKind::Attribute));
        assert_eq!(list.group_of(6).map(|group| group.element), Some(body));
        assert!(list.group_of(list.len()).is_none());
    }
}

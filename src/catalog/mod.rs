use crate::config::PaletteSettings;
use crate::dom::{NodeId, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CollapsedText,
    TrimmedText,
    RawText,
    InnerMarkup,
    OuterMarkup,
    Attribute,
}

impl ActionKind {
    /// Kinds every element offers, in palette order.
    pub const FIXED: [ActionKind; 5] = [
        ActionKind::CollapsedText,
        ActionKind::TrimmedText,
        ActionKind::RawText,
        ActionKind::InnerMarkup,
        ActionKind::OuterMarkup,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::CollapsedText => "Collapsed text",
            Self::TrimmedText => "Trimmed text",
            Self::RawText => "Raw text",
            Self::InnerMarkup => "innerHTML",
            Self::OuterMarkup => "outerHTML",
            Self::Attribute => "attr",
        }
    }
}

/// One entry of the palette.
///
/// `preview` is captured when the palette opens and is display-only; the
/// copied payload is always recomputed from the live page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub attribute_name: Option<String>,
    pub label: String,
    pub preview: String,
}

pub fn build_actions<P: Page + ?Sized>(
    page: &P,
    element: NodeId,
    settings: &PaletteSettings,
) -> Vec<Action> {
    let snippet = |value: &str| truncate(value, settings.max_snippet_len);
    let text = page.text_content(element);

    let mut actions: Vec<Action> = ActionKind::FIXED
        .iter()
        .map(|kind| {
            let preview = match kind {
                ActionKind::CollapsedText => collapse_whitespace(&text),
                ActionKind::TrimmedText => text.trim().to_string(),
                ActionKind::RawText => text.clone(),
                ActionKind::InnerMarkup => page.inner_html(element),
                ActionKind::OuterMarkup => page.outer_html(element),
                ActionKind::Attribute => String::new(),
            };
            Action {
                kind: *kind,
                attribute_name: None,
                label: kind.label().to_string(),
                preview: snippet(&preview),
            }
        })
        .collect();

    actions.extend(
        page.attributes(element)
            .into_iter()
            .filter(|attr| !attr.name.is_empty())
            .map(|attr| Action {
                kind: ActionKind::Attribute,
                label: format!("attr {}=", attr.name),
                preview: snippet(&attr.value),
                attribute_name: Some(attr.name),
            }),
    );
    actions
}

/// Computes the text to copy from the element's current state.
pub fn payload_for<P: Page + ?Sized>(page: &P, element: NodeId, action: &Action) -> String {
    match action.kind {
        ActionKind::CollapsedText => collapse_whitespace(&page.text_content(element)),
        ActionKind::TrimmedText => page.text_content(element).trim().to_string(),
        ActionKind::RawText => page.text_content(element),
        ActionKind::InnerMarkup => page.inner_html(element),
        ActionKind::OuterMarkup => page.outer_html(element),
        ActionKind::Attribute => action
            .attribute_name
            .as_deref()
            .and_then(|name| page.attribute(element, name))
            .unwrap_or_default(),
    }
}

/// `tag#id.class1.class2`, short enough for a group header.
pub fn element_identifier<P: Page + ?Sized>(
    page: &P,
    element: NodeId,
    settings: &PaletteSettings,
) -> String {
    let tag = page.tag_name(element);
    let mut ident = if tag.is_empty() {
        "element".to_string()
    } else {
        tag
    };

    if let Some(id) = page.attribute(element, "id").filter(|id| !id.is_empty()) {
        ident.push('#');
        ident.push_str(&truncate(&id, settings.max_id_len));
    }
    if let Some(classes) = page.attribute(element, "class") {
        for class in classes.split_whitespace().take(settings.max_class_count) {
            ident.push('.');
            ident.push_str(class);
        }
    }
    ident
}

pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps at most `max_chars` characters, the last one replaced by `…` when cut.
pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

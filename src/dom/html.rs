use super::{Document, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(super) fn serialize_node(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

pub(super) fn serialize_children(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    for child in doc.children(node) {
        write_node(doc, *child, &mut out);
    }
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    if let Some(text) = doc.text_of(node) {
        escape_into(text, false, out);
        return;
    }
    let Some((tag, attributes)) = doc.element_parts(node) else {
        return;
    };

    out.push('<');
    out.push_str(tag);
    for attr in attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        escape_into(&attr.value, true, out);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&tag) {
        return;
    }
    for child in doc.children(node) {
        write_node(doc, *child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_into(value: &str, attribute: bool, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

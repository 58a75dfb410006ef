//! Tolerant HTML-subset parser and serializer for surface content.
//!
//! # Responsibility
//! - Turn stored markup strings into detached tree nodes.
//! - Serialize live subtrees back into markup, the way the editable region
//!   reports its raw content.
//!
//! # Invariants
//! - Parsing never fails: unknown constructs degrade to text, unmatched end
//!   tags are dropped, unclosed elements close at end of input.
//! - Tags and attribute names are lowercased; attribute order is kept.
//! - U+00A0 serializes as `&nbsp;` so placeholder cells survive round trips.

use crate::surface::tree::{Element, MarkupTree, NodeId, NodeKind, TreeQuery};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9:-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
    )
    .expect("valid markup token regex")
});
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]{2,8});").expect("valid entity regex")
});

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Parses `markup` into detached top-level nodes owned by `tree`.
pub fn parse_fragment(tree: &mut MarkupTree, markup: &str) -> Vec<NodeId> {
    let mut top_level = Vec::new();
    let mut open: Vec<NodeId> = Vec::new();
    let mut cursor = 0;

    for caps in TOKEN_RE.captures_iter(markup) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(tree, &mut top_level, &open, &markup[cursor..whole.start()]);
        cursor = whole.end();

        let Some(name) = caps.get(2) else {
            // comment
            continue;
        };
        let tag = name.as_str().to_ascii_lowercase();
        let is_end = caps.get(1).is_some_and(|m| !m.as_str().is_empty());

        if is_end {
            if let Some(pos) = open
                .iter()
                .rposition(|node| tree.tag_of(*node) == Some(tag.as_str()))
            {
                open.truncate(pos);
            }
            continue;
        }

        let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());
        let element = Element {
            attrs: parse_attrs(caps.get(3).map_or("", |m| m.as_str())),
            tag,
        };
        let void = is_void_tag(&element.tag);
        let node = tree.create_element(element);
        attach(tree, &mut top_level, &open, node);
        if !void && !self_closing {
            open.push(node);
        }
    }
    push_text(tree, &mut top_level, &open, &markup[cursor..]);
    top_level
}

/// Serializes the children of `node`, the equivalent of reading inner markup.
pub fn serialize_children(tree: &MarkupTree, node: NodeId) -> String {
    let mut out = String::new();
    for child in tree.children_of(node) {
        write_node(tree, *child, &mut out);
    }
    out
}

/// Serializes `node` itself, including its own tag.
pub fn serialize_node(tree: &MarkupTree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, &mut out);
    out
}

/// Plain text of a markup string, without building a persistent tree.
pub fn markup_to_text(markup: &str) -> String {
    let mut tree = MarkupTree::new();
    let root = tree.create_element(Element::new("div"));
    for node in parse_fragment(&mut tree, markup) {
        // Fresh detached nodes under a fresh root cannot fail to attach.
        let _ = tree.append_child(root, node);
    }
    tree.text_content(root)
}

pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
    out
}

pub fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    ENTITY_RE
        .replace_all(value, |caps: &Captures<'_>| {
            let name = &caps[1];
            decode_entity(name).map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or(String::new(), |m| decode_entities(m.as_str()));
            Some((name, value))
        })
        .collect()
}

fn push_text(tree: &mut MarkupTree, top_level: &mut Vec<NodeId>, open: &[NodeId], raw: &str) {
    if raw.is_empty() {
        return;
    }
    let node = tree.create_text(decode_entities(raw));
    attach(tree, top_level, open, node);
}

fn attach(tree: &mut MarkupTree, top_level: &mut Vec<NodeId>, open: &[NodeId], node: NodeId) {
    match open.last() {
        Some(parent) => {
            if tree.append_child(*parent, node).is_err() {
                top_level.push(node);
            }
        }
        None => top_level.push(node),
    }
}

fn write_node(tree: &MarkupTree, node: NodeId, out: &mut String) {
    match tree.kind(node) {
        Some(NodeKind::Text(text)) => out.push_str(&escape_text(text)),
        Some(NodeKind::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if is_void_tag(&element.tag) {
                return;
            }
            for child in tree.children_of(node) {
                write_node(tree, *child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_entities, markup_to_text, parse_fragment, serialize_node};
    use crate::surface::tree::{MarkupTree, TreeQuery};

    fn normalize(markup: &str) -> String {
        let mut tree = MarkupTree::new();
        parse_fragment(&mut tree, markup)
            .into_iter()
            .map(|node| serialize_node(&tree, node))
            .collect()
    }

    #[test]
    fn canonical_markup_is_stable() {
        let markup = r#"<p>Hello <b>world</b></p><table border="1"><tr><td>&nbsp;</td></tr></table>"#;
        assert_eq!(normalize(markup), markup);
    }

    #[test]
    fn void_and_self_closing_tags_do_not_nest() {
        let out = normalize(r#"<img src="a.png" alt="x" />after<br>end"#);
        assert_eq!(out, r#"<img src="a.png" alt="x">after<br>end"#);
    }

    #[test]
    fn unmatched_end_tags_are_dropped_and_open_tags_close() {
        assert_eq!(normalize("a</span>b<i>c"), "ab<i>c</i>");
    }

    #[test]
    fn tags_and_attribute_names_are_lowercased() {
        let mut tree = MarkupTree::new();
        let nodes = parse_fragment(&mut tree, r#"<TD Style='padding: 8px'>x</TD>"#);
        assert_eq!(tree.tag_of(nodes[0]), Some("td"));
        assert_eq!(
            tree.element(nodes[0]).and_then(|e| e.attr("style")),
            Some("padding: 8px")
        );
    }

    #[test]
    fn entities_decode_and_reencode() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &#65;&#x42;&nbsp;"), "a & b <c> AB\u{a0}");
        assert_eq!(decode_entities("&bogus; &"), "&bogus; &");
        assert_eq!(normalize("1 &lt; 2 &amp; 3"), "1 &lt; 2 &amp; 3");
    }

    #[test]
    fn comments_are_skipped_and_stray_brackets_stay_text() {
        assert_eq!(normalize("a<!-- hidden -->b < c"), "ab &lt; c");
    }

    #[test]
    fn text_extraction_concatenates_text_nodes() {
        assert_eq!(markup_to_text("<p>Hi <b>there</b></p><p>!</p>"), "Hi there!");
        assert_eq!(markup_to_text(""), "");
    }
}

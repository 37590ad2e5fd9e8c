//! Typed markup tree.
//!
//! Views build `Node` trees instead of concatenating strings so the
//! document can later locate marked elements for targeted patches.

/// Attribute carrying the per-field key used by targeted patches.
pub const DATA_MARKER: &str = "data-metric";

/// Class of the descendant that holds the patchable value inside a marked
/// element. When a marked element has no such descendant the element
/// itself is patched.
pub const VALUE_SLOT_CLASS: &str = "value";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any previous value.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Tag this element with a data marker so polling can find it again.
    pub fn marker(self, key: impl Into<String>) -> Self {
        self.attr(DATA_MARKER, key)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
        out.push('>');
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_html(out),
            Node::Text(text) => out.push_str(&escape(text)),
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
            Node::Text(text) => out.push_str(text),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

/// Render a fragment (sibling list) as markup.
pub fn render_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write_html(&mut out);
    }
    out
}

/// Depth-first search for the first element matching `pred`.
pub fn find_element<'a>(nodes: &'a [Node], pred: &dyn Fn(&Element) -> bool) -> Option<&'a Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if pred(el) {
                return Some(el);
            }
            if let Some(found) = find_element(&el.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_element_mut<'a>(
    nodes: &'a mut [Node],
    pred: &dyn Fn(&Element) -> bool,
) -> Option<&'a mut Element> {
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if pred(el) {
                return Some(el);
            }
            if let Some(found) = find_element_mut(&mut el.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

pub fn is_marked(key: &str) -> impl Fn(&Element) -> bool + '_ {
    move |el: &Element| el.get_attr(DATA_MARKER) == Some(key)
}

pub fn is_value_slot(el: &Element) -> bool {
    el.has_class(VALUE_SLOT_CLASS)
}

/// Text currently shown by a marked element: its value slot when present,
/// the element itself otherwise.
pub fn marked_text(nodes: &[Node], key: &str) -> Option<String> {
    let marked = find_element(nodes, &is_marked(key))?;
    let text = match find_element(&marked.children, &is_value_slot) {
        Some(slot) => slot.text_content(),
        None => marked.text_content(),
    };
    Some(text.trim().to_string())
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_markup_with_attributes() {
        let node: Node = Element::new("div")
            .class("row")
            .child(Element::new("h2").text("Status"))
            .into();

        assert_eq!(node.to_html(), r#"<div class="row"><h2>Status</h2></div>"#);
    }

    #[test]
    fn escapes_text_and_attribute_values() {
        let node: Node = Element::new("a")
            .attr("href", "device.html?id=\"x\"")
            .text("<b>&")
            .into();

        assert_eq!(
            node.to_html(),
            r#"<a href="device.html?id=&quot;x&quot;">&lt;b&gt;&amp;</a>"#
        );
    }

    #[test]
    fn set_attr_replaces_existing_value() {
        let el = Element::new("div").attr("style", "opacity: 0").attr("style", "opacity: 1");
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.get_attr("style"), Some("opacity: 1"));
    }

    #[test]
    fn marked_text_prefers_value_slot() {
        let nodes = vec![Node::from(
            Element::new("div")
                .marker("cpu")
                .child(Element::new("div").class("top-value").text("CPU"))
                .child(Element::new("div").class("value").text(" 42 ")),
        )];

        assert_eq!(marked_text(&nodes, "cpu").as_deref(), Some("42"));
        assert_eq!(marked_text(&nodes, "ram"), None);
    }

    #[test]
    fn marked_text_falls_back_to_marked_element() {
        let nodes = vec![Node::from(
            Element::new("p").child(Element::new("span").marker("uptime").text("12")),
        )];

        assert_eq!(marked_text(&nodes, "uptime").as_deref(), Some("12"));
    }
}

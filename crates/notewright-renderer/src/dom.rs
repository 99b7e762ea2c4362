//! Small arena tree for generated HTML fragments.
//!
//! The parser is deliberately forgiving: generated content is mostly
//! well-formed, and when it isn't we want something reasonable rather than
//! an error. Text and attribute values are kept exactly as they appear in the
//! source (entities are not decoded), so parse then serialize returns
//! normalized but otherwise unchanged markup.

use std::borrow::Cow;

use smol_str::{SmolStr, ToSmolStr};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Start tags that implicitly close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: SmolStr,
    /// Source text of the value. An empty value serializes as a bare name.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name
    pub name: SmolStr,
    pub attrs: Vec<Attribute>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Root,
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// An HTML fragment held as an arena of nodes.
///
/// Nodes removed from the tree stay in the arena, detached, until the
/// fragment is dropped.
#[derive(Debug, Clone)]
pub struct Fragment {
    nodes: Vec<Node>,
}

impl Default for Fragment {
    fn default() -> Self {
        Self::new()
    }
}

impl Fragment {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Root,
            }],
        }
    }

    pub fn parse(html: &str) -> Self {
        let mut fragment = Self::new();
        let root = fragment.root();
        fragment.parse_into(root, html);
        fragment
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        match el.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => el.attrs.push(Attribute {
                name: name.to_smolstr(),
                value: value.to_string(),
            }),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            fragment: self,
            next: self.parent(id),
        }
    }

    /// Every node below `id` in document order, not including `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn elements_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.tag_name(*n) == Some(name))
            .collect()
    }

    pub fn elements_with_class(&self, id: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    /// Concatenated text below `id`, entities decoded.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(&decode_entities(text));
            }
        }
        out
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn create_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.push(NodeData::Element(Element {
            name: name.to_ascii_lowercase().into(),
            attrs: attrs
                .iter()
                .map(|(name, value)| Attribute {
                    name: name.to_smolstr(),
                    value: value.to_string(),
                })
                .collect(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        candidate == of || self.ancestors(of).any(|a| a == candidate)
    }

    /// Remove `id` from its parent. The node and its subtree stay usable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!(?parent, ?child, "refusing to append a node into its own subtree");
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` before `reference`; appends when `reference` is not a
    /// child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!(?parent, ?child, "refusing to insert a node into its own subtree");
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        let siblings = &mut self.nodes[parent.0].children;
        match siblings.iter().position(|c| *c == reference) {
            Some(index) => siblings.insert(index, child),
            None => siblings.push(child),
        }
    }

    /// Put `replacements` where `old` was, then detach `old`.
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) {
        let Some(parent) = self.parent(old) else {
            return;
        };
        for new in replacements {
            self.insert_before(parent, *new, old);
        }
        self.detach(old);
    }

    /// Move `wrapper` into the position of `id` and `id` inside it.
    pub fn wrap(&mut self, id: NodeId, wrapper: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.insert_before(parent, wrapper, id);
        self.append_child(wrapper, id);
    }

    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        self.parse_into(id, html);
    }

    /// Parse `html` into new nodes that are not attached anywhere yet.
    pub fn parse_detached(&mut self, html: &str) -> Vec<NodeId> {
        let holder = self.push(NodeData::Root);
        self.parse_into(holder, html);
        let children = std::mem::take(&mut self.nodes[holder.0].children);
        for child in &children {
            self.nodes[child.0].parent = None;
        }
        children
    }

    fn parse_into(&mut self, parent: NodeId, html: &str) {
        TreeBuilder {
            fragment: self,
            base: parent,
            open: Vec::new(),
        }
        .run(html);
    }

    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(*child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize `id` and its subtree. Walks an explicit stack, so nesting
    /// depth is not limited by the call stack.
    fn write_node(&self, id: NodeId, out: &mut String) {
        let mut stack = vec![Step::Open(id)];
        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Open(id) => id,
                Step::Close(name) => {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                    continue;
                }
            };
            match self.data(id) {
                NodeData::Root => {
                    stack.extend(self.children(id).iter().rev().map(|c| Step::Open(*c)));
                }
                NodeData::Text(text) => out.push_str(text),
                NodeData::Comment(body) => {
                    out.push_str("<!--");
                    out.push_str(body);
                    out.push_str("-->");
                }
                NodeData::Doctype(body) => {
                    out.push_str("<!");
                    out.push_str(body);
                    out.push('>');
                }
                NodeData::Element(el) => {
                    out.push('<');
                    out.push_str(&el.name);
                    for attr in &el.attrs {
                        out.push(' ');
                        out.push_str(&attr.name);
                        if !attr.value.is_empty() {
                            out.push_str("=\"");
                            out.push_str(&attr.value.replace('"', "&quot;"));
                            out.push('"');
                        }
                    }
                    out.push('>');
                    if is_void_element(&el.name) && self.children(id).is_empty() {
                        continue;
                    }
                    stack.push(Step::Close(&el.name));
                    stack.extend(self.children(id).iter().rev().map(|c| Step::Open(*c)));
                }
            }
        }
    }
}

enum Step<'a> {
    Open(NodeId),
    Close(&'a str),
}

pub struct Ancestors<'a> {
    fragment: &'a Fragment,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.fragment.parent(current);
        Some(current)
    }
}

struct StartTag {
    name: SmolStr,
    attrs: Vec<Attribute>,
    self_closing: bool,
    /// Byte offset just past the closing `>`
    end: usize,
}

struct TreeBuilder<'a> {
    fragment: &'a mut Fragment,
    base: NodeId,
    open: Vec<NodeId>,
}

impl TreeBuilder<'_> {
    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.base)
    }

    fn current_name(&self) -> Option<&str> {
        self.open
            .last()
            .and_then(|id| self.fragment.tag_name(*id))
    }

    fn append(&mut self, data: NodeData) -> NodeId {
        let id = self.fragment.push(data);
        let parent = self.current();
        self.fragment.nodes[id.0].parent = Some(parent);
        self.fragment.nodes[parent.0].children.push(id);
        id
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // merge with a preceding text node, e.g. after a stray `<`
        let parent = self.current();
        if let Some(last) = self.fragment.nodes[parent.0].children.last().copied() {
            if let NodeData::Text(existing) = &mut self.fragment.nodes[last.0].data {
                existing.push_str(text);
                return;
            }
        }
        self.append(NodeData::Text(text.to_string()));
    }

    fn implicit_close(&mut self, name: &str) {
        loop {
            let closes = match (self.current_name(), name) {
                (Some("p"), n) => CLOSES_PARAGRAPH.contains(&n),
                (Some("li"), "li") => true,
                (Some("option"), "option") => true,
                (Some("dt" | "dd"), "dt" | "dd") => true,
                (Some("td" | "th"), "td" | "th" | "tr") => true,
                (Some("tr"), "tr") => true,
                _ => false,
            };
            if !closes {
                return;
            }
            self.open.pop();
        }
    }

    fn open(&mut self, tag: &StartTag) {
        self.implicit_close(&tag.name);
        let id = self.append(NodeData::Element(Element {
            name: tag.name.clone(),
            attrs: tag.attrs.clone(),
        }));
        if !tag.self_closing && !is_void_element(&tag.name) {
            self.open.push(id);
        }
    }

    fn close(&mut self, name: &str) {
        if let Some(index) = self
            .open
            .iter()
            .rposition(|id| self.fragment.tag_name(*id) == Some(name))
        {
            self.open.truncate(index);
        }
    }

    fn run(mut self, html: &str) {
        let bytes = html.as_bytes();
        let mut pos = 0;
        let mut text_start = 0;

        while pos < bytes.len() {
            if bytes[pos] != b'<' {
                pos += 1;
                continue;
            }
            let rest = &html[pos..];

            if let Some(body) = rest.strip_prefix("<!--") {
                self.text(&html[text_start..pos]);
                let (comment, consumed) = match body.find("-->") {
                    Some(end) => (&body[..end], 4 + end + 3),
                    None => (body, rest.len()),
                };
                self.append(NodeData::Comment(comment.to_string()));
                pos += consumed;
                text_start = pos;
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.text(&html[text_start..pos]);
                let (body, consumed) = match rest.find('>') {
                    Some(end) => (&rest[2..end], end + 1),
                    None => (&rest[2..], rest.len()),
                };
                if rest.starts_with("<!") {
                    self.append(NodeData::Doctype(body.to_string()));
                } else {
                    self.append(NodeData::Comment(format!("?{body}")));
                }
                pos += consumed;
                text_start = pos;
                continue;
            }

            if rest.starts_with("</") {
                if let Some((name, end)) = parse_end_tag(html, pos) {
                    self.text(&html[text_start..pos]);
                    self.close(&name);
                    pos = end;
                    text_start = pos;
                } else {
                    pos += 1;
                }
                continue;
            }

            let Some(tag) = parse_start_tag(html, pos) else {
                pos += 1;
                continue;
            };
            self.text(&html[text_start..pos]);
            self.open(&tag);
            pos = tag.end;

            if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) && !tag.self_closing {
                let (content_end, after) = find_raw_text_end(html, pos, &tag.name);
                if content_end > pos {
                    self.append(NodeData::Text(html[pos..content_end].to_string()));
                }
                self.close(&tag.name);
                pos = after;
            }
            text_start = pos;
        }

        self.text(&html[text_start..]);
    }
}

/// Where raw text for `name` stops and where parsing resumes.
///
/// Matches `</name` without regard to ASCII case, directly on the bytes.
fn find_raw_text_end(html: &str, from: usize, name: &str) -> (usize, usize) {
    let bytes = html.as_bytes();
    let name = name.as_bytes();
    let start = (from..bytes.len()).find(|&i| {
        bytes[i] == b'<'
            && bytes.get(i + 1) == Some(&b'/')
            && bytes
                .get(i + 2..i + 2 + name.len())
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
    });
    let Some(start) = start else {
        return (html.len(), html.len());
    };
    let after = bytes[start..]
        .iter()
        .position(|b| *b == b'>')
        .map(|gt| start + gt + 1)
        .unwrap_or(html.len());
    (start, after)
}

fn is_tag_boundary(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>'
}

fn parse_end_tag(html: &str, pos: usize) -> Option<(SmolStr, usize)> {
    let bytes = html.as_bytes();
    let start = pos + 2;
    if !bytes.get(start)?.is_ascii_alphabetic() {
        return None;
    }
    let mut i = start;
    while i < bytes.len() && !is_tag_boundary(bytes[i]) {
        i += 1;
    }
    let name = html[start..i].to_ascii_lowercase().to_smolstr();
    let gt = html[i..].find('>')?;
    Some((name, i + gt + 1))
}

fn parse_start_tag(html: &str, pos: usize) -> Option<StartTag> {
    let bytes = html.as_bytes();
    let start = pos + 1;
    if !bytes.get(start)?.is_ascii_alphabetic() {
        return None;
    }
    let mut i = start;
    while i < bytes.len() && !is_tag_boundary(bytes[i]) {
        i += 1;
    }
    let name = html[start..i].to_ascii_lowercase().to_smolstr();

    let mut attrs: Vec<Attribute> = Vec::new();
    let mut self_closing = false;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                if bytes.get(i + 1) == Some(&b'>') {
                    self_closing = true;
                    i += 2;
                    break;
                }
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len() && !is_tag_boundary(bytes[i]) && bytes[i] != b'=' {
            i += 1;
        }
        if i == name_start {
            // stray `=`
            i += 1;
            continue;
        }
        let attr_name = html[name_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = "";
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i)? {
                quote @ (b'"' | b'\'') => {
                    let close = html[i + 1..].find(*quote as char)?;
                    value = &html[i + 1..i + 1 + close];
                    i += close + 2;
                }
                _ => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = &html[value_start..i];
                }
            }
        }

        if !attrs.iter().any(|a| a.name == attr_name) {
            attrs.push(Attribute {
                name: attr_name.into(),
                value: value.to_string(),
            });
        }
    }

    Some(StartTag {
        name,
        attrs,
        self_closing,
        end: i,
    })
}

/// Decode the character references that turn up in generated markup.
/// Unknown references are left alone.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        let decoded = candidate.find(';').filter(|semi| *semi <= 10).and_then(|semi| {
            let entity = &candidate[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_well_formed_markup() {
        let html = r#"<section class="intro"><h2>Waves</h2><p>A <em>sine</em> wave &amp; friends.</p><img src="a.png" alt="wave"><!-- note --></section>"#;
        assert_eq!(Fragment::parse(html).to_html(), html);
    }

    #[test]
    fn normalizes_tag_case_and_quotes() {
        let fragment = Fragment::parse("<DIV Class='box' data-x=1>hi</DIV>");
        assert_eq!(fragment.to_html(), r#"<div class="box" data-x="1">hi</div>"#);
    }

    #[test]
    fn raw_text_elements_keep_markup_inside() {
        let html = "<script>if (a < b && c > d) { x = '</p>'; }</script><p>after</p>";
        let fragment = Fragment::parse(html);
        let script = fragment.elements_named(fragment.root(), "script")[0];
        assert_eq!(
            fragment.inner_html(script),
            "if (a < b && c > d) { x = '</p>'; }"
        );
        assert_eq!(fragment.elements_named(fragment.root(), "p").len(), 1);
    }

    #[test]
    fn raw_text_end_tag_matches_any_case() {
        let fragment = Fragment::parse("<STYLE>p { color: red }</Style ><p>after</p>");
        let style = fragment.elements_named(fragment.root(), "style")[0];
        assert_eq!(fragment.inner_html(style), "p { color: red }");
        assert_eq!(
            fragment.to_html(),
            "<style>p { color: red }</style><p>after</p>"
        );

        let unclosed = Fragment::parse("<script>let a = 1; </scrip");
        let script = unclosed.elements_named(unclosed.root(), "script")[0];
        assert_eq!(unclosed.inner_html(script), "let a = 1; </scrip");
    }

    #[test]
    fn serializes_very_deep_nesting() {
        let depth = 200_000;
        let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let fragment = Fragment::parse(&html);
        assert_eq!(fragment.to_html(), html);
    }

    #[test]
    fn tolerates_unclosed_and_stray_tags() {
        let fragment = Fragment::parse("<ul><li>one<li>two</ul></span><p>a<p>b");
        assert_eq!(
            fragment.to_html(),
            "<ul><li>one</li><li>two</li></ul><p>a</p><p>b</p>"
        );
    }

    #[test]
    fn lone_angle_brackets_stay_text() {
        let fragment = Fragment::parse("<p>if x < 3 and y <= 4</p>");
        let p = fragment.elements_named(fragment.root(), "p")[0];
        assert_eq!(fragment.children(p).len(), 1);
        assert_eq!(fragment.text_content(p), "if x < 3 and y <= 4");
    }

    #[test]
    fn wrap_and_replace() {
        let mut fragment = Fragment::parse(r#"<p><img src="x.png"></p>"#);
        let img = fragment.elements_named(fragment.root(), "img")[0];
        let wrapper = fragment.create_element("div", &[("class", "frame")]);
        fragment.wrap(img, wrapper);
        assert_eq!(
            fragment.to_html(),
            r#"<p><div class="frame"><img src="x.png"></div></p>"#
        );

        let text = fragment.create_text("gone");
        fragment.replace_with(wrapper, &[text]);
        assert_eq!(fragment.to_html(), "<p>gone</p>");
    }

    #[test]
    fn inner_html_replacement_and_queries() {
        let mut fragment = Fragment::parse(r#"<div class="a b"><span>old</span></div>"#);
        let div = fragment.elements_with_class(fragment.root(), "b")[0];
        fragment.set_inner_html(div, "<em>new</em> text");
        fragment.set_attr(div, "data-ready", "true");
        assert_eq!(
            fragment.to_html(),
            r#"<div class="a b" data-ready="true"><em>new</em> text</div>"#
        );
        let em = fragment.elements_named(div, "em")[0];
        assert_eq!(fragment.ancestors(em).next(), Some(div));
    }

    #[test]
    fn refuses_cycles() {
        let mut fragment = Fragment::parse("<div><p></p></div>");
        let div = fragment.elements_named(fragment.root(), "div")[0];
        let p = fragment.elements_named(fragment.root(), "p")[0];
        fragment.append_child(p, div);
        assert_eq!(fragment.to_html(), "<div><p></p></div>");
    }

    #[test]
    fn decodes_common_entities() {
        assert_eq!(decode_entities("a &lt; b &amp;&amp; c"), "a < b && c");
        assert_eq!(decode_entities("&#960; &#x3C0;"), "π π");
        assert_eq!(decode_entities("AT&T &unknown;"), "AT&T &unknown;");
    }
}

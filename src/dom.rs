use super::*;

/// Handle to a node in a [`Harness`] document.
///
/// Ids stay valid after the node is detached; a detached node is simply no
/// longer reachable from document queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    // Inline display values stashed by `hide` so `show` can restore them.
    saved_display: HashMap<NodeId, String>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            saved_display: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let disabled = attrs.contains_key("disabled");
        let readonly = attrs.contains_key("readonly");
        let element = Element {
            tag_name,
            attrs,
            value,
            disabled,
            readonly,
        };
        self.create_node(Some(parent), NodeType::Element(element))
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id.0)
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.node(node_id)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id)?.parent
    }

    pub(crate) fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.node(node_id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub(crate) fn is_connected(&self, node_id: NodeId) -> bool {
        node_id == self.root || self.is_descendant_of(node_id, self.root)
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)?.attrs.get(name).cloned()
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::TypeMismatch {
                selector: format!("node {}", node_id.0),
                expected: "element".into(),
                actual: "non-element".into(),
            })?;
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "disabled" => element.disabled = true,
            "readonly" => element.readonly = true,
            _ => {}
        }
        element.attrs.insert(name, value.to_string());
        Ok(())
    }

    pub(crate) fn class_contains(&self, node_id: NodeId, class_name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|element| has_class(element, class_name))
    }

    pub(crate) fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let mut classes = class_tokens(self.attr(node_id, "class").as_deref());
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        self.set_attr(node_id, "class", &classes.join(" "))
    }

    pub(crate) fn class_remove(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let mut classes = class_tokens(self.attr(node_id, "class").as_deref());
        classes.retain(|name| name != class_name);
        self.set_attr(node_id, "class", &classes.join(" "))
    }

    pub(crate) fn value(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|element| element.value.as_str())
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) {
        if let Some(element) = self.element_mut(node_id) {
            element.value = value.to_string();
        }
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.disabled)
    }

    pub(crate) fn readonly(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.readonly)
    }

    pub(crate) fn style_get(&self, node_id: NodeId, name: &str) -> String {
        let decls = parse_style_declarations(self.attr(node_id, "style").as_deref());
        decls
            .into_iter()
            .find(|(prop, _)| prop == name)
            .map(|(_, value)| value)
            .unwrap_or_default()
    }

    pub(crate) fn style_set(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let mut decls = parse_style_declarations(self.attr(node_id, "style").as_deref());
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == name) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((name.to_string(), value.to_string()));
        }
        self.set_attr(node_id, "style", &serialize_style_declarations(&decls))
    }

    /// Sets inline `display: none`. Already-hidden elements are left alone.
    pub(crate) fn hide(&mut self, node_id: NodeId) -> Result<bool> {
        let current = self.style_get(node_id, "display");
        if current.eq_ignore_ascii_case("none") {
            return Ok(false);
        }
        self.style_set(node_id, "display", "none")?;
        self.saved_display.insert(node_id, current);
        Ok(true)
    }

    pub(crate) fn show(&mut self, node_id: NodeId) -> Result<bool> {
        if !self.style_get(node_id, "display").eq_ignore_ascii_case("none") {
            return Ok(false);
        }
        let restored = self.saved_display.remove(&node_id).unwrap_or_default();
        self.style_set(node_id, "display", &restored)?;
        Ok(true)
    }

    fn hides_itself(&self, node_id: NodeId) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };
        element.attrs.contains_key("hidden")
            || self
                .style_get(node_id, "display")
                .eq_ignore_ascii_case("none")
    }

    /// An element is visible when it is connected and neither it nor any
    /// ancestor is hidden.
    pub(crate) fn is_visible(&self, node_id: NodeId) -> bool {
        if self.element(node_id).is_none() || !self.is_connected(node_id) {
            return false;
        }
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if self.hides_itself(current) {
                return false;
            }
            cursor = self.parent(current);
        }
        true
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match self.node(node_id).map(|node| &node.node_type) {
            Some(NodeType::Text(text)) => text.clone(),
            Some(_) => {
                let mut out = String::new();
                for child in self.children(node_id) {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            None => String::new(),
        }
    }

    pub(crate) fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        if self.element(node_id).is_some() {
            out.push(node_id);
        }
        for child in self.children(node_id) {
            self.collect_elements_dfs(*child, out);
        }
    }

    fn collect_subtree(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        out.push(node_id);
        for child in self.children(node_id) {
            self.collect_subtree(*child, out);
        }
    }

    pub(crate) fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        ids.into_iter()
            .find(|candidate| self.matches_selector(*candidate, selector))
    }

    pub(crate) fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);

        let mut seen = HashSet::new();
        ids.into_iter()
            .filter(|candidate| self.matches_selector(*candidate, selector))
            .filter(|candidate| seen.insert(*candidate))
            .collect()
    }

    pub(crate) fn body(&self) -> NodeId {
        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        ids.into_iter()
            .find(|id| self.tag_name(*id) == Some("body"))
            .unwrap_or(self.root)
    }

    /// Detaches every child of `parent` and parses `html` in their place.
    /// Returns every node that left the document. Detached nodes stay in
    /// the arena; their ids are never reused.
    pub(crate) fn replace_children(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>> {
        let old_children = std::mem::take(&mut self.nodes[parent.0].children);
        let mut detached = Vec::new();
        for child in old_children {
            self.nodes[child.0].parent = None;
            self.collect_subtree(child, &mut detached);
        }
        for node in &detached {
            self.saved_display.remove(node);
        }
        parse_fragment(self, parent, html)?;
        Ok(detached)
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        match self.node(node_id).map(|node| &node.node_type) {
            Some(NodeType::Document) => {
                let mut out = String::new();
                for child in self.children(node_id) {
                    out.push_str(&self.dump_node(*child));
                }
                out
            }
            Some(NodeType::Text(text)) => escape_html_text(text),
            Some(NodeType::Element(element)) => {
                let mut out = format!("<{}", element.tag_name);
                let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                attrs.sort_by(|(left, _), (right, _)| left.cmp(right));
                for (name, value) in attrs {
                    out.push_str(&format!(" {name}=\"{}\"", escape_html_attr(value)));
                }
                out.push('>');
                if html::is_void_tag(&element.tag_name) {
                    return out;
                }
                for child in self.children(node_id) {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str(&format!("</{}>", element.tag_name));
                out
            }
            None => String::new(),
        }
    }

    /// Short label used by trace lines, e.g. `input#id_text.form-control`.
    pub(crate) fn node_label(&self, node_id: NodeId) -> String {
        let Some(element) = self.element(node_id) else {
            return if node_id == self.root {
                "#document".into()
            } else {
                format!("node{}", node_id.0)
            };
        };
        let mut label = element.tag_name.clone();
        if let Some(id) = element.attrs.get("id") {
            label.push('#');
            label.push_str(id);
        }
        for class_name in class_tokens(element.attrs.get("class").map(String::as_str)) {
            label.push('.');
            label.push_str(&class_name);
        }
        label
    }
}

pub(crate) fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| {
            value
                .split_whitespace()
                .filter(|token| !token.is_empty())
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}

pub(crate) fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attrs
        .get("class")
        .is_some_and(|value| value.split_whitespace().any(|name| name == class_name))
}

pub(crate) fn parse_style_declarations(style_attr: Option<&str>) -> Vec<(String, String)> {
    let Some(style_attr) = style_attr else {
        return Vec::new();
    };

    let mut out: Vec<(String, String)> = Vec::new();
    for decl in style_attr.split(';') {
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = value.trim().to_string();
        if let Some(pos) = out.iter().position(|(existing, _)| existing == &name) {
            out[pos].1 = value;
        } else {
            out.push((name, value));
        }
    }
    out
}

pub(crate) fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    let mut out = String::new();
    for (idx, (name, value)) in decls.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push(';');
    }
    out
}

fn escape_html_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_html_attr(value: &str) -> String {
    escape_html_text(value).replace('"', "&quot;")
}

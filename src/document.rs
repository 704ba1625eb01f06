use super::*;

/// Handle into the arena. Ids are never reused within one [`Document`];
/// removed nodes stay allocated but detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Namespace-qualified node name. The empty namespace and empty prefix are
/// the defaults for every category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub namespace: String,
    pub prefix: String,
    pub local: String,
}

impl QualifiedName {
    /// Splits `prefix:local` and validates that the local part can name a
    /// node.
    pub fn parse(namespace: &str, qualified: &str) -> Result<Self> {
        let (prefix, local) = match qualified.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", qualified),
        };
        if local.is_empty() {
            return Err(Error::InvalidName(qualified.into()));
        }
        if local
            .chars()
            .chain(prefix.chars())
            .any(|ch| ch.is_whitespace() || matches!(ch, '<' | '>' | '&' | '"' | '\'' | '/' | '='))
        {
            return Err(Error::InvalidName(qualified.into()));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            prefix: prefix.to_string(),
            local: local.to_string(),
        })
    }

    pub fn qualified(&self) -> String {
        if self.prefix.is_empty() {
            self.local.clone()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    pub fn matches(&self, namespace: &str, local: &str) -> bool {
        self.namespace == namespace && self.local == local
    }
}

#[derive(Debug, Clone)]
pub struct ElementData {
    pub name: QualifiedName,
    /// Attr nodes owned by this element, in document order.
    pub(crate) attrs: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct AttrData {
    pub name: QualifiedName,
    pub value: String,
    pub(crate) owner: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    DocumentType {
        name: String,
        public_id: String,
        system_id: String,
    },
    Fragment,
    Element(ElementData),
    Attr(AttrData),
    Text(String),
    Comment(String),
    Cdata(String),
    Pi {
        target: String,
        data: String,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}

/// Arena-backed document: the native node provider the assembler layer
/// orchestrates. Node 0 is always the document node.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    pub fn create_element_ns(&mut self, namespace: &str, qualified: &str) -> Result<NodeId> {
        let name = QualifiedName::parse(namespace, qualified)?;
        Ok(self.create_node(NodeKind::Element(ElementData {
            name,
            attrs: Vec::new(),
        })))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.create_node(NodeKind::Text(data.to_string()))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.create_node(NodeKind::Comment(data.to_string()))
    }

    pub fn create_cdata(&mut self, data: &str) -> NodeId {
        self.create_node(NodeKind::Cdata(data.to_string()))
    }

    pub fn create_pi(&mut self, target: &str, data: &str) -> Result<NodeId> {
        if target.is_empty() || target.chars().any(char::is_whitespace) {
            return Err(Error::InvalidName(target.into()));
        }
        Ok(self.create_node(NodeKind::Pi {
            target: target.to_string(),
            data: data.to_string(),
        }))
    }

    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> Result<NodeId> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidName(name.into()));
        }
        Ok(self.create_node(NodeKind::DocumentType {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.create_node(NodeKind::Fragment)
    }

    pub fn create_attr_ns(&mut self, namespace: &str, qualified: &str, value: &str) -> Result<NodeId> {
        let name = QualifiedName::parse(namespace, qualified)?;
        Ok(self.create_node(NodeKind::Attr(AttrData {
            name,
            value: value.to_string(),
            owner: None,
        })))
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub(crate) fn kind_mut(&mut self, node: NodeId) -> &mut NodeKind {
        &mut self.nodes[node.0].kind
    }

    pub fn is_valid_node(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn attr_data(&self, node: NodeId) -> Option<&AttrData> {
        match &self.nodes[node.0].kind {
            NodeKind::Attr(attr) => Some(attr),
            _ => None,
        }
    }

    pub(crate) fn attr_data_mut(&mut self, node: NodeId) -> Option<&mut AttrData> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Attr(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn local_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.name.local.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].children.first().copied()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].children.last().copied()
    }

    pub fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.iter().position(|id| *id == node)?;
        pos.checked_sub(1).map(|prev| siblings[prev])
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.iter().position(|id| *id == node)?;
        siblings.get(pos + 1).copied()
    }

    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn can_have_children(&self, node: NodeId) -> bool {
        matches!(
            self.nodes[node.0].kind,
            NodeKind::Document | NodeKind::Fragment | NodeKind::Element(_)
        )
    }

    /// Concatenated text of all descendant text and CDATA nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(data) | NodeKind::Cdata(data) | NodeKind::Comment(data) => data.clone(),
            NodeKind::Pi { data, .. } => data.clone(),
            NodeKind::Attr(attr) => attr.value.clone(),
            _ => {
                let mut out = String::new();
                self.collect_text(node, &mut out);
                out
            }
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        for child in &self.nodes[node.0].children {
            match &self.nodes[child.0].kind {
                NodeKind::Text(data) | NodeKind::Cdata(data) => out.push_str(data),
                NodeKind::Comment(_) | NodeKind::Pi { .. } => {}
                _ => self.collect_text(*child, out),
            }
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insertion(parent, child)?;
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        if self.parent(reference) != Some(parent) {
            return Err(Error::InvalidOperation(
                "insertion reference is not a direct child".into(),
            ));
        }
        if child == reference {
            return Ok(());
        }
        self.check_insertion(parent, child)?;
        self.detach(child);
        let Some(index) = self.nodes[parent.0]
            .children
            .iter()
            .position(|id| *id == reference)
        else {
            return Err(Error::InvalidOperation("insertion reference is missing".into()));
        };
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
        Ok(())
    }

    pub fn replace_child(&mut self, parent: NodeId, child: NodeId, old: NodeId) -> Result<()> {
        if child == old {
            return Ok(());
        }
        self.insert_before(parent, child, old)?;
        self.remove_child(parent, old)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(Error::InvalidOperation(
                "removal target is not a direct child".into(),
            ));
        }
        self.nodes[parent.0].children.retain(|id| *id != child);
        self.nodes[child.0].parent = None;
        Ok(())
    }

    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(Error::InvalidOperation("cannot remove the document node".into()));
        }
        let Some(parent) = self.parent(node) else {
            return Ok(());
        };
        self.remove_child(parent, node)
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.is_valid_node(parent) || !self.is_valid_node(child) {
            return Err(Error::InvalidOperation("node is not part of this document".into()));
        }
        if !self.can_have_children(parent) {
            return Err(Error::InvalidOperation("insertion target cannot have children".into()));
        }
        if child == self.root || child == parent {
            return Err(Error::InvalidOperation("invalid insertion node".into()));
        }
        if matches!(self.nodes[child.0].kind, NodeKind::Attr(_)) {
            return Err(Error::InvalidOperation("attr nodes cannot be tree children".into()));
        }
        if matches!(self.nodes[child.0].kind, NodeKind::DocumentType { .. })
            && !matches!(self.nodes[parent.0].kind, NodeKind::Document)
        {
            return Err(Error::InvalidOperation(
                "doctype nodes can only live under the document node".into(),
            ));
        }
        // Prevent cycles: parent must not be inside child's subtree.
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(Error::InvalidOperation("insertion would create a cycle".into()));
            }
            cursor = self.parent(node);
        }
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(old_parent) = self.parent(node) {
            self.nodes[old_parent.0].children.retain(|id| *id != node);
            self.nodes[node.0].parent = None;
        }
    }

    /// Attr node with the given namespace and local name, if present.
    pub fn attr_node(&self, element: NodeId, namespace: &str, local: &str) -> Option<NodeId> {
        let data = self.element(element)?;
        data.attrs
            .iter()
            .copied()
            .find(|attr| {
                self.attr_data(*attr)
                    .is_some_and(|a| a.name.matches(namespace, local))
            })
    }

    pub fn attr_value(&self, element: NodeId, namespace: &str, local: &str) -> Option<String> {
        let attr = self.attr_node(element, namespace, local)?;
        self.attr_data(attr).map(|a| a.value.clone())
    }

    /// Attr nodes of an element in document order.
    pub fn attrs(&self, element: NodeId) -> &[NodeId] {
        self.element(element).map(|e| e.attrs.as_slice()).unwrap_or(&[])
    }

    /// Adopts an attr node into an element, replacing any existing attr with
    /// the same namespace and local name. Returns the displaced attr node.
    pub fn set_attr_node(&mut self, element: NodeId, attr: NodeId) -> Result<Option<NodeId>> {
        let (namespace, local) = {
            let data = self
                .attr_data(attr)
                .ok_or_else(|| Error::InvalidOperation("not an attr node".into()))?;
            (data.name.namespace.clone(), data.name.local.clone())
        };
        if let Some(old_owner) = self.attr_data(attr).and_then(|a| a.owner) {
            if old_owner != element {
                self.remove_attr_node(old_owner, attr)?;
            }
        }
        let displaced = self.attr_node(element, &namespace, &local).filter(|old| *old != attr);
        {
            let data = self
                .element_mut(element)
                .ok_or_else(|| Error::InvalidOperation("attr target is not an element".into()))?;
            match displaced {
                Some(old) => match data.attrs.iter().position(|id| *id == old) {
                    Some(pos) => data.attrs[pos] = attr,
                    None => data.attrs.push(attr),
                },
                None => {
                    if !data.attrs.contains(&attr) {
                        data.attrs.push(attr);
                    }
                }
            }
        }
        if let Some(old) = displaced {
            if let Some(old_data) = self.attr_data_mut(old) {
                old_data.owner = None;
            }
        }
        if let Some(attr_data) = self.attr_data_mut(attr) {
            attr_data.owner = Some(element);
        }
        Ok(displaced)
    }

    pub fn remove_attr_node(&mut self, element: NodeId, attr: NodeId) -> Result<()> {
        let data = self
            .element_mut(element)
            .ok_or_else(|| Error::InvalidOperation("attr target is not an element".into()))?;
        data.attrs.retain(|id| *id != attr);
        if let Some(attr_data) = self.attr_data_mut(attr) {
            attr_data.owner = None;
        }
        Ok(())
    }

    /// Sets a namespace-less attribute by local name, creating the attr node
    /// when absent.
    pub fn set_attr(&mut self, element: NodeId, local: &str, value: &str) -> Result<()> {
        self.set_attr_ns(element, "", local, value)
    }

    pub fn set_attr_ns(
        &mut self,
        element: NodeId,
        namespace: &str,
        qualified: &str,
        value: &str,
    ) -> Result<()> {
        let name = QualifiedName::parse(namespace, qualified)?;
        if let Some(attr) = self.attr_node(element, namespace, &name.local) {
            if let Some(data) = self.attr_data_mut(attr) {
                data.value = value.to_string();
                data.name = name;
            }
            return Ok(());
        }
        let attr = self.create_attr_ns(namespace, qualified, value)?;
        self.set_attr_node(element, attr)?;
        Ok(())
    }

    pub fn remove_attr(&mut self, element: NodeId, namespace: &str, local: &str) -> Result<()> {
        if let Some(attr) = self.attr_node(element, namespace, local) {
            self.remove_attr_node(element, attr)?;
        }
        Ok(())
    }

    /// Document-order descendants of a node, the node itself excluded.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    pub fn descendant_elements(&self, node: NodeId) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|id| self.element(*id).is_some())
            .collect()
    }
}

use super::*;

/// Whether a property key was claimed by a schema table.
enum Applied {
    Done,
    Unknown,
}

/// Assembly context: owns the document arena, the identity registry and the
/// type registration table. One context is one document.
#[derive(Debug, Default)]
pub struct Assembler {
    pub(crate) doc: Document,
    pub(crate) identity: IdentityRegistry,
    pub(crate) types: TypeRegistry,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn register_element_type(&mut self, ty: ElementType) {
        self.types.register_element(ty);
    }

    pub fn register_attr_type(&mut self, ty: AttrType) {
        self.types.register_attr(ty);
    }

    /// Canonical wrapper for a node, if one was ever registered.
    pub fn resolve(&self, node: NodeId) -> Option<Wrapper> {
        self.identity.resolve(node).cloned()
    }

    /// Canonical wrapper for a node, creating and registering one when the
    /// node was never wrapped. Elements consult the type resolver; no
    /// mutation of the node takes place.
    pub fn wrap(&mut self, node: NodeId) -> Result<Wrapper> {
        if let Some(existing) = self.identity.resolve(node) {
            return Ok(existing.clone());
        }
        if !self.doc.is_valid_node(node) {
            return Err(Error::InvalidOperation("node is not part of this document".into()));
        }
        let (category, type_key) = match self.doc.kind(node) {
            NodeKind::Document => (Category::Document, None),
            NodeKind::DocumentType { .. } => (Category::DocumentType, None),
            NodeKind::Fragment => (Category::Fragment, None),
            NodeKind::Element(data) => {
                let resolved = self
                    .types
                    .resolve_element(None, &data.name.namespace, &data.name.local)
                    .map(|ty| ty.key.clone());
                (Category::Element, resolved)
            }
            NodeKind::Attr(_) => (Category::Attr, None),
            NodeKind::Text(_) => (Category::Text, None),
            NodeKind::Comment(_) => (Category::Comment, None),
            NodeKind::Cdata(_) => (Category::Cdata, None),
            NodeKind::Pi { .. } => (Category::Pi, None),
        };
        Ok(self.identity.allocate(node, category, type_key))
    }

    // ---- factories ----

    /// Assembles a generic element. Default local name is `element`, default
    /// namespace and prefix are empty.
    pub fn element(&mut self, init: impl Into<Init>) -> Result<Wrapper> {
        let init = init.into();
        if let Some(adopted) = self.try_adopt(&init)? {
            return Ok(adopted);
        }
        let namespace = init
            .get("namespace")
            .and_then(Init::as_text)
            .unwrap_or("")
            .to_string();
        let qualified = init
            .get("qualifiedName")
            .or_else(|| init.get("localName"))
            .and_then(Init::as_text)
            .unwrap_or("element")
            .to_string();
        let node = self.doc.create_element_ns(&namespace, &qualified)?;
        let wrapper = self.identity.allocate(node, Category::Element, None);
        self.init_wrapper(&wrapper, init)?;
        Ok(wrapper)
    }

    /// Assembles an element of a registered type: the registration supplies
    /// namespace, local name and the `role` attribute.
    pub fn element_of(&mut self, key: &str, init: impl Into<Init>) -> Result<Wrapper> {
        let ty = self
            .types
            .element_by_key(key)
            .cloned()
            .ok_or_else(|| Error::UnknownType(key.into()))?;
        let init = init.into();
        if let Some(adopted) = self.try_adopt(&init)? {
            return Ok(adopted);
        }
        let node = self.doc.create_element_ns(&ty.namespace, &ty.local_name)?;
        if !ty.roles.is_empty() {
            self.doc.set_attr(node, "role", &Role::join(&ty.roles))?;
        }
        let wrapper = self
            .identity
            .allocate(node, Category::Element, Some(ty.key.clone()));
        self.init_wrapper(&wrapper, init)?;
        Ok(wrapper)
    }

    pub fn text(&mut self, init: impl Into<Init>) -> Result<Wrapper> {
        self.character_data(Category::Text, init.into())
    }

    pub fn comment(&mut self, init: impl Into<Init>) -> Result<Wrapper> {
        self.character_data(Category::Comment, init.into())
    }

    pub fn cdata(&mut self, init: impl Into<Init>) -> Result<Wrapper> {
        self.character_data(Category::Cdata, init.into())
    }

    fn character_data(&mut self, category: Category, init: Init) -> Result<Wrapper> {
        if let Some(adopted) = self.try_adopt(&init)? {
            return Ok(adopted);
        }
        let data = init
            .get("data")
            .and_then(Init::as_text)
            .or_else(|| init.as_text())
            .unwrap_or("")
            .to_string();
        let node = match category {
            Category::Text => self.doc.create_text(&data),
            Category::Comment => self.doc.create_comment(&data),
            Category::Cdata => self.doc.create_cdata(&data),
            _ => unreachable!("not a character data category"),
        };
        let wrapper = self.identity.allocate(node, category, None);
        self.init_wrapper(&wrapper, init)?;
        Ok(wrapper)
    }

    /// Assembles a processing instruction. Default target is `instruction`.
    pub fn pi(&mut self, init: impl Into<Init>) -> Result<Wrapper> {
        let init = init.into();
        if let Some(adopted) = self.try_adopt(&init)? {
            return Ok(adopted);
        }
        let target = init
            .get("target")
            .and_then(Init::as_text)
            .unwrap_or("instruction")
            .to_string();
        let data = init
            .get("data")
            .and_then(Init::as_text)
            .or_else(|| init.as_text())
            .unwrap_or("")
            .to_string();
        let node = self.doc.create_pi(&target, &data)?;
        let wrapper = self.identity.allocate(node, Category::Pi, None);
        self.init_wrapper(&wrapper, init)?;
        Ok(wrapper)
    }

    /// Assembles a doctype. Default name is `document`.
    pub fn doctype(&mut self, init: impl Into<Init>) -> Result<Wrapper> {
        let init = init.into();
        if let Some(adopted) = self.try_adopt(&init)? {
            return Ok(adopted);
        }
        let name = init
            .get("qualifiedName")
            .or_else(|| init.get("name"))
            .and_then(Init::as_text)
            .or_else(|| init.as_text())
            .unwrap_or("document")
            .to_string();
        let public_id = init
            .get("publicId")
            .and_then(Init::as_text)
            .unwrap_or("")
            .to_string();
        let system_id = init
            .get("systemId")
            .and_then(Init::as_text)
            .unwrap_or("")
            .to_string();
        let node = self.doc.create_doctype(&name, &public_id, &system_id)?;
        let wrapper = self.identity.allocate(node, Category::DocumentType, None);
        self.init_wrapper(&wrapper, init)?;
        Ok(wrapper)
    }

    pub fn fragment(&mut self, init: impl Into<Init>) -> Result<Wrapper> {
        let init = init.into();
        if let Some(adopted) = self.try_adopt(&init)? {
            return Ok(adopted);
        }
        let node = self.doc.create_fragment();
        let wrapper = self.identity.allocate(node, Category::Fragment, None);
        self.init_wrapper(&wrapper, init)?;
        Ok(wrapper)
    }

    /// Wraps and initializes the context's document node. A fresh context is
    /// a fresh document, so this never creates a second document node.
    pub fn document(&mut self, init: impl Into<Init>) -> Result<Wrapper> {
        let node = self.doc.root();
        let wrapper = match self.identity.resolve(node) {
            Some(existing) => existing.clone(),
            None => self.identity.allocate(node, Category::Document, None),
        };
        self.init_wrapper(&wrapper, init.into())?;
        Ok(wrapper)
    }

    /// Assembles a detached attr node. Default local name is `attr`.
    pub fn attr(&mut self, init: impl Into<Init>) -> Result<Wrapper> {
        let init = init.into();
        if let Some(adopted) = self.try_adopt(&init)? {
            return Ok(adopted);
        }
        let namespace = init
            .get("namespace")
            .and_then(Init::as_text)
            .unwrap_or("")
            .to_string();
        let qualified = init
            .get("qualifiedName")
            .or_else(|| init.get("name"))
            .or_else(|| init.get("localName"))
            .and_then(Init::as_text)
            .unwrap_or("attr")
            .to_string();
        let value = init
            .get("value")
            .and_then(Init::as_text)
            .or_else(|| init.as_text())
            .unwrap_or("")
            .to_string();
        let node = self.doc.create_attr_ns(&namespace, &qualified, &value)?;
        let wrapper = self.identity.allocate(node, Category::Attr, None);
        self.init_wrapper(&wrapper, init)?;
        Ok(wrapper)
    }

    /// Assembles an attr node of a registered type; an absent init value
    /// falls back to the type's (possibly inherited) default.
    pub fn attr_of(&mut self, key: &str, init: impl Into<Init>) -> Result<Wrapper> {
        let ty = self
            .types
            .attr_by_key(key)
            .cloned()
            .ok_or_else(|| Error::UnknownType(key.into()))?;
        let init = init.into();
        if let Some(adopted) = self.try_adopt(&init)? {
            return Ok(adopted);
        }
        let value = init
            .get("value")
            .and_then(Init::as_text)
            .or_else(|| init.as_text())
            .map(str::to_string)
            .or_else(|| self.types.attr_default(key).map(str::to_string))
            .unwrap_or_default();
        let node = self
            .doc
            .create_attr_ns(&ty.namespace, &ty.local_name, &value)?;
        let wrapper = self
            .identity
            .allocate(node, Category::Attr, Some(ty.key.clone()));
        self.init_wrapper(&wrapper, init)?;
        Ok(wrapper)
    }

    /// Attribute value for a registered attr type: the live value when the
    /// attribute is present (an empty string counts as present), otherwise
    /// the registration's default, inherited along the parent chain.
    pub fn get_attr(&self, element: NodeId, key: &str) -> Result<Option<String>> {
        let ty = self
            .types
            .attr_by_key(key)
            .ok_or_else(|| Error::UnknownType(key.into()))?;
        if let Some(value) = self.doc.attr_value(element, &ty.namespace, &ty.local_name) {
            return Ok(Some(value));
        }
        Ok(self.types.attr_default(key).map(str::to_string))
    }

    /// Adoption path: an existing node or wrapper is taken as-is, no
    /// property walk, no mutation.
    fn try_adopt(&mut self, init: &Init) -> Result<Option<Wrapper>> {
        match init {
            Init::Node(node) => self.wrap(*node).map(Some),
            Init::Wrapper(wrapper) => {
                self.identity.register(wrapper.clone());
                Ok(Some(wrapper.clone()))
            }
            Init::Map(_) => match init.get("node") {
                Some(Init::Node(node)) => {
                    let node = *node;
                    let wrapper = self.wrap(node)?;
                    self.apply_map_entries(&wrapper, init.clone())?;
                    Ok(Some(wrapper))
                }
                Some(Init::Wrapper(wrapper)) => {
                    let wrapper = wrapper.clone();
                    self.identity.register(wrapper.clone());
                    self.apply_map_entries(&wrapper, init.clone())?;
                    Ok(Some(wrapper))
                }
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    // ---- initialization engine ----

    /// Routes an init value after construction: shorthand scalars and lists
    /// map to the category's default property, maps are walked entry by
    /// entry through the property schema.
    fn init_wrapper(&mut self, wrapper: &Wrapper, init: Init) -> Result<()> {
        match init {
            Init::Undefined | Init::Null => Ok(()),
            Init::Map(_) => self.apply_map_entries(wrapper, init),
            // Construction already consumed the scalar for character data,
            // instructions and attrs.
            Init::Text(_) | Init::Nodes(_) | Init::List(_) => match wrapper.category() {
                Category::Element | Category::Fragment | Category::Document => {
                    self.replace_children(wrapper.node(), init)
                }
                _ => Ok(()),
            },
            Init::Node(_) | Init::Wrapper(_) => Ok(()),
        }
    }

    fn apply_map_entries(&mut self, wrapper: &Wrapper, init: Init) -> Result<()> {
        let Init::Map(entries) = init else {
            return Ok(());
        };
        for (key, value) in entries {
            if value.is_undefined() {
                continue;
            }
            if is_construction_key(wrapper.category(), &key) {
                continue;
            }
            match self.apply_wrapper_prop(wrapper, &key, &value)? {
                Applied::Done => {}
                Applied::Unknown => match self.apply_node_prop(wrapper, &key, &value)? {
                    Applied::Done => {}
                    Applied::Unknown => {
                        // Mismatch hook: diagnostic, never fatal; prior
                        // assignments stay applied.
                        log::warn!(
                            "no property '{key}' on {} wrapper, skipping",
                            wrapper.category().as_str()
                        );
                    }
                },
            }
        }
        Ok(())
    }

    /// Category schema: wrapper-level setters take precedence over node
    /// properties.
    fn apply_wrapper_prop(&mut self, wrapper: &Wrapper, key: &str, value: &Init) -> Result<Applied> {
        let node = wrapper.node();
        match (wrapper.category(), key) {
            (Category::Element | Category::Fragment | Category::Document, "children")
            | (Category::Element | Category::Fragment | Category::Document, "childNodes") => {
                self.replace_children(node, value.clone())?;
                Ok(Applied::Done)
            }
            (Category::Element, "attributes") => {
                self.apply_attributes(node, value)?;
                Ok(Applied::Done)
            }
            (Category::Element, "classList") => {
                match value {
                    Init::Text(class) => self.doc.set_attr(node, "class", class)?,
                    Init::List(items) => {
                        let tokens: Vec<&str> =
                            items.iter().filter_map(Init::as_text).collect();
                        self.doc.set_attr(node, "class", &tokens.join(" "))?;
                    }
                    Init::Null => self.doc.remove_attr(node, "", "class")?,
                    _ => log::warn!("classList expects a string or a list of strings"),
                }
                Ok(Applied::Done)
            }
            (Category::Element, "className") => {
                if let Some(class) = value.as_text() {
                    self.doc.set_attr(node, "class", class)?;
                }
                Ok(Applied::Done)
            }
            (Category::Element, "id") => {
                if let Some(id) = value.as_text() {
                    self.doc.set_attr(node, "id", id)?;
                }
                Ok(Applied::Done)
            }
            (Category::Attr, "value") | (Category::Attr, "nodeValue") => {
                if let Some(text) = value.as_text() {
                    if let Some(data) = self.doc.attr_data_mut(node) {
                        data.value = text.to_string();
                    }
                }
                Ok(Applied::Done)
            }
            (Category::Attr, "ownerElement") => {
                match value {
                    Init::Node(owner) => {
                        self.doc.set_attr_node(*owner, node)?;
                    }
                    Init::Wrapper(owner) => {
                        self.doc.set_attr_node(owner.node(), node)?;
                    }
                    Init::Null => {
                        if let Some(owner) = self.doc.attr_data(node).and_then(|a| a.owner) {
                            self.doc.remove_attr_node(owner, node)?;
                        }
                    }
                    _ => log::warn!("ownerElement expects an element node"),
                }
                Ok(Applied::Done)
            }
            (Category::Attr, "parentNode") => {
                // Fatal by contract: without an owner element there is
                // nothing to attach to.
                let owner = self
                    .doc
                    .attr_data(node)
                    .and_then(|a| a.owner)
                    .ok_or_else(|| {
                        Error::DetachedAttr("cannot set parentNode on an attr with no owner element".into())
                    })?;
                self.set_parent_node(owner, value)?;
                Ok(Applied::Done)
            }
            (_, "parentNode") => {
                self.set_parent_node(node, value)?;
                Ok(Applied::Done)
            }
            (_, "previousSibling") => {
                self.set_prev_sibling(node, value)?;
                Ok(Applied::Done)
            }
            (_, "nextSibling") => {
                self.set_next_sibling(node, value)?;
                Ok(Applied::Done)
            }
            (Category::Document, "doctype") => {
                self.set_document_doctype(value)?;
                Ok(Applied::Done)
            }
            (Category::Document, "documentElement") => {
                self.set_document_element(value)?;
                Ok(Applied::Done)
            }
            (Category::DocumentType, "publicId") => {
                if let (Some(text), NodeKind::DocumentType { public_id, .. }) =
                    (value.as_text(), self.doc.kind_mut(node))
                {
                    *public_id = text.to_string();
                }
                Ok(Applied::Done)
            }
            (Category::DocumentType, "systemId") => {
                if let (Some(text), NodeKind::DocumentType { system_id, .. }) =
                    (value.as_text(), self.doc.kind_mut(node))
                {
                    *system_id = text.to_string();
                }
                Ok(Applied::Done)
            }
            (Category::Text | Category::Comment | Category::Cdata, "data")
            | (Category::Text | Category::Comment | Category::Cdata, "nodeValue")
            | (Category::Pi, "data")
            | (Category::Pi, "nodeValue") => {
                if let Some(text) = value.as_text() {
                    self.set_data(node, text);
                }
                Ok(Applied::Done)
            }
            _ => Ok(Applied::Unknown),
        }
    }

    /// Node-level properties shared across categories, checked after the
    /// wrapper schema.
    fn apply_node_prop(&mut self, wrapper: &Wrapper, key: &str, value: &Init) -> Result<Applied> {
        let node = wrapper.node();
        match key {
            "textContent" => {
                match wrapper.category() {
                    Category::Element | Category::Fragment => {
                        let text = value.as_text().unwrap_or("").to_string();
                        self.clear_children(node)?;
                        if !text.is_empty() {
                            let text_node = self.doc.create_text(&text);
                            self.doc.append_child(node, text_node)?;
                        }
                    }
                    Category::Text | Category::Comment | Category::Cdata | Category::Pi => {
                        if let Some(text) = value.as_text() {
                            self.set_data(node, text);
                        }
                    }
                    Category::Attr => {
                        if let Some(text) = value.as_text() {
                            if let Some(data) = self.doc.attr_data_mut(node) {
                                data.value = text.to_string();
                            }
                        }
                    }
                    Category::Document | Category::DocumentType => {
                        return Ok(Applied::Unknown);
                    }
                }
                Ok(Applied::Done)
            }
            "nodeValue" => match wrapper.category() {
                Category::Attr => {
                    if let Some(text) = value.as_text() {
                        if let Some(data) = self.doc.attr_data_mut(node) {
                            data.value = text.to_string();
                        }
                    }
                    Ok(Applied::Done)
                }
                _ => Ok(Applied::Unknown),
            },
            _ => Ok(Applied::Unknown),
        }
    }

    fn set_data(&mut self, node: NodeId, text: &str) {
        match self.doc.kind_mut(node) {
            NodeKind::Text(data) | NodeKind::Comment(data) | NodeKind::Cdata(data) => {
                *data = text.to_string();
            }
            NodeKind::Pi { data, .. } => *data = text.to_string(),
            _ => {}
        }
    }

    // ---- relational setters ----

    fn set_parent_node(&mut self, node: NodeId, value: &Init) -> Result<()> {
        match value {
            Init::Null => self.doc.remove_node(node),
            Init::Node(parent) => self.doc.append_child(*parent, node),
            Init::Wrapper(parent) => self.doc.append_child(parent.node(), node),
            _ => Err(Error::InvalidOperation("parentNode expects a node".into())),
        }
    }

    fn set_prev_sibling(&mut self, node: NodeId, value: &Init) -> Result<()> {
        let parent = self.doc.parent(node).ok_or_else(|| {
            Error::DetachedNode("cannot set previousSibling on a parentless node".into())
        })?;
        let items = self.flatten(value.clone())?;
        for item in items {
            self.doc.insert_before(parent, item, node)?;
        }
        Ok(())
    }

    fn set_next_sibling(&mut self, node: NodeId, value: &Init) -> Result<()> {
        let parent = self.doc.parent(node).ok_or_else(|| {
            Error::DetachedNode("cannot set nextSibling on a parentless node".into())
        })?;
        let items = self.flatten(value.clone())?;
        match self.doc.next_sibling(node) {
            Some(next) => {
                for item in items {
                    self.doc.insert_before(parent, item, next)?;
                }
            }
            None => {
                for item in items {
                    self.doc.append_child(parent, item)?;
                }
            }
        }
        Ok(())
    }

    fn set_document_doctype(&mut self, value: &Init) -> Result<()> {
        let doctype = match value {
            Init::Node(node) => *node,
            Init::Wrapper(wrapper) => wrapper.node(),
            Init::Map(_) | Init::Text(_) => self.doctype(value.clone())?.node(),
            _ => return Err(Error::InvalidOperation("doctype expects a doctype node".into())),
        };
        let root = self.doc.root();
        if let Some(old) = self
            .doc
            .children(root)
            .iter()
            .copied()
            .find(|id| matches!(self.doc.kind(*id), NodeKind::DocumentType { .. }))
        {
            return self.doc.replace_child(root, doctype, old);
        }
        match self.doc.first_child(root) {
            Some(first) => self.doc.insert_before(root, doctype, first),
            None => self.doc.append_child(root, doctype),
        }
    }

    fn set_document_element(&mut self, value: &Init) -> Result<()> {
        let element = match value {
            Init::Node(node) => *node,
            Init::Wrapper(wrapper) => wrapper.node(),
            Init::Map(_) => self.element(value.clone())?.node(),
            _ => {
                return Err(Error::InvalidOperation(
                    "documentElement expects an element node".into(),
                ));
            }
        };
        let root = self.doc.root();
        if let Some(old) = self
            .doc
            .children(root)
            .iter()
            .copied()
            .find(|id| self.doc.element(*id).is_some())
        {
            return self.doc.replace_child(root, element, old);
        }
        self.doc.append_child(root, element)
    }

    fn apply_attributes(&mut self, element: NodeId, value: &Init) -> Result<()> {
        let Init::Map(entries) = value else {
            log::warn!("attributes expects a property map");
            return Ok(());
        };
        for (name, entry) in entries.clone() {
            match entry {
                Init::Undefined => {}
                Init::Null => self.doc.remove_attr(element, "", &name)?,
                Init::Text(text) => self.doc.set_attr_ns(element, "", &name, &text)?,
                Init::Node(attr) => {
                    self.doc.set_attr_node(element, attr)?;
                }
                Init::Wrapper(attr) => {
                    self.doc.set_attr_node(element, attr.node())?;
                }
                _ => log::warn!("attribute '{name}' expects a string or an attr node"),
            }
        }
        Ok(())
    }

    // ---- tree mutation facade ----

    /// Recursively flattens a mixed children input into node ids,
    /// left-to-right. Null and Undefined are dropped, strings become text
    /// nodes, wrappers are unwrapped, lists recurse, node collections are
    /// expanded as a snapshot, fragments are spliced into their children.
    pub(crate) fn flatten(&mut self, init: Init) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.flatten_into(init, &mut out)?;
        Ok(out)
    }

    fn flatten_into(&mut self, init: Init, out: &mut Vec<NodeId>) -> Result<()> {
        match init {
            Init::Null | Init::Undefined => Ok(()),
            Init::Text(text) => {
                out.push(self.doc.create_text(&text));
                Ok(())
            }
            Init::Node(node) => {
                self.flatten_node(node, out);
                Ok(())
            }
            Init::Wrapper(wrapper) => {
                self.flatten_node(wrapper.node(), out);
                Ok(())
            }
            Init::Nodes(nodes) => {
                for node in nodes {
                    self.flatten_node(node, out);
                }
                Ok(())
            }
            Init::List(items) => {
                for item in items {
                    self.flatten_into(item, out)?;
                }
                Ok(())
            }
            // A nested property map assembles a generic element in place.
            Init::Map(_) => {
                let wrapper = self.element(init)?;
                out.push(wrapper.node());
                Ok(())
            }
        }
    }

    /// Fragment content transplants wholesale; the container never enters
    /// the tree.
    fn flatten_node(&mut self, node: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.doc.kind(node), NodeKind::Fragment) {
            out.extend_from_slice(self.doc.children(node));
        } else {
            out.push(node);
        }
    }

    /// Appends a mixed children input; final order is the flattened
    /// left-to-right order.
    pub fn append(&mut self, target: NodeId, items: impl Into<Init>) -> Result<()> {
        let nodes = self.flatten(items.into())?;
        for node in nodes {
            self.doc.append_child(target, node)?;
        }
        Ok(())
    }

    pub fn prepend(&mut self, target: NodeId, items: impl Into<Init>) -> Result<()> {
        let nodes = self.flatten(items.into())?;
        match self.doc.first_child(target) {
            Some(reference) => {
                for node in nodes {
                    self.doc.insert_before(target, node, reference)?;
                }
            }
            None => {
                for node in nodes {
                    self.doc.append_child(target, node)?;
                }
            }
        }
        Ok(())
    }

    /// Inserts a mixed input before `reference`, which must have a parent.
    pub fn insert_before(&mut self, reference: NodeId, items: impl Into<Init>) -> Result<()> {
        let parent = self
            .doc
            .parent(reference)
            .ok_or_else(|| Error::DetachedNode("insertion reference has no parent".into()))?;
        let nodes = self.flatten(items.into())?;
        for node in nodes {
            self.doc.insert_before(parent, node, reference)?;
        }
        Ok(())
    }

    /// Replaces `target` with a mixed input.
    pub fn replace(&mut self, target: NodeId, items: impl Into<Init>) -> Result<()> {
        let parent = self
            .doc
            .parent(target)
            .ok_or_else(|| Error::DetachedNode("replacement target has no parent".into()))?;
        let nodes = self.flatten(items.into())?;
        for node in nodes {
            self.doc.insert_before(parent, node, target)?;
        }
        self.doc.remove_child(parent, target)
    }

    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        self.doc.remove_node(node)
    }

    /// Full replace, never a diff: every existing child is removed
    /// individually before the new set is appended.
    pub fn replace_children(&mut self, target: NodeId, items: impl Into<Init>) -> Result<()> {
        let items = items.into();
        self.clear_children(target)?;
        self.append(target, items)
    }

    fn clear_children(&mut self, target: NodeId) -> Result<()> {
        while let Some(child) = self.doc.first_child(target) {
            self.doc.remove_child(target, child)?;
        }
        Ok(())
    }
}

/// Keys consumed at node construction time; the property walk skips them.
fn is_construction_key(category: Category, key: &str) -> bool {
    match category {
        Category::Element => matches!(key, "namespace" | "qualifiedName" | "localName" | "node"),
        Category::Attr => {
            matches!(key, "namespace" | "qualifiedName" | "localName" | "name" | "node")
        }
        Category::Pi => matches!(key, "target" | "node"),
        Category::DocumentType => matches!(key, "qualifiedName" | "name" | "node"),
        Category::Text | Category::Comment | Category::Cdata => matches!(key, "node"),
        Category::Fragment | Category::Document => matches!(key, "node"),
    }
}

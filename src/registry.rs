use super::*;
use std::collections::HashMap;

/// Node category a wrapper belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Document,
    DocumentType,
    Fragment,
    Element,
    Attr,
    Text,
    Comment,
    Cdata,
    Pi,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::DocumentType => "doctype",
            Self::Fragment => "fragment",
            Self::Element => "element",
            Self::Attr => "attr",
            Self::Text => "text",
            Self::Comment => "comment",
            Self::Cdata => "cdata",
            Self::Pi => "instruction",
        }
    }
}

/// User-facing handle over a native node. Cheap to clone; `instance` makes
/// two wrappers over the same node distinguishable, which is what the
/// identity registry's last-writer-wins contract is expressed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapper {
    instance: u64,
    node: NodeId,
    category: Category,
    type_key: Option<String>,
}

impl Wrapper {
    pub(crate) fn new(instance: u64, node: NodeId, category: Category, type_key: Option<String>) -> Self {
        Self {
            instance,
            node,
            category,
            type_key,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Key of the registered type this wrapper was resolved or created as,
    /// if any.
    pub fn type_key(&self) -> Option<&str> {
        self.type_key.as_deref()
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }
}

/// Side table mapping nodes to their canonical wrapper. The source stored
/// this as a hidden slot on the node object itself; a foreign-node host
/// cannot carry hidden fields, so the table is owned by the context.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    entries: HashMap<NodeId, Wrapper>,
    next_instance: u64,
}

impl IdentityRegistry {
    pub(crate) fn allocate(&mut self, node: NodeId, category: Category, type_key: Option<String>) -> Wrapper {
        let wrapper = Wrapper::new(self.next_instance, node, category, type_key);
        self.next_instance += 1;
        self.register(wrapper.clone());
        wrapper
    }

    /// Last writer wins; a displaced wrapper stays usable but is no longer
    /// the resolver target.
    pub(crate) fn register(&mut self, wrapper: Wrapper) {
        if let Some(old) = self.entries.insert(wrapper.node(), wrapper) {
            log::trace!("wrapper {} displaced from node {:?}", old.instance(), old.node());
        }
    }

    pub(crate) fn resolve(&self, node: NodeId) -> Option<&Wrapper> {
        self.entries.get(&node)
    }
}

/// Registered element wrapper type: declarative replacement for the
/// source's wrapper subclasses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementType {
    pub key: String,
    pub namespace: String,
    pub local_name: String,
    /// Space-joined into the `role` attribute at instantiation.
    pub roles: Vec<Role>,
    /// Selector used by `find`/`find_all` type dispatch; the local name
    /// when absent.
    pub selector: Option<String>,
}

impl ElementType {
    pub fn new(key: &str, namespace: &str, local_name: &str) -> Self {
        Self {
            key: key.to_string(),
            namespace: namespace.to_string(),
            local_name: local_name.to_string(),
            roles: Vec::new(),
            selector: None,
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selector = Some(selector.to_string());
        self
    }

    pub(crate) fn selector_or_name(&self) -> &str {
        self.selector.as_deref().unwrap_or(&self.local_name)
    }
}

/// Registered attr wrapper type. `parent` names another attr type whose
/// default value applies when this one declares none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrType {
    pub key: String,
    pub namespace: String,
    pub local_name: String,
    pub default_value: Option<String>,
    pub parent: Option<String>,
}

impl AttrType {
    pub fn new(key: &str, namespace: &str, local_name: &str) -> Self {
        Self {
            key: key.to_string(),
            namespace: namespace.to_string(),
            local_name: local_name.to_string(),
            default_value: None,
            parent: None,
        }
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn with_parent(mut self, key: &str) -> Self {
        self.parent = Some(key.to_string());
        self
    }
}

fn pair_key(namespace: &str, local: &str) -> String {
    format!("{namespace}|{local}")
}

/// Type registration table, owned by the assembler context instead of a
/// process-wide static so independent contexts never share state.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    elements: HashMap<String, ElementType>,
    elements_by_key: HashMap<String, ElementType>,
    attrs_by_key: HashMap<String, AttrType>,
}

impl TypeRegistry {
    /// Later registrations for the same (namespace, local name) pair
    /// overwrite earlier ones.
    pub(crate) fn register_element(&mut self, ty: ElementType) {
        self.elements
            .insert(pair_key(&ty.namespace, &ty.local_name), ty.clone());
        self.elements_by_key.insert(ty.key.clone(), ty);
    }

    pub(crate) fn register_attr(&mut self, ty: AttrType) {
        self.attrs_by_key.insert(ty.key.clone(), ty);
    }

    pub(crate) fn element_by_key(&self, key: &str) -> Option<&ElementType> {
        self.elements_by_key.get(key)
    }

    pub(crate) fn attr_by_key(&self, key: &str) -> Option<&AttrType> {
        self.attrs_by_key.get(key)
    }

    /// Resolution order: the hint when it already matches the pair, then the
    /// exact pair, then namespace alone, then local name alone, then the
    /// generic category default (`None`).
    pub(crate) fn resolve_element(
        &self,
        hint: Option<&ElementType>,
        namespace: &str,
        local: &str,
    ) -> Option<&ElementType> {
        if let Some(hint) = hint {
            if hint.namespace == namespace && hint.local_name == local {
                return self.elements_by_key.get(&hint.key);
            }
        }
        self.elements
            .get(&pair_key(namespace, local))
            .or_else(|| self.elements.get(&pair_key(namespace, "")))
            .or_else(|| self.elements.get(&pair_key("", local)))
    }

    /// Walks the parent chain until a default value is declared.
    pub(crate) fn attr_default(&self, key: &str) -> Option<&str> {
        let mut cursor = self.attrs_by_key.get(key);
        let mut hops = 0usize;
        while let Some(ty) = cursor {
            if let Some(default) = ty.default_value.as_deref() {
                return Some(default);
            }
            hops += 1;
            if hops > self.attrs_by_key.len() {
                // Registration cycle; treat as no default.
                return None;
            }
            cursor = ty.parent.as_deref().and_then(|p| self.attrs_by_key.get(p));
        }
        None
    }
}

use super::*;

/// Caller-supplied description of how to construct or populate a wrapper.
/// Consumed synchronously by one assembly call, never retained.
///
/// `Null` is silently dropped wherever children are flattened; `Undefined`
/// additionally marks a property entry as "not provided", which is distinct
/// from an explicitly empty value.
#[derive(Debug, Clone, PartialEq)]
pub enum Init {
    /// Ordered property map, applied entry by entry through the category's
    /// property schema.
    Map(Vec<(String, Init)>),
    /// Mixed children, flattened recursively at arbitrary depth.
    List(Vec<Init>),
    Text(String),
    /// An existing native node, adopted without a property walk.
    Node(NodeId),
    /// An existing wrapper; its underlying node is extracted.
    Wrapper(Wrapper),
    /// Snapshot of a node collection, expanded at flatten time.
    Nodes(Vec<NodeId>),
    Null,
    Undefined,
}

impl Init {
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Init>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Init>,
        I: IntoIterator<Item = V>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// The map entry for `key`, if present.
    pub(crate) fn get<'a>(&'a self, key: &str) -> Option<&'a Init> {
        match self {
            Self::Map(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// String form of a scalar init, used for construction fields.
    pub(crate) fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl From<&str> for Init {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Init {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NodeId> for Init {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<Wrapper> for Init {
    fn from(wrapper: Wrapper) -> Self {
        Self::Wrapper(wrapper)
    }
}

impl From<&Wrapper> for Init {
    fn from(wrapper: &Wrapper) -> Self {
        Self::Wrapper(wrapper.clone())
    }
}

impl From<Vec<Init>> for Init {
    fn from(items: Vec<Init>) -> Self {
        Self::List(items)
    }
}

impl<T: Into<Init>, const N: usize> From<[T; N]> for Init {
    fn from(items: [T; N]) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Init>> From<Option<T>> for Init {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

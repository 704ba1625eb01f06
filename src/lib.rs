//! Declarative assembler for document trees.
//!
//! The crate wraps an arena-backed document in small wrapper handles that
//! expose ergonomic construction, property initialization and tree
//! manipulation. A caller describes a node as a nested [`Init`] value
//! (name, namespace, attributes, children) and the [`Assembler`] builds the
//! corresponding live tree, keeps a node-to-wrapper identity registry, and
//! routes every init key through a per-category property schema.
//!
//! ```
//! use dom_assembler::{Assembler, Init};
//!
//! let mut asm = Assembler::new();
//! let root = asm.element(Init::map([
//!     ("qualifiedName", Init::from("document")),
//!     ("children", Init::map([("attributes", Init::map([("role", Init::from("radio"))]))])),
//! ]))?;
//! assert_eq!(
//!     asm.doc().markup(root.node()),
//!     r#"<document><element role="radio"/></document>"#
//! );
//! # Ok::<(), dom_assembler::Error>(())
//! ```

use std::error::Error as StdError;
use std::fmt;

mod assemble;
mod document;
mod init;
mod markup;
pub mod ns;
mod query;
mod registry;
mod role;
mod selector;

pub use assemble::Assembler;
pub use document::{AttrData, Document, ElementData, Node, NodeId, NodeKind, QualifiedName};
pub use init::Init;
pub use query::{Filter, Subject};
pub use registry::{AttrType, Category, ElementType, Wrapper};
pub use role::Role;

pub(crate) use registry::{IdentityRegistry, TypeRegistry};
pub(crate) use selector::{
    NthSelector, SelectorAttrCondition, SelectorCombinator, SelectorPart, SelectorPseudoClass,
    SelectorStep, parse_selector_groups,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A relational setter on an attr wrapper that has no owner element.
    DetachedAttr(String),
    /// A sibling setter on a node that has no parent.
    DetachedNode(String),
    /// Structurally invalid mutation: cycles, foreign references, wrong
    /// node category, removing the document node.
    InvalidOperation(String),
    /// A name that cannot name a node.
    InvalidName(String),
    UnsupportedSelector(String),
    /// A `find`/`find_all` subject naming a type key that was never
    /// registered.
    UnknownType(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DetachedAttr(msg) => write!(f, "detached attr: {msg}"),
            Self::DetachedNode(msg) => write!(f, "detached node: {msg}"),
            Self::InvalidOperation(msg) => write!(f, "invalid operation: {msg}"),
            Self::InvalidName(msg) => write!(f, "invalid name: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::UnknownType(key) => write!(f, "unknown type key: {key}"),
        }
    }
}

impl StdError for Error {}

#[cfg(test)]
mod tests;

//! Wrapper-returning queries: selector matching plus `find`/`find_all`
//! dispatch over selector strings, registered element types and registered
//! attr types.

use super::*;

/// What to search for.
#[derive(Clone, Copy)]
pub enum Subject<'a> {
    /// A selector string, queried over the scope's descendants.
    Selector(&'a str),
    /// A registered element type, dispatched through its selector.
    ElementType(&'a str),
    /// A registered attr type, dispatched through attribute lookup instead
    /// of a tree query.
    AttrType(&'a str),
}

/// Optional narrowing of a query.
pub enum Filter<'a> {
    /// Concatenated onto the subject's selector before the query.
    Selector(&'a str),
    /// Applied over resolved wrappers after the query.
    Predicate(&'a dyn Fn(&Document, &Wrapper) -> bool),
}

impl Assembler {
    /// First match of `find_all`, in document order.
    pub fn find(
        &mut self,
        scope: NodeId,
        subject: Subject<'_>,
        filter: Option<Filter<'_>>,
    ) -> Result<Option<Wrapper>> {
        Ok(self.find_all(scope, subject, filter)?.into_iter().next())
    }

    /// All matches under `scope` in document order, as wrapper instances.
    pub fn find_all(
        &mut self,
        scope: NodeId,
        subject: Subject<'_>,
        filter: Option<Filter<'_>>,
    ) -> Result<Vec<Wrapper>> {
        let mut wrappers = match subject {
            Subject::Selector(selector) => {
                let selector = concat_filter(selector, &filter);
                let nodes = self.query_all(scope, &selector)?;
                self.wrap_all(nodes)?
            }
            Subject::ElementType(key) => {
                let base = self
                    .types
                    .element_by_key(key)
                    .ok_or_else(|| Error::UnknownType(key.into()))?
                    .selector_or_name()
                    .to_string();
                let selector = concat_filter(&base, &filter);
                let nodes = self.query_all(scope, &selector)?;
                self.wrap_all(nodes)?
            }
            Subject::AttrType(key) => {
                let ty = self
                    .types
                    .attr_by_key(key)
                    .cloned()
                    .ok_or_else(|| Error::UnknownType(key.into()))?;
                let owner_chains = match &filter {
                    Some(Filter::Selector(extra)) => Some(parse_selector_groups(extra)?),
                    _ => None,
                };
                let mut attrs = Vec::new();
                for element in self.doc.descendant_elements(scope) {
                    let Some(attr) = self.doc.attr_node(element, &ty.namespace, &ty.local_name)
                    else {
                        continue;
                    };
                    if let Some(chains) = &owner_chains {
                        if !matches_any_group(&self.doc, element, chains) {
                            continue;
                        }
                    }
                    attrs.push(attr);
                }
                let mut wrappers = Vec::with_capacity(attrs.len());
                for attr in attrs {
                    wrappers.push(self.wrap_attr_as(attr, &ty.key)?);
                }
                wrappers
            }
        };

        if let Some(Filter::Predicate(predicate)) = filter {
            wrappers.retain(|wrapper| predicate(&self.doc, wrapper));
        }
        Ok(wrappers)
    }

    /// Matching descendant elements of `scope`, in document order.
    pub(crate) fn query_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        Ok(self
            .doc
            .descendant_elements(scope)
            .into_iter()
            .filter(|node| matches_any_group(&self.doc, *node, &groups))
            .collect())
    }

    fn wrap_all(&mut self, nodes: Vec<NodeId>) -> Result<Vec<Wrapper>> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            out.push(self.wrap(node)?);
        }
        Ok(out)
    }

    fn wrap_attr_as(&mut self, attr: NodeId, type_key: &str) -> Result<Wrapper> {
        if let Some(existing) = self.identity.resolve(attr) {
            return Ok(existing.clone());
        }
        Ok(self
            .identity
            .allocate(attr, Category::Attr, Some(type_key.to_string())))
    }
}

fn concat_filter(selector: &str, filter: &Option<Filter<'_>>) -> String {
    match filter {
        Some(Filter::Selector(extra)) => format!("{selector}{extra}"),
        _ => selector.to_string(),
    }
}

pub(crate) fn matches_any_group(doc: &Document, node: NodeId, groups: &[Vec<SelectorPart>]) -> bool {
    groups.iter().any(|chain| matches_chain(doc, node, chain))
}

/// Rightmost step must match `node`; the rest of the chain is walked to the
/// left through the combinators, with backtracking for descendant and
/// general-sibling relations.
fn matches_chain(doc: &Document, node: NodeId, chain: &[SelectorPart]) -> bool {
    if chain.is_empty() {
        return false;
    }
    matches_from(doc, node, chain, chain.len() - 1)
}

fn matches_from(doc: &Document, node: NodeId, chain: &[SelectorPart], index: usize) -> bool {
    if !matches_step(doc, node, &chain[index].step) {
        return false;
    }
    if index == 0 {
        return true;
    }
    match chain[index].combinator {
        Some(SelectorCombinator::Child) => match doc.parent(node).filter(|p| doc.element(*p).is_some()) {
            Some(parent) => matches_from(doc, parent, chain, index - 1),
            None => false,
        },
        Some(SelectorCombinator::Descendant) | None => {
            let mut cursor = doc.parent(node);
            while let Some(ancestor) = cursor {
                if doc.element(ancestor).is_some() && matches_from(doc, ancestor, chain, index - 1) {
                    return true;
                }
                cursor = doc.parent(ancestor);
            }
            false
        }
        Some(SelectorCombinator::AdjacentSibling) => match prev_element_sibling(doc, node) {
            Some(sibling) => matches_from(doc, sibling, chain, index - 1),
            None => false,
        },
        Some(SelectorCombinator::GeneralSibling) => {
            let mut cursor = prev_element_sibling(doc, node);
            while let Some(sibling) = cursor {
                if matches_from(doc, sibling, chain, index - 1) {
                    return true;
                }
                cursor = prev_element_sibling(doc, sibling);
            }
            false
        }
    }
}

fn matches_step(doc: &Document, node: NodeId, step: &SelectorStep) -> bool {
    let Some(element) = doc.element(node) else {
        return false;
    };

    if let Some(tag) = &step.tag {
        if element.name.local != *tag {
            return false;
        }
    }
    if let Some(id) = &step.id {
        if doc.attr_value(node, "", "id").as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    for class in &step.classes {
        let has = doc
            .attr_value(node, "", "class")
            .is_some_and(|value| value.split_whitespace().any(|token| token == class));
        if !has {
            return false;
        }
    }
    for cond in &step.attrs {
        if !matches_attr_condition(doc, node, cond) {
            return false;
        }
    }
    for pseudo in &step.pseudo_classes {
        if !matches_pseudo(doc, node, pseudo) {
            return false;
        }
    }
    true
}

fn attr_for_key(doc: &Document, node: NodeId, key: &str) -> Option<String> {
    // Selector attr keys carry no namespace URI; a `prefix:local` key is
    // matched against the attr's qualified name.
    for attr in doc.attrs(node) {
        let Some(data) = doc.attr_data(*attr) else {
            continue;
        };
        if data.name.qualified() == key || data.name.local == key {
            return Some(data.value.clone());
        }
    }
    None
}

fn matches_attr_condition(doc: &Document, node: NodeId, cond: &SelectorAttrCondition) -> bool {
    match cond {
        SelectorAttrCondition::Exists { key } => attr_for_key(doc, node, key).is_some(),
        SelectorAttrCondition::Eq { key, value } => {
            attr_for_key(doc, node, key).as_deref() == Some(value.as_str())
        }
        SelectorAttrCondition::StartsWith { key, value } => {
            !value.is_empty()
                && attr_for_key(doc, node, key).is_some_and(|v| v.starts_with(value.as_str()))
        }
        SelectorAttrCondition::EndsWith { key, value } => {
            !value.is_empty()
                && attr_for_key(doc, node, key).is_some_and(|v| v.ends_with(value.as_str()))
        }
        SelectorAttrCondition::Contains { key, value } => {
            !value.is_empty()
                && attr_for_key(doc, node, key).is_some_and(|v| v.contains(value.as_str()))
        }
        SelectorAttrCondition::Includes { key, value } => {
            !value.is_empty()
                && attr_for_key(doc, node, key)
                    .is_some_and(|v| v.split_whitespace().any(|token| token == value))
        }
        SelectorAttrCondition::DashMatch { key, value } => {
            attr_for_key(doc, node, key).is_some_and(|v| {
                v == *value || v.strip_prefix(value.as_str()).is_some_and(|rest| rest.starts_with('-'))
            })
        }
    }
}

fn matches_pseudo(doc: &Document, node: NodeId, pseudo: &SelectorPseudoClass) -> bool {
    match pseudo {
        SelectorPseudoClass::FirstChild => element_index(doc, node) == Some(1),
        SelectorPseudoClass::LastChild => {
            let siblings = element_siblings(doc, node);
            siblings.last() == Some(&node)
        }
        SelectorPseudoClass::OnlyChild => element_siblings(doc, node).len() == 1,
        SelectorPseudoClass::Empty => doc.children(node).iter().all(|child| {
            matches!(doc.kind(*child), NodeKind::Comment(_) | NodeKind::Pi { .. })
        }),
        SelectorPseudoClass::Not(groups) => !matches_any_group(doc, node, groups),
        SelectorPseudoClass::NthChild(nth) => {
            element_index(doc, node).is_some_and(|index| matches_nth(nth, index))
        }
    }
}

fn element_siblings(doc: &Document, node: NodeId) -> Vec<NodeId> {
    match doc.parent(node) {
        Some(parent) => doc
            .children(parent)
            .iter()
            .copied()
            .filter(|id| doc.element(*id).is_some())
            .collect(),
        None => vec![node],
    }
}

fn prev_element_sibling(doc: &Document, node: NodeId) -> Option<NodeId> {
    let siblings = element_siblings(doc, node);
    let pos = siblings.iter().position(|id| *id == node)?;
    pos.checked_sub(1).map(|prev| siblings[prev])
}

/// One-based position among element siblings.
fn element_index(doc: &Document, node: NodeId) -> Option<usize> {
    let siblings = element_siblings(doc, node);
    siblings.iter().position(|id| *id == node).map(|pos| pos + 1)
}

fn matches_nth(nth: &NthSelector, index: usize) -> bool {
    match nth {
        NthSelector::Exact(value) => index == *value,
        NthSelector::Odd => index % 2 == 1,
        NthSelector::Even => index % 2 == 0,
        NthSelector::AnPlusB(a, b) => {
            let index = index as i64;
            if *a == 0 {
                return index == *b;
            }
            let diff = index - b;
            diff % a == 0 && diff / a >= 0
        }
    }
}

use super::*;

#[test]
fn default_construction_uses_category_names() -> Result<()> {
    let mut asm = Assembler::new();

    let element = asm.element(Init::Undefined)?;
    assert_eq!(asm.doc().local_name(element.node()), Some("element"));
    assert!(asm.doc().children(element.node()).is_empty());

    let attr = asm.attr(Init::Undefined)?;
    let data = asm.doc().attr_data(attr.node()).unwrap();
    assert_eq!(data.name.local, "attr");
    assert_eq!(data.value, "");

    let pi = asm.pi(Init::Undefined)?;
    match asm.doc().kind(pi.node()) {
        NodeKind::Pi { target, data } => {
            assert_eq!(target, "instruction");
            assert_eq!(data, "");
        }
        other => panic!("expected a pi node, got {other:?}"),
    }

    let doctype = asm.doctype(Init::Undefined)?;
    assert_eq!(asm.doc().markup(doctype.node()), "<!DOCTYPE document>");
    Ok(())
}

#[test]
fn explicit_names_override_defaults() -> Result<()> {
    let mut asm = Assembler::new();
    let svg = asm.element(Init::map([
        ("namespace", "http://www.w3.org/2000/svg"),
        ("qualifiedName", "svg:rect"),
    ]))?;
    let element = asm.doc().element(svg.node()).unwrap();
    assert_eq!(element.name.namespace, "http://www.w3.org/2000/svg");
    assert_eq!(element.name.prefix, "svg");
    assert_eq!(element.name.local, "rect");
    assert_eq!(element.name.qualified(), "svg:rect");
    Ok(())
}

#[test]
fn invalid_names_are_rejected() {
    let mut asm = Assembler::new();
    assert!(matches!(
        asm.element(Init::map([("qualifiedName", "bad name")])),
        Err(Error::InvalidName(_))
    ));
    assert!(matches!(
        asm.element(Init::map([("qualifiedName", "trailing:")])),
        Err(Error::InvalidName(_))
    ));
}

#[test]
fn resolve_returns_most_recent_wrapper() -> Result<()> {
    let mut asm = Assembler::new();
    let first = asm.element(Init::Undefined)?;
    assert_eq!(asm.resolve(first.node()).as_ref(), Some(&first));

    // A second wrapper claiming the same node displaces the first.
    let second = asm
        .identity
        .allocate(first.node(), Category::Element, None);
    assert_ne!(first.instance(), second.instance());
    assert_eq!(asm.resolve(first.node()).as_ref(), Some(&second));

    // Adopting the displaced wrapper re-registers it: last writer wins.
    let adopted = asm.element(first.clone())?;
    assert_eq!(adopted, first);
    assert_eq!(asm.resolve(first.node()).as_ref(), Some(&first));
    Ok(())
}

#[test]
fn unwrapped_nodes_resolve_to_none() {
    let mut asm = Assembler::new();
    let node = asm.doc_mut().create_text("loose");
    assert!(asm.resolve(node).is_none());
}

#[test]
fn wrap_registers_and_reuses_wrappers() -> Result<()> {
    let mut asm = Assembler::new();
    let node = asm.doc_mut().create_comment("note");
    let wrapper = asm.wrap(node)?;
    assert_eq!(wrapper.category(), Category::Comment);
    assert_eq!(asm.wrap(node)?, wrapper);
    Ok(())
}

#[test]
fn adoption_round_trip_keeps_node_identity() -> Result<()> {
    let mut asm = Assembler::new();
    let original = asm.element(Init::map([("id", "keep")]))?;
    let markup_before = asm.doc().markup(original.node());

    let adopted = asm.element(Init::Node(original.node()))?;
    assert_eq!(adopted.node(), original.node());
    // Adoption performs no mutation.
    assert_eq!(asm.doc().markup(adopted.node()), markup_before);
    Ok(())
}

#[test]
fn map_with_node_key_adopts_then_applies_remaining_props() -> Result<()> {
    let mut asm = Assembler::new();
    let original = asm.element(Init::Undefined)?;
    let adopted = asm.element(Init::map([
        ("node", Init::Node(original.node())),
        ("id", Init::from("adopted")),
    ]))?;
    assert_eq!(adopted.node(), original.node());
    assert_eq!(
        asm.doc().attr_value(original.node(), "", "id").as_deref(),
        Some("adopted")
    );
    Ok(())
}

#[test]
fn flatten_is_invariant_under_nesting() -> Result<()> {
    let mut asm = Assembler::new();

    let flat = asm.element(Init::Undefined)?;
    asm.append(flat.node(), Init::list(["a", "b", "c"]))?;

    let nested = asm.element(Init::Undefined)?;
    asm.append(
        nested.node(),
        Init::List(vec![
            Init::from("a"),
            Init::List(vec![
                Init::from("b"),
                Init::List(vec![Init::from("c")]),
                Init::Null,
            ]),
            Init::Undefined,
        ]),
    )?;

    let texts = |asm: &Assembler, node: NodeId| -> Vec<String> {
        asm.doc()
            .children(node)
            .iter()
            .map(|child| asm.doc().text_content(*child))
            .collect()
    };
    assert_eq!(texts(&asm, flat.node()), texts(&asm, nested.node()));
    assert_eq!(texts(&asm, flat.node()), vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn replace_children_is_a_full_replace() -> Result<()> {
    let mut asm = Assembler::new();
    let parent = asm.element(Init::Undefined)?;
    let p = asm.element(Init::map([("qualifiedName", "p")]))?;
    let q = asm.element(Init::map([("qualifiedName", "q")]))?;
    asm.append(parent.node(), Init::list([p.clone(), q.clone()]))?;

    let r = asm.element(Init::map([("qualifiedName", "r")]))?;
    asm.replace_children(parent.node(), Init::list([r.clone()]))?;

    assert_eq!(asm.doc().children(parent.node()), &[r.node()]);
    assert_eq!(asm.doc().parent(p.node()), None);
    assert_eq!(asm.doc().parent(q.node()), None);
    Ok(())
}

#[test]
fn append_accepts_mixed_input() -> Result<()> {
    let mut asm = Assembler::new();
    let parent = asm.element(Init::Undefined)?;
    let child = asm.element(Init::map([("qualifiedName", "child")]))?;
    let loose = asm.doc_mut().create_comment("c");
    asm.append(
        parent.node(),
        Init::List(vec![
            Init::Null,
            Init::from("hello"),
            Init::Wrapper(child.clone()),
            Init::Node(loose),
            Init::Nodes(vec![]),
        ]),
    )?;
    assert_eq!(
        asm.doc().markup(parent.node()),
        "<element>hello<child/><!--c--></element>"
    );
    Ok(())
}

#[test]
fn fragment_content_transplants_wholesale() -> Result<()> {
    let mut asm = Assembler::new();
    let fragment = asm.fragment(Init::list(["x", "y"]))?;
    assert_eq!(asm.doc().children(fragment.node()).len(), 2);

    let parent = asm.element(Init::Undefined)?;
    asm.append(parent.node(), fragment.clone())?;

    assert!(asm.doc().children(fragment.node()).is_empty());
    assert_eq!(asm.doc().markup(parent.node()), "<element>xy</element>");
    Ok(())
}

#[test]
fn prepend_and_insert_preserve_order() -> Result<()> {
    let mut asm = Assembler::new();
    let parent = asm.element("c")?;
    asm.prepend(parent.node(), Init::list(["a", "b"]))?;
    assert_eq!(asm.doc().markup(parent.node()), "<element>abc</element>");

    let reference = asm.doc().children(parent.node())[2];
    asm.insert_before(reference, Init::list(["x", "y"]))?;
    assert_eq!(asm.doc().markup(parent.node()), "<element>abxyc</element>");

    asm.replace(reference, "z")?;
    assert_eq!(asm.doc().markup(parent.node()), "<element>abxyz</element>");
    Ok(())
}

#[test]
fn nested_maps_assemble_elements_in_children_position() -> Result<()> {
    let mut asm = Assembler::new();
    let root = asm.element(Init::map([
        ("qualifiedName", Init::from("document")),
        (
            "children",
            Init::map([("attributes", Init::map([("role", Init::from("radio"))]))]),
        ),
    ]))?;
    assert_eq!(
        asm.doc().markup(root.node()),
        r#"<document><element role="radio"/></document>"#
    );
    Ok(())
}

#[test]
fn doctype_serializes_public_and_system_ids() -> Result<()> {
    let mut asm = Assembler::new();
    let doctype = asm.doctype(Init::map([
        ("qualifiedName", "html"),
        ("publicId", "-//W3C//DTD XHTML 1.1//EN"),
        ("systemId", "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd"),
    ]))?;
    assert_eq!(
        asm.doc().markup(doctype.node()),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.1//EN\" \"http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd\">"
    );

    let system_only = asm.doctype(Init::map([
        ("name", "svg"),
        ("systemId", "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd"),
    ]))?;
    assert_eq!(
        asm.doc().markup(system_only.node()),
        "<!DOCTYPE svg SYSTEM \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">"
    );
    Ok(())
}

#[test]
fn detached_attr_parent_node_is_a_usage_error() -> Result<()> {
    let mut asm = Assembler::new();
    let target = asm.element(Init::Undefined)?;
    let result = asm.attr(Init::map([
        ("name", Init::from("title")),
        ("parentNode", Init::Wrapper(target)),
    ]));
    assert!(matches!(result, Err(Error::DetachedAttr(_))));
    Ok(())
}

#[test]
fn owned_attr_forwards_parent_node_to_its_owner() -> Result<()> {
    let mut asm = Assembler::new();
    let owner = asm.element(Init::map([("qualifiedName", "item")]))?;
    let parent = asm.element(Init::Undefined)?;
    asm.attr(Init::map([
        ("name", Init::from("title")),
        ("value", Init::from("x")),
        ("ownerElement", Init::Wrapper(owner.clone())),
        ("parentNode", Init::Wrapper(parent.clone())),
    ]))?;
    assert_eq!(asm.doc().parent(owner.node()), Some(parent.node()));
    assert_eq!(
        asm.doc().markup(parent.node()),
        r#"<element><item title="x"/></element>"#
    );
    Ok(())
}

#[test]
fn sibling_setters_require_a_parent() -> Result<()> {
    let mut asm = Assembler::new();
    let orphan = asm.element(Init::Undefined)?;
    let result = asm.element(Init::map([
        ("node", Init::Node(orphan.node())),
        ("previousSibling", Init::from("before")),
    ]));
    assert!(matches!(result, Err(Error::DetachedNode(_))));

    let parent = asm.element(Init::Undefined)?;
    asm.append(parent.node(), orphan.clone())?;
    asm.element(Init::map([
        ("node", Init::Node(orphan.node())),
        ("previousSibling", Init::from("before")),
        ("nextSibling", Init::from("after")),
    ]))?;
    assert_eq!(
        asm.doc().markup(parent.node()),
        "<element>before<element/>after</element>"
    );
    Ok(())
}

#[test]
fn mismatched_keys_warn_and_do_not_abort() -> Result<()> {
    let mut asm = Assembler::new();
    let element = asm.element(Init::map([
        ("id", Init::from("first")),
        ("noSuchProperty", Init::from("ignored")),
        ("classList", Init::from("late")),
    ]))?;
    // The mismatch is non-fatal and earlier/later assignments stick.
    assert_eq!(
        asm.doc().markup(element.node()),
        r#"<element id="first" class="late"/>"#
    );
    Ok(())
}

#[test]
fn undefined_values_are_skipped() -> Result<()> {
    let mut asm = Assembler::new();
    let element = asm.element(Init::map([
        ("id", Init::Undefined),
        ("className", Init::from("")),
    ]))?;
    assert_eq!(asm.doc().attr_value(element.node(), "", "id"), None);
    // Explicitly empty is applied, unlike undefined.
    assert_eq!(
        asm.doc().attr_value(element.node(), "", "class").as_deref(),
        Some("")
    );
    Ok(())
}

#[test]
fn class_list_joins_tokens() -> Result<()> {
    let mut asm = Assembler::new();
    let element = asm.element(Init::map([(
        "classList",
        Init::list(["alpha", "beta"]),
    )]))?;
    assert_eq!(
        asm.doc().attr_value(element.node(), "", "class").as_deref(),
        Some("alpha beta")
    );
    Ok(())
}

#[test]
fn text_content_replaces_children() -> Result<()> {
    let mut asm = Assembler::new();
    let element = asm.element(Init::list(["old", "nodes"]))?;
    asm.element(Init::map([
        ("node", Init::Node(element.node())),
        ("textContent", Init::from("fresh")),
    ]))?;
    assert_eq!(asm.doc().markup(element.node()), "<element>fresh</element>");
    Ok(())
}

#[test]
fn attributes_map_sets_removes_and_adopts_attr_nodes() -> Result<()> {
    let mut asm = Assembler::new();
    let title = asm.attr(Init::map([
        ("name", Init::from("title")),
        ("value", Init::from("greeting")),
    ]))?;
    let element = asm.element(Init::map([(
        "attributes",
        Init::Map(vec![
            ("role".into(), Init::from("radio")),
            ("hidden".into(), Init::from("")),
            ("title".into(), Init::Wrapper(title.clone())),
        ]),
    )]))?;
    assert_eq!(
        asm.doc().markup(element.node()),
        r#"<element role="radio" hidden="" title="greeting"/>"#
    );
    assert_eq!(
        asm.doc().attr_data(title.node()).unwrap().owner,
        Some(element.node())
    );

    asm.element(Init::map([
        ("node", Init::Node(element.node())),
        ("attributes", Init::Map(vec![("hidden".into(), Init::Null)])),
    ]))?;
    assert_eq!(asm.doc().attr_value(element.node(), "", "hidden"), None);
    Ok(())
}

#[test]
fn character_data_shorthand_sets_data() -> Result<()> {
    let mut asm = Assembler::new();
    let text = asm.text("plain")?;
    let comment = asm.comment("note")?;
    let cdata = asm.cdata("1 < 2")?;
    let pi = asm.pi(Init::map([
        ("target", "xml-stylesheet"),
        ("data", "href=\"style.css\""),
    ]))?;

    assert_eq!(asm.doc().markup(text.node()), "plain");
    assert_eq!(asm.doc().markup(comment.node()), "<!--note-->");
    assert_eq!(asm.doc().markup(cdata.node()), "<![CDATA[1 < 2]]>");
    assert_eq!(
        asm.doc().markup(pi.node()),
        "<?xml-stylesheet href=\"style.css\"?>"
    );
    Ok(())
}

#[test]
fn markup_escapes_text_and_attr_values() -> Result<()> {
    let mut asm = Assembler::new();
    let element = asm.element(Init::map([
        ("attributes", Init::map([("title", "a\"b<c")])),
        ("children", Init::from("1 < 2 & 3 > 2")),
    ]))?;
    assert_eq!(
        asm.doc().markup(element.node()),
        r#"<element title="a&quot;b&lt;c">1 &lt; 2 &amp; 3 &gt; 2</element>"#
    );
    Ok(())
}

#[test]
fn document_init_places_doctype_and_document_element() -> Result<()> {
    let mut asm = Assembler::new();
    asm.document(Init::map([
        ("documentElement", Init::map([("qualifiedName", Init::from("html"))])),
        ("doctype", Init::map([("qualifiedName", Init::from("html"))])),
    ]))?;
    let root = asm.doc().root();
    assert_eq!(asm.doc().markup(root), "<!DOCTYPE html><html/>");

    // Re-initializing replaces, never duplicates.
    asm.document(Init::map([(
        "documentElement",
        Init::map([("qualifiedName", Init::from("svg"))]),
    )]))?;
    assert_eq!(asm.doc().markup(root), "<!DOCTYPE html><svg/>");
    Ok(())
}

#[test]
fn doctype_nodes_live_only_under_the_document() -> Result<()> {
    let mut asm = Assembler::new();
    let element = asm.element(Init::Undefined)?;
    let doctype = asm.doctype(Init::Undefined)?;
    assert!(matches!(
        asm.append(element.node(), doctype.clone()),
        Err(Error::InvalidOperation(_))
    ));
    asm.append(asm.doc().root(), doctype)?;
    Ok(())
}

#[test]
fn document_node_cannot_be_removed() {
    let mut asm = Assembler::new();
    let root = asm.doc().root();
    assert!(matches!(
        asm.remove(root),
        Err(Error::InvalidOperation(_))
    ));
}

#[test]
fn cyclic_insertion_is_rejected() -> Result<()> {
    let mut asm = Assembler::new();
    let outer = asm.element(Init::Undefined)?;
    let inner = asm.element(Init::Undefined)?;
    asm.append(outer.node(), inner.clone())?;
    assert!(matches!(
        asm.append(inner.node(), outer.clone()),
        Err(Error::InvalidOperation(_))
    ));
    Ok(())
}

#[test]
fn registered_element_types_supply_name_and_roles() -> Result<()> {
    let mut asm = Assembler::new();
    asm.register_element_type(
        ElementType::new("radio", "", "input").with_roles([Role::Radio]),
    );
    let radio = asm.element_of("radio", Init::Undefined)?;
    assert_eq!(radio.type_key(), Some("radio"));
    assert_eq!(asm.doc().markup(radio.node()), r#"<input role="radio"/>"#);

    assert!(matches!(
        asm.element_of("missing", Init::Undefined),
        Err(Error::UnknownType(_))
    ));
    Ok(())
}

#[test]
fn type_resolution_falls_back_namespace_then_local_then_generic() -> Result<()> {
    let mut asm = Assembler::new();
    asm.register_element_type(ElementType::new("exact", ns::SVG, "rect"));
    asm.register_element_type(ElementType::new("any-svg", ns::SVG, ""));
    asm.register_element_type(ElementType::new("any-rect", "", "rect"));

    let exact = asm.doc_mut().create_element_ns(ns::SVG, "rect")?;
    assert_eq!(asm.wrap(exact)?.type_key(), Some("exact"));

    let ns_only = asm.doc_mut().create_element_ns(ns::SVG, "circle")?;
    assert_eq!(asm.wrap(ns_only)?.type_key(), Some("any-svg"));

    let local_only = asm.doc_mut().create_element_ns("", "rect")?;
    assert_eq!(asm.wrap(local_only)?.type_key(), Some("any-rect"));

    let generic = asm.doc_mut().create_element_ns("", "path")?;
    assert_eq!(asm.wrap(generic)?.type_key(), None);
    Ok(())
}

#[test]
fn matching_hint_short_circuits_resolution() {
    let mut asm = Assembler::new();
    asm.register_element_type(ElementType::new("rect", ns::SVG, "rect"));
    asm.register_element_type(ElementType::new("shadow", ns::SVG, "rect"));

    // A hint that already matches the pair resolves to its own registration
    // without consulting the pair table.
    let hint = ElementType::new("rect", ns::SVG, "rect");
    let resolved = asm.types.resolve_element(Some(&hint), ns::SVG, "rect");
    assert_eq!(resolved.map(|ty| ty.key.as_str()), Some("rect"));

    // A stale hint falls through to the pair table, where the later
    // registration won.
    let stale = ElementType::new("rect", "", "other");
    let resolved = asm.types.resolve_element(Some(&stale), ns::SVG, "rect");
    assert_eq!(resolved.map(|ty| ty.key.as_str()), Some("shadow"));
}

#[test]
fn later_type_registrations_overwrite_earlier_ones() -> Result<()> {
    let mut asm = Assembler::new();
    asm.register_element_type(ElementType::new("old", "", "widget"));
    asm.register_element_type(ElementType::new("new", "", "widget"));
    let node = asm.doc_mut().create_element_ns("", "widget")?;
    assert_eq!(asm.wrap(node)?.type_key(), Some("new"));
    Ok(())
}

#[test]
fn attr_defaults_inherit_along_the_parent_chain() -> Result<()> {
    let mut asm = Assembler::new();
    asm.register_attr_type(AttrType::new("role", "", "role").with_default("group"));
    asm.register_attr_type(AttrType::new("tab-role", "", "role").with_parent("role"));

    let element = asm.element(Init::Undefined)?;
    // Absent attribute: the inherited default applies.
    assert_eq!(
        asm.get_attr(element.node(), "tab-role")?.as_deref(),
        Some("group")
    );

    // Present but empty is distinguishable from absent.
    asm.doc_mut().set_attr(element.node(), "role", "")?;
    assert_eq!(asm.get_attr(element.node(), "tab-role")?.as_deref(), Some(""));

    asm.doc_mut().set_attr(element.node(), "role", "tab")?;
    assert_eq!(asm.get_attr(element.node(), "tab-role")?.as_deref(), Some("tab"));
    Ok(())
}

#[test]
fn attr_of_uses_inherited_default_value() -> Result<()> {
    let mut asm = Assembler::new();
    asm.register_attr_type(AttrType::new("role", "", "role").with_default("group"));
    asm.register_attr_type(AttrType::new("tree-role", "", "role").with_parent("role"));

    let attr = asm.attr_of("tree-role", Init::Undefined)?;
    assert_eq!(asm.doc().attr_data(attr.node()).unwrap().value, "group");

    let explicit = asm.attr_of("tree-role", "tree")?;
    assert_eq!(asm.doc().attr_data(explicit.node()).unwrap().value, "tree");
    Ok(())
}

#[test]
fn find_returns_wrappers_for_selector_matches() -> Result<()> {
    let mut asm = Assembler::new();
    let root = asm.element(Init::map([
        ("qualifiedName", Init::from("list")),
        (
            "children",
            Init::List(vec![
                Init::map([
                    ("qualifiedName", Init::from("item")),
                    ("id", Init::from("first")),
                ]),
                Init::map([
                    ("qualifiedName", Init::from("item")),
                    ("classList", Init::from("selected")),
                ]),
            ]),
        ),
    ]))?;

    let all = asm.find_all(root.node(), Subject::Selector("item"), None)?;
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|w| w.category() == Category::Element));

    let selected = asm
        .find(root.node(), Subject::Selector("item"), Some(Filter::Selector(".selected")))?
        .expect("one selected item");
    assert_eq!(
        asm.doc().attr_value(selected.node(), "", "class").as_deref(),
        Some("selected")
    );

    let first = asm
        .find(root.node(), Subject::Selector("#first"), None)?
        .expect("the #first item");
    assert_eq!(
        asm.doc().attr_value(first.node(), "", "id").as_deref(),
        Some("first")
    );
    Ok(())
}

#[test]
fn find_dispatches_registered_element_types() -> Result<()> {
    let mut asm = Assembler::new();
    asm.register_element_type(ElementType::new("tab", "", "tab").with_selector("tab[active]"));
    let root = asm.element(Init::List(vec![
        Init::map([("qualifiedName", Init::from("tab"))]),
        Init::map([
            ("qualifiedName", Init::from("tab")),
            ("attributes", Init::map([("active", Init::from(""))])),
        ]),
    ]))?;

    let active = asm.find_all(root.node(), Subject::ElementType("tab"), None)?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].type_key(), Some("tab"));
    Ok(())
}

#[test]
fn find_dispatches_attr_types_via_attribute_lookup() -> Result<()> {
    let mut asm = Assembler::new();
    asm.register_attr_type(AttrType::new("role", "", "role"));
    let root = asm.element(Init::List(vec![
        Init::map([
            ("qualifiedName", Init::from("a")),
            ("attributes", Init::map([("role", Init::from("tab"))])),
        ]),
        Init::map([("qualifiedName", Init::from("b"))]),
        Init::map([
            ("qualifiedName", Init::from("c")),
            ("attributes", Init::map([("role", Init::from("tabpanel"))])),
        ]),
    ]))?;

    let roles = asm.find_all(root.node(), Subject::AttrType("role"), None)?;
    assert_eq!(roles.len(), 2);
    assert!(roles.iter().all(|w| w.category() == Category::Attr));
    assert_eq!(roles[0].type_key(), Some("role"));

    // A string filter narrows by the owner element.
    let on_c = asm.find_all(
        root.node(),
        Subject::AttrType("role"),
        Some(Filter::Selector("c")),
    )?;
    assert_eq!(on_c.len(), 1);
    assert_eq!(
        asm.doc().attr_data(on_c[0].node()).unwrap().value,
        "tabpanel"
    );
    Ok(())
}

#[test]
fn predicate_filters_run_over_wrappers() -> Result<()> {
    let mut asm = Assembler::new();
    let root = asm.element(Init::List(vec![
        Init::map([
            ("qualifiedName", Init::from("item")),
            ("children", Init::from("keep")),
        ]),
        Init::map([
            ("qualifiedName", Init::from("item")),
            ("children", Init::from("drop")),
        ]),
    ]))?;

    let kept = asm.find_all(
        root.node(),
        Subject::Selector("item"),
        Some(Filter::Predicate(&|doc, wrapper| {
            doc.text_content(wrapper.node()) == "keep"
        })),
    )?;
    assert_eq!(kept.len(), 1);
    Ok(())
}

#[test]
fn selector_combinators_and_pseudo_classes_match() -> Result<()> {
    let mut asm = Assembler::new();
    let root = asm.element(Init::map([
        ("qualifiedName", Init::from("root")),
        (
            "children",
            Init::List(vec![
                Init::map([
                    ("qualifiedName", Init::from("section")),
                    (
                        "children",
                        Init::List(vec![
                            Init::map([("qualifiedName", Init::from("item"))]),
                            Init::map([("qualifiedName", Init::from("item"))]),
                            Init::map([("qualifiedName", Init::from("note"))]),
                        ]),
                    ),
                ]),
                Init::map([("qualifiedName", Init::from("item"))]),
            ]),
        ),
    ]))?;
    let node = root.node();

    let count = |asm: &mut Assembler, selector: &str| -> Result<usize> {
        Ok(asm.find_all(node, Subject::Selector(selector), None)?.len())
    };

    assert_eq!(count(&mut asm, "item")?, 3);
    assert_eq!(count(&mut asm, "section item")?, 2);
    assert_eq!(count(&mut asm, "root > item")?, 1);
    assert_eq!(count(&mut asm, "item + item")?, 1);
    assert_eq!(count(&mut asm, "item ~ note")?, 1);
    assert_eq!(count(&mut asm, "item:first-child")?, 1);
    assert_eq!(count(&mut asm, "section :nth-child(2)")?, 1);
    assert_eq!(count(&mut asm, "section > :not(item)")?, 1);
    assert_eq!(count(&mut asm, "item:empty")?, 3);
    assert_eq!(count(&mut asm, "item, note")?, 4);

    assert!(matches!(
        asm.find_all(node, Subject::Selector("item >"), None),
        Err(Error::UnsupportedSelector(_))
    ));
    Ok(())
}

#[test]
fn attr_selectors_match_values_and_tokens() -> Result<()> {
    let mut asm = Assembler::new();
    let root = asm.element(Init::List(vec![Init::map([
        ("qualifiedName", Init::from("item")),
        (
            "attributes",
            Init::map([
                ("role", Init::from("tab panel")),
                ("lang", Init::from("en-US")),
            ]),
        ),
    ])]))?;
    let node = root.node();

    for selector in [
        "[role]",
        "[role~=panel]",
        "[role^=tab]",
        "[role$=panel]",
        "[role*='ab pa']",
        "[lang|=en]",
        "[role='tab panel']",
    ] {
        let found = asm.find_all(node, Subject::Selector(selector), None)?;
        assert_eq!(found.len(), 1, "selector {selector} should match");
    }

    assert!(
        asm.find_all(node, Subject::Selector("[role=tab]"), None)?
            .is_empty()
    );
    Ok(())
}

#[test]
fn attr_wrappers_share_identity_with_element_storage() -> Result<()> {
    let mut asm = Assembler::new();
    asm.register_attr_type(AttrType::new("role", "", "role"));
    let element = asm.element(Init::map([(
        "attributes",
        Init::map([("role", Init::from("tab"))]),
    )]))?;
    let parent = asm.element(Init::list([element.clone()]))?;

    let found = asm
        .find(parent.node(), Subject::AttrType("role"), None)?
        .expect("role attr");
    let stored = asm.doc().attr_node(element.node(), "", "role").unwrap();
    assert_eq!(found.node(), stored);

    // The canonical wrapper is reused on the next lookup.
    let again = asm.find(parent.node(), Subject::AttrType("role"), None)?.unwrap();
    assert_eq!(again, found);
    Ok(())
}

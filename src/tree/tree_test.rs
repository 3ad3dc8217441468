use super::*;

fn catalog() -> ContainerCatalog {
    ContainerCatalog::new(["VerticalLayout", "HorizontalLayout", "Group"])
}

fn add(tree: &mut DesignTree, node_type: &str, parent: Option<&str>, label: &str) -> String {
    tree.add_node(node_type, parent, NodeAttrs::labelled(label))
        .unwrap()
        .id()
        .to_string()
}

fn child_labels(tree: &DesignTree, id: Option<&str>) -> Vec<String> {
    let children = match id {
        Some(id) => tree.find_by_id(id).unwrap().elements(),
        None => tree.roots(),
    };
    children.iter().map(|n| n.label.clone()).collect()
}

#[test]
fn test_add_and_remove_subtree() {
    let mut tree = DesignTree::new(catalog());
    let layout = add(&mut tree, "VerticalLayout", None, "Root");
    let child = add(&mut tree, "Control", Some(&layout), "Name");

    assert_eq!(tree.len(), 2);
    assert_eq!(tree.find_parent(&child).unwrap().id(), layout);
    assert!(tree.find_parent(&layout).is_none());

    let removed = tree.remove(&layout).unwrap();
    assert_eq!(removed.subtree_len(), 2);
    assert!(tree.find_by_id(&child).is_none());
    assert!(tree.is_empty());
}

#[test]
fn test_remove_unknown_is_noop() {
    let mut tree = DesignTree::new(catalog());
    add(&mut tree, "Control", None, "Name");
    assert!(tree.remove("nope").is_none());
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_add_rejects_bad_parents() {
    let mut tree = DesignTree::new(catalog());
    let leaf = add(&mut tree, "Control", None, "Name");

    assert_eq!(
        tree.add_node("Control", Some(&leaf), NodeAttrs::default()).unwrap_err(),
        TreeError::NotAContainer {
            id: leaf.clone(),
            node_type: "Control".to_string(),
        }
    );
    assert_eq!(
        tree.add_node("Control", Some("ghost"), NodeAttrs::default()).unwrap_err(),
        TreeError::ParentNotFound("ghost".to_string())
    );
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_data_ids_stay_unique() {
    let mut tree = DesignTree::new(catalog());
    let first = tree
        .add_node("Control", None, NodeAttrs::labelled("A").with_data_id("email"))
        .unwrap()
        .id()
        .to_string();
    let second = add(&mut tree, "Control", None, "B");

    assert_eq!(
        tree.add_node("Control", None, NodeAttrs::labelled("C").with_data_id("email"))
            .unwrap_err(),
        TreeError::DuplicateDataId("email".to_string())
    );

    let patch = NodePatch {
        data_id: Some(Some("email".to_string())),
        ..Default::default()
    };
    assert!(matches!(
        tree.update_node(&second, patch.clone()),
        Err(TreeError::DuplicateDataId(_))
    ));
    // re-applying a node's own data-id is fine
    assert!(tree.update_node(&first, patch).is_ok());
}

#[test]
fn test_update_node_applies_only_given_fields() {
    let mut tree = DesignTree::new(catalog());
    let id = tree
        .add_node("Control", None, NodeAttrs::labelled("Name").with_css("wide"))
        .unwrap()
        .id()
        .to_string();

    let node = tree
        .update_node(
            &id,
            NodePatch {
                label: Some("Full name".to_string()),
                required: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(node.label, "Full name");
    assert_eq!(node.css, "wide");
    assert!(node.required);

    let node = tree
        .update_node(
            &id,
            NodePatch {
                data_id: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(node.data_id.is_none());

    assert_eq!(
        tree.update_node("ghost", NodePatch::default()).unwrap_err(),
        TreeError::NodeNotFound("ghost".to_string())
    );
}

#[test]
fn test_reorder_keeps_identity() {
    let mut tree = DesignTree::new(catalog());
    let group = add(&mut tree, "Group", None, "Group");
    let a = add(&mut tree, "Control", Some(&group), "a");
    let b = add(&mut tree, "Control", Some(&group), "b");
    let c = add(&mut tree, "Control", Some(&group), "c");

    assert_eq!(tree.reorder(Some(&group), &[c.as_str(), a.as_str(), b.as_str()]).unwrap(), 0);
    assert_eq!(child_labels(&tree, Some(&group)), vec!["c", "a", "b"]);
    assert_eq!(tree.find_by_id(&a).unwrap().label, "a");
}

#[test]
fn test_reorder_drops_unknown_and_keeps_omitted() {
    let mut tree = DesignTree::new(catalog());
    let a = add(&mut tree, "Control", None, "a");
    let b = add(&mut tree, "Control", None, "b");
    let c = add(&mut tree, "Control", None, "c");

    let omitted = tree
        .reorder(None, &[c.clone(), "stranger".to_string(), c.clone(), a])
        .unwrap();
    assert_eq!(omitted, 1);
    assert_eq!(child_labels(&tree, None), vec!["c", "a", "b"]);
    assert!(tree.find_by_id(&b).is_some());

    assert!(matches!(
        tree.reorder(Some(&b), &[c]),
        Err(TreeError::NotAContainer { .. })
    ));
}

#[test]
fn test_move_node() {
    let mut tree = DesignTree::new(catalog());
    let outer = add(&mut tree, "VerticalLayout", None, "outer");
    let inner = add(&mut tree, "HorizontalLayout", Some(&outer), "inner");
    let x = add(&mut tree, "Control", Some(&outer), "x");
    let y = add(&mut tree, "Control", None, "y");

    tree.move_node(&y, Some(&inner), 10).unwrap();
    assert_eq!(tree.find_parent(&y).unwrap().id(), inner);

    tree.move_node(&x, Some(&inner), 0).unwrap();
    assert_eq!(child_labels(&tree, Some(&inner)), vec!["x", "y"]);

    tree.move_node(&inner, None, 0).unwrap();
    assert_eq!(child_labels(&tree, None), vec!["inner", "outer"]);
    assert_eq!(tree.len(), 4);
}

#[test]
fn test_move_node_refuses_cycles_and_leaves() {
    let mut tree = DesignTree::new(catalog());
    let outer = add(&mut tree, "VerticalLayout", None, "outer");
    let inner = add(&mut tree, "Group", Some(&outer), "inner");
    add(&mut tree, "Control", Some(&inner), "leaf");
    let solo = add(&mut tree, "Control", None, "solo");

    assert!(matches!(
        tree.move_node(&outer, Some(&inner), 0),
        Err(TreeError::CycleDetected { .. })
    ));
    assert!(matches!(
        tree.move_node(&outer, Some(&outer), 0),
        Err(TreeError::CycleDetected { .. })
    ));
    assert!(matches!(
        tree.move_node(&inner, Some(&solo), 0),
        Err(TreeError::NotAContainer { .. })
    ));
    assert_eq!(
        tree.move_node("ghost", None, 0).unwrap_err(),
        TreeError::NodeNotFound("ghost".to_string())
    );
    // nothing moved
    assert_eq!(tree.find_parent(&inner).unwrap().id(), outer);
    assert_eq!(tree.len(), 4);
}

#[test]
fn test_selection_cleared_with_removed_subtree() {
    let mut tree = DesignTree::new(catalog());
    let group = add(&mut tree, "Group", None, "group");
    let child = add(&mut tree, "Control", Some(&group), "child");
    let other = add(&mut tree, "Control", None, "other");

    tree.select(&other).unwrap();
    tree.remove(&group);
    assert_eq!(tree.selected().unwrap().id(), other);

    let group = add(&mut tree, "Group", None, "group");
    let child_again = add(&mut tree, "Control", Some(&group), "child");
    tree.select(&child_again).unwrap();
    tree.remove(&group);
    assert!(tree.selected().is_none());

    assert!(tree.select(&child).is_err());
}

#[test]
fn test_iter_is_pre_order() {
    let mut tree = DesignTree::new(catalog());
    let a = add(&mut tree, "Group", None, "a");
    add(&mut tree, "Control", Some(&a), "a1");
    let a2 = add(&mut tree, "Group", Some(&a), "a2");
    add(&mut tree, "Control", Some(&a2), "a2x");
    add(&mut tree, "Control", None, "b");

    let labels: Vec<&str> = tree.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "a1", "a2", "a2x", "b"]);
}

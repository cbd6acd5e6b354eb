mod common;

use common::{p, Fixture};
use inspector_adapter::{compute_disabled_patch, AdapterEvent, AdapterMessage};
use inspector_dom::{Node, NodeKind, PatchOperation};

fn set_disabled(fixture: &mut Fixture, path: &str, disabled: bool) {
    fixture
        .adapter
        .handle_message(AdapterMessage::SetNodeDisabled {
            path: p(path),
            disabled,
        })
        .unwrap();
}

/// A row of three leaves. The second leaf holds an editor that is already
/// disabled on its own and has children of its own.
fn row_with_disabled_subtree() -> Node {
    let editor = || Node::new(NodeKind::PropertyEditor);
    Node::new(NodeKind::Row)
        .with_child(editor().with_child(Node::new(NodeKind::Label)))
        .with_child(
            editor().with_child(
                editor()
                    .with_attr("Disabled", true)
                    .with_child(editor().with_attr("Tint", "grey"))
                    .with_child(Node::new(NodeKind::Label).with_attr("AncestorDisabled", true)),
            ),
        )
        .with_child(Node::new(NodeKind::Label))
}

#[test]
fn test_row_cascade_prunes_disabled_subtree() {
    let mut doc = row_with_disabled_subtree();
    let pruned_before = doc.node_at(&p("/1/0")).unwrap().children.clone();

    let patch = compute_disabled_patch(&doc, &p("/"), true);
    assert_eq!(
        patch.operations(),
        &[
            PatchOperation::add(p("/0/Disabled"), true),
            PatchOperation::add(p("/1/Disabled"), true),
            PatchOperation::add(p("/2/Disabled"), true),
            PatchOperation::add(p("/0/0/AncestorDisabled"), true),
            PatchOperation::add(p("/1/0/AncestorDisabled"), true),
        ]
    );

    patch.apply(&mut doc).unwrap();
    assert!(!doc.has_truthy("Disabled"));
    assert_eq!(doc.node_at(&p("/1/0")).unwrap().children, pruned_before);

    let enable = compute_disabled_patch(&doc, &p("/"), false);
    enable.apply(&mut doc).unwrap();
    assert_eq!(doc, row_with_disabled_subtree());
}

#[test]
fn test_disable_row_in_document() {
    let mut fixture = Fixture::new();
    let original = fixture.adapter.contents().clone();

    set_disabled(&mut fixture, "/2", true);
    let doc = fixture.adapter.contents();
    assert!(!doc.node_at(&p("/2")).unwrap().has_truthy("Disabled"));
    assert!(doc.node_at(&p("/2/0")).unwrap().has_truthy("Disabled"));
    assert!(doc.node_at(&p("/2/4")).unwrap().has_truthy("Disabled"));
    assert!(!doc.node_at(&p("/2/5")).unwrap().has_truthy("AncestorDisabled"));
    assert!(doc.node_at(&p("/2/5/1")).unwrap().has_truthy("AncestorDisabled"));

    let events = fixture.take_events();
    assert!(matches!(events.as_slice(), [AdapterEvent::ContentsChanged(patch)] if !patch.is_empty()));

    set_disabled(&mut fixture, "/2", false);
    assert_eq!(fixture.adapter.contents(), &original);
}

#[test]
fn test_disable_is_idempotent() {
    let mut fixture = Fixture::new();

    set_disabled(&mut fixture, "/1/1", true);
    let events = fixture.take_events();
    let [AdapterEvent::ContentsChanged(patch)] = events.as_slice() else {
        panic!("expected one patch, got {events:?}");
    };
    assert_eq!(patch.operations(), &[PatchOperation::add(p("/1/1/Disabled"), true)]);

    set_disabled(&mut fixture, "/1/1", true);
    assert!(fixture.take_events().is_empty());

    set_disabled(&mut fixture, "/1/1", false);
    set_disabled(&mut fixture, "/1/1", false);
    let events = fixture.take_events();
    assert_eq!(events.len(), 1);
}

#[test]
fn test_value_edit_keeps_disabled_flag() {
    let mut fixture = Fixture::new();
    set_disabled(&mut fixture, "/1", true);
    fixture
        .adapter
        .handle_message(AdapterMessage::ValueChanged {
            origin: p("/1/1"),
            value: 3.into(),
            change_type: Default::default(),
        })
        .unwrap();

    let editor = fixture.adapter.contents().node_at(&p("/1/1")).unwrap();
    assert!(editor.has_truthy("Disabled"));
    assert_eq!(fixture.entity.borrow().health, 3);
}

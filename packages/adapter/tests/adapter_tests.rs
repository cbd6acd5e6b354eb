mod common;

use common::{entity, p, Fixture};
use inspector_adapter::{
    AdapterConfig, AdapterError, AdapterEvent, AdapterMessage, MessageOutcome, PropertyChangeInfo, ReflectionAdapter,
    ResetKind, ValueChangeType, WireMessage,
};
use inspector_dom::{Node, NodeKind, PatchOperation, Value};
use inspector_reflection::{reflect_struct, share, FieldAttributes, Opaque};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

fn value_changed(origin: &str, value: impl Into<Value>) -> AdapterMessage {
    AdapterMessage::ValueChanged {
        origin: p(origin),
        value: value.into(),
        change_type: ValueChangeType::FinishedEdit,
    }
}

#[test]
fn test_generation_is_deterministic() {
    let mut fixture = Fixture::new();
    let first = fixture.adapter.contents().clone();
    let generation = fixture.adapter.generation();

    fixture.adapter.generate_contents().unwrap();
    assert_eq!(fixture.adapter.contents(), &first);
    assert_eq!(fixture.adapter.generation(), generation + 1);
}

#[test]
fn test_top_level_layout() {
    let fixture = Fixture::new();
    let doc = fixture.adapter.contents();

    assert!(doc.is(NodeKind::Adapter));
    assert_eq!(doc.children.len(), 7);
    assert!(doc.children.iter().all(|row| row.is(NodeKind::Row)));

    let health = doc.node_at(&p("/1/1")).unwrap();
    assert_eq!(health.attribute("Type"), Some(&Value::from("SpinBox")));
    assert_eq!(health.attribute("Value"), Some(&Value::Int(10)));

    // The nested struct keeps its own row with field rows inside it.
    let transform = doc.node_at(&p("/5")).unwrap();
    assert_eq!(transform.children[0].attribute("Value"), Some(&Value::from("Transform")));
    assert!(transform.children[1].is(NodeKind::Row));
}

#[test]
fn test_value_change_patches_and_notifies() {
    let mut fixture = Fixture::new();
    let outcome = fixture.adapter.handle_message(value_changed("/1/1", 25)).unwrap();
    assert!(matches!(outcome, MessageOutcome::Handled));
    assert_eq!(fixture.entity.borrow().health, 25);

    let events = fixture.take_events();
    assert_eq!(events.len(), 2);
    let AdapterEvent::ContentsChanged(patch) = &events[0] else {
        panic!("expected a patch, got {:?}", events[0]);
    };
    assert_eq!(patch.operations(), &[PatchOperation::replace(p("/1/1/Value"), 25)]);
    assert_eq!(
        events[1],
        AdapterEvent::PropertyChanged(PropertyChangeInfo {
            path: p("/1/1"),
            value: Value::Int(25),
            change_type: ValueChangeType::FinishedEdit,
        })
    );
}

#[test]
fn test_patched_document_matches_rebuild() {
    let mut fixture = Fixture::new();
    fixture.adapter.handle_message(value_changed("/1/1", 42)).unwrap();
    fixture.adapter.handle_message(value_changed("/5/1/1", 3)).unwrap();
    fixture.adapter.handle_message(value_changed("/0/1", "barrel")).unwrap();
    let patched = fixture.adapter.contents().clone();

    fixture.adapter.generate_contents().unwrap();
    assert_eq!(fixture.adapter.contents(), &patched);
}

#[test]
fn test_value_is_stored_in_canonical_form() {
    let mut fixture = Fixture::new();
    fixture.adapter.handle_message(value_changed("/5/1/1", 3)).unwrap();

    assert_eq!(fixture.entity.borrow().transform.x, 3.0);
    assert_eq!(
        fixture.adapter.contents().attribute_at(&p("/5/1/1/Value")),
        Some(&Value::Double(3.0))
    );
}

#[test]
fn test_rejected_edit_echoes_previous_value() {
    let mut fixture = Fixture::new();
    let outcome = fixture.adapter.handle_message(value_changed("/1/1", "lots")).unwrap();
    assert!(matches!(outcome, MessageOutcome::Handled));
    assert_eq!(fixture.entity.borrow().health, 10);

    let events = fixture.take_events();
    assert!(matches!(&events[0], AdapterEvent::Diagnostic { path, .. } if *path == p("/1/1")));
    let AdapterEvent::ContentsChanged(patch) = &events[1] else {
        panic!("expected an echo patch");
    };
    assert_eq!(patch.operations(), &[PatchOperation::replace(p("/1/1/Value"), 10)]);
    assert!(!events
        .iter()
        .any(|event| matches!(event, AdapterEvent::PropertyChanged(_))));
}

#[test]
fn test_key_editor_is_read_only() {
    let mut fixture = Fixture::new();
    fixture.adapter.handle_message(value_changed("/4/5/1", "shield")).unwrap();

    assert!(fixture.entity.borrow().stats.contains_key("armor"));
    let events = fixture.take_events();
    assert!(matches!(events[0], AdapterEvent::Diagnostic { .. }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, AdapterEvent::PropertyChanged(_))));
}

#[test]
fn test_lookup_miss_is_ignored() {
    let mut fixture = Fixture::new();
    let before = fixture.adapter.contents().clone();

    for origin in ["/1", "/1/0", "/40/1", "/1/1/Value"] {
        let outcome = fixture.adapter.handle_message(value_changed(origin, 1)).unwrap();
        assert!(matches!(outcome, MessageOutcome::Ignored), "{origin}");
    }
    assert_eq!(fixture.adapter.contents(), &before);
    assert!(fixture.take_events().is_empty());
}

#[test]
fn test_in_progress_edit_is_forwarded() {
    let mut fixture = Fixture::new();
    fixture
        .adapter
        .handle_message(AdapterMessage::ValueChanged {
            origin: p("/1/1"),
            value: Value::Int(11),
            change_type: ValueChangeType::InProgressEdit,
        })
        .unwrap();

    let events = fixture.take_events();
    assert!(matches!(
        &events[1],
        AdapterEvent::PropertyChanged(info) if info.change_type == ValueChangeType::InProgressEdit
    ));
}

#[test]
fn test_soft_reset_sends_difference() {
    let mut fixture = Fixture::new();
    fixture.entity.borrow_mut().health = 50;

    fixture.adapter.reset_document(ResetKind::Soft).unwrap();
    let events = fixture.take_events();
    assert_eq!(events.len(), 1);
    let AdapterEvent::ContentsChanged(patch) = &events[0] else {
        panic!("expected a patch");
    };
    assert_eq!(patch.operations(), &[PatchOperation::replace(p("/1/1/Value"), 50)]);

    // Nothing changed since: no event at all.
    fixture.adapter.reset_document(ResetKind::Soft).unwrap();
    assert!(fixture.take_events().is_empty());
}

#[test]
fn test_request_tree_update_is_hard_reset() {
    let mut fixture = Fixture::new();
    let generation = fixture.adapter.generation();
    fixture
        .adapter
        .handle_message(AdapterMessage::RequestTreeUpdate { origin: p("/") })
        .unwrap();

    assert_eq!(fixture.adapter.generation(), generation + 1);
    assert_eq!(fixture.take_events(), vec![AdapterEvent::DocumentReset(ResetKind::Hard)]);
}

#[test]
fn test_set_value_rebuilds_for_new_graph() {
    let mut fixture = Fixture::new();
    let mut other = entity();
    other.tags.clear();

    fixture.adapter.set_value(share(other)).unwrap();
    let tags = fixture.adapter.contents().node_at(&p("/2")).unwrap();
    assert_eq!(tags.children[1].attribute("Value"), Some(&Value::from("0 elements")));
    assert_eq!(fixture.take_events(), vec![AdapterEvent::DocumentReset(ResetKind::Hard)]);

    // The old graph is no longer written to.
    fixture.adapter.handle_message(value_changed("/1/1", 99)).unwrap();
    assert_eq!(fixture.entity.borrow().health, 10);
}

#[test]
fn test_adapter_without_value() {
    let mut adapter = ReflectionAdapter::new(AdapterConfig::lenient());
    assert_eq!(adapter.contents(), &Node::new(NodeKind::Adapter));
    let outcome = adapter.handle_message(value_changed("/0/1", 1)).unwrap();
    assert!(matches!(outcome, MessageOutcome::Ignored));
}

#[test]
fn test_wire_messages() -> anyhow::Result<()> {
    let mut fixture = Fixture::new();
    let wire: WireMessage = serde_json::from_str(
        r#"{ "name": "ValueChanged", "origin": "/1/1", "args": { "value": 7 } }"#,
    )?;
    fixture.adapter.handle_wire_message(wire)?;
    assert_eq!(fixture.entity.borrow().health, 7);

    let unknown: WireMessage = serde_json::from_str(r#"{ "name": "Explode", "origin": "/1" }"#)?;
    assert!(matches!(
        fixture.adapter.handle_wire_message(unknown),
        Err(AdapterError::UnknownMessage(_))
    ));
    Ok(())
}

#[test]
fn test_disconnected_listener_hears_nothing() {
    let mut fixture = Fixture::new();
    let heard = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&heard);
    let id = fixture.adapter.connect(move |_| *counter.borrow_mut() += 1);

    fixture.adapter.handle_message(value_changed("/1/1", 1)).unwrap();
    assert!(fixture.adapter.disconnect(id));
    fixture.adapter.handle_message(value_changed("/1/1", 2)).unwrap();

    assert_eq!(*heard.borrow(), 2);
}

#[test]
fn test_contract_violation_is_returned_when_lenient() {
    let mut fixture = Fixture::new();
    let result = fixture.adapter.handle_message(AdapterMessage::SetNodeDisabled {
        path: p("/30/2"),
        disabled: true,
    });
    assert!(matches!(result, Err(AdapterError::ContractViolation(_))));
    assert!(fixture.take_events().is_empty());
}

#[test]
#[should_panic(expected = "contract violation")]
fn test_contract_violation_panics_when_strict() {
    let mut fixture = Fixture::with_config(AdapterConfig {
        strict_contracts: true,
        ..AdapterConfig::lenient()
    });
    let _ = fixture.adapter.handle_message(AdapterMessage::SetNodeDisabled {
        path: p("/30/2"),
        disabled: true,
    });
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Gradient {
    stops: Vec<u8>,
}

struct Material {
    gradient: Opaque<Gradient>,
}

reflect_struct! {
    Material {
        gradient => FieldAttributes::new().label("Gradient"),
    }
}

#[test]
fn test_opaque_edit_refreshes_hash() -> anyhow::Result<()> {
    let material = share(Material {
        gradient: Opaque(Gradient { stops: vec![1] }),
    });
    let mut adapter = ReflectionAdapter::with_instance(material, AdapterConfig::lenient())?;
    let events = common::record(&mut adapter);

    let hash_of = |gradient: &Gradient| Value::from(crc32fast::hash(&serde_json::to_vec(gradient).unwrap()));
    assert_eq!(
        adapter.contents().attribute_at(&p("/0/1/ValueHashed")),
        Some(&hash_of(&Gradient { stops: vec![1] }))
    );

    let edited = serde_json::json!({ "stops": [4, 5] });
    adapter.handle_message(value_changed("/0/1", Value::from(edited)))?;

    let expected = hash_of(&Gradient { stops: vec![4, 5] });
    assert_eq!(adapter.contents().attribute_at(&p("/0/1/ValueHashed")), Some(&expected));
    assert!(matches!(&events.borrow()[0], AdapterEvent::ContentsChanged(patch) if patch.len() == 2));

    let patched = adapter.contents().clone();
    adapter.generate_contents()?;
    assert_eq!(adapter.contents(), &patched);
    Ok(())
}

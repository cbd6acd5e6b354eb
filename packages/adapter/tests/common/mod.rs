#![allow(dead_code)]

use inspector_adapter::{AdapterConfig, AdapterEvent, ReflectionAdapter};
use inspector_dom::Path;
use inspector_reflection::{reflect_struct, CappedVec, FieldAttributes, SharedObject};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
}

reflect_struct! {
    Transform {
        x => FieldAttributes::new().label("X"),
        y => FieldAttributes::new().label("Y"),
    }
}

#[derive(Debug)]
pub struct Entity {
    pub name: String,
    pub health: i32,
    pub tags: Vec<String>,
    pub slots: CappedVec<u8>,
    pub stats: BTreeMap<String, i32>,
    pub transform: Transform,
    pub anchors: [i32; 3],
}

reflect_struct! {
    Entity {
        name => FieldAttributes::new().label("Name"),
        health => FieldAttributes::new().label("Health").handler("SpinBox"),
        tags => FieldAttributes::new().label("Tags"),
        slots => FieldAttributes::new().label("Slots"),
        stats => FieldAttributes::new().label("Stats"),
        transform => FieldAttributes::new().label("Transform"),
        anchors => FieldAttributes::new().label("Anchors"),
    }
}

/// Document layout of [`entity`]:
///
/// - `/0` name, `/1` health (editor at `/N/1`)
/// - `/2` tags: add `/2/2`, clear `/2/3`, editor `/2/4`, elements `/2/5..`
///   with move up `/2/N/2`, move down `/2/N/3`, remove `/2/N/4`
/// - `/3` slots (full): add `/3/2`
/// - `/4` stats: add `/4/2`, element `/4/5` with key editor `/4/5/1`
/// - `/5` transform: label `/5/0`, rows `/5/1` and `/5/2`
/// - `/6` anchors (fixed size): editor `/6/2`, elements `/6/3..`
pub fn entity() -> Entity {
    Entity {
        name: "crate".into(),
        health: 10,
        tags: vec!["a".into(), "b".into(), "c".into()],
        slots: CappedVec::from_vec(vec![1, 2], 2),
        stats: BTreeMap::from([("armor".to_string(), 3)]),
        transform: Transform { x: 1.0, y: 2.0 },
        anchors: [7, 8, 9],
    }
}

pub struct Fixture {
    pub entity: Rc<RefCell<Entity>>,
    pub adapter: ReflectionAdapter,
    pub events: Rc<RefCell<Vec<AdapterEvent>>>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(AdapterConfig::lenient())
    }

    pub fn with_config(config: AdapterConfig) -> Self {
        let entity = Rc::new(RefCell::new(entity()));
        let shared: SharedObject = entity.clone();
        let mut adapter = ReflectionAdapter::with_instance(shared, config).unwrap();
        let events = record(&mut adapter);
        Self {
            entity,
            adapter,
            events,
        }
    }

    pub fn take_events(&self) -> Vec<AdapterEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

pub fn record(adapter: &mut ReflectionAdapter) -> Rc<RefCell<Vec<AdapterEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    adapter.connect(move |event| sink.borrow_mut().push(event.clone()));
    events
}

pub fn p(text: &str) -> Path {
    text.parse().unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("inspector_adapter=debug")
        .try_init();
}

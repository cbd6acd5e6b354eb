pub mod inspect;
pub mod replay;

pub use inspect::{inspect, InspectArgs};
pub use replay::{replay, ReplayArgs};

use crate::scene;
use anyhow::Result;
use inspector_adapter::{AdapterConfig, ReflectionAdapter};
use inspector_dom::{Node, Value};
use inspector_reflection::share;
use std::path::Path;

/// Opens an adapter over the sample scene with the config found in `config_dir`.
pub fn open_scene(config_dir: &Path) -> Result<ReflectionAdapter> {
    let config = AdapterConfig::load(config_dir)?;
    tracing::debug!(?config, dir = %config_dir.display(), "loaded config");
    Ok(ReflectionAdapter::with_instance(share(scene::sample()), config)?)
}

pub fn document_json(document: &Node) -> serde_json::Value {
    serde_json::Value::from(Value::Node(document.clone()))
}

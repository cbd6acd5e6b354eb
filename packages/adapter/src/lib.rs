//! # Inspector Adapter
//!
//! Projects a reflected object graph into a property [`Document`] and routes
//! edits from a view back into the graph.
//!
//! A [`ReflectionAdapter`] walks its object graph to build the document and two
//! path indices alongside it: one holding the change callback of every property
//! editor, one holding the container bindings of every container and element
//! row. Incoming [`AdapterMessage`]s are resolved through those indices.
//!
//! - Value edits write through the callback and patch the cached document.
//! - Container buttons mutate the container and rebuild the document.
//! - Disabled toggles compute a minimal patch over the cached document.
//!
//! Changes reach observers as [`AdapterEvent`]s.
//!
//! ## Example
//!
//! ```
//! use inspector_adapter::{AdapterConfig, AdapterMessage, ReflectionAdapter, ValueChangeType};
//! use inspector_reflection::{reflect_struct, share, FieldAttributes};
//!
//! #[derive(Default)]
//! struct Light {
//!     intensity: f32,
//! }
//!
//! reflect_struct! {
//!     Light {
//!         intensity => FieldAttributes::new().label("Intensity"),
//!     }
//! }
//!
//! let light = share(Light { intensity: 1.0 });
//! let mut adapter = ReflectionAdapter::with_instance(light, AdapterConfig::default()).unwrap();
//!
//! adapter
//!     .handle_message(AdapterMessage::ValueChanged {
//!         origin: "/0/1".parse().unwrap(),
//!         value: 2.5.into(),
//!         change_type: ValueChangeType::FinishedEdit,
//!     })
//!     .unwrap();
//! ```

pub mod adapter;
pub mod builder;
pub mod config;
pub mod containers;
pub mod disabled;
pub mod errors;
pub mod events;
pub mod messages;
pub mod nodes;
pub mod path_index;
pub mod walker;

pub use adapter::ReflectionAdapter;
pub use builder::AdapterBuilder;
pub use config::{AdapterConfig, DEFAULT_CONFIG_NAME};
pub use containers::{BoundContainer, ContainerElement, ContainerEntry, ContainerOutcome};
pub use disabled::compute_disabled_patch;
pub use errors::{AdapterError, AdapterResult, BuilderError};
pub use events::{AdapterEvent, Listener, ListenerId, PropertyChangeInfo, ResetKind};
pub use messages::{AdapterMessage, KeyQuery, MessageOutcome, ValueChangeType, WireMessage};
pub use nodes::{attrs, element_count_text, Alignment, ContainerAction};
pub use path_index::{PathIndex, PrefixMatch, TraversalOrder};
pub use walker::{CallbackResult, ChangeCallback};

pub use inspector_dom::Document;

//! The reflection adapter: owns the document for one object graph and routes
//! view messages back into it.

use crate::builder::AdapterBuilder;
use crate::config::AdapterConfig;
use crate::containers::{ContainerEntry, ContainerOutcome};
use crate::disabled::compute_disabled_patch;
use crate::errors::{AdapterError, AdapterResult};
use crate::events::{AdapterEvent, Listener, ListenerId, Listeners, PropertyChangeInfo, ResetKind};
use crate::messages::{AdapterMessage, KeyQuery, MessageOutcome, ValueChangeType, WireMessage};
use crate::nodes::{attrs, ContainerAction};
use crate::path_index::{PathIndex, PrefixMatch, TraversalOrder};
use crate::walker::{walk, CallbackResult, ChangeCallback};
use inspector_dom::{diff, Node, NodeKind, Patch, PatchOperation, Path, Value};
use inspector_reflection::{ContainerHandle, Reflect, SharedObject};
use std::cell::RefMut;
use std::ops::ControlFlow;
use tracing::{debug, error, info, instrument, warn};

pub struct ReflectionAdapter {
    instance: Option<SharedObject>,
    config: AdapterConfig,
    contents: Node,
    builder: AdapterBuilder,
    callbacks: PathIndex<ChangeCallback>,
    containers: PathIndex<ContainerEntry>,
    generation: u64,
    listeners: Listeners,
}

impl std::fmt::Debug for ReflectionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReflectionAdapter")
            .field("generation", &self.generation)
            .field("has_instance", &self.instance.is_some())
            .field("callbacks", &self.callbacks.len())
            .field("containers", &self.containers.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

enum Binding {
    Container,
    Element,
}

impl ReflectionAdapter {
    /// An adapter with no object graph. Its document is an empty root.
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            instance: None,
            config,
            contents: Node::new(NodeKind::Adapter),
            builder: AdapterBuilder::new(),
            callbacks: PathIndex::new(),
            containers: PathIndex::new(),
            generation: 0,
            listeners: Listeners::default(),
        }
    }

    pub fn with_instance(instance: SharedObject, config: AdapterConfig) -> AdapterResult<Self> {
        let mut adapter = Self::new(config);
        adapter.instance = Some(instance);
        adapter.generate_contents()?;
        Ok(adapter)
    }

    /// Points the adapter at a different object graph.
    pub fn set_value(&mut self, instance: SharedObject) -> AdapterResult<()> {
        self.release_pending()?;
        self.instance = Some(instance);
        self.reset_document(ResetKind::Hard)
    }

    pub fn instance(&self) -> Option<&SharedObject> {
        self.instance.as_ref()
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn contents(&self) -> &Node {
        &self.contents
    }

    /// Incremented on every rebuild. Bindings from an older generation are
    /// never honoured.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn connect(&mut self, listener: impl FnMut(&AdapterEvent) + 'static) -> ListenerId {
        let listener: Listener = Box::new(listener);
        self.listeners.connect(listener)
    }

    pub fn disconnect(&mut self, id: ListenerId) -> bool {
        self.listeners.disconnect(id)
    }

    /// Rebuilds the document and both indices from the object graph.
    #[instrument(skip(self), fields(generation = self.generation + 1))]
    pub fn generate_contents(&mut self) -> AdapterResult<&Node> {
        self.release_pending()?;
        self.generation += 1;
        self.callbacks.clear();
        self.containers.clear();

        let Some(instance) = self.instance.clone() else {
            self.contents = Node::new(NodeKind::Adapter);
            return Ok(&self.contents);
        };
        let root = match instance.try_borrow() {
            Ok(root) => root,
            Err(_) => return Err(self.violation("object graph is already mutably borrowed".to_string())),
        };

        let document = walk(
            &*root,
            &mut self.builder,
            &mut self.callbacks,
            &mut self.containers,
            &self.config,
            self.generation,
        )?;
        self.contents = document;

        debug!(
            rows = self.contents.children.len(),
            callbacks = self.callbacks.len(),
            containers = self.containers.len(),
            "generated contents"
        );
        Ok(&self.contents)
    }

    /// Rebuilds the document. A hard reset tells listeners to re-read it; a
    /// soft reset sends them the difference as a patch.
    pub fn reset_document(&mut self, kind: ResetKind) -> AdapterResult<()> {
        info!(?kind, "resetting document");
        match kind {
            ResetKind::Hard => {
                self.generate_contents()?;
                self.emit(AdapterEvent::DocumentReset(ResetKind::Hard));
            }
            ResetKind::Soft => {
                let previous = self.contents.clone();
                self.generate_contents()?;
                let patch = diff(&previous, &self.contents);
                if !patch.is_empty() {
                    self.emit(AdapterEvent::ContentsChanged(patch));
                }
            }
        }
        Ok(())
    }

    pub fn handle_wire_message(&mut self, message: WireMessage) -> AdapterResult<MessageOutcome> {
        let message = AdapterMessage::try_from(message)?;
        self.handle_message(message)
    }

    #[instrument(skip(self, message), fields(message = message.name(), origin = %message.origin()))]
    pub fn handle_message(&mut self, message: AdapterMessage) -> AdapterResult<MessageOutcome> {
        if self.config.log_messages {
            debug!(?message, "routing message");
        }
        match message {
            AdapterMessage::ValueChanged {
                origin,
                value,
                change_type,
            } => self.value_changed(&origin, &value, change_type),
            AdapterMessage::ContainerAction { origin, action, index } => self.container_action(&origin, action, index),
            AdapterMessage::AddContainerKey { origin, key_adapter } => self.add_container_key(&origin, &key_adapter),
            AdapterMessage::RejectContainerKey { origin } => self.reject_container_key(&origin),
            AdapterMessage::SetNodeDisabled { path, disabled } => self.set_disabled(&path, disabled),
            AdapterMessage::RequestTreeUpdate { .. } => {
                self.reset_document(ResetKind::Hard)?;
                Ok(MessageOutcome::Handled)
            }
        }
    }

    fn value_changed(&mut self, origin: &Path, value: &Value, change_type: ValueChangeType) -> AdapterResult<MessageOutcome> {
        let Some(callback) = self.callbacks.get(origin, PrefixMatch::ExactPath).cloned() else {
            debug!(%origin, "no editor bound at path");
            return Ok(MessageOutcome::Ignored);
        };
        if callback.generation() != self.generation {
            debug!(%origin, generation = callback.generation(), "stale editor binding");
            return Ok(MessageOutcome::Ignored);
        }

        let instance = self.require_instance()?;
        let result = {
            let mut root = borrow_mut(&instance).map_err(|message| self.violation(message))?;
            callback.invoke(&mut *root, value)
        };

        let (stored, hash, accepted, structural) = match result {
            CallbackResult::Stored { value, hash, structural } => (value, hash, true, structural),
            CallbackResult::Rejected { previous, error } => {
                warn!(%origin, %error, "edit rejected, restoring previous value");
                self.emit(AdapterEvent::Diagnostic {
                    path: origin.clone(),
                    message: error,
                });
                // Unreachable values keep what the document last showed.
                let previous = previous
                    .or_else(|| self.contents.attribute_at(&(origin / attrs::VALUE)).cloned())
                    .unwrap_or(Value::Null);
                (previous, None, false, false)
            }
        };

        let mut patch = Patch::new();
        patch.push(PatchOperation::replace(origin / attrs::VALUE, stored.clone()));
        if let Some(hash) = hash.filter(|_| self.config.hash_opaque_values) {
            patch.push(PatchOperation::add(origin / attrs::VALUE_HASHED, hash));
        }
        patch.apply(&mut self.contents)?;
        self.emit(AdapterEvent::ContentsChanged(patch));

        if accepted {
            self.emit(AdapterEvent::PropertyChanged(PropertyChangeInfo {
                path: origin.clone(),
                value: stored,
                change_type,
            }));
        }
        if structural {
            debug!(%origin, "container replaced, rebuilding rows");
            self.reset_document(ResetKind::Hard)?;
        }
        Ok(MessageOutcome::Handled)
    }

    fn container_action(
        &mut self,
        origin: &Path,
        action: ContainerAction,
        index: Option<usize>,
    ) -> AdapterResult<MessageOutcome> {
        if origin.is_empty() {
            debug!(action = action.name(), "container action without origin ignored");
            return Ok(MessageOutcome::Ignored);
        }
        let binding = if action.targets_container() {
            Binding::Container
        } else {
            Binding::Element
        };
        let Some(entry_path) = self.bound_entry(origin, binding) else {
            return Ok(MessageOutcome::Ignored);
        };
        debug!(%origin, entry = %entry_path, action = action.name(), "container action");

        let instance = self.require_instance()?;
        let mut root = borrow_mut(&instance).map_err(|message| self.violation(message))?;
        let Some(entry) = self.containers.get_mut(&entry_path, PrefixMatch::ExactPath) else {
            return Ok(MessageOutcome::Ignored);
        };

        let (handle, outcome) = match (action, entry.container.as_mut(), entry.element.as_ref()) {
            (ContainerAction::AddElement, Some(bound), _) => (bound.handle().clone(), bound.add_element(&mut *root)),
            (ContainerAction::Clear, Some(bound), _) => (bound.handle().clone(), bound.clear(&mut *root)),
            (ContainerAction::RemoveElement, _, Some(element)) => (element.parent().clone(), element.remove(&mut *root)),
            (ContainerAction::MoveUp | ContainerAction::MoveDown, _, Some(element)) => {
                let handle = element.parent().clone();
                let outcome = match index {
                    Some(index) => element.move_element(&mut *root, index, action == ContainerAction::MoveDown),
                    None => ContainerOutcome::ContractViolation(format!("{} requires an index", action.name())),
                };
                (handle, outcome)
            }
            _ => return Ok(MessageOutcome::Ignored),
        };
        drop(root);

        self.finish_container_change(origin, &handle, outcome)
    }

    fn add_container_key(&mut self, origin: &Path, key_adapter: &ReflectionAdapter) -> AdapterResult<MessageOutcome> {
        let Some(entry_path) = self.bound_entry(origin, Binding::Container) else {
            return Ok(MessageOutcome::Ignored);
        };
        let Some(key) = key_adapter.instance().cloned() else {
            return Err(self.violation("key adapter has no value".to_string()));
        };

        let instance = self.require_instance()?;
        let mut root = borrow_mut(&instance).map_err(|message| self.violation(message))?;
        let key = match key.try_borrow() {
            Ok(key) => key,
            Err(_) => return Err(self.violation("key object is mutably borrowed".to_string())),
        };
        let Some(bound) = self
            .containers
            .get_mut(&entry_path, PrefixMatch::ExactPath)
            .and_then(|entry| entry.container.as_mut())
        else {
            return Ok(MessageOutcome::Ignored);
        };
        let handle = bound.handle().clone();
        let outcome = bound.complete_add(&mut *root, &*key);
        drop(key);
        drop(root);

        self.finish_container_change(origin, &handle, outcome)
    }

    fn reject_container_key(&mut self, origin: &Path) -> AdapterResult<MessageOutcome> {
        let Some(entry_path) = self.bound_entry(origin, Binding::Container) else {
            return Ok(MessageOutcome::Ignored);
        };
        let instance = self.require_instance()?;
        let mut root = borrow_mut(&instance).map_err(|message| self.violation(message))?;
        let Some(bound) = self
            .containers
            .get_mut(&entry_path, PrefixMatch::ExactPath)
            .and_then(|entry| entry.container.as_mut())
        else {
            return Ok(MessageOutcome::Ignored);
        };
        let handle = bound.handle().clone();
        let outcome = bound.reject_add(&mut *root);
        drop(root);

        self.finish_container_change(origin, &handle, outcome)
    }

    fn finish_container_change(
        &mut self,
        origin: &Path,
        handle: &ContainerHandle,
        outcome: ContainerOutcome,
    ) -> AdapterResult<MessageOutcome> {
        match outcome {
            ContainerOutcome::Unchanged => Ok(MessageOutcome::Handled),
            ContainerOutcome::Changed => {
                if let Some(path) = self.container_editor_path(origin, handle) {
                    self.emit(AdapterEvent::ChangeNotify { path });
                }
                self.reset_document(ResetKind::Hard)?;
                Ok(MessageOutcome::Handled)
            }
            ContainerOutcome::KeyRequested(key) => {
                let adapter = ReflectionAdapter::with_instance(key, self.config.clone())?;
                Ok(MessageOutcome::KeyRequested(KeyQuery {
                    container_path: origin.clone(),
                    adapter,
                }))
            }
            ContainerOutcome::Failed(error) => {
                warn!(%origin, %error, "container rejected the change");
                self.emit(AdapterEvent::Diagnostic {
                    path: origin.clone(),
                    message: error.to_string(),
                });
                Ok(MessageOutcome::Handled)
            }
            ContainerOutcome::ContractViolation(message) => Err(self.violation(message)),
        }
    }

    fn set_disabled(&mut self, path: &Path, disabled: bool) -> AdapterResult<MessageOutcome> {
        let Some(target) = self.contents.node_at(path) else {
            return Err(self.violation(format!("no document node at {path}")));
        };
        let patch = compute_disabled_patch(target, path, disabled);
        if patch.is_empty() {
            debug!(%path, disabled, "disabled state already current");
            return Ok(MessageOutcome::Handled);
        }
        patch.apply(&mut self.contents)?;
        self.emit(AdapterEvent::ContentsChanged(patch));
        Ok(MessageOutcome::Handled)
    }

    /// The nearest entry above `origin` holding the wanted binding from the
    /// current generation.
    fn bound_entry(&self, origin: &Path, binding: Binding) -> Option<Path> {
        let entry_path = self.containers.matched_path(origin, PrefixMatch::ParentsOnly)?;
        let entry = self.containers.get(&entry_path, PrefixMatch::ExactPath)?;
        let generation = match binding {
            Binding::Container => entry.container.as_ref().map(|bound| bound.generation()),
            Binding::Element => entry.element.as_ref().map(|element| element.generation()),
        };
        match generation {
            Some(generation) if generation == self.generation => Some(entry_path),
            Some(generation) => {
                debug!(%origin, generation, "stale container binding");
                None
            }
            None => {
                debug!(%origin, entry = %entry_path, "no matching container binding");
                None
            }
        }
    }

    /// Path of the property editor that displays `handle`.
    fn container_editor_path(&self, origin: &Path, handle: &ContainerHandle) -> Option<Path> {
        let mut row = None;
        self.containers
            .visit_prefixes(origin, TraversalOrder::MostSpecificFirst, true, |path, entry| {
                match &entry.container {
                    Some(bound) if bound.handle().same_container(handle) => {
                        row = Some(path.clone());
                        ControlFlow::Break(())
                    }
                    _ => ControlFlow::Continue(()),
                }
            });
        let row = row?;
        let node = self.contents.node_at(&row)?;
        let editors = || {
            node.children
                .iter()
                .enumerate()
                .filter(|(_, child)| child.is(NodeKind::PropertyEditor))
        };
        editors()
            .find(|(_, child)| child.attribute(attrs::SERIALIZED_PATH).is_some())
            .or_else(|| editors().last())
            .map(|(index, _)| &row / index)
    }

    /// Frees every reservation still waiting for a key.
    fn release_pending(&mut self) -> AdapterResult<()> {
        let pending = self
            .containers
            .values_mut()
            .into_iter()
            .any(|entry| entry.container.as_ref().is_some_and(|bound| bound.is_awaiting_key()));
        if !pending {
            return Ok(());
        }
        let Some(instance) = self.instance.clone() else {
            return Ok(());
        };
        let mut root = borrow_mut(&instance).map_err(|message| self.violation(message))?;
        for entry in self.containers.values_mut() {
            if let Some(bound) = entry.container.as_mut() {
                bound.abandon(&mut *root);
            }
        }
        Ok(())
    }

    fn require_instance(&self) -> AdapterResult<SharedObject> {
        match &self.instance {
            Some(instance) => Ok(instance.clone()),
            None => Err(self.violation("adapter has no object graph".to_string())),
        }
    }

    fn emit(&mut self, event: AdapterEvent) {
        self.listeners.emit(&event);
    }

    /// Logs a contract violation and, under strict contracts, panics.
    fn violation(&self, message: String) -> AdapterError {
        error!(%message, "contract violation");
        if self.config.strict_contracts {
            panic!("contract violation: {message}");
        }
        AdapterError::ContractViolation(message)
    }
}

fn borrow_mut(instance: &SharedObject) -> Result<RefMut<'_, dyn Reflect>, String> {
    instance
        .try_borrow_mut()
        .map_err(|_| "object graph is already borrowed".to_string())
}

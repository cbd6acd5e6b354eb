//! # Container Bindings
//!
//! Index entries for container rows and their elements, and the mutations the
//! container buttons trigger.
//!
//! A [`BoundContainer`] is `Idle` except during an associative add: reserving
//! an element of a keyed container hands the default key to the caller and
//! parks the [`Reservation`] in `AwaitingKey` until the key is accepted or
//! rejected. The reservation is therefore owned by exactly one state and is
//! released by exactly one transition.
//!
//! Bindings hold addresses, never references. Each operation re-resolves the
//! container against the live graph it is handed.

use inspector_reflection::{
    resolve_mut, ContainerHandle, DataContainer, ElementId, Reflect, ReflectError, ReflectMut, Reservation,
    SharedObject,
};
use tracing::{debug, warn};

/// What is bound at one document row.
#[derive(Debug, Default)]
pub struct ContainerEntry {
    /// The container this row displays.
    pub container: Option<BoundContainer>,
    /// This row's element within its parent container.
    pub element: Option<ContainerElement>,
}

#[derive(Debug)]
enum BindingState {
    Idle,
    AwaitingKey(Reservation),
}

#[derive(Debug)]
pub enum ContainerOutcome {
    /// Nothing changed; no notification is due.
    Unchanged,
    /// The container changed and the document must be rebuilt.
    Changed,
    /// An associative add is waiting for this key object to be filled in.
    KeyRequested(SharedObject),
    /// The container refused the mutation and is unchanged.
    Failed(ReflectError),
    ContractViolation(String),
}

#[derive(Debug)]
pub struct BoundContainer {
    handle: ContainerHandle,
    generation: u64,
    state: BindingState,
}

impl BoundContainer {
    pub fn new(handle: ContainerHandle, generation: u64) -> Self {
        Self {
            handle,
            generation,
            state: BindingState::Idle,
        }
    }

    pub fn handle(&self) -> &ContainerHandle {
        &self.handle
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.state, BindingState::AwaitingKey(_))
    }

    pub fn clear(&mut self, root: &mut dyn Reflect) -> ContainerOutcome {
        let container = match resolve_container(root, &self.handle) {
            Ok(container) => container,
            Err(message) => return ContainerOutcome::ContractViolation(message),
        };
        match container.clear() {
            Ok(()) => ContainerOutcome::Changed,
            Err(error) => ContainerOutcome::Failed(error),
        }
    }

    /// First phase of an add. Keyed associative containers defer storage until
    /// [`complete_add`](Self::complete_add) or [`reject_add`](Self::reject_add).
    pub fn add_element(&mut self, root: &mut dyn Reflect) -> ContainerOutcome {
        if self.is_awaiting_key() {
            return ContainerOutcome::ContractViolation(format!(
                "{} already has an element awaiting its key",
                self.handle.instance
            ));
        }
        let container = match resolve_container(root, &self.handle) {
            Ok(container) => container,
            Err(message) => return ContainerOutcome::ContractViolation(message),
        };

        let descriptor = container.descriptor();
        if descriptor.fixed_size {
            return ContainerOutcome::ContractViolation(format!(
                "cannot add to fixed-size container {}",
                descriptor.type_name
            ));
        }
        if let Some(capacity) = descriptor.capacity {
            if container.len() >= capacity {
                debug!(container = descriptor.type_name, capacity, "container at capacity, add ignored");
                return ContainerOutcome::Unchanged;
            }
        }

        let reservation = container.reserve_element();
        if descriptor.is_associative() && descriptor.key_type.is_some() {
            if let Some(key) = reservation.key_object().cloned() {
                debug!(container = descriptor.type_name, "awaiting key for reserved element");
                self.state = BindingState::AwaitingKey(reservation);
                return ContainerOutcome::KeyRequested(key);
            }
        }

        match container.store_element(reservation) {
            Ok(()) => ContainerOutcome::Changed,
            Err(error) => ContainerOutcome::Failed(error),
        }
    }

    /// Binds `key` to the pending element and stores it.
    pub fn complete_add(&mut self, root: &mut dyn Reflect, key: &dyn Reflect) -> ContainerOutcome {
        let BindingState::AwaitingKey(mut reservation) = std::mem::replace(&mut self.state, BindingState::Idle)
        else {
            return ContainerOutcome::ContractViolation(format!(
                "no element of {} is awaiting a key",
                self.handle.instance
            ));
        };
        let container = match resolve_container(root, &self.handle) {
            Ok(container) => container,
            Err(message) => {
                reservation.release();
                return ContainerOutcome::ContractViolation(message);
            }
        };

        if let Err(error) = container.set_element_key(&mut reservation, key) {
            container.free_reserved_element(reservation);
            return ContainerOutcome::Failed(error);
        }
        match container.store_element(reservation) {
            Ok(()) => ContainerOutcome::Changed,
            Err(error) => ContainerOutcome::Failed(error),
        }
    }

    pub fn reject_add(&mut self, root: &mut dyn Reflect) -> ContainerOutcome {
        let BindingState::AwaitingKey(reservation) = std::mem::replace(&mut self.state, BindingState::Idle) else {
            return ContainerOutcome::ContractViolation(format!(
                "no element of {} is awaiting a key",
                self.handle.instance
            ));
        };
        free(root, &self.handle, reservation);
        ContainerOutcome::Unchanged
    }

    /// Frees a pending reservation before this binding is discarded.
    pub fn abandon(&mut self, root: &mut dyn Reflect) {
        if let BindingState::AwaitingKey(reservation) = std::mem::replace(&mut self.state, BindingState::Idle) {
            warn!(
                container = self.handle.descriptor.type_name,
                instance = %self.handle.instance,
                "document reset while awaiting a key, reserved element freed"
            );
            free(root, &self.handle, reservation);
        }
    }
}

/// One element's place in its parent container.
#[derive(Debug, Clone)]
pub struct ContainerElement {
    parent: ContainerHandle,
    element: ElementId,
    index: usize,
    generation: u64,
}

impl ContainerElement {
    pub fn new(parent: ContainerHandle, element: ElementId, index: usize, generation: u64) -> Self {
        Self {
            parent,
            element,
            index,
            generation,
        }
    }

    pub fn parent(&self) -> &ContainerHandle {
        &self.parent
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn remove(&self, root: &mut dyn Reflect) -> ContainerOutcome {
        let container = match resolve_container(root, &self.parent) {
            Ok(container) => container,
            Err(message) => return ContainerOutcome::ContractViolation(message),
        };
        match container.remove_element(self.element) {
            Ok(()) => ContainerOutcome::Changed,
            Err(error) => ContainerOutcome::Failed(error),
        }
    }

    /// Swaps the element at `index` with its next (`forward`) or previous
    /// neighbour.
    pub fn move_element(&self, root: &mut dyn Reflect, index: usize, forward: bool) -> ContainerOutcome {
        if !self.parent.descriptor.is_sequence() {
            return ContainerOutcome::ContractViolation(format!(
                "cannot reorder associative container {}",
                self.parent.descriptor.type_name
            ));
        }
        let container = match resolve_container(root, &self.parent) {
            Ok(container) => container,
            Err(message) => return ContainerOutcome::ContractViolation(message),
        };

        let len = container.len();
        let target = if forward { index.checked_add(1) } else { index.checked_sub(1) };
        let target = match target {
            Some(target) if index < len && target < len => target,
            _ => {
                return ContainerOutcome::ContractViolation(format!(
                    "cannot move element {index} {} in a container of {len}",
                    if forward { "down" } else { "up" }
                ))
            }
        };
        match container.swap_elements(index, target) {
            Ok(()) => ContainerOutcome::Changed,
            Err(error) => ContainerOutcome::Failed(error),
        }
    }
}

fn resolve_container<'a>(root: &'a mut dyn Reflect, handle: &ContainerHandle) -> Result<&'a mut dyn DataContainer, String> {
    let value = resolve_mut(root, &handle.instance)
        .ok_or_else(|| ReflectError::UnresolvedAddress(handle.instance.to_string()).to_string())?;
    let found = value.type_name();
    match value.reflect_mut() {
        ReflectMut::Container(container) if found == handle.descriptor.type_name => Ok(container),
        _ => Err(format!(
            "{} holds {found}, expected container {}",
            handle.instance, handle.descriptor.type_name
        )),
    }
}

fn free(root: &mut dyn Reflect, handle: &ContainerHandle, reservation: Reservation) {
    match resolve_container(root, handle) {
        Ok(container) => container.free_reserved_element(reservation),
        Err(message) => {
            warn!(%message, "container gone, releasing reservation directly");
            reservation.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_reflection::{CappedVec, InstanceAddress};
    use std::collections::BTreeMap;

    fn bind(container: &dyn DataContainer) -> BoundContainer {
        BoundContainer::new(
            ContainerHandle {
                descriptor: container.descriptor(),
                instance: InstanceAddress::root(),
            },
            1,
        )
    }

    fn element_of(container: &dyn DataContainer, index: usize) -> ContainerElement {
        let element = ElementId::at(container.element(index).unwrap(), index);
        ContainerElement::new(
            ContainerHandle {
                descriptor: container.descriptor(),
                instance: InstanceAddress::root(),
            },
            element,
            index,
            1,
        )
    }

    #[test]
    fn test_add_to_sequence_stores_immediately() {
        let mut items = vec![1, 2];
        let mut bound = bind(&items);
        assert!(matches!(bound.add_element(&mut items), ContainerOutcome::Changed));
        assert_eq!(items, vec![1, 2, 0]);
        assert!(!bound.is_awaiting_key());
    }

    #[test]
    fn test_add_at_capacity_is_unchanged() {
        let mut items = CappedVec::from_vec(vec![1u8, 2], 2);
        let mut bound = bind(&items);
        assert!(matches!(bound.add_element(&mut items), ContainerOutcome::Unchanged));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_add_to_fixed_size_is_violation() {
        let mut items = [1u8, 2, 3];
        let mut bound = bind(&items);
        assert!(matches!(
            bound.add_element(&mut items),
            ContainerOutcome::ContractViolation(_)
        ));
    }

    #[test]
    fn test_keyed_add_round_trip() {
        let mut map: BTreeMap<String, i32> = BTreeMap::new();
        let mut bound = bind(&map);

        let ContainerOutcome::KeyRequested(key) = bound.add_element(&mut map) else {
            panic!("expected a key request");
        };
        assert!(bound.is_awaiting_key());
        assert!(matches!(
            bound.add_element(&mut map),
            ContainerOutcome::ContractViolation(_)
        ));

        key.borrow_mut().apply_value(&"speed".into()).unwrap();
        let outcome = bound.complete_add(&mut map, &*key.borrow());
        assert!(matches!(outcome, ContainerOutcome::Changed));
        assert_eq!(map.get("speed"), Some(&0));
        assert!(!bound.is_awaiting_key());
    }

    #[test]
    fn test_key_request_debug_shows_key() {
        let mut map: BTreeMap<String, i32> = BTreeMap::new();
        let mut bound = bind(&map);
        let outcome = bound.add_element(&mut map);
        let text = format!("{outcome:?}");
        assert!(text.starts_with("KeyRequested("), "{text}");
        assert!(text.contains("String(\"\")"), "{text}");
        bound.reject_add(&mut map);
    }

    #[test]
    fn test_duplicate_key_fails_and_frees() {
        let mut map = BTreeMap::from([("speed".to_string(), 4)]);
        let mut bound = bind(&map);

        let ContainerOutcome::KeyRequested(key) = bound.add_element(&mut map) else {
            panic!("expected a key request");
        };
        key.borrow_mut().apply_value(&"speed".into()).unwrap();
        assert!(matches!(
            bound.complete_add(&mut map, &*key.borrow()),
            ContainerOutcome::Failed(ReflectError::DuplicateKey(_))
        ));
        assert_eq!(map.len(), 1);
        assert!(!bound.is_awaiting_key());
    }

    #[test]
    fn test_reject_without_pending_is_violation() {
        let mut map: BTreeMap<String, i32> = BTreeMap::new();
        let mut bound = bind(&map);
        assert!(matches!(bound.reject_add(&mut map), ContainerOutcome::ContractViolation(_)));

        bound.add_element(&mut map);
        assert!(matches!(bound.reject_add(&mut map), ContainerOutcome::Unchanged));
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_by_identity() {
        let mut items = vec![10, 20, 30];
        let second = element_of(&items, 1);
        assert!(matches!(second.remove(&mut items), ContainerOutcome::Changed));
        assert_eq!(items, vec![10, 30]);
    }

    #[test]
    fn test_move_boundaries() {
        let mut items = vec![1, 2, 3];
        let element = element_of(&items, 0);

        assert!(matches!(element.move_element(&mut items, 0, true), ContainerOutcome::Changed));
        assert_eq!(items, vec![2, 1, 3]);
        assert!(matches!(
            element.move_element(&mut items, 2, true),
            ContainerOutcome::ContractViolation(_)
        ));
        assert!(matches!(
            element.move_element(&mut items, 0, false),
            ContainerOutcome::ContractViolation(_)
        ));
    }

    #[test]
    fn test_move_in_map_is_violation() {
        let mut map = BTreeMap::from([(1u8, 1u8), (2, 2)]);
        let element = element_of(&map, 0);
        assert!(matches!(
            element.move_element(&mut map, 0, true),
            ContainerOutcome::ContractViolation(_)
        ));
    }

    #[test]
    fn test_clear_and_stale_address() {
        let mut items = vec![1, 2];
        let mut bound = bind(&items);
        assert!(matches!(bound.clear(&mut items), ContainerOutcome::Changed));
        assert!(items.is_empty());

        let mut other = "not a container".to_string();
        assert!(matches!(bound.clear(&mut other), ContainerOutcome::ContractViolation(_)));
    }
}

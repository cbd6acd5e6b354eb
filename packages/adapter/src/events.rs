//! Events raised by an adapter and the listener registry that delivers them.

use crate::messages::ValueChangeType;
use inspector_dom::{Patch, Path, Value};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResetKind {
    /// The document was rebuilt and must be re-read in full.
    Hard,
    /// The document was rebuilt and the difference was sent as a patch.
    Soft,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyChangeInfo {
    pub path: Path,
    pub value: Value,
    pub change_type: ValueChangeType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AdapterEvent {
    ContentsChanged(Patch),
    PropertyChanged(PropertyChangeInfo),
    DocumentReset(ResetKind),
    /// The editor at `path` displays a container whose contents changed.
    ChangeNotify { path: Path },
    /// A recovered failure the host may want to surface.
    Diagnostic { path: Path, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&AdapterEvent)>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub fn connect(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn disconnect(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: &AdapterEvent) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_connect_emit_disconnect() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::default();

        let sink = Rc::clone(&seen);
        let id = listeners.connect(Box::new(move |event| sink.borrow_mut().push(event.clone())));
        listeners.emit(&AdapterEvent::DocumentReset(ResetKind::Hard));

        assert!(listeners.disconnect(id));
        assert!(!listeners.disconnect(id));
        listeners.emit(&AdapterEvent::DocumentReset(ResetKind::Soft));

        assert_eq!(*seen.borrow(), vec![AdapterEvent::DocumentReset(ResetKind::Hard)]);
        assert_eq!(listeners.len(), 0);
    }
}

//! Modification propagation.
//!
//! Every entity in a document is registered on the document's change bus
//! under an [`EntityId`], together with the id of its parent. Raising a
//! modification on an entity runs the listeners registered on that entity,
//! then on its parent, and so on up to the document root.
//!
//! Entities never point at their parents directly. The bus stores parent
//! links as ids, and holds no references to the entities themselves, so
//! dropping a document drops the whole graph in one go.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Identity of an entity within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Raw numeric value, unique within one document.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle returned by `subscribe`, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The kind of entity a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Document,
    Atlas,
    Sprite,
    Animation,
    Track,
}

impl EntityKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Document => "document",
            EntityKind::Atlas => "atlas",
            EntityKind::Sprite => "sprite",
            EntityKind::Animation => "animation",
            EntityKind::Track => "track",
        }
    }
}

/// A modification notice, as seen by one listener along the bubbling path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modified {
    /// Entity whose state changed.
    pub origin: EntityId,
    /// Kind of the entity whose state changed.
    pub origin_kind: EntityKind,
    /// Entity the listener is registered on.
    pub at: EntityId,
    /// Kind of the entity the listener is registered on.
    pub at_kind: EntityKind,
}

type Listener = Rc<dyn Fn(&Modified)>;

struct NodeInfo {
    kind: EntityKind,
    parent: Option<EntityId>,
    listeners: Vec<(ListenerId, Listener)>,
}

#[derive(Default)]
struct BusState {
    next_entity: u64,
    next_listener: u64,
    nodes: HashMap<EntityId, NodeInfo>,
}

/// Routing table for modification notices within one document.
#[derive(Default)]
pub(crate) struct ChangeBus {
    state: RefCell<BusState>,
}

impl ChangeBus {
    fn register(&self, kind: EntityKind, parent: Option<EntityId>) -> EntityId {
        let mut state = self.state.borrow_mut();
        state.next_entity += 1;
        let id = EntityId(state.next_entity);
        state.nodes.insert(
            id,
            NodeInfo {
                kind,
                parent,
                listeners: Vec::new(),
            },
        );
        id
    }

    fn forget(&self, id: EntityId) {
        // Drop can run while a listener holds the borrow; the entry is then
        // left behind and never reached again.
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.nodes.remove(&id);
        }
    }

    fn parent_of(&self, id: EntityId) -> Option<EntityId> {
        self.state.borrow().nodes.get(&id).and_then(|n| n.parent)
    }

    fn subscribe(&self, id: EntityId, listener: Listener) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener += 1;
        let listener_id = ListenerId(state.next_listener);
        if let Some(node) = state.nodes.get_mut(&id) {
            node.listeners.push((listener_id, listener));
        }
        listener_id
    }

    fn unsubscribe(&self, id: EntityId, listener: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(node) = state.nodes.get_mut(&id) else {
            return false;
        };
        let before = node.listeners.len();
        node.listeners.retain(|(l, _)| *l != listener);
        node.listeners.len() != before
    }

    fn raise(&self, origin: EntityId) {
        // Collect the path first so listeners run without the bus borrowed.
        let path: Vec<(EntityId, EntityKind, Vec<Listener>)> = {
            let state = self.state.borrow();
            let mut path = Vec::new();
            let mut current = Some(origin);
            while let Some(id) = current {
                let Some(node) = state.nodes.get(&id) else {
                    break;
                };
                let listeners = node.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
                path.push((id, node.kind, listeners));
                current = node.parent;
            }
            path
        };

        let Some(&(_, origin_kind, _)) = path.first() else {
            return;
        };

        log::trace!(
            "modified {} {} ({} levels)",
            origin_kind.name(),
            origin,
            path.len()
        );

        for (at, at_kind, listeners) in path {
            let notice = Modified {
                origin,
                origin_kind,
                at,
                at_kind,
            };
            for listener in listeners {
                listener(&notice);
            }
        }
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.state.try_borrow().map(|s| s.nodes.len()).ok();
        f.debug_struct("ChangeBus").field("nodes", &nodes).finish()
    }
}

/// A non-owning handle to a registered entity, used by collections to
/// create children and to raise on behalf of their owner.
#[derive(Clone)]
pub(crate) struct Signal {
    id: EntityId,
    bus: Rc<ChangeBus>,
}

impl Signal {
    pub(crate) fn id(&self) -> EntityId {
        self.id
    }

    /// Register a new child entity under this one.
    pub(crate) fn spawn(&self, kind: EntityKind) -> Node {
        let id = self.bus.register(kind, Some(self.id));
        Node {
            signal: Signal {
                id,
                bus: Rc::clone(&self.bus),
            },
        }
    }

    /// Raise a modification here and on every ancestor.
    pub(crate) fn raise(&self) {
        self.bus.raise(self.id);
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal({})", self.id)
    }
}

/// An entity's registration on its document's bus.
///
/// Dropping the node removes the entity and its listeners from the bus.
pub struct Node {
    signal: Signal,
}

impl Node {
    /// Register a root entity on a fresh bus.
    pub(crate) fn root(kind: EntityKind) -> Self {
        let bus = Rc::new(ChangeBus::default());
        let id = bus.register(kind, None);
        Self {
            signal: Signal { id, bus },
        }
    }

    pub fn id(&self) -> EntityId {
        self.signal.id
    }

    /// Id of the parent entity, if this is not the root.
    pub fn parent(&self) -> Option<EntityId> {
        self.signal.bus.parent_of(self.signal.id)
    }

    /// Register a listener for modifications of this entity or any descendant.
    pub fn subscribe(&self, listener: impl Fn(&Modified) + 'static) -> ListenerId {
        self.signal.bus.subscribe(self.signal.id, Rc::new(listener))
    }

    /// Remove a listener. Returns false if it was not registered here.
    pub fn unsubscribe(&self, listener: ListenerId) -> bool {
        self.signal.bus.unsubscribe(self.signal.id, listener)
    }

    pub(crate) fn signal(&self) -> &Signal {
        &self.signal
    }

    pub(crate) fn spawn(&self, kind: EntityKind) -> Node {
        self.signal.spawn(kind)
    }

    pub(crate) fn raise(&self) {
        self.signal.raise();
    }

    /// Store `value` in `slot` and raise, unless the value is unchanged.
    pub(crate) fn assign<T: PartialEq>(&self, slot: &mut T, value: T) -> bool {
        if *slot == value {
            return false;
        }
        *slot = value;
        self.raise();
        true
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.signal.bus.forget(self.signal.id);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.signal.id)
    }
}

//! Collections that report their mutations.
//!
//! [`Children`] owns child entities and registers each one on the owner's
//! bus. [`Records`] holds plain values. Every mutating call on either raises
//! exactly one modification on the owner.

use crate::model::signal::{EntityId, EntityKind, ListenerId, Modified, Node, Signal};

/// An entity that lives inside a [`Children`] collection.
pub trait Entity: Sized {
    /// The on-disk record this entity is built from and flattened to.
    type Record;

    /// Kind used when registering the entity on the bus.
    const KIND: EntityKind;

    /// Build the entity around an already registered node.
    ///
    /// Must not raise: population during construction is not a modification.
    fn attach(node: Node, record: Self::Record) -> Self;

    /// Flatten back to the on-disk record, dropping edit-only state.
    fn to_record(&self) -> Self::Record;

    fn node(&self) -> &Node;

    fn entity_id(&self) -> EntityId {
        self.node().id()
    }

    fn parent_id(&self) -> Option<EntityId> {
        self.node().parent()
    }

    /// Listen for modifications of this entity and everything below it.
    fn subscribe(&self, listener: impl Fn(&Modified) + 'static) -> ListenerId {
        self.node().subscribe(listener)
    }

    fn unsubscribe(&self, listener: ListenerId) -> bool {
        self.node().unsubscribe(listener)
    }
}

/// Ordered child entities of one owner.
#[derive(Debug)]
pub struct Children<T> {
    owner: Signal,
    items: Vec<T>,
}

impl<T: Entity> Children<T> {
    /// Build a populated collection without raising.
    pub(crate) fn from_records(
        owner: Signal,
        records: impl IntoIterator<Item = T::Record>,
    ) -> Self {
        let items = records
            .into_iter()
            .map(|r| T::attach(owner.spawn(T::KIND), r))
            .collect();
        Self { owner, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Position of the entity with the given identity.
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.entity_id() == id)
    }

    pub fn find(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.entity_id() == id)
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.entity_id() == id)
    }

    /// Append a new child built from `record`.
    pub fn push(&mut self, record: T::Record) -> &mut T {
        let index = self.items.len();
        self.insert(index, record)
    }

    /// Insert a new child at `index` (clamped to the collection length).
    pub fn insert(&mut self, index: usize, record: T::Record) -> &mut T {
        let index = index.min(self.items.len());
        let item = T::attach(self.owner.spawn(T::KIND), record);
        self.items.insert(index, item);
        self.owner.raise();
        &mut self.items[index]
    }

    /// Remove the child with the given identity, returning its record.
    pub fn remove(&mut self, id: EntityId) -> Option<T::Record> {
        let index = self.position(id)?;
        let item = self.items.remove(index);
        let record = item.to_record();
        drop(item);
        self.owner.raise();
        Some(record)
    }

    /// Replace every child at once.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = T::Record>) {
        let owner = self.owner.clone();
        let items: Vec<T> = records
            .into_iter()
            .map(|r| T::attach(owner.spawn(T::KIND), r))
            .collect();
        self.items = items;
        self.owner.raise();
    }

    /// Remove every child. Raises even when already empty.
    pub fn clear(&mut self) {
        self.items.clear();
        self.owner.raise();
    }

    pub fn to_records(&self) -> Vec<T::Record> {
        self.items.iter().map(Entity::to_record).collect()
    }
}

impl<'a, T> IntoIterator for &'a Children<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Ordered plain values owned by an entity.
#[derive(Debug)]
pub struct Records<T> {
    owner: Signal,
    items: Vec<T>,
}

impl<T: Clone> Records<T> {
    pub(crate) fn from_vec(owner: Signal, items: Vec<T>) -> Self {
        Self { owner, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn push(&mut self, value: T) {
        self.items.push(value);
        self.owner.raise();
    }

    /// Insert at `index` (clamped to the collection length).
    pub fn insert(&mut self, index: usize, value: T) {
        let index = index.min(self.items.len());
        self.items.insert(index, value);
        self.owner.raise();
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let value = self.items.remove(index);
        self.owner.raise();
        Some(value)
    }

    /// Replace the value at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, value: T) -> Option<T> {
        let slot = self.items.get_mut(index)?;
        let old = std::mem::replace(slot, value);
        self.owner.raise();
        Some(old)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.owner.raise();
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<'a, T> IntoIterator for &'a Records<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

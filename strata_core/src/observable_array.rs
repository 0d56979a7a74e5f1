// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A list that notifies listeners as items are added and removed.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::property::{ObserverId, Property};

type ItemListener<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    items: RefCell<Vec<T>>,
    added: RefCell<Vec<(ObserverId, ItemListener<T>)>>,
    removed: RefCell<Vec<(ObserverId, ItemListener<T>)>>,
    next_id: Cell<u64>,
    length: Property<usize>,
}

/// An ordered collection with item-added and item-removed notifications.
///
/// Cloning produces another handle to the same list. Listeners run
/// synchronously after the list has been updated, so they observe the new
/// contents and length.
pub struct ObservableArray<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for ObservableArray<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.items.borrow().iter()).finish()
    }
}

impl<T: Clone + PartialEq + 'static> Default for ObservableArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + 'static> ObservableArray<T> {
    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                items: RefCell::new(Vec::new()),
                added: RefCell::new(Vec::new()),
                removed: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                length: Property::new(0),
            }),
        }
    }

    /// Appends `item` and notifies item-added listeners.
    pub fn add(&self, item: T) {
        self.inner.items.borrow_mut().push(item.clone());
        self.sync_length();
        self.notify(&self.inner.added, &item);
    }

    /// Appends every item in order, notifying once per item.
    pub fn add_all(&self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.add(item);
        }
    }

    /// Removes the first element equal to `item` and notifies item-removed
    /// listeners.
    ///
    /// Returns `false` if no element matched. Removing an absent item is a
    /// precondition violation and fails a debug assertion.
    pub fn remove(&self, item: &T) -> bool {
        let removed = {
            let mut items = self.inner.items.borrow_mut();
            let position = items.iter().position(|other| other == item);
            debug_assert!(position.is_some(), "item not found in ObservableArray");
            position.map(|index| items.remove(index))
        };
        match removed {
            Some(removed) => {
                self.sync_length();
                self.notify(&self.inner.removed, &removed);
                true
            }
            None => false,
        }
    }

    /// Removes each of `items`, in the given order.
    pub fn remove_all(&self, items: &[T]) {
        for item in items {
            self.remove(item);
        }
    }

    /// Removes every element front to back, notifying once per element.
    pub fn clear(&self) {
        loop {
            let front = {
                let mut items = self.inner.items.borrow_mut();
                if items.is_empty() {
                    break;
                }
                items.remove(0)
            };
            self.sync_length();
            self.notify(&self.inner.removed, &front);
        }
    }

    /// Returns a copy of the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Returns `true` if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// Calls `observer` with the element count now and whenever it changes.
    ///
    /// The count itself can only change through the array's own methods.
    pub fn link_length(&self, observer: impl Fn(&usize, Option<&usize>) + 'static) -> ObserverId {
        self.inner.length.link(observer)
    }

    /// Like [`link_length`](Self::link_length), without the initial call.
    pub fn lazy_link_length(
        &self,
        observer: impl Fn(&usize, Option<&usize>) + 'static,
    ) -> ObserverId {
        self.inner.length.lazy_link(observer)
    }

    /// Removes a length observer; returns `false` if it was not linked.
    pub fn unlink_length(&self, id: ObserverId) -> bool {
        self.inner.length.unlink(id)
    }

    /// Returns whether an element equal to `item` is present.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.inner.items.borrow().contains(item)
    }

    /// Index of the first element equal to `item`.
    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.inner.items.borrow().iter().position(|other| other == item)
    }

    /// Copies the elements into a new vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.borrow().clone()
    }

    /// First element matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.inner
            .items
            .borrow()
            .iter()
            .find(|item| predicate(item))
            .cloned()
    }

    /// Number of elements matching `predicate`.
    pub fn count_matching(&self, predicate: impl Fn(&T) -> bool) -> usize {
        self.inner
            .items
            .borrow()
            .iter()
            .filter(|item| predicate(item))
            .count()
    }

    /// Registers a listener called with each added item.
    pub fn add_item_added_listener(&self, listener: impl Fn(&T) + 'static) -> ObserverId {
        self.register(&self.inner.added, Rc::new(listener))
    }

    /// Registers a listener called with each removed item.
    pub fn add_item_removed_listener(&self, listener: impl Fn(&T) + 'static) -> ObserverId {
        self.register(&self.inner.removed, Rc::new(listener))
    }

    /// Removes an item-added listener; `false` if it was not registered.
    pub fn remove_item_added_listener(&self, id: ObserverId) -> bool {
        unregister(&self.inner.added, id)
    }

    /// Removes an item-removed listener; `false` if it was not registered.
    pub fn remove_item_removed_listener(&self, id: ObserverId) -> bool {
        unregister(&self.inner.removed, id)
    }

    fn register(
        &self,
        list: &RefCell<Vec<(ObserverId, ItemListener<T>)>>,
        listener: ItemListener<T>,
    ) -> ObserverId {
        let id = ObserverId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        list.borrow_mut().push((id, listener));
        id
    }

    fn sync_length(&self) {
        let len = self.len();
        self.inner.length.set(len);
    }

    fn notify(&self, list: &RefCell<Vec<(ObserverId, ItemListener<T>)>>, item: &T) {
        let snapshot: Vec<(ObserverId, ItemListener<T>)> = list
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();
        for (id, listener) in snapshot {
            if list.borrow().iter().any(|(other, _)| *other == id) {
                listener(item);
            }
        }
    }
}

fn unregister<T>(list: &RefCell<Vec<(ObserverId, ItemListener<T>)>>, id: ObserverId) -> bool {
    let mut list = list.borrow_mut();
    let position = list.iter().position(|(other, _)| *other == id);
    debug_assert!(position.is_some(), "listener {id:?} not registered");
    position.map(|index| list.remove(index)).is_some()
}

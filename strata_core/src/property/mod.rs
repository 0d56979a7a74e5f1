// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observable values.
//!
//! A [`Property`] is a single mutable value slot that notifies its observers
//! whenever the value changes. Everything reactive in a simulation is built
//! from properties:
//!
//! - [`Property`]: the value cell itself, with [`link`](Property::link),
//!   [`lazy_link`](Property::lazy_link), [`unlink`](Property::unlink), and
//!   [`reset`](Property::reset).
//! - [`PropertySet`]: a bundle of named properties with bulk reset.
//! - [`Multilink`] / [`DerivedProperty`]: observers and computed values that
//!   depend on several properties at once.
//!
//! # Notification order
//!
//! Observers run synchronously, in subscription order, before
//! [`set`](Property::set) returns. Setting a value equal to the current one is
//! a no-op and notifies nobody.
//!
//! # Re-entrancy
//!
//! Observers may link, unlink, or set properties (including the one that is
//! notifying them). Each notification pass iterates over a snapshot of the
//! observer list:
//!
//! - observers added during a pass are not called in that pass;
//! - observers removed during a pass are skipped if they have not run yet.
//!
//! A `set` issued from inside an observer is applied immediately and notified
//! depth-first, before the outer pass continues. Observers later in the outer
//! pass therefore receive the outer `(new, old)` pair; read
//! [`get`](Property::get) for the latest value. Nesting is bounded by
//! [`MAX_NOTIFICATION_DEPTH`]: a cycle of links that keeps producing new values
//! panics instead of recursing forever.

mod multilink;
mod set;

pub use multilink::{Dependencies, DerivedProperty, Multilink, lazy_multilink, multilink};
pub use set::{PropertySet, PropertySetBuilder, PropertySetError, PropertyValues};

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

/// Maximum number of nested notification passes on a single property.
pub const MAX_NOTIFICATION_DEPTH: u32 = 64;

/// Identifies a registered observer or listener so that it can be removed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

impl fmt::Debug for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverId({})", self.0)
    }
}

type Observer<T> = Rc<dyn Fn(&T, Option<&T>)>;

struct Inner<T> {
    value: RefCell<T>,
    initial: T,
    observers: RefCell<Vec<(ObserverId, Observer<T>)>>,
    next_id: Cell<u64>,
    depth: Cell<u32>,
}

/// A shared, observable value cell.
///
/// Cloning a `Property` produces another handle to the same cell.
pub struct Property<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.inner.value.borrow())
            .field("observers", &self.inner.observers.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    /// Creates a property holding `value`, which is also its reset value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                initial: value.clone(),
                value: RefCell::new(value),
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                depth: Cell::new(0),
            }),
        }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Calls `f` with a borrow of the current value.
    ///
    /// # Panics
    ///
    /// Panics if `f` sets this property.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Stores `value` and notifies observers with `(new, Some(old))`.
    ///
    /// Does nothing when `value` equals the current value.
    pub fn set(&self, value: T) {
        let old = {
            let mut slot = self.inner.value.borrow_mut();
            if *slot == value {
                return;
            }
            core::mem::replace(&mut *slot, value.clone())
        };
        self.notify(&value, Some(&old));
    }

    /// Restores the value this property was created with.
    pub fn reset(&self) {
        self.set(self.inner.initial.clone());
    }

    /// Returns the value this property was created with.
    #[must_use]
    pub fn initial_value(&self) -> &T {
        &self.inner.initial
    }

    /// Registers `observer` and immediately calls it with `(current, None)`.
    pub fn link(&self, observer: impl Fn(&T, Option<&T>) + 'static) -> ObserverId {
        let observer: Observer<T> = Rc::new(observer);
        let id = self.register(Rc::clone(&observer));
        let current = self.get();
        observer(&current, None);
        id
    }

    /// Registers `observer` without calling it.
    pub fn lazy_link(&self, observer: impl Fn(&T, Option<&T>) + 'static) -> ObserverId {
        self.register(Rc::new(observer))
    }

    /// Removes an observer.
    ///
    /// Returns `false` if `id` was not registered on this property. Unlinking
    /// an unknown observer is a precondition violation and fails a debug
    /// assertion.
    pub fn unlink(&self, id: ObserverId) -> bool {
        let mut observers = self.inner.observers.borrow_mut();
        let position = observers.iter().position(|(other, _)| *other == id);
        debug_assert!(position.is_some(), "unlink of unregistered {id:?}");
        match position {
            Some(index) => {
                observers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns whether `id` is currently registered on this property.
    #[must_use]
    pub fn is_linked(&self, id: ObserverId) -> bool {
        self.inner
            .observers
            .borrow()
            .iter()
            .any(|(other, _)| *other == id)
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Returns whether any observer is registered.
    #[must_use]
    pub fn has_observers(&self) -> bool {
        self.observer_count() > 0
    }

    /// Returns whether `self` and `other` are handles to the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Creates a read-only property computed from this one.
    pub fn derive<U: Clone + PartialEq + 'static>(
        &self,
        f: impl Fn(&T) -> U + 'static,
    ) -> DerivedProperty<U> {
        DerivedProperty::new((self,), move |(value,)| f(&value))
    }

    /// Creates a derived property that is `true` while this one equals `value`.
    pub fn value_equals(&self, value: T) -> DerivedProperty<bool> {
        self.derive(move |current| *current == value)
    }

    fn register(&self, observer: Observer<T>) -> ObserverId {
        let id = ObserverId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.observers.borrow_mut().push((id, observer));
        id
    }

    fn notify(&self, new: &T, old: Option<&T>) {
        let depth = self.inner.depth.get();
        assert!(
            depth < MAX_NOTIFICATION_DEPTH,
            "property notification nested more than {MAX_NOTIFICATION_DEPTH} levels; cyclic links did not settle"
        );
        self.inner.depth.set(depth + 1);

        let snapshot: Vec<(ObserverId, Observer<T>)> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(id, observer)| (*id, Rc::clone(observer)))
            .collect();
        for (id, observer) in snapshot {
            if self.is_linked(id) {
                observer(new, old);
            }
        }

        self.inner.depth.set(depth);
    }
}

impl Property<bool> {
    /// Flips the value.
    pub fn toggle(&self) {
        self.set(!self.get());
    }

    /// Creates a derived property holding the negation of this one.
    pub fn not(&self) -> DerivedProperty<bool> {
        self.derive(|value| !value)
    }

    /// Creates a derived property that is `true` while both are `true`.
    pub fn and(&self, other: &Self) -> DerivedProperty<bool> {
        DerivedProperty::new((self, other), |(a, b)| a && b)
    }

    /// Creates a derived property that is `true` while either is `true`.
    pub fn or(&self, other: &Self) -> DerivedProperty<bool> {
        DerivedProperty::new((self, other), |(a, b)| a || b)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<(T, Option<T>)>>>, impl Fn(&T, Option<&T>)) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |new: &T, old: Option<&T>| {
            sink.borrow_mut().push((new.clone(), old.cloned()));
        })
    }

    #[test]
    fn equal_set_does_not_notify() {
        let property = Property::new(1);
        let (log, observer) = recorder();
        property.lazy_link(observer);

        property.set(1);
        property.set(2);
        property.set(2);
        property.set(1);

        assert_eq!(*log.borrow(), vec![(2, Some(1)), (1, Some(2))]);
    }

    #[test]
    fn link_calls_immediately_with_current_value() {
        let property = Property::new("a");
        let (log, observer) = recorder();
        property.link(observer);
        assert_eq!(*log.borrow(), vec![("a", None)]);
    }

    #[test]
    fn observers_run_in_subscription_order() {
        let property = Property::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..3 {
            let order = Rc::clone(&order);
            property.lazy_link(move |_, _| order.borrow_mut().push(tag));
        }
        property.set(1);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn unlink_stops_notifications() {
        let property = Property::new(0);
        let (log, observer) = recorder();
        let id = property.lazy_link(observer);
        property.set(1);
        assert!(property.unlink(id));
        property.set(2);
        assert_eq!(log.borrow().len(), 1);
        assert!(!property.has_observers());
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn unlink_unknown_returns_false_in_release() {
        let property = Property::new(0);
        assert!(!property.unlink(ObserverId(99)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unlink of unregistered")]
    fn unlink_unknown_asserts_in_debug() {
        let property = Property::new(0);
        property.unlink(ObserverId(99));
    }

    #[test]
    fn reset_restores_initial_value_and_notifies() {
        let property = Property::new(10);
        let (log, observer) = recorder();
        property.lazy_link(observer);
        property.set(3);
        property.reset();
        property.reset();
        assert_eq!(property.get(), 10);
        assert_eq!(*log.borrow(), vec![(3, Some(10)), (10, Some(3))]);
    }

    #[test]
    fn observer_may_unlink_itself_during_notification() {
        let property = Property::new(0);
        let calls = Rc::new(Cell::new(0));
        let id_slot: Rc<Cell<Option<ObserverId>>> = Rc::new(Cell::new(None));

        let handle = property.clone();
        let slot = Rc::clone(&id_slot);
        let counter = Rc::clone(&calls);
        let id = property.lazy_link(move |_, _| {
            counter.set(counter.get() + 1);
            if let Some(id) = slot.get() {
                handle.unlink(id);
            }
        });
        id_slot.set(Some(id));

        let (log, observer) = recorder();
        property.lazy_link(observer);

        property.set(1);
        property.set(2);
        assert_eq!(calls.get(), 1);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn observer_removed_mid_pass_is_skipped() {
        let property = Property::new(0);
        let second_calls = Rc::new(Cell::new(0));
        let second_id: Rc<Cell<Option<ObserverId>>> = Rc::new(Cell::new(None));

        let handle = property.clone();
        let slot = Rc::clone(&second_id);
        property.lazy_link(move |_, _| {
            if let Some(id) = slot.take() {
                handle.unlink(id);
            }
        });
        let counter = Rc::clone(&second_calls);
        let id = property.lazy_link(move |_, _| counter.set(counter.get() + 1));
        second_id.set(Some(id));

        property.set(1);
        assert_eq!(second_calls.get(), 0);
    }

    #[test]
    fn observer_added_mid_pass_waits_for_next_set() {
        let property = Property::new(0);
        let late_calls = Rc::new(Cell::new(0));

        let handle = property.clone();
        let counter = Rc::clone(&late_calls);
        let added = Cell::new(false);
        property.lazy_link(move |_, _| {
            if !added.replace(true) {
                let counter = Rc::clone(&counter);
                handle.lazy_link(move |_, _| counter.set(counter.get() + 1));
            }
        });

        property.set(1);
        assert_eq!(late_calls.get(), 0);
        property.set(2);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn nested_set_is_notified_depth_first() {
        let celsius = Property::new(0.0_f64);
        let fahrenheit = Property::new(32.0_f64);

        let f = fahrenheit.clone();
        celsius.lazy_link(move |c, _| f.set(c * 9.0 / 5.0 + 32.0));
        let c = celsius.clone();
        fahrenheit.lazy_link(move |f, _| c.set((f - 32.0) * 5.0 / 9.0));

        celsius.set(100.0);
        assert_eq!(fahrenheit.get(), 212.0);
        fahrenheit.set(50.0);
        assert_eq!(celsius.get(), 10.0);
    }

    #[test]
    #[should_panic(expected = "cyclic links did not settle")]
    fn unsettled_cycle_panics() {
        let counter = Property::new(0_u32);
        let handle = counter.clone();
        counter.lazy_link(move |value, _| handle.set(value + 1));
        counter.set(1);
    }

    #[test]
    fn clones_share_one_cell() {
        let a = Property::new(1);
        let b = a.clone();
        b.set(7);
        assert_eq!(a.get(), 7);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Property::new(7)));
    }

    #[test]
    fn boolean_helpers() {
        let left = Property::new(false);
        let right = Property::new(true);
        let both = left.and(&right);
        let either = left.or(&right);
        let not_left = left.not();

        assert!(!both.get());
        assert!(either.get());
        assert!(not_left.get());

        left.toggle();
        assert!(both.get());
        assert!(!not_left.get());
    }

    #[test]
    fn value_equals_tracks_source() {
        let mode = Property::new("solution");
        let is_water = mode.value_equals("water");
        assert!(!is_water.get());
        mode.set("water");
        assert!(is_water.get());
    }
}

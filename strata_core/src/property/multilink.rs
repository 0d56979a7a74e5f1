// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observers and computed values over several properties.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use super::{ObserverId, Property};

type Detach = Box<dyn FnOnce()>;

/// A tuple of property references that can be observed together.
///
/// Implemented for `(&Property<A>,)` through `(&Property<A>, .., &Property<D>)`.
pub trait Dependencies {
    /// The tuple of current values, in the same order as the properties.
    type Values: 'static;

    /// Returns the current values of all properties.
    fn values(&self) -> Self::Values;

    /// Lazily links `on_change` to every property, returning one detach
    /// closure per link.
    #[doc(hidden)]
    fn attach(&self, on_change: &Rc<dyn Fn(Self::Values)>) -> Vec<Detach>;
}

macro_rules! impl_dependencies {
    ($($ty:ident : $idx:tt),+) => {
        impl<$($ty: Clone + PartialEq + 'static),+> Dependencies for ($(&Property<$ty>,)+) {
            type Values = ($($ty,)+);

            fn values(&self) -> Self::Values {
                ($(self.$idx.get(),)+)
            }

            fn attach(&self, on_change: &Rc<dyn Fn(Self::Values)>) -> Vec<Detach> {
                let handles = ($(self.$idx.clone(),)+);
                let read: Rc<dyn Fn() -> Self::Values> =
                    Rc::new(move || ($(handles.$idx.get(),)+));
                let mut detachers: Vec<Detach> = Vec::new();
                $(
                    {
                        let read = Rc::clone(&read);
                        let on_change = Rc::clone(on_change);
                        let id: ObserverId = self.$idx.lazy_link(move |_, _| on_change(read()));
                        let property = self.$idx.clone();
                        detachers.push(Box::new(move || {
                            property.unlink(id);
                        }));
                    }
                )+
                detachers
            }
        }
    };
}

impl_dependencies!(A: 0);
impl_dependencies!(A: 0, B: 1);
impl_dependencies!(A: 0, B: 1, C: 2);
impl_dependencies!(A: 0, B: 1, C: 2, D: 3);

/// A live subscription to several properties.
///
/// Dropping a `Multilink` does not detach it; call
/// [`dispose`](Self::dispose).
pub struct Multilink {
    detachers: RefCell<Vec<Detach>>,
}

impl fmt::Debug for Multilink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multilink")
            .field("links", &self.detachers.borrow().len())
            .finish()
    }
}

impl Multilink {
    pub(crate) fn from_detachers(detachers: Vec<Detach>) -> Self {
        Self {
            detachers: RefCell::new(detachers),
        }
    }

    /// Unlinks from every dependency. Calling this twice is a no-op.
    pub fn dispose(&self) {
        let detachers = core::mem::take(&mut *self.detachers.borrow_mut());
        for detach in detachers {
            detach();
        }
    }

    /// Returns whether [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.detachers.borrow().is_empty()
    }
}

/// Calls `f` with all current values now and whenever any dependency changes.
pub fn multilink<D: Dependencies>(deps: D, f: impl Fn(D::Values) + 'static) -> Multilink {
    let f: Rc<dyn Fn(D::Values)> = Rc::new(f);
    f(deps.values());
    Multilink::from_detachers(deps.attach(&f))
}

/// Like [`multilink`], without the immediate call.
pub fn lazy_multilink<D: Dependencies>(deps: D, f: impl Fn(D::Values) + 'static) -> Multilink {
    let f: Rc<dyn Fn(D::Values)> = Rc::new(f);
    Multilink::from_detachers(deps.attach(&f))
}

/// A read-only property whose value is computed from other properties.
pub struct DerivedProperty<T> {
    property: Property<T>,
    link: Multilink,
}

impl<T: fmt::Debug> fmt::Debug for DerivedProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedProperty")
            .field("property", &self.property)
            .field("link", &self.link)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> DerivedProperty<T> {
    /// Creates a property holding `f(values)`, recomputed when any
    /// dependency changes.
    pub fn new<D: Dependencies>(deps: D, f: impl Fn(D::Values) -> T + 'static) -> Self {
        let property = Property::new(f(deps.values()));
        let target = property.clone();
        let link = lazy_multilink(deps, move |values| target.set(f(values)));
        Self { property, link }
    }

    /// Returns the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.property.get()
    }

    /// See [`Property::link`].
    pub fn link(&self, observer: impl Fn(&T, Option<&T>) + 'static) -> ObserverId {
        self.property.link(observer)
    }

    /// See [`Property::lazy_link`].
    pub fn lazy_link(&self, observer: impl Fn(&T, Option<&T>) + 'static) -> ObserverId {
        self.property.lazy_link(observer)
    }

    /// See [`Property::unlink`].
    pub fn unlink(&self, id: ObserverId) -> bool {
        self.property.unlink(id)
    }

    /// Stops tracking the dependencies; the value freezes.
    pub fn dispose(&self) {
        self.link.dispose();
    }

    /// Returns a handle to the underlying property, for use as a dependency.
    ///
    /// Setting the returned handle directly is overwritten by the next
    /// dependency change.
    #[must_use]
    pub fn as_property(&self) -> &Property<T> {
        &self.property
    }
}

// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named bundles of properties.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, type_name};
use core::fmt;

use super::{Multilink, ObserverId, Property};

/// Errors reported by [`PropertySet`] lookups and construction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PropertySetError {
    /// Two entries were declared with the same name.
    #[error("duplicate property name `{0}`")]
    DuplicateName(String),
    /// No property with this name exists in the set.
    #[error("no property named `{0}`")]
    UnknownName(String),
    /// The property exists but holds a different type.
    #[error("property `{name}` does not hold a `{expected}`")]
    TypeMismatch {
        /// Name that was looked up.
        name: String,
        /// Type the caller asked for.
        expected: &'static str,
    },
}

trait ErasedProperty {
    fn reset(&self);
    fn as_any(&self) -> &dyn Any;
    fn lazy_link_erased(&self, on_change: Rc<dyn Fn()>) -> ObserverId;
    fn unlink(&self, id: ObserverId) -> bool;
    fn boxed_clone(&self) -> Box<dyn ErasedProperty>;
    fn value_type(&self) -> &'static str;
}

impl<T: Clone + PartialEq + 'static> ErasedProperty for Property<T> {
    fn reset(&self) {
        Self::reset(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn lazy_link_erased(&self, on_change: Rc<dyn Fn()>) -> ObserverId {
        self.lazy_link(move |_, _| on_change())
    }

    fn unlink(&self, id: ObserverId) -> bool {
        Self::unlink(self, id)
    }

    fn boxed_clone(&self) -> Box<dyn ErasedProperty> {
        Box::new(self.clone())
    }

    fn value_type(&self) -> &'static str {
        type_name::<T>()
    }
}

struct Entry {
    name: String,
    property: Box<dyn ErasedProperty>,
}

impl Clone for Entry {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            property: self.property.boxed_clone(),
        }
    }
}

/// An ordered set of named properties with fixed names.
///
/// The set holds handles; cloning it yields a set sharing the same cells.
#[derive(Clone)]
pub struct PropertySet {
    entries: Vec<Entry>,
}

impl fmt::Debug for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| (&entry.name, entry.property.value_type())),
            )
            .finish()
    }
}

/// Builder for [`PropertySet`]; entries keep declaration order.
#[derive(Default)]
pub struct PropertySetBuilder {
    entries: Vec<Entry>,
}

impl fmt::Debug for PropertySetBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySetBuilder")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl PropertySetBuilder {
    /// Declares a property named `name` with initial value `initial`.
    #[must_use]
    pub fn with<T: Clone + PartialEq + 'static>(mut self, name: &str, initial: T) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            property: Box::new(Property::new(initial)),
        });
        self
    }

    /// Adds an existing property handle under `name`.
    #[must_use]
    pub fn with_property<T: Clone + PartialEq + 'static>(
        mut self,
        name: &str,
        property: Property<T>,
    ) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            property: Box::new(property),
        });
        self
    }

    /// Finishes the set.
    ///
    /// # Errors
    ///
    /// Returns [`PropertySetError::DuplicateName`] if a name was declared twice.
    pub fn build(self) -> Result<PropertySet, PropertySetError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|other| other.name == entry.name) {
                return Err(PropertySetError::DuplicateName(entry.name.clone()));
            }
        }
        Ok(PropertySet {
            entries: self.entries,
        })
    }
}

impl PropertySet {
    /// Starts declaring a set.
    #[must_use]
    pub fn builder() -> PropertySetBuilder {
        PropertySetBuilder::default()
    }

    /// Returns the handle for `name`.
    ///
    /// # Errors
    ///
    /// Fails if the name is unknown or the property does not hold a `T`.
    pub fn property<T: Clone + PartialEq + 'static>(
        &self,
        name: &str,
    ) -> Result<Property<T>, PropertySetError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| PropertySetError::UnknownName(name.to_string()))?;
        entry
            .property
            .as_any()
            .downcast_ref::<Property<T>>()
            .cloned()
            .ok_or_else(|| PropertySetError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Returns the current value of `name`.
    ///
    /// # Errors
    ///
    /// See [`property`](Self::property).
    pub fn get<T: Clone + PartialEq + 'static>(&self, name: &str) -> Result<T, PropertySetError> {
        self.property::<T>(name).map(|property| property.get())
    }

    /// Sets `name` to `value`, with [`Property::set`] semantics.
    ///
    /// # Errors
    ///
    /// See [`property`](Self::property).
    pub fn set<T: Clone + PartialEq + 'static>(
        &self,
        name: &str,
        value: T,
    ) -> Result<(), PropertySetError> {
        self.property::<T>(name).map(|property| property.set(value))
    }

    /// Resets every property, in declaration order.
    pub fn reset(&self) {
        for entry in &self.entries {
            entry.property.reset();
        }
    }

    /// Property names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Returns whether a property named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Number of properties in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Calls `f` now and whenever any of `names` changes.
    ///
    /// # Errors
    ///
    /// Returns [`PropertySetError::UnknownName`] for the first name not in the
    /// set; nothing is linked in that case.
    pub fn multilink(
        &self,
        names: &[&str],
        f: impl Fn(&PropertyValues) + 'static,
    ) -> Result<Multilink, PropertySetError> {
        let watched = names
            .iter()
            .map(|name| {
                self.entries
                    .iter()
                    .find(|entry| entry.name == *name)
                    .cloned()
                    .ok_or_else(|| PropertySetError::UnknownName((*name).to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let values = PropertyValues { set: self.clone() };
        let on_change: Rc<dyn Fn()> = Rc::new(move || f(&values));
        on_change();

        let detachers = watched
            .into_iter()
            .map(|entry| {
                let id = entry.property.lazy_link_erased(Rc::clone(&on_change));
                Box::new(move || {
                    entry.property.unlink(id);
                }) as Box<dyn FnOnce()>
            })
            .collect();
        Ok(Multilink::from_detachers(detachers))
    }
}

/// Read access to a [`PropertySet`] from inside a multilink callback.
pub struct PropertyValues {
    set: PropertySet,
}

impl fmt::Debug for PropertyValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyValues").field(&self.set).finish()
    }
}

impl PropertyValues {
    /// Returns the current value of `name`.
    ///
    /// # Errors
    ///
    /// See [`PropertySet::property`].
    pub fn get<T: Clone + PartialEq + 'static>(&self, name: &str) -> Result<T, PropertySetError> {
        self.set.get(name)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;

    fn concentration_set() -> PropertySet {
        PropertySet::builder()
            .with("solute_amount", 0.0_f64)
            .with("volume", 1.0_f64)
            .with("label", "beaker")
            .build()
            .unwrap()
    }

    #[test]
    fn accessors_proxy_to_properties() {
        let set = concentration_set();
        set.set("volume", 2.5_f64).unwrap();
        assert_eq!(set.get::<f64>("volume").unwrap(), 2.5);
        assert_eq!(set.property::<f64>("volume").unwrap().get(), 2.5);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["solute_amount", "volume", "label"]);
    }

    #[test]
    fn lookup_errors() {
        let set = concentration_set();
        assert_eq!(
            set.get::<f64>("mass"),
            Err(PropertySetError::UnknownName("mass".into()))
        );
        assert!(matches!(
            set.get::<u32>("volume"),
            Err(PropertySetError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = PropertySet::builder().with("a", 1).with("a", 2).build();
        assert_eq!(
            result.unwrap_err(),
            PropertySetError::DuplicateName("a".into())
        );
    }

    #[test]
    fn reset_runs_in_declaration_order() {
        let set = concentration_set();
        let order = Rc::new(RefCell::new(Vec::new()));
        for name in ["label", "volume", "solute_amount"] {
            let order = Rc::clone(&order);
            let tag = name.to_string();
            set.entries
                .iter()
                .find(|entry| entry.name == name)
                .unwrap()
                .property
                .lazy_link_erased(Rc::new(move || order.borrow_mut().push(tag.clone())));
        }
        set.set("solute_amount", 3.0_f64).unwrap();
        set.set("volume", 4.0_f64).unwrap();
        set.set("label", "flask").unwrap();
        order.borrow_mut().clear();

        set.reset();
        assert_eq!(*order.borrow(), vec!["solute_amount", "volume", "label"]);
    }

    #[test]
    fn named_multilink_sees_all_values() {
        let set = concentration_set();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let link = set
            .multilink(&["solute_amount", "volume"], move |values| {
                let amount: f64 = values.get("solute_amount").unwrap();
                let volume: f64 = values.get("volume").unwrap();
                log.borrow_mut().push(amount / volume);
            })
            .unwrap();

        set.set("solute_amount", 2.0_f64).unwrap();
        set.set("volume", 4.0_f64).unwrap();
        set.set("label", "flask").unwrap();
        assert_eq!(*seen.borrow(), vec![0.0, 2.0, 0.5]);

        link.dispose();
        set.set("volume", 8.0_f64).unwrap();
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn named_multilink_rejects_unknown_names() {
        let set = concentration_set();
        let result = set.multilink(&["volume", "pressure"], |_| {});
        assert_eq!(
            result.unwrap_err(),
            PropertySetError::UnknownName("pressure".into())
        );
        assert!(!set.property::<f64>("volume").unwrap().has_observers());
    }
}

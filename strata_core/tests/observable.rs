// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notification guarantees of properties, property sets, and observable
//! arrays.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use strata_core::observable_array::ObservableArray;
use strata_core::property::{Property, PropertySet};

#[test]
fn notifications_match_value_changing_sets() {
    let property = Property::new(0_i32);
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    property.lazy_link(move |_, _| counter.set(counter.get() + 1));

    let sets = [1, 1, 2, 2, 2, 0, 0, 7];
    let mut expected = 0;
    let mut current = 0;
    for value in sets {
        if value != current {
            expected += 1;
            current = value;
        }
        property.set(value);
    }
    assert_eq!(calls.get(), expected);
    assert_eq!(expected, 4);
}

#[test]
fn link_calls_once_with_current_value() {
    let property = Property::new(String::from("initial"));
    property.set(String::from("current"));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    property.link(move |new: &String, old: Option<&String>| {
        log.borrow_mut().push((new.clone(), old.cloned()));
    });
    assert_eq!(*seen.borrow(), vec![(String::from("current"), None)]);
}

#[test]
fn resetting_twice_equals_resetting_once() {
    let set = PropertySet::builder()
        .with("count", 3_u32)
        .with("running", false)
        .build()
        .unwrap();
    set.set("count", 10_u32).unwrap();
    set.set("running", true).unwrap();

    let changes = Rc::new(Cell::new(0));
    let counter = changes.clone();
    set.property::<u32>("count")
        .unwrap()
        .lazy_link(move |_, _| counter.set(counter.get() + 1));

    set.reset();
    let after_first = (
        set.get::<u32>("count").unwrap(),
        set.get::<bool>("running").unwrap(),
    );
    assert_eq!(changes.get(), 1);

    set.reset();
    let after_second = (
        set.get::<u32>("count").unwrap(),
        set.get::<bool>("running").unwrap(),
    );
    assert_eq!(after_first, after_second);
    assert_eq!(after_second, (3, false));
    assert_eq!(changes.get(), 1);
}

#[test]
fn clear_removes_in_insertion_order() {
    let array = ObservableArray::new();
    array.add_all(["A", "B", "C"]);
    let removed = Rc::new(RefCell::new(Vec::new()));
    let log = removed.clone();
    array.add_item_removed_listener(move |item: &&str| log.borrow_mut().push(*item));

    array.clear();
    assert_eq!(*removed.borrow(), ["A", "B", "C"]);
    assert!(array.is_empty());
    assert_eq!(array.len(), 0);
}

#[test]
fn end_to_end_link_log() {
    let property = Property::new(0_i32);
    let log: Rc<RefCell<Vec<(i32, Option<i32>)>>> = Rc::default();
    let sink = log.clone();
    property.link(move |new, old| sink.borrow_mut().push((*new, old.copied())));

    property.set(5);
    property.set(5);
    property.set(3);

    assert_eq!(*log.borrow(), [(0, None), (5, Some(0)), (3, Some(5))]);
}

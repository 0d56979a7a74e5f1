// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The retained-mode scene graph.
//!
//! A [`Scene`] stores every node in struct-of-arrays form, addressed by
//! generational [`NodeId`] handles. Each node has at most one parent and an
//! ordered list of children painted bottom-most first.
//!
//! Mutations mark dirty channels (see [`dirty`](crate::dirty)) and invalidate
//! cached bounds; [`Scene::evaluate`] refreshes computed state and reports a
//! [`SceneChanges`] that the [`layer`](crate::layer) stack consumes.
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use strata_core::geom::Area;
//! use strata_core::node::{HitOptions, NodeContent, Scene};
//! use strata_core::paint::Color;
//!
//! let mut scene = Scene::new();
//! let root = scene.create_node();
//! let square = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 10.0, 10.0)));
//! scene.set_fill(square, Color::BLACK);
//! scene.add_child(root, square);
//! scene.set_translation(square, Vec2::new(20.0, 0.0));
//!
//! let trail = scene
//!     .trail_under_point(root, Point::new(25.0, 5.0), HitOptions::MOUSE)
//!     .unwrap();
//! assert_eq!(trail.last_node(), Some(square));
//! ```

mod bounds;
mod content;
mod evaluate;
mod hit;
mod id;
mod layout;
mod options;
mod store;
mod trail;
mod traverse;

pub use content::NodeContent;
pub use evaluate::SceneChanges;
pub use hit::HitOptions;
pub use id::{INVALID, NodeId};
pub use options::{InputListeners, NodeOptions, OptionValue, OptionsError};
pub use store::Scene;
pub use trail::Trail;
pub use traverse::Children;

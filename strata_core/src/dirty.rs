// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The scene uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! find which nodes need their computed state refreshed and which layers need
//! repainting.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`TRANSFORM`] and [`OPACITY`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency edges
//!   from child to parent, because world transforms, effective opacities, and
//!   effective visibility are inherited. Visibility changes are routed through
//!   [`TRANSFORM`] so a single drain pass recomputes both.
//! - **Local-only**: [`PAINT`] and [`CLIP`] mark only the mutated node.
//! - **Structural**: [`TOPOLOGY`] marks the parent on child insertion or
//!   removal, and [`RENDERER`] marks nodes whose renderer requirements
//!   changed. Either one triggers a layer rebuild.
//!
//! Bounds are not a dirty channel: they are cached per node and invalidated
//! eagerly up the ancestor chain, then recomputed on read
//! (see [`Scene::bounds`](crate::node::Scene::bounds)).

use understory_dirty::Channel;

/// Local transform or visibility changed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Opacity changed.
pub const OPACITY: Channel = Channel::new(1);

/// Fill, stroke, content, or other paint-only state changed.
pub const PAINT: Channel = Channel::new(2);

/// Clip area changed.
pub const CLIP: Channel = Channel::new(3);

/// Children were added, removed, or reordered; nodes created or destroyed.
pub const TOPOLOGY: Channel = Channel::new(4);

/// Renderer override, layer split, or content capabilities changed.
pub const RENDERER: Channel = Channel::new(5);

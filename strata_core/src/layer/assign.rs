// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effective renderer assignment.

use alloc::vec;
use alloc::vec::Vec;

use crate::node::{INVALID, NodeId, Scene};
use crate::renderer::{Renderer, RendererMask};

/// Computes the renderer of every node in the subtree of `root`.
///
/// The result is indexed by slot; slots outside the subtree are `None`.
///
/// Each node takes, in order:
///
/// 1. its own override, if its content and paints support it;
/// 2. the nearest ancestor's override, if its content and paints support it;
/// 3. the preferred renderer of the intersection of every capability mask
///    in its subtree;
/// 4. the preferred renderer of its own capability mask.
#[must_use]
pub fn effective_renderers(scene: &Scene, root: NodeId) -> Vec<Option<Renderer>> {
    let mut subtree = vec![RendererMask::NONE; scene.len as usize];
    subtree_masks(scene, root.index(), &mut subtree);
    let mut out = vec![None; scene.len as usize];
    assign(scene, root.index(), None, &subtree, &mut out);
    out
}

fn subtree_masks(scene: &Scene, idx: u32, masks: &mut [RendererMask]) -> RendererMask {
    let mut mask = scene.renderer_mask_at(idx);
    let mut child = scene.first_child[idx as usize];
    while child != INVALID {
        mask = mask.intersection(subtree_masks(scene, child, masks));
        child = scene.next_sibling[child as usize];
    }
    masks[idx as usize] = mask;
    mask
}

fn assign(
    scene: &Scene,
    idx: u32,
    inherited: Option<Renderer>,
    subtree: &[RendererMask],
    out: &mut [Option<Renderer>],
) {
    let i = idx as usize;
    let own = scene.renderer_mask_at(idx);
    let explicit = scene.renderer[i];

    let renderer = match explicit.or(inherited) {
        Some(forced) if own.supports(forced) => Some(forced),
        Some(forced) => {
            if explicit.is_some() {
                log::warn!(
                    "renderer {forced} cannot draw {:?}; using {:?}",
                    scene.id_at(idx),
                    own.preferred()
                );
            }
            own.preferred()
        }
        None => subtree[i].preferred().or_else(|| own.preferred()),
    };
    out[i] = renderer;

    let passed = explicit.or(inherited);
    let mut child = scene.first_child[i];
    while child != INVALID {
        assign(scene, child, passed, subtree, out);
        child = scene.next_sibling[child as usize];
    }
}

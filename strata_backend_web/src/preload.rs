// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image preloading into an [`AssetGate`].
//!
//! Every image handed to [`ImageLoader::load`] is declared on the gate
//! before its `src` is set; the element's `load` or `error` event resolves
//! it. Once the last image settles the gate runs its ready callbacks, which
//! is where a [`LaunchGuard`](strata_sim::LaunchGuard) starts the
//! simulation.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use strata_core::trace::{AssetResolvedEvent, Tracer};
use strata_sim::{AssetGate, AssetId, AssetStatus};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlImageElement;

type Resolved = Rc<RefCell<Vec<AssetResolvedEvent>>>;

struct LoadingImage {
    id: AssetId,
    element: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

/// Loads images and resolves their assets on a shared [`AssetGate`].
pub struct ImageLoader {
    gate: AssetGate,
    resolved: Resolved,
    loading: Vec<LoadingImage>,
}

impl core::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("gate", &self.gate)
            .field("loading", &self.loading.len())
            .finish_non_exhaustive()
    }
}

impl ImageLoader {
    /// Creates a loader that declares its images on `gate`.
    #[must_use]
    pub fn new(gate: AssetGate) -> Self {
        Self {
            gate,
            resolved: Rc::default(),
            loading: Vec::new(),
        }
    }

    /// The gate images are declared on.
    #[must_use]
    pub fn gate(&self) -> &AssetGate {
        &self.gate
    }

    /// Starts loading `url`.
    ///
    /// The returned element can be registered with a
    /// [`LayerPresenter`](crate::LayerPresenter) right away; it draws once
    /// loaded.
    pub fn load(&mut self, url: &str) -> Result<(AssetId, HtmlImageElement), JsValue> {
        let element = HtmlImageElement::new()?;
        let id = self.gate.declare(url);
        let onload = self.resolver(id, Ok(()));
        let onerror = self.resolver(id, Err(format!("could not load image {url}")));
        element.set_onload(Some(onload.as_ref().unchecked_ref()));
        element.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        element.set_src(url);
        log::debug!("preloading image {url} as asset {}", id.index());

        self.loading.push(LoadingImage {
            id,
            element: element.clone(),
            _onload: onload,
            _onerror: onerror,
        });
        Ok((id, element))
    }

    /// Number of images still waiting for a `load` or `error` event.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.loading
            .iter()
            .filter(|image| self.gate.status(image.id) == Some(AssetStatus::Pending))
            .count()
    }

    /// Returns the resolutions since the last call and releases the event
    /// handlers of settled images.
    ///
    /// Call this from the frame loop rather than from inside an event
    /// handler: a handler must not be dropped while it runs.
    pub fn drain_resolved(&mut self) -> Vec<AssetResolvedEvent> {
        let gate = &self.gate;
        self.loading.retain(|image| {
            let pending = gate.status(image.id) == Some(AssetStatus::Pending);
            if !pending {
                image.element.set_onload(None);
                image.element.set_onerror(None);
            }
            pending
        });
        core::mem::take(&mut *self.resolved.borrow_mut())
    }

    /// Drains the resolutions into `tracer`.
    pub fn trace_resolved(&mut self, tracer: &mut Tracer<'_>) {
        for event in self.drain_resolved() {
            tracer.asset_resolved(&event);
        }
    }

    fn resolver(&self, id: AssetId, result: Result<(), String>) -> Closure<dyn FnMut()> {
        let gate = self.gate.clone();
        let resolved = Rc::clone(&self.resolved);
        Closure::new(move || {
            // `error` can follow `load` when the source changes; only the
            // first outcome counts.
            if gate.status(id) != Some(AssetStatus::Pending) {
                return;
            }
            let event = gate.resolve(id, result.clone(), crate::now_us());
            resolved.borrow_mut().push(event);
        })
    }
}

// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser surfaces for renderer layers.
//!
//! [`LayerPresenter`] implements [`Painter`]: every layer of the stack gets
//! one surface stacked inside a container element, in paint order. Canvas
//! layers become `<canvas>` elements redrawn inside their damage region; SVG
//! and DOM layers are rebuilt from the layer's [`RenderPlan`] on each
//! repaint.
//!
//! Gradient paints become canvas gradients or SVG `<linearGradient>` and
//! `<radialGradient>` definitions. [`Canvas`](NodeContent::Canvas) content
//! draws through a [`CanvasContext`] wrapping the layer's 2D context.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, BezPath, PathEl, Point};
use strata_core::canvas::CanvasContext;
use strata_core::geom::Area;
use strata_core::layer::{Layer, LayerBoundary, Painter};
use strata_core::node::{NodeContent, NodeId, Scene, Trail};
use strata_core::paint::{Color, ColorStop, Paint};
use strata_core::renderer::Renderer;
use strata_render::{DamageRegion, DamageTracker, RenderItem, RenderPlan};
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{
    CanvasGradient, CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement,
    HtmlImageElement,
};

use crate::path::{css_matrix, svg_matrix, svg_path_data};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const FONT_FAMILY: &str = "sans-serif";

enum Surface {
    Canvas {
        canvas: HtmlCanvasElement,
        context: CanvasRenderingContext2d,
    },
    Svg(Element),
    Dom(HtmlElement),
}

impl Surface {
    fn element(&self) -> &Element {
        match self {
            Self::Canvas { canvas, .. } => canvas,
            Self::Svg(root) => root,
            Self::Dom(root) => root,
        }
    }
}

/// Paints renderer layers onto stacked canvas, SVG and DOM surfaces.
///
/// The presenter owns a container `HtmlElement`; surfaces are appended to
/// it when the layer structure changes and removed when it changes again.
/// Image and embedded DOM content is supplied per node with
/// [`set_image`](Self::set_image) and
/// [`set_dom_element`](Self::set_dom_element).
pub struct LayerPresenter {
    document: Document,
    container: HtmlElement,
    size: (f64, f64),
    pixel_ratio: f64,
    layer_starts: Vec<Trail>,
    surfaces: Vec<Surface>,
    damage: DamageTracker,
    plan: RenderPlan,
    images: BTreeMap<NodeId, HtmlImageElement>,
    dom_elements: BTreeMap<NodeId, HtmlElement>,
    next_def: u64,
}

impl core::fmt::Debug for LayerPresenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayerPresenter")
            .field("size", &self.size)
            .field("pixel_ratio", &self.pixel_ratio)
            .field("surfaces", &self.surfaces.len())
            .field("images", &self.images.len())
            .field("dom_elements", &self.dom_elements.len())
            .finish_non_exhaustive()
    }
}

impl LayerPresenter {
    /// Creates a presenter that manages surfaces inside `container`.
    ///
    /// Fails if the container does not belong to a document.
    pub fn new(container: HtmlElement) -> Result<Self, JsValue> {
        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("container is not attached to a document"))?;
        Ok(Self {
            document,
            container,
            size: (0.0, 0.0),
            pixel_ratio: 1.0,
            layer_starts: Vec::new(),
            surfaces: Vec::new(),
            damage: DamageTracker::new(),
            plan: RenderPlan::new(Renderer::Canvas),
            images: BTreeMap::new(),
            dom_elements: BTreeMap::new(),
            next_def: 0,
        })
    }

    /// The container element.
    #[must_use]
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Number of surfaces, one per layer.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Sets the drawing size in CSS pixels and the device pixel ratio used
    /// for canvas backing stores.
    ///
    /// Every layer is fully redrawn on its next paint.
    pub fn resize(&mut self, width: f64, height: f64, pixel_ratio: f64) {
        self.size = (width, height);
        self.pixel_ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        for surface in &self.surfaces {
            if let Err(err) = size_surface(surface, self.size, self.pixel_ratio) {
                log::warn!("failed to resize surface: {err:?}");
            }
        }
        self.damage.reset(self.surfaces.len());
    }

    /// Uses `image` to draw the [`Image`](NodeContent::Image) content of
    /// `node`.
    pub fn set_image(&mut self, node: NodeId, image: HtmlImageElement) {
        self.images.insert(node, image);
    }

    /// Embeds `element` as the [`Dom`](NodeContent::Dom) content of `node`.
    pub fn set_dom_element(&mut self, node: NodeId, element: HtmlElement) {
        self.dom_elements.insert(node, element);
    }

    /// Drops the image and DOM element registered for `node`.
    pub fn forget(&mut self, node: NodeId) {
        self.images.remove(&node);
        if let Some(element) = self.dom_elements.remove(&node) {
            element.remove();
        }
    }

    fn create_surface(&self, renderer: Renderer) -> Result<Surface, JsValue> {
        let surface = match renderer {
            Renderer::Canvas => {
                let canvas: HtmlCanvasElement =
                    self.document.create_element("canvas")?.dyn_into()?;
                let context: CanvasRenderingContext2d = canvas
                    .get_context("2d")?
                    .ok_or_else(|| JsValue::from_str("2d canvas context is unavailable"))?
                    .dyn_into()?;
                set_styles(
                    &canvas,
                    &[
                        ("position", "absolute"),
                        ("left", "0"),
                        ("top", "0"),
                        ("pointer-events", "none"),
                    ],
                )?;
                Surface::Canvas { canvas, context }
            }
            Renderer::Svg => {
                let root = self.document.create_element_ns(Some(SVG_NS), "svg")?;
                root.set_attribute(
                    "style",
                    "position:absolute;left:0;top:0;overflow:visible;pointer-events:none",
                )?;
                Surface::Svg(root)
            }
            Renderer::Dom => {
                let root: HtmlElement = self.document.create_element("div")?.dyn_into()?;
                set_styles(
                    &root,
                    &[
                        ("position", "absolute"),
                        ("left", "0"),
                        ("top", "0"),
                        ("pointer-events", "none"),
                    ],
                )?;
                Surface::Dom(root)
            }
        };
        size_surface(&surface, self.size, self.pixel_ratio)?;
        self.container.append_child(surface.element())?;
        Ok(surface)
    }

    fn paint(&mut self, index: usize) -> Result<(), JsValue> {
        let damage = self.damage.repaint(index, &self.plan);
        if damage.is_empty() {
            return Ok(());
        }
        let Some(surface) = self.surfaces.get(index) else {
            return Ok(());
        };
        match surface {
            Surface::Canvas { context, .. } => paint_canvas(
                context,
                &self.plan,
                &damage,
                &self.images,
                self.size,
                self.pixel_ratio,
            ),
            Surface::Svg(root) => {
                paint_svg(&self.document, root, &self.plan, &self.images, &mut self.next_def)
            }
            Surface::Dom(root) => paint_dom(
                &self.document,
                root,
                &self.plan,
                &self.images,
                &self.dom_elements,
            ),
        }
    }
}

impl Painter for LayerPresenter {
    fn layers_changed(&mut self, layers: &[Layer], boundaries: &[LayerBoundary]) {
        debug_assert_eq!(
            boundaries.len(),
            layers.len() + 1,
            "a stack of n layers has n + 1 boundaries"
        );
        for surface in self.surfaces.drain(..) {
            surface.element().remove();
        }
        for layer in layers {
            match self.create_surface(layer.renderer) {
                Ok(surface) => self.surfaces.push(surface),
                Err(err) => {
                    log::warn!("failed to create {} surface: {err:?}", layer.renderer);
                    break;
                }
            }
        }
        self.layer_starts = layers.iter().map(|layer| layer.start.clone()).collect();
        self.damage.reset(layers.len());
        log::debug!("presenting {} layers", self.surfaces.len());
    }

    fn paint_layer(&mut self, scene: &Scene, layer: &Layer) {
        let Some(index) = self
            .layer_starts
            .iter()
            .position(|start| *start == layer.start)
        else {
            log::warn!("asked to paint a {} layer that was never presented", layer.renderer);
            return;
        };
        self.plan.fill(scene, layer);
        if let Err(err) = self.paint(index) {
            log::warn!("failed to paint {} layer {index}: {err:?}", layer.renderer);
        }
    }
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = element.style();
    for (name, value) in styles {
        style.set_property(name, value)?;
    }
    Ok(())
}

fn size_surface(surface: &Surface, (width, height): (f64, f64), ratio: f64) -> Result<(), JsValue> {
    match surface {
        Surface::Canvas { canvas, .. } => {
            canvas.set_width(device_pixels(width * ratio));
            canvas.set_height(device_pixels(height * ratio));
            set_styles(
                canvas,
                &[
                    ("width", &format!("{width}px")),
                    ("height", &format!("{height}px")),
                ],
            )
        }
        Surface::Svg(root) => {
            root.set_attribute("width", &format!("{width}"))?;
            root.set_attribute("height", &format!("{height}"))
        }
        Surface::Dom(root) => set_styles(
            root,
            &[
                ("width", &format!("{width}px")),
                ("height", &format!("{height}px")),
            ],
        ),
    }
}

fn device_pixels(value: f64) -> u32 {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "canvas sizes are small and clamped to be non-negative"
    )]
    let pixels = value.max(0.0).ceil() as u32;
    pixels
}

// Canvas

fn paint_canvas(
    context: &CanvasRenderingContext2d,
    plan: &RenderPlan,
    damage: &DamageRegion,
    images: &BTreeMap<NodeId, HtmlImageElement>,
    (width, height): (f64, f64),
    ratio: f64,
) -> Result<(), JsValue> {
    context.save();
    let result = redraw_canvas(context, plan, damage, images, (width, height), ratio);
    context.restore();
    result
}

fn redraw_canvas(
    context: &CanvasRenderingContext2d,
    plan: &RenderPlan,
    damage: &DamageRegion,
    images: &BTreeMap<NodeId, HtmlImageElement>,
    (width, height): (f64, f64),
    ratio: f64,
) -> Result<(), JsValue> {
    let device = Affine::scale(ratio);
    context.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    match damage.bounding_box() {
        Some(rect) => {
            let rect = device.transform_rect_bbox(rect).expand();
            context.begin_path();
            context.rect(rect.x0, rect.y0, rect.width(), rect.height());
            context.clip();
            context.clear_rect(rect.x0, rect.y0, rect.width(), rect.height());
        }
        None => context.clear_rect(0.0, 0.0, width * ratio, height * ratio),
    }
    for item in &plan.items {
        context.save();
        let drawn = draw_canvas_item(context, item, images, device);
        context.restore();
        drawn?;
    }
    Ok(())
}

fn draw_canvas_item(
    context: &CanvasRenderingContext2d,
    item: &RenderItem,
    images: &BTreeMap<NodeId, HtmlImageElement>,
    device: Affine,
) -> Result<(), JsValue> {
    for clip in &item.clips {
        set_canvas_transform(context, device * clip.transform)?;
        context.begin_path();
        trace_path(context, &clip.area.to_path());
        context.clip();
    }
    set_canvas_transform(context, device * item.world_transform)?;
    context.set_global_alpha(f64::from(item.effective_opacity));

    match &item.content {
        NodeContent::Shape(area) => {
            context.begin_path();
            trace_path(context, &area.to_path());
            if set_canvas_fill(context, &item.fill)? {
                context.fill();
            }
            if item.line_width > 0.0 && set_canvas_stroke(context, &item.stroke)? {
                context.set_line_width(item.line_width);
                context.stroke();
            }
        }
        NodeContent::Text { text, font_size } => {
            context.set_font(&format!("{font_size}px {FONT_FAMILY}"));
            if set_canvas_fill(context, &item.fill)? {
                context.fill_text(text, 0.0, 0.0)?;
            }
            if item.line_width > 0.0 && set_canvas_stroke(context, &item.stroke)? {
                context.set_line_width(item.line_width);
                context.stroke_text(text, 0.0, 0.0)?;
            }
        }
        NodeContent::Canvas { .. } => {
            let mut canvas = WebCanvas {
                context,
                error: None,
            };
            item.paint_canvas(&mut canvas);
            if let Some(err) = canvas.error {
                return Err(err);
            }
        }
        NodeContent::Image { width, height } => {
            if let Some(image) = images.get(&item.node)
                && image.complete()
            {
                context.draw_image_with_html_image_element_and_dw_and_dh(
                    image, 0.0, 0.0, *width, *height,
                )?;
            }
        }
        NodeContent::Group | NodeContent::Dom { .. } => {}
    }
    Ok(())
}

enum CanvasStyle {
    Css(String),
    Gradient(CanvasGradient),
}

/// The canvas style for `paint`, or `None` when it paints nothing.
fn canvas_style(
    context: &CanvasRenderingContext2d,
    paint: &Paint,
) -> Result<Option<CanvasStyle>, JsValue> {
    if !paint.is_visible() {
        return Ok(None);
    }
    let style = match paint {
        Paint::None => return Ok(None),
        Paint::Color(color) => CanvasStyle::Css(color.to_css()),
        Paint::LinearGradient(linear) => {
            let gradient =
                context.create_linear_gradient(linear.start.x, linear.start.y, linear.end.x, linear.end.y);
            add_canvas_stops(&gradient, &linear.stops)?;
            CanvasStyle::Gradient(gradient)
        }
        Paint::RadialGradient(radial) => {
            let gradient = context.create_radial_gradient(
                radial.start.x,
                radial.start.y,
                radial.start_radius,
                radial.end.x,
                radial.end.y,
                radial.end_radius,
            )?;
            add_canvas_stops(&gradient, &radial.stops)?;
            CanvasStyle::Gradient(gradient)
        }
    };
    Ok(Some(style))
}

fn add_canvas_stops(gradient: &CanvasGradient, stops: &[ColorStop]) -> Result<(), JsValue> {
    for stop in stops {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "stop offsets are in [0, 1]"
        )]
        let offset = stop.ratio as f32;
        gradient.add_color_stop(offset, &stop.color.to_css())?;
    }
    Ok(())
}

/// Sets the fill style; returns `false` when `paint` paints nothing.
fn set_canvas_fill(context: &CanvasRenderingContext2d, paint: &Paint) -> Result<bool, JsValue> {
    match canvas_style(context, paint)? {
        Some(CanvasStyle::Css(css)) => context.set_fill_style_str(&css),
        Some(CanvasStyle::Gradient(gradient)) => context.set_fill_style_canvas_gradient(&gradient),
        None => return Ok(false),
    }
    Ok(true)
}

/// Sets the stroke style; returns `false` when `paint` paints nothing.
fn set_canvas_stroke(context: &CanvasRenderingContext2d, paint: &Paint) -> Result<bool, JsValue> {
    match canvas_style(context, paint)? {
        Some(CanvasStyle::Css(css)) => context.set_stroke_style_str(&css),
        Some(CanvasStyle::Gradient(gradient)) => {
            context.set_stroke_style_canvas_gradient(&gradient);
        }
        None => return Ok(false),
    }
    Ok(true)
}

/// Custom canvas content drawing straight into a layer's 2D context.
///
/// The first failing call is kept and reported after the painting returns.
struct WebCanvas<'a> {
    context: &'a CanvasRenderingContext2d,
    error: Option<JsValue>,
}

impl WebCanvas<'_> {
    fn check<T>(&mut self, result: Result<T, JsValue>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.error.get_or_insert(err);
                None
            }
        }
    }
}

impl CanvasContext for WebCanvas<'_> {
    fn save(&mut self) {
        self.context.save();
    }

    fn restore(&mut self) {
        self.context.restore();
    }

    fn transform(&mut self, transform: Affine) {
        let [a, b, c, d, e, f] = transform.as_coeffs();
        let result = self.context.transform(a, b, c, d, e, f);
        self.check(result);
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        let styled = set_canvas_fill(self.context, paint);
        if self.check(styled) == Some(true) {
            self.context.begin_path();
            trace_path(self.context, path);
            self.context.fill();
        }
    }

    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, line_width: f64) {
        let styled = set_canvas_stroke(self.context, paint);
        if line_width > 0.0 && self.check(styled) == Some(true) {
            self.context.set_line_width(line_width);
            self.context.begin_path();
            trace_path(self.context, path);
            self.context.stroke();
        }
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, paint: &Paint) {
        let styled = set_canvas_fill(self.context, paint);
        if self.check(styled) == Some(true) {
            self.context.set_font(&format!("{font_size}px {FONT_FAMILY}"));
            let drawn = self.context.fill_text(text, origin.x, origin.y);
            self.check(drawn);
        }
    }
}

fn set_canvas_transform(context: &CanvasRenderingContext2d, transform: Affine) -> Result<(), JsValue> {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    context.set_transform(a, b, c, d, e, f)
}

fn trace_path(context: &CanvasRenderingContext2d, path: &BezPath) {
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => context.move_to(p.x, p.y),
            PathEl::LineTo(p) => context.line_to(p.x, p.y),
            PathEl::QuadTo(c, p) => context.quadratic_curve_to(c.x, c.y, p.x, p.y),
            PathEl::CurveTo(c1, c2, p) => context.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathEl::ClosePath => context.close_path(),
        }
    }
}

// SVG

fn svg_element(document: &Document, name: &str) -> Result<Element, JsValue> {
    document.create_element_ns(Some(SVG_NS), name)
}

fn paint_svg(
    document: &Document,
    root: &Element,
    plan: &RenderPlan,
    images: &BTreeMap<NodeId, HtmlImageElement>,
    next_def: &mut u64,
) -> Result<(), JsValue> {
    root.set_inner_html("");
    let defs = svg_element(document, "defs")?;
    root.append_child(&defs)?;
    let mut svg_defs = SvgDefs {
        document,
        defs: &defs,
        next_id: next_def,
    };

    for item in &plan.items {
        let Some(element) = svg_item(&mut svg_defs, item, images)? else {
            continue;
        };
        // Clip paths live in world space; only the innermost element
        // carries the item's transform.
        let mut parent = root.clone();
        for clip in &item.clips {
            let id = svg_defs.id("clip");
            let clip_path = svg_element(document, "clipPath")?;
            clip_path.set_attribute("id", &id)?;
            clip_path.set_attribute("clipPathUnits", "userSpaceOnUse")?;
            let shape = svg_element(document, "path")?;
            shape.set_attribute("d", &svg_path_data(&clip.area.to_path()))?;
            shape.set_attribute("transform", &svg_matrix(clip.transform))?;
            clip_path.append_child(&shape)?;
            defs.append_child(&clip_path)?;

            let group = svg_element(document, "g")?;
            group.set_attribute("clip-path", &format!("url(#{id})"))?;
            parent.append_child(&group)?;
            parent = group;
        }
        element.set_attribute("transform", &svg_matrix(item.world_transform))?;
        if item.effective_opacity < 1.0 {
            element.set_attribute("opacity", &format!("{}", item.effective_opacity))?;
        }
        parent.append_child(&element)?;
    }
    Ok(())
}

/// The `<defs>` of one SVG surface, with unique ids for clip paths and
/// gradients.
struct SvgDefs<'a> {
    document: &'a Document,
    defs: &'a Element,
    next_id: &'a mut u64,
}

impl SvgDefs<'_> {
    fn id(&mut self, kind: &str) -> String {
        let id = format!("strata-{kind}-{}", self.next_id);
        *self.next_id += 1;
        id
    }

    /// The value of a `fill` or `stroke` attribute for `paint`, defining a
    /// gradient first when needed.
    fn paint(&mut self, paint: &Paint) -> Result<String, JsValue> {
        if let Some(css) = paint.to_css() {
            return Ok(css);
        }
        let Some(gradient) = svg_gradient(paint) else {
            return Ok("none".into());
        };
        let id = self.id("gradient");
        let definition = svg_element(self.document, gradient.tag)?;
        definition.set_attribute("id", &id)?;
        definition.set_attribute("gradientUnits", "userSpaceOnUse")?;
        for (name, value) in &gradient.attributes {
            definition.set_attribute(name, value)?;
        }
        for stop in &gradient.stops {
            let element = svg_element(self.document, "stop")?;
            element.set_attribute("offset", &format!("{}", stop.ratio))?;
            element.set_attribute("style", &svg_stop_style(stop.color))?;
            definition.append_child(&element)?;
        }
        self.defs.append_child(&definition)?;
        Ok(format!("url(#{id})"))
    }
}

/// Element name, geometry attributes, and stops of an SVG gradient.
#[derive(Debug, PartialEq)]
struct SvgGradient {
    tag: &'static str,
    attributes: Vec<(&'static str, String)>,
    stops: Vec<ColorStop>,
}

fn svg_gradient(paint: &Paint) -> Option<SvgGradient> {
    match paint {
        Paint::LinearGradient(linear) => Some(SvgGradient {
            tag: "linearGradient",
            attributes: alloc::vec![
                ("x1", format!("{}", linear.start.x)),
                ("y1", format!("{}", linear.start.y)),
                ("x2", format!("{}", linear.end.x)),
                ("y2", format!("{}", linear.end.y)),
            ],
            stops: linear.stops.clone(),
        }),
        Paint::RadialGradient(radial) => {
            let svg = radial.to_svg();
            Some(SvgGradient {
                tag: "radialGradient",
                attributes: alloc::vec![
                    ("cx", format!("{}", svg.center.x)),
                    ("cy", format!("{}", svg.center.y)),
                    ("r", format!("{}", svg.radius)),
                    ("fx", format!("{}", svg.focal_point.x)),
                    ("fy", format!("{}", svg.focal_point.y)),
                ],
                stops: svg.stops,
            })
        }
        Paint::None | Paint::Color(_) => None,
    }
}

/// SVG stops take the color and its alpha separately.
fn svg_stop_style(color: Color) -> String {
    format!(
        "stop-color: {}; stop-opacity: {};",
        color.with_alpha(1.0).to_css(),
        color.a
    )
}

fn svg_item(
    defs: &mut SvgDefs<'_>,
    item: &RenderItem,
    images: &BTreeMap<NodeId, HtmlImageElement>,
) -> Result<Option<Element>, JsValue> {
    let document = defs.document;
    let element = match &item.content {
        NodeContent::Shape(area) => {
            let path = svg_element(document, "path")?;
            path.set_attribute("d", &svg_path_data(&area.to_path()))?;
            set_svg_paints(defs, &path, item)?;
            path
        }
        NodeContent::Text { text, font_size } => {
            let label = svg_element(document, "text")?;
            label.set_attribute("font-size", &format!("{font_size}"))?;
            label.set_attribute("font-family", FONT_FAMILY)?;
            set_svg_paints(defs, &label, item)?;
            label.set_text_content(Some(text));
            label
        }
        NodeContent::Image { width, height } => {
            let Some(source) = images.get(&item.node) else {
                return Ok(None);
            };
            let image = svg_element(document, "image")?;
            image.set_attribute("href", &source.src())?;
            image.set_attribute("width", &format!("{width}"))?;
            image.set_attribute("height", &format!("{height}"))?;
            image
        }
        NodeContent::Group | NodeContent::Dom { .. } | NodeContent::Canvas { .. } => {
            return Ok(None);
        }
    };
    Ok(Some(element))
}

fn set_svg_paints(defs: &mut SvgDefs<'_>, element: &Element, item: &RenderItem) -> Result<(), JsValue> {
    element.set_attribute("fill", &defs.paint(&item.fill)?)?;
    element.set_attribute("stroke", &defs.paint(&item.stroke)?)?;
    if item.stroke.is_visible() {
        element.set_attribute("stroke-width", &format!("{}", item.line_width))?;
    }
    Ok(())
}

// DOM

fn paint_dom(
    document: &Document,
    root: &HtmlElement,
    plan: &RenderPlan,
    images: &BTreeMap<NodeId, HtmlImageElement>,
    dom_elements: &BTreeMap<NodeId, HtmlElement>,
) -> Result<(), JsValue> {
    // Embedded elements are detached here and re-attached below.
    root.set_inner_html("");

    for item in &plan.items {
        let Some((element, offset)) = dom_item(document, item, images, dom_elements)? else {
            continue;
        };
        // CSS transforms compose through nesting, so each wrapper and the
        // element itself are positioned relative to their parent frame.
        let mut parent = root.clone();
        let mut frame = Affine::IDENTITY;
        for clip in &item.clips {
            let bounds = clip.area.bounding_box();
            let placement = clip.transform * Affine::translate(bounds.origin().to_vec2());
            let wrapper: HtmlElement = document.create_element("div")?.dyn_into()?;
            set_styles(
                &wrapper,
                &[
                    ("position", "absolute"),
                    ("left", "0"),
                    ("top", "0"),
                    ("transform-origin", "0 0"),
                    ("transform", &css_matrix(frame.inverse() * placement)),
                    ("width", &format!("{}px", bounds.width())),
                    ("height", &format!("{}px", bounds.height())),
                    ("overflow", "hidden"),
                ],
            )?;
            if let Some(radius) = border_radius(&clip.area) {
                wrapper.style().set_property("border-radius", &radius)?;
            }
            parent.append_child(&wrapper)?;
            parent = wrapper;
            frame = placement;
        }
        set_styles(
            &element,
            &[
                ("position", "absolute"),
                ("left", "0"),
                ("top", "0"),
                ("transform-origin", "0 0"),
                (
                    "transform",
                    &css_matrix(frame.inverse() * item.world_transform * offset),
                ),
                ("opacity", &format!("{}", item.effective_opacity)),
            ],
        )?;
        parent.append_child(&element)?;
    }
    Ok(())
}

/// Builds the element for one DOM item and the offset of its top-left
/// corner in the item's local frame.
fn dom_item(
    document: &Document,
    item: &RenderItem,
    images: &BTreeMap<NodeId, HtmlImageElement>,
    dom_elements: &BTreeMap<NodeId, HtmlElement>,
) -> Result<Option<(HtmlElement, Affine)>, JsValue> {
    let placed = match &item.content {
        NodeContent::Shape(Area::Rect(rect)) => {
            let block: HtmlElement = document.create_element("div")?.dyn_into()?;
            set_styles(
                &block,
                &[
                    ("width", &format!("{}px", rect.width())),
                    ("height", &format!("{}px", rect.height())),
                ],
            )?;
            if let Some(color) = item.fill.as_color() {
                block.style().set_property("background-color", &color.to_css())?;
            }
            if let Some(stroke) = item.stroke.as_color()
                && !stroke.is_transparent()
                && item.line_width > 0.0
            {
                // A centered outline matches canvas and SVG strokes.
                set_styles(
                    &block,
                    &[
                        (
                            "outline",
                            &format!("{}px solid {}", item.line_width, stroke.to_css()),
                        ),
                        ("outline-offset", &format!("{}px", -item.line_width / 2.0)),
                    ],
                )?;
            }
            (block, Affine::translate(rect.origin().to_vec2()))
        }
        NodeContent::Text { text, font_size } => {
            let label: HtmlElement = document.create_element("div")?.dyn_into()?;
            set_styles(
                &label,
                &[
                    ("font-size", &format!("{font_size}px")),
                    ("font-family", FONT_FAMILY),
                    ("line-height", "1"),
                    ("white-space", "pre"),
                ],
            )?;
            if let Some(color) = item.fill.as_color() {
                label.style().set_property("color", &color.to_css())?;
            }
            label.set_text_content(Some(text));
            // Text nodes put the baseline at y = 0; a unit line height puts
            // it roughly one font size below the box top.
            (label, Affine::translate((0.0, -font_size)))
        }
        NodeContent::Image { width, height } => {
            let Some(source) = images.get(&item.node) else {
                return Ok(None);
            };
            let image: HtmlElement = source.clone_node()?.dyn_into()?;
            set_styles(
                &image,
                &[
                    ("width", &format!("{width}px")),
                    ("height", &format!("{height}px")),
                ],
            )?;
            (image, Affine::IDENTITY)
        }
        NodeContent::Dom { width, height } => {
            let Some(embedded) = dom_elements.get(&item.node) else {
                return Ok(None);
            };
            set_styles(
                embedded,
                &[
                    ("width", &format!("{width}px")),
                    ("height", &format!("{height}px")),
                ],
            )?;
            (embedded.clone(), Affine::IDENTITY)
        }
        NodeContent::Shape(_) | NodeContent::Group | NodeContent::Canvas { .. } => return Ok(None),
    };
    Ok(Some(placed))
}

/// CSS `border-radius` for clip areas that a rounded box can express.
fn border_radius(area: &Area) -> Option<String> {
    match area {
        Area::RoundedRect(rect) => {
            let radii = rect.radii();
            Some(format!(
                "{}px {}px {}px {}px",
                radii.top_left, radii.top_right, radii.bottom_right, radii.bottom_left,
            ))
        }
        Area::Circle(_) | Area::Ellipse(_) => Some("50%".into()),
        Area::Rect(_) | Area::Path(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Circle, RoundedRect};

    #[test]
    fn rounded_clips_map_to_border_radius() {
        let rounded = Area::RoundedRect(RoundedRect::new(0.0, 0.0, 20.0, 10.0, 4.0));
        assert_eq!(border_radius(&rounded).as_deref(), Some("4px 4px 4px 4px"));
        let circle = Area::Circle(Circle::new((5.0, 5.0), 5.0));
        assert_eq!(border_radius(&circle).as_deref(), Some("50%"));
        assert_eq!(border_radius(&Area::rect(0.0, 0.0, 1.0, 1.0)), None);
    }

    #[test]
    fn linear_gradient_definition() {
        use strata_core::paint::LinearGradient;

        let paint = Paint::from(
            LinearGradient::new(5.0, 0.0, 5.0, 40.0)
                .add_color_stop(0.0, Color::BLACK)
                .add_color_stop(1.0, Color::rgba(192, 192, 192, 0.5)),
        );
        let gradient = svg_gradient(&paint).unwrap();
        assert_eq!(gradient.tag, "linearGradient");
        assert_eq!(
            gradient.attributes,
            [
                ("x1", String::from("5")),
                ("y1", String::from("0")),
                ("x2", String::from("5")),
                ("y2", String::from("40")),
            ]
        );
        assert_eq!(
            svg_stop_style(gradient.stops[1].color),
            "stop-color: rgb(192,192,192); stop-opacity: 0.5;"
        );
        assert_eq!(svg_gradient(&Color::BLACK.into()), None);
    }

    #[test]
    fn radial_gradient_definition_uses_focal_point() {
        use strata_core::paint::RadialGradient;

        let paint = Paint::from(
            RadialGradient::new(0.0, 0.0, 0.0, 0.0, 0.0, 30.0)
                .add_color_stop(0.0, Color::WHITE)
                .add_color_stop(1.0, Color::BLACK),
        );
        let gradient = svg_gradient(&paint).unwrap();
        assert_eq!(gradient.tag, "radialGradient");
        assert_eq!(gradient.attributes[2], ("r", "30".into()));
        assert_eq!(gradient.attributes[3], ("fx", "0".into()));
        assert_eq!(gradient.stops.len(), 2);
    }

    #[test]
    fn device_pixels_round_up() {
        assert_eq!(device_pixels(767.5), 768);
        assert_eq!(device_pixels(-3.0), 0);
    }
}

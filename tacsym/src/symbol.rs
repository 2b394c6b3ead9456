// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use log::trace;
use peniko::color::{AlphaColor, Srgb, palette};
use peniko::kurbo::{Affine, Point, Rect, Vec2};
use tacsym_draw::{
    DrawBackend, DrawScope, GlyphReferences, IconImage, IconRetriever, IconSourceKey, IconTexture,
    LoadState, TexCoords, TextMetrics,
};
use tacsym_primitives::{AltitudeMode, ModifierValue, Modifiers, Offset, Position, SizeRule, keys};

use crate::attributes::ActiveAttributes;
use crate::kind::{SymbolInfo, TransformInfo};
use crate::layout::{LayoutResources, LayoutResult, Layouter, PlacedLine};
use crate::pick::{PickOwner, PickSupport, PickedObject};
use crate::queue::{DrawQueue, OrderedSymbol};
use crate::{
    FrameContext, LodSelector, PerFrameSymbolState, SymbolAttributes, SymbolContext, SymbolId,
    SymbolKind,
};

/// The icon a symbol currently draws.
#[derive(Clone, Debug, Default)]
enum ActiveIcon {
    #[default]
    None,
    /// Drawn while the first icon loads.
    Placeholder(IconImage),
    /// The last icon that loaded successfully.
    Icon {
        source: IconSourceKey,
        image: IconImage,
    },
}

impl ActiveIcon {
    fn image(&self) -> Option<&IconImage> {
        match self {
            Self::None => None,
            Self::Placeholder(image) | Self::Icon { image, .. } => Some(image),
        }
    }

    fn shows(&self, key: &IconSourceKey) -> bool {
        matches!(self, Self::Icon { source, .. } if source == key)
    }
}

/// Everything kept between frames to avoid recomputing the static layout.
#[derive(Debug, Default)]
struct LayoutCache {
    texture: Option<IconTexture>,
    active_icon: ActiveIcon,
    /// Icon and static modifiers; `None` forces a layout.
    layout: Option<LayoutResult>,
    /// The active modifiers `layout` was computed from.
    modifiers: Option<Modifiers>,
    glyph_refs: GlyphReferences,
    /// This frame's dynamic modifiers.
    dynamic: LayoutResult,
    lines: Vec<PlacedLine>,
    unresolved_glyph: bool,
    layout_count: u64,
}

/// A tactical symbol: a geographic position drawn as an icon surrounded by modifiers.
///
/// The symbol's family rules come from its [`SymbolKind`]. Everything else (position, modifiers,
/// attributes, retrievers, display switches) is set on the symbol, and every frame
/// [`render`](Self::render) decides whether the cached layout still holds before queueing the
/// symbol for drawing.
pub struct TacticalSymbol {
    kind: Box<dyn SymbolKind>,
    position: Option<Position>,
    altitude_mode: AltitudeMode,
    modifiers: Modifiers,
    icon_retriever: Option<Arc<dyn IconRetriever>>,
    modifier_retriever: Option<Arc<dyn IconRetriever>>,
    attributes: SymbolAttributes,
    highlight_attributes: Option<SymbolAttributes>,
    highlighted: bool,
    visible: bool,
    show_graphic_modifiers: bool,
    show_text_modifiers: bool,
    show_location: bool,
    show_hostile_indicator: bool,
    offset: Option<Offset>,
    icon_offset: Option<Offset>,
    icon_size: Option<SizeRule>,
    depth_offset: Option<f64>,
    delegate_owner: Option<Arc<dyn Any + Send + Sync>>,
    batch_rendering: bool,
    batch_picking: bool,
    lod: Option<Arc<dyn LodSelector>>,
    formatted_position: Option<String>,
    active_attributes: Option<ActiveAttributes>,
    cache: LayoutCache,
    frame_state: Option<PerFrameSymbolState>,
}

impl TacticalSymbol {
    /// Creates a symbol of `kind` at `position`.
    ///
    /// The altitude mode, offsets and hostile indicator default come from the kind; the batching
    /// switches come from the context's configuration.
    pub fn new(kind: impl SymbolKind + 'static, position: Position, cx: &SymbolContext) -> Self {
        let (icon_offset, icon_size) = kind.icon_layout();
        Self {
            altitude_mode: kind.initial_altitude_mode(),
            offset: kind.default_offset(),
            show_hostile_indicator: kind.default_show_hostile_indicator(),
            kind: Box::new(kind),
            position: Some(position),
            modifiers: Modifiers::new(),
            icon_retriever: None,
            modifier_retriever: None,
            attributes: SymbolAttributes::new(),
            highlight_attributes: None,
            highlighted: false,
            visible: true,
            show_graphic_modifiers: true,
            show_text_modifiers: true,
            show_location: true,
            icon_offset,
            icon_size,
            depth_offset: None,
            delegate_owner: None,
            batch_rendering: cx.config().batch_rendering,
            batch_picking: cx.config().batch_picking,
            lod: None,
            formatted_position: None,
            active_attributes: None,
            cache: LayoutCache::default(),
            frame_state: None,
        }
    }

    /// The symbol's kind.
    pub fn kind(&self) -> &dyn SymbolKind {
        &*self.kind
    }

    /// Identifier passed to the icon retriever.
    pub fn identifier(&self) -> &str {
        self.kind.identifier()
    }

    /// The geographic position.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Sets or clears the position. A symbol without a position is not drawn.
    pub fn set_position(&mut self, position: impl Into<Option<Position>>) {
        self.position = position.into();
        self.formatted_position = None;
    }

    /// Moves the symbol to `position`.
    pub fn move_to(&mut self, position: Position) {
        self.set_position(position);
    }

    /// Moves the symbol by the latitude, longitude and altitude of `delta`.
    pub fn move_by(&mut self, delta: Position) {
        if let Some(p) = self.position {
            self.set_position(p.translated(delta.latitude, delta.longitude, delta.altitude));
        }
    }

    /// How the altitude is interpreted.
    pub fn altitude_mode(&self) -> AltitudeMode {
        self.altitude_mode
    }

    /// Sets how the altitude is interpreted.
    pub fn set_altitude_mode(&mut self, mode: AltitudeMode) {
        self.altitude_mode = mode;
    }

    /// The caller's modifiers, without the implicit ones.
    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Sets a modifier.
    pub fn set_modifier(&mut self, key: impl Into<String>, value: impl Into<ModifierValue>) {
        self.modifiers.insert(key, value);
    }

    /// Removes a modifier, returning its value.
    pub fn remove_modifier(&mut self, key: &str) -> Option<ModifierValue> {
        self.modifiers.remove(key)
    }

    /// Sets where icons come from. Without one, no icon is drawn.
    pub fn set_icon_retriever(&mut self, retriever: Option<Arc<dyn IconRetriever>>) {
        self.icon_retriever = retriever;
    }

    /// Sets where modifier glyphs come from, dropping every glyph reference.
    pub fn set_modifier_retriever(&mut self, retriever: Option<Arc<dyn IconRetriever>>) {
        self.modifier_retriever = retriever;
        self.cache.glyph_refs.clear();
        self.reset();
    }

    /// The normal attributes.
    pub fn attributes(&self) -> &SymbolAttributes {
        &self.attributes
    }

    /// Mutable access to the normal attributes. Changes apply from the next frame.
    pub fn attributes_mut(&mut self) -> &mut SymbolAttributes {
        &mut self.attributes
    }

    /// Replaces the normal attributes.
    pub fn set_attributes(&mut self, attributes: SymbolAttributes) {
        self.attributes = attributes;
    }

    /// The attributes used while highlighted.
    pub fn highlight_attributes(&self) -> Option<&SymbolAttributes> {
        self.highlight_attributes.as_ref()
    }

    /// Sets the attributes used while highlighted. Without them the normal attributes are used.
    pub fn set_highlight_attributes(&mut self, attributes: Option<SymbolAttributes>) {
        self.highlight_attributes = attributes;
    }

    /// Whether the symbol is highlighted.
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Sets whether the symbol is highlighted.
    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// Whether the symbol is drawn at all.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Sets whether the symbol is drawn at all.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether graphic modifiers are drawn.
    pub fn show_graphic_modifiers(&self) -> bool {
        self.show_graphic_modifiers
    }

    /// Sets whether graphic modifiers are drawn.
    pub fn set_show_graphic_modifiers(&mut self, show: bool) {
        if self.show_graphic_modifiers != show {
            self.show_graphic_modifiers = show;
            self.reset();
        }
    }

    /// Whether text modifiers are drawn.
    pub fn show_text_modifiers(&self) -> bool {
        self.show_text_modifiers
    }

    /// Sets whether text modifiers are drawn.
    pub fn set_show_text_modifiers(&mut self, show: bool) {
        if self.show_text_modifiers != show {
            self.show_text_modifiers = show;
            self.reset();
        }
    }

    /// Whether the location and altitude modifiers are derived from the position.
    pub fn show_location(&self) -> bool {
        self.show_location
    }

    /// Sets whether the location and altitude modifiers are derived from the position.
    pub fn set_show_location(&mut self, show: bool) {
        self.show_location = show;
    }

    /// Whether hostile symbols show the `ENY` indicator.
    pub fn show_hostile_indicator(&self) -> bool {
        self.show_hostile_indicator
    }

    /// Sets whether hostile symbols show the `ENY` indicator.
    pub fn set_show_hostile_indicator(&mut self, show: bool) {
        self.show_hostile_indicator = show;
    }

    /// The point of the icon placed on the screen point.
    pub fn offset(&self) -> Option<Offset> {
        self.offset
    }

    /// Sets the point of the icon placed on the screen point. Without one, the kind decides.
    pub fn set_offset(&mut self, offset: Option<Offset>) {
        self.offset = offset;
    }

    /// Where the icon frame sits in the icon image.
    pub fn icon_offset(&self) -> Option<Offset> {
        self.icon_offset
    }

    /// Sets where the icon frame sits in the icon image.
    pub fn set_icon_offset(&mut self, offset: Option<Offset>) {
        self.icon_offset = offset;
        self.reset();
    }

    /// How the icon is sized.
    pub fn icon_size(&self) -> Option<SizeRule> {
        self.icon_size
    }

    /// Sets how the icon is sized.
    pub fn set_icon_size(&mut self, size: Option<SizeRule>) {
        self.icon_size = size;
        self.reset();
    }

    /// Depth offset applied while the symbol is drawn, replacing the context default.
    pub fn depth_offset(&self) -> Option<f64> {
        self.depth_offset
    }

    /// Sets the depth offset applied while the symbol is drawn.
    pub fn set_depth_offset(&mut self, depth_offset: Option<f64>) {
        self.depth_offset = depth_offset;
    }

    /// The object picks resolve to instead of the symbol.
    pub fn delegate_owner(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.delegate_owner.as_ref()
    }

    /// Sets the object picks resolve to instead of the symbol.
    pub fn set_delegate_owner(&mut self, owner: Option<Arc<dyn Any + Send + Sync>>) {
        self.delegate_owner = owner;
    }

    /// Whether the symbol joins draw batches.
    pub fn batch_rendering(&self) -> bool {
        self.batch_rendering
    }

    /// Sets whether the symbol joins draw batches.
    pub fn set_batch_rendering(&mut self, batch: bool) {
        self.batch_rendering = batch;
    }

    /// Whether the symbol joins pick batches.
    pub fn batch_picking(&self) -> bool {
        self.batch_picking
    }

    /// Sets whether the symbol joins pick batches.
    pub fn set_batch_picking(&mut self, batch: bool) {
        self.batch_picking = batch;
    }

    /// The level of detail selector.
    pub fn lod_selector(&self) -> Option<&Arc<dyn LodSelector>> {
        self.lod.as_ref()
    }

    /// Sets the level of detail selector.
    pub fn set_lod_selector(&mut self, lod: Option<Arc<dyn LodSelector>>) {
        self.lod = lod;
    }

    /// Discards the cached static layout; the next frame lays the symbol out again.
    pub fn reset(&mut self) {
        self.cache.layout = None;
    }

    /// Number of static layouts computed so far.
    pub fn layout_count(&self) -> u64 {
        self.cache.layout_count
    }

    /// The state of the last frame the symbol was computed for.
    pub fn frame_state(&self) -> Option<&PerFrameSymbolState> {
        self.frame_state.as_ref()
    }

    /// The cached static layout.
    pub fn layout(&self) -> Option<&LayoutResult> {
        self.cache.layout.as_ref()
    }

    /// This frame's dynamic lines.
    pub fn lines(&self) -> &[PlacedLine] {
        &self.cache.lines
    }

    /// Number of modifier glyphs the symbol references.
    pub fn glyph_reference_count(&self) -> usize {
        self.cache.glyph_refs.len()
    }

    /// Key of the icon being drawn, if a real icon has loaded.
    pub fn active_icon_source(&self) -> Option<&IconSourceKey> {
        match &self.cache.active_icon {
            ActiveIcon::Icon { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the placeholder is being drawn.
    pub fn shows_placeholder(&self) -> bool {
        matches!(self.cache.active_icon, ActiveIcon::Placeholder(_))
    }

    /// Computes this frame's state and queues the symbol if it is visible.
    ///
    /// Within one frame the state is computed once; later calls with the same frame id reuse it,
    /// unless the frame is continuous. Returns whether the symbol was queued.
    pub fn render(
        &mut self,
        id: SymbolId,
        cx: &mut SymbolContext,
        frame: &dyn FrameContext,
        text: &mut dyn TextMetrics,
        queue: &mut DrawQueue,
    ) -> bool {
        if !self.visible {
            return false;
        }
        let reuse = !frame.is_continuous()
            && self
                .frame_state
                .is_some_and(|s| s.frame_id == frame.frame_id());
        let state = match self.frame_state {
            Some(state) if reuse => state,
            _ => match self.compute_frame_state(cx, frame, text) {
                Some(state) => state,
                None => return false,
            },
        };
        if !state.intersects_frustum(frame, cx.config().max_symbol_dimension) {
            trace!("symbol {id:?} is outside the view");
            return false;
        }
        queue.push_symbol(OrderedSymbol {
            id,
            state,
            batch_rendering: self.batch_rendering,
            batch_picking: self.batch_picking,
            pick_layer: Some(id.layer),
        });
        true
    }

    fn compute_frame_state(
        &mut self,
        cx: &mut SymbolContext,
        frame: &dyn FrameContext,
        text: &mut dyn TextMetrics,
    ) -> Option<PerFrameSymbolState> {
        let Some(mut state) = self.compute_symbol_points(frame) else {
            trace!("{} has no screen point", self.identifier());
            return None;
        };
        state.frame_id = frame.frame_id();

        if !frame.is_flat_globe() && state.eye_distance > frame.horizon_distance() {
            trace!("{} is beyond the horizon", self.identifier());
            return None;
        }
        // Never laid out: test an estimated extent so off-screen symbols fetch nothing.
        if self.cache.layout.is_none()
            && !state.intersects_frustum(frame, cx.config().max_symbol_dimension)
        {
            trace!("{} is culled before layout", self.identifier());
            return None;
        }

        if let Some(lod) = self.lod.clone() {
            lod.select_lod(frame, self, state.eye_distance);
        }

        let scale = self.determine_active_attributes(cx)?.scale;
        state.scale = Vec2::new(scale, scale);

        self.update_layout(cx, frame, text, &mut state);
        self.compute_transform(&mut state);

        self.frame_state = Some(state);
        Some(state)
    }

    fn compute_symbol_points(&self, frame: &dyn FrameContext) -> Option<PerFrameSymbolState> {
        let p = self.position?;
        let place = if self.altitude_mode == AltitudeMode::ClampToGround || frame.is_flat_globe() {
            frame.terrain_point(p.latitude, p.longitude, 0.0)
        } else if self.altitude_mode == AltitudeMode::RelativeToGround {
            frame.terrain_point(p.latitude, p.longitude, p.altitude)
        } else {
            let height = p.altitude * frame.vertical_exaggeration();
            frame.globe_point(p.latitude, p.longitude, height)
        }?;
        let screen = frame.project(place)?;
        let eye_distance = place.distance(frame.eye_point());
        Some(PerFrameSymbolState::new(place, screen, eye_distance))
    }

    /// Resolves this frame's attributes, discarding the layout if they change its size.
    fn determine_active_attributes(&mut self, cx: &SymbolContext) -> Option<&ActiveAttributes> {
        let attributes = match (&self.highlight_attributes, self.highlighted) {
            (Some(highlight), true) => highlight,
            _ => &self.attributes,
        };
        let Some(active) = attributes.merged_with(cx.defaults()).resolve() else {
            // The last resolved set stays: it is what the cached layout was built with.
            trace!("{} has no usable attributes", self.identifier());
            return None;
        };
        if self
            .active_attributes
            .as_ref()
            .is_some_and(|previous| previous.affects_layout(&active))
        {
            self.reset();
        }
        self.active_attributes = Some(active);
        self.active_attributes.as_ref()
    }

    fn icon_source_key(&self) -> Option<IconSourceKey> {
        let retriever = self.icon_retriever.as_ref()?;
        let mut params = Modifiers::new();
        if let Some(color) = self.active_attributes.as_ref()?.interior_color {
            params.insert(keys::PARAM_COLOR, color);
        }
        self.kind.assemble_icon_params(&self.modifiers, &mut params);
        Some(IconSourceKey::new(retriever, self.kind.identifier(), params))
    }

    fn active_modifiers(&mut self, cx: &SymbolContext) -> Modifiers {
        if self.show_location && self.formatted_position.is_none() {
            self.formatted_position = self
                .position
                .map(|p| cx.config().units_format.lat_lon(&p));
        }
        let info = SymbolInfo {
            position: self.position.as_ref(),
            altitude_mode: self.altitude_mode,
            show_location: self.show_location,
            show_hostile_indicator: self.show_hostile_indicator,
            formatted_position: self.formatted_position.as_deref(),
            units_format: &cx.config().units_format,
        };
        let mut modifiers = self.modifiers.clone();
        self.kind.apply_implicit_modifiers(&info, &mut modifiers);
        modifiers
    }

    fn must_layout(&self, key: Option<&IconSourceKey>, modifiers: &Modifiers) -> bool {
        let cache = &self.cache;
        if cache.unresolved_glyph || cache.layout.is_none() {
            return true;
        }
        if cache.modifiers.as_ref() != Some(modifiers) {
            return true;
        }
        match (key, &cache.texture) {
            (None, None) => false,
            (Some(key), Some(texture)) if texture.source() == key => {
                // A failed icon is final; anything else settles once it is on screen.
                texture.state() != LoadState::Failed && !cache.active_icon.shows(key)
            }
            _ => true,
        }
    }

    fn update_layout(
        &mut self,
        cx: &mut SymbolContext,
        frame: &dyn FrameContext,
        text: &mut dyn TextMetrics,
        state: &mut PerFrameSymbolState,
    ) {
        let Some(attrs) = self.active_attributes.clone() else {
            return;
        };
        // A glyph evicted from the shared atlas is loaded again by a fresh layout.
        if self.cache.layout.as_ref().is_some_and(|layout| {
            layout
                .glyphs
                .iter()
                .any(|glyph| !cx.atlas.contains(&glyph.source))
        }) {
            self.cache.unresolved_glyph = true;
        }
        let modifiers = self.active_modifiers(cx);
        let key = self.icon_source_key();
        let now = frame.now();
        let draw_modifiers = self.show_graphic_modifiers || self.show_text_modifiers;

        if self.must_layout(key.as_ref(), &modifiers) || frame.is_continuous() {
            let icon_rect = self.layout_icon(cx, key);
            let res = LayoutResources {
                atlas: &mut cx.atlas,
                loader: &cx.loader,
                glyph_refs: &mut self.cache.glyph_refs,
                modifier_retriever: self.modifier_retriever.as_ref(),
                text: &mut *text,
                font: &attrs.text_font,
                label_color: attrs.label_color(),
                now,
            };
            let mut layout = Layouter::new(res, state.scale);
            if let Some(icon_rect) = icon_rect {
                layout.set_icon_rect(icon_rect);
                if draw_modifiers {
                    if self.show_graphic_modifiers {
                        self.kind.layout_graphic_modifiers(&mut layout, &modifiers);
                    }
                    layout.compute_scaled_bounds(self.kind.max_label_lines(&modifiers));
                    if self.show_text_modifiers {
                        self.kind.layout_text_modifiers(&mut layout, &modifiers);
                    }
                }
            }
            let (result, _, unresolved) = layout.finish();
            self.cache.layout = Some(result);
            self.cache.modifiers = Some(modifiers.clone());
            self.cache.unresolved_glyph = unresolved;
            self.cache.layout_count += 1;
            self.cache
                .glyph_refs
                .remove_dead(now, cx.config().max_time_since_last_used);
        }

        let Some(cached) = &self.cache.layout else {
            return;
        };
        let res = LayoutResources {
            atlas: &mut cx.atlas,
            loader: &cx.loader,
            glyph_refs: &mut self.cache.glyph_refs,
            modifier_retriever: self.modifier_retriever.as_ref(),
            text,
            font: &attrs.text_font,
            label_color: attrs.label_color(),
            now,
        };
        let mut layout = Layouter::dynamic(res, state.scale, cached);
        if self.show_graphic_modifiers {
            self.kind
                .layout_dynamic_modifiers(&mut layout, &modifiers, frame, state);
        }
        let (dynamic, lines, unresolved) = layout.finish();
        state.screen_rect = dynamic.screen_rect;
        state.layout_rect = dynamic.layout_rect;
        self.cache.dynamic = dynamic;
        self.cache.lines = lines;
        self.cache.unresolved_glyph |= unresolved;
    }

    /// Advances the icon texture and returns the icon rectangle, if there is an icon to draw.
    fn layout_icon(&mut self, cx: &SymbolContext, key: Option<IconSourceKey>) -> Option<Rect> {
        let Some(key) = key else {
            self.cache.texture = None;
            return None;
        };
        if self.cache.texture.as_ref().map(IconTexture::source) != Some(&key) {
            // Dropping the old texture cancels its request.
            self.cache.texture = Some(IconTexture::new(key));
        }
        let texture = self.cache.texture.as_mut()?;
        if texture.load(&cx.loader) && !self.cache.active_icon.shows(texture.source()) {
            if let Some(image) = texture.image() {
                self.cache.active_icon = ActiveIcon::Icon {
                    source: texture.source().clone(),
                    image: image.clone(),
                };
            }
        }
        match (&self.cache.active_icon, texture.state()) {
            (ActiveIcon::Icon { .. }, _) => {}
            (_, LoadState::Failed) => self.cache.active_icon = ActiveIcon::None,
            _ => {
                self.cache.active_icon = cx
                    .config()
                    .placeholder
                    .clone()
                    .map_or(ActiveIcon::None, ActiveIcon::Placeholder);
            }
        }

        let native = self.cache.active_icon.image()?.size();
        let origin = self
            .icon_offset
            .map_or(Vec2::ZERO, |o| o.compute(native.width, native.height, None, None));
        let size = self
            .icon_size
            .map_or(native, |rule| rule.compute(native, native));
        Some(Rect::from_origin_size(
            (origin.x.trunc(), origin.y.trunc()),
            size,
        ))
    }

    fn compute_transform(&self, state: &mut PerFrameSymbolState) {
        let icon = self.cache.layout.as_ref().and_then(|l| l.icon_rect);
        state.offset = match (self.offset, icon) {
            (Some(offset), Some(icon)) => {
                let p = offset.compute(icon.width(), icon.height(), None, None);
                Vec2::new(-icon.x0 - p.x, -icon.y0 - p.y)
            }
            _ => Vec2::ZERO,
        };
        if let Some(icon_rect) = icon {
            let info = TransformInfo {
                has_offset: self.offset.is_some(),
                icon_rect,
                layout_rect: state.layout_rect,
            };
            if let Some(offset) = self.kind.adjust_transform(&info) {
                state.offset = offset;
            }
        }
    }

    /// Draws the symbol as computed for `state` inside an open scope.
    ///
    /// In a pick scope every part is drawn in a fresh pick color, which is registered with
    /// `pick`; labels are skipped.
    pub(crate) fn draw<B: DrawBackend + ?Sized>(
        &self,
        id: SymbolId,
        cx: &mut SymbolContext,
        scope: &mut DrawScope<'_, B>,
        state: &PerFrameSymbolState,
        pick: Option<&mut PickSupport>,
    ) {
        let (Some(attrs), Some(layout)) = (&self.active_attributes, &self.cache.layout) else {
            return;
        };
        let pick_color = pick.map(|pick| {
            let color = pick.unique_color();
            let owner = match &self.delegate_owner {
                Some(owner) => PickOwner::Delegate(owner.clone()),
                None => PickOwner::Symbol(id),
            };
            pick.add_candidate(PickedObject {
                color,
                owner,
                layer: None,
                position: self.position,
            });
            pick_rgb(color)
        });
        let opacity = attrs.opacity_f32();
        let tint = pick_color.unwrap_or(palette::css::WHITE.with_alpha(opacity));

        if let Some(depth_offset) = self.depth_offset {
            scope.set_depth_offset(depth_offset);
        }

        let sp = state.screen_point;
        let depth = sp.z;
        let transform = Affine::translate((sp.x, sp.y))
            * Affine::scale_non_uniform(state.scale.x, state.scale.y)
            * Affine::translate(state.offset);

        if let (Some(image), Some(rect)) = (self.cache.active_icon.image(), layout.icon_rect) {
            if !is_degenerate(rect) && scope.bind_icon(image) {
                scope.draw_unit_quad(transform * rect_transform(rect), depth, TexCoords::FULL, tint);
            }
        }

        let mut glyphs = layout.glyphs.iter().chain(&self.cache.dynamic.glyphs).peekable();
        if glyphs.peek().is_some() && cx.atlas.bind(&mut **scope) {
            for glyph in glyphs {
                if is_degenerate(glyph.rect) {
                    continue;
                }
                let Some(tex_coords) = cx.atlas.tex_coords(&glyph.source) else {
                    continue;
                };
                scope.draw_unit_quad(transform * rect_transform(glyph.rect), depth, tex_coords, tint);
            }
        }

        if !self.cache.lines.is_empty() {
            let line_color = pick_color.unwrap_or(palette::css::BLACK.with_alpha(opacity));
            let line_depth = (depth - cx.config().line_depth_bias).clamp(0.0, 1.0);
            for line in &self.cache.lines {
                scope.draw_line_strip(transform, line_depth, &line.points, line_color);
            }
        }

        if !scope.is_picking() {
            let origin = Point::new(
                sp.x + state.offset.x * state.scale.x,
                sp.y + state.offset.y * state.scale.y,
            );
            for label in layout.labels.iter().chain(&self.cache.dynamic.labels) {
                scope.draw_text(
                    origin + label.origin.to_vec2(),
                    depth,
                    &label.text,
                    &label.font,
                    label.color,
                );
            }
        }

        if self.depth_offset.is_some() {
            scope.set_depth_offset(cx.config().default_depth_offset);
        }
    }
}

/// Maps the unit square onto `rect`.
fn rect_transform(rect: Rect) -> Affine {
    Affine::translate((rect.x0, rect.y0)) * Affine::scale_non_uniform(rect.width(), rect.height())
}

fn is_degenerate(rect: Rect) -> bool {
    !(rect.width() > 0.0 && rect.height() > 0.0)
}

/// An opaque color carrying a `0xRRGGBB` pick color.
fn pick_rgb(color: u32) -> AlphaColor<Srgb> {
    let [_, r, g, b] = color.to_be_bytes();
    AlphaColor::from_rgba8(r, g, b, 255)
}

impl fmt::Debug for TacticalSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TacticalSymbol")
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("altitude_mode", &self.altitude_mode)
            .field("modifiers", &self.modifiers)
            .field("attributes", &self.attributes)
            .field("highlighted", &self.highlighted)
            .field("visible", &self.visible)
            .field("offset", &self.offset)
            .field("layout_count", &self.cache.layout_count)
            .field("frame_state", &self.frame_state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_rgb_round_trips_channels() {
        let rgba = pick_rgb(0x0012_3456).to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b, rgba.a), (0x12, 0x34, 0x56, 0xff));
    }

    #[test]
    fn test_degenerate_rects() {
        assert!(is_degenerate(Rect::new(0.0, 0.0, 0.0, 5.0)));
        assert!(is_degenerate(Rect::new(0.0, 0.0, f64::NAN, 5.0)));
        assert!(!is_degenerate(Rect::new(0.0, 0.0, 1.0, 1.0)));
    }
}

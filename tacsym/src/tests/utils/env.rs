// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use peniko::color::{AlphaColor, Srgb, palette};
use peniko::kurbo::{Affine, Point, Rect};
use tacsym_draw::{
    AtlasSurface, DrawBackend, FontSpec, IconImage, IconLoader, IconRetriever, LoadExecutor,
    LoadTask, RetrieveError, TexCoords, TextMetrics,
};
use tacsym_primitives::{Modifiers, Position, Vec3, keys};

use crate::{
    FrameContext, LayerId, SymbolConfig, SymbolContext, SymbolId, SymbolLayer, TacticalSymbol,
    UnitSymbol,
};

/// Symbol id the [`CountingRetriever`] knows nothing about.
pub(crate) const UNKNOWN_SYMBOL: &str = "SUZP-----------";

/// A flat test globe seen from straight above the origin.
///
/// Model space is `(longitude * 100, latitude * 100, height)`; the screen is the model
/// translated by `(400, 300)` with a constant depth of 0.5.
#[derive(Clone, Debug)]
pub(crate) struct MockGlobe {
    pub(crate) frame_id: u64,
    pub(crate) now: Duration,
    pub(crate) continuous: bool,
    pub(crate) picking: bool,
    pub(crate) pick_rects: Vec<Rect>,
    pub(crate) horizon: f64,
    pub(crate) eye: Vec3,
}

impl Default for MockGlobe {
    fn default() -> Self {
        Self {
            frame_id: 0,
            now: Duration::ZERO,
            continuous: false,
            picking: false,
            pick_rects: Vec::new(),
            horizon: 1e9,
            eye: Vec3::new(0.0, 0.0, 1000.0),
        }
    }
}

impl FrameContext for MockGlobe {
    fn frame_id(&self) -> u64 {
        self.frame_id
    }

    fn is_continuous(&self) -> bool {
        self.continuous
    }

    fn is_picking(&self) -> bool {
        self.picking
    }

    fn now(&self) -> Duration {
        self.now
    }

    fn terrain_point(&self, latitude: f64, longitude: f64, height: f64) -> Option<Vec3> {
        Some(Vec3::new(longitude * 100.0, latitude * 100.0, height))
    }

    fn globe_point(&self, latitude: f64, longitude: f64, height: f64) -> Option<Vec3> {
        self.terrain_point(latitude, longitude, height)
    }

    fn project(&self, point: Vec3) -> Option<Vec3> {
        Some(Vec3::new(point.x + 400.0, point.y + 300.0, 0.5))
    }

    fn eye_point(&self) -> Vec3 {
        self.eye
    }

    fn horizon_distance(&self) -> f64 {
        self.horizon
    }

    fn depth_range_contains(&self, _point: Vec3) -> bool {
        true
    }

    fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn pick_rects(&self) -> &[Rect] {
        &self.pick_rects
    }

    fn surface_direction(&self, _point: Vec3, heading: f64) -> Vec3 {
        let h = heading.to_radians();
        Vec3::new(h.sin(), h.cos(), 0.0)
    }

    fn pixel_size_at_distance(&self, _distance: f64) -> f64 {
        1.0
    }
}

/// A backend call, as recorded by [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Op {
    Begin { picking: bool },
    End,
    DepthOffset(f64),
    BindIcon { width: u32, height: u32 },
    BindAtlas,
    Quad { color: AlphaColor<Srgb> },
    Line { points: usize },
    Text(String),
    ReadPick,
}

/// Records every call. Text is 7 pixels per character, from 2 below the baseline to 8 above.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub(crate) ops: Vec<Op>,
    pub(crate) pick_color: Option<u32>,
}

impl RecordingBackend {
    pub(crate) fn count(&self, matches: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| matches(op)).count()
    }

    pub(crate) fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl TextMetrics for RecordingBackend {
    fn measure_text(&mut self, text: &str, _font: &FontSpec) -> Rect {
        let width = 7.0 * f64::from(u32::try_from(text.chars().count()).unwrap());
        Rect::new(0.0, -2.0, width, 8.0)
    }
}

impl DrawBackend for RecordingBackend {
    fn begin_drawing(&mut self, picking: bool) {
        self.ops.push(Op::Begin { picking });
    }

    fn end_drawing(&mut self) {
        self.ops.push(Op::End);
    }

    fn set_depth_offset(&mut self, units: f64) {
        self.ops.push(Op::DepthOffset(units));
    }

    fn bind_icon(&mut self, image: &IconImage) -> bool {
        self.ops.push(Op::BindIcon {
            width: image.width(),
            height: image.height(),
        });
        true
    }

    fn bind_atlas(&mut self, _surface: AtlasSurface<'_>) -> bool {
        self.ops.push(Op::BindAtlas);
        true
    }

    fn draw_unit_quad(
        &mut self,
        _transform: Affine,
        _depth: f64,
        _tex_coords: TexCoords,
        color: AlphaColor<Srgb>,
    ) {
        self.ops.push(Op::Quad { color });
    }

    fn draw_line_strip(
        &mut self,
        _transform: Affine,
        _depth: f64,
        points: &[Point],
        _color: AlphaColor<Srgb>,
    ) {
        self.ops.push(Op::Line {
            points: points.len(),
        });
    }

    fn draw_text(
        &mut self,
        _origin: Point,
        _depth: f64,
        text: &str,
        _font: &FontSpec,
        _color: AlphaColor<Srgb>,
    ) {
        self.ops.push(Op::Text(text.to_owned()));
    }

    fn read_pick_color(&mut self, _point: Point) -> Option<u32> {
        self.ops.push(Op::ReadPick);
        self.pick_color
    }
}

/// Draws every symbol as a solid square and counts the calls.
///
/// [`UNKNOWN_SYMBOL`] and icons requested with `show_icon` off have no image.
#[derive(Debug)]
pub(crate) struct CountingRetriever {
    id: &'static str,
    size: u32,
    calls: AtomicUsize,
}

impl CountingRetriever {
    pub(crate) fn new(id: &'static str, size: u32) -> Arc<Self> {
        Arc::new(Self {
            id,
            size,
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IconRetriever for CountingRetriever {
    fn retriever_id(&self) -> &str {
        self.id
    }

    fn create_icon(
        &self,
        symbol_id: &str,
        params: &Modifiers,
    ) -> Result<Option<IconImage>, RetrieveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if symbol_id == UNKNOWN_SYMBOL || params.flag(keys::SHOW_ICON) == Some(false) {
            return Ok(None);
        }
        Ok(IconImage::solid(self.size, self.size, palette::css::BLUE))
    }
}

/// Holds tasks until the test runs them.
#[derive(Clone, Default)]
pub(crate) struct ManualExecutor {
    tasks: Arc<Mutex<Vec<LoadTask>>>,
}

impl ManualExecutor {
    pub(crate) fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub(crate) fn run_all(&self) -> usize {
        let tasks = core::mem::take(&mut *self.tasks.lock().unwrap());
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }
}

impl LoadExecutor for ManualExecutor {
    fn try_spawn(&self, task: LoadTask) -> bool {
        self.tasks.lock().unwrap().push(task);
        true
    }
}

/// A scene with one layer, a test globe and a recording backend.
pub(crate) struct TestEnv {
    pub(crate) cx: SymbolContext,
    pub(crate) globe: MockGlobe,
    pub(crate) backend: RecordingBackend,
    pub(crate) layer: SymbolLayer,
    pub(crate) icons: Arc<CountingRetriever>,
    pub(crate) glyphs: Arc<CountingRetriever>,
}

impl TestEnv {
    pub(crate) fn new() -> Self {
        Self::with_loader(SymbolConfig::default(), IconLoader::immediate())
    }

    pub(crate) fn with_loader(config: SymbolConfig, loader: IconLoader) -> Self {
        Self {
            cx: SymbolContext::new(config, loader).unwrap(),
            globe: MockGlobe::default(),
            backend: RecordingBackend::default(),
            layer: SymbolLayer::new(LayerId(0)),
            icons: CountingRetriever::new("icons", 32),
            glyphs: CountingRetriever::new("glyphs", 8),
        }
    }

    /// A unit symbol with both retrievers set.
    pub(crate) fn unit(&self, code: &str, latitude: f64, longitude: f64) -> TacticalSymbol {
        let kind = UnitSymbol::new(code).unwrap();
        let mut symbol =
            TacticalSymbol::new(kind, Position::new(latitude, longitude, 0.0), &self.cx);
        let icons: Arc<dyn IconRetriever> = self.icons.clone();
        let glyphs: Arc<dyn IconRetriever> = self.glyphs.clone();
        symbol.set_icon_retriever(Some(icons));
        symbol.set_modifier_retriever(Some(glyphs));
        symbol
    }

    /// Adds a unit symbol at the centre of the view.
    pub(crate) fn add_unit(&mut self, code: &str) -> SymbolId {
        let symbol = self.unit(code, 0.0, 0.0);
        self.layer.add(symbol)
    }

    pub(crate) fn symbol(&self, id: SymbolId) -> &TacticalSymbol {
        self.layer.get(id).unwrap()
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> &mut TacticalSymbol {
        self.layer.get_mut(id).unwrap()
    }

    pub(crate) fn next_frame(&mut self) {
        self.globe.frame_id += 1;
    }

    /// Renders the layer in the current frame, returning how many symbols were queued.
    pub(crate) fn render(&mut self) -> usize {
        let mut queue = crate::DrawQueue::new();
        self.layer
            .render(&mut self.cx, &self.globe, &mut self.backend, &mut queue)
    }

    /// Advances the frame and renders.
    pub(crate) fn render_frame(&mut self) -> usize {
        self.next_frame();
        self.render()
    }

    /// Advances the frame and draws the layer, returning the number of symbols drawn.
    pub(crate) fn draw_frame(&mut self) -> usize {
        self.next_frame();
        self.layer
            .draw(&mut self.cx, &self.globe, &mut self.backend)
    }

    /// Advances the frame and picks at the centre of the view.
    pub(crate) fn pick_frame(&mut self) -> Option<crate::PickedObject> {
        self.next_frame();
        self.globe.picking = true;
        self.globe.pick_rects = vec![Rect::new(395.0, 295.0, 405.0, 305.0)];
        let picked = self.layer.pick(
            &mut self.cx,
            &self.globe,
            &mut self.backend,
            Point::new(400.0, 300.0),
        );
        self.globe.picking = false;
        self.globe.pick_rects.clear();
        picked
    }
}

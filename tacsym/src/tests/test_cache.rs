// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use peniko::color::palette;
use tacsym_draw::{IconImage, IconRetriever, RetrieveError};
use tacsym_primitives::{ModifierValue, Modifiers, keys};

use super::utils::{Op, TestEnv};
use crate::{ErrorKind, FrameContext, LodSelector, SymbolAttributes, TacticalSymbol};

const INFANTRY: &str = "SFGPUCI----D---";
const MISSING_CODE: &str = "MO";

#[derive(Debug, Default)]
struct CountingLod(AtomicUsize);

impl LodSelector for CountingLod {
    fn select_lod(&self, _frame: &dyn FrameContext, _symbol: &mut TacticalSymbol, _eye: f64) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Finds every modifier glyph except one.
#[derive(Debug, Default)]
struct MissingGlyph(AtomicUsize);

impl IconRetriever for MissingGlyph {
    fn retriever_id(&self) -> &str {
        "missing-glyph"
    }

    fn create_icon(
        &self,
        symbol_id: &str,
        _params: &Modifiers,
    ) -> Result<Option<IconImage>, RetrieveError> {
        if symbol_id != MISSING_CODE {
            return Ok(IconImage::solid(8, 8, palette::css::BLACK));
        }
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

#[test]
fn layout_is_reused_across_frames() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);

    for _ in 0..5 {
        assert_eq!(env.render_frame(), 1);
    }
    let symbol = env.symbol(id);
    assert_eq!(symbol.layout_count(), 1);
    assert_eq!(env.icons.calls(), 1);
    assert!(symbol.layout().unwrap().icon_rect.is_some());
}

#[test]
fn modifier_change_triggers_layout() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    env.render_frame();

    env.symbol_mut(id)
        .set_modifier(keys::UNIQUE_DESIGNATION, "A-1");
    env.render_frame();
    assert_eq!(env.symbol(id).layout_count(), 2);

    // Same value again: nothing to do.
    env.symbol_mut(id)
        .set_modifier(keys::UNIQUE_DESIGNATION, "A-1");
    env.render_frame();
    assert_eq!(env.symbol(id).layout_count(), 2);
}

#[test]
fn frame_state_is_computed_once_per_frame() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    let lod = Arc::new(CountingLod::default());
    env.symbol_mut(id).set_lod_selector(Some(lod.clone()));

    env.render_frame();
    env.render();
    env.render();
    assert_eq!(lod.0.load(Ordering::SeqCst), 1);

    env.render_frame();
    assert_eq!(lod.0.load(Ordering::SeqCst), 2);
    assert_eq!(env.symbol(id).frame_state().unwrap().frame_id, env.globe.frame_id);
}

#[test]
fn continuous_frames_always_lay_out() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    let lod = Arc::new(CountingLod::default());
    env.symbol_mut(id).set_lod_selector(Some(lod.clone()));
    env.globe.continuous = true;

    env.render_frame();
    env.render();
    env.render();
    assert_eq!(lod.0.load(Ordering::SeqCst), 3);
    assert_eq!(env.symbol(id).layout_count(), 3);
    // The icon itself is only retrieved once.
    assert_eq!(env.icons.calls(), 1);
}

#[test]
fn unused_glyph_references_expire() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);

    env.render_frame();
    assert!(env.symbol(id).glyph_reference_count() > 0);
    let glyphs_in_atlas = env.cx.atlas().len();
    assert!(glyphs_in_atlas > 0);

    // Laid out again without graphic modifiers, but still young.
    env.globe.now = Duration::from_secs(5);
    env.symbol_mut(id).set_show_graphic_modifiers(false);
    env.render_frame();
    assert_eq!(env.symbol(id).layout_count(), 2);
    assert!(env.symbol(id).glyph_reference_count() > 0);

    env.globe.now = Duration::from_secs(20);
    env.symbol_mut(id).set_show_text_modifiers(false);
    env.render_frame();
    assert_eq!(env.symbol(id).layout_count(), 3);
    assert_eq!(env.symbol(id).glyph_reference_count(), 0);
    // Expiring a reference leaves the atlas alone.
    assert_eq!(env.cx.atlas().len(), glyphs_in_atlas);
}

#[test]
fn glyphs_are_shared_through_the_atlas() {
    let mut env = TestEnv::new();
    env.add_unit(INFANTRY);
    env.render_frame();
    let calls = env.glyphs.calls();
    assert!(calls > 0);

    env.add_unit(INFANTRY);
    assert_eq!(env.draw_frame(), 2);
    assert_eq!(env.glyphs.calls(), calls);
    assert_eq!(env.cx.atlas().cache_misses(), 0);
    assert!(env.cx.atlas().cache_hits() > 0);
}

#[test]
fn invalid_opacity_is_rejected_and_valid_opacity_relays_out() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    env.render_frame();

    let err = env
        .symbol_mut(id)
        .attributes_mut()
        .set_opacity(Some(1.5))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OpacityOutOfRange);
    env.render_frame();
    assert_eq!(env.symbol(id).layout_count(), 1);

    env.symbol_mut(id)
        .attributes_mut()
        .set_opacity(Some(0.5))
        .unwrap();
    env.render_frame();
    let symbol = env.symbol(id);
    assert_eq!(symbol.layout_count(), 2);
    let labels = &symbol.layout().unwrap().labels;
    assert!(!labels.is_empty());
    assert!(labels.iter().all(|label| label.color.components[3] == 0.5));
}

#[test]
fn highlight_switches_attributes() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    let mut highlight = SymbolAttributes::new();
    highlight.set_scale(Some(2.0)).unwrap();
    env.symbol_mut(id).set_highlight_attributes(Some(highlight));
    env.render_frame();
    assert_eq!(env.symbol(id).frame_state().unwrap().scale.x, 1.0);

    env.symbol_mut(id).set_highlighted(true);
    env.render_frame();
    let symbol = env.symbol(id);
    assert_eq!(symbol.frame_state().unwrap().scale.x, 2.0);
    assert_eq!(symbol.layout_count(), 2);
}

#[test]
fn layout_is_deterministic() {
    let mut first = TestEnv::new();
    let mut second = TestEnv::new();
    for env in [&mut first, &mut second] {
        let a = env.add_unit(INFANTRY);
        env.symbol_mut(a)
            .set_modifier(keys::UNIQUE_DESIGNATION, "A-1");
        env.symbol_mut(a)
            .set_modifier(keys::DIRECTION_OF_MOVEMENT, ModifierValue::Angle(45.0));
        let b = env.add_unit("SHAPMF---------");
        env.symbol_mut(b).set_modifier(keys::SPEED, "300 KT");
        env.draw_frame();
    }

    for ((_, a), (_, b)) in first.layer.iter().zip(second.layer.iter()) {
        assert_eq!(a.layout(), b.layout());
        assert_eq!(a.lines(), b.lines());
        assert_eq!(a.frame_state(), b.frame_state());
    }
    assert_eq!(first.backend.ops, second.backend.ops);
}

#[test]
fn missing_glyph_relays_out_every_frame() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    let missing = Arc::new(MissingGlyph::default());
    let glyphs: Arc<dyn IconRetriever> = missing.clone();
    let symbol = env.symbol_mut(id);
    symbol.set_modifier_retriever(Some(glyphs));
    symbol.set_modifier(keys::MOBILITY, MISSING_CODE);
    symbol.set_modifier(keys::AUXILIARY_EQUIPMENT, "NS");
    symbol.set_modifier(keys::UNIQUE_DESIGNATION, "A-1");

    for frame in 1..=3 {
        env.backend.ops.clear();
        assert_eq!(env.draw_frame(), 1);
        assert_eq!(env.symbol(id).layout_count(), frame);

        // Everything else still draws: the icon and the glyphs that did load.
        let layout = env.symbol(id).layout().unwrap();
        assert!(!layout.glyphs.is_empty());
        assert!(
            layout
                .glyphs
                .iter()
                .all(|glyph| glyph.source.symbol_id() != MISSING_CODE)
        );
        assert!(env.backend.ops.contains(&Op::BindIcon {
            width: 32,
            height: 32
        }));
        let quads = env.backend.count(|op| matches!(op, Op::Quad { .. }));
        assert_eq!(quads, 1 + layout.glyphs.len());
        assert!(env.backend.texts().contains(&"A-1"));
    }
    // The failed glyph is retried by layout, never by the retriever.
    assert_eq!(missing.0.load(Ordering::SeqCst), 1);
}

#[test]
fn evicted_glyph_is_reloaded() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    env.symbol_mut(id).set_modifier(keys::AUXILIARY_EQUIPMENT, "NS");
    env.render_frame();
    let source = env.symbol(id).layout().unwrap().glyphs[0].source.clone();
    let calls = env.glyphs.calls();

    env.render_frame();
    assert_eq!(env.symbol(id).layout_count(), 1);

    assert!(env.cx.atlas_mut().remove(&source));
    env.render_frame();
    assert_eq!(env.symbol(id).layout_count(), 2);
    assert_eq!(env.glyphs.calls(), calls + 1);
    assert!(env.cx.atlas_mut().contains(&source));

    env.render_frame();
    assert_eq!(env.symbol(id).layout_count(), 2);
}

#[test]
fn unresolvable_attributes_keep_the_last_resolved_set() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    assert_eq!(env.render_frame(), 1);
    assert_eq!(env.symbol(id).layout_count(), 1);

    // Nothing to fall back on: the symbol is skipped.
    env.cx.set_defaults(SymbolAttributes::new());
    assert_eq!(env.render_frame(), 0);

    // The new scale is compared with what the cached layout was built with.
    let mut defaults = SymbolAttributes::defaults();
    defaults.set_scale(Some(2.0)).unwrap();
    env.cx.set_defaults(defaults);
    assert_eq!(env.render_frame(), 1);
    let symbol = env.symbol(id);
    assert_eq!(symbol.layout_count(), 2);
    assert_eq!(symbol.frame_state().unwrap().scale.x, 2.0);
}

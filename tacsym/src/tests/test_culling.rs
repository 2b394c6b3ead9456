// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use super::utils::TestEnv;
use crate::DistanceLod;

const INFANTRY: &str = "SFGPUCI----D---";

#[test]
fn symbol_beyond_horizon_is_not_queued() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    assert_eq!(env.render_frame(), 1);
    assert_eq!(env.symbol(id).layout_count(), 1);

    // The layout is cached, but the symbol has dropped behind the horizon.
    env.globe.horizon = 10.0;
    assert_eq!(env.render_frame(), 0);
    assert_eq!(env.symbol(id).layout_count(), 1);
    assert_eq!(env.icons.calls(), 1);

    env.globe.horizon = 1e6;
    assert_eq!(env.render_frame(), 1);
}

#[test]
fn never_laid_out_beyond_horizon() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    env.globe.horizon = 10.0;

    assert_eq!(env.render_frame(), 0);
    assert_eq!(env.symbol(id).layout_count(), 0);
    assert_eq!(env.icons.calls(), 0);
}

#[test]
fn off_screen_symbol_never_retrieves() {
    let mut env = TestEnv::new();
    let symbol = env.unit(INFANTRY, 0.0, 10.0);
    let id = env.layer.add(symbol);

    for _ in 0..3 {
        assert_eq!(env.render_frame(), 0);
    }
    assert_eq!(env.symbol(id).layout_count(), 0);
    assert_eq!(env.icons.calls(), 0);
    assert_eq!(env.glyphs.calls(), 0);

    env.symbol_mut(id).move_by(tacsym_primitives::Position::new(0.0, -10.0, 0.0));
    assert_eq!(env.render_frame(), 1);
    assert_eq!(env.icons.calls(), 1);
}

#[test]
fn estimated_extent_keeps_edge_symbols() {
    let mut env = TestEnv::new();
    // Screen x is 850, just past the right edge but within half the estimated extent.
    let symbol = env.unit(INFANTRY, 0.0, 4.5);
    let id = env.layer.add(symbol);

    env.render_frame();
    assert_eq!(env.symbol(id).layout_count(), 1);
}

#[test]
fn invisible_symbol_is_skipped() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    env.symbol_mut(id).set_visible(false);

    assert_eq!(env.render_frame(), 0);
    assert!(env.symbol(id).frame_state().is_none());
}

#[test]
fn distance_lod_hides_text() {
    let mut env = TestEnv::new();
    let id = env.add_unit(INFANTRY);
    // The symbol is 1000 m from the eye.
    let near = Arc::new(DistanceLod::new(500.0).unwrap());
    env.symbol_mut(id).set_lod_selector(Some(near));
    env.render_frame();
    let symbol = env.symbol(id);
    assert!(!symbol.show_text_modifiers());
    assert!(symbol.layout().unwrap().labels.is_empty());

    let far = Arc::new(DistanceLod::new(5000.0).unwrap());
    env.symbol_mut(id).set_lod_selector(Some(far));
    env.render_frame();
    let symbol = env.symbol(id);
    assert!(symbol.show_text_modifiers());
    assert!(!symbol.layout().unwrap().labels.is_empty());
    assert_eq!(symbol.layout_count(), 2);
}

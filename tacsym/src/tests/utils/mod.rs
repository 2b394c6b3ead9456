// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod env;

pub(crate) use env::{ManualExecutor, Op, TestEnv, UNKNOWN_SYMBOL};

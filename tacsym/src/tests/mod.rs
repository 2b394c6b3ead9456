// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_cache;
mod test_culling;
mod utils;

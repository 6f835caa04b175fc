// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subcommand implementations

pub mod completions;
pub mod plan;
pub mod up;

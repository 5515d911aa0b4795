// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties of the constraint algebra that every rule relies on when its
//! requirements are merged with those of other rules.

mod condition_algebra;

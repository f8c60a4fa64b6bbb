// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Maestro integration tests.
//!
//! Provides [`MockProvider`] for scripted model replies and
//! [`seeded_database`] for a small SQLite fixture.

pub mod fixtures;
pub mod mock_provider;

pub use fixtures::{seeded_database, SeededDatabase, SEED_SQL};
pub use mock_provider::MockProvider;

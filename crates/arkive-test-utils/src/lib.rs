// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Arkive integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests without
//! GitHub or Telegram.
//!
//! # Components
//!
//! - [`MemoryBlobStore`] - versioned in-memory blob store with conflict
//!   detection, a configurable large-content threshold, and failure injection
//! - [`MockNotifier`] - recording notifier with per-message delete failures

pub mod memory_store;
pub mod mock_notifier;

pub use memory_store::MemoryBlobStore;
pub use mock_notifier::{MockNotifier, SentMessage};

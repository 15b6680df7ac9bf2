// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Both traits use `#[async_trait]` so implementations can be shared as
//! `Arc<dyn Trait>` between the gateway, the archiver, and the scheduler.

pub mod blob_store;
pub mod notifier;

pub use blob_store::BlobStore;
pub use notifier::Notifier;

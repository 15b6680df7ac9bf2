// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Arkive archive bot.
//!
//! Receives Telegram webhook updates and hands them to the [`Archiver`],
//! exposes the deletion sweep as an authenticated trigger for external
//! schedulers, and serves a health probe.
//!
//! [`Archiver`]: arkive_agent::Archiver

pub mod auth;
pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, build_router, start_server};

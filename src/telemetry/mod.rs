// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Logging infrastructure.
//!
//! Initialize once at startup:
//!
//! ```rust,ignore
//! use codesmith::telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::from_flags(verbose, debug))?;
//! ```
//!
//! Pipeline stages carry `#[instrument]` spans behind the `telemetry`
//! feature. Record conversation ids, filenames, models and sizes; never
//! record credentials or prompt bodies.

mod init;

pub use init::{init_telemetry, TelemetryConfig};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docwerk core: types, tool catalog and error definitions shared across all
// crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod tools;
pub mod types;

pub use config::{AppConfig, WatermarkStyle};
pub use error::{DocwerkError, ErrorKind, Result};
pub use tools::{CATALOG, Cardinality, Operation, ToolDescriptor, ToolId};
pub use types::*;

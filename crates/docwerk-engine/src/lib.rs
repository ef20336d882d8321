// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docwerk-engine: orchestration for Docwerk tools.
//
// Validates a tool's input batch, dispatches it to the transformation library
// on a blocking worker, packages the output as a fingerprinted artifact, and
// tracks each tool's processing state for the presentation shell.

pub mod dispatch;
pub mod intake;
pub mod integrity;
pub mod logging;
pub mod package;
pub mod session;
pub mod transform;

pub use dispatch::Dispatcher;
pub use intake::{OperationRequest, TypedFile, validate};
pub use package::{Artifact, ArtifactId, ArtifactStore, Output, ResultPackager};
pub use session::{Failure, OperationResult, ProcessingState, ToolSession};
pub use transform::{LibraryTransformer, Transformer};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-tool processing session: the state the presentation shell renders.
//
//   Idle --select--> Selecting --confirm--> Processing --> Succeeded | Failed
//
// `reset` returns to Idle from anywhere. The state record sits behind a
// `std::sync::Mutex` that is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::human_errors::{HumanError, humanize_error};
use docwerk_core::{ErrorKind, FileInput, OperationParams, ToolId};
use tracing::{Instrument, debug, info, instrument, warn};

use crate::dispatch::Dispatcher;
use crate::intake;
use crate::package::{Artifact, ArtifactStore};
use crate::transform::{LibraryTransformer, Transformer};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    /// Nothing staged.
    Idle,
    /// Files staged, waiting for confirmation.
    Selecting,
    /// An operation is in flight.
    Processing,
    /// The last operation produced an artifact.
    Succeeded,
    /// The last operation failed; the staged files are kept for a retry.
    Failed,
}

/// A failure recorded on the session for display.
#[derive(Debug, Clone)]
pub struct Failure {
    pub kind: ErrorKind,
    /// Technical description, including the underlying cause.
    pub detail: String,
    pub human: HumanError,
}

impl Failure {
    fn from_error(err: &DocwerkError) -> Self {
        Self {
            kind: err.kind(),
            detail: err.to_string(),
            human: humanize_error(err),
        }
    }
}

/// Outcome of a confirmed operation.
#[derive(Debug, Clone)]
pub enum OperationResult {
    Artifact(Artifact),
    Failed(Failure),
}

impl OperationResult {
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Artifact(artifact) => Some(artifact),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Artifact(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

struct SessionInner {
    state: ProcessingState,
    staged: Vec<FileInput>,
    params: OperationParams,
    outcome: Option<OperationResult>,
    /// Bumped by every reset; an operation whose epoch no longer matches has
    /// been detached.
    epoch: u64,
    /// Set while a transformation runs, including one detached by a reset.
    in_flight: bool,
}

impl Default for SessionInner {
    fn default() -> Self {
        Self {
            state: ProcessingState::Idle,
            staged: Vec::new(),
            params: OperationParams::default(),
            outcome: None,
            epoch: 0,
            in_flight: false,
        }
    }
}

/// One tool's selection, processing flag, and last outcome.
///
/// Clones share the same state.
pub struct ToolSession<T: Transformer = LibraryTransformer> {
    tool: ToolId,
    dispatcher: Dispatcher<T>,
    inner: Arc<Mutex<SessionInner>>,
}

impl<T: Transformer> Clone for ToolSession<T> {
    fn clone(&self) -> Self {
        Self {
            tool: self.tool,
            dispatcher: self.dispatcher.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transformer> ToolSession<T> {
    pub fn new(tool: ToolId, dispatcher: Dispatcher<T>) -> Self {
        Self {
            tool,
            dispatcher,
            inner: Arc::new(Mutex::new(SessionInner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release the artifact held by the last outcome, if any.
    fn release_held(&self, inner: &mut SessionInner) {
        if let Some(OperationResult::Artifact(artifact)) = inner.outcome.take() {
            self.dispatcher.store().release(artifact.id);
        }
    }

    // -- Inspection -----------------------------------------------------------

    pub fn tool(&self) -> ToolId {
        self.tool
    }

    pub fn state(&self) -> ProcessingState {
        self.lock().state
    }

    pub fn staged_count(&self) -> usize {
        self.lock().staged.len()
    }

    pub fn params(&self) -> OperationParams {
        self.lock().params.clone()
    }

    pub fn outcome(&self) -> Option<OperationResult> {
        self.lock().outcome.clone()
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        self.dispatcher.store()
    }

    // -- Transitions ----------------------------------------------------------

    /// Stage `files`, replacing any previous selection and outcome.
    ///
    /// An empty selection returns the session to `Idle`.
    #[instrument(skip_all, fields(tool = %self.tool, files = files.len()))]
    pub fn select(&self, files: Vec<FileInput>) -> Result<()> {
        let mut inner = self.lock();
        if inner.state == ProcessingState::Processing {
            return Err(DocwerkError::Busy);
        }

        self.release_held(&mut inner);
        inner.state = if files.is_empty() {
            ProcessingState::Idle
        } else {
            ProcessingState::Selecting
        };
        inner.staged = files;
        debug!(state = ?inner.state, "selection staged");
        Ok(())
    }

    pub fn set_params(&self, params: OperationParams) -> Result<()> {
        let mut inner = self.lock();
        if inner.state == ProcessingState::Processing {
            return Err(DocwerkError::Busy);
        }
        inner.params = params;
        Ok(())
    }

    /// Run the tool on the staged files.
    ///
    /// Transformation failures are not errors here: they come back as
    /// [`OperationResult::Failed`] and leave the session `Failed`. The error
    /// path is reserved for `Busy`, for confirming a finished session, and
    /// for an operation detached by [`reset`](Self::reset).
    ///
    /// The operation runs on its own task and records its outcome on the
    /// session even if this future is dropped before it completes.
    #[instrument(skip_all, fields(tool = %self.tool))]
    pub async fn confirm(&self) -> Result<OperationResult> {
        let (request, epoch) = {
            let mut inner = self.lock();
            if inner.in_flight {
                return Err(DocwerkError::Busy);
            }
            if inner.state == ProcessingState::Succeeded {
                return Err(DocwerkError::InvalidState(
                    "operation already completed; reset or select new files".into(),
                ));
            }

            let validated = intake::validate(
                self.tool.descriptor(),
                inner.staged.clone(),
                inner.params.clone(),
            );
            match validated {
                Ok(request) => {
                    inner.state = ProcessingState::Processing;
                    inner.in_flight = true;
                    inner.outcome = None;
                    (request, inner.epoch)
                }
                Err(err) => {
                    warn!(error = %err, "selection rejected");
                    let outcome = OperationResult::Failed(Failure::from_error(&err));
                    inner.state = ProcessingState::Failed;
                    inner.outcome = Some(outcome.clone());
                    return Ok(outcome);
                }
            }
        };

        let task = tokio::spawn({
            let dispatcher = self.dispatcher.clone();
            let inner = Arc::clone(&self.inner);
            async move {
                let result = dispatcher.dispatch(request).await;
                land(&inner, dispatcher.store(), epoch, result)
            }
            .in_current_span()
        });

        match task.await {
            Ok(landed) => landed,
            Err(err) => {
                let err =
                    DocwerkError::processing(self.tool, DocwerkError::Worker(err.to_string()));
                land(&self.inner, self.dispatcher.store(), epoch, Err(err))
            }
        }
    }

    /// Return to `Idle`, dropping the selection, parameters and any artifact.
    ///
    /// An operation still in flight keeps running and its artifact is
    /// released as soon as it lands. Until then `confirm` answers `Busy`.
    #[instrument(skip_all, fields(tool = %self.tool))]
    pub fn reset(&self) {
        let mut inner = self.lock();
        if inner.in_flight {
            info!("detaching in-flight operation");
        }

        inner.epoch = inner.epoch.wrapping_add(1);
        self.release_held(&mut inner);
        inner.staged.clear();
        inner.params = OperationParams::default();
        inner.state = ProcessingState::Idle;
    }
}

/// Record a finished operation on the session it was started from.
///
/// A result from an earlier epoch belongs to a reset session: its artifact is
/// released and the session is left as it is.
fn land(
    inner: &Mutex<SessionInner>,
    store: &ArtifactStore,
    epoch: u64,
    result: Result<Artifact>,
) -> Result<OperationResult> {
    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
    inner.in_flight = false;

    if inner.epoch != epoch {
        if let Ok(artifact) = &result {
            store.release(artifact.id);
        }
        info!("session was reset while processing, result discarded");
        return Err(DocwerkError::InvalidState(
            "session was reset while processing".into(),
        ));
    }

    let outcome = match result {
        Ok(artifact) => {
            inner.state = ProcessingState::Succeeded;
            OperationResult::Artifact(artifact)
        }
        Err(err) => {
            warn!(error = %err, "operation failed");
            inner.state = ProcessingState::Failed;
            OperationResult::Failed(Failure::from_error(&err))
        }
    };
    inner.outcome = Some(outcome.clone());
    Ok(outcome)
}

//! Caller correlation ids for a command invocation.

use studydiff_core::errors::ExError;
use studydiff_core_types::{RequestId, TraceId};

/// Request and trace ids supplied by the caller
///
/// Logged on every lifecycle event of the command and attached to any error
/// it returns. The default context carries neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandContext {
    pub request_id: Option<RequestId>,
    pub trace_id: Option<TraceId>,
}

impl CommandContext {
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub(crate) fn attach(&self, mut err: ExError) -> ExError {
        if let Some(request_id) = self.request_id {
            err = err.with_request_id(request_id);
        }
        if let Some(trace_id) = self.trace_id {
            err = err.with_trace_id(trace_id);
        }
        err
    }
}

use crate::select::SelectError;
use crate::stream::StreamError;
use thiserror::Error;

/// Crate-level error for callers that run selection and streaming as one
/// sequence. Selection failures and streaming failures stay distinct
/// variants: a replica that probed alive can still fail mid-stream, and the
/// caller decides whether to restart from selection.
#[derive(Debug, Error)]
pub enum BlockViewError {
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error(transparent)]
    Stream(#[from] StreamError),
}

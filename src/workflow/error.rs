use crate::workflow::state::{Operation, WorkflowState};
use std::fmt;

/// Local problems that block a transition. The workflow state is left as is.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    UnsupportedMediaType { name: String },
    NoFileSelected,
    MissingUploadHandle,
    NoSelection,
    DegenerateSelection { width: f32, height: f32 },
    InvalidTimeWindow {
        start: f64,
        end: f64,
        duration: Option<f64>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnsupportedMediaType { name } => {
                write!(f, "Please select a video file ('{name}' is not a recognised video)")
            }
            ValidationError::NoFileSelected => write!(f, "Please select a video file"),
            ValidationError::MissingUploadHandle => write!(f, "Please upload the video first"),
            ValidationError::NoSelection => write!(f, "Please select a subtitle area"),
            ValidationError::DegenerateSelection { width, height } => write!(
                f,
                "Subtitle area must have a non-zero size (got {width}x{height})"
            ),
            ValidationError::InvalidTimeWindow {
                start,
                end,
                duration: Some(duration),
            } => write!(
                f,
                "Time window {start}s to {end}s must satisfy 0 <= start <= end <= {duration}s"
            ),
            ValidationError::InvalidTimeWindow {
                start,
                end,
                duration: None,
            } => write!(f, "Time window {start}s to {end}s must satisfy 0 <= start <= end"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A request the controller refused without contacting the server.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowError {
    Validation(ValidationError),
    /// The same operation is already in flight.
    Busy(Operation),
    InvalidState {
        operation: Operation,
        state: WorkflowState,
    },
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::Validation(e) => e.fmt(f),
            WorkflowError::Busy(op) => write!(f, "An {op} request is already in progress"),
            WorkflowError::InvalidState { operation, state } => {
                write!(f, "Cannot {operation} while in state {state:?}")
            }
        }
    }
}

impl std::error::Error for WorkflowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkflowError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for WorkflowError {
    fn from(e: ValidationError) -> Self {
        WorkflowError::Validation(e)
    }
}

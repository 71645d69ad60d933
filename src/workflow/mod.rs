pub mod controller;
pub mod error;
pub mod params;
pub mod runner;
pub mod state;

pub use controller::{Completion, ExtractTicket, RequestId, UploadTicket, WorkflowController};
pub use error::{ValidationError, WorkflowError};
pub use params::{SamplingInterval, TimeWindow};
pub use runner::{WorkflowRunner, WorkflowUpdate};
pub use state::{can_transition, Operation, WorkflowState};

use std::path::PathBuf;

/// A video chosen by the user. `id` changes on every selection, even when the
/// same path is picked twice, and is what stale responses are matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub id: u64,
    pub path: PathBuf,
    pub name: String,
    pub mime: &'static str,
}

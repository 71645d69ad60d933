#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Upload,
    Extract,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Upload => write!(f, "upload"),
            Operation::Extract => write!(f, "extract"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    NoFile,
    FileSelected,
    Uploading,
    Uploaded,
    Extracting,
    Result,
    /// A remote call failed. `failed` is the operation a retry re-enters.
    Error { failed: Operation },
}

impl WorkflowState {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Uploading | Self::Extracting)
    }

    /// The asset is on the server and extraction may be requested.
    pub fn has_upload(self) -> bool {
        matches!(
            self,
            Self::Uploaded
                | Self::Extracting
                | Self::Result
                | Self::Error {
                    failed: Operation::Extract
                }
        )
    }

    pub fn can_upload(self) -> bool {
        matches!(
            self,
            Self::FileSelected
                | Self::Error {
                    failed: Operation::Upload
                }
        )
    }

    pub fn can_extract(self) -> bool {
        matches!(
            self,
            Self::Uploaded
                | Self::Result
                | Self::Error {
                    failed: Operation::Extract
                }
        )
    }
}

/// Transitions the controller is allowed to make. Selecting a new file is
/// legal from anywhere.
pub fn can_transition(from: WorkflowState, to: WorkflowState) -> bool {
    use WorkflowState::*;
    if matches!(to, FileSelected) {
        return true;
    }
    match to {
        Uploading => from.can_upload(),
        Extracting => from.can_extract(),
        Uploaded => matches!(from, Uploading),
        Result => matches!(from, Extracting),
        Error {
            failed: Operation::Upload,
        } => matches!(from, Uploading),
        Error {
            failed: Operation::Extract,
        } => matches!(from, Extracting),
        NoFile | FileSelected => false,
    }
}

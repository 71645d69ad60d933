use crate::media::{video_mime_type, MediaDescriptor};
use crate::remote::{ExtractRequest, ExtractionResult, RemoteError, UploadHandle, UploadReceipt};
use crate::roi::Rectangle;
use crate::workflow::error::{ValidationError, WorkflowError};
use crate::workflow::params::{SamplingInterval, TimeWindow, DEFAULT_MAX_WINDOW_SECS};
use crate::workflow::state::{can_transition, Operation, WorkflowState};
use crate::workflow::SelectedFile;
use std::path::Path;

/// Identifies one remote request. `file_id` ties the response back to the
/// selection it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId {
    pub sequence: u64,
    pub file_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadTicket {
    pub id: RequestId,
    pub file: SelectedFile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractTicket {
    pub id: RequestId,
    pub request: ExtractRequest,
}

/// What happened to a response handed back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The response belongs to an earlier selection and was dropped.
    Stale,
}

/// Upload → extract state machine for the selected video.
///
/// The controller never performs I/O. `begin_*` validates and hands out a
/// ticket describing the remote call to make; the caller reports the outcome
/// through `finish_*`. At most one upload and one extraction may be
/// outstanding, and responses for a replaced file are ignored.
#[derive(Debug, Clone)]
pub struct WorkflowController {
    state: WorkflowState,
    file: Option<SelectedFile>,
    media: Option<MediaDescriptor>,
    handle: Option<UploadHandle>,
    result: Option<ExtractionResult>,
    failure: Option<RemoteError>,
    time_window: TimeWindow,
    interval: SamplingInterval,
    max_initial_window: f64,
    next_file_id: u64,
    next_sequence: u64,
    upload_in_flight: Option<RequestId>,
    extract_in_flight: Option<RequestId>,
}

impl Default for WorkflowController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WINDOW_SECS, SamplingInterval::default())
    }
}

impl WorkflowController {
    pub fn new(max_initial_window: f64, interval: SamplingInterval) -> Self {
        Self {
            state: WorkflowState::NoFile,
            file: None,
            media: None,
            handle: None,
            result: None,
            failure: None,
            time_window: TimeWindow::default(),
            interval,
            max_initial_window,
            next_file_id: 1,
            next_sequence: 1,
            upload_in_flight: None,
            extract_in_flight: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn media(&self) -> Option<MediaDescriptor> {
        self.media
    }

    pub fn upload_handle(&self) -> Option<&UploadHandle> {
        self.handle.as_ref()
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref()
    }

    /// Reason of the last remote failure while in the error state.
    pub fn failure(&self) -> Option<&RemoteError> {
        self.failure.as_ref()
    }

    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }

    pub fn set_time_window(&mut self, window: TimeWindow) {
        self.time_window = window;
    }

    pub fn interval(&self) -> SamplingInterval {
        self.interval
    }

    pub fn set_interval(&mut self, interval: SamplingInterval) {
        self.interval = interval;
    }

    pub fn in_flight(&self, operation: Operation) -> bool {
        match operation {
            Operation::Upload => self.upload_in_flight.is_some(),
            Operation::Extract => self.extract_in_flight.is_some(),
        }
    }

    fn transition(&mut self, to: WorkflowState) {
        debug_assert!(
            can_transition(self.state, to),
            "illegal workflow transition {:?} -> {:?}",
            self.state,
            to
        );
        tracing::debug!(from = ?self.state, to = ?to, "workflow transition");
        self.state = to;
    }

    fn next_request(&mut self, file_id: u64) -> RequestId {
        let id = RequestId {
            sequence: self.next_sequence,
            file_id,
        };
        self.next_sequence += 1;
        id
    }

    fn is_current(&self, id: RequestId) -> bool {
        self.file.as_ref().map(|f| f.id) == Some(id.file_id)
    }

    /// Select a new video. Valid from any state; everything derived from the
    /// previous file is dropped. Requests already sent keep running but their
    /// responses will be ignored.
    pub fn select_file(&mut self, path: &Path) -> Result<&SelectedFile, WorkflowError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let Some(mime) = video_mime_type(path) else {
            tracing::warn!(file = %name, "rejected file with unsupported type");
            return Err(ValidationError::UnsupportedMediaType { name }.into());
        };

        let id = self.next_file_id;
        self.next_file_id += 1;
        tracing::info!(file = %name, id, "video selected");

        self.media = None;
        self.handle = None;
        self.result = None;
        self.failure = None;
        self.time_window = TimeWindow::default();
        self.transition(WorkflowState::FileSelected);
        Ok(&*self.file.insert(SelectedFile {
            id,
            path: path.to_path_buf(),
            name,
            mime,
        }))
    }

    /// Metadata for the selected file became available (local probe).
    pub fn media_loaded(&mut self, file_id: u64, media: MediaDescriptor) -> Completion {
        if self.file.as_ref().map(|f| f.id) != Some(file_id) {
            return Completion::Stale;
        }
        self.set_media(media);
        Completion::Applied
    }

    fn set_media(&mut self, media: MediaDescriptor) {
        self.media = Some(media);
        self.time_window = TimeWindow::initial(media.duration_seconds, self.max_initial_window);
    }

    pub fn begin_upload(&mut self) -> Result<UploadTicket, WorkflowError> {
        if self.upload_in_flight.is_some() {
            return Err(WorkflowError::Busy(Operation::Upload));
        }
        let Some(file) = self.file.clone() else {
            return Err(ValidationError::NoFileSelected.into());
        };
        if !self.state.can_upload() {
            return Err(WorkflowError::InvalidState {
                operation: Operation::Upload,
                state: self.state,
            });
        }

        let id = self.next_request(file.id);
        self.upload_in_flight = Some(id);
        self.failure = None;
        self.transition(WorkflowState::Uploading);
        tracing::info!(sequence = id.sequence, file = %file.name, "upload started");
        Ok(UploadTicket { id, file })
    }

    pub fn finish_upload(
        &mut self,
        id: RequestId,
        outcome: Result<UploadReceipt, RemoteError>,
    ) -> Completion {
        if self.upload_in_flight == Some(id) {
            self.upload_in_flight = None;
        }
        if !self.is_current(id) || self.state != WorkflowState::Uploading {
            tracing::info!(sequence = id.sequence, "discarding stale upload response");
            return Completion::Stale;
        }

        match outcome {
            Ok(receipt) => {
                tracing::info!(handle = %receipt.handle, "upload accepted");
                self.set_media(receipt.media);
                self.handle = Some(receipt.handle);
                self.transition(WorkflowState::Uploaded);
            }
            Err(err) => {
                tracing::warn!(reason = %err.reason, "upload failed");
                self.failure = Some(err);
                self.transition(WorkflowState::Error {
                    failed: Operation::Upload,
                });
            }
        }
        Completion::Applied
    }

    /// Validate the extraction inputs against the current upload and hand out
    /// the request to send. Nothing reaches the server unless this succeeds.
    pub fn begin_extract(
        &mut self,
        window: TimeWindow,
        interval: SamplingInterval,
        selection: Option<Rectangle>,
    ) -> Result<ExtractTicket, WorkflowError> {
        if self.extract_in_flight.is_some() {
            return Err(WorkflowError::Busy(Operation::Extract));
        }
        let Some(file_id) = self.file.as_ref().map(|f| f.id) else {
            return Err(ValidationError::NoFileSelected.into());
        };
        let Some(handle) = self.handle.clone() else {
            return Err(ValidationError::MissingUploadHandle.into());
        };
        if !self.state.can_extract() {
            return Err(WorkflowError::InvalidState {
                operation: Operation::Extract,
                state: self.state,
            });
        }
        let Some(roi) = selection else {
            return Err(ValidationError::NoSelection.into());
        };
        if roi.is_degenerate() {
            return Err(ValidationError::DegenerateSelection {
                width: roi.width,
                height: roi.height,
            }
            .into());
        }
        window.validate(self.media.map(|m| m.duration_seconds))?;

        let id = self.next_request(file_id);
        let request = ExtractRequest {
            asset_handle: handle.as_str().to_string(),
            start_time: window.start,
            end_time: window.end,
            sampling_interval_seconds: interval.seconds(),
            roi: roi.into(),
        };
        self.extract_in_flight = Some(id);
        self.result = None;
        self.failure = None;
        self.transition(WorkflowState::Extracting);
        tracing::info!(sequence = id.sequence, handle = %handle, "extraction started");
        Ok(ExtractTicket { id, request })
    }

    pub fn finish_extract(
        &mut self,
        id: RequestId,
        outcome: Result<ExtractionResult, RemoteError>,
    ) -> Completion {
        if self.extract_in_flight == Some(id) {
            self.extract_in_flight = None;
        }
        if !self.is_current(id) || self.state != WorkflowState::Extracting {
            tracing::info!(sequence = id.sequence, "discarding stale extraction response");
            return Completion::Stale;
        }

        match outcome {
            Ok(result) if result.succeeded => {
                tracing::info!(elapsed = ?result.elapsed_seconds, "extraction succeeded");
                self.result = Some(result);
                self.transition(WorkflowState::Result);
            }
            Ok(result) => {
                let reason = result
                    .failure_reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| "Extraction failed".to_string());
                tracing::warn!(%reason, "service reported extraction failure");
                self.failure = Some(RemoteError::new(Operation::Extract, reason));
                self.transition(WorkflowState::Error {
                    failed: Operation::Extract,
                });
            }
            Err(err) => {
                tracing::warn!(reason = %err.reason, "extraction failed");
                self.failure = Some(err);
                self.transition(WorkflowState::Error {
                    failed: Operation::Extract,
                });
            }
        }
        Completion::Applied
    }
}

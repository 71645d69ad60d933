use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use subtitle_extractor::export::{export_as_file, export_base_name};
use subtitle_extractor::media::MediaDescriptor;
use subtitle_extractor::remote::{
    ExtractRequest, ExtractionResult, RemoteError, RemoteService, UploadHandle, UploadReceipt,
};
use subtitle_extractor::roi::{map_to_native, Point, RoiSelector, SurfaceSize};
use subtitle_extractor::workflow::{
    SamplingInterval, TimeWindow, ValidationError, WorkflowController, WorkflowError,
    WorkflowRunner, WorkflowState, WorkflowUpdate,
};
use tempfile::tempdir;

const SRT: &str = "1\n00:00:01,000 --> 00:00:03,000\nHello there\n\n";

/// Canned service that records every extraction request.
#[derive(Default)]
struct CannedRemote {
    extracts: Mutex<Vec<ExtractRequest>>,
}

impl RemoteService for CannedRemote {
    fn upload(
        &self,
        _file: &subtitle_extractor::workflow::SelectedFile,
    ) -> Result<UploadReceipt, RemoteError> {
        Ok(UploadReceipt {
            handle: UploadHandle::new("abc123.mp4"),
            media: MediaDescriptor::new(10.0, 640, 360).unwrap(),
        })
    }

    fn extract(&self, request: &ExtractRequest) -> Result<ExtractionResult, RemoteError> {
        self.extracts.lock().unwrap().push(request.clone());
        Ok(ExtractionResult {
            succeeded: true,
            text_payload: Some(SRT.into()),
            elapsed_seconds: Some(2.3),
            failure_reason: None,
        })
    }
}

fn wait_for_update(runner: &mut WorkflowRunner) -> WorkflowUpdate {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(update) = runner.poll().into_iter().next() {
            return update;
        }
        assert!(Instant::now() < deadline, "timed out waiting for the service");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn select_upload_drag_extract_export() {
    let remote = Arc::new(CannedRemote::default());
    let mut runner = WorkflowRunner::new(WorkflowController::default(), remote.clone());

    runner.controller_mut().select_file(Path::new("clip.mp4")).unwrap();
    assert_eq!(runner.controller().state(), WorkflowState::FileSelected);

    runner.upload().unwrap();
    assert_eq!(runner.controller().state(), WorkflowState::Uploading);
    assert_eq!(wait_for_update(&mut runner), WorkflowUpdate::Uploaded);
    assert_eq!(runner.controller().state(), WorkflowState::Uploaded);
    assert_eq!(runner.controller().time_window(), TimeWindow::new(0.0, 10.0));

    // the surface is laid out at half the native size
    let displayed = SurfaceSize::new(320.0, 180.0);
    let native = SurfaceSize::new(640.0, 360.0);
    let mut selector = RoiSelector::new();
    selector.begin_drag(map_to_native(Point::new(50.0, 25.0), displayed, native).unwrap());
    selector.update_drag(map_to_native(Point::new(150.0, 75.0), displayed, native).unwrap());
    let roi = selector.end_drag().unwrap();
    assert_eq!(roi.rounded(), (100, 50, 200, 100));

    runner
        .extract(TimeWindow::new(0.0, 10.0), SamplingInterval::new(1.0), Some(roi))
        .unwrap();
    assert_eq!(runner.controller().state(), WorkflowState::Extracting);
    assert_eq!(wait_for_update(&mut runner), WorkflowUpdate::Extracted);
    assert_eq!(runner.controller().state(), WorkflowState::Result);

    let sent = remote.extracts.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].asset_handle, "abc123.mp4");
    assert_eq!(sent[0].start_time, 0.0);
    assert_eq!(sent[0].end_time, 10.0);
    assert_eq!(sent[0].sampling_interval_seconds, 1.0);
    assert_eq!(
        (sent[0].roi.x, sent[0].roi.y, sent[0].roi.width, sent[0].roi.height),
        (100, 50, 200, 100)
    );

    let result = runner.controller().result().unwrap();
    assert_eq!(result.elapsed_seconds, Some(2.3));
    let text = result.text_payload.as_deref().unwrap();
    let dir = tempdir().unwrap();
    let base = export_base_name(runner.controller().upload_handle());
    let path = export_as_file(text, &base, dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "abc123.srt");
    assert_eq!(std::fs::read_to_string(path).unwrap(), SRT);
}

#[test]
fn extract_without_area_stays_uploaded_and_sends_nothing() {
    let remote = Arc::new(CannedRemote::default());
    let mut runner = WorkflowRunner::new(WorkflowController::default(), remote.clone());
    runner.controller_mut().select_file(Path::new("clip.mp4")).unwrap();
    runner.upload().unwrap();
    wait_for_update(&mut runner);

    let err = runner
        .extract(TimeWindow::new(0.0, 10.0), SamplingInterval::new(1.0), None)
        .unwrap_err();
    assert_eq!(err, WorkflowError::Validation(ValidationError::NoSelection));
    assert_eq!(err.to_string(), "Please select a subtitle area");
    assert_eq!(runner.controller().state(), WorkflowState::Uploaded);
    assert!(remote.extracts.lock().unwrap().is_empty());
    assert!(runner.poll().is_empty());
}

#[test]
fn interval_is_clamped_before_sending() {
    let remote = Arc::new(CannedRemote::default());
    let mut runner = WorkflowRunner::new(WorkflowController::default(), remote.clone());
    runner.controller_mut().select_file(Path::new("clip.webm")).unwrap();
    runner.upload().unwrap();
    wait_for_update(&mut runner);

    let roi = subtitle_extractor::roi::Rectangle::new(0.0, 0.0, 64.0, 32.0);
    runner
        .extract(TimeWindow::new(2.0, 2.0), SamplingInterval::new(42.0), Some(roi))
        .unwrap();
    wait_for_update(&mut runner);
    let sent = remote.extracts.lock().unwrap();
    assert_eq!(sent[0].sampling_interval_seconds, 10.0);
    assert_eq!((sent[0].start_time, sent[0].end_time), (2.0, 2.0));
}

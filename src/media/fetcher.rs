use crate::media::{FrameSource, MediaDescriptor};
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum MediaRequest {
    Probe {
        generation: u64,
        path: PathBuf,
    },
    Frame {
        generation: u64,
        path: PathBuf,
        at: f64,
    },
}

#[derive(Debug)]
pub enum MediaEvent {
    Probed {
        generation: u64,
        result: Result<MediaDescriptor, String>,
    },
    Frame {
        generation: u64,
        at: f64,
        image: RgbaImage,
    },
    FrameFailed {
        generation: u64,
        at: f64,
        reason: String,
    },
}

impl MediaEvent {
    pub fn generation(&self) -> u64 {
        match self {
            MediaEvent::Probed { generation, .. }
            | MediaEvent::Frame { generation, .. }
            | MediaEvent::FrameFailed { generation, .. } => *generation,
        }
    }
}

/// Runs probes and frame decodes off the UI thread.
///
/// Frame requests queued while the worker is busy are coalesced so only the
/// most recent position gets decoded. Every event carries the generation it
/// was requested for; consumers drop events from an older generation.
pub struct FrameFetcher {
    tx: Sender<MediaRequest>,
    rx: Receiver<MediaEvent>,
    frame_pending: bool,
}

impl FrameFetcher {
    pub fn spawn(source: Arc<dyn FrameSource>) -> Self {
        let (req_tx, req_rx) = channel::<MediaRequest>();
        let (event_tx, event_rx) = channel::<MediaEvent>();
        std::thread::spawn(move || worker_loop(source, req_rx, event_tx));
        Self {
            tx: req_tx,
            rx: event_rx,
            frame_pending: false,
        }
    }

    pub fn probe(&mut self, generation: u64, path: PathBuf) {
        let _ = self.tx.send(MediaRequest::Probe { generation, path });
    }

    pub fn request_frame(&mut self, generation: u64, path: PathBuf, at: f64) {
        if self
            .tx
            .send(MediaRequest::Frame {
                generation,
                path,
                at,
            })
            .is_ok()
        {
            self.frame_pending = true;
        }
    }

    /// A frame request is outstanding. Playback uses this to avoid piling up
    /// decode work faster than it completes.
    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn try_next(&mut self) -> Option<MediaEvent> {
        match self.rx.try_recv() {
            Ok(event) => {
                if matches!(
                    event,
                    MediaEvent::Frame { .. } | MediaEvent::FrameFailed { .. }
                ) {
                    self.frame_pending = false;
                }
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.frame_pending = false;
                None
            }
        }
    }
}

fn worker_loop(source: Arc<dyn FrameSource>, rx: Receiver<MediaRequest>, tx: Sender<MediaEvent>) {
    while let Ok(first) = rx.recv() {
        let mut batch = vec![first];
        batch.extend(rx.try_iter());

        let mut latest_frame = None;
        for request in batch {
            match request {
                MediaRequest::Probe { generation, path } => {
                    let result = source.probe(&path).map_err(|e| {
                        tracing::warn!(path = %path.display(), "probe failed: {e:#}");
                        format!("{e:#}")
                    });
                    if tx.send(MediaEvent::Probed { generation, result }).is_err() {
                        return;
                    }
                }
                frame @ MediaRequest::Frame { .. } => latest_frame = Some(frame),
            }
        }

        if let Some(MediaRequest::Frame {
            generation,
            path,
            at,
        }) = latest_frame
        {
            let event = match source.frame_at(&path, at) {
                Ok(image) => MediaEvent::Frame {
                    generation,
                    at,
                    image,
                },
                Err(e) => {
                    tracing::debug!(at, "frame decode failed: {e:#}");
                    MediaEvent::FrameFailed {
                        generation,
                        at,
                        reason: format!("{e:#}"),
                    }
                }
            };
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct FakeSource {
        decoded: Mutex<Vec<f64>>,
    }

    impl FrameSource for FakeSource {
        fn probe(&self, path: &Path) -> Result<MediaDescriptor> {
            if path.ends_with("broken.mp4") {
                bail!("unreadable");
            }
            Ok(MediaDescriptor::new(10.0, 4, 2).unwrap())
        }

        fn frame_at(&self, _path: &Path, seconds: f64) -> Result<RgbaImage> {
            self.decoded.lock().unwrap().push(seconds);
            Ok(RgbaImage::new(4, 2))
        }
    }

    fn next_event(fetcher: &mut FrameFetcher) -> MediaEvent {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(event) = fetcher.try_next() {
                return event;
            }
            assert!(Instant::now() < deadline, "no media event received");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn probe_results_carry_generation() {
        let mut fetcher = FrameFetcher::spawn(Arc::new(FakeSource::default()));
        fetcher.probe(3, PathBuf::from("clip.mp4"));
        match next_event(&mut fetcher) {
            MediaEvent::Probed { generation, result } => {
                assert_eq!(generation, 3);
                assert_eq!(result.unwrap().native_width, 4);
            }
            other => panic!("unexpected event {other:?}"),
        }

        fetcher.probe(4, PathBuf::from("broken.mp4"));
        match next_event(&mut fetcher) {
            MediaEvent::Probed { generation, result } => {
                assert_eq!(generation, 4);
                assert!(result.unwrap_err().contains("unreadable"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn frame_event_clears_pending_flag() {
        let mut fetcher = FrameFetcher::spawn(Arc::new(FakeSource::default()));
        fetcher.request_frame(1, PathBuf::from("clip.mp4"), 2.5);
        assert!(fetcher.frame_pending());
        match next_event(&mut fetcher) {
            MediaEvent::Frame { at, image, .. } => {
                assert_eq!(at, 2.5);
                assert_eq!(image.dimensions(), (4, 2));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(!fetcher.frame_pending());
    }
}

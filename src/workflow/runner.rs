use crate::remote::{ExtractionResult, RemoteError, RemoteService, UploadReceipt};
use crate::roi::Rectangle;
use crate::workflow::controller::{Completion, RequestId, WorkflowController};
use crate::workflow::error::WorkflowError;
use crate::workflow::params::{SamplingInterval, TimeWindow};
use crate::workflow::state::Operation;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

#[derive(Debug)]
enum RemoteCompletion {
    Upload {
        id: RequestId,
        outcome: Result<UploadReceipt, RemoteError>,
    },
    Extract {
        id: RequestId,
        outcome: Result<ExtractionResult, RemoteError>,
    },
}

/// Something the UI should react to after [`WorkflowRunner::poll`].
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowUpdate {
    Uploaded,
    Extracted,
    Failed(RemoteError),
    /// A response for a previously selected file arrived and was dropped.
    Stale(Operation),
}

/// Runs the controller's remote calls on worker threads.
///
/// Calls are dispatched from the UI thread and their results are queued; the
/// controller is only ever touched from the thread that calls [`poll`], so
/// there is no locking around workflow state.
///
/// [`poll`]: WorkflowRunner::poll
pub struct WorkflowRunner {
    controller: WorkflowController,
    service: Arc<dyn RemoteService>,
    tx: Sender<RemoteCompletion>,
    rx: Receiver<RemoteCompletion>,
}

impl WorkflowRunner {
    pub fn new(controller: WorkflowController, service: Arc<dyn RemoteService>) -> Self {
        let (tx, rx) = channel();
        Self {
            controller,
            service,
            tx,
            rx,
        }
    }

    pub fn controller(&self) -> &WorkflowController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut WorkflowController {
        &mut self.controller
    }

    pub fn upload(&mut self) -> Result<(), WorkflowError> {
        let ticket = self.controller.begin_upload()?;
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let outcome = service.upload(&ticket.file);
            let _ = tx.send(RemoteCompletion::Upload {
                id: ticket.id,
                outcome,
            });
        });
        Ok(())
    }

    pub fn extract(
        &mut self,
        window: TimeWindow,
        interval: SamplingInterval,
        selection: Option<Rectangle>,
    ) -> Result<(), WorkflowError> {
        let ticket = self.controller.begin_extract(window, interval, selection)?;
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let outcome = service.extract(&ticket.request);
            let _ = tx.send(RemoteCompletion::Extract {
                id: ticket.id,
                outcome,
            });
        });
        Ok(())
    }

    /// Apply every response that has arrived since the last call.
    pub fn poll(&mut self) -> Vec<WorkflowUpdate> {
        let mut updates = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            let update = match completion {
                RemoteCompletion::Upload { id, outcome } => {
                    let failure = outcome.as_ref().err().cloned();
                    match self.controller.finish_upload(id, outcome) {
                        Completion::Stale => WorkflowUpdate::Stale(Operation::Upload),
                        Completion::Applied => match failure {
                            Some(err) => WorkflowUpdate::Failed(err),
                            None => WorkflowUpdate::Uploaded,
                        },
                    }
                }
                RemoteCompletion::Extract { id, outcome } => {
                    match self.controller.finish_extract(id, outcome) {
                        Completion::Stale => WorkflowUpdate::Stale(Operation::Extract),
                        Completion::Applied => match self.controller.failure() {
                            Some(err) => WorkflowUpdate::Failed(err.clone()),
                            None => WorkflowUpdate::Extracted,
                        },
                    }
                }
            };
            updates.push(update);
        }
        updates
    }
}

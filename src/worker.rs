//! Worker thread management
//!
//! Generation requests run on a dedicated thread that owns a single-threaded
//! tokio runtime, so the UI loop never blocks on the network. Every
//! `Generate` message is answered with exactly one `Generated` response.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::GenerationError;
use crate::orchestrator::SubmissionId;
use crate::service::{GenerationRequest, GenerationResponse, GenerationService};

/// Messages sent from main thread to the worker
#[derive(Debug)]
pub enum WorkerMessage {
    /// Run one generation request
    Generate {
        id: SubmissionId,
        request: GenerationRequest,
    },
    /// Shutdown signal
    Shutdown,
}

/// Responses sent from the worker to main thread
#[derive(Debug)]
pub enum WorkerResponse {
    Generated {
        id: SubmissionId,
        outcome: Result<GenerationResponse, GenerationError>,
        elapsed_ms: u64,
    },
}

/// Handle to the worker thread and its channels
pub struct WorkerHandle {
    pub request_tx: Sender<WorkerMessage>,
    pub response_rx: Receiver<WorkerResponse>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Stop the worker. A request that is still running is finished first.
    pub fn shutdown(mut self) {
        let _ = self.request_tx.send(WorkerMessage::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn the generation worker
pub fn spawn_worker(service: Arc<dyn GenerationService>) -> Result<WorkerHandle> {
    let (request_tx, request_rx) = unbounded::<WorkerMessage>();
    let (response_tx, response_rx) = unbounded::<WorkerResponse>();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build worker runtime")?;

    let handle = thread::Builder::new()
        .name("generation-worker".to_string())
        .spawn(move || worker_loop(runtime, service, request_rx, response_tx))
        .context("Failed to spawn worker thread")?;

    Ok(WorkerHandle {
        request_tx,
        response_rx,
        thread: Some(handle),
    })
}

/// Main worker loop - processes messages until shutdown
fn worker_loop(
    runtime: tokio::runtime::Runtime,
    service: Arc<dyn GenerationService>,
    rx: Receiver<WorkerMessage>,
    tx: Sender<WorkerResponse>,
) {
    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMessage::Shutdown => break,

            WorkerMessage::Generate { id, request } => {
                let start = Instant::now();
                let outcome = runtime.block_on(service.generate(&request));
                let elapsed_ms = start.elapsed().as_millis() as u64;

                match &outcome {
                    Ok(_) => tracing::debug!(submission = %id, elapsed_ms, "worker finished request"),
                    Err(e) => tracing::debug!(submission = %id, elapsed_ms, error = %e, "worker request failed"),
                }

                if tx
                    .send(WorkerResponse::Generated {
                        id,
                        outcome,
                        elapsed_ms,
                    })
                    .is_err()
                {
                    // receiver gone, nobody is waiting for results
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{ImageUpload, InputCollector, OutputFormat};
    use crate::orchestrator::Orchestrator;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::time::Duration;

    struct EchoService;

    #[async_trait]
    impl GenerationService for EchoService {
        async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
            if request.prompt == "fail" {
                return Err(GenerationError::Service("boom".to_string()));
            }
            let mut code = BTreeMap::new();
            code.insert(request.format, format!("<p>{}</p>", request.prompt));
            Ok(GenerationResponse {
                code,
                colors: vec!["#123456".to_string()],
            })
        }
    }

    fn request_for(prompt: &str) -> (SubmissionId, GenerationRequest) {
        let mut inputs = InputCollector::new("Roboto", OutputFormat::Html);
        inputs.set_prompt(prompt);
        inputs.set_image(ImageUpload::new("a.png", "image/png", vec![1u8]));
        Orchestrator::new().begin(&inputs).unwrap()
    }

    #[test]
    fn test_spawn_and_shutdown() {
        let worker = spawn_worker(Arc::new(EchoService)).unwrap();
        worker.shutdown();
    }

    #[test]
    fn test_generate_request() {
        let worker = spawn_worker(Arc::new(EchoService)).unwrap();
        let (id, request) = request_for("hello");

        worker
            .request_tx
            .send(WorkerMessage::Generate { id, request })
            .unwrap();

        let response = worker
            .response_rx
            .recv_timeout(Duration::from_secs(5))
            .unwrap();

        match response {
            WorkerResponse::Generated {
                id: got, outcome, ..
            } => {
                assert_eq!(got, id);
                let response = outcome.unwrap();
                assert_eq!(response.code[&OutputFormat::Html], "<p>hello</p>");
            }
        }

        worker.shutdown();
    }

    #[test]
    fn test_failure_is_reported_not_dropped() {
        let worker = spawn_worker(Arc::new(EchoService)).unwrap();
        let (id, request) = request_for("fail");

        worker
            .request_tx
            .send(WorkerMessage::Generate { id, request })
            .unwrap();

        let WorkerResponse::Generated { outcome, .. } = worker
            .response_rx
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert!(matches!(outcome, Err(GenerationError::Service(_))));

        worker.shutdown();
    }
}

//! Background filter worker.
//!
//! Processes a fixed list of image paths strictly sequentially, one
//! in-flight request at a time, emitting a per-image verdict as soon as it
//! is known. Pause and stop are cooperative, checked between items; an
//! in-flight request is never cancelled.

use crate::api::{
    ask_about_image, backend_for, ApiKind, BackendOptions, ImageInput, VisionBackend, VisionQuery,
};
use crate::error::QueryResult;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Buffer size for the event channel. Small on purpose: a stalled consumer
/// applies backpressure instead of piling up verdicts.
const EVENT_BUFFER: usize = 32;

/// Per-image result delivered to the caller incrementally.
#[derive(Debug, Clone, Serialize)]
pub struct ImageVerdict {
    /// The image that was judged
    pub path: PathBuf,
    /// Whether the model affirmed the prompt for this image
    pub matched: bool,
    /// Raw model answer, present on success
    pub answer: Option<String>,
    /// Failure description, present when the image could not be judged
    pub error: Option<String>,
}

/// Progress events emitted over the worker's channel.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Run accepted, `total` images queued
    Started { total: usize },
    /// About to judge one image
    Processing {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    /// One image judged
    Judged(ImageVerdict),
    /// Run ended early on a stop request
    Stopped { processed: usize },
    /// Run completed; all matched paths in judgment order
    Finished { matched: Vec<PathBuf> },
}

/// Clonable pause/stop handle for a running worker.
///
/// Pause parks the worker between items; stop ends the run at the next
/// iteration boundary. `stop()` also releases a paused worker so it can
/// exit instead of sleeping forever.
#[derive(Clone, Debug)]
pub struct WorkerControl {
    stop: Arc<AtomicBool>,
    pause: Arc<watch::Sender<bool>>,
}

impl WorkerControl {
    fn new() -> Self {
        let (pause, _) = watch::channel(false);
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            pause: Arc::new(pause),
        }
    }

    pub fn pause(&self) {
        let _ = self.pause.send(true);
    }

    pub fn resume(&self) {
        let _ = self.pause.send(false);
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = self.pause.send(false);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        *self.pause.borrow()
    }

    /// Wait until un-paused. Returns immediately when not paused.
    async fn paused_barrier(&self) {
        let mut rx = self.pause.subscribe();
        while *rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Sequential image filter over one backend.
#[derive(Debug)]
pub struct FilterWorker {
    backend: Arc<dyn VisionBackend>,
    object: String,
    temperature: f32,
    control: WorkerControl,
}

impl FilterWorker {
    /// Build a worker for a classified endpoint.
    ///
    /// Refuses `ApiKind::Unknown` with `UnsupportedApi`: a run must not
    /// start against an endpoint whose wire format would be a guess.
    pub fn new(
        kind: ApiKind,
        base_url: &str,
        model: &str,
        object: &str,
        temperature: f32,
        options: BackendOptions,
    ) -> QueryResult<Self> {
        let backend = backend_for(kind, base_url, model, options)?;
        Ok(Self::from_backend(backend, object, temperature))
    }

    /// Build a worker around an existing backend.
    pub fn from_backend(backend: Box<dyn VisionBackend>, object: &str, temperature: f32) -> Self {
        Self {
            backend: Arc::from(backend),
            object: object.to_string(),
            temperature,
            control: WorkerControl::new(),
        }
    }

    /// Handle for pausing/stopping the run. Clone before spawning.
    pub fn control(&self) -> WorkerControl {
        self.control.clone()
    }

    /// Spawn the run on a background task, returning its event stream.
    pub fn spawn(
        self,
        images: Vec<PathBuf>,
    ) -> (tokio::task::JoinHandle<()>, mpsc::Receiver<WorkerEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let handle = tokio::spawn(self.run(images, tx));
        (handle, rx)
    }

    /// Process the image list sequentially, emitting events as they happen.
    pub async fn run(self, images: Vec<PathBuf>, events: mpsc::Sender<WorkerEvent>) {
        let total = images.len();
        tracing::info!(
            backend = self.backend.name(),
            total,
            "filter run starting for '{}'",
            self.object
        );
        let _ = events.send(WorkerEvent::Started { total }).await;

        let mut matched = Vec::new();
        let mut processed = 0usize;

        for (index, path) in images.into_iter().enumerate() {
            if self.control.is_stopped() {
                tracing::info!("stopped by caller after {processed}/{total} images");
                let _ = events.send(WorkerEvent::Stopped { processed }).await;
                return;
            }

            self.control.paused_barrier().await;
            // A stop issued while parked lands here
            if self.control.is_stopped() {
                tracing::info!("stopped by caller after {processed}/{total} images");
                let _ = events.send(WorkerEvent::Stopped { processed }).await;
                return;
            }

            let _ = events
                .send(WorkerEvent::Processing {
                    index,
                    total,
                    path: path.clone(),
                })
                .await;

            let verdict = self.judge(&path).await;
            if verdict.matched {
                matched.push(verdict.path.clone());
            }
            processed += 1;
            let _ = events.send(WorkerEvent::Judged(verdict)).await;
        }

        tracing::info!("filter run complete, {} of {total} matched", matched.len());
        let _ = events.send(WorkerEvent::Finished { matched }).await;
    }

    /// Judge one image. Failures become a failed verdict, never an error.
    async fn judge(&self, path: &Path) -> ImageVerdict {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("failed to read {}: {e}", path.display());
                return ImageVerdict {
                    path: path.to_path_buf(),
                    matched: false,
                    answer: None,
                    error: Some(format!("failed to read image: {e}")),
                };
            }
        };

        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let image = ImageInput::from_bytes(&bytes, &format);
        let query = VisionQuery::contains_object(image, &self.object, self.temperature);

        let outcome = ask_about_image(self.backend.as_ref(), &query).await;
        if outcome.success {
            ImageVerdict {
                path: path.to_path_buf(),
                matched: is_affirmative(&outcome.text),
                answer: Some(outcome.text),
                error: None,
            }
        } else {
            ImageVerdict {
                path: path.to_path_buf(),
                matched: false,
                answer: None,
                error: outcome.error,
            }
        }
    }
}

/// Interpret a constrained YES/NO answer.
///
/// Models hedge; an answer is affirmative only when it contains YES and no
/// trace of NO (which also catches "not", "nothing", "nope").
pub fn is_affirmative(answer: &str) -> bool {
    let upper = answer.to_uppercase();
    upper.contains("YES") && !upper.contains("NO")
}

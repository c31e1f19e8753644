//! Export Pipeline
//!
//! Orchestrates decode → composite → encode → persist on a background
//! worker, reporting state and progress back to the timeline-owning context.
//!
//! The worker reads an immutable snapshot of the caption list and style
//! config taken at export start, so concurrent UI edits never corrupt an
//! in-flight export. Cancellation is cooperative and idempotent; it races
//! natural completion safely because the terminal state is published exactly
//! once. Only one export runs per pipeline instance — starting a new one
//! cancels the prior (last-request-wins).

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};

use crate::composition::{CompositionPlan, CompositionPlanner};
use crate::error::{CoreError, CoreResult};
use crate::export::presets::ExportSettings;
use crate::media::{MediaLibrary, SourceMetadata, VideoAsset};
use crate::style::StyleConfig;
use crate::timeline::TimelineSnapshot;
use crate::types::Size2D;

// =============================================================================
// State & Events
// =============================================================================

/// Export pipeline state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExportState {
    Idle,
    /// Loading tracks, validating the source, building the layer plan
    Preparing,
    /// Encoding via the composition backend
    Exporting,
    Completed { output: ExportOutput },
    Failed { error: String },
    Cancelled,
}

impl ExportState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled
        )
    }
}

/// Result of a completed export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutput {
    /// Location of the rendered `.mov`, already persisted to the library
    pub path: PathBuf,
    pub duration_sec: f64,
}

/// Encoder progress update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProgress {
    /// 0.0 ~ 1.0
    pub fraction: f64,
    pub message: String,
}

// =============================================================================
// Encoder Seam
// =============================================================================

/// Abstract encode step provided by the platform media framework.
///
/// Renders the composition plan over the source and writes the container at
/// `settings.output_path`. Implementations report progress through the
/// channel and should return [`CoreError::Cancelled`] when told to stop.
#[async_trait]
pub trait CompositionEncoder: Send + Sync {
    async fn encode(
        &self,
        source: &SourceMetadata,
        plan: &CompositionPlan,
        settings: &ExportSettings,
        progress: mpsc::UnboundedSender<ExportProgress>,
    ) -> CoreResult<()>;
}

// =============================================================================
// Job Handle
// =============================================================================

/// Handle to a running export job.
pub struct ExportJob {
    state_rx: watch::Receiver<ExportState>,
    progress_rx: Option<mpsc::UnboundedReceiver<ExportProgress>>,
}

impl ExportJob {
    /// Latest published state.
    pub fn state(&self) -> ExportState {
        self.state_rx.borrow().clone()
    }

    /// Takes the progress receiver; `None` after the first call.
    pub fn take_progress(&mut self) -> Option<mpsc::UnboundedReceiver<ExportProgress>> {
        self.progress_rx.take()
    }

    /// Waits for the terminal state.
    pub async fn wait(&mut self) -> ExportState {
        loop {
            {
                let state = self.state_rx.borrow();
                if state.is_terminal() {
                    return state.clone();
                }
            }
            if self.state_rx.changed().await.is_err() {
                // Worker dropped without a terminal state: treat as failed
                return ExportState::Failed {
                    error: "export worker terminated unexpectedly".to_string(),
                };
            }
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Drives one export at a time against a media library and encoder backend.
pub struct ExportPipeline {
    library: Arc<dyn MediaLibrary>,
    encoder: Arc<dyn CompositionEncoder>,
    /// Preview viewport the reference font size was authored against
    preview_viewport: Size2D,
    /// Directory where the container is written before library hand-off
    staging_dir: PathBuf,
    current_cancel: Option<oneshot::Sender<()>>,
}

impl ExportPipeline {
    pub fn new(
        library: Arc<dyn MediaLibrary>,
        encoder: Arc<dyn CompositionEncoder>,
        preview_viewport: Size2D,
    ) -> Self {
        Self {
            library,
            encoder,
            preview_viewport,
            staging_dir: std::env::temp_dir(),
            current_cancel: None,
        }
    }

    /// Overrides the staging directory for rendered output.
    pub fn with_staging_dir(mut self, dir: PathBuf) -> Self {
        self.staging_dir = dir;
        self
    }

    /// Starts an export from a copy-on-start timeline snapshot.
    ///
    /// Cancels any export already in flight before starting (the prior job
    /// transitions to `Cancelled`).
    pub fn start(
        &mut self,
        asset: VideoAsset,
        snapshot: TimelineSnapshot,
        style: StyleConfig,
    ) -> ExportJob {
        self.cancel();

        let (state_tx, state_rx) = watch::channel(ExportState::Idle);
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.current_cancel = Some(cancel_tx);

        let output_path = self
            .staging_dir
            .join(format!("{}.mov", uuid::Uuid::new_v4()));
        let worker = ExportWorker {
            library: Arc::clone(&self.library),
            encoder: Arc::clone(&self.encoder),
            planner: CompositionPlanner::new(style, self.preview_viewport),
            asset,
            snapshot,
            output_path,
        };
        tokio::spawn(worker.run(state_tx, progress_tx, cancel_rx));

        ExportJob {
            state_rx,
            progress_rx: Some(progress_rx),
        }
    }

    /// Requests cancellation of the in-flight export, if any.
    ///
    /// Safe to call at any time; a second cancel or a cancel after natural
    /// completion is a no-op.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.current_cancel.take() {
            // Send fails when the worker already finished; that is fine.
            let _ = tx.send(());
        }
    }
}

// =============================================================================
// Worker
// =============================================================================

struct ExportWorker {
    library: Arc<dyn MediaLibrary>,
    encoder: Arc<dyn CompositionEncoder>,
    planner: CompositionPlanner,
    asset: VideoAsset,
    snapshot: TimelineSnapshot,
    output_path: PathBuf,
}

impl ExportWorker {
    async fn run(
        self,
        state_tx: watch::Sender<ExportState>,
        progress_tx: mpsc::UnboundedSender<ExportProgress>,
        mut cancel_rx: oneshot::Receiver<()>,
    ) {
        let output_path = self.output_path.clone();
        let flow = self.export(&state_tx, progress_tx);
        tokio::pin!(flow);

        let terminal = tokio::select! {
            biased;
            _ = &mut cancel_rx => {
                info!("Export cancelled");
                remove_partial_output(&output_path);
                ExportState::Cancelled
            }
            result = &mut flow => match result {
                Ok(output) => {
                    info!("Export completed: {}", output.path.display());
                    ExportState::Completed { output }
                }
                Err(CoreError::Cancelled) => {
                    remove_partial_output(&output_path);
                    ExportState::Cancelled
                }
                Err(err) => {
                    warn!("Export failed: {}", err);
                    remove_partial_output(&output_path);
                    ExportState::Failed {
                        error: err.to_user_message(),
                    }
                }
            }
        };

        // Terminal state is published exactly once
        let _ = state_tx.send(terminal);
    }

    async fn export(
        self,
        state_tx: &watch::Sender<ExportState>,
        progress_tx: mpsc::UnboundedSender<ExportProgress>,
    ) -> CoreResult<ExportOutput> {
        let _ = state_tx.send(ExportState::Preparing);

        let source = self.library.load_playable(&self.asset).await?;
        let plan = self.planner.plan(&self.snapshot, &source)?;
        let settings = ExportSettings::for_render_size(plan.render_size, self.output_path.clone());
        info!(
            "Prepared export: {}x{} preset {:?}, {} layers",
            settings.width,
            settings.height,
            settings.preset,
            plan.layers.len()
        );

        let _ = state_tx.send(ExportState::Exporting);
        self.encoder
            .encode(&source, &plan, &settings, progress_tx)
            .await?;

        // A library-write rejection is a failure, never a completion
        self.library
            .save_video(&self.output_path)
            .await
            .map_err(|err| match err {
                CoreError::PersistFailed(_) => err,
                other => CoreError::PersistFailed(other.to_user_message()),
            })?;

        Ok(ExportOutput {
            path: self.output_path,
            duration_sec: source.duration_sec,
        })
    }
}

fn remove_partial_output(path: &PathBuf) {
    if path.exists() {
        if let Err(err) = std::fs::remove_file(path) {
            warn!("Failed to remove partial export output: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::VideoTransform;
    use crate::error::CoreError;
    use crate::media::{Album, Thumbnail};
    use crate::timeline::{CaptionItem, TimelineConfig};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubLibrary {
        source: SourceMetadata,
        reject_save: bool,
        saves: AtomicUsize,
    }

    impl StubLibrary {
        fn new(source: SourceMetadata) -> Self {
            Self {
                source,
                reject_save: false,
                saves: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MediaLibrary for StubLibrary {
        async fn list_albums(&self) -> CoreResult<Vec<Album>> {
            Ok(vec![])
        }

        async fn load_thumbnail(&self, _asset: &VideoAsset) -> CoreResult<Thumbnail> {
            Err(CoreError::AssetLoadFailed("no thumbnails".to_string()))
        }

        async fn load_playable(&self, _asset: &VideoAsset) -> CoreResult<SourceMetadata> {
            Ok(self.source.clone())
        }

        async fn save_video(&self, _path: &Path) -> CoreResult<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.reject_save {
                Err(CoreError::PermissionDenied("library write denied".to_string()))
            } else {
                Ok(())
            }
        }
    }

    /// Encoder that writes the output file immediately.
    struct InstantEncoder;

    #[async_trait]
    impl CompositionEncoder for InstantEncoder {
        async fn encode(
            &self,
            _source: &SourceMetadata,
            _plan: &CompositionPlan,
            settings: &ExportSettings,
            progress: mpsc::UnboundedSender<ExportProgress>,
        ) -> CoreResult<()> {
            let _ = progress.send(ExportProgress {
                fraction: 1.0,
                message: "encoded".to_string(),
            });
            std::fs::write(&settings.output_path, b"mov")?;
            Ok(())
        }
    }

    /// Encoder that never finishes on its own.
    struct StalledEncoder;

    #[async_trait]
    impl CompositionEncoder for StalledEncoder {
        async fn encode(
            &self,
            _source: &SourceMetadata,
            _plan: &CompositionPlan,
            settings: &ExportSettings,
            _progress: mpsc::UnboundedSender<ExportProgress>,
        ) -> CoreResult<()> {
            std::fs::write(&settings.output_path, b"partial")?;
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    fn source_10s() -> SourceMetadata {
        SourceMetadata {
            asset_id: "asset_1".to_string(),
            uri: "file:///tmp/in.mov".to_string(),
            natural_size: Size2D::new(1920.0, 1080.0),
            transform: VideoTransform::identity(),
            duration_sec: 10.0,
            frame_rate: 30.0,
            has_video_track: true,
            has_audio_track: true,
        }
    }

    fn snapshot() -> TimelineSnapshot {
        TimelineSnapshot {
            captions: vec![CaptionItem::with_text(124.0, 372.0, "hello")],
            config: TimelineConfig::default(),
            duration_sec: 10.0,
        }
    }

    fn pipeline(
        library: Arc<dyn MediaLibrary>,
        encoder: Arc<dyn CompositionEncoder>,
        dir: &Path,
    ) -> ExportPipeline {
        ExportPipeline::new(library, encoder, Size2D::new(360.0, 640.0))
            .with_staging_dir(dir.to_path_buf())
    }

    #[tokio::test]
    async fn test_successful_export_completes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let library = Arc::new(StubLibrary::new(source_10s()));
        let mut pipeline = pipeline(library.clone(), Arc::new(InstantEncoder), dir.path());

        let mut job = pipeline.start(
            VideoAsset::new("asset_1", 10.0),
            snapshot(),
            StyleConfig::default(),
        );

        let state = job.wait().await;
        let ExportState::Completed { output } = state else {
            panic!("expected completion, got {:?}", state);
        };
        assert!(output.path.extension().is_some_and(|e| e == "mov"));
        assert!(output.path.exists());
        assert_eq!(output.duration_sec, 10.0);
        assert_eq!(library.saves.load(Ordering::SeqCst), 1);

        let mut progress = job.take_progress().unwrap();
        assert!(progress.recv().await.is_some());
        assert!(job.take_progress().is_none());
    }

    #[tokio::test]
    async fn test_missing_video_track_fails_in_preparing() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = source_10s();
        source.has_video_track = false;
        let library = Arc::new(StubLibrary::new(source));
        let mut pipeline = pipeline(library, Arc::new(InstantEncoder), dir.path());

        let mut job = pipeline.start(
            VideoAsset::new("asset_1", 10.0),
            snapshot(),
            StyleConfig::default(),
        );

        let state = job.wait().await;
        let ExportState::Failed { error } = state else {
            panic!("expected failure, got {:?}", state);
        };
        assert!(error.contains("no video track"));
    }

    #[tokio::test]
    async fn test_persist_rejection_is_failed_not_completed() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = StubLibrary::new(source_10s());
        library.reject_save = true;
        let library = Arc::new(library);
        let mut pipeline = pipeline(library.clone(), Arc::new(InstantEncoder), dir.path());

        let mut job = pipeline.start(
            VideoAsset::new("asset_1", 10.0),
            snapshot(),
            StyleConfig::default(),
        );

        let state = job.wait().await;
        assert!(matches!(state, ExportState::Failed { .. }));
        assert_eq!(library.saves.load(Ordering::SeqCst), 1);

        // No partial output left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let library = Arc::new(StubLibrary::new(source_10s()));
        let mut pipeline = pipeline(library, Arc::new(StalledEncoder), dir.path());

        let mut job = pipeline.start(
            VideoAsset::new("asset_1", 10.0),
            snapshot(),
            StyleConfig::default(),
        );

        pipeline.cancel();
        // Second cancel is a no-op
        pipeline.cancel();

        let state = job.wait().await;
        assert_eq!(state, ExportState::Cancelled);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_after_completion_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let library = Arc::new(StubLibrary::new(source_10s()));
        let mut pipeline = pipeline(library, Arc::new(InstantEncoder), dir.path());

        let mut job = pipeline.start(
            VideoAsset::new("asset_1", 10.0),
            snapshot(),
            StyleConfig::default(),
        );
        let state = job.wait().await;
        assert!(matches!(state, ExportState::Completed { .. }));

        pipeline.cancel();
        // The completed state stands
        assert!(matches!(job.state(), ExportState::Completed { .. }));
    }

    #[tokio::test]
    async fn test_engine_snapshot_drives_export() {
        use crate::timeline::TimelineEngine;

        let dir = tempfile::tempdir().unwrap();
        let library = Arc::new(StubLibrary::new(source_10s()));
        let mut pipeline = pipeline(library, Arc::new(InstantEncoder), dir.path());

        // Author captions through the engine, then export its snapshot
        let mut engine = TimelineEngine::new(10.0, TimelineConfig::default(), vec![]);
        engine.on_time_update(1.0, false);
        let added = engine.add_caption().unwrap();
        engine.set_caption_text(&added.id, "first words");

        let mut job = pipeline.start(
            VideoAsset::new("asset_1", 10.0),
            engine.snapshot(),
            StyleConfig::default(),
        );
        let state = job.wait().await;
        assert!(matches!(state, ExportState::Completed { .. }));
    }

    #[tokio::test]
    async fn test_last_request_wins() {
        let dir = tempfile::tempdir().unwrap();
        let library = Arc::new(StubLibrary::new(source_10s()));
        let mut pipeline = pipeline(library, Arc::new(StalledEncoder), dir.path());

        let mut first = pipeline.start(
            VideoAsset::new("asset_1", 10.0),
            snapshot(),
            StyleConfig::default(),
        );
        let _second = pipeline.start(
            VideoAsset::new("asset_1", 10.0),
            snapshot(),
            StyleConfig::default(),
        );

        // Starting the second export cancelled the first
        assert_eq!(first.wait().await, ExportState::Cancelled);
    }
}

//! The frame loop and file-level orchestration.

use super::observer::{Alert, FrameEvent, FrameObserver};
use super::session::{OutputSettings, PipelineState, SessionParams};
use crate::detect::Detector;
use crate::error::Result;
use crate::output::{AnnotatedVideo, PendingOutput, RunSummary, timestamped_output_path};
use crate::render::OverlayRenderer;
use crate::video::{FrameSink, FrameSource, SystemBackend, VideoBackend, check_extension};
use chrono::Local;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Result of a successful file-level run.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    /// The finished video.
    pub video: AnnotatedVideo,
    /// What happened during the run.
    pub summary: RunSummary,
}

/// Reads frames, runs detection on every Nth one, draws watched detections
/// and writes every frame to the output.
pub struct AnnotationPipeline<D> {
    detector: D,
    renderer: OverlayRenderer,
    params: SessionParams,
    backend: Box<dyn VideoBackend>,
    state: PipelineState,
}

impl<D: Detector> AnnotationPipeline<D> {
    /// Create an idle pipeline using the compiled-in video backend.
    pub fn new(detector: D, renderer: OverlayRenderer, params: SessionParams) -> Self {
        Self {
            detector,
            renderer,
            params,
            backend: Box::new(SystemBackend),
            state: PipelineState::Idle,
        }
    }

    /// Replace the backend used by [`annotate_file`](Self::annotate_file).
    #[must_use]
    pub fn with_backend(mut self, backend: impl VideoBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Access the detector, e.g. to inspect a test double after a run.
    pub const fn detector(&self) -> &D {
        &self.detector
    }

    /// Stream `source` into `sink` until the input is exhausted.
    ///
    /// The sink is finalized only on success. On error the pipeline ends in
    /// [`PipelineState::Failed`] and the error is returned unchanged.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        observer: &mut dyn FrameObserver,
    ) -> Result<RunSummary> {
        let started = Instant::now();
        self.state = PipelineState::Streaming;

        match self.stream(source, sink, observer) {
            Ok(mut summary) => {
                summary.elapsed_secs = started.elapsed().as_secs_f64();
                self.state = PipelineState::Done;
                info!(
                    frames = summary.frames_read,
                    analyzed = summary.frames_analyzed,
                    alerts = summary.alerted_frames.len(),
                    boxes = summary.boxes_drawn(),
                    elapsed_secs = format_args!("{:.2}", summary.elapsed_secs),
                    "annotation complete"
                );
                observer.run_finished(&summary);
                Ok(summary)
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    fn stream(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        observer: &mut dyn FrameObserver,
    ) -> Result<RunSummary> {
        let geometry = source.geometry();
        let mut summary = RunSummary::new(geometry);
        observer.run_started(&geometry, source.frame_count_hint());

        let threshold = self.params.confidence_threshold();
        let mut index: u64 = 0;

        while let Some(mut frame) = source.read_frame()? {
            frame.check_geometry(&geometry)?;
            frame.index = index;

            if self.params.should_process(index) {
                let detections = self.detector.detect(&frame, threshold)?;
                let watched = self.renderer.palette().filter_watched(detections);
                summary.frames_analyzed += 1;

                if !watched.is_empty() {
                    self.renderer.draw(&mut frame, &watched)?;
                    for detection in &watched {
                        summary.record_detection(&detection.label);
                    }
                    summary.alerted_frames.push(index);
                    observer.alert(&Alert {
                        frame_index: index,
                        detections: &watched,
                    });
                }
                debug!(frame = index, watched = watched.len(), "frame analyzed");

                sink.write_frame(&frame)?;
                observer.frame_annotated(&FrameEvent {
                    frame: &frame,
                    detections: &watched,
                });
            } else {
                sink.write_frame(&frame)?;
            }

            observer.frame_written(index);
            summary.frames_read += 1;
            index += 1;
        }

        sink.finish()?;
        Ok(summary)
    }

    /// Annotate a video file into a new timestamped file under
    /// `output.dir`.
    ///
    /// The input extension is checked before anything is opened. If the run
    /// does not complete, the partially written output is removed.
    pub fn annotate_file(
        &mut self,
        input: &Path,
        output: &OutputSettings,
        observer: &mut dyn FrameObserver,
    ) -> Result<CompletedRun> {
        let result = self.annotate_file_inner(input, output, observer);
        if result.is_err() {
            self.state = PipelineState::Failed;
        }
        result
    }

    fn annotate_file_inner(
        &mut self,
        input: &Path,
        output: &OutputSettings,
        observer: &mut dyn FrameObserver,
    ) -> Result<CompletedRun> {
        check_extension(input)?;

        info!(input = %input.display(), "annotating video");
        let mut source = self.backend.open_source(input)?;

        std::fs::create_dir_all(&output.dir)?;
        let pending = PendingOutput::new(timestamped_output_path(
            &output.dir,
            &output.prefix,
            Local::now(),
        ));
        let mut sink = self.backend.create_sink(pending.path(), source.geometry())?;

        let mut summary = self.run(source.as_mut(), sink.as_mut(), observer)?;
        drop(sink);
        drop(source);

        let path = pending.commit();
        summary.output = Some(path.clone());
        info!(output = %path.display(), "annotated video ready");

        Ok(CompletedRun {
            video: AnnotatedVideo::new(path, output.download_name.clone()),
            summary,
        })
    }
}

//! Annotation pipeline: the per-frame loop and its file-level wrapper.

mod annotate;
mod observer;
mod session;

pub use annotate::{AnnotationPipeline, CompletedRun};
pub use observer::{Alert, FrameEvent, FrameObserver, NullObserver, Observers};
pub use session::{OutputSettings, PipelineState, SessionParams};

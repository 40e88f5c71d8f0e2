//! Run outputs: the annotated video, its summary and console feedback.

mod artifact;
mod console;
mod pending;
pub mod progress;
mod summary;

pub use artifact::{AnnotatedVideo, timestamped_output_path};
pub use console::{ConsoleObserver, write_preview};
pub use pending::{PendingOutput, cleanup_pending_outputs};
pub use summary::{ENVELOPE_VERSION, ErrorPayload, EventType, JsonEnvelope, RunSummary};

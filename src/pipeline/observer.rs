//! Side-channel notifications from a running pipeline.

use crate::detect::Detection;
use crate::output::RunSummary;
use crate::video::{Frame, VideoGeometry};

/// A frame that went through the detector, after drawing.
#[derive(Debug)]
pub struct FrameEvent<'a> {
    /// The frame as written to the output.
    pub frame: &'a Frame,
    /// Watched detections drawn on it (possibly none).
    pub detections: &'a [Detection],
}

/// Raised when an analyzed frame has at least one watched detection.
#[derive(Debug)]
pub struct Alert<'a> {
    /// Index of the frame.
    pub frame_index: u64,
    /// Watched detections that triggered the alert.
    pub detections: &'a [Detection],
}

impl Alert<'_> {
    /// Distinct labels in detection order, e.g. `garbage_bag, garbage_throw`.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for detection in self.detections {
            if !labels.contains(&detection.label.as_str()) {
                labels.push(&detection.label);
            }
        }
        labels
    }
}

/// Receives preview, alert and progress callbacks. All methods default to
/// doing nothing.
pub trait FrameObserver {
    /// Streaming is about to begin.
    fn run_started(&mut self, _geometry: &VideoGeometry, _frame_count: Option<u64>) {}

    /// An analyzed frame is ready for preview.
    fn frame_annotated(&mut self, _event: &FrameEvent<'_>) {}

    /// Watched objects were detected on a frame.
    fn alert(&mut self, _alert: &Alert<'_>) {}

    /// Frame `index` was written to the output.
    fn frame_written(&mut self, _index: u64) {}

    /// The run reached the end of the input.
    fn run_finished(&mut self, _summary: &RunSummary) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl FrameObserver for NullObserver {}

/// Fans every callback out to several observers, in insertion order.
#[derive(Default)]
pub struct Observers {
    inner: Vec<Box<dyn FrameObserver>>,
}

impl Observers {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer.
    pub fn push(&mut self, observer: impl FrameObserver + 'static) {
        self.inner.push(Box::new(observer));
    }

    /// Builder-style [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, observer: impl FrameObserver + 'static) -> Self {
        self.push(observer);
        self
    }

    /// Number of observers.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FrameObserver for Observers {
    fn run_started(&mut self, geometry: &VideoGeometry, frame_count: Option<u64>) {
        for o in &mut self.inner {
            o.run_started(geometry, frame_count);
        }
    }

    fn frame_annotated(&mut self, event: &FrameEvent<'_>) {
        for o in &mut self.inner {
            o.frame_annotated(event);
        }
    }

    fn alert(&mut self, alert: &Alert<'_>) {
        for o in &mut self.inner {
            o.alert(alert);
        }
    }

    fn frame_written(&mut self, index: u64) {
        for o in &mut self.inner {
            o.frame_written(index);
        }
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        for o in &mut self.inner {
            o.run_finished(summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BoundingBox;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Counter(Rc<RefCell<u64>>);

    impl FrameObserver for Counter {
        fn frame_written(&mut self, _index: u64) {
            *self.0.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_observers_fan_out() {
        let a = Rc::new(RefCell::new(0));
        let b = Rc::new(RefCell::new(0));
        let mut observers = Observers::new()
            .with(Counter(Rc::clone(&a)))
            .with(NullObserver)
            .with(Counter(Rc::clone(&b)));

        observers.frame_written(0);
        observers.frame_written(1);

        assert_eq!(observers.len(), 3);
        assert_eq!(*a.borrow(), 2);
        assert_eq!(*b.borrow(), 2);
    }

    #[test]
    fn test_alert_labels_are_distinct() {
        let bbox = BoundingBox::new(0, 0, 1, 1);
        let detections = [
            Detection::new("garbage_bag", 0.9, bbox),
            Detection::new("garbage_throw", 0.6, bbox),
            Detection::new("garbage_bag", 0.5, bbox),
        ];
        let alert = Alert {
            frame_index: 4,
            detections: &detections,
        };
        assert_eq!(alert.labels(), vec!["garbage_bag", "garbage_throw"]);
    }
}

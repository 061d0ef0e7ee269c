//! Per-renderer lifecycle handle.
//!
//! One [`RendererHandle`] exists per chart and is owned by the
//! [`Sequencer`](crate::sequencer::Sequencer). It guarantees that a chart's
//! dataset is requested at most once and records whether the chart has
//! reached the screen.

use crate::error::LoadError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Step never activated.
    #[default]
    Idle,
    /// Fetch in flight.
    Loading,
    /// Data parsed and transformed.
    Ready,
    /// Fetch or parse failed; the chart shows an error message.
    Failed,
    /// Expected columns or rows were missing; the chart stays blank.
    Aborted,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RendererHandle {
    has_loaded: bool,
    has_drawn: bool,
    status: LoadStatus,
    error: Option<String>,
}

impl RendererHandle {
    /// Claim the one load this renderer will ever perform.
    ///
    /// Returns `false` if a load was already started.
    pub fn begin_load(&mut self) -> bool {
        if self.has_loaded {
            return false;
        }
        self.has_loaded = true;
        self.status = LoadStatus::Loading;
        true
    }

    /// Record the outcome of the load started by [`begin_load`](Self::begin_load).
    pub fn finish_load(&mut self, outcome: Result<(), &LoadError>) {
        match outcome {
            Ok(()) => {
                self.status = LoadStatus::Ready;
                self.error = None;
            }
            Err(e) if e.aborts_silently() => {
                self.status = LoadStatus::Aborted;
                self.error = None;
            }
            Err(e) => self.fail_load(e),
        }
    }

    /// Record a failure that always shows the error message, whatever its
    /// class. Used where a partial load cannot be drawn blank.
    pub fn fail_load(&mut self, error: &LoadError) {
        self.status = LoadStatus::Failed;
        self.error = Some(error.to_string());
    }

    /// Record that the chart was painted. Returns `true` only the first time.
    pub fn mark_drawn(&mut self) -> bool {
        if self.has_drawn {
            return false;
        }
        self.has_drawn = true;
        true
    }

    pub fn has_loaded(&self) -> bool {
        self.has_loaded
    }

    pub fn has_drawn(&self) -> bool {
        self.has_drawn
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_load_only_once() {
        let mut handle = RendererHandle::default();
        assert_eq!(handle.status(), LoadStatus::Idle);
        assert!(handle.begin_load());
        assert_eq!(handle.status(), LoadStatus::Loading);
        assert!(!handle.begin_load());
        assert!(handle.has_loaded());
    }

    #[test]
    fn test_finish_load_classifies_errors() {
        let mut handle = RendererHandle::default();
        handle.begin_load();
        handle.finish_load(Err(&LoadError::Empty { what: "rows" }));
        assert_eq!(handle.status(), LoadStatus::Aborted);
        assert_eq!(handle.error(), None);

        let mut handle = RendererHandle::default();
        handle.begin_load();
        handle.finish_load(Err(&LoadError::Http {
            path: "a".into(),
            message: "HTTP 500".into(),
        }));
        assert_eq!(handle.status(), LoadStatus::Failed);
        assert!(handle.error().unwrap().contains("HTTP 500"));
    }

    #[test]
    fn test_fail_load_ignores_silent_class() {
        let mut handle = RendererHandle::default();
        handle.begin_load();
        handle.fail_load(&LoadError::MissingColumns { available: vec![] });
        assert_eq!(handle.status(), LoadStatus::Failed);
        assert!(handle.error().is_some());
    }

    #[test]
    fn test_mark_drawn_first_time_only() {
        let mut handle = RendererHandle::default();
        assert!(handle.mark_drawn());
        assert!(!handle.mark_drawn());
        assert!(handle.has_drawn());
    }
}

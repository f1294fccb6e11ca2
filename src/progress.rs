//! Advisory progress reporting.
//!
//! The engine reports "phase title, current item, fractional completion"
//! through a [`ProgressSink`]. Reporting is purely observational; the only
//! guarantee the engine gives is that the indicator is cleared on every
//! exit path, which is what [`ProgressScope`] exists for.

/// Receiver for engine progress updates.
pub trait ProgressSink {
    /// Shows `item` under the phase `title`, `fraction` (0..=1) complete.
    fn report(&self, title: &str, item: &str, fraction: f32);

    /// Removes the indicator.
    fn clear(&self);
}

/// Default sink: forwards updates to `log::debug!`.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, title: &str, item: &str, fraction: f32) {
        log::debug!("[{:3.0}%] {title}: {item}", fraction * 100.0);
    }

    fn clear(&self) {}
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _title: &str, _item: &str, _fraction: f32) {}

    fn clear(&self) {}
}

/// Scoped hold of the progress indicator. Dropping the scope clears the
/// sink, so a phase cannot leave a stale indicator behind no matter how it
/// exits.
pub struct ProgressScope<'a> {
    sink: &'a dyn ProgressSink,
}

impl<'a> ProgressScope<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink }
    }

    pub fn report(&self, title: &str, item: &str, fraction: f32) {
        self.sink.report(title, item, fraction);
    }
}

impl Drop for ProgressScope<'_> {
    fn drop(&mut self) {
        self.sink.clear();
    }
}

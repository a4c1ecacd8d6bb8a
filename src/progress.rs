// src/progress.rs
/// Progress reporting for a reconciliation run.
/// Frontends implement this to surface per-file status; every method has a
/// no-op default.
pub trait Progress {
    /// Called once with the number of HTML files about to be processed.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called after each file has been matched and merged (or skipped).
    fn item_done(&mut self, _name: &str) {}

    /// Called at the end of the run.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use crate::train::iteration_stats::IterationStats;

/// Optional controls for a fit run.
///
/// # Fields
/// - `stop_flag`    — when set to `true` from another thread, the loop stops
///                    before starting its next iteration.
/// - `progress_tx`  — channel receiving `IterationStats`. If the receiver is
///                    dropped the loop stops early.
/// - `report_every` — send progress every N iterations (0 is treated as 1).
///
/// The default has neither flag nor channel, so the loop always runs the full
/// iteration count.
pub struct FitConfig {
    pub stop_flag: Option<Arc<AtomicBool>>,
    pub progress_tx: Option<mpsc::Sender<IterationStats>>,
    pub report_every: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig { stop_flag: None, progress_tx: None, report_every: 1 }
    }
}

impl FitConfig {
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<IterationStats>, report_every: usize) -> Self {
        self.progress_tx = Some(tx);
        self.report_every = report_every;
        self
    }
}

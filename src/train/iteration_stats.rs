/// Progress sample emitted by the fit loop.
///
/// When a `progress_tx` channel is configured in `FitConfig`, the loop sends
/// one `IterationStats` every `report_every` iterations and always on the
/// final iteration it runs.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationStats {
    /// 1-based iteration number.
    pub iteration: usize,
    /// Total iterations requested for this fit.
    pub total_iterations: usize,
    /// Regularized training loss computed at this iteration.
    pub loss: f64,
}

/// Outcome of a completed `fit` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    /// Number of parameter updates actually applied.
    pub iterations_run: usize,
    /// Last recorded loss, `None` when no iteration ran.
    pub final_loss: Option<f64>,
    /// True when the stop flag or a dropped progress receiver ended the fit.
    pub stopped_early: bool,
}

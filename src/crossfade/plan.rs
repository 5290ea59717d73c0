use tracing::warn;

use crate::error::PlanError;

/// Minimum non-overlapping clip time (seconds) a plan must leave, and the
/// shortest crossfade it accepts
pub const PLAN_EPSILON: f64 = 0.01;

/// Timing of the crossfade that hides the loop seam
///
/// Within one loop iteration of `clip_duration` seconds, copy A plays alone
/// until `offset`, then blends into the time-shifted copy B over
/// `crossfade_duration` seconds. The repeatable loop unit is the slice
/// `[crossfade_duration, clip_duration)` of that iteration: it opens on copy
/// A at `crossfade_duration` and closes on copy B at the same source time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadePlan {
    clip_duration: f64,
    crossfade_duration: f64,
    offset: f64,
}

/// Plan a loop crossfade for a clip
///
/// Fails with [`PlanError::Infeasible`] unless the clip is longer than the
/// crossfade by more than [`PLAN_EPSILON`]. Crossfades shorter than
/// [`PLAN_EPSILON`] are rejected as [`PlanError::InvalidDuration`].
pub fn plan(clip_duration: f64, crossfade_duration: f64) -> Result<CrossfadePlan, PlanError> {
    check_positive("clip", clip_duration)?;
    check_positive("crossfade", crossfade_duration)?;

    if crossfade_duration < PLAN_EPSILON {
        return Err(PlanError::InvalidDuration {
            name: "crossfade",
            value: crossfade_duration,
        });
    }

    if clip_duration <= crossfade_duration + PLAN_EPSILON {
        return Err(PlanError::Infeasible {
            clip_duration,
            crossfade_duration,
        });
    }

    if crossfade_duration > clip_duration / 2.0 {
        warn!(
            "Crossfade of {:.2}s covers more than half of the {:.2}s clip; the loop will not wrap cleanly",
            crossfade_duration, clip_duration
        );
    }

    Ok(CrossfadePlan {
        clip_duration,
        crossfade_duration,
        offset: clip_duration - crossfade_duration,
    })
}

fn check_positive(name: &'static str, value: f64) -> Result<(), PlanError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlanError::InvalidDuration { name, value })
    }
}

impl CrossfadePlan {
    pub fn clip_duration(&self) -> f64 {
        self.clip_duration
    }

    pub fn crossfade_duration(&self) -> f64 {
        self.crossfade_duration
    }

    /// Time within the loop at which the crossfade begins
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Offset in whole milliseconds, as taken by audio delay filters
    pub fn offset_millis(&self) -> u64 {
        (self.offset * 1000.0).round() as u64
    }

    /// Weight of copy B at time `t` (seconds into the loop)
    ///
    /// 0.0 up to `offset`, 1.0 from `offset + crossfade_duration`, linear in
    /// between. Copy A's weight is `1.0 - blend_weight(t)`.
    pub fn blend_weight(&self, t: f64) -> f64 {
        ((t - self.offset) / self.crossfade_duration).clamp(0.0, 1.0)
    }

    /// Time within the iteration where the repeatable loop unit starts
    pub fn loop_start(&self) -> f64 {
        self.crossfade_duration
    }

    /// Length of the repeatable loop unit
    pub fn loop_duration(&self) -> f64 {
        self.offset
    }

    /// Source clip time shown at `t` seconds into the iteration, following
    /// whichever copy dominates the blend (copy B lags by `offset`)
    pub fn source_time(&self, t: f64) -> f64 {
        if self.blend_weight(t) < 0.5 {
            t
        } else {
            t - self.offset
        }
    }
}

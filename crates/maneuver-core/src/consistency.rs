//! Tracker identity-swap detection.
//!
//! When a tracker hands an id to a different person the centroid teleports.
//! Any turn measured across that seam is garbage, so detection is skipped
//! while the jump remains inside the inspected window.

use surftrack_model::geometry::Point2D;

use crate::history::History;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Consistency {
    Consistent,
    /// Largest adjacent displacement found in the window.
    Jump { distance: f64 },
}

impl Consistency {
    pub fn is_consistent(&self) -> bool {
        matches!(self, Self::Consistent)
    }
}

#[derive(Debug, Clone)]
pub struct ConsistencyGuard {
    window: usize,
    max_jump_px: f64,
}

impl ConsistencyGuard {
    pub fn new(window: usize, max_jump_px: f64) -> Self {
        Self {
            window: window.max(2),
            max_jump_px,
        }
    }

    /// Inspect the last `window` positions for an implausible step.
    pub fn check(&self, trajectory: &History<Point2D>) -> Consistency {
        let recent = trajectory.recent(self.window);
        let worst = recent
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .fold(0.0_f64, f64::max);

        if worst > self.max_jump_px {
            Consistency::Jump { distance: worst }
        } else {
            Consistency::Consistent
        }
    }
}

//! Turn detection over the smoothed heading history.
//!
//! A turn is accepted when, in this order:
//! 1. the cooldown since the last accepted turn has elapsed,
//! 2. enough heading samples exist,
//! 3. the recent heading changes agree in direction,
//! 4. the accumulated change is large enough,
//! 5. the mean angular speed is high enough.
//!
//! The detector only decides. Recording the accepted frame is the caller's job.

use std::f64::consts::{PI, TAU};

use surftrack_model::maneuver::{TurnDirection, TurnMetrics};

use crate::config::ManeuverConfig;
use crate::history::History;

/// Why a frame did not produce a turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Too soon after the previous maneuver.
    Cooldown { frames_since: u64 },
    InsufficientHistory { samples: usize },
    /// Heading changes disagree in sign (or the latest one is zero).
    NotSustained,
    BelowAngle { angle_deg: f64 },
    BelowSpeed { angular_speed_deg_s: f64 },
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cooldown { .. } => "cooldown",
            Self::InsufficientHistory { .. } => "insufficient_history",
            Self::NotSustained => "not_sustained",
            Self::BelowAngle { .. } => "below_angle",
            Self::BelowSpeed { .. } => "below_speed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnDecision {
    Accepted(TurnMetrics),
    Rejected(Rejection),
}

#[derive(Debug, Clone)]
pub struct TurnDetector {
    cooldown_frames: u64,
    sustain_window: usize,
    lookback: usize,
    min_turn_angle_deg: f64,
    min_angular_speed_deg_s: f64,
    time_epsilon_s: f64,
}

impl TurnDetector {
    pub fn new(config: &ManeuverConfig) -> Self {
        Self {
            cooldown_frames: config.min_frames_between_maneuvers,
            sustain_window: config.sustain_window.max(2),
            lookback: config.detector_lookback.max(config.sustain_window + 2),
            min_turn_angle_deg: config.min_turn_angle_deg,
            min_angular_speed_deg_s: config.min_angular_speed_deg_s,
            time_epsilon_s: config.time_epsilon_s,
        }
    }

    /// Decide whether the current frame completes a turn.
    ///
    /// `angles` are smoothed headings in radians; `timestamps` must be
    /// tail-aligned with them.
    pub fn detect(
        &self,
        angles: &History<f64>,
        timestamps: &History<f64>,
        last_maneuver_frame: Option<u64>,
        current_frame: u64,
    ) -> TurnDecision {
        if let Some(last) = last_maneuver_frame {
            let frames_since = current_frame.saturating_sub(last);
            if frames_since < self.cooldown_frames {
                return TurnDecision::Rejected(Rejection::Cooldown { frames_since });
            }
        }

        let s = self.sustain_window;
        let n = self.lookback.min(angles.len()).min(timestamps.len());
        if n < s + 2 {
            return TurnDecision::Rejected(Rejection::InsufficientHistory {
                samples: angles.len(),
            });
        }

        let recent_angles = angles.recent(n);
        let recent_times = timestamps.recent(n);

        let (deltas, speeds): (Vec<f64>, Vec<f64>) = recent_angles
            .windows(2)
            .zip(recent_times.windows(2))
            .map(|(a, t)| {
                let d_theta = wrap_angle(a[1] - a[0]);
                let dt = (t[1] - t[0]).max(self.time_epsilon_s);
                (d_theta, (d_theta / dt).abs())
            })
            .unzip();

        let deltas = &deltas[deltas.len() - s..];
        let speeds = &speeds[speeds.len() - s..];

        let latest = deltas[s - 1];
        if latest == 0.0 || !latest.is_finite() {
            return TurnDecision::Rejected(Rejection::NotSustained);
        }
        let agreeing = deltas
            .iter()
            .filter(|d| d.signum() == latest.signum() && **d != 0.0)
            .count();
        if agreeing < s - 1 {
            return TurnDecision::Rejected(Rejection::NotSustained);
        }

        let change_deg = deltas.iter().sum::<f64>().to_degrees();
        if change_deg.abs() < self.min_turn_angle_deg {
            return TurnDecision::Rejected(Rejection::BelowAngle {
                angle_deg: change_deg.abs(),
            });
        }

        let angular_speed_deg_s = (speeds.iter().sum::<f64>() / s as f64).to_degrees();
        if angular_speed_deg_s < self.min_angular_speed_deg_s {
            return TurnDecision::Rejected(Rejection::BelowSpeed { angular_speed_deg_s });
        }

        TurnDecision::Accepted(TurnMetrics {
            angle_deg: change_deg.abs(),
            direction: TurnDirection::from_angle_change(change_deg),
            angular_speed_deg_s,
        })
    }
}

/// Wrap an angle difference into `[-π, π]`.
pub fn wrap_angle(delta: f64) -> f64 {
    if !delta.is_finite() {
        return delta;
    }
    let wrapped = (delta + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI && delta > 0.0 {
        PI
    } else {
        wrapped
    }
}

/// Clickable indicator — the little mark that bobs while input is accepted.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use super::host::ClickableSignal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// How far the mark travels up before coming back down.
    pub move_distance: f32,
    /// Seconds for one leg (up, or down).
    pub animation_duration: f32,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            move_distance: 10.0,
            animation_duration: 0.5,
        }
    }
}

/// Sine ease-in-out over `t ∈ [0, 1]`.
pub fn ease_in_out_sine(t: f32) -> f32 {
    -((PI * t.clamp(0.0, 1.0)).cos() - 1.0) / 2.0
}

#[derive(Debug, Clone)]
pub struct ClickableIndicator {
    config: IndicatorConfig,
    clickable: bool,
    alpha: f32,
    /// Time into the current up-and-down cycle; `None` when not animating.
    phase: Option<f32>,
}

impl ClickableIndicator {
    /// Starts hidden.
    pub fn new(config: IndicatorConfig) -> Self {
        Self {
            config,
            clickable: false,
            alpha: 0.0,
            phase: None,
        }
    }

    pub fn is_clickable(&self) -> bool {
        self.clickable
    }

    pub fn is_animating(&self) -> bool {
        self.phase.is_some()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Vertical offset from the resting position.
    pub fn offset(&self) -> f32 {
        let Some(phase) = self.phase else {
            return 0.0;
        };
        let leg = self.config.animation_duration;
        if leg <= 0.0 {
            return 0.0;
        }
        let eased = if phase < leg {
            ease_in_out_sine(phase / leg)
        } else {
            1.0 - ease_in_out_sine((phase - leg) / leg)
        };
        eased * self.config.move_distance
    }

    pub fn tick(&mut self, dt: f32) {
        let cycle = self.config.animation_duration * 2.0;
        if let Some(phase) = self.phase.as_mut() {
            if cycle > 0.0 {
                *phase = (*phase + dt) % cycle;
            }
        }
    }

    fn show(&mut self) {
        self.alpha = 1.0;
        if self.phase.is_none() {
            self.phase = Some(0.0);
        }
    }

    fn hide(&mut self) {
        self.phase = None;
        self.alpha = 0.0;
    }
}

impl ClickableSignal for ClickableIndicator {
    fn set_clickable(&mut self, clickable: bool) {
        self.clickable = clickable;
        if clickable {
            self.show();
        } else {
            self.hide();
        }
    }
}

impl Default for ClickableIndicator {
    fn default() -> Self {
        Self::new(IndicatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_hidden() {
        let ind = ClickableIndicator::default();
        assert_eq!(ind.alpha(), 0.0);
        assert!(!ind.is_animating());
        assert_eq!(ind.offset(), 0.0);
    }

    #[test]
    fn bobs_up_and_back_down() {
        let mut ind = ClickableIndicator::new(IndicatorConfig {
            move_distance: 10.0,
            animation_duration: 0.5,
        });
        ind.set_clickable(true);
        assert_eq!(ind.alpha(), 1.0);
        ind.tick(0.25);
        assert!((ind.offset() - 5.0).abs() < 1e-4);
        ind.tick(0.25);
        assert!((ind.offset() - 10.0).abs() < 1e-4);
        ind.tick(0.5);
        assert!(ind.offset().abs() < 1e-4);
    }

    #[test]
    fn hide_resets_position() {
        let mut ind = ClickableIndicator::default();
        ind.set_clickable(true);
        ind.tick(0.3);
        ind.set_clickable(false);
        assert_eq!(ind.offset(), 0.0);
        assert_eq!(ind.alpha(), 0.0);
        assert!(!ind.is_clickable());
    }

    #[test]
    fn showing_twice_keeps_the_animation_running() {
        let mut ind = ClickableIndicator::default();
        ind.set_clickable(true);
        ind.tick(0.2);
        let before = ind.offset();
        ind.set_clickable(true);
        assert_eq!(ind.offset(), before);
    }
}

/// Transition fade controller — drives a shader progress value and an
/// overlay alpha toward targets, one `tick` per rendered frame.
///
/// Progress moves linearly over `progress_duration`; the overlay alpha eases
/// with smoothstep over `overlay_duration`. With `fade_image` set, the
/// background image alpha follows the overlay target linearly on the progress
/// clock. Every value lands exactly on its target before the completion
/// callback runs.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("a transition is already running")]
    AlreadyRunning,
    #[error("transition target is indistinguishable from the current state")]
    AlreadyAtTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Seconds for the progress value to reach its target.
    pub progress_duration: f32,
    /// Seconds for the overlay alpha to reach its target.
    pub overlay_duration: f32,
    /// Targets closer than this to the current values are rejected.
    pub epsilon: f32,
    /// Also fade the background image's own alpha. When off it stays at 1.
    pub fade_image: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            progress_duration: 1.0,
            overlay_duration: 1.0,
            epsilon: 1e-4,
            fade_image: true,
        }
    }
}

/// Where a fade ends up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeTarget {
    pub progress: f32,
    pub overlay_alpha: f32,
}

impl FadeTarget {
    /// Screen masked, overlay gone.
    pub const BLACK: FadeTarget = FadeTarget::new(0.0, 0.0);
    /// Screen open, overlay fully visible.
    pub const CLEAR: FadeTarget = FadeTarget::new(1.0, 1.0);

    pub const fn new(progress: f32, overlay_alpha: f32) -> Self {
        Self {
            progress,
            overlay_alpha,
        }
    }

    fn clamped(self) -> Self {
        Self::new(self.progress.clamp(0.0, 1.0), self.overlay_alpha.clamp(0.0, 1.0))
    }
}

/// Snapshot of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionState {
    pub progress: f32,
    pub overlay_alpha: f32,
    pub image_alpha: f32,
    pub running: bool,
}

/// What a `tick` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    Idle,
    Running,
    /// The run finished on this tick; its callback has already been invoked.
    Completed,
}

/// Callback fired once when a run completes.
pub type Completion = Box<dyn FnOnce()>;

struct Run {
    from: FadeTarget,
    to: FadeTarget,
    image_from: f32,
    progress_elapsed: f32,
    overlay_elapsed: f32,
    on_complete: Option<Completion>,
}

/// One fade element. Independent controllers never share state.
pub struct TransitionController {
    config: TransitionConfig,
    progress: f32,
    overlay_alpha: f32,
    image_alpha: f32,
    run: Option<Run>,
}

impl std::fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionController")
            .field("config", &self.config)
            .field("progress", &self.progress)
            .field("overlay_alpha", &self.overlay_alpha)
            .field("image_alpha", &self.image_alpha)
            .field("running", &self.run.is_some())
            .finish()
    }
}

/// `3t² − 2t³`, with `t` clamped to `[0, 1]`.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Fraction of `duration` covered by `elapsed`; zero-length spans are done.
fn fraction(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

impl TransitionController {
    /// A controller at rest with every value at 1.
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            progress: 1.0,
            overlay_alpha: 1.0,
            image_alpha: 1.0,
            run: None,
        }
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn overlay_alpha(&self) -> f32 {
        self.overlay_alpha
    }

    /// Alpha for the background image under the shader.
    pub fn image_alpha(&self) -> f32 {
        self.image_alpha
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn state(&self) -> TransitionState {
        TransitionState {
            progress: self.progress,
            overlay_alpha: self.overlay_alpha,
            image_alpha: self.image_alpha,
            running: self.is_running(),
        }
    }

    /// Cancel any run (its callback is dropped) and return every value to 1.
    pub fn reset_state(&mut self) {
        if self.run.take().is_some() {
            debug!("transition reset while running; pending completion dropped");
        }
        self.progress = 1.0;
        self.overlay_alpha = 1.0;
        self.image_alpha = 1.0;
    }

    /// Start a fade toward `target`.
    ///
    /// Rejected while another run is in flight, or when the current values
    /// already match the target. `on_complete` is invoked even on rejection,
    /// so callers waiting on it never stall.
    pub fn play(
        &mut self,
        target: FadeTarget,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<(), TransitionError> {
        if self.run.is_some() {
            warn!("transition requested while one is already running; ignored");
            on_complete();
            return Err(TransitionError::AlreadyRunning);
        }

        let target = target.clamped();
        let eps = self.config.epsilon;
        if (self.progress - target.progress).abs() < eps
            && (self.overlay_alpha - target.overlay_alpha).abs() < eps
        {
            warn!(
                "transition target ({}, {}) equals the current state; ignored",
                target.progress, target.overlay_alpha
            );
            on_complete();
            return Err(TransitionError::AlreadyAtTarget);
        }

        self.run = Some(Run {
            from: FadeTarget::new(self.progress, self.overlay_alpha),
            to: target,
            image_from: self.image_alpha,
            progress_elapsed: 0.0,
            overlay_elapsed: 0.0,
            on_complete: Some(Box::new(on_complete)),
        });
        Ok(())
    }

    /// Like [`play`](Self::play), but a run in flight is cancelled first: its
    /// callback never fires and the new run starts from the values held now.
    pub fn replay(
        &mut self,
        target: FadeTarget,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<(), TransitionError> {
        if self.run.take().is_some() {
            debug!(
                "transition cancelled at progress {} alpha {}",
                self.progress, self.overlay_alpha
            );
        }
        self.play(target, on_complete)
    }

    /// Fade to black: progress and overlay both to 0.
    pub fn play_to_black(
        &mut self,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<(), TransitionError> {
        self.play(FadeTarget::BLACK, on_complete)
    }

    /// Start from black (progress snapped to 0) and open up to 1.
    pub fn play_from_black(
        &mut self,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<(), TransitionError> {
        if self.run.is_some() {
            return self.play(FadeTarget::CLEAR, on_complete);
        }
        self.progress = 0.0;
        self.play(FadeTarget::CLEAR, on_complete)
    }

    /// Advance the run in flight by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TransitionStatus {
        let Some(run) = self.run.as_mut() else {
            return TransitionStatus::Idle;
        };

        run.progress_elapsed += dt;
        run.overlay_elapsed += dt;

        let p = fraction(run.progress_elapsed, self.config.progress_duration);
        let a = fraction(run.overlay_elapsed, self.config.overlay_duration);
        self.progress = lerp(run.from.progress, run.to.progress, p);
        self.overlay_alpha = lerp(run.from.overlay_alpha, run.to.overlay_alpha, smoothstep(a));
        if self.config.fade_image {
            self.image_alpha = lerp(run.image_from, run.to.overlay_alpha, p);
        }

        if p >= 1.0 && a >= 1.0 {
            self.complete();
            TransitionStatus::Completed
        } else {
            TransitionStatus::Running
        }
    }

    /// Jump to the end of the current run. Returns false when idle.
    pub fn finish_now(&mut self) -> bool {
        if self.run.is_none() {
            return false;
        }
        self.complete();
        true
    }

    fn complete(&mut self) {
        if let Some(mut run) = self.run.take() {
            self.progress = run.to.progress;
            self.overlay_alpha = run.to.overlay_alpha;
            if self.config.fade_image {
                self.image_alpha = run.to.overlay_alpha;
            }
            if let Some(callback) = run.on_complete.take() {
                callback();
            }
        }
    }
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new(TransitionConfig::default())
    }
}

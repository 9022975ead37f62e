/// Reaction game — two duelists hold a stance, a cue appears after a random
/// wait, and the player must click before the window closes.
///
/// One `start` plays one round. Rounds are separated by scenario text, so the
/// host restarts the game for each enemy in `enemy_rigs` and drives the screen
/// fade between them (`switch_to_next_enemy` and `restore_after_round` are
/// meant to be called while the screen is dark).

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::host::{AnimationSink, AudioSink, PanelToggle};

pub const IDLE_TRIGGER: &str = "Idle";
pub const PAUSE_TRIGGER: &str = "Pause";
pub const YARARE_TRIGGER: &str = "Yarare";
pub const FINISH_TRIGGER: &str = "Finish";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReactionError {
    #[error("a round is already in progress")]
    AlreadyActive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    pub player_rig: String,
    /// One enemy per round, in order.
    pub enemy_rigs: Vec<String>,
    pub effect_delay_min: f32,
    pub effect_delay_max: f32,
    /// Slowest reaction (seconds after the cue) that still wins.
    pub success_threshold: f32,
    pub click_timeout: f32,
    /// Every round is a win, timeouts included.
    pub always_win: bool,
    pub flash_duration: f32,
    /// Time the result poses are held after the flash.
    pub result_hold: f32,
    /// Wait between the end of a round and the request for a transition.
    pub transition_delay: f32,
    pub seed: u64,
    pub start_cue: String,
    pub effect_cue: String,
    pub flash_cue: String,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            player_rig: "player".to_string(),
            enemy_rigs: vec!["enemy".to_string()],
            effect_delay_min: 1.0,
            effect_delay_max: 3.0,
            success_threshold: 0.5,
            click_timeout: 2.0,
            always_win: false,
            flash_duration: 0.1,
            result_hold: 1.0,
            transition_delay: 1.0,
            seed: 0,
            start_cue: "iai_start".to_string(),
            effect_cue: "effect".to_string(),
            flash_cue: "flash".to_string(),
        }
    }
}

/// Reported from `tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReactionEvent {
    /// The cue is up; clicks count from now.
    EffectShown,
    /// `reaction_time` is `None` when the window timed out.
    RoundEnded {
        won: bool,
        reaction_time: Option<f32>,
        has_next_round: bool,
    },
    /// The result has been on screen long enough; start the fade.
    ReadyForTransition { won: bool, has_next_round: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Inactive,
    WaitingForEffect { remaining: f32 },
    Window { elapsed: f32 },
    Result { remaining: f32, won: bool, reaction_time: Option<f32> },
    AfterRound { remaining: f32, won: bool, has_next_round: bool },
}

pub struct ReactionGame {
    config: ReactionConfig,
    rng: StdRng,
    animation: Option<Box<dyn AnimationSink>>,
    audio: Option<Box<dyn AudioSink>>,
    effect: Option<Box<dyn PanelToggle>>,
    flash: Option<Box<dyn PanelToggle>>,
    enemy_avatars: Vec<Box<dyn PanelToggle>>,
    hide_on_start: Vec<Box<dyn PanelToggle>>,
    stage: Stage,
    flash_remaining: Option<f32>,
    round: usize,
    enemy: Option<usize>,
}

impl ReactionGame {
    pub fn new(config: ReactionConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            animation: None,
            audio: None,
            effect: None,
            flash: None,
            enemy_avatars: Vec::new(),
            hide_on_start: Vec::new(),
            stage: Stage::Inactive,
            flash_remaining: None,
            round: 0,
            enemy: None,
        }
    }

    pub fn with_animation(mut self, animation: impl AnimationSink + 'static) -> Self {
        self.animation = Some(Box::new(animation));
        self
    }

    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    /// The cue object; hidden until the window opens.
    pub fn with_effect(mut self, mut effect: impl PanelToggle + 'static) -> Self {
        effect.set_active(false);
        self.effect = Some(Box::new(effect));
        self
    }

    pub fn with_flash(mut self, mut flash: impl PanelToggle + 'static) -> Self {
        flash.set_active(false);
        self.flash = Some(Box::new(flash));
        self
    }

    /// Visibility of the enemy for the matching index of `enemy_rigs`.
    pub fn with_enemy_avatar(mut self, avatar: impl PanelToggle + 'static) -> Self {
        self.enemy_avatars.push(Box::new(avatar));
        self
    }

    /// Hidden while a round plays, shown again by `restore_after_round`.
    pub fn hide_during_round(mut self, panel: impl PanelToggle + 'static) -> Self {
        self.hide_on_start.push(Box::new(panel));
        self
    }

    pub fn config(&self) -> &ReactionConfig {
        &self.config
    }

    /// Rounds finished so far.
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn current_enemy(&self) -> Option<usize> {
        self.enemy
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.stage,
            Stage::WaitingForEffect { .. } | Stage::Window { .. } | Stage::Result { .. }
        )
    }

    pub fn is_waiting_for_click(&self) -> bool {
        matches!(self.stage, Stage::Window { .. })
    }

    pub fn has_next_round(&self) -> bool {
        self.round < self.config.enemy_rigs.len()
    }

    /// Begin a round against the current enemy (the first one on round 0).
    pub fn start(&mut self) -> Result<(), ReactionError> {
        if self.is_active() {
            warn!("reaction game already running; start ignored");
            return Err(ReactionError::AlreadyActive);
        }
        if self.round == 0 {
            self.set_enemy(0);
        }
        self.set_pose(PAUSE_TRIGGER, PAUSE_TRIGGER);
        let cue = self.config.start_cue.clone();
        self.play(&cue);
        for panel in self.hide_on_start.iter_mut() {
            panel.set_active(false);
        }

        let (min, max) = (self.config.effect_delay_min, self.config.effect_delay_max);
        let delay = if max > min {
            self.rng.gen_range(min..max)
        } else {
            min.max(0.0)
        };
        debug!("round {} starts; cue in {:.2}s", self.round + 1, delay);
        self.stage = Stage::WaitingForEffect { remaining: delay };
        Ok(())
    }

    /// A click. Only counts while the window is open; returns whether the
    /// round was won.
    pub fn click(&mut self) -> Option<bool> {
        let Stage::Window { elapsed } = self.stage else {
            return None;
        };
        let won = self.config.always_win || elapsed <= self.config.success_threshold;
        self.resolve(won, Some(elapsed));
        Some(won)
    }

    pub fn tick(&mut self, dt: f32) -> Option<ReactionEvent> {
        if let Some(left) = self.flash_remaining {
            let left = left - dt;
            if left <= 0.0 {
                self.flash_remaining = None;
                if let Some(flash) = self.flash.as_mut() {
                    flash.set_active(false);
                }
            } else {
                self.flash_remaining = Some(left);
            }
        }

        match self.stage {
            Stage::Inactive => None,
            Stage::WaitingForEffect { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.stage = Stage::WaitingForEffect { remaining };
                    return None;
                }
                if let Some(effect) = self.effect.as_mut() {
                    effect.set_active(true);
                }
                let cue = self.config.effect_cue.clone();
                self.play(&cue);
                self.stage = Stage::Window { elapsed: 0.0 };
                Some(ReactionEvent::EffectShown)
            }
            Stage::Window { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed < self.config.click_timeout {
                    self.stage = Stage::Window { elapsed };
                    return None;
                }
                debug!("reaction window timed out");
                self.resolve(self.config.always_win, None);
                None
            }
            Stage::Result {
                remaining,
                won,
                reaction_time,
            } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.stage = Stage::Result {
                        remaining,
                        won,
                        reaction_time,
                    };
                    return None;
                }
                self.round += 1;
                let has_next_round = self.has_next_round();
                self.set_effect(false);
                info!(
                    "round {} {} (next round: {})",
                    self.round,
                    if won { "won" } else { "lost" },
                    has_next_round
                );
                self.stage = Stage::AfterRound {
                    remaining: self.config.transition_delay,
                    won,
                    has_next_round,
                };
                Some(ReactionEvent::RoundEnded {
                    won,
                    reaction_time,
                    has_next_round,
                })
            }
            Stage::AfterRound {
                remaining,
                won,
                has_next_round,
            } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.stage = Stage::AfterRound {
                        remaining,
                        won,
                        has_next_round,
                    };
                    return None;
                }
                self.stage = Stage::Inactive;
                Some(ReactionEvent::ReadyForTransition {
                    won,
                    has_next_round,
                })
            }
        }
    }

    /// Swap in the enemy for the upcoming round.
    pub fn switch_to_next_enemy(&mut self) {
        self.set_enemy(self.round);
    }

    /// Bring back what the round hid and return both rigs to idle.
    pub fn restore_after_round(&mut self) {
        for panel in self.hide_on_start.iter_mut() {
            panel.set_active(true);
        }
        self.set_pose(IDLE_TRIGGER, IDLE_TRIGGER);
    }

    /// Abort the round in progress.
    pub fn stop(&mut self) {
        if !self.is_active() {
            return;
        }
        self.stage = Stage::Inactive;
        self.set_effect(false);
        self.restore_after_round();
        debug!("reaction game stopped");
    }

    fn resolve(&mut self, won: bool, reaction_time: Option<f32>) {
        self.set_effect(false);
        let cue = self.config.flash_cue.clone();
        self.play(&cue);
        if let Some(flash) = self.flash.as_mut() {
            flash.set_active(true);
            self.flash_remaining = Some(self.config.flash_duration);
        }
        if won {
            self.set_pose(FINISH_TRIGGER, YARARE_TRIGGER);
        } else {
            self.set_pose(YARARE_TRIGGER, FINISH_TRIGGER);
        }
        self.stage = Stage::Result {
            remaining: self.config.flash_duration + self.config.result_hold,
            won,
            reaction_time,
        };
    }

    fn set_enemy(&mut self, index: usize) {
        if index >= self.config.enemy_rigs.len() {
            warn!("no enemy at index {}", index);
            return;
        }
        if let Some(current) = self.enemy {
            if let Some(avatar) = self.enemy_avatars.get_mut(current) {
                avatar.set_active(false);
            }
        }
        if let Some(avatar) = self.enemy_avatars.get_mut(index) {
            avatar.set_active(true);
        }
        self.enemy = Some(index);
    }

    fn set_pose(&mut self, player: &str, enemy: &str) {
        let Some(animation) = self.animation.as_mut() else {
            return;
        };
        animation.set_trigger(&self.config.player_rig, player);
        if let Some(rig) = self.enemy.and_then(|i| self.config.enemy_rigs.get(i)) {
            animation.set_trigger(rig, enemy);
        }
    }

    fn set_effect(&mut self, active: bool) {
        if let Some(effect) = self.effect.as_mut() {
            effect.set_active(active);
        }
    }

    fn play(&mut self, cue: &str) {
        if let Some(audio) = self.audio.as_mut() {
            audio.play_cue(cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::shared;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn config() -> ReactionConfig {
        ReactionConfig {
            enemy_rigs: vec!["ronin".to_string(), "master".to_string()],
            effect_delay_min: 1.0,
            effect_delay_max: 1.0,
            success_threshold: 0.5,
            click_timeout: 2.0,
            flash_duration: 0.25,
            result_hold: 1.0,
            transition_delay: 1.0,
            ..ReactionConfig::default()
        }
    }

    struct Rig {
        game: ReactionGame,
        triggers: Rc<RefCell<Vec<String>>>,
        cues: Rc<RefCell<Vec<String>>>,
        effect: Rc<RefCell<bool>>,
        flash: Rc<RefCell<bool>>,
        hud: Rc<RefCell<bool>>,
    }

    fn rig(config: ReactionConfig) -> Rig {
        let triggers = shared(Vec::new());
        let cues = shared(Vec::new());
        let effect = shared(true);
        let flash = shared(true);
        let hud = shared(true);
        let game = ReactionGame::new(config)
            .with_animation(triggers.clone())
            .with_audio(cues.clone())
            .with_effect(effect.clone())
            .with_flash(flash.clone())
            .hide_during_round(hud.clone());
        Rig {
            game,
            triggers,
            cues,
            effect,
            flash,
            hud,
        }
    }

    fn open_window(rig: &mut Rig) {
        rig.game.start().unwrap();
        assert_eq!(rig.game.tick(0.5), None);
        assert_eq!(rig.game.tick(0.5), Some(ReactionEvent::EffectShown));
    }

    #[test]
    fn start_poses_both_rigs_and_hides_the_hud() {
        let mut rig = rig(config());
        rig.game.start().unwrap();
        assert_eq!(*rig.triggers.borrow(), vec!["player:Pause", "ronin:Pause"]);
        assert_eq!(*rig.cues.borrow(), vec!["iai_start"]);
        assert!(!*rig.hud.borrow());
        assert!(!*rig.effect.borrow());
        assert_eq!(rig.game.start(), Err(ReactionError::AlreadyActive));
    }

    #[test]
    fn quick_click_wins() {
        let mut rig = rig(config());
        open_window(&mut rig);
        assert!(*rig.effect.borrow());
        rig.game.tick(0.25);
        assert_eq!(rig.game.click(), Some(true));
        assert!(!*rig.effect.borrow());
        assert!(*rig.flash.borrow());
        assert!(rig.triggers.borrow().ends_with(&[
            "player:Finish".to_string(),
            "ronin:Yarare".to_string()
        ]));
        assert_eq!(rig.game.click(), None);

        assert_eq!(rig.game.tick(0.25), None);
        assert!(!*rig.flash.borrow());
        assert_eq!(
            rig.game.tick(1.0),
            Some(ReactionEvent::RoundEnded {
                won: true,
                reaction_time: Some(0.25),
                has_next_round: true
            })
        );
        assert!(!rig.game.is_active());
        assert_eq!(rig.game.round(), 1);
        assert_eq!(
            rig.game.tick(1.0),
            Some(ReactionEvent::ReadyForTransition {
                won: true,
                has_next_round: true
            })
        );
    }

    #[test]
    fn slow_click_loses() {
        let mut rig = rig(config());
        open_window(&mut rig);
        rig.game.tick(1.0);
        assert_eq!(rig.game.click(), Some(false));
        assert!(rig.triggers.borrow().ends_with(&[
            "player:Yarare".to_string(),
            "ronin:Finish".to_string()
        ]));
        assert_eq!(rig.cues.borrow().last().map(String::as_str), Some("flash"));
    }

    #[test]
    fn timeout_loses_unless_always_win() {
        let mut rig = rig(config());
        open_window(&mut rig);
        rig.game.tick(2.0);
        assert!(!rig.game.is_waiting_for_click());
        assert_eq!(
            rig.game.tick(1.25),
            Some(ReactionEvent::RoundEnded {
                won: false,
                reaction_time: None,
                has_next_round: true
            })
        );

        let mut rig = rig_always_win();
        open_window(&mut rig);
        rig.game.tick(2.0);
        assert!(matches!(
            rig.game.tick(1.25),
            Some(ReactionEvent::RoundEnded { won: true, .. })
        ));
    }

    fn rig_always_win() -> Rig {
        rig(ReactionConfig {
            always_win: true,
            ..config()
        })
    }

    #[test]
    fn clicks_before_the_cue_are_ignored() {
        let mut rig = rig(config());
        rig.game.start().unwrap();
        assert_eq!(rig.game.click(), None);
        assert!(rig.game.is_active());
    }

    #[test]
    fn next_enemy_and_restore() {
        let ronin = shared(false);
        let master = shared(false);
        let hud = shared(true);
        let triggers = shared(Vec::<String>::new());
        let mut game = ReactionGame::new(config())
            .with_animation(triggers.clone())
            .with_enemy_avatar(ronin.clone())
            .with_enemy_avatar(master.clone())
            .hide_during_round(hud.clone());
        game.start().unwrap();
        assert!(*ronin.borrow());
        game.tick(1.0);
        game.click();
        game.tick(1.25);
        game.tick(1.0);

        game.switch_to_next_enemy();
        game.restore_after_round();
        assert!(!*ronin.borrow());
        assert!(*master.borrow());
        assert!(*hud.borrow());
        assert!(triggers
            .borrow()
            .ends_with(&["player:Idle".to_string(), "master:Idle".to_string()]));

        triggers.borrow_mut().clear();
        game.start().unwrap();
        assert_eq!(*triggers.borrow(), vec!["player:Pause", "master:Pause"]);
    }

    #[test]
    fn last_round_has_no_next() {
        let mut game = ReactionGame::new(ReactionConfig {
            enemy_rigs: vec!["ronin".to_string()],
            ..config()
        });
        game.start().unwrap();
        game.tick(1.0);
        game.click();
        assert!(matches!(
            game.tick(1.25),
            Some(ReactionEvent::RoundEnded {
                has_next_round: false,
                ..
            })
        ));
    }

    #[test]
    fn stop_aborts_and_restores() {
        let mut rig = rig(config());
        open_window(&mut rig);
        rig.game.stop();
        assert!(!rig.game.is_active());
        assert!(!*rig.effect.borrow());
        assert!(*rig.hud.borrow());
        assert_eq!(rig.game.tick(5.0), None);
    }

    #[test]
    fn random_delay_stays_in_range() {
        let mut game = ReactionGame::new(ReactionConfig {
            effect_delay_min: 1.0,
            effect_delay_max: 3.0,
            seed: 7,
            ..config()
        });
        game.start().unwrap();
        assert_eq!(game.tick(0.999), None);
        let mut waited = 0.999;
        while game.tick(0.01).is_none() {
            waited += 0.01;
            assert!(waited < 3.01);
        }
    }
}

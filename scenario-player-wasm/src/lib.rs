//! WASM bindings for scenario-player — powers the in-browser scenario demo.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use scenario_player::core::config::GameConfig;
use scenario_player::core::host::shared;
use scenario_player::core::indicator::ClickableIndicator;
use scenario_player::core::reaction::{ReactionEvent, ReactionGame};
use scenario_player::core::sequencer::{Phase, ScenarioSequencer};
use scenario_player::core::transition::TransitionController;
use scenario_player::schema::scenario::ScenarioDocument;

// ---------------------------------------------------------------------------
// Embedded demo data — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const GAME_CONFIG: &str = include_str!("../../data/game.ron");
    pub const SCENARIO: &str = include_str!("../../data/scenario.csv");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct Snapshot {
    index: usize,
    rows: usize,
    phase: Phase,
    speaker: String,
    line: String,
    annotation: String,
    choices_visible: bool,
    clickable: bool,
    indicator_alpha: f32,
    indicator_offset: f32,
    fade_progress: f32,
    fade_overlay_alpha: f32,
    fade_image_alpha: f32,
    finished: bool,
    choice_counts: Vec<u32>,
    duel: DuelInfo,
}

#[derive(serde::Serialize)]
struct DuelInfo {
    active: bool,
    waiting_for_click: bool,
    round: usize,
    enemy: Option<String>,
    last_event: Option<String>,
}

fn describe(event: &ReactionEvent) -> String {
    match event {
        ReactionEvent::EffectShown => "effect_shown".to_string(),
        ReactionEvent::RoundEnded {
            won, reaction_time, ..
        } => match reaction_time {
            Some(t) => format!("{} in {:.3}s", if *won { "won" } else { "lost" }, t),
            None => format!("{} on timeout", if *won { "won" } else { "lost" }),
        },
        ReactionEvent::ReadyForTransition { has_next_round, .. } => {
            if *has_next_round {
                "next_round".to_string()
            } else {
                "duel_over".to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ScenarioDemo — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct ScenarioDemo {
    sequencer: ScenarioSequencer,
    duel: ReactionGame,
    name: Rc<RefCell<String>>,
    line: Rc<RefCell<String>>,
    choices: Rc<RefCell<bool>>,
    indicator: Rc<RefCell<ClickableIndicator>>,
    last_duel_event: Option<String>,
}

#[wasm_bindgen]
impl ScenarioDemo {
    /// Create a demo playing `csv`, or the bundled scenario when it is empty.
    #[wasm_bindgen(constructor)]
    pub fn new(csv: &str, seed: u64) -> Result<ScenarioDemo, JsError> {
        let mut config = GameConfig::parse_ron(data::GAME_CONFIG)
            .map_err(|e| JsError::new(&format!("Config parse error: {e}")))?;
        config.reaction.seed = seed;

        let source = if csv.trim().is_empty() { data::SCENARIO } else { csv };
        let document = ScenarioDocument::parse(source);
        if document.is_empty() {
            return Err(JsError::new("Scenario has no rows"));
        }

        let name = shared(String::new());
        let line = shared(String::new());
        let choices = shared(false);
        let indicator = shared(ClickableIndicator::new(config.indicator.clone()));
        let mut sequencer = ScenarioSequencer::builder()
            .config(config.sequencer.clone())
            .document(document)
            .name_surface(name.clone())
            .line_surface(line.clone())
            .choices(choices.clone())
            .indicator(indicator.clone())
            .transition(TransitionController::new(config.transitions.scenario.clone()))
            .build();
        sequencer.start();
        sequencer
            .play_fade_in()
            .map_err(|e| JsError::new(&format!("Fade-in error: {e}")))?;

        Ok(ScenarioDemo {
            sequencer,
            duel: ReactionGame::new(config.reaction),
            name,
            line,
            choices,
            indicator,
            last_duel_event: None,
        })
    }

    /// Advance every timer by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.sequencer.tick(dt);
        self.indicator.borrow_mut().tick(dt);
        if let Some(event) = self.duel.tick(dt) {
            if let ReactionEvent::ReadyForTransition { has_next_round, .. } = event {
                if has_next_round {
                    self.duel.switch_to_next_enemy();
                }
                self.duel.restore_after_round();
            }
            self.last_duel_event = Some(describe(&event));
        }
    }

    /// A click on the dialogue box. Returns whether it was accepted.
    pub fn advance(&mut self) -> bool {
        self.sequencer.advance()
    }

    /// Move past a click-locked row.
    pub fn force_advance(&mut self) -> bool {
        self.sequencer.force_advance()
    }

    pub fn skip(&mut self) -> bool {
        self.sequencer.skip_typewriter()
    }

    pub fn choose(&mut self, choice: usize) -> bool {
        self.sequencer.select_choice(choice)
    }

    pub fn restart(&mut self) {
        self.sequencer.restart();
    }

    pub fn start_duel(&mut self) -> Result<(), JsError> {
        self.last_duel_event = None;
        self.duel
            .start()
            .map_err(|e| JsError::new(&format!("Duel error: {e}")))
    }

    /// A click during the duel. `None` when no window is open.
    pub fn duel_click(&mut self) -> Option<bool> {
        self.duel.click()
    }

    /// Return a JSON view of everything a page needs to draw.
    pub fn snapshot(&self) -> Result<String, JsError> {
        let row = self.sequencer.current_row();
        let (fade_progress, fade_overlay_alpha, fade_image_alpha) = self
            .sequencer
            .transition()
            .map_or((1.0, 1.0, 1.0), |t| (t.progress(), t.overlay_alpha(), t.image_alpha()));
        let indicator = self.indicator.borrow();
        let config = self.duel.config();

        let snapshot = Snapshot {
            index: self.sequencer.index(),
            rows: self.sequencer.document().len(),
            phase: self.sequencer.phase(),
            speaker: self.name.borrow().clone(),
            line: self.line.borrow().clone(),
            annotation: row.map(|r| r.annotation.clone()).unwrap_or_default(),
            choices_visible: *self.choices.borrow(),
            clickable: self.sequencer.is_clickable(),
            indicator_alpha: indicator.alpha(),
            indicator_offset: indicator.offset(),
            fade_progress,
            fade_overlay_alpha,
            fade_image_alpha,
            finished: self.sequencer.is_finished(),
            choice_counts: (0..2).map(|c| self.sequencer.choice_count(c)).collect(),
            duel: DuelInfo {
                active: self.duel.is_active(),
                waiting_for_click: self.duel.is_waiting_for_click(),
                round: self.duel.round(),
                enemy: self
                    .duel
                    .current_enemy()
                    .and_then(|i| config.enemy_rigs.get(i).cloned()),
                last_event: self.last_duel_event.clone(),
            },
        };
        serde_json::to_string(&snapshot)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return the parsed rows as a JSON array.
    pub fn rows(&self) -> Result<String, JsError> {
        serde_json::to_string(self.sequencer.document().rows())
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return the bundled scenario CSV, for editing in the page.
    pub fn bundled_scenario() -> String {
        data::SCENARIO.to_string()
    }
}

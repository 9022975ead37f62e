/// The scenario sequencer: Row → screen orchestration.
///
/// Walks a [`ScenarioDocument`] row by row, resolving speaker names,
/// running the typewriter and post-line delay, gating advance input and
/// jumping over alternate dialogue blocks when a choice is picked.

use log::{debug, error, info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::delay::DelayGate;
use crate::core::host::{AudioSink, ClickableSignal, PanelToggle, TextSurface};
use crate::core::transition::{TransitionController, TransitionError, TransitionStatus};
use crate::core::typewriter::{convert_breaks, Typewriter, TypewriterConfig};
use crate::schema::input::{AdvanceBinding, InputEvent};
use crate::schema::row::Row;
use crate::schema::scenario::ScenarioDocument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// A blank speaker cell repeats the previous speaker.
    pub inherit_last_name: bool,
    /// Speaker name that hides the name label entirely.
    pub monologue_marker: String,
    pub typewriter: TypewriterConfig,
    /// Honour per-row post-line delays.
    pub delay_enabled: bool,
    /// Advance input while text is still typing completes the line.
    pub skip_typewriter_on_advance: bool,
    pub advance: AdvanceBinding,
    /// Cue played on every accepted advance.
    pub click_cue: Option<String>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            inherit_last_name: true,
            monologue_marker: "monologue".to_string(),
            typewriter: TypewriterConfig::default(),
            delay_enabled: true,
            skip_typewriter_on_advance: true,
            advance: AdvanceBinding::default(),
            click_cue: Some("clickable_click".to_string()),
        }
    }
}

/// Where the sequencer is in its row cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Built but not started.
    Idle,
    /// The current line is still being revealed.
    Typing,
    /// Line fully shown; the post-line delay is running.
    Delaying,
    /// Waiting for advance input or a choice.
    AwaitingAdvance,
    /// Ran past the last row.
    Finished,
    /// A required binding was missing at build time.
    Disabled,
}

/// Plays one scenario. Built via `ScenarioSequencer::builder()`.
pub struct ScenarioSequencer {
    config: SequencerConfig,
    document: ScenarioDocument,
    name_surface: Option<Box<dyn TextSurface>>,
    line_surface: Option<Box<dyn TextSurface>>,
    indicator: Option<Box<dyn ClickableSignal>>,
    choices: Option<Box<dyn PanelToggle>>,
    audio: Option<Box<dyn AudioSink>>,
    transition: Option<TransitionController>,
    phase: Phase,
    index: usize,
    last_name: String,
    typewriter: Option<Typewriter>,
    delay: DelayGate,
    clickable: bool,
    choice_counts: FxHashMap<usize, u32>,
}

/// Builder for constructing a `ScenarioSequencer`.
pub struct ScenarioSequencerBuilder {
    config: SequencerConfig,
    document: Option<ScenarioDocument>,
    name_surface: Option<Box<dyn TextSurface>>,
    line_surface: Option<Box<dyn TextSurface>>,
    indicator: Option<Box<dyn ClickableSignal>>,
    choices: Option<Box<dyn PanelToggle>>,
    audio: Option<Box<dyn AudioSink>>,
    transition: Option<TransitionController>,
}

impl ScenarioSequencer {
    pub fn builder() -> ScenarioSequencerBuilder {
        ScenarioSequencerBuilder {
            config: SequencerConfig::default(),
            document: None,
            name_surface: None,
            line_surface: None,
            indicator: None,
            choices: None,
            audio: None,
            transition: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn document(&self) -> &ScenarioDocument {
        &self.document
    }

    /// The row on screen, if any.
    pub fn current_row(&self) -> Option<&Row> {
        match self.phase {
            Phase::Typing | Phase::Delaying | Phase::AwaitingAdvance => {
                self.document.get(self.index)
            }
            _ => None,
        }
    }

    /// The name most recently set by a non-blank speaker cell.
    pub fn last_speaker(&self) -> &str {
        &self.last_name
    }

    /// Whether the affordance is currently raised.
    pub fn is_clickable(&self) -> bool {
        self.clickable
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// How many times the choice with this index has been picked.
    pub fn choice_count(&self, choice: usize) -> u32 {
        self.choice_counts.get(&choice).copied().unwrap_or(0)
    }

    pub fn transition(&self) -> Option<&TransitionController> {
        self.transition.as_ref()
    }

    pub fn transition_mut(&mut self) -> Option<&mut TransitionController> {
        self.transition.as_mut()
    }

    /// Show the first row.
    pub fn start(&mut self) {
        match self.phase {
            Phase::Disabled => return,
            Phase::Idle => {}
            other => {
                warn!("start() called in phase {:?}; ignored", other);
                return;
            }
        }
        if self.document.is_empty() {
            self.finish();
        } else {
            self.enter_row(0);
        }
        self.refresh_clickable();
    }

    /// Drop all progress and play again from row 0.
    pub fn restart(&mut self) {
        if self.phase == Phase::Disabled {
            return;
        }
        self.cancel_pending();
        self.index = 0;
        self.last_name.clear();
        self.choice_counts.clear();
        self.phase = Phase::Idle;
        self.start();
    }

    /// Feed a raw input event. Returns true if it is bound to advance.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if !self.config.advance.matches(event) {
            return false;
        }
        self.advance();
        true
    }

    /// The logical "advance" input. Returns true if the sequencer moved on
    /// (or completed the typing line).
    pub fn advance(&mut self) -> bool {
        if self.transition.as_ref().is_some_and(TransitionController::is_running) {
            debug!("advance dropped: transition running");
            return false;
        }

        let moved = match self.phase {
            Phase::Typing if self.config.skip_typewriter_on_advance => self.skip_typewriter(),
            Phase::AwaitingAdvance => {
                let locked = self.document.get(self.index).is_some_and(|r| r.disable_click);
                if locked {
                    debug!("advance dropped: row {} is click-locked", self.index);
                    false
                } else {
                    self.play_click_cue();
                    self.step_forward();
                    true
                }
            }
            _ => false,
        };
        self.refresh_clickable();
        moved
    }

    /// Move past the current row even if it is click-locked. Used by the host
    /// when an outside event (a minigame, a cutscene) releases the lock.
    pub fn force_advance(&mut self) -> bool {
        if !matches!(
            self.phase,
            Phase::Typing | Phase::Delaying | Phase::AwaitingAdvance
        ) {
            return false;
        }
        self.step_forward();
        self.refresh_clickable();
        true
    }

    /// Complete the typing line now; the delay gate starts from this moment.
    pub fn skip_typewriter(&mut self) -> bool {
        if self.phase != Phase::Typing {
            return false;
        }
        if let Some(tw) = self.typewriter.as_mut() {
            tw.skip();
            let text = tw.visible_text();
            if let Some(line) = self.line_surface.as_mut() {
                line.set_text(&text);
            }
        }
        self.typewriter = None;
        self.enter_delay_gate();
        self.refresh_clickable();
        true
    }

    /// Pick a branch: skip to the row after the next click-locked row, or
    /// finish when there is none.
    pub fn select_choice(&mut self, choice: usize) -> bool {
        if !matches!(
            self.phase,
            Phase::Typing | Phase::Delaying | Phase::AwaitingAdvance
        ) {
            warn!("select_choice({}) in phase {:?}; ignored", choice, self.phase);
            return false;
        }

        self.cancel_pending();
        self.set_choices_visible(false);
        *self.choice_counts.entry(choice).or_insert(0) += 1;
        self.play_click_cue();

        match self.document.next_click_lock(self.index + 1) {
            Some(marker) if marker + 1 < self.document.len() => {
                debug!("choice {} resumes after marker row {}", choice, marker);
                self.enter_row(marker + 1);
            }
            Some(_) | None => {
                debug!("choice {} found no resume point; finishing", choice);
                self.finish();
            }
        }
        self.refresh_clickable();
        true
    }

    /// Fade the screen in from black with the owned transition controller.
    /// Advance input is dropped until it completes.
    pub fn play_fade_in(&mut self) -> Result<(), TransitionError> {
        let result = match self.transition.as_mut() {
            Some(transition) => transition.play_from_black(|| {}),
            None => {
                warn!("play_fade_in() without a transition controller; ignored");
                Ok(())
            }
        };
        self.refresh_clickable();
        result
    }

    /// Advance timers by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if let Some(transition) = self.transition.as_mut() {
            if transition.tick(dt) == TransitionStatus::Completed {
                debug!("fade-in complete");
            }
        }

        match self.phase {
            Phase::Typing => self.tick_typewriter(dt),
            Phase::Delaying => {
                if self.delay.tick(dt) {
                    self.enter_awaiting();
                }
            }
            _ => {}
        }
        self.refresh_clickable();
    }

    fn tick_typewriter(&mut self, dt: f32) {
        let Some(tw) = self.typewriter.as_mut() else {
            self.enter_delay_gate();
            return;
        };
        if tw.tick(dt) {
            let text = tw.visible_text();
            if let Some(line) = self.line_surface.as_mut() {
                line.set_text(&text);
            }
        }
        if tw.is_finished() {
            self.typewriter = None;
            self.enter_delay_gate();
        }
    }

    fn step_forward(&mut self) {
        self.cancel_pending();
        if self.index + 1 < self.document.len() {
            self.enter_row(self.index + 1);
        } else {
            self.finish();
        }
    }

    fn enter_row(&mut self, index: usize) {
        self.cancel_pending();
        self.set_choices_visible(false);
        self.index = index;

        let Some(row) = self.document.get(index).cloned() else {
            self.finish();
            return;
        };

        let mut name = row.speaker.clone().unwrap_or_default();
        if self.config.inherit_last_name {
            if name.is_empty() {
                name = self.last_name.clone();
            } else {
                self.last_name = name.clone();
            }
        }
        let shown_name = if name == self.config.monologue_marker {
            ""
        } else {
            name.as_str()
        };
        if let Some(label) = self.name_surface.as_mut() {
            label.set_text(shown_name);
        }

        if !row.annotation.is_empty() {
            info!("[annotation] row {}: {}", index, row.annotation);
        }

        let typing = self.config.typewriter.enabled && !row.line.is_empty();
        if typing {
            let tw = Typewriter::start(&row.line, &self.config.typewriter);
            let text = tw.visible_text();
            if let Some(line) = self.line_surface.as_mut() {
                line.set_text(&text);
            }
            if tw.is_finished() {
                self.enter_delay_gate();
            } else {
                self.typewriter = Some(tw);
                self.phase = Phase::Typing;
            }
        } else {
            let text = if self.config.typewriter.convert_br_to_newline {
                convert_breaks(&row.line)
            } else {
                row.line.clone()
            };
            if let Some(line) = self.line_surface.as_mut() {
                line.set_text(&text);
            }
            self.enter_delay_gate();
        }
    }

    fn enter_delay_gate(&mut self) {
        let seconds = self
            .document
            .get(self.index)
            .map(|r| r.delay.seconds())
            .unwrap_or(0.0);
        if self.config.delay_enabled && seconds > 0.0 {
            self.delay.start(seconds);
            self.phase = Phase::Delaying;
        } else {
            self.enter_awaiting();
        }
    }

    fn enter_awaiting(&mut self) {
        self.phase = Phase::AwaitingAdvance;
        let show = self.document.get(self.index).is_some_and(|r| r.show_choices);
        if show {
            self.set_choices_visible(true);
        }
    }

    fn finish(&mut self) {
        self.cancel_pending();
        self.set_choices_visible(false);
        self.index = self.document.len();
        self.phase = Phase::Finished;
        info!("scenario finished");
    }

    fn cancel_pending(&mut self) {
        self.typewriter = None;
        self.delay.cancel();
    }

    fn set_choices_visible(&mut self, visible: bool) {
        if let Some(panel) = self.choices.as_mut() {
            if panel.is_active() != visible {
                panel.set_active(visible);
            }
        }
    }

    fn play_click_cue(&mut self) {
        if let (Some(audio), Some(cue)) = (self.audio.as_mut(), self.config.click_cue.as_deref()) {
            audio.play_cue(cue);
        }
    }

    /// Raise the affordance only when advance input would be accepted right
    /// now and lead to another row.
    fn refresh_clickable(&mut self) {
        let fading = self.transition.as_ref().is_some_and(TransitionController::is_running);
        let eligible = self.phase == Phase::AwaitingAdvance
            && !fading
            && self.index + 1 < self.document.len()
            && self.document.get(self.index).is_some_and(|r| !r.disable_click);

        if eligible != self.clickable {
            self.clickable = eligible;
            if let Some(indicator) = self.indicator.as_mut() {
                indicator.set_clickable(eligible);
            }
        }
    }
}

impl ScenarioSequencerBuilder {
    pub fn config(mut self, config: SequencerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn document(mut self, document: ScenarioDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Parse and use scenario CSV text.
    pub fn csv(self, text: &str) -> Self {
        self.document(ScenarioDocument::parse(text))
    }

    pub fn name_surface(mut self, surface: impl TextSurface + 'static) -> Self {
        self.name_surface = Some(Box::new(surface));
        self
    }

    pub fn line_surface(mut self, surface: impl TextSurface + 'static) -> Self {
        self.line_surface = Some(Box::new(surface));
        self
    }

    pub fn indicator(mut self, indicator: impl ClickableSignal + 'static) -> Self {
        self.indicator = Some(Box::new(indicator));
        self
    }

    /// Panel holding the choice buttons.
    pub fn choices(mut self, panel: impl PanelToggle + 'static) -> Self {
        self.choices = Some(Box::new(panel));
        self
    }

    pub fn audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    pub fn transition(mut self, transition: TransitionController) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Finish construction. A missing document or line surface yields a
    /// permanently disabled sequencer.
    pub fn build(self) -> ScenarioSequencer {
        let mut phase = Phase::Idle;
        if self.document.is_none() {
            error!("scenario sequencer has no document; disabled");
            phase = Phase::Disabled;
        }
        if self.line_surface.is_none() {
            error!("scenario sequencer has no line surface; disabled");
            phase = Phase::Disabled;
        }

        ScenarioSequencer {
            config: self.config,
            document: self.document.unwrap_or_default(),
            name_surface: self.name_surface,
            line_surface: self.line_surface,
            indicator: self.indicator,
            choices: self.choices,
            audio: self.audio,
            transition: self.transition,
            phase,
            index: 0,
            last_name: String::new(),
            typewriter: None,
            delay: DelayGate::new(),
            clickable: false,
            choice_counts: FxHashMap::default(),
        }
    }
}

/// Duel Night example — a whole session played headless.
///
/// Title → menu → illustrations → scenario with two choices → a duel at
/// the lantern bridge → the ending picked by how often the player pressed on.
///
/// Run with: cargo run --example duel_night

use rand::rngs::StdRng;
use rand::SeedableRng;
use scenario_player::core::audio::AudioManager;
use scenario_player::core::avatar::randomize_idle;
use scenario_player::core::config::GameConfig;
use scenario_player::core::host::{shared, AnimationSink, AudioBackend, ImageSurface};
use scenario_player::core::indicator::ClickableIndicator;
use scenario_player::core::reaction::{ReactionEvent, ReactionGame};
use scenario_player::core::sequencer::{Phase, ScenarioSequencer};
use scenario_player::core::slideshow::{EndingSlideshow, IllustrationSlideshow, SlideshowEvent};
use scenario_player::core::transition::TransitionController;
use scenario_player::core::ui::{Fade, GameUiManager, Panel};
use scenario_player::schema::scenario::ScenarioDocument;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

const FRAME: f32 = 1.0 / 60.0;
const CONFIG: &str = "data/game.ron";

struct Speakers;

impl AudioBackend for Speakers {
    fn play_bgm(&mut self, clip: &str, volume: f32) {
        println!("    ♪ {} ({:.0}%)", clip, volume * 100.0);
    }

    fn stop_bgm(&mut self) {
        println!("    ♪ (silence)");
    }

    fn set_bgm_volume(&mut self, _volume: f32) {}

    fn play_one_shot(&mut self, clip: &str, _volume: f32) {
        println!("    ♫ {}", clip);
    }
}

struct Stage;

impl AnimationSink for Stage {
    fn set_trigger(&mut self, rig: &str, trigger: &str) {
        println!("    {} → {}", rig, trigger);
    }
}

struct Canvas(&'static str);

impl ImageSurface for Canvas {
    fn set_image(&mut self, image: &str) {
        println!("  <{}: {}>", self.0, image);
    }

    fn set_alpha(&mut self, _alpha: f32) {}
}

fn settle(ui: &mut GameUiManager) {
    while ui.is_transitioning() {
        ui.tick(FRAME);
    }
}

fn main() {
    let config = GameConfig::load_from_ron(Path::new(CONFIG)).expect("Failed to load game config");
    let scenario = config
        .scenario_path(Path::new(CONFIG))
        .expect("Config names no scenario");
    let document = ScenarioDocument::load(&scenario).expect("Failed to load scenario");

    let audio = shared(AudioManager::new(config.audio.clone(), Speakers));
    audio.borrow_mut().play_bgm("bgm_title", false);

    // --- Idle poses, so the rigs don't breathe in unison ---
    let mut rng = StdRng::seed_from_u64(config.reaction.seed);
    for rig in std::iter::once(&config.reaction.player_rig).chain(&config.reaction.enemy_rigs) {
        let start = randomize_idle(&mut rng, config.idle.speed_range);
        println!(
            "{} idles in '{}' from {:.2} at {:.2}x",
            rig, config.idle.state, start.normalized_time, start.speed
        );
    }

    // --- Screens ---
    let panels: Vec<(Panel, Rc<RefCell<bool>>)> =
        Panel::ALL.iter().map(|&p| (p, shared(false))).collect();
    let mut builder = GameUiManager::builder();
    for (panel, flag) in &panels {
        builder = builder.panel(*panel, flag.clone());
    }
    let telop = shared(false);
    let mut ui = builder
        .telop(telop.clone())
        .transition(
            Fade::TitleToMenu,
            TransitionController::new(config.transitions.title_to_menu.clone()),
        )
        .transition(Fade::Main, TransitionController::new(config.transitions.main.clone()))
        .transition(
            Fade::Illustration,
            TransitionController::new(config.transitions.illustration.clone()),
        )
        .build();

    println!("\n== Title ==");
    ui.on_title_clicked();
    audio.borrow_mut().play_decision_se();
    settle(&mut ui);
    println!("  panel: {:?}", ui.active_panel());

    println!("\n== Start ==");
    audio.borrow_mut().play_decision_se();
    ui.start_game();
    settle(&mut ui);
    audio.borrow_mut().play_bgm("bgm_night", false);

    // --- Illustrations: click through as soon as each one allows it ---
    let mut show = IllustrationSlideshow::new(config.illustrations.clone(), Canvas("illustration"));
    while !config.illustrations.slides.is_empty() {
        let active = ui.is_panel_active(Panel::Illustration);
        if show.tick(FRAME, active) == Some(SlideshowEvent::FirstFadeIn) {
            ui.play_first_image_fade_in();
        }
        ui.tick(FRAME);
        if show.can_switch() && show.submit() == Some(SlideshowEvent::Finished) {
            break;
        }
    }
    let closed = shared(false);
    let flag = closed.clone();
    ui.play_illustration_transition(move || *flag.borrow_mut() = true);
    settle(&mut ui);
    assert!(*closed.borrow());

    // --- Scenario ---
    println!("\n== Scenario ==");
    ui.show_telop();
    let name = shared(String::new());
    let line = shared(String::new());
    let choices = shared(false);
    let indicator = shared(ClickableIndicator::new(config.indicator.clone()));
    let mut seq = ScenarioSequencer::builder()
        .config(config.sequencer.clone())
        .document(document)
        .name_surface(name.clone())
        .line_surface(line.clone())
        .choices(choices.clone())
        .indicator(indicator.clone())
        .audio(audio.clone())
        .transition(TransitionController::new(config.transitions.scenario.clone()))
        .build();
    let mut duel = ReactionGame::new(config.reaction.clone())
        .with_animation(Stage)
        .with_audio(audio.clone());

    seq.start();
    seq.play_fade_in().ok();
    let mut shown = usize::MAX;
    // Seconds after the cue the player clicks, per round.
    let mut reactions = [0.25f32, 0.6].into_iter();

    while !seq.is_finished() {
        seq.tick(FRAME);
        indicator.borrow_mut().tick(FRAME);
        let fading = seq.transition().map_or(false, |t| t.is_running());
        if fading || seq.phase() != Phase::AwaitingAdvance {
            continue;
        }
        if shown != seq.index() {
            shown = seq.index();
            let speaker = name.borrow().clone();
            let speaker = if speaker.is_empty() { "…".to_string() } else { speaker };
            println!("  [{}] {}", speaker, line.borrow().replace('\n', " / "));
        }

        let annotation = seq.current_row().map(|r| r.annotation.clone()).unwrap_or_default();
        if *choices.borrow() {
            println!("  > {} (picking 1)", annotation);
            seq.select_choice(1);
        } else if annotation == "duel" {
            ui.hide_telop();
            loop {
                let click_after = reactions.next().unwrap_or(0.3);
                let has_next = play_round(&mut duel, &mut ui, click_after);
                if !has_next {
                    break;
                }
            }
            ui.show_telop();
            seq.force_advance();
        } else if !seq.advance() {
            seq.force_advance();
        }
    }
    ui.hide_telop();

    // --- Ending ---
    let count = seq.choice_count(config.ending.counted_choice);
    println!("\n== Ending (choice {} picked {}x) ==", config.ending.counted_choice, count);
    let mut ending = EndingSlideshow::new(config.ending.clone(), Canvas("ending"))
        .with_audio(audio.clone());
    if ending.start(count) {
        loop {
            ending.tick(FRAME);
            if ending.can_switch() && ending.click() == Some(SlideshowEvent::ReturnToTitle) {
                break;
            }
        }
    }

    ui.back_to_title_screen();
    audio.borrow_mut().play_bgm("bgm_title", false);
    let mut loaded: Vec<String> = Vec::new();
    let mut scenes = config.scenes.clone();
    scenes.request_next(&mut loaded);
    println!("\nBack at {:?}; next scene requested: {:?}", ui.active_panel(), loaded);
}

/// One duel round, including the fade that hides the enemy swap.
fn play_round(duel: &mut ReactionGame, ui: &mut GameUiManager, click_after: f32) -> bool {
    println!("  -- round {} --", duel.round() + 1);
    if duel.start().is_err() {
        return false;
    }
    let mut since_cue: Option<f32> = None;
    loop {
        if let Some(elapsed) = since_cue.as_mut() {
            *elapsed += FRAME;
            if *elapsed >= click_after && duel.is_waiting_for_click() {
                duel.click();
            }
        }
        match duel.tick(FRAME) {
            Some(ReactionEvent::EffectShown) => since_cue = Some(0.0),
            Some(ReactionEvent::RoundEnded {
                won, reaction_time, ..
            }) => {
                let time = reaction_time.map_or("no click".to_string(), |t| format!("{:.2}s", t));
                println!("    {} ({})", if won { "cut down the enemy" } else { "struck down" }, time);
            }
            Some(ReactionEvent::ReadyForTransition { has_next_round, .. }) => {
                if let Some(fade) = ui.transition_mut(Fade::Main) {
                    fade.reset_state();
                    fade.play_to_black(|| {}).ok();
                }
                settle(ui);
                if has_next_round {
                    duel.switch_to_next_enemy();
                }
                duel.restore_after_round();
                if let Some(fade) = ui.transition_mut(Fade::Main) {
                    fade.play_from_black(|| {}).ok();
                }
                settle(ui);
                return has_next_round;
            }
            None => {}
        }
    }
}

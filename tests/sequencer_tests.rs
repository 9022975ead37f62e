/// Sequencer integration tests — scenario files played end to end.

use scenario_player::core::host::shared;
use scenario_player::core::indicator::ClickableIndicator;
use scenario_player::core::sequencer::{Phase, ScenarioSequencer, SequencerConfig};
use scenario_player::core::transition::TransitionController;
use scenario_player::core::typewriter::TypewriterConfig;
use scenario_player::schema::input::InputEvent;
use scenario_player::schema::row::Delay;
use scenario_player::schema::scenario::ScenarioDocument;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

fn fixture() -> ScenarioDocument {
    ScenarioDocument::load(Path::new("tests/fixtures/branching.csv")).unwrap()
}

fn instant_text() -> SequencerConfig {
    SequencerConfig {
        typewriter: TypewriterConfig {
            enabled: false,
            ..TypewriterConfig::default()
        },
        ..SequencerConfig::default()
    }
}

struct Screen {
    name: Rc<RefCell<String>>,
    line: Rc<RefCell<String>>,
    choices: Rc<RefCell<bool>>,
    indicator: Rc<RefCell<ClickableIndicator>>,
    cues: Rc<RefCell<Vec<String>>>,
}

fn player(config: SequencerConfig, document: ScenarioDocument) -> (ScenarioSequencer, Screen) {
    let screen = Screen {
        name: shared(String::new()),
        line: shared(String::new()),
        choices: shared(false),
        indicator: shared(ClickableIndicator::default()),
        cues: shared(Vec::new()),
    };
    let sequencer = ScenarioSequencer::builder()
        .config(config)
        .document(document)
        .name_surface(screen.name.clone())
        .line_surface(screen.line.clone())
        .choices(screen.choices.clone())
        .indicator(screen.indicator.clone())
        .audio(screen.cues.clone())
        .build();
    (sequencer, screen)
}

#[test]
fn fixture_parses_with_frozen_delays() {
    let doc = fixture();
    assert_eq!(doc.len(), 7);

    let rows = doc.rows();
    assert_eq!(rows[0].delay, Delay::Inherited(0.0));
    assert_eq!(rows[1].delay, Delay::Explicit(0.5));
    assert_eq!(rows[2].delay, Delay::Inherited(0.5));
    assert_eq!(rows[5].delay, Delay::Explicit(0.0));
    assert_eq!(rows[6].delay, Delay::Inherited(0.0));

    assert!(rows[2].show_choices && rows[2].disable_click);
    assert_eq!(rows[2].annotation, "choice point");
    assert_eq!(rows[4].line, "He said \"come alone\".");
    assert_eq!(rows[1].speaker, None);
    assert_eq!(doc.next_click_lock(3), Some(4));
}

#[test]
fn full_playthrough_with_a_choice() {
    let (mut seq, screen) = player(instant_text(), fixture());
    seq.start();
    assert_eq!(screen.name.borrow().as_str(), "Kaede");
    assert_eq!(screen.line.borrow().as_str(), "The lanterns are out tonight.");
    assert!(screen.indicator.borrow().is_clickable());

    // Row 1 inherits the speaker and waits half a second.
    assert!(seq.handle_input(&InputEvent::click()));
    assert_eq!(seq.phase(), Phase::Delaying);
    assert_eq!(screen.name.borrow().as_str(), "Kaede");
    assert!(!screen.indicator.borrow().is_clickable());
    assert!(!seq.advance());
    assert_eq!(seq.index(), 1);
    seq.tick(0.5);
    assert_eq!(seq.phase(), Phase::AwaitingAdvance);

    // Row 2 is an inner monologue with choices and a click lock.
    assert!(seq.handle_input(&InputEvent::key("Space")));
    assert_eq!(screen.name.borrow().as_str(), "");
    assert!(!*screen.choices.borrow());
    seq.tick(0.5);
    assert!(*screen.choices.borrow());
    assert!(!screen.indicator.borrow().is_clickable());
    assert!(!seq.advance());

    // The choice jumps past the locked row 4.
    assert!(seq.select_choice(1));
    assert!(!*screen.choices.borrow());
    assert_eq!(seq.index(), 5);
    assert_eq!(screen.name.borrow().as_str(), "Ronin");
    assert_eq!(seq.choice_count(1), 1);
    assert_eq!(seq.choice_count(0), 0);

    assert!(seq.advance());
    assert_eq!(screen.name.borrow().as_str(), "Ronin");
    assert_eq!(screen.line.borrow().as_str(), "Draw.");
    assert!(!screen.indicator.borrow().is_clickable());

    assert!(seq.advance());
    assert!(seq.is_finished());
    assert_eq!(seq.index(), 7);
    assert!(!seq.advance());
    assert_eq!(screen.cues.borrow().len(), 5);
}

#[test]
fn unbound_input_is_ignored() {
    let (mut seq, _) = player(instant_text(), fixture());
    seq.start();
    assert!(!seq.handle_input(&InputEvent::key("Escape")));
    assert_eq!(seq.index(), 0);
}

#[test]
fn typewriter_reveals_break_markers_whole() {
    let config = SequencerConfig {
        typewriter: TypewriterConfig {
            enabled: true,
            char_interval: 0.25,
            convert_br_to_newline: true,
        },
        ..SequencerConfig::default()
    };
    let (mut seq, screen) = player(config, ScenarioDocument::parse("Kaede,Hi<br>you\nKaede,Next"));
    seq.start();
    assert_eq!(seq.phase(), Phase::Typing);
    assert_eq!(screen.line.borrow().as_str(), "H");
    seq.tick(0.25);
    seq.tick(0.25);
    assert_eq!(screen.line.borrow().as_str(), "Hi\n");
    assert!(!screen.indicator.borrow().is_clickable());

    // First advance completes the line, the second moves on.
    assert!(seq.advance());
    assert_eq!(screen.line.borrow().as_str(), "Hi\nyou");
    assert_eq!(seq.phase(), Phase::AwaitingAdvance);
    assert!(seq.advance());
    assert_eq!(seq.index(), 1);
}

fn slow_typing() -> SequencerConfig {
    SequencerConfig {
        typewriter: TypewriterConfig {
            enabled: true,
            char_interval: 1.0,
            convert_br_to_newline: true,
        },
        ..SequencerConfig::default()
    }
}

#[test]
fn skipped_line_waits_its_full_delay_from_the_skip() {
    let (mut seq, screen) = player(slow_typing(), ScenarioDocument::parse("A,hello,,1\nA,next"));
    seq.start();
    seq.tick(2.0);
    assert_eq!(seq.phase(), Phase::Typing);

    // Two seconds of typing do not count toward the one-second delay.
    assert!(seq.skip_typewriter());
    assert_eq!(screen.line.borrow().as_str(), "hello");
    assert_eq!(seq.phase(), Phase::Delaying);
    assert!(!screen.indicator.borrow().is_clickable());
    seq.tick(0.9);
    assert_eq!(seq.phase(), Phase::Delaying);
    assert!(!seq.advance());
    seq.tick(0.1);
    assert_eq!(seq.phase(), Phase::AwaitingAdvance);
    assert!(seq.advance());
    assert_eq!(seq.index(), 1);
}

#[test]
fn choice_picked_mid_typing_drops_the_old_line() {
    let csv = "A,pick one,1\nA,branch a\nA,end of a,,,,1\nB,after";
    let (mut seq, screen) = player(slow_typing(), ScenarioDocument::parse(csv));
    seq.start();
    assert_eq!(seq.phase(), Phase::Typing);
    assert_eq!(screen.line.borrow().as_str(), "p");

    assert!(seq.select_choice(0));
    assert_eq!(seq.index(), 3);
    assert_eq!(seq.choice_count(0), 1);
    assert_eq!(screen.name.borrow().as_str(), "B");
    assert_eq!(screen.line.borrow().as_str(), "a");
    assert!(!*screen.choices.borrow());

    // Only the new row keeps typing.
    seq.tick(10.0);
    assert_eq!(screen.line.borrow().as_str(), "after");
    assert_eq!(seq.phase(), Phase::AwaitingAdvance);
    assert_eq!(seq.index(), 3);
}

#[test]
fn fade_in_blocks_input_until_done() {
    let (cues, name, line) = (shared(Vec::<String>::new()), shared(String::new()), shared(String::new()));
    let mut seq = ScenarioSequencer::builder()
        .config(instant_text())
        .document(fixture())
        .name_surface(name)
        .line_surface(line)
        .audio(cues)
        .transition(TransitionController::default())
        .build();
    seq.start();
    seq.play_fade_in().unwrap();
    assert!(!seq.is_clickable());
    assert!(!seq.advance());
    for _ in 0..11 {
        seq.tick(0.1);
    }
    assert!(seq.is_clickable());
    assert!(seq.advance());
}

#[test]
fn restart_clears_progress_and_counts() {
    let (mut seq, screen) = player(instant_text(), fixture());
    seq.start();
    seq.advance();
    seq.tick(0.5);
    seq.advance();
    seq.tick(0.5);
    seq.select_choice(0);
    seq.restart();
    assert_eq!(seq.index(), 0);
    assert_eq!(seq.choice_count(0), 0);
    assert_eq!(screen.name.borrow().as_str(), "Kaede");
}

#[test]
fn missing_line_surface_disables_everything() {
    let mut seq = ScenarioSequencer::builder().document(fixture()).build();
    seq.start();
    assert_eq!(seq.phase(), Phase::Disabled);
    assert!(!seq.advance());
    assert!(!seq.select_choice(0));
}

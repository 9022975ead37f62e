/// Preview — interactive shell for stepping through a scenario.
///
/// Usage: preview [--config <game.ron>] [--scenario <file.csv>] [--seed <n>]
///
/// Commands:
///   next (or empty line)  — advance like a click
///   force                 — advance past a click lock
///   skip                  — finish the line being typed
///   choose <n>            — pick choice n
///   tick <seconds>        — let time pass
///   run                   — play until a choice, a lock or the end
///   duel <seconds>        — play a reaction round, clicking <seconds> after the cue
///   row                   — show the current row's cells
///   counts                — show choice pick counts
///   restart               — back to the first row
///   help                  — list commands
///   quit                  — exit

use scenario_player::core::audio::AudioManager;
use scenario_player::core::config::GameConfig;
use scenario_player::core::host::{shared, AudioBackend};
use scenario_player::core::indicator::ClickableIndicator;
use scenario_player::core::reaction::{ReactionEvent, ReactionGame};
use scenario_player::core::sequencer::{Phase, ScenarioSequencer};
use scenario_player::schema::scenario::ScenarioDocument;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

const FRAME: f32 = 1.0 / 60.0;

/// Prints what would have been heard.
struct ConsoleAudio;

impl AudioBackend for ConsoleAudio {
    fn play_bgm(&mut self, clip: &str, volume: f32) {
        println!("  [bgm] {} @ {:.2}", clip, volume);
    }

    fn stop_bgm(&mut self) {
        println!("  [bgm] stop");
    }

    fn set_bgm_volume(&mut self, _volume: f32) {}

    fn play_one_shot(&mut self, clip: &str, volume: f32) {
        println!("  [se] {} @ {:.2}", clip, volume);
    }
}

struct Screen {
    name: Rc<RefCell<String>>,
    line: Rc<RefCell<String>>,
    choices: Rc<RefCell<bool>>,
    indicator: Rc<RefCell<ClickableIndicator>>,
    shown: (String, String),
}

impl Screen {
    /// Print the dialogue box if it changed since the last call.
    fn refresh(&mut self, seq: &ScenarioSequencer) {
        let now = (self.name.borrow().clone(), self.line.borrow().clone());
        if now != self.shown {
            let speaker = if now.0.is_empty() { "…" } else { now.0.as_str() };
            println!("[{}] {}", speaker, now.1.replace('\n', "\n    "));
            self.shown = now;
        }
        let mut flags = Vec::new();
        if *self.choices.borrow() {
            flags.push("choices shown");
        }
        if self.indicator.borrow().is_clickable() {
            flags.push("clickable");
        }
        println!("  row {} / {:?} {}", seq.index(), seq.phase(), flags.join(", "));
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        print_usage();
        return;
    }

    let mut config_path = None;
    let mut scenario_path = None;
    let mut seed = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--scenario" if i + 1 < args.len() => {
                i += 1;
                scenario_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse::<u64>().ok();
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config_path = config_path.unwrap_or_else(|| "data/game.ron".to_string());
    let mut config = match GameConfig::load_from_ron(Path::new(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Could not load {} ({}); using defaults", config_path, e);
            GameConfig::default()
        }
    };
    if let Some(seed) = seed {
        config.reaction.seed = seed;
    }

    let scenario = scenario_path
        .map(|p| Path::new(&p).to_path_buf())
        .or_else(|| config.scenario_path(Path::new(&config_path)));
    let Some(scenario) = scenario else {
        eprintln!("No scenario given. Pass --scenario or name one in the config.");
        std::process::exit(1);
    };
    let document = match ScenarioDocument::load(&scenario) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("ERROR: Failed to load {}: {}", scenario.display(), e);
            std::process::exit(1);
        }
    };

    println!("Loaded {} rows from {}", document.len(), scenario.display());
    println!("Seed: {}", config.reaction.seed);
    println!("Type 'help' for commands.\n");

    let audio = shared(AudioManager::new(config.audio.clone(), ConsoleAudio));
    let mut screen = Screen {
        name: shared(String::new()),
        line: shared(String::new()),
        choices: shared(false),
        indicator: shared(ClickableIndicator::new(config.indicator.clone())),
        shown: (String::new(), String::new()),
    };
    let mut seq = ScenarioSequencer::builder()
        .config(config.sequencer.clone())
        .document(document)
        .name_surface(screen.name.clone())
        .line_surface(screen.line.clone())
        .choices(screen.choices.clone())
        .indicator(screen.indicator.clone())
        .audio(audio.clone())
        .build();
    let mut duel = ReactionGame::new(config.reaction.clone()).with_audio(audio.clone());

    seq.start();
    screen.refresh(&seq);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts.first().map(|c| c.to_lowercase()).unwrap_or_default();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
                continue;
            }
            "" | "next" | "n" => {
                if !seq.advance() {
                    println!("(not accepted)");
                }
            }
            "force" | "f" => {
                if !seq.force_advance() {
                    println!("(not accepted)");
                }
            }
            "skip" | "s" => {
                if !seq.skip_typewriter() {
                    println!("(nothing being typed)");
                }
            }
            "choose" | "c" => {
                let Some(choice) = parts.get(1).and_then(|p| p.parse::<usize>().ok()) else {
                    println!("Usage: choose <n>");
                    continue;
                };
                if !seq.select_choice(choice) {
                    println!("(not accepted)");
                }
            }
            "tick" | "t" => {
                let seconds = match parts.get(1).map(|p| p.parse::<f32>()) {
                    Some(Ok(s)) if s >= 0.0 => s,
                    None => 1.0,
                    _ => {
                        println!("Usage: tick <seconds>");
                        continue;
                    }
                };
                run_for(&mut seq, &mut screen, seconds);
            }
            "run" | "r" => play_until_blocked(&mut seq, &mut screen),
            "duel" | "d" => {
                let wait = match parts.get(1).map(|p| p.parse::<f32>()) {
                    Some(Ok(s)) if s >= 0.0 => s,
                    None => 0.3,
                    _ => {
                        println!("Usage: duel <seconds>");
                        continue;
                    }
                };
                play_duel(&mut duel, wait);
                continue;
            }
            "row" => {
                match seq.current_row() {
                    Some(row) => println!("  {:?}", row),
                    None => println!("  (past the end)"),
                }
                continue;
            }
            "counts" => {
                for choice in 0..4 {
                    println!("  choice {}: {}", choice, seq.choice_count(choice));
                }
                continue;
            }
            "restart" => seq.restart(),
            other => {
                println!("Unknown command: {}. Type 'help'.", other);
                continue;
            }
        }

        screen.refresh(&seq);
        if seq.is_finished() {
            println!("(scenario finished; 'restart' to play again)");
        }
    }
}

fn run_for(seq: &mut ScenarioSequencer, screen: &mut Screen, seconds: f32) {
    let mut left = seconds;
    while left > 0.0 {
        let dt = left.min(FRAME);
        seq.tick(dt);
        screen.indicator.borrow_mut().tick(dt);
        left -= dt;
    }
}

/// Click through rows as soon as they accept a click.
fn play_until_blocked(seq: &mut ScenarioSequencer, screen: &mut Screen) {
    for _ in 0..10_000 {
        match seq.phase() {
            Phase::Typing | Phase::Delaying => run_for(seq, screen, FRAME),
            Phase::AwaitingAdvance => {
                if *screen.choices.borrow() {
                    println!("  (waiting for a choice)");
                    return;
                }
                if !seq.advance() {
                    println!("  (click-locked; use 'force')");
                    return;
                }
                screen.refresh(seq);
            }
            Phase::Finished | Phase::Disabled | Phase::Idle => return,
        }
    }
}

fn play_duel(duel: &mut ReactionGame, click_after: f32) {
    if let Err(e) = duel.start() {
        println!("ERROR: {}", e);
        return;
    }
    let mut since_cue: Option<f32> = None;
    for _ in 0..100_000 {
        if let Some(elapsed) = since_cue.as_mut() {
            *elapsed += FRAME;
            if *elapsed >= click_after && duel.is_waiting_for_click() {
                match duel.click() {
                    Some(true) => println!("  click at {:.2}s: win", elapsed),
                    Some(false) => println!("  click at {:.2}s: too slow", elapsed),
                    None => {}
                }
            }
        }
        match duel.tick(FRAME) {
            Some(ReactionEvent::EffectShown) => {
                println!("  cue!");
                since_cue = Some(0.0);
            }
            Some(ReactionEvent::RoundEnded {
                won,
                reaction_time,
                has_next_round,
            }) => {
                let time = reaction_time.map_or("timed out".to_string(), |t| format!("{:.2}s", t));
                println!(
                    "  round over: {} ({}), next round: {}",
                    if won { "won" } else { "lost" },
                    time,
                    has_next_round
                );
            }
            Some(ReactionEvent::ReadyForTransition { has_next_round, .. }) => {
                duel.restore_after_round();
                if has_next_round {
                    duel.switch_to_next_enemy();
                }
                return;
            }
            None => {}
        }
    }
}

fn print_usage() {
    println!("Usage: preview [--config <game.ron>] [--scenario <file.csv>] [--seed <n>]");
    println!();
    println!("  --config    Game config (default data/game.ron)");
    println!("  --scenario  Scenario CSV (default: the one named in the config)");
    println!("  --seed      Reaction game seed");
}

fn print_help() {
    println!("Commands:");
    println!("  next, <enter>     Advance like a click");
    println!("  force             Advance past a click lock");
    println!("  skip              Finish the line being typed");
    println!("  choose <n>        Pick choice n");
    println!("  tick <seconds>    Let time pass (default 1)");
    println!("  run               Play until a choice, a lock or the end");
    println!("  duel <seconds>    Play a reaction round, clicking <seconds> after the cue");
    println!("  row               Show the current row");
    println!("  counts            Show choice pick counts");
    println!("  restart           Back to the first row");
    println!("  help              Show this help");
    println!("  quit              Exit");
}

/// Typewriter renderer — reveals a line one unit at a time.
///
/// A unit is a single character, or a whole line-break marker (`<br>`,
/// `<br/>`, `<br />`) so markup never shows up half-typed.

use serde::{Deserialize, Serialize};

/// Line-break markers, each revealed as a single unit.
pub const BREAK_MARKERS: &[&str] = &["<br />", "<br/>", "<br>"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub enabled: bool,
    /// Seconds between two revealed units.
    pub char_interval: f32,
    /// Show break markers as `\n` instead of passing them through.
    pub convert_br_to_newline: bool,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            char_interval: 0.05,
            convert_br_to_newline: false,
        }
    }
}

/// Split a line into reveal units.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some(marker) = BREAK_MARKERS.iter().find(|m| rest.starts_with(**m)) {
                units.push(marker.to_string());
                rest = &rest[marker.len()..];
                continue;
            }
        }
        units.push(c.to_string());
        rest = &rest[c.len_utf8()..];
    }

    units
}

/// Replace every break marker with a newline.
pub fn convert_breaks(line: &str) -> String {
    BREAK_MARKERS
        .iter()
        .fold(line.to_string(), |acc, marker| acc.replace(marker, "\n"))
}

fn is_break(unit: &str) -> bool {
    BREAK_MARKERS.iter().any(|m| *m == unit)
}

/// Reveal state for one line.
#[derive(Debug, Clone)]
pub struct Typewriter {
    units: Vec<String>,
    revealed: usize,
    elapsed: f32,
    interval: f32,
    convert_breaks: bool,
}

impl Typewriter {
    /// Start revealing `line`. The first unit is visible immediately; each
    /// further unit needs one full interval.
    pub fn start(line: &str, config: &TypewriterConfig) -> Self {
        let units = tokenize(line);
        let interval = config.char_interval.max(0.0);
        let revealed = if interval == 0.0 {
            units.len()
        } else {
            units.len().min(1)
        };
        Self {
            units,
            revealed,
            elapsed: 0.0,
            interval,
            convert_breaks: config.convert_br_to_newline,
        }
    }

    /// Advance by `dt` seconds. Returns true if more text became visible.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.is_finished() {
            return false;
        }
        self.elapsed += dt;
        let before = self.revealed;
        while self.elapsed >= self.interval && !self.is_finished() {
            self.elapsed -= self.interval;
            self.revealed += 1;
        }
        self.revealed != before
    }

    /// Reveal everything at once.
    pub fn skip(&mut self) {
        self.revealed = self.units.len();
        self.elapsed = 0.0;
    }

    pub fn is_finished(&self) -> bool {
        self.revealed >= self.units.len()
    }

    pub fn revealed_units(&self) -> usize {
        self.revealed
    }

    pub fn total_units(&self) -> usize {
        self.units.len()
    }

    /// The text that should currently be on screen.
    pub fn visible_text(&self) -> String {
        self.units[..self.revealed]
            .iter()
            .map(|u| {
                if self.convert_breaks && is_break(u) {
                    "\n"
                } else {
                    u.as_str()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(interval: f32) -> TypewriterConfig {
        TypewriterConfig {
            enabled: true,
            char_interval: interval,
            convert_br_to_newline: false,
        }
    }

    #[test]
    fn tokenize_keeps_markers_whole() {
        assert_eq!(
            tokenize("a<br>b<br/>c<br />d"),
            vec!["a", "<br>", "b", "<br/>", "c", "<br />", "d"]
        );
    }

    #[test]
    fn tokenize_lone_angle_bracket() {
        assert_eq!(tokenize("<b"), vec!["<", "b"]);
    }

    #[test]
    fn tokenize_multibyte() {
        assert_eq!(tokenize("居合"), vec!["居", "合"]);
    }

    #[test]
    fn first_unit_is_immediate() {
        let tw = Typewriter::start("abc", &config(0.1));
        assert_eq!(tw.visible_text(), "a");
        assert!(!tw.is_finished());
    }

    #[test]
    fn reveals_one_unit_per_interval() {
        let mut tw = Typewriter::start("abcd", &config(0.25));
        assert!(!tw.tick(0.125));
        assert_eq!(tw.visible_text(), "a");
        assert!(tw.tick(0.125));
        assert_eq!(tw.visible_text(), "ab");
        assert!(tw.tick(0.75));
        assert_eq!(tw.visible_text(), "abcd");
        assert!(tw.is_finished());
        assert!(!tw.tick(1.0));
    }

    #[test]
    fn marker_costs_one_interval() {
        let mut tw = Typewriter::start("a<br />b", &config(0.5));
        tw.tick(0.5);
        assert_eq!(tw.visible_text(), "a<br />");
        tw.tick(0.5);
        assert_eq!(tw.visible_text(), "a<br />b");
    }

    #[test]
    fn converted_markers_render_as_newlines() {
        let mut cfg = config(0.1);
        cfg.convert_br_to_newline = true;
        let mut tw = Typewriter::start("a<br>b", &cfg);
        tw.skip();
        assert_eq!(tw.visible_text(), "a\nb");
        assert_eq!(convert_breaks("x<br/>y<br />z"), "x\ny\nz");
    }

    #[test]
    fn skip_reveals_everything() {
        let mut tw = Typewriter::start("hello", &config(1.0));
        tw.skip();
        assert!(tw.is_finished());
        assert_eq!(tw.visible_text(), "hello");
    }

    #[test]
    fn zero_interval_is_instant() {
        let tw = Typewriter::start("hello", &config(0.0));
        assert!(tw.is_finished());
    }

    #[test]
    fn empty_line_is_finished() {
        let tw = Typewriter::start("", &config(0.1));
        assert!(tw.is_finished());
        assert_eq!(tw.visible_text(), "");
    }
}

use serde::{Deserialize, Serialize};

/// Post-line delay, resolved once when the document is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Delay {
    /// The row's own delay cell held a number.
    Explicit(f32),
    /// The cell was blank; carries the last explicit value above it (or 0).
    Inherited(f32),
}

impl Delay {
    /// Delay in seconds, whichever way it was obtained.
    pub fn seconds(&self) -> f32 {
        match self {
            Self::Explicit(s) | Self::Inherited(s) => *s,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::Inherited(0.0)
    }
}

/// One line of dialogue and its playback flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// `None` when the speaker cell was blank.
    pub speaker: Option<String>,
    pub line: String,
    /// Show the choice panel once this line is fully revealed.
    pub show_choices: bool,
    pub delay: Delay,
    /// Free text for the content authors (stage directions and the like).
    pub annotation: String,
    /// Suppresses click-to-advance; also marks where a branch resumes.
    pub disable_click: bool,
}

impl Row {
    /// A plain spoken line with no flags.
    pub fn spoken(speaker: Option<&str>, line: &str) -> Self {
        Self {
            speaker: speaker.map(str::to_string),
            line: line.to_string(),
            show_choices: false,
            delay: Delay::default(),
            annotation: String::new(),
            disable_click: false,
        }
    }

    /// True when every cell of the row was blank.
    pub fn is_blank(&self) -> bool {
        self.speaker.is_none()
            && self.line.is_empty()
            && !self.show_choices
            && !self.delay.is_explicit()
            && self.annotation.is_empty()
            && !self.disable_click
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_seconds() {
        assert_eq!(Delay::Explicit(1.5).seconds(), 1.5);
        assert_eq!(Delay::Inherited(0.25).seconds(), 0.25);
        assert_eq!(Delay::default().seconds(), 0.0);
        assert!(!Delay::default().is_explicit());
    }

    #[test]
    fn blank_row() {
        assert!(Row::spoken(None, "").is_blank());
        assert!(!Row::spoken(Some("Aoi"), "").is_blank());
        let mut r = Row::spoken(None, "");
        r.disable_click = true;
        assert!(!r.is_blank());
    }
}

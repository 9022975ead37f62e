/// Slideshows — the illustration sequence between scenes and the ending.
///
/// Both step through named images on click, with a cooldown after each
/// switch before the next click is accepted. Neither owns a screen fade:
/// they report what should happen next and the host drives the UI manager.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use super::audio::CLICKABLE_CLICK_CUE;
use super::host::{AudioSink, ClickableSignal, ImageSurface, PanelToggle};

/// What a slideshow wants the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideshowEvent {
    /// The illustration panel opened for the first time; fade the first image in.
    FirstFadeIn,
    /// The last illustration was clicked; play the closing transition.
    Finished,
    /// The last ending image was clicked.
    ReturnToTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IllustrationConfig {
    pub slides: Vec<String>,
    /// Seconds after activation or a switch before the next click counts.
    pub clickable_delay: f32,
}

impl Default for IllustrationConfig {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            clickable_delay: 2.0,
        }
    }
}

/// Steps through illustrations while its panel is shown.
pub struct IllustrationSlideshow {
    config: IllustrationConfig,
    image: Box<dyn ImageSurface>,
    indicator: Option<Box<dyn ClickableSignal>>,
    index: Option<usize>,
    first_shown: bool,
    panel_active: bool,
    cooldown: f32,
    could_switch: bool,
    finished: bool,
}

impl IllustrationSlideshow {
    /// Puts the first slide on `image` straight away.
    pub fn new(config: IllustrationConfig, image: impl ImageSurface + 'static) -> Self {
        let mut image: Box<dyn ImageSurface> = Box::new(image);
        let index = match config.slides.first() {
            Some(first) => {
                image.set_image(first);
                Some(0)
            }
            None => None,
        };
        Self {
            config,
            image,
            indicator: None,
            index,
            first_shown: false,
            panel_active: false,
            cooldown: 0.0,
            could_switch: false,
            finished: false,
        }
    }

    pub fn with_indicator(mut self, indicator: impl ClickableSignal + 'static) -> Self {
        self.indicator = Some(Box::new(indicator));
        self
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_last(&self) -> bool {
        self.index.is_some() && self.index == self.config.slides.len().checked_sub(1)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn can_switch(&self) -> bool {
        self.panel_active && self.cooldown >= self.config.clickable_delay
    }

    /// Per frame. `panel_active` is whether the illustration panel is shown.
    pub fn tick(&mut self, dt: f32, panel_active: bool) -> Option<SlideshowEvent> {
        let mut event = None;
        if panel_active != self.panel_active {
            self.panel_active = panel_active;
            self.cooldown = 0.0;
            if panel_active {
                if !self.first_shown {
                    self.first_shown = true;
                    event = Some(SlideshowEvent::FirstFadeIn);
                } else {
                    self.notify_clickable();
                }
            } else {
                self.set_indicator(false);
            }
        }

        if panel_active {
            self.cooldown += dt;
        }

        let can_switch = self.can_switch();
        if can_switch != self.could_switch {
            self.could_switch = can_switch;
            self.notify_clickable();
        }
        event
    }

    /// A submit press. Ignored during the cooldown and once finished.
    pub fn submit(&mut self) -> Option<SlideshowEvent> {
        if self.config.slides.is_empty() || self.finished {
            return None;
        }
        if !self.first_shown {
            self.first_shown = true;
            return Some(SlideshowEvent::FirstFadeIn);
        }
        if !self.can_switch() {
            return None;
        }
        if self.is_last() {
            self.finished = true;
            self.set_indicator(false);
            debug!("illustrations finished");
            return Some(SlideshowEvent::Finished);
        }

        let next = self.index.map_or(0, |i| i + 1);
        self.index = Some(next);
        if let Some(slide) = self.config.slides.get(next) {
            self.image.set_image(slide);
        }
        self.cooldown = 0.0;
        self.could_switch = false;
        self.set_indicator(false);
        None
    }

    fn notify_clickable(&mut self) {
        let clickable = self.first_shown && !self.finished && self.can_switch();
        self.set_indicator(clickable);
    }

    fn set_indicator(&mut self, clickable: bool) {
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.set_clickable(clickable);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndingConfig {
    /// Used when no alternative applies.
    pub slides: Vec<String>,
    pub alternatives: Vec<Vec<String>>,
    /// Which choice's pick count selects the ending.
    pub counted_choice: usize,
    /// When false, a count of zero uses `slides`.
    pub use_alternative_for_zero: bool,
    pub alternative_for_zero: usize,
    pub alternative_for_one: usize,
    pub alternative_for_two: usize,
    pub clickable_delay: f32,
    pub fade_in_duration: f32,
}

impl Default for EndingConfig {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            alternatives: Vec::new(),
            counted_choice: 1,
            use_alternative_for_zero: true,
            alternative_for_zero: 0,
            alternative_for_one: 0,
            alternative_for_two: 1,
            clickable_delay: 2.0,
            fade_in_duration: 0.5,
        }
    }
}

impl EndingConfig {
    /// The slide set for a choice picked `count` times.
    pub fn slides_for(&self, count: u32) -> &[String] {
        let alternative = match count {
            0 if self.use_alternative_for_zero => Some(self.alternative_for_zero),
            1 => Some(self.alternative_for_one),
            2 => Some(self.alternative_for_two),
            _ => None,
        };
        match alternative.and_then(|i| self.alternatives.get(i)) {
            Some(set) if !set.is_empty() => {
                info!("ending for choice count {} uses alternative set", count);
                set
            }
            _ => &self.slides,
        }
    }
}

/// Ending images: fade in, click through, back to the title.
pub struct EndingSlideshow {
    config: EndingConfig,
    image: Box<dyn ImageSurface>,
    panel: Option<Box<dyn PanelToggle>>,
    indicator: Option<Box<dyn ClickableSignal>>,
    audio: Option<Box<dyn AudioSink>>,
    slides: Vec<String>,
    index: usize,
    active: bool,
    /// Elapsed time of the fade-in, while it runs.
    fade: Option<f32>,
    cooldown: f32,
    could_switch: bool,
}

impl EndingSlideshow {
    /// Hidden and transparent until `start`.
    pub fn new(config: EndingConfig, image: impl ImageSurface + 'static) -> Self {
        let mut image: Box<dyn ImageSurface> = Box::new(image);
        image.set_alpha(0.0);
        Self {
            config,
            image,
            panel: None,
            indicator: None,
            audio: None,
            slides: Vec::new(),
            index: 0,
            active: false,
            fade: None,
            cooldown: 0.0,
            could_switch: false,
        }
    }

    pub fn with_panel(mut self, mut panel: impl PanelToggle + 'static) -> Self {
        panel.set_active(false);
        self.panel = Some(Box::new(panel));
        self
    }

    pub fn with_indicator(mut self, indicator: impl ClickableSignal + 'static) -> Self {
        self.indicator = Some(Box::new(indicator));
        self
    }

    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    pub fn config(&self) -> &EndingConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slides(&self) -> &[String] {
        &self.slides
    }

    /// Begin the ending chosen by `choice_count`. Returns false (and logs)
    /// when there is nothing to show.
    pub fn start(&mut self, choice_count: u32) -> bool {
        let slides = self.config.slides_for(choice_count).to_vec();
        let Some(first) = slides.first() else {
            error!("no ending slides configured for choice count {}", choice_count);
            return false;
        };
        self.image.set_image(first);
        self.image.set_alpha(0.0);
        self.slides = slides;
        if let Some(panel) = self.panel.as_mut() {
            panel.set_active(true);
        }
        self.active = true;
        self.index = 0;
        self.cooldown = 0.0;
        self.could_switch = false;
        self.fade = Some(0.0);
        self.set_indicator(false);
        true
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.fade = None;
        self.set_indicator(false);
        if let Some(panel) = self.panel.as_mut() {
            panel.set_active(false);
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        if let Some(elapsed) = self.fade {
            let elapsed = elapsed + dt;
            let duration = self.config.fade_in_duration;
            if duration <= 0.0 || elapsed >= duration {
                self.image.set_alpha(1.0);
                self.fade = None;
                self.cooldown = 0.0;
            } else {
                self.image.set_alpha(elapsed / duration);
                self.fade = Some(elapsed);
            }
            return;
        }

        let can_switch = self.can_switch();
        if can_switch != self.could_switch {
            self.could_switch = can_switch;
            self.set_indicator(can_switch);
        }
        self.cooldown += dt;
    }

    pub fn can_switch(&self) -> bool {
        self.active && self.fade.is_none() && self.cooldown >= self.config.clickable_delay
    }

    /// A primary click. Plays the click cue when accepted.
    pub fn click(&mut self) -> Option<SlideshowEvent> {
        if !self.can_switch() || self.slides.is_empty() {
            return None;
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.play_cue(CLICKABLE_CLICK_CUE);
        }
        if self.index + 1 >= self.slides.len() {
            self.stop();
            info!("ending finished; returning to title");
            return Some(SlideshowEvent::ReturnToTitle);
        }
        self.index += 1;
        if let Some(slide) = self.slides.get(self.index) {
            self.image.set_image(slide);
        }
        self.cooldown = 0.0;
        self.could_switch = false;
        self.set_indicator(false);
        None
    }

    fn set_indicator(&mut self, clickable: bool) {
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.set_clickable(clickable);
        }
    }
}

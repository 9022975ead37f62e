/// UI manager — exclusive panel switching and the three named screen fades.
///
/// Title, main menu, settings, credits and illustration are mutually
/// exclusive: switching shows exactly one of them. The telop panel sits on top
/// and is toggled independently. Work that must wait for a fade is queued per
/// transition and runs from `tick` on the frame the fade completes.

use log::{debug, error, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::host::PanelToggle;
use super::transition::{Completion, TransitionController, TransitionError, TransitionStatus};
use crate::schema::color::Rgba;

/// The mutually exclusive panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Panel {
    Title,
    MainMenu,
    Settings,
    Credits,
    Illustration,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Panel::Title,
        Panel::MainMenu,
        Panel::Settings,
        Panel::Credits,
        Panel::Illustration,
    ];
}

/// Which fade element a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fade {
    /// Title screen to main menu only.
    TitleToMenu,
    /// Everything that isn't one of the other two.
    Main,
    /// Dedicated to the illustration panel.
    Illustration,
}

impl Fade {
    const ALL: [Fade; 3] = [Fade::TitleToMenu, Fade::Main, Fade::Illustration];
}

enum Pending {
    HidePanel(Panel),
    ShowOnly(Panel),
    /// Hide a panel, then hand control back to the caller.
    HideThen(Panel, Completion),
}

pub struct GameUiManager {
    panels: FxHashMap<Panel, Box<dyn PanelToggle>>,
    telop: Option<Box<dyn PanelToggle>>,
    fades: FxHashMap<Fade, TransitionController>,
    pending: FxHashMap<Fade, Pending>,
    active: Option<Panel>,
}

pub struct GameUiManagerBuilder {
    panels: FxHashMap<Panel, Box<dyn PanelToggle>>,
    telop: Option<Box<dyn PanelToggle>>,
    fades: FxHashMap<Fade, TransitionController>,
}

impl GameUiManager {
    pub fn builder() -> GameUiManagerBuilder {
        GameUiManagerBuilder {
            panels: FxHashMap::default(),
            telop: None,
            fades: FxHashMap::default(),
        }
    }

    /// The exclusive panel shown last, if any.
    pub fn active_panel(&self) -> Option<Panel> {
        self.active
    }

    pub fn is_panel_active(&self, panel: Panel) -> bool {
        self.panels.get(&panel).is_some_and(|p| p.is_active())
    }

    pub fn is_telop_active(&self) -> bool {
        self.telop.as_ref().is_some_and(|t| t.is_active())
    }

    pub fn transition(&self, fade: Fade) -> Option<&TransitionController> {
        self.fades.get(&fade)
    }

    pub fn transition_mut(&mut self, fade: Fade) -> Option<&mut TransitionController> {
        self.fades.get_mut(&fade)
    }

    /// The fade used everywhere outside the title screen and illustrations.
    pub fn main_transition(&self) -> Option<&TransitionController> {
        self.transition(Fade::Main)
    }

    pub fn illustration_transition(&self) -> Option<&TransitionController> {
        self.transition(Fade::Illustration)
    }

    pub fn is_transitioning(&self) -> bool {
        self.fades.values().any(|t| t.is_running())
    }

    /// Show `panel` and hide every other exclusive panel.
    pub fn set_only(&mut self, panel: Panel) {
        for (key, toggle) in self.panels.iter_mut() {
            toggle.set_active(*key == panel);
        }
        self.active = Some(panel);
        debug!("panel -> {:?}", panel);
    }

    /// Title screen clicked: the menu goes live underneath while the title
    /// fades out, then the title panel is hidden.
    pub fn on_title_clicked(&mut self) {
        if !self.fades.contains_key(&Fade::TitleToMenu) {
            warn!("no title-to-menu transition bound; switching directly");
            self.set_only(Panel::MainMenu);
            return;
        }
        self.set_panel(Panel::MainMenu, true);
        self.active = Some(Panel::MainMenu);
        self.run_after(Fade::TitleToMenu, Pending::HidePanel(Panel::Title), |t| {
            t.play_to_black(|| {})
        });
    }

    pub fn open_settings(&mut self) {
        self.set_only(Panel::Settings);
    }

    pub fn open_credits(&mut self) {
        self.set_only(Panel::Credits);
    }

    pub fn back_to_main_menu(&mut self) {
        self.set_only(Panel::MainMenu);
    }

    /// Open the main fade from black; only the illustration panel is left
    /// once it completes.
    pub fn start_game(&mut self) {
        if !self.fades.contains_key(&Fade::Main) {
            warn!("no main transition bound; game start ignored");
            return;
        }
        self.run_after(Fade::Main, Pending::ShowOnly(Panel::Illustration), |t| {
            t.play_from_black(|| {})
        });
    }

    /// Caption panel; coexists with whatever else is shown.
    pub fn show_telop(&mut self) {
        if let Some(telop) = self.telop.as_mut() {
            telop.set_active(true);
        }
    }

    pub fn hide_telop(&mut self) {
        if let Some(telop) = self.telop.as_mut() {
            telop.set_active(false);
        }
    }

    /// Fade the first illustration in over the illustration fade.
    pub fn play_first_image_fade_in(&mut self) {
        let Some(fade) = self.fades.get_mut(&Fade::Illustration) else {
            warn!("no illustration transition bound; first image shown without a fade");
            return;
        };
        if let Err(e) = fade.play_from_black(|| {}) {
            debug!("first image fade-in skipped: {e}");
        }
    }

    /// Close the illustration panel behind the main fade, then run
    /// `on_complete`. The fade starts from a fully open screen.
    pub fn play_illustration_transition(&mut self, on_complete: impl FnOnce() + 'static) {
        let pending = Pending::HideThen(Panel::Illustration, Box::new(on_complete));
        match self.fades.get_mut(&Fade::Main) {
            Some(fade) => {
                fade.reset_state();
                self.run_after(Fade::Main, pending, |t| t.play_to_black(|| {}));
            }
            None => {
                warn!("no main transition bound; closing illustrations immediately");
                self.apply(pending);
            }
        }
    }

    /// Back to the very first screen: every fade reset, telop hidden, only
    /// the title panel shown.
    pub fn back_to_title_screen(&mut self) {
        self.pending.clear();
        for fade in self.fades.values_mut() {
            fade.reset_state();
        }
        self.hide_telop();
        self.set_only(Panel::Title);
    }

    /// Advance every fade and run the work waiting on any that completed.
    pub fn tick(&mut self, dt: f32) {
        for fade in Fade::ALL {
            let status = match self.fades.get_mut(&fade) {
                Some(t) => t.tick(dt),
                None => continue,
            };
            if status == TransitionStatus::Completed {
                if let Some(pending) = self.pending.remove(&fade) {
                    self.apply(pending);
                }
            }
        }
    }

    fn run_after(
        &mut self,
        fade: Fade,
        pending: Pending,
        start: impl FnOnce(&mut TransitionController) -> Result<(), TransitionError>,
    ) {
        let Some(controller) = self.fades.get_mut(&fade) else {
            self.apply(pending);
            return;
        };
        match start(controller) {
            Ok(()) => {
                if self.pending.insert(fade, pending).is_some() {
                    debug!("{:?} fade restarted; earlier follow-up dropped", fade);
                }
            }
            Err(e) => {
                debug!("{:?} fade not started ({e}); applying follow-up now", fade);
                self.apply(pending);
            }
        }
    }

    fn apply(&mut self, pending: Pending) {
        match pending {
            Pending::HidePanel(panel) => self.set_panel(panel, false),
            Pending::ShowOnly(panel) => self.set_only(panel),
            Pending::HideThen(panel, then) => {
                self.set_panel(panel, false);
                then();
            }
        }
    }

    fn set_panel(&mut self, panel: Panel, active: bool) {
        if let Some(toggle) = self.panels.get_mut(&panel) {
            toggle.set_active(active);
        }
        if !active && self.active == Some(panel) {
            self.active = None;
        }
    }
}

impl GameUiManagerBuilder {
    pub fn panel(mut self, panel: Panel, toggle: impl PanelToggle + 'static) -> Self {
        self.panels.insert(panel, Box::new(toggle));
        self
    }

    pub fn telop(mut self, toggle: impl PanelToggle + 'static) -> Self {
        self.telop = Some(Box::new(toggle));
        self
    }

    pub fn transition(mut self, fade: Fade, controller: TransitionController) -> Self {
        self.fades.insert(fade, controller);
        self
    }

    /// Starts on the title panel with the telop hidden.
    pub fn build(self) -> GameUiManager {
        for required in [Fade::Main, Fade::Illustration] {
            if !self.fades.contains_key(&required) {
                error!("UI manager built without the {:?} transition", required);
            }
        }
        let mut ui = GameUiManager {
            panels: self.panels,
            telop: self.telop,
            fades: self.fades,
            pending: FxHashMap::default(),
            active: None,
        };
        ui.set_only(Panel::Title);
        ui.hide_telop();
        ui
    }
}

/// Text colour that follows the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoverColor {
    pub normal: Rgba,
    pub hover: Rgba,
    #[serde(skip)]
    current: Rgba,
}

impl HoverColor {
    pub fn new(normal: Rgba, hover: Rgba) -> Self {
        Self {
            normal,
            hover,
            current: normal,
        }
    }

    pub fn color(&self) -> Rgba {
        self.current
    }

    pub fn on_pointer_enter(&mut self) {
        self.current = self.hover;
    }

    pub fn on_pointer_exit(&mut self) {
        self.current = self.normal;
    }

    /// Hidden with its panel; must not come back highlighted.
    pub fn on_disable(&mut self) {
        self.current = self.normal;
    }
}

impl Default for HoverColor {
    fn default() -> Self {
        Self::new(Rgba::GRAY, Rgba::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::shared;
    use crate::core::transition::TransitionConfig;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct Screens {
        panels: FxHashMap<Panel, Rc<RefCell<bool>>>,
        telop: Rc<RefCell<bool>>,
    }

    impl Screens {
        fn shown(&self) -> Vec<Panel> {
            Panel::ALL
                .into_iter()
                .filter(|p| *self.panels[p].borrow())
                .collect()
        }
    }

    fn fade() -> TransitionController {
        TransitionController::new(TransitionConfig {
            progress_duration: 0.5,
            overlay_duration: 0.5,
            ..TransitionConfig::default()
        })
    }

    fn manager(fades: &[Fade]) -> (GameUiManager, Screens) {
        let mut builder = GameUiManager::builder();
        let mut panels = FxHashMap::default();
        for panel in Panel::ALL {
            let flag = shared(true);
            builder = builder.panel(panel, flag.clone());
            panels.insert(panel, flag);
        }
        let telop = shared(true);
        builder = builder.telop(telop.clone());
        for f in fades {
            builder = builder.transition(*f, fade());
        }
        (builder.build(), Screens { panels, telop })
    }

    fn run(ui: &mut GameUiManager) {
        for _ in 0..10 {
            ui.tick(0.1);
        }
    }

    #[test]
    fn starts_on_title_with_telop_hidden() {
        let (ui, screens) = manager(&Fade::ALL);
        assert_eq!(screens.shown(), vec![Panel::Title]);
        assert!(!*screens.telop.borrow());
        assert_eq!(ui.active_panel(), Some(Panel::Title));
    }

    #[test]
    fn title_click_keeps_title_until_the_fade_completes() {
        let (mut ui, screens) = manager(&Fade::ALL);
        ui.on_title_clicked();
        assert_eq!(screens.shown(), vec![Panel::Title, Panel::MainMenu]);
        ui.tick(0.25);
        assert_eq!(screens.shown(), vec![Panel::Title, Panel::MainMenu]);
        run(&mut ui);
        assert_eq!(screens.shown(), vec![Panel::MainMenu]);
    }

    #[test]
    fn title_click_without_a_fade_switches_directly() {
        let (mut ui, screens) = manager(&[Fade::Main, Fade::Illustration]);
        ui.on_title_clicked();
        assert_eq!(screens.shown(), vec![Panel::MainMenu]);
    }

    #[test]
    fn menu_panels_are_exclusive_and_telop_coexists() {
        let (mut ui, screens) = manager(&Fade::ALL);
        ui.open_settings();
        assert_eq!(screens.shown(), vec![Panel::Settings]);
        ui.open_credits();
        ui.show_telop();
        assert_eq!(screens.shown(), vec![Panel::Credits]);
        assert!(ui.is_telop_active());
        ui.back_to_main_menu();
        assert_eq!(screens.shown(), vec![Panel::MainMenu]);
        assert!(ui.is_telop_active());
    }

    #[test]
    fn start_game_shows_illustrations_after_the_main_fade() {
        let (mut ui, screens) = manager(&Fade::ALL);
        ui.back_to_main_menu();
        ui.start_game();
        assert_eq!(ui.main_transition().map(|t| t.progress()), Some(0.0));
        assert_eq!(screens.shown(), vec![Panel::MainMenu]);
        run(&mut ui);
        assert_eq!(screens.shown(), vec![Panel::Illustration]);
    }

    #[test]
    fn illustration_transition_hides_panel_then_calls_back() {
        let (mut ui, screens) = manager(&Fade::ALL);
        ui.set_only(Panel::Illustration);
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        ui.play_illustration_transition(move || flag.set(true));
        assert!(!done.get());
        run(&mut ui);
        assert!(done.get());
        assert!(screens.shown().is_empty());
        assert_eq!(ui.active_panel(), None);
    }

    #[test]
    fn first_image_fade_uses_the_illustration_fade() {
        let (mut ui, _) = manager(&Fade::ALL);
        ui.play_first_image_fade_in();
        assert!(ui.illustration_transition().is_some_and(|t| t.is_running()));
        assert!(!ui.main_transition().is_some_and(|t| t.is_running()));
    }

    #[test]
    fn back_to_title_resets_everything() {
        let (mut ui, screens) = manager(&Fade::ALL);
        ui.start_game();
        ui.show_telop();
        ui.tick(0.1);
        ui.back_to_title_screen();
        assert!(!ui.is_transitioning());
        assert_eq!(screens.shown(), vec![Panel::Title]);
        assert!(!*screens.telop.borrow());
        run(&mut ui);
        assert_eq!(screens.shown(), vec![Panel::Title]);
    }

    #[test]
    fn hover_color_follows_pointer() {
        let mut hover = HoverColor::default();
        assert_eq!(hover.color(), Rgba::GRAY);
        hover.on_pointer_enter();
        assert_eq!(hover.color(), Rgba::WHITE);
        hover.on_disable();
        assert_eq!(hover.color(), Rgba::GRAY);
        hover.on_pointer_enter();
        hover.on_pointer_exit();
        assert_eq!(hover.color(), Rgba::GRAY);
    }
}

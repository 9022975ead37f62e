/// Host collaborators — the seams between the player and the game engine.
///
/// Every visible or audible effect goes through one of these traits. The
/// blanket `Rc<RefCell<T>>` impls let a host keep a handle on a surface it
/// also hands to a component, and the impls for plain values (`String`,
/// `bool`, `Vec<String>`) record what was asked of them.

use std::cell::RefCell;
use std::rc::Rc;

/// A piece of on-screen text (speaker label, dialogue line).
pub trait TextSurface {
    fn set_text(&mut self, text: &str);
}

/// The "you may click now" affordance.
pub trait ClickableSignal {
    fn set_clickable(&mut self, clickable: bool);
}

/// A panel or object that can be shown and hidden.
pub trait PanelToggle {
    fn set_active(&mut self, active: bool);
    fn is_active(&self) -> bool;
}

/// Fire-and-forget named sound cues.
pub trait AudioSink {
    fn play_cue(&mut self, cue: &str);
}

/// Low-level audio channels driven by the audio manager.
pub trait AudioBackend {
    /// Start looping music on the BGM channel.
    fn play_bgm(&mut self, clip: &str, volume: f32);
    fn stop_bgm(&mut self);
    fn set_bgm_volume(&mut self, volume: f32);
    /// Play a one-shot on the SE channel.
    fn play_one_shot(&mut self, clip: &str, volume: f32);
}

/// Fires named animation triggers on a character rig.
pub trait AnimationSink {
    fn set_trigger(&mut self, rig: &str, trigger: &str);
}

/// An image slot that shows one named picture and has an opacity.
pub trait ImageSurface {
    fn set_image(&mut self, image: &str);
    fn set_alpha(&mut self, alpha: f32);
}

/// Requests loading of a scene by name.
pub trait SceneLoader {
    fn load_scene(&mut self, name: &str);
}

// --- shared handles --------------------------------------------------------

impl<T: TextSurface + ?Sized> TextSurface for Rc<RefCell<T>> {
    fn set_text(&mut self, text: &str) {
        self.borrow_mut().set_text(text);
    }
}

impl<T: ClickableSignal + ?Sized> ClickableSignal for Rc<RefCell<T>> {
    fn set_clickable(&mut self, clickable: bool) {
        self.borrow_mut().set_clickable(clickable);
    }
}

impl<T: PanelToggle + ?Sized> PanelToggle for Rc<RefCell<T>> {
    fn set_active(&mut self, active: bool) {
        self.borrow_mut().set_active(active);
    }

    fn is_active(&self) -> bool {
        self.borrow().is_active()
    }
}

impl<T: AudioSink + ?Sized> AudioSink for Rc<RefCell<T>> {
    fn play_cue(&mut self, cue: &str) {
        self.borrow_mut().play_cue(cue);
    }
}

impl<T: AudioBackend + ?Sized> AudioBackend for Rc<RefCell<T>> {
    fn play_bgm(&mut self, clip: &str, volume: f32) {
        self.borrow_mut().play_bgm(clip, volume);
    }

    fn stop_bgm(&mut self) {
        self.borrow_mut().stop_bgm();
    }

    fn set_bgm_volume(&mut self, volume: f32) {
        self.borrow_mut().set_bgm_volume(volume);
    }

    fn play_one_shot(&mut self, clip: &str, volume: f32) {
        self.borrow_mut().play_one_shot(clip, volume);
    }
}

impl<T: AnimationSink + ?Sized> AnimationSink for Rc<RefCell<T>> {
    fn set_trigger(&mut self, rig: &str, trigger: &str) {
        self.borrow_mut().set_trigger(rig, trigger);
    }
}

impl<T: ImageSurface + ?Sized> ImageSurface for Rc<RefCell<T>> {
    fn set_image(&mut self, image: &str) {
        self.borrow_mut().set_image(image);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.borrow_mut().set_alpha(alpha);
    }
}

impl<T: SceneLoader + ?Sized> SceneLoader for Rc<RefCell<T>> {
    fn load_scene(&mut self, name: &str) {
        self.borrow_mut().load_scene(name);
    }
}

// --- recording values ------------------------------------------------------

impl TextSurface for String {
    fn set_text(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }
}

impl ClickableSignal for bool {
    fn set_clickable(&mut self, clickable: bool) {
        *self = clickable;
    }
}

impl PanelToggle for bool {
    fn set_active(&mut self, active: bool) {
        *self = active;
    }

    fn is_active(&self) -> bool {
        *self
    }
}

impl AudioSink for Vec<String> {
    fn play_cue(&mut self, cue: &str) {
        self.push(cue.to_string());
    }
}

impl SceneLoader for Vec<String> {
    fn load_scene(&mut self, name: &str) {
        self.push(name.to_string());
    }
}

/// Records `rig:trigger` pairs.
impl AnimationSink for Vec<String> {
    fn set_trigger(&mut self, rig: &str, trigger: &str) {
        self.push(format!("{rig}:{trigger}"));
    }
}

/// An image slot that remembers what it was told.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSlot {
    pub image: Option<String>,
    pub alpha: f32,
}

impl ImageSurface for ImageSlot {
    fn set_image(&mut self, image: &str) {
        self.image = Some(image.to_string());
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }
}

/// Shorthand for a shared, host-observable collaborator.
pub fn shared<T>(value: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(value))
}

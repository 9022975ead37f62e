/// Scene rotation — asks the host to load scenes from a fixed list in turn.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::host::SceneLoader;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneRotation {
    pub scenes: Vec<String>,
    #[serde(skip)]
    next: usize,
}

impl SceneRotation {
    pub fn new(scenes: Vec<String>) -> Self {
        Self { scenes, next: 0 }
    }

    /// Name the next request will load.
    pub fn peek(&self) -> Option<&str> {
        self.scenes.get(self.next).map(String::as_str)
    }

    /// Load the next scene, wrapping back to the first after the last.
    /// Returns the name requested, or `None` for an empty list.
    pub fn request_next(&mut self, loader: &mut dyn SceneLoader) -> Option<String> {
        if self.scenes.is_empty() {
            warn!("scene rotation has no scenes to load");
            return None;
        }
        let index = self.next % self.scenes.len();
        let name = self.scenes[index].clone();
        self.next = (index + 1) % self.scenes.len();
        debug!("loading scene '{}'", name);
        loader.load_scene(&name);
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around() {
        let mut rotation = SceneRotation::new(vec!["title".into(), "game".into()]);
        let mut loaded: Vec<String> = Vec::new();
        for _ in 0..3 {
            rotation.request_next(&mut loaded);
        }
        assert_eq!(loaded, vec!["title", "game", "title"]);
        assert_eq!(rotation.peek(), Some("game"));
    }

    #[test]
    fn empty_rotation_loads_nothing() {
        let mut rotation = SceneRotation::default();
        let mut loaded: Vec<String> = Vec::new();
        assert_eq!(rotation.request_next(&mut loaded), None);
        assert!(loaded.is_empty());
    }
}

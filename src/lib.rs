//! Scenario Player — presentation logic for visual-novel style games.
//!
//! CSV-driven dialogue playback with typewriter text, shader-driven screen
//! fades, panel switching and a reaction-timing minigame. Everything runs on
//! an explicit per-frame `tick(dt)`; rendering, audio and animation are left
//! to the host through the traits in [`core::host`].

pub mod core;
pub mod schema;

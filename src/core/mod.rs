pub mod audio;
pub mod avatar;
pub mod config;
pub mod csv;
pub mod delay;
pub mod host;
pub mod indicator;
pub mod reaction;
pub mod scene;
pub mod sequencer;
pub mod slideshow;
pub mod transition;
pub mod typewriter;
pub mod ui;

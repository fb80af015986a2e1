pub mod animation;
pub mod app;
pub mod audio;
pub mod canvas;
pub mod clock;
pub mod color;
pub mod config;
pub mod effects;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod math;
pub mod palette;
pub mod physics;
pub mod render;
pub mod ripple;
pub mod terminal;

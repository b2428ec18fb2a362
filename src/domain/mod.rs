pub mod entity;
pub mod palette;
pub mod pattern;
pub mod physics;
pub mod rules;
pub mod tile;

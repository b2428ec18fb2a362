pub mod draw;
pub mod font;
pub mod framebuffer;
pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
pub mod sprites;

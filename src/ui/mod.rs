pub mod gamepad;
pub mod input;
pub mod palette;
pub mod renderer;
pub mod sound;

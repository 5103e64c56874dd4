pub mod direction;
pub mod grid;
pub mod rules;
pub mod tile;

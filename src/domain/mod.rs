pub mod block;
pub mod entity;
pub mod geometry;
pub mod grid;
pub mod physics;
pub mod player;
pub mod tile;

//! Gumshoe: an isometric detective adventure runtime.
//!
//! The crate owns the authoritative world state each frame: the isometric
//! camera (view/projection matrices), the player controller (position,
//! facing, animation weights), the static collision field, and the hecs
//! scene world of props, lights, doors and clue objects. A renderer walks
//! that state; it is not part of this crate.

pub mod animation;
pub mod camera;
pub mod cli;
pub mod collision;
pub mod components;
pub mod engine;
pub mod game;
pub mod input;
pub mod player;
pub mod scene;
pub mod store;
pub mod transform;
pub mod world;

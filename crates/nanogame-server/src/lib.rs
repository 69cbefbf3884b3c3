//! A minimal multiplayer server for the 1.8 block-game protocol.
//!
//! Players log into a flat, empty world and paint a 16×16 grid of colored
//! cells by walking over it.

pub mod config;
pub mod connection;
pub mod error;
pub mod grid;
pub mod server;
pub mod table;

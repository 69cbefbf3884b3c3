//! Wire protocol for the nanogame server: a fixed subset of the 1.8
//! (protocol 47) block-game protocol.

pub mod codec;
pub mod error;
pub mod frame;
pub mod packets;
pub mod types;

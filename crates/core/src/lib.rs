//! Core round logic. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod clock;
pub mod config;
pub mod events;
pub mod rng;
pub mod round;
pub mod score;

pub use cards::*;
pub use clock::*;
pub use config::*;
pub use events::*;
pub use rng::*;
pub use round::*;
pub use score::*;

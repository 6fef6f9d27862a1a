//! Asset loading and card providers.

pub mod load;
pub mod provider;
pub mod schema;
#[cfg(feature = "unsplash")]
pub mod unsplash;

pub use load::*;
pub use provider::*;
pub use schema::*;
#[cfg(feature = "unsplash")]
pub use unsplash::UnsplashProvider;

//! Season normalization and standings-window resolution.

pub mod normalize;
pub mod window;

pub use normalize::{normalize, CanonicalSeason};
pub use window::{resolve, SeasonWindow, View};

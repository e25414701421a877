//! Placement planning and autoplay on top of the core session
//!
//! - [`place`]: turn a target column and rotation into a list of actions
//! - [`autoplay`]: pick the best placement with a board heuristic

pub mod autoplay;
pub mod place;

pub use autoplay::{best_placement, evaluate, Autoplayer, BoardFeatures, Candidate, Weights};
pub use place::{apply_place, plan_place, PlaceError, PlacePlan, Placement};

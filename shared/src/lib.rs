pub mod artifact;
pub mod coords;
pub mod links;
pub mod marker;
pub mod place;
pub mod staticmap;

pub use artifact::MapArtifact;
pub use coords::{Bounds, Coordinates};
pub use links::TravelMode;
pub use marker::*;
pub use place::*;
pub use staticmap::{MapRequest, MapSize};

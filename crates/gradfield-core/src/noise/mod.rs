pub mod cell;
pub mod fbm;
pub mod lattice;
pub mod params;

pub use cell::{evaluate, smooth};
pub use fbm::{snap_dimensions, OctaveSchedule, Pass};
pub use lattice::Lattice;

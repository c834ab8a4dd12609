pub mod education;
pub mod scale;
pub mod topology;

pub use education::{EducationRecord, find_record};
pub use scale::*;
pub use topology::{CountyShape, Topology, TopologyError, county_shapes};

pub mod bounds;
pub mod engine;
pub mod filter;
pub mod range;
pub mod state;

pub use bounds::{AxisBounds, rotated_bounds};
pub use engine::{SliceEngine, SliceView};
pub use filter::{FilteredPoints, filter_points};
pub use range::{Axis, AxisRange};
pub use state::{SliceKey, SliceState};

//! Viewing session over a decoded point cloud: rotation-aware slicing,
//! debounced recomputation and buffer hand-off to a renderer.
pub mod debounce;
pub mod driver;
pub mod error;
pub mod session;
pub mod settings;
pub mod slicing;
pub mod surface;

pub use debounce::Debouncer;
pub use driver::SessionDriver;
pub use error::{Result, SessionError};
pub use session::{LoadTicket, Session};
pub use settings::SessionSettings;
pub use slicing::{Axis, AxisBounds, AxisRange, SliceEngine, SliceKey, SliceState, SliceView};
pub use surface::{RecordingSurface, RenderSurface};

pub mod geometry;
pub mod mapper;
pub mod selector;

pub use geometry::{Point, Rectangle, SurfaceSize};
pub use mapper::{map_to_display, map_to_native};
pub use selector::{RoiSelector, SelectorState};

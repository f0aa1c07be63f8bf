//! Small self-contained helpers.
//!
//! - [`Timer`]: per-frame delta tracking for the render loop
//! - [`FpsCounter`]: once-per-second frame rate average

pub mod fps_counter;
pub mod time;

pub use fps_counter::FpsCounter;
pub use time::Timer;

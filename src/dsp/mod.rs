pub mod delay_line;
pub mod feedback_matrix;
pub mod fixed_point;

pub use delay_line::DelayLine;
pub use feedback_matrix::{FeedbackGains, FeedbackMatrix};
pub use fixed_point::{Fixed18_14, Fixed32_32, Fixed50_14};

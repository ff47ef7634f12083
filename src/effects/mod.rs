pub mod delay;
pub mod mix;

pub use delay::{DelayCommand, DelayParameters, DelayState, ParameterState};
pub use mix::{ClearMixBufferCommand, CopyMixBufferCommand, MixCommand};

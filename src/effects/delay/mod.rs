mod command;
mod parameters;
mod state;

pub use command::{DelayCommand, WorkBufferHandle};
pub use parameters::{DelayParameters, ParameterState, VERSION_1_SIZE};
pub use state::{delay_line_size, DelayState};

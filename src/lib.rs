// ADSP Backend - command-list audio effect engine
//
// Emulates a console audio DSP that runs an ordered list of effect commands
// against a shared pool of mix buffers once per tick. All signal math is done
// in fixed point so output matches the hardware bit for bit.

pub mod audio;
pub mod command;
pub mod config;
pub mod dsp;
pub mod effects;
pub mod error;

/// Most channels a single effect can address
pub const MAX_CHANNELS: usize = 6;

// Re-export commonly used types
pub use audio::{EffectStatePool, MixBufferPool, Renderer, RendererController, StateId};
pub use command::{
    AudioCommand, CancelToken, CommandList, CommandListProcessor, RenderCommand, RenderEvent,
    TickReport,
};
pub use config::RendererConfig;
pub use effects::{DelayCommand, DelayParameters, DelayState, ParameterState};
pub use error::{ConfigError, ControllerError, ParameterError};

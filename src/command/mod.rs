pub mod command_trait;
pub mod processor;
pub mod types;

pub use command_trait::AudioCommand;
pub use processor::{CancelToken, CommandList, CommandListProcessor, TickReport};
pub use types::{EffectId, RenderCommand, RenderEvent};

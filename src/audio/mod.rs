pub mod mix_buffer;
pub mod renderer;
pub mod state_pool;

pub use mix_buffer::MixBufferPool;
pub use renderer::{Renderer, RendererController};
pub use state_pool::{EffectStatePool, StateId};

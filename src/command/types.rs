use crate::effects::DelayParameters;
use std::time::Duration;

/// Stable id of an effect slot owned by the renderer
pub type EffectId = u32;

/// Commands sent from the control thread to the renderer
#[derive(Debug, Clone)]
pub enum RenderCommand {
    // Effect slot management
    /// Create a delay effect slot (effect_id, parameters, enabled)
    AddDelay(EffectId, DelayParameters, bool),
    /// Replace a delay slot's parameter block
    UpdateDelay(EffectId, DelayParameters),
    /// Enable or disable an effect slot; disabled effects pass input through
    SetEffectEnabled(EffectId, bool),
    /// Tear down an effect slot and free its state
    RemoveEffect(EffectId),
}

/// Events sent from the renderer back to the control thread
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// A tick finished (tick number, render time)
    TickRendered(u64, Duration),
    /// A tick took longer than the rendering time limit (tick number, render time)
    DeadlineMissed(u64, Duration),
    /// An effect failed verification this tick and was bypassed
    EffectRejected(EffectId),
    /// A command referenced an effect slot that does not exist
    UnknownEffect(EffectId),
}

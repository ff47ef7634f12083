use crate::audio::{EffectStatePool, MixBufferPool};

/// One scheduled unit of work in a command list
///
/// All commands must be Send so a list can be built on one thread and rendered
/// on the DSP thread. `process` runs once per tick and must not allocate, block
/// or panic: a command that cannot do its job logs and degrades.
pub trait AudioCommand: Send {
    /// Run one tick of processing
    ///
    /// # Arguments
    /// * `mix_buffers` - Shared mix buffer pool to read inputs from and write outputs to
    /// * `states` - Persistent effect state, looked up by the command's handle
    fn process(&mut self, mix_buffers: &mut MixBufferPool, states: &mut EffectStatePool);

    /// Check the command's static configuration before it is scheduled
    ///
    /// # Returns
    /// False if the command must not be processed this tick
    fn verify(&self, mix_buffers: &MixBufferPool, states: &EffectStatePool) -> bool;

    /// Append a human-readable description of this command to `output`
    fn dump(&self, output: &mut String);

    /// Run instead of `process` when `verify` rejected the command
    fn bypass(&mut self, _mix_buffers: &mut MixBufferPool) {
        // Default: contribute nothing
    }

    /// Diagnostic name of the command type
    fn name(&self) -> &str;
}

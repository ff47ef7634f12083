use crate::audio::{EffectStatePool, MixBufferPool};
use crate::command::AudioCommand;
use crate::dsp::{Fixed18_14, Fixed50_14};
use std::fmt::Write;

/// Zero every mix buffer
#[derive(Debug, Clone, Default)]
pub struct ClearMixBufferCommand;

impl AudioCommand for ClearMixBufferCommand {
    fn process(&mut self, mix_buffers: &mut MixBufferPool, _states: &mut EffectStatePool) {
        mix_buffers.clear();
    }

    fn verify(&self, _mix_buffers: &MixBufferPool, _states: &EffectStatePool) -> bool {
        true
    }

    fn dump(&self, output: &mut String) {
        output.push_str("ClearMixBufferCommand\n");
    }

    fn name(&self) -> &str {
        "ClearMixBufferCommand"
    }
}

/// Copy one mix buffer into another
#[derive(Debug, Clone)]
pub struct CopyMixBufferCommand {
    pub input: i16,
    pub output: i16,
}

impl CopyMixBufferCommand {
    pub fn new(input: i16, output: i16) -> Self {
        Self { input, output }
    }
}

impl AudioCommand for CopyMixBufferCommand {
    fn process(&mut self, mix_buffers: &mut MixBufferPool, _states: &mut EffectStatePool) {
        match (mix_buffers.slot(self.input), mix_buffers.slot(self.output)) {
            (Some(input), Some(output)) => {
                mix_buffers.copy_channel(input, output);
            }
            _ => log::error!(
                "Copy offsets {:02X} -> {:02X} outside the mix buffer pool",
                self.input,
                self.output
            ),
        }
    }

    fn verify(&self, mix_buffers: &MixBufferPool, _states: &EffectStatePool) -> bool {
        mix_buffers.slot(self.input).is_some() && mix_buffers.slot(self.output).is_some()
    }

    fn dump(&self, output: &mut String) {
        let _ = writeln!(
            output,
            "CopyMixBufferCommand\n\tinput {:02X} output {:02X}",
            self.input, self.output
        );
    }

    fn name(&self) -> &str {
        "CopyMixBufferCommand"
    }
}

/// Accumulate a scaled mix buffer into another
#[derive(Debug, Clone)]
pub struct MixCommand {
    pub input: i16,
    pub output: i16,
    pub volume: Fixed18_14,
}

impl MixCommand {
    pub fn new(input: i16, output: i16, volume: Fixed18_14) -> Self {
        Self {
            input,
            output,
            volume,
        }
    }
}

impl AudioCommand for MixCommand {
    fn process(&mut self, mix_buffers: &mut MixBufferPool, _states: &mut EffectStatePool) {
        let slots = (mix_buffers.slot(self.input), mix_buffers.slot(self.output));
        let (Some(input), Some(output)) = slots else {
            log::error!(
                "Mix offsets {:02X} -> {:02X} outside the mix buffer pool",
                self.input,
                self.output
            );
            return;
        };

        for i in 0..mix_buffers.sample_count() {
            let sample = Fixed50_14::from_int(mix_buffers.sample(input, i) as i64);
            let scaled = (sample * self.volume).to_int_floor();
            let mixed = mix_buffers.sample(output, i).wrapping_add(scaled as i32);
            mix_buffers.set_sample(output, i, mixed);
        }
    }

    fn verify(&self, mix_buffers: &MixBufferPool, _states: &EffectStatePool) -> bool {
        mix_buffers.slot(self.input).is_some() && mix_buffers.slot(self.output).is_some()
    }

    fn dump(&self, output: &mut String) {
        let _ = writeln!(
            output,
            "MixCommand\n\tinput {:02X} output {:02X} volume {}",
            self.input, self.output, self.volume
        );
    }

    fn name(&self) -> &str {
        "MixCommand"
    }
}

use super::parameters::{DelayParameters, ParameterState};
use super::state::DelayState;
use crate::audio::{EffectStatePool, MixBufferPool, StateId};
use crate::command::AudioCommand;
use crate::dsp::{FeedbackMatrix, Fixed50_14};
use crate::MAX_CHANNELS;
use std::fmt::Write;

/// Widening applied to input samples before fixed-point processing
const SAMPLE_SCALE: i32 = 64;

/// Opaque guest workbuffer address. Carried for the guest's benefit, never read.
pub type WorkBufferHandle = u64;

/// Multi-channel feedback delay with a one-pole lowpass in the feedback path
#[derive(Debug, Clone)]
pub struct DelayCommand {
    /// Input mix buffer offsets for each channel
    pub inputs: [i16; MAX_CHANNELS],
    /// Output mix buffer offsets for each channel
    pub outputs: [i16; MAX_CHANNELS],
    pub parameter: DelayParameters,
    /// Handle of this instance's `DelayState`
    pub state: StateId,
    pub workbuffer: WorkBufferHandle,
    /// When false, inputs are copied to outputs untouched
    pub effect_enabled: bool,
}

impl DelayCommand {
    pub fn new(
        inputs: [i16; MAX_CHANNELS],
        outputs: [i16; MAX_CHANNELS],
        parameter: DelayParameters,
        state: StateId,
        effect_enabled: bool,
    ) -> Self {
        Self {
            inputs,
            outputs,
            parameter,
            state,
            workbuffer: 0,
            effect_enabled,
        }
    }

    /// Resolve the first `channels` input/output offsets to slots
    fn resolve_slots(
        &self,
        mix_buffers: &MixBufferPool,
        channels: usize,
    ) -> Option<([usize; MAX_CHANNELS], [usize; MAX_CHANNELS])> {
        let mut inputs = [0usize; MAX_CHANNELS];
        let mut outputs = [0usize; MAX_CHANNELS];
        for channel in 0..channels {
            inputs[channel] = mix_buffers.slot(self.inputs[channel])?;
            outputs[channel] = mix_buffers.slot(self.outputs[channel])?;
        }
        Some((inputs, outputs))
    }

    /// Copy every addressable input channel to its output
    fn copy_through(&self, mix_buffers: &mut MixBufferPool) {
        for channel in 0..self.parameter.active_channels() {
            let input = mix_buffers.slot(self.inputs[channel]);
            let output = mix_buffers.slot(self.outputs[channel]);
            if let (Some(input), Some(output)) = (input, output) {
                mix_buffers.copy_channel(input, output);
            }
        }
    }
}

/// Run the delay network over one tick
fn apply_delay(
    params: &DelayParameters,
    state: &mut DelayState,
    matrix: &FeedbackMatrix,
    mix_buffers: &mut MixBufferPool,
    inputs: &[usize],
    outputs: &[usize],
) {
    let channels = matrix.channels();

    for i in 0..mix_buffers.sample_count() {
        let mut input_samples = [Fixed50_14::ZERO; MAX_CHANNELS];
        let mut delay_samples = [Fixed50_14::ZERO; MAX_CHANNELS];
        for channel in 0..channels {
            let sample = mix_buffers.sample(inputs[channel], i).wrapping_mul(SAMPLE_SCALE);
            input_samples[channel] = Fixed50_14::from_int(sample as i64);
            delay_samples[channel] = state.delay_lines[channel].read();
        }

        let mut gained_samples = [Fixed50_14::ZERO; MAX_CHANNELS];
        for channel in 0..channels {
            let delay = matrix.mix(&delay_samples[..channels], channel);
            gained_samples[channel] = input_samples[channel] * params.in_gain + delay;
        }

        for channel in 0..channels {
            state.lowpass_z[channel] = gained_samples[channel] * state.lowpass_gain
                + state.lowpass_z[channel] * state.lowpass_feedback_gain;
            state.delay_lines[channel].write(state.lowpass_z[channel]);
        }

        // Floor and narrow to i32 first, then divide truncating toward zero.
        for channel in 0..channels {
            let mixed = input_samples[channel] * params.dry_gain
                + delay_samples[channel] * params.wet_gain;
            let output = mixed.to_int_floor() as i32 / SAMPLE_SCALE;
            mix_buffers.set_sample(outputs[channel], i, output);
        }
    }
}

impl AudioCommand for DelayCommand {
    fn process(&mut self, mix_buffers: &mut MixBufferPool, states: &mut EffectStatePool) {
        let channels = self.parameter.active_channels();
        let Some((inputs, outputs)) = self.resolve_slots(mix_buffers, channels) else {
            log::error!("Delay channel offsets outside the mix buffer pool");
            return;
        };

        if !FeedbackMatrix::is_supported(self.parameter.channel_count.max(0) as usize) {
            log::error!("Invalid delay channels {}", self.parameter.channel_count);
            self.copy_through(mix_buffers);
            return;
        }

        if !self.effect_enabled {
            self.copy_through(mix_buffers);
            return;
        }

        let Some(state) = states.get_mut::<DelayState>(self.state) else {
            log::error!("Delay state {} missing", self.state);
            self.copy_through(mix_buffers);
            return;
        };

        match self.parameter.state {
            ParameterState::Initialized => state.initialize(&self.parameter),
            ParameterState::Updating => state.update_parameters(&self.parameter),
            ParameterState::Updated => {}
        }

        if !state.is_initialized_for(channels) {
            log::error!(
                "Delay state {} was never initialized for {} channels",
                self.state,
                channels
            );
            self.copy_through(mix_buffers);
            return;
        }

        let Some(matrix) = state.feedback_matrix(&self.parameter) else {
            self.copy_through(mix_buffers);
            return;
        };

        apply_delay(
            &self.parameter,
            state,
            &matrix,
            mix_buffers,
            &inputs[..channels],
            &outputs[..channels],
        );
    }

    fn verify(&self, mix_buffers: &MixBufferPool, states: &EffectStatePool) -> bool {
        let count = self.parameter.channel_count;
        if count < 0 || count as usize > MAX_CHANNELS {
            return false;
        }
        self.resolve_slots(mix_buffers, count as usize).is_some()
            && states.contains::<DelayState>(self.state)
    }

    fn dump(&self, output: &mut String) {
        let _ = write!(output, "DelayCommand\n\tenabled {} \n\tinputs: ", self.effect_enabled);
        for input in &self.inputs {
            let _ = write!(output, "{:02X}, ", input);
        }
        output.push_str("\n\toutputs: ");
        for out in &self.outputs {
            let _ = write!(output, "{:02X}, ", out);
        }
        output.push('\n');
    }

    fn bypass(&mut self, mix_buffers: &mut MixBufferPool) {
        self.copy_through(mix_buffers);
    }

    fn name(&self) -> &str {
        "DelayCommand"
    }
}

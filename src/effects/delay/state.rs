use super::parameters::DelayParameters;
use crate::dsp::{DelayLine, FeedbackGains, FeedbackMatrix, Fixed18_14, Fixed32_32, Fixed50_14};
use crate::MAX_CHANNELS;

/// Hardware scale applied to the requested feedback gain
const FEEDBACK_SCALE: f32 = 0.97998046875;
/// Hardware scale applied to the requested lowpass amount
const LOWPASS_SCALE: f32 = 0.949951171875;
/// Longest delay, in seconds, per unit of `delay_time_max`
const MAX_DELAY_SCALE: f32 = 0.064;

/// Persistent state of one delay effect instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelayState {
    pub feedback_gain: Fixed18_14,
    pub delay_feedback_gain: Fixed18_14,
    pub delay_feedback_cross_gain: Fixed18_14,
    pub lowpass_gain: Fixed18_14,
    pub lowpass_feedback_gain: Fixed18_14,
    /// One-pole lowpass accumulator per channel
    pub lowpass_z: [Fixed50_14; MAX_CHANNELS],
    /// One history buffer per active channel
    pub delay_lines: Vec<DelayLine>,
}

/// Delay line sizing for a parameter block
///
/// # Returns
/// `(sample_count, sample_count_max)`, both floored to whole samples
pub fn delay_line_size(params: &DelayParameters) -> (i64, i64) {
    let sample_count_max = Fixed32_32::from_f32(MAX_DELAY_SCALE)
        .mul_int(params.sample_rate.to_int_floor().wrapping_mul(params.delay_time_max) as i64);

    let mut delay_time = Fixed18_14::from_int(params.delay_time);
    delay_time *= params.sample_rate.div_int(1000);
    let sample_count = Fixed32_32::from(delay_time).min(sample_count_max);

    (sample_count.to_int_floor(), sample_count_max.to_int_floor())
}

impl DelayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything, size the delay lines for `params` and derive coefficients
    pub fn initialize(&mut self, params: &DelayParameters) {
        *self = Self::default();

        let (sample_count, sample_count_max) = delay_line_size(params);
        self.delay_lines = (0..params.active_channels())
            .map(|_| DelayLine::new(sample_count, sample_count_max))
            .collect();

        self.update_parameters(params);
    }

    /// Re-derive the gain coefficients. Delay lines and filter history are untouched.
    pub fn update_parameters(&mut self, params: &DelayParameters) {
        let mut channel_spread = params.channel_spread;
        if params.channel_count == 4 || params.channel_count == 6 {
            channel_spread >>= 1;
        }

        self.feedback_gain = params.feedback_gain * Fixed18_14::from_f32(FEEDBACK_SCALE);
        self.delay_feedback_gain = self.feedback_gain * (Fixed18_14::ONE - channel_spread);
        self.delay_feedback_cross_gain = channel_spread * self.feedback_gain;
        self.lowpass_feedback_gain = params.lowpass_amount * Fixed18_14::from_f32(LOWPASS_SCALE);
        self.lowpass_gain = Fixed18_14::ONE - self.lowpass_feedback_gain;
    }

    /// Feedback matrix for the current coefficients, or `None` for unsupported channel counts
    pub fn feedback_matrix(&self, params: &DelayParameters) -> Option<FeedbackMatrix> {
        let channel_count = usize::try_from(params.channel_count).ok()?;
        FeedbackMatrix::new(
            channel_count,
            FeedbackGains {
                feedback: self.feedback_gain,
                direct: self.delay_feedback_gain,
                cross: self.delay_feedback_cross_gain,
                lfe: params.feedback_gain,
            },
        )
    }

    /// True once delay lines exist for `channels` channels
    pub fn is_initialized_for(&self, channels: usize) -> bool {
        self.delay_lines.len() >= channels
    }
}

use crate::dsp::Fixed18_14;
use crate::error::ParameterError;
use crate::MAX_CHANNELS;
use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

/// Lifecycle tag carried by a parameter block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterState {
    /// Resize and clear the delay lines, then derive coefficients
    Initialized,
    /// Derive coefficients only
    Updating,
    /// Steady state, nothing to re-derive
    Updated,
}

impl TryFrom<u8> for ParameterState {
    type Error = ParameterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Initialized),
            1 => Ok(Self::Updating),
            2 => Ok(Self::Updated),
            other => Err(ParameterError::InvalidState(other)),
        }
    }
}

impl From<ParameterState> for u8 {
    fn from(state: ParameterState) -> Self {
        match state {
            ParameterState::Initialized => 0,
            ParameterState::Updating => 1,
            ParameterState::Updated => 2,
        }
    }
}

/// Delay effect parameter block, version 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayParameters {
    /// Input mix buffer offsets per channel
    pub inputs: [i8; MAX_CHANNELS],
    /// Output mix buffer offsets per channel
    pub outputs: [i8; MAX_CHANNELS],
    pub channel_count_max: i16,
    pub channel_count: i16,
    pub delay_time_max: i32,
    /// Delay time in milliseconds
    pub delay_time: i32,
    pub sample_rate: Fixed18_14,
    pub in_gain: Fixed18_14,
    pub feedback_gain: Fixed18_14,
    pub wet_gain: Fixed18_14,
    pub dry_gain: Fixed18_14,
    pub channel_spread: Fixed18_14,
    pub lowpass_amount: Fixed18_14,
    pub state: ParameterState,
}

impl Default for DelayParameters {
    fn default() -> Self {
        Self {
            inputs: [0, 1, 2, 3, 4, 5],
            outputs: [0, 1, 2, 3, 4, 5],
            channel_count_max: MAX_CHANNELS as i16,
            channel_count: 2,
            delay_time_max: 5,
            delay_time: 100,
            sample_rate: Fixed18_14::from_int(48000),
            in_gain: Fixed18_14::ONE,
            feedback_gain: Fixed18_14::from_f32(0.5),
            wet_gain: Fixed18_14::from_f32(0.5),
            dry_gain: Fixed18_14::ONE,
            channel_spread: Fixed18_14::ZERO,
            lowpass_amount: Fixed18_14::ZERO,
            state: ParameterState::Initialized,
        }
    }
}

/// Bytes of a version 1 block that carry data
const VERSION_1_USED: usize = 0x35;
/// Size of a version 1 block including trailing padding
pub const VERSION_1_SIZE: usize = 0x38;

impl DelayParameters {
    /// Decode a guest-written parameter block
    ///
    /// # Arguments
    /// * `version` - Parameter layout version reported by the guest; only 1 is known
    /// * `bytes` - Raw little-endian block
    pub fn decode(version: u32, bytes: &[u8]) -> Result<Self, ParameterError> {
        match version {
            1 => Self::decode_v1(bytes),
            other => Err(ParameterError::UnsupportedVersion(other)),
        }
    }

    fn decode_v1(bytes: &[u8]) -> Result<Self, ParameterError> {
        if bytes.len() < VERSION_1_USED {
            return Err(ParameterError::Truncated {
                expected: VERSION_1_USED,
                got: bytes.len(),
            });
        }

        let mut inputs = [0i8; MAX_CHANNELS];
        let mut outputs = [0i8; MAX_CHANNELS];
        for channel in 0..MAX_CHANNELS {
            inputs[channel] = bytes[channel] as i8;
            outputs[channel] = bytes[MAX_CHANNELS + channel] as i8;
        }
        let fixed = |offset: usize| Fixed18_14::from_raw(LittleEndian::read_i32(&bytes[offset..]));

        Ok(Self {
            inputs,
            outputs,
            channel_count_max: LittleEndian::read_i16(&bytes[0x0C..]),
            channel_count: LittleEndian::read_i16(&bytes[0x0E..]),
            delay_time_max: LittleEndian::read_i32(&bytes[0x10..]),
            delay_time: LittleEndian::read_i32(&bytes[0x14..]),
            sample_rate: fixed(0x18),
            in_gain: fixed(0x1C),
            feedback_gain: fixed(0x20),
            wet_gain: fixed(0x24),
            dry_gain: fixed(0x28),
            channel_spread: fixed(0x2C),
            lowpass_amount: fixed(0x30),
            state: ParameterState::try_from(bytes[0x34])?,
        })
    }

    /// Encode as a version 1 block
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; VERSION_1_SIZE];
        for channel in 0..MAX_CHANNELS {
            bytes[channel] = self.inputs[channel] as u8;
            bytes[MAX_CHANNELS + channel] = self.outputs[channel] as u8;
        }
        LittleEndian::write_i16(&mut bytes[0x0C..], self.channel_count_max);
        LittleEndian::write_i16(&mut bytes[0x0E..], self.channel_count);
        LittleEndian::write_i32(&mut bytes[0x10..], self.delay_time_max);
        LittleEndian::write_i32(&mut bytes[0x14..], self.delay_time);

        let gains = [
            self.sample_rate,
            self.in_gain,
            self.feedback_gain,
            self.wet_gain,
            self.dry_gain,
            self.channel_spread,
            self.lowpass_amount,
        ];
        for (index, gain) in gains.iter().enumerate() {
            LittleEndian::write_i32(&mut bytes[0x18 + index * 4..], gain.to_raw());
        }
        bytes[0x34] = self.state.into();
        bytes
    }

    /// Load a parameter block from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ParameterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of channels actually addressed, bounded by the hardware maximum
    pub fn active_channels(&self) -> usize {
        (self.channel_count.max(0) as usize).min(MAX_CHANNELS)
    }
}

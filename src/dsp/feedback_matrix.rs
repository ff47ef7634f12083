use super::fixed_point::{Fixed18_14, Fixed50_14};
use crate::MAX_CHANNELS;

/// Which coefficient sits at a matrix position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tap {
    Zero,
    /// Scaled feedback gain, mono only
    Feedback,
    /// Channel feeding itself
    Direct,
    /// Channel feeding a spatial neighbour
    Cross,
    /// Unscaled feedback gain on the LFE channel
    Lfe,
}

use Tap::{Cross as C, Direct as D, Feedback as F, Lfe as L, Zero as O};

// Rows are source channels, columns are destination channels.
static LAYOUT_MONO: &[&[Tap]] = &[&[F]];

static LAYOUT_STEREO: &[&[Tap]] = &[
    &[D, C],
    &[C, D],
];

// Front L/R, rear L/R
static LAYOUT_QUAD: &[&[Tap]] = &[
    &[D, C, C, O],
    &[C, D, O, C],
    &[C, O, D, C],
    &[O, C, C, D],
];

// Front L/R, rear L/R, centre, LFE
static LAYOUT_SURROUND: &[&[Tap]] = &[
    &[D, O, O, O, C, C],
    &[O, D, O, C, C, O],
    &[C, O, D, C, O, O],
    &[O, C, C, D, O, O],
    &[C, C, O, O, D, O],
    &[O, O, O, O, O, L],
];

fn layout(channel_count: usize) -> Option<&'static [&'static [Tap]]> {
    match channel_count {
        1 => Some(LAYOUT_MONO),
        2 => Some(LAYOUT_STEREO),
        4 => Some(LAYOUT_QUAD),
        6 => Some(LAYOUT_SURROUND),
        _ => None,
    }
}

/// Gains the matrix is filled from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackGains {
    pub feedback: Fixed18_14,
    pub direct: Fixed18_14,
    pub cross: Fixed18_14,
    pub lfe: Fixed18_14,
}

/// Channel-count specific feedback matrix for the delay network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMatrix {
    channels: usize,
    coefficients: [[Fixed18_14; MAX_CHANNELS]; MAX_CHANNELS],
}

impl FeedbackMatrix {
    /// Build the matrix for `channel_count`, or `None` for unsupported layouts
    pub fn new(channel_count: usize, gains: FeedbackGains) -> Option<Self> {
        let layout = layout(channel_count)?;
        let mut coefficients = [[Fixed18_14::ZERO; MAX_CHANNELS]; MAX_CHANNELS];

        for (row, taps) in layout.iter().enumerate() {
            for (column, tap) in taps.iter().enumerate() {
                coefficients[row][column] = match tap {
                    Tap::Zero => Fixed18_14::ZERO,
                    Tap::Feedback => gains.feedback,
                    Tap::Direct => gains.direct,
                    Tap::Cross => gains.cross,
                    Tap::Lfe => gains.lfe,
                };
            }
        }

        Some(Self {
            channels: channel_count,
            coefficients,
        })
    }

    pub fn is_supported(channel_count: usize) -> bool {
        layout(channel_count).is_some()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn get(&self, source: usize, destination: usize) -> Fixed18_14 {
        self.coefficients[source][destination]
    }

    /// Feedback contribution arriving at `destination` from every channel's delayed sample
    #[inline]
    pub fn mix(&self, delay_samples: &[Fixed50_14], destination: usize) -> Fixed50_14 {
        let mut delay = Fixed50_14::ZERO;
        for (source, sample) in delay_samples.iter().take(self.channels).enumerate() {
            delay += *sample * self.coefficients[source][destination];
        }
        delay
    }
}

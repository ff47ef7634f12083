use adsp_backend::dsp::Fixed18_14;
use adsp_backend::effects::delay::delay_line_size;
use adsp_backend::{
    AudioCommand, DelayCommand, DelayParameters, DelayState, EffectStatePool, MixBufferPool,
    ParameterState,
};

const SAMPLE_COUNT: usize = 240;
const INPUTS: [i16; 6] = [0, 1, 2, 3, 4, 5];
const OUTPUTS: [i16; 6] = [6, 7, 8, 9, 10, 11];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Echo-only parameters: no dry signal, no feedback, no lowpass
fn echo_params(channel_count: i16, delay_time: i32) -> DelayParameters {
    DelayParameters {
        channel_count,
        delay_time,
        delay_time_max: 5,
        sample_rate: Fixed18_14::from_int(48000),
        in_gain: Fixed18_14::ONE,
        feedback_gain: Fixed18_14::ZERO,
        wet_gain: Fixed18_14::ONE,
        dry_gain: Fixed18_14::ZERO,
        channel_spread: Fixed18_14::ZERO,
        lowpass_amount: Fixed18_14::ZERO,
        state: ParameterState::Initialized,
        ..Default::default()
    }
}

fn fill_inputs(pool: &mut MixBufferPool, channels: usize) {
    for channel in 0..channels {
        let buffer = pool.channel_mut(channel).unwrap();
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = (i as i32 * 37 - 4000) * (channel as i32 + 1);
        }
    }
}

fn output(pool: &MixBufferPool, channel: usize) -> Vec<i32> {
    pool.channel(OUTPUTS[channel] as usize).unwrap().to_vec()
}

#[test]
fn test_disabled_delay_copies_input_verbatim() {
    init_logging();

    for channels in [1i16, 2, 4, 6] {
        let mut pool = MixBufferPool::new(12, SAMPLE_COUNT);
        let mut states = EffectStatePool::new();
        let state = states.insert(DelayState::new());
        fill_inputs(&mut pool, channels as usize);

        let mut params = echo_params(channels, 10);
        params.feedback_gain = Fixed18_14::from_f32(0.7);
        let mut delay = DelayCommand::new(INPUTS, OUTPUTS, params, state, false);
        delay.process(&mut pool, &mut states);

        for channel in 0..channels as usize {
            assert_eq!(output(&pool, channel), pool.channel(channel).unwrap());
        }
        // Disabled effects never run a lifecycle transition
        assert_eq!(states.get::<DelayState>(state), Some(&DelayState::new()));
    }
}

#[test]
fn test_delay_line_sizing_scenario() {
    let params = DelayParameters {
        sample_rate: Fixed18_14::from_int(48000),
        delay_time_max: 5,
        delay_time: 100,
        ..Default::default()
    };
    assert_eq!(delay_line_size(&params), (4800, 15360));

    let mut state = DelayState::new();
    state.initialize(&params);
    assert_eq!(state.delay_lines.len(), 2);
    for line in &state.delay_lines {
        assert_eq!(line.len(), 4800);
        assert_eq!(line.sample_count_max, 15360);
        assert_eq!(line.position(), 0);
        assert_eq!(line.decay_rate, Fixed18_14::ONE);
    }
}

#[test]
fn test_delay_line_length_stays_within_bounds() {
    for delay_time in [0, 1, 100, 320, 1000, 2000] {
        let params = DelayParameters {
            delay_time,
            ..echo_params(1, 0)
        };
        let mut state = DelayState::new();
        state.initialize(&params);

        let line = &state.delay_lines[0];
        assert!(line.len() >= 1, "delay_time {} gave an empty line", delay_time);
        assert!(
            line.len() as i64 <= line.sample_count_max,
            "delay_time {} exceeded the maximum",
            delay_time
        );
    }
}

#[test]
fn test_unit_feedback_scales_to_hardware_gain() {
    let params = DelayParameters {
        feedback_gain: Fixed18_14::ONE,
        ..echo_params(1, 10)
    };
    let mut state = DelayState::new();
    state.initialize(&params);

    assert_eq!(state.feedback_gain, Fixed18_14::from_f32(0.97998046875));
    assert_eq!(state.feedback_gain.to_raw(), 16056);
}

#[test]
fn test_coefficient_derivation() {
    let params = DelayParameters {
        channel_count: 4,
        feedback_gain: Fixed18_14::ONE,
        channel_spread: Fixed18_14::from_f32(0.5),
        lowpass_amount: Fixed18_14::ONE,
        ..echo_params(4, 10)
    };
    let mut state = DelayState::new();
    state.initialize(&params);

    // Spread is halved for quad and surround layouts
    let spread = Fixed18_14::from_f32(0.25);
    assert_eq!(state.delay_feedback_gain, state.feedback_gain * (Fixed18_14::ONE - spread));
    assert_eq!(state.delay_feedback_cross_gain, spread * state.feedback_gain);
    assert_eq!(state.lowpass_feedback_gain, Fixed18_14::from_f32(0.949951171875));
    assert_eq!(state.lowpass_gain, Fixed18_14::ONE - state.lowpass_feedback_gain);
}

#[test]
fn test_stereo_matrix_is_symmetric() {
    let params = DelayParameters {
        feedback_gain: Fixed18_14::from_f32(0.8),
        channel_spread: Fixed18_14::from_f32(0.3),
        ..echo_params(2, 10)
    };
    let mut state = DelayState::new();
    state.initialize(&params);

    let matrix = state.feedback_matrix(&params).unwrap();
    assert_eq!(matrix.get(0, 1), matrix.get(1, 0));
    assert_eq!(matrix.get(0, 1), state.delay_feedback_cross_gain);
    assert_eq!(matrix.get(0, 0), state.delay_feedback_gain);
    assert_eq!(matrix.get(1, 1), state.delay_feedback_gain);
}

#[test]
fn test_initialize_clears_history() {
    init_logging();

    let mut pool = MixBufferPool::new(12, SAMPLE_COUNT);
    let mut states = EffectStatePool::new();
    let state = states.insert(DelayState::new());

    let mut params = echo_params(6, 3);
    params.feedback_gain = Fixed18_14::from_f32(0.75);
    params.channel_spread = Fixed18_14::from_f32(0.25);
    params.lowpass_amount = Fixed18_14::from_f32(0.5);
    params.dry_gain = Fixed18_14::from_f32(0.5);

    // Dirty the delay lines and filters
    fill_inputs(&mut pool, 6);
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, params.clone(), state, true);
    delay.process(&mut pool, &mut states);
    assert!(output(&pool, 0).iter().any(|&s| s != 0));

    // Re-initialize and feed silence
    pool.clear();
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, params.clone(), state, true);
    delay.process(&mut pool, &mut states);
    for channel in 0..6 {
        assert!(output(&pool, channel).iter().all(|&s| s == 0), "channel {} not silent", channel);
    }

    // A steady tick of silence stays silent
    params.state = ParameterState::Updated;
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, params, state, true);
    delay.process(&mut pool, &mut states);
    for channel in 0..6 {
        assert!(output(&pool, channel).iter().all(|&s| s == 0));
    }
}

#[test]
fn test_unsupported_channel_count_passes_through() {
    init_logging();

    let mut pool = MixBufferPool::new(12, SAMPLE_COUNT);
    let mut states = EffectStatePool::new();
    let state = states.insert(DelayState::new());

    // Give the state some history first
    fill_inputs(&mut pool, 2);
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, echo_params(2, 2), state, true);
    delay.process(&mut pool, &mut states);
    let before = states.get::<DelayState>(state).unwrap().clone();

    fill_inputs(&mut pool, 3);
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, echo_params(3, 2), state, true);
    assert!(delay.verify(&pool, &states));
    delay.process(&mut pool, &mut states);

    for channel in 0..3 {
        assert_eq!(output(&pool, channel), pool.channel(channel).unwrap());
    }
    assert_eq!(states.get::<DelayState>(state), Some(&before));
}

#[test]
fn test_impulse_echoes_after_delay_time() {
    let mut pool = MixBufferPool::new(12, SAMPLE_COUNT);
    let mut states = EffectStatePool::new();
    let state = states.insert(DelayState::new());
    pool.channel_mut(0).unwrap()[0] = 1000;

    // 1ms at 48kHz is 48 samples; half feedback re-enters the line
    let mut params = echo_params(1, 1);
    params.feedback_gain = Fixed18_14::from_f32(0.5);
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, params, state, true);
    delay.process(&mut pool, &mut states);

    let out = output(&pool, 0);
    assert_eq!(out[48], 1000);
    // 64000 * (0.5 * 0.97998046875) = 31359.375, floored then divided by 64
    assert_eq!(out[96], 489);
    for (i, sample) in out.iter().enumerate() {
        if i % 48 != 0 || i == 0 {
            assert_eq!(*sample, 0, "unexpected output at {}", i);
        }
    }
}

/// Half feedback, half spread and half lowpass on a 1ms delay
///
/// Resolved coefficients (raw 18.14): feedback 8028, direct 6021, cross 2007,
/// lowpass gain 8602, lowpass feedback 7782.
fn network_params(channel_count: i16) -> DelayParameters {
    DelayParameters {
        feedback_gain: Fixed18_14::from_f32(0.5),
        channel_spread: Fixed18_14::from_f32(0.5),
        lowpass_amount: Fixed18_14::from_f32(0.5),
        ..echo_params(channel_count, 1)
    }
}

fn render_impulses(channel_count: i16, impulse_channels: &[usize]) -> Vec<Vec<i32>> {
    let mut pool = MixBufferPool::new(12, SAMPLE_COUNT);
    let mut states = EffectStatePool::new();
    let state = states.insert(DelayState::new());
    for &channel in impulse_channels {
        pool.channel_mut(channel).unwrap()[0] = 1000;
    }

    let params = network_params(channel_count);
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, params, state, true);
    delay.process(&mut pool, &mut states);

    (0..channel_count as usize)
        .map(|channel| output(&pool, channel))
        .collect()
}

fn column(out: &[Vec<i32>], index: usize) -> Vec<i32> {
    out.iter().map(|channel| channel[index]).collect()
}

#[test]
fn test_quad_network_impulse_response() {
    let out = render_impulses(4, &[0]);

    for i in 0..48 {
        assert_eq!(column(&out, i), vec![0, 0, 0, 0], "early output at {}", i);
    }
    // 64000 through the lowpass: 64000 * 8602 / 16384 = 33601.56, then / 64
    assert_eq!(column(&out, 48), vec![525, 0, 0, 0]);
    // Filter tail decays by 7782 / 16384 per sample
    assert_eq!(column(&out, 49), vec![249, 0, 0, 0]);
    assert_eq!(column(&out, 50), vec![118, 0, 0, 0]);
    // Second lap: front left feeds itself and both neighbours, never the diagonal corner
    assert_eq!(column(&out, 96), vec![101, 33, 33, 0]);
    assert_eq!(column(&out, 97), vec![96, 32, 32, 0]);
    // Third lap reaches the corner through the neighbours
    assert_eq!(column(&out, 144), vec![23, 13, 13, 4]);
}

#[test]
fn test_surround_network_impulse_response() {
    let out = render_impulses(6, &[0]);

    assert_eq!(column(&out, 48), vec![525, 0, 0, 0, 0, 0]);
    // Front left feeds itself, centre and LFE
    assert_eq!(column(&out, 96), vec![101, 0, 0, 0, 33, 33]);
}

#[test]
fn test_surround_lfe_feeds_only_itself() {
    let out = render_impulses(6, &[5]);

    for channel in 0..5 {
        assert!(out[channel].iter().all(|&s| s == 0), "LFE leaked into channel {}", channel);
    }
    assert_eq!(out[5][48], 525);
    // The LFE tap uses the unscaled 0.5 feedback gain, not 8028
    assert_eq!(out[5][96], 137);
    assert_eq!(out[5][144], 36);
}

#[test]
fn test_output_division_truncates_toward_zero() {
    let mut pool = MixBufferPool::new(12, SAMPLE_COUNT);
    let mut states = EffectStatePool::new();
    let state = states.insert(DelayState::new());
    pool.channel_mut(0).unwrap()[..3].copy_from_slice(&[-3, -1, -100]);

    let mut params = echo_params(1, 1);
    params.wet_gain = Fixed18_14::ZERO;
    params.dry_gain = Fixed18_14::from_f32(0.5);
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, params, state, true);
    delay.process(&mut pool, &mut states);

    // -3 * 64 * 0.5 = -96; -96 / 64 truncates to -1
    assert_eq!(&output(&pool, 0)[..3], &[-1, 0, -50]);
}

#[test]
fn test_output_wraps_to_i32_before_division() {
    let mut pool = MixBufferPool::new(12, SAMPLE_COUNT);
    let mut states = EffectStatePool::new();
    let state = states.insert(DelayState::new());
    pool.channel_mut(0).unwrap()[0] = 1_000_000;

    let mut params = echo_params(1, 1);
    params.wet_gain = Fixed18_14::ZERO;
    params.dry_gain = Fixed18_14::from_int(100);
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, params, state, true);
    delay.process(&mut pool, &mut states);

    // 64_000_000 * 100 = 6_400_000_000 wraps to 2_105_032_704 before the / 64
    assert_eq!(output(&pool, 0)[0], 32_891_136);
}

#[test]
fn test_updating_keeps_delay_history() {
    let mut pool = MixBufferPool::new(12, SAMPLE_COUNT);
    let mut states = EffectStatePool::new();
    let state = states.insert(DelayState::new());
    pool.channel_mut(0).unwrap()[0] = 1000;

    // 5ms is exactly one tick, so the echo lands at the start of the next tick
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, echo_params(1, 5), state, true);
    delay.process(&mut pool, &mut states);
    assert!(output(&pool, 0).iter().all(|&s| s == 0));

    pool.clear();
    let mut params = echo_params(1, 5);
    params.state = ParameterState::Updating;
    params.wet_gain = Fixed18_14::from_f32(0.5);
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, params, state, true);
    delay.process(&mut pool, &mut states);
    assert_eq!(output(&pool, 0)[0], 500);
}

#[test]
fn test_initialized_discards_delay_history() {
    let mut pool = MixBufferPool::new(12, SAMPLE_COUNT);
    let mut states = EffectStatePool::new();
    let state = states.insert(DelayState::new());
    pool.channel_mut(0).unwrap()[0] = 1000;

    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, echo_params(1, 5), state, true);
    delay.process(&mut pool, &mut states);

    pool.clear();
    let mut delay = DelayCommand::new(INPUTS, OUTPUTS, echo_params(1, 5), state, true);
    delay.process(&mut pool, &mut states);
    assert!(output(&pool, 0).iter().all(|&s| s == 0));
}

#[test]
fn test_in_place_processing() {
    let mut pool = MixBufferPool::new(12, SAMPLE_COUNT);
    let mut states = EffectStatePool::new();
    let state = states.insert(DelayState::new());
    pool.channel_mut(0).unwrap()[0] = 1000;

    let mut delay = DelayCommand::new(INPUTS, INPUTS, echo_params(1, 1), state, true);
    delay.process(&mut pool, &mut states);

    let out = pool.channel(0).unwrap();
    assert_eq!(out[0], 0);
    assert_eq!(out[48], 1000);
}

#[test]
fn test_verify() {
    let pool = MixBufferPool::new(12, SAMPLE_COUNT);
    let mut states = EffectStatePool::new();
    let state = states.insert(DelayState::new());
    let not_a_delay = states.insert(0u32);

    let verify = |outputs: [i16; 6], params: DelayParameters, state: u32| {
        DelayCommand::new(INPUTS, outputs, params, state, true).verify(&pool, &states)
    };

    assert!(verify(OUTPUTS, echo_params(2, 10), state));
    assert!(!verify(OUTPUTS, echo_params(7, 10), state));
    assert!(!verify(OUTPUTS, echo_params(-1, 10), state));
    assert!(!verify(OUTPUTS, echo_params(2, 10), not_a_delay));
    assert!(!verify(OUTPUTS, echo_params(2, 10), 99));

    let mut far_outputs = OUTPUTS;
    far_outputs[1] = 12;
    assert!(!verify(far_outputs, echo_params(2, 10), state));
    // Unused channels are not checked
    assert!(verify(far_outputs, echo_params(1, 10), state));
}

#[test]
fn test_dump_lists_offsets_in_hex() {
    let outputs = [10, 11, 12, 13, 14, 15];
    let delay = DelayCommand::new(INPUTS, outputs, echo_params(2, 10), 0, true);

    let mut text = String::new();
    delay.dump(&mut text);
    assert_eq!(
        text,
        concat!(
            "DelayCommand\n\tenabled true \n",
            "\tinputs: 00, 01, 02, 03, 04, 05, \n",
            "\toutputs: 0A, 0B, 0C, 0D, 0E, 0F, \n",
        )
    );
}

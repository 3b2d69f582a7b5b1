use std::error::Error;

use crate::drivers::switch::rumble::{
    exp2_steps, RumbleAmFm, RumbleDecoder, AMP_7BIT_TABLE, AMP_MIN, COMMAND_TABLE,
    FREQ_7BIT_TABLE, HIGH_BAND_CENTER_HZ, LOW_BAND_CENTER_HZ,
};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[tokio::test]
async fn test_exp2_lookup() -> Result<(), Box<dyn Error>> {
    assert_eq!(exp2_steps(0), 1.0);
    assert_eq!(exp2_steps(32), 2.0);
    assert_eq!(exp2_steps(-32), 0.5);
    assert!(close(exp2_steps(16), std::f32::consts::SQRT_2));
    assert!(close(exp2_steps(-132), 2f32.powf(-132.0 / 32.0)));
    assert_eq!(COMMAND_TABLE.len(), 32);
    Ok(())
}

#[tokio::test]
async fn test_7bit_tables() -> Result<(), Box<dyn Error>> {
    assert_eq!(AMP_7BIT_TABLE[0], AMP_MIN);
    assert_eq!(AMP_7BIT_TABLE[1], -208);
    assert_eq!(AMP_7BIT_TABLE[12], -98);
    assert_eq!(AMP_7BIT_TABLE[13], -105);
    assert_eq!(AMP_7BIT_TABLE[31], -69);
    assert_eq!(AMP_7BIT_TABLE[32], -68);
    assert_eq!(AMP_7BIT_TABLE[64], -36);
    assert_eq!(AMP_7BIT_TABLE[100], 0);
    assert_eq!(AMP_7BIT_TABLE[127], 0);

    assert_eq!(FREQ_7BIT_TABLE[0x00], -64);
    assert_eq!(FREQ_7BIT_TABLE[0x40], 0);
    assert_eq!(FREQ_7BIT_TABLE[0x60], 32);
    assert_eq!(FREQ_7BIT_TABLE[0x7f], 63);
    Ok(())
}

#[tokio::test]
async fn test_neutral_sample() -> Result<(), Box<dyn Error>> {
    let mut decoder = RumbleDecoder::new();
    let output = decoder.decode_bytes([0x00, 0x01, 0x40, 0x40]);
    assert_eq!(
        output,
        RumbleAmFm {
            low_band_amp: 0.0,
            low_band_freq: LOW_BAND_CENTER_HZ,
            high_band_amp: 0.0,
            high_band_freq: HIGH_BAND_CENTER_HZ,
        }
    );
    assert!(output.is_silent());
    Ok(())
}

#[tokio::test]
async fn test_full_amplitude_sample() -> Result<(), Box<dyn Error>> {
    let mut decoder = RumbleDecoder::new();
    // Both bands at their center frequency and amplitude code 100
    let output = decoder.decode_bytes([0x00, 0xc9, 0x40, 0x72]);
    assert_eq!(
        output,
        RumbleAmFm {
            low_band_amp: 1.0,
            low_band_freq: LOW_BAND_CENTER_HZ,
            high_band_amp: 1.0,
            high_band_freq: HIGH_BAND_CENTER_HZ,
        }
    );
    assert_eq!(output.motor_speed(), 255);

    // No samples re-emits the previous output
    assert_eq!(decoder.decode(0), output);
    assert_eq!(decoder.decode_bytes([0, 0, 0, 0]), output);
    Ok(())
}

#[tokio::test]
async fn test_direct_sample_values() -> Result<(), Box<dyn Error>> {
    let mut decoder = RumbleDecoder::new();
    // High band 0x60/0x40, low band 0x20/0x0a
    let output = decoder.decode_bytes([0x80, 0x81, 0x20, 0x45]);
    assert_eq!(output.high_band_freq, 640.0);
    assert!(close(output.high_band_amp, 0.4585));
    assert_eq!(output.low_band_freq, 80.0);
    assert!(close(output.low_band_amp, 0.0776));
    Ok(())
}

#[tokio::test]
async fn test_single_mixed_samples() -> Result<(), Box<dyn Error>> {
    let mut decoder = RumbleDecoder::new();
    // High band direct, low band command 14
    decoder.decode((1 << 30) | 1 | (0x60 << 2) | (100 << 9) | (14 << 16));
    assert_eq!(decoder.high_band().freq, 32);
    assert_eq!(decoder.high_band().amp, 0);
    assert_eq!(decoder.low_band().freq, -6);
    assert_eq!(decoder.low_band().amp, AMP_MIN);

    // High band command 13, low band direct
    decoder.decode((1 << 30) | 2 | (13 << 2) | (0x20 << 16) | (64 << 23));
    assert_eq!(decoder.high_band().freq, -12);
    assert_eq!(decoder.high_band().amp, 0);
    assert_eq!(decoder.low_band().freq, -32);
    assert_eq!(decoder.low_band().amp, -36);

    // One command pair
    decoder.decode((1 << 30) | 3 | (16 << 2) | (5 << 7));
    assert_eq!(decoder.high_band().freq, 12);
    assert_eq!(decoder.low_band().amp, -64);
    Ok(())
}

#[tokio::test]
async fn test_triple_commands() -> Result<(), Box<dyn Error>> {
    let mut decoder = RumbleDecoder::new();
    let word = (3 << 30) | 23 | (1 << 5) | (23 << 10) | (9 << 15) | (16 << 20) | (29 << 25);
    let output = decoder.decode(word);

    assert_eq!(decoder.low_band().amp, -132);
    assert_eq!(decoder.low_band().freq, 0);
    assert_eq!(decoder.high_band().amp, AMP_MIN);
    assert_eq!(decoder.high_band().freq, 12);

    assert!(close(output.low_band_amp, 0.0573));
    assert_eq!(output.low_band_freq, LOW_BAND_CENTER_HZ);
    assert_eq!(output.high_band_amp, 0.0);
    assert!(close(output.high_band_freq, 414.989));
    Ok(())
}

#[tokio::test]
async fn test_dual_commands_clamp() -> Result<(), Box<dyn Error>> {
    let mut decoder = RumbleDecoder::new();
    let word = (2 << 30) | (1 << 7) | (2 << 12) | (17 << 17);
    decoder.decode(word);
    assert_eq!(decoder.low_band().amp, 0);
    assert_eq!(decoder.high_band().amp, -16);
    assert_eq!(decoder.high_band().freq, 0);

    let raise_freq =
        (3 << 30) | 24 | (24 << 5) | (24 << 10) | (24 << 15) | (24 << 20) | (24 << 25);
    for _ in 0..40 {
        decoder.decode(raise_freq);
    }
    assert_eq!(decoder.low_band().freq, 64);
    assert_eq!(decoder.low_band().amp, 0);
    assert!(close(decoder.decode(0).low_band_freq, 640.0));
    Ok(())
}

#[tokio::test]
async fn test_dual_mixed_samples() -> Result<(), Box<dyn Error>> {
    let mut decoder = RumbleDecoder::new();
    // High band direct followed by a command pair
    decoder.decode((2 << 30) | 1 | (0x60 << 2) | (100 << 9) | (1 << 16) | (14 << 21));
    assert_eq!(decoder.high_band().freq, 32);
    assert_eq!(decoder.high_band().amp, 0);
    assert_eq!(decoder.low_band().freq, -6);
    assert_eq!(decoder.low_band().amp, AMP_MIN);

    // A command pair followed by the low band direct
    decoder.decode((2 << 30) | 2 | (13 << 2) | (2 << 7) | (0x20 << 16) | (64 << 23));
    assert_eq!(decoder.high_band().freq, -12);
    assert_eq!(decoder.low_band().freq, -32);
    assert_eq!(decoder.low_band().amp, -36);

    // The reserved dual format carries nothing
    let output = decoder.decode(0);
    assert_eq!(decoder.decode((2 << 30) | 3 | (0x7f << 2)), output);
    Ok(())
}

#[tokio::test]
async fn test_reset_command_silences() -> Result<(), Box<dyn Error>> {
    let mut decoder = RumbleDecoder::new();
    decoder.decode_bytes([0x00, 0xc9, 0x40, 0x72]);
    let output = decoder.decode((3 << 30) | (23 << 10) | (23 << 15) | (23 << 20) | (23 << 25));
    assert!(output.is_silent());
    assert_eq!(output.motor_speed(), 0);
    assert_eq!(decoder.low_band().freq, 0);
    assert_eq!(decoder.high_band().freq, 0);
    Ok(())
}

//! Decoder for the vibration samples carried in output reports 0x01 and
//! 0x10.
//!
//! Each motor receives one 32-bit little endian word per report. The top two
//! bits select how many samples the word holds. Single and dual sample words
//! carry a format selector in bits 0-1. Samples either set a band directly
//! with 7-bit codes from [AMP_7BIT_TABLE] and [FREQ_7BIT_TABLE] or adjust it
//! with a 5-bit command from [COMMAND_TABLE]. Amplitude and frequency are
//! tracked in 1/32 steps of log2 and only converted to linear values on
//! output.
//!
//! A single sample with both bands set directly is laid out as
//! `aaaaaa00 bbbbbbba dccccccc 01dddddd`: high band frequency (a), high band
//! amplitude (b), low band frequency (c) and low band amplitude (d).

use Adjust::{Ignore, Substitute as Set, Sum};

/// Resting frequency of the low band in Hz
pub const LOW_BAND_CENTER_HZ: f32 = 160.0;
/// Resting frequency of the high band in Hz
pub const HIGH_BAND_CENTER_HZ: f32 = 320.0;

/// Amplitude step at and below which a band is silent
pub const AMP_MIN: i32 = -256;
pub const AMP_MAX: i32 = 0;
pub const FREQ_MIN: i32 = -64;
pub const FREQ_MAX: i32 = 64;

/// Log2 steps of the 7-bit amplitude codes. The scale is piecewise
/// logarithmic: codes up to 12 move 10 steps each, codes up to 31 move 2 steps
/// and higher codes move 1 step. Code 100 is full amplitude and code 0 is off.
pub const AMP_7BIT_TABLE: [i32; 128] = amp_7bit_table();

/// Log2 steps of the 7-bit frequency codes relative to the band center.
/// Code 0x40 is the center frequency.
pub const FREQ_7BIT_TABLE: [i32; 128] = freq_7bit_table();

const fn amp_7bit_table() -> [i32; 128] {
    let mut table = [AMP_MIN; 128];
    let mut code = 1;
    while code < 128 {
        let steps = match code {
            1..=12 => 10 * code - 218,
            13..=31 => 2 * code - 131,
            _ => code - 100,
        };
        table[code as usize] = if steps > AMP_MAX { AMP_MAX } else { steps };
        code += 1;
    }
    table
}

const fn freq_7bit_table() -> [i32; 128] {
    let mut table = [0; 128];
    let mut code = 0;
    while code < 128 {
        table[code as usize] = code - 0x40;
        code += 1;
    }
    table
}

/// 2^(i/32)
const EXP2_TABLE: [f32; 32] = [
    1.0000000, 1.0218971, 1.0442738, 1.0671404, 1.0905077, 1.1143867, 1.1387886, 1.1637249,
    1.1892071, 1.2152474, 1.2418578, 1.2690510, 1.2968396, 1.3252366, 1.3542555, 1.3839099,
    1.4142136, 1.4451808, 1.4768261, 1.5091644, 1.5422108, 1.5759808, 1.6104903, 1.6457555,
    1.6817928, 1.7186193, 1.7562522, 1.7947091, 1.8340081, 1.8741676, 1.9152066, 1.9571441,
];

/// 2^(steps/32)
pub fn exp2_steps(steps: i32) -> f32 {
    let int = steps.div_euclid(32);
    let frac = steps.rem_euclid(32) as usize;
    EXP2_TABLE[frac] * 2f32.powi(int)
}

/// What a 5-bit command does to one value of a band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjust {
    /// Leave the value alone
    Ignore,
    /// Replace the value
    Substitute(i32),
    /// Add to the value, clamping to its range
    Sum(i32),
}

impl Adjust {
    fn apply(self, value: i32, min: i32, max: i32) -> i32 {
        match self {
            Self::Ignore => value,
            Self::Substitute(v) => v.clamp(min, max),
            Self::Sum(v) => (value + v).clamp(min, max),
        }
    }
}

/// A 5-bit command: amplitude adjustment and frequency adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub amp: Adjust,
    pub freq: Adjust,
}

const fn cmd(amp: Adjust, freq: Adjust) -> Command {
    Command { amp, freq }
}

/// Commands addressable by a 5-bit index
pub const COMMAND_TABLE: [Command; 32] = [
    // Reset the band
    cmd(Set(AMP_MIN), Set(0)),
    // Fixed amplitudes
    cmd(Set(0), Ignore),
    cmd(Set(-16), Ignore),
    cmd(Set(-32), Ignore),
    cmd(Set(-48), Ignore),
    cmd(Set(-64), Ignore),
    cmd(Set(-80), Ignore),
    cmd(Set(-96), Ignore),
    cmd(Set(-112), Ignore),
    cmd(Set(-128), Ignore),
    cmd(Set(-144), Ignore),
    cmd(Set(-160), Ignore),
    cmd(Set(-176), Ignore),
    // Fixed frequency offsets
    cmd(Ignore, Set(-12)),
    cmd(Ignore, Set(-6)),
    cmd(Ignore, Set(6)),
    cmd(Ignore, Set(12)),
    // Relative adjustments
    cmd(Sum(4), Sum(0)),
    cmd(Sum(4), Sum(1)),
    cmd(Sum(4), Sum(-1)),
    cmd(Sum(1), Sum(0)),
    cmd(Sum(1), Sum(1)),
    cmd(Sum(1), Sum(-1)),
    cmd(Sum(0), Sum(0)),
    cmd(Sum(0), Sum(1)),
    cmd(Sum(0), Sum(-1)),
    cmd(Sum(-1), Sum(0)),
    cmd(Sum(-1), Sum(1)),
    cmd(Sum(-1), Sum(-1)),
    cmd(Sum(-4), Sum(0)),
    cmd(Sum(-4), Sum(1)),
    cmd(Sum(-4), Sum(-1)),
];

/// Linear amplitude and frequency of both bands of one motor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RumbleAmFm {
    pub low_band_amp: f32,
    pub low_band_freq: f32,
    pub high_band_amp: f32,
    pub high_band_freq: f32,
}

impl RumbleAmFm {
    /// The stronger of the two bands as a motor speed
    pub fn motor_speed(&self) -> u8 {
        let amp = self.low_band_amp.max(self.high_band_amp).clamp(0.0, 1.0);
        (amp * u8::MAX as f32).round() as u8
    }

    pub fn is_silent(&self) -> bool {
        self.low_band_amp == 0.0 && self.high_band_amp == 0.0
    }
}

/// Amplitude and frequency of one band in log2 steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub amp: i32,
    pub freq: i32,
}

impl Default for Band {
    fn default() -> Self {
        Self {
            amp: AMP_MIN,
            freq: 0,
        }
    }
}

impl Band {
    fn apply(&mut self, code: u32) {
        let command = COMMAND_TABLE[(code & 0x1f) as usize];
        self.amp = command.amp.apply(self.amp, AMP_MIN, AMP_MAX);
        self.freq = command.freq.apply(self.freq, FREQ_MIN, FREQ_MAX);
    }

    fn set_direct(&mut self, fm: u32, am: u32) {
        self.freq = FREQ_7BIT_TABLE[(fm & 0x7f) as usize];
        self.amp = AMP_7BIT_TABLE[(am & 0x7f) as usize];
    }

    fn amplitude(&self) -> f32 {
        if self.amp <= AMP_MIN {
            return 0.0;
        }
        exp2_steps(self.amp)
    }

    fn frequency(&self, center: f32) -> f32 {
        center * exp2_steps(self.freq)
    }
}

fn field(value: u32, offset: u32, bits: u32) -> u32 {
    (value >> offset) & ((1 << bits) - 1)
}

/// Running decoder state for one motor
#[derive(Debug, Clone, Default)]
pub struct RumbleDecoder {
    low: Band,
    high: Band,
    output: RumbleAmFm,
}

impl RumbleDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn low_band(&self) -> Band {
        self.low
    }

    pub fn high_band(&self) -> Band {
        self.high
    }

    /// Decode one 32-bit word and return the resulting output. A word that
    /// carries no samples re-emits the previous output.
    pub fn decode(&mut self, sample: u32) -> RumbleAmFm {
        let samples = match sample >> 30 {
            0 => 0,
            1 => self.decode_single(sample),
            2 => self.decode_dual(sample),
            _ => self.decode_triple(sample),
        };
        if samples > 0 {
            self.output = RumbleAmFm {
                low_band_amp: self.low.amplitude(),
                low_band_freq: self.low.frequency(LOW_BAND_CENTER_HZ),
                high_band_amp: self.high.amplitude(),
                high_band_freq: self.high.frequency(HIGH_BAND_CENTER_HZ),
            };
        }
        self.output
    }

    pub fn decode_bytes(&mut self, sample: [u8; 4]) -> RumbleAmFm {
        self.decode(u32::from_le_bytes(sample))
    }

    /// Set the high band from the 7-bit codes at bits 2-15
    fn set_high(&mut self, v: u32) {
        self.high.set_direct(field(v, 2, 7), field(v, 9, 7));
    }

    /// Set the low band from the 7-bit codes at bits 16-29
    fn set_low(&mut self, v: u32) {
        self.low.set_direct(field(v, 16, 7), field(v, 23, 7));
    }

    /// Apply a pair of 5-bit commands, high band first
    fn apply_pair(&mut self, v: u32, offset: u32) {
        self.high.apply(field(v, offset, 5));
        self.low.apply(field(v, offset + 5, 5));
    }

    fn decode_single(&mut self, v: u32) -> usize {
        match field(v, 0, 2) {
            0 => {
                self.set_high(v);
                self.set_low(v);
            }
            1 => {
                self.set_high(v);
                self.low.apply(field(v, 16, 5));
            }
            2 => {
                self.high.apply(field(v, 2, 5));
                self.set_low(v);
            }
            _ => self.apply_pair(v, 2),
        }
        1
    }

    fn decode_dual(&mut self, v: u32) -> usize {
        match field(v, 0, 2) {
            0 => {
                self.apply_pair(v, 2);
                self.apply_pair(v, 12);
            }
            1 => {
                self.set_high(v);
                self.apply_pair(v, 16);
            }
            2 => {
                self.apply_pair(v, 2);
                self.set_low(v);
            }
            _ => {
                log::trace!("Ignoring reserved rumble format: {v:#010x}");
                return 0;
            }
        }
        2
    }

    fn decode_triple(&mut self, v: u32) -> usize {
        for i in 0..3 {
            self.apply_pair(v, i * 10);
        }
        3
    }
}

/// Output of both motors for one output report
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vibration {
    pub left: RumbleAmFm,
    pub right: RumbleAmFm,
}

impl Vibration {
    /// Left and right motor speeds
    pub fn motor_speeds(&self) -> (u8, u8) {
        (self.left.motor_speed(), self.right.motor_speed())
    }
}

/// Decoders for both motors of the emulated controller
#[derive(Debug, Clone, Default)]
pub struct RumbleState {
    pub left: RumbleDecoder,
    pub right: RumbleDecoder,
}

impl RumbleState {
    /// Decode the left and right motor words of an output report
    pub fn decode(&mut self, left: u32, right: u32) -> Vibration {
        Vibration {
            left: self.left.decode(left),
            right: self.right.decode(right),
        }
    }
}

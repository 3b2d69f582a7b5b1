//! Motion data block of the 0x30 input report.
//!
//! The console selects the encoding with the enable IMU subcommand. In the
//! standard encoding the block holds three raw accelerometer/gyroscope
//! samples. In the quaternion encoding it holds an orientation integrated
//! from the gyroscope, followed by the latest accelerometer sample.
use std::time::Instant;

use packed_struct::prelude::*;

use super::hid_report::{ImuData, MOTION_DATA_SIZE};

/// Gyroscope sensitivity in degrees per second per digit at 2000dps
pub const GYRO_DPS_PER_DIGIT: f32 = 4000.0 / 65535.0;

/// Fixed point scale of the packed quaternion components
const QUATERNION_SCALE: f32 = (1u32 << 29) as f32;
const QUATERNION_COMPONENT_BITS: usize = 30;

/// Quaternion block mode value
const QUATERNION_MODE: u64 = 2;

/// Sample period used when no previous sample exists
const DEFAULT_ELAPSED_SECS: f32 = 0.015;

/// Encoder for the motion block
#[derive(Debug, Clone, Default)]
pub enum MotionEncoder {
    /// Motion disabled; the block is all zeros
    #[default]
    Null,
    /// Three raw accelerometer and gyroscope samples
    Standard,
    /// Integrated orientation
    Quaternion(QuaternionEncoder),
}

impl MotionEncoder {
    /// Build an encoder for the argument of the enable IMU subcommand
    pub fn from_imu_mode(mode: u8) -> Option<Self> {
        match mode {
            0 => Some(Self::Null),
            1 => Some(Self::Standard),
            2 | 3 => Some(Self::Quaternion(QuaternionEncoder::new())),
            _ => None,
        }
    }

    pub fn pack(&mut self, accel: [i16; 3], gyro: [i16; 3]) -> [u8; MOTION_DATA_SIZE] {
        match self {
            Self::Null => [0; MOTION_DATA_SIZE],
            Self::Standard => pack_standard(accel, gyro),
            Self::Quaternion(encoder) => encoder.pack(accel, gyro),
        }
    }
}

fn pack_standard(accel: [i16; 3], gyro: [i16; 3]) -> [u8; MOTION_DATA_SIZE] {
    let mut data = [0; MOTION_DATA_SIZE];
    let sample = ImuData::new(accel, gyro);
    let Ok(packed) = sample.pack() else {
        return data;
    };
    for chunk in data.chunks_exact_mut(packed.len()) {
        chunk.copy_from_slice(&packed);
    }
    data
}

/// Orientation integrator for the quaternion encoding
#[derive(Debug, Clone)]
pub struct QuaternionEncoder {
    /// Orientation as (w, x, y, z)
    orientation: [f32; 4],
    timestamp_ms: u32,
    sample_count: u8,
    last_sample: Option<Instant>,
}

impl Default for QuaternionEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuaternionEncoder {
    pub fn new() -> Self {
        Self {
            orientation: [1.0, 0.0, 0.0, 0.0],
            timestamp_ms: 0,
            sample_count: 0,
            last_sample: None,
        }
    }

    pub fn orientation(&self) -> [f32; 4] {
        self.orientation
    }

    /// Integrate the gyroscope sample over the time elapsed since the last
    /// call and pack the result.
    pub fn pack(&mut self, accel: [i16; 3], gyro: [i16; 3]) -> [u8; MOTION_DATA_SIZE] {
        let now = Instant::now();
        let elapsed = match self.last_sample {
            Some(last) => now.duration_since(last).as_secs_f32(),
            None => DEFAULT_ELAPSED_SECS,
        };
        self.last_sample = Some(now);
        self.pack_with_elapsed(accel, gyro, elapsed)
    }

    /// Integrate the gyroscope sample over `elapsed` seconds and pack the
    /// result.
    pub fn pack_with_elapsed(
        &mut self,
        accel: [i16; 3],
        gyro: [i16; 3],
        elapsed: f32,
    ) -> [u8; MOTION_DATA_SIZE] {
        let rate = gyro.map(|v| (v as f32 * GYRO_DPS_PER_DIGIT).to_radians());
        self.integrate(rate, elapsed);

        self.timestamp_ms = self
            .timestamp_ms
            .wrapping_add((elapsed * 1000.0).round() as u32);
        self.sample_count = self.sample_count.wrapping_add(1);

        let (max_index, components) = compress(self.orientation);
        let mut data = QuaternionMotionData::default();
        data.set_mode(QUATERNION_MODE as u8);
        data.set_max_index(max_index as u8);
        for (i, value) in components.iter().enumerate() {
            data.set_component(i, *value);
        }
        data.set_timestamp_start((self.timestamp_ms & 0x7ff) as u16);
        data.set_timestamp_count(self.sample_count & 0x3f);
        data.set_accel(accel);
        data.into_bytes()
    }

    /// First order integration: q += 0.5 * dt * (q * (0, w))
    fn integrate(&mut self, rate: [f32; 3], elapsed: f32) {
        let [w, x, y, z] = self.orientation;
        let [a, b, c] = rate;
        let derivative = [
            -x * a - y * b - z * c,
            w * a + y * c - z * b,
            w * b + z * a - x * c,
            w * c + x * b - y * a,
        ];
        for (q, d) in self.orientation.iter_mut().zip(derivative) {
            *q += 0.5 * elapsed * d;
        }

        let norm = self.orientation.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for q in self.orientation.iter_mut() {
                *q /= norm;
            }
        } else {
            self.orientation = [1.0, 0.0, 0.0, 0.0];
        }
    }
}

/// Drop the largest component and return its index with the remaining
/// three as fixed point values. The quaternion is negated when needed so
/// that the dropped component is positive.
fn compress(orientation: [f32; 4]) -> (usize, [i32; 3]) {
    let mut max_index = 0;
    for i in 1..4 {
        if orientation[i].abs() > orientation[max_index].abs() {
            max_index = i;
        }
    }
    let sign = if orientation[max_index] < 0.0 { -1.0 } else { 1.0 };

    let min = -(1i32 << (QUATERNION_COMPONENT_BITS - 1));
    let max = (1i32 << (QUATERNION_COMPONENT_BITS - 1)) - 1;
    let mut components = [0; 3];
    let others = (0..4).filter(|i| *i != max_index);
    for (out, i) in components.iter_mut().zip(others) {
        let value = (orientation[i] * sign * QUATERNION_SCALE).round() as i64;
        *out = value.clamp(min as i64, max as i64) as i32;
    }
    (max_index, components)
}

/// Rebuild the full orientation from a packed block
pub fn decompress(data: &QuaternionMotionData) -> [f32; 4] {
    let max_index = data.max_index() as usize;
    let mut orientation = [0.0; 4];
    let mut sum = 0.0;
    let others = (0..4).filter(|i| *i != max_index);
    for (c, i) in others.enumerate() {
        let value = data.component(c) as f32 / QUATERNION_SCALE;
        orientation[i] = value;
        sum += value * value;
    }
    orientation[max_index] = (1.0 - sum).max(0.0).sqrt();
    orientation
}

// Bit offsets within the quaternion block. Bits are counted from the least
// significant bit of byte 0.
const MODE_BIT: usize = 0;
const MAX_INDEX_BIT: usize = 2;
const COMPONENTS_BIT: usize = 4;
const DELTAS_FIRST_BIT: usize = 94;
const DELTAS_MID_BIT: usize = 142;
const DELTA_BITS: usize = 16;
const TIMESTAMP_START_BIT: usize = 190;
const TIMESTAMP_COUNT_BIT: usize = 201;
const ACCEL_OFFSET: usize = 30;

/// Bit-packed quaternion motion block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuaternionMotionData {
    data: [u8; MOTION_DATA_SIZE],
}

impl Default for QuaternionMotionData {
    fn default() -> Self {
        Self {
            data: [0; MOTION_DATA_SIZE],
        }
    }
}

impl QuaternionMotionData {
    pub fn from_bytes(data: [u8; MOTION_DATA_SIZE]) -> Self {
        Self { data }
    }

    pub fn into_bytes(self) -> [u8; MOTION_DATA_SIZE] {
        self.data
    }

    fn get_bits(&self, offset: usize, len: usize) -> u64 {
        let mut value = 0;
        for i in 0..len {
            let bit = offset + i;
            if self.data[bit / 8] & (1 << (bit % 8)) != 0 {
                value |= 1 << i;
            }
        }
        value
    }

    fn set_bits(&mut self, offset: usize, len: usize, value: u64) {
        for i in 0..len {
            let bit = offset + i;
            let mask = 1 << (bit % 8);
            if value & (1 << i) != 0 {
                self.data[bit / 8] |= mask;
            } else {
                self.data[bit / 8] &= !mask;
            }
        }
    }

    pub fn mode(&self) -> u8 {
        self.get_bits(MODE_BIT, 2) as u8
    }

    pub fn set_mode(&mut self, mode: u8) {
        self.set_bits(MODE_BIT, 2, mode as u64);
    }

    /// Index of the component left out of the block
    pub fn max_index(&self) -> u8 {
        self.get_bits(MAX_INDEX_BIT, 2) as u8
    }

    pub fn set_max_index(&mut self, index: u8) {
        self.set_bits(MAX_INDEX_BIT, 2, index as u64);
    }

    /// Signed 30-bit component `index` (0-2)
    pub fn component(&self, index: usize) -> i32 {
        let offset = COMPONENTS_BIT + index * QUATERNION_COMPONENT_BITS;
        let raw = self.get_bits(offset, QUATERNION_COMPONENT_BITS) as i32;
        let shift = 32 - QUATERNION_COMPONENT_BITS;
        (raw << shift) >> shift
    }

    pub fn set_component(&mut self, index: usize, value: i32) {
        let offset = COMPONENTS_BIT + index * QUATERNION_COMPONENT_BITS;
        let mask = (1u64 << QUATERNION_COMPONENT_BITS) - 1;
        self.set_bits(offset, QUATERNION_COMPONENT_BITS, value as u64 & mask);
    }

    pub fn delta_first(&self, axis: usize) -> i16 {
        self.get_bits(DELTAS_FIRST_BIT + axis * DELTA_BITS, DELTA_BITS) as u16 as i16
    }

    pub fn delta_mid(&self, axis: usize) -> i16 {
        self.get_bits(DELTAS_MID_BIT + axis * DELTA_BITS, DELTA_BITS) as u16 as i16
    }

    /// Millisecond timestamp of the first sample, 11 bits
    pub fn timestamp_start(&self) -> u16 {
        self.get_bits(TIMESTAMP_START_BIT, 11) as u16
    }

    pub fn set_timestamp_start(&mut self, timestamp: u16) {
        self.set_bits(TIMESTAMP_START_BIT, 11, timestamp as u64);
    }

    /// Sample counter, 6 bits
    pub fn timestamp_count(&self) -> u8 {
        self.get_bits(TIMESTAMP_COUNT_BIT, 6) as u8
    }

    pub fn set_timestamp_count(&mut self, count: u8) {
        self.set_bits(TIMESTAMP_COUNT_BIT, 6, count as u64);
    }

    pub fn accel(&self) -> [i16; 3] {
        let mut accel = [0; 3];
        for (i, value) in accel.iter_mut().enumerate() {
            let offset = ACCEL_OFFSET + i * 2;
            *value = i16::from_le_bytes([self.data[offset], self.data[offset + 1]]);
        }
        accel
    }

    pub fn set_accel(&mut self, accel: [i16; 3]) {
        for (i, value) in accel.iter().enumerate() {
            let offset = ACCEL_OFFSET + i * 2;
            self.data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        }
    }
}

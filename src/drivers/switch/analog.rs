//! Pro Controller analog stick encoding.
//!
//! Each stick is two 12-bit axes packed little-endian into three bytes:
//! `[x[7:0], y[3:0] << 4 | x[11:8], y[11:4]]`.

/// Smallest axis value
pub const STICK_MIN: u16 = 0x000;
/// Resting axis value
pub const STICK_CENTER: u16 = 0x800;
/// Largest axis value
pub const STICK_MAX: u16 = 0xfff;
/// Distance from the center to either end of an axis
pub const STICK_RANGE: i32 = 0x7ff;

/// A packed two-axis analog stick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalogStick {
    data: [u8; 3],
}

impl Default for AnalogStick {
    fn default() -> Self {
        Self::centered()
    }
}

impl AnalogStick {
    pub fn new(x: u16, y: u16) -> Self {
        let mut stick = Self { data: [0; 3] };
        stick.set(x, y);
        stick
    }

    /// Returns a stick resting at the center position
    pub fn centered() -> Self {
        Self::new(STICK_CENTER, STICK_CENTER)
    }

    pub fn from_bytes(data: [u8; 3]) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> [u8; 3] {
        self.data
    }

    pub fn x(&self) -> u16 {
        self.data[0] as u16 | ((self.data[1] as u16 & 0x0f) << 8)
    }

    pub fn y(&self) -> u16 {
        (self.data[1] as u16 >> 4) | ((self.data[2] as u16) << 4)
    }

    pub fn set(&mut self, x: u16, y: u16) {
        let x = x & STICK_MAX;
        let y = y & STICK_MAX;
        self.data[0] = (x & 0xff) as u8;
        self.data[1] = ((x >> 8) as u8) | (((y & 0x0f) as u8) << 4);
        self.data[2] = (y >> 4) as u8;
    }

    pub fn set_x(&mut self, x: u16) {
        let y = self.y();
        self.set(x, y);
    }

    pub fn set_y(&mut self, y: u16) {
        let x = self.x();
        self.set(x, y);
    }

    /// Mirror the X axis around the center
    pub fn invert_x(&mut self) {
        self.set_x(invert(self.x()));
    }

    /// Mirror the Y axis around the center
    pub fn invert_y(&mut self) {
        self.set_y(invert(self.y()));
    }
}

/// Scale a signed, zero-centered sample of the given bit width to a target
/// axis value. The positive end of the source range maps exactly to
/// [STICK_MAX]; the extra negative step of two's complement clamps to
/// [STICK_MIN].
pub fn scale_signed(value: i32, bits: u32) -> u16 {
    let half = (1i32 << (bits - 1)) - 1;
    let value = STICK_CENTER as i32 + value * STICK_RANGE / half;
    value.clamp(STICK_MIN as i32, STICK_MAX as i32) as u16
}

/// Scale an unsigned sample of the given bit width whose resting position
/// is the middle of the range.
pub fn scale_unsigned(value: u32, bits: u32) -> u16 {
    let center = 1i32 << (bits - 1);
    scale_signed(value as i32 - center, bits)
}

/// Scale an unsigned sample using an explicit resting position and range,
/// for sources that do not center at half scale.
pub fn scale_unsigned_with_center(value: u32, center: u32, range: u32) -> u16 {
    let offset = value as i32 - center as i32;
    let value = STICK_CENTER as i32 + offset * STICK_RANGE / range.max(1) as i32;
    value.clamp(STICK_MIN as i32, STICK_MAX as i32) as u16
}

/// Negate a signed 8-bit sample using two's complement (`!raw + 1`). The
/// result is widened first so `i8::MIN` negates to 128.
pub fn negate_i8(raw: i8) -> i32 {
    !(raw as i32) + 1
}

/// Mirror a target axis value around the center
pub fn invert(value: u16) -> u16 {
    STICK_MAX - (value & STICK_MAX)
}

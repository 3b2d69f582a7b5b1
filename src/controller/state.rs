//! Device independent controller state.
//!
//! Decoders write into this structure and the emulator reads from it. The
//! layout follows the emulated controller so no further translation is
//! needed when building input reports.
use crate::{
    config::ControllerProfile,
    drivers::switch::{
        analog::AnalogStick,
        hid_report::{BatteryLevel, ButtonStatus},
    },
};

/// Accelerometer and gyroscope sample in emulated controller units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionSample {
    pub accel: [i16; 3],
    pub gyro: [i16; 3],
}

/// Direction pad expressed as a hat switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hat {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    #[default]
    Released,
}

impl Hat {
    /// Hat switch where 0 is up, values increase clockwise and anything
    /// above 7 is released
    pub fn from_clockwise(value: u8) -> Self {
        match value {
            0 => Self::Up,
            1 => Self::UpRight,
            2 => Self::Right,
            3 => Self::DownRight,
            4 => Self::Down,
            5 => Self::DownLeft,
            6 => Self::Left,
            7 => Self::UpLeft,
            _ => Self::Released,
        }
    }

    /// Returns the (up, right, down, left) buttons this direction presses
    pub fn as_buttons(&self) -> (bool, bool, bool, bool) {
        match self {
            Self::Up => (true, false, false, false),
            Self::UpRight => (true, true, false, false),
            Self::Right => (false, true, false, false),
            Self::DownRight => (false, true, true, false),
            Self::Down => (false, false, true, false),
            Self::DownLeft => (false, false, true, true),
            Self::Left => (false, false, false, true),
            Self::UpLeft => (true, false, false, true),
            Self::Released => (false, false, false, false),
        }
    }
}

/// Canonical state of one controller
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    pub buttons: ButtonStatus,
    pub left_stick: AnalogStick,
    pub right_stick: AnalogStick,
    pub battery: BatteryLevel,
    pub charging: bool,
    pub motion: Option<MotionSample>,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the four d-pad buttons from a hat switch value
    pub fn set_hat(&mut self, hat: Hat) {
        let (up, right, down, left) = hat.as_buttons();
        self.buttons.up = up;
        self.buttons.right = right;
        self.buttons.down = down;
        self.buttons.left = left;
    }

    /// Returns a copy of this state with the profile's stick inversion and
    /// d-pad swap applied
    pub fn with_profile(&self, profile: &ControllerProfile) -> Self {
        let mut state = *self;
        if profile.invert_lstick_xaxis {
            state.left_stick.invert_x();
        }
        if profile.invert_lstick_yaxis {
            state.left_stick.invert_y();
        }
        if profile.invert_rstick_xaxis {
            state.right_stick.invert_x();
        }
        if profile.invert_rstick_yaxis {
            state.right_stick.invert_y();
        }
        if profile.swap_dpad_lstick {
            state.swap_dpad_lstick();
        }
        if !profile.enable_motion {
            state.motion = None;
        }
        state
    }

    /// Drive the left stick from the d-pad and the d-pad from the left stick
    fn swap_dpad_lstick(&mut self) {
        use crate::drivers::switch::analog::{STICK_CENTER, STICK_MAX, STICK_MIN};

        // Stick deflection beyond this distance from the center presses the
        // matching direction
        const THRESHOLD: u16 = 0x400;

        let stick = self.left_stick;
        let buttons = self.buttons;

        let x = match (buttons.left, buttons.right) {
            (true, false) => STICK_MIN,
            (false, true) => STICK_MAX,
            _ => STICK_CENTER,
        };
        let y = match (buttons.down, buttons.up) {
            (true, false) => STICK_MIN,
            (false, true) => STICK_MAX,
            _ => STICK_CENTER,
        };
        self.left_stick = AnalogStick::new(x, y);

        self.buttons.left = stick.x() < STICK_CENTER - THRESHOLD;
        self.buttons.right = stick.x() > STICK_CENTER + THRESHOLD;
        self.buttons.down = stick.y() < STICK_CENTER - THRESHOLD;
        self.buttons.up = stick.y() > STICK_CENTER + THRESHOLD;
    }
}

use packed_struct::prelude::*;

use crate::{
    bluetooth::{DeviceWriter, HidReport},
    controller::state::{ControllerState, Hat, MotionSample},
    drivers::switch::{analog::scale_unsigned, hid_report::BatteryLevel},
};

use super::{
    hid_report::{
        pack_output_report, BasicInputReport, BluetoothOutputReport, FullInputData, InputState,
        FULL_REPORT_DATA_OFFSET,
    },
    INPUT_REPORT_BASIC, INPUT_REPORT_BT,
};

/// Lightbar colour for each player number. Unknown players use the first.
pub const PLAYER_COLOURS: [[u8; 3]; 4] = [
    [0x00, 0x00, 0x40], // Blue
    [0x40, 0x00, 0x00], // Red
    [0x00, 0x40, 0x00], // Green
    [0x20, 0x00, 0x20], // Pink
];

/// Returns the player number (starting at 0) lit in a Pro Controller
/// player LED bitmask. The lowest lit LED wins.
pub fn player_number(leds: u8) -> usize {
    match leds & 0x0f {
        0 => 0,
        lit => lit.trailing_zeros() as usize,
    }
}

/// Convert a Sony motion sample into emulated controller axes. Sony
/// accelerometers report 8192 counts per G, twice the emulated resolution.
/// Gyroscope units are close enough to be passed through.
pub fn motion_sample(accel: [i16; 3], gyro: [i16; 3]) -> MotionSample {
    let remap = |v: [i16; 3]| [v[2].saturating_neg(), v[0].saturating_neg(), v[1]];
    let accel = remap(accel).map(|v| v / 2);
    MotionSample {
        accel,
        gyro: remap(gyro),
    }
}

/// Apply the sticks and buttons shared by every Sony input report
pub fn apply_input_state(input: &InputState, state: &mut ControllerState) {
    state.left_stick.set(
        scale_unsigned(input.joystick_l_x as u32, 8),
        scale_unsigned((u8::MAX - input.joystick_l_y) as u32, 8),
    );
    state.right_stick.set(
        scale_unsigned(input.joystick_r_x as u32, 8),
        scale_unsigned((u8::MAX - input.joystick_r_y) as u32, 8),
    );

    let buttons = &mut state.buttons;
    buttons.a = input.circle;
    buttons.b = input.cross;
    buttons.x = input.triangle;
    buttons.y = input.square;
    buttons.l = input.l1;
    buttons.r = input.r1;
    buttons.zl = input.l2;
    buttons.zr = input.r2;
    buttons.minus = input.share;
    buttons.plus = input.options;
    buttons.l_stick = input.l3;
    buttons.r_stick = input.r3;
    buttons.home = input.ps;
    buttons.capture = input.touchpad;
    state.set_hat(Hat::from_clockwise(input.dpad.into()));
}

/// DualShock4 decoder
#[derive(Debug)]
pub struct Driver {
    writer: DeviceWriter,
    colour: [u8; 3],
    motors: (u8, u8),
}

impl Driver {
    pub fn new(writer: DeviceWriter) -> Self {
        Self {
            writer,
            colour: PLAYER_COLOURS[0],
            motors: (0, 0),
        }
    }

    /// Update the controller state from the given input report
    pub fn update(&mut self, report: &HidReport, state: &mut ControllerState) {
        match report.id() {
            INPUT_REPORT_BASIC => self.handle_basic_report(report, state),
            INPUT_REPORT_BT => self.handle_full_report(report, state),
            _ => log::trace!("Ignoring DualShock4 report: {report:?}"),
        }
    }

    fn handle_basic_report(&self, report: &HidReport, state: &mut ControllerState) {
        let size = BasicInputReport::packed_bytes_size(None).unwrap_or_default();
        let Some(input) = report
            .as_bytes()
            .get(..size)
            .and_then(|data| BasicInputReport::unpack_from_slice(data).ok())
        else {
            log::debug!("Invalid DualShock4 basic report: {report:?}");
            return;
        };
        apply_input_state(&input.state, state);
    }

    fn handle_full_report(&self, report: &HidReport, state: &mut ControllerState) {
        let size = FullInputData::packed_bytes_size(None).unwrap_or_default();
        let start = FULL_REPORT_DATA_OFFSET;
        let Some(input) = report
            .as_bytes()
            .get(start..start + size)
            .and_then(|data| FullInputData::unpack_from_slice(data).ok())
        else {
            log::debug!("Invalid DualShock4 full report: {report:?}");
            return;
        };
        apply_input_state(&input.state, state);

        state.battery = BatteryLevel::from_percent(input.battery_percent());
        state.charging = input.is_charging();
        state.motion = Some(motion_sample(
            [
                input.accel_x.to_primitive(),
                input.accel_y.to_primitive(),
                input.accel_z.to_primitive(),
            ],
            [
                input.gyro_x.to_primitive(),
                input.gyro_y.to_primitive(),
                input.gyro_z.to_primitive(),
            ],
        ));
    }

    /// Light the lightbar in the colour of the lowest lit player LED
    pub fn set_player_leds(&mut self, leds: u8) {
        let player = player_number(leds);
        self.colour = PLAYER_COLOURS[player % PLAYER_COLOURS.len()];
        log::debug!("Setting lightbar colour to: {:?}", self.colour);
        self.write_output();
    }

    /// Set the speed of the strong (left) and weak (right) motors
    pub fn rumble(&mut self, left: u8, right: u8) {
        self.motors = (left, right);
        self.write_output();
    }

    /// Write the lightbar colour once the controller connects
    pub fn initialize(&mut self) {
        self.write_output();
    }

    fn write_output(&self) {
        let report = BluetoothOutputReport {
            motor_left: self.motors.0,
            motor_right: self.motors.1,
            led_red: self.colour[0],
            led_green: self.colour[1],
            led_blue: self.colour[2],
            ..Default::default()
        };
        match pack_output_report(&report) {
            Ok(buf) => self.writer.write_bytes(&buf),
            Err(e) => log::warn!("Failed to pack DualShock4 output report: {e:?}"),
        }
    }
}

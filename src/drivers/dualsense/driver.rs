use packed_struct::prelude::*;

use crate::{
    bluetooth::{DeviceWriter, HidReport},
    controller::state::{ControllerState, Hat},
    drivers::{
        dualshock4::{
            driver::{apply_input_state, motion_sample, player_number, PLAYER_COLOURS},
            hid_report::BasicInputReport,
        },
        switch::{analog::scale_unsigned, hid_report::BatteryLevel},
    },
};

use super::{
    hid_report::{BluetoothPackedOutputReport, InputState, SetStatePackedOutputData, PLAYER_LIGHTS},
    INPUT_REPORT_BT, INPUT_REPORT_SIMPLE, INPUT_STATE_OFFSET,
};

/// PS5 DualSense decoder
#[derive(Debug)]
pub struct Driver {
    writer: DeviceWriter,
    /// Sequence number of the next output report
    seq_number: u8,
    player: usize,
    motors: (u8, u8),
}

impl Driver {
    pub fn new(writer: DeviceWriter) -> Self {
        Self {
            writer,
            seq_number: 0,
            player: 0,
            motors: (0, 0),
        }
    }

    /// Update the controller state from the given input report
    pub fn update(&mut self, report: &HidReport, state: &mut ControllerState) {
        match report.id() {
            INPUT_REPORT_SIMPLE => self.handle_simple_report(report, state),
            INPUT_REPORT_BT => self.handle_full_report(report, state),
            _ => log::trace!("Ignoring DualSense report: {report:?}"),
        }
    }

    /// The simple report shares its layout with the DualShock4 basic report
    fn handle_simple_report(&self, report: &HidReport, state: &mut ControllerState) {
        let size = BasicInputReport::packed_bytes_size(None).unwrap_or_default();
        let Some(input) = report
            .as_bytes()
            .get(..size)
            .and_then(|data| BasicInputReport::unpack_from_slice(data).ok())
        else {
            log::debug!("Invalid DualSense simple report: {report:?}");
            return;
        };
        apply_input_state(&input.state, state);
    }

    fn handle_full_report(&self, report: &HidReport, state: &mut ControllerState) {
        let size = InputState::packed_bytes_size(None).unwrap_or_default();
        let start = INPUT_STATE_OFFSET;
        let Some(input) = report
            .as_bytes()
            .get(start..start + size)
            .and_then(|data| InputState::unpack_from_slice(data).ok())
        else {
            log::debug!("Invalid DualSense full report: {report:?}");
            return;
        };

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
        buttons.minus = input.create;
        buttons.plus = input.options;
        buttons.l_stick = input.l3;
        buttons.r_stick = input.r3;
        buttons.home = input.ps;
        buttons.capture = input.touchpad || input.mute;
        state.set_hat(Hat::from_clockwise(input.dpad.into()));

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

    /// Show the player number on the player indicator and the lightbar
    pub fn set_player_leds(&mut self, leds: u8) {
        self.player = player_number(leds);
        log::debug!("Setting DualSense player to: {}", self.player + 1);
        self.write_output();
    }

    /// Set the speed of the strong (left) and weak (right) motors
    pub fn rumble(&mut self, left: u8, right: u8) {
        self.motors = (left, right);
        self.write_output();
    }

    pub fn initialize(&mut self) {
        self.write_output();
    }

    fn write_output(&mut self) {
        let colour = PLAYER_COLOURS[self.player % PLAYER_COLOURS.len()];
        let lights = PLAYER_LIGHTS[self.player % PLAYER_LIGHTS.len()];
        let state = SetStatePackedOutputData {
            enable_rumble_emulation: true,
            use_rumble_not_haptics: true,
            rumble_emulation_left: self.motors.0,
            rumble_emulation_right: self.motors.1,
            allow_led_color: true,
            led_red: colour[0],
            led_green: colour[1],
            led_blue: colour[2],
            allow_player_indicators: true,
            player_lights: Integer::from_primitive(lights),
            ..Default::default()
        };
        let report = BluetoothPackedOutputReport {
            seq_number: Integer::from_primitive(self.seq_number),
            state,
            ..Default::default()
        };
        self.seq_number = (self.seq_number + 1) & 0x0f;

        match report.pack_with_crc() {
            Ok(buf) => self.writer.write_bytes(&buf),
            Err(e) => log::warn!("Failed to pack DualSense output report: {e:?}"),
        }
    }
}

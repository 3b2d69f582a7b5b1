use packed_struct::prelude::*;

use crate::{
    bluetooth::{DeviceWriter, HidReport},
    controller::state::{ControllerState, Hat},
    drivers::switch::{analog::scale_unsigned, hid_report::BatteryLevel},
};

use super::{
    hid_report::{BatteryReport, InputDataReport, RumbleOutputReport},
    INPUT_REPORT_BATTERY, INPUT_REPORT_DATA, INPUT_REPORT_GUIDE, TRIGGER_THRESHOLD,
};

/// Xbox One decoder
#[derive(Debug)]
pub struct Driver {
    writer: DeviceWriter,
    /// Guide button state from the dedicated guide report used by older
    /// firmware
    guide: bool,
}

impl Driver {
    pub fn new(writer: DeviceWriter) -> Self {
        Self {
            writer,
            guide: false,
        }
    }

    /// Update the controller state from the given input report
    pub fn update(&mut self, report: &HidReport, state: &mut ControllerState) {
        match report.id() {
            INPUT_REPORT_DATA => self.handle_data_report(report, state),
            INPUT_REPORT_GUIDE => {
                self.guide = report.payload().first().is_some_and(|b| b & 0x01 != 0);
                state.buttons.home = self.guide;
            }
            INPUT_REPORT_BATTERY => self.handle_battery_report(report, state),
            _ => log::trace!("Ignoring Xbox One report: {report:?}"),
        }
    }

    fn handle_data_report(&self, report: &HidReport, state: &mut ControllerState) {
        let size = InputDataReport::packed_bytes_size(None).unwrap_or_default();
        let Some(input) = report
            .as_bytes()
            .get(..size)
            .and_then(|data| InputDataReport::unpack_from_slice(data).ok())
        else {
            log::debug!("Invalid Xbox One data report: {report:?}");
            return;
        };

        state.left_stick.set(
            scale_unsigned(input.l_stick_x as u32, 16),
            scale_unsigned((u16::MAX - input.l_stick_y) as u32, 16),
        );
        state.right_stick.set(
            scale_unsigned(input.r_stick_x as u32, 16),
            scale_unsigned((u16::MAX - input.r_stick_y) as u32, 16),
        );

        // Buttons are mapped by position
        let pressed = input.button_state;
        let buttons = &mut state.buttons;
        buttons.a = pressed.b;
        buttons.b = pressed.a;
        buttons.x = pressed.y;
        buttons.y = pressed.x;
        buttons.l = pressed.lb;
        buttons.r = pressed.rb;
        buttons.zl = input.trigger_l > TRIGGER_THRESHOLD;
        buttons.zr = input.trigger_r > TRIGGER_THRESHOLD;
        buttons.minus = pressed.view;
        buttons.plus = pressed.menu;
        buttons.l_stick = pressed.thumb_l;
        buttons.r_stick = pressed.thumb_r;
        buttons.home = pressed.guide || self.guide;
        buttons.capture = pressed.share;

        let hat = match input.dpad_state {
            0 => Hat::Released,
            value => Hat::from_clockwise(value - 1),
        };
        state.set_hat(hat);
    }

    fn handle_battery_report(&self, report: &HidReport, state: &mut ControllerState) {
        let Some(battery) = report
            .as_bytes()
            .get(..2)
            .and_then(|data| BatteryReport::unpack_from_slice(data).ok())
        else {
            log::debug!("Invalid Xbox One battery report: {report:?}");
            return;
        };
        let capacity: u8 = battery.capacity.into();
        state.battery = BatteryLevel::from_level(capacity + 1);
        state.charging = battery.charging;
    }

    /// Xbox One controllers have no player indicator
    pub fn set_player_leds(&mut self, leds: u8) {
        log::trace!("Ignoring player LEDs {leds:#04x} for {}", self.writer.address());
    }

    /// Set the speed of the strong (left) and weak (right) motors
    pub fn rumble(&mut self, left: u8, right: u8) {
        let report = RumbleOutputReport::new(left, right);
        match report.pack() {
            Ok(buf) => self.writer.write_bytes(&buf),
            Err(e) => log::warn!("Failed to pack Xbox One rumble report: {e:?}"),
        }
    }

    pub fn initialize(&mut self) {}
}

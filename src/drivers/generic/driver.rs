use packed_struct::prelude::*;

use crate::{
    bluetooth::{DeviceWriter, HidReport},
    config::GenericLayout,
    controller::state::{ControllerState, Hat},
    drivers::switch::analog::{negate_i8, scale_signed},
};

use super::{hid_report::InputDataReport, INPUT_REPORT_DATA, TRIGGER_THRESHOLD};

/// Decoder for generic DirectInput gamepads
#[derive(Debug)]
pub struct Driver {
    writer: DeviceWriter,
    layout: GenericLayout,
}

impl Driver {
    pub fn new(writer: DeviceWriter, layout: GenericLayout) -> Self {
        Self { writer, layout }
    }

    /// Update the controller state from the given input report
    pub fn update(&mut self, report: &HidReport, state: &mut ControllerState) {
        if report.id() != INPUT_REPORT_DATA {
            log::trace!("Ignoring generic gamepad report: {report:?}");
            return;
        }
        let size = InputDataReport::packed_bytes_size(None).unwrap_or_default();
        let Some(input) = report
            .as_bytes()
            .get(..size)
            .and_then(|data| InputDataReport::unpack_from_slice(data).ok())
        else {
            log::debug!("Invalid generic gamepad report: {report:?}");
            return;
        };

        // The Y axes grow downwards
        let axis = |value: u8| scale_signed(value as i8 as i32, 8);
        let inverted = |value: u8| scale_signed(negate_i8(value as i8), 8);
        state
            .left_stick
            .set(axis(input.l_stick_x), inverted(input.l_stick_y));
        state
            .right_stick
            .set(axis(input.r_stick_x), inverted(input.r_stick_y));

        let buttons = &mut state.buttons;
        match self.layout {
            GenericLayout::Positional => {
                buttons.a = input.b;
                buttons.b = input.a;
                buttons.x = input.y;
                buttons.y = input.x;
            }
            GenericLayout::Labelled => {
                buttons.a = input.a;
                buttons.b = input.b;
                buttons.x = input.x;
                buttons.y = input.y;
            }
        }
        buttons.l = input.l1;
        buttons.r = input.r1;
        buttons.zl = input.l2 || input.l2_trigger > TRIGGER_THRESHOLD;
        buttons.zr = input.r2 || input.r2_trigger > TRIGGER_THRESHOLD;
        buttons.minus = input.select;
        buttons.plus = input.start;
        buttons.home = input.home;
        buttons.l_stick = input.l3;
        buttons.r_stick = input.r3;
        state.set_hat(Hat::from_clockwise(input.hat));
    }

    /// Generic gamepads expose no player indicator
    pub fn set_player_leds(&mut self, leds: u8) {
        log::trace!("Ignoring player LEDs {leds:#04x} for {}", self.writer.address());
    }

    /// Rumble output differs between vendors and is not forwarded
    pub fn rumble(&mut self, left: u8, right: u8) {
        log::trace!(
            "Ignoring rumble ({left}, {right}) for {}",
            self.writer.address()
        );
    }

    pub fn initialize(&mut self) {}
}

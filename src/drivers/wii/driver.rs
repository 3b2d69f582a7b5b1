use packed_struct::prelude::*;

use crate::{
    bluetooth::{DeviceWriter, HidReport},
    controller::state::ControllerState,
    drivers::switch::{
        analog::AnalogStick,
        hid_report::{BatteryLevel, ButtonStatus},
    },
};

use super::{
    extension::{ExtensionInput, ExtensionState},
    hid_report::{
        extension_offset, CoreButtons, ReadMemoryReply, ReadMemoryRequest, StatusReport,
        WriteMemoryRequest, RUMBLE_FLAG,
    },
    BATTERY_MAX, EXTENSION_ID_ADDRESS, EXTENSION_ID_SIZE, EXTENSION_INIT1_ADDRESS,
    EXTENSION_INIT1_VALUE, EXTENSION_INIT2_ADDRESS, EXTENSION_INIT2_VALUE, INPUT_REPORT_ACK,
    INPUT_REPORT_CORE, INPUT_REPORT_CORE_ACCEL_IR10_EXT6, INPUT_REPORT_CORE_EXT8,
    INPUT_REPORT_EXT21, INPUT_REPORT_READ_DATA, INPUT_REPORT_STATUS, OUTPUT_REPORT_LEDS,
    OUTPUT_REPORT_MODE, OUTPUT_REPORT_STATUS_REQUEST,
};

/// Wii Remote decoder, including attached extension controllers
#[derive(Debug)]
pub struct Driver {
    writer: DeviceWriter,
    extension: ExtensionState,
    core: CoreButtons,
    extension_input: ExtensionInput,
    /// Player LEDs in the low nibble
    leds: u8,
    rumble: bool,
}

impl Driver {
    pub fn new(writer: DeviceWriter) -> Self {
        Self {
            writer,
            extension: ExtensionState::default(),
            core: CoreButtons::default(),
            extension_input: ExtensionInput::default(),
            leds: 0x01,
            rumble: false,
        }
    }

    pub fn extension(&self) -> ExtensionState {
        self.extension
    }

    /// Update the controller state from the given input report
    pub fn update(&mut self, report: &HidReport, state: &mut ControllerState) {
        let data = report.as_bytes();
        match report.id() {
            INPUT_REPORT_STATUS => self.handle_status_report(report, state),
            INPUT_REPORT_READ_DATA => self.handle_read_reply(report),
            INPUT_REPORT_ACK => self.update_core_buttons(data),
            INPUT_REPORT_CORE..=INPUT_REPORT_CORE_ACCEL_IR10_EXT6 => {
                self.update_core_buttons(data);
                self.update_extension(report.id(), data);
            }
            INPUT_REPORT_EXT21 => self.update_extension(report.id(), data),
            _ => {
                log::trace!("Ignoring Wii Remote report: {report:?}");
                return;
            }
        }
        self.apply(state);
    }

    fn update_core_buttons(&mut self, data: &[u8]) {
        let Some(buttons) = data
            .get(1..3)
            .and_then(|buf| CoreButtons::unpack_from_slice(buf).ok())
        else {
            log::debug!("Wii Remote report too short for buttons: {data:02x?}");
            return;
        };
        self.core = buttons;
    }

    fn update_extension(&mut self, report_id: u8, data: &[u8]) {
        if !self.extension.has_input() {
            return;
        }
        let Some(offset) = extension_offset(report_id) else {
            return;
        };
        let Some(input) = data
            .get(offset..)
            .and_then(|buf| self.extension.decode(buf))
        else {
            log::debug!("Invalid {:?} data: {data:02x?}", self.extension);
            return;
        };
        self.extension_input = input;
    }

    fn handle_status_report(&mut self, report: &HidReport, state: &mut ControllerState) {
        let size = StatusReport::packed_bytes_size(None).unwrap_or_default();
        let Some(status) = report
            .as_bytes()
            .get(..size)
            .and_then(|data| StatusReport::unpack_from_slice(data).ok())
        else {
            log::debug!("Invalid Wii Remote status report: {report:?}");
            return;
        };
        self.core = status.buttons;

        let percent = (status.battery as u32 * 100 / BATTERY_MAX as u32).min(100) as u8;
        state.battery = BatteryLevel::from_percent(percent);
        state.charging = false;

        match (status.extension_connected, self.extension) {
            (true, ExtensionState::NoExtension) => self.initialize_extension(),
            (false, ExtensionState::NoExtension) => (),
            (false, extension) => {
                log::debug!("{extension:?} disconnected from {}", self.writer.address());
                self.extension = ExtensionState::NoExtension;
                self.extension_input = ExtensionInput::default();
            }
            (true, _) => (),
        }

        // The remote stops sending data reports after a status report until
        // the reporting mode is set again
        self.set_report_mode();
    }

    /// Initialise the extension without encryption and request its identity
    fn initialize_extension(&mut self) {
        log::debug!("Extension connected to {}", self.writer.address());
        self.extension = ExtensionState::AwaitingIdentity;
        for (address, value) in [
            (EXTENSION_INIT1_ADDRESS, EXTENSION_INIT1_VALUE),
            (EXTENSION_INIT2_ADDRESS, EXTENSION_INIT2_VALUE),
        ] {
            let request = WriteMemoryRequest::register_byte(address, value, self.rumble);
            self.write_packed(request.pack());
        }
        let request =
            ReadMemoryRequest::registers(EXTENSION_ID_ADDRESS, EXTENSION_ID_SIZE, self.rumble);
        self.write_packed(request.pack());
    }

    fn handle_read_reply(&mut self, report: &HidReport) {
        let size = ReadMemoryReply::packed_bytes_size(None).unwrap_or_default();
        let Some(reply) = report
            .as_bytes()
            .get(..size)
            .and_then(|data| ReadMemoryReply::unpack_from_slice(data).ok())
        else {
            log::debug!("Invalid Wii Remote read reply: {report:?}");
            return;
        };
        self.core = reply.buttons;

        let identity_address = (EXTENSION_ID_ADDRESS & 0xffff) as u16;
        if self.extension != ExtensionState::AwaitingIdentity || reply.address != identity_address
        {
            log::trace!("Ignoring read reply: {reply:?}");
            return;
        }
        self.extension = match u8::from(reply.error) {
            0 => ExtensionState::from_identity(reply.bytes()),
            error => {
                log::debug!("Extension identity read failed with error {error}");
                ExtensionState::Unsupported
            }
        };
        log::info!(
            "Identified {:?} on {}: {:02x?}",
            self.extension,
            self.writer.address(),
            reply.bytes()
        );
        self.set_report_mode();
    }

    /// Request core buttons, with extension bytes once an extension with
    /// input is identified
    fn set_report_mode(&self) {
        let mode = if self.extension.has_input() {
            INPUT_REPORT_CORE_EXT8
        } else {
            INPUT_REPORT_CORE
        };
        self.writer
            .write_bytes(&[OUTPUT_REPORT_MODE, self.rumble_flag(), mode]);
    }

    /// Write the decoded buttons and sticks into the controller state
    fn apply(&self, state: &mut ControllerState) {
        if self.extension.has_input() {
            let input = self.extension_input;
            state.buttons = merge_buttons(self.vertical_buttons(), input.buttons);
            state.left_stick = input.left_stick.unwrap_or_default();
            state.right_stick = input.right_stick.unwrap_or_default();
        } else {
            state.buttons = self.horizontal_buttons();
            state.left_stick = AnalogStick::centered();
            state.right_stick = AnalogStick::centered();
        }
    }

    /// Remote held sideways with the d-pad on the left
    fn horizontal_buttons(&self) -> ButtonStatus {
        let core = self.core;
        ButtonStatus {
            up: core.right,
            down: core.left,
            left: core.up,
            right: core.down,
            a: core.two,
            b: core.one,
            x: core.a,
            y: core.b,
            minus: core.minus,
            plus: core.plus,
            home: core.home,
            ..Default::default()
        }
    }

    /// Remote held upright next to an extension
    fn vertical_buttons(&self) -> ButtonStatus {
        let core = self.core;
        ButtonStatus {
            up: core.up,
            down: core.down,
            left: core.left,
            right: core.right,
            a: core.a,
            zr: core.b,
            x: core.one,
            y: core.two,
            minus: core.minus,
            plus: core.plus,
            home: core.home,
            ..Default::default()
        }
    }

    /// Light the player LEDs. The low nibble matches the Wii Remote's four
    /// LEDs.
    pub fn set_player_leds(&mut self, leds: u8) {
        self.leds = leds & 0x0f;
        self.write_leds();
    }

    /// The Wii Remote has a single motor which is switched on by either side
    pub fn rumble(&mut self, left: u8, right: u8) {
        let rumble = left > 0 || right > 0;
        if rumble == self.rumble {
            return;
        }
        self.rumble = rumble;
        self.write_leds();
    }

    /// Light the first player LED and request the status report that
    /// reveals any attached extension
    pub fn initialize(&mut self) {
        self.write_leds();
        self.writer
            .write_bytes(&[OUTPUT_REPORT_STATUS_REQUEST, self.rumble_flag()]);
    }

    fn write_leds(&self) {
        self.writer
            .write_bytes(&[OUTPUT_REPORT_LEDS, self.leds << 4 | self.rumble_flag()]);
    }

    fn rumble_flag(&self) -> u8 {
        if self.rumble {
            RUMBLE_FLAG
        } else {
            0
        }
    }

    fn write_packed<const N: usize>(&self, buf: Result<[u8; N], PackingError>) {
        match buf {
            Ok(buf) => self.writer.write_bytes(&buf),
            Err(e) => log::warn!("Failed to pack Wii Remote output report: {e:?}"),
        }
    }
}

/// Combine the buttons pressed on the remote and on its extension
fn merge_buttons(a: ButtonStatus, b: ButtonStatus) -> ButtonStatus {
    let (Ok(a_bytes), Ok(b_bytes)) = (a.pack(), b.pack()) else {
        return a;
    };
    let merged = [
        a_bytes[0] | b_bytes[0],
        a_bytes[1] | b_bytes[1],
        a_bytes[2] | b_bytes[2],
    ];
    ButtonStatus::unpack(&merged).unwrap_or(a)
}

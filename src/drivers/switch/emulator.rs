use std::time::Instant;

use packed_struct::prelude::*;

use crate::{
    bluetooth::{DeviceAddress, HidReport},
    config::ControllerProfile,
    controller::state::ControllerState,
};

use super::{
    hid_report::{
        BatteryConnection, InputReportHeader, ReportType, RumbleOutputData, Subcommand,
        INPUT_HEADER_SIZE, STANDARD_REPORT_SIZE, SUBCOMMAND_OFFSET, SUBCOMMAND_REPORT_SIZE,
    },
    motion::MotionEncoder,
    rumble::{RumbleState, Vibration},
    spi_flash::{VirtualSpiFlash, MAX_READ_SIZE},
};

// Hardware IDs of the emulated controller
pub const VID: u16 = 0x057e;
pub const PID: u16 = 0x2009;

/// Firmware version reported in the device info reply
const FIRMWARE_VERSION: [u8; 2] = [0x03, 0x48];
/// Pro Controller
const CONTROLLER_TYPE: u8 = 0x03;
/// Pro Controller, powered by its own battery
const CONNECTION_INFO: u8 = 0x00;

/// Input report mode used until the console selects one
const DEFAULT_REPORT_MODE: u8 = 0x30;

/// Offsets inside the 0x21 reply
const ACK_OFFSET: usize = INPUT_HEADER_SIZE;
const REPLY_SUBCOMMAND_OFFSET: usize = INPUT_HEADER_SIZE + 1;
const REPLY_DATA_OFFSET: usize = INPUT_HEADER_SIZE + 2;

/// Acknowledgement bytes. The high bit marks success, the rest hint at the
/// type of the data that follows.
const ACK: u8 = 0x80;
const ACK_DEVICE_INFO: u8 = 0x82;
const ACK_ELAPSED_TIME: u8 = 0x83;
const ACK_SPI_READ: u8 = 0x90;
const ACK_MCU_CONFIG: u8 = 0xa0;
const ACK_PLAYER_LIGHTS: u8 = 0xb0;
const ACK_VOLTAGE: u8 = 0xd0;

/// Regulated voltage in mV, little endian (1667mV)
const REGULATED_VOLTAGE: [u8; 2] = [0x83, 0x06];

/// MCU reply for the config subcommand: MCU state, firmware, mode
const MCU_CONFIG_REPLY: [u8; 8] = [0x01, 0x00, 0xff, 0x00, 0x03, 0x00, 0x05, 0x01];

/// Side effects of an output report written by the console
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutputReportOutcome {
    /// Subcommand reply to send back to the console
    pub reply: Option<HidReport>,
    /// Vibration to forward to the physical device
    pub rumble: Option<Vibration>,
    /// Player indicator LEDs to forward to the physical device
    pub player_leds: Option<u8>,
}

/// Emulates the subcommand protocol of a Pro Controller on behalf of a
/// bridged device
#[derive(Debug, Clone)]
pub struct SwitchEmulator {
    address: DeviceAddress,
    flash: VirtualSpiFlash,
    motion: MotionEncoder,
    rumble: RumbleState,
    enable_motion: bool,
    enable_rumble: bool,
    vibration_enabled: bool,
    report_mode: u8,
    player_leds: u8,
    home_led: [u8; 4],
    epoch: Instant,
    timer: u8,
}

impl SwitchEmulator {
    pub fn new(address: DeviceAddress, profile: &ControllerProfile) -> Self {
        Self {
            address,
            flash: VirtualSpiFlash::new(address, profile.colours.to_bytes()),
            motion: MotionEncoder::Null,
            rumble: RumbleState::default(),
            enable_motion: profile.enable_motion,
            enable_rumble: profile.enable_rumble,
            vibration_enabled: false,
            report_mode: DEFAULT_REPORT_MODE,
            player_leds: 0,
            home_led: [0; 4],
            epoch: Instant::now(),
            timer: 0,
        }
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn flash(&self) -> &VirtualSpiFlash {
        &self.flash
    }

    pub fn motion(&self) -> &MotionEncoder {
        &self.motion
    }

    pub fn report_mode(&self) -> u8 {
        self.report_mode
    }

    pub fn player_leds(&self) -> u8 {
        self.player_leds
    }

    pub fn vibration_enabled(&self) -> bool {
        self.vibration_enabled
    }

    /// Refresh the timer byte. The timer follows the clock and always moves
    /// forward between two reports.
    fn next_timer(&mut self) -> u8 {
        let timer = self.epoch.elapsed().as_millis() as u8;
        // A clock that has not moved, or that is behind a previously bumped
        // value, continues from the last timer instead
        let delta = timer.wrapping_sub(self.timer);
        self.timer = if delta == 0 || delta > i8::MAX as u8 {
            self.timer.wrapping_add(1)
        } else {
            timer
        };
        self.timer
    }

    /// Write the common report header into the start of `buf`
    fn write_header(&mut self, id: ReportType, state: &ControllerState, buf: &mut [u8]) {
        let header = InputReportHeader {
            id: id as u8,
            timer: self.next_timer(),
            info: BatteryConnection {
                battery_level: state.battery,
                charging: state.charging,
                conn_info: CONNECTION_INFO,
            },
            buttons: state.buttons,
            left_stick: state.left_stick.as_bytes(),
            right_stick: state.right_stick.as_bytes(),
            vibrator_report: 0,
        };
        if let Err(e) = header.pack_to_slice(&mut buf[..INPUT_HEADER_SIZE]) {
            log::warn!("Failed to pack input report header: {e:?}");
        }
    }

    /// Build the periodic full input report (0x30) for the given state. The
    /// full report is sent whatever mode the console selects; the selected
    /// mode is only kept for [SwitchEmulator::report_mode].
    pub fn input_report(&mut self, state: &ControllerState) -> HidReport {
        let mut report = HidReport::new(ReportType::StandardInputReport as u8);
        let buf = report.resize(STANDARD_REPORT_SIZE);
        self.write_header(ReportType::StandardInputReport, state, buf);

        let sample = match state.motion {
            Some(sample) if self.enable_motion => sample,
            _ => Default::default(),
        };
        let motion = self.motion.pack(sample.accel, sample.gyro);
        buf[INPUT_HEADER_SIZE..].copy_from_slice(&motion);

        report
    }

    /// Process an output report written by the console
    pub fn handle_output_report(
        &mut self,
        report: &HidReport,
        state: &ControllerState,
    ) -> OutputReportOutcome {
        let mut outcome = OutputReportOutcome::default();

        let report_type = match ReportType::try_from(report.id()) {
            Ok(ReportType::CommandOutputReport) => ReportType::CommandOutputReport,
            Ok(ReportType::RumbleOutputReport) => ReportType::RumbleOutputReport,
            _ => {
                log::trace!("Ignoring output report: {report:?}");
                return outcome;
            }
        };

        let data = report.as_bytes();
        let size = RumbleOutputData::packed_bytes_size(None).unwrap_or(SUBCOMMAND_OFFSET);
        let Some(rumble) = data
            .get(..size)
            .and_then(|slice| RumbleOutputData::unpack_from_slice(slice).ok())
        else {
            log::debug!("Output report too short: {report:?}");
            return outcome;
        };
        outcome.rumble = self.decode_rumble(&rumble);

        if report_type == ReportType::CommandOutputReport {
            let Some(&id) = data.get(SUBCOMMAND_OFFSET) else {
                log::debug!("Command output report without subcommand: {report:?}");
                return outcome;
            };
            let args = &data[SUBCOMMAND_OFFSET + 1..];
            outcome.reply = self.handle_subcommand(id, args, state, &mut outcome.player_leds);
        }

        outcome
    }

    fn decode_rumble(&mut self, data: &RumbleOutputData) -> Option<Vibration> {
        if !self.enable_rumble || !self.vibration_enabled {
            return None;
        }
        Some(self.rumble.decode(data.left_sample(), data.right_sample()))
    }

    /// Dispatch a subcommand and build its reply. Unknown subcommands get no
    /// reply.
    fn handle_subcommand(
        &mut self,
        id: u8,
        args: &[u8],
        state: &ControllerState,
        player_leds: &mut Option<u8>,
    ) -> Option<HidReport> {
        let subcommand = match Subcommand::try_from(id) {
            Ok(subcommand) => subcommand,
            Err(id) => {
                log::trace!("Dropping unknown subcommand {id:#04x}");
                return None;
            }
        };
        log::debug!("Got subcommand for {}: {subcommand:?}", self.address);
        let arg = |i: usize| args.get(i).copied().unwrap_or(0);

        let mut reply = HidReport::new(ReportType::CommandInputReport as u8);
        let buf = reply.resize(SUBCOMMAND_REPORT_SIZE);
        self.write_header(ReportType::CommandInputReport, state, buf);
        buf[REPLY_SUBCOMMAND_OFFSET] = id;
        let data = &mut buf[REPLY_DATA_OFFSET..];

        let ack = match subcommand {
            Subcommand::RequestDeviceInfo => {
                data[0..2].copy_from_slice(&FIRMWARE_VERSION);
                data[2] = CONTROLLER_TYPE;
                data[3] = 0x02;
                data[4..10].copy_from_slice(self.address.as_bytes());
                data[10] = 0x01;
                // Use colours from flash
                data[11] = 0x01;
                ACK_DEVICE_INFO
            }
            Subcommand::SetInputReportMode => {
                self.report_mode = arg(0);
                log::debug!("Input report mode set to {:#04x}", self.report_mode);
                ACK
            }
            Subcommand::TriggerButtonsElapsedTime => ACK_ELAPSED_TIME,
            Subcommand::SetShipmentLowPowerState
            | Subcommand::SetNfcIrMcuState
            | Subcommand::SetImuSensitivity => ACK,
            Subcommand::SpiFlashRead => {
                let address = u32::from_le_bytes([arg(0), arg(1), arg(2), arg(3)]);
                let size = (arg(4) as usize).min(MAX_READ_SIZE);
                data[0..4].copy_from_slice(&address.to_le_bytes());
                data[4] = size as u8;
                self.flash.read(address, &mut data[5..5 + size]);
                log::debug!("SPI read of {size} bytes at {address:#06x}");
                ACK_SPI_READ
            }
            Subcommand::SpiFlashWrite => {
                let address = u32::from_le_bytes([arg(0), arg(1), arg(2), arg(3)]);
                data[0] = self.flash.write(address, arg(4) as usize) as u8;
                ACK
            }
            Subcommand::SpiSectorErase => {
                let address = u32::from_le_bytes([arg(0), arg(1), arg(2), arg(3)]);
                data[0] = self.flash.erase(address) as u8;
                ACK
            }
            Subcommand::SetNfcIrMcuConfig => {
                data[..MCU_CONFIG_REPLY.len()].copy_from_slice(&MCU_CONFIG_REPLY);
                ACK_MCU_CONFIG
            }
            Subcommand::SetPlayerLights => {
                self.player_leds = arg(0);
                *player_leds = Some(self.player_leds);
                ACK
            }
            Subcommand::GetPlayerLights => {
                data[0] = self.player_leds;
                ACK_PLAYER_LIGHTS
            }
            Subcommand::SetHomeLight => {
                for (i, value) in self.home_led.iter_mut().enumerate() {
                    *value = arg(i);
                }
                ACK
            }
            Subcommand::EnableImu => {
                match MotionEncoder::from_imu_mode(arg(0)) {
                    Some(encoder) => self.motion = encoder,
                    None => log::debug!("Ignoring unknown IMU mode {:#04x}", arg(0)),
                }
                ACK
            }
            Subcommand::EnableVibration => {
                self.vibration_enabled = arg(0) != 0;
                ACK
            }
            Subcommand::GetRegulatedVoltage => {
                data[0..2].copy_from_slice(&REGULATED_VOLTAGE);
                ACK_VOLTAGE
            }
        };
        buf[ACK_OFFSET] = ack;

        Some(reply)
    }
}

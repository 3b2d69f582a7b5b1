use crate::{
    bluetooth::{DeviceAddress, DeviceWriter, HidReport},
    config::ControllerProfile,
    drivers::{
        switch::emulator::{OutputReportOutcome, SwitchEmulator},
        ControllerDriver, DeviceFamily,
    },
};

use super::state::ControllerState;

/// Translates traffic for a single physical controller. Input reports are
/// decoded into the canonical state and re-encoded as emulated controller
/// reports; output reports from the console are answered by the emulator and
/// their side effects forwarded to the physical device.
#[derive(Debug)]
pub struct ControllerHandler {
    address: DeviceAddress,
    driver: ControllerDriver,
    emulator: SwitchEmulator,
    profile: ControllerProfile,
    state: ControllerState,
    motors: (u8, u8),
}

impl ControllerHandler {
    pub fn new(family: DeviceFamily, writer: DeviceWriter, profile: ControllerProfile) -> Self {
        let address = writer.address();
        Self {
            address,
            driver: ControllerDriver::new(family, writer, &profile),
            emulator: SwitchEmulator::new(address, &profile),
            profile,
            state: ControllerState::default(),
            motors: (0, 0),
        }
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn family(&self) -> DeviceFamily {
        self.driver.family()
    }

    pub fn profile(&self) -> &ControllerProfile {
        &self.profile
    }

    /// Canonical state as last decoded, before the profile is applied
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn emulator(&self) -> &SwitchEmulator {
        &self.emulator
    }

    /// Send the initial output reports to the physical device
    pub fn initialize(&mut self) {
        log::debug!("Initializing {:?} controller {}", self.family(), self.address);
        self.driver.initialize();
    }

    /// Decode an input report from the physical device and return the
    /// emulated controller report for it
    pub fn handle_input_report(&mut self, report: &HidReport) -> HidReport {
        self.driver.update(report, &mut self.state);
        let state = self.state.with_profile(&self.profile);
        self.emulator.input_report(&state)
    }

    /// Process an output report written by the console. Returns the reply to
    /// send back, if any.
    pub fn handle_output_report(&mut self, report: &HidReport) -> Option<HidReport> {
        let state = self.state.with_profile(&self.profile);
        let OutputReportOutcome {
            reply,
            rumble,
            player_leds,
        } = self.emulator.handle_output_report(report, &state);

        if let Some(leds) = player_leds {
            log::debug!("Setting player LEDs of {} to {leds:#06b}", self.address);
            self.driver.set_player_leds(leds);
        }

        // Vibration arrives with every output report, only changes are sent
        if let Some(vibration) = rumble {
            let motors = vibration.motor_speeds();
            if motors != self.motors {
                log::trace!("Rumble for {}: {motors:?}", self.address);
                self.motors = motors;
                self.driver.rumble(motors.0, motors.1);
            }
        }

        reply
    }
}

use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use hidbridge::{
    bluetooth::{
        BluetoothHost, DeviceAddress, HardwareId, HidConnectionEvent, HidConnectionState,
        HidReport, HidReportEvent, HostError, ReportDirection,
    },
    config::{Config, ControllerProfile},
    drivers::switch::{analog::AnalogStick, emulator::SwitchEmulator},
    service::{DispatchMode, Service},
};

const ADDRESS: DeviceAddress = DeviceAddress([0x00, 0x1f, 0x20, 0x31, 0x42, 0x53]);

/// Keeps every report written to a device
#[derive(Default)]
struct Host {
    written: Mutex<Vec<HidReport>>,
}

impl BluetoothHost for Host {
    fn write_hid_report(
        &self,
        _address: DeviceAddress,
        report: &HidReport,
    ) -> Result<(), HostError> {
        self.written.lock().unwrap().push(*report);
        Ok(())
    }
}

fn spi_read(address: u16, size: u8) -> HidReport {
    let [lo, hi] = address.to_le_bytes();
    let buf = [0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0x10, lo, hi, 0x00, 0x00, size];
    HidReport::from_slice(&buf).unwrap()
}

#[tokio::test]
async fn test_dualshock4_circle_and_stick() -> Result<(), Box<dyn Error>> {
    let host = Arc::new(Host::default());
    let service = Service::new(Config::default(), host.clone())?;
    service.handle_connection_event(&HidConnectionEvent {
        address: ADDRESS,
        state: HidConnectionState::Connected {
            hardware_id: HardwareId::new(0x054c, 0x09cc),
            class_of_device: 0x002508,
        },
    });
    // The lightbar colour is written on connect
    assert_eq!(host.written.lock().unwrap().len(), 1);

    let report = [0x01, 0xff, 0x80, 0x80, 0x80, 0x48, 0x00, 0x00, 0x00, 0x00];
    service.handle_report_event(
        &HidReportEvent {
            address: ADDRESS,
            direction: ReportDirection::Input,
            report: HidReport::from_slice(&report)?,
        },
        DispatchMode::Normal,
    );

    let packet = service.buffer().read().unwrap();
    let data: Vec<u8> = packet.payload().collect();
    assert_eq!(data[0], 0x30);
    // A is the fourth bit of the right button byte
    assert_eq!(data[3] & 0x08, 0x08);
    let stick = AnalogStick::from_bytes([data[6], data[7], data[8]]);
    assert_eq!(stick.x(), 0xfff);
    assert!((stick.y() as i32 - 0x800).abs() < 0x20);
    Ok(())
}

#[tokio::test]
async fn test_virtual_flash_reads() -> Result<(), Box<dyn Error>> {
    let mut profile = ControllerProfile::default();
    profile.colours.body = [0x1e, 0xdc, 0x00];
    profile.colours.buttons = [0x0a, 0x0b, 0x0c];
    let mut emulator = SwitchEmulator::new(ADDRESS, &profile);
    let state = Default::default();

    let reply = emulator
        .handle_output_report(&spi_read(0x6050, 6), &state)
        .reply
        .unwrap();
    let data = reply.as_bytes();
    assert_eq!(data[13], 0x90);
    assert_eq!(&data[20..26], &[0x1e, 0xdc, 0x00, 0x0a, 0x0b, 0x0c]);

    let reply = emulator
        .handle_output_report(&spi_read(0x1000, 0x10), &state)
        .reply
        .unwrap();
    assert_eq!(&reply.as_bytes()[20..36], &[0xff; 0x10]);
    Ok(())
}

#[tokio::test]
async fn test_profile_files_load() -> Result<(), Box<dyn Error>> {
    let root = env!("CARGO_MANIFEST_DIR");
    let config = Config::from_yaml_file(format!("{root}/rootfs/etc/hidbridge/config.yaml"))?;
    assert!(config.buffer_size > 0);
    for name in ["default", "retro", "flight"] {
        let path = format!("{root}/rootfs/usr/share/hidbridge/profiles/{name}.yaml");
        ControllerProfile::from_yaml_file(path)?;
    }
    Ok(())
}

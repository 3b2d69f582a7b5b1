use std::error::Error;

use crate::{
    bluetooth::{
        testing::{RecordingHost, TEST_ADDRESS},
        HardwareId, HidReport,
    },
    config::{Config, ControllerProfile, GenericDeviceId, GenericLayout},
    controller::state::ControllerState,
    drivers::{ControllerDriver, DeviceFamily},
};

/// Class of device of a Bluetooth gamepad
const GAMEPAD_CLASS: u32 = 0x002508;
/// Class of device of a Bluetooth keyboard
const KEYBOARD_CLASS: u32 = 0x002540;

#[tokio::test]
async fn test_known_hardware_ids() -> Result<(), Box<dyn Error>> {
    let cases = [
        (0x054c, 0x05c4, DeviceFamily::DualShock4),
        (0x054c, 0x09cc, DeviceFamily::DualShock4),
        (0x054c, 0x0ce6, DeviceFamily::DualSense),
        (0x045e, 0x0b13, DeviceFamily::XboxOne),
        (0x057e, 0x0306, DeviceFamily::Wii),
        (0x057e, 0x0330, DeviceFamily::Wii),
    ];
    for (vid, pid, family) in cases {
        let id = HardwareId::new(vid, pid);
        assert_eq!(DeviceFamily::from_hardware_id(&id), Some(family), "{id}");
    }
    assert_eq!(
        DeviceFamily::from_hardware_id(&HardwareId::new(0x054c, 0x0268)),
        None
    );
    Ok(())
}

#[tokio::test]
async fn test_identify_generic() -> Result<(), Box<dyn Error>> {
    let config = Config {
        generic_devices: vec![GenericDeviceId {
            vendor_id: 0x2dc8,
            product_id: 0x6001,
        }],
        ..Default::default()
    };

    let listed = HardwareId::new(0x2dc8, 0x6001);
    assert_eq!(
        DeviceFamily::identify(&config, &listed, KEYBOARD_CLASS),
        Some(DeviceFamily::Generic)
    );

    let unlisted = HardwareId::new(0x1234, 0x5678);
    assert_eq!(
        DeviceFamily::identify(&config, &unlisted, GAMEPAD_CLASS),
        Some(DeviceFamily::Generic)
    );
    assert_eq!(DeviceFamily::identify(&config, &unlisted, KEYBOARD_CLASS), None);

    // A known device keeps its own decoder whatever its class
    let ds4 = HardwareId::new(0x054c, 0x05c4);
    assert_eq!(
        DeviceFamily::identify(&config, &ds4, GAMEPAD_CLASS),
        Some(DeviceFamily::DualShock4)
    );
    Ok(())
}

#[tokio::test]
async fn test_family_names() -> Result<(), Box<dyn Error>> {
    assert_eq!(DeviceFamily::from_name("DS4"), Some(DeviceFamily::DualShock4));
    assert_eq!(DeviceFamily::from_name("xbox_one"), Some(DeviceFamily::XboxOne));
    assert_eq!(DeviceFamily::from_name("joycon"), None);
    Ok(())
}

#[tokio::test]
async fn test_driver_dispatch() -> Result<(), Box<dyn Error>> {
    let host = RecordingHost::new();
    let profile = ControllerProfile {
        generic_layout: GenericLayout::Labelled,
        ..Default::default()
    };
    let mut driver =
        ControllerDriver::new(DeviceFamily::Generic, host.writer(TEST_ADDRESS), &profile);
    assert_eq!(driver.family(), DeviceFamily::Generic);

    let mut state = ControllerState::default();
    let report = HidReport::from_slice(&[0x01, 0x01, 0x00, 0x0f, 0, 0, 0, 0, 0, 0])?;
    driver.update(&report, &mut state);
    assert!(state.buttons.a);

    let mut driver =
        ControllerDriver::new(DeviceFamily::Wii, host.writer(TEST_ADDRESS), &profile);
    driver.set_player_leds(0x02);
    assert_eq!(host.take_bytes(), vec![vec![0x11, 0x20]]);
    Ok(())
}

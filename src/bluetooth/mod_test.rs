use std::error::Error;

use crate::bluetooth::{
    is_gamepad_class, DeviceAddress, HidReport, ReportError, HID_REPORT_MAX_SIZE,
};

#[tokio::test]
async fn test_address_round_trip() -> Result<(), Box<dyn Error>> {
    let address: DeviceAddress = "a0:5A:5e:01:02:FF".parse()?;
    assert_eq!(address.0, [0xa0, 0x5a, 0x5e, 0x01, 0x02, 0xff]);
    assert_eq!(address.to_string(), "A0:5A:5E:01:02:FF");

    assert!("a0:5a".parse::<DeviceAddress>().is_err());
    assert!("zz:5a:5e:01:02:ff".parse::<DeviceAddress>().is_err());
    Ok(())
}

#[tokio::test]
async fn test_report_bounds() -> Result<(), Box<dyn Error>> {
    assert_eq!(HidReport::from_slice(&[]), Err(ReportError::Empty));

    let too_large = vec![0u8; HID_REPORT_MAX_SIZE + 1];
    assert!(matches!(
        HidReport::from_slice(&too_large),
        Err(ReportError::TooLarge { .. })
    ));

    let report = HidReport::from_slice(&[0x30, 0x01, 0x02])?;
    assert_eq!(report.id(), 0x30);
    assert_eq!(report.payload(), &[0x01, 0x02]);
    assert_eq!(report.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_report_resize_zero_fills() -> Result<(), Box<dyn Error>> {
    let mut report = HidReport::from_slice(&[0x11, 0xaa, 0xbb])?;
    report.resize(1);
    let buf = report.resize(4);
    assert_eq!(buf, &[0x11, 0x00, 0x00, 0x00]);
    Ok(())
}

#[tokio::test]
async fn test_gamepad_class_of_device() -> Result<(), Box<dyn Error>> {
    // Peripheral / gamepad
    assert!(is_gamepad_class(0x002508));
    // Peripheral / joystick
    assert!(!is_gamepad_class(0x002504));
    // Audio headset
    assert!(!is_gamepad_class(0x240404));
    Ok(())
}

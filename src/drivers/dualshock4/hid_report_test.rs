use std::error::Error;

use packed_struct::{types::SizedInteger, PackedStruct, PackedStructSlice};

use crate::drivers::dualshock4::hid_report::{
    output_crc, pack_output_report, BasicInputReport, BluetoothOutputReport, FullInputData,
    OUTPUT_CRC_SEED,
};

#[tokio::test]
async fn test_basic_report_layout() -> Result<(), Box<dyn Error>> {
    let buf = [0x01, 0x10, 0x20, 0x30, 0x40, 0x46, 0x21, 0xfe, 0x7f, 0xff];
    let report = BasicInputReport::unpack_from_slice(&buf)?;
    let state = report.state;

    assert_eq!(report.report_id, 0x01);
    assert_eq!(state.joystick_l_x, 0x10);
    assert_eq!(state.joystick_r_y, 0x40);
    assert!(state.circle);
    assert!(!state.cross);
    assert_eq!(u8::from(state.dpad), 6);
    assert!(state.options);
    assert!(state.l1);
    assert!(!state.r3);
    assert_eq!(u8::from(state.counter), 0x3f);
    assert!(state.touchpad);
    assert!(!state.ps);
    assert_eq!(state.l2_trigger, 0x7f);
    assert_eq!(state.r2_trigger, 0xff);
    Ok(())
}

#[tokio::test]
async fn test_full_report_battery() -> Result<(), Box<dyn Error>> {
    let mut buf = [0; 30];
    buf[29] = 0x07;
    let data = FullInputData::unpack_from_slice(&buf)?;
    assert_eq!(data.battery_percent(), 75);
    assert!(!data.is_charging());

    buf[29] = 0x1b;
    let data = FullInputData::unpack_from_slice(&buf)?;
    assert_eq!(data.battery_percent(), 100);
    assert!(!data.is_charging());

    buf[29] = 0x13;
    let data = FullInputData::unpack_from_slice(&buf)?;
    assert_eq!(data.battery_percent(), 35);
    assert!(data.is_charging());
    Ok(())
}

#[tokio::test]
async fn test_full_report_motion() -> Result<(), Box<dyn Error>> {
    let mut buf = [0; 30];
    buf[12..14].copy_from_slice(&(-2i16).to_le_bytes());
    buf[22..24].copy_from_slice(&8192i16.to_le_bytes());
    let data = FullInputData::unpack_from_slice(&buf)?;
    assert_eq!(data.gyro_x.to_primitive(), -2);
    assert_eq!(data.accel_z.to_primitive(), 8192);
    Ok(())
}

#[tokio::test]
async fn test_output_report_crc() -> Result<(), Box<dyn Error>> {
    let report = BluetoothOutputReport {
        motor_left: 0xaa,
        motor_right: 0x55,
        led_blue: 0x40,
        ..Default::default()
    };
    let buf = pack_output_report(&report)?;
    assert_eq!(&buf[0..4], &[0x11, 0xc0, 0x00, 0x07]);
    assert_eq!(&buf[6..11], &[0x55, 0xaa, 0x00, 0x00, 0x40]);

    let crc = output_crc(OUTPUT_CRC_SEED, &buf[..74]);
    assert_eq!(&buf[74..78], &crc.to_le_bytes());

    // The CRC field is the only difference from a plain pack
    let plain = report.pack()?;
    assert_eq!(&plain[..74], &buf[..74]);
    Ok(())
}

#[tokio::test]
async fn test_crc_reference_value() -> Result<(), Box<dyn Error>> {
    // CRC-32/ISO-HDLC check value
    assert_eq!(output_crc(b'1', b"23456789"), 0xcbf4_3926);
    Ok(())
}

use std::error::Error;

use packed_struct::{PackedStruct, PackedStructSlice};

use crate::drivers::switch::hid_report::{
    BatteryConnection, BatteryLevel, ButtonStatus, ImuData, InputReportHeader, ReportType,
    RumbleOutputData, Subcommand,
};

#[tokio::test]
async fn test_battery_connection() -> Result<(), Box<dyn Error>> {
    let info = BatteryConnection {
        battery_level: BatteryLevel::Full,
        charging: true,
        conn_info: 0x0,
    };
    assert_eq!(info.pack()?, [0x90]);

    let info = BatteryConnection {
        battery_level: BatteryLevel::Low,
        charging: false,
        conn_info: 0x1,
    };
    assert_eq!(info.pack()?, [0x41]);

    assert_eq!(BatteryLevel::from_level(9), BatteryLevel::Full);
    assert_eq!(BatteryLevel::from_percent(40), BatteryLevel::Low);
    Ok(())
}

#[tokio::test]
async fn test_button_bits() -> Result<(), Box<dyn Error>> {
    let buttons = ButtonStatus {
        y: true,
        a: true,
        zr: true,
        minus: true,
        home: true,
        capture: true,
        down: true,
        left: true,
        zl: true,
        ..Default::default()
    };
    assert_eq!(buttons.pack()?, [0x89, 0x31, 0x89]);
    Ok(())
}

#[tokio::test]
async fn test_input_header_layout() -> Result<(), Box<dyn Error>> {
    let header = InputReportHeader {
        id: ReportType::StandardInputReport as u8,
        timer: 0x42,
        info: BatteryConnection {
            battery_level: BatteryLevel::Medium,
            charging: false,
            conn_info: 0,
        },
        buttons: ButtonStatus {
            b: true,
            r_stick: true,
            up: true,
            ..Default::default()
        },
        left_stick: [0x00, 0x08, 0x80],
        right_stick: [0xff, 0xff, 0xff],
        vibrator_report: 0x0c,
    };
    let mut buf = [0; 13];
    header.pack_to_slice(&mut buf)?;
    assert_eq!(
        buf,
        [0x30, 0x42, 0x60, 0x04, 0x04, 0x02, 0x00, 0x08, 0x80, 0xff, 0xff, 0xff, 0x0c]
    );
    assert_eq!(InputReportHeader::unpack_from_slice(&buf)?, header);
    Ok(())
}

#[tokio::test]
async fn test_rumble_output_data() -> Result<(), Box<dyn Error>> {
    let buf = [0x10, 0x05, 0x01, 0x02, 0x03, 0x44, 0xaa, 0xbb, 0xcc, 0x80];
    let data = RumbleOutputData::unpack_from_slice(&buf)?;
    assert_eq!(data.id, 0x10);
    assert_eq!(data.packet_counter, 0x05);
    assert_eq!(data.left_sample(), 0x4403_0201);
    assert_eq!(data.right_sample(), 0x80cc_bbaa);
    Ok(())
}

#[tokio::test]
async fn test_imu_data_layout() -> Result<(), Box<dyn Error>> {
    let data = ImuData::new([1, -1, 256], [0, 0x7fff, -256]);
    assert_eq!(
        data.pack()?,
        [0x01, 0x00, 0xff, 0xff, 0x00, 0x01, 0x00, 0x00, 0xff, 0x7f, 0x00, 0xff]
    );
    Ok(())
}

#[tokio::test]
async fn test_subcommand_ids() -> Result<(), Box<dyn Error>> {
    assert_eq!(Subcommand::try_from(0x10), Ok(Subcommand::SpiFlashRead));
    assert_eq!(Subcommand::try_from(0x48), Ok(Subcommand::EnableVibration));
    assert_eq!(Subcommand::try_from(0x99), Err(0x99));
    assert_eq!(ReportType::try_from(0x01), Ok(ReportType::CommandOutputReport));
    assert!(ReportType::try_from(0x3f).is_err());
    Ok(())
}

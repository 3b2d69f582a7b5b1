use std::error::Error;

use crate::{
    bluetooth::{
        testing::{RecordingHost, TEST_ADDRESS},
        ReportError,
    },
    cli::decode::{decode_reports, format_hex, parse_hex_report, HexError},
    controller::handler::ControllerHandler,
    drivers::DeviceFamily,
};

#[tokio::test]
async fn test_parse_hex_report() -> Result<(), Box<dyn Error>> {
    let report = parse_hex_report("01 80:80 8080 08")?;
    assert_eq!(report.as_bytes(), &[0x01, 0x80, 0x80, 0x80, 0x80, 0x08]);

    assert_eq!(
        parse_hex_report("01 8"),
        Err(HexError::OddLength("01 8".to_string()))
    );
    assert_eq!(
        parse_hex_report("01 zz"),
        Err(HexError::InvalidDigit("01 zz".to_string()))
    );
    assert_eq!(
        parse_hex_report("01 é0"),
        Err(HexError::InvalidDigit("01 é0".to_string()))
    );
    assert_eq!(parse_hex_report(""), Err(HexError::Report(ReportError::Empty)));
    Ok(())
}

#[tokio::test]
async fn test_format_hex() -> Result<(), Box<dyn Error>> {
    assert_eq!(format_hex(&[0x30, 0x0a, 0xff]), "30 0a ff");
    assert_eq!(format_hex(&[]), "");
    Ok(())
}

#[tokio::test]
async fn test_decode_reports() -> Result<(), Box<dyn Error>> {
    let host = RecordingHost::new();
    let writer = host.writer(TEST_ADDRESS);
    let mut handler = ControllerHandler::new(DeviceFamily::DualShock4, writer, Default::default());

    let reports = vec!["01 80 80 80 80 48 00 00 00 00".to_string()];
    let results = decode_reports(&mut handler, &reports, false)?;
    let report = results[0].unwrap();
    assert_eq!(report.id(), 0x30);
    assert_eq!(report.as_bytes()[3], 0x08);

    let reports = vec![
        "01 00 00 00 00 00 00 00 00 00 02".to_string(),
        "01 01 00 00 00 00 00 00 00 00 99".to_string(),
    ];
    let results = decode_reports(&mut handler, &reports, true)?;
    assert_eq!(results[0].unwrap().as_bytes()[13], 0x82);
    assert!(results[1].is_none());

    let reports = vec!["xx".to_string()];
    assert!(decode_reports(&mut handler, &reports, false).is_err());
    Ok(())
}

use std::{error::Error, sync::Arc};

use thiserror::Error;

use crate::{
    bluetooth::{BluetoothHost, DeviceAddress, DeviceWriter, HidReport, HostError, ReportError},
    config::ControllerProfile,
    controller::handler::ControllerHandler,
    drivers::DeviceFamily,
};

/// Possible errors parsing a report from the command line
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HexError {
    #[error("odd number of hex digits in `{0}`")]
    OddLength(String),
    #[error("invalid hex digit in `{0}`")]
    InvalidDigit(String),
    #[error("invalid report: {0}")]
    Report(#[from] ReportError),
}

/// Parse a report written as hex bytes. Whitespace and colons between the
/// bytes are ignored.
pub fn parse_hex_report(text: &str) -> Result<HidReport, HexError> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if !digits.is_ascii() {
        return Err(HexError::InvalidDigit(text.to_string()));
    }
    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength(text.to_string()));
    }
    let bytes = (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16))
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| HexError::InvalidDigit(text.to_string()))?;
    Ok(HidReport::from_slice(&bytes)?)
}

pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<String>>()
        .join(" ")
}

/// Prints what the decoder sends to the physical device
struct PrintingHost;

impl BluetoothHost for PrintingHost {
    fn write_hid_report(
        &self,
        address: DeviceAddress,
        report: &HidReport,
    ) -> Result<(), HostError> {
        println!("{address} <= {}", format_hex(report.as_bytes()));
        Ok(())
    }
}

/// Feed reports through the given handler and return the translated reports.
/// Output reports without a reply produce `None`.
pub fn decode_reports(
    handler: &mut ControllerHandler,
    reports: &[String],
    output: bool,
) -> Result<Vec<Option<HidReport>>, HexError> {
    let mut results = Vec::with_capacity(reports.len());
    for text in reports {
        let report = parse_hex_report(text)?;
        let result = if output {
            handler.handle_output_report(&report)
        } else {
            Some(handler.handle_input_report(&report))
        };
        results.push(result);
    }
    Ok(results)
}

pub fn handle_decode(
    family: DeviceFamily,
    profile: ControllerProfile,
    address: DeviceAddress,
    output: bool,
    reports: &[String],
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let writer = DeviceWriter::new(address, Arc::new(PrintingHost));
    let mut handler = ControllerHandler::new(family, writer, profile);
    handler.initialize();

    for result in decode_reports(&mut handler, reports, output)? {
        match result {
            Some(report) => println!("{address} => {}", format_hex(report.as_bytes())),
            None => println!("{address} => (no reply)"),
        }
    }

    Ok(())
}

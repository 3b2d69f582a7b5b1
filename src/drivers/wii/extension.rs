//! Wii Remote extension controllers
use packed_struct::prelude::*;

use crate::drivers::switch::{
    analog::{scale_unsigned, scale_unsigned_with_center, AnalogStick},
    hid_report::ButtonStatus,
};

use super::hid_report::{ClassicData, NunchukData};

/// Nunchuk stick resting position and usable travel
const NUNCHUK_STICK_CENTER: u32 = 0x80;
const NUNCHUK_STICK_RANGE: u32 = 0x64;

/// Extension detection progress of a Wii Remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionState {
    #[default]
    NoExtension,
    /// Extension initialised and its identity requested
    AwaitingIdentity,
    Nunchuk,
    ClassicController,
    /// Adapters reporting in the Classic Controller button layout
    WheelAdapter,
    Unsupported,
}

impl ExtensionState {
    /// Identify an extension from the 6 identity bytes at 0xa400fa
    pub fn from_identity(id: &[u8]) -> Self {
        match id {
            [0x00, 0x00, 0xa4, 0x20, 0x00, 0x00] => Self::Nunchuk,
            [_, 0x00, 0xa4, 0x20, 0x01, 0x01] => Self::ClassicController,
            [_, _, 0xa4, 0x20, 0x01, 0x03] => Self::WheelAdapter,
            _ => Self::Unsupported,
        }
    }

    /// Returns true if an identified extension contributes input
    pub fn has_input(&self) -> bool {
        matches!(
            self,
            Self::Nunchuk | Self::ClassicController | Self::WheelAdapter
        )
    }

    /// Decode extension bytes into buttons and sticks
    pub fn decode(&self, data: &[u8]) -> Option<ExtensionInput> {
        match self {
            Self::Nunchuk => decode_nunchuk(data),
            Self::ClassicController => decode_classic(data, true),
            Self::WheelAdapter => decode_classic(data, false),
            _ => None,
        }
    }
}

/// Input contributed by an extension controller
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtensionInput {
    pub buttons: ButtonStatus,
    pub left_stick: Option<AnalogStick>,
    pub right_stick: Option<AnalogStick>,
}

fn decode_nunchuk(data: &[u8]) -> Option<ExtensionInput> {
    let size = NunchukData::packed_bytes_size(None).ok()?;
    let nunchuk = NunchukData::unpack_from_slice(data.get(..size)?).ok()?;

    let buttons = ButtonStatus {
        l: !nunchuk.c_released,
        zl: !nunchuk.z_released,
        ..Default::default()
    };
    let stick = AnalogStick::new(
        scale_unsigned_with_center(
            nunchuk.stick_x as u32,
            NUNCHUK_STICK_CENTER,
            NUNCHUK_STICK_RANGE,
        ),
        scale_unsigned_with_center(
            nunchuk.stick_y as u32,
            NUNCHUK_STICK_CENTER,
            NUNCHUK_STICK_RANGE,
        ),
    );
    Some(ExtensionInput {
        buttons,
        left_stick: Some(stick),
        right_stick: None,
    })
}

fn decode_classic(data: &[u8], has_right_stick: bool) -> Option<ExtensionInput> {
    let size = ClassicData::packed_bytes_size(None).ok()?;
    let classic = ClassicData::unpack_from_slice(data.get(..size)?).ok()?;

    let buttons = ButtonStatus {
        a: !classic.a,
        b: !classic.b,
        x: !classic.x,
        y: !classic.y,
        l: !classic.l,
        r: !classic.r,
        zl: !classic.zl,
        zr: !classic.zr,
        minus: !classic.minus,
        plus: !classic.plus,
        home: !classic.home,
        up: !classic.dpad_up,
        down: !classic.dpad_down,
        left: !classic.dpad_left,
        right: !classic.dpad_right,
        ..Default::default()
    };
    let left_stick = AnalogStick::new(
        scale_unsigned(u8::from(classic.left_x) as u32, 6),
        scale_unsigned(u8::from(classic.left_y) as u32, 6),
    );
    let right_stick = has_right_stick.then(|| {
        AnalogStick::new(
            scale_unsigned(classic.right_x() as u32, 5),
            scale_unsigned(u8::from(classic.right_y) as u32, 5),
        )
    });
    Some(ExtensionInput {
        buttons,
        left_stick: Some(left_stick),
        right_stick,
    })
}

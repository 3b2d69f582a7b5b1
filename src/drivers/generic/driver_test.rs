use std::error::Error;

use crate::{
    bluetooth::{
        testing::{RecordingHost, TEST_ADDRESS},
        HidReport,
    },
    config::GenericLayout,
    controller::state::ControllerState,
    drivers::{
        generic::driver::Driver,
        switch::analog::{STICK_CENTER, STICK_MAX, STICK_MIN},
    },
};

fn report(buttons: [u8; 2], hat: u8, sticks: [u8; 4], triggers: [u8; 2]) -> HidReport {
    let mut buf = vec![0x01, buttons[0], buttons[1], hat];
    buf.extend_from_slice(&sticks);
    buf.extend_from_slice(&triggers);
    HidReport::from_slice(&buf).unwrap()
}

#[tokio::test]
async fn test_positional_layout() -> Result<(), Box<dyn Error>> {
    let host = RecordingHost::new();
    let mut driver = Driver::new(host.writer(TEST_ADDRESS), GenericLayout::Positional);
    let mut state = ControllerState::default();

    // First button (south) and fourth button (west)
    driver.update(&report([0x09, 0x00], 0x0f, [0; 4], [0; 2]), &mut state);
    assert!(state.buttons.b);
    assert!(state.buttons.y);
    assert!(!state.buttons.a);
    assert!(!state.buttons.x);

    // Second button (east) and fifth button (north)
    driver.update(&report([0x12, 0x00], 0x0f, [0; 4], [0; 2]), &mut state);
    assert!(state.buttons.a);
    assert!(state.buttons.x);
    assert!(!state.buttons.b);
    assert!(!state.buttons.y);
    Ok(())
}

#[tokio::test]
async fn test_labelled_layout() -> Result<(), Box<dyn Error>> {
    let host = RecordingHost::new();
    let mut driver = Driver::new(host.writer(TEST_ADDRESS), GenericLayout::Labelled);
    let mut state = ControllerState::default();

    driver.update(&report([0x09, 0x00], 0x0f, [0; 4], [0; 2]), &mut state);
    assert!(state.buttons.a);
    assert!(state.buttons.x);
    assert!(!state.buttons.b);
    assert!(!state.buttons.y);
    Ok(())
}

#[tokio::test]
async fn test_remaining_buttons() -> Result<(), Box<dyn Error>> {
    let host = RecordingHost::new();
    let mut driver = Driver::new(host.writer(TEST_ADDRESS), GenericLayout::default());
    let mut state = ControllerState::default();

    driver.update(&report([0xc0, 0x7f], 0x02, [0; 4], [0; 2]), &mut state);
    let buttons = state.buttons;
    assert!(buttons.l && buttons.r);
    assert!(buttons.zl && buttons.zr);
    assert!(buttons.minus && buttons.plus && buttons.home);
    assert!(buttons.l_stick && buttons.r_stick);
    assert!(buttons.right);
    assert!(!buttons.up && !buttons.down && !buttons.left);
    assert!(!buttons.capture);
    Ok(())
}

#[tokio::test]
async fn test_analog_triggers() -> Result<(), Box<dyn Error>> {
    let host = RecordingHost::new();
    let mut driver = Driver::new(host.writer(TEST_ADDRESS), GenericLayout::default());
    let mut state = ControllerState::default();

    driver.update(&report([0, 0], 0x08, [0; 4], [0x80, 0x10]), &mut state);
    assert!(state.buttons.zl);
    assert!(!state.buttons.zr);
    Ok(())
}

#[tokio::test]
async fn test_sticks() -> Result<(), Box<dyn Error>> {
    let host = RecordingHost::new();
    let mut driver = Driver::new(host.writer(TEST_ADDRESS), GenericLayout::default());
    let mut state = ControllerState::default();

    driver.update(&report([0, 0], 0x0f, [0; 4], [0; 2]), &mut state);
    assert_eq!(state.left_stick.x(), STICK_CENTER);
    assert_eq!(state.left_stick.y(), STICK_CENTER);

    // Left stick fully right and up, right stick fully left and down
    driver.update(&report([0, 0], 0x0f, [0x7f, 0x81, 0x81, 0x7f], [0; 2]), &mut state);
    assert_eq!(state.left_stick.x(), STICK_MAX);
    assert_eq!(state.left_stick.y(), STICK_MAX);
    assert_eq!(state.right_stick.x(), STICK_MIN + 1);
    assert_eq!(state.right_stick.y(), STICK_MIN + 1);
    Ok(())
}

#[tokio::test]
async fn test_y_axis_full_up() -> Result<(), Box<dyn Error>> {
    let host = RecordingHost::new();
    let mut driver = Driver::new(host.writer(TEST_ADDRESS), GenericLayout::default());
    let mut state = ControllerState::default();

    // Fully up on both sticks
    driver.update(&report([0, 0], 0x0f, [0, 0x80, 0, 0x80], [0; 2]), &mut state);
    assert_eq!(state.left_stick.y(), STICK_MAX);
    assert_eq!(state.right_stick.y(), STICK_MAX);

    // Fully down
    driver.update(&report([0, 0], 0x0f, [0, 0x7f, 0, 0x7f], [0; 2]), &mut state);
    assert_eq!(state.left_stick.y(), STICK_MIN + 1);
    Ok(())
}

#[tokio::test]
async fn test_invalid_reports_ignored() -> Result<(), Box<dyn Error>> {
    let host = RecordingHost::new();
    let mut driver = Driver::new(host.writer(TEST_ADDRESS), GenericLayout::default());
    let mut state = ControllerState::default();

    driver.update(&HidReport::from_slice(&[0x02, 0xff, 0xff])?, &mut state);
    driver.update(&HidReport::from_slice(&[0x01, 0xff, 0xff])?, &mut state);
    assert_eq!(state, ControllerState::default());
    Ok(())
}

#[tokio::test]
async fn test_no_output() -> Result<(), Box<dyn Error>> {
    let host = RecordingHost::new();
    let mut driver = Driver::new(host.writer(TEST_ADDRESS), GenericLayout::default());
    driver.initialize();
    driver.set_player_leds(0x01);
    driver.rumble(0xff, 0xff);
    assert!(host.take().is_empty());
    Ok(())
}

use std::error::Error;

use crate::{
    config::ControllerProfile,
    controller::state::{ControllerState, Hat, MotionSample},
    drivers::switch::analog::{AnalogStick, STICK_CENTER, STICK_MAX, STICK_MIN},
};

#[tokio::test]
async fn test_hat_diagonals() -> Result<(), Box<dyn Error>> {
    let mut state = ControllerState::default();
    state.set_hat(Hat::from_clockwise(3));
    assert!(state.buttons.down && state.buttons.right);
    assert!(!state.buttons.up && !state.buttons.left);

    state.set_hat(Hat::from_clockwise(7));
    assert!(state.buttons.up && state.buttons.left);
    assert!(!state.buttons.down && !state.buttons.right);

    for released in [8, 0x0f, 0xff] {
        state.set_hat(Hat::from_clockwise(released));
        assert_eq!(Hat::from_clockwise(released), Hat::Released);
        assert!(!state.buttons.up && !state.buttons.right);
        assert!(!state.buttons.down && !state.buttons.left);
    }
    Ok(())
}

#[tokio::test]
async fn test_profile_inverts_axes() -> Result<(), Box<dyn Error>> {
    let state = ControllerState {
        left_stick: AnalogStick::new(STICK_MAX, STICK_MIN),
        right_stick: AnalogStick::new(STICK_MIN, STICK_MAX),
        ..Default::default()
    };
    let profile = ControllerProfile {
        invert_lstick_xaxis: true,
        invert_rstick_yaxis: true,
        ..Default::default()
    };

    let result = state.with_profile(&profile);
    assert_eq!(result.left_stick.x(), STICK_MIN);
    assert_eq!(result.left_stick.y(), STICK_MIN);
    assert_eq!(result.right_stick.x(), STICK_MIN);
    assert_eq!(result.right_stick.y(), STICK_MIN);

    // The decoded state is left alone
    assert_eq!(state.left_stick.x(), STICK_MAX);
    Ok(())
}

#[tokio::test]
async fn test_profile_swaps_dpad_and_stick() -> Result<(), Box<dyn Error>> {
    let mut state = ControllerState {
        left_stick: AnalogStick::new(STICK_MIN, STICK_CENTER),
        ..Default::default()
    };
    state.set_hat(Hat::Up);
    let profile = ControllerProfile {
        swap_dpad_lstick: true,
        ..Default::default()
    };

    let result = state.with_profile(&profile);
    assert_eq!(result.left_stick.x(), STICK_CENTER);
    assert_eq!(result.left_stick.y(), STICK_MAX);
    assert!(result.buttons.left);
    assert!(!result.buttons.up && !result.buttons.right && !result.buttons.down);
    Ok(())
}

#[tokio::test]
async fn test_profile_drops_motion() -> Result<(), Box<dyn Error>> {
    let state = ControllerState {
        motion: Some(MotionSample {
            accel: [1, 2, 3],
            gyro: [4, 5, 6],
        }),
        ..Default::default()
    };
    let profile = ControllerProfile {
        enable_motion: false,
        ..Default::default()
    };
    assert!(state.with_profile(&profile).motion.is_none());
    assert!(state.with_profile(&Default::default()).motion.is_some());
    Ok(())
}

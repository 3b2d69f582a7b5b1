use std::error::Error;

use tokio::fs;

use crate::{
    bluetooth::{DeviceAddress, HardwareId},
    config::{Config, ControllerProfile, GenericLayout, LoadError},
};

const CONFIG_FILE: &str = "./rootfs/etc/hidbridge/config.yaml";
const PROFILE_DIR: &str = "./rootfs/usr/share/hidbridge/profiles";

/// Every shipped profile must load
#[tokio::test]
async fn check_shipped_profiles() -> Result<(), Box<dyn Error>> {
    let mut count = 0;
    let mut profile_dir = fs::read_dir(PROFILE_DIR).await?;
    while let Some(entry) = profile_dir.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        let path = path.to_string_lossy().to_string();
        if let Err(e) = ControllerProfile::from_yaml_file(path.clone()) {
            panic!("Failed to load profile {path}: {e}");
        }
        count += 1;
    }
    assert!(count > 0, "No profiles found in {PROFILE_DIR}");

    Ok(())
}

#[tokio::test]
async fn check_shipped_config() -> Result<(), Box<dyn Error>> {
    let config = Config::from_yaml_file(CONFIG_FILE.to_string())?;
    assert_eq!(config.default_profile, ControllerProfile::default());
    assert!(config.is_generic_device(&HardwareId::new(0x2dc8, 0x6101)));
    assert!(!config.is_generic_device(&HardwareId::new(0x2dc8, 0x6102)));
    Ok(())
}

#[tokio::test]
async fn test_profile_defaults() -> Result<(), Box<dyn Error>> {
    let profile = ControllerProfile::from_yaml("invert_rstick_yaxis: true".to_string())?;
    assert!(profile.invert_rstick_yaxis);
    assert!(profile.enable_rumble);
    assert!(profile.enable_motion);
    assert!(!profile.swap_dpad_lstick);
    assert_eq!(profile.generic_layout, GenericLayout::Positional);
    assert_eq!(
        profile.colours.to_bytes(),
        [0x32, 0x32, 0x32, 0xff, 0xff, 0xff, 0x32, 0x32, 0x32, 0x32, 0x32, 0x32]
    );
    Ok(())
}

#[tokio::test]
async fn test_per_device_override() -> Result<(), Box<dyn Error>> {
    let yaml = r#"
devices:
  - address: "11:22:33:44:55:66"
    profile:
      generic_layout: labelled
      enable_rumble: false
"#;
    let config = Config::from_yaml(yaml.to_string())?;
    let address: DeviceAddress = "11:22:33:44:55:66".parse()?;
    let other: DeviceAddress = "11:22:33:44:55:67".parse()?;

    let profile = config.profile_for(&address);
    assert_eq!(profile.generic_layout, GenericLayout::Labelled);
    assert!(!profile.enable_rumble);
    assert_eq!(config.profile_for(&other), ControllerProfile::default());
    Ok(())
}

#[tokio::test]
async fn test_invalid_config() -> Result<(), Box<dyn Error>> {
    let result = Config::from_yaml("buffer_size: 0".to_string());
    assert!(matches!(result, Err(LoadError::InvalidValue { .. })));

    let yaml = r#"
devices:
  - address: "not an address"
    profile: {}
"#;
    let result = Config::from_yaml(yaml.to_string());
    assert!(matches!(result, Err(LoadError::InvalidValue { .. })));

    let result = ControllerProfile::from_yaml("generic_layout: sideways".to_string());
    assert!(matches!(result, Err(LoadError::DeserializeError(_))));
    Ok(())
}

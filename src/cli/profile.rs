use std::error::Error;

use crate::config::ControllerProfile;

/// Load the profile at the given path and print it back
pub fn handle_profile(path: String) -> Result<(), Box<dyn Error + Send + Sync>> {
    let profile = ControllerProfile::from_yaml_file(path.clone())?;
    log::debug!("Loaded profile {path}");
    print!("{}", serde_yaml::to_string(&profile)?);
    Ok(())
}

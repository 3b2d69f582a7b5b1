pub mod decode;
#[cfg(test)]
pub mod decode_test;
pub mod profile;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::{bluetooth::DeviceAddress, config::ControllerProfile, drivers::DeviceFamily};

use decode::handle_decode;
use profile::handle_profile;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Translate raw reports the way a connected controller would be
    Decode {
        /// Device family decoding the reports (ds4, dualsense, xbox, wii, generic)
        #[arg(short, long, value_parser = parse_family)]
        family: DeviceFamily,
        /// Controller profile to apply
        #[arg(short, long)]
        profile: Option<String>,
        /// Address of the emulated controller
        #[arg(short, long, default_value = "00:00:00:00:00:00")]
        address: DeviceAddress,
        /// Treat the reports as written by the console instead of the device
        #[arg(long)]
        output: bool,
        /// Reports in hex, report id first (e.g. "01 80 80 80 80 08 00 00 00 00")
        #[arg(required = true)]
        reports: Vec<String>,
    },
    /// Check a controller profile and print it with every default filled in
    Profile {
        /// Path to the profile
        path: String,
    },
}

fn parse_family(name: &str) -> Result<DeviceFamily, String> {
    DeviceFamily::from_name(name).ok_or_else(|| format!("unknown device family `{name}`"))
}

pub fn main_cli(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.cmd {
        Commands::Decode {
            family,
            profile,
            address,
            output,
            reports,
        } => {
            let profile = match profile {
                Some(path) => ControllerProfile::from_yaml_file(path)?,
                None => ControllerProfile::default(),
            };
            handle_decode(family, profile, address, output, &reports)?;
        }
        Commands::Profile { path } => handle_profile(path)?,
    }

    Ok(())
}

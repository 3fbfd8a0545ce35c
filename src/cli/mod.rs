mod input;

use clap::Parser;
use std::path::PathBuf;

pub use input::{parse_command, CommandError};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI output devices
    #[arg(long)]
    pub list_devices: bool,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Starting tempo in beats per minute (clamped to 10..=200)
    #[arg(short, long)]
    pub bpm: Option<u32>,

    /// Octave chord roots are voiced in
    #[arg(long, allow_hyphen_values = true)]
    pub octave: Option<i8>,

    /// Progression file loaded at startup instead of the default progression
    #[arg(long)]
    pub import: Option<PathBuf>,

    /// Where `export` writes when no path is given
    #[arg(long)]
    pub export_path: Option<PathBuf>,

    /// Send notes to this MIDI output device instead of the log
    #[arg(long)]
    pub midi_output: Option<String>,

    /// Show the live state inspector
    #[arg(long)]
    pub inspector: bool,
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}

// config.rs

use crate::cli::Args;
use log::{debug, info};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const MIN_BPM: u32 = 10;
pub const MAX_BPM: u32 = 200;
pub const DEFAULT_BPM: u32 = 70;
pub const DEFAULT_OCTAVE: i8 = 4;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_TICK_MS: u64 = 10;
pub const DEFAULT_EXPORT_PATH: &str = "progression.json";
pub const DEFAULT_CONFIG_FILE: &str = "chordloops.toml";
pub const ENV_PREFIX: &str = "CHORDLOOPS";

pub const BEATS_PER_WHOLE: i64 = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Source(#[from] config::ConfigError),
    #[error("invalid value for `{key}`: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bpm: u32,
    pub octave: i8,
    pub debounce: Duration,
    pub tick_interval: Duration,
    pub export_path: PathBuf,
    pub import: Option<PathBuf>,
    pub midi_output_device: Option<String>, // Note output device, log sink when absent
    pub inspector: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bpm: DEFAULT_BPM,
            octave: DEFAULT_OCTAVE,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            import: None,
            midi_output_device: None,
            inspector: false,
            log_level: "debug".to_string(),
        }
    }
}

impl Config {
    /// Layers defaults, the optional config file, `CHORDLOOPS_*` environment
    /// variables and finally the command line.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let file = args
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        debug!("Reading optional config file: {}", file.display());

        let settings = config::Config::builder()
            .set_default("bpm", i64::from(DEFAULT_BPM))?
            .set_default("octave", i64::from(DEFAULT_OCTAVE))?
            .set_default("debounce_ms", DEFAULT_DEBOUNCE_MS as i64)?
            .set_default("tick_ms", DEFAULT_TICK_MS as i64)?
            .set_default("export_path", DEFAULT_EXPORT_PATH)?
            .set_default("inspector", false)?
            .set_default("log_level", "debug")?
            .add_source(config::File::from(file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .set_override_option("bpm", args.bpm.map(i64::from))?
            .set_override_option("octave", args.octave.map(i64::from))?
            .set_override_option(
                "import",
                args.import.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option(
                "export_path",
                args.export_path.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option("midi_output", args.midi_output.clone())?
            .set_override_option("inspector", args.inspector.then_some(true))?
            .build()?;

        Self::from_settings(&settings)
    }

    fn from_settings(settings: &config::Config) -> Result<Self, ConfigError> {
        // Out-of-range tempos are clamped later, only nonsense is rejected here
        let bpm = settings.get_int("bpm")?;
        let bpm = u32::try_from(bpm.max(0)).map_err(|_| ConfigError::Invalid {
            key: "bpm",
            value: bpm.to_string(),
        })?;

        let octave = settings.get_int("octave")?;
        let octave = i8::try_from(octave)
            .ok()
            .filter(|o| (-1..=9).contains(o))
            .ok_or(ConfigError::Invalid {
                key: "octave",
                value: octave.to_string(),
            })?;

        let debounce_ms = Self::millis(settings, "debounce_ms")?;
        let tick_ms = Self::millis(settings, "tick_ms")?.max(1);

        let import = settings.get_string("import").ok().map(PathBuf::from);
        let midi_output_device = settings.get_string("midi_output").ok();
        if let Some(device) = &midi_output_device {
            info!("Note output bound to MIDI device: {}", device);
        }

        let config = Config {
            bpm,
            octave,
            debounce: Duration::from_millis(debounce_ms),
            tick_interval: Duration::from_millis(tick_ms),
            export_path: PathBuf::from(settings.get_string("export_path")?),
            import,
            midi_output_device,
            inspector: settings.get_bool("inspector")?,
            log_level: settings.get_string("log_level")?,
        };
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn millis(settings: &config::Config, key: &'static str) -> Result<u64, ConfigError> {
        let value = settings.get_int(key)?;
        u64::try_from(value).map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let args = Args::parse_from(["chordloops", "--config", "/nonexistent/chordloops.toml"]);
        let config = Config::load(&args).unwrap();
        assert_eq!(config.bpm, DEFAULT_BPM);
        assert_eq!(config.octave, DEFAULT_OCTAVE);
        assert_eq!(config.debounce, Duration::from_millis(DEFAULT_DEBOUNCE_MS));
        assert_eq!(config.export_path, PathBuf::from(DEFAULT_EXPORT_PATH));
        assert!(config.import.is_none());
        assert!(!config.inspector);
    }

    #[test]
    fn test_file_then_command_line_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "bpm = 95\noctave = 3\ndebounce_ms = 50").unwrap();
        let path = file.path().display().to_string();

        let args = Args::parse_from(["chordloops", "--config", &path]);
        let config = Config::load(&args).unwrap();
        assert_eq!(config.bpm, 95);
        assert_eq!(config.octave, 3);
        assert_eq!(config.debounce, Duration::from_millis(50));

        let args = Args::parse_from(["chordloops", "--config", &path, "--bpm", "140"]);
        let config = Config::load(&args).unwrap();
        assert_eq!(config.bpm, 140);
        assert_eq!(config.octave, 3);
    }

    #[test]
    fn test_invalid_octave_rejected() {
        let args = Args::parse_from([
            "chordloops",
            "--config",
            "/nonexistent/chordloops.toml",
            "--octave",
            "12",
        ]);
        assert!(matches!(
            Config::load(&args),
            Err(ConfigError::Invalid { key: "octave", .. })
        ));
    }
}

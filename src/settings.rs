use anyhow::{ensure, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{DEFAULT_REFR_INDEX, EXIT_EXTENSION, VALIDATION_TOLERANCE};
use crate::ray::Ray;
use crate::sampler;
use crate::system::CloakConfiguration;


/// Entrance heights of the traced ray fan.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Heights {
    /// Explicit heights (mm).
    List(Vec<f64>),
    /// `num` evenly spaced heights from `start` to `stop` inclusive (mm).
    Range { start: f64, stop: f64, num: usize },
}

impl Heights {
    pub fn values(&self) -> Vec<f64> {
        match self {
            Heights::List(values) => values.clone(),
            Heights::Range { start, stop, num } => sampler::linspace(*start, *stop, *num),
        }
    }
}

/// Runtime configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    pub f1: f64,
    pub f2: f64,
    #[serde(default = "default_refr_index")]
    pub refractive_index: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    pub heights: Heights,
    pub angles: Vec<f64>,
    #[serde(default = "default_exit_extension")]
    pub exit_extension: f64,
    pub example_ray: Ray,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default)]
    pub plot: bool,
}

fn default_refr_index() -> f64 {
    DEFAULT_REFR_INDEX
}

fn default_tolerance() -> f64 {
    VALIDATION_TOLERANCE
}

fn default_exit_extension() -> f64 {
    EXIT_EXTENSION
}

fn default_directory() -> PathBuf {
    PathBuf::from("output")
}

impl Settings {
    /// The cloak described by the focal lengths.
    pub fn cloak_configuration(&self) -> crate::error::Result<CloakConfiguration> {
        CloakConfiguration::new(self.f1, self.f2)
    }
}

/// Loads `config/default.toml` only, ignoring local overrides, the
/// environment and the command line.
pub fn load_default_config() -> Result<Settings> {
    let cloak_dir = retrieve_project_root()?;
    let default_config_file = cloak_dir.join("config/default.toml");

    let settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    validate_settings(&config)?;

    Ok(config)
}

/// Loads the full configuration: `config/local.toml` if present, otherwise
/// `config/default.toml`, then `CLOAK_*` environment variables, then the
/// command line.
pub fn load_config() -> Result<Settings> {
    load_config_with(&CliArgs::parse())
}

pub fn load_config_with(args: &CliArgs) -> Result<Settings> {
    let cloak_dir = retrieve_project_root()?;

    let config_file = match &args.config {
        Some(path) => path.clone(),
        None => {
            let default_config_file = cloak_dir.join("config/default.toml");
            let local_config = cloak_dir.join("config/local.toml");
            if local_config.exists() {
                local_config
            } else {
                default_config_file
            }
        }
    };
    info!("Using configuration: {:?}", config_file);

    let settings = Config::builder()
        .add_source(File::from(config_file.as_path()).required(true))
        .add_source(Environment::with_prefix("cloak"))
        .build()
        .with_context(|| format!("Error loading configuration from {:?}", config_file))?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    apply_args(&mut config, args)?;

    validate_settings(&config)?;

    Ok(config)
}

/// Overrides settings with any values given on the command line.
fn apply_args(config: &mut Settings, args: &CliArgs) -> Result<()> {
    if let Some(f1) = args.f1 {
        config.f1 = f1;
    }
    if let Some(f2) = args.f2 {
        config.f2 = f2;
    }
    if let Some(ri) = args.ri {
        config.refractive_index = ri;
    }
    if let Some(tol) = args.tol {
        config.tolerance = tol;
    }
    if let Some(heights) = &args.heights {
        config.heights = Heights::List(heights.clone());
    } else if let Some(range) = &args.range {
        let num = range[2];
        ensure!(
            num >= 0.0 && num.fract() == 0.0,
            "Range count must be a whole number of heights, got {}",
            num
        );
        config.heights = Heights::Range {
            start: range[0],
            stop: range[1],
            num: num as usize,
        };
    }
    if let Some(angles) = &args.angles {
        config.angles = angles.clone();
    }
    if let Some(ext) = args.ext {
        config.exit_extension = ext;
    }
    if let Some(dir) = &args.dir {
        config.directory = dir.clone();
    }
    if args.plot {
        config.plot = true;
    }
    Ok(())
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the CLOAK_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // When running through cargo (e.g. cargo run, cargo test)
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("CLOAK_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    // Walk upward from the executable to the nearest directory holding "config"
    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    let mut current_dir: Option<&Path> = exe_path.parent();
    while let Some(dir) = current_dir {
        if dir.join("config").is_dir() {
            return Ok(dir.to_path_buf());
        }
        current_dir = dir.parent();
    }
    anyhow::bail!("Could not find project root directory (set CLOAK_ROOT_DIR)")
}

pub fn validate_settings(config: &Settings) -> Result<()> {
    config
        .cloak_configuration()
        .context("Focal lengths do not describe a valid cloak")?;
    ensure!(
        config.refractive_index > 0.0,
        "Refractive index must be greater than 0"
    );
    ensure!(config.tolerance > 0.0, "Tolerance must be greater than 0");
    ensure!(
        config.exit_extension >= 0.0,
        "Exit extension must not be negative"
    );
    ensure!(
        !config.heights.values().is_empty(),
        "At least one entrance height is required"
    );
    ensure!(
        !config.angles.is_empty(),
        "At least one entrance angle is required"
    );
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "Cloak - paraxial ray tracing through the Rochester Cloak")]
pub struct CliArgs {
    /// Focal length of the outer lenses in mm.
    #[arg(long, allow_negative_numbers = true)]
    f1: Option<f64>,

    /// Focal length of the inner lenses in mm. Must be smaller than f1.
    #[arg(long, allow_negative_numbers = true)]
    f2: Option<f64>,

    /// Refractive index of the surrounding medium.
    #[arg(long)]
    ri: Option<f64>,

    /// Tolerance for the cloak condition check.
    #[arg(long)]
    tol: Option<f64>,

    /// Entrance heights in mm, separated by spaces.
    #[arg(long, num_args = 1.., value_delimiter = ' ', allow_negative_numbers = true, group = "height")]
    heights: Option<Vec<f64>>,

    /// Evenly spaced entrance heights.
    /// Format: start stop num
    #[arg(long, num_args = 3, value_delimiter = ' ', allow_negative_numbers = true, group = "height")]
    range: Option<Vec<f64>>,

    /// Entrance angles in radians, separated by spaces.
    #[arg(long, num_args = 1.., value_delimiter = ' ', allow_negative_numbers = true)]
    angles: Option<Vec<f64>>,

    /// Free-space distance in mm traced past the last lens.
    #[arg(long)]
    ext: Option<f64>,

    /// Output directory.
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Render the ray fan to a PNG (requires the `plot` feature).
    #[arg(long)]
    plot: bool,

    /// Configuration file to use instead of config/default.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Focal Lengths: f1 = {} mm, f2 = {} mm
  - Refractive Index: {:.6}
  - Tolerance: {:.1e}
  - Heights: {:?}
  - Angles: {:?}
  - Exit Extension: {} mm
  - Output Directory: {:?}
  ",
            self.f1,
            self.f2,
            self.refractive_index,
            self.tolerance,
            self.heights.values(),
            self.angles,
            self.exit_extension,
            self.directory,
        )
    }
}

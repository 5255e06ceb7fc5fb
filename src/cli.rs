// cli.rs - Command-line interface configuration
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::ViewerConfig;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "xylo-viewer")]
#[command(about = "Xylo hero viewport: a slowly spinning model in a drifting particle cloud", long_about = None)]
pub struct Cli {
    /// JSON configuration file; unspecified fields keep their defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// glTF model to show instead of the configured one
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Number of particles in the background cloud
    #[arg(short, long)]
    pub particles: Option<usize>,

    /// Slowly orbit the camera while the user is not dragging
    #[arg(long = "auto-rotate", default_value = "false")]
    pub auto_rotate: bool,

    #[arg(long = "enable-zoom", default_value = "false")]
    pub enable_zoom: bool,

    #[arg(long = "enable-pan", default_value = "false")]
    pub enable_pan: bool,

    /// Disable the FPS overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

impl Cli {
    /// Merge the config file (if any) with command-line overrides
    pub fn resolve_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };

        if let Some(model) = &self.model {
            config.model.path = model.clone();
        }
        if let Some(count) = self.particles {
            config.particles.count = count;
        }
        config.orbit.auto_rotate |= self.auto_rotate;
        config.orbit.enable_zoom |= self.enable_zoom;
        config.orbit.enable_pan |= self.enable_pan;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let cli = Cli::try_parse_from(["xylo-viewer"]).unwrap();
        let config = cli.resolve_config().unwrap();

        assert_eq!(config, ViewerConfig::default());
        assert!(!cli.no_ui);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "xylo-viewer",
            "--model",
            "other.glb",
            "--particles",
            "12",
            "--auto-rotate",
            "--enable-zoom",
            "--no-ui",
        ])
        .unwrap();
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.model.path, PathBuf::from("other.glb"));
        assert_eq!(config.particles.count, 12);
        assert!(config.orbit.auto_rotate);
        assert!(config.orbit.enable_zoom);
        assert!(!config.orbit.enable_pan);
        assert!(cli.no_ui);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["xylo-viewer", "--config", "does/not/exist.json"]).unwrap();
        let err = cli.resolve_config().unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }

    #[test]
    fn rejects_negative_particle_count() {
        assert!(Cli::try_parse_from(["xylo-viewer", "--particles", "-3"]).is_err());
    }
}

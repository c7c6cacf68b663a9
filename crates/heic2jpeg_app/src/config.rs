use std::fs;
use std::path::Path;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use heic2jpeg_engine::{ArchiveSettings, ConvertSettings, EngineSettings};
use serde::Deserialize;

use crate::args::Cli;

/// Picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "heic2jpeg.ron";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub convert: ConvertSettings,
    pub archive: ArchiveSettings,
}

impl AppConfig {
    /// An explicitly named file must load; the implicit default file may be absent or broken.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => {
                let config = Self::read(path)
                    .with_context(|| format!("failed to load config {:?}", path))?;
                engine_info!("Loaded config from {:?}", path);
                Ok(config)
            }
            None => Ok(Self::load_implicit(Path::new(DEFAULT_CONFIG_FILE))),
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = ron::from_str(&content)?;
        Ok(config)
    }

    fn load_implicit(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Self::default();
            }
            Err(err) => {
                engine_warn!("Failed to read config from {:?}: {}", path, err);
                return Self::default();
            }
        };

        match ron::from_str(&content) {
            Ok(config) => {
                engine_info!("Loaded config from {:?}", path);
                config
            }
            Err(err) => {
                engine_warn!("Ignoring unparsable config {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    /// Command-line flags win over file values.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.output_dir {
            self.archive.output_dir = dir.clone();
        }
        if let Some(name) = &cli.archive_name {
            self.archive.archive_name = name.clone();
        }
        if let Some(quality) = cli.quality {
            self.convert.quality = quality;
        }
        if let Some(program) = &cli.heif_decoder {
            self.convert.heif_decoder = program.clone();
        }
        self
    }

    pub fn engine_settings(self) -> EngineSettings {
        EngineSettings {
            convert: self.convert,
            archive: self.archive,
        }
    }
}

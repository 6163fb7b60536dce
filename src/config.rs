use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::subtitle::SubtitleFormat;
use crate::SubtitleError;

/// Default maximum characters per caption line
pub const DEFAULT_MAX_CHARS: usize = 42;

/// Default minimum on-screen time for a caption line, in seconds
pub const DEFAULT_MIN_LINE_DURATION: f64 = 1.5;

/// Default label for the synthetic cue covering leading silence
pub const DEFAULT_LEAD_IN_LABEL: &str = "[Music]";

/// Configuration for Subtitle Forge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Caption generation settings
    pub subtitles: SubtitleConfig,

    /// Output and file delivery settings
    pub output: OutputConfig,

    /// Performance and resource settings
    pub performance: PerformanceConfig,
}

/// Caption engine settings.
///
/// Each flag selects one of the behaviours that caption generators commonly
/// disagree on, so output stays reproducible for a given configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleConfig {
    /// Maximum characters per caption line
    pub max_chars: usize,

    /// How a segment's time span is divided among its wrapped lines
    pub timing: TimingPolicy,

    /// Remove filler words (um, uh, er, ah, like) before wrapping
    pub strip_fillers: bool,

    /// Emit a labelled cue covering silence before the first segment
    pub emit_lead_in_cue: bool,

    /// Text of the lead-in cue
    pub lead_in_label: String,

    /// Source of the plain-text transcript
    pub txt_source: TxtSource,
}

/// Per-line timing policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimingPolicy {
    /// Split the segment proportionally to line length, never shorter than
    /// `min_line_duration` and never past the segment end
    Proportional { min_line_duration: f64 },

    /// Every line spans the whole segment
    Flat,
}

/// Where the `txt` output comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxtSource {
    /// The provider's full transcript, verbatim
    Raw,

    /// Segment texts (cleaned when filler stripping is on), space-joined
    Segments,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base output directory
    pub base_dir: PathBuf,

    /// File stem used for single-input renders (transcript.srt, ...)
    pub stem: String,

    /// Formats written to disk
    pub formats: Vec<SubtitleFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Maximum number of files rendered concurrently in batch mode
    pub max_workers: usize,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        TimingPolicy::Proportional {
            min_line_duration: DEFAULT_MIN_LINE_DURATION,
        }
    }
}

impl Default for TxtSource {
    fn default() -> Self {
        TxtSource::Raw
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            timing: TimingPolicy::default(),
            strip_fillers: false,
            emit_lead_in_cue: false,
            lead_in_label: DEFAULT_LEAD_IN_LABEL.to_string(),
            txt_source: TxtSource::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./output"),
            stem: "transcript".to_string(),
            formats: SubtitleFormat::ALL.to_vec(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { max_workers: 4 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subtitles: SubtitleConfig::default(),
            output: OutputConfig::default(),
            performance: PerformanceConfig::default(),
        }
    }
}

impl SubtitleConfig {
    /// Check the engine settings before any caption is generated
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_chars == 0 {
            return Err(SubtitleError::Configuration(
                "max_chars must be greater than 0".to_string(),
            ));
        }

        if let TimingPolicy::Proportional { min_line_duration } = self.timing {
            if !min_line_duration.is_finite() || min_line_duration < 0.0 {
                return Err(SubtitleError::Configuration(format!(
                    "min_line_duration must be a non-negative number, got {}",
                    min_line_duration
                )));
            }
        }

        if self.emit_lead_in_cue && self.lead_in_label.trim().is_empty() {
            return Err(SubtitleError::Configuration(
                "lead_in_label must not be empty when the lead-in cue is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from the first config file found, else from the environment
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("subtitle-forge.toml"),
            PathBuf::from("config/subtitle-forge.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            config_paths.push(PathBuf::from(home).join(".config/subtitle-forge/config.toml"));
        }
        config_paths.push(PathBuf::from("/etc/subtitle-forge/config.toml"));

        // First existing file wins, including its parse errors
        if let Some(path) = config_paths.iter().find(|path| path.is_file()) {
            return Self::from_file(path);
        }

        tracing::debug!("No configuration file found, reading environment");
        Ok(Self::from_env())
    }

    /// Load configuration from an explicit path
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config file {}: {}", path.display(), e))?;
        let config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Load configuration from `SUBTITLE_FORGE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `SUBTITLE_FORGE_*` key.
    /// Unparsable values keep the default and log a warning.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(max_chars) = env_value(&lookup, "SUBTITLE_FORGE_MAX_CHARS") {
            config.subtitles.max_chars = max_chars;
        }

        if let Some(min_line_duration) = env_value(&lookup, "SUBTITLE_FORGE_MIN_LINE_DURATION") {
            config.subtitles.timing = TimingPolicy::Proportional { min_line_duration };
        }

        if let Some(strip) = env_flag(&lookup, "SUBTITLE_FORGE_STRIP_FILLERS") {
            config.subtitles.strip_fillers = strip;
        }

        if let Some(lead_in) = env_flag(&lookup, "SUBTITLE_FORGE_LEAD_IN") {
            config.subtitles.emit_lead_in_cue = lead_in;
        }

        if let Some(output_dir) = lookup("SUBTITLE_FORGE_OUTPUT_DIR") {
            config.output.base_dir = PathBuf::from(output_dir);
        }

        if let Some(workers) = env_value(&lookup, "SUBTITLE_FORGE_WORKERS") {
            config.performance.max_workers = workers;
        }

        config
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.subtitles.validate()?;

        if self.performance.max_workers == 0 {
            return Err(anyhow!("max_workers must be greater than 0"));
        }

        if self.output.formats.is_empty() {
            return Err(anyhow!("at least one output format is required"));
        }

        if self.output.stem.trim().is_empty() {
            return Err(anyhow!("output stem must not be empty"));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        let timing = match self.subtitles.timing {
            TimingPolicy::Proportional { min_line_duration } => {
                format!("proportional (min {:.2}s per line)", min_line_duration)
            }
            TimingPolicy::Flat => "flat".to_string(),
        };
        let formats: Vec<&str> = self
            .output
            .formats
            .iter()
            .map(|format| format.extension())
            .collect();

        format!(
            "Subtitle Forge Configuration:\n\
            - Max Chars Per Line: {}\n\
            - Timing: {}\n\
            - Strip Fillers: {}\n\
            - Lead-in Cue: {}\n\
            - Plain Text Source: {:?}\n\
            - Output Directory: {}\n\
            - Formats: {}\n\
            - Workers: {}",
            self.subtitles.max_chars,
            timing,
            self.subtitles.strip_fillers,
            self.subtitles.emit_lead_in_cue,
            self.subtitles.txt_source,
            self.output.base_dir.display(),
            formats.join(", "),
            self.performance.max_workers
        )
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_value<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

fn env_flag<F>(lookup: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let flag = parse_flag(&raw);
    if flag.is_none() {
        tracing::warn!("Ignoring {}={:?}: expected true/false", key, raw);
    }
    flag
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.config.subtitles.max_chars = max_chars;
        self
    }

    pub fn with_timing(mut self, timing: TimingPolicy) -> Self {
        self.config.subtitles.timing = timing;
        self
    }

    pub fn strip_fillers(mut self, enable: bool) -> Self {
        self.config.subtitles.strip_fillers = enable;
        self
    }

    pub fn emit_lead_in_cue(mut self, enable: bool) -> Self {
        self.config.subtitles.emit_lead_in_cue = enable;
        self
    }

    pub fn with_lead_in_label(mut self, label: String) -> Self {
        self.config.subtitles.lead_in_label = label;
        self
    }

    pub fn with_txt_source(mut self, source: TxtSource) -> Self {
        self.config.subtitles.txt_source = source;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn with_formats(mut self, formats: Vec<SubtitleFormat>) -> Self {
        self.config.output.formats = formats;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.performance.max_workers = workers;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViewerConfig {
    /// Documents with at least this many top-level blocks are virtualized;
    /// smaller ones are laid out in full
    #[serde(default = "default_virtualization_threshold")]
    pub virtualization_threshold: usize,

    /// Blocks mounted beyond each edge of the visible window
    #[serde(default = "default_overscan")]
    pub overscan: usize,

    /// Blank rows between consecutive blocks
    #[serde(default = "default_block_gap")]
    pub block_gap: u32,

    /// Rows below the viewport top where the "current" block is sampled for
    /// table-of-contents tracking in virtualized documents
    #[serde(default = "default_reading_line_offset")]
    pub reading_line_offset: u32,

    /// Upper edge of the active-heading band, as a percentage of viewport height
    #[serde(default = "default_active_band_top_percent")]
    pub active_band_top_percent: u8,

    /// Lower edge of the active-heading band, as a percentage of viewport height
    #[serde(default = "default_active_band_bottom_percent")]
    pub active_band_bottom_percent: u8,

    /// Frames to wait for a jump target to be mounted before giving up
    #[serde(default = "default_anchor_poll_attempts")]
    pub anchor_poll_attempts: u32,

    /// Length of one frame in milliseconds (anchor polling and input poll timeout)
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Shortest query (in characters, after trimming) that starts a search
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    /// Show the table-of-contents pane
    #[serde(default = "default_true")]
    pub show_toc: bool,

    /// Width of the table-of-contents pane in columns
    #[serde(default = "default_toc_width")]
    pub toc_width: u16,

    /// Row estimates for blocks that have not been measured yet
    #[serde(default)]
    pub estimates: EstimateConfig,
}

/// Size heuristics, in rows, used before a block is measured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EstimateConfig {
    #[serde(default = "default_heading_level1")]
    pub heading_level1: u32,
    #[serde(default = "default_heading_level2")]
    pub heading_level2: u32,
    #[serde(default = "default_heading_other")]
    pub heading_other: u32,
    #[serde(default = "default_paragraph")]
    pub paragraph: u32,
    #[serde(default = "default_list")]
    pub list: u32,
    #[serde(default = "default_definition_list")]
    pub definition_list: u32,
    #[serde(default = "default_table")]
    pub table: u32,
    /// Rows a code block adds around its text lines (frame)
    #[serde(default = "default_code_block_chrome")]
    pub code_block_chrome: u32,
    /// Cap on the estimate for very long code blocks
    #[serde(default = "default_code_block_max")]
    pub code_block_max: u32,
    #[serde(default = "default_horizontal_rule")]
    pub horizontal_rule: u32,
}

fn default_true() -> bool {
    true
}

fn default_virtualization_threshold() -> usize {
    100
}

fn default_overscan() -> usize {
    6
}

fn default_block_gap() -> u32 {
    1
}

fn default_reading_line_offset() -> u32 {
    3
}

fn default_active_band_top_percent() -> u8 {
    20
}

fn default_active_band_bottom_percent() -> u8 {
    30
}

fn default_anchor_poll_attempts() -> u32 {
    20
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_min_query_len() -> usize {
    2
}

fn default_toc_width() -> u16 {
    28
}

fn default_heading_level1() -> u32 {
    3
}

fn default_heading_level2() -> u32 {
    2
}

fn default_heading_other() -> u32 {
    2
}

fn default_paragraph() -> u32 {
    4
}

fn default_list() -> u32 {
    6
}

fn default_definition_list() -> u32 {
    8
}

fn default_table() -> u32 {
    6
}

fn default_code_block_chrome() -> u32 {
    2
}

fn default_code_block_max() -> u32 {
    40
}

fn default_horizontal_rule() -> u32 {
    1
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            heading_level1: default_heading_level1(),
            heading_level2: default_heading_level2(),
            heading_other: default_heading_other(),
            paragraph: default_paragraph(),
            list: default_list(),
            definition_list: default_definition_list(),
            table: default_table(),
            code_block_chrome: default_code_block_chrome(),
            code_block_max: default_code_block_max(),
            horizontal_rule: default_horizontal_rule(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            virtualization_threshold: default_virtualization_threshold(),
            overscan: default_overscan(),
            block_gap: default_block_gap(),
            reading_line_offset: default_reading_line_offset(),
            active_band_top_percent: default_active_band_top_percent(),
            active_band_bottom_percent: default_active_band_bottom_percent(),
            anchor_poll_attempts: default_anchor_poll_attempts(),
            frame_interval_ms: default_frame_interval_ms(),
            min_query_len: default_min_query_len(),
            show_toc: true,
            toc_width: default_toc_width(),
            estimates: EstimateConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Get the default config file path
    #[cfg(feature = "runtime")]
    pub fn default_config_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|d| d.join("manview").join("config.json"))
    }

    /// Load configuration from the default location, falling back to defaults if not found
    #[cfg(feature = "runtime")]
    pub fn load_or_default() -> Self {
        if let Some(config_path) = Self::default_config_path() {
            if config_path.exists() {
                match Self::load_from_file(&config_path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!(
                            "Failed to load config from {}: {}, using defaults",
                            config_path.display(),
                            e
                        );
                    }
                }
            }
        }
        Self::default()
    }

    /// Load configuration from a JSON file
    ///
    /// Missing fields take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: ViewerConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.anchor_poll_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "anchor_poll_attempts must be at least 1".to_string(),
            ));
        }
        if self.active_band_top_percent > self.active_band_bottom_percent
            || self.active_band_bottom_percent > 100
        {
            return Err(ConfigError::ValidationError(format!(
                "active band {}%..{}% is not a range inside the viewport",
                self.active_band_top_percent, self.active_band_bottom_percent
            )));
        }
        if self.min_query_len == 0 {
            return Err(ConfigError::ValidationError(
                "min_query_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.frame_interval_ms)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

use crate::core::error::ChatError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration, loaded once at startup and carried by the
/// session for the rest of the process.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_icon: String,
    pub app_descr: String,
    pub system_prompt_filename: PathBuf,
    pub api_config_file: PathBuf,
    pub start_message: String,
    pub max_words_per_query: usize,
}

impl AppConfig {
    /// Read and parse the JSON app config. A missing file, invalid JSON,
    /// or an absent key is fatal at startup.
    pub fn load(path: &Path) -> Result<Self, ChatError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ChatError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| ChatError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Read the system prompt file named by the config. The entire file
    /// becomes the system message.
    pub fn read_system_prompt(&self) -> Result<String, ChatError> {
        fs::read_to_string(&self.system_prompt_filename).map_err(|e| {
            ChatError::Config(format!(
                "failed to read system prompt {}: {} (create the file next to the app config)",
                self.system_prompt_filename.display(),
                e
            ))
        })
    }
}

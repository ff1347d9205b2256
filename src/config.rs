//! Stream selection preferences.
//!
//! Settings are resolved from built-in defaults, then the first config file
//! found, then environment variables. Hosts push later changes into a running
//! demuxer through [`Demuxer::settings_changed`](crate::format::Demuxer::settings_changed).

use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::av::{StreamCatalog, StreamSelection, SubtitleMode};
use crate::error::Result;

const CONFIG_PATHS: [&str; 2] = ["./demuxkit.toml", "./config.toml"];

pub const ENV_AUDIO_LANGUAGES: &str = "DEMUXKIT_AUDIO_LANGUAGES";
pub const ENV_SUBTITLE_LANGUAGES: &str = "DEMUXKIT_SUBTITLE_LANGUAGES";
pub const ENV_SUBTITLE_MODE: &str = "DEMUXKIT_SUBTITLE_MODE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemuxSettings {
    /// Audio language codes, most preferred first
    pub audio_languages: Vec<String>,
    /// Subtitle language codes, most preferred first
    pub subtitle_languages: Vec<String>,
    pub subtitle_mode: SubtitleMode,
    /// Never fall back to a subtitle stream in a non-preferred language
    pub only_matching_subtitles: bool,
}

impl Default for DemuxSettings {
    fn default() -> Self {
        Self {
            audio_languages: Vec::new(),
            subtitle_languages: Vec::new(),
            subtitle_mode: SubtitleMode::Forced,
            only_matching_subtitles: false,
        }
    }
}

fn split_languages(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

impl DemuxSettings {
    /// Defaults, overridden by the first config file found, then by the
    /// environment.
    pub fn load() -> Result<Self> {
        let mut settings = match CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env()?;
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loading settings from {}", path.as_ref().display());
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Runs the video, audio and subtitle selectors against `catalog`.
    pub fn select_streams(&self, catalog: &StreamCatalog) -> StreamSelection {
        StreamSelection::select(catalog, self)
    }

    /// Applies `DEMUXKIT_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(langs) = lookup(ENV_AUDIO_LANGUAGES) {
            self.audio_languages = split_languages(&langs);
        }
        if let Some(langs) = lookup(ENV_SUBTITLE_LANGUAGES) {
            self.subtitle_languages = split_languages(&langs);
        }
        if let Some(mode) = lookup(ENV_SUBTITLE_MODE) {
            self.subtitle_mode = mode.parse()?;
        }
        Ok(())
    }
}

/// Creates a default config template file if it doesn't exist
pub fn create_default_config_template<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    if !path.as_ref().exists() {
        let template = r#"# demuxkit stream selection settings

# Audio languages, most preferred first
audio_languages = ["en"]

# Subtitle languages, most preferred first
subtitle_languages = ["en"]

# none | forced | always
subtitle_mode = "forced"

# Leave subtitles off rather than pick a non-preferred language
only_matching_subtitles = false
"#;
        std::fs::write(path, template)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = DemuxSettings::from_toml(r#"audio_languages = ["ja", "en"]"#).unwrap();
        assert_eq!(settings.audio_languages, vec!["ja", "en"]);
        assert_eq!(settings.subtitle_mode, SubtitleMode::Forced);
        assert!(!settings.only_matching_subtitles);
    }

    #[test]
    fn test_full_toml() {
        let settings = DemuxSettings::from_toml(
            r#"
            subtitle_languages = ["de"]
            subtitle_mode = "always"
            only_matching_subtitles = true
            "#,
        )
        .unwrap();
        assert_eq!(settings.subtitle_languages, vec!["de"]);
        assert_eq!(settings.subtitle_mode, SubtitleMode::Always);
        assert!(settings.only_matching_subtitles);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = DemuxSettings::from_toml("subtitle_mode = \"sometimes\"").unwrap_err();
        assert!(matches!(err, crate::DemuxError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_AUDIO_LANGUAGES, "fr, en ,"),
            (ENV_SUBTITLE_MODE, "none"),
        ]
        .into_iter()
        .collect();

        let mut settings = DemuxSettings::default();
        settings
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.audio_languages, vec!["fr", "en"]);
        assert!(settings.subtitle_languages.is_empty());
        assert_eq!(settings.subtitle_mode, SubtitleMode::None);
    }

    #[test]
    fn test_select_streams() {
        use crate::av::{Stream, StreamDescriptor, StreamType, NO_SUBTITLE_PID};

        let mut catalog = StreamCatalog::new();
        for (pid, lang) in [(1, "en"), (2, "ja")] {
            catalog
                .add_stream(
                    Stream::new(pid, StreamType::Audio)
                        .with_descriptor(StreamDescriptor::new().with_language(lang)),
                )
                .unwrap();
        }
        let settings = DemuxSettings::from_toml(r#"audio_languages = ["JA"]"#).unwrap();
        let selection = settings.select_streams(&catalog);
        assert_eq!(selection.audio, Some(2));
        assert_eq!(selection.video, None);
        assert_eq!(selection.subtitle, NO_SUBTITLE_PID);
    }

    #[test]
    fn test_template_parses() {
        let dir = std::env::temp_dir().join(format!("demuxkit-template-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("demuxkit.toml");
        create_default_config_template(&path).unwrap();

        let settings = DemuxSettings::from_file(&path).unwrap();
        assert_eq!(settings.audio_languages, vec!["en"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}

//! Stream selection policy.
//!
//! Every function here is pure: the result depends only on the catalog and
//! the preferences passed in. Catalog order is the tie-break everywhere, so
//! the same inputs always pick the same stream.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::{Stream, StreamCatalog, StreamList, NO_SUBTITLE_PID};
use crate::config::DemuxSettings;
use crate::error::DemuxError;

/// How eagerly subtitles are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleMode {
    /// Never select a subtitle stream
    #[serde(alias = "no")]
    None,
    /// Only streams flagged forced
    #[default]
    Forced,
    /// Any subtitle stream, by language preference
    Always,
}

impl FromStr for SubtitleMode {
    type Err = DemuxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "no" | "0" => Ok(SubtitleMode::None),
            "forced" | "1" => Ok(SubtitleMode::Forced),
            "always" | "2" => Ok(SubtitleMode::Always),
            other => Err(DemuxError::Config(format!("unknown subtitle mode {:?}", other))),
        }
    }
}

impl fmt::Display for SubtitleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubtitleMode::None => "none",
            SubtitleMode::Forced => "forced",
            SubtitleMode::Always => "always",
        })
    }
}

/// First stream, in preference order, whose language matches; languages
/// are tried one at a time so a later language never beats an earlier one.
fn first_by_language<'a, S, I>(candidates: I, languages: &[S]) -> Option<&'a Stream>
where
    S: AsRef<str>,
    I: Iterator<Item = &'a Stream> + Clone,
{
    languages.iter().find_map(|lang| {
        candidates
            .clone()
            .find(|stream| stream.matches_language(lang.as_ref()))
    })
}

fn matches_any<S: AsRef<str>>(stream: &Stream, languages: &[S]) -> bool {
    languages.iter().any(|lang| stream.matches_language(lang.as_ref()))
}

fn real_subtitles(list: &StreamList) -> impl Iterator<Item = &Stream> + Clone {
    list.iter().filter(|s| !s.is_no_subtitle())
}

/// The first video stream in discovery order.
pub fn select_video_stream(catalog: &StreamCatalog) -> Option<&Stream> {
    catalog.video_streams().first()
}

/// The first audio stream matching the most preferred language, else the
/// first audio stream.
pub fn select_audio_stream<'a, S: AsRef<str>>(
    catalog: &'a StreamCatalog,
    preferred_languages: &[S],
) -> Option<&'a Stream> {
    let audio = catalog.audio_streams();
    first_by_language(audio.iter(), preferred_languages).or_else(|| audio.first())
}

/// Picks a subtitle PID, or [`NO_SUBTITLE_PID`] when nothing qualifies.
///
/// `Forced` takes the first forced stream in catalog order, skipping streams
/// outside `preferred_languages` when `only_matching` is set. `Always` scans
/// by language preference like audio selection; without `only_matching` the
/// first subtitle stream is the fallback when no language matches.
pub fn select_subtitle_stream<S: AsRef<str>>(
    catalog: &StreamCatalog,
    preferred_languages: &[S],
    mode: SubtitleMode,
    only_matching: bool,
) -> u32 {
    let subtitles = catalog.subtitle_streams();
    let chosen = match mode {
        SubtitleMode::None => None,
        SubtitleMode::Forced => real_subtitles(subtitles)
            .filter(|s| s.is_forced())
            .find(|s| !only_matching || matches_any(s, preferred_languages)),
        SubtitleMode::Always => {
            pick_subtitle(real_subtitles(subtitles), preferred_languages, only_matching)
        }
    };
    chosen.map_or(NO_SUBTITLE_PID, |s| s.pid)
}

fn pick_subtitle<'a, S, I>(
    candidates: I,
    languages: &[S],
    only_matching: bool,
) -> Option<&'a Stream>
where
    S: AsRef<str>,
    I: Iterator<Item = &'a Stream> + Clone,
{
    let matched = first_by_language(candidates.clone(), languages);
    if matched.is_some() || only_matching {
        return matched;
    }
    candidates.into_iter().next()
}

/// The PIDs chosen for each selectable media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSelection {
    pub video: Option<u32>,
    pub audio: Option<u32>,
    /// [`NO_SUBTITLE_PID`] when subtitles stay off
    pub subtitle: u32,
}

impl StreamSelection {
    /// Applies all three selectors with the given preferences.
    pub fn select(catalog: &StreamCatalog, settings: &DemuxSettings) -> Self {
        let selection = Self {
            video: select_video_stream(catalog).map(|s| s.pid),
            audio: select_audio_stream(catalog, &settings.audio_languages).map(|s| s.pid),
            subtitle: select_subtitle_stream(
                catalog,
                &settings.subtitle_languages,
                settings.subtitle_mode,
                settings.only_matching_subtitles,
            ),
        };
        log::debug!(
            "selected video {:?}, audio {:?}, subtitle {:#x}",
            selection.video,
            selection.audio,
            selection.subtitle
        );
        selection
    }

    pub fn has_subtitle(&self) -> bool {
        self.subtitle != NO_SUBTITLE_PID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::av::{StreamDescriptor, StreamType};
    use pretty_assertions::assert_eq;

    fn stream(pid: u32, stream_type: StreamType, lang: &str, forced: bool) -> Stream {
        Stream::new(pid, stream_type).with_descriptor(
            StreamDescriptor::new()
                .with_language(lang)
                .with_forced(forced),
        )
    }

    fn catalog(streams: Vec<Stream>) -> StreamCatalog {
        let mut catalog = StreamCatalog::new();
        for s in streams {
            catalog.add_stream(s).unwrap();
        }
        catalog
    }

    const NONE: [&str; 0] = [];

    #[test]
    fn test_video_first_in_discovery_order() {
        let catalog = catalog(vec![
            Stream::new(0x1e1, StreamType::Video),
            Stream::new(0x1e0, StreamType::Video),
        ]);
        assert_eq!(select_video_stream(&catalog).map(|s| s.pid), Some(0x1e1));
        assert!(select_video_stream(&StreamCatalog::new()).is_none());
    }

    #[test]
    fn test_audio_language_preference() {
        let catalog = catalog(vec![
            stream(1, StreamType::Audio, "en", false),
            stream(2, StreamType::Audio, "fr", false),
        ]);
        assert_eq!(select_audio_stream(&catalog, &["fr", "en"]).map(|s| s.pid), Some(2));
        assert_eq!(select_audio_stream(&catalog, &["en", "fr"]).map(|s| s.pid), Some(1));
    }

    #[test]
    fn test_audio_preference_order_beats_catalog_order() {
        let catalog = catalog(vec![
            stream(1, StreamType::Audio, "de", false),
            stream(2, StreamType::Audio, "en", false),
            stream(3, StreamType::Audio, "en", false),
        ]);
        // "en" is listed first, so pid 2 wins over the earlier "de" stream;
        // pid 3 loses the tie to pid 2 by catalog order.
        assert_eq!(select_audio_stream(&catalog, &["en", "de"]).map(|s| s.pid), Some(2));
    }

    #[test]
    fn test_audio_fallback_and_empty() {
        let catalog = catalog(vec![
            stream(7, StreamType::Audio, "ja", false),
            Stream::new(8, StreamType::Audio),
        ]);
        assert_eq!(select_audio_stream(&catalog, &["fr"]).map(|s| s.pid), Some(7));
        assert_eq!(select_audio_stream(&catalog, &NONE).map(|s| s.pid), Some(7));
        assert!(select_audio_stream(&StreamCatalog::new(), &["en"]).is_none());
    }

    #[test]
    fn test_language_match_ignores_case() {
        let catalog = catalog(vec![
            stream(1, StreamType::Audio, "eng", false),
            stream(2, StreamType::Audio, "FRE", false),
        ]);
        assert_eq!(select_audio_stream(&catalog, &["fre"]).map(|s| s.pid), Some(2));
    }

    #[test]
    fn test_no_subs_ignores_catalog() {
        let catalog = catalog(vec![
            stream(3, StreamType::Subtitle, "en", true),
            stream(4, StreamType::Subtitle, "en", false),
        ]);
        for only_matching in [false, true] {
            assert_eq!(
                select_subtitle_stream(&catalog, &["en"], SubtitleMode::None, only_matching),
                NO_SUBTITLE_PID
            );
        }
    }

    #[test]
    fn test_forced_without_forced_streams() {
        let catalog = catalog(vec![stream(3, StreamType::Subtitle, "en", false)]);
        assert_eq!(
            select_subtitle_stream(&catalog, &["en"], SubtitleMode::Forced, true),
            NO_SUBTITLE_PID
        );
        assert_eq!(
            select_subtitle_stream(&catalog, &["en"], SubtitleMode::Forced, false),
            NO_SUBTITLE_PID
        );
    }

    #[test]
    fn test_forced_only_matching() {
        let catalog = catalog(vec![
            stream(3, StreamType::Subtitle, "de", true),
            stream(4, StreamType::Subtitle, "en", false),
            stream(5, StreamType::Subtitle, "en", true),
        ]);
        assert_eq!(
            select_subtitle_stream(&catalog, &["en"], SubtitleMode::Forced, true),
            5
        );
        assert_eq!(
            select_subtitle_stream(&catalog, &["fr"], SubtitleMode::Forced, true),
            NO_SUBTITLE_PID
        );
        assert_eq!(
            select_subtitle_stream(&catalog, &["fr"], SubtitleMode::Forced, false),
            3
        );
    }

    #[test]
    fn test_forced_keeps_catalog_order() {
        let catalog = catalog(vec![
            stream(3, StreamType::Subtitle, "en", true),
            stream(4, StreamType::Subtitle, "fr", false),
            stream(5, StreamType::Subtitle, "fr", true),
        ]);
        // Preference order does not rank forced streams
        let prefs = ["fr", "en"];
        for only_matching in [true, false] {
            let pid = select_subtitle_stream(&catalog, &prefs, SubtitleMode::Forced, only_matching);
            assert_eq!(pid, 3);
        }
        assert_eq!(select_subtitle_stream(&catalog, &["fr"], SubtitleMode::Forced, true), 5);
        assert_eq!(select_subtitle_stream(&catalog, &["fr"], SubtitleMode::Forced, false), 3);
    }

    #[test]
    fn test_always_subs() {
        let mut catalog = catalog(vec![
            stream(10, StreamType::Subtitle, "en", false),
            stream(11, StreamType::Subtitle, "es", false),
        ]);
        catalog.create_no_subtitle_stream();

        assert_eq!(
            select_subtitle_stream(&catalog, &["es", "en"], SubtitleMode::Always, true),
            11
        );
        assert_eq!(
            select_subtitle_stream(&catalog, &["it"], SubtitleMode::Always, true),
            NO_SUBTITLE_PID
        );
        assert_eq!(
            select_subtitle_stream(&catalog, &["it"], SubtitleMode::Always, false),
            10
        );
    }

    #[test]
    fn test_placeholder_is_never_selected() {
        let mut catalog = StreamCatalog::new();
        catalog.create_no_subtitle_stream();
        assert_eq!(
            select_subtitle_stream(&catalog, &NONE, SubtitleMode::Always, false),
            NO_SUBTITLE_PID
        );
    }

    #[test]
    fn test_subtitle_mode_parsing() {
        assert_eq!("Forced".parse::<SubtitleMode>().unwrap(), SubtitleMode::Forced);
        assert_eq!("none".parse::<SubtitleMode>().unwrap(), SubtitleMode::None);
        assert_eq!("2".parse::<SubtitleMode>().unwrap(), SubtitleMode::Always);
        assert!("sometimes".parse::<SubtitleMode>().is_err());
    }

    #[test]
    fn test_select_with_settings() {
        let catalog = catalog(vec![
            Stream::new(0x100, StreamType::Video),
            stream(0x101, StreamType::Audio, "en", false),
            stream(0x102, StreamType::Audio, "fr", false),
            stream(0x103, StreamType::Subtitle, "fr", false),
        ]);
        let settings = DemuxSettings {
            audio_languages: vec!["fr".into()],
            subtitle_languages: vec!["fr".into()],
            subtitle_mode: SubtitleMode::Always,
            only_matching_subtitles: true,
        };
        let selection = StreamSelection::select(&catalog, &settings);
        assert_eq!(selection.video, Some(0x100));
        assert_eq!(selection.audio, Some(0x102));
        assert_eq!(selection.subtitle, 0x103);
        assert!(selection.has_subtitle());
    }
}

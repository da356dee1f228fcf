//! Caption retrieval from YouTube's watch page and innertube player API.

use crate::config::DEFAULT_YOUTUBE_BASE_URL;
use crate::error::{Result, TubesumError};
use crate::transcript::{CaptionRecord, Transcript, TranscriptFetcher};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Client version sent in the innertube context.
const ANDROID_CLIENT_VERSION: &str = "20.10.38";

/// A caption track listed by the player response.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub base_url: String,
    pub is_generated: bool,
}

pub struct YouTubeFetcher {
    client: Client,
    base_url: String,
}

impl Default for YouTubeFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl YouTubeFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
        }
    }

    /// Point the fetcher at a different origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_text(&self, url: &str, what: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to fetch {}: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("{} request failed ({})", what, status)));
        }

        response
            .text()
            .await
            .map_err(|e| unavailable(format!("Failed to read {}: {}", what, e)))
    }

    async fn fetch_player_response(&self, video_id: &str, api_key: &str) -> Result<Value> {
        let url = format!("{}/youtubei/v1/player?key={}", self.base_url, api_key);
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": ANDROID_CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to fetch player data: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("Player request failed ({})", status)));
        }

        response
            .json()
            .await
            .map_err(|e| unavailable(format!("Failed to parse player data: {}", e)))
    }
}

#[async_trait]
impl TranscriptFetcher for YouTubeFetcher {
    async fn fetch(&self, video_id: &str, preferred_languages: &[String]) -> Result<Transcript> {
        let watch_url = format!("{}/watch?v={}", self.base_url, video_id);
        let html = self.get_text(&watch_url, "watch page").await?;
        let api_key = extract_innertube_api_key(&html)?;

        let player = self.fetch_player_response(video_id, &api_key).await?;
        check_playability(&player)?;

        let tracks = caption_tracks(&player)?;
        debug!("Video {} has {} caption tracks", video_id, tracks.len());

        let track = select_track(&tracks, preferred_languages).ok_or_else(|| {
            unavailable(format!(
                "No transcript in any of [{}] for video {}",
                preferred_languages.join(", "),
                video_id
            ))
        })?;
        debug!(
            "Using {} caption track '{}'",
            if track.is_generated { "generated" } else { "manual" },
            track.language_code
        );

        let xml = self.get_text(&track.base_url, "caption track").await?;
        let captions = parse_timed_text(&xml)?;

        Ok(Transcript {
            video_id: video_id.to_string(),
            language_code: track.language_code.clone(),
            captions,
        })
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}

fn unavailable(reason: String) -> TubesumError {
    TubesumError::TranscriptUnavailable(reason)
}

fn extract_innertube_api_key(html: &str) -> Result<String> {
    if html.contains("g-recaptcha") {
        return Err(unavailable(
            "YouTube is asking for a captcha; requests from this IP are blocked".to_string(),
        ));
    }

    let re = Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#)
        .map_err(|e| unavailable(e.to_string()))?;

    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| unavailable("Could not parse the YouTube watch page".to_string()))
}

fn check_playability(player: &Value) -> Result<()> {
    let Some(status) = player
        .get("playabilityStatus")
        .and_then(|ps| ps.get("status"))
        .and_then(Value::as_str)
    else {
        return Ok(());
    };

    if status == "OK" {
        return Ok(());
    }

    let reason = player
        .pointer("/playabilityStatus/reason")
        .and_then(Value::as_str)
        .unwrap_or("no reason given");
    Err(unavailable(format!(
        "Video is not playable ({}): {}",
        status, reason
    )))
}

fn caption_tracks(player: &Value) -> Result<Vec<CaptionTrack>> {
    let tracks = player
        .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
        .and_then(Value::as_array)
        .ok_or_else(|| unavailable("Transcripts are disabled for this video".to_string()))?;

    let tracks: Vec<CaptionTrack> = tracks
        .iter()
        .filter_map(|track| {
            let language_code = track.get("languageCode")?.as_str()?.to_string();
            let base_url = track.get("baseUrl")?.as_str()?.replace("&fmt=srv3", "");
            let is_generated = track.get("kind").and_then(Value::as_str) == Some("asr");
            Some(CaptionTrack {
                language_code,
                base_url,
                is_generated,
            })
        })
        .collect();

    if tracks.is_empty() {
        return Err(unavailable(
            "Transcripts are disabled for this video".to_string(),
        ));
    }
    Ok(tracks)
}

/// First preferred language wins; a manual track beats a generated one.
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    preferred_languages: &[String],
) -> Option<&'a CaptionTrack> {
    preferred_languages.iter().find_map(|lang| {
        let manual = tracks
            .iter()
            .find(|t| &t.language_code == lang && !t.is_generated);
        manual.or_else(|| tracks.iter().find(|t| &t.language_code == lang))
    })
}

/// Parse the timed-text XML format into caption records.
pub fn parse_timed_text(xml: &str) -> Result<Vec<CaptionRecord>> {
    let element = Regex::new(r#"(?s)<text\s+start="([\d.]+)"(?:\s+dur="([\d.]+)")?[^>]*>(.*?)</text>"#)
        .map_err(|e| unavailable(e.to_string()))?;
    let markup = Regex::new(r"<[^>]+>").map_err(|e| unavailable(e.to_string()))?;

    let captions = element
        .captures_iter(xml)
        .filter_map(|caps| {
            let start = caps.get(1)?.as_str().parse().ok()?;
            let duration = caps
                .get(2)
                .and_then(|d| d.as_str().parse().ok())
                .unwrap_or(0.0);
            // Caption bodies are escaped twice; markup only survives the first pass.
            let once = unescape_html(caps.get(3)?.as_str());
            let text = unescape_html(&markup.replace_all(&once, ""));
            let text = text
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            Some(CaptionRecord {
                text,
                start,
                duration,
            })
        })
        .collect();

    Ok(captions)
}

fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(code: &str, generated: bool) -> CaptionTrack {
        CaptionTrack {
            language_code: code.to_string(),
            base_url: format!("https://example.test/{}", code),
            is_generated: generated,
        }
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_api_key() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaSy_test-KEY"});</script>"#;
        assert_eq!(extract_innertube_api_key(html).unwrap(), "AIzaSy_test-KEY");
    }

    #[test]
    fn test_extract_api_key_captcha() {
        let html = r#"<div class="g-recaptcha"></div>"#;
        assert!(matches!(
            extract_innertube_api_key(html),
            Err(TubesumError::TranscriptUnavailable(_))
        ));
        assert!(extract_innertube_api_key("<html></html>").is_err());
    }

    #[test]
    fn test_select_track_prefers_language_order() {
        let tracks = vec![track("de", false), track("en", true)];
        let chosen = select_track(&tracks, &langs(&["en", "de"])).unwrap();
        assert_eq!(chosen.language_code, "en");
    }

    #[test]
    fn test_select_track_prefers_manual() {
        let tracks = vec![track("en", true), track("en", false)];
        let chosen = select_track(&tracks, &langs(&["en"])).unwrap();
        assert!(!chosen.is_generated);
    }

    #[test]
    fn test_select_track_none_matching() {
        let tracks = vec![track("ja", false)];
        assert!(select_track(&tracks, &langs(&["en", "de"])).is_none());
    }

    #[test]
    fn test_caption_tracks_from_player() {
        let player = serde_json::json!({
            "playabilityStatus": { "status": "OK" },
            "captions": { "playerCaptionsTracklistRenderer": { "captionTracks": [
                { "languageCode": "en", "baseUrl": "https://x.test/t?lang=en&fmt=srv3", "kind": "asr" },
                { "languageCode": "de", "baseUrl": "https://x.test/t?lang=de" },
                { "baseUrl": "https://x.test/missing-code" }
            ]}}
        });
        assert!(check_playability(&player).is_ok());

        let tracks = caption_tracks(&player).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].base_url, "https://x.test/t?lang=en");
        assert!(tracks[0].is_generated);
        assert!(!tracks[1].is_generated);
    }

    #[test]
    fn test_captions_disabled() {
        let player = serde_json::json!({ "playabilityStatus": { "status": "OK" } });
        assert!(caption_tracks(&player).is_err());
    }

    #[test]
    fn test_unplayable_video() {
        let player = serde_json::json!({
            "playabilityStatus": { "status": "LOGIN_REQUIRED", "reason": "Sign in to confirm your age" }
        });
        let err = check_playability(&player).unwrap_err();
        assert!(err.to_string().contains("Sign in to confirm your age"));
    }

    #[test]
    fn test_parse_timed_text() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0.5" dur="2.1">Hello &amp;amp; welcome</text>
<text start="2.6" dur="1.9">it&amp;#39;s a
test</text>
<text start="4.5">&lt;b&gt;bold&lt;/b&gt; words</text>
</transcript>"#;

        let captions = parse_timed_text(xml).unwrap();
        assert_eq!(captions.len(), 3);
        assert_eq!(captions[0].text, "Hello & welcome");
        assert_eq!(captions[0].start, 0.5);
        assert_eq!(captions[1].text, "it's a test");
        assert_eq!(captions[1].duration, 1.9);
        assert_eq!(captions[2].text, "bold words");
        assert_eq!(captions[2].duration, 0.0);
    }

    #[test]
    fn test_parse_timed_text_keeps_literal_angle_brackets() {
        let xml = r#"<transcript><text start="1.0" dur="2.0">if x &amp;lt; 3 and y &amp;gt; 5 then stop</text>
<text start="3.0" dur="1.0">&lt;font color=&quot;#FFF&quot;&gt;a &amp;lt;b&amp;gt; tag&lt;/font&gt;</text></transcript>"#;

        let captions = parse_timed_text(xml).unwrap();
        assert_eq!(captions[0].text, "if x < 3 and y > 5 then stop");
        assert_eq!(captions[1].text, "a <b> tag");
    }

    #[test]
    fn test_unescape_html() {
        assert_eq!(unescape_html("a &lt; b &gt; c"), "a < b > c");
        assert_eq!(unescape_html("&#233;t&#xE9;"), "été");
        assert_eq!(unescape_html("AT&T & co"), "AT&T & co");
        assert_eq!(unescape_html("&unknown;"), "&unknown;");
    }
}

//! Speech output: built-in synthesis or an external synthesis endpoint.

mod dispatcher;

pub use dispatcher::SpeechDispatcher;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language used for built-in synthesis.
pub const BROWSER_LANG: &str = "en-US";
pub const UNSUPPORTED_ALERT: &str = "Sorry, your browser does not support text-to-speech.";

/// Voice selector persisted across sessions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum VoiceProvider {
    #[default]
    Browser,
    GoogleUs,
    GoogleUk,
    GoogleAu,
}

impl VoiceProvider {
    pub const ALL: [VoiceProvider; 4] = [
        VoiceProvider::Browser,
        VoiceProvider::GoogleUs,
        VoiceProvider::GoogleUk,
        VoiceProvider::GoogleAu,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::GoogleUs => "google-us",
            Self::GoogleUk => "google-uk",
            Self::GoogleAu => "google-au",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|voice| voice.as_str() == raw)
    }

    /// Endpoint voice for external providers, `None` for the built-in one.
    pub const fn remote_voice(self) -> Option<RemoteVoice> {
        match self {
            Self::Browser => None,
            Self::GoogleUs => Some(RemoteVoice::new("en-US", "en-US-Neural2-F")),
            Self::GoogleUk => Some(RemoteVoice::new("en-GB", "en-GB-Neural2-A")),
            Self::GoogleAu => Some(RemoteVoice::new("en-AU", "en-AU-Neural2-C")),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RemoteVoice {
    pub language_code: &'static str,
    pub name: &'static str,
}

impl RemoteVoice {
    pub const fn new(language_code: &'static str, name: &'static str) -> Self {
        Self {
            language_code,
            name,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SsmlGender {
    Female,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection {
    pub language_code: String,
    pub name: String,
    pub ssml_gender: SsmlGender,
}

/// Body posted to the synthesis endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceSelection,
}

impl SynthesisRequest {
    pub fn new(text: &str, voice: RemoteVoice) -> Self {
        Self {
            text: text.to_string(),
            voice: VoiceSelection {
                language_code: voice.language_code.to_string(),
                name: voice.name.to_string(),
                ssml_gender: SsmlGender::Female,
            },
        }
    }
}

/// Error body returned by the synthesis endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SynthesisFailure {
    pub error: String,
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SynthesisError {
    #[error("synthesis quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("bad synthesis request: {0}")]
    BadRequest(String),
    #[error("synthesis endpoint returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("synthesis transport failed: {0}")]
    Transport(String),
}

impl SynthesisError {
    /// Classify a non-success response from its status code and body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<SynthesisFailure>(body)
            .map(|failure| failure.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_string());

        match status {
            429 => Self::QuotaExceeded(message),
            400 => Self::BadRequest(message),
            _ => Self::Status { status, message },
        }
    }
}

/// Built-in (on-device) speech synthesis.
pub trait LocalSpeech {
    type Error: core::fmt::Display;

    fn is_supported(&self) -> bool;
    fn speak(&mut self, text: &str, lang: &str) -> Result<(), Self::Error>;
    fn cancel(&mut self);
    fn is_speaking(&mut self) -> bool;
}

/// Non-blocking client of the synthesis endpoint.
pub trait RemoteSynthesizer {
    /// Start a request, replacing any request still in flight.
    fn begin(&mut self, request: &SynthesisRequest) -> Result<(), SynthesisError>;

    /// Drop the in-flight request; a late response must never be reported.
    fn cancel(&mut self);

    /// Finished response for the current request, if any.
    fn poll(&mut self) -> Option<Result<Vec<u8>, SynthesisError>>;
}

/// Plays encoded audio returned by the endpoint.
pub trait AudioPlayer {
    type Error: core::fmt::Display;

    fn play(&mut self, audio: Vec<u8>) -> Result<(), Self::Error>;
    fn stop(&mut self);
    fn is_playing(&mut self) -> bool;
}

/// Remote synthesizer used when no endpoint is configured; every request fails
/// immediately so speech falls back to the built-in voice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRemote;

impl RemoteSynthesizer for NoRemote {
    fn begin(&mut self, _request: &SynthesisRequest) -> Result<(), SynthesisError> {
        Err(SynthesisError::Transport("no synthesis endpoint configured".to_string()))
    }

    fn cancel(&mut self) {}

    fn poll(&mut self) -> Option<Result<Vec<u8>, SynthesisError>> {
        None
    }
}

/// An absent endpoint behaves like [`NoRemote`].
impl<R: RemoteSynthesizer> RemoteSynthesizer for Option<R> {
    fn begin(&mut self, request: &SynthesisRequest) -> Result<(), SynthesisError> {
        match self {
            Some(remote) => remote.begin(request),
            None => NoRemote.begin(request),
        }
    }

    fn cancel(&mut self) {
        if let Some(remote) = self {
            remote.cancel();
        }
    }

    fn poll(&mut self) -> Option<Result<Vec<u8>, SynthesisError>> {
        self.as_mut()?.poll()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpeechOutcome {
    BrowserStarted,
    RemotePending,
    RemotePlaying,
    FellBackToBrowser,
    Finished,
    /// Nothing can speak; the caller shows [`UNSUPPORTED_ALERT`].
    Unsupported,
}

/// Speech surface consumed by the deck.
pub trait SpeechOutput {
    /// Speak `text`, stopping whatever is currently playing first.
    fn speak(&mut self, text: &str, voice: VoiceProvider) -> SpeechOutcome;
    fn cancel(&mut self);
    fn is_speaking(&self) -> bool;
    /// Advance pending requests and detect the end of playback.
    fn poll(&mut self) -> Option<SpeechOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_names_parse_back() {
        for voice in VoiceProvider::ALL {
            assert_eq!(VoiceProvider::parse(voice.as_str()), Some(voice));
        }
        assert_eq!(VoiceProvider::parse("google-nz"), None);
    }

    #[test]
    fn request_body_matches_endpoint_shape() {
        let request = SynthesisRequest::new("Hello", VoiceProvider::GoogleUs.remote_voice().unwrap());
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "text": "Hello",
                "voice": {
                    "languageCode": "en-US",
                    "name": "en-US-Neural2-F",
                    "ssmlGender": "FEMALE"
                }
            })
        );
    }

    #[test]
    fn failure_status_is_classified() {
        let quota = SynthesisError::from_response(429, br#"{"error":"Quota exceeded."}"#);
        assert_eq!(quota, SynthesisError::QuotaExceeded("Quota exceeded.".to_string()));

        let missing = SynthesisError::from_response(400, br#"{"error":"Text and voice configuration are required"}"#);
        assert!(matches!(missing, SynthesisError::BadRequest(_)));

        let other = SynthesisError::from_response(500, b"boom");
        assert_eq!(
            other,
            SynthesisError::Status {
                status: 500,
                message: "boom".to_string()
            }
        );
    }

    #[test]
    fn missing_remote_rejects_requests() {
        let request = SynthesisRequest::new("Hi", VoiceProvider::GoogleUs.remote_voice().unwrap());
        let mut remote: Option<NoRemote> = None;
        assert!(matches!(
            remote.begin(&request),
            Err(SynthesisError::Transport(_))
        ));
        assert_eq!(remote.poll(), None);
    }

    #[test]
    fn browser_voice_has_no_remote_mapping() {
        assert_eq!(VoiceProvider::Browser.remote_voice(), None);
        assert_eq!(
            VoiceProvider::GoogleAu.remote_voice().map(|voice| voice.language_code),
            Some("en-AU")
        );
    }
}

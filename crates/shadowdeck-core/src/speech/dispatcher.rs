use log::{debug, warn};

use super::{
    AudioPlayer, BROWSER_LANG, LocalSpeech, RemoteSynthesizer, SpeechOutcome, SpeechOutput,
    SynthesisRequest, VoiceProvider,
};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Activity {
    Idle,
    Local,
    Fetching { text: String },
    Playing,
}

/// Routes speech to the built-in voice or the synthesis endpoint, keeping at
/// most one utterance alive.
pub struct SpeechDispatcher<L, R, P>
where
    L: LocalSpeech,
    R: RemoteSynthesizer,
    P: AudioPlayer,
{
    local: L,
    remote: R,
    player: P,
    activity: Activity,
}

impl<L, R, P> SpeechDispatcher<L, R, P>
where
    L: LocalSpeech,
    R: RemoteSynthesizer,
    P: AudioPlayer,
{
    pub fn new(local: L, remote: R, player: P) -> Self {
        Self {
            local,
            remote,
            player,
            activity: Activity::Idle,
        }
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    fn stop_all(&mut self) {
        match self.activity {
            Activity::Idle => {}
            Activity::Local => self.local.cancel(),
            Activity::Fetching { .. } => self.remote.cancel(),
            Activity::Playing => self.player.stop(),
        }
        self.activity = Activity::Idle;
    }

    /// Whether the built-in voice started speaking `text`.
    fn speak_local(&mut self, text: &str) -> bool {
        if !self.local.is_supported() {
            warn!("speech: built-in synthesis unsupported");
            return false;
        }

        match self.local.speak(text, BROWSER_LANG) {
            Ok(()) => {
                self.activity = Activity::Local;
                true
            }
            Err(err) => {
                warn!("speech: built-in synthesis failed: {}", err);
                self.activity = Activity::Idle;
                false
            }
        }
    }

    fn fall_back(&mut self, text: &str) -> SpeechOutcome {
        if self.speak_local(text) {
            SpeechOutcome::FellBackToBrowser
        } else {
            SpeechOutcome::Unsupported
        }
    }
}

impl<L, R, P> SpeechOutput for SpeechDispatcher<L, R, P>
where
    L: LocalSpeech,
    R: RemoteSynthesizer,
    P: AudioPlayer,
{
    fn speak(&mut self, text: &str, voice: VoiceProvider) -> SpeechOutcome {
        self.stop_all();

        let Some(remote_voice) = voice.remote_voice() else {
            debug!("speech: browser voice text_len={}", text.len());
            return if self.speak_local(text) {
                SpeechOutcome::BrowserStarted
            } else {
                SpeechOutcome::Unsupported
            };
        };

        let request = SynthesisRequest::new(text, remote_voice);
        match self.remote.begin(&request) {
            Ok(()) => {
                debug!(
                    "speech: remote request voice={} text_len={}",
                    remote_voice.name,
                    text.len()
                );
                self.activity = Activity::Fetching {
                    text: text.to_string(),
                };
                SpeechOutcome::RemotePending
            }
            Err(err) => {
                warn!("speech: remote request failed, using built-in voice: {}", err);
                self.fall_back(text)
            }
        }
    }

    fn cancel(&mut self) {
        if self.activity != Activity::Idle {
            debug!("speech: cancel");
        }
        self.stop_all();
    }

    fn is_speaking(&self) -> bool {
        self.activity != Activity::Idle
    }

    fn poll(&mut self) -> Option<SpeechOutcome> {
        match &self.activity {
            Activity::Idle => None,
            Activity::Local => {
                if self.local.is_speaking() {
                    None
                } else {
                    self.activity = Activity::Idle;
                    Some(SpeechOutcome::Finished)
                }
            }
            Activity::Playing => {
                if self.player.is_playing() {
                    None
                } else {
                    self.activity = Activity::Idle;
                    Some(SpeechOutcome::Finished)
                }
            }
            Activity::Fetching { text } => {
                let text = text.clone();
                match self.remote.poll()? {
                    Ok(audio) => match self.player.play(audio) {
                        Ok(()) => {
                            self.activity = Activity::Playing;
                            Some(SpeechOutcome::RemotePlaying)
                        }
                        Err(err) => {
                            warn!("speech: playback failed, using built-in voice: {}", err);
                            self.activity = Activity::Idle;
                            Some(self.fall_back(&text))
                        }
                    },
                    Err(err) => {
                        warn!("speech: remote synthesis failed, using built-in voice: {}", err);
                        self.activity = Activity::Idle;
                        Some(self.fall_back(&text))
                    }
                }
            }
        }
    }
}

impl<L, R, P> Drop for SpeechDispatcher<L, R, P>
where
    L: LocalSpeech,
    R: RemoteSynthesizer,
    P: AudioPlayer,
{
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::speech::SynthesisError;

    type Log = Rc<RefCell<Vec<String>>>;

    struct FakeLocal {
        supported: bool,
        speaking: bool,
        log: Log,
    }

    impl LocalSpeech for FakeLocal {
        type Error = &'static str;

        fn is_supported(&self) -> bool {
            self.supported
        }

        fn speak(&mut self, text: &str, lang: &str) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(format!("local:speak:{lang}:{text}"));
            self.speaking = true;
            Ok(())
        }

        fn cancel(&mut self) {
            self.log.borrow_mut().push("local:cancel".to_string());
            self.speaking = false;
        }

        fn is_speaking(&mut self) -> bool {
            self.speaking
        }
    }

    struct FakeRemote {
        responses: VecDeque<Option<Result<Vec<u8>, SynthesisError>>>,
        log: Log,
    }

    impl RemoteSynthesizer for FakeRemote {
        fn begin(&mut self, request: &SynthesisRequest) -> Result<(), SynthesisError> {
            self.log
                .borrow_mut()
                .push(format!("remote:begin:{}:{}", request.voice.name, request.text));
            Ok(())
        }

        fn cancel(&mut self) {
            self.log.borrow_mut().push("remote:cancel".to_string());
        }

        fn poll(&mut self) -> Option<Result<Vec<u8>, SynthesisError>> {
            self.responses.pop_front().flatten()
        }
    }

    struct FakePlayer {
        playing: bool,
        log: Log,
    }

    impl AudioPlayer for FakePlayer {
        type Error = &'static str;

        fn play(&mut self, audio: Vec<u8>) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(format!("player:play:{}", audio.len()));
            self.playing = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.log.borrow_mut().push("player:stop".to_string());
            self.playing = false;
        }

        fn is_playing(&mut self) -> bool {
            self.playing
        }
    }

    fn dispatcher(
        supported: bool,
        responses: Vec<Option<Result<Vec<u8>, SynthesisError>>>,
    ) -> (SpeechDispatcher<FakeLocal, FakeRemote, FakePlayer>, Log) {
        let log: Log = Rc::default();
        let dispatcher = SpeechDispatcher::new(
            FakeLocal {
                supported,
                speaking: false,
                log: log.clone(),
            },
            FakeRemote {
                responses: responses.into(),
                log: log.clone(),
            },
            FakePlayer {
                playing: false,
                log: log.clone(),
            },
        );
        (dispatcher, log)
    }

    #[test]
    fn browser_voice_speaks_locally() {
        let (mut speech, log) = dispatcher(true, vec![]);
        assert_eq!(
            speech.speak("Hello", VoiceProvider::Browser),
            SpeechOutcome::BrowserStarted
        );
        assert!(speech.is_speaking());
        assert_eq!(log.borrow().as_slice(), ["local:speak:en-US:Hello"]);
    }

    #[test]
    fn speaking_again_stops_current_utterance_first() {
        let (mut speech, log) = dispatcher(true, vec![]);
        speech.speak("One", VoiceProvider::Browser);
        speech.speak("Two", VoiceProvider::Browser);
        assert_eq!(
            log.borrow().as_slice(),
            [
                "local:speak:en-US:One",
                "local:cancel",
                "local:speak:en-US:Two"
            ]
        );
    }

    #[test]
    fn unsupported_browser_voice_reports_alert() {
        let (mut speech, _log) = dispatcher(false, vec![]);
        assert_eq!(
            speech.speak("Hello", VoiceProvider::Browser),
            SpeechOutcome::Unsupported
        );
        assert!(!speech.is_speaking());
    }

    #[test]
    fn remote_audio_is_played_then_finishes() {
        let (mut speech, log) = dispatcher(true, vec![None, Some(Ok(vec![1, 2, 3]))]);
        assert_eq!(
            speech.speak("Hi", VoiceProvider::GoogleUk),
            SpeechOutcome::RemotePending
        );
        assert!(speech.is_speaking());
        assert_eq!(speech.poll(), None);
        assert_eq!(speech.poll(), Some(SpeechOutcome::RemotePlaying));
        assert_eq!(log.borrow().last().map(String::as_str), Some("player:play:3"));

        speech.player.playing = false;
        assert_eq!(speech.poll(), Some(SpeechOutcome::Finished));
        assert!(!speech.is_speaking());
    }

    #[test]
    fn cancel_during_playback_stops_the_player() {
        let (mut speech, log) = dispatcher(true, vec![Some(Ok(vec![9]))]);
        speech.speak("Hi", VoiceProvider::GoogleUk);
        assert_eq!(speech.poll(), Some(SpeechOutcome::RemotePlaying));

        speech.cancel();
        assert!(!speech.is_speaking());
        assert_eq!(log.borrow().last().map(String::as_str), Some("player:stop"));
        assert_eq!(speech.poll(), None);
    }

    #[test]
    fn remote_failure_falls_back_to_browser_for_same_text() {
        let (mut speech, log) = dispatcher(
            true,
            vec![Some(Err(SynthesisError::QuotaExceeded("quota".into())))],
        );
        speech.speak("Same text", VoiceProvider::GoogleUs);
        assert_eq!(speech.poll(), Some(SpeechOutcome::FellBackToBrowser));
        assert_eq!(
            log.borrow().as_slice(),
            [
                "remote:begin:en-US-Neural2-F:Same text",
                "local:speak:en-US:Same text"
            ]
        );
        assert!(speech.is_speaking());
    }

    #[test]
    fn remote_failure_without_browser_support_reports_alert() {
        let (mut speech, _log) = dispatcher(
            false,
            vec![Some(Err(SynthesisError::Transport("offline".into())))],
        );
        speech.speak("Hi", VoiceProvider::GoogleAu);
        assert_eq!(speech.poll(), Some(SpeechOutcome::Unsupported));
        assert!(!speech.is_speaking());
    }

    #[test]
    fn speaking_while_fetching_cancels_request() {
        let (mut speech, log) = dispatcher(true, vec![]);
        speech.speak("First", VoiceProvider::GoogleUs);
        speech.speak("Second", VoiceProvider::Browser);
        assert_eq!(
            log.borrow().as_slice(),
            [
                "remote:begin:en-US-Neural2-F:First",
                "remote:cancel",
                "local:speak:en-US:Second"
            ]
        );
    }

    #[test]
    fn missing_endpoint_falls_back_immediately() {
        let log: Log = Rc::default();
        let mut speech = SpeechDispatcher::new(
            FakeLocal {
                supported: true,
                speaking: false,
                log: log.clone(),
            },
            crate::speech::NoRemote,
            FakePlayer {
                playing: false,
                log: log.clone(),
            },
        );
        assert_eq!(
            speech.speak("Hi", VoiceProvider::GoogleUs),
            SpeechOutcome::FellBackToBrowser
        );
    }
}

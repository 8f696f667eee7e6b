//! Client for the speech-synthesis endpoint.
//!
//! Each request runs on its own thread so the tick loop only polls and a new
//! request never waits behind an abandoned one. Every request carries a
//! generation number; responses for an older generation are dropped, which is
//! how `cancel` keeps late audio from playing.

use std::{
    net::IpAddr,
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};

use log::{debug, warn};
use shadowdeck_core::speech::{RemoteSynthesizer, SynthesisError, SynthesisRequest};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

type Reply = (u64, Result<Vec<u8>, SynthesisError>);

#[derive(Debug)]
pub struct HttpSynthesizer {
    endpoint: String,
    client: Result<reqwest::blocking::Client, String>,
    reply_tx: Sender<Reply>,
    replies: Receiver<Reply>,
    generation: u64,
    in_flight: bool,
}

impl HttpSynthesizer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let (reply_tx, replies) = mpsc::channel::<Reply>();

        let mut builder = reqwest::blocking::Client::builder().timeout(REQUEST_TIMEOUT);
        if is_loopback(&endpoint) {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(|err| {
            warn!("speech: cannot build http client: {}", err);
            err.to_string()
        });

        Self {
            endpoint,
            client,
            reply_tx,
            replies,
            generation: 0,
            in_flight: false,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RemoteSynthesizer for HttpSynthesizer {
    fn begin(&mut self, request: &SynthesisRequest) -> Result<(), SynthesisError> {
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = false;

        let client = self
            .client
            .as_ref()
            .map_err(|message| SynthesisError::Transport(message.clone()))?
            .clone();
        let endpoint = self.endpoint.clone();
        let request = request.clone();
        let replies = self.reply_tx.clone();
        let generation = self.generation;
        let voice = request.voice.name.clone();

        thread::Builder::new()
            .name(format!("tts-http-{generation}"))
            .spawn(move || {
                let reply = fetch(&client, &endpoint, &request);
                if let Err(err) = &reply {
                    warn!("speech: synthesis failed: {}", err);
                }
                // The synthesizer may be gone already.
                let _ = replies.send((generation, reply));
            })
            .map_err(|err| SynthesisError::Transport(err.to_string()))?;

        debug!("speech: request generation={} voice={}", generation, voice);
        self.in_flight = true;
        Ok(())
    }

    fn cancel(&mut self) {
        if self.in_flight {
            debug!("speech: drop request generation={}", self.generation);
        }
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = false;
    }

    fn poll(&mut self) -> Option<Result<Vec<u8>, SynthesisError>> {
        if !self.in_flight {
            // Drain stale replies so they never pile up.
            while self.replies.try_recv().is_ok() {}
            return None;
        }

        while let Ok((generation, reply)) = self.replies.try_recv() {
            if generation == self.generation {
                self.in_flight = false;
                return Some(reply);
            }
            debug!("speech: discard stale reply generation={}", generation);
        }
        None
    }
}

fn fetch(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    request: &SynthesisRequest,
) -> Result<Vec<u8>, SynthesisError> {
    let response = client
        .post(endpoint)
        .json(request)
        .send()
        .map_err(|err| SynthesisError::Transport(err.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .bytes()
        .map_err(|err| SynthesisError::Transport(err.to_string()))?;

    decode_response(status, &body)
}

/// Local development endpoints bypass any system proxy.
fn is_loopback(endpoint: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(endpoint) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    host.eq_ignore_ascii_case("localhost")
        || host
            .trim_matches(['[', ']'])
            .parse::<IpAddr>()
            .is_ok_and(|addr| addr.is_loopback())
}

/// Audio bytes on success, a classified error otherwise.
pub fn decode_response(status: u16, body: &[u8]) -> Result<Vec<u8>, SynthesisError> {
    if (200..300).contains(&status) {
        Ok(body.to_vec())
    } else {
        Err(SynthesisError::from_response(status, body))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Read, Write},
        net::{TcpListener, TcpStream},
        time::Instant,
    };

    use shadowdeck_core::speech::VoiceProvider;

    use super::*;

    /// Read one HTTP request and return its JSON body.
    fn read_request(reader: &mut BufReader<TcpStream>) -> String {
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                break;
            }
            if let Some((name, value)) = trimmed.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut posted = vec![0u8; content_length];
        reader.read_exact(&mut posted).unwrap();
        String::from_utf8(posted).unwrap()
    }

    fn respond(stream: &mut TcpStream, status_line: &str, body: &[u8]) {
        write!(
            stream,
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .unwrap();
        stream.write_all(body).unwrap();
    }

    /// Serve one request with a fixed status and body, returning the posted
    /// JSON body to the test.
    fn serve_once(status_line: &'static str, body: &'static [u8]) -> (String, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            tx.send(read_request(&mut reader)).unwrap();
            respond(reader.get_mut(), status_line, body);
        });

        (format!("http://{addr}/api/tts"), rx)
    }

    fn wait_for_reply(synth: &mut HttpSynthesizer) -> Result<Vec<u8>, SynthesisError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(reply) = synth.poll() {
                return reply;
            }
            assert!(Instant::now() < deadline, "no reply from worker");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn request() -> SynthesisRequest {
        SynthesisRequest::new("Hello there", VoiceProvider::GoogleUk.remote_voice().unwrap())
    }

    #[test]
    fn success_returns_audio_bytes() {
        let (url, posted) = serve_once("200 OK", b"ID3fake-mpeg");
        let mut synth = HttpSynthesizer::new(url);
        synth.begin(&request()).unwrap();

        assert_eq!(wait_for_reply(&mut synth).unwrap(), b"ID3fake-mpeg");
        let body: serde_json::Value = serde_json::from_str(&posted.recv().unwrap()).unwrap();
        assert_eq!(body["voice"]["name"], "en-GB-Neural2-A");
        assert_eq!(body["text"], "Hello there");
        assert_eq!(synth.poll(), None);
    }

    #[test]
    fn quota_response_is_classified() {
        let (url, _posted) = serve_once("429 Too Many Requests", br#"{"error":"Quota exceeded."}"#);
        let mut synth = HttpSynthesizer::new(url);
        synth.begin(&request()).unwrap();
        assert_eq!(
            wait_for_reply(&mut synth),
            Err(SynthesisError::QuotaExceeded("Quota exceeded.".to_string()))
        );
    }

    #[test]
    fn cancelled_request_never_reports() {
        let (url, posted) = serve_once("200 OK", b"late");
        let mut synth = HttpSynthesizer::new(url);
        synth.begin(&request()).unwrap();
        synth.cancel();

        posted.recv().unwrap();
        thread::sleep(Duration::from_millis(200));
        assert_eq!(synth.poll(), None);
    }

    #[test]
    fn new_request_does_not_wait_for_a_cancelled_one() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().take(2) {
                let stream = stream.unwrap();
                thread::spawn(move || {
                    let mut reader = BufReader::new(stream);
                    let posted = read_request(&mut reader);
                    if posted.contains("slow") {
                        thread::sleep(Duration::from_secs(3));
                        respond(reader.get_mut(), "200 OK", b"slow-audio");
                    } else {
                        respond(reader.get_mut(), "200 OK", b"fast-audio");
                    }
                });
            }
        });

        let voice = VoiceProvider::GoogleUk.remote_voice().unwrap();
        let mut synth = HttpSynthesizer::new(format!("http://{addr}/api/tts"));
        synth.begin(&SynthesisRequest::new("slow line", voice)).unwrap();
        synth.cancel();

        let started = Instant::now();
        synth.begin(&SynthesisRequest::new("next line", voice)).unwrap();
        assert_eq!(wait_for_reply(&mut synth).unwrap(), b"fast-audio");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut synth = HttpSynthesizer::new(format!("http://{addr}/api/tts"));
        synth.begin(&request()).unwrap();
        assert!(matches!(
            wait_for_reply(&mut synth),
            Err(SynthesisError::Transport(_))
        ));
    }

    #[test]
    fn loopback_endpoints_are_detected() {
        assert!(is_loopback("http://127.0.0.1:3000/api/tts"));
        assert!(is_loopback("http://localhost/api/tts"));
        assert!(!is_loopback("https://example.com/api/tts"));
        assert!(!is_loopback("not a url"));
    }

    #[test]
    fn decode_maps_non_success_statuses() {
        assert_eq!(decode_response(200, b"mp3"), Ok(b"mp3".to_vec()));
        assert!(matches!(
            decode_response(400, br#"{"error":"Text and voice configuration are required"}"#),
            Err(SynthesisError::BadRequest(_))
        ));
        assert!(matches!(
            decode_response(500, b"{}"),
            Err(SynthesisError::Status { status: 500, .. })
        ));
    }
}

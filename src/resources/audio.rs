//! Audio transcription API.
//!
//! Requests are multipart forms rather than JSON, so this resource does not
//! go through [`Endpoint`](crate::client::Endpoint).

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::client::{ClientError, MistralClient};
use crate::model::UsageInfo;
use crate::stream::ChunkStream;

const TRANSCRIPTIONS_PATH: &str = "/v1/audio/transcriptions";

/// Handle for `/v1/audio`, obtained from [`MistralClient::audio`].
#[derive(Debug, Clone, Copy)]
pub struct Audio<'a> {
    client: &'a MistralClient,
}

impl<'a> Audio<'a> {
    pub(crate) fn new(client: &'a MistralClient) -> Self {
        Self { client }
    }

    /// Transcribe audio and wait for the full text.
    pub async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionResponse, ClientError> {
        let form = request.into_form(false)?;
        self.client.send_multipart(TRANSCRIPTIONS_PATH, form).await
    }

    /// Transcribe audio, streaming text as it is recognised.
    pub async fn transcribe_stream(
        &self,
        request: TranscriptionRequest,
    ) -> Result<ChunkStream<TranscriptionEvent>, ClientError> {
        let form = request.into_form(true)?;
        self.client.send_multipart_stream(TRANSCRIPTIONS_PATH, form).await
    }
}

/// Where the audio to transcribe comes from.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Upload the bytes with the request.
    File { file_name: String, bytes: Vec<u8> },
    /// Public URL the service downloads.
    Url(String),
    /// A file previously uploaded to the files API.
    FileId(String),
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimestampGranularity {
    Segment,
}

impl TimestampGranularity {
    fn as_str(self) -> &'static str {
        match self {
            TimestampGranularity::Segment => "segment",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub model: String,
    pub source: Option<AudioSource>,
    /// ISO-639-1 code; improves accuracy when known
    pub language: Option<String>,
    pub temperature: Option<f32>,
    pub timestamp_granularities: Vec<TimestampGranularity>,
}

impl TranscriptionRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            source: None,
            language: None,
            temperature: None,
            timestamp_granularities: Vec::new(),
        }
    }

    pub fn with_file(mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.source = Some(AudioSource::File {
            file_name: file_name.into(),
            bytes,
        });
        self
    }

    pub fn with_file_url(mut self, url: impl Into<String>) -> Self {
        self.source = Some(AudioSource::Url(url.into()));
        self
    }

    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.source = Some(AudioSource::FileId(file_id.into()));
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timestamp_granularity(mut self, granularity: TimestampGranularity) -> Self {
        self.timestamp_granularities.push(granularity);
        self
    }

    /// Text fields of the form, in the order they are sent.
    fn text_fields(&self, stream: bool) -> Vec<(&'static str, String)> {
        let mut fields = vec![("model", self.model.clone())];

        match &self.source {
            Some(AudioSource::Url(url)) => fields.push(("file_url", url.clone())),
            Some(AudioSource::FileId(id)) => fields.push(("file_id", id.clone())),
            Some(AudioSource::File { .. }) | None => {}
        }
        if let Some(language) = &self.language {
            fields.push(("language", language.clone()));
        }
        if let Some(temperature) = self.temperature {
            fields.push(("temperature", temperature.to_string()));
        }
        for granularity in &self.timestamp_granularities {
            fields.push(("timestamp_granularities", granularity.as_str().to_string()));
        }
        if stream {
            fields.push(("stream", "true".to_string()));
        }

        fields
    }

    fn into_form(self, stream: bool) -> Result<Form, ClientError> {
        if self.source.is_none() {
            return Err(ClientError::Config(
                "transcription requires a file, file URL or file id".to_string(),
            ));
        }

        let mut form = self
            .text_fields(stream)
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        if let Some(AudioSource::File { file_name, bytes }) = self.source {
            form = form.part("file", Part::bytes(bytes).file_name(file_name));
        }

        Ok(form)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TranscriptionSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResponse {
    pub model: String,
    pub text: String,
    pub language: Option<String>,
    #[serde(default)]
    pub segments: Vec<TranscriptionSegment>,
    #[serde(default)]
    pub usage: UsageInfo,
}

/// One event of a streamed transcription.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum TranscriptionEvent {
    #[serde(rename = "transcription.language")]
    Language { audio_language: String },
    #[serde(rename = "transcription.segment")]
    Segment {
        text: String,
        start: f64,
        end: f64,
    },
    #[serde(rename = "transcription.text.delta")]
    TextDelta { text: String },
    #[serde(rename = "transcription.done")]
    Done {
        model: String,
        text: String,
        language: Option<String>,
        #[serde(default)]
        segments: Vec<TranscriptionSegment>,
        #[serde(default)]
        usage: UsageInfo,
    },
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requires_source() {
        let err = TranscriptionRequest::new("voxtral-mini-latest").into_form(false).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_text_fields() {
        let request = TranscriptionRequest::new("voxtral-mini-latest")
            .with_file_url("https://example.com/call.mp3")
            .with_language("en")
            .with_timestamp_granularity(TimestampGranularity::Segment);

        assert_eq!(
            request.text_fields(true),
            vec![
                ("model", "voxtral-mini-latest".to_string()),
                ("file_url", "https://example.com/call.mp3".to_string()),
                ("language", "en".to_string()),
                ("timestamp_granularities", "segment".to_string()),
                ("stream", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_uploaded_file_is_not_a_text_field() {
        let request =
            TranscriptionRequest::new("voxtral-mini-latest").with_file("a.wav", vec![0, 1, 2]);
        assert_eq!(
            request.text_fields(false),
            vec![("model", "voxtral-mini-latest".to_string())]
        );
        assert!(request.into_form(false).is_ok());
    }

    #[test]
    fn test_stream_events() {
        let events: Vec<TranscriptionEvent> = serde_json::from_value(json!([
            {"type": "transcription.language", "audio_language": "en"},
            {"type": "transcription.text.delta", "text": "Hello"},
            {"type": "transcription.segment", "text": "Hello", "start": 0.0, "end": 0.8},
            {"type": "transcription.done", "model": "voxtral-mini-latest", "text": "Hello",
             "language": "en", "usage": {"prompt_audio_seconds": 1.5}},
            {"type": "transcription.partial"}
        ]))
        .unwrap();

        assert_eq!(events[0], TranscriptionEvent::Language { audio_language: "en".to_string() });
        assert_eq!(events[1], TranscriptionEvent::TextDelta { text: "Hello".to_string() });
        assert!(matches!(
            &events[3],
            TranscriptionEvent::Done { usage, .. } if usage.prompt_audio_seconds == Some(1.5)
        ));
        assert_eq!(events[4], TranscriptionEvent::Unknown);
    }
}

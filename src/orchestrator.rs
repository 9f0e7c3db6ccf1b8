//! Pipeline orchestrator for Recap.
//!
//! Runs one digest request through the stages:
//!
//! ```text
//! Validating -> Extracting -> Transcribing --\
//!            \-> FetchingMetadata -----------+-> Summarizing -> Done
//! ```
//!
//! Extraction and transcription form one branch, metadata retrieval another;
//! both run concurrently and meet at a join before summarization. Any stage
//! failure ends the request after the audio artifact has been cleaned up.

use crate::audio::{AudioArtifact, AudioExtractor, YtDlpExtractor};
use crate::config::{Prompts, Settings, StageTimeouts};
use crate::error::{RecapError, Result, Stage};
use crate::metadata::{HtmlMetadataFetcher, Metadata, MetadataFetcher};
use crate::openai::create_client;
use crate::request::{validate_url, DigestRequest, Length, Style};
use crate::summary::{build_prompt, ChatSummarizer, Summarizer};
use crate::transcription::{transcribe_artifact, Transcriber, WhisperTranscriber};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// The assembled result of a successful request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub transcription: String,
    pub metadata: Metadata,
    pub summary: String,
}

/// The main orchestrator for the Recap pipeline.
pub struct Pipeline {
    extractor: Arc<dyn AudioExtractor>,
    transcriber: Arc<dyn Transcriber>,
    metadata: Arc<dyn MetadataFetcher>,
    summarizer: Arc<dyn Summarizer>,
    prompts: Prompts,
    timeouts: StageTimeouts,
    default_style: Style,
    default_length: Length,
}

impl Pipeline {
    /// Create a pipeline backed by yt-dlp, the configured provider and HTTP scraping.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let client = create_client(&settings.provider)?;

        let temp_dir = settings.temp_dir();

        info!(
            "Using {} for transcription and {} for summaries via {}",
            settings.transcription.model, settings.summary.model, settings.provider.api_base
        );

        let extractor = Arc::new(YtDlpExtractor::with_config(temp_dir, &settings.extraction));
        let transcriber = Arc::new(WhisperTranscriber::new(
            client.clone(),
            &settings.transcription.model,
        ));
        let metadata = Arc::new(HtmlMetadataFetcher::with_config(&settings.metadata)?);
        let summarizer = Arc::new(ChatSummarizer::new(client, &settings.summary.model));

        Ok(Self::with_components(extractor, transcriber, metadata, summarizer)
            .with_prompts(prompts)
            .with_timeouts(StageTimeouts::from(settings))
            .with_defaults(settings.summary.default_style, settings.summary.default_length))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        extractor: Arc<dyn AudioExtractor>,
        transcriber: Arc<dyn Transcriber>,
        metadata: Arc<dyn MetadataFetcher>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            extractor,
            transcriber,
            metadata,
            summarizer,
            prompts: Prompts::default(),
            timeouts: StageTimeouts::default(),
            default_style: Style::default(),
            default_length: Length::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_defaults(mut self, style: Style, length: Length) -> Self {
        self.default_style = style;
        self.default_length = length;
        self
    }

    /// Build a request from loosely-typed inputs using this pipeline's defaults.
    pub fn request(
        &self,
        url: Option<&str>,
        style: Option<&str>,
        length: Option<&str>,
    ) -> Result<DigestRequest> {
        DigestRequest::from_parts(url, style, length, self.default_style, self.default_length)
            .inspect_err(|e| warn!(stage = %Stage::Validating, "Rejected request: {}", e))
    }

    /// Run a request through every stage.
    ///
    /// Failures are logged with their stage and cause; callers should show
    /// only [`RecapError::public_message`].
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn process(&self, request: &DigestRequest) -> Result<Digest> {
        let result = self.run(request).await;

        match &result {
            Ok(_) => info!(stage = %Stage::Done, "Digest ready"),
            Err(e) => error!(
                stage = %e.stage().map(|s| s.to_string()).unwrap_or_else(|| "internal".into()),
                "Pipeline failed: {}",
                e
            ),
        }

        result
    }

    async fn run(&self, request: &DigestRequest) -> Result<Digest> {
        info!(stage = %Stage::Validating, "Validating request");
        validate_url(&request.url)?;

        let audio_branch = async {
            info!(stage = %Stage::Extracting, "Extracting audio");
            let artifact = match self.extractor.extract(&request.url).await {
                Ok(artifact) => artifact,
                Err(e) => return (None, Err(e)),
            };

            info!(stage = %Stage::Transcribing, "Transcribing audio");
            let transcript = bounded(
                Stage::Transcribing,
                self.timeouts.transcription,
                transcribe_artifact(self.transcriber.as_ref(), &artifact),
            )
            .await;

            (Some(artifact), transcript)
        };

        let metadata_branch = async {
            info!(stage = %Stage::FetchingMetadata, "Fetching metadata");
            bounded(
                Stage::FetchingMetadata,
                self.timeouts.metadata,
                self.metadata.fetch(&request.url),
            )
            .await
        };

        let ((artifact, transcript), metadata) = tokio::join!(audio_branch, metadata_branch);

        self.cleanup(artifact).await;

        let transcript = transcript?;
        let metadata = metadata?;

        info!(stage = %Stage::Summarizing, "Summarizing content");
        let budget = request.token_budget();
        let prompt = build_prompt(&self.prompts, &transcript, &metadata, request.style, budget);
        let summary = bounded(
            Stage::Summarizing,
            self.timeouts.summary,
            self.summarizer.summarize(&prompt, budget),
        )
        .await?;

        Ok(Digest {
            transcription: transcript,
            metadata,
            summary,
        })
    }

    /// Runs once per request after the join, with or without an artifact.
    async fn cleanup(&self, artifact: Option<AudioArtifact>) {
        if let Err(e) = self.extractor.cleanup(artifact).await {
            warn!("Failed to clean up audio artifact: {}", e);
        }
    }
}

/// Bound a stage future by `limit`, reporting expiry as that stage's timeout.
async fn bounded<T>(
    stage: Stage,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(RecapError::Timeout {
            stage,
            seconds: limit.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PROCESSING_FAILED_MESSAGE;
    use crate::summary::NO_SUMMARY;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tokio::sync::Barrier;

    #[derive(Default)]
    struct FakeExtractor {
        dir: Option<TempDir>,
        fail: bool,
        rendezvous: Option<Arc<Barrier>>,
        extract_calls: AtomicUsize,
        cleanup_calls: AtomicUsize,
        created: Mutex<Vec<PathBuf>>,
    }

    impl FakeExtractor {
        fn working() -> Self {
            Self {
                dir: Some(tempfile::tempdir().unwrap()),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::working()
            }
        }

        fn created(&self) -> Vec<PathBuf> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AudioExtractor for FakeExtractor {
        async fn extract(&self, _url: &str) -> Result<AudioArtifact> {
            let n = self.extract_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(barrier) = &self.rendezvous {
                barrier.wait().await;
            }
            if self.fail {
                return Err(RecapError::ExtractionFailed("yt-dlp exited with 1".into()));
            }
            let path = self.dir.as_ref().unwrap().path().join(format!("audio-{n}.mp3"));
            std::fs::write(&path, b"fake mp3").unwrap();
            self.created.lock().unwrap().push(path.clone());
            Ok(AudioArtifact::new(path))
        }

        async fn cleanup(&self, artifact: Option<AudioArtifact>) -> Result<()> {
            self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(artifact) = artifact {
                artifact.delete().await?;
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeTranscriber {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, _file_name: &str, _audio: Vec<u8>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RecapError::TranscriptionFailed("upstream 503".into()));
            }
            Ok("hello world".to_string())
        }
    }

    #[derive(Default)]
    struct FakeMetadata {
        fail: bool,
        delay: Option<Duration>,
        rendezvous: Option<Arc<Barrier>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataFetcher for FakeMetadata {
        async fn fetch(&self, _url: &str) -> Result<Metadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(barrier) = &self.rendezvous {
                barrier.wait().await;
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(RecapError::MetadataFailed("connection reset".into()));
            }
            Ok(Metadata {
                title: "T".to_string(),
                description: "D".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct FakeSummarizer {
        reply: Option<String>,
        fail: bool,
        calls: AtomicUsize,
        seen: Mutex<Option<(String, u32)>>,
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(&self, prompt: &str, max_tokens: u32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen.lock().unwrap() = Some((prompt.to_string(), max_tokens));
            if self.fail {
                return Err(RecapError::SummarizationFailed("401 invalid key".into()));
            }
            Ok(crate::summary::summary_or_fallback(self.reply.clone()))
        }
    }

    struct Fixture {
        extractor: Arc<FakeExtractor>,
        transcriber: Arc<FakeTranscriber>,
        metadata: Arc<FakeMetadata>,
        summarizer: Arc<FakeSummarizer>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                extractor: Arc::new(FakeExtractor::working()),
                transcriber: Arc::new(FakeTranscriber::default()),
                metadata: Arc::new(FakeMetadata::default()),
                summarizer: Arc::new(FakeSummarizer {
                    reply: Some("A tidy summary.".to_string()),
                    ..FakeSummarizer::default()
                }),
            }
        }

        fn pipeline(&self) -> Pipeline {
            Pipeline::with_components(
                self.extractor.clone(),
                self.transcriber.clone(),
                self.metadata.clone(),
                self.summarizer.clone(),
            )
        }

        fn external_calls(&self) -> usize {
            self.extractor.extract_calls.load(Ordering::SeqCst)
                + self.transcriber.calls.load(Ordering::SeqCst)
                + self.metadata.calls.load(Ordering::SeqCst)
                + self.summarizer.calls.load(Ordering::SeqCst)
        }

        fn assert_artifacts_gone(&self) {
            for path in self.extractor.created() {
                assert!(!path.exists(), "{} was left behind", path.display());
            }
        }
    }

    fn request(style: &str, length: &str) -> DigestRequest {
        DigestRequest::from_parts(
            Some("https://www.youtube.com/watch?v=abc123"),
            Some(style),
            Some(length),
            Style::Formal,
            Length::Medium,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_bullet_points_short_scenario() {
        let fx = Fixture::new();
        let digest = fx
            .pipeline()
            .process(&request("bullet-points", "short"))
            .await
            .unwrap();

        assert_eq!(digest.transcription, "hello world");
        assert_eq!(digest.metadata.title, "T");
        assert_eq!(digest.metadata.description, "D");
        assert_eq!(digest.summary, "A tidy summary.");

        let (prompt, budget) = fx.summarizer.seen.lock().unwrap().clone().unwrap();
        assert_eq!(budget, 100);
        assert!(prompt.contains("using bullet points"));
        assert!(prompt.contains("Title: T\n"));
        assert!(prompt.contains("Description: D\n"));
        assert!(prompt.contains("hello world"));
        assert!(prompt.contains("100"));

        assert_eq!(fx.extractor.cleanup_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.extractor.created().len(), 1);
        fx.assert_artifacts_gone();
    }

    #[tokio::test]
    async fn test_invalid_url_touches_nothing() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline();

        let err = pipeline.request(Some("not-a-video-url"), None, None).unwrap_err();
        assert!(matches!(err, RecapError::InvalidInput(_)));

        let direct = DigestRequest::new("not-a-video-url", Style::Formal, Length::Medium);
        let err = pipeline.process(&direct).await.unwrap_err();
        assert!(matches!(err, RecapError::InvalidInput(_)));
        assert_eq!(err.stage(), Some(Stage::Validating));

        assert_eq!(fx.external_calls(), 0);
        assert_eq!(fx.extractor.cleanup_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_still_cleans_up_once() {
        let fx = Fixture {
            extractor: Arc::new(FakeExtractor::failing()),
            ..Fixture::new()
        };

        let err = fx
            .pipeline()
            .process(&request("formal", "medium"))
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::ExtractionFailed(_)));
        assert_eq!(err.public_message(), PROCESSING_FAILED_MESSAGE);
        assert_eq!(fx.extractor.cleanup_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.transcriber.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.summarizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_audio_error_wins_when_both_branches_fail() {
        let fx = Fixture {
            extractor: Arc::new(FakeExtractor::failing()),
            metadata: Arc::new(FakeMetadata { fail: true, ..Default::default() }),
            ..Fixture::new()
        };

        let err = fx
            .pipeline()
            .process(&request("formal", "medium"))
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::ExtractionFailed(_)));
        assert_eq!(fx.metadata.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.extractor.cleanup_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.summarizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_metadata_runs_alongside_extraction() {
        // Neither fake returns until the other has started
        let barrier = Arc::new(Barrier::new(2));
        let fx = Fixture {
            extractor: Arc::new(FakeExtractor {
                rendezvous: Some(barrier.clone()),
                ..FakeExtractor::working()
            }),
            metadata: Arc::new(FakeMetadata {
                rendezvous: Some(barrier),
                ..Default::default()
            }),
            ..Fixture::new()
        };

        let digest = tokio::time::timeout(
            Duration::from_secs(5),
            fx.pipeline().process(&request("formal", "medium")),
        )
        .await
        .expect("branches ran one after the other")
        .unwrap();

        assert_eq!(digest.metadata.title, "T");
        fx.assert_artifacts_gone();
    }

    #[tokio::test]
    async fn test_transcription_failure_deletes_artifact() {
        let fx = Fixture {
            transcriber: Arc::new(FakeTranscriber { fail: true, ..Default::default() }),
            ..Fixture::new()
        };

        let err = fx
            .pipeline()
            .process(&request("casual", "detailed"))
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::TranscriptionFailed(_)));
        assert_eq!(fx.extractor.cleanup_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.extractor.created().len(), 1);
        fx.assert_artifacts_gone();
        assert_eq!(fx.summarizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_metadata_failure_deletes_artifact() {
        let fx = Fixture {
            metadata: Arc::new(FakeMetadata { fail: true, ..Default::default() }),
            ..Fixture::new()
        };

        let err = fx
            .pipeline()
            .process(&request("technical", "short"))
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::MetadataFailed(_)));
        assert_eq!(fx.extractor.cleanup_calls.load(Ordering::SeqCst), 1);
        fx.assert_artifacts_gone();
        assert_eq!(fx.summarizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_summarization_failure_after_cleanup() {
        let fx = Fixture {
            summarizer: Arc::new(FakeSummarizer { fail: true, ..Default::default() }),
            ..Fixture::new()
        };

        let err = fx
            .pipeline()
            .process(&request("formal", "medium"))
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::SummarizationFailed(_)));
        assert_eq!(err.public_message(), PROCESSING_FAILED_MESSAGE);
        assert_eq!(fx.extractor.cleanup_calls.load(Ordering::SeqCst), 1);
        fx.assert_artifacts_gone();
    }

    #[tokio::test]
    async fn test_empty_generation_is_not_an_error() {
        let fx = Fixture {
            summarizer: Arc::new(FakeSummarizer::default()),
            ..Fixture::new()
        };

        let digest = fx
            .pipeline()
            .process(&request("formal", "medium"))
            .await
            .unwrap();
        assert_eq!(digest.summary, NO_SUMMARY);
    }

    #[tokio::test]
    async fn test_unknown_style_falls_back_to_neutral_template() {
        let fx = Fixture::new();
        fx.pipeline()
            .process(&request("limerick", "medium"))
            .await
            .unwrap();

        let (prompt, budget) = fx.summarizer.seen.lock().unwrap().clone().unwrap();
        assert_eq!(budget, 250);
        assert!(prompt.starts_with("Summarize and explain the content based on:"));
    }

    #[tokio::test]
    async fn test_metadata_timeout_maps_to_stage() {
        let fx = Fixture {
            metadata: Arc::new(FakeMetadata {
                delay: Some(Duration::from_secs(5)),
                ..Default::default()
            }),
            ..Fixture::new()
        };
        let timeouts = StageTimeouts {
            metadata: Duration::from_millis(20),
            ..StageTimeouts::default()
        };

        let err = fx
            .pipeline()
            .with_timeouts(timeouts)
            .process(&request("formal", "medium"))
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::Timeout { stage: Stage::FetchingMetadata, .. }));
        assert_eq!(fx.extractor.cleanup_calls.load(Ordering::SeqCst), 1);
        fx.assert_artifacts_gone();
    }

    #[tokio::test]
    async fn test_concurrent_requests_use_distinct_artifacts() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline();
        let req = request("formal", "short");

        let (a, b) = tokio::join!(pipeline.process(&req), pipeline.process(&req));
        assert!(a.is_ok() && b.is_ok());

        let created = fx.extractor.created();
        assert_eq!(created.len(), 2);
        assert_ne!(created[0], created[1]);
        assert_eq!(fx.extractor.cleanup_calls.load(Ordering::SeqCst), 2);
        fx.assert_artifacts_gone();
    }
}

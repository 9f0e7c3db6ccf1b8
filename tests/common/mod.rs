use async_trait::async_trait;
use recap::audio::{AudioArtifact, AudioExtractor};
use recap::cli::commands::build_router;
use recap::metadata::{Metadata, MetadataFetcher};
use recap::orchestrator::Pipeline;
use recap::summary::Summarizer;
use recap::transcription::Transcriber;
use recap::{RecapError, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
pub struct Calls {
    pub extract: AtomicUsize,
    pub cleanup: AtomicUsize,
    pub transcribe: AtomicUsize,
    pub metadata: AtomicUsize,
    pub summarize: AtomicUsize,
    pub artifacts: Mutex<Vec<PathBuf>>,
    pub last_prompt: Mutex<Option<(String, u32)>>,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn external(&self) -> usize {
        Self::get(&self.extract)
            + Self::get(&self.transcribe)
            + Self::get(&self.metadata)
            + Self::get(&self.summarize)
    }
}

pub struct Extractor {
    pub dir: TempDir,
    pub fail: bool,
    pub calls: Arc<Calls>,
}

#[async_trait]
impl AudioExtractor for Extractor {
    async fn extract(&self, _url: &str) -> Result<AudioArtifact> {
        let n = self.calls.extract.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RecapError::ExtractionFailed("unsupported URL".into()));
        }
        let path = self.dir.path().join(format!("clip-{n}.mp3"));
        std::fs::write(&path, b"fake mp3 bytes")?;
        self.calls.artifacts.lock().unwrap().push(path.clone());
        Ok(AudioArtifact::new(path))
    }

    async fn cleanup(&self, artifact: Option<AudioArtifact>) -> Result<()> {
        self.calls.cleanup.fetch_add(1, Ordering::SeqCst);
        if let Some(artifact) = artifact {
            artifact.delete().await?;
        }
        Ok(())
    }
}

pub struct FixedTranscriber(pub Arc<Calls>);

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _file_name: &str, _audio: Vec<u8>) -> Result<String> {
        self.0.transcribe.fetch_add(1, Ordering::SeqCst);
        Ok("hello world".to_string())
    }
}

pub struct FixedMetadata(pub Arc<Calls>);

#[async_trait]
impl MetadataFetcher for FixedMetadata {
    async fn fetch(&self, _url: &str) -> Result<Metadata> {
        self.0.metadata.fetch_add(1, Ordering::SeqCst);
        Ok(Metadata {
            title: "T".to_string(),
            description: "D".to_string(),
        })
    }
}

pub struct EchoSummarizer(pub Arc<Calls>);

#[async_trait]
impl Summarizer for EchoSummarizer {
    async fn summarize(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.0.summarize.fetch_add(1, Ordering::SeqCst);
        *self.0.last_prompt.lock().unwrap() = Some((prompt.to_string(), max_tokens));
        Ok(format!("summary in {max_tokens} tokens"))
    }
}

/// Serve a pipeline of fakes on an ephemeral port.
pub async fn setup_test_server(
    extraction_fails: bool,
) -> std::result::Result<(Arc<Calls>, String, reqwest::Client), Box<dyn std::error::Error>> {
    let calls = Arc::new(Calls::default());

    let pipeline = Pipeline::with_components(
        Arc::new(Extractor {
            dir: tempfile::tempdir()?,
            fail: extraction_fails,
            calls: calls.clone(),
        }),
        Arc::new(FixedTranscriber(calls.clone())),
        Arc::new(FixedMetadata(calls.clone())),
        Arc::new(EchoSummarizer(calls.clone())),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = build_router(Arc::new(pipeline));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((calls, format!("http://{}", addr), reqwest::Client::new()))
}

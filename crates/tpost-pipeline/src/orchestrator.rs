//! Pipeline orchestration: stage sequencing, the image fork/join, and
//! per-stage recoverability.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use tpost_gateway::{EnrichmentSource, LlmGateway, MediaRef};
use tpost_models::{BlogDraft, GenerationRequest, ImageArtifact, SearchTermSet, SummaryArtifact};
use tpost_storage::MediaStore;

use crate::error::{PipelineResult, Stage, StageError};
use crate::image::{decode_image_payload, ImageBranch};
use crate::prompts::{self, ComposeInput};
use crate::stage::StageRunner;

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub draft: BlogDraft,
    /// Durable URL of the uploaded header image, when one was produced.
    pub image_url: Option<String>,
}

/// Runs the five-stage generation sequence.
///
/// Text stages (summarize, search terms, enrich, compose) are fatal on
/// failure. The image branch is spawned concurrently with the text
/// branch when requested and every failure inside it — generation,
/// decode, upload, reachability — degrades to "no image".
pub struct PipelineOrchestrator {
    stages: StageRunner,
    enrichment: Arc<dyn EnrichmentSource>,
    image: ImageBranch,
    store: Arc<dyn MediaStore>,
}

impl PipelineOrchestrator {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        enrichment: Arc<dyn EnrichmentSource>,
        store: Arc<dyn MediaStore>,
        image_models: Vec<String>,
    ) -> Self {
        Self {
            stages: StageRunner::new(Arc::clone(&gateway)),
            enrichment,
            image: ImageBranch::new(gateway, image_models),
            store,
        }
    }

    /// Run the full pipeline for one accepted request.
    ///
    /// `author_id` only namespaces the uploaded image object key; the
    /// caller owns persistence of the returned draft.
    pub async fn run(
        &self,
        author_id: &str,
        request: &GenerationRequest,
    ) -> PipelineResult<PipelineOutput> {
        // SUMMARIZE: everything downstream depends on it.
        let media = MediaRef::video(&request.video_reference);
        let summary: SummaryArtifact = self
            .stages
            .run(Stage::Summarize, request, prompts::summarize_prompt, Some(&media))
            .await?;

        if summary.is_empty() {
            return Err(StageError::validation(Stage::Summarize, "empty summary"));
        }
        info!(chars = summary.summary.len(), "Summary stage complete");

        // Fork: the image branch runs concurrently with the remaining
        // text stages and is not awaited until the join point.
        let image_task = if request.generate_image {
            let branch = self.image.clone();
            let summary_text = summary.summary.clone();
            Some(tokio::spawn(
                async move { branch.generate(&summary_text).await },
            ))
        } else {
            None
        };

        // SEARCH_TERMS: must produce exactly three usable terms.
        let terms: SearchTermSet = self
            .stages
            .run(Stage::SearchTerms, &summary, |s| prompts::search_terms_prompt(&s.summary), None)
            .await?;

        if !terms.is_valid() {
            return Err(StageError::validation(
                Stage::SearchTerms,
                format!(
                    "expected exactly 3 non-empty search terms, got {}",
                    terms.search_terms.len()
                ),
            ));
        }

        // ENRICH: the tool call is fatal on failure, same as the other
        // text stages.
        let enrichment = self
            .enrichment
            .fetch(&terms)
            .await
            .map_err(|e| StageError::from_gateway(Stage::Enrich, e))?;

        if !enrichment.is_complete() {
            return Err(StageError::validation(
                Stage::Enrich,
                "enrichment left one or more slots empty",
            ));
        }

        // COMPOSE: needs both title and content.
        let compose_input = ComposeInput {
            summary: summary.summary,
            terms,
            enrichment,
            length: request.length,
            tone: request.tone,
            content_type: request.content_type,
        };
        let draft: BlogDraft = self
            .stages
            .run(Stage::Compose, &compose_input, prompts::compose_prompt, None)
            .await?;

        if !draft.is_complete() {
            return Err(StageError::validation(
                Stage::Compose,
                "draft is missing title or content",
            ));
        }

        // JOIN: the text branch has succeeded; the image branch's
        // outcome can only add to the result, never sink it.
        let image = match image_task {
            Some(handle) => handle.await.unwrap_or_else(|e| {
                error!(error = %e, "Image branch task failed");
                None
            }),
            None => None,
        };

        let image_url = match image {
            Some(image) => self.store_image(author_id, image).await,
            None => None,
        };

        Ok(PipelineOutput { draft, image_url })
    }

    /// Decode, upload and verify a generated image.
    ///
    /// Any failure here records the image as absent.
    async fn store_image(&self, author_id: &str, image: ImageArtifact) -> Option<String> {
        let bytes = match decode_image_payload(&image.data) {
            Some(bytes) => bytes,
            None => {
                warn!("Generated image payload is not decodable, dropping it");
                return None;
            }
        };

        let key = format!("blog-images/{}/{}.png", author_id, Uuid::new_v4());
        let url = match self.store.upload_image(&key, bytes, "image/png").await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Image upload failed, dropping image");
                return None;
            }
        };

        match self.store.probe_url(&url).await {
            Ok(true) => Some(url),
            Ok(false) => {
                warn!(url = %url, "Uploaded image is not reachable, dropping image");
                None
            }
            Err(e) => {
                warn!(error = %e, "Image reachability probe failed, dropping image");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tpost_gateway::{GatewayError, GatewayResult};
    use tpost_models::SearchEnrichment;
    use tpost_storage::{StorageError, StorageResult};

    fn request(generate_image: bool) -> GenerationRequest {
        serde_json::from_value(serde_json::json!({
            "videoReference": "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "generateImage": generate_image,
        }))
        .unwrap()
    }

    /// Scripted gateway: answers each text stage from a canned map and
    /// records call order.
    struct ScriptedGateway {
        calls: Mutex<Vec<String>>,
        terms: serde_json::Value,
        compose: serde_json::Value,
        image: GatewayResult<Option<ImageArtifact>>,
        image_delay: Duration,
    }

    impl ScriptedGateway {
        fn ok() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                terms: serde_json::json!({"searchTerms": ["a", "b", "c"]}),
                compose: serde_json::json!({"title": "T", "content": "C"}),
                image: Ok(Some(ImageArtifact {
                    data: "aGVsbG8=".into(),
                    mime_type: Some("image/png".into()),
                })),
                image_delay: Duration::ZERO,
            }
        }

        fn record(&self, what: &str) {
            self.calls.lock().unwrap().push(what.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn generate_value(
            &self,
            prompt: &str,
            media: Option<&MediaRef>,
        ) -> GatewayResult<serde_json::Value> {
            // Yield so a concurrently spawned image task gets polled,
            // making call-order assertions deterministic.
            tokio::task::yield_now().await;
            if media.is_some() {
                self.record("summarize");
                return Ok(serde_json::json!({"summary": "a fine summary"}));
            }
            if prompt.contains("Extract exactly three search terms") {
                self.record("search_terms");
                return Ok(self.terms.clone());
            }
            self.record("compose");
            Ok(self.compose.clone())
        }

        async fn generate_image(
            &self,
            _model: &str,
            _prompt: &str,
        ) -> GatewayResult<Option<ImageArtifact>> {
            self.record("image");
            tokio::time::sleep(self.image_delay).await;
            match &self.image {
                Ok(img) => Ok(img.clone()),
                Err(_) => Err(GatewayError::Http {
                    status: 504,
                    body: "timeout".into(),
                }),
            }
        }
    }

    struct AlignedEnrichment {
        calls: Mutex<u32>,
    }

    impl AlignedEnrichment {
        fn new() -> Self {
            Self {
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl EnrichmentSource for AlignedEnrichment {
        async fn fetch(&self, terms: &SearchTermSet) -> GatewayResult<SearchEnrichment> {
            *self.calls.lock().unwrap() += 1;
            // Positional alignment: slot N enriches term N.
            Ok(SearchEnrichment {
                term1: format!("about {}", terms.search_terms[0]),
                term2: format!("about {}", terms.search_terms[1]),
                term3: format!("about {}", terms.search_terms[2]),
            })
        }
    }

    struct FailingEnrichment;

    #[async_trait]
    impl EnrichmentSource for FailingEnrichment {
        async fn fetch(&self, _terms: &SearchTermSet) -> GatewayResult<SearchEnrichment> {
            Err(GatewayError::stream("agent stream ended without any event"))
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        uploads: Mutex<Vec<String>>,
        fail_upload: bool,
        unreachable: bool,
    }

    #[async_trait]
    impl MediaStore for RecordingStore {
        async fn upload_image(
            &self,
            key: &str,
            _data: Vec<u8>,
            _content_type: &str,
        ) -> StorageResult<String> {
            if self.fail_upload {
                return Err(StorageError::upload_failed("bucket unavailable"));
            }
            self.uploads.lock().unwrap().push(key.to_string());
            Ok(format!("https://cdn.test/{key}"))
        }

        async fn probe_url(&self, _url: &str) -> StorageResult<bool> {
            Ok(!self.unreachable)
        }
    }

    fn orchestrator(
        gateway: Arc<ScriptedGateway>,
        enrichment: Arc<dyn EnrichmentSource>,
        store: Arc<RecordingStore>,
    ) -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            gateway as Arc<dyn LlmGateway>,
            enrichment,
            store as Arc<dyn MediaStore>,
            vec!["image-model".into()],
        )
    }

    #[tokio::test]
    async fn test_text_only_run_produces_draft_without_image() {
        let gateway = Arc::new(ScriptedGateway::ok());
        let store = Arc::new(RecordingStore::default());
        let orch = orchestrator(
            Arc::clone(&gateway),
            Arc::new(AlignedEnrichment::new()),
            Arc::clone(&store),
        );

        let output = orch.run("user-1", &request(false)).await.unwrap();
        assert_eq!(output.draft.title, "T");
        assert_eq!(output.draft.content, "C");
        assert!(output.image_url.is_none());
        // No image branch at all, and strict stage ordering.
        assert_eq!(gateway.calls(), vec!["summarize", "search_terms", "compose"]);
        assert!(store.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_two_terms_fail_the_run() {
        let mut gateway = ScriptedGateway::ok();
        gateway.terms = serde_json::json!({"searchTerms": ["a", "b"]});
        let orch = orchestrator(
            Arc::new(gateway),
            Arc::new(AlignedEnrichment::new()),
            Arc::new(RecordingStore::default()),
        );

        let err = orch.run("user-1", &request(false)).await.unwrap_err();
        assert!(matches!(err, StageError::Validation { .. }));
        assert_eq!(err.stage(), Stage::SearchTerms);
    }

    #[tokio::test]
    async fn test_four_terms_fail_the_run() {
        let mut gateway = ScriptedGateway::ok();
        gateway.terms = serde_json::json!({"searchTerms": ["a", "b", "c", "d"]});
        let orch = orchestrator(
            Arc::new(gateway),
            Arc::new(AlignedEnrichment::new()),
            Arc::new(RecordingStore::default()),
        );

        let err = orch.run("user-1", &request(false)).await.unwrap_err();
        assert_eq!(err.stage(), Stage::SearchTerms);
    }

    #[tokio::test]
    async fn test_enrichment_failure_is_fatal() {
        let orch = orchestrator(
            Arc::new(ScriptedGateway::ok()),
            Arc::new(FailingEnrichment),
            Arc::new(RecordingStore::default()),
        );

        let err = orch.run("user-1", &request(false)).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Enrich);
        assert!(matches!(err, StageError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_incomplete_draft_is_fatal() {
        let mut gateway = ScriptedGateway::ok();
        gateway.compose = serde_json::json!({"title": "", "content": "body"});
        let orch = orchestrator(
            Arc::new(gateway),
            Arc::new(AlignedEnrichment::new()),
            Arc::new(RecordingStore::default()),
        );

        let err = orch.run("user-1", &request(false)).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Compose);
    }

    #[tokio::test]
    async fn test_image_failure_never_sinks_the_run() {
        let mut gateway = ScriptedGateway::ok();
        gateway.image = Err(GatewayError::stream("unused"));
        let store = Arc::new(RecordingStore::default());
        let orch = orchestrator(
            Arc::new(gateway),
            Arc::new(AlignedEnrichment::new()),
            Arc::clone(&store),
        );

        let output = orch.run("user-1", &request(true)).await.unwrap();
        assert_eq!(output.draft.title, "T");
        assert!(output.image_url.is_none());
        assert!(store.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_image_is_uploaded_and_returned() {
        let gateway = Arc::new(ScriptedGateway::ok());
        let store = Arc::new(RecordingStore::default());
        let orch = orchestrator(
            Arc::clone(&gateway),
            Arc::new(AlignedEnrichment::new()),
            Arc::clone(&store),
        );

        let output = orch.run("user-7", &request(true)).await.unwrap();
        let url = output.image_url.unwrap();
        assert!(url.starts_with("https://cdn.test/blog-images/user-7/"));
        assert_eq!(store.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_image_payload_skips_upload() {
        let mut gateway = ScriptedGateway::ok();
        gateway.image = Ok(Some(ImageArtifact {
            data: "!!not base64!!".into(),
            mime_type: Some("image/png".into()),
        }));
        let store = Arc::new(RecordingStore::default());
        let orch = orchestrator(
            Arc::new(gateway),
            Arc::new(AlignedEnrichment::new()),
            Arc::clone(&store),
        );

        let output = orch.run("user-1", &request(true)).await.unwrap();
        assert!(output.image_url.is_none());
        // Upload must never be attempted for an undecodable payload.
        assert!(store.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_degrades_to_no_image() {
        let store = Arc::new(RecordingStore {
            fail_upload: true,
            ..Default::default()
        });
        let orch = orchestrator(
            Arc::new(ScriptedGateway::ok()),
            Arc::new(AlignedEnrichment::new()),
            Arc::clone(&store),
        );

        let output = orch.run("user-1", &request(true)).await.unwrap();
        assert!(output.image_url.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_upload_degrades_to_no_image() {
        let store = Arc::new(RecordingStore {
            unreachable: true,
            ..Default::default()
        });
        let orch = orchestrator(
            Arc::new(ScriptedGateway::ok()),
            Arc::new(AlignedEnrichment::new()),
            Arc::clone(&store),
        );

        let output = orch.run("user-1", &request(true)).await.unwrap();
        assert!(output.image_url.is_none());
    }

    #[tokio::test]
    async fn test_image_branch_starts_before_text_branch_finishes() {
        // A slow image model must not delay text stages, and the image
        // call must be issued before composition runs.
        let mut gateway = ScriptedGateway::ok();
        gateway.image_delay = Duration::from_millis(50);
        let gateway = Arc::new(gateway);
        let orch = orchestrator(
            Arc::clone(&gateway),
            Arc::new(AlignedEnrichment::new()),
            Arc::new(RecordingStore::default()),
        );

        let output = orch.run("user-1", &request(true)).await.unwrap();
        assert!(output.image_url.is_some());

        let calls = gateway.calls();
        assert_eq!(calls[0], "summarize");
        let image_pos = calls.iter().position(|c| c == "image").unwrap();
        let compose_pos = calls.iter().position(|c| c == "compose").unwrap();
        assert!(
            image_pos < compose_pos,
            "image branch should start before composition: {calls:?}"
        );
    }

    #[tokio::test]
    async fn test_enrichment_aligns_with_terms() {
        let enrichment = Arc::new(AlignedEnrichment::new());
        let gateway = Arc::new(ScriptedGateway::ok());
        let orch = orchestrator(
            Arc::clone(&gateway),
            Arc::clone(&enrichment) as Arc<dyn EnrichmentSource>,
            Arc::new(RecordingStore::default()),
        );

        orch.run("user-1", &request(false)).await.unwrap();
        assert_eq!(*enrichment.calls.lock().unwrap(), 1);
    }
}

//! Upload and question pipeline
//!
//! One pipeline serves both modes. With RAG enabled, uploads are chunked,
//! embedded and indexed, and questions are answered from retrieved chunks.
//! Without it, uploads are only analyzed and questions carry the whole
//! document text.

use std::sync::Arc;
use std::time::Instant;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{AnswerGenerator, PromptBuilder};
use crate::ingestion::TextChunker;
use crate::providers::LlmProvider;
use crate::retrieval::{Retriever, VectorIndex};
use crate::types::{AnswerResponse, Document, ExplainRequest, UploadResponse};

/// Retrieval query used when the user asks for an explanation without a question
const EXPLAIN_QUERY: &str = "Main topics, key points and important details of the document";

const UPLOAD_STAGE: &str = "Failed to process file";
const EXPLAIN_STAGE: &str = "Failed to generate explanation";
const DELETE_STAGE: &str = "Failed to delete document";

/// The upload / question pipeline
pub struct RagPipeline {
    chunker: TextChunker,
    generator: AnswerGenerator,
    index: Option<Arc<VectorIndex>>,
    retriever: Option<Retriever>,
    rag_enabled: bool,
    replace_on_upload: bool,
}

impl RagPipeline {
    /// Build a pipeline.
    ///
    /// `index` is required when `config.rag_enabled` is set. It may also be
    /// given in document mode so that stored documents can still be deleted.
    pub fn new(
        config: &RagConfig,
        llm: Arc<dyn LlmProvider>,
        index: Option<Arc<VectorIndex>>,
    ) -> Result<Self> {
        if config.rag_enabled && index.is_none() {
            return Err(Error::Config(
                "RAG is enabled but no vector index is configured".to_string(),
            ));
        }

        let retriever = index
            .as_ref()
            .map(|index| Retriever::new(Arc::clone(index), config.retrieval.top_k));

        Ok(Self {
            chunker: TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap),
            generator: AnswerGenerator::new(llm),
            index,
            retriever,
            rag_enabled: config.rag_enabled,
            replace_on_upload: config.indexing.replace_on_upload,
        })
    }

    /// Whether uploads are indexed and questions answered by retrieval
    pub fn rag_enabled(&self) -> bool {
        self.rag_enabled
    }

    /// Vector index gateway, when one is configured
    pub fn index(&self) -> Option<&Arc<VectorIndex>> {
        self.index.as_ref()
    }

    /// Answer generator
    pub fn generator(&self) -> &AnswerGenerator {
        &self.generator
    }

    /// Chunker
    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    /// Process an uploaded file.
    ///
    /// The file is validated before any external call. The document is then
    /// analyzed and, in RAG mode, chunked and indexed.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<UploadResponse> {
        let start = Instant::now();

        if file_name.trim().is_empty() {
            return Err(Error::validation("No file uploaded"));
        }
        let document = Document::from_upload(file_name, content_type, data)?;
        if document.content.trim().is_empty() {
            return Err(Error::validation("Uploaded file is empty"));
        }

        tracing::info!(
            "Processing upload {} ({} bytes, {}, rag: {})",
            document.file_name,
            document.size_bytes,
            document.file_type.display_name(),
            self.rag_enabled
        );

        let mut response = self
            .process_document(&document)
            .await
            .map_err(|e| e.in_stage(UPLOAD_STAGE))?;
        response.processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Upload {} done in {}ms (chunks stored: {:?})",
            response.file_name,
            response.processing_time_ms,
            response.chunks_stored
        );
        Ok(response)
    }

    async fn process_document(&self, document: &Document) -> Result<UploadResponse> {
        let analysis = self
            .generator
            .generate(&PromptBuilder::analysis_prompt(&document.content))
            .await?;

        let mut response = UploadResponse {
            success: true,
            file_name: document.file_name.clone(),
            file_size: document.size_bytes,
            analysis,
            original_content: None,
            chunks_stored: None,
            total_chunks: None,
            rag_enabled: self.rag_enabled,
            processing_time_ms: 0,
        };

        match self.index.as_ref().filter(|_| self.rag_enabled) {
            Some(index) => {
                let chunks = self.chunker.chunk(&document.content);
                tracing::debug!("{} split into {} chunks", document.file_name, chunks.len());

                if self.replace_on_upload {
                    index.delete_by_file_name(&document.file_name).await?;
                }
                let stored = index.upsert(&chunks, &document.file_name).await?;

                response.chunks_stored = Some(stored);
                response.total_chunks = Some(chunks.len());
            }
            None => {
                response.original_content = Some(document.content.clone());
            }
        }

        Ok(response)
    }

    /// Explain a document or answer a question about it
    pub async fn explain(&self, request: &ExplainRequest) -> Result<AnswerResponse> {
        let start = Instant::now();
        let question = request.question_text();

        let mut response = match self.retriever.as_ref().filter(|_| self.rag_enabled) {
            Some(retriever) => self.explain_from_index(retriever, request).await,
            None => self.explain_document(request).await,
        }
        .map_err(|e| e.in_stage(EXPLAIN_STAGE))?;

        response.processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Answered {} in {}ms ({} sources)",
            if question.is_some() { "question" } else { "explain request" },
            response.processing_time_ms,
            response.sources.len()
        );
        Ok(response)
    }

    async fn explain_document(&self, request: &ExplainRequest) -> Result<AnswerResponse> {
        let content = request
            .content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::validation("No content provided"))?;
        let question = request.question_text();

        let explanation = self
            .generator
            .generate(&PromptBuilder::document_prompt(content, question))
            .await?;

        Ok(AnswerResponse {
            success: true,
            explanation,
            is_question: question.is_some(),
            sources: Vec::new(),
            processing_time_ms: 0,
        })
    }

    async fn explain_from_index(
        &self,
        retriever: &Retriever,
        request: &ExplainRequest,
    ) -> Result<AnswerResponse> {
        let question = request.question_text();
        let results = retriever
            .retrieve(question.unwrap_or(EXPLAIN_QUERY), request.top_k, request.file_filter())
            .await?;

        let answer = match question {
            Some(question) => self.generator.answer(question, &results).await?,
            None => self.generator.explain(&results).await?,
        };

        Ok(AnswerResponse {
            success: true,
            explanation: answer.text,
            is_question: question.is_some(),
            sources: answer.sources,
            processing_time_ms: 0,
        })
    }

    /// Remove every indexed chunk of a document
    pub async fn delete_document(&self, file_name: &str) -> Result<()> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(Error::validation("No file name provided"));
        }
        let index = self.index.as_ref().ok_or_else(|| {
            Error::Config("Document deletion requires a vector index".to_string())
        })?;

        index
            .delete_by_file_name(file_name)
            .await
            .map_err(|e| e.in_stage(DELETE_STAGE))?;
        tracing::info!("Deleted indexed chunks of {}", file_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        EmbeddingProvider, IndexRecord, InMemoryVectorStore, MetadataFilter, StoreMatch,
        StoreStats, VectorStoreProvider,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut v = vec![0.0; 8];
            for (i, b) in text.bytes().enumerate() {
                v[i % 8] += b as f32;
            }
            Ok(v)
        }
        fn dimensions(&self) -> usize {
            8
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "counting"
        }
    }

    /// In-memory store that counts calls and can fail upserts
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryVectorStore,
        calls: AtomicUsize,
        fail_upsert: bool,
    }

    #[async_trait]
    impl VectorStoreProvider for CountingStore {
        async fn upsert(&self, records: Vec<IndexRecord>) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_upsert {
                return Err(Error::vector_store("connection reset"));
            }
            self.inner.upsert(records).await
        }
        async fn query(
            &self,
            vector: &[f32],
            top_k: usize,
            filter: Option<&MetadataFilter>,
        ) -> Result<Vec<StoreMatch>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.query(vector, top_k, filter).await
        }
        async fn delete_many(&self, filter: &MetadataFilter) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_many(filter).await
        }
        async fn describe(&self) -> Result<StoreStats> {
            self.inner.describe().await
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "counting"
        }
    }

    #[derive(Default)]
    struct CountingLlm {
        prompts: parking_lot::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmProvider for CountingLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().push(prompt.to_string());
            Ok("generated".to_string())
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "counting"
        }
        fn model(&self) -> &str {
            "counting-1"
        }
    }

    struct Harness {
        embedder: Arc<CountingEmbedder>,
        store: Arc<CountingStore>,
        llm: Arc<CountingLlm>,
        pipeline: RagPipeline,
    }

    impl Harness {
        fn new(rag_enabled: bool, store: CountingStore) -> Self {
            let config = RagConfig {
                rag_enabled,
                ..RagConfig::default()
            };
            Self::with_config(config, store)
        }

        fn with_config(config: RagConfig, store: CountingStore) -> Self {
            let embedder = Arc::new(CountingEmbedder::default());
            let store = Arc::new(store);
            let llm = Arc::new(CountingLlm::default());
            let index = Arc::new(VectorIndex::new(embedder.clone(), store.clone()));
            let pipeline = RagPipeline::new(&config, llm.clone(), Some(index)).unwrap();
            Self {
                embedder,
                store,
                llm,
                pipeline,
            }
        }

        fn external_calls(&self) -> usize {
            self.embedder.calls.load(Ordering::SeqCst)
                + self.store.calls.load(Ordering::SeqCst)
                + self.llm.prompts.lock().len()
        }
    }

    #[tokio::test]
    async fn test_unsupported_upload_makes_no_external_calls() {
        let h = Harness::new(true, CountingStore::default());

        let err = h
            .pipeline
            .upload("report.pdf", Some("application/pdf"), b"%PDF-1.7")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Unsupported file type. Please upload .md or .txt files."
        );
        assert_eq!(h.external_calls(), 0);
    }

    #[tokio::test]
    async fn test_rag_upload_indexes_chunks() {
        let h = Harness::new(true, CountingStore::default());

        let response = h
            .pipeline
            .upload("facts.txt", Some("text/plain"), b"The sky is blue. Water is wet. Fire is hot.")
            .await
            .unwrap();

        assert_eq!(response.file_name, "facts.txt");
        assert_eq!(response.file_size, 43);
        assert_eq!(response.analysis, "generated");
        assert_eq!(response.chunks_stored, Some(1));
        assert_eq!(response.total_chunks, Some(1));
        assert!(response.original_content.is_none());
        assert_eq!(h.store.inner.ids(), vec!["facts.txt_chunk_0".to_string()]);
    }

    #[tokio::test]
    async fn test_document_mode_upload_returns_content() {
        let h = Harness::new(false, CountingStore::default());

        let response = h
            .pipeline
            .upload("notes.md", None, b"# Notes\nSome text.")
            .await
            .unwrap();

        assert_eq!(response.original_content.as_deref(), Some("# Notes\nSome text."));
        assert!(response.chunks_stored.is_none());
        assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
        assert!(h.llm.prompts.lock()[0].contains("comprehensive summary"));
    }

    #[tokio::test]
    async fn test_index_failure_names_stage() {
        let store = CountingStore {
            fail_upsert: true,
            ..CountingStore::default()
        };
        let h = Harness::new(true, store);

        let err = h
            .pipeline
            .upload("facts.txt", None, b"The sky is blue.")
            .await
            .unwrap_err();

        assert!(err.is_upstream());
        assert!(err.to_string().starts_with("Failed to process file: Index write failed"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_question_without_documents() {
        let h = Harness::new(true, CountingStore::default());

        let err = h
            .pipeline
            .explain(&ExplainRequest::question("What color is the sky?"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoRelevantContent));
        assert!(h.llm.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_question_answered_with_sources() {
        let h = Harness::new(true, CountingStore::default());
        h.pipeline
            .upload("facts.txt", None, b"The sky is blue. Water is wet.")
            .await
            .unwrap();

        let response = h
            .pipeline
            .explain(&ExplainRequest::question("Is water wet?").with_file_name("facts.txt"))
            .await
            .unwrap();

        assert!(response.is_question);
        assert_eq!(response.explanation, "generated");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].file_name, "facts.txt");

        let prompts = h.llm.prompts.lock();
        assert!(prompts[1].contains("[Chunk 1]\nThe sky is blue. Water is wet."));
        assert!(prompts[1].contains("Question: Is water wet?"));
    }

    #[tokio::test]
    async fn test_document_mode_explain() {
        let h = Harness::new(false, CountingStore::default());

        let err = h
            .pipeline
            .explain(&ExplainRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No content provided");

        let response = h
            .pipeline
            .explain(&ExplainRequest::default().with_content("Fire is hot."))
            .await
            .unwrap();
        assert!(!response.is_question);
        assert!(response.sources.is_empty());
        assert!(h.llm.prompts.lock()[0].contains("detailed explanation of this document"));
    }

    #[tokio::test]
    async fn test_delete_document() {
        let h = Harness::new(true, CountingStore::default());
        h.pipeline
            .upload("facts.txt", None, b"The sky is blue.")
            .await
            .unwrap();

        h.pipeline.delete_document("facts.txt").await.unwrap();
        h.pipeline.delete_document("facts.txt").await.unwrap();
        assert!(h.store.inner.ids().is_empty());

        let err = h.pipeline.delete_document("  ").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    fn short_chunk_config(replace_on_upload: bool) -> RagConfig {
        let mut config = RagConfig::default();
        config.chunking.chunk_size = 20;
        config.chunking.chunk_overlap = 0;
        config.indexing.replace_on_upload = replace_on_upload;
        config
    }

    #[tokio::test]
    async fn test_reupload_keeps_stale_chunks_by_default() {
        let h = Harness::with_config(short_chunk_config(false), CountingStore::default());
        h.pipeline
            .upload("a.txt", None, b"First sentence here. Second sentence here. Third sentence here.")
            .await
            .unwrap();
        h.pipeline.upload("a.txt", None, b"Short.").await.unwrap();

        assert_eq!(
            h.store.inner.ids(),
            vec!["a.txt_chunk_0", "a.txt_chunk_1", "a.txt_chunk_2"]
        );
    }

    #[tokio::test]
    async fn test_reupload_with_replace_drops_stale_chunks() {
        let h = Harness::with_config(short_chunk_config(true), CountingStore::default());
        h.pipeline
            .upload("a.txt", None, b"First sentence here. Second sentence here. Third sentence here.")
            .await
            .unwrap();
        assert_eq!(h.store.inner.ids().len(), 3);

        let response = h.pipeline.upload("a.txt", None, b"Short.").await.unwrap();
        assert_eq!(response.chunks_stored, Some(1));
        assert_eq!(h.store.inner.ids(), vec!["a.txt_chunk_0"]);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_upload_future_is_send() {
        let h = Harness::new(true, CountingStore::default());
        let upload = h.pipeline.upload("facts.txt", None, b"The sky is blue.");
        assert_send(&upload);
        let explain_request = ExplainRequest::question("Why?");
        let explain = h.pipeline.explain(&explain_request);
        assert_send(&explain);
    }

    #[test]
    fn test_rag_mode_requires_index() {
        let result = RagPipeline::new(&RagConfig::default(), Arc::new(CountingLlm::default()), None);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

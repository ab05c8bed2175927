//! Chunk orchestration: fan-out one generation call per chunk, fan-in in
//! dispatch order, merge fragments into the final exam.

use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use examforge_core::{ExamDocument, GenerationOptions};
use examforge_ingest::Chunk;

use crate::generate::{ExamGenerator, GenerateError};

/// Generate a complete exam from pre-chunked document text.
///
/// All chunk pipelines launch together and are awaited jointly; the number
/// of in-flight provider requests equals the chunk count. The indexed join
/// re-imposes dispatch order regardless of completion order. Any chunk
/// failure fails the whole orchestration — no partial exam is returned.
pub async fn generate_exam(
    generator: &ExamGenerator,
    chunks: &[Chunk],
    options: &GenerationOptions,
) -> Result<ExamDocument, GenerateError> {
    if !options.any_enabled() {
        return Err(GenerateError::NoTypesEnabled);
    }
    if chunks.is_empty() {
        return Err(GenerateError::NoChunks);
    }

    let total = chunks.len();
    info!("Dispatching {} chunk generation calls", total);

    let futures = chunks.iter().map(|chunk| {
        generate_with_retry(generator, &chunk.content, options, chunk.index, total)
    });

    // join_all yields results in dispatch order, not completion order.
    let results: Vec<Result<_, _>> = join_all(futures).await;

    let mut fragments = Vec::with_capacity(total);
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(fragment) => fragments.push(fragment),
            Err(e) => {
                return Err(GenerateError::ChunkFailed {
                    index,
                    source: Box::new(e),
                })
            }
        }
    }

    let exam = ExamDocument::merge(fragments);
    info!(
        "Merged exam: {} sections, {} questions",
        exam.sections.len(),
        exam.question_count()
    );
    Ok(exam)
}

/// Bounded retry around one chunk's generation call: transient provider
/// failures are retried with exponential backoff; malformed-response parse
/// failures are not.
async fn generate_with_retry(
    generator: &ExamGenerator,
    chunk_text: &str,
    options: &GenerationOptions,
    chunk_index: usize,
    total_chunks: usize,
) -> Result<examforge_core::ExamFragment, GenerateError> {
    let attempts = generator.retry_attempts() + 1;
    let base_delay = generator.retry_base_delay_ms();
    let mut last_err = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            let delay = base_delay * (1 << (attempt - 1));
            warn!(
                "Retrying chunk {} (attempt {}/{}) after {}ms",
                chunk_index + 1,
                attempt + 1,
                attempts,
                delay
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        match generator
            .generate_fragment(chunk_text, options, chunk_index, total_chunks)
            .await
        {
            Ok(fragment) => return Ok(fragment),
            Err(e) if e.is_transient() && attempt + 1 < attempts => last_err = Some(e),
            Err(e) => return Err(e),
        }
    }

    // Loop always returns on the final attempt; kept for totality.
    Err(last_err.unwrap_or(GenerateError::EmptyResponse))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use examforge_core::QuestionType;
    use crate::provider::{LlmError, LlmProvider, Prompt, SamplingParams};

    use super::*;

    fn chunk(index: usize, total: usize, content: &str) -> Chunk {
        Chunk {
            index,
            total,
            content: content.to_string(),
        }
    }

    fn options() -> GenerationOptions {
        GenerationOptions {
            open_questions: true,
            multiple_choice: false,
            single_choice: false,
            questions_per_section: 3,
        }
    }

    /// Reads "part N of M" back out of the prompt and answers with a
    /// fragment whose section title names that part, optionally sleeping
    /// so later chunks complete first.
    struct EchoProvider {
        /// Per-part sleep in ms, by 0-based chunk index.
        delays: Vec<u64>,
    }

    fn part_of(prompt: &str) -> usize {
        let marker = "(part ";
        let start = prompt.find(marker).unwrap() + marker.len();
        prompt[start..]
            .split_whitespace()
            .next()
            .unwrap()
            .parse::<usize>()
            .unwrap()
    }

    fn fragment_json(part: usize, question_count: usize) -> String {
        let questions: Vec<String> = (0..question_count)
            .map(|i| {
                format!(
                    r#"{{"text":"question {i} from part {part}","type":"open-ended","points":30}}"#
                )
            })
            .collect();
        format!(
            r#"{{"title":"exam part {part}","sections":[{{"title":"section from part {part}","questions":[{}]}}]}}"#,
            questions.join(",")
        )
    }

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn complete(
            &self,
            prompt: &Prompt,
            _params: SamplingParams,
        ) -> Result<String, LlmError> {
            let part = part_of(&prompt.user);
            if let Some(&delay) = self.delays.get(part - 1) {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Ok(fragment_json(part, 3))
        }
    }

    /// Fails the given parts, counting every call.
    struct FailingProvider {
        fail_parts: Vec<usize>,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl LlmProvider for FailingProvider {
        async fn complete(
            &self,
            prompt: &Prompt,
            _params: SamplingParams,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let part = part_of(&prompt.user);
            if self.fail_parts.contains(&part) {
                return Err(LlmError::Api {
                    status: 500,
                    body: "upstream unavailable".into(),
                });
            }
            Ok(fragment_json(part, 3))
        }
    }

    fn generator(provider: Box<dyn LlmProvider>) -> ExamGenerator {
        ExamGenerator::new(provider, "English".to_string())
    }

    #[tokio::test]
    async fn single_chunk_end_to_end() {
        let g = generator(Box::new(EchoProvider { delays: vec![0] }));
        let chunks = vec![chunk(0, 1, "p1\n\np2\n\np3")];
        let exam = generate_exam(&g, &chunks, &options()).await.unwrap();

        assert_eq!(exam.title, ExamDocument::DEFAULT_TITLE);
        assert_eq!(exam.sections.len(), 1);
        let section = &exam.sections[0];
        assert_eq!(section.questions.len(), 3);
        for q in &section.questions {
            assert_eq!(q.question_type, QuestionType::OpenEnded);
            assert_eq!(q.points, 30);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn merge_uses_dispatch_order_not_completion_order() {
        // Chunk 1 finishes last, chunk 3 first.
        let g = generator(Box::new(EchoProvider {
            delays: vec![300, 200, 100],
        }));
        let chunks = vec![chunk(0, 3, "a"), chunk(1, 3, "b"), chunk(2, 3, "c")];
        let exam = generate_exam(&g, &chunks, &options()).await.unwrap();

        let titles: Vec<&str> = exam.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["section from part 1", "section from part 2", "section from part 3"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn single_failed_chunk_fails_whole_orchestration() {
        let g = generator(Box::new(FailingProvider {
            fail_parts: vec![2],
            calls: Arc::new(AtomicU32::new(0)),
        }));
        let chunks = vec![chunk(0, 3, "a"), chunk(1, 3, "b"), chunk(2, 3, "c")];
        let err = generate_exam(&g, &chunks, &options()).await.unwrap_err();

        match err {
            GenerateError::ChunkFailed { index, .. } => assert_eq!(index, 1),
            other => panic!("expected ChunkFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn all_chunks_failing_yields_single_aggregated_error() {
        let g = generator(Box::new(FailingProvider {
            fail_parts: vec![1, 2],
            calls: Arc::new(AtomicU32::new(0)),
        }));
        let chunks = vec![chunk(0, 2, "a"), chunk(1, 2, "b")];
        let err = generate_exam(&g, &chunks, &options()).await.unwrap_err();
        // The first failed index is reported; no exam is returned.
        assert!(matches!(err, GenerateError::ChunkFailed { index: 0, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried_with_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let g = ExamGenerator::new(
            Box::new(FailingProvider {
                fail_parts: vec![1],
                calls: calls.clone(),
            }),
            "English".to_string(),
        )
        .with_retry(2, 10);

        let chunks = vec![chunk(0, 1, "a")];
        let err = generate_exam(&g, &chunks, &options()).await.unwrap_err();
        assert!(matches!(err, GenerateError::ChunkFailed { index: 0, .. }));
        // 1 initial + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn disabled_options_and_empty_chunks_are_rejected() {
        let g = generator(Box::new(EchoProvider { delays: vec![] }));

        let none_enabled = GenerationOptions {
            open_questions: false,
            multiple_choice: false,
            single_choice: false,
            questions_per_section: 3,
        };
        let chunks = vec![chunk(0, 1, "a")];
        assert!(matches!(
            generate_exam(&g, &chunks, &none_enabled).await,
            Err(GenerateError::NoTypesEnabled)
        ));
        assert!(matches!(
            generate_exam(&g, &[], &options()).await,
            Err(GenerateError::NoChunks)
        ));
    }
}

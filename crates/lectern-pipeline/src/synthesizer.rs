//! Per-record answering and final answer synthesis.

use crate::error::{PipelineError, PipelineResult};
use crate::indexer::existing_files;
use lectern_core::{Record, RecordId, ERROR_MARKER};
use lectern_gemini::{GenerativeModel, Part};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Preamble sent ahead of the query and files in per-record requests.
const ANSWER_PREAMBLE: &str = "Using the data provided answer the query\n";

/// Asks the model about each relevant record, then merges the answers.
pub struct AnswerSynthesizer<'a, M: GenerativeModel> {
    model: &'a M,
    media_model: &'a str,
    text_model: &'a str,
}

impl<'a, M: GenerativeModel> AnswerSynthesizer<'a, M> {
    pub fn new(model: &'a M, media_model: &'a str, text_model: &'a str) -> Self {
        Self {
            model,
            media_model,
            text_model,
        }
    }

    /// One answer per record, keyed by id, in sequence.
    ///
    /// A failure for one record becomes an `Error:` token in the map rather
    /// than aborting the sweep; the remaining records still get asked.
    pub async fn answer_per_record(
        &self,
        query: &str,
        records: &[(RecordId, &Record)],
    ) -> BTreeMap<RecordId, String> {
        let mut answers = BTreeMap::new();
        for (id, record) in records {
            info!("Querying record {} ({})", id, record.filename);
            answers.insert(*id, self.answer_one(query, record).await);
        }
        answers
    }

    async fn answer_one(&self, query: &str, record: &Record) -> String {
        let files = existing_files(&record.artifacts);
        if files.is_empty() {
            return format!("{} no artifact files found on disk", ERROR_MARKER);
        }

        let mut parts = vec![Part::text(ANSWER_PREAMBLE), Part::text(query)];
        for file in &files {
            match self.model.upload(file).await {
                Ok(handle) => parts.push(Part::file(&handle)),
                Err(e) => warn!("Skipping {}: {}", file.display(), e),
            }
        }
        if !parts.iter().any(|part| part.is_file()) {
            return format!("{} none of the artifact files could be uploaded", ERROR_MARKER);
        }

        match self.model.generate(self.media_model, &parts).await {
            Ok(answer) => answer,
            Err(e) => format!("{} {}", ERROR_MARKER, e),
        }
    }

    /// Merge per-record answers into one final answer.
    ///
    /// Empty answers and `Error:` tokens are filtered out first; when
    /// nothing remains this fails without another service call. A failed
    /// final call keeps the assembled context in the error.
    pub async fn synthesize(
        &self,
        query: &str,
        answers: &BTreeMap<RecordId, String>,
    ) -> PipelineResult<String> {
        let context = synthesis_context(answers);
        if context.is_empty() {
            return Err(PipelineError::NoValidAnswers);
        }

        let valid = answers.values().filter(|a| is_valid_answer(a)).count();
        info!("Synthesizing final answer from {} valid answer(s)", valid);
        let prompt = build_synthesis_prompt(query, &context);
        match self
            .model
            .generate(self.text_model, &[Part::text(prompt)])
            .await
        {
            Ok(answer) => Ok(answer),
            Err(e) => Err(PipelineError::SynthesisFailed {
                reason: e.to_string(),
                context,
            }),
        }
    }
}

/// An answer is usable when it has content and is not an error token.
fn is_valid_answer(answer: &str) -> bool {
    !answer.is_empty() && !answer.starts_with(ERROR_MARKER)
}

/// Valid answers labeled by source record, joined into one block.
pub(crate) fn synthesis_context(answers: &BTreeMap<RecordId, String>) -> String {
    answers
        .iter()
        .filter(|(_, answer)| is_valid_answer(answer))
        .map(|(id, answer)| format!("Answer from record {}:\n{}", id, answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_synthesis_prompt(query: &str, context: &str) -> String {
    format!(
        "You are an AI assistant synthesizing information from different lecture recordings to \
         answer a student's query.\n\
         The student asked: \"{}\"\n\n\
         Based *only* on the following answers derived directly from the relevant lecture \
         records, provide a single, comprehensive, and well-structured final answer to the \
         student's original query. If the individual answers conflict, are insufficient, or \
         indicate errors, acknowledge that in your response.\n\n\
         Individual Answers:\n{}\n\n\
         Final Synthesized Answer:",
        query, context
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, ScriptedModel};
    use lectern_core::MediaKind;

    fn answers(entries: &[(RecordId, &str)]) -> BTreeMap<RecordId, String> {
        entries
            .iter()
            .map(|(id, text)| (*id, text.to_string()))
            .collect()
    }

    #[test]
    fn test_context_filters_error_tokens_and_empties() {
        let context = synthesis_context(&answers(&[
            (1, "Error: upload failed"),
            (2, ""),
            (3, "Quicksort averages n log n."),
        ]));

        assert!(context.contains("Answer from record 3:"));
        assert!(context.contains("Quicksort averages n log n."));
        assert!(!context.contains("record 1"));
        assert!(!context.contains("upload failed"));
    }

    #[tokio::test]
    async fn test_synthesize_without_valid_answers_skips_the_service() {
        let model = ScriptedModel::new();
        let synthesizer = AnswerSynthesizer::new(&model, "models/media", "models/text");

        let result = synthesizer
            .synthesize("query", &answers(&[(1, "Error: x"), (2, "")]))
            .await;

        assert!(matches!(result, Err(PipelineError::NoValidAnswers)));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_synthesize_merges_valid_answers() {
        let model = ScriptedModel::new();
        model.push_text("Quicksort is covered in lecture three.");

        let synthesizer = AnswerSynthesizer::new(&model, "models/media", "models/text");
        let answer = synthesizer
            .synthesize("where is quicksort?", &answers(&[(3, "Lecture three covers it.")]))
            .await
            .unwrap();

        assert_eq!(answer, "Quicksort is covered in lecture three.");
        assert_eq!(model.calls(), vec![Call::Generate]);
    }

    #[tokio::test]
    async fn test_failed_synthesis_keeps_the_context() {
        let model = ScriptedModel::new();
        model.push_failure("overloaded");

        let synthesizer = AnswerSynthesizer::new(&model, "models/media", "models/text");
        let result = synthesizer
            .synthesize("query", &answers(&[(1, "A fact.")]))
            .await;

        match result {
            Err(PipelineError::SynthesisFailed { context, reason }) => {
                assert!(context.contains("Answer from record 1:"));
                assert!(reason.contains("overloaded"));
            }
            other => panic!("expected SynthesisFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_answer_per_record_tokenizes_failures() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("2.notes.txt");
        std::fs::write(&artifact, "notes").unwrap();

        let good = Record::new(MediaKind::Text, "notes.txt")
            .with_artifacts(vec![artifact]);
        let broken = Record::new(MediaKind::Text, "gone.txt")
            .with_artifacts(vec![dir.path().join("missing.txt")]);

        let model = ScriptedModel::new();
        model.push_text("An answer.");

        let synthesizer = AnswerSynthesizer::new(&model, "models/media", "models/text");
        let answers = synthesizer
            .answer_per_record("query", &[(1, &broken), (2, &good)])
            .await;

        assert!(answers[&1].starts_with(ERROR_MARKER));
        assert_eq!(answers[&2], "An answer.");
        // The broken record never reached the service.
        assert_eq!(
            model.calls(),
            vec![Call::Upload("2.notes.txt".to_string()), Call::Generate]
        );
    }

    #[tokio::test]
    async fn test_generation_failure_becomes_error_token() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("1.notes.txt");
        std::fs::write(&artifact, "notes").unwrap();

        let record = Record::new(MediaKind::Text, "notes.txt").with_artifacts(vec![artifact]);

        let model = ScriptedModel::new();
        model.push_failure("rate limited");

        let synthesizer = AnswerSynthesizer::new(&model, "models/media", "models/text");
        let answers = synthesizer.answer_per_record("query", &[(1, &record)]).await;

        assert!(answers[&1].starts_with(ERROR_MARKER));
        assert!(answers[&1].contains("rate limited"));
    }
}

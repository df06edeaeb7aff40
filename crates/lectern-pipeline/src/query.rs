//! The query pipeline: selection, per-record answering, synthesis.

use crate::error::PipelineError;
use crate::selector::RelevanceSelector;
use crate::synthesizer::{synthesis_context, AnswerSynthesizer};
use crate::PipelineConfig;
use lectern_catalog::Catalog;
use lectern_core::RecordId;
use lectern_gemini::GenerativeModel;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Terminal states of a query run.
///
/// Expected dead ends are outcomes, not errors: the caller always gets
/// something it can explain to the user, and as much intermediate material
/// as survived.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The catalog is empty; the service was never called.
    NoContent,
    /// Relevance selection failed, so nothing further was attempted.
    SelectionFailed { reason: String },
    /// Selection worked but judged no record relevant.
    NoneRelevant,
    /// Every per-record answer was empty or an error token.
    NoValidAnswers {
        answers: BTreeMap<RecordId, String>,
    },
    /// The final synthesis call failed; the per-record context survives.
    SynthesisFailed { context: String, reason: String },
    /// A final answer was produced from the listed records.
    Done {
        answer: String,
        record_ids: Vec<RecordId>,
    },
}

/// Drives one query through the three pipeline stages in order.
pub struct QueryPipeline<'a, M: GenerativeModel> {
    catalog: &'a Catalog,
    model: &'a M,
    config: &'a PipelineConfig,
}

impl<'a, M: GenerativeModel> QueryPipeline<'a, M> {
    pub fn new(catalog: &'a Catalog, model: &'a M, config: &'a PipelineConfig) -> Self {
        Self {
            catalog,
            model,
            config,
        }
    }

    /// Run the full pipeline for one query.
    pub async fn run(&self, query: &str) -> QueryOutcome {
        if self.catalog.is_empty() {
            return QueryOutcome::NoContent;
        }

        info!("Step 1: selecting relevant records from summaries");
        let selector = RelevanceSelector::new(self.model, &self.config.text_model);
        let relevant = match selector.select(query, &self.catalog.summaries()).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Relevance selection failed: {}", e);
                return QueryOutcome::SelectionFailed {
                    reason: e.to_string(),
                };
            }
        };
        if relevant.is_empty() {
            return QueryOutcome::NoneRelevant;
        }

        info!("Step 2: querying {} relevant record(s): {:?}", relevant.len(), relevant);
        let records: Vec<_> = relevant
            .iter()
            .filter_map(|id| self.catalog.get(*id).map(|record| (*id, record)))
            .collect();
        let synthesizer =
            AnswerSynthesizer::new(self.model, &self.config.media_model, &self.config.text_model);
        let answers = synthesizer.answer_per_record(query, &records).await;

        info!("Step 3: synthesizing the final answer");
        match synthesizer.synthesize(query, &answers).await {
            Ok(answer) => QueryOutcome::Done {
                answer,
                record_ids: relevant,
            },
            Err(PipelineError::NoValidAnswers) => QueryOutcome::NoValidAnswers { answers },
            Err(PipelineError::SynthesisFailed { context, reason }) => {
                QueryOutcome::SynthesisFailed { context, reason }
            }
            Err(e) => QueryOutcome::SynthesisFailed {
                context: synthesis_context(&answers),
                reason: e.to_string(),
            },
        }
    }
}

//! Relevance selection over the catalog's summaries.

use crate::error::{PipelineError, PipelineResult};
use lectern_core::RecordId;
use lectern_gemini::{GenerativeModel, Part};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Shape the selection response is constrained to: one integer-array field.
fn selection_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "record_ids": {
                "type": "ARRAY",
                "items": { "type": "INTEGER" }
            }
        },
        "required": ["record_ids"]
    })
}

#[derive(Debug, Deserialize)]
struct SelectionResponse {
    record_ids: Vec<RecordId>,
}

/// Picks the records whose summaries look relevant to a query.
///
/// All summaries go into a single schema-constrained request; the whole
/// catalog is judged at once rather than record by record.
pub struct RelevanceSelector<'a, M: GenerativeModel> {
    model: &'a M,
    model_name: &'a str,
}

impl<'a, M: GenerativeModel> RelevanceSelector<'a, M> {
    pub fn new(model: &'a M, model_name: &'a str) -> Self {
        Self { model, model_name }
    }

    /// Ids judged relevant to `query`, in first-mention order.
    ///
    /// An empty summary map short-circuits to an empty list without calling
    /// the service. Ids the model invents are dropped with a warning, and
    /// duplicates keep only their first occurrence.
    pub async fn select(
        &self,
        query: &str,
        summaries: &BTreeMap<RecordId, String>,
    ) -> PipelineResult<Vec<RecordId>> {
        if summaries.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_selection_prompt(query, summaries);
        let raw = self
            .model
            .generate_structured(self.model_name, &[Part::text(prompt)], &selection_schema())
            .await?;

        let parsed: SelectionResponse = serde_json::from_str(&raw).map_err(|e| {
            warn!("Unparsable selection response: {}", raw);
            PipelineError::MalformedSelection(e.to_string())
        })?;

        let mut ids = Vec::new();
        for id in parsed.record_ids {
            if !summaries.contains_key(&id) {
                warn!("Selection returned unknown record id {}, ignoring", id);
            } else if !ids.contains(&id) {
                ids.push(id);
            }
        }
        debug!("Relevant records: {:?}", ids);
        Ok(ids)
    }
}

/// The query plus the full id-to-summary mapping, rendered as JSON so the
/// model sees exactly the ids it may return.
fn build_selection_prompt(query: &str, summaries: &BTreeMap<RecordId, String>) -> String {
    let listing = serde_json::to_string_pretty(summaries).unwrap_or_default();
    format!(
        "You are an AI assistant helping a student find information in lecture recordings. \
         Look at the summaries of all the indexed lecture records and return the record ids of \
         the ones relevant to the student's query. Return multiple ids when multiple records are \
         relevant.\n\
         Here is the student's query:\n{}\n\n\
         Here is the list of record ids and their summaries:\n{}\n",
        query, listing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, ScriptedModel};

    fn summaries(entries: &[(RecordId, &str)]) -> BTreeMap<RecordId, String> {
        entries
            .iter()
            .map(|(id, text)| (*id, text.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_summaries_skip_the_service() {
        let model = ScriptedModel::new();
        let selector = RelevanceSelector::new(&model, "models/test");

        let ids = selector.select("anything", &BTreeMap::new()).await.unwrap();

        assert!(ids.is_empty());
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_select_parses_ids() {
        let model = ScriptedModel::new();
        model.push_text(r#"{"record_ids": [2, 1]}"#);

        let selector = RelevanceSelector::new(&model, "models/test");
        let ids = selector
            .select("sorting", &summaries(&[(1, "Graphs."), (2, "Sorting.")]))
            .await
            .unwrap();

        assert_eq!(ids, vec![2, 1]);
        assert_eq!(model.calls(), vec![Call::GenerateStructured]);
    }

    #[tokio::test]
    async fn test_unknown_and_duplicate_ids_are_dropped() {
        let model = ScriptedModel::new();
        model.push_text(r#"{"record_ids": [2, 7, 2]}"#);

        let selector = RelevanceSelector::new(&model, "models/test");
        let ids = selector
            .select("sorting", &summaries(&[(1, "Graphs."), (2, "Sorting.")]))
            .await
            .unwrap();

        assert_eq!(ids, vec![2]);
    }

    #[tokio::test]
    async fn test_malformed_response_is_an_error() {
        let model = ScriptedModel::new();
        model.push_text("the records about sorting are relevant");

        let selector = RelevanceSelector::new(&model, "models/test");
        let result = selector
            .select("sorting", &summaries(&[(1, "Sorting.")]))
            .await;

        assert!(matches!(result, Err(PipelineError::MalformedSelection(_))));
    }

    #[test]
    fn test_prompt_carries_query_and_summaries() {
        let prompt = build_selection_prompt("find the graph lecture", &summaries(&[(3, "Graphs.")]));
        assert!(prompt.contains("find the graph lecture"));
        assert!(prompt.contains("\"3\""));
        assert!(prompt.contains("Graphs."));
    }
}

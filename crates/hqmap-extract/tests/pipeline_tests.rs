//! Pipeline totality
//!
//! Any name that is non-empty after trimming resolves to a complete record,
//! whatever the model does.

use async_trait::async_trait;
use hqmap_extract::{ExtractionPipeline, ModelClient, ModelError};
use hqmap_record::{EntityRecord, RecordSource};
use proptest::prelude::*;
use std::sync::Arc;

struct Replying(Result<String, ModelError>);

#[async_trait]
impl ModelClient for Replying {
    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        self.0.clone()
    }

    fn name(&self) -> &'static str {
        "replying"
    }
}

fn entity_name() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[A-Za-z0-9 .&,'-]{1,40}",
        "[\\x00-\\x1fA-Za-z \\t]{1,60}",
        "[A-Za-z]{190,320}",
    ]
    .prop_filter("non-blank after trim", |name| !name.trim().is_empty())
}

fn model_reply() -> impl Strategy<Value = Result<String, ModelError>> {
    prop_oneof![
        Just(Err(ModelError::MissingApiKey)),
        Just(Err(ModelError::Transport("connection reset".into()))),
        Just(Err(ModelError::Quota(429))),
        ".{0,200}".prop_map(Ok::<String, ModelError>),
        Just(Ok("```json\n{\"name\": \"\"}\n```".to_string())),
    ]
}

fn resolve(
    name: &str,
    reply: Result<String, ModelError>,
) -> Result<(EntityRecord, RecordSource), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| e.to_string())?;
    let pipeline = ExtractionPipeline::new(Arc::new(Replying(reply)));
    runtime
        .block_on(pipeline.resolve_detailed(name))
        .map(|r| (r.record, r.source))
        .map_err(|e| e.to_string())
}

proptest! {
    #[test]
    fn non_blank_names_always_resolve(name in entity_name(), reply in model_reply()) {
        let failed = reply.is_err();
        let outcome = resolve(&name, reply);
        prop_assert!(outcome.is_ok(), "{:?} -> {:?}", name, outcome);
        let (record, source) = outcome.unwrap();
        prop_assert!(record.check().is_ok());
        prop_assert!(!record.name.trim().is_empty());
        if failed {
            prop_assert_eq!(source, RecordSource::FallbackModelUnavailable);
        }
    }

    #[test]
    fn blank_names_are_the_only_rejections(name in "[ \\t\\r\\n]{0,10}") {
        let outcome = resolve(&name, Err(ModelError::MissingApiKey));
        prop_assert!(outcome.is_err());
    }
}

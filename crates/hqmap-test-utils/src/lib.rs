//! Testing utilities for hqmap workspace
//!
//! Model doubles and response fixtures shared by integration tests.

#![allow(missing_docs)]

use async_trait::async_trait;
use hqmap_extract::{ModelClient, ModelError};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{oneshot, watch};

/// A full, fenced model answer for Alphabet in California
pub const COMPLETE_RESPONSE: &str = r#"```json
{
  "name": "Alphabet Inc.",
  "location": {
    "city": "Mountain View",
    "region": "Santa Clara County",
    "regionCode": "CA",
    "coordinates": { "lat": 37.422, "lng": -122.084 }
  },
  "scale": { "headcount": "180,000+", "industry": "Technology", "revenue": "$307B" },
  "summary": "Alphabet is the parent company of Google.",
  "neighborFlows": [
    { "origin": "San Mateo County", "count": 12000, "percent": 18, "riskLevel": "Medium", "topConcern": "Hypertension" },
    { "origin": "Alameda County", "count": 9000, "percent": 13, "riskLevel": "High", "topConcern": "Diabetes" }
  ],
  "sentimentSamples": [
    { "id": 1, "author": "@bayarea_runner", "content": "Smoke haze again this morning.", "sentiment": "negative", "topic": "air" },
    { "id": 2, "author": "@mv_local", "content": "New bike lanes are great.", "sentiment": "positive", "topic": "happiness" }
  ],
  "searchSignals": [
    { "term": "Air purifier", "volume": "High", "growth": "+120%" }
  ],
  "impact": { "estimatedAnnualCost": 252000000, "costPerEmployee": 1400, "potentialSavings": 70000000, "roiMultiple": 3.6 },
  "costBreakdown": [
    { "name": "Burnout", "cost": 64000000, "formattedCost": "$64M" },
    { "name": "Eye Strain", "cost": 0 }
  ]
}
```"#;

/// Model output that is not JSON at all
pub const NOT_JSON: &str = "I'm sorry, I can't help with that request.";

/// Valid JSON missing `summary`
pub const MISSING_SUMMARY: &str = r#"{"name":"Acme","location":{"city":"Austin","region":"Travis County","regionCode":"TX","coordinates":{"lat":30.27,"lng":-97.74}},"scale":{"headcount":"10"}}"#;

/// Minimal valid response for a company
pub fn record_json(name: &str, region_code: &str, lat: f64, lng: f64) -> String {
    json!({
        "name": name,
        "location": {
            "city": "City",
            "region": "Region",
            "regionCode": region_code,
            "coordinates": { "lat": lat, "lng": lng }
        },
        "scale": { "headcount": "1,000" },
        "summary": format!("{name} summary.")
    })
    .to_string()
}

/// Entity name embedded at the end of an extraction prompt
pub fn prompt_entity(prompt: &str) -> Option<&str> {
    prompt
        .trim_end()
        .rsplit_once("Company: ")
        .map(|(_, name)| name.trim())
}

/// Replays queued results in order; fails with `Transport` once exhausted
#[derive(Debug, Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String, ModelError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(script: impl IntoIterator<Item = Result<String, ModelError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new([Ok(text.into())])
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().push(prompt.to_string());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Transport("script exhausted".into())))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Always fails with the given error
#[derive(Debug)]
pub struct FailingModel {
    error: ModelError,
    calls: AtomicUsize,
}

impl FailingModel {
    pub fn new(error: ModelError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for FailingModel {
    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Holds each call open until the test releases that entity's gate
///
/// Lets tests choose the completion order of overlapping calls.
#[derive(Debug)]
pub struct GatedModel {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<String, ModelError>>>>,
    started: watch::Sender<usize>,
}

/// Release handle for one gated entity
#[derive(Debug)]
pub struct Gate(oneshot::Sender<Result<String, ModelError>>);

impl Gate {
    pub fn release(self, result: Result<String, ModelError>) {
        let _ = self.0.send(result);
    }
}

impl Default for GatedModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GatedModel {
    pub fn new() -> Self {
        Self {
            gates: Mutex::new(HashMap::new()),
            started: watch::Sender::new(0),
        }
    }

    /// Register a gate for the next call about `entity`
    pub fn gate(&self, entity: &str) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(entity.to_string(), rx);
        Gate(tx)
    }

    /// Wait until at least `n` calls have entered `generate`
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.started.subscribe();
        let _ = rx.wait_for(|started| *started >= n).await;
    }
}

#[async_trait]
impl ModelClient for GatedModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let gate = prompt_entity(prompt).and_then(|entity| self.gates.lock().remove(entity));
        self.started.send_modify(|started| *started += 1);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ModelError::Transport("gate dropped".into()))),
            None => Err(ModelError::Transport("no gate registered".into())),
        }
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

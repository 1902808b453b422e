//! Presentation state transitions and overlapping submits

use hqmap_core::{Atlas, AtlasConfig, FencePolicy, PresentationState, ViewStateController};
use hqmap_extract::{ModelClient, ModelError};
use hqmap_geo::ViewportTransform;
use hqmap_record::RecordSource;
use hqmap_test_utils::{record_json, FailingModel, GatedModel, ScriptedModel, COMPLETE_RESPONSE};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn controller(model: Arc<dyn ModelClient>, fence: FencePolicy) -> Arc<ViewStateController> {
    let atlas = Atlas::with_model(AtlasConfig::new().with_fence(fence), model);
    Arc::new(atlas.controller())
}

fn shown_name(controller: &ViewStateController) -> Option<String> {
    controller.snapshot().record().map(|r| r.name.clone())
}

#[tokio::test]
async fn submit_focuses_and_reset_returns_to_overview() {
    let model = Arc::new(ScriptedModel::replying(COMPLETE_RESPONSE));
    let controller = controller(model, FencePolicy::LastWriteWins);
    assert_eq!(controller.snapshot(), PresentationState::Overview);

    let submission = controller.submit("Alphabet").await.unwrap();
    assert!(submission.applied);
    assert_eq!(submission.source, RecordSource::Extracted);
    assert_eq!(submission.generation, 1);
    assert_eq!(submission.transform.scale, 1.8);

    let state = controller.snapshot();
    assert!(state.is_focused());
    assert_eq!(state.transform(), submission.transform);
    assert_eq!(state.record().unwrap().location.region_code, "CA");

    assert!(controller.reset());
    assert_eq!(controller.snapshot(), PresentationState::Overview);
    assert!(!controller.reset());
}

#[tokio::test]
async fn invalid_query_leaves_state_untouched() {
    let model = Arc::new(ScriptedModel::replying(COMPLETE_RESPONSE));
    let controller = controller(model.clone(), FencePolicy::DiscardStale);

    let err = controller.submit("   ").await.unwrap_err();
    assert!(err.is_invalid_query());
    assert_eq!(controller.generation(), 0);
    assert_eq!(controller.snapshot(), PresentationState::Overview);
    assert_eq!(model.calls(), 0);

    controller.submit("Alphabet").await.unwrap();
    let err = controller.submit("").await.unwrap_err();
    assert!(err.is_invalid_query());
    assert_eq!(shown_name(&controller).as_deref(), Some("Alphabet Inc."));
}

#[tokio::test]
async fn degraded_results_still_focus() {
    let model = Arc::new(FailingModel::new(ModelError::MissingApiKey));
    let controller = controller(model.clone(), FencePolicy::LastWriteWins);

    let submission = controller.submit("Initech").await.unwrap();
    assert!(submission.applied);
    assert_eq!(submission.source, RecordSource::FallbackModelUnavailable);
    assert_eq!(submission.record.name, "Initech");
    assert_eq!(submission.record.location.region_code, "CA");
    assert_eq!(submission.transform.scale, 1.8);
    assert_eq!(model.calls(), 1);

    let malformed = self::controller(
        Arc::new(ScriptedModel::replying("no json here")),
        FencePolicy::LastWriteWins,
    );
    let submission = malformed.submit("Initech").await.unwrap();
    assert_eq!(submission.source, RecordSource::FallbackMalformed);
    assert!(malformed.snapshot().is_focused());
}

#[tokio::test]
async fn unknown_region_falls_back_to_projection() {
    let model = Arc::new(ScriptedModel::replying(record_json(
        "Acme", "ZZ", 37.7749, -122.4194,
    )));
    let controller = controller(model, FencePolicy::LastWriteWins);
    let submission = controller.submit("Acme").await.unwrap();
    assert_eq!(submission.transform.scale, 2.0);
    assert!(!submission.transform.is_identity());

    let model = Arc::new(ScriptedModel::replying(record_json("Acme", "ZZ", 48.85, 2.35)));
    let controller = self::controller(model, FencePolicy::LastWriteWins);
    let submission = controller.submit("Acme").await.unwrap();
    assert!(submission.applied);
    assert_eq!(submission.transform, ViewportTransform::IDENTITY);
}

#[tokio::test]
async fn subscribers_see_changes() {
    let model = Arc::new(ScriptedModel::replying(COMPLETE_RESPONSE));
    let controller = controller(model, FencePolicy::LastWriteWins);
    let mut rx = controller.subscribe();
    assert!(!rx.has_changed().unwrap());

    controller.submit("Alphabet").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_focused());

    controller.reset();
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().is_focused());
}

#[tokio::test]
async fn last_write_wins_shows_the_last_completion() {
    let model = Arc::new(GatedModel::new());
    let alpha = model.gate("Alpha");
    let beta = model.gate("Beta");
    let controller = controller(model.clone(), FencePolicy::LastWriteWins);

    let first = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit("Alpha").await }
    });
    model.wait_for_calls(1).await;
    let second = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit("Beta").await }
    });
    model.wait_for_calls(2).await;

    beta.release(Ok(record_json("Beta", "NY", 40.71, -74.0)));
    let second = second.await.unwrap().unwrap();
    assert!(second.applied);
    assert_eq!(shown_name(&controller).as_deref(), Some("Beta"));

    alpha.release(Ok(record_json("Alpha", "TX", 30.27, -97.74)));
    let first = first.await.unwrap().unwrap();
    assert!(first.applied);
    assert!(first.generation < second.generation);

    assert_eq!(shown_name(&controller).as_deref(), Some("Alpha"));
    assert_eq!(controller.applied_generation(), first.generation);
    assert_eq!(controller.snapshot().transform().scale, 1.5);
}

#[tokio::test]
async fn discard_stale_keeps_the_newest_submit() {
    let model = Arc::new(GatedModel::new());
    let alpha = model.gate("Alpha");
    let beta = model.gate("Beta");
    let controller = controller(model.clone(), FencePolicy::DiscardStale);

    let first = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit("Alpha").await }
    });
    model.wait_for_calls(1).await;
    let second = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit("Beta").await }
    });
    model.wait_for_calls(2).await;

    beta.release(Ok(record_json("Beta", "NY", 40.71, -74.0)));
    let second = second.await.unwrap().unwrap();
    assert!(second.applied);

    alpha.release(Ok(record_json("Alpha", "TX", 30.27, -97.74)));
    let first = first.await.unwrap().unwrap();
    assert!(!first.applied);
    assert_eq!(first.record.name, "Alpha");

    assert_eq!(shown_name(&controller).as_deref(), Some("Beta"));
    assert_eq!(controller.applied_generation(), second.generation);
    assert_eq!(controller.snapshot().transform().scale, 2.5);
}

#[tokio::test]
async fn discard_stale_reset_drops_in_flight_submit() {
    let model = Arc::new(GatedModel::new());
    let alpha = model.gate("Alpha");
    let controller = controller(model.clone(), FencePolicy::DiscardStale);

    let pending = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit("Alpha").await }
    });
    model.wait_for_calls(1).await;
    assert!(!controller.reset());

    alpha.release(Ok(record_json("Alpha", "TX", 30.27, -97.74)));
    let submission = pending.await.unwrap().unwrap();
    assert!(!submission.applied);
    assert_eq!(controller.snapshot(), PresentationState::Overview);
}

#[tokio::test]
async fn last_write_wins_completion_after_reset_applies() {
    let model = Arc::new(GatedModel::new());
    let alpha = model.gate("Alpha");
    let controller = controller(model.clone(), FencePolicy::LastWriteWins);

    let pending = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit("Alpha").await }
    });
    model.wait_for_calls(1).await;
    controller.reset();

    alpha.release(Ok(record_json("Alpha", "TX", 30.27, -97.74)));
    let submission = pending.await.unwrap().unwrap();
    assert!(submission.applied);
    assert_eq!(shown_name(&controller).as_deref(), Some("Alpha"));
}

#[tokio::test]
async fn failed_gated_call_still_applies_fallback() {
    let model = Arc::new(GatedModel::new());
    let alpha = model.gate("Alpha");
    let controller = controller(model.clone(), FencePolicy::DiscardStale);

    let pending = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit("Alpha").await }
    });
    model.wait_for_calls(1).await;
    alpha.release(Err(ModelError::Quota(429)));

    let submission = pending.await.unwrap().unwrap();
    assert!(submission.applied);
    assert_eq!(submission.source, RecordSource::FallbackModelUnavailable);
    assert!(submission.record.summary.contains("unavailable"));
}

#[derive(Debug, Clone)]
enum Op {
    Submit(String),
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => prop_oneof![Just(String::new()), "[A-Za-z]{1,8}"].prop_map(Op::Submit),
        1 => Just(Op::Reset),
    ]
}

proptest! {
    #[test]
    fn sequential_operations_track_the_last_one(
        ops in proptest::collection::vec(op(), 1..12),
        discard in any::<bool>(),
    ) {
        let fence = if discard { FencePolicy::DiscardStale } else { FencePolicy::LastWriteWins };
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let script = ops.iter().filter(|op| matches!(op, Op::Submit(name) if !name.is_empty()));
            let model = Arc::new(ScriptedModel::new(script.map(|op| match op {
                Op::Submit(name) => Ok(record_json(name, "TX", 30.27, -97.74)),
                Op::Reset => unreachable!(),
            })));
            let controller = controller(model, fence);

            let mut expected: Option<String> = None;
            for op in &ops {
                match op {
                    Op::Submit(name) => match controller.submit(name).await {
                        Ok(submission) => {
                            prop_assert!(submission.applied);
                            expected = Some(name.clone());
                        }
                        Err(e) => prop_assert!(e.is_invalid_query()),
                    },
                    Op::Reset => {
                        prop_assert_eq!(controller.reset(), expected.is_some());
                        expected = None;
                    }
                }
                prop_assert_eq!(shown_name(&controller), expected.clone());
                prop_assert_eq!(controller.applied_generation(), controller.generation());
            }
            Ok(())
        })?;
    }
}

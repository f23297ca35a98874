//! Predictor behaviour across the train, predict and insights lifecycle.
//!
//! Every test wires the predictor to in-memory providers and a throwaway
//! model directory, so no network access is needed.

use stocksense_core::{Bar, LiveQuote, QuoteSnapshot, UtcDateTime};
use stocksense_ml::{
    Dataset, ModelState, Predictor, PredictorError, RetrainPool, RetrainStatus, TrainOutcome,
};
use stocksense_tests::{
    bars_from_closes, fast_config, market, symbol, Arc, CountingFitter, FailingHistory,
    StaticHistory, StaticLiveQuote,
};

const RISING: [f64; 8] = [100.0, 101.5, 103.0, 102.0, 104.5, 106.0, 105.5, 107.0];

fn predictor_over(history: Arc<StaticHistory>, dir: &std::path::Path) -> Predictor {
    Predictor::new(
        market(history, Arc::new(StaticLiveQuote::unavailable())),
        fast_config(dir),
    )
}

// ============================================================================
// Training and prediction
// ============================================================================

#[tokio::test]
async fn when_symbol_has_history_system_trains_and_predicts_finite_close() {
    // Given: eight sessions of history and no live quote
    let dir = tempfile::tempdir().expect("temp dir");
    let predictor = predictor_over(Arc::new(StaticHistory::with_closes(&RISING)), dir.path());
    let tcs = symbol("TCS");

    // When: training then predicting
    let outcome = predictor.train(&tcs).await.expect("train succeeds");
    let prediction = predictor.predict(&tcs).await.expect("predict succeeds");

    // Then: the model is fitted on N - 1 pairs and the prediction is in range
    assert!(matches!(
        outcome,
        TrainOutcome::Fitted { samples, training_rmse: Some(_) } if samples == RISING.len() - 1
    ));
    assert_eq!(predictor.state(&tcs), ModelState::Trained);
    assert!(prediction.is_finite());
    assert!((101.5..=107.0).contains(&prediction));
    assert!(predictor.store().exists(&tcs));
}

#[tokio::test]
async fn when_artifact_exists_system_never_refits_on_train() {
    // Given: a predictor that has already trained INFY
    let dir = tempfile::tempdir().expect("temp dir");
    let fitter = Arc::new(CountingFitter::default());
    let predictor = predictor_over(Arc::new(StaticHistory::with_closes(&RISING)), dir.path())
        .with_fitter(fitter.clone());
    let infy = symbol("INFY");
    predictor.train(&infy).await.expect("first train");

    // When: training again
    let second = predictor.train(&infy).await.expect("second train");

    // Then: the stored artifact is reused
    assert_eq!(second, TrainOutcome::Loaded);
    assert_eq!(fitter.fits(), 1);

    // And: an explicit retrain does refit
    let retrained = predictor.retrain(&infy).await.expect("retrain");
    assert!(matches!(retrained, TrainOutcome::Fitted { .. }));
    assert_eq!(fitter.fits(), 2);
}

#[tokio::test]
async fn when_new_predictor_loads_artifact_system_predicts_identically() {
    // Given: one predictor trained and persisted a model
    let dir = tempfile::tempdir().expect("temp dir");
    let history = Arc::new(StaticHistory::with_closes(&RISING));
    let wipro = symbol("WIPRO");
    let first = predictor_over(history.clone(), dir.path());
    first.train(&wipro).await.expect("train");
    let expected = first.predict(&wipro).await.expect("predict");

    // When: a fresh predictor over the same directory trains the same symbol
    let fitter = Arc::new(CountingFitter::default());
    let second = predictor_over(history, dir.path()).with_fitter(fitter.clone());
    let outcome = second.train(&wipro).await.expect("train from store");
    let actual = second.predict(&wipro).await.expect("predict");

    // Then: the artifact is loaded and the prediction is unchanged
    assert_eq!(outcome, TrainOutcome::Loaded);
    assert_eq!(fitter.fits(), 0);
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn when_history_is_too_short_system_stays_untrained() {
    for closes in [&[][..], &[100.0][..]] {
        // Given: zero or one session of history
        let dir = tempfile::tempdir().expect("temp dir");
        let predictor = predictor_over(Arc::new(StaticHistory::with_closes(closes)), dir.path());
        let hdfc = symbol("HDFCBANK");

        // When: training
        let outcome = predictor.train(&hdfc).await.expect("train returns outcome");

        // Then: no model exists and prediction reports not ready
        assert_eq!(outcome, TrainOutcome::InsufficientData { bars: closes.len() });
        assert!(!outcome.is_trained());
        assert_eq!(predictor.state(&hdfc), ModelState::Untrained);
        assert!(!predictor.store().exists(&hdfc));
        assert!(matches!(
            predictor.predict(&hdfc).await,
            Err(PredictorError::NotReady { .. })
        ));
    }
}

#[tokio::test]
async fn when_refit_finds_too_little_data_system_keeps_trained_model() {
    // Given: a trained symbol whose history later shrinks to one session
    let dir = tempfile::tempdir().expect("temp dir");
    let history = Arc::new(StaticHistory::with_closes(&RISING));
    let predictor = predictor_over(history.clone(), dir.path());
    let tcs = symbol("TCS");
    predictor.train(&tcs).await.expect("train");
    history.replace_closes(&[RISING[0]]);

    // When: forcing a refit
    let outcome = predictor.retrain(&tcs).await.expect("retrain returns outcome");

    // Then: the previous model stays installed and keeps predicting
    assert_eq!(outcome, TrainOutcome::InsufficientData { bars: 1 });
    assert_eq!(predictor.state(&tcs), ModelState::Trained);
    assert!(predictor.store().exists(&tcs));
    assert!(predictor.predict(&tcs).await.expect("predict").is_finite());
}

#[tokio::test]
async fn when_history_fetch_fails_system_propagates_source_error() {
    // Given: a history provider that is down
    let dir = tempfile::tempdir().expect("temp dir");
    let predictor = Predictor::new(
        market(
            Arc::new(FailingHistory),
            Arc::new(StaticLiveQuote::unavailable()),
        ),
        fast_config(dir.path()),
    );
    let sbin = symbol("SBIN");

    // When: training
    let result = predictor.train(&sbin).await;

    // Then: the fetch error surfaces and the symbol stays untrained
    assert!(matches!(result, Err(PredictorError::Fetch(_))));
    assert_eq!(predictor.state(&sbin), ModelState::Untrained);
}

// ============================================================================
// Feature construction
// ============================================================================

#[test]
fn when_live_quote_is_missing_system_uses_bar_values() {
    // Given: one bar with high 10, low 8, volume 1000 and a follow-up bar
    let ts = UtcDateTime::parse("2024-05-06T09:15:00Z").expect("ts");
    let next_ts = UtcDateTime::parse("2024-05-07T09:15:00Z").expect("ts");
    let bars = vec![
        Bar::new(ts, 9.0, 10.0, 8.0, 9.5, Some(1_000)).expect("bar"),
        Bar::new(next_ts, 9.5, 11.0, 9.0, 10.5, Some(1_200)).expect("bar"),
    ];

    // When: building features without a live quote
    let dataset = Dataset::from_bars(&bars, &StaticLiveQuote::unavailable().0);

    // Then: the snapshot columns repeat the bar values
    assert_eq!(dataset.features[0][4..], [10.0, 8.0, 1_000.0]);
}

#[test]
fn when_live_quote_is_partial_system_falls_back_per_field() {
    // Given: a live quote that only carries the day high
    let bars = bars_from_closes(&[50.0, 51.0]);
    let quote = LiveQuote::Available(QuoteSnapshot {
        day_high: Some(55.0),
        ..QuoteSnapshot::default()
    });

    // When: building features
    let dataset = Dataset::from_bars(&bars, &quote);

    // Then: day high is live while day low and volume come from the bar
    assert_eq!(dataset.features[0][4..], [55.0, 49.0, 10_000.0]);
}

#[test]
fn when_pairing_sessions_system_labels_each_row_with_next_close() {
    // Given: five sessions
    let closes = [5.0, 7.0, 9.0, 6.0, 8.0];
    let bars = bars_from_closes(&closes);

    // When: building the training set
    let dataset = Dataset::from_bars(&bars, &StaticLiveQuote::unavailable().0);

    // Then: N bars give N - 1 examples labelled with the following close
    assert_eq!(dataset.n_samples(), closes.len() - 1);
    assert_eq!(dataset.labels, closes[1..]);
    assert_eq!(dataset.timestamps.len(), closes.len() - 1);
    assert_eq!(dataset.features[2][0], 9.0);
}

// ============================================================================
// Insights
// ============================================================================

#[tokio::test]
async fn when_symbol_is_untrained_system_reports_insights_not_ready() {
    // Given: a predictor that has never trained LT
    let dir = tempfile::tempdir().expect("temp dir");
    let predictor = predictor_over(Arc::new(StaticHistory::with_closes(&RISING)), dir.path());

    // When: requesting insights
    let result = predictor.insights(&symbol("LT")).await;

    // Then: the predictor reports the symbol as not ready
    assert!(matches!(result, Err(PredictorError::NotReady { .. })));
}

#[tokio::test]
async fn when_recent_closes_peak_system_reports_breakout_at_maximum() {
    // Given: a trained model over closes 5, 7, 9, 6, 8
    let dir = tempfile::tempdir().expect("temp dir");
    let predictor = predictor_over(
        Arc::new(StaticHistory::with_closes(&[5.0, 7.0, 9.0, 6.0, 8.0])),
        dir.path(),
    );
    let itc = symbol("ITC");
    predictor.train(&itc).await.expect("train");

    // When: requesting insights
    let insights = predictor.insights(&itc).await.expect("insights");

    // Then: the breakout level is the highest recent close
    assert_eq!(insights.breakout_level, 9.0);
    assert_eq!(
        insights.breakout_prediction,
        "Breakout will be confirmed if price closes above 9.00"
    );
    assert_eq!(insights.chart_pattern, "No clear pattern detected");
}

#[tokio::test]
async fn when_peak_is_older_than_window_system_ignores_it() {
    // Given: 25 sessions with the highest close in the first five
    let mut closes = vec![12.0, 14.0, 50.0, 13.0, 15.0];
    closes.extend((0..20).map(|i| 10.0 + f64::from(i % 10)));
    let dir = tempfile::tempdir().expect("temp dir");
    let predictor = predictor_over(Arc::new(StaticHistory::with_closes(&closes)), dir.path());
    let lt = symbol("LT");
    predictor.train(&lt).await.expect("train");

    // When: requesting insights
    let insights = predictor.insights(&lt).await.expect("insights");

    // Then: only the last 20 sessions count towards the breakout level
    assert_eq!(insights.breakout_level, 19.0);
}

// ============================================================================
// Background retraining
// ============================================================================

#[tokio::test]
async fn when_retrain_is_requested_twice_system_runs_single_flight() {
    // Given: a retrain pool over a trained symbol
    let dir = tempfile::tempdir().expect("temp dir");
    let fitter = Arc::new(CountingFitter::default());
    let predictor = Arc::new(
        predictor_over(Arc::new(StaticHistory::with_closes(&RISING)), dir.path())
            .with_fitter(fitter.clone()),
    );
    let tcs = symbol("TCS");
    predictor.train(&tcs).await.expect("train");
    let pool = RetrainPool::new(Arc::clone(&predictor), 2);

    // When: scheduling the same symbol twice before the first completes
    let first = pool.schedule(tcs.clone());
    let second = pool.schedule(tcs.clone());
    pool.drain().await;

    // Then: only one refit ran and the symbol is free again
    assert_eq!(first, RetrainStatus::Scheduled);
    assert_eq!(second, RetrainStatus::AlreadyInFlight);
    assert_eq!(fitter.fits(), 2);
    assert!(!pool.is_in_flight(&tcs));
    assert_eq!(predictor.state(&tcs), ModelState::Trained);
}

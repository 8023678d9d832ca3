use std::sync::Arc;

use candela::{CandelaError, Candela, HistoryStatus, Resolution, SeriesKey, SymbolDatabase};
use candela_mock::{DynamicMockConnector, MockBehavior, MockConnector};

use crate::helpers::{EUR_USD, H, T0, bars, engine, engine_with, hourly};

#[tokio::test]
async fn upstream_failure_answers_error_and_caches_nothing() {
    let (candela, mock) = engine();

    let resp = candela.history("FAIL", Resolution::H1, T0, T0 + 10 * H).await;

    assert_eq!(mock.calls(), 1);
    assert_eq!(resp.status, HistoryStatus::Error);
    assert!(resp.errmsg.as_deref().unwrap().contains("400"));
    let key = SeriesKey::new("FAIL", Resolution::H1);
    assert!(candela.store().peek(&key).await.is_none());

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["s"], "error");
    assert!(json.get("t").is_none());
}

#[tokio::test]
async fn timeout_answers_error() {
    let (candela, _mock) = engine();
    let resp = candela.history("TIMEOUT", Resolution::H1, T0, T0 + 10 * H).await;
    assert_eq!(resp.status, HistoryStatus::Error);
    assert!(resp.errmsg.unwrap().contains("timed out"));
}

#[tokio::test]
async fn failed_append_keeps_the_cached_series() {
    let (upstream, ctl) = DynamicMockConnector::new_with_controller("dyn");
    let candela = Candela::builder().with_provider(upstream).build().unwrap();
    ctl.set_behavior(EUR_USD, MockBehavior::Return(bars(hourly(T0 + H, 5), 1)))
        .await;
    let before = candela.history(EUR_USD, Resolution::H1, T0, T0 + 5 * H).await;
    assert!(before.is_ok());

    ctl.push_once(
        EUR_USD,
        MockBehavior::Fail(CandelaError::transport("connection reset", 4)),
    )
    .await;
    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 8 * H).await;

    assert_eq!(resp.status, HistoryStatus::Error);
    assert!(resp.errmsg.unwrap().contains("4 attempt"));
    let cached = candela
        .store()
        .get(&SeriesKey::new(EUR_USD, Resolution::H1))
        .await;
    assert_eq!(cached, before.series);
}

#[tokio::test]
async fn one_failing_chunk_aborts_the_whole_fetch() {
    // 100 hourly bars against a 60-bar upstream limit, but the engine allows 100 per call
    let (candela, mock) = {
        let mock = Arc::new(MockConnector::new().with_max_bars(60));
        let c = Candela::builder()
            .with_provider(mock.clone())
            .max_bars_per_call(100)
            .build()
            .unwrap();
        (c, mock)
    };
    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 100 * H).await;

    assert_eq!(mock.calls(), 1);
    assert_eq!(resp.status, HistoryStatus::Error);
    assert!(resp.errmsg.unwrap().contains("Maximum value for 'count' exceeded"));
    assert!(candela.store().peek(&SeriesKey::new(EUR_USD, Resolution::H1)).await.is_none());
}

#[tokio::test]
async fn empty_window_is_rejected_without_upstream_call() {
    let (candela, mock) = engine();

    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0).await;
    assert_eq!(resp.status, HistoryStatus::Error);
    assert!(resp.errmsg.unwrap().contains("empty range"));

    let resp = candela.history(EUR_USD, Resolution::H1, T0 + H, T0).await;
    assert_eq!(resp.status, HistoryStatus::Error);
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn unknown_symbol_is_rejected_when_symbols_are_known() {
    let mock = Arc::new(MockConnector::new());
    let candela = Candela::builder()
        .with_provider(mock.clone())
        .with_symbols(Arc::new(SymbolDatabase::with_defaults()))
        .build()
        .unwrap();

    let resp = candela.history("EUR_XXX", Resolution::H1, T0, T0 + 10 * H).await;
    assert_eq!(resp.status, HistoryStatus::Error);
    assert!(resp.errmsg.unwrap().contains("unknown_symbol EUR_XXX"));
    assert_eq!(mock.calls(), 0);

    // exchange-qualified and lower-case names share the canonical cache entry
    let a = candela.history("OANDA:EUR_USD", Resolution::H1, T0, T0 + 10 * H).await;
    let b = candela.history("eur_usd", Resolution::H1, T0, T0 + 10 * H).await;
    assert!(a.is_ok());
    assert_eq!(a, b);
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.requests()[0].symbol, EUR_USD);
}

#[tokio::test]
async fn builder_rejects_missing_provider_and_zero_limits() {
    assert!(matches!(
        Candela::builder().build(),
        Err(CandelaError::InvalidArg(_))
    ));
    let (ok, _) = engine_with(MockConnector::new());
    assert_eq!(ok.provider_name(), "candela-mock");

    let mock = Arc::new(MockConnector::new());
    assert!(
        Candela::builder()
            .with_provider(mock.clone())
            .max_bars_per_call(0)
            .build()
            .is_err()
    );
    assert!(
        Candela::builder()
            .with_provider(mock)
            .max_concurrent_fetches(0)
            .build()
            .is_err()
    );
}

#[tokio::test]
async fn unrepresentable_timestamps_are_rejected() {
    let (candela, mock) = engine();

    let resp = candela.history(EUR_USD, Resolution::H1, i64::MIN + 1, T0).await;
    assert_eq!(resp.status, HistoryStatus::Error);
    assert!(resp.errmsg.unwrap().contains("out of the supported range"));

    let resp = candela.history(EUR_USD, Resolution::D1, T0, i64::MAX).await;
    assert_eq!(resp.status, HistoryStatus::Error);
    assert_eq!(mock.calls(), 0);
}

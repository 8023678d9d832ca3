use std::sync::Arc;
use std::time::Duration;

use candela::{Candela, Resolution, SeriesKey};
use candela_mock::MockConnector;

use crate::helpers::{EUR_USD, H, T0, engine_with};

#[tokio::test]
async fn concurrent_requests_for_one_key_fetch_once() {
    let (candela, mock) = engine_with(MockConnector::new().with_latency(Duration::from_millis(30)));

    let (a, b) = tokio::join!(
        candela.history(EUR_USD, Resolution::H1, T0, T0 + 10 * H),
        candela.history(EUR_USD, Resolution::H1, T0, T0 + 10 * H),
    );

    assert_eq!(mock.calls(), 1);
    assert!(a.is_ok());
    assert_eq!(a, b);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_keys_fetch_in_parallel() {
    let (candela, mock) = engine_with(MockConnector::new().with_latency(Duration::from_millis(50)));

    let symbols = ["EUR_USD", "GBP_USD", "USD_JPY", "AUD_USD"];
    let tasks = symbols.iter().map(|s| {
        let c = candela.clone();
        let s = (*s).to_string();
        tokio::spawn(async move { c.history(&s, Resolution::H1, T0, T0 + 10 * H).await })
    });
    let results = futures::future::join_all(tasks).await;

    assert!(results.into_iter().all(|r| r.unwrap().is_ok()));
    assert_eq!(mock.calls(), 4);
    assert!(mock.peak_in_flight() > 1);
}

#[tokio::test]
async fn dropped_caller_still_merges_the_fetch() {
    let mock = Arc::new(MockConnector::new().with_latency(Duration::from_millis(100)));
    let candela = Candela::builder()
        .with_provider(mock.clone())
        .build()
        .unwrap();

    let gave_up = tokio::time::timeout(
        Duration::from_millis(10),
        candela.history(EUR_USD, Resolution::H1, T0, T0 + 10 * H),
    )
    .await;
    assert!(gave_up.is_err());

    tokio::time::sleep(Duration::from_millis(300)).await;
    let cached = candela
        .store()
        .peek(&SeriesKey::new(EUR_USD, Resolution::H1))
        .await
        .expect("merged after the caller left");
    assert_eq!(cached.len(), 10);

    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 10 * H).await;
    assert_eq!(resp.series, cached);
    assert_eq!(mock.calls(), 1);
}

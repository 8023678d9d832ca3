use std::sync::Arc;

use candela::{CacheStore, Candela, Decimal, HistoryStatus, Resolution, SeriesKey};
use candela_mock::{DynamicMockConnector, MockBehavior, MockConnector};

use crate::helpers::{EUR_USD, H, SAT, T0, bars, engine, hourly};

#[tokio::test]
async fn wide_head_gap_is_prepended() {
    let (candela, mock) = engine();
    candela
        .history(EUR_USD, Resolution::H1, T0 + 48 * H, T0 + 60 * H)
        .await;

    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 60 * H).await;

    assert_eq!(mock.calls(), 2);
    let prepend = &mock.requests()[1];
    assert_eq!(
        (prepend.range.from(), prepend.range.to()),
        (T0, T0 + 49 * H)
    );
    // the upstream re-reports the cached head; it is kept once
    assert_eq!(resp.series.len(), 60);
    assert_eq!(resp.series.first_time(), Some(T0 + H));
    assert!(resp.series.times().windows(2).all(|w| w[1] - w[0] == H));
}

#[tokio::test]
async fn one_gap_per_request_head_first() {
    let (candela, mock) = engine();
    candela
        .history(EUR_USD, Resolution::H1, T0 + 48 * H, T0 + 60 * H)
        .await;

    let first = candela.history(EUR_USD, Resolution::H1, T0, T0 + 80 * H).await;
    assert_eq!(mock.calls(), 2);
    assert_eq!(first.series.last_time(), Some(T0 + 60 * H));

    let second = candela.history(EUR_USD, Resolution::H1, T0, T0 + 80 * H).await;
    assert_eq!(mock.calls(), 3);
    let append = &mock.requests()[2];
    assert_eq!(append.range.from(), T0 + 60 * H);
    assert_eq!(second.series.len(), 80);
}

#[tokio::test]
async fn empty_prepend_outcome_leaves_cache_alone() {
    let (upstream, ctl) = DynamicMockConnector::new_with_controller("dyn");
    let key = SeriesKey::new(EUR_USD, Resolution::H1);
    let store = Arc::new(CacheStore::new());
    store.replace(&key, bars(hourly(T0 + 20 * H, 5), 1)).await;
    let candela = Candela::builder()
        .with_provider(upstream)
        .store(Arc::clone(&store))
        .max_bars_per_call(5)
        .build()
        .unwrap();

    // bars only far from the head of the planned range: a leading gap
    ctl.set_behavior(EUR_USD, MockBehavior::Return(bars(hourly(T0 + 15 * H, 3), 7)))
        .await;
    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 24 * H).await;

    assert_eq!(ctl.calls().await, 4);
    assert_eq!(store.get(&key).await.len(), 5);
    assert_eq!(resp.series.len(), 5);
    assert!(resp.series.closes().iter().all(|c| *c == Decimal::new(1, 0)));
}

#[tokio::test]
async fn end_on_saturday_does_not_append() {
    let (candela, mock) = engine();
    // Friday 2024-01-12 00:00 .. 12:00
    let fri = T0 + 4 * 24 * H;
    candela.history(EUR_USD, Resolution::H1, fri, fri + 12 * H).await;

    let sat_noon = fri + 36 * H;
    let resp = candela.history(EUR_USD, Resolution::H1, fri, sat_noon).await;

    assert_eq!(mock.calls(), 1);
    assert_eq!(resp.series.len(), 12);
}

#[tokio::test]
async fn end_in_the_future_is_clamped_to_now() {
    let now = T0 + 10 * H + 1800;
    let (upstream, ctl) = DynamicMockConnector::new_with_controller("dyn");
    ctl.set_behavior(EUR_USD, MockBehavior::Return(bars(hourly(T0 + H, 10), 1)))
        .await;
    let candela = Candela::builder()
        .with_provider(upstream)
        .clock(move || now)
        .build()
        .unwrap();

    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 100 * H).await;

    assert!(resp.is_ok());
    let reqs = ctl.requests().await;
    assert_eq!(reqs[0].range.to(), now);
    assert_eq!(resp.series.len(), 10);

    // the open tail is refetched up to now
    candela.history(EUR_USD, Resolution::H1, T0, T0 + 100 * H).await;
    assert_eq!(ctl.calls().await, 2);
    assert_eq!(ctl.requests().await[1].range.from(), T0 + 10 * H);
}

#[tokio::test]
async fn closure_window_skips_upstream_even_with_warm_cache() {
    let (candela, mock) = engine();
    let warm = candela.history(EUR_USD, Resolution::H1, T0, T0 + 10 * H).await;
    assert!(warm.is_ok());
    assert_eq!(mock.calls(), 1);

    let resp = candela
        .history(EUR_USD, Resolution::H1, SAT, SAT + 12 * H)
        .await;

    assert_eq!(mock.calls(), 1);
    assert_eq!(resp.status, HistoryStatus::NoData);
}

#[tokio::test]
async fn append_clamped_to_now_ignores_future_saturday_end() {
    // Friday 2024-01-05 00:00 UTC; the market is still open at 15:00
    let fri = 1_704_412_800;
    let mock = Arc::new(MockConnector::new().with_max_bars(5000));
    let candela = Candela::builder()
        .with_provider(mock.clone())
        .clock(move || fri + 15 * H)
        .build()
        .unwrap();
    candela.history(EUR_USD, Resolution::H1, fri, fri + 5 * H).await;

    // window ends Saturday 10:00, after now
    let resp = candela.history(EUR_USD, Resolution::H1, fri, fri + 34 * H).await;

    assert_eq!(mock.calls(), 2);
    let append = &mock.requests()[1];
    assert_eq!(
        (append.range.from(), append.range.to()),
        (fri + 5 * H, fri + 15 * H)
    );
    assert_eq!(resp.series.last_time(), Some(fri + 15 * H));
    assert_eq!(resp.series.len(), 15);
}

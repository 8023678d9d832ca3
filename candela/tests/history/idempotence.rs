use candela::{HistoryStatus, Resolution};

use crate::helpers::{EUR_USD, H, T0, engine};

#[tokio::test]
async fn repeated_request_costs_no_upstream_call() {
    let (candela, mock) = engine();

    let first = candela.history(EUR_USD, Resolution::H1, T0, T0 + 24 * H).await;
    let second = candela.history(EUR_USD, Resolution::H1, T0, T0 + 24 * H).await;

    assert_eq!(mock.calls(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn sub_window_is_served_from_cache() {
    let (candela, mock) = engine();
    candela.history(EUR_USD, Resolution::H1, T0, T0 + 24 * H).await;

    let resp = candela
        .history(EUR_USD, Resolution::H1, T0 + 3 * H, T0 + 6 * H)
        .await;

    assert_eq!(mock.calls(), 1);
    assert_eq!(resp.status, HistoryStatus::Ok);
    // inclusive on both ends
    assert_eq!(resp.series.times(), &[T0 + 3 * H, T0 + 4 * H, T0 + 5 * H, T0 + 6 * H]);
}

#[tokio::test]
async fn resolutions_are_cached_independently() {
    let (candela, mock) = engine();
    candela.history(EUR_USD, Resolution::H1, T0, T0 + 24 * H).await;
    candela.history(EUR_USD, Resolution::H4, T0, T0 + 24 * H).await;
    candela.history("GBP_USD", Resolution::H1, T0, T0 + 24 * H).await;

    assert_eq!(mock.calls(), 3);
    assert_eq!(candela.store().len(), 3);
}

#[tokio::test]
async fn series_is_strictly_increasing_after_several_merges() {
    let (candela, _mock) = engine();
    candela.history(EUR_USD, Resolution::H1, T0 + 20 * H, T0 + 30 * H).await;
    candela.history(EUR_USD, Resolution::H1, T0, T0 + 30 * H).await;
    candela.history(EUR_USD, Resolution::H1, T0, T0 + 50 * H).await;
    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 50 * H).await;

    let times = resp.series.times();
    assert_eq!(times.len(), 50);
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

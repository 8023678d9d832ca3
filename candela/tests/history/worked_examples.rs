use std::sync::Arc;

use candela::{CacheStore, Candela, Decimal, HistoryStatus, Resolution, SeriesKey};

use crate::helpers::{EUR_USD, H, SAT, Scripted, T0, bars, engine, hourly};

#[tokio::test]
async fn empty_cache_fetches_full_window() {
    let (candela, mock) = engine();

    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 10 * H).await;

    assert_eq!(resp.status, HistoryStatus::Ok);
    assert_eq!(mock.calls(), 1);
    let req = &mock.requests()[0];
    assert_eq!((req.range.from(), req.range.to()), (T0, T0 + 10 * H));
    assert!(!req.include_first);

    let times = resp.series.times();
    assert_eq!(times.len(), 10);
    assert!(times.windows(2).all(|w| w[1] - w[0] == H));

    let cached = candela
        .store()
        .get(&SeriesKey::new(EUR_USD, Resolution::H1))
        .await;
    assert_eq!(cached, resp.series);
}

#[tokio::test]
async fn covered_head_only_appends_the_tail() {
    let (candela, mock) = engine();
    candela.history(EUR_USD, Resolution::H1, T0, T0 + 5 * H).await;
    assert_eq!(mock.calls(), 1);

    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 8 * H).await;

    assert_eq!(mock.calls(), 2);
    let append = &mock.requests()[1];
    assert_eq!(
        (append.range.from(), append.range.to()),
        (T0 + 5 * H, T0 + 8 * H)
    );
    assert_eq!(resp.series.len(), 8);
    assert_eq!(resp.series.first_time(), Some(T0 + H));
    assert_eq!(resp.series.last_time(), Some(T0 + 8 * H));
}

#[tokio::test]
async fn re_reported_boundary_bar_appears_once_with_new_values() {
    let key = SeriesKey::new(EUR_USD, Resolution::H1);
    let store = Arc::new(CacheStore::new());
    store.replace(&key, bars(hourly(T0 + H, 5), 1)).await;

    // the upstream reports the still-open bar at T0+5h again, now with price 2
    let upstream = Arc::new(Scripted {
        series: bars(hourly(T0 + 5 * H, 4), 2),
    });
    let candela = Candela::builder()
        .with_provider(upstream)
        .store(Arc::clone(&store))
        .build()
        .unwrap();

    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 8 * H).await;

    assert!(resp.is_ok());
    let times = resp.series.times();
    assert_eq!(times.iter().filter(|&&t| t == T0 + 5 * H).count(), 1);
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    let idx = resp.series.lower_bound(T0 + 5 * H);
    assert_eq!(resp.series.closes()[idx], Decimal::new(2, 0));
    assert_eq!(resp.series.closes()[idx - 1], Decimal::new(1, 0));
}

#[tokio::test]
async fn window_inside_weekly_closure_answers_no_data_without_upstream() {
    let (candela, mock) = engine();

    let to = SAT + 12 * H;
    let resp = candela.history(EUR_USD, Resolution::H1, SAT, to).await;

    assert_eq!(mock.calls(), 0);
    assert_eq!(resp.status, HistoryStatus::NoData);
    assert_eq!(resp.next_time, Some(to - 86_400));

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["s"], "no_data");
    assert_eq!(json["nextTime"], to - 86_400);
}

use std::sync::Arc;
use std::time::Duration;

use candela::{Candela, CandleRequest, QueryRange, Resolution, chunk_ranges};
use candela_mock::MockConnector;
use candela_mock::fixtures::history::bar_times;
use proptest::prelude::*;

use crate::helpers::{EUR_USD, H, ReverseLatency, T0, engine};

const MIN: i64 = 60;

#[tokio::test]
async fn long_range_is_split_within_the_upstream_limit() {
    let (candela, mock) = engine();
    let (from, to) = (T0, T0 + 12_000 * MIN);

    let resp = candela.history(EUR_USD, Resolution::M1, from, to).await;

    assert!(resp.is_ok(), "{:?}", resp.errmsg);
    assert_eq!(mock.calls(), 3);
    let reqs = mock.requests();
    assert!(reqs.iter().all(|r| r.range.bars(Resolution::M1) <= 5000));

    // the chunked answer equals what one unbounded call would have returned
    let whole = CandleRequest {
        symbol: EUR_USD.into(),
        resolution: Resolution::M1,
        range: QueryRange::new(from, to).unwrap(),
        include_first: false,
    };
    assert_eq!(resp.series.times(), bar_times(&whole).as_slice());
}

#[tokio::test]
async fn chunks_run_under_the_shared_limiter() {
    let mock = Arc::new(MockConnector::new().with_latency(Duration::from_millis(20)));
    let candela = Candela::builder()
        .with_provider(mock.clone())
        .max_bars_per_call(10)
        .max_concurrent_fetches(2)
        .build()
        .unwrap();

    let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + 100 * H).await;

    assert!(resp.is_ok());
    assert_eq!(mock.calls(), 10);
    assert!(mock.peak_in_flight() <= 2);
    assert_eq!(resp.series.len(), 100);
}

#[tokio::test]
async fn completion_order_does_not_change_the_result() {
    let horizon = T0 + 100 * H;
    let upstream = Arc::new(ReverseLatency {
        inner: MockConnector::new(),
        horizon,
    });
    let candela = Candela::builder()
        .with_provider(upstream)
        .max_bars_per_call(7)
        .build()
        .unwrap();

    let resp = candela.history(EUR_USD, Resolution::H1, T0, horizon).await;

    let (reference, _) = engine();
    let expected = reference.history(EUR_USD, Resolution::H1, T0, horizon).await;
    assert_eq!(resp.series, expected.series);
    assert_eq!(resp.series.len(), 100);
}

#[tokio::test]
async fn chunk_starting_in_the_closure_asks_for_its_first_candle() {
    // Friday 2024-01-12 18:00 .. Monday 2024-01-15 06:00, split in two at Sunday 00:00
    let fri = T0 + 4 * 24 * H + 18 * H;
    let (candela, mock) = {
        let mock = Arc::new(MockConnector::new());
        let c = Candela::builder()
            .with_provider(mock.clone())
            .max_bars_per_call(30)
            .build()
            .unwrap();
        (c, mock)
    };

    let resp = candela.history(EUR_USD, Resolution::H1, fri, fri + 60 * H).await;

    assert!(resp.is_ok());
    let reqs = mock.requests();
    assert_eq!(reqs.len(), 2);
    let second = reqs.iter().find(|r| r.range.from() > fri).unwrap();
    assert!(second.include_first);
    assert!(reqs.iter().any(|r| r.range.from() == fri && !r.include_first));
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn chunks_cover_the_range_contiguously(
        from in 0i64..1_000_000,
        len in 1i64..5_000_000,
        max in 1u32..6000,
        res in prop::sample::select(Resolution::ALL.to_vec()),
    ) {
        let range = QueryRange::new(from, from + len).unwrap();
        let chunks = chunk_ranges(range, res, max);

        let bars = range.bars(res);
        let expected = ((bars + i64::from(max) - 1) / i64::from(max)).max(1);
        prop_assert_eq!(chunks.len() as i64, expected);
        prop_assert_eq!(chunks[0].from(), range.from());
        prop_assert_eq!(chunks[chunks.len() - 1].to(), range.to());
        for w in chunks.windows(2) {
            prop_assert_eq!(w[0].to(), w[1].from());
        }
        for c in &chunks {
            prop_assert!(c.bars(res) <= i64::from(max));
        }
    }

    #[test]
    fn paginated_history_matches_one_big_call(hours in 1i64..400, max in 1u32..50) {
        tokio_test::block_on(async move {
            let mock = Arc::new(MockConnector::new());
            let candela = Candela::builder()
                .with_provider(mock.clone())
                .max_bars_per_call(max)
                .build()
                .unwrap();
            let resp = candela.history(EUR_USD, Resolution::H1, T0, T0 + hours * H).await;

            let whole = CandleRequest {
                symbol: EUR_USD.into(),
                resolution: Resolution::H1,
                range: QueryRange::new(T0, T0 + hours * H).unwrap(),
                include_first: false,
            };
            assert_eq!(resp.series.times(), bar_times(&whole).as_slice());
            assert!(mock.requests().iter().all(|r| r.range.bars(Resolution::H1) <= i64::from(max)));
        });
    }
}

use candela::{HistoryStatus, Resolution};
use candela_mock::fixtures::history::synthetic_candle;

use crate::helpers::{EUR_USD, H, T0, engine};

#[tokio::test]
async fn quotes_come_from_the_last_two_cached_bars() {
    let (candela, mock) = engine();
    candela.history(EUR_USD, Resolution::H1, T0, T0 + 10 * H).await;

    let quotes = candela
        .quotes("OANDA:EUR_USD, GBP_USD", Resolution::H1)
        .await;

    assert_eq!(mock.calls(), 1);
    assert_eq!(quotes.s, HistoryStatus::Ok);
    assert_eq!(quotes.d.len(), 2);

    let eur = &quotes.d[0];
    assert_eq!(eur.s, HistoryStatus::Ok);
    assert_eq!(eur.n, "OANDA:EUR_USD");
    let v = eur.v.as_ref().unwrap();
    let last = synthetic_candle(EUR_USD, Resolution::H1, T0 + 10 * H);
    let prev = synthetic_candle(EUR_USD, Resolution::H1, T0 + 9 * H);
    assert_eq!(v.lp, last.close);
    assert_eq!(v.open_price, last.open);
    assert_eq!(v.high_price, last.high);
    assert_eq!(v.low_price, last.low);
    assert_eq!(v.prev_close_price, prev.close);
    assert_eq!(v.ch, last.close - prev.close);
    assert_eq!(v.volume, last.volume);
    assert_eq!(v.short_name, EUR_USD);
    assert_eq!(v.exchange, "OANDA");

    let gbp = &quotes.d[1];
    assert_eq!(gbp.s, HistoryStatus::Error);
    assert!(gbp.v.is_none());

    let json = serde_json::to_value(&quotes).unwrap();
    assert_eq!(json["d"][1]["s"], "error");
    assert!(json["d"][0]["v"]["lp"].is_number());
}

#[tokio::test]
async fn quotes_never_create_cache_entries() {
    let (candela, mock) = engine();
    let quotes = candela.quotes("EUR_USD", Resolution::D1).await;
    assert_eq!(quotes.d[0].s, HistoryStatus::Error);
    assert!(candela.store().is_empty());
    assert_eq!(mock.calls(), 0);
}

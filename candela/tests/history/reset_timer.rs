use std::sync::Arc;
use std::time::Duration;

use candela::{Candela, Resolution};
use candela_mock::MockConnector;

use crate::helpers::{EUR_USD, H, T0};

#[tokio::test(start_paused = true)]
async fn cache_is_dropped_every_interval() {
    let mock = Arc::new(MockConnector::new());
    let candela = Candela::builder()
        .with_provider(mock.clone())
        .cache_reset_interval(Duration::from_secs(3600))
        .build()
        .unwrap();
    let timer = candela.spawn_reset_timer();

    candela.history(EUR_USD, Resolution::H1, T0, T0 + 10 * H).await;
    assert_eq!(candela.store().len(), 1);

    tokio::time::sleep(Duration::from_secs(1800)).await;
    assert_eq!(candela.store().len(), 1);

    tokio::time::sleep(Duration::from_secs(1900)).await;
    assert!(candela.store().is_empty());

    // refetched after the reset
    candela.history(EUR_USD, Resolution::H1, T0, T0 + 10 * H).await;
    assert_eq!(mock.calls(), 2);

    timer.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stopped_timer_no_longer_resets() {
    let mock = Arc::new(MockConnector::new());
    let candela = Candela::builder()
        .with_provider(mock)
        .cache_reset_interval(Duration::from_secs(60))
        .build()
        .unwrap();
    let timer = candela.spawn_reset_timer();
    timer.stop().await;

    candela.history(EUR_USD, Resolution::H1, T0, T0 + 10 * H).await;
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(candela.store().len(), 1);
}

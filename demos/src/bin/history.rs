use std::sync::Arc;

use candela::{Candela, Resolution, SymbolDatabase};
use candela_demos::{get_provider, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // usage: history [SYMBOL] [RESOLUTION] [HOURS]
    let mut args = std::env::args().skip(1);
    let symbol = args.next().unwrap_or_else(|| "EUR_USD".to_string());
    let resolution: Resolution = args.next().as_deref().unwrap_or("60").parse()?;
    let hours: i64 = args.next().as_deref().unwrap_or("48").parse()?;

    let candela = Candela::builder()
        .with_provider(get_provider()?)
        .with_symbols(Arc::new(SymbolDatabase::with_defaults()))
        .build()?;
    let _reset = candela.spawn_reset_timer();

    let to = chrono::Utc::now().timestamp();
    let from = to - hours * 3600;

    println!("Fetching {symbol} @ {resolution} for the last {hours}h...");
    let resp = candela.history(&symbol, resolution, from, to).await;
    println!("status: {}, bars: {}", resp.status, resp.series.len());
    for c in resp.series.iter().rev().take(5) {
        println!(" - t={} o={} h={} l={} c={} v={}", c.time, c.open, c.high, c.low, c.close, c.volume);
    }

    // the second call is served from the cache
    let again = candela.history(&symbol, resolution, from, to).await;
    println!("cached again: {} bars", again.series.len());

    let to_extended = to + 3600;
    let extended = candela.history(&symbol, resolution, from, to_extended).await;
    println!("extended window: {} bars", extended.series.len());

    for (key, len) in candela.store().entries().await {
        println!("cache {key}: {len} bars");
    }
    Ok(())
}

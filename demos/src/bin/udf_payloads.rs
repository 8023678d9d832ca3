use std::sync::Arc;

use candela::udf::{DatafeedConfig, server_time, symbol_info};
use candela::{Candela, Resolution, SymbolDatabase, SymbolProvider, SymbolQuery};
use candela_demos::{get_provider, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let symbols = Arc::new(SymbolDatabase::with_defaults());
    let candela = Candela::builder()
        .with_provider(get_provider()?)
        .with_symbols(symbols.clone())
        .build()?;

    println!("/config\n{}", serde_json::to_string_pretty(&DatafeedConfig::default())?);
    println!("/time\n{}", server_time());

    let info = symbol_info(symbols.as_ref(), "OANDA:EUR_USD").await?;
    println!("/symbols\n{}", serde_json::to_string_pretty(&info)?);

    let hits = symbols
        .search(&SymbolQuery {
            text: "usd".into(),
            limit: Some(10),
            ..SymbolQuery::default()
        })
        .await?;
    println!("/search\n{}", serde_json::to_string_pretty(&hits)?);

    let to = server_time();
    let history = candela
        .history("EUR_USD", Resolution::H1, to - 24 * 3600, to)
        .await;
    println!("/history\n{}", serde_json::to_string(&history)?);

    let quotes = candela.quotes("OANDA:EUR_USD,GBP_USD", Resolution::H1).await;
    println!("/quotes\n{}", serde_json::to_string_pretty(&quotes)?);
    Ok(())
}

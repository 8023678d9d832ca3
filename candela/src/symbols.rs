use async_trait::async_trait;
use candela_core::{
    CandelaError, SymbolInfo, SymbolProvider, SymbolQuery, SymbolSearchResult,
};

/// Results returned by [`SymbolDatabase::search`] when the query sets no limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Weight offset that ranks description matches after every name match.
const DESCRIPTION_WEIGHT: usize = 8000;

/// In-memory symbol catalog.
#[derive(Debug, Clone, Default)]
pub struct SymbolDatabase {
    symbols: Vec<SymbolInfo>,
}

impl SymbolDatabase {
    /// Catalog holding exactly `symbols`.
    #[must_use]
    pub const fn new(symbols: Vec<SymbolInfo>) -> Self {
        Self { symbols }
    }

    /// The built-in OANDA forex pairs.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(vec![
            forex("EUR_USD", "Euro/USD"),
            forex("GBP_USD", "British Pound/USD"),
        ])
    }

    /// Add more symbols; later duplicates never shadow earlier ones in lookups.
    pub fn add_symbols<I>(&mut self, symbols: I)
    where
        I: IntoIterator<Item = SymbolInfo>,
    {
        self.symbols.extend(symbols);
    }

    /// Every known symbol.
    #[must_use]
    pub fn symbols(&self) -> &[SymbolInfo] {
        &self.symbols
    }

    fn find(&self, name: &str) -> Option<&SymbolInfo> {
        let (exchange, symbol) = match name.split_once(':') {
            Some((ex, sym)) => (ex.to_uppercase(), sym.to_uppercase()),
            None => (String::new(), name.to_uppercase()),
        };
        self.symbols.iter().find(|s| {
            s.name.to_uppercase() == symbol
                && (exchange.is_empty() || s.exchange.to_uppercase() == exchange)
        })
    }

    fn rank(&self, query: &SymbolQuery) -> Vec<SymbolSearchResult> {
        let needle = query.text.to_uppercase();
        let type_filter = query.symbol_type.as_deref().filter(|t| !t.is_empty());
        let exchange_filter = query.exchange.as_deref().filter(|e| !e.is_empty());

        let mut weighted: Vec<(usize, &SymbolInfo)> = self
            .symbols
            .iter()
            .filter(|s| type_filter.is_none_or(|t| s.symbol_type == t))
            .filter(|s| exchange_filter.is_none_or(|e| s.exchange == e))
            .filter_map(|s| {
                if needle.is_empty() {
                    return Some((0, s));
                }
                if let Some(pos) = s.name.to_uppercase().find(&needle) {
                    return Some((pos, s));
                }
                s.description
                    .to_uppercase()
                    .find(&needle)
                    .map(|pos| (DESCRIPTION_WEIGHT + pos, s))
            })
            .collect();
        // stable: equal weights keep catalog order
        weighted.sort_by_key(|(w, _)| *w);

        let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        weighted
            .into_iter()
            .take(limit)
            .map(|(_, s)| SymbolSearchResult::from(s))
            .collect()
    }
}

fn forex(name: &str, description: &str) -> SymbolInfo {
    SymbolInfo {
        name: name.to_string(),
        description: description.to_string(),
        exchange: "Oanda".to_string(),
        symbol_type: "forex".to_string(),
    }
}

#[async_trait]
impl SymbolProvider for SymbolDatabase {
    async fn lookup(&self, name: &str) -> Result<SymbolInfo, CandelaError> {
        self.find(name)
            .cloned()
            .ok_or_else(|| CandelaError::not_found(format!("unknown_symbol {name}")))
    }

    async fn search(&self, query: &SymbolQuery) -> Result<Vec<SymbolSearchResult>, CandelaError> {
        Ok(self.rank(query))
    }
}

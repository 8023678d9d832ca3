use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use candela_core::{CandelaError, CandleProvider, CandleRequest, CandleSeries};

/// Instruction for how a call should behave for a given symbol.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return the provided series, cut to the request window.
    Return(CandleSeries),
    /// Fail immediately with the provided error.
    Fail(CandelaError),
    /// Hang indefinitely (simulate a stalled upstream).
    Hang,
}

#[derive(Default)]
struct InternalState {
    rules: HashMap<String, MockBehavior>,
    // one-shot behaviors consumed before the standing rule
    queued: HashMap<String, VecDeque<MockBehavior>>,
    requests: Vec<CandleRequest>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the standing behavior for a symbol.
    pub async fn set_behavior(&self, symbol: &str, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.rules.insert(symbol.to_string(), behavior);
    }

    /// Queue a behavior used by the next call for `symbol` only.
    pub async fn push_once(&self, symbol: &str, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard
            .queued
            .entry(symbol.to_string())
            .or_default()
            .push_back(behavior);
    }

    /// Copy of the request log.
    pub async fn requests(&self) -> Vec<CandleRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Number of calls received.
    pub async fn calls(&self) -> usize {
        self.state.lock().await.requests.len()
    }

    /// Clear all configured behaviors and the request log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.rules.clear();
        guard.queued.clear();
        guard.requests.clear();
    }
}

/// A connector that defers all behavior to an external controller.
pub struct DynamicMockConnector {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockConnector {
    /// Create a new dynamic mock connector and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn CandleProvider>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn CandleProvider>, controller)
    }
}

/// Keep the bars a real upstream would report for `req`.
fn window(series: &CandleSeries, req: &CandleRequest) -> CandleSeries {
    let (from, to) = (req.range.from(), req.range.to());
    series
        .iter()
        .filter(|c| (c.time > from || (req.include_first && c.time == from)) && c.time <= to)
        .collect()
}

#[async_trait]
impl CandleProvider for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_candles(&self, req: &CandleRequest) -> Result<CandleSeries, CandelaError> {
        // Acquire behavior snapshot without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(req.clone());
            let once = guard
                .queued
                .get_mut(&req.symbol)
                .and_then(VecDeque::pop_front);
            once.or_else(|| guard.rules.get(&req.symbol).cloned())
        };

        match behavior {
            Some(MockBehavior::Return(series)) => Ok(window(&series, req)),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Err(CandelaError::not_found(format!("symbol {}", req.symbol))),
        }
    }
}

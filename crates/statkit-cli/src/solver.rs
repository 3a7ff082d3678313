//! Blocking problem-solver client.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use statkit_core::solver::{build_request, extract_solution, usable_key, SolverRoute};
use statkit_core::{ChatRequest, HistoryEntry, PreferenceStore, StatError, StatResult};

use crate::config::{SolverConfig, SolverMode};

/// Sends one chat-completion request and returns the decoded body.
pub trait Transport {
    fn post(&self, url: &str, bearer: Option<&str>, request: &ChatRequest) -> StatResult<Value>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Transport for UreqTransport {
    fn post(&self, url: &str, bearer: Option<&str>, request: &ChatRequest) -> StatResult<Value> {
        let mut call = self.agent.post(url);
        if let Some(key) = bearer {
            call = call.set("Authorization", &format!("Bearer {key}"));
        }
        match call.send_json(request) {
            Ok(response) => response
                .into_json::<Value>()
                .map_err(|e| StatError::Upstream(format!("unreadable response: {e}"))),
            Err(ureq::Error::Status(code, _)) => {
                Err(StatError::Upstream(format!("API Error: {code}")))
            }
            Err(ureq::Error::Transport(t)) => Err(StatError::Upstream(t.to_string())),
        }
    }
}

/// Pick the route for a solve request.
///
/// Direct mode needs a key: the configured one if usable, else the one cached
/// in the preference store.
pub fn route(
    config: &SolverConfig,
    force_direct: bool,
    store: &dyn PreferenceStore,
) -> StatResult<SolverRoute> {
    if config.mode == SolverMode::Proxied && !force_direct {
        return Ok(SolverRoute::Proxied {
            url: config.proxy_url.clone(),
        });
    }
    let configured = usable_key(config.api_key.as_deref()).map(str::to_string);
    let api_key = match configured {
        Some(key) => key,
        None => store
            .cached_api_key()?
            .filter(|k| usable_key(Some(k.as_str())).is_some())
            .ok_or_else(|| {
                StatError::Config(
                    "no API key set; run `statkit key set` or export VITE_GROK_API_KEY".into(),
                )
            })?,
    };
    Ok(SolverRoute::Direct {
        endpoint: config.endpoint().to_string(),
        api_key,
    })
}

/// Solve `problem` and record the answer in history.
pub fn solve(
    problem: &str,
    route: &SolverRoute,
    model: &str,
    transport: &dyn Transport,
    store: &dyn PreferenceStore,
) -> StatResult<String> {
    let request = build_request(problem, model)?;
    debug!(?route, model, "solving problem");
    let response = match route {
        SolverRoute::Proxied { url } => transport.post(url, None, &request)?,
        SolverRoute::Direct { endpoint, api_key } => {
            transport.post(endpoint, Some(api_key), &request)?
        }
    };
    let solution = extract_solution(&response)?;
    store.record_history(HistoryEntry::new(problem.trim(), solution.clone()))?;
    info!(chars = solution.len(), "problem solved");
    Ok(solution)
}

use crate::insights::Insight;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_insights_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let insights: Vec<_> = state
        .engine
        .insights()
        .into_iter()
        .map(Insight::render)
        .collect();
    ok(&req.id, json!({ "insights": insights }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "insights.get" => Some(handle_insights_get(state, req)),
        _ => None,
    }
}

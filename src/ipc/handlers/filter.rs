use crate::calc::BandFilter;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_views_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.engine.views()))
}

fn handle_filter_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    // An explicit null clears the term.
    let term = match req.params.get("term") {
        Some(v) if v.is_null() => String::new(),
        _ => match required_str(req, "term") {
            Ok(v) => v,
            Err(resp) => return resp,
        },
    };
    state.engine.search(&term);
    ok(&req.id, json!(state.engine.views()))
}

fn handle_filter_band(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match required_str(req, "band") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(band) = BandFilter::parse(&raw) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown band: {}", raw),
            Some(json!({ "allowed": ["all", "high", "medium", "low"] })),
        );
    };
    state.engine.filter(band);
    ok(&req.id, json!(state.engine.views()))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "views.get" => Some(handle_views_get(state, req)),
        "filter.search" => Some(handle_filter_search(state, req)),
        "filter.band" => Some(handle_filter_band(state, req)),
        _ => None,
    }
}

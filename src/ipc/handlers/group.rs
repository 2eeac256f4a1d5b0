use crate::ipc::error::{engine_err, ok};
use crate::ipc::helpers::student_id_param;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_group_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match student_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.engine.add_to_group(&id) {
        Ok(added) => ok(
            &req.id,
            json!({ "added": added, "views": state.engine.views() }),
        ),
        Err(e) => engine_err(&req.id, &e),
    }
}

fn handle_group_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match student_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let removed = state.engine.remove_from_group(&id);
    ok(
        &req.id,
        json!({ "removed": removed, "views": state.engine.views() }),
    )
}

fn handle_group_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.engine.clear_group();
    ok(&req.id, json!(state.engine.views()))
}

fn handle_group_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.engine.group_stats()))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "group.add" => Some(handle_group_add(state, req)),
        "group.remove" => Some(handle_group_remove(state, req)),
        "group.clear" => Some(handle_group_clear(state, req)),
        "group.stats" => Some(handle_group_stats(state, req)),
        _ => None,
    }
}

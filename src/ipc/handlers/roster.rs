use std::path::PathBuf;

use crate::calc::PerformanceBand;
use crate::engine::LoadSummary;
use crate::ipc::error::{engine_err, err, ok};
use crate::ipc::helpers::{optional_str, student_id_param};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use serde_json::json;

fn loaded(state: &AppState, req: &Request, summary: LoadSummary) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "studentCount": summary.student_count,
            "fingerprint": summary.fingerprint,
            "views": state.engine.views(),
        }),
    )
}

fn handle_roster_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(path) = optional_str(req, "path").map(PathBuf::from) {
        let text = match roster::read_roster_file(&path) {
            Ok(v) => v,
            Err(e) => {
                return err(
                    &req.id,
                    "io_error",
                    format!("{e:#}"),
                    Some(json!({ "path": path.to_string_lossy() })),
                )
            }
        };
        return match roster::parse_roster_text(&text) {
            Ok(students) => {
                let summary = state.engine.load(students);
                loaded(state, req, summary)
            }
            Err(e) => engine_err(&req.id, &e),
        };
    }

    let Some(payload) = req.params.get("payload") else {
        return err(&req.id, "bad_params", "missing path or payload", None);
    };
    match state.engine.load_value(payload) {
        Ok(summary) => loaded(state, req, summary),
        Err(e) => engine_err(&req.id, &e),
    }
}

fn handle_roster_load_sample(state: &mut AppState, req: &Request) -> serde_json::Value {
    let summary = state.engine.load(roster::sample_roster());
    loaded(state, req, summary)
}

fn handle_students_average(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match student_id_param(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.engine.average_of(&id) {
        Ok(average) => ok(
            &req.id,
            json!({
                "studentId": id,
                "average": average,
                "band": PerformanceBand::classify(average),
            }),
        ),
        Err(e) => engine_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.load" => Some(handle_roster_load(state, req)),
        "roster.loadSample" => Some(handle_roster_load_sample(state, req)),
        "students.average" => Some(handle_students_average(state, req)),
        _ => None,
    }
}

use std::path::PathBuf;

use crate::export;
use crate::ipc::error::{engine_err, err, ok};
use crate::ipc::helpers::optional_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_group_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let today = chrono::Local::now().date_naive();
    let payload = match state.engine.export_group(today) {
        Ok(v) => v,
        Err(e) => return engine_err(&req.id, &e),
    };

    // A directory target gets the default export file name.
    let out_path = optional_str(req, "outPath").map(PathBuf::from).map(|p| {
        if p.is_dir() {
            p.join(export::DEFAULT_FILE_NAME)
        } else {
            p
        }
    });
    if let Some(path) = out_path.as_ref() {
        if let Err(e) = export::write_payload(&payload, path) {
            return err(
                &req.id,
                "io_error",
                format!("{e:#}"),
                Some(json!({ "outPath": path.to_string_lossy() })),
            );
        }
    }

    ok(
        &req.id,
        json!({
            "payload": payload,
            "outPath": out_path.map(|p| p.to_string_lossy().to_string()),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "group.export" => Some(handle_group_export(state, req)),
        _ => None,
    }
}

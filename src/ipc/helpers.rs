use crate::ipc::error::err;
use crate::ipc::types::Request;
use crate::roster::StudentId;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn student_id_param(req: &Request) -> Result<StudentId, serde_json::Value> {
    let Some(raw) = req.params.get("studentId") else {
        return Err(err(&req.id, "bad_params", "missing studentId", None));
    };
    serde_json::from_value::<StudentId>(raw.clone()).map_err(|_| {
        err(
            &req.id,
            "bad_params",
            "studentId must be an integer or a string",
            None,
        )
    })
}

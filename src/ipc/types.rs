use serde::Deserialize;

use crate::engine::Engine;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub session_id: String,
    pub engine: Engine,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            engine,
        }
    }
}

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::calc;
use crate::error::{EngineError, Result};
use crate::roster::Student;

pub const DEFAULT_FILE_NAME: &str = "study-group-export.json";

/// Study-group export. Carries no ids, so it cannot be fed back into a
/// roster load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub export_date: String,
    pub study_group: Vec<ExportedStudent>,
    pub group_stats: ExportedStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedStudent {
    pub name: String,
    #[serde(serialize_with = "crate::roster::serialize_score")]
    pub math: f64,
    #[serde(serialize_with = "crate::roster::serialize_score")]
    pub science: f64,
    #[serde(serialize_with = "crate::roster::serialize_score")]
    pub english: f64,
    pub average: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedStats {
    pub total_students: usize,
    pub average_score: String,
}

pub fn build_payload(members: &[&Student], date: NaiveDate) -> Result<ExportPayload> {
    let Some(group_average) = calc::average_of_averages(members.iter().copied()) else {
        return Err(EngineError::EmptyGroup);
    };

    let study_group = members
        .iter()
        .map(|s| ExportedStudent {
            name: s.name.clone(),
            math: s.math,
            science: s.science,
            english: s.english,
            average: calc::format_1_decimal(calc::student_average(s)),
        })
        .collect();

    Ok(ExportPayload {
        export_date: date.format("%Y-%m-%d").to_string(),
        study_group,
        group_stats: ExportedStats {
            total_students: members.len(),
            average_score: calc::format_1_decimal(group_average),
        },
    })
}

pub fn write_payload(payload: &ExportPayload, out_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
    }
    let text = serde_json::to_string_pretty(payload).context("failed to serialize export")?;
    std::fs::write(out_path, text)
        .with_context(|| format!("failed to write export {}", out_path.to_string_lossy()))
}

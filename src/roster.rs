use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

use crate::error::{EngineError, Result};

/// Student identifier as it appears in the import payload.
///
/// Comparison is strict: `1` and `"1"` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentId {
    Int(i64),
    Text(String),
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudentId::Int(v) => write!(f, "{}", v),
            StudentId::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for StudentId {
    fn from(v: i64) -> Self {
        StudentId::Int(v)
    }
}

impl From<&str> for StudentId {
    fn from(v: &str) -> Self {
        StudentId::Text(v.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    Science,
    English,
}

impl Subject {
    /// Declaration order; tie-breaks between subjects follow it.
    pub const ALL: [Subject; 3] = [Subject::Math, Subject::Science, Subject::English];

    pub fn label(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::English => "English",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    #[serde(
        default = "missing_score",
        deserialize_with = "score",
        serialize_with = "serialize_score"
    )]
    pub math: f64,
    #[serde(
        default = "missing_score",
        deserialize_with = "score",
        serialize_with = "serialize_score"
    )]
    pub science: f64,
    #[serde(
        default = "missing_score",
        deserialize_with = "score",
        serialize_with = "serialize_score"
    )]
    pub english: f64,
}

impl Student {
    pub fn score(&self, subject: Subject) -> f64 {
        match subject {
            Subject::Math => self.math,
            Subject::Science => self.science,
            Subject::English => self.english,
        }
    }
}

// Absent and null scores are kept as NaN and propagate into every average.
fn missing_score() -> f64 {
    f64::NAN
}

fn score<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Whole scores go out as integers (`85`, not `85.0`); NaN goes out as null.
pub(crate) fn serialize_score<S>(v: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 {
        serializer.serialize_i64(*v as i64)
    } else {
        serializer.serialize_f64(*v)
    }
}

/// Accepts `{ "students": [...] }` or a bare `[...]`.
pub fn parse_roster(value: &serde_json::Value) -> Result<Vec<Student>> {
    let records = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => match map.get("students") {
            Some(serde_json::Value::Array(items)) => items,
            Some(_) => {
                return Err(EngineError::Format(
                    "students must be an array".to_string(),
                ))
            }
            None => {
                return Err(EngineError::Format(
                    "expected an array of students or an object with a students array".to_string(),
                ))
            }
        },
        _ => {
            return Err(EngineError::Format(
                "expected an array of students or an object with a students array".to_string(),
            ))
        }
    };

    let mut out = Vec::with_capacity(records.len());
    for (idx, raw) in records.iter().enumerate() {
        let student = Student::deserialize(raw)
            .map_err(|e| EngineError::Format(format!("student {}: {}", idx, e)))?;
        out.push(student);
    }
    Ok(out)
}

pub fn parse_roster_text(text: &str) -> Result<Vec<Student>> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| EngineError::Format(e.to_string()))?;
    parse_roster(&value)
}

pub fn read_roster_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file {}", path.to_string_lossy()))
}

/// SHA-256 over the canonical JSON of the parsed roster.
pub fn fingerprint(students: &[Student]) -> String {
    let bytes = serde_json::to_vec(students).unwrap_or_default();
    format!("{:x}", Sha256::digest(&bytes))
}

/// Demo roster shown when the dashboard opens without a file.
pub fn sample_roster() -> Vec<Student> {
    [
        (1, "Khush deep", 85.0, 78.0, 82.0),
        (2, "Deepali", 92.0, 88.0, 90.0),
        (3, "Yashika", 76.0, 82.0, 79.0),
        (4, "Lakshay", 88.0, 85.0, 87.0),
        (5, "Abhi", 72.0, 75.0, 78.0),
        (6, "Akhil", 95.0, 92.0, 94.0),
        (7, "Dilji", 68.0, 71.0, 73.0),
        (8, "Jenny", 84.0, 87.0, 85.0),
        (9, "Prabh", 79.0, 76.0, 81.0),
    ]
    .into_iter()
    .map(|(id, name, math, science, english)| Student {
        id: StudentId::Int(id),
        name: name.to_string(),
        math,
        science,
        english,
    })
    .collect()
}

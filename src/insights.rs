use serde::Serialize;

use crate::calc::{self, SubjectMeans, HIGH_THRESHOLD, LOW_THRESHOLD};
use crate::roster::{Student, StudentId, Subject};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Insight {
    ClassPerformance {
        class_average: f64,
        high_performers: usize,
        need_support: usize,
    },
    SubjectAnalysis {
        strongest: Subject,
        strongest_average: f64,
        weakest: Subject,
        weakest_average: f64,
    },
    StudyGroup {
        group_average: f64,
        class_average: f64,
        difference: f64,
        above_average: bool,
    },
    TopPerformer {
        student_id: StudentId,
        name: String,
        average: f64,
    },
}

impl Insight {
    pub fn title(&self) -> &'static str {
        match self {
            Insight::ClassPerformance { .. } => "Class Performance",
            Insight::SubjectAnalysis { .. } => "Subject Analysis",
            Insight::StudyGroup { .. } => "Study Group",
            Insight::TopPerformer { .. } => "Top Performer",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Insight::ClassPerformance {
                class_average,
                high_performers,
                need_support,
            } => format!(
                "Overall average is {}. {} students performing above 85, while {} students need additional support.",
                calc::format_1_decimal(*class_average),
                high_performers,
                need_support
            ),
            Insight::SubjectAnalysis {
                strongest,
                strongest_average,
                weakest,
                weakest_average,
            } => format!(
                "{} is the strongest subject (avg: {}). {} needs more focus (avg: {}).",
                strongest.label(),
                calc::format_1_decimal(*strongest_average),
                weakest.label(),
                calc::format_1_decimal(*weakest_average)
            ),
            Insight::StudyGroup {
                difference,
                above_average: true,
                ..
            } => format!(
                "Your study group is performing {} points above class average. Great selection!",
                calc::format_1_decimal(*difference)
            ),
            Insight::StudyGroup { .. } => {
                "Your study group could benefit from adding higher performers to raise the average."
                    .to_string()
            }
            Insight::TopPerformer { name, average, .. } => format!(
                "{} leads with an average of {}.",
                name,
                calc::format_1_decimal(*average)
            ),
        }
    }

    pub fn render(self) -> RenderedInsight {
        RenderedInsight {
            title: self.title(),
            message: self.message(),
            insight: self,
        }
    }
}

/// Insight plus its display text, as handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedInsight {
    #[serde(flatten)]
    pub insight: Insight,
    pub title: &'static str,
    pub message: String,
}

/// Builds the insight list in its fixed order. An empty roster yields no
/// insights; the study-group entry is only present for a non-empty group.
pub fn generate(roster: &[Student], group: &[&Student]) -> Vec<Insight> {
    let (Some(class_average), Some(means), Some(top)) = (
        calc::average_of_averages(roster),
        SubjectMeans::compute(roster),
        calc::top_performer(roster),
    ) else {
        return Vec::new();
    };

    let averages: Vec<f64> = roster.iter().map(calc::student_average).collect();
    let mut out = Vec::with_capacity(4);

    out.push(Insight::ClassPerformance {
        class_average,
        high_performers: averages.iter().filter(|a| **a > HIGH_THRESHOLD).count(),
        need_support: averages.iter().filter(|a| **a < LOW_THRESHOLD).count(),
    });

    let (strongest, strongest_average) = means.strongest();
    let (weakest, weakest_average) = means.weakest();
    out.push(Insight::SubjectAnalysis {
        strongest,
        strongest_average,
        weakest,
        weakest_average,
    });

    if let Some(group_average) = calc::average_of_averages(group.iter().copied()) {
        let difference = group_average - class_average;
        out.push(Insight::StudyGroup {
            group_average,
            class_average,
            difference,
            above_average: difference > 0.0,
        });
    }

    out.push(Insight::TopPerformer {
        student_id: top.id.clone(),
        name: top.name.clone(),
        average: calc::student_average(top),
    });

    out
}

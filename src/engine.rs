use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::calc::{self, BandFilter, PerformanceBand, SubjectMeans};
use crate::error::{EngineError, Result};
use crate::export::{self, ExportPayload};
use crate::insights::{self, Insight, RenderedInsight};
use crate::roster::{self, Student, StudentId, Subject};

const NO_DATA_LABEL: &str = "No Data";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub student_count: usize,
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    pub id: StudentId,
    pub name: String,
    #[serde(serialize_with = "crate::roster::serialize_score")]
    pub math: f64,
    #[serde(serialize_with = "crate::roster::serialize_score")]
    pub science: f64,
    #[serde(serialize_with = "crate::roster::serialize_score")]
    pub english: f64,
    pub average: f64,
    pub band: PerformanceBand,
    pub in_group: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: StudentId,
    pub name: String,
    pub average: f64,
}

impl MemberSummary {
    fn of(s: &Student) -> Self {
        MemberSummary {
            id: s.id.clone(),
            name: s.name.clone(),
            average: calc::student_average(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub count: usize,
    pub average_score: f64,
    pub top_performer: Option<MemberSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub labels: Vec<&'static str>,
    pub values: Vec<f64>,
    pub placeholder: bool,
}

impl ChartSeries {
    fn subjects(means: SubjectMeans) -> Self {
        ChartSeries {
            labels: Subject::ALL.iter().map(|s| s.label()).collect(),
            values: means.values().to_vec(),
            placeholder: false,
        }
    }

    fn no_data() -> Self {
        ChartSeries {
            labels: vec![NO_DATA_LABEL],
            values: vec![1.0],
            placeholder: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub members: Vec<MemberSummary>,
    pub stale_ids: Vec<StudentId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub term: String,
    pub band: BandFilter,
}

/// Everything the presentation layer needs after a mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Views {
    pub students: Vec<StudentRow>,
    pub overall_chart: ChartSeries,
    pub group_chart: ChartSeries,
    pub insights: Vec<RenderedInsight>,
    pub group_stats: GroupStats,
    pub group: GroupView,
    pub filter: FilterState,
}

/// Owns the roster, the study group and the filter state for one session.
///
/// The study group holds ids, resolved against the current roster on every
/// read. Ids that stop resolving after a reload stay in the group as stale
/// members until removed or cleared.
#[derive(Debug, Default)]
pub struct Engine {
    roster: Vec<Student>,
    group: Vec<StudentId>,
    term: String,
    band: BandFilter,
    // Indices into `roster`, in roster order.
    filtered: Vec<usize>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and installs a raw roster payload. On error nothing changes.
    pub fn load_value(&mut self, raw: &serde_json::Value) -> Result<LoadSummary> {
        let students = roster::parse_roster(raw)?;
        Ok(self.load(students))
    }

    /// Replaces the roster wholesale and resets the filtered view to every
    /// student. The search term and band go back to empty/`All`; the study
    /// group is kept.
    pub fn load(&mut self, students: Vec<Student>) -> LoadSummary {
        let summary = LoadSummary {
            student_count: students.len(),
            fingerprint: roster::fingerprint(&students),
        };
        self.roster = students;
        self.term.clear();
        self.band = BandFilter::All;
        self.filtered = (0..self.roster.len()).collect();
        let stale = self.stale_ids().len();
        info!(
            students = summary.student_count,
            fingerprint = %summary.fingerprint,
            stale_members = stale,
            "roster loaded"
        );
        summary
    }

    pub fn roster(&self) -> &[Student] {
        &self.roster
    }

    /// First roster entry with this id.
    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.roster.iter().find(|s| &s.id == id)
    }

    pub fn average_of(&self, id: &StudentId) -> Result<f64> {
        self.student(id)
            .map(calc::student_average)
            .ok_or_else(|| EngineError::NotFound(id.clone()))
    }

    pub fn search(&mut self, term: &str) {
        self.term = term.to_string();
        self.refilter();
        debug!(term, matches = self.filtered.len(), "search applied");
    }

    pub fn filter(&mut self, band: BandFilter) {
        self.band = band;
        self.refilter();
        debug!(band = band.as_str(), matches = self.filtered.len(), "band filter applied");
    }

    pub fn filter_state(&self) -> FilterState {
        FilterState {
            term: self.term.clone(),
            band: self.band,
        }
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Student> + '_ {
        self.filtered.iter().map(move |&i| &self.roster[i])
    }

    fn refilter(&mut self) {
        let needle = self.term.to_lowercase();
        let band = self.band;
        self.filtered = self
            .roster
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.name.to_lowercase().contains(&needle)
                    && band.matches(calc::student_average(s))
            })
            .map(|(i, _)| i)
            .collect();
    }

    /// Adds a roster student to the study group. Adding a member again is a
    /// no-op reported as `Ok(false)`.
    pub fn add_to_group(&mut self, id: &StudentId) -> Result<bool> {
        if self.student(id).is_none() {
            return Err(EngineError::NotFound(id.clone()));
        }
        if self.is_member(id) {
            debug!(%id, "already in study group");
            return Ok(false);
        }
        self.group.push(id.clone());
        debug!(%id, size = self.group.len(), "added to study group");
        Ok(true)
    }

    pub fn remove_from_group(&mut self, id: &StudentId) -> bool {
        let before = self.group.len();
        self.group.retain(|m| m != id);
        let removed = self.group.len() != before;
        debug!(%id, removed, size = self.group.len(), "remove from study group");
        removed
    }

    pub fn clear_group(&mut self) {
        debug!(size = self.group.len(), "study group cleared");
        self.group.clear();
    }

    pub fn is_member(&self, id: &StudentId) -> bool {
        self.group.iter().any(|m| m == id)
    }

    /// Group members that resolve in the current roster, in add order.
    pub fn group_members(&self) -> Vec<&Student> {
        self.group.iter().filter_map(|id| self.student(id)).collect()
    }

    pub fn stale_ids(&self) -> Vec<StudentId> {
        self.group
            .iter()
            .filter(|id| self.student(id).is_none())
            .cloned()
            .collect()
    }

    pub fn group_stats(&self) -> GroupStats {
        let members = self.group_members();
        GroupStats {
            count: members.len(),
            average_score: calc::average_of_averages(members.iter().copied()).unwrap_or(0.0),
            top_performer: calc::top_performer(members.iter().copied()).map(MemberSummary::of),
        }
    }

    pub fn insights(&self) -> Vec<Insight> {
        insights::generate(&self.roster, &self.group_members())
    }

    pub fn overall_chart(&self) -> ChartSeries {
        SubjectMeans::compute(&self.roster)
            .map(ChartSeries::subjects)
            .unwrap_or_else(ChartSeries::no_data)
    }

    pub fn group_chart(&self) -> ChartSeries {
        SubjectMeans::compute(self.group_members().iter().copied())
            .map(ChartSeries::subjects)
            .unwrap_or_else(ChartSeries::no_data)
    }

    pub fn export_group(&self, date: NaiveDate) -> Result<ExportPayload> {
        let payload = export::build_payload(&self.group_members(), date)?;
        info!(students = payload.group_stats.total_students, "study group exported");
        Ok(payload)
    }

    pub fn views(&self) -> Views {
        let members = self.group_members();
        let students = self
            .filtered()
            .map(|s| {
                let average = calc::student_average(s);
                StudentRow {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    math: s.math,
                    science: s.science,
                    english: s.english,
                    average,
                    band: PerformanceBand::classify(average),
                    in_group: self.is_member(&s.id),
                }
            })
            .collect();

        Views {
            students,
            overall_chart: self.overall_chart(),
            group_chart: self.group_chart(),
            insights: insights::generate(&self.roster, &members)
                .into_iter()
                .map(Insight::render)
                .collect(),
            group_stats: self.group_stats(),
            group: GroupView {
                members: members.into_iter().map(MemberSummary::of).collect(),
                stale_ids: self.stale_ids(),
            },
            filter: self.filter_state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn student(id: i64, name: &str, math: f64, science: f64, english: f64) -> Student {
        Student {
            id: StudentId::Int(id),
            name: name.to_string(),
            math,
            science,
            english,
        }
    }

    fn sample_engine() -> Engine {
        let mut e = Engine::new();
        e.load(roster::sample_roster());
        e
    }

    fn filtered_names(e: &Engine) -> Vec<String> {
        e.filtered().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn load_accepts_wrapped_payload_and_resets_view() {
        let mut e = Engine::new();
        let summary = e
            .load_value(&json!({ "students": [
                { "id": 1, "name": "A", "math": 60, "science": 60, "english": 60 },
                { "id": 2, "name": "B", "math": 100, "science": 100, "english": 100 }
            ]}))
            .expect("load");
        assert_eq!(summary.student_count, 2);
        assert_eq!(filtered_names(&e), vec!["A", "B"]);
    }

    #[test]
    fn failed_load_leaves_state_untouched() {
        let mut e = sample_engine();
        e.add_to_group(&StudentId::Int(2)).expect("add");
        let err = e.load_value(&json!({ "nope": true })).expect_err("bad payload");
        assert_eq!(err.code(), "format_error");
        assert_eq!(e.roster().len(), 9);
        assert_eq!(e.group_stats().count, 1);
    }

    #[test]
    fn search_and_band_compose_in_either_order() {
        let mut a = sample_engine();
        a.search("A");
        a.filter(BandFilter::High);

        let mut b = sample_engine();
        b.filter(BandFilter::High);
        b.search("A");

        assert_eq!(filtered_names(&a), vec!["Deepali", "Lakshay", "Akhil"]);
        assert_eq!(filtered_names(&a), filtered_names(&b));
        assert_eq!(b.filter_state().term, "A");
        assert_eq!(b.filter_state().band, BandFilter::High);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut e = sample_engine();
        e.search("KHUSH D");
        assert_eq!(filtered_names(&e), vec!["Khush deep"]);
        e.search("");
        assert_eq!(e.filtered().count(), 9);
    }

    #[test]
    fn band_filter_boundaries() {
        let mut e = Engine::new();
        e.load(vec![
            student(1, "Eighty-five", 85.0, 85.0, 85.0),
            student(2, "Seventy", 70.0, 70.0, 70.0),
            student(3, "Above", 85.0, 85.0, 85.001),
            student(4, "Below", 70.0, 70.0, 69.999),
        ]);
        e.filter(BandFilter::Medium);
        assert_eq!(filtered_names(&e), vec!["Eighty-five", "Seventy"]);
        e.filter(BandFilter::High);
        assert_eq!(filtered_names(&e), vec!["Above"]);
        e.filter(BandFilter::Low);
        assert_eq!(filtered_names(&e), vec!["Below"]);
    }

    #[test]
    fn add_is_idempotent_and_unknown_ids_fail() {
        let mut e = sample_engine();
        assert_eq!(e.add_to_group(&StudentId::Int(3)), Ok(true));
        assert_eq!(e.add_to_group(&StudentId::Int(3)), Ok(false));
        assert_eq!(e.group_stats().count, 1);

        assert_eq!(
            e.add_to_group(&StudentId::Int(42)),
            Err(EngineError::NotFound(StudentId::Int(42)))
        );
        assert_eq!(
            e.add_to_group(&StudentId::from("3")),
            Err(EngineError::NotFound(StudentId::from("3")))
        );
    }

    #[test]
    fn remove_missing_is_noop_and_clear_empties() {
        let mut e = sample_engine();
        e.add_to_group(&StudentId::Int(1)).expect("add");
        e.add_to_group(&StudentId::Int(2)).expect("add");
        assert!(!e.remove_from_group(&StudentId::Int(99)));
        assert_eq!(e.group_stats().count, 2);
        assert!(e.remove_from_group(&StudentId::Int(1)));
        assert_eq!(e.group_stats().count, 1);
        e.clear_group();
        assert_eq!(e.group_stats().count, 0);
    }

    #[test]
    fn empty_group_stats_default_to_zero() {
        let e = sample_engine();
        assert_eq!(
            e.group_stats(),
            GroupStats {
                count: 0,
                average_score: 0.0,
                top_performer: None,
            }
        );
        assert_eq!(e.group_chart(), ChartSeries::no_data());
        assert_eq!(
            e.export_group(NaiveDate::from_ymd_opt(2026, 1, 1).expect("date")),
            Err(EngineError::EmptyGroup)
        );
    }

    #[test]
    fn group_stats_use_add_order_for_ties() {
        let mut e = Engine::new();
        e.load(vec![
            student(1, "One", 80.0, 80.0, 80.0),
            student(2, "Two", 80.0, 80.0, 80.0),
            student(3, "Three", 80.0, 80.0, 80.0),
        ]);
        e.add_to_group(&StudentId::Int(3)).expect("add");
        e.add_to_group(&StudentId::Int(1)).expect("add");
        e.add_to_group(&StudentId::Int(2)).expect("add");

        let stats = e.group_stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.average_score, 80.0);
        assert_eq!(stats.top_performer.map(|t| t.name), Some("Three".to_string()));

        let Some(Insight::TopPerformer { name, .. }) = e.insights().pop() else {
            panic!("expected top performer insight");
        };
        assert_eq!(name, "One");
    }

    #[test]
    fn group_members_follow_add_order() {
        let mut e = sample_engine();
        e.add_to_group(&StudentId::Int(6)).expect("add");
        e.add_to_group(&StudentId::Int(2)).expect("add");
        let names: Vec<&str> = e.group_members().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Akhil", "Deepali"]);
    }

    #[test]
    fn reload_keeps_group_and_reports_stale_members() {
        let mut e = sample_engine();
        e.add_to_group(&StudentId::Int(1)).expect("add");
        e.add_to_group(&StudentId::Int(6)).expect("add");

        e.load(vec![student(6, "Akhil", 50.0, 50.0, 50.0), student(10, "New", 90.0, 90.0, 90.0)]);

        assert_eq!(e.stale_ids(), vec![StudentId::Int(1)]);
        let stats = e.group_stats();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.average_score, 50.0);

        let views = e.views();
        assert_eq!(views.group.stale_ids, vec![StudentId::Int(1)]);
        assert_eq!(views.group.members.len(), 1);

        assert!(e.remove_from_group(&StudentId::Int(1)));
        assert!(e.stale_ids().is_empty());
    }

    #[test]
    fn reload_shows_full_roster_and_resets_filter() {
        let mut e = sample_engine();
        e.search("deep");
        e.filter(BandFilter::High);
        assert_eq!(filtered_names(&e), vec!["Deepali"]);

        e.load(roster::sample_roster());
        assert_eq!(e.filtered().count(), e.roster().len());
        assert_eq!(
            e.filter_state(),
            FilterState {
                term: String::new(),
                band: BandFilter::All,
            }
        );

        e.filter(BandFilter::Low);
        e.load(vec![
            student(1, "Low", 10.0, 10.0, 10.0),
            student(2, "High", 90.0, 90.0, 90.0),
        ]);
        assert_eq!(filtered_names(&e), vec!["Low", "High"]);
    }

    #[test]
    fn views_reflect_membership_and_charts() {
        let mut e = sample_engine();
        e.add_to_group(&StudentId::Int(2)).expect("add");
        e.search("deep");
        let v = e.views();

        let names: Vec<(&str, bool)> = v
            .students
            .iter()
            .map(|r| (r.name.as_str(), r.in_group))
            .collect();
        assert_eq!(names, vec![("Khush deep", false), ("Deepali", true)]);
        assert_eq!(v.students[1].band, PerformanceBand::High);

        assert!(!v.overall_chart.placeholder);
        assert_eq!(v.overall_chart.labels, vec!["Math", "Science", "English"]);
        assert_eq!(v.group_chart.values, vec![92.0, 88.0, 90.0]);
        assert_eq!(v.insights.len(), 4);
        assert_eq!(v.group_stats.average_score, 90.0);
    }

    #[test]
    fn empty_engine_views_use_placeholders() {
        let v = Engine::new().views();
        assert!(v.students.is_empty());
        assert!(v.overall_chart.placeholder);
        assert!(v.group_chart.placeholder);
        assert!(v.insights.is_empty());
    }
}

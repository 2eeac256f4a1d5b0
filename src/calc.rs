use serde::Serialize;

use crate::roster::{Student, Subject};

pub const HIGH_THRESHOLD: f64 = 85.0;
pub const LOW_THRESHOLD: f64 = 70.0;

/// One decimal place, rounding the exact binary value; exact halves go away
/// from zero. `1.45` is stored just below the half and renders `1.4`.
pub fn format_1_decimal(x: f64) -> String {
    let frac = x.fract().abs();
    if frac == 0.25 || frac == 0.75 {
        // The only exact .x5 ties a double can hold; 10x is exact for these.
        let t = x * 10.0;
        return format!("{:.1}", t.signum() * (t.abs() + 0.5).floor() / 10.0);
    }
    // `{:.1}` already rounds the exact value; it only differs on ties.
    format!("{:.1}", x)
}

/// Mean of the three subject scores. NaN scores propagate.
pub fn student_average(s: &Student) -> f64 {
    (s.math + s.science + s.english) / 3.0
}

/// Left-to-right arithmetic mean; `None` for an empty input.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut n: usize = 0;
    let mut sum = 0.0;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Mean of per-student averages (not of raw scores).
pub fn average_of_averages<'a, I>(students: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Student>,
{
    mean(students.into_iter().map(student_average))
}

/// Stable arg-max by average: the first element seeds the reduction and only
/// a strictly higher average replaces it, so ties keep the earliest student.
pub fn top_performer<'a, I>(students: I) -> Option<&'a Student>
where
    I: IntoIterator<Item = &'a Student>,
{
    let mut it = students.into_iter();
    let first = it.next()?;
    Some(it.fold(first, |best, cur| {
        if student_average(cur) > student_average(best) {
            cur
        } else {
            best
        }
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceBand {
    High,
    Medium,
    Low,
}

impl PerformanceBand {
    /// Display classification. Anything that is neither high nor medium
    /// (including a NaN average) is low.
    pub fn classify(avg: f64) -> Self {
        if avg > HIGH_THRESHOLD {
            PerformanceBand::High
        } else if avg >= LOW_THRESHOLD {
            PerformanceBand::Medium
        } else {
            PerformanceBand::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BandFilter {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl BandFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            BandFilter::All => "all",
            BandFilter::High => "high",
            BandFilter::Medium => "medium",
            BandFilter::Low => "low",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        [
            BandFilter::All,
            BandFilter::High,
            BandFilter::Medium,
            BandFilter::Low,
        ]
        .into_iter()
        .find(|b| b.as_str().eq_ignore_ascii_case(raw))
    }

    /// Literal band predicates; a NaN average only passes `All`.
    pub fn matches(self, avg: f64) -> bool {
        match self {
            BandFilter::All => true,
            BandFilter::High => avg > HIGH_THRESHOLD,
            BandFilter::Medium => avg >= LOW_THRESHOLD && avg <= HIGH_THRESHOLD,
            BandFilter::Low => avg < LOW_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMeans {
    pub math: f64,
    pub science: f64,
    pub english: f64,
}

impl SubjectMeans {
    pub fn compute<'a, I>(students: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Student>,
        I::IntoIter: Clone,
    {
        let it = students.into_iter();
        let mut out = [0.0; 3];
        for (slot, subject) in out.iter_mut().zip(Subject::ALL) {
            *slot = mean(it.clone().map(|s| s.score(subject)))?;
        }
        Some(SubjectMeans {
            math: out[0],
            science: out[1],
            english: out[2],
        })
    }

    pub fn get(&self, subject: Subject) -> f64 {
        match subject {
            Subject::Math => self.math,
            Subject::Science => self.science,
            Subject::English => self.english,
        }
    }

    pub fn values(&self) -> [f64; 3] {
        Subject::ALL.map(|s| self.get(s))
    }

    /// Highest mean; strict `>` in declaration order so earlier subjects win ties.
    pub fn strongest(&self) -> (Subject, f64) {
        self.pick(|cand, best| cand > best)
    }

    /// Lowest mean; strict `<` in declaration order so earlier subjects win ties.
    pub fn weakest(&self) -> (Subject, f64) {
        self.pick(|cand, best| cand < best)
    }

    fn pick(&self, better: impl Fn(f64, f64) -> bool) -> (Subject, f64) {
        let mut best = (Subject::Math, self.math);
        for subject in [Subject::Science, Subject::English] {
            let v = self.get(subject);
            if better(v, best.1) {
                best = (subject, v);
            }
        }
        best
    }
}

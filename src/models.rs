use std::fmt;

use serde::{Deserialize, Serialize};

/// One student's inputs to the five rules. Field names double as the CSV
/// header for roster imports.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    pub attendance_pct: f64,
    pub final_grade: f64,
    pub username_ok: bool,
    pub password_ok: bool,
    pub is_locked: bool,
    pub participated: bool,
    pub base_score: f64,
    pub id_valid: bool,
    pub has_overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    pub passed: bool,
    pub detail: String,
}

impl RuleOutcome {
    pub fn new(passed: bool, detail: impl Into<String>) -> Self {
        Self {
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleName {
    Attendance,
    Grading,
    LoginSystem,
    BonusPoints,
    LibraryBorrowing,
}

impl RuleName {
    /// Evaluation order, which is also the column order of the audit log.
    pub const ALL: [RuleName; 5] = [
        RuleName::Attendance,
        RuleName::Grading,
        RuleName::LoginSystem,
        RuleName::BonusPoints,
        RuleName::LibraryBorrowing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::Attendance => "AttendanceRule",
            RuleName::Grading => "GradingRule",
            RuleName::LoginSystem => "LoginSystemRule",
            RuleName::BonusPoints => "BonusPointsRule",
            RuleName::LibraryBorrowing => "LibraryBorrowingRule",
        }
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule outcomes for one student, kept in evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationResult {
    outcomes: Vec<(RuleName, RuleOutcome)>,
}

impl EvaluationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an outcome. A rule evaluated twice keeps its first position
    /// and takes the newer outcome.
    pub fn insert(&mut self, rule: RuleName, outcome: RuleOutcome) {
        if let Some(slot) = self.outcomes.iter_mut().find(|(name, _)| *name == rule) {
            slot.1 = outcome;
        } else {
            self.outcomes.push((rule, outcome));
        }
    }

    pub fn get(&self, rule: RuleName) -> Option<&RuleOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| *name == rule)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleName, &RuleOutcome)> {
        self.outcomes.iter().map(|(name, outcome)| (*name, outcome))
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.passed)
    }
}

impl Serialize for EvaluationResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.outcomes.len()))?;
        for (name, outcome) in &self.outcomes {
            map.serialize_entry(name.as_str(), outcome)?;
        }
        map.end()
    }
}

/// One row of the audit log as read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub timestamp: String,
    pub student: String,
    pub outcomes: EvaluationResult,
}

#[derive(Debug, Clone)]
pub struct RuleTally {
    pub rule: RuleName,
    pub passed: usize,
    pub failed: usize,
}

/// Boolean spelling used in explanation texts and log columns.
pub fn bool_word(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

pub fn parse_bool_word(value: &str) -> Option<bool> {
    match value {
        "True" => Some(true),
        "False" => Some(false),
        _ => None,
    }
}

/// Renders a score with at least one decimal place: `88.0`, `93.5`, `88.25`.
pub fn score_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_text_keeps_one_decimal_for_whole_numbers() {
        assert_eq!(score_text(88.0), "88.0");
        assert_eq!(score_text(93.5), "93.5");
        assert_eq!(score_text(88.25), "88.25");
    }

    #[test]
    fn bool_words_parse_back() {
        assert_eq!(parse_bool_word(bool_word(true)), Some(true));
        assert_eq!(parse_bool_word(bool_word(false)), Some(false));
        assert_eq!(parse_bool_word("true"), None);
    }

    #[test]
    fn insert_preserves_first_position() {
        let mut result = EvaluationResult::new();
        result.insert(RuleName::Grading, RuleOutcome::new(true, "a"));
        result.insert(RuleName::Attendance, RuleOutcome::new(true, "b"));
        result.insert(RuleName::Grading, RuleOutcome::new(false, "c"));

        let order: Vec<RuleName> = result.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec![RuleName::Grading, RuleName::Attendance]);
        assert_eq!(result.get(RuleName::Grading).map(|o| o.passed), Some(false));
        assert!(!result.all_passed());
    }

    #[test]
    fn serializes_as_ordered_map() {
        let mut result = EvaluationResult::new();
        result.insert(RuleName::Attendance, RuleOutcome::new(true, "ok"));
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"AttendanceRule":{"passed":true,"detail":"ok"}}"#);
    }
}

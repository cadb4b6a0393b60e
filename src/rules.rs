use crate::models::{
    bool_word, score_text, EvaluationResult, RuleName, RuleOutcome, StudentRecord,
};

pub const ATTENDANCE_THRESHOLD: f64 = 75.0;
pub const PASSING_GRADE: f64 = 75.0;
pub const DEFAULT_BONUS: f64 = 5.0;
pub const DEFAULT_BONUS_CAP: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusPolicy {
    pub bonus: f64,
    pub cap: f64,
}

impl Default for BonusPolicy {
    fn default() -> Self {
        Self {
            bonus: DEFAULT_BONUS,
            cap: DEFAULT_BONUS_CAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BonusAward {
    pub outcome: RuleOutcome,
    pub final_score: f64,
}

pub fn attendance_rule(attendance_pct: f64) -> RuleOutcome {
    let eligible = attendance_pct >= ATTENDANCE_THRESHOLD;
    let verdict = if eligible { "eligible" } else { "not eligible" };
    RuleOutcome::new(
        eligible,
        format!("attendance={attendance_pct:.1}% -> {verdict}"),
    )
}

pub fn grading_rule(final_grade: f64) -> RuleOutcome {
    let passed = final_grade >= PASSING_GRADE;
    let verdict = if passed { "pass" } else { "fail" };
    RuleOutcome::new(passed, format!("grade={final_grade:.1} -> {verdict}"))
}

pub fn login_rule(username_ok: bool, password_ok: bool, is_locked: bool) -> RuleOutcome {
    let success = username_ok && password_ok && !is_locked;
    let verdict = if success { "login success" } else { "login denied" };
    RuleOutcome::new(
        success,
        format!(
            "user_ok={}, pass_ok={}, locked={} -> {verdict}",
            bool_word(username_ok),
            bool_word(password_ok),
            bool_word(is_locked),
        ),
    )
}

/// Adds `bonus` to `base_score` for participants, never past `cap`.
/// The outcome reports whether a bonus was applied, not the score itself.
pub fn bonus_rule(participated: bool, base_score: f64, bonus: f64, cap: f64) -> BonusAward {
    let base = score_text(base_score);
    if participated {
        let final_score = (base_score + bonus).min(cap);
        BonusAward {
            outcome: RuleOutcome::new(
                true,
                format!(
                    "participated=True, base={base} -> bonus +{}, final={}",
                    score_text(bonus),
                    score_text(final_score)
                ),
            ),
            final_score,
        }
    } else {
        BonusAward {
            outcome: RuleOutcome::new(
                false,
                format!("participated=False, base={base} -> no bonus, final={base}"),
            ),
            final_score: base_score,
        }
    }
}

pub fn library_rule(id_valid: bool, has_overdue: bool) -> RuleOutcome {
    let allowed = id_valid && !has_overdue;
    let verdict = if allowed { "allowed" } else { "not allowed" };
    RuleOutcome::new(
        allowed,
        format!(
            "id_valid={}, overdue={} -> {verdict}",
            bool_word(id_valid),
            bool_word(has_overdue)
        ),
    )
}

pub fn evaluate_student(record: &StudentRecord) -> EvaluationResult {
    evaluate_with_policy(record, BonusPolicy::default())
}

pub fn evaluate_with_policy(record: &StudentRecord, policy: BonusPolicy) -> EvaluationResult {
    let mut result = EvaluationResult::new();
    result.insert(RuleName::Attendance, attendance_rule(record.attendance_pct));
    result.insert(RuleName::Grading, grading_rule(record.final_grade));
    result.insert(
        RuleName::LoginSystem,
        login_rule(record.username_ok, record.password_ok, record.is_locked),
    );
    result.insert(
        RuleName::BonusPoints,
        bonus_rule(record.participated, record.base_score, policy.bonus, policy.cap).outcome,
    );
    result.insert(
        RuleName::LibraryBorrowing,
        library_rule(record.id_valid, record.has_overdue),
    );
    result
}

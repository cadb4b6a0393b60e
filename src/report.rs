use std::fmt::Write;
use std::path::Path;

use crate::models::{bool_word, LogRow, RuleName, RuleTally};

pub fn tally_by_rule(rows: &[LogRow]) -> Vec<RuleTally> {
    RuleName::ALL
        .into_iter()
        .map(|rule| {
            let mut tally = RuleTally {
                rule,
                passed: 0,
                failed: 0,
            };
            for row in rows {
                match row.outcomes.get(rule) {
                    Some(outcome) if outcome.passed => tally.passed += 1,
                    Some(_) => tally.failed += 1,
                    None => {}
                }
            }
            tally
        })
        .collect()
}

pub fn build_report(source: &Path, rows: &[LogRow]) -> String {
    let tallies = tally_by_rule(rows);

    let mut output = String::new();
    let _ = writeln!(output, "# Student Rules Audit Report");
    let _ = writeln!(
        output,
        "Generated from {} ({} evaluations)",
        source.display(),
        rows.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Rule Outcomes");

    if rows.is_empty() {
        let _ = writeln!(output, "No evaluations recorded.");
    } else {
        for tally in tallies.iter() {
            let _ = writeln!(
                output,
                "- {}: {} passed, {} failed",
                tally.rule, tally.passed, tally.failed
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students With Failed Rules");

    let flagged: Vec<&LogRow> = rows.iter().filter(|row| !row.outcomes.all_passed()).collect();
    if flagged.is_empty() {
        let _ = writeln!(output, "Every recorded student passed every rule.");
    } else {
        for row in flagged {
            let failed: Vec<&str> = row
                .outcomes
                .iter()
                .filter(|(_, outcome)| !outcome.passed)
                .map(|(rule, _)| rule.as_str())
                .collect();
            let _ = writeln!(
                output,
                "- {} ({}): {}",
                row.student,
                row.timestamp,
                failed.join(", ")
            );
        }
    }

    // Newest first; rows logged within the same second keep reverse file order.
    let mut recent: Vec<&LogRow> = rows.iter().rev().collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Evaluations");

    if recent.is_empty() {
        let _ = writeln!(output, "No evaluations recorded.");
    } else {
        for row in recent.iter().take(5) {
            let _ = writeln!(output, "- {} on {}", row.student, row.timestamp);
            for (rule, outcome) in row.outcomes.iter() {
                let _ = writeln!(
                    output,
                    "  - {}: {} | {}",
                    rule,
                    bool_word(outcome.passed),
                    outcome.detail
                );
            }
        }
    }

    output
}

use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::models::StudentRecord;

/// Built-in records evaluated by the `demo` command.
pub fn demo_students() -> Vec<StudentRecord> {
    vec![
        StudentRecord {
            name: "Mendez".to_string(),
            attendance_pct: 82.5,
            final_grade: 78.0,
            username_ok: true,
            password_ok: true,
            is_locked: false,
            participated: true,
            base_score: 88.0,
            id_valid: true,
            has_overdue: false,
        },
        StudentRecord {
            name: "Mendoza".to_string(),
            attendance_pct: 70.0,
            final_grade: 72.0,
            username_ok: true,
            password_ok: false,
            is_locked: false,
            participated: false,
            base_score: 65.0,
            id_valid: true,
            has_overdue: true,
        },
        StudentRecord {
            name: "Mercado".to_string(),
            attendance_pct: 95.0,
            final_grade: 92.0,
            username_ok: true,
            password_ok: true,
            is_locked: true,
            participated: true,
            base_score: 96.0,
            id_valid: false,
            has_overdue: false,
        },
    ]
}

/// Reads student records from a CSV file whose header names the
/// `StudentRecord` fields. The first malformed row aborts the import.
pub fn import_csv(csv_path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open roster {}", csv_path.display()))?;
    let mut students = Vec::new();

    for result in reader.deserialize::<StudentRecord>() {
        let record = result
            .with_context(|| format!("invalid student record in {}", csv_path.display()))?;
        students.push(record);
    }

    info!(count = students.len(), path = %csv_path.display(), "imported roster");
    Ok(students)
}

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::{debug, info};

use crate::error::LogError;
use crate::models::{bool_word, parse_bool_word, EvaluationResult, LogRow, RuleName, RuleOutcome};

/// Audit log columns, in order. Every file starts with exactly this header.
pub const LOG_COLUMNS: [&str; 12] = [
    "timestamp",
    "student",
    "AttendanceRule",
    "AttendanceDetail",
    "GradingRule",
    "GradingDetail",
    "LoginSystemRule",
    "LoginDetail",
    "BonusPointsRule",
    "BonusDetail",
    "LibraryBorrowingRule",
    "LibraryDetail",
];

const DEFAULT_LOG_FILE: &str = "logic_results.csv";

/// Appends one row per evaluated student to a comma-separated audit file.
///
/// There is no locking: concurrent writers on the same file can interleave
/// rows. One writing process per file is assumed.
#[derive(Debug, Clone)]
pub struct ResultLogger {
    destination: PathBuf,
}

impl ResultLogger {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    /// `~/Downloads/logic_results.csv`, or the working directory when no
    /// home directory is known.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Downloads")
            .join(DEFAULT_LOG_FILE)
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Removes the log file if present.
    pub fn reset(&self) -> Result<(), LogError> {
        match fs::remove_file(&self.destination) {
            Ok(()) => {
                info!(path = %self.destination.display(), "removed previous audit log");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn log_result(
        &self,
        student_name: &str,
        result: &EvaluationResult,
    ) -> Result<(), LogError> {
        let mut row = Vec::with_capacity(LOG_COLUMNS.len());
        row.push(Local::now().format("%Y-%m-%dT%H:%M:%S").to_string());
        row.push(student_name.to_string());
        for rule in RuleName::ALL {
            let outcome = result.get(rule).ok_or(LogError::MissingRule(rule))?;
            row.push(bool_word(outcome.passed).to_string());
            row.push(outcome.detail.clone());
        }

        let need_header = fs::metadata(&self.destination)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.destination)?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::CRLF)
            .from_writer(file);

        if need_header {
            debug!(path = %self.destination.display(), "writing audit log header");
            writer.write_record(LOG_COLUMNS)?;
        }
        writer.write_record(&row)?;
        writer.flush()?;

        debug!(student = student_name, path = %self.destination.display(), "appended audit row");
        Ok(())
    }

    pub fn read_rows(&self) -> Result<Vec<LogRow>, LogError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.destination)?;

        let headers = reader.headers()?.clone();
        if headers.iter().ne(LOG_COLUMNS.iter().copied()) {
            return Err(LogError::BadHeader(headers.iter().collect::<Vec<_>>().join(",")));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(parse_row(&record?)?);
        }
        Ok(rows)
    }
}

fn parse_row(record: &StringRecord) -> Result<LogRow, LogError> {
    let line = record.position().map(|pos| pos.line()).unwrap_or(0);
    let field = |index: usize| record.get(index).unwrap_or_default();

    let mut outcomes = EvaluationResult::new();
    for (offset, rule) in RuleName::ALL.into_iter().enumerate() {
        let index = 2 + offset * 2;
        let passed = parse_bool_word(field(index)).ok_or_else(|| LogError::BadBool {
            line,
            column: rule.as_str(),
            value: field(index).to_string(),
        })?;
        outcomes.insert(rule, RuleOutcome::new(passed, field(index + 1)));
    }

    Ok(LogRow {
        timestamp: field(0).to_string(),
        student: field(1).to_string(),
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::demo_students;
    use crate::rules::evaluate_student;
    use tempfile::tempdir;

    #[test]
    fn writes_header_once_and_one_row_per_student() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let logger = ResultLogger::new(&path);

        let students = demo_students();
        for student in &students {
            logger.log_result(&student.name, &evaluate_student(student)).unwrap();
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .unwrap();
        let records: Vec<StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), students.len() + 1);
        assert_eq!(records[0].iter().collect::<Vec<_>>(), LOG_COLUMNS.to_vec());
        for (record, student) in records[1..].iter().zip(&students) {
            assert_eq!(record.len(), 12);
            assert_eq!(&record[1], student.name);
        }
        assert_eq!(&records[1][2], "True");
        assert_eq!(&records[1][3], "attendance=82.5% -> eligible");
        assert_eq!(&records[2][2], "False");
    }

    #[test]
    fn appends_to_existing_log_without_new_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let logger = ResultLogger::new(&path);
        let student = &demo_students()[0];

        logger.log_result(&student.name, &evaluate_student(student)).unwrap();
        logger.log_result(&student.name, &evaluate_student(student)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("timestamp,student").count(), 1);
        assert_eq!(logger.read_rows().unwrap().len(), 2);
    }

    #[test]
    fn empty_file_gets_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(&path, "").unwrap();
        let logger = ResultLogger::new(&path);
        let student = &demo_students()[1];

        logger.log_result(&student.name, &evaluate_student(student)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("timestamp,student,AttendanceRule"));
    }

    #[test]
    fn timestamp_has_second_precision() {
        let dir = tempdir().unwrap();
        let logger = ResultLogger::new(dir.path().join("results.csv"));
        let student = &demo_students()[0];
        logger.log_result(&student.name, &evaluate_student(student)).unwrap();

        let rows = logger.read_rows().unwrap();
        let parsed =
            chrono::NaiveDateTime::parse_from_str(&rows[0].timestamp, "%Y-%m-%dT%H:%M:%S");
        assert!(parsed.is_ok());
    }

    #[test]
    fn rows_read_back_match_evaluation() {
        let dir = tempdir().unwrap();
        let logger = ResultLogger::new(dir.path().join("results.csv"));
        let student = &demo_students()[2];
        let result = evaluate_student(student);
        logger.log_result(&student.name, &result).unwrap();

        let rows = logger.read_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student, "Mercado");
        assert_eq!(rows[0].outcomes, result);
    }

    #[test]
    fn missing_parent_directory_is_an_io_error() {
        let dir = tempdir().unwrap();
        let logger = ResultLogger::new(dir.path().join("absent").join("results.csv"));
        let student = &demo_students()[0];
        let err = logger
            .log_result(&student.name, &evaluate_student(student))
            .unwrap_err();
        assert!(matches!(err, LogError::Io(_)));
    }

    #[test]
    fn incomplete_result_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let logger = ResultLogger::new(&path);
        let mut partial = EvaluationResult::new();
        partial.insert(RuleName::Attendance, RuleOutcome::new(true, "ok"));

        let err = logger.log_result("Nobody", &partial).unwrap_err();
        assert!(matches!(err, LogError::MissingRule(RuleName::Grading)));
        assert!(!path.exists());
    }

    #[test]
    fn reset_removes_file_and_tolerates_absence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(&path, "stale").unwrap();
        let logger = ResultLogger::new(&path);

        logger.reset().unwrap();
        assert!(!path.exists());
        logger.reset().unwrap();
    }

    #[test]
    fn rejects_lowercase_booleans() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let mut contents = LOG_COLUMNS.join(",");
        contents.push_str("\n2026-01-01T00:00:00,X,true,a,True,b,True,c,True,d,True,e\n");
        fs::write(&path, contents).unwrap();

        let err = ResultLogger::new(&path).read_rows().unwrap_err();
        assert!(matches!(
            err,
            LogError::BadBool {
                column: "AttendanceRule",
                ..
            }
        ));
    }

    #[test]
    fn default_path_points_at_downloads() {
        let path = ResultLogger::default_path();
        assert!(path.ends_with("Downloads/logic_results.csv"));
    }
}

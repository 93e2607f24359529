//! Pending attendance statuses for one class on one date.

use chrono::NaiveDate;
use serde::Serialize;

use attendance_core::error::AppError;
use attendance_core::result::AppResult;
use attendance_core::types::request::{AttendanceSubmission, StatusEntry};
use attendance_core::types::{AttendanceBlock, AttendanceRecord, AttendanceStatus, ClassId, StudentId};

/// The `(classId, date)` a buffer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditScope {
    /// Class being edited.
    pub class_id: ClassId,
    /// Date being edited.
    pub date: NaiveDate,
}

/// Transient studentId → status mapping built from one loaded block.
///
/// Rows keep the order of the loaded records. The buffer is only ever
/// submitted as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBuffer {
    scope: EditScope,
    is_filled: bool,
    rows: Vec<AttendanceRecord>,
}

impl EditBuffer {
    /// Rebuild a buffer verbatim from a loaded block.
    pub fn from_block(block: AttendanceBlock) -> Self {
        Self {
            scope: EditScope {
                class_id: block.class_id,
                date: block.date,
            },
            is_filled: block.is_filled,
            rows: block.records,
        }
    }

    /// Scope the buffer was loaded for.
    pub fn scope(&self) -> EditScope {
        self.scope
    }

    /// Server-reported fill flag of the loaded block.
    pub fn is_filled(&self) -> bool {
        self.is_filled
    }

    /// Buffered rows, in load order.
    pub fn rows(&self) -> &[AttendanceRecord] {
        &self.rows
    }

    /// Number of buffered students.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no student is buffered.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pending status of one student.
    pub fn status(&self, student_id: StudentId) -> Option<AttendanceStatus> {
        self.rows
            .iter()
            .find(|r| r.student_id == student_id)
            .map(|r| r.status)
    }

    /// Set one buffered student's status.
    pub fn set(&mut self, student_id: StudentId, status: AttendanceStatus) -> AppResult<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.student_id == student_id)
            .ok_or_else(|| {
                AppError::precondition(format!("Student #{student_id} is not on this sheet"))
            })?;
        row.status = status;
        Ok(())
    }

    /// Set every buffered status. Returns the number of rows touched.
    pub fn set_all(&mut self, status: AttendanceStatus) -> usize {
        for row in &mut self.rows {
            row.status = status;
        }
        self.rows.len()
    }

    /// Body of the replace-all `PUT` for this buffer.
    pub fn to_submission(&self) -> AttendanceSubmission {
        AttendanceSubmission {
            class_id: self.scope.class_id,
            records: self
                .rows
                .iter()
                .map(|r| StatusEntry {
                    student_id: r.student_id,
                    status: r.status,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(n: i64) -> EditBuffer {
        EditBuffer::from_block(AttendanceBlock {
            class_id: ClassId(3),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            is_filled: false,
            records: (1..=n)
                .map(|id| AttendanceRecord {
                    student_id: StudentId(id),
                    full_name: format!("Student {id}"),
                    status: AttendanceStatus::Present,
                })
                .collect(),
        })
    }

    #[test]
    fn test_set_all_touches_every_row() {
        let mut buffer = buffer(5);
        assert_eq!(buffer.set_all(AttendanceStatus::Excused), 5);
        assert!(
            buffer
                .rows()
                .iter()
                .all(|r| r.status == AttendanceStatus::Excused)
        );
    }

    #[test]
    fn test_set_unknown_student_fails() {
        let mut buffer = buffer(2);
        assert!(buffer.set(StudentId(9), AttendanceStatus::Unexcused).is_err());
        assert_eq!(buffer.status(StudentId(1)), Some(AttendanceStatus::Present));
    }

    #[test]
    fn test_submission_keeps_row_order() {
        let mut buffer = buffer(3);
        buffer.set(StudentId(2), AttendanceStatus::Unexcused).unwrap();
        let submission = buffer.to_submission();
        let ids: Vec<i64> = submission.records.iter().map(|r| r.student_id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(submission.records[1].status, AttendanceStatus::Unexcused);
        assert_eq!(submission.class_id, ClassId(3));
    }
}

//! Domain model as returned by the attendance service.
//!
//! These are immutable snapshots: the client never mutates them in place,
//! it re-fetches.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::{ClassId, StudentId, UserId};
use crate::error::AppError;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages teachers and classes, may query across all classes.
    Admin,
    /// Manages the students and attendance of their own classes.
    Teacher,
}

impl Role {
    /// Whether this role may use admin-only capabilities.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            other => Err(AppError::precondition(format!("Unknown role '{other}'"))),
        }
    }
}

/// A user account as listed by `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Account id.
    pub id: UserId,
    /// Login name.
    pub login: String,
    /// Role.
    pub role: Role,
    /// Class taught by this user, if any.
    #[serde(default)]
    pub class_id: Option<ClassId>,
    /// Admin who promoted this user, if they were promoted.
    #[serde(default)]
    pub promoted_by: Option<UserId>,
}

/// A class: a roster of students taught by one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    /// Class id.
    pub id: ClassId,
    /// Display name, e.g. `7A`.
    pub name: String,
    /// Teacher owning the class.
    pub teacher_id: UserId,
}

/// A student of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Student id.
    pub id: StudentId,
    /// Full name.
    pub full_name: String,
    /// Whether the student is currently active in the class.
    pub is_active: bool,
}

/// Attendance status of one student on one date. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// Attended.
    Present,
    /// Absent with a valid reason.
    Excused,
    /// Absent without a valid reason.
    Unexcused,
}

impl AttendanceStatus {
    /// All statuses in display order.
    pub const ALL: [AttendanceStatus; 3] = [Self::Present, Self::Excused, Self::Unexcused];

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Excused => "excused",
            Self::Unexcused => "unexcused",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "excused" => Ok(Self::Excused),
            "unexcused" => Ok(Self::Unexcused),
            other => Err(AppError::precondition(format!(
                "Unknown attendance status '{other}' (expected present, excused or unexcused)"
            ))),
        }
    }
}

/// One student's status inside an [`AttendanceBlock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Student id.
    pub student_id: StudentId,
    /// Student full name at the time of the query.
    pub full_name: String,
    /// Recorded status.
    pub status: AttendanceStatus,
}

/// One class's attendance for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceBlock {
    /// Class the block belongs to.
    pub class_id: ClassId,
    /// Calendar date.
    pub date: NaiveDate,
    /// Server-asserted completeness flag. Informational only.
    pub is_filled: bool,
    /// Records in service order.
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
}

/// Present/excused/unexcused counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Number of `present` marks.
    pub present: u32,
    /// Number of `excused` marks.
    pub excused: u32,
    /// Number of `unexcused` marks.
    pub unexcused: u32,
}

impl StatusCounts {
    /// Total number of marks.
    pub fn total(&self) -> u64 {
        u64::from(self.present) + u64::from(self.excused) + u64::from(self.unexcused)
    }

    /// Column-wise sum, or `None` if any column overflows.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self {
            present: self.present.checked_add(rhs.present)?,
            excused: self.excused.checked_add(rhs.excused)?,
            unexcused: self.unexcused.checked_add(rhs.unexcused)?,
        })
    }
}

/// Weekly counters for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentWeeklyStats {
    /// Student id.
    pub student_id: StudentId,
    /// Student full name.
    pub full_name: String,
    /// Counters for the week.
    #[serde(flatten)]
    pub counts: StatusCounts,
}

/// Weekly attendance statistics for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStatBlock {
    /// Class the statistics belong to.
    pub class_id: ClassId,
    /// First day of the window.
    pub from: NaiveDate,
    /// Last day of the window (inclusive).
    pub to: NaiveDate,
    /// Aggregate counters over all students.
    pub summary: StatusCounts,
    /// Per-student counters in service order.
    #[serde(default)]
    pub students: Vec<StudentWeeklyStats>,
}

impl WeeklyStatBlock {
    /// Column-wise sum of the per-student counters.
    ///
    /// Counters that do not fit in `u32` can never match a summary and are
    /// rejected as an invalid response.
    pub fn student_totals(&self) -> Result<StatusCounts, AppError> {
        self.students
            .iter()
            .try_fold(StatusCounts::default(), |totals, student| {
                totals.checked_add(student.counts)
            })
            .ok_or_else(|| {
                AppError::invalid_response(format!(
                    "Weekly statistics for class #{} overflow the per-student counters",
                    self.class_id
                ))
            })
    }

    /// Verify that `summary` equals the column-wise sum over `students`.
    pub fn check_summary(&self) -> Result<(), AppError> {
        let totals = self.student_totals()?;
        if totals == self.summary {
            return Ok(());
        }
        Err(AppError::invalid_response(format!(
            "Weekly statistics for class #{} are inconsistent: summary p={} e={} u={}, students sum p={} e={} u={}",
            self.class_id,
            self.summary.present,
            self.summary.excused,
            self.summary.unexcused,
            totals.present,
            totals.excused,
            totals.unexcused,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_block_deserializes_wire_shape() {
        let json = r#"{"classId":3,"date":"2024-03-01","isFilled":false,
            "records":[{"studentId":1,"fullName":"A","status":"present"}]}"#;
        let block: AttendanceBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.class_id, ClassId(3));
        assert_eq!(block.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(!block.is_filled);
        assert_eq!(block.records[0].status, AttendanceStatus::Present);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = r#"{"studentId":1,"fullName":"A","status":"late"}"#;
        assert!(serde_json::from_str::<AttendanceRecord>(json).is_err());
        assert!("late".parse::<AttendanceStatus>().is_err());
        assert_eq!(
            "Excused".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Excused
        );
    }

    fn weekly(summary: StatusCounts) -> WeeklyStatBlock {
        let json = r#"{"classId":3,"from":"2024-03-04","to":"2024-03-10",
            "summary":{"present":0,"excused":0,"unexcused":0},
            "students":[
                {"studentId":1,"fullName":"A","present":3,"excused":1,"unexcused":0},
                {"studentId":2,"fullName":"B","present":2,"excused":0,"unexcused":2}
            ]}"#;
        let mut block: WeeklyStatBlock = serde_json::from_str(json).unwrap();
        block.summary = summary;
        block
    }

    #[test]
    fn test_summary_matches_student_columns() {
        let block = weekly(StatusCounts {
            present: 5,
            excused: 1,
            unexcused: 2,
        });
        assert_eq!(block.students[1].counts.unexcused, 2);
        assert!(block.check_summary().is_ok());
        assert_eq!(block.student_totals().unwrap().total(), 8);
    }

    #[test]
    fn test_summary_mismatch_is_invalid_response() {
        let block = weekly(StatusCounts {
            present: 6,
            excused: 1,
            unexcused: 2,
        });
        let err = block.check_summary().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_overflowing_student_counts_are_invalid_response() {
        let mut block = weekly(StatusCounts::default());
        block.students[0].counts.present = u32::MAX;
        block.summary = StatusCounts {
            present: u32::MAX,
            excused: 1,
            unexcused: 2,
        };

        let err = block.check_summary().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidResponse);
        assert!(block.student_totals().is_err());
    }

    #[test]
    fn test_total_does_not_overflow() {
        let counts = StatusCounts {
            present: u32::MAX,
            excused: u32::MAX,
            unexcused: 1,
        };
        assert_eq!(counts.total(), 2 * u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_user_account_tolerates_missing_optional_fields() {
        let json = r#"{"id":7,"login":"t.smith","role":"teacher"}"#;
        let user: UserAccount = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Teacher);
        assert_eq!(user.class_id, None);
    }
}

//! Request bodies sent to the attendance service.
//!
//! Bodies carrying user input derive [`Validate`] so they can be rejected
//! locally before any network call.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::id::{ClassId, StudentId, UserId};
use super::model::{AttendanceStatus, Role};

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login name.
    #[validate(length(min = 1, message = "is required"))]
    pub login: String,
    /// Password.
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Create teacher request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTeacherRequest {
    /// Login name.
    #[validate(length(min = 1, message = "is required"))]
    pub login: String,
    /// Initial password.
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Credential update; only the provided fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCredentialsRequest {
    /// New login.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be blank"))]
    pub login: Option<String>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be blank"))]
    pub password: Option<String>,
}

impl UpdateCredentialsRequest {
    /// Build from raw form input, treating blank fields as "unchanged".
    pub fn from_input(login: Option<&str>, password: Option<&str>) -> Self {
        Self {
            login: login
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            password: password.filter(|s| !s.is_empty()).map(String::from),
        }
    }

    /// Whether no field would change.
    pub fn is_empty(&self) -> bool {
        self.login.is_none() && self.password.is_none()
    }
}

/// Role change request (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    /// New role.
    pub role: Role,
}

/// Create class request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    /// Class name.
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    /// Teacher owning the class.
    pub teacher_id: UserId,
}

/// Add student request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    /// Full name.
    #[validate(length(min = 1, message = "is required"))]
    pub full_name: String,
}

/// Student update; only the provided fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    /// New full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be blank"))]
    pub full_name: Option<String>,
    /// New active flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateStudentRequest {
    /// Whether no field would change.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.is_active.is_none()
    }
}

/// One entry of an attendance submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    /// Student id.
    pub student_id: StudentId,
    /// Status to store.
    pub status: AttendanceStatus,
}

/// Replace-for-(date, class) attendance submission (`PUT /attendance`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSubmission {
    /// Class the records belong to.
    pub class_id: ClassId,
    /// The complete set of records for the date.
    pub records: Vec<StatusEntry>,
}

//! Typed helpers for every attendance service endpoint.
//!
//! Bodies carrying user input are validated before the request is sent so
//! that blank forms fail locally with a precondition error.

use chrono::NaiveDate;
use validator::Validate;

use attendance_core::result::AppResult;
use attendance_core::types::request::{
    AttendanceSubmission, CreateClassRequest, CreateStudentRequest, CreateTeacherRequest,
    LoginRequest, UpdateCredentialsRequest, UpdateRoleRequest, UpdateStudentRequest,
};
use attendance_core::types::{
    Ack, AttendanceBlock, Class, ClassId, LoginResponse, OneOrMany, Student, StudentId,
    UserAccount, UserId, WeeklyStatBlock,
};
use attendance_core::AppError;

use super::{HttpMethod, RequestGateway};
use crate::scope::ScopeQuery;

impl RequestGateway {
    /// `POST /auth/login`
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;
        self.send(HttpMethod::Post, "/auth/login", vec![], request)
            .await
    }

    /// `GET /users`
    pub async fn list_users(&self) -> AppResult<Vec<UserAccount>> {
        self.get("/users", vec![]).await
    }

    /// `POST /users`
    pub async fn create_teacher(&self, request: &CreateTeacherRequest) -> AppResult<Ack> {
        request.validate()?;
        self.send(HttpMethod::Post, "/users", vec![], request).await
    }

    /// `PATCH /users/{id}/credentials`
    pub async fn update_credentials(
        &self,
        user_id: UserId,
        request: &UpdateCredentialsRequest,
    ) -> AppResult<Ack> {
        ensure_credentials_change(request)?;
        let path = format!("/users/{user_id}/credentials");
        self.send(HttpMethod::Patch, &path, vec![], request).await
    }

    /// `PATCH /profile/credentials`
    pub async fn update_own_credentials(&self, request: &UpdateCredentialsRequest) -> AppResult<Ack> {
        ensure_credentials_change(request)?;
        self.send(HttpMethod::Patch, "/profile/credentials", vec![], request)
            .await
    }

    /// `PATCH /users/{id}/role`
    pub async fn update_role(&self, user_id: UserId, request: &UpdateRoleRequest) -> AppResult<Ack> {
        let path = format!("/users/{user_id}/role");
        self.send(HttpMethod::Patch, &path, vec![], request).await
    }

    /// `GET /classes`
    pub async fn list_classes(&self) -> AppResult<Vec<Class>> {
        self.get("/classes", vec![]).await
    }

    /// `POST /classes`
    pub async fn create_class(&self, request: &CreateClassRequest) -> AppResult<Ack> {
        request.validate()?;
        self.send(HttpMethod::Post, "/classes", vec![], request).await
    }

    /// `GET /classes/{id}/students`
    pub async fn list_students(&self, class_id: ClassId) -> AppResult<Vec<Student>> {
        self.get(&format!("/classes/{class_id}/students"), vec![])
            .await
    }

    /// `POST /classes/{id}/students`
    pub async fn add_student(
        &self,
        class_id: ClassId,
        request: &CreateStudentRequest,
    ) -> AppResult<Ack> {
        request.validate()?;
        let path = format!("/classes/{class_id}/students");
        self.send(HttpMethod::Post, &path, vec![], request).await
    }

    /// `PATCH /students/{id}`
    pub async fn update_student(
        &self,
        student_id: StudentId,
        request: &UpdateStudentRequest,
    ) -> AppResult<Ack> {
        if request.is_empty() {
            return Err(AppError::precondition("Nothing to update"));
        }
        request.validate()?;
        let path = format!("/students/{student_id}");
        self.send(HttpMethod::Patch, &path, vec![], request).await
    }

    /// `GET /attendance`
    pub async fn fetch_attendance(&self, query: &ScopeQuery) -> AppResult<OneOrMany<AttendanceBlock>> {
        self.get("/attendance", query.to_pairs()).await
    }

    /// `PUT /attendance?date=`: replaces every record of the class on that date.
    pub async fn submit_attendance(
        &self,
        date: NaiveDate,
        submission: &AttendanceSubmission,
    ) -> AppResult<Ack> {
        let query = vec![("date", date.format("%Y-%m-%d").to_string())];
        self.send(HttpMethod::Put, "/attendance", query, submission)
            .await
    }

    /// `GET /statistics/weekly`
    pub async fn fetch_weekly_statistics(
        &self,
        query: &ScopeQuery,
    ) -> AppResult<OneOrMany<WeeklyStatBlock>> {
        self.get("/statistics/weekly", query.to_pairs()).await
    }
}

fn ensure_credentials_change(request: &UpdateCredentialsRequest) -> AppResult<()> {
    if request.is_empty() {
        return Err(AppError::precondition("Provide a new login or password"));
    }
    request.validate()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use attendance_core::error::ErrorKind;
    use serde_json::json;

    use super::*;
    use crate::gateway::ScriptedTransport;

    fn gateway(transport: &ScriptedTransport) -> RequestGateway {
        RequestGateway::new(Arc::new(transport.clone()), "http://school.test/api/v1")
    }

    #[tokio::test]
    async fn test_blank_login_never_hits_the_wire() {
        let transport = ScriptedTransport::new();
        let gw = gateway(&transport);

        let err = gw
            .login(&LoginRequest {
                login: String::new(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Precondition);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_credentials_update_is_rejected_locally() {
        let transport = ScriptedTransport::new();
        let gw = gateway(&transport);

        let err = gw
            .update_credentials(UserId(3), &UpdateCredentialsRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Precondition);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_attendance_puts_date_in_query() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Put, "/attendance", 200, json!({"message": "Saved"}));
        let gw = gateway(&transport);

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        gw.submit_attendance(
            date,
            &AttendanceSubmission {
                class_id: ClassId(3),
                records: vec![],
            },
        )
        .await
        .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.query_param("date"), Some("2024-03-01"));
        assert_eq!(request.body, Some(json!({"classId": 3, "records": []})));
    }

    #[tokio::test]
    async fn test_update_student_sends_only_changed_fields() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Patch, "/students/9", 200, json!({"message": "Updated"}));
        let gw = gateway(&transport);

        gw.update_student(
            StudentId(9),
            &UpdateStudentRequest {
                full_name: None,
                is_active: Some(false),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            transport.last_request().unwrap().body,
            Some(json!({"isActive": false}))
        );
    }
}

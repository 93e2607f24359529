//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};

use attendance_client::gateway::{HttpMethod, ScriptedTransport};
use attendance_client::{Action, AttendanceApp, DurableStorage, MemoryStorage};

/// API base every test app points at.
pub const BASE: &str = "http://school.test/api/v1";

/// Test application context
pub struct TestApp {
    /// The client under test
    pub app: AttendanceApp,
    /// Scripted wire; queue responses here
    pub transport: ScriptedTransport,
    /// Durable storage behind the session store
    pub storage: Arc<dyn DurableStorage>,
}

impl TestApp {
    /// Create a logged-out client over in-memory storage
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    /// Create a logged-out client over the given storage
    pub fn with_storage(storage: Arc<dyn DurableStorage>) -> Self {
        let transport = ScriptedTransport::new();
        let app = AttendanceApp::new(Arc::new(transport.clone()), Arc::clone(&storage), BASE);
        Self {
            app,
            transport,
            storage,
        }
    }

    /// Script and perform a login. Teachers load classes; admins also load users.
    pub async fn login_as(&mut self, role: &str, user_id: i64, classes: Value) {
        self.transport.respond(
            HttpMethod::Post,
            "/auth/login",
            200,
            json!({"accessToken": format!("token-{user_id}"), "role": role, "userId": user_id}),
        );
        self.transport
            .respond(HttpMethod::Get, "/classes", 200, classes);
        if role == "admin" {
            self.transport
                .respond(HttpMethod::Get, "/users", 200, users());
        }

        let notice = self
            .app
            .dispatch(Action::Login {
                api_base: None,
                login: "user".into(),
                password: "password123".into(),
            })
            .await;
        assert!(!notice.is_error, "login failed: {}", notice.message);
    }
}

/// Two classes, the second one taught by teacher #7.
pub fn classes() -> Value {
    json!([
        {"id": 2, "name": "6B", "teacherId": 5},
        {"id": 3, "name": "7A", "teacherId": 7}
    ])
}

/// One admin and two teachers.
pub fn users() -> Value {
    json!([
        {"id": 1, "login": "root", "role": "admin", "classId": null},
        {"id": 5, "login": "petrova", "role": "teacher", "classId": 2},
        {"id": 7, "login": "ivanova", "role": "teacher", "classId": 3, "promotedBy": null}
    ])
}

/// Attendance block of class 3 on 2024-03-01.
pub fn attendance_block(records: Value) -> Value {
    json!({"classId": 3, "date": "2024-03-01", "isFilled": true, "records": records})
}

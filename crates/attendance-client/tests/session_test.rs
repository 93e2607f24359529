//! Integration tests for login, logout and session restore.

mod helpers;

use std::sync::Arc;

use serde_json::json;

use attendance_client::gateway::HttpMethod;
use attendance_client::session::SESSION_KEY;
use attendance_client::{Action, DurableStorage, FileStorage, Screen, Tab};
use attendance_core::types::{Role, UserId};

#[tokio::test]
async fn test_teacher_login_opens_classes_tab_without_admin_controls() {
    let mut t = helpers::TestApp::new();
    t.login_as("teacher", 7, helpers::classes()).await;

    let session = t.app.session().unwrap();
    assert_eq!(session.role, Role::Teacher);
    assert_eq!(session.user_id, UserId(7));
    assert_eq!(t.app.screen(), Screen::App { tab: Tab::Classes });
    assert!(!t.app.admin_controls_visible());

    // Only the login and the class list; no users fetch for teachers.
    let requests = t.transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert!(requests[1].url.ends_with("/classes"));
    assert_eq!(requests[1].header("Authorization"), Some("Bearer token-7"));

    assert_eq!(t.app.selection().classes().len(), 2);
    assert!(t.storage.get(SESSION_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admin_login_loads_users_and_teacher_selectors() {
    let mut t = helpers::TestApp::new();
    t.login_as("admin", 1, helpers::classes()).await;

    assert!(t.app.admin_controls_visible());
    assert_eq!(t.app.users().len(), 3);
    let teachers = t
        .app
        .selection()
        .teacher_selector(attendance_client::TeacherSelector::ClassTeacher);
    assert_eq!(teachers.options().len(), 2);
}

#[tokio::test]
async fn test_failed_login_stays_on_login_screen() {
    let mut t = helpers::TestApp::new();
    t.transport.respond(
        HttpMethod::Post,
        "/auth/login",
        401,
        json!({"detail": "Invalid credentials"}),
    );

    let notice = t
        .app
        .dispatch(Action::Login {
            api_base: None,
            login: "ivanova".into(),
            password: "wrong".into(),
        })
        .await;

    assert!(notice.is_error);
    assert_eq!(notice.message, "Invalid credentials");
    assert_eq!(t.app.screen(), Screen::Login);
    assert!(t.app.session().is_none());
    assert!(t.storage.get(SESSION_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));

    let mut first = helpers::TestApp::with_storage(storage.clone());
    first.login_as("teacher", 7, helpers::classes()).await;

    let mut second = helpers::TestApp::with_storage(storage);
    second
        .transport
        .respond(HttpMethod::Get, "/classes", 200, helpers::classes());
    assert!(second.app.start().await.unwrap());

    assert_eq!(second.app.screen(), Screen::App { tab: Tab::Classes });
    assert_eq!(second.app.session().unwrap().user_id, UserId(7));
    let request = second.transport.last_request().unwrap();
    assert_eq!(request.header("Authorization"), Some("Bearer token-7"));
}

#[tokio::test]
async fn test_corrupt_session_file_starts_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("{SESSION_KEY}.json"));
    std::fs::write(&path, "{\"token\": ").unwrap();

    let mut t = helpers::TestApp::with_storage(Arc::new(FileStorage::new(dir.path())));
    assert!(!t.app.start().await.unwrap());

    assert_eq!(t.app.screen(), Screen::Login);
    assert!(!path.exists());
    assert_eq!(t.transport.request_count(), 0);
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let mut t = helpers::TestApp::new();
    t.login_as("teacher", 7, helpers::classes()).await;

    let notice = t.app.dispatch(Action::Logout).await;
    assert!(!notice.is_error);
    assert_eq!(t.app.screen(), Screen::Login);
    assert!(t.app.session().is_none());
    assert!(t.app.selection().classes().is_empty());
    assert!(t.storage.get(SESSION_KEY).await.unwrap().is_none());

    let notice = t.app.dispatch(Action::RefreshClasses).await;
    assert!(notice.is_error);
}

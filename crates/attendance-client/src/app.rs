//! Application state and the user-action dispatcher.
//!
//! [`AttendanceApp`] owns the session, the gateway, the shared selection and
//! every view. Front ends send one [`Action`] per user event and render the
//! resulting state; failures are caught at the action boundary and turned
//! into a short [`Notice`], leaving the previous rendering in place.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use attendance_core::config::ClientConfig;
use attendance_core::error::AppError;
use attendance_core::result::AppResult;
use attendance_core::types::request::{
    CreateClassRequest, CreateStudentRequest, CreateTeacherRequest, LoginRequest,
    UpdateCredentialsRequest, UpdateRoleRequest, UpdateStudentRequest,
};
use attendance_core::types::{AttendanceStatus, ClassId, Role, StudentId, UserAccount, UserId};

use crate::attendance::{AttendanceEditSession, AttendanceOverview};
use crate::gateway::{HttpTransport, ReqwestTransport, RequestGateway};
use crate::selection::{ClassSelector, SelectionCoordinator, TeacherSelector};
use crate::session::{Session, SessionStore};
use crate::statistics::StatisticsView;
use crate::storage::{DurableStorage, FileStorage};

/// Tabs of the app view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Class list and shared class picker.
    Classes,
    /// Roster of the selected class.
    Students,
    /// Read-only daily attendance.
    Attendance,
    /// Attendance editor.
    AttendanceEdit,
    /// Weekly statistics.
    Statistics,
    /// User management (admins only).
    Users,
}

impl Tab {
    /// Every tab, in display order.
    pub const ALL: [Self; 6] = [
        Self::Classes,
        Self::Students,
        Self::Attendance,
        Self::AttendanceEdit,
        Self::Statistics,
        Self::Users,
    ];

    /// Display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classes => "Classes",
            Self::Students => "Students",
            Self::Attendance => "Attendance",
            Self::AttendanceEdit => "Edit attendance",
            Self::Statistics => "Statistics",
            Self::Users => "Users",
        }
    }

    /// Whether only admins may open the tab.
    pub fn is_admin_only(self) -> bool {
        matches!(self, Self::Users)
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "screen")]
pub enum Screen {
    /// Login form; no session.
    Login,
    /// App view with the active tab.
    App {
        /// Active tab.
        tab: Tab,
    },
}

/// Short user-visible outcome of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Message text.
    pub message: String,
    /// Whether the action failed.
    pub is_error: bool,
}

impl Notice {
    /// Success notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    /// Failure notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// One user-triggered event.
#[derive(Clone)]
pub enum Action {
    /// Submit the login form. `api_base` replaces the gateway's base when given.
    Login {
        api_base: Option<String>,
        login: String,
        password: String,
    },
    /// Log out and return to the login form.
    Logout,
    /// Switch tab.
    ActivateTab(Tab),
    /// Reload the class list and resynchronize every class selector.
    RefreshClasses,
    /// Set the shared class selection (dashboard picker).
    SelectClass(ClassId),
    /// Point one view's class field elsewhere.
    ChooseClass {
        selector: ClassSelector,
        class_id: Option<ClassId>,
    },
    /// Pick a teacher in an admin form.
    ChooseTeacher {
        selector: TeacherSelector,
        teacher_id: Option<UserId>,
    },
    /// Pick a student on the roster.
    ChooseStudent(Option<StudentId>),
    /// Create a class. Without `teacher_id` the class-teacher selector is used.
    CreateClass {
        name: String,
        teacher_id: Option<UserId>,
    },
    /// Reload the users list (admin).
    RefreshUsers,
    /// Create a teacher account (admin).
    CreateTeacher { login: String, password: String },
    /// Change a teacher's credentials (admin). Without `teacher_id` the
    /// credentials-teacher selector is used; blank fields are left unchanged.
    UpdateCredentials {
        teacher_id: Option<UserId>,
        login: Option<String>,
        password: Option<String>,
    },
    /// Change a user's role (admin).
    UpdateRole { user_id: UserId, role: Role },
    /// Change the caller's own credentials.
    UpdateOwnCredentials {
        login: Option<String>,
        password: Option<String>,
    },
    /// Reload the roster of the selected class.
    RefreshStudents,
    /// Add a student to the selected class.
    AddStudent { full_name: String },
    /// Rename or (de)activate a student. Without `student_id` the roster's
    /// chosen student is used.
    UpdateStudent {
        student_id: Option<StudentId>,
        full_name: Option<String>,
        is_active: Option<bool>,
    },
    /// Load the read-only attendance view for the overview class field.
    LoadAttendance { date: NaiveDate, all_classes: bool },
    /// Change the editor's target date.
    SetEditDate(Option<NaiveDate>),
    /// Load the sheet for the editor's target.
    LoadAttendanceForEdit,
    /// Set one student's pending status.
    SetStudentStatus {
        student_id: StudentId,
        status: AttendanceStatus,
    },
    /// Set every pending status at once.
    SetAllStatuses(AttendanceStatus),
    /// Submit the edited sheet.
    SaveAttendance,
    /// Load weekly statistics for the statistics class field.
    LoadStatistics {
        start_date: NaiveDate,
        all_classes: bool,
    },
}

impl Action {
    /// Stable name for logs. Never includes user input.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::ActivateTab(_) => "activate_tab",
            Self::RefreshClasses => "refresh_classes",
            Self::SelectClass(_) => "select_class",
            Self::ChooseClass { .. } => "choose_class",
            Self::ChooseTeacher { .. } => "choose_teacher",
            Self::ChooseStudent(_) => "choose_student",
            Self::CreateClass { .. } => "create_class",
            Self::RefreshUsers => "refresh_users",
            Self::CreateTeacher { .. } => "create_teacher",
            Self::UpdateCredentials { .. } => "update_credentials",
            Self::UpdateRole { .. } => "update_role",
            Self::UpdateOwnCredentials { .. } => "update_own_credentials",
            Self::RefreshStudents => "refresh_students",
            Self::AddStudent { .. } => "add_student",
            Self::UpdateStudent { .. } => "update_student",
            Self::LoadAttendance { .. } => "load_attendance",
            Self::SetEditDate(_) => "set_edit_date",
            Self::LoadAttendanceForEdit => "load_attendance_for_edit",
            Self::SetStudentStatus { .. } => "set_student_status",
            Self::SetAllStatuses(_) => "set_all_statuses",
            Self::SaveAttendance => "save_attendance",
            Self::LoadStatistics { .. } => "load_statistics",
        }
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Action").field(&self.name()).finish()
    }
}

/// The attendance client.
#[derive(Debug)]
pub struct AttendanceApp {
    default_api_base: String,
    gateway: RequestGateway,
    sessions: SessionStore,
    screen: Screen,
    selection: SelectionCoordinator,
    users: Vec<UserAccount>,
    overview: AttendanceOverview,
    edit: AttendanceEditSession,
    statistics: StatisticsView,
}

impl AttendanceApp {
    /// Create a logged-out client.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn DurableStorage>,
        default_api_base: &str,
    ) -> Self {
        Self {
            default_api_base: default_api_base.to_string(),
            gateway: RequestGateway::new(transport, default_api_base),
            sessions: SessionStore::new(storage),
            screen: Screen::Login,
            selection: SelectionCoordinator::new(),
            users: Vec::new(),
            overview: AttendanceOverview::new(),
            edit: AttendanceEditSession::new(),
            statistics: StatisticsView::new(),
        }
    }

    /// Create a client backed by HTTP and file storage.
    pub fn from_config(config: &ClientConfig) -> AppResult<Self> {
        let transport = ReqwestTransport::new(&config.api)?;
        let storage = FileStorage::new(&config.storage.directory);
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(storage),
            &config.api.base_url,
        ))
    }

    /// Restore a persisted session and, if there is one, open the app view.
    ///
    /// Returns whether a session was restored. A corrupt record counts as
    /// "no session". Only a failure while loading the app view is returned.
    pub async fn start(&mut self) -> AppResult<bool> {
        let Some(session) = self.sessions.restore(&self.default_api_base).await else {
            self.screen = Screen::Login;
            return Ok(false);
        };
        self.gateway.authorize(&session);
        self.open_app_view().await?;
        Ok(true)
    }

    /// Current screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Live session.
    pub fn session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    /// Whether admin-only controls are shown.
    pub fn admin_controls_visible(&self) -> bool {
        self.sessions.role().is_some_and(Role::is_admin)
    }

    /// API base used for the next login.
    pub fn api_base(&self) -> &str {
        self.gateway.api_base()
    }

    /// Shared selection and selector controls.
    pub fn selection(&self) -> &SelectionCoordinator {
        &self.selection
    }

    /// Users from the last refresh (admins only).
    pub fn users(&self) -> &[UserAccount] {
        &self.users
    }

    /// Read-only attendance view.
    pub fn overview(&self) -> &AttendanceOverview {
        &self.overview
    }

    /// Attendance editor.
    pub fn edit(&self) -> &AttendanceEditSession {
        &self.edit
    }

    /// Weekly statistics view.
    pub fn statistics(&self) -> &StatisticsView {
        &self.statistics
    }

    /// Perform one action and convert the outcome into a notice.
    pub async fn dispatch(&mut self, action: Action) -> Notice {
        let name = action.name();
        match self.perform(action).await {
            Ok(message) => {
                debug!(action = name, "action completed");
                Notice::info(message)
            }
            Err(e) => {
                warn!(action = name, error = %e, "action failed");
                Notice::error(e.user_message())
            }
        }
    }

    /// Perform one action. Returns the success message.
    pub async fn perform(&mut self, action: Action) -> AppResult<String> {
        match action {
            Action::Login {
                api_base,
                login,
                password,
            } => self.login(api_base, login, password).await,
            Action::Logout => self.logout().await,
            Action::ActivateTab(tab) => self.activate_tab(tab),
            Action::RefreshClasses => {
                self.require_session()?;
                self.refresh_classes().await?;
                Ok("Classes refreshed".into())
            }
            Action::SelectClass(class_id) => self.select_class(class_id).await,
            Action::ChooseClass { selector, class_id } => self.choose_class(selector, class_id),
            Action::ChooseTeacher {
                selector,
                teacher_id,
            } => {
                self.require_admin()?;
                self.selection.choose_teacher(selector, teacher_id)?;
                Ok("Teacher chosen".into())
            }
            Action::ChooseStudent(student_id) => {
                self.require_session()?;
                self.selection.choose_student(student_id)?;
                Ok("Student chosen".into())
            }
            Action::CreateClass { name, teacher_id } => self.create_class(name, teacher_id).await,
            Action::RefreshUsers => {
                self.refresh_users().await?;
                Ok("Users refreshed".into())
            }
            Action::CreateTeacher { login, password } => {
                self.require_admin()?;
                let request = CreateTeacherRequest {
                    login: login.trim().to_string(),
                    password,
                };
                self.gateway.create_teacher(&request).await?;
                self.refresh_users().await?;
                Ok("Teacher created".into())
            }
            Action::UpdateCredentials {
                teacher_id,
                login,
                password,
            } => {
                self.require_admin()?;
                let teacher_id = teacher_id
                    .or_else(|| {
                        self.selection
                            .teacher_selector(TeacherSelector::CredentialsTeacher)
                            .chosen()
                    })
                    .ok_or_else(|| AppError::precondition("Pick a teacher"))?;
                let request =
                    UpdateCredentialsRequest::from_input(login.as_deref(), password.as_deref());
                self.gateway.update_credentials(teacher_id, &request).await?;
                self.refresh_users().await?;
                Ok("Credentials updated".into())
            }
            Action::UpdateRole { user_id, role } => {
                self.require_admin()?;
                self.gateway
                    .update_role(user_id, &UpdateRoleRequest { role })
                    .await?;
                self.refresh_users().await?;
                Ok(format!("User #{user_id} is now {role}"))
            }
            Action::UpdateOwnCredentials { login, password } => {
                self.require_session()?;
                let request =
                    UpdateCredentialsRequest::from_input(login.as_deref(), password.as_deref());
                self.gateway.update_own_credentials(&request).await?;
                Ok("Your credentials were updated".into())
            }
            Action::RefreshStudents => {
                self.require_session()?;
                self.require_selected_class()?;
                self.selection.refresh_roster(&self.gateway).await?;
                Ok("Students refreshed".into())
            }
            Action::AddStudent { full_name } => {
                self.require_session()?;
                let class_id = self.require_selected_class()?;
                let request = CreateStudentRequest {
                    full_name: full_name.trim().to_string(),
                };
                self.gateway.add_student(class_id, &request).await?;
                self.selection.refresh_roster(&self.gateway).await?;
                Ok("Student added".into())
            }
            Action::UpdateStudent {
                student_id,
                full_name,
                is_active,
            } => self.update_student(student_id, full_name, is_active).await,
            Action::LoadAttendance { date, all_classes } => {
                let role = self.require_session()?.role;
                let class_id = self
                    .selection
                    .class_selector(ClassSelector::AttendanceOverview)
                    .chosen();
                self.overview
                    .load(&self.gateway, date, class_id, all_classes, role)
                    .await?;
                Ok("Attendance loaded".into())
            }
            Action::SetEditDate(date) => {
                self.require_session()?;
                if self.edit.set_date(date) {
                    Ok("Edit date changed; the loaded sheet was discarded".into())
                } else {
                    Ok("Edit date set".into())
                }
            }
            Action::LoadAttendanceForEdit => self.load_for_edit().await,
            Action::SetStudentStatus { student_id, status } => {
                self.require_session()?;
                self.edit.set_status(student_id, status)?;
                Ok(format!("Student #{student_id} marked {status}"))
            }
            Action::SetAllStatuses(status) => {
                self.require_session()?;
                let touched = self.edit.set_all(status)?;
                Ok(format!("Marked {touched} students {status}"))
            }
            Action::SaveAttendance => self.save_attendance().await,
            Action::LoadStatistics {
                start_date,
                all_classes,
            } => {
                let role = self.require_session()?.role;
                let class_id = self
                    .selection
                    .class_selector(ClassSelector::Statistics)
                    .chosen();
                self.statistics
                    .load_weekly(&self.gateway, start_date, class_id, all_classes, role)
                    .await?;
                Ok("Statistics loaded".into())
            }
        }
    }

    fn require_session(&self) -> AppResult<&Session> {
        self.sessions
            .current()
            .ok_or_else(|| AppError::precondition("Log in first"))
    }

    fn require_admin(&self) -> AppResult<&Session> {
        let session = self.require_session()?;
        if !session.is_admin() {
            return Err(AppError::precondition("Only administrators can do this"));
        }
        Ok(session)
    }

    fn require_selected_class(&self) -> AppResult<ClassId> {
        self.selection
            .selected_class()
            .ok_or_else(|| AppError::precondition("Select a class first"))
    }

    async fn login(
        &mut self,
        api_base: Option<String>,
        login: String,
        password: String,
    ) -> AppResult<String> {
        // The new base only sticks once the service accepts the credentials.
        let mut candidate = self.gateway.clone();
        if let Some(api_base) = api_base.filter(|base| !base.trim().is_empty()) {
            candidate.set_api_base(&api_base);
        }

        let request = LoginRequest {
            login: login.trim().to_string(),
            password,
        };
        let response = candidate.login(&request).await?;
        self.gateway = candidate;

        self.reset_views();
        let api_base = self.gateway.api_base().to_string();
        let session = self
            .sessions
            .establish(
                &api_base,
                &response.access_token,
                response.role,
                response.user_id,
            )
            .await?
            .clone();
        self.gateway.authorize(&session);

        self.open_app_view().await?;
        Ok(format!("Logged in as {}", session.role))
    }

    async fn logout(&mut self) -> AppResult<String> {
        let cleared = self.sessions.clear().await;
        self.gateway.revoke();
        self.reset_views();
        self.screen = Screen::Login;
        cleared?;
        info!("logged out");
        Ok("Logged out".into())
    }

    fn reset_views(&mut self) {
        self.selection.reset();
        self.users.clear();
        self.overview.reset();
        self.edit.reset();
        self.statistics.reset();
    }

    async fn open_app_view(&mut self) -> AppResult<()> {
        self.screen = Screen::App { tab: Tab::Classes };
        self.refresh_classes().await?;
        if self.admin_controls_visible() {
            self.refresh_users().await?;
        }
        Ok(())
    }

    fn activate_tab(&mut self, tab: Tab) -> AppResult<String> {
        self.require_session()?;
        if tab.is_admin_only() {
            self.require_admin()?;
        }
        self.screen = Screen::App { tab };
        Ok(format!("{tab} tab"))
    }

    async fn refresh_classes(&mut self) -> AppResult<()> {
        let classes = self.gateway.list_classes().await?;
        self.selection.synchronize_selectors(classes);
        self.follow_edit_selector();
        Ok(())
    }

    async fn refresh_users(&mut self) -> AppResult<()> {
        self.require_admin()?;
        let users = self.gateway.list_users().await?;
        self.selection.synchronize_teachers(&users);
        self.users = users;
        Ok(())
    }

    async fn select_class(&mut self, class_id: ClassId) -> AppResult<String> {
        self.require_session()?;
        let roster = self.selection.select(&self.gateway, class_id).await;
        self.follow_edit_selector();
        roster?;
        Ok(format!("Class #{class_id} selected"))
    }

    fn choose_class(
        &mut self,
        selector: ClassSelector,
        class_id: Option<ClassId>,
    ) -> AppResult<String> {
        self.require_session()?;
        self.selection.choose(selector, class_id)?;
        if selector == ClassSelector::AttendanceEdit && self.follow_edit_selector() {
            return Ok("Class changed; the loaded sheet was discarded".into());
        }
        Ok("Class chosen".into())
    }

    /// Copy the editor selector into the edit session. Returns whether a
    /// loaded sheet was discarded.
    fn follow_edit_selector(&mut self) -> bool {
        let chosen = self
            .selection
            .class_selector(ClassSelector::AttendanceEdit)
            .chosen();
        self.edit.set_class(chosen)
    }

    async fn create_class(&mut self, name: String, teacher_id: Option<UserId>) -> AppResult<String> {
        self.require_admin()?;
        let teacher_id = teacher_id
            .or_else(|| {
                self.selection
                    .teacher_selector(TeacherSelector::ClassTeacher)
                    .chosen()
            })
            .ok_or_else(|| AppError::precondition("Pick a teacher for the class"))?;

        let request = CreateClassRequest {
            name: name.trim().to_string(),
            teacher_id,
        };
        self.gateway.create_class(&request).await?;
        self.refresh_classes().await?;
        Ok("Class created".into())
    }

    async fn update_student(
        &mut self,
        student_id: Option<StudentId>,
        full_name: Option<String>,
        is_active: Option<bool>,
    ) -> AppResult<String> {
        self.require_session()?;
        let student_id = student_id
            .or_else(|| self.selection.roster().chosen())
            .ok_or_else(|| AppError::precondition("Pick a student"))?;

        let request = UpdateStudentRequest {
            full_name: full_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            is_active,
        };
        self.gateway.update_student(student_id, &request).await?;
        self.selection.refresh_roster(&self.gateway).await?;
        Ok("Student updated".into())
    }

    async fn load_for_edit(&mut self) -> AppResult<String> {
        self.require_session()?;
        let selected = self.selection.selected_class();
        self.edit.load(&self.gateway, selected).await?;

        // The class the sheet was loaded for is shown in the editor's class field.
        let known = self
            .edit
            .class_id()
            .filter(|id| self.selection.class(*id).is_some());
        if known.is_some() {
            self.selection.choose(ClassSelector::AttendanceEdit, known)?;
        }
        Ok("Attendance sheet loaded".into())
    }

    async fn save_attendance(&mut self) -> AppResult<String> {
        self.require_session()?;
        self.edit.save(&self.gateway).await?;

        if let Err(e) = self.overview.reload(&self.gateway).await {
            return Err(AppError::new(
                e.kind,
                format!("Attendance saved, but refreshing the overview failed: {}", e.message),
            ));
        }
        Ok("Attendance saved".into())
    }
}

//! Shared class selection and the selector controls derived from it.
//!
//! [`SelectionCoordinator`] owns the one "currently selected class" of the
//! client. Every class selector (dashboard, attendance overview, attendance
//! editor, statistics) is a derived copy: it can be pointed elsewhere
//! locally, but a [`SelectionCoordinator::select`] overwrites all of them.

use tracing::debug;

use attendance_core::error::AppError;
use attendance_core::result::AppResult;
use attendance_core::types::{Class, ClassId, Role, Student, StudentId, UserAccount, UserId};

use crate::gateway::RequestGateway;

/// Class selector controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassSelector {
    /// Class picker of the dashboard (drives the roster).
    Dashboard,
    /// Class field of the read-only attendance view.
    AttendanceOverview,
    /// Class field of the attendance editor.
    AttendanceEdit,
    /// Class field of the weekly statistics view.
    Statistics,
}

impl ClassSelector {
    /// Every class selector.
    pub const ALL: [Self; 4] = [
        Self::Dashboard,
        Self::AttendanceOverview,
        Self::AttendanceEdit,
        Self::Statistics,
    ];

    fn index(self) -> usize {
        match self {
            Self::Dashboard => 0,
            Self::AttendanceOverview => 1,
            Self::AttendanceEdit => 2,
            Self::Statistics => 3,
        }
    }
}

/// Admin-only teacher selector controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeacherSelector {
    /// Teacher assigned to a class being created.
    ClassTeacher,
    /// Teacher whose credentials are being changed.
    CredentialsTeacher,
}

impl TeacherSelector {
    /// Every teacher selector.
    pub const ALL: [Self; 2] = [Self::ClassTeacher, Self::CredentialsTeacher];

    fn index(self) -> usize {
        match self {
            Self::ClassTeacher => 0,
            Self::CredentialsTeacher => 1,
        }
    }
}

/// An entry that can appear in a selector.
pub trait Choice: Clone {
    /// Identifier the selector stores.
    type Id: Copy + Eq + std::fmt::Debug + std::fmt::Display;

    /// Identifier of this entry.
    fn choice_id(&self) -> Self::Id;

    /// Display label, `#<id> - <name>`.
    fn choice_label(&self) -> String;
}

impl Choice for Class {
    type Id = ClassId;

    fn choice_id(&self) -> ClassId {
        self.id
    }

    fn choice_label(&self) -> String {
        format!("#{} - {}", self.id, self.name)
    }
}

impl Choice for UserAccount {
    type Id = UserId;

    fn choice_id(&self) -> UserId {
        self.id
    }

    fn choice_label(&self) -> String {
        format!("#{} - {}", self.id, self.login)
    }
}

impl Choice for Student {
    type Id = StudentId;

    fn choice_id(&self) -> StudentId {
        self.id
    }

    fn choice_label(&self) -> String {
        format!("#{} - {}", self.id, self.full_name)
    }
}

/// One selector control: an option set and at most one chosen entry.
///
/// The chosen id is always one of the options.
#[derive(Debug, Clone)]
pub struct Selector<T: Choice> {
    options: Vec<T>,
    chosen: Option<T::Id>,
}

impl<T: Choice> Default for Selector<T> {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            chosen: None,
        }
    }
}

impl<T: Choice> Selector<T> {
    /// Current options, in service order.
    pub fn options(&self) -> &[T] {
        &self.options
    }

    /// Chosen id, if any.
    pub fn chosen(&self) -> Option<T::Id> {
        self.chosen
    }

    /// The chosen entry, if any.
    pub fn chosen_option(&self) -> Option<&T> {
        let chosen = self.chosen?;
        self.options.iter().find(|o| o.choice_id() == chosen)
    }

    /// Whether `id` is one of the options.
    pub fn contains(&self, id: T::Id) -> bool {
        self.options.iter().any(|o| o.choice_id() == id)
    }

    /// Point the selector at `id`, or clear it with `None`.
    pub fn choose(&mut self, id: Option<T::Id>) -> AppResult<()> {
        match id {
            Some(id) if !self.contains(id) => Err(AppError::precondition(format!(
                "#{id} is not one of the available options"
            ))),
            _ => {
                self.chosen = id;
                Ok(())
            }
        }
    }

    /// Clear the choice and the options.
    pub fn clear(&mut self) {
        self.options.clear();
        self.chosen = None;
    }

    /// Replace the option set.
    ///
    /// The previous choice survives when it is still an option; otherwise
    /// `fallback` is used when it is an option; otherwise nothing is chosen.
    pub fn replace_options(&mut self, options: Vec<T>, fallback: Option<T::Id>) -> Option<T::Id> {
        self.options = options;
        let keep = |id: Option<T::Id>| id.filter(|id| self.contains(*id));
        self.chosen = keep(self.chosen).or_else(|| keep(fallback));
        self.chosen
    }
}

/// Owner of the shared class selection and every selector control.
#[derive(Debug, Default)]
pub struct SelectionCoordinator {
    classes: Vec<Class>,
    selected_class: Option<ClassId>,
    class_selectors: [Selector<Class>; 4],
    teacher_selectors: [Selector<UserAccount>; 2],
    roster: Selector<Student>,
    roster_class: Option<ClassId>,
}

impl SelectionCoordinator {
    /// Create an empty coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared selected class.
    pub fn selected_class(&self) -> Option<ClassId> {
        self.selected_class
    }

    /// Classes from the last refresh.
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Look up a known class.
    pub fn class(&self, class_id: ClassId) -> Option<&Class> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    /// A class selector control.
    pub fn class_selector(&self, selector: ClassSelector) -> &Selector<Class> {
        &self.class_selectors[selector.index()]
    }

    /// A teacher selector control.
    pub fn teacher_selector(&self, selector: TeacherSelector) -> &Selector<UserAccount> {
        &self.teacher_selectors[selector.index()]
    }

    /// Students of the roster class, with the roster's student selector.
    pub fn roster(&self) -> &Selector<Student> {
        &self.roster
    }

    /// Class the roster was loaded for.
    pub fn roster_class(&self) -> Option<ClassId> {
        self.roster_class
    }

    /// Rewrite every class selector's options to exactly `classes`.
    ///
    /// Each selector keeps its previous choice if still present, else falls
    /// back to the shared selection if still valid, else chooses nothing. A
    /// shared selection whose class disappeared is cleared.
    pub fn synchronize_selectors(&mut self, classes: Vec<Class>) {
        self.selected_class = self
            .selected_class
            .filter(|id| classes.iter().any(|c| c.id == *id));

        for selector in &mut self.class_selectors {
            selector.replace_options(classes.clone(), self.selected_class);
        }

        if self.roster_class.is_some() && self.roster_class != self.selected_class {
            self.roster.clear();
            self.roster_class = None;
        }

        debug!(
            classes = classes.len(),
            selected = ?self.selected_class,
            "class selectors synchronized"
        );
        self.classes = classes;
    }

    /// Point one class selector elsewhere without touching the shared selection.
    pub fn choose(&mut self, selector: ClassSelector, class_id: Option<ClassId>) -> AppResult<()> {
        self.class_selectors[selector.index()].choose(class_id)
    }

    /// Set the shared selection, mirror it into every class selector and
    /// reload the roster of the new class.
    ///
    /// The selection stays applied when the roster reload fails.
    pub async fn select(&mut self, gateway: &RequestGateway, class_id: ClassId) -> AppResult<()> {
        if self.class(class_id).is_none() {
            return Err(AppError::precondition(format!(
                "Class #{class_id} is not in the class list"
            )));
        }

        self.selected_class = Some(class_id);
        for selector in &mut self.class_selectors {
            selector.chosen = Some(class_id);
        }
        debug!(%class_id, "class selected");

        self.refresh_roster(gateway).await
    }

    /// Reload the roster of the shared selection. Does nothing without one.
    pub async fn refresh_roster(&mut self, gateway: &RequestGateway) -> AppResult<()> {
        let Some(class_id) = self.selected_class else {
            return Ok(());
        };

        let students = gateway.list_students(class_id).await?;
        if self.roster_class != Some(class_id) {
            self.roster.chosen = None;
        }
        self.roster.replace_options(students, None);
        self.roster_class = Some(class_id);
        Ok(())
    }

    /// Rebuild the teacher selectors from the users list, teachers only.
    pub fn synchronize_teachers(&mut self, users: &[UserAccount]) {
        let teachers: Vec<UserAccount> = users
            .iter()
            .filter(|u| u.role == Role::Teacher)
            .cloned()
            .collect();

        for selector in &mut self.teacher_selectors {
            selector.replace_options(teachers.clone(), None);
        }
    }

    /// Point a teacher selector at a teacher, or clear it.
    pub fn choose_teacher(
        &mut self,
        selector: TeacherSelector,
        teacher_id: Option<UserId>,
    ) -> AppResult<()> {
        self.teacher_selectors[selector.index()].choose(teacher_id)
    }

    /// Point the roster's student selector at a student, or clear it.
    pub fn choose_student(&mut self, student_id: Option<StudentId>) -> AppResult<()> {
        self.roster.choose(student_id)
    }

    /// Forget everything (logout).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::gateway::{HttpMethod, ScriptedTransport};

    fn class(id: i64, name: &str) -> Class {
        Class {
            id: ClassId(id),
            name: name.into(),
            teacher_id: UserId(2),
        }
    }

    fn teacher(id: i64, login: &str, role: Role) -> UserAccount {
        UserAccount {
            id: UserId(id),
            login: login.into(),
            role,
            class_id: None,
            promoted_by: None,
        }
    }

    fn gateway(transport: &ScriptedTransport) -> RequestGateway {
        RequestGateway::new(Arc::new(transport.clone()), "http://school.test/api/v1")
    }

    #[test]
    fn test_previous_choice_survives_refresh() {
        let mut coordinator = SelectionCoordinator::new();
        coordinator.synchronize_selectors(vec![class(1, "5A"), class(2, "6B")]);
        coordinator
            .choose(ClassSelector::Statistics, Some(ClassId(2)))
            .unwrap();

        coordinator.synchronize_selectors(vec![class(2, "6B"), class(3, "7C")]);
        assert_eq!(
            coordinator.class_selector(ClassSelector::Statistics).chosen(),
            Some(ClassId(2))
        );
        assert_eq!(
            coordinator.class_selector(ClassSelector::Dashboard).chosen(),
            None
        );
    }

    #[tokio::test]
    async fn test_select_mirrors_into_every_selector_and_loads_roster() {
        let transport = ScriptedTransport::new();
        transport.respond(
            HttpMethod::Get,
            "/classes/3/students",
            200,
            json!([{"id": 1, "fullName": "Anna", "isActive": true}]),
        );
        let gw = gateway(&transport);

        let mut coordinator = SelectionCoordinator::new();
        coordinator.synchronize_selectors(vec![class(3, "7C"), class(4, "8D")]);
        coordinator
            .choose(ClassSelector::AttendanceEdit, Some(ClassId(4)))
            .unwrap();

        coordinator.select(&gw, ClassId(3)).await.unwrap();

        assert_eq!(coordinator.selected_class(), Some(ClassId(3)));
        for selector in ClassSelector::ALL {
            assert_eq!(coordinator.class_selector(selector).chosen(), Some(ClassId(3)));
        }
        assert_eq!(coordinator.roster().options().len(), 1);
        assert_eq!(coordinator.roster_class(), Some(ClassId(3)));
    }

    #[tokio::test]
    async fn test_selection_falls_back_and_disappears_with_its_class() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Get, "/classes/3/students", 200, json!([]));
        let gw = gateway(&transport);

        let mut coordinator = SelectionCoordinator::new();
        coordinator.synchronize_selectors(vec![class(3, "7C")]);
        coordinator.select(&gw, ClassId(3)).await.unwrap();
        coordinator.choose(ClassSelector::Dashboard, None).unwrap();

        coordinator.synchronize_selectors(vec![class(3, "7C"), class(5, "9E")]);
        assert_eq!(
            coordinator.class_selector(ClassSelector::Dashboard).chosen(),
            Some(ClassId(3))
        );

        coordinator.synchronize_selectors(vec![class(5, "9E")]);
        assert_eq!(coordinator.selected_class(), None);
        for selector in ClassSelector::ALL {
            assert_eq!(coordinator.class_selector(selector).chosen(), None);
        }
        assert!(coordinator.roster().options().is_empty());
    }

    #[tokio::test]
    async fn test_select_unknown_class_is_rejected_without_network() {
        let transport = ScriptedTransport::new();
        let gw = gateway(&transport);
        let mut coordinator = SelectionCoordinator::new();
        coordinator.synchronize_selectors(vec![class(1, "5A")]);

        assert!(coordinator.select(&gw, ClassId(9)).await.is_err());
        assert_eq!(coordinator.selected_class(), None);
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_teacher_selectors_only_offer_teachers() {
        let mut coordinator = SelectionCoordinator::new();
        let users = vec![
            teacher(1, "root", Role::Admin),
            teacher(2, "ivanova", Role::Teacher),
            teacher(3, "petrov", Role::Teacher),
        ];
        coordinator.synchronize_teachers(&users);
        coordinator
            .choose_teacher(TeacherSelector::CredentialsTeacher, Some(UserId(3)))
            .unwrap();
        assert!(
            coordinator
                .choose_teacher(TeacherSelector::ClassTeacher, Some(UserId(1)))
                .is_err()
        );

        coordinator.synchronize_teachers(&users[1..]);
        let selector = coordinator.teacher_selector(TeacherSelector::CredentialsTeacher);
        assert_eq!(selector.options().len(), 2);
        assert_eq!(selector.chosen_option().map(|u| u.login.as_str()), Some("petrov"));
    }
}

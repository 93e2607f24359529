//! Interactive terminal front end.
//!
//! Each loop turn renders the current screen, asks for one menu entry,
//! turns it into an [`Action`] and prints the resulting notice.

use chrono::NaiveDate;
use tracing::debug;

use attendance_client::selection::{Choice, Selector};
use attendance_client::{Action, AttendanceApp, ClassSelector, Screen, Tab, TeacherSelector};
use attendance_core::error::AppError;
use attendance_core::types::{AttendanceStatus, Role};

use crate::output::{self, OutputFormat};
use crate::{prompt, render};

/// Menu entries of the app view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    SwitchTab,
    SelectClass,
    RefreshClasses,
    CreateClass,
    RefreshStudents,
    AddStudent,
    UpdateStudent,
    LoadAttendance,
    SetEditDate,
    ChooseEditClass,
    LoadSheet,
    SetStatus,
    SetAllStatuses,
    SaveSheet,
    LoadStatistics,
    RefreshUsers,
    CreateTeacher,
    UpdateCredentials,
    UpdateRole,
    OwnCredentials,
    Logout,
    Quit,
}

impl MenuItem {
    fn label(self) -> &'static str {
        match self {
            Self::SwitchTab => "Switch tab",
            Self::SelectClass => "Select class",
            Self::RefreshClasses => "Refresh classes",
            Self::CreateClass => "Create class",
            Self::RefreshStudents => "Refresh students",
            Self::AddStudent => "Add student",
            Self::UpdateStudent => "Update student",
            Self::LoadAttendance => "Show attendance",
            Self::SetEditDate => "Set date",
            Self::ChooseEditClass => "Choose class",
            Self::LoadSheet => "Load sheet",
            Self::SetStatus => "Set one student's status",
            Self::SetAllStatuses => "Set every status",
            Self::SaveSheet => "Save sheet",
            Self::LoadStatistics => "Show weekly statistics",
            Self::RefreshUsers => "Refresh users",
            Self::CreateTeacher => "Create teacher",
            Self::UpdateCredentials => "Change teacher credentials",
            Self::UpdateRole => "Change role",
            Self::OwnCredentials => "Change my credentials",
            Self::Logout => "Log out",
            Self::Quit => "Quit",
        }
    }

    /// Entries that throw away a loaded attendance sheet.
    fn discards_sheet(self) -> bool {
        matches!(
            self,
            Self::SelectClass
                | Self::RefreshClasses
                | Self::SetEditDate
                | Self::ChooseEditClass
                | Self::LoadSheet
                | Self::Logout
                | Self::Quit
        )
    }
}

impl std::fmt::Display for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Entries offered on a tab, before the common ones.
fn tab_menu(tab: Tab, is_admin: bool) -> Vec<MenuItem> {
    use MenuItem::*;

    match tab {
        Tab::Classes if is_admin => vec![SelectClass, CreateClass],
        Tab::Classes => vec![SelectClass],
        Tab::Students => vec![SelectClass, RefreshStudents, AddStudent, UpdateStudent],
        Tab::Attendance => vec![LoadAttendance],
        Tab::AttendanceEdit => vec![
            SetEditDate,
            ChooseEditClass,
            LoadSheet,
            SetStatus,
            SetAllStatuses,
            SaveSheet,
        ],
        Tab::Statistics => vec![LoadStatistics],
        Tab::Users => vec![RefreshUsers, CreateTeacher, UpdateCredentials, UpdateRole],
    }
}

fn menu(tab: Tab, is_admin: bool) -> Vec<MenuItem> {
    let mut items = tab_menu(tab, is_admin);
    items.extend([
        MenuItem::SwitchTab,
        MenuItem::RefreshClasses,
        MenuItem::OwnCredentials,
        MenuItem::Logout,
        MenuItem::Quit,
    ]);
    items
}

/// Run the interactive session until the user quits.
pub async fn run(app: &mut AttendanceApp, format: OutputFormat) -> Result<(), AppError> {
    match app.start().await {
        Ok(true) => output::print_success("Session restored"),
        Ok(false) => {}
        Err(e) => output::print_error(&e.user_message()),
    }

    loop {
        match app.screen() {
            Screen::Login => {
                if !login_screen(app).await? {
                    return Ok(());
                }
            }
            Screen::App { tab } => {
                println!();
                println!("{}", render::session_summary(app));
                output::print_rendered(&render_tab(app, tab, format));

                let items = menu(tab, app.admin_controls_visible());
                let item = items[prompt::select("Action", &items)?];
                debug!(item = item.label(), "menu entry chosen");

                if item.discards_sheet()
                    && app.edit().is_dirty()
                    && !prompt::confirm("Discard unsaved attendance changes?")?
                {
                    continue;
                }
                if item == MenuItem::Quit {
                    return Ok(());
                }
                for action in build_actions(app, item)? {
                    let notice = app.dispatch(action).await;
                    output::print_notice(&notice);
                    if notice.is_error {
                        break;
                    }
                }
            }
        }
    }
}

/// Login form. Returns `false` when the user quits.
async fn login_screen(app: &mut AttendanceApp) -> Result<bool, AppError> {
    println!();
    println!("{}", render::session_summary(app));
    if prompt::select("School attendance", &["Log in", "Quit"])? == 1 {
        return Ok(false);
    }

    let api_base = prompt::text_with_default("API base", app.api_base())?;
    let login = prompt::text("Login")?;
    let password = prompt::password("Password")?;

    let notice = app
        .dispatch(Action::Login {
            api_base: Some(api_base),
            login,
            password,
        })
        .await;
    output::print_notice(&notice);
    Ok(true)
}

fn render_tab(app: &AttendanceApp, tab: Tab, format: OutputFormat) -> String {
    match tab {
        Tab::Classes => render::classes(app.selection(), format),
        Tab::Students => render::roster(app.selection(), format),
        Tab::Attendance => format!(
            "Class: {}\n{}",
            render::class_choice(app.selection(), ClassSelector::AttendanceOverview),
            render::overview(app.overview(), format)
        ),
        Tab::AttendanceEdit => render::edit_sheet(app.edit(), format),
        Tab::Statistics => format!(
            "Class: {}\n{}",
            render::class_choice(app.selection(), ClassSelector::Statistics),
            render::statistics(app.statistics(), format)
        ),
        Tab::Users => render::users(app.users(), format),
    }
}

/// Collect the input one menu entry needs and turn it into actions, in
/// dispatch order. Empty when there is nothing to do.
fn build_actions(app: &AttendanceApp, item: MenuItem) -> Result<Vec<Action>, AppError> {
    let selection = app.selection();
    let is_admin = app.admin_controls_visible();

    let action = match item {
        MenuItem::SwitchTab => {
            let tabs: Vec<Tab> = Tab::ALL
                .into_iter()
                .filter(|tab| is_admin || !tab.is_admin_only())
                .collect();
            Action::ActivateTab(tabs[prompt::select("Tab", &tabs)?])
        }
        MenuItem::SelectClass => {
            let dashboard = selection.class_selector(ClassSelector::Dashboard);
            match pick(dashboard, "Class")? {
                Some(class_id) => Action::SelectClass(class_id),
                None => return Ok(Vec::new()),
            }
        }
        MenuItem::RefreshClasses => Action::RefreshClasses,
        MenuItem::CreateClass => {
            let name = prompt::text("Class name")?;
            let teacher_id = pick(
                selection.teacher_selector(TeacherSelector::ClassTeacher),
                "Teacher",
            )?;
            if teacher_id.is_none() {
                return Ok(Vec::new());
            }
            Action::CreateClass { name, teacher_id }
        }
        MenuItem::RefreshStudents => Action::RefreshStudents,
        MenuItem::AddStudent => Action::AddStudent {
            full_name: prompt::text("Full name")?,
        },
        MenuItem::UpdateStudent => {
            let Some(student_id) = pick(selection.roster(), "Student")? else {
                return Ok(Vec::new());
            };
            let full_name = prompt::optional_text("New full name")?;
            let is_active = match prompt::select("Active", &["Unchanged", "Active", "Inactive"])? {
                1 => Some(true),
                2 => Some(false),
                _ => None,
            };
            Action::UpdateStudent {
                student_id: Some(student_id),
                full_name,
                is_active,
            }
        }
        MenuItem::LoadAttendance => {
            let class_id = pick(
                selection.class_selector(ClassSelector::AttendanceOverview),
                "Class",
            )?;
            let date = date("Date", app.overview().last_query().map(|q| q.date()))?;
            let all_classes = is_admin && prompt::confirm("All classes?")?;
            return Ok(vec![
                Action::ChooseClass {
                    selector: ClassSelector::AttendanceOverview,
                    class_id,
                },
                Action::LoadAttendance { date, all_classes },
            ]);
        }
        MenuItem::SetEditDate => Action::SetEditDate(Some(date("Date", app.edit().date())?)),
        MenuItem::ChooseEditClass => Action::ChooseClass {
            selector: ClassSelector::AttendanceEdit,
            class_id: pick(
                selection.class_selector(ClassSelector::AttendanceEdit),
                "Class",
            )?,
        },
        MenuItem::LoadSheet => Action::LoadAttendanceForEdit,
        MenuItem::SetStatus => {
            let Some(buffer) = app.edit().buffer() else {
                output::print_warning("Load a sheet first");
                return Ok(Vec::new());
            };
            let labels: Vec<String> = buffer
                .rows()
                .iter()
                .map(|row| format!("#{} - {} ({})", row.student_id, row.full_name, row.status))
                .collect();
            if labels.is_empty() {
                output::print_warning("The sheet has no students");
                return Ok(Vec::new());
            }
            let student_id = buffer.rows()[prompt::select("Student", &labels)?].student_id;
            Action::SetStudentStatus {
                student_id,
                status: status()?,
            }
        }
        MenuItem::SetAllStatuses => Action::SetAllStatuses(status()?),
        MenuItem::SaveSheet => Action::SaveAttendance,
        MenuItem::LoadStatistics => {
            let class_id = pick(
                selection.class_selector(ClassSelector::Statistics),
                "Class",
            )?;
            let start_date = date(
                "Week start",
                app.statistics().report().map(|r| r.query.date()),
            )?;
            let all_classes = is_admin && prompt::confirm("All classes?")?;
            return Ok(vec![
                Action::ChooseClass {
                    selector: ClassSelector::Statistics,
                    class_id,
                },
                Action::LoadStatistics {
                    start_date,
                    all_classes,
                },
            ]);
        }
        MenuItem::RefreshUsers => Action::RefreshUsers,
        MenuItem::CreateTeacher => Action::CreateTeacher {
            login: prompt::text("Login")?,
            password: prompt::new_password("Password")?,
        },
        MenuItem::UpdateCredentials => {
            let Some(teacher_id) = pick(
                selection.teacher_selector(TeacherSelector::CredentialsTeacher),
                "Teacher",
            )?
            else {
                return Ok(Vec::new());
            };
            Action::UpdateCredentials {
                teacher_id: Some(teacher_id),
                login: prompt::optional_text("New login")?,
                password: prompt::optional_new_password("New password")?,
            }
        }
        MenuItem::UpdateRole => {
            let users = app.users();
            if users.is_empty() {
                output::print_warning("No users loaded");
                return Ok(Vec::new());
            }
            let labels: Vec<String> = users
                .iter()
                .map(|u| format!("{} ({})", u.choice_label(), u.role))
                .collect();
            let user_id = users[prompt::select("User", &labels)?].id;
            let roles = [Role::Teacher, Role::Admin];
            Action::UpdateRole {
                user_id,
                role: roles[prompt::select("Role", &roles)?],
            }
        }
        MenuItem::OwnCredentials => Action::UpdateOwnCredentials {
            login: prompt::optional_text("New login")?,
            password: prompt::optional_new_password("New password")?,
        },
        MenuItem::Logout => Action::Logout,
        MenuItem::Quit => return Ok(Vec::new()),
    };

    Ok(vec![action])
}

/// Pick one option of a selector. `None` when it has no options.
fn pick<T: Choice>(selector: &Selector<T>, label: &str) -> Result<Option<T::Id>, AppError> {
    let options = selector.options();
    if options.is_empty() {
        output::print_warning(&format!("{label}: nothing to choose from"));
        return Ok(None);
    }
    let labels: Vec<String> = options.iter().map(|option| option.choice_label()).collect();
    let index = prompt::select(label, &labels)?;
    Ok(Some(options[index].choice_id()))
}

fn date(label: &str, current: Option<NaiveDate>) -> Result<NaiveDate, AppError> {
    let default = current
        .unwrap_or_else(|| chrono::Local::now().date_naive())
        .to_string();
    prompt::parsed(&format!("{label} (YYYY-MM-DD)"), Some(&default))
}

fn status() -> Result<AttendanceStatus, AppError> {
    Ok(AttendanceStatus::ALL[prompt::select("Status", &AttendanceStatus::ALL)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_entries_only_on_users_tab() {
        assert!(menu(Tab::Users, true).contains(&MenuItem::CreateTeacher));
        assert!(!menu(Tab::Classes, false).contains(&MenuItem::CreateClass));
        assert!(menu(Tab::Classes, true).contains(&MenuItem::CreateClass));
    }

    #[test]
    fn test_every_menu_ends_with_quit() {
        for tab in Tab::ALL {
            assert_eq!(menu(tab, false).last(), Some(&MenuItem::Quit));
        }
    }

    #[test]
    fn test_saving_keeps_the_sheet() {
        assert!(!MenuItem::SaveSheet.discards_sheet());
        assert!(!MenuItem::SetStatus.discards_sheet());
        assert!(MenuItem::SetEditDate.discards_sheet());
        assert!(MenuItem::Logout.discards_sheet());
    }
}

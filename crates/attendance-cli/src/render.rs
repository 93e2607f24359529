//! Views rendered from client state.
//!
//! Every function here is pure: it reads state and returns the text to show.

use serde::Serialize;
use tabled::{Table, Tabled};

use attendance_client::attendance::{AttendanceEditSession, AttendanceOverview, EditState};
use attendance_client::selection::Choice;
use attendance_client::statistics::StatisticsView;
use attendance_client::{AttendanceApp, ClassSelector, Screen, SelectionCoordinator};
use attendance_core::types::{AttendanceBlock, UserAccount, WeeklyStatBlock};

use crate::output::{OutputFormat, to_json};

const NO_DATA: &str = "No data.";

/// Class display row
#[derive(Debug, Serialize, Tabled)]
struct ClassRow {
    /// Class ID
    id: i64,
    /// Class name
    name: String,
    /// Teacher ID
    teacher_id: i64,
    /// Shared selection marker
    selected: String,
}

/// User display row
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: i64,
    /// Login
    login: String,
    /// Role
    role: String,
    /// Class of a teacher
    class_id: String,
}

/// Student display row
#[derive(Debug, Serialize, Tabled)]
struct StudentRow {
    /// Student ID
    id: i64,
    /// Full name
    full_name: String,
    /// Active flag
    active: String,
    /// Roster selector marker
    chosen: String,
}

/// Attendance record display row
#[derive(Debug, Serialize, Tabled)]
struct AttendanceRow {
    /// Student ID
    student_id: i64,
    /// Full name
    full_name: String,
    /// Status
    status: String,
}

/// Weekly counts display row
#[derive(Debug, Serialize, Tabled)]
struct WeeklyRow {
    /// Student ID
    student_id: i64,
    /// Full name
    full_name: String,
    /// Present days
    present: u32,
    /// Excused absences
    excused: u32,
    /// Unexcused absences
    unexcused: u32,
}

fn table<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        NO_DATA.to_string()
    } else {
        Table::new(rows).to_string()
    }
}

fn marker(on: bool) -> String {
    if on { "*".into() } else { String::new() }
}

/// Session line shown above the app view.
pub fn session_summary(app: &AttendanceApp) -> String {
    match (app.screen(), app.session()) {
        (Screen::App { tab }, Some(session)) => format!(
            "role: {}, userId: {}  [{}]  {}",
            session.role,
            session.user_id,
            tab,
            session.api_base
        ),
        _ => format!("Not logged in ({})", app.api_base()),
    }
}

/// Class list with the shared selection marked.
pub fn classes(selection: &SelectionCoordinator, format: OutputFormat) -> String {
    let selected = selection.selected_class();
    let rows: Vec<ClassRow> = selection
        .classes()
        .iter()
        .map(|c| ClassRow {
            id: c.id.get(),
            name: c.name.clone(),
            teacher_id: c.teacher_id.get(),
            selected: marker(selected == Some(c.id)),
        })
        .collect();

    match format {
        OutputFormat::Json => to_json(&rows, "[]"),
        OutputFormat::Table => {
            let footer = match selected {
                Some(id) => format!("Selected classId: {id}"),
                None => "No class selected".to_string(),
            };
            format!("{}\n{}", table(&rows), footer)
        }
    }
}

/// Users list.
pub fn users(users: &[UserAccount], format: OutputFormat) -> String {
    let rows: Vec<UserRow> = users
        .iter()
        .map(|u| UserRow {
            id: u.id.get(),
            login: u.login.clone(),
            role: u.role.to_string(),
            class_id: u.class_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
        })
        .collect();

    match format {
        OutputFormat::Json => to_json(&rows, "[]"),
        OutputFormat::Table => table(&rows),
    }
}

/// Roster of the selected class.
pub fn roster(selection: &SelectionCoordinator, format: OutputFormat) -> String {
    let roster = selection.roster();
    let rows: Vec<StudentRow> = roster
        .options()
        .iter()
        .map(|s| StudentRow {
            id: s.id.get(),
            full_name: s.full_name.clone(),
            active: if s.is_active { "yes" } else { "no" }.to_string(),
            chosen: marker(roster.chosen() == Some(s.id)),
        })
        .collect();

    match format {
        OutputFormat::Json => to_json(&rows, "[]"),
        OutputFormat::Table => match selection.roster_class() {
            Some(class_id) => format!("Students of class #{class_id}\n{}", table(&rows)),
            None => "Select a class to see its students.".to_string(),
        },
    }
}

fn attendance_rows(block: &AttendanceBlock) -> Vec<AttendanceRow> {
    block
        .records
        .iter()
        .map(|r| AttendanceRow {
            student_id: r.student_id.get(),
            full_name: r.full_name.clone(),
            status: r.status.to_string(),
        })
        .collect()
}

fn attendance_block(block: &AttendanceBlock) -> String {
    let filled = if block.is_filled {
        "filled"
    } else {
        "not filled"
    };
    format!(
        "Class #{}  {}  [{}]\n{}",
        block.class_id,
        block.date,
        filled,
        table(&attendance_rows(block))
    )
}

/// Read-only attendance view; one section per block.
pub fn overview(view: &AttendanceOverview, format: OutputFormat) -> String {
    let Some(blocks) = view.blocks() else {
        return "Load attendance to see it here.".to_string();
    };
    match format {
        OutputFormat::Json => to_json(blocks, "null"),
        OutputFormat::Table => blocks
            .as_slice()
            .iter()
            .map(attendance_block)
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Attendance editor: target fields and the pending sheet.
pub fn edit_sheet(edit: &AttendanceEditSession, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(&edit.buffer(), "null");
    }

    let date = edit
        .date()
        .map_or_else(|| "-".to_string(), |d| d.to_string());
    let class = edit
        .class_id()
        .map_or_else(|| "-".to_string(), |id| format!("#{id}"));
    let state = match edit.state() {
        EditState::Empty => "empty",
        EditState::Loaded => "loaded",
        EditState::Dirty => "unsaved changes",
        EditState::Saving => "saving",
    };
    let header = format!("Date {date}, class {class}  ({state})");

    match edit.buffer() {
        Some(buffer) => {
            let rows: Vec<AttendanceRow> = buffer
                .rows()
                .iter()
                .map(|r| AttendanceRow {
                    student_id: r.student_id.get(),
                    full_name: r.full_name.clone(),
                    status: r.status.to_string(),
                })
                .collect();
            let scope = buffer.scope();
            format!(
                "{header}\nEditing class #{}, date {}\n{}",
                scope.class_id,
                scope.date,
                table(&rows)
            )
        }
        None => format!("{header}\nLoad the sheet to edit it."),
    }
}

fn weekly_block(block: &WeeklyStatBlock) -> String {
    let rows: Vec<WeeklyRow> = block
        .students
        .iter()
        .map(|s| WeeklyRow {
            student_id: s.student_id.get(),
            full_name: s.full_name.clone(),
            present: s.counts.present,
            excused: s.counts.excused,
            unexcused: s.counts.unexcused,
        })
        .collect();
    format!(
        "Class #{}  {} .. {}\nsummary: p={}, e={}, u={}\n{}",
        block.class_id,
        block.from,
        block.to,
        block.summary.present,
        block.summary.excused,
        block.summary.unexcused,
        table(&rows)
    )
}

/// Weekly statistics; one section per block.
pub fn statistics(view: &StatisticsView, format: OutputFormat) -> String {
    let Some(report) = view.report() else {
        return "Load statistics to see them here.".to_string();
    };
    match format {
        OutputFormat::Json => to_json(report, "null"),
        OutputFormat::Table => report
            .blocks
            .as_slice()
            .iter()
            .map(weekly_block)
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Label of a class selector's current choice.
pub fn class_choice(selection: &SelectionCoordinator, selector: ClassSelector) -> String {
    selection
        .class_selector(selector)
        .chosen_option()
        .map_or_else(|| "(none)".to_string(), |class| class.choice_label())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use attendance_client::attendance::AttendanceEditSession;
    use attendance_client::scope::{ScopeKind, ScopeQuery};
    use attendance_core::types::{
        AttendanceRecord, AttendanceStatus, Class, ClassId, OneOrMany, StudentId, UserId,
    };

    use super::*;

    fn class(id: i64, name: &str) -> Class {
        Class {
            id: ClassId(id),
            name: name.into(),
            teacher_id: UserId(7),
        }
    }

    #[test]
    fn test_classes_render_without_selection() {
        let mut selection = SelectionCoordinator::new();
        selection.synchronize_selectors(vec![class(3, "7A")]);

        let text = classes(&selection, OutputFormat::Table);
        assert!(text.contains("7A"));
        assert!(text.ends_with("No class selected"));
    }

    #[test]
    fn test_empty_lists_render_placeholder() {
        assert_eq!(users(&[], OutputFormat::Table), NO_DATA);
        assert_eq!(users(&[], OutputFormat::Json), "[]");
    }

    #[test]
    fn test_edit_sheet_shows_loaded_scope_and_rows() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut edit = AttendanceEditSession::new();
        edit.set_date(Some(date));
        edit.set_class(Some(ClassId(3)));
        let ticket = edit.begin_load(None).unwrap();
        edit.complete_load(
            &ticket,
            OneOrMany::Single(AttendanceBlock {
                class_id: ClassId(3),
                date,
                is_filled: false,
                records: vec![AttendanceRecord {
                    student_id: StudentId(1),
                    full_name: "Anna".into(),
                    status: AttendanceStatus::Present,
                }],
            }),
        )
        .unwrap();
        edit.set_all(AttendanceStatus::Excused).unwrap();

        let text = edit_sheet(&edit, OutputFormat::Table);
        assert!(text.contains("unsaved changes"));
        assert!(text.contains("Editing class #3, date 2024-03-01"));
        assert!(text.contains("Anna"));
        assert!(text.contains("excused"));
    }

    #[test]
    fn test_overview_renders_each_block() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut view = AttendanceOverview::new();
        let ticket = view.begin(ScopeQuery::single(ScopeKind::Daily, date, None));
        let block = |id| AttendanceBlock {
            class_id: ClassId(id),
            date,
            is_filled: id == 3,
            records: vec![],
        };
        view.complete(&ticket, OneOrMany::Many(vec![block(3), block(4)]));

        let text = overview(&view, OutputFormat::Table);
        assert!(text.contains("Class #3  2024-03-01  [filled]"));
        assert!(text.contains("Class #4  2024-03-01  [not filled]"));
    }
}

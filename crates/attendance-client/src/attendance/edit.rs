//! Load → mutate → save workflow for one class's attendance sheet.
//!
//! ```text
//!            load                set_status / set_all
//!   Empty ─────────▶ Loaded ─────────────────────────▶ Dirty
//!                      ▲  ▲                              │
//!                      │  └──────── load ────────────────┤
//!                      │                                 │ save
//!                      │ success (+ reload)              ▼
//!                      └──────────────────────────── Saving
//!                                     failure ─▶ Dirty
//! ```
//!
//! Changing the target date or class discards the buffer and returns the
//! session to `Empty`. Responses to loads issued before such a change are
//! dropped by the generation guard.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use attendance_core::error::AppError;
use attendance_core::result::AppResult;
use attendance_core::types::request::AttendanceSubmission;
use attendance_core::types::{
    Ack, AttendanceBlock, AttendanceStatus, ClassId, OneOrMany, StudentId,
};

use super::buffer::{EditBuffer, EditScope};
use crate::gateway::RequestGateway;
use crate::scope::{GenerationCounter, LoadOutcome, ScopeKind, ScopeQuery, ScopeTicket};

/// Lifecycle state of the edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    /// Nothing loaded.
    Empty,
    /// Buffer matches what the service returned.
    Loaded,
    /// Buffer has local changes.
    Dirty,
    /// Submission in flight.
    Saving,
}

/// Attendance editor for one `(classId, date)`.
#[derive(Debug)]
pub struct AttendanceEditSession {
    date: Option<NaiveDate>,
    class_id: Option<ClassId>,
    state: EditState,
    buffer: Option<EditBuffer>,
    generations: GenerationCounter,
}

impl Default for AttendanceEditSession {
    fn default() -> Self {
        Self {
            date: None,
            class_id: None,
            state: EditState::Empty,
            buffer: None,
            generations: GenerationCounter::default(),
        }
    }
}

impl AttendanceEditSession {
    /// Create an empty session with no target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> EditState {
        self.state
    }

    /// Target date field.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Target class field.
    pub fn class_id(&self) -> Option<ClassId> {
        self.class_id
    }

    /// The loaded buffer, if any.
    pub fn buffer(&self) -> Option<&EditBuffer> {
        self.buffer.as_ref()
    }

    /// Scope of the loaded buffer.
    pub fn scope(&self) -> Option<EditScope> {
        self.buffer.as_ref().map(EditBuffer::scope)
    }

    /// Whether there are unsaved local changes.
    pub fn is_dirty(&self) -> bool {
        self.state == EditState::Dirty
    }

    /// Change the target date. Returns `true` when a loaded buffer was discarded.
    pub fn set_date(&mut self, date: Option<NaiveDate>) -> bool {
        if self.date == date {
            return false;
        }
        self.date = date;
        self.discard()
    }

    /// Change the target class. Returns `true` when a loaded buffer was discarded.
    pub fn set_class(&mut self, class_id: Option<ClassId>) -> bool {
        if self.class_id == class_id {
            return false;
        }
        self.class_id = class_id;
        self.discard()
    }

    fn discard(&mut self) -> bool {
        self.generations.advance();
        let discarded = self.buffer.take().is_some();
        if discarded {
            debug!(was_dirty = self.is_dirty(), "attendance edit buffer discarded");
        }
        self.state = EditState::Empty;
        discarded
    }

    /// Resolve the load scope and tag a new request.
    ///
    /// A blank class field falls back to `selected_class`, and the fallback
    /// is written back into the field.
    pub fn begin_load(&mut self, selected_class: Option<ClassId>) -> AppResult<ScopeTicket> {
        let date = self
            .date
            .ok_or_else(|| AppError::precondition("Pick a date to edit"))?;

        if self.class_id.is_none() {
            self.class_id = selected_class;
        }

        let query = ScopeQuery::single(ScopeKind::Daily, date, self.class_id);
        Ok(self.generations.issue(query))
    }

    /// Apply the response to a load issued by [`Self::begin_load`].
    ///
    /// A collection response is rejected with `AmbiguousScope`; state and
    /// buffer are left as they were.
    pub fn complete_load(
        &mut self,
        ticket: &ScopeTicket,
        response: OneOrMany<AttendanceBlock>,
    ) -> AppResult<LoadOutcome> {
        if !self.generations.is_current(ticket.generation()) {
            warn!(query = ?ticket.query(), "dropping stale attendance load");
            return Ok(LoadOutcome::Stale);
        }

        let block = match response {
            OneOrMany::Single(block) => block,
            OneOrMany::Many(blocks) => {
                return Err(AppError::ambiguous_scope(format!(
                    "Pick a specific class to edit attendance ({} classes matched)",
                    blocks.len()
                )));
            }
        };

        let query = ticket.query();
        if block.date != query.date() || query.class_id().is_some_and(|id| id != block.class_id) {
            let requested = query
                .class_id()
                .map_or_else(|| "the default class".to_string(), |id| format!("class #{id}"));
            return Err(AppError::invalid_response(format!(
                "Requested {requested} on {}, received class #{} on {}",
                query.date(),
                block.class_id,
                block.date
            )));
        }

        self.class_id = Some(block.class_id);
        let buffer = EditBuffer::from_block(block);
        debug!(
            class_id = %buffer.scope().class_id,
            date = %buffer.scope().date,
            students = buffer.len(),
            "attendance sheet loaded"
        );
        self.buffer = Some(buffer);
        self.state = EditState::Loaded;
        Ok(LoadOutcome::Applied)
    }

    /// Fetch the sheet for the current target, replacing any buffer.
    pub async fn load(
        &mut self,
        gateway: &RequestGateway,
        selected_class: Option<ClassId>,
    ) -> AppResult<LoadOutcome> {
        let ticket = self.begin_load(selected_class)?;
        let response = gateway.fetch_attendance(ticket.query()).await?;
        self.complete_load(&ticket, response)
    }

    fn buffer_mut(&mut self) -> AppResult<&mut EditBuffer> {
        match (self.state, self.buffer.as_mut()) {
            (EditState::Loaded | EditState::Dirty, Some(buffer)) => Ok(buffer),
            _ => Err(AppError::precondition("Load the attendance sheet first")),
        }
    }

    /// Set one buffered student's status.
    pub fn set_status(&mut self, student_id: StudentId, status: AttendanceStatus) -> AppResult<()> {
        self.buffer_mut()?.set(student_id, status)?;
        self.state = EditState::Dirty;
        Ok(())
    }

    /// Set every buffered status in one step. Returns the number of rows touched.
    pub fn set_all(&mut self, status: AttendanceStatus) -> AppResult<usize> {
        let touched = self.buffer_mut()?.set_all(status);
        self.state = EditState::Dirty;
        Ok(touched)
    }

    /// Check the save preconditions and build the submission.
    ///
    /// Uses the scope captured at load time.
    pub fn prepare_save(&self) -> AppResult<(EditScope, AttendanceSubmission)> {
        if self.date.is_none() {
            return Err(AppError::precondition("Pick a date before saving"));
        }
        let buffer = match (self.state, self.buffer.as_ref()) {
            (EditState::Loaded | EditState::Dirty, Some(buffer)) => buffer,
            _ if self.class_id.is_none() => {
                return Err(AppError::precondition("Pick a class before saving"));
            }
            _ => return Err(AppError::precondition("Load the attendance sheet before saving")),
        };
        if buffer.is_empty() {
            return Err(AppError::precondition("There are no students to save"));
        }
        Ok((buffer.scope(), buffer.to_submission()))
    }

    /// Submit the whole buffer, then reload the same scope.
    ///
    /// On submission failure the session goes back to `Dirty` with the
    /// buffer intact. When only the reload fails the save stands, the
    /// session stays `Loaded` and the reload error is returned.
    pub async fn save(&mut self, gateway: &RequestGateway) -> AppResult<Ack> {
        let (scope, submission) = self.prepare_save()?;

        self.state = EditState::Saving;
        let ack = match gateway.submit_attendance(scope.date, &submission).await {
            Ok(ack) => ack,
            Err(e) => {
                self.state = EditState::Dirty;
                return Err(e);
            }
        };
        self.state = EditState::Loaded;
        info!(
            class_id = %scope.class_id,
            date = %scope.date,
            records = submission.records.len(),
            "attendance saved"
        );

        let ticket = self.generations.issue(ScopeQuery::single(
            ScopeKind::Daily,
            scope.date,
            Some(scope.class_id),
        ));
        let reloaded = match gateway.fetch_attendance(ticket.query()).await {
            Ok(response) => self.complete_load(&ticket, response),
            Err(e) => Err(e),
        };
        if let Err(e) = reloaded {
            return Err(AppError::new(
                e.kind,
                format!("Attendance saved, but reloading it failed: {}", e.message),
            ));
        }
        Ok(ack)
    }

    /// Forget target and buffer (logout).
    pub fn reset(&mut self) {
        self.generations.advance();
        self.date = None;
        self.class_id = None;
        self.buffer = None;
        self.state = EditState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use attendance_core::error::ErrorKind;
    use attendance_core::types::AttendanceRecord;
    use serde_json::json;

    use super::*;
    use crate::gateway::{HttpMethod, ScriptedTransport};

    fn march_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn gateway(transport: &ScriptedTransport) -> RequestGateway {
        RequestGateway::new(Arc::new(transport.clone()), "http://school.test/api/v1")
    }

    fn block(records: &[(i64, &str)]) -> AttendanceBlock {
        AttendanceBlock {
            class_id: ClassId(3),
            date: march_first(),
            is_filled: true,
            records: records
                .iter()
                .map(|(id, status)| AttendanceRecord {
                    student_id: StudentId(*id),
                    full_name: format!("Student {id}"),
                    status: status.parse().unwrap(),
                })
                .collect(),
        }
    }

    fn loaded_session(records: &[(i64, &str)]) -> AttendanceEditSession {
        let mut session = AttendanceEditSession::new();
        session.set_date(Some(march_first()));
        session.set_class(Some(ClassId(3)));
        let ticket = session.begin_load(None).unwrap();
        session
            .complete_load(&ticket, OneOrMany::Single(block(records)))
            .unwrap();
        session
    }

    #[test]
    fn test_set_all_applies_to_every_buffered_student() {
        let mut session = loaded_session(&[(1, "present"), (2, "excused"), (3, "present")]);
        assert_eq!(session.set_all(AttendanceStatus::Unexcused).unwrap(), 3);
        assert_eq!(session.state(), EditState::Dirty);
        let buffer = session.buffer().unwrap();
        assert_eq!(buffer.len(), 3);
        assert!(
            buffer
                .rows()
                .iter()
                .all(|r| r.status == AttendanceStatus::Unexcused)
        );
    }

    #[test]
    fn test_save_without_buffer_is_a_precondition_failure() {
        let mut session = AttendanceEditSession::new();
        session.set_date(Some(march_first()));
        let err = session.prepare_save().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Precondition);

        let empty = loaded_session(&[]);
        assert_eq!(empty.prepare_save().unwrap_err().kind, ErrorKind::Precondition);
    }

    #[tokio::test]
    async fn test_save_with_empty_buffer_sends_nothing() {
        let transport = ScriptedTransport::new();
        let gw = gateway(&transport);
        let mut session = loaded_session(&[]);

        let err = session.save(&gw).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Precondition);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_no_class_and_collection_response_is_ambiguous() {
        let transport = ScriptedTransport::new();
        transport.respond(
            HttpMethod::Get,
            "/attendance",
            200,
            json!([
                {"classId": 3, "date": "2024-03-01", "isFilled": true, "records": []},
                {"classId": 4, "date": "2024-03-01", "isFilled": false, "records": []}
            ]),
        );
        let gw = gateway(&transport);

        let mut session = AttendanceEditSession::new();
        session.set_date(Some(march_first()));
        let err = session.load(&gw, None).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::AmbiguousScope);
        assert_eq!(session.state(), EditState::Empty);
        assert!(session.buffer().is_none());
        assert_eq!(transport.last_request().unwrap().query_param("classId"), None);
    }

    #[test]
    fn test_ambiguous_response_leaves_loaded_buffer_untouched() {
        let mut session = loaded_session(&[(1, "present")]);
        session.set_status(StudentId(1), AttendanceStatus::Excused).unwrap();
        let before = session.buffer().cloned();

        let ticket = session.begin_load(None).unwrap();
        let err = session
            .complete_load(&ticket, OneOrMany::Many(vec![block(&[]), block(&[])]))
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::AmbiguousScope);
        assert_eq!(session.state(), EditState::Dirty);
        assert_eq!(session.buffer().cloned(), before);
    }

    #[tokio::test]
    async fn test_blank_class_falls_back_to_selection_and_writes_it_back() {
        let transport = ScriptedTransport::new();
        transport.respond(
            HttpMethod::Get,
            "/attendance",
            200,
            json!({"classId": 3, "date": "2024-03-01", "isFilled": true,
                   "records": [{"studentId": 1, "fullName": "A", "status": "present"}]}),
        );
        let gw = gateway(&transport);

        let mut session = AttendanceEditSession::new();
        session.set_date(Some(march_first()));
        let outcome = session.load(&gw, Some(ClassId(3))).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(session.class_id(), Some(ClassId(3)));
        let request = transport.last_request().unwrap();
        assert_eq!(request.query_param("date"), Some("2024-03-01"));
        assert_eq!(request.query_param("classId"), Some("3"));
        assert_eq!(
            session.buffer().unwrap().status(StudentId(1)),
            Some(AttendanceStatus::Present)
        );
    }

    #[test]
    fn test_response_after_target_change_is_dropped() {
        let mut session = AttendanceEditSession::new();
        session.set_date(Some(march_first()));
        session.set_class(Some(ClassId(3)));
        let ticket = session.begin_load(None).unwrap();

        session.set_class(Some(ClassId(4)));
        let outcome = session
            .complete_load(&ticket, OneOrMany::Single(block(&[(1, "present")])))
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(session.state(), EditState::Empty);
        assert!(session.buffer().is_none());
        assert_eq!(session.class_id(), Some(ClassId(4)));
    }

    #[test]
    fn test_changing_target_discards_dirty_buffer() {
        let mut session = loaded_session(&[(1, "present")]);
        session.set_all(AttendanceStatus::Excused).unwrap();
        assert!(session.is_dirty());

        assert!(session.set_date(NaiveDate::from_ymd_opt(2024, 3, 2)));
        assert_eq!(session.state(), EditState::Empty);
        assert!(session.buffer().is_none());
        assert!(!session.set_date(NaiveDate::from_ymd_opt(2024, 3, 2)));
    }

    #[tokio::test]
    async fn test_failed_save_returns_to_dirty_with_buffer() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Put, "/attendance", 409, json!({"message": "Conflict"}));
        let gw = gateway(&transport);

        let mut session = loaded_session(&[(1, "present"), (2, "present")]);
        session.set_status(StudentId(2), AttendanceStatus::Excused).unwrap();
        let before = session.buffer().cloned();

        let err = session.save(&gw).await.unwrap_err();
        assert!(err.is_remote_status(409));
        assert_eq!(session.state(), EditState::Dirty);
        assert_eq!(session.buffer().cloned(), before);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_after_save_stays_loaded() {
        let transport = ScriptedTransport::new();
        transport
            .respond(HttpMethod::Put, "/attendance", 200, json!({"message": "Saved"}))
            .unreachable(HttpMethod::Get, "/attendance");
        let gw = gateway(&transport);

        let mut session = loaded_session(&[(1, "present")]);
        session.set_status(StudentId(1), AttendanceStatus::Unexcused).unwrap();

        let err = session.save(&gw).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transport);
        assert!(err.message.starts_with("Attendance saved"));
        assert_eq!(session.state(), EditState::Loaded);
        assert_eq!(
            session.buffer().unwrap().status(StudentId(1)),
            Some(AttendanceStatus::Unexcused)
        );
    }

    #[test]
    fn test_mutation_before_load_is_rejected() {
        let mut session = AttendanceEditSession::new();
        assert_eq!(
            session
                .set_status(StudentId(1), AttendanceStatus::Present)
                .unwrap_err()
                .kind,
            ErrorKind::Precondition
        );
        assert!(session.set_all(AttendanceStatus::Present).is_err());
    }
}

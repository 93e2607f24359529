//! Read-only daily attendance view.

use chrono::NaiveDate;
use tracing::{debug, warn};

use attendance_core::result::AppResult;
use attendance_core::types::{AttendanceBlock, ClassId, OneOrMany, Role};

use crate::gateway::RequestGateway;
use crate::scope::{GenerationCounter, LoadOutcome, ScopeKind, ScopeQuery, ScopeTicket};

/// Attendance of one date, for one class or (admins) every class.
#[derive(Debug, Default)]
pub struct AttendanceOverview {
    last_query: Option<ScopeQuery>,
    blocks: Option<OneOrMany<AttendanceBlock>>,
    generations: GenerationCounter,
}

impl AttendanceOverview {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters of the rendered result.
    pub fn last_query(&self) -> Option<&ScopeQuery> {
        self.last_query.as_ref()
    }

    /// Rendered result, single block or sequence as returned.
    pub fn blocks(&self) -> Option<&OneOrMany<AttendanceBlock>> {
        self.blocks.as_ref()
    }

    /// Tag a new request for `query`.
    pub fn begin(&mut self, query: ScopeQuery) -> ScopeTicket {
        self.generations.issue(query)
    }

    /// Apply a response unless a newer request was issued since.
    pub fn complete(
        &mut self,
        ticket: &ScopeTicket,
        response: OneOrMany<AttendanceBlock>,
    ) -> LoadOutcome {
        if !self.generations.is_current(ticket.generation()) {
            warn!(query = ?ticket.query(), "dropping stale attendance overview");
            return LoadOutcome::Stale;
        }
        debug!(blocks = response.len(), "attendance overview loaded");
        self.last_query = Some(ticket.query().clone());
        self.blocks = Some(response);
        LoadOutcome::Applied
    }

    /// Load attendance of `date`. `all_classes` only applies to admins.
    pub async fn load(
        &mut self,
        gateway: &RequestGateway,
        date: NaiveDate,
        class_id: Option<ClassId>,
        all_classes: bool,
        role: Role,
    ) -> AppResult<LoadOutcome> {
        let query = ScopeQuery::new(ScopeKind::Daily, date, class_id, all_classes, role);
        self.fetch(gateway, query).await
    }

    /// Re-run the last successful query. Does nothing if there is none.
    pub async fn reload(&mut self, gateway: &RequestGateway) -> AppResult<Option<LoadOutcome>> {
        let Some(query) = self.last_query.clone() else {
            return Ok(None);
        };
        self.fetch(gateway, query).await.map(Some)
    }

    async fn fetch(&mut self, gateway: &RequestGateway, query: ScopeQuery) -> AppResult<LoadOutcome> {
        let ticket = self.begin(query);
        let response = gateway.fetch_attendance(ticket.query()).await?;
        Ok(self.complete(&ticket, response))
    }

    /// Forget the rendered result (logout).
    pub fn reset(&mut self) {
        self.generations.advance();
        self.last_query = None;
        self.blocks = None;
    }
}

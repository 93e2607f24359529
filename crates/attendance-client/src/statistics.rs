//! Weekly per-student attendance statistics.
//!
//! Read-only. Uses the same scope rules and generation guard as the daily
//! attendance views. Every block is checked against the summary invariant
//! before it replaces what is rendered.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use attendance_core::result::AppResult;
use attendance_core::types::{ClassId, OneOrMany, Role, WeeklyStatBlock};

use crate::gateway::RequestGateway;
use crate::scope::{GenerationCounter, LoadOutcome, ScopeKind, ScopeQuery, ScopeTicket};

/// A rendered weekly result and the parameters it was loaded with.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    /// Query the report answers.
    pub query: ScopeQuery,
    /// Single block or sequence, as returned.
    pub blocks: OneOrMany<WeeklyStatBlock>,
}

/// Weekly statistics view.
#[derive(Debug, Default)]
pub struct StatisticsView {
    report: Option<WeeklyReport>,
    generations: GenerationCounter,
}

impl StatisticsView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered report.
    pub fn report(&self) -> Option<&WeeklyReport> {
        self.report.as_ref()
    }

    /// Tag a new request for `query`.
    pub fn begin(&mut self, query: ScopeQuery) -> ScopeTicket {
        self.generations.issue(query)
    }

    /// Validate and apply a response unless a newer request was issued since.
    ///
    /// A block whose summary differs from its student totals is rejected
    /// with `InvalidResponse` and the previous report stays.
    pub fn complete(
        &mut self,
        ticket: &ScopeTicket,
        response: OneOrMany<WeeklyStatBlock>,
    ) -> AppResult<LoadOutcome> {
        if !self.generations.is_current(ticket.generation()) {
            warn!(query = ?ticket.query(), "dropping stale weekly statistics");
            return Ok(LoadOutcome::Stale);
        }

        for block in response.as_slice() {
            block.check_summary()?;
        }

        debug!(blocks = response.len(), "weekly statistics loaded");
        self.report = Some(WeeklyReport {
            query: ticket.query().clone(),
            blocks: response,
        });
        Ok(LoadOutcome::Applied)
    }

    /// Load the week starting at `start_date`. `all_classes` only applies
    /// to admins and drops the class filter.
    pub async fn load_weekly(
        &mut self,
        gateway: &RequestGateway,
        start_date: NaiveDate,
        class_id: Option<ClassId>,
        all_classes: bool,
        role: Role,
    ) -> AppResult<LoadOutcome> {
        let query = ScopeQuery::new(ScopeKind::Weekly, start_date, class_id, all_classes, role);
        let ticket = self.begin(query);
        let response = gateway.fetch_weekly_statistics(ticket.query()).await?;
        self.complete(&ticket, response)
    }

    /// Forget the rendered report (logout).
    pub fn reset(&mut self) {
        self.generations.advance();
        self.report = None;
    }
}

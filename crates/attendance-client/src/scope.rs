//! Query scope rules shared by the attendance and statistics views.
//!
//! A scope is the `(classId, date)` or `(classId, week start)` pair that
//! decides which records a query targets. The rules are the same for every
//! view:
//!
//! - `allClasses` is an admin-only capability; for any other role it is forced off.
//! - when `allClasses` is on, the class filter is dropped regardless of selection.
//! - otherwise the class filter is sent only when a class is known.
//!
//! Views also tag every request with a [`Generation`] so a response that
//! arrives after its parameters changed is dropped instead of rendered.

use chrono::NaiveDate;
use serde::Serialize;

use attendance_core::types::{ClassId, Role};

/// Which endpoint family a scope is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    /// Daily attendance (`date=`).
    Daily,
    /// Weekly statistics (`startDate=`).
    Weekly,
}

impl ScopeKind {
    fn date_param(self) -> &'static str {
        match self {
            Self::Daily => "date",
            Self::Weekly => "startDate",
        }
    }
}

/// Resolved parameters of one attendance or statistics query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeQuery {
    kind: ScopeKind,
    date: NaiveDate,
    class_id: Option<ClassId>,
    all_classes: bool,
}

impl ScopeQuery {
    /// Build a scope, applying the role restriction on `all_classes`.
    pub fn new(
        kind: ScopeKind,
        date: NaiveDate,
        class_id: Option<ClassId>,
        all_classes: bool,
        role: Role,
    ) -> Self {
        let all_classes = all_classes && role.is_admin();
        Self {
            kind,
            date,
            class_id: if all_classes { None } else { class_id },
            all_classes,
        }
    }

    /// Scope targeting exactly one class (or the caller's default class when `None`).
    pub fn single(kind: ScopeKind, date: NaiveDate, class_id: Option<ClassId>) -> Self {
        Self {
            kind,
            date,
            class_id,
            all_classes: false,
        }
    }

    /// Endpoint family.
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Date (or week start).
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Class filter actually sent, if any.
    pub fn class_id(&self) -> Option<ClassId> {
        self.class_id
    }

    /// Whether the query spans every class.
    pub fn all_classes(&self) -> bool {
        self.all_classes
    }

    /// Query-string pairs in wire order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![(
            self.kind.date_param(),
            self.date.format("%Y-%m-%d").to_string(),
        )];
        if self.all_classes {
            pairs.push(("allClasses", "true".to_string()));
        } else if let Some(class_id) = self.class_id {
            pairs.push(("classId", class_id.to_string()));
        }
        pairs
    }
}

/// Tag identifying one issued request of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(u64);

/// Monotonic generation counter owned by a view.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: u64,
}

impl GenerationCounter {
    /// Invalidate everything issued so far and return the new generation.
    pub fn advance(&mut self) -> Generation {
        self.current += 1;
        Generation(self.current)
    }

    /// Whether `generation` is still the latest one.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.current
    }

    /// Tag a new request for `query`, invalidating older ones.
    pub fn issue(&mut self, query: ScopeQuery) -> ScopeTicket {
        ScopeTicket {
            generation: self.advance(),
            query,
        }
    }
}

/// An issued request: its parameters and generation tag.
#[derive(Debug, Clone)]
pub struct ScopeTicket {
    generation: Generation,
    query: ScopeQuery,
}

impl ScopeTicket {
    /// Parameters the request was issued with.
    pub fn query(&self) -> &ScopeQuery {
        &self.query
    }

    /// Generation tag.
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// What happened to a response when it reached its view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was applied and is now rendered.
    Applied,
    /// The view's parameters changed after the request was issued; the response was dropped.
    Stale,
}

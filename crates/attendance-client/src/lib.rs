//! # attendance-client
//!
//! Client-side state for the school attendance service: the request gateway,
//! the persisted session, the shared class selection, the attendance edit
//! session state machine, the read-only attendance and statistics views, and
//! [`app::AttendanceApp`], which owns all of them and dispatches user actions.
//!
//! Everything here is UI-agnostic: front ends render from the state objects
//! and feed user events back as [`app::Action`]s.

pub mod app;
pub mod attendance;
pub mod gateway;
pub mod scope;
pub mod selection;
pub mod session;
pub mod statistics;
pub mod storage;

pub use app::{Action, AttendanceApp, Notice, Screen, Tab};
pub use gateway::RequestGateway;
pub use selection::{ClassSelector, SelectionCoordinator, TeacherSelector};
pub use storage::{DurableStorage, FileStorage, MemoryStorage};

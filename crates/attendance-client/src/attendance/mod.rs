//! Daily attendance: the read-only overview and the edit session.

pub mod buffer;
pub mod edit;
pub mod overview;

pub use buffer::{EditBuffer, EditScope};
pub use edit::{AttendanceEditSession, EditState};
pub use overview::AttendanceOverview;

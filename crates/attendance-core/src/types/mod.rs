//! Core type definitions used across the workspace.

pub mod id;
pub mod model;
pub mod request;
pub mod response;

pub use id::*;
pub use model::{
    AttendanceBlock, AttendanceRecord, AttendanceStatus, Class, Role, StatusCounts, Student,
    StudentWeeklyStats, UserAccount, WeeklyStatBlock,
};
pub use response::{Ack, ApiErrorPayload, LoginResponse, OneOrMany};

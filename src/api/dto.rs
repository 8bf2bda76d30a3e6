//! Wire types for the school-administration backend
//!
//! Every endpoint speaks JSON with camelCase keys. Entity fields are all
//! nullable on the wire, so they are `Option` here too; the backend fills
//! in whatever it has and omits the rest.

use crate::paging::{Page, PageRequest};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<CourseDto>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<Box<TeacherDto>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<StudentDto>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Box<CourseDto>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
    /// Server-side sort key; the backend default ordering applies when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// Body of every `filterX` call: an optional free-text filter plus the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleStringFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub pagination: Pagination,
}

impl From<&PageRequest> for SimpleStringFilter {
    fn from(request: &PageRequest) -> Self {
        Self {
            filter: request.filter_text.clone(),
            pagination: Pagination {
                page_number: request.page_index,
                page_size: request.page_size,
                sort: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LongId {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseTeacherAssoc {
    pub id_teacher: i64,
    pub id_course: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStudentAssoc {
    pub id_student: i64,
    pub id_course: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Server status
// ─────────────────────────────────────────────────────────────────────────────

/// Status code attached to every response envelope
///
/// Only the codes the client reacts to are named. Anything else the server
/// invents is kept verbatim in `Other` so a new code never breaks decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServerErrorCode {
    Ok,
    DeleteTeacherNotAllowed,
    DeleteCourseNotAllowed,
    DeleteStudentNotAllowed,
    Other(String),
}

impl ServerErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "OK",
            Self::DeleteTeacherNotAllowed => "DELETE_TEACHER_NOT_ALLOWED",
            Self::DeleteCourseNotAllowed => "DELETE_COURSE_NOT_ALLOWED",
            Self::DeleteStudentNotAllowed => "DELETE_STUDENT_NOT_ALLOWED",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for ServerErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "OK" => Self::Ok,
            "DELETE_TEACHER_NOT_ALLOWED" => Self::DeleteTeacherNotAllowed,
            "DELETE_COURSE_NOT_ALLOWED" => Self::DeleteCourseNotAllowed,
            "DELETE_STUDENT_NOT_ALLOWED" => Self::DeleteStudentNotAllowed,
            _ => Self::Other(code),
        }
    }
}

impl From<ServerErrorCode> for String {
    fn from(code: ServerErrorCode) -> Self {
        code.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    #[serde(default)]
    pub code: Option<ServerErrorCode>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub help_reference: Option<String>,
    #[serde(default)]
    pub trace_id: Option<String>,
}

impl ServerStatus {
    /// A status without a code is not OK
    pub fn is_ok(&self) -> bool {
        self.code == Some(ServerErrorCode::Ok)
    }

    /// `CODE: message` form used when several statuses are listed together
    pub fn describe(&self) -> String {
        let code = self.code.as_ref().map(|c| c.as_str()).unwrap_or("UNKNOWN");
        match &self.message {
            Some(message) => format!("{}: {}", code, message),
            None => code.to_string(),
        }
    }
}

/// An absent or empty status list means success, as does a list of OKs
pub fn statuses_ok(statuses: Option<&[ServerStatus]>) -> bool {
    statuses.map_or(true, |list| list.iter().all(ServerStatus::is_ok))
}

/// Messages of every non-OK status, in server order
pub fn failure_messages(statuses: &[ServerStatus]) -> Vec<String> {
    statuses
        .iter()
        .filter(|s| !s.is_ok())
        .filter_map(|s| s.message.clone())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Response envelopes
// ─────────────────────────────────────────────────────────────────────────────

/// One page of results as the backend's slice type reports it
///
/// The backend is inconsistent about which continuation field it fills in,
/// so both `has_next` and `last` are kept and resolved by [`Page`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice<T> {
    #[serde(default = "Option::default")]
    pub content: Option<Vec<T>>,
    #[serde(default)]
    pub has_next: Option<bool>,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub number_of_elements: Option<u32>,
    #[serde(default)]
    pub last: Option<bool>,
}

impl<T> From<Slice<T>> for Page<T> {
    fn from(slice: Slice<T>) -> Self {
        Page {
            items: slice.content.unwrap_or_default(),
            has_next: slice.has_next,
            is_last: slice.last,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespSlice<T> {
    #[serde(default = "Option::default")]
    pub slice: Option<Slice<T>>,
    #[serde(default)]
    pub status: Option<Vec<ServerStatus>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespSingle<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub status: Option<Vec<ServerStatus>>,
}

impl<T> RespSingle<T> {
    pub fn is_ok(&self) -> bool {
        statuses_ok(self.status.as_deref())
    }
}

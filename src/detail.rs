//! Detail loading, deletion and course associations
//!
//! These are one-shot operations on a single entity. Each folds its
//! transport and status outcomes into a short message the UI can toast,
//! and none of them touch list state directly: callers refresh the lists
//! named by [`Association::affected`] or the deleted kind afterwards.

use crate::api::dto::{
    failure_messages, CourseDto, RespSingle, ServerErrorCode, ServerStatus, StudentDto, TeacherDto,
};
use crate::api::{ApiError, SchoolClient};
use crate::entity::{AnyEntity, Entity, EntityKind};
use serde::de::IgnoredAny;

// ─────────────────────────────────────────────────────────────────────────────
// Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Fetch a single entity with its relations
pub async fn load<E: Entity>(client: &SchoolClient, id: i64) -> Result<E, String> {
    let kind = E::KIND;
    match client.get::<E>(id).await {
        Ok(resp) if resp.is_ok() => resp.data.ok_or_else(|| {
            tracing::warn!("get{} {} returned no data", kind.label(), id);
            format!("Error fetching {} details.", kind.singular())
        }),
        Ok(resp) => {
            let messages = failure_messages(resp.status.as_deref().unwrap_or_default());
            tracing::warn!("get{} {} rejected: {:?}", kind.label(), id, messages);
            if messages.is_empty() {
                Err(format!("Error fetching {} details.", kind.singular()))
            } else {
                Err(messages.join("\n"))
            }
        }
        Err(e) => {
            tracing::error!("Failed to load {} {}: {}", kind.singular(), id, e);
            Err(e.user_message(&format!("fetching {} details", kind.singular())))
        }
    }
}

/// [`load`] for a kind only known at runtime
pub async fn load_any(client: &SchoolClient, kind: EntityKind, id: i64) -> Result<AnyEntity, String> {
    match kind {
        EntityKind::Teacher => load::<TeacherDto>(client, id).await.map(Entity::into_any),
        EntityKind::Course => load::<CourseDto>(client, id).await.map(Entity::into_any),
        EntityKind::Student => load::<StudentDto>(client, id).await.map(Entity::into_any),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Deletion
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The backend refused because of existing relationships
    Blocked(String),
    Failed(String),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Toast text for the outcome
    pub fn message(&self, kind: EntityKind) -> String {
        match self {
            Self::Deleted => format!("{} deleted successfully.", kind.label()),
            Self::Blocked(msg) | Self::Failed(msg) => msg.clone(),
        }
    }
}

fn not_allowed_code(kind: EntityKind) -> ServerErrorCode {
    match kind {
        EntityKind::Teacher => ServerErrorCode::DeleteTeacherNotAllowed,
        EntityKind::Course => ServerErrorCode::DeleteCourseNotAllowed,
        EntityKind::Student => ServerErrorCode::DeleteStudentNotAllowed,
    }
}

fn not_allowed_default(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Teacher => "Cannot delete teacher due to existing relationships.",
        EntityKind::Course => "Cannot delete course due to relations.",
        EntityKind::Student => "Cannot delete student.",
    }
}

/// Interpret the status list of a delete that reached the backend
pub fn interpret_delete(kind: EntityKind, statuses: Option<&[ServerStatus]>) -> DeleteOutcome {
    let statuses = statuses.unwrap_or_default();
    let blocked = not_allowed_code(kind);

    if let Some(status) = statuses.iter().find(|s| s.code.as_ref() == Some(&blocked)) {
        let msg = status
            .message
            .clone()
            .unwrap_or_else(|| not_allowed_default(kind).to_string());
        return DeleteOutcome::Blocked(msg);
    }

    let failures: Vec<String> = statuses
        .iter()
        .filter(|s| !s.is_ok())
        .map(ServerStatus::describe)
        .collect();
    if failures.is_empty() {
        DeleteOutcome::Deleted
    } else {
        DeleteOutcome::Failed(format!(
            "Could not delete {}: \n{}",
            kind.singular(),
            failures.join("\n")
        ))
    }
}

fn delete_outcome(
    kind: EntityKind,
    result: Result<RespSingle<IgnoredAny>, ApiError>,
) -> DeleteOutcome {
    match result {
        Ok(resp) => interpret_delete(kind, resp.status.as_deref()),
        Err(e) => DeleteOutcome::Failed(e.user_message(&format!("deleting {}", kind.singular()))),
    }
}

pub async fn delete(client: &SchoolClient, kind: EntityKind, id: i64) -> DeleteOutcome {
    let outcome = delete_outcome(kind, client.delete(kind, id).await);
    match &outcome {
        DeleteOutcome::Deleted => tracing::info!("Deleted {} {}", kind.singular(), id),
        DeleteOutcome::Blocked(msg) => tracing::warn!("Delete of {} {} blocked: {}", kind.singular(), id, msg),
        DeleteOutcome::Failed(msg) => tracing::error!("Delete of {} {} failed: {}", kind.singular(), id, msg),
    }
    outcome
}

// ─────────────────────────────────────────────────────────────────────────────
// Associations
// ─────────────────────────────────────────────────────────────────────────────

/// A teacher or student link to change on a course
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    AssignTeacher { course_id: i64, teacher_id: i64 },
    UnassignTeacher { course_id: i64, teacher_id: i64 },
    Enroll { student_id: i64, course_id: i64 },
    Unenroll { student_id: i64, course_id: i64 },
}

impl Association {
    pub fn success_notice(&self) -> &'static str {
        match self {
            Self::AssignTeacher { .. } => "Teacher associated successfully.",
            Self::UnassignTeacher { .. } => "Teacher unassigned successfully.",
            Self::Enroll { .. } => "Student enrolled successfully.",
            Self::Unenroll { .. } => "Student unenrolled successfully.",
        }
    }

    /// "associating teacher", "enrolling student", ...
    fn action(&self) -> &'static str {
        match self {
            Self::AssignTeacher { .. } => "associating teacher",
            Self::UnassignTeacher { .. } => "unassigning teacher",
            Self::Enroll { .. } => "enrolling student",
            Self::Unenroll { .. } => "unenrolling student",
        }
    }

    fn failure_notice(&self) -> String {
        format!("Error {}.", self.action())
    }

    /// Lists whose rows show this link and should be refreshed after it changes
    pub fn affected(&self) -> [EntityKind; 2] {
        match self {
            Self::AssignTeacher { .. } | Self::UnassignTeacher { .. } => {
                [EntityKind::Course, EntityKind::Teacher]
            }
            Self::Enroll { .. } | Self::Unenroll { .. } => {
                [EntityKind::Course, EntityKind::Student]
            }
        }
    }

    /// Apply the change; `Ok` carries the success notice, `Err` the failure text
    pub async fn apply(&self, client: &SchoolClient) -> Result<&'static str, String> {
        let result = match *self {
            Self::AssignTeacher {
                course_id,
                teacher_id,
            } => client.associate_teacher_to_course(teacher_id, course_id).await,
            Self::UnassignTeacher {
                course_id,
                teacher_id,
            } => client.remove_teacher_from_course(teacher_id, course_id).await,
            Self::Enroll {
                student_id,
                course_id,
            } => client.associate_student_to_course(student_id, course_id).await,
            Self::Unenroll {
                student_id,
                course_id,
            } => client.remove_student_from_course(student_id, course_id).await,
        };
        self.outcome(result)
    }

    fn outcome(&self, result: Result<RespSingle<IgnoredAny>, ApiError>) -> Result<&'static str, String> {
        match result {
            Ok(resp) if resp.is_ok() => {
                tracing::info!("{:?} applied", self);
                Ok(self.success_notice())
            }
            Ok(resp) => {
                let messages = failure_messages(resp.status.as_deref().unwrap_or_default());
                tracing::warn!("{:?} rejected: {:?}", self, messages);
                if messages.is_empty() {
                    Err(self.failure_notice())
                } else {
                    Err(messages.join("\n"))
                }
            }
            Err(e) => {
                tracing::error!("{:?} failed: {}", self, e);
                Err(e.user_message(self.action()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: ServerErrorCode, message: Option<&str>) -> ServerStatus {
        ServerStatus {
            code: Some(code),
            message: message.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_delete_without_statuses_succeeds() {
        assert_eq!(interpret_delete(EntityKind::Teacher, None), DeleteOutcome::Deleted);
        assert_eq!(
            interpret_delete(
                EntityKind::Course,
                Some(&[status(ServerErrorCode::Ok, None)])
            ),
            DeleteOutcome::Deleted
        );
    }

    #[test]
    fn test_delete_not_allowed_uses_server_message_or_default() {
        let blocked = interpret_delete(
            EntityKind::Teacher,
            Some(&[status(ServerErrorCode::DeleteTeacherNotAllowed, None)]),
        );
        assert_eq!(
            blocked,
            DeleteOutcome::Blocked("Cannot delete teacher due to existing relationships.".to_string())
        );

        let blocked = interpret_delete(
            EntityKind::Course,
            Some(&[status(
                ServerErrorCode::DeleteCourseNotAllowed,
                Some("Course has 3 students"),
            )]),
        );
        assert_eq!(blocked, DeleteOutcome::Blocked("Course has 3 students".to_string()));
    }

    #[test]
    fn test_not_allowed_code_of_another_kind_is_a_plain_failure() {
        let outcome = interpret_delete(
            EntityKind::Student,
            Some(&[status(ServerErrorCode::DeleteCourseNotAllowed, Some("nope"))]),
        );
        assert_eq!(
            outcome,
            DeleteOutcome::Failed(
                "Could not delete student: \nDELETE_COURSE_NOT_ALLOWED: nope".to_string()
            )
        );
    }

    #[test]
    fn test_delete_transport_errors() {
        let http = delete_outcome(
            EntityKind::Course,
            Err(ApiError::Http {
                status: 503,
                body: String::new(),
            }),
        );
        assert_eq!(
            http,
            DeleteOutcome::Failed("Error deleting course (HTTP 503). Please try again.".to_string())
        );

        let network = delete_outcome(EntityKind::Course, Err(ApiError::Network("reset".to_string())));
        assert_eq!(network.message(EntityKind::Course), "Network error: reset");
        assert_eq!(
            DeleteOutcome::Deleted.message(EntityKind::Student),
            "Student deleted successfully."
        );
    }

    #[test]
    fn test_association_outcomes() {
        let enroll = Association::Enroll {
            student_id: 1,
            course_id: 2,
        };
        let ok = RespSingle::<IgnoredAny> {
            data: None,
            status: None,
        };
        assert_eq!(enroll.outcome(Ok(ok)), Ok("Student enrolled successfully."));

        let rejected = RespSingle::<IgnoredAny> {
            data: None,
            status: Some(vec![status(
                ServerErrorCode::Other("COURSE_FULL".to_string()),
                None,
            )]),
        };
        assert_eq!(
            enroll.outcome(Ok(rejected)),
            Err("Error enrolling student.".to_string())
        );

        let assign = Association::AssignTeacher {
            course_id: 2,
            teacher_id: 3,
        };
        assert_eq!(
            assign.outcome(Err(ApiError::Decode("eof".to_string()))),
            Err("Error associating teacher.".to_string())
        );
        assert_eq!(assign.affected(), [EntityKind::Course, EntityKind::Teacher]);
    }
}

//! HTTP client for the school-administration backend
//!
//! Every endpoint is a JSON `POST` relative to the configured base URL.
//! The client returns the raw envelopes; interpreting status lists is left
//! to the caller because list, editor and detail code each read them
//! differently.

use super::dto::{
    CourseStudentAssoc, CourseTeacherAssoc, LongId, RespSingle, RespSlice, SimpleStringFilter,
};
use super::error::ApiError;
use crate::entity::{Entity, EntityKind};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::time::Duration;

/// Async client bound to one backend
#[derive(Debug, Clone)]
pub struct SchoolClient {
    client: reqwest::Client,
    base_url: String,
}

impl SchoolClient {
    /// Create a client for `base_url` with a per-request timeout
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn post<B, R>(&self, name: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(name);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("{} returned HTTP {}: {}", name, status.as_u16(), body);
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Generic entity operations
    // ─────────────────────────────────────────────────────────────────────────

    /// `filterTeachers` / `filterCourses` / `filterStudents`
    pub async fn filter<E: Entity>(
        &self,
        filter: &SimpleStringFilter,
    ) -> Result<RespSlice<E>, ApiError> {
        self.post(&E::KIND.filter_endpoint(), filter).await
    }

    /// `getTeacher` / `getCourse` / `getStudent`
    pub async fn get<E: Entity>(&self, id: i64) -> Result<RespSingle<E>, ApiError> {
        self.post(&E::KIND.get_endpoint(), &LongId { id }).await
    }

    /// Create when `id` is absent, update otherwise
    pub async fn upsert<E: Entity>(&self, entity: &E) -> Result<RespSingle<E>, ApiError> {
        self.post(&E::KIND.upsert_endpoint(), entity).await
    }

    pub async fn delete(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> Result<RespSingle<IgnoredAny>, ApiError> {
        self.post(&kind.delete_endpoint(), &LongId { id }).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Associations
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn associate_teacher_to_course(
        &self,
        teacher_id: i64,
        course_id: i64,
    ) -> Result<RespSingle<IgnoredAny>, ApiError> {
        let body = CourseTeacherAssoc {
            id_teacher: teacher_id,
            id_course: course_id,
        };
        self.post("associateTeacherToCourse", &body).await
    }

    pub async fn remove_teacher_from_course(
        &self,
        teacher_id: i64,
        course_id: i64,
    ) -> Result<RespSingle<IgnoredAny>, ApiError> {
        let body = CourseTeacherAssoc {
            id_teacher: teacher_id,
            id_course: course_id,
        };
        self.post("removeTeacherFromCourse", &body).await
    }

    pub async fn associate_student_to_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<RespSingle<IgnoredAny>, ApiError> {
        let body = CourseStudentAssoc {
            id_student: student_id,
            id_course: course_id,
        };
        self.post("associateStudentToCourse", &body).await
    }

    pub async fn remove_student_from_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<RespSingle<IgnoredAny>, ApiError> {
        let body = CourseStudentAssoc {
            id_student: student_id,
            id_course: course_id,
        };
        self.post("removeStudentFromCourse", &body).await
    }
}

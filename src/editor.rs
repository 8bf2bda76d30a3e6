//! Create/update forms for teachers, courses and students
//!
//! A form holds raw text as typed. `build` validates it and produces the DTO
//! to upsert, carrying over identity and relations from the entity being
//! edited. [`save`] runs the upsert and folds every outcome into a
//! [`SaveOutcome`] the UI can show as-is.

use crate::api::dto::{failure_messages, CourseDto, StudentDto, TeacherDto};
use crate::api::{ApiError, SchoolClient};
use crate::entity::{AnyEntity, Entity, EntityKind};

/// Result of a save, shown once then consumed back to `Idle`
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SaveOutcome<E> {
    #[default]
    Idle,
    Loading,
    Success(E),
    Error(Vec<String>),
}

impl<E> SaveOutcome<E> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Take the outcome for display, leaving `Idle` behind
    pub fn consume(&mut self) -> SaveOutcome<E> {
        std::mem::take(self)
    }

    pub fn map<T>(self, f: impl FnOnce(E) -> T) -> SaveOutcome<T> {
        match self {
            Self::Idle => SaveOutcome::Idle,
            Self::Loading => SaveOutcome::Loading,
            Self::Success(e) => SaveOutcome::Success(f(e)),
            Self::Error(messages) => SaveOutcome::Error(messages),
        }
    }
}

/// A form that can produce an entity for upsert
pub trait EntityForm {
    type Entity: Entity;

    /// Prefill from an existing entity (edit) or blank (create)
    fn from_entity(existing: Option<&Self::Entity>) -> Self;

    /// Labels of the editable text fields, in display order
    fn labels(&self) -> &'static [&'static str];

    fn field(&self, index: usize) -> Option<&str>;

    fn field_mut(&mut self, index: usize) -> Option<&mut String>;

    /// Validate and build the entity to save
    fn build(&self, existing: Option<&Self::Entity>) -> Result<Self::Entity, Vec<String>>;
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn trimmed(value: &str) -> Option<String> {
    Some(value.trim().to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Teacher
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeacherForm {
    pub first_name: String,
    pub last_name: String,
    pub title: String,
}

impl EntityForm for TeacherForm {
    type Entity = TeacherDto;

    fn from_entity(existing: Option<&TeacherDto>) -> Self {
        let Some(t) = existing else {
            return Self::default();
        };
        Self {
            first_name: t.first_name.clone().unwrap_or_default(),
            last_name: t.last_name.clone().unwrap_or_default(),
            title: t.title.clone().unwrap_or_default(),
        }
    }

    fn labels(&self) -> &'static [&'static str] {
        &["First name", "Last name", "Title"]
    }

    fn field(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(&self.first_name),
            1 => Some(&self.last_name),
            2 => Some(&self.title),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.first_name),
            1 => Some(&mut self.last_name),
            2 => Some(&mut self.title),
            _ => None,
        }
    }

    fn build(&self, existing: Option<&TeacherDto>) -> Result<TeacherDto, Vec<String>> {
        if blank(&self.first_name) || blank(&self.last_name) || blank(&self.title) {
            return Err(vec!["All fields are required.".to_string()]);
        }
        Ok(TeacherDto {
            id: existing.and_then(|t| t.id),
            first_name: trimmed(&self.first_name),
            last_name: trimmed(&self.last_name),
            title: trimmed(&self.title),
            courses: existing.and_then(|t| t.courses.clone()),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Course
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseForm {
    pub code: String,
    pub title: String,
    pub description: String,
    pub year: String,
    /// Teacher to save with the course; prefilled from the edited course
    pub teacher: Option<TeacherDto>,
}

impl EntityForm for CourseForm {
    type Entity = CourseDto;

    fn from_entity(existing: Option<&CourseDto>) -> Self {
        let Some(c) = existing else {
            return Self::default();
        };
        Self {
            code: c.code.clone().unwrap_or_default(),
            title: c.title.clone().unwrap_or_default(),
            description: c.description.clone().unwrap_or_default(),
            year: c.year.map(|y| y.to_string()).unwrap_or_default(),
            teacher: c.teacher.as_deref().cloned(),
        }
    }

    fn labels(&self) -> &'static [&'static str] {
        &["Code", "Title", "Description", "Year"]
    }

    fn field(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(&self.code),
            1 => Some(&self.title),
            2 => Some(&self.description),
            3 => Some(&self.year),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.code),
            1 => Some(&mut self.title),
            2 => Some(&mut self.description),
            3 => Some(&mut self.year),
            _ => None,
        }
    }

    fn build(&self, existing: Option<&CourseDto>) -> Result<CourseDto, Vec<String>> {
        if blank(&self.code) || blank(&self.title) || blank(&self.year) {
            return Err(vec![
                "Course Code, Title, and Year are required.".to_string()
            ]);
        }
        let Ok(year) = self.year.trim().parse::<i32>() else {
            return Err(vec!["Invalid year format.".to_string()]);
        };

        // Relations go out shallow: the teacher without its courses, the
        // students without their course back-reference
        let teacher = self.teacher.as_ref().map(|t| {
            Box::new(TeacherDto {
                courses: None,
                ..t.clone()
            })
        });
        let students = existing.and_then(|c| c.students.as_ref()).map(|students| {
            students
                .iter()
                .map(|s| StudentDto {
                    course: None,
                    ..s.clone()
                })
                .collect()
        });

        Ok(CourseDto {
            id: existing.and_then(|c| c.id),
            code: trimmed(&self.code),
            title: trimmed(&self.title),
            description: trimmed(&self.description),
            year: Some(year),
            teacher,
            students,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Student
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    pub serial_number: String,
    /// Course to save with the student; prefilled from the edited student
    pub course: Option<CourseDto>,
}

impl EntityForm for StudentForm {
    type Entity = StudentDto;

    fn from_entity(existing: Option<&StudentDto>) -> Self {
        let Some(s) = existing else {
            return Self::default();
        };
        Self {
            first_name: s.first_name.clone().unwrap_or_default(),
            last_name: s.last_name.clone().unwrap_or_default(),
            serial_number: s.serial_number.clone().unwrap_or_default(),
            course: s.course.as_deref().cloned(),
        }
    }

    fn labels(&self) -> &'static [&'static str] {
        &["First name", "Last name", "Serial number"]
    }

    fn field(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(&self.first_name),
            1 => Some(&self.last_name),
            2 => Some(&self.serial_number),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.first_name),
            1 => Some(&mut self.last_name),
            2 => Some(&mut self.serial_number),
            _ => None,
        }
    }

    fn build(&self, existing: Option<&StudentDto>) -> Result<StudentDto, Vec<String>> {
        if blank(&self.first_name) || blank(&self.last_name) || blank(&self.serial_number) {
            return Err(vec![
                "First Name, Last Name, and Serial Number are required.".to_string(),
            ]);
        }
        let course = self.course.as_ref().map(|c| {
            Box::new(CourseDto {
                id: c.id,
                code: c.code.clone(),
                title: c.title.clone(),
                ..Default::default()
            })
        });
        Ok(StudentDto {
            id: existing.and_then(|s| s.id),
            first_name: trimmed(&self.first_name),
            last_name: trimmed(&self.last_name),
            serial_number: trimmed(&self.serial_number),
            course,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Fold an upsert response into a user-facing outcome
pub fn save_outcome<E: Entity>(
    result: Result<crate::api::dto::RespSingle<E>, ApiError>,
) -> SaveOutcome<E> {
    let kind = E::KIND;
    match result {
        Ok(resp) => {
            let ok = resp.is_ok();
            match (resp.data, ok) {
                (Some(saved), true) => {
                    tracing::info!("{} saved (id {:?})", kind.label(), saved.id());
                    SaveOutcome::Success(saved)
                }
                (_, _) => {
                    let messages = match &resp.status {
                        Some(statuses) => failure_messages(statuses),
                        None => vec!["Unknown server error after successful call.".to_string()],
                    };
                    tracing::warn!("{} save rejected: {:?}", kind.label(), messages);
                    if messages.is_empty() {
                        SaveOutcome::Error(vec![format!("Failed to save {}.", kind.singular())])
                    } else {
                        SaveOutcome::Error(messages)
                    }
                }
            }
        }
        Err(e) => {
            tracing::error!("Failed to save {}: {}", kind.singular(), e);
            SaveOutcome::Error(vec![e.user_message(&format!("saving {}", kind.singular()))])
        }
    }
}

/// Validate the form and upsert the result
pub async fn save<F: EntityForm>(
    client: &SchoolClient,
    form: &F,
    existing: Option<&F::Entity>,
) -> SaveOutcome<F::Entity> {
    let entity = match form.build(existing) {
        Ok(entity) => entity,
        Err(messages) => return SaveOutcome::Error(messages),
    };
    tracing::debug!("Saving {}: {:?}", F::Entity::KIND.singular(), entity);
    save_outcome(client.upsert(&entity).await)
}

// ─────────────────────────────────────────────────────────────────────────────
// Type-erased form for the UI
// ─────────────────────────────────────────────────────────────────────────────

/// One of the three forms, with the entity being edited (if any)
#[derive(Debug, Clone, PartialEq)]
pub enum AnyForm {
    Teacher(TeacherForm, Option<TeacherDto>),
    Course(CourseForm, Option<CourseDto>),
    Student(StudentForm, Option<StudentDto>),
}

impl AnyForm {
    /// Blank form for creating a new entity
    pub fn create(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Teacher => Self::Teacher(TeacherForm::default(), None),
            EntityKind::Course => Self::Course(CourseForm::default(), None),
            EntityKind::Student => Self::Student(StudentForm::default(), None),
        }
    }

    /// Prefilled form for editing
    pub fn edit(entity: &AnyEntity) -> Self {
        match entity {
            AnyEntity::Teacher(t) => Self::Teacher(TeacherForm::from_entity(Some(t)), Some(t.clone())),
            AnyEntity::Course(c) => Self::Course(CourseForm::from_entity(Some(c)), Some(c.clone())),
            AnyEntity::Student(s) => {
                Self::Student(StudentForm::from_entity(Some(s)), Some(s.clone()))
            }
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Teacher(..) => EntityKind::Teacher,
            Self::Course(..) => EntityKind::Course,
            Self::Student(..) => EntityKind::Student,
        }
    }

    pub fn is_edit(&self) -> bool {
        match self {
            Self::Teacher(_, existing) => existing.is_some(),
            Self::Course(_, existing) => existing.is_some(),
            Self::Student(_, existing) => existing.is_some(),
        }
    }

    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::Teacher(form, _) => form.labels(),
            Self::Course(form, _) => form.labels(),
            Self::Student(form, _) => form.labels(),
        }
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        match self {
            Self::Teacher(form, _) => form.field(index),
            Self::Course(form, _) => form.field(index),
            Self::Student(form, _) => form.field(index),
        }
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match self {
            Self::Teacher(form, _) => form.field_mut(index),
            Self::Course(form, _) => form.field_mut(index),
            Self::Student(form, _) => form.field_mut(index),
        }
    }

    pub async fn save(&self, client: &SchoolClient) -> SaveOutcome<AnyEntity> {
        match self {
            Self::Teacher(form, existing) => {
                save(client, form, existing.as_ref()).await.map(Entity::into_any)
            }
            Self::Course(form, existing) => {
                save(client, form, existing.as_ref()).await.map(Entity::into_any)
            }
            Self::Student(form, existing) => {
                save(client, form, existing.as_ref()).await.map(Entity::into_any)
            }
        }
    }
}

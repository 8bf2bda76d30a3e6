//! Entity kinds managed through the backend
//!
//! Teachers, courses and students share one set of operations (filter, get,
//! upsert, delete). The [`Entity`] trait carries what differs between them:
//! endpoint naming and how a row or a detail view is rendered.

use crate::api::dto::{CourseDto, StudentDto, TeacherDto};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum EntityKind {
    #[default]
    #[value(alias = "teachers")]
    Teacher,
    #[value(alias = "courses")]
    Course,
    #[value(alias = "students")]
    Student,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Teacher, Self::Course, Self::Student];

    /// Lowercase singular, used in user-facing messages
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Course => "course",
            Self::Student => "student",
        }
    }

    /// Lowercase plural, used in log lines and list messages
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Teacher => "teachers",
            Self::Course => "courses",
            Self::Student => "students",
        }
    }

    /// Tab title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Teacher => "Teachers",
            Self::Course => "Courses",
            Self::Student => "Students",
        }
    }

    /// Capitalized singular ("Teacher")
    pub fn label(&self) -> &'static str {
        match self {
            Self::Teacher => "Teacher",
            Self::Course => "Course",
            Self::Student => "Student",
        }
    }

    pub fn filter_endpoint(&self) -> String {
        format!("filter{}", self.title())
    }

    pub fn get_endpoint(&self) -> String {
        format!("get{}", self.label())
    }

    pub fn upsert_endpoint(&self) -> String {
        format!("upsert{}", self.label())
    }

    pub fn delete_endpoint(&self) -> String {
        format!("delete{}", self.label())
    }

    pub fn next(self) -> Self {
        match self {
            Self::Teacher => Self::Course,
            Self::Course => Self::Student,
            Self::Student => Self::Teacher,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Teacher => Self::Student,
            Self::Course => Self::Teacher,
            Self::Student => Self::Course,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

/// A backend entity the generic list, detail and editor code can handle
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> Option<i64>;

    /// One-line rendering for list rows and pickers
    fn row_label(&self) -> String;

    /// Labelled fields for the detail view, relations included
    fn detail_lines(&self) -> Vec<(&'static str, String)>;

    fn into_any(self) -> AnyEntity;
}

fn person_name(first: &Option<String>, last: &Option<String>) -> String {
    format!(
        "{} {}",
        first.as_deref().unwrap_or(""),
        last.as_deref().unwrap_or("")
    )
    .trim()
    .to_string()
}

fn or_na(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("N/A")
        .to_string()
}

fn id_text(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "N/A".to_string())
}

impl Entity for TeacherDto {
    const KIND: EntityKind = EntityKind::Teacher;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn row_label(&self) -> String {
        let name = person_name(&self.first_name, &self.last_name);
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => format!("{} ({})", name, title),
            None => name,
        }
    }

    fn detail_lines(&self) -> Vec<(&'static str, String)> {
        let courses = match &self.courses {
            Some(courses) if !courses.is_empty() => courses
                .iter()
                .map(|c| format!("- {}", c.row_label()))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => "No courses assigned.".to_string(),
        };
        vec![
            ("ID", id_text(self.id)),
            ("First name", or_na(&self.first_name)),
            ("Last name", or_na(&self.last_name)),
            ("Title", or_na(&self.title)),
            ("Courses", courses),
        ]
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::Teacher(self)
    }
}

impl Entity for CourseDto {
    const KIND: EntityKind = EntityKind::Course;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn row_label(&self) -> String {
        let code = self.code.as_deref().unwrap_or("?");
        let title = self.title.as_deref().unwrap_or("");
        match self.year {
            Some(year) => format!("{} · {} ({})", code, title, year),
            None => format!("{} · {}", code, title),
        }
    }

    fn detail_lines(&self) -> Vec<(&'static str, String)> {
        let teacher = match &self.teacher {
            Some(teacher) => {
                let name = person_name(&teacher.first_name, &teacher.last_name);
                if name.is_empty() {
                    "Unknown Teacher".to_string()
                } else {
                    name
                }
            }
            None => "Not assigned".to_string(),
        };
        let students = match &self.students {
            Some(students) if !students.is_empty() => students
                .iter()
                .map(|s| format!("- {}", person_name(&s.first_name, &s.last_name)))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => "No students enrolled.".to_string(),
        };
        let description = self
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "No description.".to_string());

        vec![
            ("ID", id_text(self.id)),
            ("Code", or_na(&self.code)),
            ("Title", or_na(&self.title)),
            ("Description", description),
            (
                "Year",
                self.year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            ("Teacher", teacher),
            ("Students", students),
        ]
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::Course(self)
    }
}

impl Entity for StudentDto {
    const KIND: EntityKind = EntityKind::Student;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn row_label(&self) -> String {
        let name = person_name(&self.first_name, &self.last_name);
        match self.serial_number.as_deref().filter(|s| !s.is_empty()) {
            Some(serial) => format!("{} · #{}", name, serial),
            None => name,
        }
    }

    fn detail_lines(&self) -> Vec<(&'static str, String)> {
        let course = match &self.course {
            Some(course) => course.row_label(),
            None => "Not enrolled".to_string(),
        };
        vec![
            ("ID", id_text(self.id)),
            ("First name", or_na(&self.first_name)),
            ("Last name", or_na(&self.last_name)),
            ("Serial number", or_na(&self.serial_number)),
            ("Course", course),
        ]
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::Student(self)
    }
}

/// Type-erased entity for places that hold "whatever is selected"
#[derive(Debug, Clone, PartialEq)]
pub enum AnyEntity {
    Teacher(TeacherDto),
    Course(CourseDto),
    Student(StudentDto),
}

impl AnyEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Teacher(_) => EntityKind::Teacher,
            Self::Course(_) => EntityKind::Course,
            Self::Student(_) => EntityKind::Student,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Teacher(t) => t.id(),
            Self::Course(c) => c.id(),
            Self::Student(s) => s.id(),
        }
    }

    pub fn row_label(&self) -> String {
        match self {
            Self::Teacher(t) => t.row_label(),
            Self::Course(c) => c.row_label(),
            Self::Student(s) => s.row_label(),
        }
    }

    pub fn detail_lines(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Teacher(t) => t.detail_lines(),
            Self::Course(c) => c.detail_lines(),
            Self::Student(s) => s.detail_lines(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_names() {
        assert_eq!(EntityKind::Teacher.filter_endpoint(), "filterTeachers");
        assert_eq!(EntityKind::Course.get_endpoint(), "getCourse");
        assert_eq!(EntityKind::Student.upsert_endpoint(), "upsertStudent");
        assert_eq!(EntityKind::Course.delete_endpoint(), "deleteCourse");
    }

    #[test]
    fn test_kind_cycle() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.next().prev(), kind);
        }
        assert_eq!(EntityKind::Student.next(), EntityKind::Teacher);
    }

    #[test]
    fn test_row_labels() {
        let teacher = TeacherDto {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            title: Some("Prof.".to_string()),
            ..Default::default()
        };
        assert_eq!(teacher.row_label(), "Ada Lovelace (Prof.)");

        let course = CourseDto {
            code: Some("CS101".to_string()),
            title: Some("Intro".to_string()),
            year: Some(2024),
            ..Default::default()
        };
        assert_eq!(course.row_label(), "CS101 · Intro (2024)");
    }

    #[test]
    fn test_course_detail_placeholders() {
        let course = CourseDto {
            id: Some(3),
            ..Default::default()
        };
        let lines = course.detail_lines();
        let get = |label: &str| {
            lines
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(get("ID"), "3");
        assert_eq!(get("Description"), "No description.");
        assert_eq!(get("Teacher"), "Not assigned");
        assert_eq!(get("Students"), "No students enrolled.");
    }
}

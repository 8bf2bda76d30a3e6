// Modal system for TUI overlays
//
// Modals are self-contained: each handles its own keys and returns a
// ModalAction. App keeps them on a stack (a picker or confirm dialog opens
// on top of the detail it came from) and acts on the returned action.

use crate::detail::Association;
use crate::editor::{AnyForm, SaveOutcome};
use crate::entity::{AnyEntity, Entity, EntityKind};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions returned by modal input handling
#[derive(Debug, Clone, PartialEq)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    /// Close the topmost modal
    Close,
    /// Fetch the detail entity again
    Reload,
    Edit(AnyEntity),
    ConfirmDelete { kind: EntityKind, id: i64, label: String },
    Delete { kind: EntityKind, id: i64 },
    /// Open a picker; `items` given means no fetch is needed
    OpenPicker {
        purpose: PickPurpose,
        items: Option<Vec<AnyEntity>>,
    },
    Associate(Association),
    Save,
    /// Nothing to do, tell the user why
    Notice(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Picker purpose
// ─────────────────────────────────────────────────────────────────────────────

/// What a picked entity will be linked to (or unlinked from)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPurpose {
    TeacherForCourse { course_id: i64 },
    CourseForTeacher { teacher_id: i64 },
    CourseToLeave { teacher_id: i64 },
    StudentForCourse { course_id: i64 },
    StudentToRemove { course_id: i64 },
    CourseForStudent { student_id: i64 },
}

impl PickPurpose {
    pub fn title(&self) -> &'static str {
        match self {
            Self::TeacherForCourse { .. } => "Assign teacher",
            Self::CourseForTeacher { .. } => "Assign to course",
            Self::CourseToLeave { .. } => "Unassign from course",
            Self::StudentForCourse { .. } => "Enroll student",
            Self::StudentToRemove { .. } => "Unenroll student",
            Self::CourseForStudent { .. } => "Enroll in course",
        }
    }

    /// Kind of the entities offered
    pub fn source_kind(&self) -> EntityKind {
        match self {
            Self::TeacherForCourse { .. } => EntityKind::Teacher,
            Self::StudentForCourse { .. } | Self::StudentToRemove { .. } => EntityKind::Student,
            Self::CourseForTeacher { .. }
            | Self::CourseToLeave { .. }
            | Self::CourseForStudent { .. } => EntityKind::Course,
        }
    }

    pub fn association(&self, picked_id: i64) -> Association {
        match *self {
            Self::TeacherForCourse { course_id } => Association::AssignTeacher {
                course_id,
                teacher_id: picked_id,
            },
            Self::CourseForTeacher { teacher_id } => Association::AssignTeacher {
                course_id: picked_id,
                teacher_id,
            },
            Self::CourseToLeave { teacher_id } => Association::UnassignTeacher {
                course_id: picked_id,
                teacher_id,
            },
            Self::StudentForCourse { course_id } => Association::Enroll {
                student_id: picked_id,
                course_id,
            },
            Self::StudentToRemove { course_id } => Association::Unenroll {
                student_id: picked_id,
                course_id,
            },
            Self::CourseForStudent { student_id } => Association::Enroll {
                student_id,
                course_id: picked_id,
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Modal states
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DetailModal {
    pub kind: EntityKind,
    pub id: i64,
    /// None while loading
    pub entity: Option<AnyEntity>,
    pub error: Option<String>,
    pub scroll: u16,
}

impl DetailModal {
    pub fn loading(kind: EntityKind, id: i64) -> Self {
        Self {
            kind,
            id,
            entity: None,
            error: None,
            scroll: 0,
        }
    }

    fn handle_input(&mut self, key: KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => ModalAction::Close,
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                ModalAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                ModalAction::None
            }
            KeyCode::Char('r') => ModalAction::Reload,
            KeyCode::Char(c) => match &self.entity {
                Some(entity) => self.entity_action(entity, c),
                None => ModalAction::None,
            },
            _ => ModalAction::None,
        }
    }

    fn entity_action(&self, entity: &AnyEntity, c: char) -> ModalAction {
        let id = self.id;
        match (c, entity) {
            ('e', _) => ModalAction::Edit(entity.clone()),
            ('d', _) => ModalAction::ConfirmDelete {
                kind: self.kind,
                id,
                label: entity.row_label(),
            },

            ('a', AnyEntity::Teacher(_)) => picker(PickPurpose::CourseForTeacher { teacher_id: id }),
            ('u', AnyEntity::Teacher(t)) => {
                let courses: Vec<AnyEntity> = t
                    .courses
                    .iter()
                    .flatten()
                    .cloned()
                    .map(Entity::into_any)
                    .collect();
                if courses.is_empty() {
                    ModalAction::Notice("No courses assigned.".to_string())
                } else {
                    ModalAction::OpenPicker {
                        purpose: PickPurpose::CourseToLeave { teacher_id: id },
                        items: Some(courses),
                    }
                }
            }

            ('a', AnyEntity::Course(_)) => picker(PickPurpose::TeacherForCourse { course_id: id }),
            ('u', AnyEntity::Course(c)) => match c.teacher.as_ref().and_then(|t| t.id) {
                Some(teacher_id) => ModalAction::Associate(Association::UnassignTeacher {
                    course_id: id,
                    teacher_id,
                }),
                None => ModalAction::Notice("No teacher assigned.".to_string()),
            },
            ('s', AnyEntity::Course(_)) => picker(PickPurpose::StudentForCourse { course_id: id }),
            ('x', AnyEntity::Course(c)) => {
                let students: Vec<AnyEntity> = c
                    .students
                    .iter()
                    .flatten()
                    .cloned()
                    .map(Entity::into_any)
                    .collect();
                if students.is_empty() {
                    ModalAction::Notice("No students enrolled.".to_string())
                } else {
                    ModalAction::OpenPicker {
                        purpose: PickPurpose::StudentToRemove { course_id: id },
                        items: Some(students),
                    }
                }
            }

            ('a', AnyEntity::Student(_)) => picker(PickPurpose::CourseForStudent { student_id: id }),
            ('u', AnyEntity::Student(s)) => match s.course.as_ref().and_then(|c| c.id) {
                Some(course_id) => ModalAction::Associate(Association::Unenroll {
                    student_id: id,
                    course_id,
                }),
                None => ModalAction::Notice("Student is not enrolled.".to_string()),
            },

            _ => ModalAction::None,
        }
    }

    /// Key hints for the bottom border, by entity kind
    pub fn hints(&self) -> &'static str {
        match self.kind {
            EntityKind::Teacher => " e edit · d delete · a assign course · u unassign · r reload · Esc ",
            EntityKind::Course => {
                " e edit · d delete · a/u teacher · s/x enroll/unenroll · r reload · Esc "
            }
            EntityKind::Student => " e edit · d delete · a enroll · u unenroll · r reload · Esc ",
        }
    }
}

fn picker(purpose: PickPurpose) -> ModalAction {
    ModalAction::OpenPicker {
        purpose,
        items: None,
    }
}

#[derive(Debug, Clone)]
pub struct PickerModal {
    pub purpose: PickPurpose,
    pub items: Vec<AnyEntity>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: usize,
}

impl PickerModal {
    pub fn new(purpose: PickPurpose, items: Option<Vec<AnyEntity>>) -> Self {
        let loading = items.is_none();
        Self {
            purpose,
            items: items.unwrap_or_default(),
            loading,
            error: None,
            selected: 0,
        }
    }

    fn handle_input(&mut self, key: KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => ModalAction::Close,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                ModalAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.items.len() {
                    self.selected += 1;
                }
                ModalAction::None
            }
            KeyCode::Enter => match self.items.get(self.selected).and_then(AnyEntity::id) {
                Some(id) => ModalAction::Associate(self.purpose.association(id)),
                None => ModalAction::None,
            },
            _ => ModalAction::None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorModal {
    pub form: AnyForm,
    pub focus: usize,
    /// `Loading` while the upsert is in flight, `Error` until the next edit
    pub outcome: SaveOutcome<()>,
}

impl EditorModal {
    pub fn new(form: AnyForm) -> Self {
        Self {
            form,
            focus: 0,
            outcome: SaveOutcome::Idle,
        }
    }

    pub fn errors(&self) -> &[String] {
        match &self.outcome {
            SaveOutcome::Error(messages) => messages,
            _ => &[],
        }
    }

    pub fn title(&self) -> String {
        let verb = if self.form.is_edit() { "Edit" } else { "New" };
        format!(" {} {} ", verb, self.form.kind().singular())
    }

    fn handle_input(&mut self, key: KeyEvent) -> ModalAction {
        if key.code == KeyCode::Esc {
            return ModalAction::Close;
        }
        if self.outcome.is_loading() {
            return ModalAction::None;
        }

        let field_count = self.form.labels().len();
        match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => ModalAction::Save,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % field_count;
                ModalAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + field_count - 1) % field_count;
                ModalAction::None
            }
            KeyCode::Enter => {
                if self.focus + 1 == field_count {
                    ModalAction::Save
                } else {
                    self.focus += 1;
                    ModalAction::None
                }
            }
            KeyCode::Backspace => {
                self.outcome.consume();
                if let Some(field) = self.form.field_mut(self.focus) {
                    field.pop();
                }
                ModalAction::None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.outcome.consume();
                if let Some(field) = self.form.field_mut(self.focus) {
                    field.push(c);
                }
                ModalAction::None
            }
            _ => ModalAction::None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmModal {
    pub prompt: String,
    pub kind: EntityKind,
    pub id: i64,
}

impl ConfirmModal {
    fn handle_input(&mut self, key: KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ModalAction::Delete {
                kind: self.kind,
                id: self.id,
            },
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ModalAction::Close,
            _ => ModalAction::None,
        }
    }
}

/// Available modal types
#[derive(Debug, Clone)]
pub enum Modal {
    /// Keyboard shortcuts
    Help,
    Detail(DetailModal),
    Editor(EditorModal),
    Picker(PickerModal),
    Confirm(ConfirmModal),
}

impl Modal {
    /// Handle keyboard input, return action for caller to execute
    pub fn handle_input(&mut self, key: KeyEvent) -> ModalAction {
        match self {
            Modal::Help => match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => ModalAction::Close,
                _ => ModalAction::None,
            },
            Modal::Detail(detail) => detail.handle_input(key),
            Modal::Editor(editor) => editor.handle_input(key),
            Modal::Picker(picker) => picker.handle_input(key),
            Modal::Confirm(confirm) => confirm.handle_input(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::{CourseDto, StudentDto, TeacherDto};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded(entity: AnyEntity) -> DetailModal {
        let mut detail = DetailModal::loading(entity.kind(), entity.id().unwrap_or(0));
        detail.entity = Some(entity);
        detail
    }

    #[test]
    fn test_detail_ignores_entity_keys_while_loading() {
        let mut detail = DetailModal::loading(EntityKind::Course, 3);
        assert_eq!(detail.handle_input(key(KeyCode::Char('d'))), ModalAction::None);
        assert_eq!(detail.handle_input(key(KeyCode::Char('r'))), ModalAction::Reload);
    }

    #[test]
    fn test_course_unassign_uses_current_teacher() {
        let course = CourseDto {
            id: Some(3),
            teacher: Some(Box::new(TeacherDto {
                id: Some(8),
                ..Default::default()
            })),
            ..Default::default()
        };
        let mut detail = loaded(course.into_any());
        assert_eq!(
            detail.handle_input(key(KeyCode::Char('u'))),
            ModalAction::Associate(Association::UnassignTeacher {
                course_id: 3,
                teacher_id: 8
            })
        );
    }

    #[test]
    fn test_student_without_course_cannot_unenroll() {
        let student = StudentDto {
            id: Some(4),
            ..Default::default()
        };
        let mut detail = loaded(student.into_any());
        assert!(matches!(
            detail.handle_input(key(KeyCode::Char('u'))),
            ModalAction::Notice(_)
        ));
    }

    #[test]
    fn test_teacher_unassign_offers_own_courses() {
        let teacher = TeacherDto {
            id: Some(2),
            courses: Some(vec![CourseDto {
                id: Some(11),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let mut detail = loaded(teacher.into_any());
        match detail.handle_input(key(KeyCode::Char('u'))) {
            ModalAction::OpenPicker {
                purpose,
                items: Some(items),
            } => {
                assert_eq!(purpose, PickPurpose::CourseToLeave { teacher_id: 2 });
                assert_eq!(items.len(), 1);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_picker_maps_pick_to_association() {
        let students = vec![
            StudentDto {
                id: Some(5),
                ..Default::default()
            }
            .into_any(),
            StudentDto {
                id: Some(6),
                ..Default::default()
            }
            .into_any(),
        ];
        let mut picker = PickerModal::new(PickPurpose::StudentForCourse { course_id: 1 }, Some(students));
        assert!(!picker.loading);

        picker.handle_input(key(KeyCode::Down));
        picker.handle_input(key(KeyCode::Down));
        assert_eq!(picker.selected, 1);
        assert_eq!(
            picker.handle_input(key(KeyCode::Enter)),
            ModalAction::Associate(Association::Enroll {
                student_id: 6,
                course_id: 1
            })
        );
    }

    #[test]
    fn test_editor_typing_and_save() {
        let mut editor = EditorModal::new(AnyForm::create(EntityKind::Teacher));
        for c in "Ada".chars() {
            editor.handle_input(key(KeyCode::Char(c)));
        }
        editor.handle_input(key(KeyCode::Backspace));
        assert_eq!(editor.form.field(0), Some("Ad"));

        assert_eq!(editor.handle_input(key(KeyCode::Enter)), ModalAction::None);
        assert_eq!(editor.handle_input(key(KeyCode::Enter)), ModalAction::None);
        assert_eq!(editor.focus, 2);
        assert_eq!(editor.handle_input(key(KeyCode::Enter)), ModalAction::Save);

        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(editor.handle_input(ctrl_s), ModalAction::Save);
        assert_eq!(editor.title(), " New teacher ");
    }

    #[test]
    fn test_editor_errors_clear_on_next_edit() {
        let mut editor = EditorModal::new(AnyForm::create(EntityKind::Teacher));
        editor.outcome = SaveOutcome::Loading;
        editor.handle_input(key(KeyCode::Char('x')));
        assert_eq!(editor.form.field(0), Some(""));

        editor.outcome = SaveOutcome::Error(vec!["All fields are required.".to_string()]);
        assert_eq!(editor.errors().len(), 1);
        editor.handle_input(key(KeyCode::Char('A')));
        assert!(editor.errors().is_empty());
        assert_eq!(editor.form.field(0), Some("A"));
    }

    #[test]
    fn test_confirm_delete() {
        let mut confirm = ConfirmModal {
            prompt: "Delete?".to_string(),
            kind: EntityKind::Student,
            id: 9,
        };
        assert_eq!(
            confirm.handle_input(key(KeyCode::Char('y'))),
            ModalAction::Delete {
                kind: EntityKind::Student,
                id: 9
            }
        );
        assert_eq!(confirm.handle_input(key(KeyCode::Esc)), ModalAction::Close);
    }
}

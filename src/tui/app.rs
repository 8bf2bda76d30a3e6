//! Application state for the TUI
//!
//! # Architecture
//!
//! ```text
//!   key event ──► handle_key_event ──► controller command ──► FetchTicket
//!                                                                │
//!                                              tokio::spawn(port.fetch_page)
//!                                                                │
//!   draw ◄── App state ◄── App::handle_message ◄── mpsc ◄── AppMessage
//! ```
//!
//! The render loop never awaits the backend. Every remote call runs on a
//! spawned task and reports back as an [`AppMessage`]; page results carry
//! their ticket so the controller can discard stale ones.

use crate::api::dto::{CourseDto, StudentDto, TeacherDto};
use crate::api::{RemoteFilter, SchoolClient};
use crate::config::Config;
use crate::detail::{self, Association, DeleteOutcome};
use crate::editor::{AnyForm, SaveOutcome};
use crate::entity::{AnyEntity, Entity, EntityKind};
use crate::logging::LogBuffer;
use crate::paging::{
    fetch_all, ControllerState, FetchError, FetchTicket, FilterPort, ListRow, Page,
    PagedSearchController, Phase,
};
use crate::tui::components::Toast;
use crate::tui::modal::{
    ConfirmModal, DetailModal, EditorModal, Modal, ModalAction, PickPurpose, PickerModal,
};
use crate::tui::theme::Theme;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Results of background work, delivered to the event loop
#[derive(Debug)]
pub enum AppMessage {
    TeacherPage(FetchTicket, Result<Page<TeacherDto>, FetchError>),
    CoursePage(FetchTicket, Result<Page<CourseDto>, FetchError>),
    StudentPage(FetchTicket, Result<Page<StudentDto>, FetchError>),
    DetailLoaded {
        kind: EntityKind,
        id: i64,
        result: Result<AnyEntity, String>,
    },
    PickerLoaded {
        purpose: PickPurpose,
        result: Result<Vec<AnyEntity>, String>,
    },
    Saved {
        kind: EntityKind,
        was_edit: bool,
        outcome: SaveOutcome<AnyEntity>,
    },
    Deleted {
        kind: EntityKind,
        id: i64,
        outcome: DeleteOutcome,
    },
    Associated {
        association: Association,
        result: Result<&'static str, String>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Search bar
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SearchBar {
    pub text: String,
    pub focused: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// List tabs
// ─────────────────────────────────────────────────────────────────────────────

/// One rendered list line
#[derive(Debug, Clone, PartialEq)]
pub enum RowView {
    Item { id: Option<i64>, label: String },
    LoadingFooter,
}

/// Object-safe view of a [`ListTab`] so the three tabs can be handled alike
pub trait ListPane {
    fn kind(&self) -> EntityKind;
    fn search(&self) -> &SearchBar;
    fn search_mut(&mut self) -> &mut SearchBar;
    fn phase(&self) -> Phase;
    fn has_loaded(&self) -> bool;
    fn rows(&self) -> Vec<RowView>;
    fn item_count(&self) -> usize;
    fn shows_no_results(&self) -> bool;
    fn selected(&self) -> usize;
    fn selected_entity(&self) -> Option<AnyEntity>;

    /// First load, if the tab has never loaded
    fn ensure_loaded(&mut self, tx: &mpsc::Sender<AppMessage>);
    fn submit_search(&mut self, tx: &mpsc::Sender<AppMessage>);
    fn refresh(&mut self, tx: &mpsc::Sender<AppMessage>);
    /// Move the selection; landing on the last row asks for the next page
    fn move_selection(&mut self, delta: isize, tx: &mpsc::Sender<AppMessage>);
    fn select_last(&mut self, tx: &mpsc::Sender<AppMessage>);
    fn consume_error(&mut self) -> Option<String>;
}

/// A paged, searchable list of one entity kind
///
/// Commands go to the controller; everything drawn comes from the `view`
/// snapshot it publishes.
pub struct ListTab<E> {
    pub controller: PagedSearchController<E>,
    view: watch::Receiver<ControllerState<E>>,
    port: Arc<dyn FilterPort<E>>,
    wrap: fn(FetchTicket, Result<Page<E>, FetchError>) -> AppMessage,
    pub search: SearchBar,
    pub selected: usize,
}

impl<E: Entity> ListTab<E> {
    pub fn new(
        port: Arc<dyn FilterPort<E>>,
        page_size: u32,
        wrap: fn(FetchTicket, Result<Page<E>, FetchError>) -> AppMessage,
    ) -> Self {
        let controller = PagedSearchController::new(E::KIND.plural(), page_size);
        let view = controller.subscribe();
        Self {
            controller,
            view,
            port,
            wrap,
            search: SearchBar::default(),
            selected: 0,
        }
    }

    fn spawn(&self, ticket: Option<FetchTicket>, tx: &mpsc::Sender<AppMessage>) {
        let Some(ticket) = ticket else {
            return;
        };
        let port = Arc::clone(&self.port);
        let wrap = self.wrap;
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = port.fetch_page(ticket.request.clone()).await;
            let _ = tx.send(wrap(ticket, result)).await;
        });
    }

    /// Apply a page result; stale results leave everything untouched
    pub fn complete(&mut self, ticket: &FetchTicket, result: Result<Page<E>, FetchError>) {
        self.controller.complete(ticket, result);
        let count = self.item_count();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    fn request_more_at_end(&mut self, tx: &mpsc::Sender<AppMessage>) {
        let count = self.item_count();
        if count > 0 && self.selected + 1 == count {
            let ticket = self.controller.load_more();
            self.spawn(ticket, tx);
        }
    }
}

impl<E: Entity> ListPane for ListTab<E> {
    fn kind(&self) -> EntityKind {
        E::KIND
    }

    fn search(&self) -> &SearchBar {
        &self.search
    }

    fn search_mut(&mut self) -> &mut SearchBar {
        &mut self.search
    }

    fn phase(&self) -> Phase {
        self.view.borrow().phase()
    }

    fn has_loaded(&self) -> bool {
        self.controller.epoch() > 0
    }

    fn rows(&self) -> Vec<RowView> {
        self.view
            .borrow()
            .rows()
            .map(|row| match row {
                ListRow::Item(item) => RowView::Item {
                    id: item.id(),
                    label: item.row_label(),
                },
                ListRow::LoadingFooter => RowView::LoadingFooter,
            })
            .collect()
    }

    fn item_count(&self) -> usize {
        self.view.borrow().items.len()
    }

    fn shows_no_results(&self) -> bool {
        self.view.borrow().shows_no_results()
    }

    fn selected(&self) -> usize {
        self.selected
    }

    fn selected_entity(&self) -> Option<AnyEntity> {
        self.view
            .borrow()
            .items
            .get(self.selected)
            .cloned()
            .map(Entity::into_any)
    }

    fn ensure_loaded(&mut self, tx: &mpsc::Sender<AppMessage>) {
        if self.controller.epoch() == 0 {
            let ticket = self.controller.set_query_forced("");
            self.spawn(Some(ticket), tx);
        }
    }

    fn submit_search(&mut self, tx: &mpsc::Sender<AppMessage>) {
        let ticket = self.controller.set_query(&self.search.text);
        if ticket.is_some() {
            self.selected = 0;
        }
        self.spawn(ticket, tx);
    }

    fn refresh(&mut self, tx: &mpsc::Sender<AppMessage>) {
        let ticket = self.controller.refresh();
        self.selected = 0;
        self.spawn(Some(ticket), tx);
    }

    fn move_selection(&mut self, delta: isize, tx: &mpsc::Sender<AppMessage>) {
        let count = self.item_count();
        if count == 0 {
            return;
        }
        let target = self.selected.saturating_add_signed(delta).min(count - 1);
        self.selected = target;
        self.request_more_at_end(tx);
    }

    fn select_last(&mut self, tx: &mpsc::Sender<AppMessage>) {
        self.selected = self.item_count().saturating_sub(1);
        self.request_more_at_end(tx);
    }

    fn consume_error(&mut self) -> Option<String> {
        self.controller.consume_error()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App
// ─────────────────────────────────────────────────────────────────────────────

pub struct App {
    pub client: Arc<SchoolClient>,
    pub config: Config,
    pub theme: Theme,
    pub log_buffer: LogBuffer,
    pub show_logs: bool,

    pub active: EntityKind,
    pub teachers: ListTab<TeacherDto>,
    pub courses: ListTab<CourseDto>,
    pub students: ListTab<StudentDto>,

    /// Topmost modal receives input
    pub modals: Vec<Modal>,
    pub toast: Option<Toast>,

    tx: mpsc::Sender<AppMessage>,
    pub animation_frame: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        client: Arc<SchoolClient>,
        log_buffer: LogBuffer,
        config: Config,
        tx: mpsc::Sender<AppMessage>,
    ) -> Self {
        let page_size = config.page_size;
        let teachers = ListTab::new(
            Arc::new(RemoteFilter::<TeacherDto>::new(Arc::clone(&client))),
            page_size,
            AppMessage::TeacherPage,
        );
        let courses = ListTab::new(
            Arc::new(RemoteFilter::<CourseDto>::new(Arc::clone(&client))),
            page_size,
            AppMessage::CoursePage,
        );
        let students = ListTab::new(
            Arc::new(RemoteFilter::<StudentDto>::new(Arc::clone(&client))),
            page_size,
            AppMessage::StudentPage,
        );

        Self {
            client,
            config,
            theme: Theme::default(),
            log_buffer,
            show_logs: true,
            active: EntityKind::Teacher,
            teachers,
            courses,
            students,
            modals: Vec::new(),
            toast: None,
            tx,
            animation_frame: 0,
            should_quit: false,
        }
    }

    pub fn pane(&self, kind: EntityKind) -> &dyn ListPane {
        match kind {
            EntityKind::Teacher => &self.teachers,
            EntityKind::Course => &self.courses,
            EntityKind::Student => &self.students,
        }
    }

    pub fn pane_mut(&mut self, kind: EntityKind) -> &mut dyn ListPane {
        match kind {
            EntityKind::Teacher => &mut self.teachers,
            EntityKind::Course => &mut self.courses,
            EntityKind::Student => &mut self.students,
        }
    }

    pub fn active_pane(&self) -> &dyn ListPane {
        self.pane(self.active)
    }

    /// Load the first tab; the others load when first shown
    pub fn start(&mut self) {
        let tx = self.tx.clone();
        self.pane_mut(self.active).ensure_loaded(&tx);
    }

    pub fn set_tab(&mut self, kind: EntityKind) {
        self.active = kind;
        let tx = self.tx.clone();
        self.pane_mut(kind).ensure_loaded(&tx);
    }

    pub fn refresh_list(&mut self, kind: EntityKind) {
        let tx = self.tx.clone();
        let pane = self.pane_mut(kind);
        // Lists that never loaded pick up the change on first view
        if pane.has_loaded() {
            pane.refresh(&tx);
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let tx = self.tx.clone();
        self.pane_mut(self.active).move_selection(delta, &tx);
    }

    pub fn select_last(&mut self) {
        let tx = self.tx.clone();
        self.pane_mut(self.active).select_last(&tx);
    }

    pub fn refresh_active(&mut self) {
        let tx = self.tx.clone();
        self.pane_mut(self.active).refresh(&tx);
    }

    pub fn submit_search(&mut self) {
        let tx = self.tx.clone();
        let pane = self.pane_mut(self.active);
        pane.search_mut().focused = false;
        pane.submit_search(&tx);
    }

    /// Empty the search text and search for everything
    pub fn clear_search(&mut self) {
        let tx = self.tx.clone();
        let pane = self.pane_mut(self.active);
        pane.search_mut().text.clear();
        pane.submit_search(&tx);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Animation and toasts
    // ─────────────────────────────────────────────────────────────────────────

    pub fn tick_animation(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];
        SPINNER[self.animation_frame % SPINNER.len()]
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::error(message));
    }

    pub fn clear_expired_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    /// Show list errors once, then consume them
    pub fn surface_list_errors(&mut self) {
        for kind in EntityKind::ALL {
            if let Some(error) = self.pane_mut(kind).consume_error() {
                tracing::debug!("Surfacing {} error: {}", kind.plural(), error);
                self.show_error(error);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────

    pub fn open_detail(&mut self) {
        let Some(entity) = self.active_pane().selected_entity() else {
            return;
        };
        let Some(id) = entity.id() else {
            self.show_error("Selected entry has no id.");
            return;
        };
        self.modals.push(Modal::Detail(DetailModal::loading(entity.kind(), id)));
        self.spawn_detail_load(entity.kind(), id);
    }

    pub fn open_editor(&mut self, form: AnyForm) {
        self.modals.push(Modal::Editor(EditorModal::new(form)));
    }

    /// Route a key to the topmost modal and act on the result
    pub fn handle_modal_key(&mut self, key: crossterm::event::KeyEvent) {
        let Some(modal) = self.modals.last_mut() else {
            return;
        };
        let action = modal.handle_input(key);
        self.apply_modal_action(action);
    }

    fn apply_modal_action(&mut self, action: ModalAction) {
        match action {
            ModalAction::None => {}
            ModalAction::Close => {
                self.modals.pop();
            }
            ModalAction::Reload => {
                if let Some(Modal::Detail(detail)) = self.modals.last_mut() {
                    detail.error = None;
                    let (kind, id) = (detail.kind, detail.id);
                    self.spawn_detail_load(kind, id);
                }
            }
            ModalAction::Edit(entity) => self.open_editor(AnyForm::edit(&entity)),
            ModalAction::ConfirmDelete { kind, id, label } => {
                self.modals.push(Modal::Confirm(ConfirmModal {
                    prompt: format!("Delete {} \"{}\"?", kind.singular(), label),
                    kind,
                    id,
                }));
            }
            ModalAction::Delete { kind, id } => {
                self.modals.pop();
                self.spawn_delete(kind, id);
            }
            ModalAction::OpenPicker { purpose, items } => {
                let needs_fetch = items.is_none();
                self.modals.push(Modal::Picker(PickerModal::new(purpose, items)));
                if needs_fetch {
                    self.spawn_picker_load(purpose);
                }
            }
            ModalAction::Associate(association) => {
                if matches!(self.modals.last(), Some(Modal::Picker(_))) {
                    self.modals.pop();
                }
                self.spawn_association(association);
            }
            ModalAction::Save => {
                if let Some(Modal::Editor(editor)) = self.modals.last_mut() {
                    editor.outcome = SaveOutcome::Loading;
                    let form = editor.form.clone();
                    self.spawn_save(form);
                }
            }
            ModalAction::Notice(message) => self.show_toast(message),
        }
    }

    /// The detail modal for `kind`/`id`, wherever it sits in the stack
    fn detail_modal_mut(&mut self, kind: EntityKind, id: i64) -> Option<&mut DetailModal> {
        self.modals.iter_mut().rev().find_map(|modal| match modal {
            Modal::Detail(detail) if detail.kind == kind && detail.id == id => Some(detail),
            _ => None,
        })
    }

    /// Reload every open detail modal (relations may have changed)
    fn reload_open_details(&mut self) {
        let open: Vec<(EntityKind, i64)> = self
            .modals
            .iter()
            .filter_map(|modal| match modal {
                Modal::Detail(detail) => Some((detail.kind, detail.id)),
                _ => None,
            })
            .collect();
        for (kind, id) in open {
            self.spawn_detail_load(kind, id);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Background tasks
    // ─────────────────────────────────────────────────────────────────────────

    fn spawn_detail_load(&self, kind: EntityKind, id: i64) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = detail::load_any(&client, kind, id).await;
            let _ = tx.send(AppMessage::DetailLoaded { kind, id, result }).await;
        });
    }

    fn spawn_picker_load(&self, purpose: PickPurpose) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let page_size = self.config.picker_page_size;
        tokio::spawn(async move {
            let result = match purpose.source_kind() {
                EntityKind::Teacher => pick_all::<TeacherDto>(client, page_size).await,
                EntityKind::Course => pick_all::<CourseDto>(client, page_size).await,
                EntityKind::Student => pick_all::<StudentDto>(client, page_size).await,
            };
            let _ = tx.send(AppMessage::PickerLoaded { purpose, result }).await;
        });
    }

    fn spawn_save(&self, form: AnyForm) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = form.save(&client).await;
            let message = AppMessage::Saved {
                kind: form.kind(),
                was_edit: form.is_edit(),
                outcome,
            };
            let _ = tx.send(message).await;
        });
    }

    fn spawn_delete(&self, kind: EntityKind, id: i64) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = detail::delete(&client, kind, id).await;
            let _ = tx.send(AppMessage::Deleted { kind, id, outcome }).await;
        });
    }

    fn spawn_association(&self, association: Association) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = association.apply(&client).await;
            let _ = tx
                .send(AppMessage::Associated {
                    association,
                    result,
                })
                .await;
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Message handling
    // ─────────────────────────────────────────────────────────────────────────

    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::TeacherPage(ticket, result) => self.teachers.complete(&ticket, result),
            AppMessage::CoursePage(ticket, result) => self.courses.complete(&ticket, result),
            AppMessage::StudentPage(ticket, result) => self.students.complete(&ticket, result),

            AppMessage::DetailLoaded { kind, id, result } => {
                let Some(detail) = self.detail_modal_mut(kind, id) else {
                    tracing::debug!("Detail for {} {} arrived after close", kind, id);
                    return;
                };
                match result {
                    Ok(entity) => {
                        detail.entity = Some(entity);
                        detail.error = None;
                    }
                    Err(error) => {
                        detail.error = Some(error.clone());
                        self.show_error(error);
                    }
                }
            }

            AppMessage::PickerLoaded { purpose, result } => {
                let picker = self.modals.iter_mut().rev().find_map(|modal| match modal {
                    Modal::Picker(picker) if picker.purpose == purpose => Some(picker),
                    _ => None,
                });
                let Some(picker) = picker else {
                    return;
                };
                picker.loading = false;
                match result {
                    Ok(items) => picker.items = items,
                    Err(error) => {
                        picker.error = Some(error.clone());
                        self.show_error(error);
                    }
                }
            }

            AppMessage::Saved {
                kind,
                was_edit,
                outcome,
            } => self.handle_saved(kind, was_edit, outcome),

            AppMessage::Deleted { kind, id, outcome } => {
                let message = outcome.message(kind);
                if outcome.is_deleted() {
                    self.modals.retain(
                        |modal| !matches!(modal, Modal::Detail(d) if d.kind == kind && d.id == id),
                    );
                    self.show_toast(message);
                    self.refresh_list(kind);
                } else {
                    self.show_error(message);
                }
            }

            AppMessage::Associated {
                association,
                result,
            } => match result {
                Ok(notice) => {
                    self.show_toast(notice);
                    self.reload_open_details();
                    for kind in association.affected() {
                        self.refresh_list(kind);
                    }
                }
                Err(error) => self.show_error(error),
            },
        }
    }

    fn handle_saved(&mut self, kind: EntityKind, was_edit: bool, outcome: SaveOutcome<AnyEntity>) {
        match outcome {
            SaveOutcome::Success(saved) => {
                if matches!(self.modals.last(), Some(Modal::Editor(_))) {
                    self.modals.pop();
                }
                let verb = if was_edit { "updated" } else { "created" };
                self.show_toast(format!("{} {}.", kind.label(), verb));
                self.refresh_list(kind);
                if let Some(id) = saved.id() {
                    if self.detail_modal_mut(kind, id).is_some() {
                        self.spawn_detail_load(kind, id);
                    }
                }
            }
            SaveOutcome::Error(errors) => {
                if let Some(first) = errors.first() {
                    self.show_error(first.clone());
                }
                if let Some(Modal::Editor(editor)) = self.modals.last_mut() {
                    editor.outcome = SaveOutcome::Error(errors);
                }
            }
            SaveOutcome::Idle | SaveOutcome::Loading => {}
        }
    }
}

/// Picker contents: one large unfiltered page
async fn pick_all<E: Entity>(client: Arc<SchoolClient>, page_size: u32) -> Result<Vec<AnyEntity>, String> {
    let port = RemoteFilter::<E>::new(client);
    fetch_all(&port, page_size)
        .await
        .map(|items| items.into_iter().map(Entity::into_any).collect())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::{FetchKind, PageRequest};
    use std::time::Duration;

    fn test_app() -> (App, mpsc::Receiver<AppMessage>) {
        let (tx, rx) = mpsc::channel(64);
        // Nothing listens on the discard port, so any spawned fetch fails fast
        let client = Arc::new(SchoolClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap());
        let app = App::new(client, LogBuffer::new(), Config::default(), tx);
        (app, rx)
    }

    fn teacher(id: i64) -> TeacherDto {
        TeacherDto {
            id: Some(id),
            first_name: Some(format!("T{}", id)),
            ..Default::default()
        }
    }

    fn in_flight(app: &App) -> FetchTicket {
        app.teachers.controller.in_flight().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_start_loads_only_the_active_tab() {
        let (mut app, _rx) = test_app();
        app.start();

        assert_eq!(app.teachers.phase(), Phase::InitialLoading);
        assert_eq!(app.courses.phase(), Phase::Idle);

        app.set_tab(EntityKind::Course);
        assert_eq!(app.courses.phase(), Phase::InitialLoading);
    }

    #[tokio::test]
    async fn test_tab_view_follows_controller_commands() {
        let (mut app, _rx) = test_app();
        assert!(app.teachers.rows().is_empty());

        let ticket = app.teachers.controller.set_query_forced("ada");
        assert_eq!(app.teachers.phase(), Phase::InitialLoading);

        app.teachers.complete(&ticket, Ok(Page::new(vec![teacher(7)], false)));
        assert_eq!(app.teachers.phase(), Phase::Idle);
        assert_eq!(app.teachers.item_count(), 1);
        assert_eq!(
            app.teachers.selected_entity().and_then(|e| e.id()),
            Some(7)
        );
    }

    #[tokio::test]
    async fn test_page_message_fills_rows() {
        let (mut app, _rx) = test_app();
        app.start();
        let ticket = in_flight(&app);

        app.handle_message(AppMessage::TeacherPage(
            ticket,
            Ok(Page::new(vec![teacher(1), teacher(2)], true)),
        ));

        let rows = app.teachers.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            RowView::Item {
                id: Some(1),
                label: "T1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_selecting_last_row_requests_next_page() {
        let (mut app, _rx) = test_app();
        app.start();
        let ticket = in_flight(&app);
        app.handle_message(AppMessage::TeacherPage(
            ticket,
            Ok(Page::new(vec![teacher(1), teacher(2)], true)),
        ));

        app.move_selection(1);

        assert_eq!(app.teachers.selected(), 1);
        assert_eq!(app.teachers.phase(), Phase::LoadingMore);
        assert_eq!(app.teachers.rows().last(), Some(&RowView::LoadingFooter));
        assert_eq!(in_flight(&app).kind, FetchKind::More);
    }

    #[tokio::test]
    async fn test_stale_page_is_ignored() {
        let (mut app, _rx) = test_app();
        app.start();
        let old = in_flight(&app);

        app.teachers.search.text = "ada".to_string();
        app.submit_search();

        app.handle_message(AppMessage::TeacherPage(old, Ok(Page::new(vec![teacher(9)], false))));
        assert_eq!(app.teachers.item_count(), 0);
        assert_eq!(app.teachers.phase(), Phase::InitialLoading);
    }

    #[tokio::test]
    async fn test_list_error_becomes_one_toast() {
        let (mut app, _rx) = test_app();
        app.start();
        let ticket = in_flight(&app);
        app.handle_message(AppMessage::TeacherPage(
            ticket,
            Err(FetchError::new("Failed to load teachers. Please try again.")),
        ));

        app.surface_list_errors();
        assert_eq!(
            app.toast.as_ref().map(|t| t.message.as_str()),
            Some("Failed to load teachers. Please try again.")
        );

        app.toast = None;
        app.surface_list_errors();
        assert!(app.toast.is_none());
    }

    #[tokio::test]
    async fn test_detail_flow_and_delete() {
        let (mut app, _rx) = test_app();
        app.start();
        let ticket = in_flight(&app);
        app.handle_message(AppMessage::TeacherPage(ticket, Ok(Page::new(vec![teacher(4)], false))));

        app.open_detail();
        assert!(matches!(app.modals.last(), Some(Modal::Detail(d)) if d.id == 4));

        app.handle_message(AppMessage::DetailLoaded {
            kind: EntityKind::Teacher,
            id: 4,
            result: Ok(teacher(4).into_any()),
        });
        assert!(matches!(app.modals.last(), Some(Modal::Detail(d)) if d.entity.is_some()));

        app.handle_message(AppMessage::Deleted {
            kind: EntityKind::Teacher,
            id: 4,
            outcome: DeleteOutcome::Deleted,
        });
        assert!(app.modals.is_empty());
        assert_eq!(
            app.toast.as_ref().map(|t| t.message.as_str()),
            Some("Teacher deleted successfully.")
        );
        // The list reloads after the deletion
        assert_eq!(app.teachers.phase(), Phase::InitialLoading);
    }

    #[tokio::test]
    async fn test_blocked_delete_keeps_detail_open() {
        let (mut app, _rx) = test_app();
        app.modals.push(Modal::Detail(DetailModal::loading(EntityKind::Course, 2)));

        app.handle_message(AppMessage::Deleted {
            kind: EntityKind::Course,
            id: 2,
            outcome: DeleteOutcome::Blocked("Cannot delete course due to relations.".to_string()),
        });

        assert_eq!(app.modals.len(), 1);
        assert!(app.toast.as_ref().is_some_and(|t| t.is_error()));
    }

    #[tokio::test]
    async fn test_save_error_stays_in_editor() {
        let (mut app, _rx) = test_app();
        app.open_editor(AnyForm::create(EntityKind::Student));

        app.handle_message(AppMessage::Saved {
            kind: EntityKind::Student,
            was_edit: false,
            outcome: SaveOutcome::Error(vec!["Network error: reset".to_string()]),
        });

        match app.modals.last() {
            Some(Modal::Editor(editor)) => {
                assert!(!editor.outcome.is_loading());
                assert_eq!(editor.errors(), ["Network error: reset".to_string()]);
            }
            _ => panic!("editor should stay open"),
        }
    }

    #[tokio::test]
    async fn test_picker_load_fills_matching_picker() {
        let (mut app, _rx) = test_app();
        let purpose = PickPurpose::TeacherForCourse { course_id: 1 };
        app.modals.push(Modal::Picker(PickerModal::new(purpose, None)));

        app.handle_message(AppMessage::PickerLoaded {
            purpose,
            result: Ok(vec![teacher(3).into_any()]),
        });

        match app.modals.last() {
            Some(Modal::Picker(picker)) => {
                assert!(!picker.loading);
                assert_eq!(picker.items.len(), 1);
            }
            _ => panic!("picker should be open"),
        }
    }

    #[tokio::test]
    async fn test_association_success_refreshes_loaded_lists() {
        let (mut app, _rx) = test_app();
        app.start();
        let ticket = in_flight(&app);
        app.handle_message(AppMessage::TeacherPage(ticket, Ok(Page::new(vec![teacher(1)], false))));
        let epoch = app.teachers.controller.epoch();

        app.handle_message(AppMessage::Associated {
            association: Association::AssignTeacher {
                course_id: 1,
                teacher_id: 1,
            },
            result: Ok("Teacher associated successfully."),
        });

        assert_eq!(app.teachers.controller.epoch(), epoch + 1);
        // The course tab never loaded, so it stays idle until shown
        assert_eq!(app.courses.controller.epoch(), 0);
    }

    #[tokio::test]
    async fn test_clear_search_submits_empty_query() {
        let (mut app, _rx) = test_app();
        app.start();
        app.teachers.search.text = "ada".to_string();
        app.submit_search();
        assert_eq!(
            in_flight(&app).request,
            PageRequest::new(0, 20, Some("ada".to_string()))
        );

        app.clear_search();
        assert_eq!(in_flight(&app).request.filter_text, None);
    }
}

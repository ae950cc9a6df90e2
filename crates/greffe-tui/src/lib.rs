// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use greffe_app::{
    AppCommand, AppMode, AppState, DirectoryView, EditorEvent, FILTER_CABINET,
    FILTER_CONVENTIONNE, FILTER_REGION, FILTER_VILLE, FilterValue, FormErrors, Lawyer, LawyerField,
    LawyerFormInput, LawyerId, LawyerInput, LawyerSuggestions, Notice, ParametresBackend,
    PortfolioTransfer, ReferenceListEditor, ReferenceListKind, TRANSFER_HISTORY_DAYS, TabKind,
    TemplateInfo, TransferHistory, TransferOutcome, TransferRequest, highlight_segments,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, warn};

const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const SUGGESTION_LIMIT: usize = 5;
const FILTER_MARK_ACTIVE: &str = "▼";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LawyerColumn {
    label: &'static str,
    path: &'static str,
}

const LAWYER_COLUMNS: [LawyerColumn; 7] = [
    LawyerColumn {
        label: "nom",
        path: "nom",
    },
    LawyerColumn {
        label: "prénom",
        path: "prenom",
    },
    LawyerColumn {
        label: "cabinet",
        path: "cabinet",
    },
    LawyerColumn {
        label: "région",
        path: "region",
    },
    LawyerColumn {
        label: "ville",
        path: "adresse.ville",
    },
    LawyerColumn {
        label: "interventions",
        path: "villesIntervention",
    },
    LawyerColumn {
        label: "conv.",
        path: "conventionne",
    },
];

pub trait AppRuntime {
    fn parametres(&mut self) -> &mut dyn ParametresBackend;
    fn load_lawyers(&mut self) -> Result<Vec<Lawyer>>;
    fn save_lawyer(&mut self, id: Option<LawyerId>, input: &LawyerInput) -> Result<Lawyer>;
    fn delete_lawyer(&mut self, id: LawyerId) -> Result<()>;
    fn load_suggestions(&mut self) -> Result<LawyerSuggestions>;
    fn load_templates(&mut self) -> Result<Vec<TemplateInfo>>;
    fn download_template(&mut self, name: &str) -> Result<PathBuf>;
    fn restore_template(&mut self, name: &str) -> Result<()>;
    fn spawn_transfer(&mut self, request: TransferRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self
            .parametres()
            .transfer_portfolio(&request)
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::TransferFinished(result))
            .map_err(|_| anyhow::anyhow!("transfer event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    TransferFinished(std::result::Result<TransferOutcome, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfirmAction {
    DeleteValue(ReferenceListKind),
    DeleteLawyer { id: LawyerId, name: String },
    RestoreTemplate(String),
}

impl ConfirmAction {
    fn prompt(&self, view_data: &ViewData) -> String {
        match self {
            Self::DeleteValue(kind) => {
                let label = view_data
                    .editor(*kind)
                    .pending_delete()
                    .map(|pending| pending.label.clone())
                    .unwrap_or_default();
                format!("delete {label:?} from {}?", kind.label())
            }
            Self::DeleteLawyer { name, .. } => format!("delete {name} from the directory?"),
            Self::RestoreTemplate(name) => {
                format!("restore the default version of {name}? the custom file is discarded")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferStep {
    Source,
    Target,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TransferUiState {
    step: TransferStep,
    cursor: usize,
    source: Option<String>,
    target: Option<String>,
}

impl Default for TransferUiState {
    fn default() -> Self {
        Self {
            step: TransferStep::Source,
            cursor: 0,
            source: None,
            target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LawyerFormUiState {
    editing: Option<LawyerId>,
    input: LawyerFormInput,
    field_index: usize,
    errors: FormErrors,
}

impl LawyerFormUiState {
    fn field(&self) -> LawyerField {
        LawyerField::ALL[self.field_index.min(LawyerField::ALL.len() - 1)]
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    lawyers: DirectoryView<Lawyer>,
    lawyers_error: Option<String>,
    lawyer_cursor: usize,
    lawyer_column: usize,
    suggestions: LawyerSuggestions,
    editors: Vec<ReferenceListEditor>,
    list_index: usize,
    value_cursor: usize,
    value_input: String,
    transfer: PortfolioTransfer,
    transfer_ui: Option<TransferUiState>,
    history: TransferHistory,
    history_visible: bool,
    templates: Vec<TemplateInfo>,
    templates_error: Option<String>,
    template_cursor: usize,
    form: Option<LawyerFormUiState>,
    confirm: Option<ConfirmAction>,
    help_visible: bool,
    status_token: u64,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            lawyers: DirectoryView::default(),
            lawyers_error: None,
            lawyer_cursor: 0,
            lawyer_column: 0,
            suggestions: LawyerSuggestions::default(),
            editors: ReferenceListKind::ALL
                .iter()
                .map(|kind| ReferenceListEditor::new(*kind))
                .collect(),
            list_index: 0,
            value_cursor: 0,
            value_input: String::new(),
            transfer: PortfolioTransfer::new(),
            transfer_ui: None,
            history: TransferHistory::default(),
            history_visible: false,
            templates: Vec::new(),
            templates_error: None,
            template_cursor: 0,
            form: None,
            confirm: None,
            help_visible: false,
            status_token: 0,
        }
    }
}

impl ViewData {
    fn active_kind(&self) -> ReferenceListKind {
        ReferenceListKind::ALL[self.list_index % ReferenceListKind::ALL.len()]
    }

    fn editor(&self, kind: ReferenceListKind) -> &ReferenceListEditor {
        let index = ReferenceListKind::ALL
            .iter()
            .position(|candidate| *candidate == kind)
            .unwrap_or(0);
        &self.editors[index]
    }

    fn editor_mut(&mut self, kind: ReferenceListKind) -> &mut ReferenceListEditor {
        let index = ReferenceListKind::ALL
            .iter()
            .position(|candidate| *candidate == kind)
            .unwrap_or(0);
        &mut self.editors[index]
    }

    fn active_editor(&self) -> &ReferenceListEditor {
        self.editor(self.active_kind())
    }

    fn selected_lawyer(&self) -> Option<Lawyer> {
        self.lawyers
            .visible()
            .get(self.lawyer_cursor)
            .map(|lawyer| (*lawyer).clone())
    }

    fn clamp_cursors(&mut self) {
        self.lawyer_cursor = clamp_cursor(self.lawyer_cursor, self.lawyers.visible().len());
        self.value_cursor = clamp_cursor(self.value_cursor, self.active_editor().items().len());
        self.template_cursor = clamp_cursor(self.template_cursor, self.templates.len());
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    load_everything(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn load_everything<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    reload_lawyers(state, runtime, view_data, internal_tx);
    for index in 0..view_data.editors.len() {
        let events = view_data.editors[index].load(runtime.parametres());
        apply_editor_events(state, view_data, internal_tx, events);
    }
    reload_templates(state, runtime, view_data, internal_tx);
    view_data.clamp_cursors();
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::TransferFinished(result) => {
                let events = view_data
                    .transfer
                    .finish(result.map_err(anyhow::Error::msg));
                apply_editor_events(state, view_data, tx, events);
                if view_data.history_visible {
                    view_data.history.load(runtime.parametres());
                }
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn apply_editor_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: Vec<EditorEvent>,
) {
    for event in events {
        match event {
            EditorEvent::Notice(Notice::Success(message)) => {
                emit_status(state, view_data, internal_tx, message);
            }
            EditorEvent::Notice(Notice::Error(message)) => {
                emit_status(state, view_data, internal_tx, format!("error: {message}"));
            }
            EditorEvent::ItemMoved { to, .. } => view_data.value_cursor = to,
            other => debug!(event = ?other, "editor event"),
        }
    }
    view_data.clamp_cursors();
}

fn reload_lawyers<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.load_lawyers() {
        Ok(lawyers) => {
            view_data.lawyers.replace_source(lawyers);
            view_data.lawyers_error = None;
        }
        Err(error) => {
            warn!(error = %error, "lawyer load failed");
            let message = format!("could not load lawyers: {error:#}");
            view_data.lawyers.replace_source(Vec::new());
            view_data.lawyers_error = Some(message.clone());
            emit_status(state, view_data, internal_tx, message);
        }
    }
    match runtime.load_suggestions() {
        Ok(suggestions) => view_data.suggestions = suggestions,
        Err(error) => warn!(error = %error, "suggestion load failed"),
    }
    view_data.clamp_cursors();
}

fn reload_templates<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.load_templates() {
        Ok(templates) => {
            view_data.templates = templates;
            view_data.templates_error = None;
        }
        Err(error) => {
            warn!(error = %error, "template load failed");
            let message = format!("could not load templates: {error:#}");
            view_data.templates.clear();
            view_data.templates_error = Some(message.clone());
            emit_status(state, view_data, internal_tx, message);
        }
    }
    view_data.clamp_cursors();
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.history_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('H') | KeyCode::Char('q')) {
            view_data.history_visible = false;
        }
        return false;
    }

    if view_data.transfer_ui.is_some() {
        handle_transfer_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    match state.mode {
        AppMode::Confirm => {
            handle_confirm_key(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::Form => {
            handle_form_key(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::Search => {
            handle_search_key(state, view_data, key);
            false
        }
        AppMode::Input => {
            handle_input_key(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::Nav => handle_nav_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            view_data.help_visible = true;
            return false;
        }
        KeyCode::Tab => {
            if view_data.active_editor().is_reordering() {
                emit_status(state, view_data, internal_tx, "save (w) or cancel (esc) the new order first");
                return false;
            }
            state.dispatch(AppCommand::NextTab);
            return false;
        }
        KeyCode::BackTab => {
            if view_data.active_editor().is_reordering() {
                emit_status(state, view_data, internal_tx, "save (w) or cancel (esc) the new order first");
                return false;
            }
            state.dispatch(AppCommand::PrevTab);
            return false;
        }
        _ => {}
    }

    match state.active_tab {
        TabKind::Lawyers => handle_lawyers_key(state, runtime, view_data, internal_tx, key),
        TabKind::Settings => handle_settings_key(state, runtime, view_data, internal_tx, key),
        TabKind::Templates => handle_templates_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_lawyers_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.lawyer_cursor = view_data.lawyer_cursor.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.lawyer_cursor = view_data.lawyer_cursor.saturating_sub(1);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            view_data.lawyer_column = rotate(view_data.lawyer_column, LAWYER_COLUMNS.len(), -1);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            view_data.lawyer_column = rotate(view_data.lawyer_column, LAWYER_COLUMNS.len(), 1);
        }
        KeyCode::Char('s') => {
            let column = LAWYER_COLUMNS[view_data.lawyer_column];
            view_data.lawyers.select_sort(column.path);
            let direction = view_data.lawyers.query().sort.direction;
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("sorted by {} {}", column.label, direction.arrow()),
            );
        }
        KeyCode::Char('/') => {
            state.dispatch(AppCommand::EnterSearch);
        }
        KeyCode::Char('f') => {
            cycle_text_filter(state, view_data, internal_tx, FILTER_REGION, "region", "région");
        }
        KeyCode::Char('v') => {
            cycle_text_filter(
                state,
                view_data,
                internal_tx,
                FILTER_VILLE,
                "villesIntervention",
                "ville",
            );
        }
        KeyCode::Char('b') => {
            cycle_text_filter(state, view_data, internal_tx, FILTER_CABINET, "cabinet", "cabinet");
        }
        KeyCode::Char('c') => {
            let enabled = !view_data.lawyers.query().filters.flag(FILTER_CONVENTIONNE);
            view_data
                .lawyers
                .set_filter(FILTER_CONVENTIONNE, FilterValue::Flag(enabled));
            let label = if enabled {
                "conventionné only"
            } else {
                "conventionné: all"
            };
            emit_status(state, view_data, internal_tx, label);
        }
        KeyCode::Char('x') => {
            view_data.lawyers.clear_filters();
            emit_status(state, view_data, internal_tx, "filters cleared");
        }
        KeyCode::Char('n') => {
            open_lawyer_form(state, view_data, None, LawyerFormInput::default());
        }
        KeyCode::Char('e') => {
            let Some(lawyer) = view_data.selected_lawyer() else {
                emit_status(state, view_data, internal_tx, "no lawyer selected");
                return;
            };
            open_lawyer_form(
                state,
                view_data,
                Some(lawyer.id),
                LawyerFormInput::from_lawyer(&lawyer),
            );
        }
        KeyCode::Char('D') => {
            let Some(lawyer) = view_data.selected_lawyer() else {
                emit_status(state, view_data, internal_tx, "no lawyer selected");
                return;
            };
            view_data.confirm = Some(ConfirmAction::DeleteLawyer {
                id: lawyer.id,
                name: lawyer.full_name(),
            });
            state.dispatch(AppCommand::OpenConfirm);
        }
        KeyCode::Char('r') => {
            reload_lawyers(state, runtime, view_data, internal_tx);
            if view_data.lawyers_error.is_none() {
                let count = view_data.lawyers.source().len();
                emit_status(state, view_data, internal_tx, format!("{count} lawyers loaded"));
            }
        }
        _ => {}
    }
    view_data.clamp_cursors();
}

fn cycle_text_filter(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    name: &str,
    path: &str,
    label: &str,
) {
    let options = view_data.lawyers.options(path);
    let current = view_data.lawyers.query().filters.text(name).map(str::to_owned);
    let next = match current {
        None => options.first().cloned(),
        Some(current) => options
            .iter()
            .position(|option| *option == current)
            .and_then(|index| options.get(index + 1))
            .cloned(),
    };
    let message = match next {
        Some(value) => {
            let message = format!("{label}: {value}");
            view_data.lawyers.set_filter(name, FilterValue::Text(value));
            message
        }
        None => {
            view_data.lawyers.clear_filter(name);
            format!("{label}: all")
        }
    };
    view_data.lawyer_cursor = 0;
    emit_status(state, view_data, internal_tx, message);
}

fn handle_search_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    let mut term = view_data.lawyers.query().search.clone();
    match key.code {
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Esc => {
            term.clear();
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Backspace => {
            term.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => term.push(ch),
        _ => return,
    }
    view_data.lawyers.set_search(&term);
    view_data.lawyer_cursor = 0;
}

fn open_lawyer_form(
    state: &mut AppState,
    view_data: &mut ViewData,
    editing: Option<LawyerId>,
    input: LawyerFormInput,
) {
    view_data.form = Some(LawyerFormUiState {
        editing,
        input,
        field_index: 0,
        errors: FormErrors::default(),
    });
    state.dispatch(AppCommand::OpenForm);
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(form) = view_data.form.as_mut() else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    let field_count = LawyerField::ALL.len();

    match key.code {
        KeyCode::Esc => {
            view_data.form = None;
            state.dispatch(AppCommand::ExitToNav);
            emit_status(state, view_data, internal_tx, "form cancelled");
        }
        KeyCode::Tab | KeyCode::Down => {
            form.field_index = rotate(form.field_index, field_count, 1);
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.field_index = rotate(form.field_index, field_count, -1);
        }
        KeyCode::Enter => submit_lawyer_form(state, runtime, view_data, internal_tx),
        KeyCode::Char('f') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let field = form.field();
            let Some(suggestion) = form_suggestions(form, &view_data.suggestions)
                .first()
                .map(|value| (*value).to_owned())
            else {
                return;
            };
            accept_suggestion(&mut form.input, field, &suggestion);
        }
        KeyCode::Backspace => {
            let field = form.field();
            if let Some(text) = form.input.text_mut(field) {
                text.pop();
            }
        }
        KeyCode::Char(' ') if form.field().is_flag() => {
            form.input.conventionne = !form.input.conventionne;
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let field = form.field();
            if let Some(text) = form.input.text_mut(field) {
                text.push(ch);
            }
        }
        _ => {}
    }
}

fn submit_lawyer_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    let input = match form.input.validate() {
        Ok(input) => input,
        Err(errors) => {
            if let Some(first) = errors.errors().first() {
                form.field_index = LawyerField::ALL
                    .iter()
                    .position(|field| *field == first.field)
                    .unwrap_or(form.field_index);
            }
            let count = errors.errors().len();
            form.errors = errors;
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("fix {count} field(s) before saving"),
            );
            return;
        }
    };
    form.errors = FormErrors::default();
    let editing = form.editing;

    match runtime.save_lawyer(editing, &input) {
        Ok(saved) => {
            view_data.form = None;
            state.dispatch(AppCommand::ExitToNav);
            reload_lawyers(state, runtime, view_data, internal_tx);
            let verb = if editing.is_some() { "updated" } else { "added" };
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{} {verb}", saved.full_name()),
            );
        }
        Err(error) => {
            warn!(error = %error, "lawyer save failed");
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("error: could not save lawyer: {error:#}"),
            );
        }
    }
}

fn suggestion_prefix(input: &LawyerFormInput, field: LawyerField) -> Option<&str> {
    match field {
        LawyerField::Cabinet => Some(input.cabinet.trim()),
        LawyerField::Ville => Some(input.ville.trim()),
        LawyerField::VillesIntervention => Some(
            input
                .villes_intervention
                .rsplit(',')
                .next()
                .unwrap_or_default()
                .trim(),
        ),
        _ => None,
    }
}

fn form_suggestions<'a>(
    form: &LawyerFormUiState,
    suggestions: &'a LawyerSuggestions,
) -> Vec<&'a str> {
    let field = form.field();
    let Some(prefix) = suggestion_prefix(&form.input, field) else {
        return Vec::new();
    };
    let candidates = match field {
        LawyerField::Cabinet => &suggestions.cabinets,
        _ => &suggestions.villes,
    };
    let prefix = prefix.to_lowercase();
    candidates
        .iter()
        .filter(|candidate| {
            let lowered = candidate.to_lowercase();
            lowered.starts_with(&prefix) && lowered != prefix
        })
        .map(String::as_str)
        .take(SUGGESTION_LIMIT)
        .collect()
}

fn accept_suggestion(input: &mut LawyerFormInput, field: LawyerField, suggestion: &str) {
    match field {
        LawyerField::VillesIntervention => {
            let kept = match input.villes_intervention.rfind(',') {
                Some(index) => format!("{}, ", input.villes_intervention[..index].trim_end()),
                None => String::new(),
            };
            input.villes_intervention = format!("{kept}{suggestion}");
        }
        other => {
            if let Some(text) = input.text_mut(other) {
                *text = suggestion.to_owned();
            }
        }
    }
}

fn handle_settings_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let kind = view_data.active_kind();
    let reordering = view_data.active_editor().is_reordering();

    match key.code {
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('l') | KeyCode::Right => {
            if reordering {
                emit_status(state, view_data, internal_tx, "save (w) or cancel (esc) the new order first");
                return;
            }
            let delta = if matches!(key.code, KeyCode::Char('h') | KeyCode::Left) {
                -1
            } else {
                1
            };
            view_data.list_index = rotate(view_data.list_index, ReferenceListKind::ALL.len(), delta);
            view_data.value_cursor = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.value_cursor = view_data.value_cursor.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.value_cursor = view_data.value_cursor.saturating_sub(1);
        }
        KeyCode::Char('a') => {
            if reordering {
                emit_status(state, view_data, internal_tx, "save (w) or cancel (esc) the new order first");
                return;
            }
            view_data.value_input.clear();
            state.dispatch(AppCommand::EnterInput);
        }
        KeyCode::Char('d') => {
            if reordering {
                emit_status(state, view_data, internal_tx, "save (w) or cancel (esc) the new order first");
                return;
            }
            let cursor = view_data.value_cursor;
            let events = view_data.editor_mut(kind).request_delete(cursor);
            let requested = events
                .iter()
                .any(|event| matches!(event, EditorEvent::DeleteRequested { .. }));
            apply_editor_events(state, view_data, internal_tx, events);
            if requested {
                view_data.confirm = Some(ConfirmAction::DeleteValue(kind));
                state.dispatch(AppCommand::OpenConfirm);
            }
        }
        KeyCode::Char('o') => {
            let events = view_data.editor_mut(kind).toggle_reorder_mode();
            apply_editor_events(state, view_data, internal_tx, events);
            if view_data.active_editor().is_reordering() {
                emit_status(state, view_data, internal_tx, "reorder: J/K move, w save, esc cancel");
            }
        }
        KeyCode::Char('J') | KeyCode::Char('K') if reordering => {
            let from = view_data.value_cursor;
            let to = if key.code == KeyCode::Char('J') {
                from.saturating_add(1)
            } else {
                from.saturating_sub(1)
            };
            let events = view_data.editor_mut(kind).move_item(from, to);
            apply_editor_events(state, view_data, internal_tx, events);
        }
        KeyCode::Char('w') | KeyCode::Enter if reordering => {
            let events = view_data
                .editor_mut(kind)
                .commit_reorder(runtime.parametres());
            apply_editor_events(state, view_data, internal_tx, events);
        }
        KeyCode::Esc if reordering => {
            let events = view_data.editor_mut(kind).cancel_reorder();
            apply_editor_events(state, view_data, internal_tx, events);
            emit_status(state, view_data, internal_tx, "order unchanged");
        }
        KeyCode::Char('r') => {
            let mut events = view_data.editor_mut(kind).cancel_reorder();
            events.extend(view_data.editor_mut(kind).load(runtime.parametres()));
            apply_editor_events(state, view_data, internal_tx, events);
        }
        KeyCode::Char('t') if kind.supports_transfer() => {
            if view_data.transfer.is_in_flight() {
                emit_status(state, view_data, internal_tx, "a transfer is already in progress");
                return;
            }
            if view_data.active_editor().items().len() < 2 {
                emit_status(state, view_data, internal_tx, "a transfer needs at least two rédacteurs");
                return;
            }
            view_data.transfer_ui = Some(TransferUiState::default());
        }
        KeyCode::Char('H') if kind.supports_transfer() => {
            view_data.history.load(runtime.parametres());
            view_data.history_visible = true;
        }
        _ => {}
    }
    view_data.clamp_cursors();
}

fn handle_input_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.value_input.clear();
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Enter => {
            let value = view_data.value_input.clone();
            if value.trim().is_empty() {
                view_data.value_input.clear();
                state.dispatch(AppCommand::ExitToNav);
                return;
            }
            let kind = view_data.active_kind();
            let events = view_data.editor_mut(kind).add(runtime.parametres(), &value);
            let added = events
                .iter()
                .any(|event| matches!(event, EditorEvent::ValueAdded(_)));
            if added {
                view_data.value_input.clear();
                state.dispatch(AppCommand::ExitToNav);
            }
            apply_editor_events(state, view_data, internal_tx, events);
            if let Some(index) = view_data
                .active_editor()
                .items()
                .iter()
                .position(|item| *item == value)
            {
                view_data.value_cursor = index;
            }
        }
        KeyCode::Backspace => {
            view_data.value_input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.value_input.push(ch);
        }
        _ => {}
    }
}

fn handle_templates_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let selected = view_data
        .templates
        .get(view_data.template_cursor)
        .map(|template| template.name.clone());

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.template_cursor = view_data.template_cursor.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.template_cursor = view_data.template_cursor.saturating_sub(1);
        }
        KeyCode::Char('g') => {
            let Some(name) = selected else {
                emit_status(state, view_data, internal_tx, "no template selected");
                return;
            };
            match runtime.download_template(&name) {
                Ok(path) => emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("{name} saved to {}", path.display()),
                ),
                Err(error) => {
                    warn!(template = %name, error = %error, "template download failed");
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("error: could not download {name}: {error:#}"),
                    );
                }
            }
        }
        KeyCode::Char('R') => {
            let Some(name) = selected else {
                emit_status(state, view_data, internal_tx, "no template selected");
                return;
            };
            view_data.confirm = Some(ConfirmAction::RestoreTemplate(name));
            state.dispatch(AppCommand::OpenConfirm);
        }
        KeyCode::Char('r') => reload_templates(state, runtime, view_data, internal_tx),
        _ => {}
    }
    view_data.clamp_cursors();
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let accepted = match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
        _ => return,
    };
    let action = view_data.confirm.take();
    state.dispatch(AppCommand::ExitToNav);
    let Some(action) = action else {
        return;
    };

    if !accepted {
        if let ConfirmAction::DeleteValue(kind) = action {
            let events = view_data.editor_mut(kind).cancel_delete();
            apply_editor_events(state, view_data, internal_tx, events);
        }
        emit_status(state, view_data, internal_tx, "cancelled");
        return;
    }

    match action {
        ConfirmAction::DeleteValue(kind) => {
            let events = view_data
                .editor_mut(kind)
                .confirm_delete(runtime.parametres());
            apply_editor_events(state, view_data, internal_tx, events);
        }
        ConfirmAction::DeleteLawyer { id, name } => match runtime.delete_lawyer(id) {
            Ok(()) => {
                reload_lawyers(state, runtime, view_data, internal_tx);
                emit_status(state, view_data, internal_tx, format!("{name} deleted"));
            }
            Err(error) => {
                warn!(lawyer = %id, error = %error, "lawyer delete failed");
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("error: could not delete {name}: {error:#}"),
                );
            }
        },
        ConfirmAction::RestoreTemplate(name) => match runtime.restore_template(&name) {
            Ok(()) => {
                reload_templates(state, runtime, view_data, internal_tx);
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("{name} restored to the default version"),
                );
            }
            Err(error) => {
                warn!(template = %name, error = %error, "template restore failed");
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("error: could not restore {name}: {error:#}"),
                );
            }
        },
    }
}

fn handle_transfer_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let names = view_data
        .editor(ReferenceListKind::Redacteurs)
        .items()
        .to_vec();
    let Some(ui) = view_data.transfer_ui.as_mut() else {
        return;
    };

    match (ui.step, key.code) {
        (_, KeyCode::Esc) | (TransferStep::Confirm, KeyCode::Char('n')) => {
            view_data.transfer_ui = None;
            emit_status(state, view_data, internal_tx, "transfer cancelled");
        }
        (TransferStep::Source | TransferStep::Target, KeyCode::Char('j') | KeyCode::Down) => {
            ui.cursor = clamp_cursor(ui.cursor.saturating_add(1), names.len());
        }
        (TransferStep::Source | TransferStep::Target, KeyCode::Char('k') | KeyCode::Up) => {
            ui.cursor = ui.cursor.saturating_sub(1);
        }
        (TransferStep::Source, KeyCode::Enter) => {
            ui.source = names.get(ui.cursor).cloned();
            ui.step = TransferStep::Target;
            ui.cursor = 0;
        }
        (TransferStep::Target, KeyCode::Enter) => {
            ui.target = names.get(ui.cursor).cloned();
            ui.step = TransferStep::Confirm;
        }
        (TransferStep::Confirm, KeyCode::Enter | KeyCode::Char('y')) => {
            let source = ui.source.clone().unwrap_or_default();
            let target = ui.target.clone().unwrap_or_default();
            match view_data.transfer.begin(&source, &target, &names) {
                Ok(request) => {
                    view_data.transfer_ui = None;
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("transferring {source}'s case files to {target}..."),
                    );
                    if let Err(error) = runtime.spawn_transfer(request, internal_tx.clone()) {
                        let events = view_data.transfer.finish(Err(error));
                        apply_editor_events(state, view_data, internal_tx, events);
                    }
                }
                Err(error) => {
                    ui.step = TransferStep::Target;
                    ui.target = None;
                    emit_status(state, view_data, internal_tx, format!("error: {error}"));
                }
            }
        }
        _ => {}
    }
}

fn rotate(index: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + delta).rem_euclid(len as isize) as usize
}

fn clamp_cursor(cursor: usize, len: usize) -> usize {
    if len == 0 { 0 } else { cursor.min(len - 1) }
}

fn mode_label(state: &AppState, view_data: &ViewData) -> &'static str {
    match state.mode {
        AppMode::Nav if view_data.active_editor().is_reordering()
            && state.active_tab == TabKind::Settings =>
        {
            "REORDER"
        }
        AppMode::Nav => "NAV",
        AppMode::Search => "SEARCH",
        AppMode::Input => "ADD",
        AppMode::Form => "FORM",
        AppMode::Confirm => "CONFIRM",
    }
}

fn tab_title(tab: TabKind, view_data: &ViewData) -> String {
    let filtered = tab == TabKind::Lawyers
        && (!view_data.lawyers.query().filters.is_empty()
            || !view_data.lawyers.query().search.trim().is_empty());
    if filtered {
        format!(" {} {} ", tab.label(), FILTER_MARK_ACTIVE)
    } else {
        format!(" {} ", tab.label())
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab_title(*tab, view_data))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("greffe").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.active_tab {
        TabKind::Lawyers => render_lawyers(frame, layout[1], state, view_data),
        TabKind::Settings => render_settings(frame, layout[1], state, view_data),
        TabKind::Templates => render_templates(frame, layout[1], view_data),
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(form) = &view_data.form {
        let area = centered_rect(70, 85, frame.area());
        frame.render_widget(Clear, area);
        let title = if form.editing.is_some() {
            "edit lawyer"
        } else {
            "new lawyer"
        };
        let body = Paragraph::new(render_form_lines(form, &view_data.suggestions))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(body, area);
    }

    if let Some(ui) = &view_data.transfer_ui {
        let area = centered_rect(50, 50, frame.area());
        frame.render_widget(Clear, area);
        let names = view_data.editor(ReferenceListKind::Redacteurs).items();
        let body = Paragraph::new(render_transfer_text(ui, names)).block(
            Block::default()
                .title("portfolio transfer")
                .borders(Borders::ALL),
        );
        frame.render_widget(body, area);
    }

    if view_data.history_visible {
        let area = centered_rect(80, 60, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(render_history_text(&view_data.history)).block(
            Block::default()
                .title(format!("transfers, last {TRANSFER_HISTORY_DAYS} days"))
                .borders(Borders::ALL),
        );
        frame.render_widget(body, area);
    }

    if let Some(action) = &view_data.confirm {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(format!("{}\n\ny confirm | n cancel", action.prompt(view_data)))
            .block(
                Block::default()
                    .title("confirm")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(body, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn lawyer_cell_text(lawyer: &Lawyer, column: usize) -> String {
    match column {
        0 => lawyer.nom.clone(),
        1 => lawyer.prenom.clone(),
        2 => lawyer.cabinet.clone(),
        3 => lawyer.region.clone(),
        4 => lawyer.adresse.ville.clone(),
        5 => lawyer.villes_intervention.join(", "),
        6 => if lawyer.conventionne { "oui" } else { "" }.to_owned(),
        _ => String::new(),
    }
}

fn is_searchable_column(column: usize) -> bool {
    matches!(column, 0 | 1 | 2 | 5)
}

fn highlighted_line(text: &str, term: &str, base: Style) -> Line<'static> {
    let spans = highlight_segments(text, term)
        .into_iter()
        .map(|segment| {
            let style = if segment.matched {
                base.fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                base
            };
            Span::styled(segment.text.to_owned(), style)
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

fn lawyers_title(state: &AppState, view_data: &ViewData, shown: usize) -> String {
    let query = view_data.lawyers.query();
    let mut title = format!("avocats {shown}/{}", view_data.lawyers.source().len());
    if state.mode == AppMode::Search || !query.search.is_empty() {
        let cursor = if state.mode == AppMode::Search { "▏" } else { "" };
        title.push_str(&format!(" | /{}{cursor}", query.search));
    }
    let filters = query
        .filters
        .active()
        .map(|(name, value)| match value {
            FilterValue::Text(text) => format!("{name}={text}"),
            FilterValue::Flag(_) => name.to_owned(),
        })
        .collect::<Vec<_>>();
    if !filters.is_empty() {
        title.push_str(&format!(" | {}", filters.join(", ")));
    }
    title
}

fn render_lawyers(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let visible = view_data.lawyers.visible();
    let title = lawyers_title(state, view_data, visible.len());

    if let Some(error) = &view_data.lawyers_error {
        let body = Paragraph::new(format!("{error}\n\npress r to retry"))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(body, area);
        return;
    }

    let sort = &view_data.lawyers.query().sort;
    let header = Row::new(LAWYER_COLUMNS.iter().enumerate().map(|(index, column)| {
        let mut label = column.label.to_owned();
        if sort.key.as_deref() == Some(column.path) {
            label.push(' ');
            label.push_str(sort.direction.arrow());
        }
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if index == view_data.lawyer_column {
            style = style.fg(Color::Cyan);
        }
        Cell::from(label).style(style)
    }));

    let term = view_data.lawyers.query().search.clone();
    let rows = visible.iter().enumerate().map(|(row_index, lawyer)| {
        let selected_row = row_index == view_data.lawyer_cursor;
        let cells = (0..LAWYER_COLUMNS.len())
            .map(|column| {
                let mut style = Style::default();
                if selected_row {
                    style = style.bg(Color::DarkGray);
                }
                if selected_row && column == view_data.lawyer_column {
                    style = Style::default().fg(Color::Black).bg(Color::Cyan);
                }
                let text = lawyer_cell_text(lawyer, column);
                if is_searchable_column(column) {
                    Cell::from(highlighted_line(&text, &term, style))
                } else {
                    Cell::from(text).style(style)
                }
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let widths = [
        Constraint::Min(10),
        Constraint::Min(10),
        Constraint::Min(14),
        Constraint::Min(10),
        Constraint::Min(10),
        Constraint::Min(16),
        Constraint::Length(5),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    let mut table_state = TableState::default().with_selected(Some(view_data.lawyer_cursor));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_settings(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(10)])
        .split(area);

    let lists = ReferenceListKind::ALL
        .iter()
        .enumerate()
        .map(|(index, kind)| {
            let count = view_data.editor(*kind).items().len();
            let text = format!("{} ({count})", kind.label());
            if index == view_data.list_index {
                Line::from(Span::styled(
                    format!("> {text}"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {text}"))
            }
        })
        .collect::<Vec<_>>();
    frame.render_widget(
        Paragraph::new(lists).block(Block::default().title("listes").borders(Borders::ALL)),
        columns[0],
    );

    let editor = view_data.active_editor();
    let mut title = editor.kind().label().to_owned();
    if editor.is_reordering() {
        title.push_str(" [reorder]");
    }
    if editor.has_pending_reorder() {
        title.push_str(" *unsaved");
    }
    if state.mode == AppMode::Input {
        title.push_str(&format!(" | add: {}▏", view_data.value_input));
    }

    if let Some(error) = editor.load_error() {
        let body = Paragraph::new(format!("{error}\n\npress r to retry"))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(body, columns[1]);
        return;
    }

    let rows = editor.items().iter().enumerate().map(|(index, value)| {
        let mut style = Style::default();
        if index == view_data.value_cursor {
            style = if editor.is_reordering() {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().bg(Color::DarkGray)
            };
        }
        Row::new([
            Cell::from(format!("{:>3}", index + 1)),
            Cell::from(value.clone()),
        ])
        .style(style)
    });
    let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(10)])
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    let mut table_state = TableState::default().with_selected(Some(view_data.value_cursor));
    frame.render_stateful_widget(table, columns[1], &mut table_state);
}

fn format_timestamp(value: OffsetDateTime) -> String {
    value
        .format(format_description!(
            "[day]/[month]/[year] [hour]:[minute]"
        ))
        .unwrap_or_else(|_| value.to_string())
}

fn render_templates(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    if let Some(error) = &view_data.templates_error {
        let body = Paragraph::new(format!("{error}\n\npress r to retry"))
            .block(Block::default().title("modèles").borders(Borders::ALL));
        frame.render_widget(body, area);
        return;
    }

    let header = Row::new(["nom", "libellé", "version", "modifié"]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );
    let rows = view_data
        .templates
        .iter()
        .enumerate()
        .map(|(index, template)| {
            let style = if index == view_data.template_cursor {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new([
                template.name.clone(),
                template.display_label().to_owned(),
                if template.custom { "custom" } else { "default" }.to_owned(),
                template
                    .updated_at
                    .map(format_timestamp)
                    .unwrap_or_default(),
            ])
            .style(style)
        });
    let table = Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(17),
        ],
    )
    .header(header)
    .column_spacing(1)
    .block(Block::default().title("modèles").borders(Borders::ALL));
    let mut table_state = TableState::default().with_selected(Some(view_data.template_cursor));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_form_lines(form: &LawyerFormUiState, suggestions: &LawyerSuggestions) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, field) in LawyerField::ALL.iter().enumerate() {
        let active = index == form.field_index;
        let marker = if active { ">" } else { " " };
        let cursor = if active && !field.is_flag() { "▏" } else { "" };
        let style = if active {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{marker} {:<22} {}{cursor}",
                field.label(),
                form.input.text(*field)
            ),
            style,
        )));
        if let Some(message) = form.errors.for_field(*field) {
            lines.push(Line::from(Span::styled(
                format!("    {message}"),
                Style::default().fg(Color::Red),
            )));
        }
        if active {
            let matches = form_suggestions(form, suggestions);
            if !matches.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("    ctrl+f: {}", matches.join(" | ")),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(
        "tab/shift+tab field | space toggles conventionné | enter save | esc cancel",
    ));
    lines
}

fn render_transfer_text(ui: &TransferUiState, names: &[String]) -> String {
    let mut out = String::new();
    match ui.step {
        TransferStep::Source | TransferStep::Target => {
            let prompt = if ui.step == TransferStep::Source {
                "move every case file from:".to_owned()
            } else {
                format!(
                    "move {}'s case files to:",
                    ui.source.as_deref().unwrap_or_default()
                )
            };
            out.push_str(&prompt);
            out.push('\n');
            for (index, name) in names.iter().enumerate() {
                let marker = if index == ui.cursor { ">" } else { " " };
                out.push_str(&format!("{marker} {name}\n"));
            }
            out.push_str("\nj/k choose | enter select | esc cancel");
        }
        TransferStep::Confirm => {
            out.push_str(&format!(
                "transfer every case file from {} to {}?\n\ny/enter confirm | n cancel",
                ui.source.as_deref().unwrap_or_default(),
                ui.target.as_deref().unwrap_or_default()
            ));
        }
    }
    out
}

fn render_history_text(history: &TransferHistory) -> String {
    if let Some(error) = history.error() {
        return format!("{error}\n\nesc close");
    }
    if history.records().is_empty() {
        return format!("no transfer in the last {TRANSFER_HISTORY_DAYS} days\n\nesc close");
    }
    let mut out = String::new();
    for record in history.records() {
        out.push_str(&format!(
            "{}  {} -> {}  {} case file(s)  {}",
            format_timestamp(record.date),
            record.source_redacteur,
            record.target_redacteur,
            record.affaires_modifiees,
            record.statut.label()
        ));
        if let Some(message) = record.message.as_deref().filter(|message| !message.is_empty()) {
            out.push_str(&format!("  ({message})"));
        }
        out.push('\n');
    }
    out.push_str("\nesc close");
    out
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = mode_label(state, view_data);
    if let Some(message) = &state.status_line {
        return format!("{mode} | {message}");
    }
    let hints = match (state.mode, state.active_tab) {
        (AppMode::Search, _) => "type to filter | enter keep | esc clear",
        (AppMode::Input, _) => "type the value | enter add | esc cancel",
        (AppMode::Form, _) => "tab field | enter save | ctrl+f suggestion | esc cancel",
        (AppMode::Confirm, _) => "y confirm | n cancel",
        (AppMode::Nav, TabKind::Lawyers) => {
            "j/k h/l | s sort | / search | f/v/b/c filter x clear | n new e edit D delete | r reload | tab | ? help"
        }
        (AppMode::Nav, TabKind::Settings) if view_data.active_editor().is_reordering() => {
            "j/k select | J/K move | w save | esc cancel"
        }
        (AppMode::Nav, TabKind::Settings) if view_data.active_kind().supports_transfer() => {
            "h/l list j/k | a add d delete o reorder | t transfer H history | r reload | tab | ? help"
        }
        (AppMode::Nav, TabKind::Settings) => {
            "h/l list j/k | a add d delete o reorder | r reload | tab | ? help"
        }
        (AppMode::Nav, TabKind::Templates) => {
            "j/k | g download | R restore default | r reload | tab | ? help"
        }
    };
    format!("{mode} | {hints}")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q/ctrl+c quit | q quit (nav) | tab/shift+tab switch tab | ? help\n\
avocats: j/k rows | h/l column | s sort column (again to reverse) | / live search\n\
avocats: f région | v ville | b cabinet | c conventionné | x clear filters\n\
avocats: n new | e edit | D delete | r reload\n\
paramètres: h/l list | j/k value | a add | d delete | r reload\n\
paramètres: o reorder mode | J/K move | w or enter save | esc cancel\n\
rédacteurs: t portfolio transfer | H transfer history\n\
modèles: j/k | g download | R restore default | r reload\n\
form: tab/shift+tab field | space toggle | ctrl+f accept suggestion | enter save | esc cancel"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

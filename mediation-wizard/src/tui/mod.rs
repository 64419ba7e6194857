//! Terminal UI for the mediation request wizard.
//!
//! Layout:
//! - Centered window titled "Submit a mediation request"
//! - Tab strip with one tab per step (vertical on narrow terminals)
//! - Field panel for the active step, summary on the last step
//! - Bottom button row: [ Previous ] [ Next ] [ Reset ] / [ Submit ]
//! - Snackbar for the submission outcome, modal confirmations for reset and quit
//!
//! Logging is file-only while the TUI runs (stdout would corrupt the screen).

mod form;

use crate::api::mediation::MediationApi;
use crate::error::{WizardError, WizardResult};
use crate::i18n::Language;
use crate::models::responses::SubmissionReceipt;
use crate::models::state::{AssistiveTechnology, Choice, WizardState};
use crate::wizard::controller::{FormContainer, Severity, WizardContext};
use crate::wizard::navigation::{NavKey, Orientation, TabKeyOutcome, VERTICAL_BREAKPOINT};
use crate::wizard::router::MemoryHistory;
use crate::wizard::steps::{Step, StepLayout};
use crate::wizard::store::{FormStore, MemoryStorage, StateStorage, STORAGE_KEY};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use form::{field_for_error, recap_lines, visible_fields, FieldId, FieldKind, FormDraft, TextCursor};
use futures::executor::block_on;
use log::{info, warn};
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const WINDOW_TITLE: &str = "Submit a mediation request";

/// The submission snackbar hides itself after this long.
const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonFocus {
    Previous,
    Next,
    Submit,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Tabs,
    Field(usize),
    /// "Modify" link of a summary section.
    Modify(Step),
    Button(ButtonFocus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modal {
    ConfirmReset,
    ConfirmQuit,
}

enum UiMsg {
    SubmitFinished(WizardResult<SubmissionReceipt>),
}

struct TuiState<S: StateStorage> {
    container: FormContainer<S, MemoryHistory>,
    draft: FormDraft,
    /// Step the draft was loaded for.
    drafted_step: usize,
    focus: FocusTarget,
    cursor: TextCursor,
    technology_index: usize,
    modal: Option<Modal>,
    /// Focused modal button: true is the confirming one.
    modal_confirm: bool,
    submitting: bool,
    notification_since: Option<Instant>,
    breakpoint: u16,
    language: Language,
    quit: bool,
}

impl<S: StateStorage> TuiState<S> {
    fn new(
        mut container: FormContainer<S, MemoryHistory>,
        breakpoint: u16,
        language: Language,
    ) -> Self {
        container.mount();
        let draft = FormDraft::from_state(container.state());
        let drafted_step = container.active_step();
        Self {
            container,
            draft,
            drafted_step,
            focus: FocusTarget::Tabs,
            cursor: TextCursor::default(),
            technology_index: 0,
            modal: None,
            modal_confirm: false,
            submitting: false,
            notification_since: None,
            breakpoint,
            language,
            quit: false,
        }
    }

    fn active(&self) -> Step {
        self.container.active()
    }

    fn has_organization_app(&self) -> bool {
        self.container.layout().has_organization_app()
    }

    fn fields(&self) -> Vec<FieldId> {
        visible_fields(self.active(), &self.draft, self.has_organization_app())
    }

    fn focused_field(&self) -> Option<FieldId> {
        match self.focus {
            FocusTarget::Field(i) => self.fields().get(i).copied(),
            _ => None,
        }
    }

    fn buttons(&self) -> Vec<(ButtonFocus, bool)> {
        if self.container.is_recap() {
            vec![
                (ButtonFocus::Previous, true),
                (ButtonFocus::Submit, !self.submitting),
                (ButtonFocus::Reset, true),
            ]
        } else {
            vec![
                (ButtonFocus::Previous, self.container.active_step() > 0),
                (ButtonFocus::Next, true),
                (ButtonFocus::Reset, true),
            ]
        }
    }

    /// Sequential focus order of the page.
    fn focus_ring(&self) -> Vec<FocusTarget> {
        let mut ring = vec![FocusTarget::Tabs];
        if self.container.is_recap() {
            ring.extend(
                self.container
                    .layout()
                    .steps()
                    .iter()
                    .filter(|s| **s != Step::Recap)
                    .map(|s| FocusTarget::Modify(*s)),
            );
        } else {
            ring.extend((0..self.fields().len()).map(FocusTarget::Field));
        }
        ring.extend(
            self.buttons()
                .into_iter()
                .filter(|(_, enabled)| *enabled)
                .map(|(b, _)| FocusTarget::Button(b)),
        );
        ring
    }

    fn set_focus(&mut self, target: FocusTarget) {
        self.focus = target;
        match target {
            FocusTarget::Tabs => {
                let active = self.container.active_step();
                self.container.tabs_mut().focus(active);
            }
            FocusTarget::Field(_) => {
                if let Some(field) = self.focused_field() {
                    self.cursor = TextCursor::at_end(self.draft.text(field).unwrap_or_default());
                }
            }
            _ => {}
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let ring = self.focus_ring();
        let len = ring.len();
        let pos = ring.iter().position(|t| *t == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        self.set_focus(ring[next]);
    }

    fn reload_draft(&mut self) {
        self.draft = FormDraft::from_state(self.container.state());
        self.drafted_step = self.container.active_step();
        self.technology_index = 0;
    }

    /// Pick up a step change and a pending tab focus request from the controller.
    fn after_navigation(&mut self) {
        if self.container.active_step() != self.drafted_step {
            self.reload_draft();
        }
        let active = self.container.active_step();
        if self.container.tabs_mut().take_focus_request(active).is_some() {
            self.focus = FocusTarget::Tabs;
        }
    }

    /// Move focus to the first field a failed validation points at.
    fn focus_first_error(&mut self) {
        let step = self.active();
        let Some(first) = self.container.field_errors().first_error() else {
            return;
        };
        let Some(field) = field_for_error(step, first.field) else {
            return;
        };
        if let Some(pos) = self.fields().iter().position(|f| *f == field) {
            self.set_focus(FocusTarget::Field(pos));
        }
    }

    fn reset(&mut self) {
        self.container.reset_all();
        self.reload_draft();
        self.focus = FocusTarget::Tabs;
    }

    fn expire_notification(&mut self) {
        if let Some(since) = self.notification_since {
            if since.elapsed() >= NOTIFICATION_TIMEOUT {
                self.container.dismiss_notification();
                self.notification_since = None;
            }
        }
    }

    fn apply_message(&mut self, msg: UiMsg) {
        match msg {
            UiMsg::SubmitFinished(result) => {
                self.submitting = false;
                if self.container.finish_submission(result) {
                    self.reload_draft();
                    self.focus = FocusTarget::Tabs;
                }
                self.notification_since = Some(Instant::now());
            }
        }
    }
}

pub fn run<S: StateStorage>(
    container: FormContainer<S, MemoryHistory>,
    api: Arc<dyn MediationApi>,
    breakpoint: u16,
    language: Language,
) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: start] Starting TUI wizard (language: {})",
        language
    );

    let mut terminal = setup_terminal()?;
    let state = TuiState::new(container, breakpoint, language);
    let result = run_loop(&mut terminal, state, api);
    restore_terminal(&mut terminal)?;

    result
}

fn smoke_state(target: &str) -> WizardState {
    let mut state = WizardState::default();
    if target == "user-info" || target == "errors" {
        return state;
    }
    state.user_info.first_name = "Bill".to_string();
    state.user_info.email = "bluebill@koena.net".to_string();
    state
        .user_info
        .toggle_technology(AssistiveTechnology::ScreenReaderVocalSynthesis);
    state.problem_description.issue_description =
        "The sign-up form cannot be submitted with the keyboard".to_string();
    state.problem_description.url = "https://example.org/sign-up".to_string();
    state.organization_info.name = "Example Org".to_string();
    state
}

fn new_smoke_state(target: &str, language: Language) -> Result<TuiState<MemoryStorage>> {
    let data = smoke_state(target);
    let storage = MemoryStorage::with_entry(STORAGE_KEY, &serde_json::to_string(&data)?);
    let layout = StepLayout::standalone();
    let step = match target {
        "problem" | "problem-description" => Step::ProblemDescription,
        "organization" | "organization-info" => Step::OrganizationInfo,
        "recap" | "summary" | "reset-modal" => Step::Recap,
        _ => Step::UserInfo,
    };
    let container = FormContainer::new(
        FormStore::open(storage),
        MemoryHistory::new(&layout.path_for(step)),
        WizardContext::standalone(),
    );
    let mut state = TuiState::new(container, VERTICAL_BREAKPOINT, language);

    match target {
        "errors" => {
            let data = state.draft.step_data(Step::UserInfo);
            if let Some(data) = data {
                if state.container.next(data).is_err() {
                    state.focus_first_error();
                }
            }
        }
        "reset-modal" => state.modal = Some(Modal::ConfirmReset),
        _ => {}
    }
    Ok(state)
}

/// Render one frame of `target` into an in-memory backend.
pub fn smoke(target: &str, language: Language) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={} language={}",
        target, language
    );

    let t = target.trim().to_ascii_lowercase();
    let mut state = new_smoke_state(t.as_str(), language)?;

    let (width, height) = if t == "vertical" { (80, 30) } else { (100, 30) };
    state
        .container
        .set_orientation(Orientation::for_width(width, state.breakpoint));

    // no raw mode or alternate screen, so this runs in CI
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| draw(f.size(), f, &state))?;

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop<S: StateStorage>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut state: TuiState<S>,
    api: Arc<dyn MediationApi>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let (tx, rx) = mpsc::channel::<UiMsg>();

    while !state.quit {
        drain_messages(&mut state, &rx);
        state.expire_notification();

        let size = terminal.size()?;
        state
            .container
            .set_orientation(Orientation::for_width(size.width, state.breakpoint));
        terminal.draw(|f| draw(f.size(), f, &state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut state, key.code, &tx, &api)
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    info!("[PHASE: tui] [STEP: exit] TUI wizard closed");
    Ok(())
}

fn drain_messages<S: StateStorage>(state: &mut TuiState<S>, rx: &mpsc::Receiver<UiMsg>) {
    while let Ok(msg) = rx.try_recv() {
        state.apply_message(msg);
    }
}

/// Post the summary on a worker thread; the outcome comes back as `UiMsg::SubmitFinished`.
fn start_submission<S: StateStorage>(
    state: &mut TuiState<S>,
    tx: &mpsc::Sender<UiMsg>,
    api: &Arc<dyn MediationApi>,
) {
    if state.submitting {
        return;
    }
    state.submitting = true;
    state.container.dismiss_notification();
    state.notification_since = None;

    let submission = state.container.prepare_submission();
    let api = Arc::clone(api);
    let tx = tx.clone();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        let result = match rt {
            Ok(rt) => rt.block_on(api.submit(&submission)),
            Err(e) => {
                warn!(
                    "[PHASE: submit] [STEP: runtime] Failed to start submission runtime: {}",
                    e
                );
                Err(WizardError::Io(e))
            }
        };
        let _ = tx.send(UiMsg::SubmitFinished(result));
    });
}

fn nav_key(code: KeyCode) -> Option<NavKey> {
    match code {
        KeyCode::Left => Some(NavKey::ArrowLeft),
        KeyCode::Right => Some(NavKey::ArrowRight),
        KeyCode::Up => Some(NavKey::ArrowUp),
        KeyCode::Down => Some(NavKey::ArrowDown),
        KeyCode::Home => Some(NavKey::Home),
        KeyCode::End => Some(NavKey::End),
        KeyCode::Enter => Some(NavKey::Enter),
        KeyCode::Char(' ') => Some(NavKey::Space),
        _ => None,
    }
}

fn handle_key<S: StateStorage>(
    state: &mut TuiState<S>,
    code: KeyCode,
    tx: &mpsc::Sender<UiMsg>,
    api: &Arc<dyn MediationApi>,
) {
    // the wizard is frozen while the request is in flight
    if state.submitting {
        return;
    }

    if let Some(modal) = state.modal {
        handle_modal_key(state, modal, code);
        return;
    }

    match code {
        KeyCode::Esc => {
            if state.container.notification().is_some() {
                state.container.dismiss_notification();
                state.notification_since = None;
            } else {
                state.modal = Some(Modal::ConfirmQuit);
                state.modal_confirm = false;
            }
            return;
        }
        KeyCode::Tab => {
            state.move_focus(true);
            return;
        }
        KeyCode::BackTab => {
            state.move_focus(false);
            return;
        }
        _ => {}
    }

    match state.focus {
        FocusTarget::Tabs => handle_tabs_key(state, code),
        FocusTarget::Field(_) => handle_field_key(state, code),
        FocusTarget::Modify(step) => match code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                if state.container.jump_to(step) {
                    state.after_navigation();
                }
            }
            KeyCode::Up => state.move_focus(false),
            KeyCode::Down => state.move_focus(true),
            _ => {}
        },
        FocusTarget::Button(button) => match code {
            KeyCode::Enter | KeyCode::Char(' ') => activate_button(state, button, tx, api),
            KeyCode::Left | KeyCode::Up => state.move_focus(false),
            KeyCode::Right | KeyCode::Down => state.move_focus(true),
            _ => {}
        },
    }
}

fn handle_modal_key<S: StateStorage>(state: &mut TuiState<S>, modal: Modal, code: KeyCode) {
    match code {
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
            state.modal_confirm = !state.modal_confirm;
        }
        KeyCode::Esc => state.modal = None,
        KeyCode::Enter => {
            state.modal = None;
            if !state.modal_confirm {
                return;
            }
            match modal {
                Modal::ConfirmReset => {
                    info!("[PHASE: tui] [STEP: reset] Form reset by the user");
                    state.reset();
                }
                Modal::ConfirmQuit => state.quit = true,
            }
        }
        _ => {}
    }
}

fn handle_tabs_key<S: StateStorage>(state: &mut TuiState<S>, code: KeyCode) {
    let Some(key) = nav_key(code) else {
        return;
    };
    let data = state.draft.step_data(state.active());
    let outcome = block_on(state.container.handle_tab_key(key, data));
    match outcome {
        TabKeyOutcome::Activate(_) => {
            state.after_navigation();
            state.focus = FocusTarget::Tabs;
        }
        TabKeyOutcome::Ignored if matches!(key, NavKey::Enter | NavKey::Space) => {
            state.focus_first_error();
        }
        _ => {}
    }
}

fn handle_field_key<S: StateStorage>(state: &mut TuiState<S>, code: KeyCode) {
    let Some(field) = state.focused_field() else {
        state.set_focus(FocusTarget::Tabs);
        return;
    };
    match code {
        KeyCode::Up => return state.move_focus(false),
        KeyCode::Down => return state.move_focus(true),
        _ => {}
    }

    match field.kind() {
        FieldKind::Text => {
            if code == KeyCode::Enter {
                state.move_focus(true);
            } else if let Some(value) = state.draft.text_mut(field) {
                state.cursor.handle_key(value, code);
            }
        }
        FieldKind::Choice => match code {
            KeyCode::Right | KeyCode::Char(' ') => state.draft.cycle(field, true),
            KeyCode::Left => state.draft.cycle(field, false),
            KeyCode::Enter => state.move_focus(true),
            _ => {}
        },
        FieldKind::MultiSelect => {
            let count = AssistiveTechnology::ALL.len();
            match code {
                KeyCode::Right => state.technology_index = (state.technology_index + 1) % count,
                KeyCode::Left => {
                    state.technology_index = (state.technology_index + count - 1) % count
                }
                KeyCode::Char(' ') => state.draft.toggle_technology(state.technology_index),
                KeyCode::Enter => state.move_focus(true),
                _ => {}
            }
        }
    }
}

fn activate_button<S: StateStorage>(
    state: &mut TuiState<S>,
    button: ButtonFocus,
    tx: &mpsc::Sender<UiMsg>,
    api: &Arc<dyn MediationApi>,
) {
    let step = state.active();
    match button {
        ButtonFocus::Previous => {
            if state.container.is_recap() {
                state.container.recap_previous();
                state.after_navigation();
            } else if let Some(data) = state.draft.step_data(step) {
                match state.container.previous(data) {
                    Ok(_) => state.after_navigation(),
                    Err(_) => state.focus_first_error(),
                }
            }
        }
        ButtonFocus::Next => {
            if let Some(data) = state.draft.step_data(step) {
                match state.container.next(data) {
                    Ok(_) => state.after_navigation(),
                    Err(_) => state.focus_first_error(),
                }
            }
        }
        ButtonFocus::Submit => start_submission(state, tx, api),
        ButtonFocus::Reset => {
            state.modal = Some(Modal::ConfirmReset);
            state.modal_confirm = false;
        }
    }
}

fn draw<S: StateStorage>(area: Rect, f: &mut ratatui::Frame<'_>, state: &TuiState<S>) {
    let (window_area, _) = centered_window(area, 100, 32);
    let lang = state.language;

    let window_title = lang.tr(WINDOW_TITLE);
    let title = match &state.container.context().organization_app {
        Some(app) if !app.name.display(lang).is_empty() => {
            format!("{}: {}", window_title, app.name.display(lang))
        }
        _ => window_title.to_string(),
    };
    f.render_widget(Block::default().borders(Borders::ALL).title(title), window_area);

    let inner = window_area.inner(&ratatui::layout::Margin {
        vertical: 1,
        horizontal: 1,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(inner);

    let content_area = match state.container.tabs().orientation() {
        Orientation::Horizontal => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)].as_ref())
                .split(rows[0]);
            draw_tabs(f, parts[0], state);
            parts[1]
        }
        Orientation::Vertical => {
            let parts = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(22), Constraint::Min(0)].as_ref())
                .split(rows[0]);
            draw_tabs(f, parts[0], state);
            parts[1]
        }
    };

    if state.container.is_recap() {
        draw_recap(f, content_area, state);
    } else {
        draw_step_fields(f, content_area, state);
    }

    draw_notification(f, rows[1], state);
    draw_buttons(f, rows[2], state);

    match state.modal {
        Some(Modal::ConfirmReset) => draw_confirm_modal(
            f,
            window_area,
            lang.tr("Reset the form?"),
            lang.tr("All the answers you have given will be erased."),
            lang.tr("Yes, reset"),
            state,
        ),
        Some(Modal::ConfirmQuit) => draw_confirm_modal(
            f,
            window_area,
            lang.tr("Quit?"),
            lang.tr("Your answers are kept and restored the next time you start the wizard."),
            lang.tr("Yes, quit"),
            state,
        ),
        None => {}
    }
}

fn tab_text(label: String, enabled: bool, active: bool, focused: bool) -> Span<'static> {
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if active {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if focused && enabled {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(label, style)
}

fn draw_tabs<S: StateStorage>(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState<S>) {
    let layout = state.container.layout();
    let tabs_focused = state.focus == FocusTarget::Tabs && state.modal.is_none();
    let spans: Vec<Span<'static>> = layout
        .steps()
        .iter()
        .enumerate()
        .map(|(i, step)| {
            tab_text(
                format!(" {}. {} ", i + 1, state.language.tr(step.label())),
                state.container.is_tab_enabled(i),
                i == state.container.active_step(),
                tabs_focused && state.container.tabs().focused() == i,
            )
        })
        .collect();

    let text = match state.container.tabs().orientation() {
        Orientation::Horizontal => {
            let mut line = Vec::new();
            for (i, span) in spans.into_iter().enumerate() {
                if i > 0 {
                    line.push(Span::raw(" "));
                }
                line.push(span);
            }
            Text::from(Line::from(line))
        }
        Orientation::Vertical => {
            Text::from(spans.into_iter().map(Line::from).collect::<Vec<_>>())
        }
    };
    f.render_widget(Paragraph::new(text), area);
}

fn intro_line(step: Step) -> &'static str {
    match step {
        Step::UserInfo => "Fields marked * are required.",
        Step::ProblemDescription => "Only the 1st field \"What was the issue?\" is required.",
        Step::OrganizationInfo => "All the fields are optional.",
        Step::Recap => "Check your answers, then submit the request.",
    }
}

fn draw_step_fields<S: StateStorage>(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &TuiState<S>,
) {
    let step = state.active();
    let lang = state.language;
    let heading = lang.step_title(state.container.active_step(), step.heading());
    let block = Block::default().borders(Borders::ALL).title(heading);
    let body = block.inner(area);
    f.render_widget(block, area);

    let errors = state.container.field_errors();
    let mut lines: Vec<Line> = vec![Line::from(lang.tr(intro_line(step))), Line::from("")];
    let mut focus_line = 0usize;
    let mut cursor_x = None;

    for (i, field) in state.fields().into_iter().enumerate() {
        let focused = state.focus == FocusTarget::Field(i);
        let prefix = if focused { "> " } else { "  " };
        let label = if field.required() {
            format!("{} *", lang.tr(field.label()))
        } else {
            lang.tr(field.label()).to_string()
        };
        if focused {
            focus_line = lines.len();
        }

        match field.kind() {
            FieldKind::Text => {
                let value = state.draft.text(field).unwrap_or_default();
                if focused {
                    let offset = prefix.len() + label.chars().count() + 2 + state.cursor.pos();
                    cursor_x = Some(offset as u16);
                }
                lines.push(Line::from(format!("{}{}: {}", prefix, label, value)));
            }
            FieldKind::Choice => {
                lines.push(Line::from(format!(
                    "{}{}: < {} >",
                    prefix,
                    label,
                    lang.tr(state.draft.choice_text(field))
                )));
            }
            FieldKind::MultiSelect => {
                lines.push(Line::from(format!("{}{}:", prefix, label)));
                for (t, technology) in AssistiveTechnology::ALL.iter().enumerate() {
                    let mark = if state.draft.uses_technology(t) { "[x]" } else { "[ ]" };
                    let style = if focused && t == state.technology_index {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    if focused && t == state.technology_index {
                        focus_line = lines.len();
                    }
                    lines.push(Line::from(vec![
                        Span::raw("    "),
                        Span::styled(format!("{} {}", mark, lang.tr(technology.as_str())), style),
                    ]));
                }
            }
        }

        if let Some(message) = errors.get(field.error_key()) {
            lines.push(Line::from(Span::styled(
                format!("    ! {}", lang.tr(message)),
                Style::default().fg(Color::Red),
            )));
        }
    }

    let height = body.height as usize;
    let scroll = (focus_line + 2).saturating_sub(height);
    f.render_widget(Paragraph::new(Text::from(lines)).scroll((scroll as u16, 0)), body);

    if let Some(x) = cursor_x {
        if state.modal.is_none() && focus_line >= scroll {
            let y = body.y + (focus_line - scroll) as u16;
            let x = (body.x + x).min(body.x + body.width.saturating_sub(1));
            if y < body.y + body.height {
                f.set_cursor(x, y);
            }
        }
    }
}

fn draw_recap<S: StateStorage>(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState<S>) {
    let layout = state.container.layout();
    let lang = state.language;
    let heading = lang.step_title(layout.recap_index(), Step::Recap.heading());
    let block = Block::default().borders(Borders::ALL).title(heading);
    let body = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = vec![Line::from(lang.tr(intro_line(Step::Recap))), Line::from("")];
    let mut focus_line = 0usize;
    let has_app = state.has_organization_app();

    for (i, step) in layout.steps().iter().enumerate() {
        if *step == Step::Recap {
            continue;
        }
        let focused = state.focus == FocusTarget::Modify(*step) && state.modal.is_none();
        if focused {
            focus_line = lines.len();
        }
        let modify_style = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(
                lang.step_title(i, step.heading()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format!("[ {} ]", lang.tr("Modify")), modify_style),
        ]));

        let answers = recap_lines(*step, state.container.state(), has_app, lang);
        if answers.is_empty() {
            lines.push(Line::from(format!("  {}", lang.tr("(nothing filled in)"))));
        }
        for (label, value) in answers {
            lines.push(Line::from(format!("  {}: {}", label, value)));
        }
        lines.push(Line::from(""));
    }

    let scroll = (focus_line + 4).saturating_sub(body.height as usize);
    f.render_widget(
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .scroll((scroll as u16, 0)),
        body,
    );
}

fn draw_notification<S: StateStorage>(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &TuiState<S>,
) {
    let lang = state.language;
    let line = if state.submitting {
        Line::from(Span::styled(
            lang.tr("Sending your mediation request..."),
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(notification) = state.container.notification() {
        let color = match notification.severity {
            Severity::Success => Color::Green,
            Severity::Error => Color::Red,
        };
        Line::from(vec![
            Span::styled(lang.tr(notification.text), Style::default().fg(color)),
            Span::styled(
                format!("  ({})", lang.tr("Esc to close")),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(Text::from(line)), area);
}

fn centered_window(area: Rect, width: u16, height: u16) -> (Rect, Rect) {
    let w = width.min(area.width.saturating_sub(2)).max(60).min(area.width);
    let h = height.min(area.height.saturating_sub(2)).max(20).min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    let rect = Rect {
        x,
        y,
        width: w,
        height: h,
    };
    (rect, rect)
}

fn button_label(button: ButtonFocus, submitting: bool) -> &'static str {
    match button {
        ButtonFocus::Previous => "Previous",
        ButtonFocus::Next => "Next",
        ButtonFocus::Submit if submitting => "Sending...",
        ButtonFocus::Submit => "Submit",
        ButtonFocus::Reset => "Reset",
    }
}

fn draw_buttons<S: StateStorage>(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState<S>) {
    let mut spans = Vec::new();
    for (i, (button, enabled)) in state.buttons().into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(button_text(
            state.language.tr(button_label(button, state.submitting)),
            state.focus == FocusTarget::Button(button) && state.modal.is_none(),
            enabled,
        ));
    }

    let p = Paragraph::new(Text::from(Line::from(spans))).alignment(Alignment::Right);
    f.render_widget(p, area);
}

fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if focused && enabled {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("[ {} ]", label), style)
}

fn draw_confirm_modal<S: StateStorage>(
    f: &mut ratatui::Frame<'_>,
    window_area: Rect,
    title: &str,
    body: &str,
    confirm_label: &str,
    state: &TuiState<S>,
) {
    let modal_w = 60u16
        .min(window_area.width.saturating_sub(4))
        .max(40)
        .min(window_area.width);
    let modal_h = 7u16.min(window_area.height);
    let x = window_area.x + (window_area.width.saturating_sub(modal_w)) / 2;
    let y = window_area.y + (window_area.height.saturating_sub(modal_h)) / 2;
    let area = Rect {
        x,
        y,
        width: modal_w,
        height: modal_h,
    }
    .intersection(f.size());
    if area.width < 3 || area.height < 3 {
        return;
    }

    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let p = Paragraph::new(Text::from(body.to_string()))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);

    let buttons_area = Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(2),
        width: area.width.saturating_sub(2),
        height: 1,
    };
    let line = Line::from(vec![
        button_text(confirm_label, state.modal_confirm, true),
        Span::raw(" "),
        button_text(state.language.tr("No"), !state.modal_confirm, true),
    ]);
    let p = Paragraph::new(Text::from(line)).alignment(Alignment::Right);
    f.render_widget(p, buttons_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::requests::MediationRequestSubmission;
    use crate::models::responses::OrganizationApp;
    use crate::wizard::router::Router;
    use crate::wizard::steps::{PROBLEM_DESCRIPTION_PATH, ROOT_PATH};
    use crate::wizard::validation::FIRST_NAME_REQUIRED;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubApi {
        status: u16,
        call_count: AtomicU32,
    }

    impl StubApi {
        fn answering(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status,
                call_count: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl MediationApi for StubApi {
        async fn submit(
            &self,
            _submission: &MediationRequestSubmission,
        ) -> WizardResult<SubmissionReceipt> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if (200..300).contains(&self.status) {
                Ok(SubmissionReceipt {
                    status: self.status,
                    correlation_id: "stub".to_string(),
                })
            } else {
                Err(WizardError::Status(self.status))
            }
        }

        async fn fetch_organization_app(
            &self,
            _organization_slug: &str,
            application_slug: &str,
        ) -> WizardResult<OrganizationApp> {
            Ok(OrganizationApp::new("app-1", application_slug))
        }
    }

    fn press(state: &mut TuiState<MemoryStorage>, api: &Arc<dyn MediationApi>, codes: &[KeyCode]) {
        let (tx, _rx) = mpsc::channel();
        for code in codes {
            handle_key(state, *code, &tx, api);
        }
    }

    fn type_text(state: &mut TuiState<MemoryStorage>, api: &Arc<dyn MediationApi>, text: &str) {
        let codes: Vec<KeyCode> = text.chars().map(KeyCode::Char).collect();
        press(state, api, &codes);
    }

    fn rendered(state: &TuiState<MemoryStorage>, width: u16) -> String {
        rendered_in(state, width, 30)
    }

    fn rendered_in(state: &TuiState<MemoryStorage>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f.size(), f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn fresh() -> TuiState<MemoryStorage> {
        let container = FormContainer::new(
            FormStore::open(MemoryStorage::new()),
            MemoryHistory::new(ROOT_PATH),
            WizardContext::standalone(),
        );
        TuiState::new(container, 85, Language::En)
    }

    #[test]
    fn smoke_targets_render() {
        for target in [
            "user-info",
            "problem",
            "organization",
            "recap",
            "errors",
            "reset-modal",
            "vertical",
        ] {
            for language in Language::ALL {
                smoke(target, language).unwrap();
            }
        }
    }

    #[test]
    fn first_frame_shows_window_and_tabs() {
        let state = fresh();
        let screen = rendered(&state, 100);
        assert!(screen.contains(WINDOW_TITLE));
        assert!(screen.contains("1. About you"));
        assert!(screen.contains("4. Summary"));
        assert!(screen.contains("Step 1: About yourself"));
        assert!(screen.contains("[ Next ]"));
    }

    #[test]
    fn french_interface_translates_labels_and_errors() {
        let api: Arc<dyn MediationApi> = StubApi::answering(201);
        let container = FormContainer::new(
            FormStore::open(MemoryStorage::new()),
            MemoryHistory::new(ROOT_PATH),
            WizardContext::standalone(),
        );
        let mut state = TuiState::new(container, 85, Language::Fr);
        let screen = rendered(&state, 100);
        assert!(screen.contains("Faire une demande de médiation"));
        assert!(screen.contains("1. Vous concernant"));
        assert!(screen.contains("Étape 1: À propos de vous"));
        assert!(screen.contains("Prénom / pseudo *"));
        assert!(screen.contains("[ Suivant ]"));
        assert!(!screen.contains("[ Next ]"));

        state.set_focus(FocusTarget::Button(ButtonFocus::Next));
        press(&mut state, &api, &[KeyCode::Enter]);
        assert!(rendered(&state, 100).contains("Le prénom / pseudo est obligatoire"));
    }

    #[test]
    fn filling_user_info_and_next_moves_to_problem_with_tab_focus() {
        let api: Arc<dyn MediationApi> = StubApi::answering(201);
        let mut state = fresh();

        press(&mut state, &api, &[KeyCode::Tab]);
        assert_eq!(state.focused_field(), Some(FieldId::FirstName));
        type_text(&mut state, &api, "Bill");
        press(&mut state, &api, &[KeyCode::Down, KeyCode::Down]);
        assert_eq!(state.focused_field(), Some(FieldId::Email));
        type_text(&mut state, &api, "bluebill@koena.net");

        state.set_focus(FocusTarget::Button(ButtonFocus::Next));
        press(&mut state, &api, &[KeyCode::Enter]);

        assert_eq!(state.container.router().current_path(), PROBLEM_DESCRIPTION_PATH);
        assert_eq!(state.focus, FocusTarget::Tabs);
        assert_eq!(state.container.tabs().focused(), 1);
        assert_eq!(state.container.state().user_info.first_name, "Bill");
        assert!(rendered(&state, 100).contains("Step 2: Your problem"));
    }

    #[test]
    fn going_back_to_user_info_reloads_same_answers() {
        let api: Arc<dyn MediationApi> = StubApi::answering(201);
        let mut state = fresh();
        press(&mut state, &api, &[KeyCode::Tab]);
        type_text(&mut state, &api, "Bill");
        press(&mut state, &api, &[KeyCode::Down, KeyCode::Down]);
        type_text(&mut state, &api, "bluebill@koena.net");

        for round in 0..3 {
            state.set_focus(FocusTarget::Button(ButtonFocus::Next));
            press(&mut state, &api, &[KeyCode::Enter]);
            assert_eq!(state.container.active_step(), 1, "round {}", round);

            if round % 2 == 0 {
                state.set_focus(FocusTarget::Button(ButtonFocus::Previous));
                press(&mut state, &api, &[KeyCode::Enter]);
            } else {
                assert_eq!(state.focus, FocusTarget::Tabs);
                press(&mut state, &api, &[KeyCode::Left, KeyCode::Enter]);
            }
            assert_eq!(state.container.active_step(), 0, "round {}", round);
            assert_eq!(state.draft.user_info.first_name, "Bill", "round {}", round);
            assert_eq!(state.draft.user_info.email, "bluebill@koena.net", "round {}", round);
            assert_eq!(state.container.state().user_info, state.draft.user_info);
        }
    }

    #[test]
    fn failed_next_focuses_first_error_and_shows_message() {
        let api: Arc<dyn MediationApi> = StubApi::answering(201);
        let mut state = fresh();
        state.set_focus(FocusTarget::Button(ButtonFocus::Next));
        press(&mut state, &api, &[KeyCode::Enter]);

        assert_eq!(state.focused_field(), Some(FieldId::FirstName));
        assert_eq!(state.container.router().current_path(), ROOT_PATH);
        assert!(rendered(&state, 100).contains(FIRST_NAME_REQUIRED));
    }

    #[test]
    fn locked_tabs_ignore_arrow_keys() {
        let api: Arc<dyn MediationApi> = StubApi::answering(201);
        let mut state = fresh();
        press(&mut state, &api, &[KeyCode::Right, KeyCode::Right, KeyCode::Enter]);
        assert_eq!(state.container.tabs().focused(), 0);
        assert_eq!(state.container.active_step(), 0);
    }

    #[test]
    fn choice_answer_reveals_follow_up_fields() {
        let api: Arc<dyn MediationApi> = StubApi::answering(201);
        let mut state = fresh();
        state.container.next(crate::models::state::StepData::UserInfo(
            crate::models::state::UserInfo {
                first_name: "Bill".to_string(),
                email: "bluebill@koena.net".to_string(),
                ..Default::default()
            },
        ))
        .unwrap();
        state.after_navigation();

        let browser_used = state
            .fields()
            .iter()
            .position(|f| *f == FieldId::BrowserUsed)
            .unwrap();
        state.set_focus(FocusTarget::Field(browser_used));
        // not specified -> yes -> no
        press(&mut state, &api, &[KeyCode::Char(' '), KeyCode::Char(' ')]);
        assert!(state.fields().contains(&FieldId::MobileAppUsed));
        assert!(!state.fields().contains(&FieldId::Url));
    }

    #[test]
    fn narrow_terminal_stacks_tabs_vertically() {
        let mut state = fresh();
        state
            .container
            .set_orientation(Orientation::for_width(80, state.breakpoint));
        assert_eq!(state.container.tabs().orientation(), Orientation::Vertical);
        let screen = rendered(&state, 80);
        assert!(screen.contains("1. About you"));
    }

    #[test]
    fn confirmed_reset_empties_the_form() {
        let api: Arc<dyn MediationApi> = StubApi::answering(201);
        let mut state = new_smoke_state("recap", Language::En).unwrap();
        assert!(!state.container.state().is_empty());

        state.set_focus(FocusTarget::Button(ButtonFocus::Reset));
        press(&mut state, &api, &[KeyCode::Enter]);
        assert_eq!(state.modal, Some(Modal::ConfirmReset));
        press(&mut state, &api, &[KeyCode::Left, KeyCode::Enter]);

        assert_eq!(state.modal, None);
        assert!(state.container.state().is_empty());
        assert_eq!(state.container.active_step(), 0);
        assert!(state.draft.user_info.first_name.is_empty());
    }

    #[test]
    fn dialogs_render_in_small_terminals() {
        for (width, height) in [(30, 5), (30, 30), (100, 5)] {
            let mut state = new_smoke_state("reset-modal", Language::En).unwrap();
            rendered_in(&state, width, height);
            state.modal = Some(Modal::ConfirmQuit);
            rendered_in(&state, width, height);
        }
        let state = new_smoke_state("reset-modal", Language::En).unwrap();
        assert!(rendered_in(&state, 100, 30).contains("[ No ]"));
    }

    #[test]
    fn declined_quit_keeps_running() {
        let api: Arc<dyn MediationApi> = StubApi::answering(201);
        let mut state = fresh();
        press(&mut state, &api, &[KeyCode::Esc, KeyCode::Enter]);
        assert!(!state.quit);
        press(&mut state, &api, &[KeyCode::Esc, KeyCode::Right, KeyCode::Enter]);
        assert!(state.quit);
    }

    fn submit_from_recap(status: u16) -> TuiState<MemoryStorage> {
        let stub = StubApi::answering(status);
        let api: Arc<dyn MediationApi> = stub.clone();
        let mut state = new_smoke_state("recap", Language::En).unwrap();
        let (tx, rx) = mpsc::channel();

        state.set_focus(FocusTarget::Button(ButtonFocus::Submit));
        handle_key(&mut state, KeyCode::Enter, &tx, &api);
        assert!(state.submitting);
        // input is ignored while the request is in flight
        handle_key(&mut state, KeyCode::Esc, &tx, &api);
        assert_eq!(state.modal, None);

        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        state.apply_message(msg);
        assert!(!state.submitting);
        assert_eq!(stub.call_count.load(Ordering::SeqCst), 1);
        state
    }

    #[test]
    fn successful_submit_resets_and_notifies() {
        let state = submit_from_recap(201);
        assert!(state.container.state().is_empty());
        assert_eq!(state.container.router().current_path(), ROOT_PATH);
        let notification = state.container.notification().unwrap();
        assert_eq!(notification.severity, Severity::Success);
        assert!(state.notification_since.is_some());
    }

    #[test]
    fn failed_submit_keeps_answers_on_summary() {
        let state = submit_from_recap(500);
        assert!(state.container.is_recap());
        assert_eq!(state.container.state().user_info.first_name, "Bill");
        assert_eq!(
            state.container.notification().map(|n| n.severity),
            Some(Severity::Error)
        );
        assert!(rendered(&state, 100).contains("Esc to close"));
    }
}

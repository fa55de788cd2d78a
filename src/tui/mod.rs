//! TUI module - workout screen with rest timer and trivia, built on ratatui

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Gauge, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
};
use std::io::{Stdout, stdout};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::{ApiError, BackendClient};
use crate::exercises::Catalog;
use crate::session::{CompletionEvent, SetField, SetUpdate, WorkoutSession};
use crate::timer::{Phase, SetKey, TimerDriver, TimerEvent, driver::DEFAULT_PERIOD, format_for_display};
use crate::trivia::{TriviaDeck, TriviaRound};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const WEIGHT_STEP: f64 = 5.0;
const REST_STEP: f64 = 15.0;

#[derive(Debug, Clone)]
enum Mode {
    Session,
    Catalog { selected: usize },
    /// Typed value for one field of the current set
    Input { field: SetField, buffer: String },
}

/// What the screen hands back on quit
pub struct Outcome {
    pub session: WorkoutSession,
    /// Last save succeeded and nothing changed after it
    pub saved: bool,
}

/// App state for TUI
pub struct App {
    session: WorkoutSession,
    catalog: Catalog,
    deck: TriviaDeck,
    round: Option<TriviaRound>,
    timer: TimerDriver,
    timer_events: mpsc::UnboundedReceiver<TimerEvent>,
    client: BackendClient,
    user_id: i64,
    save_tx: mpsc::UnboundedSender<(u64, Result<(), ApiError>)>,
    save_rx: mpsc::UnboundedReceiver<(u64, Result<(), ApiError>)>,
    save_in_flight: bool,
    revision: u64,
    saved_revision: Option<u64>,
    selected: usize,
    mode: Mode,
    status: Option<String>,
    should_quit: bool,
}

impl App {
    /// Must be created inside a tokio runtime
    pub fn new(
        session: WorkoutSession,
        catalog: Catalog,
        deck: TriviaDeck,
        client: BackendClient,
        user_id: i64,
    ) -> Self {
        let (timer, timer_events) = TimerDriver::new(DEFAULT_PERIOD);
        let (save_tx, save_rx) = mpsc::unbounded_channel();
        Self {
            session,
            catalog,
            deck,
            round: None,
            timer,
            timer_events,
            client,
            user_id,
            save_tx,
            save_rx,
            save_in_flight: false,
            revision: 0,
            saved_revision: None,
            selected: 0,
            mode: Mode::Session,
            status: None,
            should_quit: false,
        }
    }

    /// Run the TUI application. The session comes back even when the
    /// terminal fails, so the caller can still store it.
    pub fn run(mut self) -> (Outcome, Result<()>) {
        let result = init_terminal().and_then(|mut terminal| {
            let looped = self.event_loop(&mut terminal);
            let restored = restore_terminal();
            looped.and(restored)
        });
        if let Err(e) = &result {
            warn!(error = %e, "terminal failed, leaving the workout screen");
        }
        (self.finish(), result)
    }

    fn finish(mut self) -> Outcome {
        // leaving the screen stops the countdown
        self.timer.cancel();
        Outcome {
            saved: self.saved_revision == Some(self.revision),
            session: self.session,
        }
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            self.pump();
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// Drain timer and save notifications
    fn pump(&mut self) {
        while let Ok(TimerEvent::Expired { trigger }) = self.timer_events.try_recv() {
            self.round = None;
            self.status = Some(match trigger.and_then(|k| self.set_label(k)) {
                Some(label) => format!("Rest over - next up after {}", label),
                None => "Rest over".to_string(),
            });
        }
        while let Ok((revision, result)) = self.save_rx.try_recv() {
            self.save_in_flight = false;
            match result {
                Ok(()) => {
                    self.saved_revision = Some(revision);
                    self.status = Some("Workout saved".to_string());
                }
                Err(e) => {
                    warn!(error = %e, "save failed");
                    self.status = Some(e.user_message());
                }
            }
        }
    }

    fn set_label(&self, key: SetKey) -> Option<String> {
        self.session
            .exercises()
            .iter()
            .find(|e| e.id == key.exercise_id)
            .map(|e| format!("{} set {}", e.name, key.set_index))
    }

    fn rows(&self) -> Vec<(usize, u32)> {
        self.session
            .exercises()
            .iter()
            .enumerate()
            .flat_map(|(ei, ex)| ex.sets.iter().map(move |s| (ei, s.index)))
            .collect()
    }

    fn current(&self) -> Option<(usize, u32)> {
        self.rows().get(self.selected).copied()
    }

    fn clamp_cursor(&mut self) {
        let n = self.rows().len();
        self.selected = self.selected.min(n.saturating_sub(1));
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let title = format!(
            "vigil - {} | {} sets done | volume {}",
            self.session.name(),
            self.session.completed_sets(),
            self.session.total_volume()
        );
        let header = Paragraph::new(title)
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        match &self.mode {
            Mode::Catalog { selected } => self.render_catalog(frame, body[0], *selected),
            Mode::Session | Mode::Input { .. } => self.render_sets(frame, body[0]),
        }
        self.render_rest(frame, body[1]);

        // Footer
        let keys = match &self.mode {
            Mode::Session => {
                "j/k: move | +/-: weight | r/R: reps | w/p/t: type weight/reps/rest | [/]: rest -/+ | space: done | a/x: set +/- | e: add exercise | d: drop exercise | c: cancel rest | 1-9: answer | n: next question | s: save | q: quit"
                    .to_string()
            }
            Mode::Catalog { .. } => "j/k: move | enter: add | esc: back".to_string(),
            Mode::Input { field, buffer } => {
                format!("{}: {}_ | enter: apply | esc: back", field_label(*field), buffer)
            }
        };
        let footer_text = match &self.status {
            Some(msg) => format!("{}\n{}", msg, keys),
            None => keys,
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn render_sets(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .session
            .exercises()
            .iter()
            .flat_map(|ex| {
                ex.sets.iter().map(move |s| {
                    let name = if s.index == 1 { ex.name.clone() } else { String::new() };
                    let style = if s.completed {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default()
                    };
                    Row::new(vec![
                        Cell::from(name),
                        Cell::from(s.index.to_string()),
                        Cell::from(s.weight.to_string()),
                        Cell::from(s.reps.to_string()),
                        Cell::from(if s.completed { "x" } else { "" }),
                        Cell::from(format_for_display(f64::from(s.rest_duration_secs))),
                    ])
                    .style(style)
                })
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(18),
                Constraint::Length(4),
                Constraint::Length(7),
                Constraint::Length(5),
                Constraint::Length(5),
                Constraint::Length(6),
            ],
        )
        .header(
            Row::new(vec!["Exercise", "Set", "Weight", "Reps", "Done", "Rest"])
                .style(Style::default().bold()),
        )
        .row_highlight_style(Style::default().reversed())
        .block(Block::default().borders(Borders::ALL).title("Sets"));

        let mut state = TableState::default().with_selected(Some(self.selected));
        if self.session.is_empty() {
            state.select(None);
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_catalog(&self, frame: &mut Frame, area: Rect, selected: usize) {
        let items: Vec<ListItem> = self
            .catalog
            .entries()
            .iter()
            .map(|e| {
                let taken = self.session.exercises().iter().any(|x| x.id == e.id);
                let mark = if taken { "* " } else { "  " };
                ListItem::new(format!("{}{} ({})", mark, e.name, e.muscle_group))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().reversed())
            .block(Block::default().borders(Borders::ALL).title("Catalog"));
        let mut state = ListState::default().with_selected(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_rest(&self, frame: &mut Frame, area: Rect) {
        let snap = self.timer.snapshot();
        let block = Block::default().borders(Borders::ALL).title("Rest");

        if snap.phase != Phase::Running {
            let text = match snap.phase {
                Phase::Expired => "Rest over. Get back to it!",
                _ => "Complete a set to start resting.",
            };
            frame.render_widget(Paragraph::new(text).block(block), area);
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3)])
            .split(inner);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(snap.progress.clamp(0.0, 1.0))
            .label(format_for_display(snap.remaining_secs));
        frame.render_widget(gauge, parts[0]);

        let Some(round) = &self.round else {
            if self.deck.is_empty() {
                frame.render_widget(Paragraph::new("\nNo trivia available."), parts[1]);
            }
            return;
        };
        let mut lines = vec![
            Line::from(""),
            Line::from(format!("Q: {}", round.question().question)).bold(),
            Line::from(""),
        ];
        for (i, option) in round.options().iter().enumerate() {
            let style = match round.outcome() {
                Some(o) if *option == o.correct_answer => Style::default().fg(Color::Green),
                Some(o) if *option == o.chosen => Style::default().fg(Color::Red),
                _ => Style::default(),
            };
            lines.push(Line::styled(format!("{}. {}", i + 1, option), style));
        }
        if let Some(outcome) = round.outcome() {
            lines.push(Line::from(""));
            lines.push(Line::from(outcome.feedback()));
        }
        let trivia = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(trivia, parts[1]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match self.mode {
                Mode::Session => self.handle_session_key(key.code),
                Mode::Catalog { .. } => self.handle_catalog_key(key.code),
                Mode::Input { .. } => self.handle_input_key(key.code),
            }
        }
        Ok(())
    }

    fn handle_session_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected += 1;
                self.clamp_cursor();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_weight(WEIGHT_STEP),
            KeyCode::Char('-') => self.adjust_weight(-WEIGHT_STEP),
            KeyCode::Char('r') => self.adjust_reps(1.0),
            KeyCode::Char('R') => self.adjust_reps(-1.0),
            KeyCode::Char(']') => self.adjust_rest(REST_STEP),
            KeyCode::Char('[') => self.adjust_rest(-REST_STEP),
            KeyCode::Char('w') => self.begin_input(SetField::Weight),
            KeyCode::Char('p') => self.begin_input(SetField::Reps),
            KeyCode::Char('t') => self.begin_input(SetField::Rest),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_completed(),
            KeyCode::Char('a') => {
                if let Some((ei, _)) = self.current() {
                    let index = self.session.add_set(ei);
                    self.touch();
                    self.status = Some(format!("Added set {}", index));
                }
            }
            KeyCode::Char('x') => {
                if let Some((ei, _)) = self.current() {
                    match self.session.remove_set(ei) {
                        Ok(set) => {
                            self.touch();
                            self.clamp_cursor();
                            self.status = Some(format!("Removed set {}", set.index));
                        }
                        Err(e) => self.status = Some(capitalize(&e.to_string())),
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some((ei, _)) = self.current() {
                    let removed = self.session.remove_exercise(ei);
                    self.touch();
                    self.clamp_cursor();
                    self.status = Some(format!("Removed {}", removed.name));
                }
            }
            KeyCode::Char('e') => {
                if self.catalog.is_empty() {
                    self.status = Some("Exercise catalog unavailable".to_string());
                } else {
                    self.mode = Mode::Catalog { selected: 0 };
                }
            }
            KeyCode::Char('c') if self.timer.is_running() => {
                self.timer.cancel();
                self.round = None;
                self.status = Some("Rest skipped".to_string());
            }
            KeyCode::Char('n') => self.next_question(),
            KeyCode::Char('s') => self.save(),
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                self.answer(idx);
            }
            _ => {}
        }
    }

    fn handle_catalog_key(&mut self, code: KeyCode) {
        let Mode::Catalog { selected } = self.mode else {
            return;
        };
        let last = self.catalog.entries().len().saturating_sub(1);
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.mode = Mode::Session,
            KeyCode::Down | KeyCode::Char('j') => {
                self.mode = Mode::Catalog { selected: (selected + 1).min(last) };
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.mode = Mode::Catalog { selected: selected.saturating_sub(1) };
            }
            KeyCode::Enter => {
                let Some(entry) = self.catalog.entries().get(selected).cloned() else {
                    return;
                };
                match self.session.add_exercise(&entry) {
                    Ok(()) => {
                        self.touch();
                        self.mode = Mode::Session;
                        self.selected = self.rows().len().saturating_sub(1);
                        self.status = Some(format!("Added {}", entry.name));
                    }
                    Err(e) => self.status = Some(capitalize(&e.to_string())),
                }
            }
            _ => {}
        }
    }

    fn begin_input(&mut self, field: SetField) {
        if self.current().is_some() {
            self.mode = Mode::Input { field, buffer: String::new() };
        }
    }

    fn handle_input_key(&mut self, code: KeyCode) {
        let Mode::Input { field, buffer } = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Esc => self.mode = Mode::Session,
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == ':' => buffer.push(c),
            KeyCode::Enter => {
                let update = SetUpdate::parse(*field, buffer.as_str());
                self.mode = Mode::Session;
                self.apply_to_current(update);
            }
            _ => {}
        }
    }

    fn apply_to_current(&mut self, update: SetUpdate) {
        let Some((ei, si)) = self.current() else {
            return;
        };
        let event = self.session.update_set(ei, si, update);
        self.touch();
        if let SetUpdate::Rest(_) = update {
            self.rest_changed(ei, si);
        }
        if let Some(event) = event {
            self.begin_rest(&event);
        }
    }

    fn adjust_rest(&mut self, delta: f64) {
        if let Some((ei, si)) = self.current() {
            let current = self.session.exercise(ei).sets[si as usize - 1].rest_duration_secs;
            self.apply_to_current(SetUpdate::Rest(f64::from(current) + delta));
        }
    }

    /// A new rest length for the set that armed the running countdown
    /// restarts it at that length.
    fn rest_changed(&mut self, ei: usize, si: u32) {
        let ex = self.session.exercise(ei);
        let secs = ex.sets[si as usize - 1].rest_duration_secs;
        let key = SetKey { exercise_id: ex.id, set_index: si };
        let label = format!("{} set {}", ex.name, si);

        if self.timer.is_running() && self.timer.snapshot().trigger == Some(key) {
            match self.timer.start(secs, Some(key)) {
                Ok(()) => {
                    self.status = Some(format!("Rest restarted at {}", format_for_display(f64::from(secs))));
                }
                Err(e) => self.status = Some(capitalize(&e.to_string())),
            }
        } else {
            self.status = Some(format!("{} rest {}", label, format_for_display(f64::from(secs))));
        }
    }

    fn adjust_weight(&mut self, delta: f64) {
        if let Some((ei, si)) = self.current() {
            let current = self.session.exercise(ei).sets[si as usize - 1].weight;
            self.session.update_set(ei, si, SetUpdate::Weight(f64::from(current) + delta));
            self.touch();
        }
    }

    fn adjust_reps(&mut self, delta: f64) {
        if let Some((ei, si)) = self.current() {
            let current = self.session.exercise(ei).sets[si as usize - 1].reps;
            self.session.update_set(ei, si, SetUpdate::Reps(f64::from(current) + delta));
            self.touch();
        }
    }

    fn toggle_completed(&mut self) {
        let Some((ei, si)) = self.current() else {
            return;
        };
        let done = self.session.exercise(ei).sets[si as usize - 1].completed;
        let event = self.session.update_set(ei, si, SetUpdate::Completed(!done));
        self.touch();
        // un-completing a set leaves a running rest alone
        if let Some(event) = event {
            self.begin_rest(&event);
        }
    }

    fn begin_rest(&mut self, event: &CompletionEvent) {
        match self.timer.start(event.rest_duration_secs, Some(SetKey::from(event))) {
            Ok(()) => {
                self.round = self.deck.next_round().ok();
                self.status = Some(format!(
                    "{} set {} done - rest {}",
                    event.exercise_name,
                    event.set_index,
                    format_for_display(f64::from(event.rest_duration_secs))
                ));
            }
            Err(e) => self.status = Some(capitalize(&e.to_string())),
        }
    }

    fn answer(&mut self, option_idx: usize) {
        if !self.timer.is_running() {
            return;
        }
        if let Some(round) = self.round.as_mut()
            && round.record_option(option_idx).is_some()
        {
            info!(option_idx, "trivia answered");
        }
    }

    fn next_question(&mut self) {
        if !self.timer.is_running() {
            return;
        }
        match self.deck.next_round() {
            Ok(round) => self.round = Some(round),
            Err(e) => self.status = Some(capitalize(&e.to_string())),
        }
    }

    fn save(&mut self) {
        if self.save_in_flight {
            self.status = Some("Save already in progress".to_string());
            return;
        }
        if self.session.is_empty() {
            self.status = Some("Nothing to save yet".to_string());
            return;
        }
        let payload = self.session.serialize(self.user_id);
        let client = self.client.clone();
        let tx = self.save_tx.clone();
        let revision = self.revision;
        self.save_in_flight = true;
        self.status = Some("Saving...".to_string());
        tokio::spawn(async move {
            let result = client.save_workout(&payload).await;
            let _ = tx.send((revision, result));
        });
    }
}

fn field_label(field: SetField) -> &'static str {
    match field {
        SetField::Weight => "Weight",
        SetField::Reps => "Reps",
        SetField::Rest => "Rest (M:SS)",
        SetField::Completed => "Done",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::{CatalogEntry, Preset};
    use crate::trivia::Question;
    use std::time::Duration;

    fn app(session: WorkoutSession) -> App {
        let catalog = Catalog::new(vec![CatalogEntry {
            id: 1,
            name: "Chest Press".into(),
            description: None,
            muscle_group: "Chest".into(),
        }]);
        let deck = TriviaDeck::new(vec![Question {
            question: "Q".into(),
            correct_answer: "A".into(),
            incorrect_answers: vec!["B".into()],
            description: String::new(),
        }]);
        let client = BackendClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        App::new(session, catalog, deck, client, 1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_completing_set_arms_rest_and_trivia() {
        let mut app = app(WorkoutSession::from_preset(Preset::Push));
        app.handle_session_key(KeyCode::Char(' '));

        let snap = app.timer.snapshot();
        assert_eq!(snap.phase, Phase::Running);
        assert_eq!(snap.total_secs, 120);
        assert_eq!(snap.trigger, Some(SetKey { exercise_id: 1, set_index: 1 }));
        assert!(app.round.is_some());

        app.handle_session_key(KeyCode::Char('1'));
        assert!(app.round.as_ref().unwrap().is_answered());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_hides_trivia() {
        let mut app = app(WorkoutSession::from_preset(Preset::Push));
        app.handle_session_key(KeyCode::Char(' '));
        tokio::time::sleep(Duration::from_secs(121)).await;
        app.pump();
        assert!(app.round.is_none());
        assert_eq!(app.status.as_deref(), Some("Rest over - next up after Chest Press set 1"));
    }

    #[tokio::test]
    async fn test_catalog_duplicate_reports_status() {
        let mut app = app(WorkoutSession::from_preset(Preset::Push));
        app.handle_session_key(KeyCode::Char('e'));
        app.handle_catalog_key(KeyCode::Enter);
        assert_eq!(app.session.len(), 3);
        assert_eq!(
            app.status.as_deref(),
            Some("Exercise 1 is already in this workout")
        );
    }

    #[tokio::test]
    async fn test_remove_last_set_reports_status() {
        let mut session = WorkoutSession::empty();
        session
            .add_exercise(&CatalogEntry::placeholder(3))
            .unwrap();
        let mut app = app(session);
        app.handle_session_key(KeyCode::Char('x'));
        assert_eq!(app.status.as_deref(), Some("No sets to remove"));
        assert_eq!(app.session.exercise(0).sets.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_session() {
        let mut app = app(WorkoutSession::from_preset(Preset::Legs));
        app.handle_session_key(KeyCode::Char('r'));
        let before = app.session.clone();

        app.handle_session_key(KeyCode::Char('s'));
        assert!(app.save_in_flight);
        // edits keep working while the save is pending
        app.handle_session_key(KeyCode::Char('+'));

        let (revision, result) = app.save_rx.recv().await.unwrap();
        assert!(result.is_err());
        app.save_tx.send((revision, result)).unwrap();
        app.pump();

        assert!(!app.save_in_flight);
        assert_eq!(app.session.exercise(0).sets[0].reps, before.exercise(0).sets[0].reps);
        assert_eq!(app.session.exercise(0).sets[0].weight, 5);
        assert_ne!(app.saved_revision, Some(app.revision));
    }

    fn press(app: &mut App, keys: &str) {
        for c in keys.chars() {
            let code = if c == '\n' { KeyCode::Enter } else { KeyCode::Char(c) };
            match app.mode {
                Mode::Session => app.handle_session_key(code),
                Mode::Catalog { .. } => app.handle_catalog_key(code),
                Mode::Input { .. } => app.handle_input_key(code),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rest_edit_restarts_running_rest() {
        let mut app = app(WorkoutSession::from_preset(Preset::Push));
        press(&mut app, " ");
        assert_eq!(app.timer.snapshot().total_secs, 120);

        press(&mut app, "]");
        assert_eq!(app.session.exercise(0).sets[0].rest_duration_secs, 135);
        let snap = app.timer.snapshot();
        assert_eq!(snap.phase, Phase::Running);
        assert_eq!(snap.total_secs, 135);
        assert_eq!(snap.trigger, Some(SetKey { exercise_id: 1, set_index: 1 }));
        assert_eq!(app.status.as_deref(), Some("Rest restarted at 02:15"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rest_edit_on_other_set_keeps_countdown() {
        let mut app = app(WorkoutSession::from_preset(Preset::Push));
        press(&mut app, " j[");
        assert_eq!(app.session.exercise(0).sets[1].rest_duration_secs, 105);
        assert_eq!(app.timer.snapshot().total_secs, 120);
        assert_eq!(app.status.as_deref(), Some("Chest Press set 2 rest 01:45"));
    }

    #[tokio::test]
    async fn test_typed_weight_and_rest() {
        let mut app = app(WorkoutSession::from_preset(Preset::Pull));
        press(&mut app, "w62.5\n");
        assert_eq!(app.session.exercise(0).sets[0].weight, 62);

        press(&mut app, "t1:30\n");
        assert_eq!(app.session.exercise(0).sets[0].rest_duration_secs, 90);
        assert!(matches!(app.mode, Mode::Session));

        // letters are ignored while typing, esc drops the entry
        press(&mut app, "pxx9");
        app.handle_input_key(KeyCode::Esc);
        assert_eq!(app.session.exercise(0).sets[0].reps, 0);
    }

    #[tokio::test]
    async fn test_finish_returns_unsaved_edits() {
        let mut app = app(WorkoutSession::from_preset(Preset::Legs));
        press(&mut app, "r ");
        let outcome = app.finish();
        assert!(!outcome.saved);
        assert_eq!(outcome.session.exercise(0).sets[0].reps, 1);
        assert!(outcome.session.exercise(0).sets[0].completed);
    }
}

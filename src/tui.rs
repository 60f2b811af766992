use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::git::BranchCandidate;
use crate::locale::Localizer;
use crate::select::{SelectError, Selection, Selector};

/// Checkbox list drawn with ratatui on the alternate screen.
pub struct CheckboxSelector<'a> {
    localizer: &'a Localizer,
}

impl<'a> CheckboxSelector<'a> {
    pub fn new(localizer: &'a Localizer) -> Self {
        Self { localizer }
    }
}

impl Selector for CheckboxSelector<'_> {
    fn select(&mut self, candidates: &[BranchCandidate]) -> Result<Selection, SelectError> {
        let mut app = App::new(candidates);
        run(&mut app, self.localizer)?;

        if app.confirmed() {
            Ok(Selection::Chosen(app.selected_candidates()))
        } else {
            Ok(Selection::Cancelled)
        }
    }
}

pub fn run(app: &mut App, localizer: &Localizer) -> io::Result<()> {
    if app.is_empty() {
        app.cancel();
        return Ok(());
    }

    enable_raw_mode()?;
    let result = execute!(io::stdout(), EnterAlternateScreen)
        .and_then(|()| Terminal::new(CrosstermBackend::new(io::stdout())))
        .and_then(|mut terminal| {
            let looped = event_loop(&mut terminal, app, localizer);
            terminal.show_cursor()?;
            looped
        });

    // Restore the terminal even when drawing or input failed.
    let left = execute!(io::stdout(), LeaveAlternateScreen);
    disable_raw_mode()?;
    result.and(left)
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    localizer: &Localizer,
) -> io::Result<()> {
    terminal.clear()?;
    loop {
        terminal.draw(|frame| crate::ui::draw(frame, app, localizer))?;

        if app.should_quit() {
            return Ok(());
        }

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                handle_key_event(app, key);
            }
        }
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.cancel(),
        KeyCode::Char('q') | KeyCode::Esc => app.cancel(),
        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::Char(' ') => app.toggle_current(),
        KeyCode::Char('a') => app.toggle_all(),
        KeyCode::Enter => app.confirm(),
        _ => {}
    }
}

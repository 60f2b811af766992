use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::App;
use crate::locale::Localizer;

pub fn draw(frame: &mut Frame<'_>, app: &App, localizer: &Localizer) {
    let size = frame.size();

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(4)].as_ref())
        .split(size);

    let mut state = ListState::default();
    if !app.is_empty() {
        state.select(Some(app.cursor()));
    }

    let merged_label = localizer.tr("Merged");
    let list_items: Vec<ListItem> = app
        .items()
        .iter()
        .map(|branch| {
            let marker = if branch.selected { "[x]" } else { "[ ]" };
            let mut spans = vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::raw(" "),
                Span::styled(
                    branch.candidate.name.as_str(),
                    Style::default().fg(Color::Yellow),
                ),
            ];
            if branch.candidate.merged {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    format!("({merged_label})"),
                    Style::default().fg(Color::Green),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(
        "{} {} / {}",
        localizer.tr("SelectBranchesToDelete"),
        app.selected_count(),
        app.total_count()
    );

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(Span::styled(
                    title,
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, vertical[0], &mut state);

    let count = app.selected_count().to_string();
    let status_line = match app.message() {
        Some(key) => localizer.tr(key),
        None => localizer.tr_with("CheckboxStatus", &[("Count", count.as_str())]),
    };

    let status_block = Paragraph::new(vec![
        Line::from(localizer.tr("CheckboxHelp")),
        Line::from(status_line),
    ])
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(status_block, vertical[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::BranchCandidate;
    use crate::locale::Language;
    use ratatui::{Terminal, backend::TestBackend};

    fn rendered(app: &App) -> String {
        let localizer = Localizer::for_language(Language::English).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|frame| draw(frame, app, &localizer))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn shows_merge_tag_and_counts() {
        let mut app = App::new(&[
            BranchCandidate {
                name: "feature-a".into(),
                merged: true,
            },
            BranchCandidate {
                name: "feature-b".into(),
                merged: false,
            },
        ]);
        app.toggle_current();
        let screen = rendered(&app);
        assert!(screen.contains("[x] feature-a  (merged)"));
        assert!(screen.contains("[ ] feature-b"));
        assert!(screen.contains("1 / 2"));
        assert!(screen.contains("1 selected"));
    }
}

use crate::gui::{error::GuiError, raw_terminal::RawTerminal};
use crate::registry::NamedLocation;

use crossterm::event::{self, KeyCode, KeyEventKind};
use ratatui::{
    prelude::*,
    widgets::{
        block::{Position, Title},
        *,
    },
};

/// Lets the user pick a destination with the arrow keys. `Ok(None)` means
/// the user quit without choosing.
pub fn destination_selector(
    locations: &[&NamedLocation],
) -> Result<Option<NamedLocation>, GuiError> {
    if locations.is_empty() {
        return Err(GuiError::NothingToSelect);
    }

    let mut raw = RawTerminal::enter()?;

    let mut cursor = 0;
    let mut list_state = ListState::default().with_selected(Some(cursor));
    let n_locations = locations.len();
    let mut selected = None;
    loop {
        let title = Title::from(" Choose a Destination ".magenta().bold());
        let instructions = Title::from(Line::from(vec![
            " Navigate ".into(),
            "<Up>/<Down>".magenta().bold(),
            " Select ".into(),
            "<Enter>".magenta().bold(),
            " Quit ".into(),
            "<Q> ".magenta().bold(),
        ]));
        let block = Block::default()
            .title(title.alignment(Alignment::Center))
            .title(
                instructions
                    .alignment(Alignment::Center)
                    .position(Position::Bottom),
            )
            .borders(Borders::ALL);
        let names = locations.iter().map(|l| {
            if l.description.is_empty() {
                l.name.clone()
            } else {
                format!("{} - {}", l.name, l.description)
            }
        });
        let list = List::new(names)
            .style(Style::default().fg(Color::White))
            .highlight_symbol(">>")
            .highlight_style(Style::default().fg(Color::Magenta))
            .block(block);
        list_state.select(Some(cursor));
        raw.terminal().draw(|frame| {
            let area = frame.size();
            frame.render_stateful_widget(list, area, &mut list_state);
        })?;
        if event::poll(std::time::Duration::from_millis(16))? {
            if let event::Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Down => {
                            cursor = (cursor + 1) % n_locations;
                        }
                        KeyCode::Up => {
                            cursor = (cursor + n_locations - 1) % n_locations;
                        }
                        KeyCode::Enter => {
                            selected = Some(cursor);
                            break;
                        }
                        KeyCode::Char('q') => break,
                        _ => {}
                    }
                }
            }
        }
    }

    drop(raw);

    Ok(selected.map(|i| locations[i].clone()))
}

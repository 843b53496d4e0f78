use std::{
    collections::VecDeque,
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread::{spawn, JoinHandle},
};

use crate::gui::{error::GuiError, raw_terminal::RawTerminal};

use crossterm::event::{self, KeyEventKind};

use ratatui::{
    prelude::*,
    widgets::{block::Title, *},
};

/// How many lines of `messages` stay on screen.
const SHOWN_MESSAGES: usize = 12;

enum ThreadMessage {
    Stop,
}

/// Generates a gui that runs a function until the user provides input.
///
/// The function can be thought of as a recursive fold. `init` contains the
/// inital state of the loop, then `f` is called on the inital state to produce
/// a new state, and then `f` is called on that new state, and so on until the
/// user indicates that this should stop.
///
/// Whatever arrives on `messages` while the fold runs is shown, newest last.
pub fn fold_until_stop<F, T>(
    title: &str,
    init: T,
    f: F,
    messages: Receiver<String>,
) -> Result<T, GuiError>
where
    F: FnMut(T) -> T + Send + 'static,
    T: Send + 'static,
{
    let mut raw = RawTerminal::enter()?;

    let (stop_tx, stop_rx) = mpsc::channel();
    let (res_tx, res_rx) = mpsc::channel();
    let th = spawn_fold(init, f, stop_rx, res_tx);

    let mut shown: VecDeque<String> = VecDeque::with_capacity(SHOWN_MESSAGES);
    let title = format!(" {} ", title);
    loop {
        while let Ok(message) = messages.try_recv() {
            if shown.len() == SHOWN_MESSAGES {
                shown.pop_front();
            }
            shown.push_back(message);
        }

        let block = Block::default()
            .title(Title::from(title.as_str().magenta().bold()).alignment(Alignment::Center))
            .title(
                Title::from(" Press any key to stop ")
                    .alignment(Alignment::Center)
                    .position(block::Position::Bottom),
            )
            .borders(Borders::ALL);
        let lines: Vec<Line> = shown.iter().map(|m| Line::from(m.as_str())).collect();
        let text = Paragraph::new(lines).block(block);

        raw.terminal().draw(|frame| {
            let area = frame.size();
            frame.render_widget(text, area);
        })?;
        if event::poll(std::time::Duration::from_millis(16))? {
            if let event::Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    break;
                }
            }
        }
    }

    stop_tx.send(ThreadMessage::Stop)?;
    let res = res_rx.recv()?;
    th.join().map_err(|_| GuiError::JoinError)?;

    Ok(res)
}

/// Runs the fold on its own thread until told to stop, or until the stop
/// channel goes away, then hands the last value back on `res_tx`.
fn spawn_fold<F, T>(
    init: T,
    mut f: F,
    stop_rx: Receiver<ThreadMessage>,
    res_tx: Sender<T>,
) -> JoinHandle<()>
where
    F: FnMut(T) -> T + Send + 'static,
    T: Send + 'static,
{
    spawn(move || {
        let mut val = init;

        loop {
            val = f(val);
            match stop_rx.try_recv() {
                Ok(ThreadMessage::Stop) | Err(TryRecvError::Disconnected) => {
                    // The receiver only goes away if the gui thread already failed.
                    let _ = res_tx.send(val);
                    break;
                }
                Err(TryRecvError::Empty) => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_stops_when_asked() {
        let (stop_tx, stop_rx) = mpsc::channel();
        let (res_tx, res_rx) = mpsc::channel();
        let th = spawn_fold(0u64, |n| n + 1, stop_rx, res_tx);

        stop_tx.send(ThreadMessage::Stop).unwrap();
        let folded = res_rx.recv().unwrap();
        th.join().unwrap();
        assert!(folded >= 1);
    }

    #[test]
    fn fold_ends_when_the_gui_goes_away() {
        let (stop_tx, stop_rx) = mpsc::channel();
        let (res_tx, res_rx) = mpsc::channel();
        let th = spawn_fold(
            Vec::new(),
            |mut v: Vec<u8>| {
                v.push(1);
                v
            },
            stop_rx,
            res_tx,
        );

        drop(stop_tx);
        th.join().unwrap();
        assert!(!res_rx.recv().unwrap().is_empty());
    }
}

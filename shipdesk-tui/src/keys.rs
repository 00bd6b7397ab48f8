//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    NextStatus,
    PrevStatus,
    MoveUp,
    MoveDown,
    ToggleSelect,
    SelectAll,
    OpenSearch,
    NextFilter,
    CycleFilterValue,
    ClearFilter,
    NextSortColumn,
    ToggleSortDirection,
    NextPage,
    PrevPage,
    LargerPageSize,
    SmallerPageSize,
    /// Uppercase hotkey of a row action on the focused row.
    RowAction(char),
    Manifest,
    OpenUpload,
    Refresh,
    Confirm,
    Cancel,
}

pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('/') => Some(Action::OpenSearch),
        KeyCode::Char('[') => Some(Action::PrevStatus),
        KeyCode::Char(']') => Some(Action::NextStatus),
        KeyCode::Char(' ') => Some(Action::ToggleSelect),
        KeyCode::Char('a') => Some(Action::SelectAll),
        KeyCode::Char('f') => Some(Action::NextFilter),
        KeyCode::Char('v') => Some(Action::CycleFilterValue),
        KeyCode::Char('x') => Some(Action::ClearFilter),
        KeyCode::Char('s') => Some(Action::NextSortColumn),
        KeyCode::Char('S') => Some(Action::ToggleSortDirection),
        KeyCode::Char('n') | KeyCode::PageDown => Some(Action::NextPage),
        KeyCode::Char('p') | KeyCode::PageUp => Some(Action::PrevPage),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::LargerPageSize),
        KeyCode::Char('-') => Some(Action::SmallerPageSize),
        KeyCode::Char('m') => Some(Action::Manifest),
        KeyCode::Char('u') => Some(Action::OpenUpload),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Char(c) if c.is_ascii_uppercase() => Some(Action::RowAction(c)),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let idx = match c {
                '1' => 0,
                '2' => 1,
                '3' => 2,
                _ => return None,
            };
            Some(Action::SwitchView(idx))
        }
        _ => None,
    }
}

/// Keys while a text prompt (search or upload path) owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Char(char),
    Backspace,
    Submit,
    Cancel,
}

pub fn map_input_key(event: KeyEvent) -> Option<InputKey> {
    let KeyEvent { code, modifiers, .. } = event;
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(InputKey::Cancel),
            _ => None,
        };
    }
    match code {
        KeyCode::Char(c) => Some(InputKey::Char(c)),
        KeyCode::Backspace => Some(InputKey::Backspace),
        KeyCode::Enter => Some(InputKey::Submit),
        KeyCode::Esc => Some(InputKey::Cancel),
        _ => None,
    }
}

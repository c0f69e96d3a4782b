use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Represents the result of handling a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// A digit of a folder sequence
    Digit(char),
    /// Resolve the typed sequence now
    Submit,
    /// Move to next image
    Next,
    /// Move to previous image
    Previous,
    /// Ask to copy every pending image
    Commit,
    /// Drop the current image's pending move
    RemovePending,
    /// Ask to drop every pending move
    ClearAll,
    ToggleAutoAdvance,
    /// Open the current image in the system viewer
    Open,
    /// Re-read the destination folder tree
    Reload,
    /// Toggle help overlay
    Help,
    /// Confirm the dialog
    Confirm,
    /// Cancel the dialog
    Cancel,
    /// Put the failed copy lines on the clipboard
    CopyFailures,
    /// No action
    None,
}

/// Maps keyboard events to actions
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q, Esc or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        (KeyCode::Char(d), KeyModifiers::NONE) if d.is_ascii_digit() => KeyAction::Digit(d),
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::Submit,

        // Navigation
        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::Next,
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Previous,
        (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::Next,
        (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Previous,

        // Pending set
        (KeyCode::Char('c'), KeyModifiers::NONE) => KeyAction::Commit,
        (KeyCode::Char('x'), KeyModifiers::NONE) => KeyAction::RemovePending,
        (KeyCode::Delete, KeyModifiers::NONE) => KeyAction::RemovePending,
        (KeyCode::Char('X'), KeyModifiers::SHIFT) => KeyAction::ClearAll,
        (KeyCode::Char('X'), KeyModifiers::NONE) => KeyAction::ClearAll,

        (KeyCode::Char('a'), KeyModifiers::NONE) => KeyAction::ToggleAutoAdvance,
        (KeyCode::Char('o'), KeyModifiers::NONE) => KeyAction::Open,
        (KeyCode::Char('r'), KeyModifiers::NONE) => KeyAction::Reload,

        // Help: ?
        (KeyCode::Char('?'), KeyModifiers::NONE) => KeyAction::Help,
        (KeyCode::Char('?'), KeyModifiers::SHIFT) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// Maps keyboard events to confirmation actions
/// Used when ViewState is ConfirmCommit or ConfirmClear
pub fn handle_confirm_input(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Confirm: y or Enter
        (KeyCode::Char('y'), KeyModifiers::NONE) => KeyAction::Confirm,
        (KeyCode::Char('Y'), _) => KeyAction::Confirm,
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::Confirm,

        // Cancel: n or Esc
        (KeyCode::Char('n'), KeyModifiers::NONE) => KeyAction::Cancel,
        (KeyCode::Char('N'), _) => KeyAction::Cancel,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Cancel,

        _ => KeyAction::None,
    }
}

/// Maps keyboard events while the commit result is shown
pub fn handle_result_input(key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('y') => KeyAction::CopyFailures,
        KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE => KeyAction::Quit,
        _ => KeyAction::Cancel,
    }
}

use waymark_canvas::LayerKind;
use waymark_editor::commands::{EditCommand, SetVisibility};
use waymark_editor::history::{History, DEFAULT_DEPTH};

fn toggle(visible: bool) -> EditCommand {
    EditCommand::SetVisibility(SetVisibility {
        kind: LayerKind::Drawing,
        visible,
        previous: !visible,
    })
}

#[test]
fn test_history_creation() {
    let history = History::new(DEFAULT_DEPTH);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.undo_depth(), 0);
    assert_eq!(history.redo_depth(), 0);
}

#[test]
fn test_record_single_command() {
    let mut history = History::new(DEFAULT_DEPTH);
    history.record(toggle(false));
    assert!(history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.undo_depth(), 1);
}

#[test]
fn test_undo_single_command() {
    let mut history = History::new(DEFAULT_DEPTH);
    history.record(toggle(false));

    let undone = history.undo();
    assert!(undone.is_some());
    assert!(!history.can_undo());
    assert!(history.can_redo());
}

#[test]
fn test_redo_after_undo() {
    let mut history = History::new(DEFAULT_DEPTH);
    history.record(toggle(false));
    history.undo();
    assert!(history.can_redo());

    let redone = history.redo();
    assert!(redone.is_some());
    assert!(history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn test_undo_empty_is_a_no_op() {
    let mut history = History::new(DEFAULT_DEPTH);
    assert!(history.undo().is_none());
    assert!(history.redo().is_none());
}

#[test]
fn test_multiple_undo_redo() {
    let mut history = History::new(DEFAULT_DEPTH);
    for i in 0..5 {
        history.record(toggle(i % 2 == 0));
    }
    assert_eq!(history.undo_depth(), 5);

    for _ in 0..5 {
        history.undo();
    }
    assert_eq!(history.undo_depth(), 0);
    assert_eq!(history.redo_depth(), 5);

    for _ in 0..5 {
        history.redo();
    }
    assert_eq!(history.undo_depth(), 5);
    assert_eq!(history.redo_depth(), 0);
}

#[test]
fn test_depth_bound_evicts_oldest() {
    let mut history = History::new(DEFAULT_DEPTH);
    for i in 0..60 {
        history.record(toggle(i % 2 == 0));
    }
    assert_eq!(history.undo_depth(), DEFAULT_DEPTH);
}

#[test]
fn test_new_record_clears_redo() {
    let mut history = History::new(DEFAULT_DEPTH);
    history.record(toggle(false));
    history.record(toggle(true));
    history.undo();
    assert_eq!(history.redo_depth(), 1);

    history.record(toggle(false));
    assert_eq!(history.redo_depth(), 0);
    assert!(!history.can_redo());
}

#[test]
fn test_cancel_undo_restores_both_stacks() {
    let mut history = History::new(DEFAULT_DEPTH);
    history.record(toggle(false));
    history.record(toggle(true));

    history.undo();
    history.cancel_undo();
    assert_eq!(history.undo_depth(), 2);
    assert_eq!(history.redo_depth(), 0);
    // The restored command is still the next one up.
    assert_eq!(history.undo_description(), Some("Set layer visibility"));
}

#[test]
fn test_cancel_redo_restores_both_stacks() {
    let mut history = History::new(DEFAULT_DEPTH);
    history.record(toggle(false));
    history.record(toggle(true));
    history.undo();

    history.redo();
    history.cancel_redo();
    assert_eq!(history.undo_depth(), 1);
    assert_eq!(history.redo_depth(), 1);
}

#[test]
fn test_descriptions() {
    let mut history = History::new(DEFAULT_DEPTH);
    assert!(history.undo_description().is_none());

    history.record(toggle(false));
    assert_eq!(history.undo_description(), Some("Set layer visibility"));
    assert!(history.redo_description().is_none());

    history.undo();
    assert_eq!(history.redo_description(), Some("Set layer visibility"));
}

#[test]
fn test_clear() {
    let mut history = History::new(DEFAULT_DEPTH);
    history.record(toggle(false));
    history.record(toggle(true));
    history.undo();

    history.clear();
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn test_disabled_history_drops_records() {
    let mut history = History::new(DEFAULT_DEPTH);
    history.disable();
    assert!(!history.is_enabled());

    history.record(toggle(false));
    assert_eq!(history.undo_depth(), 0);

    history.enable();
    history.record(toggle(false));
    assert_eq!(history.undo_depth(), 1);
}

#[test]
fn test_trim_to_depth() {
    let mut history = History::new(DEFAULT_DEPTH);
    for i in 0..10 {
        history.record(toggle(i % 2 == 0));
    }
    history.trim_to_depth(4);
    assert_eq!(history.undo_depth(), 4);
}

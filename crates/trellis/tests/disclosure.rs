//! Disclosure behavior driven through input events.

mod common;

use std::time::Duration;

use common::{Fixture, kinds};
use trellis::{DispatchResult, EventDetail, EventKind, InputEvent, Key, KeyboardModifiers, Point};

#[test]
fn test_dialog_open_and_escape_scenario() {
    let mut fx = Fixture::new();
    let (dialog, buttons) = fx.disclosure(fx.root, "dialog", &[], 2);
    fx.engine.connect(dialog.host).unwrap();

    assert_eq!(fx.attr(dialog.trigger, "aria-expanded").as_deref(), Some("false"));
    assert_eq!(fx.attr(dialog.trigger, "aria-haspopup").as_deref(), Some("dialog"));
    assert!(fx.hidden(dialog.content));

    assert!(fx.engine.focus(dialog.trigger).unwrap());
    assert_eq!(fx.key(dialog.trigger, Key::Enter), DispatchResult::Accepted);

    assert_eq!(fx.attr(dialog.trigger, "aria-expanded").as_deref(), Some("true"));
    assert!(!fx.hidden(dialog.content));
    assert_eq!(fx.attr(dialog.content, "role").as_deref(), Some("dialog"));
    assert_eq!(fx.attr(dialog.content, "aria-modal").as_deref(), Some("true"));
    assert_eq!(fx.engine.focused(), Some(buttons[0]));

    assert_eq!(fx.press(Key::Escape), DispatchResult::Accepted);

    assert!(fx.hidden(dialog.content));
    assert_eq!(fx.attr(dialog.trigger, "aria-expanded").as_deref(), Some("false"));
    assert_eq!(fx.attr(dialog.content, "aria-modal"), None);
    assert_eq!(fx.engine.focused(), Some(dialog.trigger));
    assert_eq!(fx.engine.document().parent(dialog.content), Some(dialog.host));
}

#[test]
fn test_open_and_close_are_idempotent() {
    let mut fx = Fixture::new();
    let (popover, _) = fx.disclosure(fx.root, "popover", &[], 1);
    fx.engine.connect(popover.host).unwrap();
    let log = fx.record(popover.host);

    assert!(fx.engine.open(popover.host).unwrap());
    assert!(!fx.engine.open(popover.host).unwrap());
    assert!(fx.engine.is_open(popover.host).unwrap());
    assert_eq!(kinds(&log), vec![EventKind::Open, EventKind::Toggle]);

    assert!(fx.engine.close(popover.host).unwrap());
    assert!(!fx.engine.close(popover.host).unwrap());
    assert!(!fx.engine.is_open(popover.host).unwrap());
    assert_eq!(
        kinds(&log),
        vec![EventKind::Open, EventKind::Toggle, EventKind::Close, EventKind::Toggle]
    );
    assert_eq!(log.lock()[3].1, EventDetail::Toggle { open: false });
}

#[test]
fn test_close_leaves_focus_that_moved_elsewhere() {
    let mut fx = Fixture::new();
    let (popover, _) = fx.disclosure(fx.root, "popover", &[], 1);
    let elsewhere = fx.el(fx.root, "button", &[]);
    fx.engine.connect(popover.host).unwrap();

    fx.click(popover.trigger);
    assert!(fx.engine.is_open(popover.host).unwrap());
    fx.engine.focus(elsewhere).unwrap();

    fx.engine.close(popover.host).unwrap();
    assert_eq!(fx.engine.focused(), Some(elsewhere));
}

#[test]
fn test_synthetic_click_after_enter_is_coalesced() {
    let mut fx = Fixture::new();
    let (collapsible, _) = fx.disclosure(fx.root, "collapsible", &[], 0);
    fx.engine.connect(collapsible.host).unwrap();

    fx.key(collapsible.trigger, Key::Enter);
    let synthetic = InputEvent::Click {
        target: collapsible.trigger,
        synthetic: true,
    };
    assert_eq!(fx.engine.dispatch(synthetic), DispatchResult::Accepted);
    assert!(fx.engine.is_open(collapsible.host).unwrap());

    // Without a preceding keydown the click is a real activation.
    fx.engine.dispatch(synthetic);
    assert!(!fx.engine.is_open(collapsible.host).unwrap());
}

#[test]
fn test_collapsible_keeps_focus_on_trigger() {
    let mut fx = Fixture::new();
    let (collapsible, _) = fx.disclosure(fx.root, "collapsible", &[], 1);
    fx.engine.connect(collapsible.host).unwrap();

    fx.engine.focus(collapsible.trigger).unwrap();
    fx.key(collapsible.trigger, Key::Space);
    assert!(!fx.hidden(collapsible.content));
    assert_eq!(fx.engine.focused(), Some(collapsible.trigger));

    // Collapsibles ignore Escape.
    assert_eq!(fx.key(collapsible.trigger, Key::Escape), DispatchResult::Ignored);
    assert!(fx.engine.is_open(collapsible.host).unwrap());
}

#[test]
fn test_persistent_ignores_escape_and_outside_pointer() {
    let mut fx = Fixture::new();
    let (dialog, buttons) = fx.disclosure(fx.root, "dialog", &[("persistent", "")], 1);
    let outside = fx.el(fx.root, "button", &[]);
    fx.engine.connect(dialog.host).unwrap();
    fx.engine.open(dialog.host).unwrap();

    assert_eq!(fx.key(buttons[0], Key::Escape), DispatchResult::Accepted);
    fx.engine.dispatch(InputEvent::PointerDown {
        target: outside,
        point: Point::default(),
    });
    assert!(fx.engine.is_open(dialog.host).unwrap());

    fx.engine.set_attribute(dialog.host, "persistent", "false").unwrap();
    fx.key(buttons[0], Key::Escape);
    assert!(!fx.engine.is_open(dialog.host).unwrap());
}

#[test]
fn test_outside_pointer_down_dismisses() {
    let mut fx = Fixture::new();
    let (popover, buttons) = fx.disclosure(fx.root, "popover", &[], 1);
    let outside = fx.el(fx.root, "div", &[]);
    fx.engine.connect(popover.host).unwrap();
    fx.engine.open(popover.host).unwrap();

    let inside = InputEvent::PointerDown {
        target: buttons[0],
        point: Point::default(),
    };
    assert_eq!(fx.engine.dispatch(inside), DispatchResult::Ignored);
    assert!(fx.engine.is_open(popover.host).unwrap());

    let away = InputEvent::PointerDown {
        target: outside,
        point: Point::new(400.0, 400.0),
    };
    assert_eq!(fx.engine.dispatch(away), DispatchResult::Accepted);
    assert!(!fx.engine.is_open(popover.host).unwrap());
}

#[test]
fn test_close_slot() {
    let mut fx = Fixture::new();
    let (popover, _) = fx.disclosure(fx.root, "popover", &[], 0);
    let close = fx.el(popover.content, "button", &[("slot", "close")]);
    fx.engine.connect(popover.host).unwrap();

    fx.engine.focus(popover.trigger).unwrap();
    fx.key(popover.trigger, Key::Enter);
    assert_eq!(fx.engine.focused(), Some(close));

    fx.click(close);
    assert!(!fx.engine.is_open(popover.host).unwrap());
    assert_eq!(fx.engine.focused(), Some(popover.trigger));
}

#[test]
fn test_focus_trap_cycles() {
    let mut fx = Fixture::new();
    let (dialog, buttons) = fx.disclosure(fx.root, "dialog", &[], 3);
    fx.el(fx.root, "button", &[]);
    fx.engine.connect(dialog.host).unwrap();
    fx.engine.open(dialog.host).unwrap();
    assert_eq!(fx.engine.focused(), Some(buttons[0]));

    fx.press(Key::Tab);
    assert_eq!(fx.engine.focused(), Some(buttons[1]));
    fx.press(Key::Tab);
    fx.press(Key::Tab);
    assert_eq!(fx.engine.focused(), Some(buttons[0]));

    fx.key_with(buttons[0], Key::Tab, KeyboardModifiers::SHIFT);
    assert_eq!(fx.engine.focused(), Some(buttons[2]));
}

#[test]
fn test_empty_trap_keeps_focus_on_content() {
    let mut fx = Fixture::new();
    let (dialog, _) = fx.disclosure(fx.root, "dialog", &[], 0);
    fx.engine.connect(dialog.host).unwrap();
    fx.engine.open(dialog.host).unwrap();

    assert_eq!(fx.engine.focused(), Some(dialog.content));
    assert_eq!(fx.attr(dialog.content, "tabindex").as_deref(), Some("-1"));
    fx.press(Key::Tab);
    assert_eq!(fx.engine.focused(), Some(dialog.content));
}

#[test]
fn test_tab_without_trap_moves_through_document() {
    let mut fx = Fixture::new();
    let first = fx.el(fx.root, "button", &[]);
    let second = fx.el(fx.root, "button", &[]);

    fx.engine.focus(first).unwrap();
    fx.press(Key::Tab);
    assert_eq!(fx.engine.focused(), Some(second));
    fx.press(Key::Tab);
    assert_eq!(fx.engine.focused(), Some(first));
}

#[test]
fn test_tooltip_delays_and_cancellation() {
    let mut fx = Fixture::new();
    let (tooltip, _) = fx.disclosure(fx.root, "tooltip", &[], 0);
    fx.engine.connect(tooltip.host).unwrap();

    let tooltip_id = fx.attr(tooltip.content, "id").unwrap();
    assert_eq!(fx.attr(tooltip.trigger, "aria-describedby"), Some(tooltip_id));
    assert_eq!(fx.attr(tooltip.content, "role").as_deref(), Some("tooltip"));
    assert_eq!(fx.attr(tooltip.trigger, "aria-expanded"), None);

    fx.engine.dispatch(InputEvent::PointerEnter { target: tooltip.trigger });
    fx.engine.advance_time(Duration::from_millis(499));
    assert!(!fx.engine.is_open(tooltip.host).unwrap());
    assert_eq!(fx.engine.advance_time(Duration::from_millis(1)), 1);
    assert!(fx.engine.is_open(tooltip.host).unwrap());

    // Leaving and re-entering before the close delay cancels the close.
    fx.engine.dispatch(InputEvent::PointerLeave { target: tooltip.trigger });
    fx.engine.advance_time(Duration::from_millis(50));
    fx.engine.dispatch(InputEvent::PointerEnter { target: tooltip.trigger });
    assert_eq!(fx.engine.advance_time(Duration::from_secs(5)), 0);
    assert!(fx.engine.is_open(tooltip.host).unwrap());

    fx.engine.dispatch(InputEvent::PointerLeave { target: tooltip.trigger });
    assert_eq!(fx.engine.time_until_next_timer(), Some(Duration::from_millis(100)));
    fx.engine.advance_time(Duration::from_millis(100));
    assert!(!fx.engine.is_open(tooltip.host).unwrap());
}

#[test]
fn test_focus_opens_tooltip_after_delay() {
    let mut fx = Fixture::new();
    let (tooltip, _) = fx.disclosure(fx.root, "tooltip", &[("open-delay", "0"), ("close-delay", "0")], 0);
    fx.engine.connect(tooltip.host).unwrap();

    fx.engine.dispatch(InputEvent::FocusIn { target: tooltip.trigger });
    assert!(fx.engine.is_open(tooltip.host).unwrap());
    assert_eq!(fx.engine.focused(), Some(tooltip.trigger));

    fx.engine.dispatch(InputEvent::FocusOut { target: tooltip.trigger });
    assert!(!fx.engine.is_open(tooltip.host).unwrap());
}

#[test]
fn test_pending_open_cancelled_by_leave() {
    let mut fx = Fixture::new();
    let (card, _) = fx.disclosure(fx.root, "hover-card", &[], 0);
    fx.engine.connect(card.host).unwrap();

    fx.engine.dispatch(InputEvent::PointerEnter { target: card.trigger });
    fx.engine.advance_time(Duration::from_millis(300));
    fx.engine.dispatch(InputEvent::PointerLeave { target: card.trigger });
    assert_eq!(fx.engine.advance_time(Duration::from_secs(2)), 0);
    assert!(!fx.engine.is_open(card.host).unwrap());
}

#[test]
fn test_disconnect_drops_pending_timers() {
    let mut fx = Fixture::new();
    let (tooltip, _) = fx.disclosure(fx.root, "tooltip", &[], 0);
    fx.engine.connect(tooltip.host).unwrap();

    fx.engine.dispatch(InputEvent::PointerEnter { target: tooltip.trigger });
    assert!(fx.engine.time_until_next_timer().is_some());
    fx.engine.disconnect(tooltip.host).unwrap();
    assert_eq!(fx.engine.time_until_next_timer(), None);
    assert_eq!(fx.engine.advance_time(Duration::from_secs(1)), 0);

    // A fresh mount schedules its own delay.
    fx.engine.connect(tooltip.host).unwrap();
    assert!(!fx.engine.is_open(tooltip.host).unwrap());
    fx.engine.dispatch(InputEvent::PointerEnter { target: tooltip.trigger });
    assert_eq!(fx.engine.advance_time(Duration::from_millis(500)), 1);
    assert!(fx.engine.is_open(tooltip.host).unwrap());
}

#[test]
fn test_prevented_close_keeps_focus() {
    let mut fx = Fixture::new();
    let (popover, buttons) = fx.disclosure(fx.root, "popover", &[], 1);
    fx.engine.connect(popover.host).unwrap();
    fx.engine
        .on(popover.host, EventKind::Close, |event| event.prevent_default())
        .unwrap();

    fx.engine.open(popover.host).unwrap();
    assert_eq!(fx.engine.focused(), Some(buttons[0]));
    fx.key(buttons[0], Key::Escape);

    assert!(!fx.engine.is_open(popover.host).unwrap());
    assert_eq!(fx.engine.focused(), Some(buttons[0]));
}

#[test]
fn test_accordion_single_mode_closes_siblings() {
    let mut fx = Fixture::new();
    let accordion = fx.el(fx.root, "t-accordion", &[]);
    let (first, _) = fx.disclosure(accordion, "collapsible", &[], 0);
    let (second, _) = fx.disclosure(accordion, "collapsible", &[], 0);
    fx.engine.connect_all().unwrap();

    fx.click(first.trigger);
    fx.click(second.trigger);
    assert!(!fx.engine.is_open(first.host).unwrap());
    assert!(fx.engine.is_open(second.host).unwrap());

    fx.engine.set_attribute(accordion, "multiple", "").unwrap();
    fx.click(first.trigger);
    assert!(fx.engine.is_open(first.host).unwrap());
    assert!(fx.engine.is_open(second.host).unwrap());
}

#[test]
fn test_open_attribute_drives_state() {
    let mut fx = Fixture::new();
    let (collapsible, _) = fx.disclosure(fx.root, "collapsible", &[("open", "")], 0);
    fx.engine.connect(collapsible.host).unwrap();

    assert!(fx.engine.is_open(collapsible.host).unwrap());
    assert_eq!(fx.attr(collapsible.trigger, "aria-expanded").as_deref(), Some("true"));

    fx.engine.remove_attribute(collapsible.host, "open").unwrap();
    assert!(!fx.engine.is_open(collapsible.host).unwrap());
    assert!(fx.hidden(collapsible.content));

    fx.engine.set_attribute(collapsible.host, "open", "").unwrap();
    assert!(fx.engine.is_open(collapsible.host).unwrap());
}

#[test]
fn test_disabled_host_ignores_activation() {
    let mut fx = Fixture::new();
    let (popover, _) = fx.disclosure(fx.root, "popover", &[("disabled", "")], 0);
    fx.engine.connect(popover.host).unwrap();

    assert_eq!(fx.click(popover.trigger), DispatchResult::Ignored);
    assert!(!fx.engine.open(popover.host).unwrap());

    fx.engine.remove_attribute(popover.host, "disabled").unwrap();
    assert_eq!(fx.click(popover.trigger), DispatchResult::Accepted);
    assert!(fx.engine.is_open(popover.host).unwrap());
}

#[test]
fn test_content_labelled_by_trigger_unless_label() {
    let mut fx = Fixture::new();
    let (plain, _) = fx.disclosure(fx.root, "popover", &[], 0);
    let (labelled, _) = fx.disclosure(fx.root, "popover", &[("label", "Filters")], 0);
    fx.engine.connect_all().unwrap();

    let trigger_id = fx.attr(plain.trigger, "id").unwrap();
    let content_id = fx.attr(plain.content, "id").unwrap();
    assert_eq!(fx.attr(plain.content, "aria-labelledby"), Some(trigger_id));
    assert_eq!(fx.attr(plain.trigger, "aria-controls"), Some(content_id));

    assert_eq!(fx.attr(labelled.content, "aria-label").as_deref(), Some("Filters"));
    assert_eq!(fx.attr(labelled.content, "aria-labelledby"), None);
}

//! Split panes driven by keyboard, pointer and attributes.

mod common;

use common::{Fixture, kinds};
use trellis::{DispatchResult, EventDetail, EventKind, InputEvent, Key, NodeId, Point};

struct Split {
    host: NodeId,
    panes: Vec<NodeId>,
    separators: Vec<NodeId>,
}

fn split(fx: &mut Fixture, attrs: &[(&str, &str)], sizes: &[Option<&str>]) -> Split {
    let host = fx.el(fx.root, "t-split", attrs);
    let panes: Vec<NodeId> = sizes
        .iter()
        .map(|size| match size {
            Some(size) => fx.el(host, "div", &[("slot", "item"), ("data-size", *size)]),
            None => fx.el(host, "div", &[("slot", "item")]),
        })
        .collect();
    fx.engine.connect(host).unwrap();
    let separators = panes
        .iter()
        .take(panes.len() - 1)
        .filter_map(|&pane| fx.engine.document().next_sibling(pane))
        .collect();
    Split { host, panes, separators }
}

fn standard(fx: &mut Fixture) -> Split {
    split(
        fx,
        &[("size", "600"), ("min", "100px"), ("max", "500px")],
        &[Some("200"), None],
    )
}

fn pointer_down(target: NodeId, x: f64) -> InputEvent {
    InputEvent::PointerDown {
        target,
        point: Point::new(x, 0.0),
    }
}

#[test]
fn test_split_keyboard_scenario() {
    let mut fx = Fixture::new();
    let s = standard(&mut fx);
    let sep = s.separators[0];

    assert_eq!(fx.attr(sep, "aria-valuenow").as_deref(), Some("200"));
    assert_eq!(fx.key(sep, Key::Home), DispatchResult::Accepted);
    assert_eq!(fx.attr(sep, "aria-valuenow").as_deref(), Some("100"));
    assert_eq!(fx.attr(s.panes[0], "data-size").as_deref(), Some("100"));

    fx.key(sep, Key::Enter);
    assert_eq!(fx.attr(sep, "aria-valuenow").as_deref(), Some("200"));

    fx.key(sep, Key::End);
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(500.0));
    assert_eq!(fx.attr(s.panes[1], "data-size").as_deref(), Some("100"));

    fx.key(sep, Key::ArrowLeft);
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(490.0));
    assert_eq!(fx.key(sep, Key::ArrowUp), DispatchResult::Ignored);
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(490.0));
}

#[test]
fn test_separator_attributes() {
    let mut fx = Fixture::new();
    let s = standard(&mut fx);
    let sep = s.separators[0];

    assert_eq!(s.separators.len(), 1);
    assert_eq!(fx.attr(sep, "role").as_deref(), Some("separator"));
    assert_eq!(fx.attr(sep, "aria-orientation").as_deref(), Some("vertical"));
    assert_eq!(fx.attr(sep, "aria-valuemin").as_deref(), Some("100"));
    assert_eq!(fx.attr(sep, "aria-valuemax").as_deref(), Some("500"));
    assert_eq!(fx.attr(sep, "tabindex").as_deref(), Some("0"));
    assert_eq!(fx.attr(sep, "aria-controls"), fx.attr(s.panes[0], "id"));
    assert_eq!(fx.attr(s.panes[1], "data-size").as_deref(), Some("400"));
}

#[test]
fn test_drag_resizes_live_and_reports_on_release() {
    let mut fx = Fixture::new();
    let s = standard(&mut fx);
    let sep = s.separators[0];
    let log = fx.record(s.host);

    assert_eq!(fx.engine.dispatch(pointer_down(sep, 200.0)), DispatchResult::Accepted);
    assert_eq!(fx.engine.focused(), Some(sep));

    fx.engine.dispatch(InputEvent::PointerMove { point: Point::new(260.0, 40.0) });
    assert_eq!(fx.attr(sep, "aria-valuenow").as_deref(), Some("260"));
    assert!(log.lock().is_empty());

    fx.engine.dispatch(InputEvent::PointerMove { point: Point::new(900.0, 0.0) });
    assert_eq!(fx.attr(sep, "aria-valuenow").as_deref(), Some("500"));

    fx.engine.dispatch(InputEvent::PointerUp { point: Point::new(900.0, 0.0) });
    assert_eq!(
        log.lock().clone(),
        vec![(
            EventKind::Resize,
            EventDetail::Size {
                value: 500.0,
                sizes: vec![500.0, 100.0]
            }
        )]
    );

    // The drag is over; further moves do nothing.
    assert_eq!(
        fx.engine.dispatch(InputEvent::PointerMove { point: Point::new(0.0, 0.0) }),
        DispatchResult::Ignored
    );
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(500.0));
}

#[test]
fn test_separators_move_independently() {
    let mut fx = Fixture::new();
    let s = split(&mut fx, &[("size", "900")], &[Some("300"), Some("300"), Some("300")]);
    let log = fx.record(s.host);

    assert_eq!(s.separators.len(), 2);
    fx.key(s.separators[0], Key::ArrowRight);
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(310.0));
    assert_eq!(fx.engine.separator_value(s.host, 1).unwrap(), Some(600.0));
    assert_eq!(fx.attr(s.panes[1], "data-size").as_deref(), Some("290"));
    assert_eq!(fx.attr(s.panes[2], "data-size").as_deref(), Some("300"));
    assert_eq!(fx.attr(s.separators[1], "aria-valuemin").as_deref(), Some("310"));

    assert!(fx.engine.set_separator_value(s.host, 1, 5000.0).unwrap());
    assert_eq!(fx.engine.separator_value(s.host, 1).unwrap(), Some(900.0));
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(310.0));
    assert_eq!(kinds(&log), vec![EventKind::Resize, EventKind::Resize]);
}

#[test]
fn test_vertical_split_uses_vertical_keys() {
    let mut fx = Fixture::new();
    let s = split(
        &mut fx,
        &[("orientation", "vertical"), ("size", "400"), ("step", "25")],
        &[Some("200"), Some("200")],
    );
    let sep = s.separators[0];

    assert_eq!(fx.attr(sep, "aria-orientation").as_deref(), Some("horizontal"));
    assert_eq!(fx.key(sep, Key::ArrowRight), DispatchResult::Ignored);
    fx.key(sep, Key::ArrowDown);
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(225.0));

    fx.engine.dispatch(pointer_down(sep, 0.0));
    fx.engine.dispatch(InputEvent::PointerUp { point: Point::new(500.0, 175.0) });
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(400.0));
}

#[test]
fn test_limit_attributes_clamp_existing_value() {
    let mut fx = Fixture::new();
    let s = standard(&mut fx);
    let sep = s.separators[0];

    fx.engine.set_attribute(s.host, "max", "150").unwrap();
    assert_eq!(fx.attr(sep, "aria-valuemax").as_deref(), Some("150"));
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(150.0));
    assert_eq!(fx.attr(s.panes[0], "data-size").as_deref(), Some("150"));

    fx.engine.remove_attribute(s.host, "max").unwrap();
    fx.key(sep, Key::End);
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(600.0));
}

#[test]
fn test_orientation_change_switches_axis() {
    let mut fx = Fixture::new();
    let s = standard(&mut fx);
    let sep = s.separators[0];
    assert_eq!(fx.attr(sep, "aria-orientation").as_deref(), Some("vertical"));

    fx.engine.set_attribute(s.host, "orientation", "vertical").unwrap();
    assert_eq!(fx.attr(sep, "aria-orientation").as_deref(), Some("horizontal"));
    assert_eq!(fx.key(sep, Key::ArrowRight), DispatchResult::Ignored);
    assert_eq!(fx.key(sep, Key::ArrowDown), DispatchResult::Accepted);
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(210.0));

    // Dragging follows the new axis too.
    fx.engine.dispatch(pointer_down(sep, 0.0));
    fx.engine.dispatch(InputEvent::PointerUp { point: Point::new(900.0, 50.0) });
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(260.0));
}

#[test]
fn test_min_beyond_container_is_ignored() {
    let mut fx = Fixture::new();
    let s = split(&mut fx, &[("size", "600"), ("min", "700")], &[Some("200"), None]);
    let sep = s.separators[0];

    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(200.0));
    assert_eq!(fx.attr(sep, "aria-valuemax").as_deref(), Some("600"));
    assert_eq!(fx.attr(s.panes[0], "data-size").as_deref(), Some("200"));
    assert_eq!(fx.attr(s.panes[1], "data-size").as_deref(), Some("400"));

    fx.key(sep, Key::End);
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(600.0));
    assert_eq!(fx.attr(s.panes[1], "data-size").as_deref(), Some("0"));
}

#[test]
fn test_disabled_split_ignores_input() {
    let mut fx = Fixture::new();
    let s = split(&mut fx, &[("size", "600"), ("disabled", "")], &[Some("300"), None]);
    let sep = s.separators[0];

    assert_eq!(fx.attr(sep, "tabindex").as_deref(), Some("-1"));
    assert_eq!(fx.key(sep, Key::Home), DispatchResult::Ignored);
    assert_eq!(fx.engine.dispatch(pointer_down(sep, 300.0)), DispatchResult::Ignored);
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(300.0));

    fx.engine.remove_attribute(s.host, "disabled").unwrap();
    assert_eq!(fx.attr(sep, "tabindex").as_deref(), Some("0"));
    assert_eq!(fx.key(sep, Key::Home), DispatchResult::Accepted);
    assert_eq!(fx.engine.separator_value(s.host, 0).unwrap(), Some(0.0));
}

#[test]
fn test_disconnect_removes_separators() {
    let mut fx = Fixture::new();
    let s = standard(&mut fx);

    fx.engine.disconnect(s.host).unwrap();
    assert!(!fx.engine.document().exists(s.separators[0]));
    assert_eq!(fx.engine.document().next_sibling(s.panes[0]), Some(s.panes[1]));
    assert!(fx.engine.separator_value(s.host, 0).is_err());
}

//! Overlay relocation of portaled disclosure content.

mod common;

use common::Fixture;
use trellis::{EngineConfig, Key, WidgetKind};

#[test]
fn test_open_relocates_and_close_restores_position() {
    let mut fx = Fixture::new();
    let (pop, buttons) = fx.disclosure(fx.root, "popover", &[], 1);
    let footer = fx.el(pop.host, "p", &[]);
    fx.engine.connect_all().unwrap();
    let id_before = fx.attr(pop.content, "id");

    fx.engine.open(pop.host).unwrap();
    let overlay = fx.engine.document().element_by_id("trellis-overlay").unwrap();
    assert_eq!(fx.engine.document().parent(pop.content), Some(overlay));
    assert_eq!(fx.attr(overlay, "data-trellis-overlay").as_deref(), Some(""));
    assert_eq!(fx.attr(pop.content, "id"), id_before);
    assert_eq!(fx.engine.document().children(pop.host), &[pop.trigger, footer]);
    assert_eq!(fx.engine.focused(), Some(buttons[0]));

    fx.engine.close(pop.host).unwrap();
    assert_eq!(fx.engine.document().children(pop.host), &[pop.trigger, pop.content, footer]);
    assert!(fx.engine.document().children(overlay).is_empty());
    assert_eq!(fx.engine.focused(), Some(pop.trigger));
}

#[test]
fn test_restore_appends_when_sibling_was_removed() {
    let mut fx = Fixture::new();
    let (pop, _) = fx.disclosure(fx.root, "popover", &[], 1);
    let footer = fx.el(pop.host, "p", &[]);
    fx.engine.connect_all().unwrap();

    fx.engine.open(pop.host).unwrap();
    fx.engine.remove(footer).unwrap();
    let extra = fx.el(pop.host, "footer", &[]);

    fx.engine.close(pop.host).unwrap();
    assert_eq!(fx.engine.document().children(pop.host), &[pop.trigger, extra, pop.content]);
}

#[test]
fn test_overlays_are_independent() {
    let mut fx = Fixture::new();
    let (a, _) = fx.disclosure(fx.root, "popover", &[], 1);
    let (b, _) = fx.disclosure(fx.root, "popover", &[], 1);
    fx.engine.connect_all().unwrap();

    fx.engine.open(a.host).unwrap();
    fx.engine.open(b.host).unwrap();
    let overlay = fx.engine.document().element_by_id("trellis-overlay").unwrap();
    assert_eq!(fx.engine.document().children(overlay), &[a.content, b.content]);

    fx.engine.close(a.host).unwrap();
    assert_eq!(fx.engine.document().parent(a.content), Some(a.host));
    assert_eq!(fx.engine.document().parent(b.content), Some(overlay));
    assert!(fx.engine.is_open(b.host).unwrap());

    fx.engine.close(b.host).unwrap();
    assert_eq!(fx.engine.document().parent(b.content), Some(b.host));
}

#[test]
fn test_relocated_content_still_belongs_to_its_widget() {
    let mut fx = Fixture::new();
    let (pop, buttons) = fx.disclosure(fx.root, "popover", &[], 1);
    let close = fx.el(pop.content, "button", &[("slot", "close")]);
    fx.engine.connect_all().unwrap();
    let id = fx.engine.instance_for(pop.host);

    fx.engine.open(pop.host).unwrap();
    assert_eq!(fx.engine.resolve_scope(buttons[0], WidgetKind::Popover), id);
    assert_eq!(fx.engine.resolve_scope(close, WidgetKind::Popover), id);

    fx.click(close);
    assert!(!fx.engine.is_open(pop.host).unwrap());
    assert_eq!(fx.engine.focused(), Some(pop.trigger));

    fx.engine.open(pop.host).unwrap();
    fx.press(Key::Escape);
    assert!(!fx.engine.is_open(pop.host).unwrap());
    assert_eq!(fx.engine.document().parent(pop.content), Some(pop.host));
}

#[test]
fn test_unmount_while_open_restores() {
    let mut fx = Fixture::new();
    let (dialog, _) = fx.disclosure(fx.root, "dialog", &[], 2);
    fx.engine.connect_all().unwrap();

    fx.engine.open(dialog.host).unwrap();
    fx.engine.disconnect(dialog.host).unwrap();
    assert_eq!(fx.engine.document().parent(dialog.content), Some(dialog.host));
    let overlay = fx.engine.document().element_by_id("trellis-overlay").unwrap();
    assert!(fx.engine.document().children(overlay).is_empty());
}

#[test]
fn test_custom_overlay_adopts_author_container() {
    let config = EngineConfig {
        overlay_id: "layer".to_string(),
        ..EngineConfig::default()
    };
    let mut fx = Fixture::with_config(config);
    let layer = fx.el(fx.root, "aside", &[("id", "layer")]);
    let (pop, _) = fx.disclosure(fx.root, "popover", &[], 1);
    fx.engine.connect_all().unwrap();

    fx.engine.open(pop.host).unwrap();
    assert_eq!(fx.engine.document().parent(pop.content), Some(layer));
    assert_eq!(fx.engine.document().element_by_id("trellis-overlay"), None);
}

#[test]
fn test_inline_kinds_are_not_relocated() {
    let mut fx = Fixture::new();
    let (menu, _) = fx.menu(fx.root, "m", 2);
    fx.engine.connect_all().unwrap();

    fx.engine.open(menu.host).unwrap();
    assert_eq!(fx.engine.document().parent(menu.content), Some(menu.host));
    assert_eq!(fx.engine.document().element_by_id("trellis-overlay"), None);
}

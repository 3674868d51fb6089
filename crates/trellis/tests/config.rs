//! Engines built from configuration files.

mod common;

use std::io::Write;
use std::time::Duration;

use common::{Fixture, init_tracing};
use trellis::{ConfigError, Engine, EngineError, InputEvent, Key};

fn engine_from(text: &str) -> Fixture {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    let engine = Engine::from_config_file(file.path()).unwrap();
    let root = engine.document().root();
    Fixture { engine, root }
}

#[test]
fn test_prefixes_from_file() {
    let mut fx = engine_from(
        r#"
        id_prefix = "app"
        tag_prefix = "ui"
        "#,
    );
    let host = fx.el(fx.root, "ui-tabs", &[]);
    fx.items(host, "tab", 2);
    let ignored = fx.el(fx.root, "t-tabs", &[]);

    assert_eq!(fx.engine.connect_all().unwrap().len(), 1);
    assert!(fx.attr(host, "id").unwrap().starts_with("app-"));
    assert!(matches!(
        fx.engine.connect(ignored),
        Err(EngineError::UnknownWidget { .. })
    ));
}

#[test]
fn test_delays_and_step_from_file() {
    let mut fx = engine_from(
        r#"
        [tooltip]
        open_delay_ms = 50
        close_delay_ms = 0

        [resizer]
        step = 4.0
        "#,
    );
    let (tooltip, _) = fx.disclosure(fx.root, "tooltip", &[], 0);
    let split = fx.el(fx.root, "t-split", &[("size", "100")]);
    let pane = fx.el(split, "div", &[("slot", "item"), ("data-size", "50")]);
    fx.el(split, "div", &[("slot", "item")]);
    fx.engine.connect_all().unwrap();

    fx.engine.dispatch(InputEvent::PointerEnter { target: tooltip.trigger });
    assert_eq!(fx.engine.time_until_next_timer(), Some(Duration::from_millis(50)));
    fx.engine.advance_time(Duration::from_millis(50));
    assert!(fx.engine.is_open(tooltip.host).unwrap());

    let separator = fx.engine.document().next_sibling(pane).unwrap();
    fx.key(separator, Key::ArrowRight);
    assert_eq!(fx.engine.separator_value(split, 0).unwrap(), Some(54.0));
}

#[test]
fn test_host_attributes_override_configured_delays() {
    let mut fx = engine_from("[tooltip]\nopen_delay_ms = 50\n");
    let (tooltip, _) = fx.disclosure(fx.root, "tooltip", &[("open-delay", "5")], 0);
    fx.engine.connect_all().unwrap();

    fx.engine.dispatch(InputEvent::PointerEnter { target: tooltip.trigger });
    assert_eq!(fx.engine.advance_time(Duration::from_millis(5)), 1);
    assert!(fx.engine.is_open(tooltip.host).unwrap());
}

#[test]
fn test_bad_file_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"tag_prefix = [").unwrap();

    let result = Engine::from_config_file(file.path());
    assert!(matches!(result, Err(EngineError::Config(ConfigError::Parse(_)))));

    let missing = Engine::from_config_file("/nonexistent/trellis.toml");
    assert!(matches!(missing, Err(EngineError::Config(ConfigError::Io { .. }))));
}

use curvescope::config::EngineConfig;
use curvescope::lod::Decimation;
use curvescope::{ConfigError, TimeRange};

#[test]
fn yaml_overrides_only_what_it_names() {
    let cfg = EngineConfig::from_yaml_str(
        r#"
flags:
  max_curves: 250
lod:
  strategy: lttb
generator:
  time_range: 7d
  curve_count: 3
render:
  colors:
    background:
      r: 1
      g: 2
      b: 3
      a: 255
"#,
    )
    .unwrap();
    assert_eq!(cfg.flags.max_curves, 250);
    assert!(cfg.flags.enable_performance_mode);
    assert_eq!(cfg.lod.strategy, Decimation::Lttb);
    assert_eq!(cfg.lod.detail_target, 1_000);
    assert_eq!(cfg.generator.time_range, TimeRange::D7);
    assert_eq!(cfg.generator.curve_count, 3);
    assert_eq!(cfg.render.colors.background.to_hex(), "#010203");
    assert_eq!(cfg.analysis, Default::default());
}

#[test]
fn json_is_accepted() {
    let cfg = EngineConfig::from_json_str(r#"{"viewport": {"max_zoom": 8.0}, "dashboard": {"live": true}}"#)
        .unwrap();
    assert_eq!(cfg.viewport.max_zoom, 8.0);
    assert_eq!(cfg.viewport.min_zoom, 0.1);
    assert!(cfg.dashboard.live);
}

#[test]
fn reversed_zoom_limits_are_rejected() {
    let err = EngineConfig::from_yaml_str("viewport:\n  min_zoom: 5.0\n  max_zoom: 2.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
}

#[test]
fn zero_chunk_size_is_rejected() {
    let err = EngineConfig::from_yaml_str("render:\n  chunk_size: 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn malformed_input_reports_the_parser() {
    assert!(matches!(EngineConfig::from_yaml_str("flags: [1, 2"), Err(ConfigError::Yaml(_))));
    assert!(matches!(EngineConfig::from_json_str("{"), Err(ConfigError::Json(_))));
}

#[test]
fn load_picks_the_format_from_the_extension() {
    let dir = std::env::temp_dir().join(format!("curvescope-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let yaml = dir.join("engine.yaml");
    let mut cfg = EngineConfig::default();
    cfg.dashboard.title = "from yaml".into();
    std::fs::write(&yaml, cfg.to_yaml_string().unwrap()).unwrap();
    assert_eq!(EngineConfig::load(&yaml).unwrap(), cfg);

    let json = dir.join("engine.json");
    std::fs::write(&json, r#"{"dashboard": {"title": "from json"}}"#).unwrap();
    assert_eq!(EngineConfig::load(&json).unwrap().dashboard.title, "from json");

    assert!(matches!(
        EngineConfig::load(dir.join("missing.yaml")),
        Err(ConfigError::Io(_))
    ));
    let _ = std::fs::remove_dir_all(&dir);
}

use config::{Config, File, FileFormat};

use super::*;

fn raw_from_toml(source: &str) -> RawSettings {
    Config::builder()
        .add_source(File::from_str(source, FileFormat::Toml))
        .build()
        .expect("config builds")
        .try_deserialize()
        .expect("raw settings deserialize")
}

#[test]
fn defaults_apply_when_nothing_is_configured() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:8080");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert_eq!(settings.logging.format, LogFormat::Compact);
    assert!(settings.database.url.is_none());
    assert_eq!(settings.database.max_connections.get(), 8);
    assert_eq!(settings.database.connect_timeout, Duration::from_secs(10));
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.ttl, Duration::from_secs(900));
    assert_eq!(settings.cache.key_prefix, "doc:");
    assert_eq!(settings.cache.capacity, 10_000);
}

#[test]
fn file_values_are_deserialized() {
    let raw = raw_from_toml(
        r#"
        [server]
        host = "0.0.0.0"
        port = 9090

        [database]
        url = "  postgres://file  "

        [cache]
        enabled = false
        ttl_seconds = 60
        key_prefix = "d:"
        "#,
    );
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "0.0.0.0:9090");
    assert_eq!(settings.database.url.as_deref(), Some("postgres://file"));
    assert!(!settings.cache.enabled);
    assert_eq!(settings.cache.ttl, Duration::from_secs(60));
    assert_eq!(settings.cache.key_prefix, "d:");
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = raw_from_toml(
        r#"
        [server]
        port = 4000

        [logging]
        level = "info"

        [cache]
        ttl_seconds = 60
        "#,
    );

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        cache_ttl_seconds: Some(5),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.ttl, Duration::from_secs(5));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.format, LogFormat::Json);
}

#[test]
fn migrate_only_overrides_database_url() {
    let mut raw = RawSettings::default();
    let args = CliArgs::parse_from(["docservice", "migrate", "--database-url", "postgres://m"]);

    raw.apply_command(args.command.as_ref());
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.database.url.as_deref(), Some("postgres://m"));
    assert_eq!(settings.server.addr.port(), 8080);
}

#[test]
fn zero_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero ttl rejected");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.ttl_seconds",
            ..
        }
    ));
}

#[test]
fn oversized_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(u64::MAX);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "cache.ttl_seconds",
            ..
        })
    ));

    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(MAX_CACHE_TTL_SECS);
    let settings = Settings::from_raw(raw).expect("bound is inclusive");
    assert_eq!(settings.cache.ttl, Duration::from_secs(MAX_CACHE_TTL_SECS));
}

#[test]
fn zero_port_and_pool_are_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "server.port",
            ..
        })
    ));

    let mut raw = RawSettings::default();
    raw.database.max_connections = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "database.max_connections",
            ..
        })
    ));
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "logging.level",
            ..
        })
    ));
}

#[test]
fn blank_prefix_and_zero_capacity_fall_back() {
    let mut raw = RawSettings::default();
    raw.cache.key_prefix = Some("   ".to_string());
    raw.cache.capacity = Some(0);

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.cache.key_prefix, "doc:");
    assert_eq!(settings.cache.capacity, 1);
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["docservice"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "docservice",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-enabled",
        "false",
        "--cache-key-prefix",
        "docs:",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.cache_enabled, Some(false));
            assert_eq!(serve.overrides.cache_key_prefix.as_deref(), Some("docs:"));
        }
        _ => panic!("wrong command parsed"),
    }
}

use std::io::Write;

use rust_decimal_macros::dec;
use slotbid::application::TargetingMode;
use slotbid::error::{ConfigError, Error};
use slotbid::infrastructure::bootstrap;
use slotbid::infrastructure::config::partner::Deployment;
use slotbid::infrastructure::config::settings::Config;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn config_loads_full_file() {
    let file = write_temp_config(
        r#"
[partner]
id = "SonobiHtb"
analytics = false

[partner.targeting_keys]
om = "ix_sbi_om"

[adapter]
base_url = "https://apex.go.sonobi.com/trinity.js"
callback_name = "sbi_cb"
timeout_ms = 750
line_item_type = "custom"
deployment = "targeting_only"
return_creative = true

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = Config::load(file.path()).expect("config should load");

    assert!(!config.partner.analytics);
    assert_eq!(config.adapter.callback_name, "sbi_cb");
    assert_eq!(config.timeout().as_millis(), 750);
    assert_eq!(
        config.adapter.line_item_type.targeting_mode(),
        TargetingMode::PassThrough
    );
    assert_eq!(config.adapter.deployment, Deployment::TargetingOnly);
    assert!(config.adapter.price_buckets().is_none());
    assert!(config.adapter.return_creative);
}

#[test]
fn config_rejects_zero_timeout() {
    let file = write_temp_config(
        r#"
[adapter]
timeout_ms = 0
"#,
    );

    let err = Config::load(file.path()).expect_err("zero timeout should fail");
    match err {
        Error::Config(ConfigError::InvalidValue { field, .. }) => {
            assert_eq!(field, "adapter.timeout_ms");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn config_rejects_unordered_bid_transformer() {
    let file = write_temp_config(
        r#"
[adapter.bid_transformer]
rounding_type = "FLOOR"
buckets = [
    { max = 5000, step = 100 },
    { max = 2000, step = 5 },
]
"#,
    );

    let err = Config::load(file.path()).expect_err("unordered buckets should fail");
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "adapter.bid_transformer",
            ..
        })
    ));
}

#[test]
fn config_missing_file_is_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = Config::load(dir.path().join("absent.toml")).expect_err("missing file");
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn config_malformed_toml_is_parse_error() {
    let file = write_temp_config("[adapter\ntimeout_ms = 10");
    let err = Config::load(file.path()).expect_err("malformed toml");
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}

#[test]
fn custom_bid_transformer_drives_the_parser() {
    let file = write_temp_config(
        r#"
[adapter.bid_transformer]
input_cents_multiplier = 100
rounding_type = "FLOOR"
buckets = [{ max = 10000, step = 50 }]
"#,
    );
    let config = Config::load(file.path()).expect("config should load");

    let targeting = config.adapter.targeting_buckets().expect("targeting buckets");
    assert_eq!(targeting.input_cents_multiplier, dec!(100));
    assert_eq!(
        config
            .adapter
            .price_buckets()
            .expect("price buckets")
            .input_cents_multiplier,
        dec!(100)
    );

    let parser = bootstrap::build_parser(&config).expect("parser");
    assert_eq!(parser.mode(), TargetingMode::Bucketed);
}

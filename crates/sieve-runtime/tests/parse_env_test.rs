//! Environment configuration through parse_env

mod common;

use serde::Deserialize;
use serde_json::{json, Value};
use sieve_core::{props, Codec, Record};
use sieve_runtime::{
    format_errors, parse_env, parse_env_w, FormatStyle, MapEnv, RuntimeError,
};

fn foo_codec() -> Codec {
    Codec::type_of(props! {
        "FOO" => Codec::union(vec![Codec::number(), Codec::number_from_string()]),
    })
}

fn defaults(value: Value) -> Option<Record> {
    value.as_object().cloned()
}

#[test]
fn test_reads_declared_variables() -> anyhow::Result<()> {
    common::init_tracing();
    let parser = parse_env(&foo_codec())?;
    let env = MapEnv::new().with("FOO", "0").with("PATH", "/usr/bin");

    assert_eq!(parser.run_with(&env)?, json!({"FOO": 0}));
    Ok(())
}

#[test]
fn test_falls_back_to_defaults() -> anyhow::Result<()> {
    let parser = parse_env(&foo_codec())?.with_defaults(&json!({"FOO": 9}))?;

    assert_eq!(parser.run_with(&MapEnv::new())?, json!({"FOO": 9}));
    Ok(())
}

#[test]
fn test_environment_wins_over_defaults() -> anyhow::Result<()> {
    let parser = parse_env_w(&foo_codec(), defaults(json!({"FOO": 9})))?;
    let env = MapEnv::new().with("FOO", "1");

    assert_eq!(parser.run_with(&env)?, json!({"FOO": 1}));
    Ok(())
}

#[test]
fn test_invalid_variable_is_reported_at_its_path() -> anyhow::Result<()> {
    let parser = parse_env(&foo_codec())?;
    let env = MapEnv::new().with("FOO", "not a number");

    let errors = parser.run_with(&env).unwrap_err();
    assert_eq!(errors.len(), 2);

    let report = format_errors(&errors, FormatStyle::OneLine);
    for line in report.lines() {
        assert!(line.contains("at '.FOO' but got ''not a number''"), "{}", line);
    }
    Ok(())
}

#[test]
fn test_missing_required_variable_fails() -> anyhow::Result<()> {
    let parser = parse_env(&foo_codec())?;
    assert!(parser.run_with(&MapEnv::new()).is_err());
    Ok(())
}

#[test]
fn test_intersection_order_does_not_matter() -> anyhow::Result<()> {
    let host = Codec::type_of(props! { "HOST" => Codec::string() });
    let port = Codec::partial(props! { "PORT" => Codec::number_from_string() });
    let forward = parse_env(&Codec::intersection(vec![host.clone(), port.clone()]))?;
    let backward = parse_env(&Codec::intersection(vec![port, host]))?;

    let env = MapEnv::new()
        .with("HOST", "localhost")
        .with("PORT", "8080")
        .with("USER", "root");
    let expected = json!({"HOST": "localhost", "PORT": 8080});
    assert_eq!(forward.run_with(&env)?, expected);
    assert_eq!(backward.run_with(&env)?, expected);
    Ok(())
}

#[test]
fn test_union_selects_the_matching_branch() -> anyhow::Result<()> {
    let parser = parse_env(&Codec::union(vec![
        Codec::type_of(props! { "A" => Codec::string() }),
        Codec::type_of(props! { "B" => Codec::string() }),
    ]))?;

    let env = MapEnv::new().with("B", "value");
    assert_eq!(parser.run_with(&env)?, json!({"B": "value"}));
    Ok(())
}

#[test]
fn test_every_run_reads_the_process_environment_again() -> anyhow::Result<()> {
    const VAR: &str = "SIEVE_RUNTIME_PARSE_ENV_RERUN_TOKEN";
    let parser = parse_env(&Codec::type_of(props! { VAR => Codec::string() }))?;

    std::env::remove_var(VAR);
    assert!(parser.run().is_err());

    std::env::set_var(VAR, "first");
    assert_eq!(parser.run()?, json!({ VAR: "first" }));

    let deferred = parser.as_fn();
    std::env::set_var(VAR, "second");
    assert_eq!(deferred()?, json!({ VAR: "second" }));

    std::env::remove_var(VAR);
    Ok(())
}

#[test]
fn test_unsupported_codecs_are_rejected_up_front() {
    for codec in [
        Codec::string(),
        Codec::array(Codec::type_of(props! { "A" => Codec::string() })),
        Codec::strict(props! { "A" => Codec::string() }),
    ] {
        let err = parse_env(&codec).unwrap_err();
        assert!(matches!(err, RuntimeError::UnsupportedShape { .. }));
        assert!(err.to_string().contains("needs to be of type"), "{}", err);
    }
}

#[derive(Debug, PartialEq, Deserialize)]
struct ServerConfig {
    #[serde(rename = "HOST")]
    host: String,
    #[serde(rename = "PORT")]
    port: u16,
}

fn server_codec() -> Codec {
    Codec::type_of(props! {
        "HOST" => Codec::string(),
        "PORT" => Codec::number_from_string(),
    })
}

#[test]
fn test_deserializes_into_typed_configuration() -> anyhow::Result<()> {
    let parser = parse_env(&server_codec())?.with_defaults(&json!({"HOST": "0.0.0.0"}))?;
    let env = MapEnv::new().with("PORT", "443");

    let config: ServerConfig = parser.run_as_with(&env)?;
    assert_eq!(
        config,
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 443,
        }
    );
    Ok(())
}

#[test]
fn test_unrepresentable_values_fail_at_the_root() -> anyhow::Result<()> {
    let parser = parse_env(&server_codec())?;
    let env = MapEnv::new().with("HOST", "localhost").with("PORT", "70000");

    let errors = parser.run_as_with::<ServerConfig, _>(&env).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors[0].context.len(), 1);
    let message = errors.errors[0].message.as_deref().unwrap_or_default();
    assert!(message.starts_with("cannot deserialize configuration"), "{}", message);
    Ok(())
}

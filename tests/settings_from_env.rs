//! Integration tests for registering a client configured from environment variables.

mod common;

use rpc_client_registry::{
    try_register_client, ConfigError, RegistrarError, RpcClient, ServiceCollection,
    ServiceResolver, SettingsLoader,
};
use serial_test::serial;
use std::env;
use std::time::Duration;

const PREFIX: &str = "RPC_CLIENT_IT_";

fn clear_env() {
    for name in ["ADDRESS", "CONNECTION_NAME", "DEFAULT_DEADLINE_MS"] {
        env::remove_var(format!("{PREFIX}{name}"));
    }
}

#[test]
#[serial]
fn test_register_from_environment() {
    common::init_tracing();
    clear_env();
    env::set_var("RPC_CLIENT_IT_ADDRESS", "grpc://env-node:2113");
    env::set_var("RPC_CLIENT_IT_CONNECTION_NAME", "ledger");
    env::set_var("RPC_CLIENT_IT_DEFAULT_DEADLINE_MS", "250");

    let loader = SettingsLoader::with_prefix(PREFIX);
    let mut services = ServiceCollection::new();
    try_register_client::<RpcClient, _, _>(Some(&mut services), |settings| loader.apply(settings))
        .unwrap();
    clear_env();

    let client = services
        .build_provider()
        .get_required_service::<RpcClient>()
        .unwrap();
    let call = client.prepare_call("users.Disable");

    assert_eq!(client.endpoint().host, "env-node");
    assert_eq!(call.metadata("connection-name"), Some("ledger"));
    assert_eq!(call.deadline(), Some(Duration::from_millis(250)));
}

#[test]
#[serial]
fn test_invalid_environment_registers_nothing() {
    clear_env();
    env::set_var("RPC_CLIENT_IT_DEFAULT_DEADLINE_MS", "-1");

    let loader = SettingsLoader::with_prefix(PREFIX);
    let mut services = ServiceCollection::new();
    let err = try_register_client::<RpcClient, _, _>(Some(&mut services), |settings| {
        loader.apply(settings)
    })
    .unwrap_err();
    clear_env();

    let RegistrarError::Configure(source) = err else {
        panic!("expected a configuration error");
    };
    assert_eq!(
        source.downcast_ref::<ConfigError>(),
        Some(&ConfigError::InvalidValue {
            key: "RPC_CLIENT_IT_DEFAULT_DEADLINE_MS".into(),
            value: "-1".into(),
        })
    );
    assert!(services.is_empty());
}

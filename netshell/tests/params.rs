//! Parameter document resolution, as the module front-end sees it.

use std::io::Write;

use netshell::error::ParamError;
use netshell::params::{ConnectionKind, ModuleParams, ModuleResult};

fn resolve(document: &str) -> Result<netshell::params::ResolvedParams, ParamError> {
    ModuleParams::from_json(document)?.resolve()
}

#[test]
fn missing_password_is_reported_by_name() {
    let err = resolve(
        r#"{"host": "172.16.1.82", "username": "manager", "platform": "hp_procurve",
            "commands": ["vlan 10"]}"#,
    )
    .unwrap_err();

    assert!(matches!(err, ParamError::Missing { name: "password" }));
    assert_eq!(err.to_string(), "password is required");
}

#[test]
fn required_fields_checked_in_order() {
    let err = resolve(r#"{"commands": ["vlan 10"]}"#).unwrap_err();
    assert_eq!(err.to_string(), "host is required");

    let err = resolve(r#"{"host": "sw1", "password": "pw", "commands": ["vlan 10"]}"#).unwrap_err();
    assert_eq!(err.to_string(), "username is required");

    let err = resolve(r#"{"host": "sw1", "username": "u", "password": "pw"}"#).unwrap_err();
    assert_eq!(err.to_string(), "platform is required");
}

#[test]
fn provider_fills_gaps_and_local_wins() {
    let resolved = resolve(
        r#"{
            "host": "10.0.0.5",
            "commands": ["vlan 10", "name vlan_10", "end"],
            "provider": {
                "host": "10.0.0.1",
                "username": "ntc-ansible",
                "password": "ntc-ansible",
                "platform": "cisco_nxos",
                "connection": "ssh"
            }
        }"#,
    )
    .unwrap();

    assert_eq!(resolved.host, "10.0.0.5");
    assert_eq!(resolved.username, "ntc-ansible");
    assert_eq!(resolved.device_type, "cisco_nxos");
    assert_eq!(resolved.connection, ConnectionKind::Ssh);
    assert_eq!(resolved.port, 22);
    assert_eq!(resolved.commands.len(), 3);
    assert!(resolved.secret.is_none());
}

#[test]
fn null_and_empty_values_fall_back_to_provider() {
    let resolved = resolve(
        r#"{
            "host": "",
            "username": null,
            "commands": ["show clock"],
            "provider": {"host": "sw1", "username": "u", "password": "p", "platform": "linux"}
        }"#,
    )
    .unwrap();
    assert_eq!(resolved.host, "sw1");
    assert_eq!(resolved.username, "u");
}

#[test]
fn telnet_only_for_cisco_ios() {
    let err = resolve(
        r#"{"connection": "telnet", "host": "sw1", "username": "u", "password": "p",
            "platform": "hp_procurve", "commands": ["show clock"]}"#,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "only cisco_ios supports telnet connection");

    let resolved = resolve(
        r#"{"connection": "telnet", "host": "rtr1", "username": "u", "password": "p",
            "platform": "cisco_ios", "commands": ["show clock"]}"#,
    )
    .unwrap();
    assert_eq!(resolved.device_type, "cisco_ios_telnet");
    assert_eq!(resolved.port, 23);
}

#[test]
fn unknown_connection_kind_is_rejected() {
    let err = ModuleParams::from_json(r#"{"connection": "serial"}"#).unwrap_err();
    assert!(matches!(err, ParamError::InvalidDocument(_)));
}

#[test]
fn port_accepts_numbers_and_strings() {
    let base = r#""host": "sw1", "username": "u", "password": "p", "platform": "linux",
                  "commands": ["uptime"]"#;

    let resolved = resolve(&format!(r#"{{{base}, "port": 2222}}"#)).unwrap();
    assert_eq!(resolved.port, 2222);

    let resolved = resolve(&format!(r#"{{{base}, "port": "8022"}}"#)).unwrap();
    assert_eq!(resolved.port, 8022);

    let err = resolve(&format!(r#"{{{base}, "port": "ssh"}}"#)).unwrap_err();
    assert!(matches!(err, ParamError::InvalidPort { .. }));
}

#[test]
fn commands_file_is_read_line_by_line() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "vlan 10").unwrap();
    writeln!(file, "   name vlan_10   ").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "exit").unwrap();

    let document = serde_json::json!({
        "host": "sw1",
        "username": "manager",
        "password": "manager",
        "platform": "hp_procurve",
        "commands_file": file.path(),
    });
    let resolved = resolve(&document.to_string()).unwrap();

    assert_eq!(resolved.commands, ["vlan 10", "   name vlan_10", "exit"]);
}

#[test]
fn missing_commands_file_names_the_path() {
    let err = resolve(
        r#"{"host": "sw1", "username": "u", "password": "p", "platform": "hp_procurve",
            "commands_file": "/nonexistent/dynamically_created_config.txt"}"#,
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Unable to locate: /nonexistent/dynamically_created_config.txt"
    );
}

#[test]
fn commands_and_file_are_exclusive() {
    let err = resolve(
        r#"{"host": "sw1", "username": "u", "password": "p", "platform": "hp_procurve",
            "commands": ["vlan 10"], "commands_file": "cfg.txt"}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ParamError::ConflictingCommands));
}

#[test]
fn passwords_never_appear_in_debug_output() {
    let resolved = resolve(
        r#"{"host": "sw1", "username": "u", "password": "s3cr3t-pw", "secret": "en4ble",
            "platform": "hp_procurve", "commands": ["vlan 10"]}"#,
    )
    .unwrap();

    let shown = format!("{resolved:?}");
    assert!(!shown.contains("s3cr3t-pw"));
    assert!(!shown.contains("en4ble"));
}

#[test]
fn module_result_round_trips_to_json_shape() {
    let failure: serde_json::Value =
        serde_json::from_str(&ModuleResult::failed("host is required").to_json()).unwrap();
    assert_eq!(
        failure,
        serde_json::json!({"changed": false, "failed": true, "msg": "host is required"})
    );

    let success: serde_json::Value =
        serde_json::from_str(&ModuleResult::changed("vlan 10\r\nsw# ").to_json()).unwrap();
    assert_eq!(
        success,
        serde_json::json!({"changed": true, "response": "vlan 10\r\nsw# "})
    );
}

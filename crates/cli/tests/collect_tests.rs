//! Integration tests for the `collect` command.

mod common;

use common::{Fixture, osdinfo_cmd};
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_collect_table() {
    let fixture = Fixture::new(json!({
        "Model": "Latitude 7420",
        "XOSDInfo_Imaged": "2020-03-22",
        "XOSDInfo_Approved": "Yes",
        "XOSDInfo_Label": "Foo_Bar"
    }));
    fixture
        .cmd()
        .arg("collect")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Name\tType\tValue\n"))
        .stdout(predicate::str::contains("Model\tString\tLatitude 7420\n"))
        .stdout(predicate::str::contains("Approved\tBoolean\tTrue\n"))
        .stdout(predicate::str::contains("Imaged\tDateTime\t2020-03-22 00:00:00 +00:00\n"))
        .stdout(predicate::str::contains("Label\tString\tFoo_Bar\n"));

    assert!(!fixture.store_dir().exists());
}

#[test]
fn test_collect_json_preserves_order() {
    let fixture = Fixture::new(json!({
        "Make": "Contoso",
        "XOSDInfo_Zone": "B",
        "XOSDInfo_alpha": "A"
    }));
    let output = fixture
        .cmd()
        .args(["collect", "--output", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let entries: indexmap::IndexMap<String, serde_json::Value> =
        serde_json::from_slice(&output).unwrap();
    let names: Vec<&str> = entries.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["DeploymentProduct", "Make", "alpha", "Zone"]);
    assert_eq!(entries["Make"]["value"], json!("Contoso"));
}

#[test]
fn test_collect_custom_prefix() {
    let fixture = Fixture::new(json!({
        "Contoso-Ring": "Pilot",
        "XOSDInfo_Ring": "Broad"
    }));
    fixture
        .cmd()
        .args(["--prefix", "Contoso-", "collect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ring\tString\tPilot\n"));
}

#[test]
fn test_collect_from_environment() {
    osdinfo_cmd()
        .args(["--prefix", "OSDINFOTEST_", "collect", "--output", "json"])
        .env("OSDINFOTEST_BuildNumber", "42")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""BuildNumber""#));
}

#[test]
fn test_collect_empty_source() {
    Fixture::new(json!({}))
        .cmd()
        .arg("collect")
        .assert()
        .success()
        .stdout("No entries collected.\n");
}

#[test]
fn test_collect_rejects_nested_objects() {
    Fixture::new(json!({"Model": {"nested": true}}))
        .cmd()
        .arg("collect")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse deployment environment"));
}

//! Collection scenarios through the public API.

use chrono_tz::Tz;
use osdinfo_config::DateCulture;
use osdinfo_core::{
    MapSource, SourceZone, TimezoneNormalizer, TypeInferenceEngine, TypeTag, TypedValue,
    VariableCollector,
};

const PREFIX: &str = "XOSDInfo_";

fn utc_collector() -> VariableCollector {
    VariableCollector::new(
        TypeInferenceEngine::new(DateCulture::EnUs),
        TimezoneNormalizer::new(SourceZone::Named(Tz::UTC), Tz::UTC, Tz::UTC),
    )
}

#[test]
fn test_custom_values_are_typed() {
    let source: MapSource = [
        ("XOSDInfo_Imaged", "2020-03-22"),
        ("XOSDInfo_Approved", "True"),
        ("XOSDInfo_Encrypted", "Yes"),
        ("XOSDInfo_DiskGB", "43.5"),
        ("XOSDInfo_Label", "Foo_Bar"),
        ("XOSDInfo_Blank", ""),
    ]
    .into_iter()
    .collect();

    let entries = utc_collector().collect(&source, PREFIX);

    assert_eq!(entries.get("Imaged").unwrap().tag(), TypeTag::DateTime);
    assert_eq!(entries.get("Approved").unwrap().value(), &TypedValue::Boolean(true));
    assert_eq!(entries.get("Encrypted").unwrap().value(), &TypedValue::Boolean(true));
    assert_eq!(entries.get("DiskGB").unwrap().value(), &TypedValue::Number(43.5));
    assert_eq!(
        entries.get("Label").unwrap().value(),
        &TypedValue::String("Foo_Bar".to_string())
    );
    assert_eq!(entries.get("Blank").unwrap().value(), &TypedValue::Null);
}

#[test]
fn test_elapsed_hours_from_start_and_end() {
    let source: MapSource = [
        ("XOSDInfo_OSDStartTime", "2020-01-01T00:00:00"),
        ("XOSDInfo_OSDEndTime", "2020-01-01T01:30:00"),
    ]
    .into_iter()
    .collect();

    let entries = utc_collector().collect(&source, PREFIX);
    let TypedValue::Number(hours) = entries.get("OSDTotalHours").unwrap().value() else {
        panic!("OSDTotalHours should be a number");
    };
    assert!((hours - 1.5).abs() < 1e-9);
}

#[test]
fn test_sanitized_collision_keeps_later_value() {
    let source: MapSource = [("XOSDInfo_A.B", "first"), ("XOSDInfo_AB", "second")]
        .into_iter()
        .collect();
    let entries = utc_collector().collect(&source, PREFIX);
    assert_eq!(entries.get("AB").unwrap().raw(), "second");
    assert_eq!(entries.iter().filter(|e| e.name() == "AB").count(), 1);
}

#[test]
fn test_empty_source_collects_nothing() {
    let entries = utc_collector().collect(&MapSource::new(), PREFIX);
    assert!(entries.is_empty());
}

#[test]
fn test_mdt_defaults_then_custom() {
    let source: MapSource = [
        ("Make", "Contoso"),
        ("IsLaptop", "True"),
        ("XOSDInfo_Ring", "Pilot"),
        ("XOSDInfo_Make", "Override"),
    ]
    .into_iter()
    .collect();

    let entries = utc_collector().collect(&source, PREFIX);
    let names: Vec<_> = entries.names().collect();
    assert_eq!(names, vec!["DeploymentProduct", "IsLaptop", "Make", "Ring"]);
    assert_eq!(entries.get("Make").unwrap().raw(), "Override");
}

#[test]
fn test_destination_and_final_zones_apply_to_custom_dates() {
    let collector = VariableCollector::new(
        TypeInferenceEngine::new(DateCulture::EnGb),
        TimezoneNormalizer::new(
            SourceZone::Named(Tz::Europe__London),
            Tz::America__Chicago,
            Tz::UTC,
        ),
    );
    let source: MapSource = [("XOSDInfo_Imaged", "01/07/2021 10:00:00")].into_iter().collect();
    let entries = collector.collect(&source, PREFIX);

    let entry = entries.get("Imaged").unwrap();
    // London is on BST (+1) in July.
    assert_eq!(
        entry.value().display_string(),
        "2021-07-01 09:00:00 +00:00"
    );
}

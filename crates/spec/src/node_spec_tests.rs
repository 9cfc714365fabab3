use super::*;

#[test]
fn unknown_keys_are_rejected() {
    let err = serde_json::from_str::<NodeSpec>(r#"{"image": {"flavour": "m1"}}"#);
    assert!(err.is_err());
    let err = serde_json::from_str::<NodeSpec>(r#"{"volumes": []}"#);
    assert!(err.is_err());
}

#[test]
fn serde_roundtrip() {
    let spec = NodeSpec::default()
        .with_image(ImageSpec::os("ubuntu", "24.04"))
        .with_hardware(HardwareSpec { hardware_id: None, min_cores: Some(2), min_ram_mb: Some(2048) })
        .with_network(NetworkSpec { inbound_ports: vec![22, 80] });

    let json = serde_json::to_string(&spec).unwrap();
    let parsed: NodeSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, spec);
}

#[test]
fn overlay_replaces_sections_wholesale() {
    let base = NodeSpec::default()
        .with_image(ImageSpec::os("ubuntu", "22.04"))
        .with_location(LocationSpec { location_id: Some("eu-west-1".into()) });
    let child = NodeSpec::default().with_image(ImageSpec::id("ami-123"));

    let merged = base.overlaid_with(&child);

    // child's image section wins entirely, including unset fields
    assert_eq!(merged.image, Some(ImageSpec::id("ami-123")));
    // untouched sections are kept from the base
    assert_eq!(merged.location, base.location);
}

#[test]
fn empty_spec_reports_empty() {
    assert!(NodeSpec::default().is_empty());
    assert!(!NodeSpec::default().with_image(ImageSpec::id("ami-1")).is_empty());
}

use stateboard_types::*;
use std::collections::HashSet;

#[test]
fn test_rendered_keys_are_distinct_per_variant_and_value() {
    let keys = [
        InstanceKey::NoKey,
        InstanceKey::Int(0),
        InstanceKey::Int(1),
        InstanceKey::from("0"),
        InstanceKey::from("a"),
    ];

    let rendered: HashSet<String> = keys.iter().map(InstanceKey::render).collect();
    assert_eq!(rendered.len(), keys.len());
}

#[test]
fn test_rendered_keys_have_canonical_shape() {
    assert_eq!(InstanceKey::NoKey.to_string(), "");
    assert_eq!(InstanceKey::Int(7).to_string(), "[7]");
    assert_eq!(InstanceKey::from("7").to_string(), "[\"7\"]");
}

#[test]
fn test_instance_key_serde_round_trip() -> anyhow::Result<()> {
    let instance = ResourceInstance {
        index_key: InstanceKey::from("eu-west-1"),
        current: None,
    };

    let json = serde_json::to_string(&instance)?;
    assert!(json.contains(r#""index_key":"eu-west-1""#));

    let decoded: ResourceInstance = serde_json::from_str(&json)?;
    assert_eq!(decoded, instance);
    Ok(())
}

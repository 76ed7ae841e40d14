use parley_model::{ENTITY_NAME_KEY, Record};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn tagged_record_carries_type_name() {
    let record = Record::tagged("PizzaOrder");
    assert_eq!(record.entity_name(), Some("PizzaOrder"));
    assert_eq!(record.get(ENTITY_NAME_KEY), Some(&json!("PizzaOrder")));
}

#[test]
fn set_returns_previous_value() {
    let mut record = Record::new();
    assert_eq!(record.set("size", json!("large")), None);
    assert_eq!(record.set("size", json!("small")), Some(json!("large")));
    assert_eq!(record.get_str("size"), Some("small"));
}

#[test]
fn remove_deletes_slot() {
    let mut record = Record::new();
    record.set("size", json!("large"));
    assert_eq!(record.remove("size"), Some(json!("large")));
    assert!(!record.contains("size"));
    assert!(record.is_empty());
}

#[test]
fn from_value_rejects_non_objects() {
    assert!(Record::from_value(&json!("nope")).is_none());
    assert!(Record::from_value(&json!(null)).is_none());
    let record = Record::from_value(&json!({"color": "red"})).unwrap();
    assert_eq!(record.get_str("color"), Some("red"));
}

#[test]
fn serializes_as_plain_object() {
    let mut record = Record::tagged("Bag");
    record.set("color", json!("red"));
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value, json!({"entityName": "Bag", "color": "red"}));

    let back: Record = serde_json::from_value(value).unwrap();
    assert_eq!(back, record);
}

use super::record::{FeatureRow, StudentRecord};

fn sample_record() -> StudentRecord {
    StudentRecord {
        age: 21.0,
        gender: "Male".to_string(),
        department: "Engineering".to_string(),
        sleep_duration: 7.5,
        study_hours: 3.0,
        social_media_hours: 3.0,
        physical_activity: 60.0,
        stress_level: 4.0,
    }
}

#[test]
fn test_record_numeric_order_matches_layout() {
    let record = sample_record();
    assert_eq!(record.numeric_values(), [21.0, 7.5, 3.0, 3.0, 60.0, 4.0]);
    assert_eq!(record.categorical_values(), ["Male", "Engineering"]);
}

#[test]
fn test_record_to_feature_row_is_complete() {
    let row = FeatureRow::from(&sample_record());
    assert!(row.is_complete());
    assert_eq!(row.missing_count(), 0);
    assert_eq!(row.categorical[1].as_deref(), Some("Engineering"));
}

#[test]
fn test_default_feature_row_is_all_missing() {
    let row = FeatureRow::default();
    assert!(!row.is_complete());
    assert_eq!(row.missing_count(), 8);
}

#[test]
fn test_record_json_uses_column_names() {
    let json = serde_json::to_value(sample_record()).unwrap();
    assert_eq!(json["Stress_Level"], 4.0);
    assert_eq!(json["Department"], "Engineering");

    let body = r#"{"Age":21,"Gender":"Female","Department":"Science","Sleep_Duration":6,
        "Study_Hours":2.5,"Social_Media_Hours":4,"Physical_Activity":120,"Stress_Level":7}"#;
    let parsed: StudentRecord = serde_json::from_str(body).unwrap();
    assert_eq!(parsed.gender, "Female");
    assert_eq!(parsed.physical_activity, 120.0);
}

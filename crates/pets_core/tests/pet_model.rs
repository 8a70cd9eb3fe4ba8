use pets_core::{Gender, PetRecord, PetValidationError};

#[test]
fn record_serialization_uses_column_names_and_gender_codes() {
    let record = PetRecord {
        id: 3,
        name: "Toto".to_string(),
        breed: Some("Terrier".to_string()),
        gender: Gender::Male,
        weight: 7,
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["name"], "Toto");
    assert_eq!(json["breed"], "Terrier");
    assert_eq!(json["gender"], 1);
    assert_eq!(json["weight"], 7);

    let decoded: PetRecord = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn deserialize_rejects_out_of_range_gender() {
    let value = serde_json::json!({
        "id": 1,
        "name": "Odd",
        "breed": null,
        "gender": 4,
        "weight": 1
    });

    let err = serde_json::from_value::<PetRecord>(value).unwrap_err();
    assert!(
        err.to_string().contains("valid gender"),
        "unexpected error: {err}"
    );
}

#[test]
fn deserialize_rejects_negative_weight_and_blank_name() {
    let negative = serde_json::json!({
        "id": 1, "name": "Rex", "breed": null, "gender": 0, "weight": -2
    });
    let err = serde_json::from_value::<PetRecord>(negative).unwrap_err();
    assert!(err.to_string().contains("weight must be >= 0"));

    let blank = serde_json::json!({
        "id": 1, "name": " ", "breed": null, "gender": 0, "weight": 2
    });
    assert!(serde_json::from_value::<PetRecord>(blank).is_err());
}

#[test]
fn labels_cover_every_gender_and_blank_breed() {
    assert_eq!(Gender::Unknown.label(), "Unknown");
    assert_eq!(Gender::Male.label(), "Male");
    assert_eq!(Gender::Female.label(), "Female");

    let record = PetRecord {
        id: 1,
        name: "Nala".to_string(),
        breed: Some("  ".to_string()),
        gender: Gender::Female,
        weight: 0,
    };
    assert_eq!(record.breed_label(), "Unknown breed");
    assert!(record.validate().is_ok());
}

#[test]
fn record_validation_rejects_non_positive_id() {
    let record = PetRecord {
        id: 0,
        name: "Ghost".to_string(),
        breed: None,
        gender: Gender::Unknown,
        weight: 0,
    };
    assert_eq!(record.validate().unwrap_err(), PetValidationError::InvalidId(0));
}

use labcode_model::{
    AttributeType, CatalogEntry, IssueKind, Judgment, MappingIssue, Origin, Record, RecordInput,
    SuggestedEntry, Suggestion,
};

fn glucose() -> CatalogEntry {
    CatalogEntry::new("2345-7", "CHEM")
        .with_attribute(AttributeType::Component, "Glucose")
        .with_attribute(AttributeType::Property, "MCnc")
        .with_attribute(AttributeType::Time, "Pt")
        .with_attribute(AttributeType::System, "Ser/Plas")
        .with_attribute(AttributeType::Scale, "Qn")
}

#[test]
fn output_flattens_suggestion_and_issues() {
    let input = RecordInput::new("2345-7", "URINE GLUCOSE", "mg/dL").with_specimen("URINE");
    let mut record = Record::from_input(&input, Some(&glucose()));
    record.judgment = Judgment::Fixed;
    record.raise(MappingIssue::new(
        IssueKind::Specimen,
        AttributeType::System,
        "Urine != Ser/Plas",
        0.9,
    ));
    record.infer(AttributeType::System, "Urine", Origin::Parsed);
    record.target = Some("SYSTEM=[Urine]".to_string());
    record.suggestion = Some(Suggestion {
        primary: SuggestedEntry {
            id: "2350-7".to_string(),
            display_name: "Glucose [Mass/volume] in Urine".to_string(),
            score: 100.0,
            relaxations: vec![],
        },
        alternates: vec![
            SuggestedEntry {
                id: "5792-7".to_string(),
                display_name: "Glucose [Mass/volume] in Urine by Test strip".to_string(),
                score: 25.0,
                relaxations: vec!["METHOD-match-waived".to_string()],
            },
            SuggestedEntry {
                id: "25428-4".to_string(),
                display_name: "Glucose [Presence] in Urine by Test strip".to_string(),
                score: 10.0,
                relaxations: vec![],
            },
        ],
    });

    let output = record.to_output();
    assert_eq!(output.judgment, "FIXED");
    assert_eq!(output.suggested_entry, "2350-7");
    assert_eq!(output.alternate_entries, "5792-7; 25428-4");
    assert_eq!(output.parsed_attributes, "SYSTEM=[Urine]");
    assert_eq!(output.inferred_attributes, "");
    assert_eq!(
        output.mapping_issues,
        "specimen(SYSTEM): Urine != Ser/Plas [0.90]"
    );
    assert_eq!(output.specimen, "URINE");
}

#[test]
fn unknown_code_keeps_supplied_attributes() {
    let mut input = RecordInput::new("0000-0", "SODIUM", "mmol/L");
    input.system = "Ser/Plas".to_string();
    input.class = "CHEM".to_string();
    let record = Record::from_input(&input, None);
    assert_eq!(record.attribute(AttributeType::System), "Ser/Plas");
    assert_eq!(record.class(), "CHEM");
    assert_eq!(record.judgment, Judgment::Unprocessed);
}

#[test]
fn judgment_serializes_as_tag() {
    let json = serde_json::to_string(&Judgment::ExcludedNonTextualName).unwrap();
    assert_eq!(json, "\"EXCLUDED_NON_TEXTUAL_NAME\"");
}

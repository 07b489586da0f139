use marksheet_core::{NewRecord, Notice, NoticeLevel, RecordForm, ValidationError};

fn form(name: &str, marks: &str) -> RecordForm {
    RecordForm {
        name: name.to_string(),
        marks: marks.to_string(),
    }
}

#[test]
fn from_form_trims_name_and_marks() {
    let record = NewRecord::from_form(&form("  Abhishek  ", " 92 ")).unwrap();
    assert_eq!(record.name(), "Abhishek");
    assert_eq!(record.marks(), 92);
}

#[test]
fn from_form_accepts_signed_marks() {
    assert_eq!(NewRecord::from_form(&form("a", "-5")).unwrap().marks(), -5);
    assert_eq!(NewRecord::from_form(&form("a", "+7")).unwrap().marks(), 7);
}

#[test]
fn blank_names_are_rejected() {
    for name in ["", "   ", "\t\n"] {
        let err = NewRecord::from_form(&form(name, "10")).unwrap_err();
        assert_eq!(err, ValidationError::NameRequired);
        assert_eq!(err.to_string(), "Name is required.");
    }
}

#[test]
fn non_integer_marks_are_rejected() {
    for marks in ["abc", "", "9.5", "1e3"] {
        let err = NewRecord::from_form(&form("Abhishek", marks)).unwrap_err();
        assert!(matches!(err, ValidationError::MarksNotInteger { .. }));
        assert_eq!(err.to_string(), "Marks must be an integer.");
    }
}

#[test]
fn name_is_checked_before_marks() {
    let err = NewRecord::from_form(&form(" ", "abc")).unwrap_err();
    assert_eq!(err, ValidationError::NameRequired);
}

#[test]
fn notice_levels_round_trip_through_text() {
    assert_eq!(NoticeLevel::parse(NoticeLevel::Info.as_str()), Some(NoticeLevel::Info));
    assert_eq!(NoticeLevel::parse("error"), Some(NoticeLevel::Error));
    assert_eq!(NoticeLevel::parse("warning"), None);
    assert!(Notice::error("boom").is_error());
    assert!(!Notice::info("saved").is_error());
}

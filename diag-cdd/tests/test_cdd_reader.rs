use std::io::Write;

use diag_cdd::{read_cdd_file, CddParseError, CddReadError};

const EXAMPLE: &str = include_str!("../../test-fixtures/cdd/example.cdd");

#[test]
fn test_read_cdd_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(EXAMPLE.as_bytes()).unwrap();

    let parsed = read_cdd_file(file.path()).unwrap();
    assert_eq!(parsed.database.dids.len(), 3);
    assert_eq!(parsed.diagnostics.len(), 2);
}

#[test]
fn test_read_cdd_file_with_bom() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\xEF\xBB\xBF").unwrap();
    file.write_all(EXAMPLE.as_bytes()).unwrap();

    let parsed = read_cdd_file(file.path()).unwrap();
    assert!(parsed.database.get_did_by_identifier(0xF190).is_some());
}

#[test]
fn test_read_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_cdd_file(&dir.path().join("absent.cdd")).unwrap_err();
    assert!(matches!(err, CddReadError::Io(_)));
}

#[test]
fn test_read_error_names_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"<CANDELA></CANDELA>").unwrap();

    let err = read_cdd_file(file.path()).unwrap_err();
    match &err {
        CddReadError::CddParse { file: name, source } => {
            assert_eq!(name, &file.path().display().to_string());
            assert!(matches!(source, CddParseError::MissingElement(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Missing required element: ECUDOC"));
}

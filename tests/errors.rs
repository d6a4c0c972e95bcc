//! Error taxonomy tests
//!
//! Every failure carries the grammar rule that failed and the byte offset
//! of the offending token, and parsing never yields a partial tree.

use eql::{parse, Error};

#[test]
fn unknown_statement_head() {
    let err = parse("INSERT INTO Entity").unwrap_err();
    assert_eq!(
        err,
        Error::NoViableAlternative {
            rule: "statement",
            found: "INSERT".into(),
            pos: 0,
        }
    );
}

#[test]
fn missing_select_item() {
    let err = parse("SELECT FROM Entity e").unwrap_err();
    assert_eq!(
        err,
        Error::NoViableAlternative {
            rule: "expression",
            found: "FROM".into(),
            pos: 7,
        }
    );
}

#[test]
fn missing_from_keyword() {
    let err = parse("SELECT e Entity e").unwrap_err();
    assert!(matches!(
        err,
        Error::TokenMismatch {
            rule: "select statement",
            ..
        }
    ));
    assert_eq!(err.pos(), 9);
}

#[test]
fn unbalanced_parenthesis() {
    let err = parse("SELECT e FROM Entity e WHERE (e.a + e.b > 1").unwrap_err();
    assert!(matches!(err, Error::TokenMismatch { .. }));
}

#[test]
fn empty_set_clause() {
    let err = parse("UPDATE Entity e SET WHERE e.id = 1").unwrap_err();
    assert_eq!(
        err,
        Error::EarlyTermination {
            rule: "update clause",
            expected: "update item",
            pos: 20,
        }
    );
}

#[test]
fn empty_group_by() {
    let err = parse("SELECT e FROM Entity e GROUP BY HAVING COUNT(e) > 1").unwrap_err();
    assert!(matches!(
        err,
        Error::EarlyTermination {
            rule: "group by clause",
            ..
        }
    ));
}

#[test]
fn lexical_error_reports_the_character() {
    let err = parse("SELECT e FROM Entity e WHERE e.id = #7").unwrap_err();
    assert_eq!(err, Error::UnexpectedCharacter('#', 36));
    assert_eq!(err.rule(), None);
}

#[test]
fn unterminated_string_points_at_the_opening_quote() {
    let err = parse("SELECT e FROM Entity e WHERE e.name = 'oops").unwrap_err();
    assert_eq!(err, Error::UnexpectedCharacter('\'', 38));
}

#[test]
fn error_messages_name_rule_and_offset() {
    let err = parse("SELECT FROM Entity e").unwrap_err();
    assert_eq!(
        err.to_string(),
        "expression: no viable alternative at FROM (offset 7)"
    );
}

#[test]
fn incomplete_condition_fails_at_end_of_input() {
    let err = parse("SELECT e FROM Entity e WHERE e.id =").unwrap_err();
    assert_eq!(err.pos(), 35);
}

#[test]
fn garbage_after_statement() {
    let err = parse("DELETE FROM Entity e e.id").unwrap_err();
    assert!(matches!(err, Error::TokenMismatch { rule: "statement", .. }));
}

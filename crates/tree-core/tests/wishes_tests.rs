// Host-side tests for wish validation, ordering and the wire format.

use chrono::{TimeZone, Utc};
use tree_core::{SceneError, Wish, WishBook, WishDraft};

fn wish(id: i64, secs: i64) -> Wish {
    Wish {
        id,
        name: format!("n{id}"),
        message: "hello".into(),
        created_at: Utc.timestamp_opt(secs, 0).unwrap(),
    }
}

#[test]
fn blank_fields_are_rejected() {
    assert_eq!(
        WishDraft::new("   ", "hi"),
        Err(SceneError::EmptyField { field: "name" })
    );
    assert_eq!(
        WishDraft::new("Ann", "\n"),
        Err(SceneError::EmptyField { field: "message" })
    );
}

#[test]
fn long_fields_are_rejected() {
    assert_eq!(
        WishDraft::new(&"a".repeat(21), "hi"),
        Err(SceneError::FieldTooLong {
            field: "name",
            len: 21,
            max: 20
        })
    );
    assert!(WishDraft::new("Ann", &"m".repeat(100)).is_ok());
    assert!(WishDraft::new("Ann", &"m".repeat(101)).is_err());
}

#[test]
fn synthetic_wish_uses_submit_time() {
    let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    let w = WishDraft::new("Ann", "hi").unwrap().into_synthetic(now);
    assert_eq!(w.id, 1_700_000_000_123);
    assert_eq!(w.created_at, now);
}

#[test]
fn recent_is_newest_first_and_limited() {
    let mut book = WishBook::new();
    book.extend((0..30).map(|i| wish(i, 1_000 + i)));
    let recent = book.recent(20);
    assert_eq!(recent.len(), 20);
    assert_eq!(recent[0].id, 29);
    assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert_eq!(book.orbiting().len(), 10);
}

#[test]
fn duplicate_ids_replace() {
    let mut book = WishBook::new();
    book.add(wish(1, 10));
    book.add(wish(1, 20));
    assert_eq!(book.len(), 1);
}

#[test]
fn parses_service_rows() {
    let body = r#"[{"id":7,"name":"Ann","message":"Merry","created_at":"2024-12-24T18:30:00.123456+00:00"}]"#;
    let rows: Vec<Wish> = serde_json::from_str(body).unwrap();
    assert_eq!(rows[0].id, 7);
    assert_eq!(rows[0].name, "Ann");
    let draft = serde_json::to_string(&WishDraft::new("Ann", "Merry").unwrap()).unwrap();
    assert_eq!(draft, r#"{"name":"Ann","message":"Merry"}"#);
}

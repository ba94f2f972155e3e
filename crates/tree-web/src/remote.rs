//! Request shapes for the hosted wishes table (PostgREST style API).

use crate::config::WishEndpoint;
use tree_core::constants::WISH_LIST_LIMIT;
use tree_core::{Wish, WishDraft};

const TABLE: &str = "wishes";

impl WishEndpoint {
    pub fn insert_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base)
    }

    pub fn list_url(&self) -> String {
        format!(
            "{}/rest/v1/{TABLE}?select=*&order=created_at.desc&limit={WISH_LIST_LIMIT}",
            self.base
        )
    }

    pub fn headers(&self, with_body: bool) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("apikey", self.key.clone()),
            ("Authorization", format!("Bearer {}", self.key)),
        ];
        if with_body {
            headers.push(("Content-Type", "application/json".to_owned()));
            headers.push(("Prefer", "return=representation".to_owned()));
        }
        headers
    }
}

/// Insert body: a one-row array.
pub fn insert_body(draft: &WishDraft) -> serde_json::Result<String> {
    serde_json::to_string(&[draft])
}

/// Rows returned by an insert or a list query.
pub fn parse_rows(body: &str) -> serde_json::Result<Vec<Wish>> {
    serde_json::from_str(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> WishEndpoint {
        WishEndpoint {
            base: "https://db.example".into(),
            key: "anon".into(),
        }
    }

    #[test]
    fn urls_and_headers() {
        let ep = endpoint();
        assert_eq!(ep.insert_url(), "https://db.example/rest/v1/wishes");
        assert!(ep.list_url().ends_with("limit=20"));
        assert_eq!(ep.headers(false).len(), 2);
        assert!(ep
            .headers(true)
            .contains(&("Prefer", "return=representation".to_owned())));
    }

    #[test]
    fn body_is_a_single_row_array() {
        let draft = WishDraft::new("Ann", "Merry").unwrap();
        assert_eq!(
            insert_body(&draft).unwrap(),
            r#"[{"name":"Ann","message":"Merry"}]"#
        );
    }

    #[test]
    fn rows_with_offset_timestamps() {
        let rows = parse_rows(
            r#"[{"id":7,"name":"Ann","message":"Merry","created_at":"2025-12-24T18:00:00.123456+00:00"}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 7);
    }
}

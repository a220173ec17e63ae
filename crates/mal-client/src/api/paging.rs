//! Paging cursors and page navigation.
//!
//! List endpoints return `{"data": [...], "paging": {"previous": .., "next": ..}}`.
//! A [`Page`] keeps the decoded body together with a borrow of the client so the
//! adjacent pages can be requested with [`Page::next`] and [`Page::prev`].

use super::client::{MalClient, Params};
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::Deref;
use url::Url;

/// Continuation URLs of a list response. An empty URL means the page does not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub previous: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub next: String,
}

/// `null` cursors mean the same as missing ones
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Paging {
    /// URL for the given direction, `None` when empty
    pub fn url(&self, direction: Direction) -> Option<&str> {
        let url = match direction {
            Direction::Next => &self.next,
            Direction::Prev => &self.previous,
        };
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }
}

/// Which continuation URL to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// `limit` and `offset` query parameters accepted by almost every list endpoint.
///
/// The API's default and maximum limit is usually 100, but check each endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageOptions {
    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Append the non-zero options to `params`
    pub(crate) fn apply(&self, params: &mut Params) {
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset.filter(|o| *o > 0) {
            params.push(("offset", offset.to_string()));
        }
    }
}

/// A response body that carries a paging cursor.
pub trait Paginated: DeserializeOwned {
    fn paging(&self) -> &Paging;
}

/// Generic list envelope: `{"data": [T], "paging": {..}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeList<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Paging,
}

impl<T: DeserializeOwned> Paginated for NodeList<T> {
    fn paging(&self) -> &Paging {
        &self.paging
    }
}

/// A decoded page plus the client needed to fetch its neighbours.
#[derive(Debug)]
pub struct Page<'c, T> {
    body: T,
    client: &'c MalClient,
}

impl<'c, T: Paginated> Page<'c, T> {
    pub(crate) fn new(client: &'c MalClient, body: T) -> Self {
        Self { body, client }
    }

    /// Fetch the next page. `limit` overrides the page size carried by the cursor.
    pub async fn next(&self, limit: Option<u32>) -> Result<Page<'c, T>> {
        self.follow(Direction::Next, limit).await
    }

    /// Fetch the previous page. `limit` overrides the page size carried by the cursor.
    pub async fn prev(&self, limit: Option<u32>) -> Result<Page<'c, T>> {
        self.follow(Direction::Prev, limit).await
    }

    async fn follow(&self, direction: Direction, limit: Option<u32>) -> Result<Page<'c, T>> {
        let client = self.client;
        let body = client
            .follow_page(self.body.paging(), direction, limit)
            .await?;
        Ok(Page::new(client, body))
    }

    pub fn has_next(&self) -> bool {
        self.body.paging().url(Direction::Next).is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.body.paging().url(Direction::Prev).is_some()
    }

    /// Drop the client borrow and keep the body
    pub fn into_inner(self) -> T {
        self.body
    }
}

impl<T> Deref for Page<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.body
    }
}

/// Replace (or append) the `limit` query parameter, keeping the other
/// parameters in their original order.
pub(crate) fn rewrite_limit(page_url: &str, limit: u32) -> Result<String> {
    let mut url = Url::parse(page_url)?;
    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == "limit" {
                replaced = true;
                (k.into_owned(), limit.to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    if !replaced {
        pairs.push(("limit".to_string(), limit.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_missing_keys() {
        let paging: Paging = serde_json::from_str(r#"{"next":"https://a/b?offset=3"}"#).unwrap();
        assert_eq!(paging.url(Direction::Prev), None);
        assert_eq!(paging.url(Direction::Next), Some("https://a/b?offset=3"));

        let list: NodeList<u32> = serde_json::from_str(r#"{"data":[1,2]}"#).unwrap();
        assert_eq!(list.data, vec![1, 2]);
        assert_eq!(list.paging, Paging::default());

        let list: NodeList<u32> =
            serde_json::from_str(r#"{"data":[1],"paging":{"previous":null,"next":"https://x/y?offset=1"}}"#).unwrap();
        assert_eq!(list.paging.url(Direction::Prev), None);
        assert_eq!(list.paging.url(Direction::Next), Some("https://x/y?offset=1"));
    }

    #[test]
    fn test_rewrite_limit_in_place() {
        let url = rewrite_limit("https://api.example/x?offset=6&limit=3", 5).unwrap();
        assert_eq!(url, "https://api.example/x?offset=6&limit=5");
    }

    #[test]
    fn test_rewrite_limit_appends() {
        let url = rewrite_limit("https://api.example/x?offset=6&q=piece", 10).unwrap();
        assert_eq!(url, "https://api.example/x?offset=6&q=piece&limit=10");
    }

    #[test]
    fn test_rewrite_limit_rejects_garbage() {
        assert!(rewrite_limit("not a url", 5).is_err());
    }

    #[test]
    fn test_page_options() {
        let mut params = Vec::new();
        PageOptions::default().apply(&mut params);
        assert!(params.is_empty());

        PageOptions::limit(10).with_offset(20).apply(&mut params);
        assert_eq!(
            params,
            vec![("limit", "10".to_string()), ("offset", "20".to_string())]
        );

        let mut params = Vec::new();
        PageOptions { limit: Some(0), offset: Some(0) }.apply(&mut params);
        assert!(params.is_empty());
    }
}

//! Client library for the MyAnimeList API v2.
//!
//! Covers the OAuth2 authorization-code flow with PKCE, anime and manga
//! lookups, the user's lists, and the forum.

pub mod api;
pub mod error;

pub use api::options;
pub use api::types;
pub use api::{
    AnimeListUpdate, ClientConfig, CodeChallengeMethod, Credentials, Direction, ForumSearch, MalClient,
    MangaListUpdate, NodeList, Page, PageOptions, Paginated, Paging,
};
pub use error::{ApiError, MalError, Result};

//! MyAnimeList API v2 client.
//!
//! [`MalClient`] owns the HTTP connection and the OAuth2 state. Resource
//! methods live in the submodules next to the endpoints they wrap; list
//! results come back as a [`Page`] that can walk to its neighbours.

pub mod anime;
pub mod auth;
pub mod client;
pub mod forum;
pub mod list;
pub mod manga;
pub mod options;
pub mod paging;
pub mod pkce;
pub mod types;
pub mod user;

pub use auth::Credentials;
pub use client::{ClientConfig, MalClient, API_ENDPOINT, AUTHORIZE_ENDPOINT, DEFAULT_TIMEOUT, TOKEN_ENDPOINT};
pub use forum::ForumSearch;
pub use list::{AnimeListUpdate, MangaListUpdate};
pub use paging::{Direction, NodeList, Page, PageOptions, Paginated, Paging};
pub use pkce::{CodeChallengeMethod, PkceChallenge};

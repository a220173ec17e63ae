//! The user's anime and manga lists: listing, updating and removing entries.

use super::client::{MalClient, Params};
use super::options::{ListKind, ListSort, Priority, ReadStatus, RepeatValue, Score, WatchStatus};
use super::paging::{NodeList, Page, PageOptions};
use super::types::{AnimeListEntry, AnimeListStatus, MangaListEntry, MangaListStatus};
use crate::error::Result;
use reqwest::{Method, StatusCode};
use tracing::info;

/// Changes to apply to an anime list entry. Unset fields are left as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimeListUpdate {
    anime_id: u64,
    status: Option<WatchStatus>,
    is_rewatching: Option<bool>,
    score: Option<Score>,
    num_watched_episodes: Option<u32>,
    priority: Option<Priority>,
    num_times_rewatched: Option<u32>,
    rewatch_value: Option<RepeatValue>,
    tags: Option<Vec<String>>,
    comments: Option<String>,
}

impl AnimeListUpdate {
    pub fn new(anime_id: u64) -> Self {
        Self {
            anime_id,
            status: None,
            is_rewatching: None,
            score: None,
            num_watched_episodes: None,
            priority: None,
            num_times_rewatched: None,
            rewatch_value: None,
            tags: None,
            comments: None,
        }
    }

    pub fn anime_id(&self) -> u64 {
        self.anime_id
    }

    pub fn status(mut self, status: WatchStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn rewatching(mut self, is_rewatching: bool) -> Self {
        self.is_rewatching = Some(is_rewatching);
        self
    }

    pub fn score(mut self, score: Score) -> Self {
        self.score = Some(score);
        self
    }

    pub fn watched_episodes(mut self, count: u32) -> Self {
        self.num_watched_episodes = Some(count);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn rewatched_times(mut self, count: u32) -> Self {
        self.num_times_rewatched = Some(count);
        self
    }

    pub fn rewatch_value(mut self, value: RepeatValue) -> Self {
        self.rewatch_value = Some(value);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn comments(mut self, text: impl Into<String>) -> Self {
        self.comments = Some(text.into());
        self
    }

    fn to_params(&self) -> Params {
        let mut params = Params::new();
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(b) = self.is_rewatching {
            params.push(("is_rewatching", b.to_string()));
        }
        if let Some(score) = self.score {
            params.push(("score", score.get().to_string()));
        }
        if let Some(n) = self.num_watched_episodes {
            params.push(("num_watched_episodes", n.to_string()));
        }
        if let Some(priority) = self.priority {
            params.push(("priority", priority.as_u8().to_string()));
        }
        if let Some(n) = self.num_times_rewatched {
            params.push(("num_times_rewatched", n.to_string()));
        }
        if let Some(value) = self.rewatch_value {
            params.push(("rewatch_value", value.get().to_string()));
        }
        if let Some(tags) = &self.tags {
            params.push(("tags", tags.join(", ")));
        }
        if let Some(comments) = &self.comments {
            params.push(("comments", comments.clone()));
        }
        params
    }
}

/// Changes to apply to a manga list entry. Unset fields are left as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MangaListUpdate {
    manga_id: u64,
    status: Option<ReadStatus>,
    is_rereading: Option<bool>,
    score: Option<Score>,
    num_volumes_read: Option<u32>,
    num_chapters_read: Option<u32>,
    priority: Option<Priority>,
    num_times_reread: Option<u32>,
    reread_value: Option<RepeatValue>,
    tags: Option<Vec<String>>,
    comments: Option<String>,
}

impl MangaListUpdate {
    pub fn new(manga_id: u64) -> Self {
        Self {
            manga_id,
            status: None,
            is_rereading: None,
            score: None,
            num_volumes_read: None,
            num_chapters_read: None,
            priority: None,
            num_times_reread: None,
            reread_value: None,
            tags: None,
            comments: None,
        }
    }

    pub fn manga_id(&self) -> u64 {
        self.manga_id
    }

    pub fn status(mut self, status: ReadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn rereading(mut self, is_rereading: bool) -> Self {
        self.is_rereading = Some(is_rereading);
        self
    }

    pub fn score(mut self, score: Score) -> Self {
        self.score = Some(score);
        self
    }

    pub fn volumes_read(mut self, count: u32) -> Self {
        self.num_volumes_read = Some(count);
        self
    }

    pub fn chapters_read(mut self, count: u32) -> Self {
        self.num_chapters_read = Some(count);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn reread_times(mut self, count: u32) -> Self {
        self.num_times_reread = Some(count);
        self
    }

    pub fn reread_value(mut self, value: RepeatValue) -> Self {
        self.reread_value = Some(value);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn comments(mut self, text: impl Into<String>) -> Self {
        self.comments = Some(text.into());
        self
    }

    fn to_params(&self) -> Params {
        let mut params = Params::new();
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(b) = self.is_rereading {
            params.push(("is_rereading", b.to_string()));
        }
        if let Some(score) = self.score {
            params.push(("score", score.get().to_string()));
        }
        if let Some(n) = self.num_volumes_read {
            params.push(("num_volumes_read", n.to_string()));
        }
        if let Some(n) = self.num_chapters_read {
            params.push(("num_chapters_read", n.to_string()));
        }
        if let Some(priority) = self.priority {
            params.push(("priority", priority.as_u8().to_string()));
        }
        if let Some(n) = self.num_times_reread {
            params.push(("num_times_reread", n.to_string()));
        }
        if let Some(value) = self.reread_value {
            params.push(("reread_value", value.get().to_string()));
        }
        if let Some(tags) = &self.tags {
            params.push(("tags", tags.join(", ")));
        }
        if let Some(comments) = &self.comments {
            params.push(("comments", comments.clone()));
        }
        params
    }
}

/// `@me` stands for the authorized user
fn list_owner(username: Option<&str>) -> &str {
    username.filter(|u| !u.is_empty()).unwrap_or("@me")
}

impl MalClient {
    /// Anime list of `username`, or of the authorized user when `None`
    pub async fn user_anime_list(
        &self,
        username: Option<&str>,
        status: Option<WatchStatus>,
        sort: Option<ListSort>,
        options: PageOptions,
    ) -> Result<Page<'_, NodeList<AnimeListEntry>>> {
        let mut params = Params::new();
        if let Some(status) = status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(sort) = sort {
            params.push(("sort", sort.for_list(ListKind::Anime)));
        }
        options.apply(&mut params);

        let path = format!("users/{}/animelist", list_owner(username));
        let body = self.execute(Method::GET, &path, &params).await?;
        Ok(Page::new(self, body))
    }

    /// Manga list of `username`, or of the authorized user when `None`
    pub async fn user_manga_list(
        &self,
        username: Option<&str>,
        status: Option<ReadStatus>,
        sort: Option<ListSort>,
        options: PageOptions,
    ) -> Result<Page<'_, NodeList<MangaListEntry>>> {
        let mut params = Params::new();
        if let Some(status) = status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(sort) = sort {
            params.push(("sort", sort.for_list(ListKind::Manga)));
        }
        options.apply(&mut params);

        let path = format!("users/{}/mangalist", list_owner(username));
        let body = self.execute(Method::GET, &path, &params).await?;
        Ok(Page::new(self, body))
    }

    /// Apply `update` to the authorized user's anime list, adding the entry if needed
    pub async fn update_anime_list(&self, update: &AnimeListUpdate) -> Result<AnimeListStatus> {
        let path = format!("anime/{}/my_list_status", update.anime_id);
        let status: AnimeListStatus = self.execute(Method::PATCH, &path, &update.to_params()).await?;
        info!(anime_id = update.anime_id, status = %status.status, "Anime list entry updated");
        Ok(status)
    }

    /// Apply `update` to the authorized user's manga list, adding the entry if needed
    pub async fn update_manga_list(&self, update: &MangaListUpdate) -> Result<MangaListStatus> {
        let path = format!("manga/{}/my_list_status", update.manga_id);
        let status: MangaListStatus = self.execute(Method::PATCH, &path, &update.to_params()).await?;
        info!(manga_id = update.manga_id, status = %status.status, "Manga list entry updated");
        Ok(status)
    }

    /// Remove an anime from the authorized user's list. Removing an entry that
    /// is not on the list succeeds.
    pub async fn delete_anime_from_list(&self, anime_id: u64) -> Result<()> {
        let path = format!("anime/{}/my_list_status", anime_id);
        self.execute_empty(Method::DELETE, &path, &[StatusCode::OK, StatusCode::NOT_FOUND])
            .await?;
        Ok(())
    }

    /// Remove a manga from the authorized user's list. Removing an entry that
    /// is not on the list succeeds.
    pub async fn delete_manga_from_list(&self, manga_id: u64) -> Result<()> {
        let path = format!("manga/{}/my_list_status", manga_id);
        self.execute_empty(Method::DELETE, &path, &[StatusCode::OK, StatusCode::NOT_FOUND])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientConfig;
    use crate::error::MalError;
    use wiremock::matchers::{body_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> MalClient {
        let mut client = MalClient::new(
            ClientConfig::new("id", "secret", "/").with_api_base(format!("{}/v2/", server.uri())),
        )
        .unwrap();
        client.set_credentials("access", "refresh", None);
        client
    }

    #[test]
    fn test_anime_update_params() {
        let update = AnimeListUpdate::new(5114)
            .status(WatchStatus::Completed)
            .score(Score::new(10).unwrap())
            .tags(["some", "random", "tags"])
            .watched_episodes(64)
            .priority(Priority::High)
            .rewatch_value(RepeatValue::new(3).unwrap())
            .comments("comment");

        assert_eq!(
            update.to_params(),
            vec![
                ("status", "completed".to_string()),
                ("score", "10".to_string()),
                ("num_watched_episodes", "64".to_string()),
                ("priority", "2".to_string()),
                ("rewatch_value", "3".to_string()),
                ("tags", "some, random, tags".to_string()),
                ("comments", "comment".to_string()),
            ]
        );
        assert!(AnimeListUpdate::new(1).to_params().is_empty());
    }

    #[test]
    fn test_manga_update_params() {
        let update = MangaListUpdate::new(2)
            .status(ReadStatus::Reading)
            .rereading(false)
            .volumes_read(3)
            .chapters_read(40)
            .reread_times(1)
            .reread_value(RepeatValue::new(0).unwrap());

        assert_eq!(
            update.to_params(),
            vec![
                ("status", "reading".to_string()),
                ("is_rereading", "false".to_string()),
                ("num_volumes_read", "3".to_string()),
                ("num_chapters_read", "40".to_string()),
                ("num_times_reread", "1".to_string()),
                ("reread_value", "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_owner() {
        assert_eq!(list_owner(None), "@me");
        assert_eq!(list_owner(Some("")), "@me");
        assert_eq!(list_owner(Some("Xinil")), "Xinil");
    }

    #[tokio::test]
    async fn test_user_anime_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/users/@me/animelist"))
            .and(query_param("status", "watching"))
            .and(query_param("sort", "anime_title"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":[{"node":{"id":5114,"title":"FMA:B"},
                   "list_status":{"status":"watching","score":9,"num_episodes_watched":12,"is_rewatching":false}}],
                   "paging":{}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let list = client
            .user_anime_list(None, Some(WatchStatus::Watching), Some(ListSort::Title), PageOptions::limit(10))
            .await
            .unwrap();
        assert_eq!(list.data[0].list_status.num_episodes_watched, 12);
        assert!(!list.has_next());
    }

    #[tokio::test]
    async fn test_user_manga_list_other_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/users/Xinil/mangalist"))
            .and(query_param("sort", "list_score"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":[{"node":{"id":2,"title":"Berserk"},"list_status":{"status":"reading","num_chapters_read":40}}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let list = client
            .user_manga_list(Some("Xinil"), None, Some(ListSort::Score), PageOptions::default())
            .await
            .unwrap();
        assert_eq!(list.data[0].list_status.num_chapters_read, 40);
    }

    #[tokio::test]
    async fn test_update_anime_list() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v2/anime/5114/my_list_status"))
            .and(body_string("status=completed&score=10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"status":"completed","score":10,"num_episodes_watched":64,"is_rewatching":false,
                   "updated_at":"2021-01-01T10:00:00+00:00","priority":0,"num_times_rewatched":0,
                   "rewatch_value":0,"tags":[],"comments":""}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let update = AnimeListUpdate::new(5114)
            .status(WatchStatus::Completed)
            .score(Score::new(10).unwrap());
        let status = client.update_anime_list(&update).await.unwrap();
        assert_eq!(status.status, "completed");
        assert_eq!(status.num_episodes_watched, 64);
    }

    #[tokio::test]
    async fn test_update_manga_list() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v2/manga/2/my_list_status"))
            .and(body_string("num_chapters_read=41"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"reading","num_chapters_read":41}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let status = client
            .update_manga_list(&MangaListUpdate::new(2).chapters_read(41))
            .await
            .unwrap();
        assert_eq!(status.num_chapters_read, 41);
    }

    #[tokio::test]
    async fn test_delete_accepts_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v2/anime/5114/my_list_status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v2/manga/2/my_list_status"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"error":"not_found"}"#))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v2/anime/1/my_list_status"))
            .respond_with(
                ResponseTemplate::new(403).set_body_string(r#"{"error":"forbidden","message":"not allowed"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.delete_anime_from_list(5114).await.unwrap();
        client.delete_manga_from_list(2).await.unwrap();

        let err = client.delete_anime_from_list(1).await.unwrap_err();
        assert!(matches!(err, MalError::Api(ref api) if api.status == 403 && api.error == "forbidden"));
    }
}

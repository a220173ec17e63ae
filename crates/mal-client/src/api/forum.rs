//! Forum endpoints: boards, topics and topic search.

use super::client::{MalClient, Params};
use super::paging::{NodeList, Page, PageOptions};
use super::types::{ForumCategories, ForumSearchEntry, ForumTopic};
use crate::error::Result;
use reqwest::Method;

/// Advanced forum search. Every criterion is optional; empty ones are not sent.
#[derive(Debug, Clone, Default)]
pub struct ForumSearch {
    pub keyword: Option<String>,
    pub board_id: Option<u64>,
    pub subboard_id: Option<u64>,
    /// Username of the topic starter
    pub topic_user_name: Option<String>,
    /// Username of any post author
    pub user_name: Option<String>,
}

impl ForumSearch {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Default::default()
        }
    }

    fn apply(&self, params: &mut Params) {
        let non_empty = |s: &Option<String>| s.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(q) = non_empty(&self.keyword) {
            params.push(("q", q));
        }
        if let Some(id) = self.board_id.filter(|id| *id != 0) {
            params.push(("board_id", id.to_string()));
        }
        if let Some(id) = self.subboard_id.filter(|id| *id != 0) {
            params.push(("subboard_id", id.to_string()));
        }
        if let Some(name) = non_empty(&self.topic_user_name) {
            params.push(("topic_user_name", name));
        }
        if let Some(name) = non_empty(&self.user_name) {
            params.push(("user_name", name));
        }
        // "recent" is the only sort the API supports
        params.push(("sort", "recent".to_string()));
    }
}

impl MalClient {
    /// All forum categories with their boards
    pub async fn forum_boards(&self) -> Result<ForumCategories> {
        self.execute(Method::GET, "forum/boards", &[]).await
    }

    /// Posts of one topic
    pub async fn forum_topic(&self, topic_id: u64, options: PageOptions) -> Result<Page<'_, ForumTopic>> {
        let mut params = Params::new();
        options.apply(&mut params);

        let body = self
            .execute(Method::GET, &format!("forum/topic/{}", topic_id), &params)
            .await?;
        Ok(Page::new(self, body))
    }

    /// Search forum topics
    pub async fn forum_search_topics(
        &self,
        search: &ForumSearch,
        options: PageOptions,
    ) -> Result<Page<'_, NodeList<ForumSearchEntry>>> {
        let mut params = Params::new();
        search.apply(&mut params);
        options.apply(&mut params);

        let body = self.execute(Method::GET, "forum/topics", &params).await?;
        Ok(Page::new(self, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> MalClient {
        MalClient::new(ClientConfig::new("id", "secret", "/").with_api_base(format!("{}/v2/", server.uri())))
            .unwrap()
    }

    #[test]
    fn test_search_params_skip_empty() {
        let search = ForumSearch {
            keyword: Some(String::new()),
            board_id: Some(0),
            subboard_id: Some(2),
            topic_user_name: None,
            user_name: Some("Xinil".to_string()),
        };
        let mut params = Params::new();
        search.apply(&mut params);
        assert_eq!(
            params,
            vec![
                ("subboard_id", "2".to_string()),
                ("user_name", "Xinil".to_string()),
                ("sort", "recent".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_boards() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/forum/boards"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"categories":[{"title":"MyAnimeList","boards":[{"id":17,"title":"MAL Guidelines & FAQ",
                   "description":"Site rules","subboards":[]}]}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let boards = client.forum_boards().await.unwrap();
        assert_eq!(boards.categories[0].boards[0].id, 17);
    }

    #[tokio::test]
    async fn test_topic_paging() {
        let server = MockServer::start().await;
        let next = format!("{}/v2/forum/topic/481?offset=1&limit=1", server.uri());
        Mock::given(method("GET"))
            .and(path("/v2/forum/topic/481"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"data":{{"title":"Welcome","posts":[{{"id":1,"number":1,"body":"hi",
                   "created_by":{{"id":1,"name":"Xinil","forum_avator":""}}}}],"poll":null}},
                   "paging":{{"next":"{}"}}}}"#,
                next
            )))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let topic = client.forum_topic(481, PageOptions::limit(1)).await.unwrap();
        assert_eq!(topic.data.title, "Welcome");
        assert!(topic.data.poll.is_none());

        let next_page = topic.next(None).await.unwrap();
        assert_eq!(next_page.data.posts[0].created_by.name, "Xinil");
    }

    #[tokio::test]
    async fn test_search_topics() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/forum/topics"))
            .and(query_param("q", "rewrite"))
            .and(query_param("sort", "recent"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":[{"id":9,"title":"rewrite","number_of_posts":3,"is_locked":false,
                   "created_by":{"id":1,"name":"a"},"last_post_created_by":{"id":2,"name":"b"}}],"paging":{}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = client
            .forum_search_topics(&ForumSearch::keyword("rewrite"), PageOptions::default())
            .await
            .unwrap();
        assert_eq!(result.data[0].number_of_posts, 3);
        assert_eq!(result.data[0].last_post_created_by.name, "b");
    }
}

//! Manga endpoints: search, details and ranking.

use super::client::{MalClient, Params};
use super::options::{fields_param, Field, MangaRanking};
use super::paging::{NodeList, Page, PageOptions};
use super::types::{MangaDetails, NodeEntry, RankedEntry};
use crate::error::Result;
use reqwest::Method;
use tracing::debug;

impl MalClient {
    /// Search manga by title
    pub async fn manga_search(&self, query: &str, options: PageOptions) -> Result<Page<'_, NodeList<NodeEntry>>> {
        debug!(query = query, "Searching manga");
        let mut params: Params = vec![("q", query.to_string())];
        options.apply(&mut params);

        let body = self.execute(Method::GET, "manga", &params).await?;
        Ok(Page::new(self, body))
    }

    /// Fetch details of one manga. Pass [`Field::MANGA`] for every field.
    pub async fn manga_details(&self, manga_id: u64, fields: &[Field]) -> Result<MangaDetails> {
        let mut params = Params::new();
        if let Some(fields) = fields_param(fields, Field::MANGA, "manga")? {
            params.push(("fields", fields));
        }

        self.execute(Method::GET, &format!("manga/{}", manga_id), &params).await
    }

    /// Top manga for the given ranking type
    pub async fn manga_ranking(
        &self,
        ranking: MangaRanking,
        options: PageOptions,
    ) -> Result<Page<'_, NodeList<RankedEntry>>> {
        let mut params: Params = vec![("ranking_type", ranking.as_str().to_string())];
        options.apply(&mut params);

        let body = self.execute(Method::GET, "manga/ranking", &params).await?;
        Ok(Page::new(self, body))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::client::{ClientConfig, MalClient};
    use crate::api::options::{Field, MangaRanking};
    use crate::api::paging::PageOptions;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> MalClient {
        MalClient::new(ClientConfig::new("id", "secret", "/").with_api_base(format!("{}/v2/", server.uri())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_manga_details_all_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/manga/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id":2,"title":"Berserk","num_volumes":0,
                    "authors":[{"node":{"id":1868,"first_name":"Kentarou","last_name":"Miura"},"role":"Story & Art"}],
                    "serialization":[{"node":{"id":2,"name":"Young Animal"}}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let manga = client.manga_details(2, Field::MANGA).await.unwrap();
        assert_eq!(manga.authors[0].node.last_name, "Miura");
        assert_eq!(manga.serialization[0].node.name, "Young Animal");

        let requests = server.received_requests().await.unwrap();
        let fields = requests[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "fields")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(fields.contains("authors{first_name,last_name}"));
        assert!(!fields.contains("num_episodes"));
    }

    #[tokio::test]
    async fn test_manga_search_and_ranking() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/manga"))
            .and(query_param("q", "berserk"))
            .and(query_param("offset", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[{"node":{"id":2,"title":"Berserk"}}]}"#))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/manga/ranking"))
            .and(query_param("ranking_type", "manhwa"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":[],"paging":{}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let found = client
            .manga_search("berserk", PageOptions::default().with_offset(10))
            .await
            .unwrap();
        assert_eq!(found.data[0].node.id, 2);

        let ranking = client
            .manga_ranking(MangaRanking::Manhwa, PageOptions::default())
            .await
            .unwrap();
        assert!(ranking.data.is_empty());
    }
}

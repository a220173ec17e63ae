//! Current user information.

use super::client::MalClient;
use super::types::UserInformation;
use crate::error::Result;
use reqwest::Method;

impl MalClient {
    /// Profile and anime statistics of the authorized user. The API only
    /// exposes `@me`.
    pub async fn user_information(&self) -> Result<UserInformation> {
        let params = vec![("fields", "anime_statistics".to_string())];
        self.execute(Method::GET, "users/@me", &params).await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::client::{ClientConfig, MalClient};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_user_information() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/users/@me"))
            .and(query_param("fields", "anime_statistics"))
            .and(header("authorization", "Bearer access"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id":1,"name":"someone","joined_at":"2020-01-01T00:00:00+00:00",
                   "anime_statistics":{"num_items_watching":2,"num_days":12.5,"mean_score":7.9}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let mut client =
            MalClient::new(ClientConfig::new("id", "secret", "/").with_api_base(format!("{}/v2/", server.uri())))
                .unwrap();
        client.set_credentials("access", "refresh", None);

        let user = client.user_information().await.unwrap();
        assert_eq!(user.name, "someone");
        assert!(user.joined_at.is_some());
        let stats = user.anime_statistics.unwrap();
        assert_eq!(stats.num_items_watching, 2);
        assert_eq!(stats.num_days, 12.5);
    }
}

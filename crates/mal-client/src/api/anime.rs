//! Anime endpoints: search, details, ranking, seasonal and suggestions.

use super::client::{MalClient, Params};
use super::options::{fields_param, AnimeRanking, Field, Season, SeasonalSort};
use super::paging::{NodeList, Page, PageOptions};
use super::types::{AnimeDetails, NodeEntry, RankedEntry, SeasonalAnime};
use crate::error::{MalError, Result};
use reqwest::Method;
use tracing::debug;

impl MalClient {
    /// Search anime by title
    pub async fn anime_search(&self, query: &str, options: PageOptions) -> Result<Page<'_, NodeList<NodeEntry>>> {
        debug!(query = query, "Searching anime");
        let mut params: Params = vec![("q", query.to_string())];
        options.apply(&mut params);

        let body = self.execute(Method::GET, "anime", &params).await?;
        Ok(Page::new(self, body))
    }

    /// Fetch details of one anime.
    ///
    /// Pass [`Field::ANIME`] for every field. With no fields the API still
    /// returns id, title and main picture.
    pub async fn anime_details(&self, anime_id: u64, fields: &[Field]) -> Result<AnimeDetails> {
        let mut params = Params::new();
        if let Some(fields) = fields_param(fields, Field::ANIME, "anime")? {
            params.push(("fields", fields));
        }

        self.execute(Method::GET, &format!("anime/{}", anime_id), &params).await
    }

    /// Top anime for the given ranking type
    pub async fn anime_ranking(
        &self,
        ranking: AnimeRanking,
        options: PageOptions,
    ) -> Result<Page<'_, NodeList<RankedEntry>>> {
        let mut params: Params = vec![("ranking_type", ranking.as_str().to_string())];
        options.apply(&mut params);

        let body = self.execute(Method::GET, "anime/ranking", &params).await?;
        Ok(Page::new(self, body))
    }

    /// Anime of one season of a year
    pub async fn seasonal_anime(
        &self,
        year: u16,
        season: Season,
        sort: Option<SeasonalSort>,
        options: PageOptions,
    ) -> Result<Page<'_, SeasonalAnime>> {
        if year == 0 {
            return Err(MalError::InvalidArgument("year must be positive".to_string()));
        }

        let mut params = Params::new();
        if let Some(sort) = sort {
            params.push(("sort", sort.as_str().to_string()));
        }
        options.apply(&mut params);

        let path = format!("anime/season/{}/{}", year, season.as_str());
        let body = self.execute(Method::GET, &path, &params).await?;
        Ok(Page::new(self, body))
    }

    /// Suggestions for the authorized user. Empty for new users.
    pub async fn suggested_anime(&self, options: PageOptions) -> Result<Page<'_, NodeList<NodeEntry>>> {
        let mut params = Params::new();
        options.apply(&mut params);

        let body = self.execute(Method::GET, "anime/suggestions", &params).await?;
        Ok(Page::new(self, body))
    }
}

//! MyAnimeList API v2 response types.
//!
//! Detail endpoints only return the fields that were requested, so most
//! structs default every missing field.

use super::paging::{Paginated, Paging};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Some counters arrive as JSON strings, others as numbers
fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

// ========== Shared building blocks ==========

/// Basic anime or manga entry: id, title and main picture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub id: u64,
    pub title: String,
    pub main_picture: Option<Picture>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Picture {
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// `{"node": {...}}` list item of search, seasonal and suggestion results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEntry {
    pub node: Node,
}

/// Ranking list item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub node: Node,
    pub ranking: RankPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankPosition {
    pub rank: u32,
    #[serde(default)]
    pub previous_rank: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlternativeTitles {
    pub synonyms: Vec<String>,
    pub en: String,
    pub ja: String,
}

/// Related anime or manga
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedNode {
    pub node: Node,
    #[serde(default)]
    pub relation_type: String,
    #[serde(default)]
    pub relation_type_formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub node: Node,
    #[serde(default)]
    pub num_recommendations: u32,
}

// ========== Anime ==========

/// Anime details. Only requested fields are filled in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeDetails {
    pub id: u64,
    pub title: String,
    pub main_picture: Option<Picture>,
    pub alternative_titles: AlternativeTitles,
    pub start_date: String,
    pub end_date: String,
    pub synopsis: String,
    pub mean: f64,
    pub rank: u32,
    pub popularity: u32,
    pub num_list_users: u64,
    pub num_scoring_users: u64,
    pub nsfw: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub media_type: String,
    pub status: String,
    pub genres: Vec<Genre>,
    pub my_list_status: Option<AnimeListStatus>,
    pub num_episodes: u32,
    pub start_season: Option<SeasonInfo>,
    pub broadcast: Option<Broadcast>,
    pub source: String,
    pub average_episode_duration: u32,
    pub rating: String,
    pub pictures: Vec<Picture>,
    pub background: String,
    pub related_anime: Vec<RelatedNode>,
    pub related_manga: Vec<RelatedNode>,
    pub recommendations: Vec<Recommendation>,
    pub studios: Vec<Studio>,
    pub statistics: Option<AnimeStatistics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonInfo {
    pub year: u16,
    pub season: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Broadcast {
    pub day_of_the_week: String,
    pub start_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Studio {
    pub id: u64,
    pub name: String,
}

/// Per-status user counts of an anime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeStatistics {
    pub status: StatusCounts,
    pub num_list_users: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCounts {
    #[serde(deserialize_with = "deserialize_count")]
    pub watching: u64,
    #[serde(deserialize_with = "deserialize_count")]
    pub completed: u64,
    #[serde(deserialize_with = "deserialize_count")]
    pub on_hold: u64,
    #[serde(deserialize_with = "deserialize_count")]
    pub dropped: u64,
    #[serde(deserialize_with = "deserialize_count")]
    pub plan_to_watch: u64,
}

/// Seasonal anime page; also reports which season was listed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalAnime {
    pub data: Vec<NodeEntry>,
    #[serde(default)]
    pub paging: Paging,
    #[serde(default)]
    pub season: Option<SeasonInfo>,
}

impl Paginated for SeasonalAnime {
    fn paging(&self) -> &Paging {
        &self.paging
    }
}

// ========== Manga ==========

/// Manga details. Only requested fields are filled in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaDetails {
    pub id: u64,
    pub title: String,
    pub main_picture: Option<Picture>,
    pub alternative_titles: AlternativeTitles,
    pub start_date: String,
    pub end_date: String,
    pub synopsis: String,
    pub mean: f64,
    pub rank: u32,
    pub popularity: u32,
    pub num_list_users: u64,
    pub num_scoring_users: u64,
    pub nsfw: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub media_type: String,
    pub status: String,
    pub genres: Vec<Genre>,
    pub my_list_status: Option<MangaListStatus>,
    pub num_volumes: u32,
    pub num_chapters: u32,
    pub authors: Vec<AuthorEntry>,
    pub pictures: Vec<Picture>,
    pub background: String,
    pub related_anime: Vec<RelatedNode>,
    pub related_manga: Vec<RelatedNode>,
    pub recommendations: Vec<Recommendation>,
    pub serialization: Vec<SerializationEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorEntry {
    pub node: Author,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializationEntry {
    pub node: Magazine,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Magazine {
    pub id: u64,
    pub name: String,
}

// ========== User lists ==========

/// The user's list entry for an anime, as returned by list queries and updates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeListStatus {
    pub status: String,
    pub score: u8,
    #[serde(alias = "num_watched_episodes")]
    pub num_episodes_watched: u32,
    pub is_rewatching: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub start_date: Option<String>,
    pub finish_date: Option<String>,
    pub priority: u8,
    pub num_times_rewatched: u32,
    pub rewatch_value: u8,
    pub tags: Vec<String>,
    pub comments: String,
}

/// The user's list entry for a manga
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaListStatus {
    pub status: String,
    pub score: u8,
    pub num_volumes_read: u32,
    pub num_chapters_read: u32,
    pub is_rereading: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub start_date: Option<String>,
    pub finish_date: Option<String>,
    pub priority: u8,
    pub num_times_reread: u32,
    pub reread_value: u8,
    pub tags: Vec<String>,
    pub comments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeListEntry {
    pub node: Node,
    pub list_status: AnimeListStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaListEntry {
    pub node: Node,
    pub list_status: MangaListStatus,
}

// ========== Forum ==========

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForumCategories {
    pub categories: Vec<ForumCategory>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumCategory {
    pub title: String,
    pub boards: Vec<ForumBoard>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumBoard {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub subboards: Vec<ForumSubboard>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForumSubboard {
    pub id: u64,
    pub title: String,
}

/// One page of a forum topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumTopic {
    pub data: ForumTopicData,
    #[serde(default)]
    pub paging: Paging,
}

impl Paginated for ForumTopic {
    fn paging(&self) -> &Paging {
        &self.paging
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumTopicData {
    pub title: String,
    pub posts: Vec<ForumPost>,
    pub poll: Option<Poll>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumPost {
    pub id: u64,
    pub number: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: ForumPostAuthor,
    pub body: String,
    pub signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumPostAuthor {
    pub id: u64,
    pub name: String,
    /// The API spells this key `forum_avator`
    #[serde(rename = "forum_avator", alias = "forum_avatar")]
    pub forum_avatar: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Poll {
    pub id: u64,
    pub question: String,
    pub closed: bool,
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollOption {
    pub id: u64,
    pub text: String,
    pub votes: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumSearchEntry {
    pub id: u64,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: ForumUser,
    pub number_of_posts: u32,
    pub last_post_created_at: Option<DateTime<Utc>>,
    pub last_post_created_by: ForumUser,
    pub is_locked: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumUser {
    pub id: u64,
    pub name: String,
}

// ========== User ==========

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInformation {
    pub id: u64,
    pub name: String,
    pub location: String,
    pub joined_at: Option<DateTime<Utc>>,
    pub anime_statistics: Option<UserAnimeStatistics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAnimeStatistics {
    pub num_items_watching: u32,
    pub num_items_completed: u32,
    pub num_items_on_hold: u32,
    pub num_items_dropped: u32,
    pub num_items_plan_to_watch: u32,
    pub num_items: u32,
    pub num_days_watched: f64,
    pub num_days_watching: f64,
    pub num_days_completed: f64,
    pub num_days_on_hold: f64,
    pub num_days_dropped: f64,
    pub num_days: f64,
    pub num_episodes: u32,
    pub num_times_rewatched: u32,
    pub mean_score: f64,
}

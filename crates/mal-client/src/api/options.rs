//! Typed request options: detail fields, ranking types, seasons, list
//! statuses, sort orders and the bounded values used by list updates.
//!
//! The allowed values are fixed tables, so an invalid value cannot be built
//! and is rejected before a request is made.

use crate::error::{MalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Value sent to the API
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = MalError;

            fn from_str(s: &str) -> Result<Self> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        MalError::InvalidArgument(format!(
                            "unknown {} `{}`",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }
    };
}

wire_enum! {
    /// Fields that can be requested from the anime and manga detail endpoints
    Field {
        Id => "id",
        Title => "title",
        MainPicture => "main_picture",
        AlternativeTitles => "alternative_titles",
        StartDate => "start_date",
        EndDate => "end_date",
        Synopsis => "synopsis",
        Mean => "mean",
        Rank => "rank",
        Popularity => "popularity",
        NumListUsers => "num_list_users",
        NumScoringUsers => "num_scoring_users",
        Nsfw => "nsfw",
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
        MediaType => "media_type",
        Status => "status",
        Genres => "genres",
        MyListStatus => "my_list_status",
        Pictures => "pictures",
        Background => "background",
        RelatedAnime => "related_anime",
        RelatedManga => "related_manga",
        Recommendations => "recommendations",
        Statistics => "statistics",
        // anime only
        NumEpisodes => "num_episodes",
        StartSeason => "start_season",
        Broadcast => "broadcast",
        Source => "source",
        AverageEpisodeDuration => "average_episode_duration",
        Rating => "rating",
        Studios => "studios",
        // manga only
        NumVolumes => "num_volumes",
        NumChapters => "num_chapters",
        Authors => "authors{first_name,last_name}",
        Serialization => "serialization{name}",
    }
}

impl Field {
    /// Every field the anime details endpoint accepts
    pub const ANIME: &'static [Field] = &[
        Field::Id,
        Field::Title,
        Field::MainPicture,
        Field::AlternativeTitles,
        Field::StartDate,
        Field::EndDate,
        Field::Synopsis,
        Field::Mean,
        Field::Rank,
        Field::Popularity,
        Field::NumListUsers,
        Field::NumScoringUsers,
        Field::Nsfw,
        Field::CreatedAt,
        Field::UpdatedAt,
        Field::MediaType,
        Field::Status,
        Field::Genres,
        Field::MyListStatus,
        Field::Pictures,
        Field::Background,
        Field::RelatedAnime,
        Field::RelatedManga,
        Field::Recommendations,
        Field::Statistics,
        Field::NumEpisodes,
        Field::StartSeason,
        Field::Broadcast,
        Field::Source,
        Field::AverageEpisodeDuration,
        Field::Rating,
        Field::Studios,
    ];

    /// Every field the manga details endpoint accepts
    pub const MANGA: &'static [Field] = &[
        Field::Id,
        Field::Title,
        Field::MainPicture,
        Field::AlternativeTitles,
        Field::StartDate,
        Field::EndDate,
        Field::Synopsis,
        Field::Mean,
        Field::Rank,
        Field::Popularity,
        Field::NumListUsers,
        Field::NumScoringUsers,
        Field::Nsfw,
        Field::CreatedAt,
        Field::UpdatedAt,
        Field::MediaType,
        Field::Status,
        Field::Genres,
        Field::MyListStatus,
        Field::Pictures,
        Field::Background,
        Field::RelatedAnime,
        Field::RelatedManga,
        Field::Recommendations,
        Field::Statistics,
        Field::NumVolumes,
        Field::NumChapters,
        Field::Authors,
        Field::Serialization,
    ];
}

/// Build the `fields` parameter. Fields outside `allowed` are rejected;
/// duplicates are sent once. `None` when nothing was requested.
pub(crate) fn fields_param(fields: &[Field], allowed: &[Field], endpoint: &str) -> Result<Option<String>> {
    if let Some(bad) = fields.iter().find(|f| !allowed.contains(*f)) {
        return Err(MalError::InvalidArgument(format!(
            "field `{}` is not available for {}",
            bad, endpoint
        )));
    }

    let mut names: Vec<&str> = Vec::with_capacity(fields.len());
    for field in fields {
        if !names.contains(&field.as_str()) {
            names.push(field.as_str());
        }
    }

    if names.is_empty() {
        Ok(None)
    } else {
        Ok(Some(names.join(",")))
    }
}

wire_enum! {
    /// Anime ranking types
    AnimeRanking {
        /// Top anime series
        All => "all",
        Airing => "airing",
        Upcoming => "upcoming",
        Tv => "tv",
        Ova => "ova",
        Movie => "movie",
        Special => "special",
        ByPopularity => "bypopularity",
        Favorite => "favorite",
    }
}

wire_enum! {
    /// Manga ranking types
    MangaRanking {
        /// Top manga series
        All => "all",
        Manga => "manga",
        Novels => "novels",
        OneShots => "oneshots",
        Doujinshi => "doujin",
        Manhwa => "manhwa",
        Manhua => "manhua",
        ByPopularity => "bypopularity",
        Favorite => "favorite",
    }
}

wire_enum! {
    Season {
        /// January, February, March
        Winter => "winter",
        /// April, May, June
        Spring => "spring",
        /// July, August, September
        Summer => "summer",
        /// October, November, December
        Fall => "fall",
    }
}

wire_enum! {
    /// Sort order of seasonal anime
    SeasonalSort {
        Score => "anime_score",
        NumListUsers => "anime_num_list_users",
    }
}

wire_enum! {
    /// Anime list status
    WatchStatus {
        Watching => "watching",
        Completed => "completed",
        OnHold => "on_hold",
        Dropped => "dropped",
        PlanToWatch => "plan_to_watch",
    }
}

wire_enum! {
    /// Manga list status
    ReadStatus {
        Reading => "reading",
        Completed => "completed",
        OnHold => "on_hold",
        Dropped => "dropped",
        PlanToRead => "plan_to_read",
    }
}

wire_enum! {
    /// Sort order of a user's anime or manga list
    ListSort {
        Score => "list_score",
        UpdatedAt => "list_updated_at",
        Title => "title",
        StartDate => "start_date",
        Id => "id",
    }
}

/// Kind of list a sort applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListKind {
    Anime,
    Manga,
}

impl ListSort {
    /// Title, start date and id sorts carry an `anime_`/`manga_` prefix on the wire
    pub(crate) fn for_list(&self, kind: ListKind) -> String {
        match self {
            ListSort::Title | ListSort::StartDate | ListSort::Id => {
                let prefix = match kind {
                    ListKind::Anime => "anime_",
                    ListKind::Manga => "manga_",
                };
                format!("{}{}", prefix, self.as_str())
            }
            _ => self.as_str().to_string(),
        }
    }
}

/// Priority of a list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_u8(&self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = MalError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Priority::Low),
            1 => Ok(Priority::Medium),
            2 => Ok(Priority::High),
            other => Err(MalError::InvalidArgument(format!(
                "priority must be 0, 1 or 2, got {}",
                other
            ))),
        }
    }
}

/// List score, 0 to 10. 0 clears the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(MalError::InvalidArgument(format!(
                "score must be between 0 and {}, got {}",
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = MalError;

    fn try_from(value: u8) -> Result<Self> {
        Score::new(value)
    }
}

/// How likely an entry is to be rewatched or reread, 0 to 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepeatValue(u8);

impl RepeatValue {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(MalError::InvalidArgument(format!(
                "rewatch/reread value must be between 0 and {}, got {}",
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RepeatValue {
    type Error = MalError;

    fn try_from(value: u8) -> Result<Self> {
        RepeatValue::new(value)
    }
}

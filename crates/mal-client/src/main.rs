//! `mal` command line client for the MyAnimeList API.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mal_client::options::{
    AnimeRanking, Field, ListSort, MangaRanking, Priority, ReadStatus, RepeatValue, Score, Season, SeasonalSort,
    WatchStatus,
};
use mal_client::{AnimeListUpdate, ClientConfig, Credentials, MalClient, MangaListUpdate, PageOptions};
use serde::Serialize;
use shared::{Config, CredentialStore, LogConfig, StoredCredentials};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Anime,
    Manga,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the OAuth2 authorization flow and store the tokens
    Login,
    /// Exchange the stored refresh token for a new access token
    Refresh,
    /// Search by title
    Search {
        query: String,
        #[arg(long, value_enum, default_value_t = Kind::Anime)]
        kind: Kind,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show every detail field of an anime
    Anime { id: u64 },
    /// Show every detail field of a manga
    Manga { id: u64 },
    /// Top entries of a ranking, e.g. `all`, `airing` or `manhwa`
    Ranking {
        #[arg(default_value = "all")]
        ranking: String,
        #[arg(long, value_enum, default_value_t = Kind::Anime)]
        kind: Kind,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Anime of a season
    Seasonal {
        year: u16,
        season: Season,
        #[arg(long)]
        sort: Option<SeasonalSort>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// A user's anime or manga list
    List {
        /// Defaults to the authorized user
        #[arg(long)]
        user: Option<String>,
        #[arg(long, value_enum, default_value_t = Kind::Anime)]
        kind: Kind,
        /// List status, e.g. `watching` or `plan_to_read`
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        sort: Option<ListSort>,
        #[arg(long, default_value_t = 100)]
        limit: u32,
        /// Follow the paging cursor until the list ends
        #[arg(long)]
        all: bool,
    },
    /// Add or change an entry on the authorized user's list
    Update {
        id: u64,
        #[arg(long, value_enum, default_value_t = Kind::Anime)]
        kind: Kind,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        score: Option<u8>,
        /// Episodes watched or chapters read
        #[arg(long)]
        progress: Option<u32>,
        /// 0 low, 1 medium, 2 high
        #[arg(long)]
        priority: Option<u8>,
        /// Rewatch or reread value, 0 to 5
        #[arg(long)]
        repeat_value: Option<u8>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        comments: Option<String>,
    },
    /// Remove an entry from the authorized user's list
    Remove {
        id: u64,
        #[arg(long, value_enum, default_value_t = Kind::Anime)]
        kind: Kind,
    },
    /// Profile and statistics of the authorized user
    Me,
    /// Forum categories and boards
    ForumBoards,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args.config)?;

    let mut log_config = LogConfig::from_config(&config, "mal");
    if args.verbose {
        log_config.console = true;
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    let store = CredentialStore::new(config.credentials_path());
    let stored = store.load().context("Failed to load stored credentials")?;

    let mut client = MalClient::new(client_config(&config, &stored)?).context("Failed to create MAL client")?;
    if stored.has_tokens() {
        client.set_credentials(&stored.access_token, &stored.refresh_token, stored.expires_at);
        if client.credentials().is_expired() {
            warn!("Stored access token has expired, run `mal refresh`");
        }
    }

    match args.command {
        Command::Login => {
            let url = client.authorization_url()?;
            println!("Open this URL and authorize the application:\n\n{}\n", url);
            println!("Paste the `code` parameter of the redirect URL:");

            let mut code = String::new();
            BufReader::new(tokio::io::stdin())
                .read_line(&mut code)
                .await
                .context("Failed to read authorization code")?;

            let credentials = client
                .exchange_code(code.trim())
                .await
                .context("Authorization code exchange failed")?;
            persist(&store, &config, credentials)?;
            println!("Logged in, tokens saved to {}", store.path().display());
        }
        Command::Refresh => {
            if client.credentials().refresh_token.is_empty() {
                bail!("No refresh token stored, run `mal login` first");
            }
            let credentials = client.refresh_access_token().await.context("Token refresh failed")?;
            persist(&store, &config, credentials)?;
            println!("Access token refreshed");
        }
        Command::Search {
            query,
            kind,
            limit,
            offset,
        } => {
            let options = PageOptions::limit(limit).with_offset(offset);
            match kind {
                Kind::Anime => print_json(&*client.anime_search(&query, options).await?)?,
                Kind::Manga => print_json(&*client.manga_search(&query, options).await?)?,
            }
        }
        Command::Anime { id } => print_json(&client.anime_details(id, Field::ANIME).await?)?,
        Command::Manga { id } => print_json(&client.manga_details(id, Field::MANGA).await?)?,
        Command::Ranking { ranking, kind, limit } => {
            let options = PageOptions::limit(limit);
            match kind {
                Kind::Anime => {
                    let ranking: AnimeRanking = ranking.parse()?;
                    print_json(&*client.anime_ranking(ranking, options).await?)?
                }
                Kind::Manga => {
                    let ranking: MangaRanking = ranking.parse()?;
                    print_json(&*client.manga_ranking(ranking, options).await?)?
                }
            }
        }
        Command::Seasonal {
            year,
            season,
            sort,
            limit,
        } => {
            let page = client
                .seasonal_anime(year, season, sort, PageOptions::limit(limit))
                .await?;
            print_json(&*page)?
        }
        Command::List {
            user,
            kind,
            status,
            sort,
            limit,
            all,
        } => {
            let options = PageOptions::limit(limit);
            let user = user.as_deref();
            match kind {
                Kind::Anime => {
                    let status = status.map(|s| s.parse::<WatchStatus>()).transpose()?;
                    let mut page = client.user_anime_list(user, status, sort, options).await?;
                    print_json(&page.data)?;
                    while all && page.has_next() {
                        page = page.next(None).await?;
                        print_json(&page.data)?;
                    }
                }
                Kind::Manga => {
                    let status = status.map(|s| s.parse::<ReadStatus>()).transpose()?;
                    let mut page = client.user_manga_list(user, status, sort, options).await?;
                    print_json(&page.data)?;
                    while all && page.has_next() {
                        page = page.next(None).await?;
                        print_json(&page.data)?;
                    }
                }
            }
        }
        Command::Update {
            id,
            kind,
            status,
            score,
            progress,
            priority,
            repeat_value,
            tags,
            comments,
        } => {
            let score = score.map(Score::new).transpose()?;
            let priority = priority.map(Priority::try_from).transpose()?;
            let repeat_value = repeat_value.map(RepeatValue::new).transpose()?;

            match kind {
                Kind::Anime => {
                    let mut update = AnimeListUpdate::new(id);
                    if let Some(status) = status {
                        update = update.status(status.parse()?);
                    }
                    if let Some(score) = score {
                        update = update.score(score);
                    }
                    if let Some(n) = progress {
                        update = update.watched_episodes(n);
                    }
                    if let Some(priority) = priority {
                        update = update.priority(priority);
                    }
                    if let Some(value) = repeat_value {
                        update = update.rewatch_value(value);
                    }
                    if !tags.is_empty() {
                        update = update.tags(tags);
                    }
                    if let Some(comments) = comments {
                        update = update.comments(comments);
                    }
                    print_json(&client.update_anime_list(&update).await?)?
                }
                Kind::Manga => {
                    let mut update = MangaListUpdate::new(id);
                    if let Some(status) = status {
                        update = update.status(status.parse()?);
                    }
                    if let Some(score) = score {
                        update = update.score(score);
                    }
                    if let Some(n) = progress {
                        update = update.chapters_read(n);
                    }
                    if let Some(priority) = priority {
                        update = update.priority(priority);
                    }
                    if let Some(value) = repeat_value {
                        update = update.reread_value(value);
                    }
                    if !tags.is_empty() {
                        update = update.tags(tags);
                    }
                    if let Some(comments) = comments {
                        update = update.comments(comments);
                    }
                    print_json(&client.update_manga_list(&update).await?)?
                }
            }
        }
        Command::Remove { id, kind } => {
            match kind {
                Kind::Anime => client.delete_anime_from_list(id).await?,
                Kind::Manga => client.delete_manga_from_list(id).await?,
            }
            println!("Removed {} from the list", id);
        }
        Command::Me => print_json(&client.user_information().await?)?,
        Command::ForumBoards => print_json(&client.forum_boards().await?)?,
    }

    Ok(())
}

/// Read the config file. A missing file gives the defaults; an unreadable or
/// malformed one is an error.
fn load_config(path: &Path) -> Result<Config> {
    Config::from_file(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Client settings from the config file, with the stored client id and
/// secret filling in whatever the config leaves empty
fn client_config(config: &Config, stored: &StoredCredentials) -> Result<ClientConfig> {
    let mal = &config.mal;
    let client_id = if mal.client_id.is_empty() {
        stored.client_id.clone()
    } else {
        mal.client_id.clone()
    };
    let client_secret = if mal.client_secret.is_empty() {
        stored.client_secret.clone()
    } else {
        mal.client_secret.clone()
    };
    if client_id.is_empty() {
        bail!("No client id configured, set [mal] client_id in the config file");
    }

    let mut client_config = ClientConfig::new(client_id, client_secret, mal.redirect_url.clone())
        .with_challenge_method(
            mal.challenge_method
                .parse()
                .context("Invalid [mal] challenge_method")?,
        );
    if mal.timeout_secs > 0 {
        client_config = client_config.with_timeout(Duration::from_secs(mal.timeout_secs));
    }
    client_config.api_base = mal.api_base.clone();
    client_config.authorize_url = mal.authorize_url.clone();
    client_config.token_url = mal.token_url.clone();

    Ok(client_config)
}

/// Write freshly issued tokens back to the credentials file
fn persist(store: &CredentialStore, config: &Config, credentials: Credentials) -> Result<()> {
    store
        .update(StoredCredentials {
            client_id: config.mal.client_id.clone(),
            client_secret: config.mal.client_secret.clone(),
            access_token: credentials.access_token,
            refresh_token: credentials.refresh_token,
            expires_at: credentials.expires_at,
        })
        .context("Failed to save credentials")?;
    info!(path = %store.path().display(), "Stored new tokens");
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_prefers_config_file() {
        let mut config = Config::default();
        config.mal.client_id = "from-config".to_string();
        config.mal.challenge_method = "S256".to_string();
        config.mal.token_url = Some("http://localhost:1/token".to_string());
        let stored = StoredCredentials {
            client_id: "stored".to_string(),
            client_secret: "stored-secret".to_string(),
            ..Default::default()
        };

        let client_config = client_config(&config, &stored).unwrap();
        assert_eq!(client_config.client_id, "from-config");
        assert_eq!(client_config.client_secret, "stored-secret");
        assert_eq!(client_config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(client_config.token_url.as_deref(), Some("http://localhost:1/token"));
        assert_eq!(
            client_config.challenge_method,
            mal_client::CodeChallengeMethod::S256
        );
    }

    #[test]
    fn test_client_config_requires_client_id() {
        assert!(client_config(&Config::default(), &StoredCredentials::default()).is_err());

        let mut config = Config::default();
        config.mal.client_id = "id".to_string();
        config.mal.challenge_method = "md5".to_string();
        assert!(client_config(&config, &StoredCredentials::default()).is_err());
    }

    #[test]
    fn test_load_config_reports_broken_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[mal\nclient_id = ").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));

        let config = load_config(&temp_dir.path().join("missing.toml")).unwrap();
        assert!(config.mal.client_id.is_empty());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["mal", "seasonal", "2020", "fall", "--sort", "anime_score"]);
        match args.command {
            Command::Seasonal { year, season, sort, .. } => {
                assert_eq!(year, 2020);
                assert_eq!(season, Season::Fall);
                assert_eq!(sort, Some(SeasonalSort::Score));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::parse_from(["mal", "update", "5114", "--score", "9", "--tags", "a,b"]);
        match args.command {
            Command::Update { id, score, tags, kind, .. } => {
                assert_eq!(id, 5114);
                assert_eq!(score, Some(9));
                assert_eq!(tags, vec!["a", "b"]);
                assert_eq!(kind, Kind::Anime);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}

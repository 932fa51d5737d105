//! Rotary backend client.

use crate::error::{Result, ServerClientError};
use crate::types::{
    ChooseResponse, LyricsResponse, NowPlayingRequest, PlayedRequest, PlaylistInfo, ServerConfig,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use rotary_core::{
    AudioQuality, CoreError, ImageQuality, Lyrics, MediaPayload, PlaybackReporter, Track,
    TrackFetcher, TrackFilters, TrackPath,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Client for a Rotary backend.
///
/// Cheap to share behind an `Arc`; the token can be changed at runtime.
///
/// # Example
///
/// ```ignore
/// use rotary_server_client::{RotaryServerClient, ServerConfig};
/// use rotary_core::TrackFilters;
///
/// let client = RotaryServerClient::new(ServerConfig::new("https://music.example.com"))?;
///
/// let path = client.choose_track("Rock", &TrackFilters::default()).await?;
/// let track = client.track_info(&path).await?;
/// println!("{}", track.display_line());
/// ```
pub struct RotaryServerClient {
    http: Client,
    config: Arc<RwLock<ServerConfig>>,
}

impl RotaryServerClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        // Validate URL
        if config.url.is_empty() {
            return Err(ServerClientError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        Url::parse(&url).map_err(|e| ServerClientError::InvalidUrl(e.to_string()))?;

        let normalized_config = ServerConfig { url, ..config };

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("RotaryPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServerClientError::Request)?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(normalized_config)),
        })
    }

    /// Get the server URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client has a token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Set the bearer token.
    pub async fn set_token(&self, access_token: Option<String>) {
        self.config.write().await.access_token = access_token;
    }

    /// Whether audio is handed out as stream URLs.
    pub async fn is_streaming(&self) -> bool {
        self.config.read().await.stream_audio
    }

    // =========================================================================
    // Playlists
    // =========================================================================

    /// List the playlists the server offers.
    pub async fn list_playlists(&self) -> Result<Vec<PlaylistInfo>> {
        let response = self.get("/api/playlists", &[]).await?;
        let playlists: Vec<PlaylistInfo> = parse_json(response, "playlists").await?;
        debug!(count = playlists.len(), "Fetched playlists");
        Ok(playlists)
    }

    // =========================================================================
    // Tracks
    // =========================================================================

    /// Ask the server for a random track from `playlist`.
    ///
    /// Returns `NotFound` when no track matches.
    pub async fn choose_track(&self, playlist: &str, filters: &TrackFilters) -> Result<TrackPath> {
        let mut query = vec![("playlist", playlist.to_string())];
        query.extend(filters.include_tags.iter().map(|t| ("tag", t.clone())));
        query.extend(filters.exclude_tags.iter().map(|t| ("exclude_tag", t.clone())));
        if let Some(min) = filters.min_duration {
            query.push(("min_duration", min.to_string()));
        }
        if let Some(max) = filters.max_duration {
            query.push(("max_duration", max.to_string()));
        }

        let response = self.get("/api/track/choose", &query).await?;
        let chosen: ChooseResponse = parse_json(response, "choose").await?;
        debug!(playlist = %playlist, path = %chosen.path, "Server chose track");
        Ok(TrackPath::new(chosen.path))
    }

    /// Fetch track metadata.
    pub async fn track_info(&self, path: &TrackPath) -> Result<Track> {
        let response = self.get("/api/track/info", &[path_param(path)]).await?;
        parse_json(response, "track info").await
    }

    /// Direct URL of the audio endpoint, for streaming playback.
    pub async fn audio_url(&self, path: &TrackPath, quality: AudioQuality) -> Result<String> {
        let base = self.url().await;
        let url = Url::parse_with_params(
            &format!("{base}/api/track/audio"),
            &[("path", path.as_str()), ("quality", quality.as_str())],
        )
        .map_err(|e| ServerClientError::InvalidUrl(e.to_string()))?;
        Ok(url.into())
    }

    /// Fetch the audio, or only its stream URL in streaming mode.
    pub async fn audio(&self, path: &TrackPath, quality: AudioQuality) -> Result<MediaPayload> {
        if self.is_streaming().await {
            return self.audio_url(path, quality).await.map(MediaPayload::Url);
        }

        let query = [path_param(path), ("quality", quality.as_str().to_string())];
        let response = self.get("/api/track/audio", &query).await?;
        read_bytes(response).await
    }

    /// Fetch the cover image.
    pub async fn cover(
        &self,
        path: &TrackPath,
        quality: ImageQuality,
        meme: bool,
    ) -> Result<MediaPayload> {
        let query = [
            path_param(path),
            ("quality", quality.as_str().to_string()),
            ("meme", meme.to_string()),
        ];
        let response = self.get("/api/track/cover", &query).await?;
        read_bytes(response).await
    }

    /// Fetch lyrics; `None` when the server has none.
    pub async fn lyrics(&self, path: &TrackPath) -> Result<Option<Lyrics>> {
        let response = self.get("/api/track/lyrics", &[path_param(path)]).await?;
        let lyrics: LyricsResponse = parse_json(response, "lyrics").await?;

        Ok(match (lyrics.found, lyrics.lyrics) {
            (true, Some(text)) => Some(Lyrics {
                text,
                source_url: lyrics.source_url,
            }),
            _ => None,
        })
    }

    // =========================================================================
    // Activity
    // =========================================================================

    /// Report the track that is playing.
    pub async fn now_playing(&self, path: &TrackPath, paused: bool, position: f32) -> Result<()> {
        let body = NowPlayingRequest {
            track: path.as_str().to_string(),
            paused,
            position,
        };
        self.post("/api/activity/now_playing", &body).await
    }

    /// Report a track as played.
    pub async fn played(&self, path: &TrackPath, started_at: DateTime<Utc>) -> Result<()> {
        let body = PlayedRequest {
            track: path.as_str().to_string(),
            timestamp: started_at.timestamp(),
        };
        self.post("/api/activity/played", &body).await?;
        info!(path = %path, "Reported played track");
        Ok(())
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    async fn request(
        &self,
        endpoint: &str,
        build: impl FnOnce(&Client, String) -> RequestBuilder,
    ) -> Result<Response> {
        let config = self.config.read().await;
        let url = format!("{}{}", config.url, endpoint);
        let token = config.access_token.clone();
        drop(config);

        let mut request = build(&self.http, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ServerClientError::from_send)?;
        check_status(response, endpoint).await
    }

    async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Response> {
        debug!(endpoint = %endpoint, "GET");
        self.request(endpoint, |http, url| http.get(url).query(query))
            .await
    }

    async fn post<B: serde::Serialize + Sync>(&self, endpoint: &str, body: &B) -> Result<()> {
        debug!(endpoint = %endpoint, "POST");
        self.request(endpoint, |http, url| http.post(url).json(body))
            .await
            .map(drop)
    }
}

fn path_param(path: &TrackPath) -> (&'static str, String) {
    ("path", path.as_str().to_string())
}

async fn check_status(response: Response, endpoint: &str) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else if status.as_u16() == 401 {
        Err(ServerClientError::AuthRequired)
    } else if status.as_u16() == 404 {
        Err(ServerClientError::NotFound(endpoint.to_string()))
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(ServerClientError::ServerError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| ServerClientError::ParseError(format!("Failed to parse {what} response: {e}")))
}

async fn read_bytes(response: Response) -> Result<MediaPayload> {
    let mime = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(FALLBACK_MIME)
        .to_string();
    let data = response.bytes().await?;
    debug!(size = data.len(), mime = %mime, "Downloaded media");
    Ok(MediaPayload::bytes(data, mime))
}

#[async_trait]
impl TrackFetcher for RotaryServerClient {
    async fn choose_random_track(
        &self,
        playlist: &str,
        filters: &TrackFilters,
    ) -> rotary_core::Result<TrackPath> {
        self.choose_track(playlist, filters)
            .await
            .map_err(|e| match e {
                ServerClientError::NotFound(_) => CoreError::EmptyPlaylist(playlist.to_string()),
                other => other.into(),
            })
    }

    async fn fetch_track(&self, path: &TrackPath) -> rotary_core::Result<Track> {
        self.track_info(path).await.map_err(|e| match e {
            ServerClientError::NotFound(_) => CoreError::not_found("track", path.as_str()),
            other => other.into(),
        })
    }

    async fn fetch_audio(
        &self,
        path: &TrackPath,
        quality: AudioQuality,
    ) -> rotary_core::Result<MediaPayload> {
        Ok(self.audio(path, quality).await?)
    }

    async fn fetch_cover(
        &self,
        path: &TrackPath,
        quality: ImageQuality,
        meme: bool,
    ) -> rotary_core::Result<MediaPayload> {
        Ok(self.cover(path, quality, meme).await?)
    }

    async fn fetch_lyrics(&self, path: &TrackPath) -> rotary_core::Result<Option<Lyrics>> {
        match self.lyrics(path).await {
            Ok(lyrics) => Ok(lyrics),
            Err(ServerClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PlaybackReporter for RotaryServerClient {
    async fn report_now_playing(
        &self,
        path: &TrackPath,
        paused: bool,
        position_percent: f32,
    ) -> rotary_core::Result<()> {
        Ok(self.now_playing(path, paused, position_percent).await?)
    }

    async fn report_played(
        &self,
        path: &TrackPath,
        started_at: DateTime<Utc>,
    ) -> rotary_core::Result<()> {
        Ok(self.played(path, started_at).await?)
    }
}

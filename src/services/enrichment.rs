//! Metadata enrichment against MusicBrainz and the Cover Art Archive.
//!
//! Enrichment is an admin-triggered, best-effort overlay: a MusicBrainz
//! miss is an error the operator sees, but a cover-art miss only means
//! the release keeps whatever cover it already had.

use chrono::Utc;
use reqwest::Client;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::entities::{artist, release};
use crate::errors::ServiceError;

pub struct EnrichmentService {
    db: Arc<DatabaseConnection>,
    http: Client,
    musicbrainz_api_base: String,
    coverart_api_base: String,
}

#[derive(Debug, Deserialize)]
struct MbSearchResponse {
    #[serde(default)]
    releases: Vec<MbRelease>,
}

#[derive(Debug, Deserialize)]
struct MbRelease {
    id: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    score: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct CaaResponse {
    #[serde(default)]
    images: Vec<CaaImage>,
}

#[derive(Debug, Deserialize)]
struct CaaImage {
    #[serde(default)]
    front: bool,
    image: String,
}

/// What a successful enrichment wrote back onto the release.
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct EnrichmentResult {
    pub mbid: String,
    pub cover_url: Option<String>,
    pub country: Option<String>,
    pub release_date: Option<String>,
}

fn lucene_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if "+-&|!(){}[]^\"~*?:\\/".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl EnrichmentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        musicbrainz_api_base: String,
        coverart_api_base: String,
        user_agent: String,
    ) -> Result<Self, ServiceError> {
        // MusicBrainz rejects clients without an identifying User-Agent.
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client: {e}")))?;
        Ok(Self {
            db,
            http,
            musicbrainz_api_base,
            coverart_api_base,
        })
    }

    /// Looks the release up on MusicBrainz (barcode first, artist+title
    /// otherwise), fetches front cover art when available, and persists
    /// the merged fields.
    #[instrument(skip(self))]
    pub async fn enrich_release(&self, release_id: &str) -> Result<EnrichmentResult, ServiceError> {
        let found = release::Entity::find_by_id(release_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("release {release_id} not found")))?;

        let query = match &found.barcode {
            Some(barcode) if !barcode.trim().is_empty() => {
                format!("barcode:{}", lucene_escape(barcode.trim()))
            }
            _ => {
                // Query by the artist's display name, not the catalog
                // slug; they diverge on diacritics and casing.
                let artist_name = artist::Entity::find_by_id(&found.artist_id)
                    .one(&*self.db)
                    .await?
                    .map(|a| a.name)
                    .unwrap_or_else(|| found.artist_id.clone());
                format!(
                    "artist:\"{}\" AND release:\"{}\"",
                    lucene_escape(&artist_name),
                    lucene_escape(&found.title)
                )
            }
        };

        let mb = self.search_musicbrainz(&query).await?;
        let best = mb
            .releases
            .into_iter()
            .max_by_key(|r| r.score.unwrap_or(0))
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no MusicBrainz match for release {release_id}"
                ))
            })?;

        let cover_url = self.fetch_front_cover(&best.id).await;

        let mut model: release::ActiveModel = found.clone().into();
        model.mbid = Set(Some(best.id.clone()));
        if let Some(url) = &cover_url {
            model.cover_url = Set(Some(url.clone()));
        }
        if let Some(country) = &best.country {
            model.country = Set(Some(country.clone()));
        }
        if found.release_date.is_none() {
            if let Some(date) = &best.date {
                model.release_date = Set(Some(date.clone()));
            }
        }
        model.updated_at = Set(Utc::now());
        model.update(&*self.db).await?;

        info!(mbid = %best.id, "release enriched");
        Ok(EnrichmentResult {
            mbid: best.id,
            cover_url,
            country: best.country,
            release_date: best.date,
        })
    }

    async fn search_musicbrainz(&self, query: &str) -> Result<MbSearchResponse, ServiceError> {
        let response = self
            .http
            .get(format!("{}/release/", self.musicbrainz_api_base))
            .query(&[("query", query), ("fmt", "json"), ("limit", "5")])
            .send()
            .await
            .map_err(|e| {
                ServiceError::ExternalServiceError(format!("MusicBrainz request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "MusicBrainz returned HTTP {status}"
            )));
        }

        response.json::<MbSearchResponse>().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("malformed MusicBrainz response: {e}"))
        })
    }

    /// Best-effort front cover lookup. Any failure degrades to `None`.
    async fn fetch_front_cover(&self, mbid: &str) -> Option<String> {
        let response = self
            .http
            .get(format!("{}/release/{}", self.coverart_api_base, mbid))
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                info!(mbid, status = %r.status(), "no cover art available");
                return None;
            }
            Err(e) => {
                warn!(mbid, error = %e, "cover art lookup failed");
                return None;
            }
        };

        match response.json::<CaaResponse>().await {
            Ok(caa) => caa
                .images
                .iter()
                .find(|img| img.front)
                .or_else(|| caa.images.first())
                .map(|img| img.image.clone()),
            Err(e) => {
                warn!(mbid, error = %e, "malformed cover art response");
                None
            }
        }
    }
}

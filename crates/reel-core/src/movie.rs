//! # Catalog Payloads
//!
//! Read-only projections of the external movie catalog. Field names follow the
//! catalog (snake_case) because the API proxies them without reshaping. Every
//! field except the identifier and title tolerates being absent.

use serde::{Deserialize, Serialize};

/// Base URL of the catalog image CDN.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Poster rendition widths offered by the image CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PosterSize {
    /// 92px wide, used for search suggestions.
    #[default]
    W92,
    /// 185px wide.
    W185,
    /// 342px wide.
    W342,
    /// 500px wide, used for listings and detail pages.
    W500,
    /// Original upload.
    Original,
}

impl PosterSize {
    /// Path segment used by the CDN.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::W92 => "w92",
            Self::W185 => "w185",
            Self::W342 => "w342",
            Self::W500 => "w500",
            Self::Original => "original",
        }
    }
}

fn poster_url(path: Option<&str>, size: PosterSize) -> Option<String> {
    path.filter(|p| !p.trim().is_empty())
        .map(|p| format!("{IMAGE_BASE_URL}/{}{p}", size.as_str()))
}

fn year_of(date: Option<&str>) -> Option<&str> {
    date.and_then(|d| d.split('-').next())
        .map(str::trim)
        .filter(|y| !y.is_empty())
}

/// A movie as it appears in listings and search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Catalog identifier.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Relative poster path, e.g. `/abc.jpg`.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date as `YYYY-MM-DD`; sometimes an empty string.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Average user rating out of 10.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Short synopsis.
    #[serde(default)]
    pub overview: Option<String>,
}

impl MovieSummary {
    /// Year component of the release date.
    ///
    /// `None` when the date is absent or blank.
    pub fn release_year(&self) -> Option<&str> {
        year_of(self.release_date.as_deref())
    }

    /// Absolute poster URL at the given size, when the movie has a poster.
    pub fn poster_url(&self, size: PosterSize) -> Option<String> {
        poster_url(self.poster_path.as_deref(), size)
    }
}

/// One page of a paginated catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage<T> {
    /// 1-based page number.
    #[serde(default = "first_page")]
    pub page: u32,
    /// Items on this page. Missing or null is read as empty.
    #[serde(
        default = "Vec::new",
        deserialize_with = "null_as_empty",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub results: Vec<T>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of items across all pages.
    #[serde(default)]
    pub total_results: u32,
}

impl<T> MoviePage<T> {
    /// A page with no results.
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

fn first_page() -> u32 {
    1
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A catalog genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Genre identifier.
    pub id: u64,
    /// Localized name.
    pub name: String,
}

/// A production country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCountry {
    /// ISO 3166-1 code.
    #[serde(default)]
    pub iso_3166_1: Option<String>,
    /// Country name.
    pub name: String,
}

/// A cast credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    /// Performer name.
    pub name: String,
    /// Character played.
    #[serde(default)]
    pub character: Option<String>,
}

/// A crew credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    /// Crew member name.
    pub name: String,
    /// Job title, e.g. `Director`.
    #[serde(default)]
    pub job: Option<String>,
}

/// Cast and crew of a movie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    /// Billed cast, in billing order.
    #[serde(default)]
    pub cast: Vec<CastMember>,
    /// Crew.
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

/// Full movie record for the detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    /// Catalog identifier.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Synopsis.
    #[serde(default)]
    pub overview: Option<String>,
    /// Release date as `YYYY-MM-DD`.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Relative poster path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Average user rating out of 10.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Cast and crew, present when requested from the catalog.
    #[serde(default)]
    pub credits: Option<Credits>,
    /// Running time in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// ISO 639-1 code of the original language.
    #[serde(default)]
    pub original_language: Option<String>,
    /// Production countries.
    #[serde(default)]
    pub production_countries: Vec<ProductionCountry>,
    /// Budget in USD.
    #[serde(default)]
    pub budget: Option<u64>,
    /// Revenue in USD.
    #[serde(default)]
    pub revenue: Option<u64>,
}

impl MovieDetails {
    /// Name of the first crew member credited as `Director`.
    pub fn director(&self) -> Option<&str> {
        self.credits
            .as_ref()?
            .crew
            .iter()
            .find(|member| member.job.as_deref() == Some("Director"))
            .map(|member| member.name.as_str())
    }

    /// The first `limit` billed cast members.
    pub fn top_cast(&self, limit: usize) -> impl Iterator<Item = &CastMember> {
        self.credits
            .iter()
            .flat_map(|credits| credits.cast.iter())
            .take(limit)
    }

    /// Year component of the release date.
    pub fn release_year(&self) -> Option<&str> {
        year_of(self.release_date.as_deref())
    }

    /// Absolute poster URL at the given size.
    pub fn poster_url(&self, size: PosterSize) -> Option<String> {
        poster_url(self.poster_path.as_deref(), size)
    }
}

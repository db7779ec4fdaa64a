use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

// field names here are what the app already parses, don't rename them

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    /// site relative, feed it back into /meta as is
    pub link: String,
    pub image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectLink {
    pub title: String,
    pub link: String,
}

/// a season for series, a single quality/file for movies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkGroup {
    pub title: String,
    pub direct_links: Vec<DirectLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    pub title: String,
    pub synopsis: String,
    pub image: String,
    // the site never exposes one
    pub imdb_id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(rename = "linkList")]
    pub link_groups: Vec<LinkGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSource {
    pub url: String,
    pub quality: String,
}

const DEFAULT_PAGE: &str = "1";

fn default_page() -> String {
    DEFAULT_PAGE.to_string()
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostsQuery {
    /// path fragment like `/category/movies-10810`, empty for the home listing
    #[serde(default)]
    pub filter: String,
    #[serde(default = "default_page")]
    pub page: String,
    #[serde(default)]
    pub search_query: String,
}

impl PostsQuery {
    /// `?page=` is treated like no page at all
    pub fn page(&self) -> &str {
        match self.page.trim() {
            "" => DEFAULT_PAGE,
            page => page,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LinkQuery {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Link parameter is required"))]
    pub link: String,
}

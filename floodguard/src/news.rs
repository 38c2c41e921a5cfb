//! Fil d'actualités

use serde::{Deserialize, Serialize};

/// Nombre d'articles affichés
pub const NEWS_LIMIT: usize = 4;

/// Un article du fil
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default, alias = "excerpt")]
    pub description: String,
    #[serde(default = "default_url")]
    pub url: String,
    /// Date ISO 8601 (`publishedAt` ou `date` dans les fichiers)
    #[serde(default, alias = "publishedAt", alias = "date")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_url() -> String {
    "#".to_string()
}

/// Parse un fichier d'actualités (tableau JSON d'articles)
pub fn parse_news(bytes: &[u8]) -> Result<Vec<NewsItem>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Les `limit` articles les plus récents.
///
/// Les dates ISO se comparent comme des chaînes; les articles sans date
/// passent après, dans l'ordre du fichier.
pub fn latest(items: &[NewsItem], limit: usize) -> Vec<&NewsItem> {
    let mut sorted: Vec<&NewsItem> = items.iter().collect();
    sorted.sort_by(|a, b| match (&a.published_at, &b.published_at) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sorted.truncate(limit);
    sorted
}

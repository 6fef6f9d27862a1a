use crate::provider::{CardProvider, ProviderError};
use crate::schema::Category;
use recall_core::CardRecord;
use serde::Deserialize;
use std::time::Duration;

const UNSPLASH_API_URL: &str = "https://api.unsplash.com/photos/random";
pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";
/// The random-photo endpoint caps `count` at 30.
const MAX_COUNT: usize = 30;

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    urls: Option<PhotoUrls>,
    #[serde(default)]
    alt_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    #[serde(default)]
    small: Option<String>,
}

pub struct UnsplashProvider {
    access_key: Option<String>,
    agent: ureq::Agent,
}

impl UnsplashProvider {
    pub fn new(access_key: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();
        Self {
            access_key: access_key.filter(|key| !key.trim().is_empty()),
            agent,
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(ACCESS_KEY_ENV).ok())
    }
}

impl CardProvider for UnsplashProvider {
    fn name(&self) -> &str {
        "unsplash"
    }

    fn fetch(
        &mut self,
        count: usize,
        category: Option<Category>,
    ) -> Result<Vec<CardRecord>, ProviderError> {
        let Some(key) = self.access_key.as_deref() else {
            return Err(ProviderError::NotConfigured(format!(
                "set {ACCESS_KEY_ENV} to use the Unsplash card source"
            )));
        };
        let response = self
            .agent
            .get(&request_url(count, category))
            .set("Authorization", &format!("Client-ID {key}"))
            .call()
            .map_err(|err| ProviderError::Http(err.to_string()))?;
        let body = response.into_string()?;
        let photos: Vec<Photo> = serde_json::from_str(&body)?;
        Ok(normalize(photos))
    }
}

fn request_url(count: usize, category: Option<Category>) -> String {
    let count = count.clamp(1, MAX_COUNT);
    let mut url = format!("{UNSPLASH_API_URL}?count={count}&w=300&h=300&fit=crop");
    if let Some(category) = category {
        url.push_str("&query=");
        url.push_str(category.as_str());
    }
    url
}

fn normalize(photos: Vec<Photo>) -> Vec<CardRecord> {
    photos
        .into_iter()
        .enumerate()
        .map(|(idx, photo)| {
            let id = photo
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("fallback-{idx}"));
            let url = photo
                .urls
                .and_then(|urls| urls.small)
                .unwrap_or_else(|| {
                    format!("/placeholder.svg?height=300&width=300&query=nature-{idx}")
                });
            let label = photo
                .alt_description
                .unwrap_or_else(|| format!("Image {}", idx + 1));
            CardRecord::new(id, url, label)
        })
        .collect()
}

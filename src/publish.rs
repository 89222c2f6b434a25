use std::sync::Arc;

use chrono::{DateTime, Utc};
use spdlog::{info, warn};
use thiserror::Error;

use crate::dates::{epoch_millis, iso_date};
use crate::index_patch::{patch_index, BlogLinkEntry};
use crate::render::render_post;
use crate::store::{ContentStore, StoreError};
use crate::submission::ValidSubmission;

/// Where the published site is served from
#[derive(Debug, Clone)]
pub struct SiteTarget {
    pub owner: String,
    pub pages_domain: String,
}

impl SiteTarget {
    pub fn public_url(&self, path: &str) -> String {
        format!("https://{}.{}/{}", self.owner, self.pages_domain, path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexUpdate {
    Updated,
    /// The post is published but the theme page has no link to it
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedPost {
    pub path: String,
    pub url: String,
    pub index: IndexUpdate,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Error checking whether {path} exists: {source}")]
    PathResolution {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("Error writing {path}: {source}")]
    ContentWrite {
        path: String,
        #[source]
        source: StoreError,
    },
}

pub fn post_path(theme: &str, now: &DateTime<Utc>) -> String {
    format!("blogs/{}/{}.html", theme, iso_date(now))
}

pub fn unique_post_path(theme: &str, now: &DateTime<Utc>) -> String {
    format!("blogs/{}/{}-{}.html", theme, iso_date(now), epoch_millis(now))
}

pub fn theme_page_path(theme: &str) -> String {
    format!("{}.html", theme)
}

pub struct Publisher {
    store: Arc<dyn ContentStore>,
    site: SiteTarget,
}

impl Publisher {
    pub fn new(store: Arc<dyn ContentStore>, site: SiteTarget) -> Self {
        Self { store, site }
    }

    /// Writes the post page, then links it from the theme page.
    ///
    /// Only resolving the path and writing the post can fail the call. A
    /// failed theme page update is logged and reported in [`PublishedPost::index`].
    pub async fn publish(&self, submission: &ValidSubmission, now: DateTime<Utc>) -> Result<PublishedPost, PublishError> {
        let path = self.resolve_path(&submission.theme, &now).await?;

        let html = render_post(&submission.title, &submission.content, &now);
        let message = format!("feat: add new blog post \"{}\"", submission.title);
        if let Err(source) = self.store.put(&path, &html, &message, None).await {
            return Err(PublishError::ContentWrite { path, source });
        }
        info!("Published \"{}\" to {}", submission.title, path);

        let index = match self.update_theme_page(submission, &path, &now).await {
            Ok(()) => IndexUpdate::Updated,
            Err(e) => {
                warn!("Error updating theme page {}: {}. Post {} is published without a link", theme_page_path(&submission.theme), e, path);
                IndexUpdate::Failed(e.to_string())
            }
        };

        let url = self.site.public_url(&path);
        Ok(PublishedPost { path, url, index })
    }

    async fn resolve_path(&self, theme: &str, now: &DateTime<Utc>) -> Result<String, PublishError> {
        let candidate = post_path(theme, now);
        match self.store.exists(&candidate).await {
            Ok(true) => {
                let unique = unique_post_path(theme, now);
                info!("{} already exists, using {}", candidate, unique);
                Ok(unique)
            }
            Ok(false) => Ok(candidate),
            Err(source) => Err(PublishError::PathResolution { path: candidate, source }),
        }
    }

    async fn update_theme_page(&self, submission: &ValidSubmission, post_path: &str, now: &DateTime<Utc>) -> Result<(), StoreError> {
        let page_path = theme_page_path(&submission.theme);
        let page = self.store.fetch(&page_path).await?;

        let entry = BlogLinkEntry::new(&submission.title, post_path, now);
        let patched = patch_index(&page.content, &entry);
        let message = format!("feat: add blog link for \"{}\" to {} page", submission.title, submission.theme);
        self.store.put(&page_path, &patched, &message, Some(&page.sha)).await
    }
}

//! WordPress REST client for published articles

use super::http::{build_http_client, check_response};
use crate::config::WordPressConfig;
use crate::error::{BeaconError, Result};
use crate::services::mime::html_to_text;
use crate::services::traits::ArticleSource;
use async_trait::async_trait;
use beacon_types::Article;
use chrono::NaiveDateTime;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;

const SERVICE: &str = "WordPress";

pub struct WordPressClient {
    config: WordPressConfig,
    http_client: HttpClient,
}

impl WordPressClient {
    pub fn new(config: WordPressConfig) -> Result<Self> {
        Ok(Self {
            config,
            http_client: build_http_client()?,
        })
    }

    fn posts_url(&self) -> String {
        format!("{}/wp-json/wp/v2/posts", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ArticleSource for WordPressClient {
    async fn list_articles(&self, page: u32, per_page: u32) -> Result<Vec<Article>> {
        let response = self
            .http_client
            .get(self.posts_url())
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;

        // past the last page WordPress answers 400 rest_post_invalid_page_number
        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            if body.contains("rest_post_invalid_page_number") {
                return Ok(Vec::new());
            }
            return Err(BeaconError::Upstream {
                service: SERVICE,
                status: 400,
                body,
            });
        }

        let posts: Value = check_response(SERVICE, response).await?.json().await?;
        posts
            .as_array()
            .ok_or_else(|| BeaconError::unexpected(SERVICE, "posts response is not a list"))?
            .iter()
            .map(parse_post)
            .collect()
    }

    async fn find_article(&self, id: u64) -> Result<Option<Article>> {
        let response = self
            .http_client
            .get(format!("{}/{}", self.posts_url(), id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let post: Value = check_response(SERVICE, response).await?.json().await?;
        parse_post(&post).map(Some)
    }
}

fn rendered(post: &Value, field: &str) -> String {
    post[field]["rendered"].as_str().unwrap_or_default().to_string()
}

fn parse_post(post: &Value) -> Result<Article> {
    let id = post["id"]
        .as_u64()
        .ok_or_else(|| BeaconError::unexpected(SERVICE, "post without id"))?;
    let raw_date = post["date"]
        .as_str()
        .ok_or_else(|| BeaconError::unexpected(SERVICE, format!("post {} without date", id)))?;
    let date = NaiveDateTime::parse_from_str(raw_date, "%Y-%m-%dT%H:%M:%S").map_err(|e| {
        BeaconError::unexpected(SERVICE, format!("post {} has invalid date '{}': {}", id, raw_date, e))
    })?;

    Ok(Article {
        id,
        title: html_to_text(&rendered(post, "title")),
        excerpt: html_to_text(&rendered(post, "excerpt")),
        content: rendered(post, "content"),
        date,
        featured: post["sticky"].as_bool().unwrap_or(false),
        link: post["link"].as_str().unwrap_or_default().to_string(),
    })
}

//! Wiki content metrics: article length and pageviews

use crate::config::PageViewConfig;
use crate::fetch::{FetchClient, Pacer};
use crate::records::{PageViewRecord, WikiVolumeRecord};
use crate::{FetchError, FetchResult};
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

#[derive(Debug, Deserialize)]
struct InfoResponse {
    query: Option<InfoQuery>,
}

#[derive(Debug, Deserialize)]
struct InfoQuery {
    #[serde(default)]
    pages: HashMap<String, PageInfo>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    length: Option<u64>,
    touched: Option<String>,
    lastrevid: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PageViewResponse {
    items: Option<Vec<PageViewItem>>,
}

#[derive(Debug, Deserialize)]
struct PageViewItem {
    article: String,
    granularity: String,
    timestamp: String,
    access: String,
    agent: String,
    views: i64,
}

/// Client for the wiki action API and the pageviews REST API
///
/// Both share one pacer.
#[derive(Debug)]
pub struct WikiMetrics {
    http: FetchClient,
    api_url: String,
    pageviews_url: String,
    pageviews: PageViewConfig,
    pacer: Pacer,
}

impl WikiMetrics {
    pub fn new(
        http: FetchClient,
        api_url: impl Into<String>,
        pageviews_url: impl Into<String>,
        pageviews: PageViewConfig,
        pacer: Pacer,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            pageviews_url: pageviews_url.into(),
            pageviews,
            pacer,
        }
    }

    /// Fetches length and revision metadata for one normalized title
    ///
    /// The record is keyed by the requested title so it joins back onto the
    /// link table even when the API reports a display form of the title.
    pub async fn volume(&self, title: &str) -> FetchResult<WikiVolumeRecord> {
        self.pacer.ready().await;

        let response: InfoResponse = self
            .http
            .get_json(
                &self.api_url,
                &[
                    ("action", "query"),
                    ("prop", "info"),
                    ("titles", title),
                    ("format", "json"),
                ],
            )
            .await
            .map_err(|e| e.for_item(title))?;

        let page = response
            .query
            .and_then(|q| q.pages.into_values().find(|p| p.length.is_some()))
            .ok_or_else(|| FetchError::NotFoundOrEmpty {
                item: title.to_string(),
                reason: "no page with a length".to_string(),
            })?;

        Ok(WikiVolumeRecord {
            title: title.to_string(),
            page_length: page.length.unwrap_or_default(),
            last_touched: page.touched.unwrap_or_default(),
            last_revision_id: page.lastrevid.unwrap_or_default(),
        })
    }

    fn pageview_url(&self, title: &str) -> FetchResult<Url> {
        let mut url = Url::parse(&self.pageviews_url).map_err(|e| FetchError::Malformed {
            item: title.to_string(),
            reason: e.to_string(),
        })?;
        let config = &self.pageviews;
        url.path_segments_mut()
            .map_err(|_| FetchError::Malformed {
                item: title.to_string(),
                reason: "pageviews URL cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .extend([
                config.project.as_str(),
                config.access.as_str(),
                config.agent.as_str(),
                title,
                config.granularity.as_str(),
                config.start.as_str(),
                config.end.as_str(),
            ]);
        Ok(url)
    }

    /// Fetches the pageview series for one normalized title
    ///
    /// An article the service has no data for yields a single sentinel record
    /// instead of an empty result.
    pub async fn page_views(&self, title: &str) -> FetchResult<Vec<PageViewRecord>> {
        let url = self.pageview_url(title)?;
        self.pacer.ready().await;

        let response: PageViewResponse = match self.http.get_json(url.as_str(), &[]).await {
            Ok(response) => response,
            Err(FetchError::NotFoundOrEmpty { .. }) => {
                tracing::debug!("No pageview data for {}", title);
                return Ok(vec![PageViewRecord::no_data(title)]);
            }
            Err(e) => return Err(e.for_item(title)),
        };

        let records: Vec<PageViewRecord> = response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| PageViewRecord {
                title: item.article,
                views: item.views,
                granularity: item.granularity,
                timestamp: item.timestamp,
                access: item.access,
                agent: item.agent,
            })
            .collect();

        if records.is_empty() {
            return Ok(vec![PageViewRecord::no_data(title)]);
        }
        Ok(records)
    }
}

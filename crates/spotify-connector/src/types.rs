//! Records and options passed through the connector
//!
//! Analytics payloads are returned as opaque `serde_json::Value`s. Only the
//! paged episode listing is typed, because the stream has to read
//! `totalPages` to know when to stop.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One episode from `shows/{id}/episodes`. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listeners: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One page of the episode listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EpisodesPage {
    #[serde(default)]
    pub episodes: Vec<Episode>,
    pub total_pages: u32,
}

/// Flavour of the impressions endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpressionKind {
    Total,
    Daily,
    Faceted,
}

impl ImpressionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpressionKind::Total => "total",
            ImpressionKind::Daily => "daily",
            ImpressionKind::Faceted => "faceted",
        }
    }
}

impl fmt::Display for ImpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpressionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" => Ok(ImpressionKind::Total),
            "daily" => Ok(ImpressionKind::Daily),
            "faceted" => Ok(ImpressionKind::Faceted),
            other => Err(format!(
                "unknown impression kind {other:?} (expected total, daily or faceted)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            other => Err(format!(
                "unknown sort order {other:?} (expected ascending or descending)"
            )),
        }
    }
}

/// Options for the paged episode listing.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeQuery {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    /// First page to fetch (1-based)
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub filter: String,
}

impl EpisodeQuery {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            start,
            end: None,
            page: 1,
            size: 50,
            sort_by: "releaseDate".to_string(),
            sort_order: SortOrder::default(),
            filter: String::new(),
        }
    }

    pub fn end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size.max(1);
        self
    }

    pub fn sort(mut self, sort_by: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = sort_by.into();
        self.sort_order = order;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Query parameters for `page`, in the order the dashboard sends them.
    pub(crate) fn params_for_page(&self, page: u32) -> Vec<(String, String)> {
        let [start, end] = crate::dates::date_params(self.start, self.end.unwrap_or(self.start));
        vec![
            (start.0.to_string(), start.1),
            (end.0.to_string(), end.1),
            ("page".to_string(), page.to_string()),
            ("size".to_string(), self.size.to_string()),
            ("sortBy".to_string(), self.sort_by.clone()),
            ("sortOrder".to_string(), self.sort_order.as_str().to_string()),
            ("filter".to_string(), self.filter.clone()),
        ]
    }
}

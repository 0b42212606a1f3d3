//! Query parameters for content entry lookups.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::request::Query;

/// A point in time for versioned content, given either preformatted or as a
/// date-time. Both forms end up as one ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum At {
    Formatted(String),
    Time(DateTime<Utc>),
}

impl At {
    /// ISO-8601, UTC, millisecond precision (`2024-01-02T03:04:05.000Z`).
    pub fn to_iso_string(&self) -> String {
        match self {
            At::Formatted(s) => s.clone(),
            At::Time(t) => t.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl From<&str> for At {
    fn from(value: &str) -> Self {
        At::Formatted(value.to_string())
    }
}

impl From<String> for At {
    fn from(value: String) -> Self {
        At::Formatted(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for At {
    fn from(value: DateTime<Tz>) -> Self {
        At::Time(value.with_timezone(&Utc))
    }
}

/// Filters for the entry endpoints. Combining `id`, `alias` and `type_id` in
/// one call is accepted by the service but its result is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryParams {
    pub id: Vec<String>,
    pub alias: Vec<String>,
    pub type_id: Option<String>,
    pub preview: bool,
    pub at: Option<At>,
    /// Page offset.
    pub offset: Option<u32>,
    /// Page size; the service accepts 1 to 50 and defaults to 20.
    pub size: Option<u32>,
}

impl EntryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn type_id(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn at(mut self, at: impl Into<At>) -> Self {
        self.at = Some(at.into());
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .push_list("id", self.id.iter().cloned())
            .push_list("alias", self.alias.iter().cloned());
        if self.preview {
            query.push("preview", "true");
        }
        if let Some(at) = &self.at {
            query.push("at", at.to_iso_string());
        }
        if let Some(type_id) = &self.type_id {
            query.push("typeId", type_id.as_str());
        }
        if let Some(offset) = self.offset {
            query.push("offset", offset.to_string());
        }
        if let Some(size) = self.size {
            query.push("size", size.to_string());
        }
        query
    }
}

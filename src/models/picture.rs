//! Picture metadata as stored in the `pictures` collection and as listed to clients.

use crate::time_ago;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `pictures` table, exactly as persisted.
///
/// `labels` holds a JSON array of strings.
#[derive(Clone, FromRow, Debug)]
pub struct PictureRow {
    pub name: String,
    pub labels: String,
    pub color: Option<String>,
    pub created: DateTime<Utc>,
}

/// Metadata of an uploaded picture, produced by the ingestion pipeline.
///
/// Keyed by `name`, which is also the object key in the pictures bucket.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PictureRecord {
    /// Object key in the pictures bucket.
    pub name: String,

    /// Content tags detected on the picture.
    pub labels: Vec<String>,

    /// Dominant color, e.g. `#FFAA00`.
    pub color: Option<String>,

    /// When the record was created.
    pub created: DateTime<Utc>,
}

/// One entry of the `GET /api/pictures` response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PictureSummary {
    pub name: String,
    pub labels: Vec<String>,
    pub color: Option<String>,
    /// Creation time relative to now, e.g. `3 hours ago`.
    pub created: String,
}

impl PictureSummary {
    pub fn from_record(record: PictureRecord, now: DateTime<Utc>) -> Self {
        Self {
            created: time_ago::from_now(record.created, now),
            name: record.name,
            labels: record.labels,
            color: record.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn summary_renders_created_relative_to_now() {
        let now = Utc::now();
        let record = PictureRecord {
            name: "cat.png".into(),
            labels: vec!["cat".into(), "animal".into()],
            color: Some("#FFAA00".into()),
            created: now - Duration::hours(3),
        };

        let summary = PictureSummary::from_record(record, now);

        assert_eq!(summary.name, "cat.png");
        assert_eq!(summary.labels, vec!["cat", "animal"]);
        assert_eq!(summary.color.as_deref(), Some("#FFAA00"));
        assert_eq!(summary.created, "3 hours ago");
    }

    #[test]
    fn summary_serializes_with_the_listing_field_names() {
        let summary = PictureSummary {
            name: "dog.jpg".into(),
            labels: vec!["dog".into()],
            color: None,
            created: "a day ago".into(),
        };

        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "name": "dog.jpg",
                "labels": ["dog"],
                "color": null,
                "created": "a day ago"
            })
        );
    }
}

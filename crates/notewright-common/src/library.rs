//! Dashboard helpers: search, paging of the recent list, and usage stats.

use chrono::{DateTime, Datelike, Utc};

use crate::types::Document;

/// Rows shown before "View all" is clicked.
pub const COLLAPSED_ROWS: usize = 5;

/// Generation quota displayed on the dashboard.
pub const GENERATIONS_TOTAL: u32 = 50;

/// Case-insensitive substring match over title, subtitle and subject.
/// A blank query keeps everything.
pub fn filter_documents<'a>(documents: &'a [Document], query: &str) -> Vec<&'a Document> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return documents.iter().collect();
    }
    documents
        .iter()
        .filter(|doc| {
            [&doc.title, &doc.subtitle, &doc.subject]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}

pub fn visible_rows<T>(rows: &[T], show_all: bool) -> &[T] {
    if show_all {
        rows
    } else {
        &rows[..rows.len().min(COLLAPSED_ROWS)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub generations_used: u32,
    pub generations_total: u32,
    /// Whole days since the newest document. Zero with no documents.
    pub days_since_latest: i64,
}

impl DashboardStats {
    /// `documents` must already be newest first.
    pub fn from_documents(documents: &[Document], now: DateTime<Utc>) -> Self {
        let days_since_latest = documents
            .first()
            .and_then(Document::created_at)
            .map(|created| (now - created).num_days())
            .unwrap_or(0);
        Self {
            generations_used: documents.len() as u32,
            generations_total: GENERATIONS_TOTAL,
            days_since_latest,
        }
    }

    pub fn usage_fraction(&self) -> f64 {
        if self.generations_total == 0 {
            return 0.0;
        }
        (self.generations_used as f64 / self.generations_total as f64).min(1.0)
    }
}

/// Short "how long ago" label for the recent list.
pub fn relative_age(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - created;
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 60 {
        format!("{minutes} minutes ago")
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{days} days ago")
    } else if days < 14 {
        "1 week ago".to_string()
    } else {
        format!("{}/{}/{}", created.month(), created.day(), created.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentId;
    use chrono::{Duration, TimeZone};

    fn doc(id: &str, title: &str, subject: &str, created: Option<DateTime<Utc>>) -> Document {
        Document {
            id: DocumentId::from(id),
            title: title.to_string(),
            subtitle: String::new(),
            subject: subject.to_string(),
            content: String::new(),
            date_created: created,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let docs = vec![
            doc("1", "Fourier Series", "Mathematics", None),
            doc("2", "Cell Division", "Biology", None),
            doc("3", "Entropy", "Physics", None),
        ];
        let hits = filter_documents(&docs, "  BIO ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "2");
        assert_eq!(filter_documents(&docs, "").len(), 3);
        assert!(filter_documents(&docs, "chemistry").is_empty());
    }

    #[test]
    fn collapsed_list_shows_five() {
        let rows: Vec<u32> = (0..8).collect();
        assert_eq!(visible_rows(&rows, false).len(), 5);
        assert_eq!(visible_rows(&rows, true).len(), 8);
        assert_eq!(visible_rows(&rows[..2], false).len(), 2);
    }

    #[test]
    fn stats_from_newest_document() {
        let docs = vec![
            doc("2", "b", "", Some(now() - Duration::days(3) - Duration::hours(2))),
            doc("1", "a", "", Some(now() - Duration::days(9))),
        ];
        let stats = DashboardStats::from_documents(&docs, now());
        assert_eq!(stats.generations_used, 2);
        assert_eq!(stats.generations_total, 50);
        assert_eq!(stats.days_since_latest, 3);

        let empty = DashboardStats::from_documents(&[], now());
        assert_eq!(empty.generations_used, 0);
        assert_eq!(empty.days_since_latest, 0);
    }

    #[test]
    fn relative_age_bands() {
        let at = |d: Duration| relative_age(now() - d, now());
        assert_eq!(at(Duration::minutes(5)), "5 minutes ago");
        assert_eq!(at(Duration::hours(3)), "3 hours ago");
        assert_eq!(at(Duration::hours(30)), "Yesterday");
        assert_eq!(at(Duration::days(4)), "4 days ago");
        assert_eq!(at(Duration::days(10)), "1 week ago");
        assert_eq!(at(Duration::days(30)), "5/21/2024");
    }
}

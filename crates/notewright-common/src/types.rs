use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use smol_str::{SmolStr, ToSmolStr};
use std::fmt;

/// Identifier of a generated document.
///
/// The generation service hands out integer ids but the public contract is a
/// string, so both are accepted on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentId(pub SmolStr);

impl DocumentId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_smolstr())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Str(String),
        }
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(i) => Self(i.to_smolstr()),
            RawId::Str(s) => Self(s.into()),
        })
    }
}

/// A generated document as served by `/api/articles`.
///
/// Read-only on the client: fetched on viewer entry and dropped on navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub subject: String,
    /// Semantic HTML fragment produced by the generator.
    #[serde(default)]
    pub content: String,
    /// Unparseable values become `None` rather than failing the document.
    #[serde(alias = "createdAt", default, deserialize_with = "lenient_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
}

impl Document {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.date_created
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled concept"
        } else {
            &self.title
        }
    }
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    })
}

/// Parse the timestamp shapes the service has been seen to send.
///
/// RFC 3339 and other offset forms are converted to UTC. Naive timestamps,
/// with `T` or a space between date and time, are taken as UTC, and a bare
/// date means its midnight.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    let naive = raw.strip_suffix(['Z', 'z']).unwrap_or(raw);
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Body of a successful `POST /api/generate-article`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub id: DocumentId,
}

/// Error body shape used by the service for non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// `detail` is a plain string for handled errors and a list of objects for
    /// request validation failures.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_from_backend_row() {
        let json = r#"{
            "id": 12,
            "date_created": "2024-11-02T09:15:27.418000",
            "title": "Fourier Series",
            "subtitle": "Waves from circles",
            "subject": "Mathematics",
            "content": "<section><p>$f(x)$</p></section>"
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id.as_str(), "12");
        assert_eq!(doc.subject, "Mathematics");
        let created = doc.created_at().unwrap();
        assert_eq!(created.format("%Y-%m-%d").to_string(), "2024-11-02");
    }

    #[test]
    fn document_accepts_string_id_and_camel_case_date() {
        let json = r#"{"id": "abc", "createdAt": "2024-01-05T00:00:00", "content": ""}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, DocumentId::from("abc"));
        assert!(doc.date_created.is_some());
        assert_eq!(doc.display_title(), "Untitled concept");
    }

    #[test]
    fn timestamps_in_every_shape_the_service_sends() {
        let expected = "2024-01-05T10:00:00Z";
        for raw in [
            "2024-01-05T10:00:00Z",
            "2024-01-05T10:00:00.000Z",
            "2024-01-05T12:00:00+02:00",
            "2024-01-05 12:00:00+02:00",
            "2024-01-05T10:00:00",
            "2024-01-05 10:00:00",
            "2024-01-05T10:00:00.123456",
            "2024-01-05T10:00",
        ] {
            let parsed = parse_timestamp(raw).unwrap_or_else(|| panic!("{raw} did not parse"));
            assert_eq!(
                parsed.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                expected,
                "{raw}"
            );
        }
        assert_eq!(
            parse_timestamp("2024-01-05").map(|d| d.to_rfc3339()),
            Some("2024-01-05T00:00:00+00:00".to_string())
        );
        assert_eq!(parse_timestamp("last tuesday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn one_odd_date_does_not_fail_the_list() {
        let json = r#"[
            {"id": 1, "createdAt": "2024-01-05T00:00:00Z", "content": ""},
            {"id": 2, "date_created": "2024-01-05 10:00:00", "content": ""},
            {"id": 3, "date_created": "soon", "content": ""},
            {"id": 4, "date_created": null, "content": ""},
            {"id": 5, "createdAt": 1704412800000, "content": ""},
            {"id": 6, "content": ""}
        ]"#;
        let docs: Vec<Document> = serde_json::from_str(json).unwrap();
        assert_eq!(docs.len(), 6);
        let day = |doc: &Document| doc.created_at().map(|d| d.format("%Y-%m-%d").to_string());
        assert_eq!(day(&docs[0]).as_deref(), Some("2024-01-05"));
        assert_eq!(day(&docs[1]).as_deref(), Some("2024-01-05"));
        assert_eq!(docs[2].created_at(), None);
        assert_eq!(docs[3].created_at(), None);
        assert_eq!(day(&docs[4]).as_deref(), Some("2024-01-05"));
        assert_eq!(docs[5].created_at(), None);
    }

    #[test]
    fn generate_response_with_numeric_id() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"id": 41}"#).unwrap();
        assert_eq!(resp.id.to_string(), "41");
    }

    #[test]
    fn error_body_detail_variants() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Article not found"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("Article not found"));
        let body: ErrorBody = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert_eq!(body.message(), None);
    }
}

//! Event types for the Events API
//!
//! Wire types for events, pages and errors. All types use camelCase JSON
//! serialization; dates travel as `YYYY-MM-DD`.

use crate::error::FieldError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub location: String,
}

/// A validated event that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub location: String,
}

impl NewEvent {
    /// Attach the identifier assigned by the store
    pub fn with_id(self, id: i64) -> Event {
        Event {
            id,
            name: self.name,
            description: self.description,
            date: self.date,
            location: self.location,
        }
    }
}

/// Request body for creating an event.
///
/// Every field is optional at the wire level so that missing fields are
/// reported by validation instead of by the JSON decoder. A client-sent
/// `id` is accepted and ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Column an event listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    Name,
    Description,
    #[default]
    Date,
    Location,
}

impl SortField {
    /// SQL column backing this field
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Description => "description",
            Self::Date => "date",
            Self::Location => "location",
        }
    }

    /// Whether the column holds free text, ordered case-insensitively
    pub fn is_text(self) -> bool {
        matches!(self, Self::Name | Self::Description | Self::Location)
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            "date" => Ok(Self::Date),
            "location" => Ok(Self::Location),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

/// Ordering for an event listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Parse a `field[,asc|desc]` expression
    pub fn parse(expr: &str) -> Result<Self, String> {
        let mut parts = expr.split(',').map(str::trim);
        let field = parts.next().unwrap_or_default().parse()?;
        let direction = match parts.next() {
            Some(dir) if !dir.is_empty() => dir.parse()?,
            _ => SortDirection::Asc,
        };
        if parts.next().is_some() {
            return Err(format!("invalid sort expression: {}", expr));
        }
        Ok(Self { field, direction })
    }
}

/// Filter, order and page selection for an event listing
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    pub sort: Sort,
    /// 0-based page index
    pub page: u32,
    pub size: u32,
}

/// A page of results plus the metadata a client needs to paginate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    /// 0-based page index
    pub number: u32,
    pub size: u32,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T: Serialize> Page<T> {
    pub fn new(content: Vec<T>, page: u32, size: u32, total_elements: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(u64::from(size))
        };
        let number_of_elements = content.len();

        Self {
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            number: page,
            size,
            number_of_elements,
            first: page == 0,
            last: u64::from(page) + 1 >= total_pages,
        }
    }
}

/// Response body for a successful delete
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ApiError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
                fields: Vec::new(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::new("INVALID_DATE", message)
    }

    pub fn validation(fields: Vec<FieldError>) -> Self {
        let mut err = Self::new("VALIDATION_FAILED", "Request validation failed");
        err.error.fields = fields;
        err
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_event_serialization() {
        let event = Event {
            id: 7,
            name: "RustConf".to_string(),
            description: None,
            date: date(2030, 9, 12),
            location: "Montreal".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["date"], "2030-09-12");
        assert!(json["description"].is_null());
    }

    #[test]
    fn test_create_request_missing_fields() {
        let req: CreateEventRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_none());
        assert!(req.date.is_none());
        assert!(req.location.is_none());
    }

    #[test]
    fn test_create_request_rejects_bad_date() {
        let result = serde_json::from_str::<CreateEventRequest>(r#"{"date": "12/09/2030"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_sort_field_from_str() {
        assert_eq!("date".parse::<SortField>().unwrap(), SortField::Date);
        assert_eq!("location".parse::<SortField>().unwrap(), SortField::Location);
        assert!("date; DROP TABLE events".parse::<SortField>().is_err());
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(Sort::parse("name").unwrap(), Sort::asc(SortField::Name));
        assert_eq!(
            Sort::parse("date,DESC").unwrap(),
            Sort {
                field: SortField::Date,
                direction: SortDirection::Desc
            }
        );
        assert_eq!(Sort::parse("date,").unwrap(), Sort::asc(SortField::Date));
        assert!(Sort::parse("date,sideways").is_err());
        assert!(Sort::parse("date,asc,extra").is_err());
        assert!(Sort::parse("").is_err());
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2], 0, 2, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.number_of_elements, 2);
        assert!(page.first);
        assert!(!page.last);

        let last = Page::new(vec![5], 2, 2, 5);
        assert!(last.last);
        assert!(!last.first);

        let empty: Page<i32> = Page::new(vec![], 0, 5, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.empty);
        assert!(empty.last);
    }

    #[test]
    fn test_page_serialization() {
        let json = serde_json::to_value(Page::new(vec!["a"], 1, 1, 3)).unwrap();
        assert_eq!(json["content"][0], "a");
        assert_eq!(json["totalElements"], 3);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["number"], 1);
        assert_eq!(json["numberOfElements"], 1);
    }

    #[test]
    fn test_api_error_validation_fields() {
        let err = ApiError::validation(vec![FieldError::new("name", "Event name is required")]);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(json["error"]["fields"][0]["field"], "name");
    }

    #[test]
    fn test_api_error_not_found_omits_fields() {
        let json = serde_json::to_value(ApiError::not_found("Event with ID 9 not found")).unwrap();
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert!(json["error"].get("fields").is_none());
    }
}

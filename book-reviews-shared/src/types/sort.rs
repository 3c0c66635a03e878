use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SortError {
    #[error("Unknown sort property: {0}")]
    UnknownProperty(String),
    #[error("Unknown sort direction: {0}")]
    UnknownDirection(String),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Properties the report search can be ordered by.
///
/// Anything else is rejected instead of being passed through to the query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReportSortField {
    Id,
    CreatedDate,
    Reason,
    ReportState,
}

impl ReportSortField {
    pub fn from_property(property: &str) -> Result<Self, SortError> {
        match property {
            "id" => Ok(ReportSortField::Id),
            "createdDate" => Ok(ReportSortField::CreatedDate),
            "reason" => Ok(ReportSortField::Reason),
            "reportState" => Ok(ReportSortField::ReportState),
            other => Err(SortError::UnknownProperty(other.to_string())),
        }
    }

    pub fn property(&self) -> &'static str {
        match self {
            ReportSortField::Id => "id",
            ReportSortField::CreatedDate => "createdDate",
            ReportSortField::Reason => "reason",
            ReportSortField::ReportState => "reportState",
        }
    }
}

/// A single `property,direction` ordering term.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    pub field: ReportSortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: ReportSortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Parses `property` or `property,asc|desc`. The direction is case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, SortError> {
        let mut parts = raw.splitn(2, ',').map(str::trim);
        let property = parts.next().unwrap_or_default();
        let field = ReportSortField::from_property(property)?;
        let order = match parts.next() {
            None | Some("") => SortOrder::Asc,
            Some(direction) if direction.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            Some(direction) if direction.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            Some(direction) => return Err(SortError::UnknownDirection(direction.to_string())),
        };
        Ok(Self { field, order })
    }

    /// Parses every `sort` parameter, failing on the first invalid one.
    pub fn parse_all<'a>(raw: impl IntoIterator<Item = &'a str>) -> Result<Vec<Self>, SortError> {
        raw.into_iter().map(Self::parse).collect()
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        write!(f, "{},{}", self.field.property(), direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_direction() {
        assert_eq!(
            SortSpec::parse("createdDate,DESC").unwrap(),
            SortSpec::new(ReportSortField::CreatedDate, SortOrder::Desc)
        );
        assert_eq!(
            SortSpec::parse("reason").unwrap(),
            SortSpec::new(ReportSortField::Reason, SortOrder::Asc)
        );
    }

    #[test]
    fn test_unknown_property_fails_closed() {
        assert_eq!(
            SortSpec::parse("password,asc"),
            Err(SortError::UnknownProperty("password".to_string()))
        );
        assert_eq!(
            SortSpec::parse("id,sideways"),
            Err(SortError::UnknownDirection("sideways".to_string()))
        );
    }

    #[test]
    fn test_parse_all_stops_at_first_error() {
        let parsed = SortSpec::parse_all(["id,desc", "reason"]).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(SortSpec::parse_all(["id", "nope"]).is_err());
    }

    #[test]
    fn test_display_matches_parse_input() {
        let spec = SortSpec::new(ReportSortField::ReportState, SortOrder::Desc);
        assert_eq!(spec.to_string(), "reportState,desc");
    }
}

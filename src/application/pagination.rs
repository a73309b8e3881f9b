//! Limit/offset pagination helpers.

use thiserror::Error;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const DEFAULT_PAGE_OFFSET: u32 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid limit `{0}`")]
    InvalidLimit(String),
    #[error("invalid offset `{0}`")]
    InvalidOffset(String),
}

/// A requested window over the document list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetPage {
    pub limit: u32,
    pub offset: u32,
}

impl Default for OffsetPage {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: DEFAULT_PAGE_OFFSET,
        }
    }
}

impl OffsetPage {
    /// Parse raw query values. Absent or blank values take the defaults.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Result<Self, PaginationError> {
        let limit = match non_blank(limit) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| PaginationError::InvalidLimit(raw.to_string()))?,
            None => DEFAULT_PAGE_LIMIT,
        };
        let offset = match non_blank(offset) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| PaginationError::InvalidOffset(raw.to_string()))?,
            None => DEFAULT_PAGE_OFFSET,
        };

        Ok(Self { limit, offset })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

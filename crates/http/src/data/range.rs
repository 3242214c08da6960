//! Byte ranges of the `Range` and `Content-Range` headers.

use tracing::warn;

use crate::error::ParseError;
use crate::utils::ensure;

/// A byte range, anchored either at `index` or at the end of the entity.
///
/// `index` is a position from the start, or [`Range::INDEX_LAST`] for a suffix range;
/// `size` is a byte count, or [`Range::SIZE_MAX`] for a range reaching the end.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    index: i64,
    size: i64,
}

impl Range {
    /// Index marking a range counted from the end of the entity.
    pub const INDEX_LAST: i64 = -1;
    /// Size marking a range running to the end of the entity.
    pub const SIZE_MAX: i64 = -1;

    const BYTES_UNIT: &'static str = "bytes";

    pub fn new(index: i64, size: i64) -> Self {
        Self { index, size }
    }

    /// The whole entity.
    pub fn full() -> Self {
        Self::new(0, Self::SIZE_MAX)
    }

    /// The last `size` bytes.
    pub fn last(size: i64) -> Self {
        Self::new(Self::INDEX_LAST, size)
    }

    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// Whether the byte at `position` of an entity of `total_size` bytes lies in this range.
    pub fn is_included(&self, position: i64, total_size: i64) -> bool {
        if position < 0 || position >= total_size {
            return false;
        }

        if self.index == Self::INDEX_LAST {
            // anchored at the end: the last `size` bytes
            self.size > 0 && position >= total_size.saturating_sub(self.size)
        } else {
            position >= self.index
                && (self.size == Self::SIZE_MAX || self.index.checked_add(self.size).is_none_or(|end| position < end))
        }
    }

    /// Resolves the range against an entity size into an inclusive `(first, last)` pair.
    ///
    /// Returns `None` when the range selects nothing.
    pub fn bounds(&self, total_size: i64) -> Option<(i64, i64)> {
        if total_size <= 0 {
            return None;
        }

        let (first, last) = if self.index == Self::INDEX_LAST {
            (total_size.saturating_sub(self.size).max(0), total_size - 1)
        } else if self.size == Self::SIZE_MAX {
            (self.index, total_size - 1)
        } else {
            (self.index, self.index.saturating_add(self.size.saturating_sub(1)).min(total_size - 1))
        };

        (self.size != 0 && first <= last && first < total_size).then_some((first, last))
    }

    /// Renders the `Content-Range` value of this range for an entity of `total_size` bytes.
    pub fn content_range(&self, total_size: i64) -> String {
        match self.bounds(total_size) {
            Some((first, last)) => format!("{} {first}-{last}/{total_size}", Self::BYTES_UNIT),
            None => format!("{} */{total_size}", Self::BYTES_UNIT),
        }
    }

    /// Parses a `Range` header value, logging and discarding it entirely when malformed.
    pub fn parse_header(value: &str) -> Vec<Range> {
        match Self::try_parse_header(value) {
            Ok(ranges) => ranges,
            Err(e) => {
                warn!(cause = %e, "unable to parse range header");
                vec![]
            }
        }
    }

    pub fn try_parse_header(value: &str) -> Result<Vec<Range>, ParseError> {
        let value = value.trim();
        let specs = value
            .strip_prefix(Self::BYTES_UNIT)
            .and_then(|rest| rest.trim_start().strip_prefix('='))
            .ok_or_else(|| ParseError::invalid_range(format!("only byte ranges are supported: {value}")))?;

        let mut ranges = vec![];
        for spec in specs.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (first, last) =
                spec.split_once('-').ok_or_else(|| ParseError::invalid_range(format!("missing '-' in {spec}")))?;
            let first = first.trim();
            let last = last.trim();

            let range = if first.is_empty() {
                let size = parse_position(last)?;
                Range::last(size)
            } else if last.is_empty() {
                Range::new(parse_position(first)?, Self::SIZE_MAX)
            } else {
                let first = parse_position(first)?;
                let last = parse_position(last)?;
                ensure!(first <= last, ParseError::invalid_range(format!("reversed range {spec}")));
                // a last position of i64::MAX can only mean the end of the entity
                Range::new(first, (last - first).checked_add(1).unwrap_or(Self::SIZE_MAX))
            };
            ranges.push(range);
        }

        ensure!(!ranges.is_empty(), ParseError::invalid_range("empty range set"));
        Ok(ranges)
    }

    /// Formats ranges back into a `Range` header value.
    pub fn format_header(ranges: &[Range]) -> String {
        let specs = ranges
            .iter()
            .map(|range| {
                if range.index == Self::INDEX_LAST {
                    format!("-{}", range.size)
                } else if range.size == Self::SIZE_MAX {
                    format!("{}-", range.index)
                } else {
                    format!("{}-{}", range.index, range.index.saturating_add(range.size.saturating_sub(1)))
                }
            })
            .collect::<Vec<_>>();
        format!("{}={}", Self::BYTES_UNIT, specs.join(","))
    }
}

fn parse_position(s: &str) -> Result<i64, ParseError> {
    s.parse::<i64>()
        .ok()
        .filter(|v| *v >= 0)
        .ok_or_else(|| ParseError::invalid_range(format!("invalid position {s}")))
}

//! Quality-weighted preferences of the `Accept*` request headers.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing::warn;

use crate::data::{Form, Metadata, Parameter};
use crate::error::ParseError;
use crate::utils::lazy_mut;

/// A client preference for some metadata, weighted by a quality value in `[0, 1]`.
///
/// The extension parameters are created on first access; concurrent first readers all
/// observe the same instance.
#[derive(Debug, Clone)]
pub struct Preference<T> {
    metadata: T,
    quality: f32,
    parameters: OnceCell<Form>,
}

impl<T> Preference<T> {
    pub const DEFAULT_QUALITY: f32 = 1.0;

    /// Creates a preference; the quality is clamped into `[0, 1]`.
    pub fn new(metadata: T, quality: f32) -> Self {
        Self { metadata, quality: clamp_quality(quality), parameters: OnceCell::new() }
    }

    pub fn with_parameters(metadata: T, quality: f32, parameters: Form) -> Self {
        Self { metadata, quality: clamp_quality(quality), parameters: OnceCell::with_value(parameters) }
    }

    pub fn metadata(&self) -> &T {
        &self.metadata
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn parameters(&self) -> &Form {
        self.parameters.get_or_init(Form::new)
    }

    pub fn parameters_mut(&mut self) -> &mut Form {
        lazy_mut(&mut self.parameters, Form::new)
    }

    /// Orders preferences by descending quality; equal qualities keep their declaration order.
    pub fn sort_by_quality(preferences: &mut [Preference<T>]) {
        preferences.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    }

    fn same_parameters(&self, other: &Self) -> bool {
        match (self.parameters.get(), other.parameters.get()) {
            (None, None) => true,
            (Some(form), None) | (None, Some(form)) => form.is_empty(),
            (Some(a), Some(b)) => a == b,
        }
    }
}

impl<T> Preference<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    /// Parses an `Accept`-style header (`a;q=0.5, b;level=1, c`).
    ///
    /// Parameters before `q` belong to the metadata itself, parameters after it are kept
    /// as preference parameters. Unparsable members are logged and skipped; an unparsable
    /// quality is logged and treated as `1`.
    pub fn parse_header(header: &str) -> Vec<Preference<T>> {
        header.split(',').map(str::trim).filter(|s| !s.is_empty()).filter_map(Self::parse_member).collect()
    }

    fn parse_member(member: &str) -> Option<Preference<T>> {
        let mut parts = member.split(';').map(str::trim);
        let mut metadata = parts.next().unwrap_or_default().to_string();
        let mut quality = Self::DEFAULT_QUALITY;
        let mut parameters = Form::new();
        let mut after_quality = false;

        for part in parts.filter(|p| !p.is_empty()) {
            let (name, value) = match part.split_once('=') {
                Some((name, value)) => (name.trim(), Some(value.trim())),
                None => (part, None),
            };

            if !after_quality && name.eq_ignore_ascii_case("q") {
                after_quality = true;
                quality = match parse_quality(value) {
                    Ok(q) => q,
                    Err(e) => {
                        warn!(cause = %e, member, "assuming a quality of 1");
                        Self::DEFAULT_QUALITY
                    }
                };
            } else if after_quality {
                parameters.push(match value {
                    Some(value) => Parameter::new(name, value.trim_matches('"')),
                    None => Parameter::flag(name),
                });
            } else {
                metadata.push(';');
                metadata.push_str(part);
            }
        }

        match metadata.parse::<T>() {
            Ok(metadata) => Some(Preference::with_parameters(metadata, quality, parameters)),
            Err(e) => {
                warn!(cause = %e, member, "unable to parse preference metadata");
                None
            }
        }
    }
}

impl<T: Metadata> Preference<T> {
    /// Quality the preferences grant to `candidate`, using the most specific including
    /// preference (first declared on ties). `None` when no preference covers it.
    pub fn quality_of(preferences: &[Preference<T>], candidate: &T) -> Option<f32> {
        let mut best: Option<&Preference<T>> = None;
        for preference in preferences.iter().filter(|p| p.metadata.includes(candidate)) {
            if best.is_none_or(|b| preference.metadata.specificity() > b.metadata.specificity()) {
                best = Some(preference);
            }
        }
        best.map(|p| p.quality)
    }

    /// Picks the candidate with the highest positive quality; ties go to the earlier candidate.
    pub fn best_match<'a>(preferences: &[Preference<T>], candidates: &'a [T]) -> Option<&'a T> {
        let mut best: Option<(&'a T, f32)> = None;
        for candidate in candidates {
            let Some(quality) = Self::quality_of(preferences, candidate) else {
                continue;
            };
            if quality > 0.0 && best.is_none_or(|(_, q)| quality > q) {
                best = Some((candidate, quality));
            }
        }
        best.map(|(candidate, _)| candidate)
    }
}

impl<T: PartialEq> PartialEq for Preference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata && self.quality == other.quality && self.same_parameters(other)
    }
}

impl<T: fmt::Display> fmt::Display for Preference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.metadata)?;
        if self.quality < Self::DEFAULT_QUALITY {
            write!(f, ";q={}", self.quality)?;
        }
        if let Some(parameters) = self.parameters.get() {
            for parameter in parameters {
                write!(f, ";{parameter}")?;
            }
        }
        Ok(())
    }
}

fn parse_quality(value: Option<&str>) -> Result<f32, ParseError> {
    let value = value.unwrap_or_default();
    value.parse::<f32>().ok().filter(|q| q.is_finite()).ok_or_else(|| ParseError::invalid_quality(value))
}

fn clamp_quality(quality: f32) -> f32 {
    if quality.is_nan() { Preference::<()>::DEFAULT_QUALITY } else { quality.clamp(0.0, 1.0) }
}

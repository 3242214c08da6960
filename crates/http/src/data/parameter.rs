//! Name/value parameters and ordered forms of them.
//!
//! A [`Form`] is the ordered sequence behind query strings (`a=1&b=2`), matrix
//! parameters (`a=1;b=2`) and the parameters of preferences and challenges.

use std::borrow::Cow;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::de::DeserializeOwned;

use crate::error::ParseError;

/// Characters left untouched by form encoding, matching `application/x-www-form-urlencoded`.
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'*');

/// A named value; the value may be absent (`flag` rather than `flag=`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: String,
    value: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: Some(value.into()) }
    }

    /// A parameter carrying only a name.
    pub fn flag(name: impl Into<String>) -> Self {
        Self { name: name.into(), value: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Percent-encodes the parameter as `name[=value]`.
    pub fn encode(&self) -> String {
        match &self.value {
            Some(value) => format!("{}={}", encode(&self.name), encode(value)),
            None => encode(&self.name),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

/// An ordered sequence of parameters; names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Form {
    parameters: Vec<Parameter>,
}

impl Form {
    /// Separator of query strings.
    pub const QUERY_SEPARATOR: char = '&';
    /// Separator of matrix parameters.
    pub const MATRIX_SEPARATOR: char = ';';

    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a percent-encoded parameter string split on `separator`.
    pub fn parse(text: &str, separator: char) -> Self {
        text.split(separator)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((name, value)) => Parameter::new(decode(name), decode(value)),
                None => Parameter::flag(decode(part)),
            })
            .collect()
    }

    /// Percent-encodes every parameter and joins them with `separator`.
    pub fn encode(&self, separator: char) -> String {
        let mut encoded = String::new();
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                encoded.push(separator);
            }
            encoded.push_str(&parameter.encode());
        }
        encoded
    }

    /// Encodes as a query string.
    pub fn query_string(&self) -> String {
        self.encode(Self::QUERY_SEPARATOR)
    }

    /// Encodes as matrix parameters.
    pub fn matrix_string(&self) -> String {
        self.encode(Self::MATRIX_SEPARATOR)
    }

    /// Decodes the form into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_urlencoded::from_str(&self.query_string()).map_err(ParseError::invalid_form)
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.parameters.push(Parameter::new(name, value));
        self
    }

    pub fn push(&mut self, parameter: Parameter) -> &mut Self {
        self.parameters.push(parameter);
        self
    }

    /// Replaces the value of the first parameter named `name` and drops the others,
    /// or appends a new parameter when none exists.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        let mut found = false;
        self.parameters.retain_mut(|parameter| {
            if parameter.name != name {
                return true;
            }
            if found {
                return false;
            }
            found = true;
            parameter.value = Some(value.clone());
            true
        });
        if !found {
            self.parameters.push(Parameter::new(name, value));
        }
        self
    }

    /// Removes every parameter named `name`, returning whether any existed.
    pub fn remove_all(&mut self, name: &str) -> bool {
        let before = self.parameters.len();
        self.parameters.retain(|parameter| parameter.name != name);
        before != self.parameters.len()
    }

    pub fn first(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.first(name).and_then(Parameter::value)
    }

    /// Like [`Form::first_value`] but comparing names case-insensitively.
    pub fn first_value_ignore_case(&self, name: &str) -> Option<&str> {
        self.parameters.iter().find(|parameter| parameter.name.eq_ignore_ascii_case(name)).and_then(Parameter::value)
    }

    pub fn values(&self, name: &str) -> Vec<&str> {
        self.parameters.iter().filter(|parameter| parameter.name == name).filter_map(Parameter::value).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = vec![];
        for parameter in &self.parameters {
            if !names.contains(&parameter.name.as_str()) {
                names.push(&parameter.name);
            }
        }
        names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl FromIterator<Parameter> for Form {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self { parameters: iter.into_iter().collect() }
    }
}

impl Extend<Parameter> for Form {
    fn extend<I: IntoIterator<Item = Parameter>>(&mut self, iter: I) {
        self.parameters.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Form {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

impl IntoIterator for Form {
    type Item = Parameter;
    type IntoIter = std::vec::IntoIter<Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.into_iter()
    }
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, FORM_ENCODE_SET).to_string().replace("%20", "+")
}

fn decode(s: &str) -> String {
    let spaced: Cow<'_, str> = if s.contains('+') { Cow::Owned(s.replace('+', " ")) } else { Cow::Borrowed(s) };
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

//! `text/uri-list` style reference lists.

use std::io::BufRead;

use http::Uri;
use mime::Mime;
use tracing::warn;

use crate::error::{ParseError, RepresentationError};
use crate::representation::{Representation, StringRepresentation};

/// An ordered list of URI references with an optional identifier for the list itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceList {
    identifier: Option<Uri>,
    references: Vec<Uri>,
}

impl ReferenceList {
    pub fn new(identifier: Option<Uri>) -> Self {
        Self { identifier, references: vec![] }
    }

    /// Parses a line oriented listing.
    ///
    /// A leading `#` line carries the list identifier; later `#` lines are comments. Blank
    /// lines are skipped and invalid references are logged and skipped.
    pub fn parse_text(text: &str) -> Self {
        Self::parse_lines(text.lines())
    }

    /// Reads the listing from an entity.
    pub fn from_representation(entity: &dyn Representation) -> Result<Self, RepresentationError> {
        let lines = entity.reader()?.lines().collect::<Result<Vec<_>, _>>()?;
        Ok(Self::parse_lines(lines.iter().map(String::as_str)))
    }

    fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut list = Self::default();
        let mut lines = lines.into_iter().map(str::trim).peekable();

        if let Some(identifier) = lines.peek().copied().and_then(|line| line.strip_prefix('#')) {
            list.identifier = parse_reference(identifier.trim());
            lines.next();
        }

        for line in lines.filter(|line| !line.is_empty() && !line.starts_with('#')) {
            if let Some(reference) = parse_reference(line) {
                list.references.push(reference);
            }
        }
        list
    }

    pub fn identifier(&self) -> Option<&Uri> {
        self.identifier.as_ref()
    }

    pub fn set_identifier(&mut self, identifier: Option<Uri>) {
        self.identifier = identifier;
    }

    pub fn references(&self) -> &[Uri] {
        &self.references
    }

    pub fn add(&mut self, reference: Uri) -> &mut Self {
        self.references.push(reference);
        self
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// One reference per line, preceded by `#identifier` when the list has one.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        if let Some(identifier) = &self.identifier {
            text.push_str(&format!("#{identifier}\n"));
        }
        for reference in &self.references {
            text.push_str(&format!("{reference}\n"));
        }
        text
    }

    /// An HTML page listing every reference as a link.
    pub fn to_html(&self) -> String {
        let title = self.identifier.as_ref().map(|identifier| escape_html(&identifier.to_string()));
        let mut html = String::from("<html><head>");
        if let Some(title) = &title {
            html.push_str(&format!("<title>{title}</title>"));
        }
        html.push_str("</head><body>");
        if let Some(title) = &title {
            html.push_str(&format!("<h2>{title}</h2>"));
        }
        html.push_str("<ul>");
        for reference in &self.references {
            let reference = escape_html(&reference.to_string());
            html.push_str(&format!("<li><a href=\"{reference}\">{reference}</a></li>"));
        }
        html.push_str("</ul></body></html>");
        html
    }

    pub fn text_representation(&self) -> StringRepresentation {
        StringRepresentation::new(self.to_text(), uri_list())
    }

    pub fn web_representation(&self) -> StringRepresentation {
        StringRepresentation::new(self.to_html(), mime::TEXT_HTML_UTF_8)
    }
}

fn parse_reference(value: &str) -> Option<Uri> {
    match value.parse::<Uri>() {
        Ok(uri) => Some(uri),
        Err(e) => {
            warn!(cause = %e, "{}", ParseError::invalid_reference(value));
            None
        }
    }
}

fn uri_list() -> Mime {
    "text/uri-list".parse().unwrap_or(mime::TEXT_PLAIN)
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

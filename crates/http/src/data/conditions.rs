use http::Method;

use crate::data::{Status, Tag};

/// Entity-tag preconditions of a request (`If-Match`, `If-None-Match`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions {
    match_tags: Vec<Tag>,
    none_match_tags: Vec<Tag>,
}

impl Conditions {
    pub fn new(match_tags: Vec<Tag>, none_match_tags: Vec<Tag>) -> Self {
        Self { match_tags, none_match_tags }
    }

    pub fn match_tags(&self) -> &[Tag] {
        &self.match_tags
    }

    pub fn none_match_tags(&self) -> &[Tag] {
        &self.none_match_tags
    }

    pub fn match_tags_mut(&mut self) -> &mut Vec<Tag> {
        &mut self.match_tags
    }

    pub fn none_match_tags_mut(&mut self) -> &mut Vec<Tag> {
        &mut self.none_match_tags
    }

    pub fn has_some(&self) -> bool {
        !self.match_tags.is_empty() || !self.none_match_tags.is_empty()
    }

    /// Evaluates the preconditions against the tag of the current entity, if any.
    ///
    /// `If-Match` uses the strong comparison and fails with 412. `If-None-Match` uses the
    /// weak comparison and yields 304 for GET/HEAD, 412 otherwise. `None` means the
    /// request may proceed.
    pub fn status(&self, method: &Method, entity_tag: Option<&Tag>) -> Option<Status> {
        if !self.match_tags.is_empty() {
            let matched = entity_tag.is_some_and(|current| {
                self.match_tags.iter().any(|tag| tag.is_all() || (!current.is_weak() && tag.equals(current, true)))
            });
            if !matched {
                return Some(Status::CLIENT_ERROR_PRECONDITION_FAILED);
            }
        }

        if !self.none_match_tags.is_empty() {
            let matched = entity_tag.is_some_and(|current| {
                self.none_match_tags.iter().any(|tag| tag.is_all() || tag.equals(current, false))
            });
            if matched {
                return if method == Method::GET || method == Method::HEAD {
                    Some(Status::REDIRECTION_NOT_MODIFIED)
                } else {
                    Some(Status::CLIENT_ERROR_PRECONDITION_FAILED)
                };
            }
        }

        None
    }
}

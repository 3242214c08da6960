//! Semantic HTTP value types.
//!
//! Every type here is immutable once built, apart from the documented mutators, and can be
//! shared across threads. Parsers follow one convention: malformed input is logged at `warn`
//! level and produces `None` or an empty collection instead of an error.

mod cache;
mod challenge;
mod client_info;
mod conditions;
mod cookie;
mod digest;
mod encoding;
mod metadata;
mod parameter;
mod preference;
mod range;
mod reference_list;
mod status;
mod tag;

pub use cache::{CacheDirective, Warning};
pub use challenge::{AuthenticationInfo, ChallengeMessage, ChallengeRequest, ChallengeScheme};
pub use client_info::ClientInfo;
pub use conditions::Conditions;
pub use cookie::{Cookie, CookieSetting};
pub use digest::{Digest, DigestAlgorithm};
pub use encoding::Encoding;
pub use metadata::{CharacterSet, Language, Metadata};
pub use parameter::{Form, Parameter};
pub use preference::Preference;
pub use range::Range;
pub use reference_list::ReferenceList;
pub use status::Status;
pub use tag::Tag;

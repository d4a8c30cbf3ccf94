//! Discriminator codes and fullnames.
//!
//! Every thing the server returns carries a short `kind` code. Things that
//! have an id can also be addressed by their *fullname*, which is the kind
//! code joined to the base-36 id with an underscore (`t2_1w72`).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

pub const COMMENT: &str = "t1";
pub const REDDITOR: &str = "t2";
pub const SUBMISSION: &str = "t3";
pub const MESSAGE: &str = "t4";
pub const SUBREDDIT: &str = "t5";
pub const MORE: &str = "more";
pub const LISTING: &str = "Listing";
pub const USER_LIST: &str = "UserList";

/// Error returned when a string is not a well-formed fullname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullnameError(pub String);

impl fmt::Display for FullnameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid fullname {:?}; expected t<digit>_<base36 id>",
            self.0
        )
    }
}

impl std::error::Error for FullnameError {}

/// A parsed fullname such as `t3_abc123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fullname {
    pub kind: String,
    pub id: String,
}

impl Fullname {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

/// Formats as `<kind>_<id>`.
impl fmt::Display for Fullname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind, self.id)
    }
}

impl FromStr for Fullname {
    type Err = FullnameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = FULLNAME_RE
            .captures(s)
            .ok_or_else(|| FullnameError(s.to_string()))?;
        Ok(Self::new(&caps[1], &caps[2]))
    }
}

/// `^(t[0-9])_([0-9a-z]+)$`
static FULLNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(t[0-9])_([0-9a-z]+)$").expect("invalid fullname regex"));

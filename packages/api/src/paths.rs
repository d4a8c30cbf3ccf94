//! Endpoint path templates.
//!
//! Paths are relative to the API base URL and never start with a slash.
//! User-supplied segments are percent-encoded.

use urlencoding::encode;

/// `api/v1/access_token` on the OAuth host.
pub const ACCESS_TOKEN: &str = "api/v1/access_token";

/// `api/v1/me`: the authenticated user.
pub const ME: &str = "api/v1/me";

/// `api/unfriend`: remove a relationship (friend, enemy, moderator, ...).
pub const UNFRIEND: &str = "api/unfriend";

/// `api/info`: look up things by fullname.
pub const INFO: &str = "api/info";

/// `user/{user}`
pub fn user(name: &str) -> String {
    format!("user/{}", encode(name))
}

/// `user/{user}/about`
pub fn user_about(name: &str) -> String {
    format!("user/{}/about", encode(name))
}

/// `api/v1/me/friends/{user}`
pub fn friend_v1(name: &str) -> String {
    format!("api/v1/me/friends/{}", encode(name))
}

/// `r/{subreddit}`
pub fn subreddit(name: &str) -> String {
    format!("r/{}", encode(name))
}

/// `r/{subreddit}/about`
pub fn subreddit_about(name: &str) -> String {
    format!("r/{}/about", encode(name))
}

/// `comments/{id}`
pub fn comments(submission_id: &str) -> String {
    format!("comments/{}", encode(submission_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_paths() {
        assert_eq!(user("spez"), "user/spez");
        assert_eq!(user_about("spez"), "user/spez/about");
        assert_eq!(friend_v1("spez"), "api/v1/me/friends/spez");
    }

    #[test]
    fn segments_are_encoded() {
        assert_eq!(user_about("a b/c"), "user/a%20b%2Fc/about");
    }

    #[test]
    fn subreddit_and_comment_paths() {
        assert_eq!(subreddit("rust"), "r/rust");
        assert_eq!(subreddit_about("rust"), "r/rust/about");
        assert_eq!(comments("abc123"), "comments/abc123");
    }
}

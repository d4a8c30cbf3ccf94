//! Human-readable text rendering of objectified responses.
//!
//! The output is plain text meant for terminals and logs. It is not a
//! stable format; only the JSON wire format is normative.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{Listing, Thing};
use crate::objector::Objectified;

/// Render any objectified value.
///
/// Things and listings get a structured summary; everything else is
/// printed as pretty JSON.
pub fn render(value: &Objectified) -> String {
    match value {
        Objectified::Thing(thing) => render_thing(thing),
        Objectified::Listing(listing) => render_listing(listing),
        Objectified::List(items) if items.iter().any(is_structured) => items
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join("\n"),
        other => {
            let mut out = serde_json::to_string_pretty(&other.to_value()).unwrap_or_default();
            out.push('\n');
            out
        }
    }
}

/// Render a single thing in full.
///
/// ```text
/// [comment] u/spez  score: 3
/// "I agree with the above."
///
/// id: t1_c1  created: 2023-11-14T22:13:20+00:00
/// ```
pub fn render_thing(thing: &Thing) -> String {
    let mut out = String::new();
    match thing {
        Thing::Comment(c) => {
            out.push_str(&format!(
                "[comment] {}  score: {}\n",
                author_label(c.data.author.as_deref()),
                c.data.score
            ));
            out.push_str(&wrap_content(&c.data.body, 80));
            out.push('\n');
            push_footer(&mut out, Some(c.fullname()), c.created());
        }
        Thing::Submission(s) => {
            out.push_str(&format!(
                "[submission] r/{} {}  score: {}  comments: {}\n",
                s.data.subreddit.as_deref().unwrap_or("?"),
                author_label(s.data.author.as_deref()),
                s.data.score,
                s.data.num_comments
            ));
            out.push_str(&wrap_content(&s.data.title, 80));
            out.push('\n');
            if let Some(url) = s.data.url.as_deref().filter(|_| !s.data.is_self) {
                out.push_str(&format!("{url}\n"));
            } else if !s.data.selftext.is_empty() {
                out.push('\n');
                out.push_str(&wrap_content(&s.data.selftext, 80));
                out.push('\n');
            }
            push_footer(&mut out, Some(s.fullname()), s.created());
        }
        Thing::Redditor(r) => {
            out.push_str(&format!("[redditor] u/{}", r.name()));
            if let Some(karma) = r.data.link_karma {
                out.push_str(&format!("  link karma: {karma}"));
            }
            if let Some(karma) = r.data.comment_karma {
                out.push_str(&format!("  comment karma: {karma}"));
            }
            out.push('\n');
            push_footer(&mut out, r.fullname(), r.created());
        }
        Thing::Subreddit(s) => {
            out.push_str(&format!("[subreddit] r/{}", s.display_name()));
            if let Some(n) = s.data.subscribers {
                out.push_str(&format!("  subscribers: {n}"));
            }
            out.push('\n');
            if let Some(title) = s.data.title.as_deref() {
                out.push_str(&wrap_content(title, 80));
                out.push('\n');
            }
            push_footer(&mut out, s.fullname(), s.created());
        }
        Thing::Message(m) => {
            let marker = if m.is_unread() { " (unread)" } else { "" };
            out.push_str(&format!(
                "[message] from {}{}\n",
                author_label(m.data.author.as_deref()),
                marker
            ));
            out.push_str(&format!("Subject: {}\n", m.data.subject));
            out.push_str(&wrap_content(&m.data.body, 80));
            out.push('\n');
            push_footer(&mut out, Some(m.fullname()), m.created());
        }
        Thing::MoreComments(m) => {
            out.push_str(&format!("[more] {} more comments\n", m.count()));
        }
        Thing::Custom(c) => {
            out.push_str(&format!("[{}] {} fields\n", c.kind(), c.data().len()));
        }
    }
    out
}

/// Render a listing as a one-line-per-child summary.
///
/// ```text
/// Listing  2 items
/// ────────────────
///   [t3_s1]  r/rust  "Rust 2.0 announced"
///   [t1_c1]  u/spez  "I agree with the above."
///
/// after: t1_c1
/// ```
pub fn render_listing(listing: &Listing) -> String {
    let total = listing.len();
    let header = format!(
        "{}  {} item{}",
        listing.kind,
        total,
        if total == 1 { "" } else { "s" }
    );
    let rule = "─".repeat(header.chars().count());
    let mut out = format!("{header}\n{rule}\n");

    for child in &listing.children {
        out.push_str("  ");
        out.push_str(&summary_line(child));
        out.push('\n');
    }

    if listing.before.is_some() || listing.after.is_some() {
        out.push('\n');
        if let Some(before) = &listing.before {
            out.push_str(&format!("before: {}\n", cursor(before)));
        }
        if let Some(after) = &listing.after {
            out.push_str(&format!("after: {}\n", cursor(after)));
        }
    }
    out
}

// --- helpers -----------------------------------------------------------------

/// String cursors print bare; anything else prints as JSON.
fn cursor(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_structured(value: &Objectified) -> bool {
    matches!(value, Objectified::Thing(_) | Objectified::Listing(_))
}

fn summary_line(child: &Objectified) -> String {
    match child {
        Objectified::Thing(thing) => {
            let id = thing.fullname().unwrap_or_else(|| thing.kind().to_string());
            let detail = match thing {
                Thing::Comment(c) => format!(
                    "{}  \"{}\"",
                    author_label(c.data.author.as_deref()),
                    truncate(&c.data.body, 60)
                ),
                Thing::Submission(s) => format!(
                    "r/{}  \"{}\"",
                    s.data.subreddit.as_deref().unwrap_or("?"),
                    truncate(&s.data.title, 60)
                ),
                Thing::Message(m) => format!(
                    "{}  \"{}\"",
                    author_label(m.data.author.as_deref()),
                    truncate(&m.data.subject, 60)
                ),
                Thing::Redditor(r) => format!("u/{}", r.name()),
                Thing::Subreddit(s) => format!("r/{}", s.display_name()),
                Thing::MoreComments(m) => format!("{} more comments", m.count()),
                Thing::Custom(c) => format!("{} fields", c.data().len()),
            };
            format!("[{id}]  {detail}")
        }
        Objectified::Listing(l) => format!("[{}]  {} items", l.kind, l.len()),
        Objectified::Data(data) => format!("[?]  unregistered kind, {} fields", data.len()),
        other => truncate(&other.to_value().to_string(), 72),
    }
}

fn author_label(author: Option<&str>) -> String {
    match author {
        Some(name) if !name.is_empty() && name != "[deleted]" => format!("u/{name}"),
        _ => "[deleted]".to_string(),
    }
}

fn push_footer(out: &mut String, fullname: Option<String>, created: Option<DateTime<Utc>>) {
    let mut parts = Vec::new();
    if let Some(id) = fullname {
        parts.push(format!("id: {id}"));
    }
    if let Some(created) = created {
        parts.push(format!("created: {}", created.to_rfc3339()));
    }
    if !parts.is_empty() {
        out.push('\n');
        out.push_str(&parts.join("  "));
        out.push('\n');
    }
}

fn wrap_content(content: &str, width: usize) -> String {
    if content.len() <= width {
        return format!("\"{}\"", content);
    }
    let mut result = String::from("\"");
    let mut line_len = 1usize;
    for word in content.split_whitespace() {
        if line_len + word.len() + 1 > width {
            result.push('\n');
            result.push(' ');
            line_len = 1;
        } else if line_len > 1 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }
    result.push('"');
    result
}

fn truncate(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// --- tests -------------------------------------------------------------------

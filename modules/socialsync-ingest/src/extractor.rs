// Threads embedded-JSON extraction.
//
// The profile page inlines its data as JSON script blocks with no stable
// schema; the useful payload sits under `thread_items` arrays at varying
// depths and the entry shape has changed at least once. Extraction is
// pure and total: malformed sub-trees are skipped, never raised on.

use chrono::Utc;
use serde_json::Value;

use socialsync_common::{Platform, Post};

/// Extract every recognizable text post from one parsed JSON document.
///
/// `published_at` is the extraction time, not the true publish time: the
/// embedded datasets on this path carry no usable timestamp. Accepted
/// precision loss.
pub fn extract_thread_posts(doc: &Value, username: &str) -> Vec<Post> {
    let mut posts = Vec::new();

    for items in find_thread_items(doc) {
        for entry in items {
            match entry {
                // A `thread_items` array may hold entry-lists or flat entries.
                Value::Array(inner) => {
                    for item in inner {
                        if let Some(post) = parse_entry(item, username) {
                            posts.push(post);
                        }
                    }
                }
                _ => {
                    if let Some(post) = parse_entry(entry, username) {
                        posts.push(post);
                    }
                }
            }
        }
    }

    posts
}

/// Collect every array stored under a `thread_items` key, at any depth.
fn find_thread_items(value: &Value) -> Vec<&Vec<Value>> {
    let mut found = Vec::new();
    let mut stack = vec![value];

    while let Some(node) = stack.pop() {
        match node {
            Value::Object(map) => {
                for (key, child) in map {
                    if key == "thread_items" {
                        if let Value::Array(items) = child {
                            found.push(items);
                            continue;
                        }
                    }
                    stack.push(child);
                }
            }
            Value::Array(items) => stack.extend(items),
            _ => {}
        }
    }

    found
}

/// Ordered shape matchers, first match wins per entry.
fn parse_entry(entry: &Value, username: &str) -> Option<Post> {
    let entry = entry.as_object()?;

    let (text, id) = parse_legacy(entry).or_else(|| parse_current(entry))?;

    let content = text.trim();
    if content.is_empty() {
        return None;
    }

    Some(Post {
        platform: Platform::Threads,
        post_url: format!("https://www.threads.net/@{username}/post/{id}"),
        content: content.to_string(),
        published_at: Some(Utc::now()),
    })
}

/// Legacy shape: `item_type == "TEXT_POST"`, text in `text_content`,
/// id in `thread_id` (falling back to `id`).
fn parse_legacy(entry: &serde_json::Map<String, Value>) -> Option<(String, String)> {
    if entry.get("item_type")?.as_str()? != "TEXT_POST" {
        return None;
    }
    let text = entry.get("text_content")?.as_str()?.to_string();
    let id = id_value(entry.get("thread_id")).or_else(|| id_value(entry.get("id")))?;
    Some((text, id))
}

/// Current shape: nested `post` object, text from the first non-empty of
/// four candidate fields, id in `pk` (falling back to `id`).
fn parse_current(entry: &serde_json::Map<String, Value>) -> Option<(String, String)> {
    let post = entry.get("post")?.as_object()?;

    let text = ["text", "caption", "caption_add_on", "accessibility_caption"]
        .iter()
        .filter_map(|field| post.get(*field))
        .filter_map(flatten_text)
        .find(|t| !t.trim().is_empty())?;

    let id = id_value(post.get("pk")).or_else(|| id_value(post.get("id")))?;
    Some((text, id))
}

/// The text field is sometimes a structured value rather than a plain
/// string: an object wrapping the text, or a list of fragments.
fn flatten_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("text")
            .or_else(|| map.get("rendered"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                map.values()
                    .find_map(|v| v.as_str())
                    .map(str::to_string)
            }),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            Some(joined)
        }
        _ => None,
    }
}

/// Ids appear as either JSON strings or numbers.
fn id_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

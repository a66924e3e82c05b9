//! Dotted-path access into JSON value trees
//!
//! Paths are relative to the record root: `a.b.c` walks object keys,
//! `items[0].name` walks through a sequence index. The empty path refers
//! to the root itself.

use crate::error::{Error, Result};
use serde_json::Value;

/// Path segment for navigating a value tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

/// Parse a path string into segments.
/// Examples: "foo.bar", "items[0]", "users[0].name"
pub fn parse_path(path: &str) -> Result<Vec<PathSegment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = path;

    while !rest.is_empty() {
        while let Some(stripped) = rest.strip_prefix('.') {
            rest = stripped;
        }
        if rest.is_empty() {
            break;
        }

        if let Some(body) = rest.strip_prefix('[') {
            let end = body
                .find(']')
                .ok_or_else(|| Error::InvalidPath(format!("unclosed index in '{}'", path)))?;
            let index = body[..end]
                .parse::<usize>()
                .map_err(|_| Error::InvalidPath(format!("bad index in '{}'", path)))?;
            segments.push(PathSegment::Index(index));
            rest = &body[end + 1..];
        } else {
            let end = rest
                .find(|c| c == '.' || c == '[')
                .unwrap_or(rest.len());
            segments.push(PathSegment::Key(&rest[..end]));
            rest = &rest[end..];
        }
    }

    Ok(segments)
}

/// Append an object key to a dotted path
pub fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Append a sequence index to a dotted path
pub fn join_index(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

/// Get a value at a path, or `None` if the path is malformed or any
/// segment is absent
pub fn get_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in parse_path(path).ok()? {
        match segment {
            PathSegment::Key(key) => {
                current = current.as_object()?.get(key)?;
            }
            PathSegment::Index(idx) => {
                current = current.as_array()?.get(idx)?;
            }
        }
    }
    Some(current)
}

/// Set a value at a path, creating missing intermediates. A pre-existing
/// non-container in the way is an error, not an overwrite.
pub fn set_path(value: &mut Value, path: &str, new: Value) -> Result<()> {
    if path.is_empty() {
        *value = new;
        return Ok(());
    }

    let segments = parse_path(path)?;
    let mut current = value;

    for (i, segment) in segments.iter().enumerate() {
        let is_last = i == segments.len() - 1;

        match segment {
            PathSegment::Key(key) => {
                if current.is_null() {
                    *current = Value::Object(serde_json::Map::new());
                }
                match current {
                    Value::Object(map) => {
                        if is_last {
                            map.insert(key.to_string(), new);
                            return Ok(());
                        }
                        current = map.entry(key.to_string()).or_insert(Value::Null);
                    }
                    _ => return Err(Error::InvalidPath(format!("{} is not a mapping", path))),
                }
            }
            PathSegment::Index(idx) => {
                if current.is_null() {
                    *current = Value::Array(Vec::new());
                }
                match current {
                    Value::Array(arr) => {
                        while arr.len() <= *idx {
                            arr.push(Value::Null);
                        }
                        if is_last {
                            arr[*idx] = new;
                            return Ok(());
                        }
                        current = &mut arr[*idx];
                    }
                    _ => return Err(Error::InvalidPath(format!("{} is not a sequence", path))),
                }
            }
        }
    }

    Ok(())
}

/// Get a mutable reference to the sequence container at a path
pub fn get_array_mut<'v>(value: &'v mut Value, path: &str) -> Result<&'v mut Vec<Value>> {
    let mut current = value;
    for segment in parse_path(path)? {
        current = match segment {
            PathSegment::Key(key) => current
                .as_object_mut()
                .and_then(|map| map.get_mut(key))
                .ok_or_else(|| Error::InvalidPath(path.to_string()))?,
            PathSegment::Index(idx) => current
                .as_array_mut()
                .and_then(|arr| arr.get_mut(idx))
                .ok_or_else(|| Error::InvalidPath(path.to_string()))?,
        };
    }

    current
        .as_array_mut()
        .ok_or_else(|| Error::InvalidPath(format!("{} is not a sequence", path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_parsing() {
        let segments = parse_path("foo.bar[0].baz").unwrap();
        assert_eq!(segments[0], PathSegment::Key("foo"));
        assert_eq!(segments[1], PathSegment::Key("bar"));
        assert_eq!(segments[2], PathSegment::Index(0));
        assert_eq!(segments[3], PathSegment::Key("baz"));
    }

    #[test]
    fn test_malformed_brackets_are_invalid_paths() {
        assert!(matches!(parse_path("a[1"), Err(Error::InvalidPath(_))));
        assert!(matches!(parse_path("a[oops]"), Err(Error::InvalidPath(_))));
        assert!(matches!(parse_path("[]"), Err(Error::InvalidPath(_))));

        assert_eq!(get_path(&json!({"a": [1]}), "a[1"), None);

        let mut value = json!({"a": [1]});
        assert!(set_path(&mut value, "a[1", json!(2)).is_err());
        assert!(get_array_mut(&mut value, "a[1").is_err());
        assert_eq!(value, json!({"a": [1]}));
    }

    #[test]
    fn test_get_path_nested() {
        let value = json!({"a": {"b": {"c": "c"}}});
        assert_eq!(get_path(&value, "a.b.c"), Some(&json!("c")));
        assert_eq!(get_path(&value, "a.b"), Some(&json!({"c": "c"})));
        assert_eq!(get_path(&value, "a.x"), None);
    }

    #[test]
    fn test_get_path_empty_is_root() {
        let value = json!(["starting"]);
        assert_eq!(get_path(&value, ""), Some(&value));
    }

    #[test]
    fn test_set_path_creates_intermediates() {
        let mut value = json!({});
        set_path(&mut value, "user.profile.name", json!("Bob")).unwrap();
        assert_eq!(value, json!({"user": {"profile": {"name": "Bob"}}}));
    }

    #[test]
    fn test_set_path_rejects_scalar_intermediate() {
        let mut value = json!({"a": 1});
        assert!(matches!(
            set_path(&mut value, "a.b", json!(2)),
            Err(Error::InvalidPath(_))
        ));
        assert!(matches!(
            set_path(&mut value, "a[0]", json!(2)),
            Err(Error::InvalidPath(_))
        ));
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_set_path_index() {
        let mut value = json!({"items": [1, 2, 3]});
        set_path(&mut value, "items[1]", json!(9)).unwrap();
        assert_eq!(value, json!({"items": [1, 9, 3]}));
    }

    #[test]
    fn test_get_array_mut() {
        let mut value = json!({"arr": ["starting"]});
        let arr = get_array_mut(&mut value, "arr").unwrap();
        arr.push(json!("next"));
        assert_eq!(value, json!({"arr": ["starting", "next"]}));
    }

    #[test]
    fn test_get_array_mut_rejects_non_sequence() {
        let mut value = json!({"a": {"b": 1}});
        assert!(get_array_mut(&mut value, "a.b").is_err());
        assert!(get_array_mut(&mut value, "missing").is_err());
    }

    #[test]
    fn test_join() {
        assert_eq!(join_key("", "a"), "a");
        assert_eq!(join_key("a.b", "c"), "a.b.c");
        assert_eq!(join_index("arr", 2), "arr[2]");
    }
}

//! Path resolution over response bodies
//!
//! Paths are dot-separated (`subject.reference`). Array elements are addressed
//! either with a numeric segment (`entry.0.resource`) or with a bracketed index
//! (`entry[0].resource`). Resolution never fails loudly: anything that does not
//! resolve yields `None`.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'p> {
    Key(&'p str),
    Index(usize),
}

/// Resolve `path` against `value`, returning the addressed node if present
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = parse_segments(path)?;
    let mut current = value;

    for segment in segments {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key)?,
            (Segment::Key(key), Value::Array(items)) => {
                let index: usize = key.parse().ok()?;
                items.get(index)?
            }
            (Segment::Index(index), Value::Array(items)) => items.get(index)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Number of elements at `path`: array length, 1 for a scalar, 0 when absent
pub fn count_at(value: &Value, path: &str) -> usize {
    match resolve_path(value, path) {
        None | Some(Value::Null) => 0,
        Some(Value::Array(items)) => items.len(),
        Some(_) => 1,
    }
}

fn parse_segments(path: &str) -> Option<Vec<Segment<'_>>> {
    let path = path.trim();
    if path.is_empty() {
        return Some(Vec::new());
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let (name, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };

        if !name.is_empty() {
            segments.push(Segment::Key(name));
        } else if rest.is_empty() {
            // empty segment such as `a..b`
            return None;
        }

        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            let index = inner[..close].trim().parse().ok()?;
            segments.push(Segment::Index(index));
            rest = &inner[close + 1..];
        }
    }

    Some(segments)
}

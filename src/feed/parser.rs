use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised when the feed body is structurally unusable.
///
/// Missing or oddly-typed ride fields never produce one of these; they are
/// defaulted by [`Tolerant`] instead.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Body is not valid JSON (truncated, binary, HTML error page, ...)
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Body is valid JSON but the top level is not an object
    #[error("Feed root is not a JSON object")]
    NotAnObject,
}

/// Wait-time status of a single attraction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RideStatus {
    pub name: String,
    pub wait_minutes: u32,
    pub is_open: bool,
}

impl RideStatus {
    pub fn status_label(&self) -> &'static str {
        if self.is_open {
            "Open"
        } else {
            "Closed"
        }
    }

    /// Wait text as shown to the user: closed rides have no wait at all,
    /// open rides with a zero wait read "No Wait".
    pub fn wait_label(&self) -> String {
        if !self.is_open {
            "Closed".to_string()
        } else if self.wait_minutes == 0 {
            "No Wait".to_string()
        } else {
            format!("{} min", self.wait_minutes)
        }
    }
}

// ============================================================================
// Extraction Rules
// ============================================================================

/// One step of a path into the feed document.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Descend into an object member.
    Field(&'static str),
    /// Fan out over every element of an array.
    Each,
}

/// Where ride entries live in a queue-times payload, in output order.
///
/// Rides grouped by land come first, followed by ungrouped top-level rides.
pub const RIDE_SOURCES: &[&[Step]] = &[
    &[Step::Field("lands"), Step::Each, Step::Field("rides"), Step::Each],
    &[Step::Field("rides"), Step::Each],
];

/// Collect every value reachable through `path`, in document order.
///
/// A missing key or a value of the wrong container type ends that branch
/// with zero results.
fn collect<'a>(value: &'a Value, path: &[Step], out: &mut Vec<&'a Value>) {
    let Some((step, rest)) = path.split_first() else {
        out.push(value);
        return;
    };

    match step {
        Step::Field(key) => {
            if let Some(child) = value.as_object().and_then(|obj| obj.get(*key)) {
                collect(child, rest, out);
            }
        }
        Step::Each => {
            if let Some(items) = value.as_array() {
                for item in items {
                    collect(item, rest, out);
                }
            }
        }
    }
}

// ============================================================================
// Tolerant Field Decoding
// ============================================================================

/// Best-effort conversion of a JSON value into a field type.
///
/// `coerce` returns `None` when the value cannot be read as `Self`; callers
/// then fall back to `Default::default()`.
pub trait Tolerant: Sized + Default {
    fn coerce(value: &Value) -> Option<Self>;
}

impl Tolerant for String {
    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl Tolerant for u32 {
    fn coerce(value: &Value) -> Option<Self> {
        let n = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|u| u.min(i64::MAX as u64) as i64))
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))?,
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))?
            }
            _ => return None,
        };
        // Waits are never negative; anything above u32 is not a real wait either
        Some(n.clamp(0, u32::MAX as i64) as u32)
    }
}

impl Tolerant for bool {
    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }
}

/// Read `key` from `obj`, defaulting when the key is absent or unreadable.
pub fn field<T: Tolerant>(obj: Option<&Map<String, Value>>, key: &str) -> T {
    obj.and_then(|o| o.get(key))
        .and_then(T::coerce)
        .unwrap_or_default()
}

fn decode_ride(entry: &Value) -> RideStatus {
    // Non-object entries decode as `{}` so they still occupy their slot
    let obj = entry.as_object();
    RideStatus {
        name: field(obj, "name"),
        wait_minutes: field(obj, "wait_time"),
        is_open: field(obj, "is_open"),
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a queue-times body into a flat list of rides.
///
/// The order follows [`RIDE_SOURCES`]; ranking happens separately.
pub fn parse(body: &[u8]) -> Result<Vec<RideStatus>, ParseError> {
    let root: Value = serde_json::from_slice(body)?;
    if !root.is_object() {
        return Err(ParseError::NotAnObject);
    }

    let mut entries = Vec::new();
    for path in RIDE_SOURCES {
        collect(&root, path, &mut entries);
    }

    Ok(entries.into_iter().map(decode_ride).collect())
}

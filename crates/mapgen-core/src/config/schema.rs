//! Declarative config schema and the one pass that applies it.
//!
//! Every config group is described as a tree of [`Node`]s carrying its own
//! defaults and bounds. [`apply`] walks a schema and a partial JSON value side
//! by side and returns a complete, clamped JSON tree; the typed structs in
//! `config::types` are deserialised from that output.

use serde_json::{Map, Value};

use crate::error::ConfigValidationError;

// ── Schema nodes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct NumberSpec {
    pub default: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Nested object; unrecognised keys are ignored.
    Group(Vec<(&'static str, Node)>),
    Number(NumberSpec),
    Bool(bool),
    /// Closed string enumeration.
    Choice {
        default: &'static str,
        allowed: &'static [&'static str],
    },
    /// Homogeneous array; empty or absent input yields `default`.
    List { item: Box<Node>, default: Vec<Value> },
    /// Fixed-length array, one schema per position.
    Tuple(Vec<Node>),
    /// Object whose key set is closed: unknown keys are fatal.
    Closed {
        what: &'static str,
        entries: Vec<(&'static str, Node)>,
    },
    /// Known keys plus one extension slot holding free-form named entries.
    /// Keys outside both are fatal.
    Tagged {
        what: &'static str,
        entries: Vec<(&'static str, Node)>,
        slot: &'static str,
        item: Box<Node>,
    },
}

// ── Builders ──────────────────────────────────────────────────────────────────

pub fn group(entries: Vec<(&'static str, Node)>) -> Node {
    Node::Group(entries)
}

/// Unbounded real.
pub fn num(default: f64) -> Node {
    Node::Number(NumberSpec { default, min: None, max: None, integer: false })
}

/// Unbounded integer.
pub fn int(default: i64) -> Node {
    Node::Number(NumberSpec { default: default as f64, min: None, max: None, integer: true })
}

/// Non-negative integer.
pub fn count(default: u32) -> Node {
    int(default as i64).range(0.0, COUNT_MAX)
}

/// Upper bound on any count, radius or tile length.
pub const COUNT_MAX: f64 = 1_000_000.0;

/// Percent or chance in 0..=100.
pub fn percent(default: f64) -> Node {
    num(default).range(0.0, 100.0)
}

/// Probability or fraction in 0..=1.
pub fn ratio(default: f64) -> Node {
    num(default).range(0.0, 1.0)
}

/// Non-negative real (weights, multipliers).
pub fn weight(default: f64) -> Node {
    num(default).min(0.0)
}

/// Absolute latitude in degrees.
pub fn abs_lat(default: f64) -> Node {
    num(default).range(0.0, 90.0)
}

/// Signed angle in degrees.
pub fn degrees(default: f64) -> Node {
    num(default).range(-180.0, 180.0)
}

/// Rainfall amount or delta on the 0..=200 scale.
pub fn rain(default: f64) -> Node {
    num(default).range(0.0, 200.0)
}

pub fn flag(default: bool) -> Node {
    Node::Bool(default)
}

pub fn choice(default: &'static str, allowed: &'static [&'static str]) -> Node {
    Node::Choice { default, allowed }
}

pub fn list(item: Node, default: Vec<Value>) -> Node {
    Node::List { item: Box::new(item), default }
}

pub fn tuple(items: Vec<Node>) -> Node {
    Node::Tuple(items)
}

pub fn closed(what: &'static str, entries: Vec<(&'static str, Node)>) -> Node {
    Node::Closed { what, entries }
}

pub fn tagged(
    what: &'static str,
    entries: Vec<(&'static str, Node)>,
    slot: &'static str,
    item: Node,
) -> Node {
    Node::Tagged { what, entries, slot, item: Box::new(item) }
}

impl Node {
    pub fn min(self, lo: f64) -> Node {
        match self {
            Node::Number(spec) => Node::Number(NumberSpec { min: Some(lo), ..spec }),
            other => other,
        }
    }

    pub fn max(self, hi: f64) -> Node {
        match self {
            Node::Number(spec) => Node::Number(NumberSpec { max: Some(hi), ..spec }),
            other => other,
        }
    }

    pub fn range(self, lo: f64, hi: f64) -> Node {
        self.min(lo).max(hi)
    }

    /// The fully-defaulted tree for this node.
    pub fn defaults(&self) -> Result<Value, ConfigValidationError> {
        apply(self, None, "", &mut Vec::new())
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// A non-fatal adjustment made while resolving: a value clamped into range,
/// rounded to an integer, or replaced by its default because it had the wrong type.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampNote {
    pub path: String,
    pub raw: Value,
    pub resolved: Value,
}

/// Merge `raw` over the defaults described by `node`.
pub fn apply(
    node: &Node,
    raw: Option<&Value>,
    path: &str,
    notes: &mut Vec<ClampNote>,
) -> Result<Value, ConfigValidationError> {
    let raw = raw.filter(|v| !v.is_null());
    match node {
        Node::Number(spec) => Ok(resolve_number(spec, raw, path, notes)),
        Node::Bool(default) => Ok(match raw {
            Some(Value::Bool(b)) => Value::Bool(*b),
            Some(other) => fallback(path, other, Value::Bool(*default), notes),
            None => Value::Bool(*default),
        }),
        Node::Choice { default, allowed } => match raw {
            None => Ok(Value::from(*default)),
            Some(Value::String(s)) if allowed.contains(&s.as_str()) => Ok(Value::from(s.as_str())),
            Some(Value::String(s)) => Err(ConfigValidationError::InvalidChoice {
                path: path.to_string(),
                value: s.clone(),
                allowed: allowed.to_vec(),
            }),
            Some(other) => Ok(fallback(path, other, Value::from(*default), notes)),
        },
        Node::List { item, default } => match raw.and_then(Value::as_array) {
            Some(items) if !items.is_empty() => {
                let resolved = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| apply(item, Some(v), &format!("{path}[{i}]"), notes))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(resolved))
            }
            _ => Ok(Value::Array(default.clone())),
        },
        Node::Tuple(items) => {
            let given = raw.and_then(Value::as_array);
            let resolved = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    apply(item, given.and_then(|a| a.get(i)), &format!("{path}[{i}]"), notes)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(resolved))
        }
        Node::Group(entries) => {
            let obj = object_or_note(raw, path, notes);
            let out = resolve_entries(entries, obj, path, notes)?;
            if let Some(obj) = obj {
                for key in obj.keys().filter(|k| !entries.iter().any(|(name, _)| name == k)) {
                    tracing::debug!(path, key = key.as_str(), "ignoring unrecognised config key");
                }
            }
            Ok(Value::Object(out))
        }
        Node::Closed { what, entries } => {
            let obj = object_or_note(raw, path, notes);
            reject_unknown(obj, entries.iter().map(|(k, _)| *k), path, what)?;
            Ok(Value::Object(resolve_entries(entries, obj, path, notes)?))
        }
        Node::Tagged { what, entries, slot, item } => {
            let obj = object_or_note(raw, path, notes);
            reject_unknown(
                obj,
                entries.iter().map(|(k, _)| *k).chain(std::iter::once(*slot)),
                path,
                what,
            )?;
            let mut out = resolve_entries(entries, obj, path, notes)?;
            let slot_path = child_path(path, slot);
            let mut extra = Map::new();
            if let Some(named) = obj.and_then(|o| o.get(*slot)).and_then(Value::as_object) {
                for (name, value) in named {
                    let resolved = apply(item, Some(value), &child_path(&slot_path, name), notes)?;
                    extra.insert(name.clone(), resolved);
                }
            }
            out.insert(slot.to_string(), Value::Object(extra));
            Ok(Value::Object(out))
        }
    }
}

fn resolve_entries(
    entries: &[(&'static str, Node)],
    obj: Option<&Map<String, Value>>,
    path: &str,
    notes: &mut Vec<ClampNote>,
) -> Result<Map<String, Value>, ConfigValidationError> {
    let mut out = Map::new();
    for (key, child) in entries {
        let value = apply(child, obj.and_then(|o| o.get(*key)), &child_path(path, key), notes)?;
        out.insert(key.to_string(), value);
    }
    Ok(out)
}

fn reject_unknown<'a>(
    obj: Option<&Map<String, Value>>,
    known: impl Iterator<Item = &'a str> + Clone,
    path: &str,
    what: &'static str,
) -> Result<(), ConfigValidationError> {
    let Some(obj) = obj else { return Ok(()) };
    let mut unknown: Vec<String> = obj
        .keys()
        .filter(|k| !known.clone().any(|name| name == k.as_str()))
        .cloned()
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    unknown.sort();
    Err(ConfigValidationError::UnknownKeys { path: path.to_string(), what, keys: unknown })
}

fn object_or_note<'a>(
    raw: Option<&'a Value>,
    path: &str,
    notes: &mut Vec<ClampNote>,
) -> Option<&'a Map<String, Value>> {
    match raw {
        Some(Value::Object(obj)) => Some(obj),
        Some(other) => {
            fallback(path, other, Value::Object(Map::new()), notes);
            None
        }
        None => None,
    }
}

fn resolve_number(
    spec: &NumberSpec,
    raw: Option<&Value>,
    path: &str,
    notes: &mut Vec<ClampNote>,
) -> Value {
    let Some(raw) = raw else { return emit(spec, spec.default) };
    let Some(x) = raw.as_f64().filter(|x| x.is_finite()) else {
        return fallback(path, raw, emit(spec, spec.default), notes);
    };
    let mut y = x;
    if let Some(lo) = spec.min {
        y = y.max(lo);
    }
    if let Some(hi) = spec.max {
        y = y.min(hi);
    }
    if spec.integer {
        y = y.round();
    }
    let out = emit(spec, y);
    if y != x {
        notes.push(ClampNote { path: path.to_string(), raw: raw.clone(), resolved: out.clone() });
    }
    out
}

fn emit(spec: &NumberSpec, value: f64) -> Value {
    if spec.integer {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn fallback(path: &str, raw: &Value, default: Value, notes: &mut Vec<ClampNote>) -> Value {
    notes.push(ClampNote { path: path.to_string(), raw: raw.clone(), resolved: default.clone() });
    default
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Node {
        group(vec![
            ("count", count(8).max(64.0)),
            ("mix", ratio(0.6)),
            ("mode", choice("hard", &["hard", "soft"])),
            ("angles", list(degrees(0.0), vec![json!(15.0), json!(-20.0)])),
            ("pair", tuple(vec![count(0), count(1)])),
            ("keys", closed("chance", vec![("A", percent(10.0)), ("B", percent(20.0))])),
            (
                "styles",
                tagged("style", vec![("known", group(vec![("w", weight(1.0))]))], "custom", group(vec![("w", weight(0.0))])),
            ),
        ])
    }

    #[test]
    fn empty_input_yields_full_defaults() {
        let out = apply(&sample(), Some(&json!({})), "", &mut Vec::new()).unwrap();
        assert_eq!(out["count"], json!(8));
        assert_eq!(out["mix"], json!(0.6));
        assert_eq!(out["mode"], json!("hard"));
        assert_eq!(out["angles"], json!([15.0, -20.0]));
        assert_eq!(out["pair"], json!([0, 1]));
        assert_eq!(out["keys"], json!({ "A": 10.0, "B": 20.0 }));
        assert_eq!(out["styles"], json!({ "known": { "w": 1.0 }, "custom": {} }));
    }

    #[test]
    fn out_of_range_numbers_clamp_and_are_noted() {
        let mut notes = Vec::new();
        let out = apply(&sample(), Some(&json!({ "count": 300, "mix": -1.5 })), "", &mut notes).unwrap();
        assert_eq!(out["count"], json!(64));
        assert_eq!(out["mix"], json!(0.0));
        assert_eq!(notes.len(), 2, "both clamps should be noted: {notes:?}");
        assert_eq!(notes[0].path, "count");
    }

    #[test]
    fn empty_array_falls_back_to_default() {
        let out = apply(&sample(), Some(&json!({ "angles": [] })), "", &mut Vec::new()).unwrap();
        assert_eq!(out["angles"], json!([15.0, -20.0]));
    }

    #[test]
    fn closed_map_rejects_every_unknown_key() {
        let err = apply(&sample(), Some(&json!({ "keys": { "Z": 1, "A": 5, "Y": 2 } })), "", &mut Vec::new())
            .unwrap_err();
        match err {
            ConfigValidationError::UnknownKeys { path, keys, .. } => {
                assert_eq!(path, "keys");
                assert_eq!(keys, vec!["Y".to_string(), "Z".to_string()]);
            }
            other => panic!("expected UnknownKeys, got {other:?}"),
        }
    }

    #[test]
    fn tagged_map_keeps_extension_entries_and_rejects_typos() {
        let ok = apply(
            &sample(),
            Some(&json!({ "styles": { "custom": { "mine": { "w": 3 } } } })),
            "",
            &mut Vec::new(),
        )
        .unwrap();
        assert_eq!(ok["styles"]["custom"]["mine"]["w"], json!(3.0));

        let err = apply(&sample(), Some(&json!({ "styles": { "knwon": {} } })), "", &mut Vec::new());
        assert!(err.is_err(), "a typo outside the extension slot must fail");
    }

    #[test]
    fn invalid_choice_is_fatal() {
        let err = apply(&sample(), Some(&json!({ "mode": "medium" })), "", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("mode"), "error should name the path: {err}");
    }

    #[test]
    fn wrong_leaf_type_falls_back_to_default() {
        let mut notes = Vec::new();
        let out = apply(&sample(), Some(&json!({ "count": "many" })), "", &mut notes).unwrap();
        assert_eq!(out["count"], json!(8));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn applying_output_again_is_a_fixed_point() {
        let raw = json!({ "count": 2.6, "mix": 3, "keys": { "A": 150 } });
        let once = apply(&sample(), Some(&raw), "", &mut Vec::new()).unwrap();
        let twice = apply(&sample(), Some(&once), "", &mut Vec::new()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once["keys"]["A"], json!(100.0));
        assert_eq!(once["count"], json!(3));
    }
}

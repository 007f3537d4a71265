// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort extraction of a display value from agent responses.
//!
//! Agents don't share a response schema, so each integration carries an
//! ordered list of [`Rule`]s. The first rule whose path exists and whose value
//! has the expected [`Shape`] wins. Finding nothing is not an error.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

/// Expected shape of the value at a rule's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A string.
    Text,
    /// An array whose first element is a string.
    FirstText,
    /// An array; non-string members are dropped.
    TextList,
    /// A string, wrapped as a one-item list.
    SingleTextAsList,
    /// An object of arrays; non-array entries and non-string members dropped.
    EntityMap,
    /// A moderation verdict object.
    Verdict,
}

/// A path into the response plus the shape expected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub path: &'static [&'static str],
    pub shape: Shape,
}

/// What a rule pulled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Text(String),
    List(Vec<String>),
    Entities(BTreeMap<String, Vec<String>>),
}

impl Rule {
    pub const fn text(path: &'static [&'static str]) -> Self {
        Self { path, shape: Shape::Text }
    }

    pub const fn first_text(path: &'static [&'static str]) -> Self {
        Self { path, shape: Shape::FirstText }
    }

    pub const fn list(path: &'static [&'static str]) -> Self {
        Self { path, shape: Shape::TextList }
    }

    pub const fn single(path: &'static [&'static str]) -> Self {
        Self { path, shape: Shape::SingleTextAsList }
    }

    pub const fn entities(path: &'static [&'static str]) -> Self {
        Self { path, shape: Shape::EntityMap }
    }

    pub const fn verdict(path: &'static [&'static str]) -> Self {
        Self { path, shape: Shape::Verdict }
    }

    /// Apply this rule to `root`. `None` when the path is missing or the
    /// value has another shape.
    pub fn apply(&self, root: &Value) -> Option<Extracted> {
        let value = self.path.iter().try_fold(root, |v, key| v.as_object()?.get(*key))?;
        match self.shape {
            Shape::Text => value.as_str().map(|s| Extracted::Text(s.to_owned())),
            Shape::FirstText => value
                .as_array()?
                .first()?
                .as_str()
                .map(|s| Extracted::Text(s.to_owned())),
            Shape::TextList => Some(Extracted::List(strings(value.as_array()?))),
            Shape::SingleTextAsList => value.as_str().map(|s| Extracted::List(vec![s.to_owned()])),
            Shape::EntityMap => {
                let entities = value
                    .as_object()?
                    .iter()
                    .filter_map(|(k, v)| v.as_array().map(|items| (k.clone(), strings(items))))
                    .collect();
                Some(Extracted::Entities(entities))
            }
            Shape::Verdict => verdict(value.as_object()?).map(Extracted::Text),
        }
    }
}

/// Evaluate `rules` in order and return the first match.
pub fn first_match(rules: &[Rule], root: &Value) -> Option<Extracted> {
    rules.iter().find_map(|rule| rule.apply(root))
}

/// Summary key points, if the response carries any.
pub fn key_points(root: &Value) -> Vec<String> {
    match first_match(KEY_POINT_RULES, root) {
        Some(Extracted::List(points)) => points,
        _ => vec![],
    }
}

fn strings(items: &[Value]) -> Vec<String> {
    items.iter().filter_map(Value::as_str).map(str::to_owned).collect()
}

/// Render `flagged: yes | score: 0.8 | categories: a, b` from whichever
/// fields are present. `None` if none are.
fn verdict(obj: &Map<String, Value>) -> Option<String> {
    let flagged = obj.get("flagged").and_then(Value::as_bool);
    let score = ["score", "risk_score"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(|v| v.as_number()));
    let categories = obj
        .get("categories")
        .and_then(Value::as_array)
        .filter(|items| items.iter().all(Value::is_string))
        .map(|items| strings(items.as_slice()));

    let mut parts = Vec::new();
    if let Some(flagged) = flagged {
        parts.push(format!("flagged: {}", if flagged { "yes" } else { "no" }));
    }
    if let Some(score) = score {
        parts.push(format!("score: {score}"));
    }
    if let Some(categories) = categories.filter(|c| !c.is_empty()) {
        parts.push(format!("categories: {}", categories.join(", ")));
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join(" | "))
}

impl fmt::Display for Extracted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(", ")),
            Self::Entities(map) => {
                let mut first = true;
                for (category, items) in map {
                    if !first {
                        writeln!(f)?;
                    }
                    first = false;
                    write!(f, "{category}: {}", items.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// Tool-using agents (Linear, GitHub).
pub const TEXT_RULES: &[Rule] = &[
    Rule::text(&["result"]),
    Rule::text(&["result", "result"]),
    Rule::text(&["result", "summary"]),
    Rule::text(&["output"]),
    Rule::text(&["output", "result"]),
    Rule::text(&["output", "summary"]),
    Rule::text(&["summary"]),
    Rule::text(&["summary", "result"]),
    Rule::text(&["summary", "summary"]),
    Rule::text(&["data"]),
    Rule::text(&["data", "result"]),
    Rule::text(&["data", "summary"]),
];

pub const YOUTUBE_RULES: &[Rule] = &[
    Rule::text(&["result"]),
    Rule::text(&["result", "result"]),
    Rule::text(&["result", "summary"]),
    Rule::text(&["result", "comparison"]),
    Rule::text(&["output"]),
    Rule::text(&["output", "result"]),
    Rule::text(&["output", "summary"]),
    Rule::text(&["output", "comparison"]),
    Rule::text(&["summary"]),
    Rule::text(&["summary", "result"]),
    Rule::text(&["summary", "summary"]),
    Rule::text(&["summary", "comparison"]),
    Rule::text(&["data"]),
    Rule::text(&["data", "result"]),
    Rule::text(&["data", "summary"]),
    Rule::text(&["data", "comparison"]),
    Rule::text(&["comparison"]),
    Rule::text(&["comparison", "result"]),
    Rule::text(&["comparison", "summary"]),
    Rule::text(&["comparison", "comparison"]),
];

pub const SUMMARY_RULES: &[Rule] = &[
    Rule::text(&["summary"]),
    Rule::text(&["summary", "summary"]),
    Rule::text(&["summary", "result"]),
    Rule::first_text(&["summary"]),
    Rule::text(&["result"]),
    Rule::text(&["result", "summary"]),
    Rule::text(&["result", "result"]),
    Rule::first_text(&["result"]),
    Rule::text(&["output"]),
    Rule::text(&["output", "summary"]),
    Rule::text(&["output", "result"]),
    Rule::first_text(&["output"]),
    Rule::text(&["data"]),
    Rule::text(&["data", "summary"]),
    Rule::text(&["data", "result"]),
    Rule::first_text(&["data"]),
];

pub const KEY_POINT_RULES: &[Rule] = &[
    Rule::list(&["result", "key_points"]),
    Rule::list(&["key_points"]),
    Rule::list(&["data", "key_points"]),
];

pub const SENTIMENT_RULES: &[Rule] = &[
    Rule::text(&["sentiment"]),
    Rule::text(&["sentiment", "sentiment"]),
    Rule::text(&["sentiment", "result"]),
    Rule::text(&["result"]),
    Rule::text(&["result", "sentiment"]),
    Rule::text(&["result", "result"]),
    Rule::text(&["output"]),
    Rule::text(&["output", "sentiment"]),
    Rule::text(&["output", "result"]),
    Rule::text(&["data"]),
    Rule::text(&["data", "sentiment"]),
    Rule::text(&["data", "result"]),
];

pub const TRANSLATION_RULES: &[Rule] = &[
    Rule::text(&["translation"]),
    Rule::text(&["translation", "translation"]),
    Rule::text(&["translation", "result"]),
    Rule::text(&["result"]),
    Rule::text(&["result", "translation"]),
    Rule::text(&["result", "result"]),
    Rule::text(&["output"]),
    Rule::text(&["output", "translation"]),
    Rule::text(&["output", "result"]),
    Rule::text(&["data"]),
    Rule::text(&["data", "translation"]),
    Rule::text(&["data", "result"]),
];

pub const CLASSIFICATION_RULES: &[Rule] = &[
    Rule::list(&["labels"]),
    Rule::list(&["result", "labels"]),
    Rule::list(&["data", "labels"]),
    Rule::list(&["classification", "labels"]),
    Rule::list(&["result", "classification", "labels"]),
    Rule::single(&["label"]),
    Rule::single(&["result", "label"]),
    Rule::single(&["data", "label"]),
    Rule::single(&["classification", "label"]),
];

pub const ENTITY_RULES: &[Rule] = &[
    Rule::entities(&["entities"]),
    Rule::entities(&["categorized_entities"]),
    Rule::entities(&["result", "entities"]),
    Rule::entities(&["result", "categorized_entities"]),
    Rule::entities(&["data", "entities"]),
    Rule::entities(&["data", "categorized_entities"]),
];

pub const MODERATION_RULES: &[Rule] = &[
    Rule::verdict(&[]),
    Rule::verdict(&["result"]),
    Rule::verdict(&["data"]),
    Rule::verdict(&["moderation"]),
    Rule::verdict(&["result", "moderation"]),
    Rule::text(&["moderation"]),
    Rule::text(&["result"]),
    Rule::text(&["output"]),
    Rule::text(&["data"]),
];

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;

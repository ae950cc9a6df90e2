// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::{Lawyer, SortDirection};

pub const FILTER_REGION: &str = "region";
pub const FILTER_VILLE: &str = "ville";
pub const FILTER_CABINET: &str = "cabinet";
pub const FILTER_CONVENTIONNE: &str = "conventionne";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Exact,
    Membership,
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub name: &'static str,
    pub path: &'static str,
    pub kind: FilterKind,
}

pub trait DirectoryRecord: Serialize {
    const FILTERS: &'static [FilterSpec];

    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Flag(bool),
}

impl FilterValue {
    pub fn is_active(&self) -> bool {
        match self {
            Self::Text(value) => !value.is_empty(),
            Self::Flag(value) => *value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState(BTreeMap<String, FilterValue>);

impl FilterState {
    pub fn set(&mut self, name: &str, value: FilterValue) {
        self.0.insert(name.to_owned(), value);
    }

    pub fn clear(&mut self, name: &str) {
        self.0.remove(name);
    }

    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.0.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(FilterValue::Text(value)) if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(FilterValue::Flag(true)))
    }

    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0
            .iter()
            .filter(|(_, value)| value.is_active())
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn select(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.flipped();
        } else {
            self.key = Some(key.to_owned());
            self.direction = SortDirection::Asc;
        }
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.direction = SortDirection::Asc;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryQuery {
    pub search: String,
    pub filters: FilterState,
    pub sort: SortState,
}

pub fn derive_view<'a, R: DirectoryRecord>(source: &'a [R], query: &DirectoryQuery) -> Vec<&'a R> {
    let term = query.search.trim().to_lowercase();
    let active = query
        .filters
        .active()
        .filter_map(|(name, value)| {
            R::FILTERS
                .iter()
                .find(|spec| spec.name == name)
                .map(|spec| (spec, value))
        })
        .collect::<Vec<_>>();

    let mut rows = source
        .iter()
        .filter(|record| term.is_empty() || matches_search(*record, &term))
        .filter_map(|record| {
            if active.is_empty() && query.sort.key.is_none() {
                return Some((record, Value::Null));
            }
            let value = serde_json::to_value(record).unwrap_or(Value::Null);
            active
                .iter()
                .all(|(spec, filter)| filter_matches(&value, spec, filter))
                .then_some((record, value))
        })
        .collect::<Vec<_>>();

    if let Some(key) = &query.sort.key {
        let direction = query.sort.direction;
        let mut keyed = rows
            .drain(..)
            .map(|(record, value)| (record, sort_value(resolve_path(&value, key))))
            .collect::<Vec<_>>();
        keyed.sort_by(|left, right| compare_sort_values(&left.1, &right.1, direction));
        return keyed.into_iter().map(|(record, _)| record).collect();
    }

    rows.into_iter().map(|(record, _)| record).collect()
}

pub fn distinct_values<R: DirectoryRecord>(source: &[R], path: &str) -> Vec<String> {
    let mut values = BTreeSet::new();
    for record in source {
        let Ok(value) = serde_json::to_value(record) else {
            continue;
        };
        match resolve_path(&value, path) {
            Some(Value::Array(entries)) => {
                for entry in entries {
                    if let Some(text) = scalar_text(entry)
                        && !text.trim().is_empty()
                    {
                        values.insert(text);
                    }
                }
            }
            Some(other) => {
                if let Some(text) = scalar_text(other)
                    && !text.trim().is_empty()
                {
                    values.insert(text);
                }
            }
            None => {}
        }
    }
    values.into_iter().collect()
}

pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(entries) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| entries.get(index)),
        _ => None,
    })
}

fn matches_search<R: DirectoryRecord>(record: &R, term: &str) -> bool {
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(term))
}

fn filter_matches(value: &Value, spec: &FilterSpec, filter: &FilterValue) -> bool {
    let resolved = resolve_path(value, spec.path);
    match (spec.kind, filter) {
        (FilterKind::Flag, _) | (_, FilterValue::Flag(_)) => resolved.is_some_and(is_truthy),
        (FilterKind::Exact, FilterValue::Text(expected)) => {
            resolved.and_then(scalar_text).as_deref() == Some(expected.as_str())
        }
        (FilterKind::Membership, FilterValue::Text(expected)) => match resolved {
            Some(Value::Array(entries)) => entries
                .iter()
                .any(|entry| scalar_text(entry).as_deref() == Some(expected.as_str())),
            Some(other) => scalar_text(other).as_deref() == Some(expected.as_str()),
            None => false,
        },
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(entries) => !entries.is_empty(),
        Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
}

fn sort_value(value: Option<&Value>) -> Option<SortValue> {
    let value = value.filter(|value| is_truthy(value))?;
    match value {
        Value::Number(number) => number.as_f64().map(SortValue::Number),
        Value::String(text) => Some(SortValue::Text(text.to_lowercase())),
        Value::Bool(flag) => Some(SortValue::Text(flag.to_string())),
        Value::Array(entries) => Some(SortValue::Text(
            entries
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(", ")
                .to_lowercase(),
        )),
        Value::Object(_) | Value::Null => None,
    }
}

// Missing values sort first in both directions; the direction only orders
// two present values.
fn compare_sort_values(
    left: &Option<SortValue>,
    right: &Option<SortValue>,
    direction: SortDirection,
) -> Ordering {
    let (left, right) = match (left, right) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(left), Some(right)) => (left, right),
    };
    let ordering = match (left, right) {
        (SortValue::Number(left), SortValue::Number(right)) => {
            left.partial_cmp(right).unwrap_or(Ordering::Equal)
        }
        (left, right) => sort_text(left).cmp(&sort_text(right)),
    };
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn sort_text(value: &SortValue) -> String {
    match value {
        SortValue::Number(number) => number.to_string(),
        SortValue::Text(text) => text.clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

pub fn highlight_segments<'a>(text: &'a str, term: &str) -> Vec<Segment<'a>> {
    let needle = term.trim().to_lowercase().chars().collect::<Vec<_>>();
    if needle.is_empty() || text.is_empty() {
        return vec![Segment {
            text,
            matched: false,
        }];
    }

    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;
    while pos < text.len() {
        if let Some(len) = match_len_at(&text[pos..], &needle) {
            if plain_start < pos {
                segments.push(Segment {
                    text: &text[plain_start..pos],
                    matched: false,
                });
            }
            segments.push(Segment {
                text: &text[pos..pos + len],
                matched: true,
            });
            pos += len;
            plain_start = pos;
        } else {
            pos += text[pos..].chars().next().map_or(1, char::len_utf8);
        }
    }
    if plain_start < text.len() {
        segments.push(Segment {
            text: &text[plain_start..],
            matched: false,
        });
    }
    segments
}

fn match_len_at(haystack: &str, needle: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (offset, ch) in haystack.char_indices() {
        for lower in ch.to_lowercase() {
            if needle.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(offset + ch.len_utf8());
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryView<R> {
    source: Vec<R>,
    query: DirectoryQuery,
}

impl<R> Default for DirectoryView<R> {
    fn default() -> Self {
        Self {
            source: Vec::new(),
            query: DirectoryQuery::default(),
        }
    }
}

impl<R: DirectoryRecord> DirectoryView<R> {
    pub fn new(source: Vec<R>) -> Self {
        Self {
            source,
            query: DirectoryQuery::default(),
        }
    }

    pub fn source(&self) -> &[R] {
        &self.source
    }

    pub fn query(&self) -> &DirectoryQuery {
        &self.query
    }

    pub fn replace_source(&mut self, source: Vec<R>) {
        self.source = source;
    }

    pub fn set_search(&mut self, term: &str) {
        self.query.search = term.to_owned();
    }

    pub fn set_filter(&mut self, name: &str, value: FilterValue) {
        self.query.filters.set(name, value);
    }

    pub fn clear_filter(&mut self, name: &str) {
        self.query.filters.clear(name);
    }

    pub fn clear_filters(&mut self) {
        self.query.filters.clear_all();
    }

    pub fn select_sort(&mut self, key: &str) {
        self.query.sort.select(key);
    }

    pub fn visible(&self) -> Vec<&R> {
        derive_view(&self.source, &self.query)
    }

    pub fn options(&self, path: &str) -> Vec<String> {
        distinct_values(&self.source, path)
    }
}

const LAWYER_FILTERS: &[FilterSpec] = &[
    FilterSpec {
        name: FILTER_REGION,
        path: "region",
        kind: FilterKind::Exact,
    },
    FilterSpec {
        name: FILTER_VILLE,
        path: "villesIntervention",
        kind: FilterKind::Membership,
    },
    FilterSpec {
        name: FILTER_CABINET,
        path: "cabinet",
        kind: FilterKind::Exact,
    },
    FilterSpec {
        name: FILTER_CONVENTIONNE,
        path: "conventionne",
        kind: FilterKind::Flag,
    },
];

impl DirectoryRecord for Lawyer {
    const FILTERS: &'static [FilterSpec] = LAWYER_FILTERS;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.nom.as_str()),
            Cow::Borrowed(self.prenom.as_str()),
            Cow::Owned(format!("{} {}", self.prenom, self.nom)),
            Cow::Owned(format!("{} {}", self.nom, self.prenom)),
            Cow::Borrowed(self.cabinet.as_str()),
        ];
        fields.extend(
            self.villes_intervention
                .iter()
                .map(|ville| Cow::Borrowed(ville.as_str())),
        );
        fields
    }
}

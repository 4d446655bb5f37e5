//! Line classification: hunk-header stripping and VLAN trunk statement
//! detection.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::line::Marker;
use crate::vlan::range::{self, VlanId, VlanSet};

static HUNK_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@@ .*@@").expect("hunk header regex is valid"));

static VLAN_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-+]?\s*switchport trunk allowed vlan (?:add )?((?:\d+[,-]?)+)")
        .expect("vlan statement regex is valid")
});

static LEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\s*").expect("leading indent regex is valid"));

/// Phrase that opens a trunk membership statement.
pub const VLAN_PHRASE: &str = "switchport trunk allowed vlan";

/// Drop `@@ ... @@` decoration, keeping only the trailer after the second
/// `@@` (or nothing when there is no trailer).
pub fn strip_hunk_header(line: &str) -> Cow<'_, str> {
    if !line.contains("@@") {
        return Cow::Borrowed(line);
    }
    let pieces: Vec<&str> = HUNK_HEADER.split(line).collect();
    if pieces.len() == 1 {
        Cow::Borrowed(line)
    } else {
        Cow::Owned(pieces[1..].concat())
    }
}

/// Width of the leading marker plus whitespace, in characters.
pub fn indent_width(line: &str) -> usize {
    LEADING
        .find(line)
        .map(|m| m.as_str().chars().count())
        .unwrap_or(0)
}

/// A `switchport trunk allowed vlan [add] <list>` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanStatement {
    pub marker: Marker,
    /// The captured range list, e.g. `"1-3,5"`.
    pub ranges: String,
}

impl VlanStatement {
    pub fn parse(line: &str) -> Option<Self> {
        let caps = VLAN_STATEMENT.captures(line)?;
        let whole = caps.get(0)?;
        let ranges = caps.get(1)?;
        Some(Self {
            marker: Marker::of(whole.as_str()),
            ranges: ranges.as_str().to_string(),
        })
    }

    /// Expand the captured list into ids no greater than `max_id`.
    pub fn ids(&self, max_id: VlanId) -> Result<VlanSet> {
        range::expand_within(&self.ranges, max_id)
    }
}

/// What the normalizer should do with a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Vlan(VlanStatement),
    Other,
}

pub fn classify(line: &str) -> LineKind {
    match VlanStatement::parse(line) {
        Some(stmt) => LineKind::Vlan(stmt),
        None => LineKind::Other,
    }
}

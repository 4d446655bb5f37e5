//! Range codec for VLAN id lists.
//!
//! Converts between the compact notation devices use (`"1-3,5,7-8"`) and an
//! ordered set of ids. Compression is canonical: a given set always yields
//! the same string, whatever order or duplication the ids arrived in.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{CfgDiffError, Result};

/// A VLAN identifier.
pub type VlanId = u32;

/// Highest id accepted from device output unless configured otherwise.
pub const DEFAULT_MAX_VLAN_ID: VlanId = 4094;

/// Trunk membership at one point in time.
pub type VlanSet = BTreeSet<VlanId>;

/// One comma-separated element of a compressed range list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeToken {
    Single(VlanId),
    /// Inclusive run, always `hi > lo`.
    Span { lo: VlanId, hi: VlanId },
}

impl RangeToken {
    /// The ids covered by this token.
    pub fn ids(&self) -> RangeInclusive<VlanId> {
        match *self {
            RangeToken::Single(id) => id..=id,
            RangeToken::Span { lo, hi } => lo..=hi,
        }
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeToken::Single(id) => write!(f, "{}", id),
            RangeToken::Span { lo, hi } => write!(f, "{}-{}", lo, hi),
        }
    }
}

fn parse_id(raw: &str, token: &str) -> Result<VlanId> {
    raw.trim()
        .parse::<VlanId>()
        .map_err(|_| CfgDiffError::malformed(token))
}

/// Parse one token into the ids it covers.
///
/// `lo-hi` with `lo > hi` is accepted and covers nothing.
fn parse_token(token: &str) -> Result<RangeInclusive<VlanId>> {
    let token = token.trim();
    if token.contains('-') {
        let parts: Vec<&str> = token.split('-').collect();
        if parts.len() != 2 {
            return Err(CfgDiffError::malformed(token));
        }
        let lo = parse_id(parts[0], token)?;
        let hi = parse_id(parts[1], token)?;
        Ok(lo..=hi)
    } else {
        let id = parse_id(token, token)?;
        Ok(id..=id)
    }
}

/// Expand a range list such as `"1-3,5,7-8"` into a set of ids.
///
/// Fails with [`CfgDiffError::MalformedRange`] on any token that is not an
/// integer or an integer pair, including empty tokens. No upper bound is
/// applied; use [`expand_within`] for untrusted input.
pub fn expand(range: &str) -> Result<VlanSet> {
    expand_within(range, VlanId::MAX)
}

/// Like [`expand`], but any id above `max_id` is a
/// [`CfgDiffError::MalformedRange`]. The bound is checked before a span is
/// materialized, so a huge span costs nothing.
pub fn expand_within(range: &str, max_id: VlanId) -> Result<VlanSet> {
    let mut set = VlanSet::new();
    for token in range.trim().split(',') {
        let ids = parse_token(token)?;
        if !ids.is_empty() && *ids.end() > max_id {
            return Err(CfgDiffError::malformed(token.trim()));
        }
        set.extend(ids);
    }
    Ok(set)
}

/// Canonical token list for a set of ids: ascending, runs of two or more
/// merged into spans.
pub fn tokens<I>(ids: I) -> Vec<RangeToken>
where
    I: IntoIterator<Item = VlanId>,
{
    let sorted: VlanSet = ids.into_iter().collect();
    let mut out = Vec::new();
    let mut run: Option<(VlanId, VlanId)> = None;

    for id in sorted {
        run = match run {
            Some((lo, hi)) if hi.checked_add(1) == Some(id) => Some((lo, id)),
            Some((lo, hi)) => {
                out.push(make_token(lo, hi));
                Some((id, id))
            }
            None => Some((id, id)),
        };
    }
    if let Some((lo, hi)) = run {
        out.push(make_token(lo, hi));
    }
    out
}

fn make_token(lo: VlanId, hi: VlanId) -> RangeToken {
    if lo == hi {
        RangeToken::Single(lo)
    } else {
        RangeToken::Span { lo, hi }
    }
}

/// Join tokens into the comma-separated wire form.
pub fn join(tokens: &[RangeToken]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Compress ids into canonical range notation. The empty set gives `""`.
pub fn compress<I>(ids: I) -> String
where
    I: IntoIterator<Item = VlanId>,
{
    join(&tokens(ids))
}

/// Split a token list into consecutive groups of at most `max_per_line`.
///
/// A limit of zero is treated as one.
pub fn chunk<T>(items: &[T], max_per_line: usize) -> Vec<&[T]> {
    items.chunks(max_per_line.max(1)).collect()
}

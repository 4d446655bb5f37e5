//! Diff normalization: the per-device entry point.
//!
//! Walks a unified diff line by line, drops noise, strips hunk headers,
//! hands runs of VLAN trunk statements to the reconciler and passes
//! everything else through. The result is `None` when nothing worth
//! reporting changed.

use std::borrow::Cow;

use serde::Serialize;
use tracing::debug;

use crate::classify::{classify, strip_hunk_header, LineKind};
use crate::error::Result;
use crate::line::OutputLine;
use crate::noise::NoiseFilter;
use crate::vlan::{reconcile_block, VlanId, DEFAULT_MAX_VLAN_ID};

/// Header lines emitted by `git diff` before the first hunk.
pub const DEFAULT_PREAMBLE_LINES: usize = 5;

/// Range tokens per wrapped `switchport trunk allowed vlan` line.
pub const DEFAULT_MAX_VLANS_PER_LINE: usize = 10;

/// Read-only configuration shared by every normalization.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    pub preamble_lines: usize,
    pub max_vlans_per_line: usize,
    /// Highest VLAN id accepted in a trunk statement.
    pub max_vlan_id: VlanId,
    pub noise: NoiseFilter,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            preamble_lines: DEFAULT_PREAMBLE_LINES,
            max_vlans_per_line: DEFAULT_MAX_VLANS_PER_LINE,
            max_vlan_id: DEFAULT_MAX_VLAN_ID,
            noise: NoiseFilter::empty(),
        }
    }
}

impl NormalizeConfig {
    pub fn with_noise(mut self, noise: NoiseFilter) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_preamble_lines(mut self, preamble_lines: usize) -> Self {
        self.preamble_lines = preamble_lines;
        self
    }

    pub fn with_max_vlans_per_line(mut self, max_vlans_per_line: usize) -> Self {
        self.max_vlans_per_line = max_vlans_per_line;
        self
    }

    pub fn with_max_vlan_id(mut self, max_vlan_id: VlanId) -> Self {
        self.max_vlan_id = max_vlan_id;
        self
    }
}

/// Minimized diff for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedDiff {
    pub lines: Vec<OutputLine>,
    pub has_real_changes: bool,
}

impl NormalizedDiff {
    /// Output lines as plain text, in order.
    pub fn rendered(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.to_string()).collect()
    }
}

/// Stateless normalizer bound to a configuration.
#[derive(Debug, Clone, Default)]
pub struct DiffNormalizer {
    config: NormalizeConfig,
}

impl DiffNormalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    pub fn normalize(&self, diff: &str) -> Result<Option<NormalizedDiff>> {
        normalize_diff(diff, &self.config)
    }
}

/// Normalize one device's diff.
///
/// The first `config.preamble_lines` lines are the diff tool's header and
/// are discarded unread. Noise lines are removed before anything else looks
/// at the diff, so they never split, join or feed a VLAN block. Returns
/// `Ok(None)` when no emitted line carries a `-`/`+` marker. Malformed VLAN
/// ranges abort with an error.
pub fn normalize_diff(diff: &str, config: &NormalizeConfig) -> Result<Option<NormalizedDiff>> {
    let mut dropped = 0usize;
    let owned: Vec<Cow<'_, str>> = diff
        .trim()
        .split('\n')
        .skip(config.preamble_lines)
        .map(|l| {
            if l.contains('\r') {
                Cow::Owned(l.replace('\r', ""))
            } else {
                Cow::Borrowed(l)
            }
        })
        .filter(|l| {
            let noise = config.noise.is_noise(l);
            dropped += usize::from(noise);
            !noise
        })
        .collect();
    let lines: Vec<&str> = owned.iter().map(|l| l.as_ref()).collect();

    let mut out = Vec::with_capacity(lines.len());
    let mut has_real_changes = false;
    let mut blocks = 0usize;
    let mut idx = 0;

    while idx < lines.len() {
        let raw = lines[idx];
        let line = strip_hunk_header(raw);
        if let LineKind::Vlan(_) = classify(&line) {
            let block = reconcile_block(
                &lines,
                idx,
                config.max_vlans_per_line,
                config.max_vlan_id,
            )?;
            if block.next > idx {
                blocks += 1;
                has_real_changes |= block.lines.iter().any(|l| l.marker.is_change());
                out.extend(block.lines);
                idx = block.next;
                continue;
            }
        }

        let passthrough = OutputLine::raw(&line);
        has_real_changes |= passthrough.marker.is_change();
        out.push(passthrough);
        idx += 1;
    }

    debug!(
        input_lines = lines.len(),
        output_lines = out.len(),
        noise_dropped = dropped,
        vlan_blocks = blocks,
        has_real_changes,
        "normalized diff"
    );

    if !has_real_changes {
        return Ok(None);
    }
    Ok(Some(NormalizedDiff {
        lines: out,
        has_real_changes,
    }))
}

//! VLAN block reconciliation.
//!
//! Devices often re-serialize a whole trunk membership list as a
//! delete-then-add pair even when a single VLAN changed. A block is scanned
//! until the first line that is not a trunk statement, the "before" and
//! "after" memberships are accumulated, and the block is re-emitted as:
//!
//! 1. the unchanged membership (context, only when both sides are present),
//! 2. true removals (`-`),
//! 3. true additions (`+`).
//!
//! The first emitted line says `switchport trunk allowed vlan <list>`; every
//! later line in the block says `... vlan add <list>`.

use tracing::debug;

use crate::classify::{indent_width, VlanStatement, VLAN_PHRASE};
use crate::error::Result;
use crate::line::{Marker, OutputLine};

use super::range::{self, VlanId, VlanSet};

/// Result of reconciling one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
    /// Lines to emit in place of the block.
    pub lines: Vec<OutputLine>,
    /// Index of the first line not consumed by the block.
    pub next: usize,
    /// Whether the block contained any `-`/`+` statement.
    pub has_changes: bool,
}

#[derive(Debug, Default)]
struct BlockScan {
    before: VlanSet,
    after: VlanSet,
    all: VlanSet,
    context: Vec<OutputLine>,
    has_changes: bool,
    indent: Option<usize>,
}

impl BlockScan {
    fn absorb(&mut self, line: &str, stmt: &VlanStatement, max_vlan_id: VlanId) -> Result<()> {
        let ids = stmt.ids(max_vlan_id)?;
        self.indent.get_or_insert_with(|| indent_width(line));
        match stmt.marker {
            Marker::Removed => {
                self.has_changes = true;
                self.before.extend(ids.iter().copied());
                self.all.extend(ids);
            }
            Marker::Added => {
                self.has_changes = true;
                self.after.extend(ids.iter().copied());
                self.all.extend(ids);
            }
            Marker::None => {
                self.all.extend(ids);
                self.context.push(OutputLine::raw(line));
            }
        }
        Ok(())
    }

    fn finish(self, max_per_line: usize) -> Vec<OutputLine> {
        if !self.has_changes {
            return self.context;
        }

        let mut emitter = Emitter {
            indent: self.indent.unwrap_or(0),
            max_per_line,
            out: Vec::new(),
        };

        if !self.before.is_empty() && !self.after.is_empty() {
            let exclusive: VlanSet = self
                .before
                .symmetric_difference(&self.after)
                .copied()
                .collect();
            let unchanged: VlanSet = self.all.difference(&exclusive).copied().collect();
            emitter.emit(Marker::None, &unchanged);
        }

        let removed: VlanSet = self.before.difference(&self.after).copied().collect();
        emitter.emit(Marker::Removed, &removed);

        let added: VlanSet = self.after.difference(&self.before).copied().collect();
        emitter.emit(Marker::Added, &added);

        debug!(
            before = self.before.len(),
            after = self.after.len(),
            removed = removed.len(),
            added = added.len(),
            lines = emitter.out.len(),
            "reconciled vlan block"
        );
        emitter.out
    }
}

struct Emitter {
    indent: usize,
    max_per_line: usize,
    out: Vec<OutputLine>,
}

impl Emitter {
    fn emit(&mut self, marker: Marker, ids: &VlanSet) {
        let tokens = range::tokens(ids.iter().copied());
        for chunk in range::chunk(&tokens, self.max_per_line) {
            let phrase = if self.out.is_empty() {
                VLAN_PHRASE.to_string()
            } else {
                format!("{VLAN_PHRASE} add")
            };
            let text = format!("{} {}", phrase, range::join(chunk));
            self.out.push(OutputLine::new(marker, self.indent, text));
        }
    }
}

/// Reconcile the run of trunk statements starting at `lines[start]`.
///
/// Scanning stops at the first line that is not a trunk statement; that line
/// is left for the caller (`BlockOutcome::next` points at it). Lines are
/// compared with trailing whitespace removed. Ids above `max_vlan_id` make
/// the block fail with `MalformedRange`.
pub fn reconcile_block(
    lines: &[&str],
    start: usize,
    max_per_line: usize,
    max_vlan_id: VlanId,
) -> Result<BlockOutcome> {
    let mut scan = BlockScan::default();
    let mut next = start;

    while let Some(raw) = lines.get(next) {
        let line = raw.trim_end();
        let Some(stmt) = VlanStatement::parse(line) else {
            break;
        };
        scan.absorb(line, &stmt, max_vlan_id)?;
        next += 1;
    }

    let has_changes = scan.has_changes;
    Ok(BlockOutcome {
        lines: scan.finish(max_per_line),
        next,
        has_changes,
    })
}

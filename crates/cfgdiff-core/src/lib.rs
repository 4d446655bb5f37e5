//! cfgdiff Core Library
//!
//! Minimizes unified diffs of network device configurations: drops
//! device-generated noise and reduces VLAN trunk membership rewrites to the
//! ids that really changed. The orchestration layer around the core (settings,
//! git diff source, concurrent collection, report rendering) lives here too.

pub mod classify;
pub mod collect;
pub mod error;
pub mod hostname;
pub mod line;
pub mod noise;
pub mod normalize;
pub mod obs;
pub mod report;
pub mod settings;
pub mod source;
pub mod telemetry;
pub mod vlan;

pub use classify::{classify, strip_hunk_header, LineKind, VlanStatement, VLAN_PHRASE};
pub use collect::{Collector, DeviceOutcome, DEFAULT_MAX_CONCURRENT};
pub use error::{CfgDiffError, Result};
pub use hostname::{HostnameMatcher, UNKNOWN_HOSTNAME};
pub use line::{Marker, OutputLine};
pub use noise::NoiseFilter;
pub use normalize::{
    normalize_diff, DiffNormalizer, NormalizeConfig, NormalizedDiff, DEFAULT_MAX_VLANS_PER_LINE,
    DEFAULT_PREAMBLE_LINES,
};
pub use report::{render_html, render_text, report_subject, write_report, DeviceReport, Report};
pub use settings::Settings;
pub use source::{is_git_repo, list_config_files, DiffSource, GitDiffSource};
pub use vlan::{
    chunk, compress, expand, expand_within, reconcile_block, BlockOutcome, RangeToken, VlanId,
    VlanSet, DEFAULT_MAX_VLAN_ID,
};

/// Library version, shown by `cfgdiff --version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

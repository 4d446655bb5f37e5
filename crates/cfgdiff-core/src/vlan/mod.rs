//! VLAN trunk membership handling.
//!
//! - [`range`]: compact range notation codec (`"1-3,5"` ⇄ id set)
//! - [`reconcile`]: collapses a run of trunk statements into the minimal
//!   unchanged/removed/added lines

pub mod range;
pub mod reconcile;

pub use range::{
    chunk, compress, expand, expand_within, RangeToken, VlanId, VlanSet, DEFAULT_MAX_VLAN_ID,
};
pub use reconcile::{reconcile_block, BlockOutcome};

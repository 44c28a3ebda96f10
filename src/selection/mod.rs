// Selection module.
// The in-memory model of chosen repositories/workflows and its reversible
// text encoding used in URLs and persisted dashboards.

pub mod codec;
pub mod model;

pub use codec::{decode, encode};
pub use model::{RepoSelection, Selection};

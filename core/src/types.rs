//! Shared primitive types used across the entire pipeline.

/// The canonical supplier key ("True ID") shared by every OCDS table.
pub type SupplierId = String;

/// A contract identifier. In OCDS flattened exports this is the
/// `_link_main` / `_link` key of the release.
pub type ContractId = String;

/// The canonical run identifier.
pub type RunId = String;

/// Zero-based row position in the source table, used for stable ordering.
pub type SourceRow = usize;

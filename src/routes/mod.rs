/// Router Module Index
///
/// Splits the catalog routes by whether the gate may demand a token. Authorization itself
/// lives in the `RequestGate`, not in router layers.

/// Read-only routes, open to anonymous callers.
pub mod public;

/// Mutating routes. The gate requires a verified token, and a role for creation.
pub mod protected;

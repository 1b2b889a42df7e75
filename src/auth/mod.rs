//! Authentication support shared with the catalog API service.
//!
//! Only the token revocation list lives here; issuance and verification
//! belong to the API service itself.

mod revocation;

pub use revocation::RevocationList;

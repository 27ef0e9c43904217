//! Session identity model.

use serde::{Deserialize, Serialize};

/// An anonymous session user. The id is opaque, stable for the lifetime of
/// the session, and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
}

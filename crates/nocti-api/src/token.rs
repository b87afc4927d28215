//! Admin token handling.
//!
//! The token is a bearer-like credential sent only as the
//! `X-Admin-Token` header on authenticated calls. It is zeroized on
//! drop and never appears in Debug output or logs.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bearer credential for the authenticated admin/stats surface.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AdminToken(String);

impl AdminToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw header value. Callers must not log this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for AdminToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminToken(***)")
    }
}

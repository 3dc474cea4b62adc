//! Ownership authorization.
//!
//! `require_owner` is the single authorization primitive: every mutating
//! operation on an owned resource routes through it before touching
//! persisted state. It fails closed and never errors, so callers branch on
//! a boolean and map denial to a generic "not authorized" response.

use crate::auth::session::{AuthStage, Session};

/// True only when the session is Authenticated and its identity owns the
/// resource. Any unauthenticated session, and any mismatch, is denied.
pub fn require_owner(session: &Session, resource_owner_id: i32) -> bool {
    session.stage() == AuthStage::Authenticated && session.identity_id == Some(resource_owner_id)
}

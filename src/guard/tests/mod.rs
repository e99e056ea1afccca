//! Tests for the handoff guard.

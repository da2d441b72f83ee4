// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod identity;
pub mod report;
pub mod session;
pub mod user;

pub use identity::{Identity, IdentityList};
pub use report::{RefreshCandidate, ScanReport};
pub use session::{Session, SessionList};
pub use user::{DirectoryUser, UserList};

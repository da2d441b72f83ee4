// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod appwrite;
pub mod directory;
pub mod expiry;
pub mod refresh;
pub mod scanner;

pub use appwrite::{AppwriteClient, AppwriteConnector};
pub use directory::{DirectoryClient, DirectoryConnector};
pub use expiry::{ExpiryCheck, ExpiryEvaluator, MissingExpiryPolicy, TokenMaterial};
pub use refresh::{RefreshError, RefreshedToken, TokenRefresher};
pub use scanner::DirectoryScanner;

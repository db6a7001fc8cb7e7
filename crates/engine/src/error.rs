// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use nt_adapters::ApiError;
use thiserror::Error;

/// Errors from status reconciliation
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("status patch failed: {0}")]
    Api(#[from] ApiError),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

// SPDX-FileCopyrightText: 2026 Maestro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the language-model capability.

use async_trait::async_trait;

use crate::error::MaestroError;
use crate::types::{ProviderRequest, ProviderResponse};

/// Sends a conversation to a model and returns either text or tool invocations.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Sends a completion request and returns the full response.
    ///
    /// Any failure here is a transport error and aborts the calling session.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MaestroError>;
}

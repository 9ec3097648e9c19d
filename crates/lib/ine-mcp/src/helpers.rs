use std::borrow::Cow;

use ine_core::IneError;
use rmcp::ErrorData;
use rmcp::model::ErrorCode;

pub(crate) fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Maps control plane failures onto MCP errors. Bad arguments are the
/// caller's fault; everything else is an upstream or decoding failure.
pub(crate) fn map_err(err: IneError) -> ErrorData {
    if err.is_invalid_params() {
        return mcp_err(ErrorCode::INVALID_PARAMS, err.to_string());
    }
    tracing::warn!(error = %err, "tool call failed");
    mcp_err(ErrorCode::INTERNAL_ERROR, err.to_string())
}

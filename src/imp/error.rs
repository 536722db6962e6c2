// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Can't create {label}: {reason}")]
    ResourceCreationFailed { label: String, reason: String },
}

impl Error {
    pub(crate) fn creation_failed(label: &str, reason: impl Into<String>) -> Self {
        Error::ResourceCreationFailed {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

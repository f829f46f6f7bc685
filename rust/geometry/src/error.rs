// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Unsupported representation item: {0}")]
    Unsupported(String),

    #[error("Representation nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("Core parser error: {0}")]
    CoreError(#[from] bim_showcase_core::Error),
}

impl Error {
    pub fn geometry(message: impl Into<String>) -> Self {
        Error::Geometry(message.into())
    }
}

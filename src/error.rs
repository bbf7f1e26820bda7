// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use std::fmt;

use crate::entity::EntityId;

/// ECS error type
///
/// Only the fail-fast categories live here. Reading a store slot that was
/// never initialized is a caller-contract violation and is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Mutation attempted on a destroyed entity
    InvalidState(String),

    /// Internal bookkeeping was violated (e.g. id slot already occupied)
    InvariantViolation(String),

    /// No live entity at this id
    EntityNotFound(EntityId),

    /// Rejected world configuration
    Config(String),
}

impl EcsError {
    pub(crate) fn destroyed(id: EntityId, action: &str) -> Self {
        EcsError::InvalidState(format!("cannot {action} destroyed entity {id}"))
    }
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
            EcsError::InvariantViolation(msg) => write!(f, "Invariant violation: {msg}"),
            EcsError::EntityNotFound(id) => write!(f, "Entity {id} not found"),
            EcsError::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<serde_json::Error> for EcsError {
    fn from(err: serde_json::Error) -> Self {
        EcsError::Config(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroyed_message() {
        let err = EcsError::destroyed(7, "add components to");
        assert_eq!(
            err.to_string(),
            "Invalid state: cannot add components to destroyed entity 7"
        );
    }
}

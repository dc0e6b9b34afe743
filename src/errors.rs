//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`ArborError`] covers all failure modes including:
//! - Structural violations of the scene tree (cycles, double attachment)
//! - Type registry and resource lookup failures
//! - Malformed serialized data
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ArborError>`.
//!
//! Structural errors indicate programmer error and are surfaced to the
//! caller immediately. Data-level errors (bad file, missing id) are
//! recovered locally by the call site with a logged diagnostic, so that one
//! corrupt resource cannot take down a whole loaded scene.

use thiserror::Error;

/// The main error type for the Arbor core.
#[derive(Error, Debug)]
pub enum ArborError {
    // ========================================================================
    // Structural Errors (scene tree contract violations)
    // ========================================================================
    /// Appending a node would introduce a cycle in the scene tree.
    #[error("Cyclic reference prohibited in node hierarchy: \"{node}\" is an ancestor of the target parent")]
    CycleDetected {
        /// Name of the offending node
        node: String,
    },

    /// The node is already attached to a different parent.
    #[error("Node \"{node}\" is already attached to another parent; detach it first")]
    NodeAttached {
        /// Name of the offending node
        node: String,
    },

    /// The component is already attached to a different node.
    #[error("Component of type \"{type_name}\" is already attached to a node; detach it first")]
    ComponentAttached {
        /// Runtime type name of the component
        type_name: &'static str,
    },

    /// A node handle did not resolve to a live node.
    #[error("Node handle is stale or was never part of this graph")]
    NodeNotFound,

    // ========================================================================
    // Registry & Resource Errors
    // ========================================================================
    /// The type tag of a serialization is not present in the registry.
    #[error("Unknown type tag \"{0}\"; was the type registered at startup?")]
    UnknownType(String),

    /// The requested resource id is not present in the project.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    // ========================================================================
    // Data Errors
    // ========================================================================
    /// JSON parsing or value conversion error.
    #[error("Malformed data: {0}")]
    MalformedData(#[from] serde_json::Error),

    /// A serialization payload is missing a required field.
    #[error("Serialization of \"{type_name}\" is missing field \"{field}\"")]
    MissingField {
        /// Type tag of the payload being deserialized
        type_name: String,
        /// Name of the absent field
        field: String,
    },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error (filesystem-backed resource loader).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Alias for `Result<T, ArborError>`.
pub type Result<T> = std::result::Result<T, ArborError>;

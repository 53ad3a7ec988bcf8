//! Configuration validation.
//!
//! # Responsibilities
//! - Reject network names the default binder does not know
//! - Reject empty address lists and blank addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Bind failures (ports in use, unresolvable hosts) are left to bind time

use thiserror::Error;

use crate::config::schema::MultiListenerConfig;
use crate::net::Network;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),

    #[error("network {0:?} has no addresses")]
    NoAddresses(String),

    #[error("network {network:?} has a blank address at index {index}")]
    BlankAddress { network: String, index: usize },

    #[error("no listeners configured")]
    NoListeners,
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &MultiListenerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listeners.is_empty() {
        errors.push(ValidationError::NoListeners);
    }

    for (network, addresses) in &config.listeners {
        if network.parse::<Network>().is_err() {
            errors.push(ValidationError::UnknownNetwork(network.clone()));
        }
        if addresses.is_empty() {
            errors.push(ValidationError::NoAddresses(network.clone()));
        }
        for (index, address) in addresses.iter().enumerate() {
            if address.trim().is_empty() {
                errors.push(ValidationError::BlankAddress {
                    network: network.clone(),
                    index,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

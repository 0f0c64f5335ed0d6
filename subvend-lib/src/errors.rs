//! Error types for vending machine and factory operations.
//!
//! Every precondition violation aborts the whole operation with one of these
//! variants and no partial state change; nothing is retried or swallowed
//! inside the core.

use std::fmt;

/// Error codes for FFI and host integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum VendErrorCode {
    /// Caller is not allowed to perform the operation
    Unauthorized = 1000,
    /// Registration attempted while the machine is paused
    Paused = 2000,
    /// Label failed structural validation
    InvalidLabel = 2001,
    /// Subnode already has an owner
    AlreadyRegistered = 2002,
    /// Token pull for the registration fee failed
    Payment = 3000,
    /// Withdrawal exceeds the held balance
    InsufficientFunds = 3001,
    /// A vending machine already exists for the parent node
    AlreadyDeployed = 4000,
    /// Deployer is not the registry-recorded owner of the parent node
    NotDomainOwner = 4001,
    /// A required collaborator address is the null account
    ZeroAddress = 4002,
    /// Malformed input data
    InvalidData = 5000,
}

/// Comprehensive error type for subvend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendError {
    /// Caller lacks the authority for an operation.
    Unauthorized {
        /// Operation that was attempted
        operation: &'static str,
        /// Caller identity
        caller: String,
    },

    /// The machine is paused; registration is disabled.
    Paused,

    /// Label failed structural validation.
    InvalidLabel {
        /// Reason for rejection
        reason: String,
    },

    /// The derived subnode already has a non-null owner.
    AlreadyRegistered {
        /// Label that was requested
        label: String,
        /// Current registry-recorded owner
        owner: String,
    },

    /// The token pull for the registration fee could not complete.
    Payment {
        /// Units the machine tried to pull
        required: u128,
        /// Underlying failure
        reason: String,
    },

    /// Withdrawal amount exceeds the machine's held balance.
    InsufficientFunds {
        /// Units requested
        requested: u128,
        /// Units actually held
        available: u128,
    },

    /// A vending machine already exists for this parent node.
    AlreadyDeployed {
        /// Parent node identifier
        parent_node: String,
    },

    /// The registry-recorded owner of the parent node is someone else.
    NotDomainOwner {
        /// Parent node identifier
        parent_node: String,
        /// Owner the registry actually records
        recorded_owner: String,
    },

    /// A required collaborator address is the null account.
    ZeroAddress {
        /// Field or parameter name
        field: &'static str,
    },

    /// Malformed input data (parsing, snapshots).
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

impl VendError {
    /// Get the error code for FFI/host integration.
    pub fn code(&self) -> VendErrorCode {
        match self {
            Self::Unauthorized { .. } => VendErrorCode::Unauthorized,
            Self::Paused => VendErrorCode::Paused,
            Self::InvalidLabel { .. } => VendErrorCode::InvalidLabel,
            Self::AlreadyRegistered { .. } => VendErrorCode::AlreadyRegistered,
            Self::Payment { .. } => VendErrorCode::Payment,
            Self::InsufficientFunds { .. } => VendErrorCode::InsufficientFunds,
            Self::AlreadyDeployed { .. } => VendErrorCode::AlreadyDeployed,
            Self::NotDomainOwner { .. } => VendErrorCode::NotDomainOwner,
            Self::ZeroAddress { .. } => VendErrorCode::ZeroAddress,
            Self::InvalidData { .. } => VendErrorCode::InvalidData,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Create an unauthorized error.
    pub fn unauthorized(operation: &'static str, caller: impl ToString) -> Self {
        Self::Unauthorized {
            operation,
            caller: caller.to_string(),
        }
    }

    /// Create an invalid label error.
    pub fn invalid_label(reason: impl Into<String>) -> Self {
        Self::InvalidLabel {
            reason: reason.into(),
        }
    }

    /// Create an already-registered error.
    pub fn already_registered(label: impl Into<String>, owner: impl ToString) -> Self {
        Self::AlreadyRegistered {
            label: label.into(),
            owner: owner.to_string(),
        }
    }

    /// Create a payment error.
    pub fn payment(required: u128, reason: impl Into<String>) -> Self {
        Self::Payment {
            required,
            reason: reason.into(),
        }
    }

    /// Create an insufficient funds error.
    pub fn insufficient_funds(requested: u128, available: u128) -> Self {
        Self::InsufficientFunds {
            requested,
            available,
        }
    }

    /// Create an already-deployed error.
    pub fn already_deployed(parent_node: impl ToString) -> Self {
        Self::AlreadyDeployed {
            parent_node: parent_node.to_string(),
        }
    }

    /// Create a not-domain-owner error.
    pub fn not_domain_owner(parent_node: impl ToString, recorded_owner: impl ToString) -> Self {
        Self::NotDomainOwner {
            parent_node: parent_node.to_string(),
            recorded_owner: recorded_owner.to_string(),
        }
    }

    /// Create a zero-address error.
    pub fn zero_address(field: &'static str) -> Self {
        Self::ZeroAddress { field }
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for VendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized { operation, caller } => {
                write!(f, "{} not authorized for caller {}", operation, caller)
            }
            Self::Paused => write!(f, "vending machine is paused"),
            Self::InvalidLabel { reason } => write!(f, "invalid label: {}", reason),
            Self::AlreadyRegistered { label, owner } => {
                write!(f, "label {:?} is already registered to {}", label, owner)
            }
            Self::Payment { required, reason } => {
                write!(f, "payment of {} units failed: {}", required, reason)
            }
            Self::InsufficientFunds {
                requested,
                available,
            } => {
                write!(
                    f,
                    "insufficient funds: requested {} units, holding {}",
                    requested, available
                )
            }
            Self::AlreadyDeployed { parent_node } => {
                write!(f, "vending machine already deployed for {}", parent_node)
            }
            Self::NotDomainOwner {
                parent_node,
                recorded_owner,
            } => {
                write!(
                    f,
                    "parent node {} is owned by {}, not the requested deployer",
                    parent_node, recorded_owner
                )
            }
            Self::ZeroAddress { field } => write!(f, "{} must not be the zero address", field),
            Self::InvalidData { field, reason } => write!(f, "invalid {}: {}", field, reason),
        }
    }
}

impl std::error::Error for VendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = VendError::insufficient_funds(100, 40);
        assert_eq!(err.code(), VendErrorCode::InsufficientFunds);
        assert_eq!(err.code() as i32, 3001);
    }

    #[test]
    fn test_error_display() {
        let err = VendError::payment(10, "allowance too low");
        assert!(err.to_string().contains("payment of 10 units"));
        assert!(err.to_string().contains("allowance too low"));

        let err = VendError::already_registered("player1", "0xabc");
        assert!(err.to_string().contains("player1"));
    }

    #[test]
    fn test_helper_constructors() {
        let err = VendError::unauthorized("set_price", "0xdead");
        assert_eq!(err.code(), VendErrorCode::Unauthorized);

        let err = VendError::zero_address("registry");
        assert_eq!(err.code(), VendErrorCode::ZeroAddress);
        assert!(err.message().contains("registry"));
    }
}

//! The module contains the errors the engine can throw.
//!
//! Most variants are validation failures raised before anything is written
//! ([`InvalidAmount`], [`InvalidSplit`], [`InvalidName`], [`NotMember`]) or
//! access failures ([`Forbidden`], [`KeyNotFound`]).
//!
//! [`ResidualImbalance`] is different: it is raised while *reading*, when the
//! stored expenses and settlements of a group no longer sum to zero over the
//! current roster. It always points at a data-integrity bug upstream.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidSplit`]: EngineError::InvalidSplit
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`NotMember`]: EngineError::NotMember
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ResidualImbalance`]: EngineError::ResidualImbalance
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Not a group member: {0}")]
    NotMember(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Residual imbalance after simplification: {0}")]
    ResidualImbalance(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidSplit(a), Self::InvalidSplit(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::NotMember(a), Self::NotMember(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::ResidualImbalance(a), Self::ResidualImbalance(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

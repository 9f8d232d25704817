use thiserror::Error;

use crate::round::Phase;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoundError {
    #[error("Invalid bet amount: {amount}, wallet balance: {balance}")]
    InvalidBet { amount: u64, balance: u64 },
    #[error("Insufficient funds to double down: bet {bet}, wallet balance: {balance}")]
    InsufficientFundsForDoubleDown { bet: u64, balance: u64 },
    #[error("Wallet is empty, reset it to keep playing")]
    SessionOver,
    #[error("Bets are only taken between rounds (current phase: {phase:?})")]
    BetOutsideBetting { phase: Phase },
    #[error("Round still in progress")]
    RoundInProgress,
    #[error("No cards left to draw")]
    DeckExhausted,
    #[error("Invalid table config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RoundError>;

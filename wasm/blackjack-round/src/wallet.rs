use crate::error::{Result, RoundError};
use crate::round::Outcome;

/// Player balance plus the stake riding on the current round. The stake is
/// taken out of the balance when it is placed.
///
/// Bets are only accepted while the largest possible payout still fits in the
/// balance, so settling never overflows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    balance: u64,
    bet: u64,
    starting_balance: u64,
}

impl Wallet {
    pub fn new(starting_balance: u32) -> Self {
        Wallet {
            balance: u64::from(starting_balance),
            bet: 0,
            starting_balance: u64::from(starting_balance),
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    pub fn is_empty(&self) -> bool {
        self.balance == 0 && self.bet == 0
    }

    /// Balance after a win on `bet`, given `balance` already debited.
    fn winning_balance(balance: u64, bet: u64) -> Option<u64> {
        bet.checked_mul(2)?.checked_add(balance)
    }

    pub fn place_bet(&mut self, amount: u64) -> Result<()> {
        let invalid = RoundError::InvalidBet {
            amount,
            balance: self.balance,
        };
        if amount == 0 || amount > self.balance {
            return Err(invalid);
        }
        let stake = self.bet + amount;
        if Self::winning_balance(self.balance - amount, stake).is_none() {
            return Err(invalid);
        }
        self.balance -= amount;
        self.bet = stake;
        Ok(())
    }

    pub fn double_bet(&mut self) -> Result<()> {
        let insufficient = RoundError::InsufficientFundsForDoubleDown {
            bet: self.bet,
            balance: self.balance,
        };
        if self.bet > self.balance {
            return Err(insufficient);
        }
        let stake = self.bet * 2;
        if Self::winning_balance(self.balance - self.bet, stake).is_none() {
            return Err(insufficient);
        }
        self.balance -= self.bet;
        self.bet = stake;
        Ok(())
    }

    /// Pays out the stake for `outcome` and clears it. Returns the amount
    /// credited back to the balance.
    pub fn settle(&mut self, outcome: Outcome) -> u64 {
        let credited = match outcome {
            Outcome::PlayerWin => self.bet * 2,
            Outcome::Tie => self.bet,
            Outcome::DealerWin => 0,
        };
        self.balance += credited;
        self.bet = 0;
        credited
    }

    pub fn reset(&mut self) {
        self.balance = self.starting_balance;
        self.bet = 0;
    }
}

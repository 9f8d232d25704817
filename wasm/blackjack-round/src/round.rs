use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    card::{Card, CardView},
    config::TableConfig,
    deck::Deck,
    error::{Result, RoundError},
    hand::{Hand, HandValue, Party},
    wallet::Wallet,
};

/// The dealer keeps drawing while below this total, whatever the player holds.
pub const DEALER_STANDS_ON: u16 = 17;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Betting,
    Dealing,
    PlayerTurn,
    DealerTurn,
    Settled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    PlayerWin,
    DealerWin,
    Tie,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SettleReason {
    PlayerBust,
    DealerBust,
    HigherTotal,
    EqualTotals,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub outcome: Outcome,
    pub reason: SettleReason,
    pub player_total: u16,
    pub dealer_total: u16,
    pub bet: u64,
    /// Amount credited back to the wallet: twice the bet on a win, the bet
    /// itself on a tie, nothing on a loss.
    pub payout: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TableEvent {
    #[serde(rename_all = "camelCase")]
    BetPlaced { amount: u64, balance: u64 },
    #[serde(rename_all = "camelCase")]
    CardDealt { party: Party, card: CardView },
    #[serde(rename_all = "camelCase")]
    HiddenCardRevealed { card: Card },
    #[serde(rename_all = "camelCase")]
    BetDoubled { bet: u64, balance: u64 },
    #[serde(rename_all = "camelCase")]
    DeckReshuffled { remaining: usize },
    RoundSettled(Settlement),
    SessionOver,
    #[serde(rename_all = "camelCase")]
    WalletReset { balance: u64 },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub phase: Phase,
    pub balance: u64,
    pub bet: u64,
    pub player_cards: Vec<CardView>,
    pub dealer_cards: Vec<CardView>,
    pub player_value: HandValue,
    pub dealer_value: HandValue,
    pub settlement: Option<Settlement>,
    pub session_over: bool,
    pub deck_remaining: usize,
}

/// Decides a finished round. A player bust beats everything, then a dealer
/// bust, then the higher total.
pub fn resolve(player: HandValue, dealer: HandValue) -> (Outcome, SettleReason) {
    if player.is_bust() {
        return (Outcome::DealerWin, SettleReason::PlayerBust);
    }
    if dealer.is_bust() {
        return (Outcome::PlayerWin, SettleReason::DealerBust);
    }
    match player.total.cmp(&dealer.total) {
        Ordering::Greater => (Outcome::PlayerWin, SettleReason::HigherTotal),
        Ordering::Less => (Outcome::DealerWin, SettleReason::HigherTotal),
        Ordering::Equal => (Outcome::Tie, SettleReason::EqualTotals),
    }
}

/// One player against the dealer, from the bet to the payout.
///
/// All table state lives here and every operation takes `&mut self`, so
/// actions are applied strictly one after another. Rejected actions return
/// an error and leave the table as it was; hit, stand and double-down outside
/// the player's turn are ignored.
pub struct RoundController {
    deck: Deck,
    player: Hand,
    dealer: Hand,
    wallet: Wallet,
    phase: Phase,
    settlement: Option<Settlement>,
    events: Vec<TableEvent>,
}

impl RoundController {
    pub fn new(config: TableConfig) -> Result<Self> {
        let deck = Deck::new(config.seed);
        Self::with_deck(config, deck)
    }

    pub fn with_deck(config: TableConfig, deck: Deck) -> Result<Self> {
        let config = config.validate()?;
        Ok(RoundController {
            deck,
            player: Hand::new(),
            dealer: Hand::new(),
            wallet: Wallet::new(config.starting_balance),
            phase: Phase::Betting,
            settlement: None,
            events: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self) -> &Hand {
        &self.player
    }

    pub fn dealer(&self) -> &Hand {
        &self.dealer
    }

    pub fn balance(&self) -> u64 {
        self.wallet.balance()
    }

    pub fn bet(&self) -> u64 {
        self.wallet.bet()
    }

    pub fn settlement(&self) -> Option<Settlement> {
        self.settlement
    }

    pub fn is_session_over(&self) -> bool {
        self.wallet.is_empty()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            phase: self.phase,
            balance: self.wallet.balance(),
            bet: self.wallet.bet(),
            player_cards: self.player.cards().iter().map(CardView::from).collect(),
            dealer_cards: self.dealer.cards().iter().map(CardView::from).collect(),
            player_value: self.player.value(),
            dealer_value: self.dealer.value(),
            settlement: self.settlement,
            session_over: self.is_session_over(),
            deck_remaining: self.deck.remaining_cards(),
        }
    }

    /// Takes a bet and deals the next round.
    pub fn place_bet(&mut self, amount: u64) -> Result<()> {
        if !matches!(self.phase, Phase::Betting | Phase::Settled) {
            warn!(amount, phase = ?self.phase, "Bet rejected while a round is in play");
            return Err(RoundError::BetOutsideBetting { phase: self.phase });
        }
        if self.wallet.is_empty() {
            warn!(amount, "Bet rejected, wallet is empty");
            return Err(RoundError::SessionOver);
        }
        if let Err(err) = self.wallet.place_bet(amount) {
            warn!(amount, balance = self.wallet.balance(), "Bet rejected");
            return Err(err);
        }

        info!(amount, balance = self.wallet.balance(), "Bet placed");
        self.events.push(TableEvent::BetPlaced {
            amount,
            balance: self.wallet.balance(),
        });
        self.deal()
    }

    fn deal(&mut self) -> Result<()> {
        self.phase = Phase::Dealing;
        self.settlement = None;
        let played = self.player.flush().into_iter().chain(self.dealer.flush());
        self.deck.discard(played);

        self.draw_to(Party::Player, false)?;
        self.draw_to(Party::Dealer, false)?;
        self.draw_to(Party::Player, false)?;
        self.draw_to(Party::Dealer, true)?;

        self.phase = Phase::PlayerTurn;
        debug!(
            player_total = self.player.total(),
            dealer_showing = self.dealer.total(),
            "Initial cards dealt"
        );
        Ok(())
    }

    pub fn hit(&mut self) -> Result<()> {
        if self.phase != Phase::PlayerTurn {
            debug!(phase = ?self.phase, "Ignoring hit outside the player's turn");
            return Ok(());
        }
        self.draw_to(Party::Player, false)?;
        if self.player.is_bust() {
            self.reveal_dealer();
            self.settle();
        }
        Ok(())
    }

    pub fn stand(&mut self) -> Result<()> {
        if self.phase != Phase::PlayerTurn {
            debug!(phase = ?self.phase, "Ignoring stand outside the player's turn");
            return Ok(());
        }
        self.play_dealer()?;
        self.settle();
        Ok(())
    }

    /// Doubles the bet, draws exactly one card and stands.
    pub fn double_down(&mut self) -> Result<()> {
        if self.phase != Phase::PlayerTurn {
            debug!(phase = ?self.phase, "Ignoring double down outside the player's turn");
            return Ok(());
        }
        if let Err(err) = self.wallet.double_bet() {
            warn!(
                bet = self.wallet.bet(),
                balance = self.wallet.balance(),
                "Double down rejected"
            );
            return Err(err);
        }
        info!(bet = self.wallet.bet(), balance = self.wallet.balance(), "Bet doubled");
        self.events.push(TableEvent::BetDoubled {
            bet: self.wallet.bet(),
            balance: self.wallet.balance(),
        });

        self.draw_to(Party::Player, false)?;
        if self.player.is_bust() {
            self.reveal_dealer();
        } else {
            self.play_dealer()?;
        }
        self.settle();
        Ok(())
    }

    /// Refills the wallet and returns every card to the deck.
    pub fn play_again(&mut self) -> Result<()> {
        if self.phase == Phase::PlayerTurn {
            return Err(RoundError::RoundInProgress);
        }
        let in_hands: Vec<Card> = self
            .player
            .flush()
            .into_iter()
            .chain(self.dealer.flush())
            .collect();
        self.deck.restore(in_hands);
        self.wallet.reset();
        self.settlement = None;
        self.phase = Phase::Betting;

        info!(balance = self.wallet.balance(), "Wallet reset");
        self.events.push(TableEvent::WalletReset {
            balance: self.wallet.balance(),
        });
        Ok(())
    }

    fn draw_to(&mut self, party: Party, hidden: bool) -> Result<()> {
        let reshuffles = self.deck.reshuffles();
        let mut card = self.deck.draw().ok_or(RoundError::DeckExhausted)?;
        if self.deck.reshuffles() != reshuffles {
            self.events.push(TableEvent::DeckReshuffled {
                remaining: self.deck.remaining_cards() + 1,
            });
        }
        if hidden {
            card.hide();
        }
        debug!(?party, card = %card, hidden, "Card drawn");

        self.events.push(TableEvent::CardDealt {
            party,
            card: CardView::from(&card),
        });
        match party {
            Party::Player => self.player.push(card),
            Party::Dealer => self.dealer.push(card),
        }
        Ok(())
    }

    fn reveal_dealer(&mut self) {
        let hidden: Vec<Card> = self
            .dealer
            .cards()
            .iter()
            .filter(|c| c.hidden)
            .copied()
            .collect();
        self.dealer.reveal_all();
        for mut card in hidden {
            card.reveal();
            self.events.push(TableEvent::HiddenCardRevealed { card });
        }
    }

    fn play_dealer(&mut self) -> Result<()> {
        self.phase = Phase::DealerTurn;
        self.reveal_dealer();
        while self.dealer.total() < DEALER_STANDS_ON {
            self.draw_to(Party::Dealer, false)?;
        }
        Ok(())
    }

    fn settle(&mut self) {
        let player = self.player.value();
        let dealer = self.dealer.value();
        let (outcome, reason) = resolve(player, dealer);
        let bet = self.wallet.bet();
        let payout = self.wallet.settle(outcome);

        let settlement = Settlement {
            outcome,
            reason,
            player_total: player.total,
            dealer_total: dealer.total,
            bet,
            payout,
        };
        info!(
            ?outcome,
            ?reason,
            player_total = player.total,
            dealer_total = dealer.total,
            bet,
            payout,
            balance = self.wallet.balance(),
            "Round settled"
        );
        self.settlement = Some(settlement);
        self.phase = Phase::Settled;
        self.events.push(TableEvent::RoundSettled(settlement));

        if self.wallet.is_empty() {
            info!("Wallet empty, session over");
            self.events.push(TableEvent::SessionOver);
        }
    }
}

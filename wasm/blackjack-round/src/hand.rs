use serde::Serialize;

use crate::card::Card;

pub const BLACKJACK: u16 = 21;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HandValue {
    pub total: u16,
    /// An Ace is still counted as 11.
    pub soft: bool,
}

impl HandValue {
    pub fn is_bust(&self) -> bool {
        self.total > BLACKJACK
    }
}

/// Value of the face-up cards in `cards`.
///
/// Every Ace starts at 11. While the total is over 21, Aces are demoted to 1
/// one at a time in hand order. Hidden cards are skipped entirely. The
/// cards are never modified, so repeated calls always agree.
pub fn hand_value(cards: &[Card]) -> HandValue {
    let mut total: u16 = 0;
    let mut high_aces = 0;

    for card in cards.iter().filter(|c| !c.hidden) {
        total += u16::from(card.value());
        if card.is_ace() {
            high_aces += 1;
        }
    }

    while total > BLACKJACK && high_aces > 0 {
        total -= 10;
        high_aces -= 1;
    }

    HandValue {
        total,
        soft: high_aces > 0,
    }
}

pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && cards.iter().all(|c| !c.hidden) && hand_value(cards).total == BLACKJACK
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Party {
    Player,
    Dealer,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn value(&self) -> HandValue {
        hand_value(&self.cards)
    }

    pub fn total(&self) -> u16 {
        self.value().total
    }

    pub fn is_bust(&self) -> bool {
        self.value().is_bust()
    }

    pub fn is_blackjack(&self) -> bool {
        is_blackjack(&self.cards)
    }

    pub fn has_hidden(&self) -> bool {
        self.cards.iter().any(|c| c.hidden)
    }

    /// Turns every card face up. Returns how many were face down.
    pub fn reveal_all(&mut self) -> usize {
        let mut revealed = 0;
        for card in self.cards.iter_mut().filter(|c| c.hidden) {
            card.reveal();
            revealed += 1;
        }
        revealed
    }

    /// Empties the hand, handing back its cards face up for the discard pool.
    pub fn flush(&mut self) -> Vec<Card> {
        let mut cards = std::mem::take(&mut self.cards);
        cards.iter_mut().for_each(Card::reveal);
        cards
    }
}

use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use tracing::debug;

use crate::card::{full_deck, Card};

/// A single 52-card deck with the shared discard pool.
///
/// Cards leave through [`Deck::draw`] and come back through
/// [`Deck::discard`]. When the deck runs dry the discard pool is shuffled in.
pub struct Deck {
    cards: Vec<Card>,
    discards: Vec<Card>,
    reshuffles: u32,
    rng: SmallRng,
}

impl Deck {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut deck = Deck {
            cards: full_deck(),
            discards: Vec::new(),
            reshuffles: 0,
            rng,
        };
        deck.cards.shuffle(&mut deck.rng);
        deck
    }

    /// A deck whose first draws are `top`, in order. The rest of the 52
    /// cards sit underneath, shuffled with `seed`. A card repeated in `top`
    /// is only dealt at its first position.
    #[doc(hidden)]
    pub fn stacked(top: &[Card], seed: u64) -> Self {
        let mut deck = Deck::new(Some(seed));
        let mut stack: Vec<Card> = Vec::with_capacity(top.len());
        for card in top {
            if !stack.iter().any(|c| c.key() == card.key()) {
                let mut card = *card;
                card.reveal();
                stack.push(card);
            }
        }
        deck.cards.retain(|c| !stack.iter().any(|s| s.key() == c.key()));
        // Draws pop from the back.
        deck.cards.extend(stack.into_iter().rev());
        deck
    }

    /// Takes the next card, shuffling the discard pool back in first if the
    /// deck is empty. `None` only when every card is sitting in a hand.
    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            self.reshuffle_discards();
        }
        self.cards.pop()
    }

    pub fn discard(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.discards.extend(cards.into_iter().map(|mut c| {
            c.reveal();
            c
        }));
    }

    /// Returns the discard pool and `cards` to the deck and shuffles all of it.
    pub fn restore(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.discard(cards);
        self.cards.append(&mut self.discards);
        self.cards.shuffle(&mut self.rng);
        self.reshuffles += 1;
        debug!(remaining = self.cards.len(), "Deck restored and shuffled");
    }

    fn reshuffle_discards(&mut self) {
        if self.discards.is_empty() {
            return;
        }
        self.cards.append(&mut self.discards);
        self.cards.shuffle(&mut self.rng);
        self.reshuffles += 1;
        debug!(remaining = self.cards.len(), "Discard pool shuffled back into deck");
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn discarded_cards(&self) -> usize {
        self.discards.len()
    }

    pub fn reshuffles(&self) -> u32 {
        self.reshuffles
    }

    #[cfg(test)]
    pub(crate) fn all_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().chain(self.discards.iter())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::card::{Rank, Suit};

    #[test]
    fn new_deck_holds_52_unique_cards() {
        let deck = Deck::new(Some(7));
        assert_eq!(deck.remaining_cards(), 52);
        let keys: HashSet<_> = deck.all_cards().map(Card::key).collect();
        assert_eq!(keys.len(), 52);
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = Deck::new(Some(42));
        let mut b = Deck::new(Some(42));
        let first: Vec<_> = (0..10).filter_map(|_| a.draw()).collect();
        let second: Vec<_> = (0..10).filter_map(|_| b.draw()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = Deck::new(Some(1));
        let mut b = Deck::new(Some(2));
        let first: Vec<_> = (0..10).filter_map(|_| a.draw()).collect();
        let second: Vec<_> = (0..10).filter_map(|_| b.draw()).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn stacked_deck_deals_top_in_order() {
        let top = [
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::King, Suit::Spades),
        ];
        let mut deck = Deck::stacked(&top, 3);
        assert_eq!(deck.remaining_cards(), 52);
        for card in top {
            assert_eq!(deck.draw(), Some(card));
        }
        let rest: HashSet<_> = deck.all_cards().map(Card::key).collect();
        assert_eq!(rest.len(), 49);
        assert!(!rest.contains(&(Rank::Ace, Suit::Hearts)));
    }

    #[test]
    fn stacked_deck_ignores_repeated_cards() {
        let ace = Card::new(Rank::Ace, Suit::Hearts);
        let two = Card::new(Rank::Two, Suit::Clubs);
        let mut deck = Deck::stacked(&[ace, two, ace, Card::face_down(Rank::Ace, Suit::Hearts)], 3);

        assert_eq!(deck.remaining_cards(), 52);
        let keys: HashSet<_> = deck.all_cards().map(Card::key).collect();
        assert_eq!(keys.len(), 52);
        assert_eq!(deck.draw(), Some(ace));
        assert_eq!(deck.draw(), Some(two));
        assert!(deck.all_cards().all(|c| c.key() != ace.key()));
    }

    #[test]
    fn exhaustion_reshuffles_discards() {
        let mut deck = Deck::new(Some(9));
        let drawn: Vec<_> = (0..52).filter_map(|_| deck.draw()).collect();
        assert_eq!(drawn.len(), 52);
        assert_eq!(deck.remaining_cards(), 0);

        deck.discard(drawn[..10].to_vec());
        assert_eq!(deck.discarded_cards(), 10);
        assert!(deck.draw().is_some());
        assert_eq!(deck.reshuffles(), 1);
        assert_eq!(deck.remaining_cards(), 9);
        assert_eq!(deck.discarded_cards(), 0);
    }

    #[test]
    fn empty_deck_and_pool_yields_none() {
        let mut deck = Deck::new(Some(11));
        for _ in 0..52 {
            deck.draw();
        }
        assert_eq!(deck.draw(), None);
        assert_eq!(deck.reshuffles(), 0);
    }

    #[test]
    fn restore_returns_everything() {
        let mut deck = Deck::new(Some(5));
        let in_hand: Vec<_> = (0..4).filter_map(|_| deck.draw()).collect();
        let discarded: Vec<_> = (0..6).filter_map(|_| deck.draw()).collect();
        deck.discard(discarded);
        deck.restore(in_hand);
        assert_eq!(deck.remaining_cards(), 52);
        assert_eq!(deck.discarded_cards(), 0);
    }

    #[test]
    fn discarded_cards_come_back_face_up() {
        let mut deck = Deck::new(Some(5));
        let mut card = deck.draw().unwrap();
        card.hide();
        deck.discard([card]);
        assert!(deck.all_cards().all(|c| !c.hidden));
    }
}

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod hand;
pub mod round;
pub mod wallet;

pub use card::{Card, CardView, Rank, Suit};
pub use config::TableConfig;
pub use deck::Deck;
pub use error::RoundError;
pub use hand::{hand_value, is_blackjack, Hand, HandValue, Party};
pub use round::{
    resolve, Outcome, Phase, RoundController, SettleReason, Settlement, TableEvent, TableSnapshot,
    DEALER_STANDS_ON,
};
pub use wallet::Wallet;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
}

fn rejected(action: &str, err: RoundError) -> JsValue {
    let message = format!("{action} rejected: {err}");
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

#[wasm_bindgen]
pub fn evaluate_hand(cards: &JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let cards: Vec<Card> = serde_wasm_bindgen::from_value(cards.clone())
        .map_err(|err| JsValue::from_str(&format!("Invalid input: {err}")))?;

    to_js(&hand_value(&cards))
}

/// A blackjack table for the page to drive. Every action returns the table
/// snapshot; events go to the listener when one is set, otherwise they queue
/// up for `drain_events`.
#[wasm_bindgen]
pub struct BlackjackTable {
    controller: RoundController,
    listener: Option<Function>,
}

#[wasm_bindgen]
impl BlackjackTable {
    #[wasm_bindgen(constructor)]
    pub fn new(config: &JsValue) -> Result<BlackjackTable, JsValue> {
        console_error_panic_hook::set_once();
        let config: TableConfig = if config.is_undefined() || config.is_null() {
            TableConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config.clone())
                .map_err(|err| JsValue::from_str(&format!("Invalid config: {err}")))?
        };
        let controller = RoundController::new(config)
            .map_err(|err| JsValue::from_str(&format!("Table setup failed: {err}")))?;

        Ok(BlackjackTable {
            controller,
            listener: None,
        })
    }

    pub fn set_listener(&mut self, listener: Function) {
        self.listener = Some(listener);
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn place_bet(&mut self, amount: u32) -> Result<JsValue, JsValue> {
        let result = self.controller.place_bet(u64::from(amount));
        self.finish("Bet", result)
    }

    pub fn hit(&mut self) -> Result<JsValue, JsValue> {
        let result = self.controller.hit();
        self.finish("Hit", result)
    }

    pub fn stand(&mut self) -> Result<JsValue, JsValue> {
        let result = self.controller.stand();
        self.finish("Stand", result)
    }

    pub fn double_down(&mut self) -> Result<JsValue, JsValue> {
        let result = self.controller.double_down();
        self.finish("Double down", result)
    }

    pub fn play_again(&mut self) -> Result<JsValue, JsValue> {
        let result = self.controller.play_again();
        self.finish("Play again", result)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.snapshot())
    }

    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.drain_events())
    }
}

impl BlackjackTable {
    fn finish(&mut self, action: &str, result: Result<(), RoundError>) -> Result<JsValue, JsValue> {
        result.map_err(|err| rejected(action, err))?;
        self.notify();
        to_js(&self.controller.snapshot())
    }

    /// Hands queued events to the listener. The action already went through,
    /// so a throwing listener is only reported on the console.
    fn notify(&mut self) {
        let Some(listener) = &self.listener else {
            return;
        };
        let failures = deliver(self.controller.drain_events(), |event| {
            listener.call1(&JsValue::NULL, &to_js(event)?).map(|_| ())
        });
        for err in failures {
            web_sys::console::error_2(&JsValue::from_str("Table listener failed:"), &err);
        }
    }
}

/// Sends every event in order, carrying on past failures. Returns the
/// failures.
fn deliver<E>(
    events: Vec<TableEvent>,
    mut send: impl FnMut(&TableEvent) -> Result<(), E>,
) -> Vec<E> {
    events
        .iter()
        .filter_map(|event| send(event).err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_round() -> RoundController {
        let top = [
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Two, Suit::Hearts),
            Card::new(Rank::Queen, Suit::Spades),
            Card::new(Rank::Three, Suit::Hearts),
            Card::new(Rank::Five, Suit::Clubs),
        ];
        let config = TableConfig {
            starting_balance: 50,
            seed: Some(4),
        };
        let mut controller = RoundController::with_deck(config, Deck::stacked(&top, 4)).unwrap();
        controller.place_bet(10).unwrap();
        controller.hit().unwrap();
        controller
    }

    #[test]
    fn failing_listener_still_gets_every_event() {
        let mut controller = finished_round();
        let events = controller.drain_events();
        let total = events.len();

        let mut seen = Vec::new();
        let failures = deliver(events, |event| {
            seen.push(event.clone());
            if seen.len() == 1 {
                Err("listener threw")
            } else {
                Ok(())
            }
        });

        assert_eq!(failures, vec!["listener threw"]);
        assert_eq!(seen.len(), total);
        assert!(matches!(seen.last(), Some(TableEvent::RoundSettled(_))));
        assert_eq!(controller.phase(), Phase::Settled);
        assert_eq!(controller.balance(), 40);
    }

    #[test]
    fn quiet_listener_reports_nothing() {
        let mut controller = finished_round();
        let failures: Vec<()> = deliver(controller.drain_events(), |_| Ok(()));
        assert!(failures.is_empty());
    }
}

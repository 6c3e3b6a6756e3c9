//! Event bus and deck event integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use tarot_deck::animation::RecordingScheduler;
use tarot_deck::core::{CardId, DeckConfig};
use tarot_deck::deck::CardDeck;
use tarot_deck::events::{DeckEvent, EventBus, EventName};
use tarot_deck::layout::Point;

type Log = Rc<RefCell<Vec<DeckEvent>>>;

fn log_on(deck: &mut CardDeck<RecordingScheduler>, name: EventName) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let l = Rc::clone(&log);
    deck.on(name, move |event| l.borrow_mut().push(event.clone()));
    log
}

// =============================================================================
// Bus Tests
// =============================================================================

#[test]
fn test_on_once_off() {
    let mut bus = EventBus::new();
    let hits = Rc::new(RefCell::new(Vec::new()));

    let h = Rc::clone(&hits);
    let every = bus.on(EventName::Fan, move |_| h.borrow_mut().push("on"));
    let h = Rc::clone(&hits);
    bus.once(EventName::Fan, move |_| h.borrow_mut().push("once"));

    assert_eq!(bus.fire(&DeckEvent::new(EventName::Fan)), 2);
    assert_eq!(bus.fire(&DeckEvent::new(EventName::Fan)), 1);
    assert_eq!(*hits.borrow(), vec!["on", "once", "on"]);

    assert!(bus.off(every));
    assert!(!bus.off(every));
    assert_eq!(bus.fire(&DeckEvent::new(EventName::Fan)), 0);
    assert_eq!(bus.handler_count(&EventName::Fan), 0);
}

#[test]
fn test_tagged_events_are_distinct() {
    let mut bus = EventBus::new();
    let hits = Rc::new(RefCell::new(0));
    let h = Rc::clone(&hits);
    bus.on(EventName::Spreado(Some(2)), move |_| *h.borrow_mut() += 1);

    bus.fire(&DeckEvent::new(EventName::Spreado(None)));
    bus.fire(&DeckEvent::new(EventName::Spreado(Some(1))));
    bus.fire(&DeckEvent::new(EventName::Spreado(Some(2))));
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn test_remove_all_and_clear() {
    let mut bus = EventBus::new();
    bus.on(EventName::Cut, |_| {});
    bus.on(EventName::Cut, |_| {});
    bus.on(EventName::Roll, |_| {});

    bus.remove_all_handlers(&EventName::Cut);
    assert_eq!(bus.handler_count(&EventName::Cut), 0);
    assert_eq!(bus.handler_count(&EventName::Roll), 1);

    bus.clear();
    assert_eq!(bus.handler_count(&EventName::Roll), 0);
}

// =============================================================================
// Name Tests
// =============================================================================

#[test]
fn test_event_strings() {
    let cases = [
        (EventName::ShuffleOne, "Deck:shuffleOne"),
        (EventName::BigBang, "Deck:bigBang"),
        (EventName::Spreado(Some(4)), "Deck:spreado:4"),
        (EventName::ReverseSpreado, "Deck:reverseSpreado"),
        (EventName::HandleLastCard, "Deck:handleLastCard"),
        (EventName::CardClick(Some("cut".into())), "Card:click.cut"),
        (EventName::UniQRaised, "Card:uniQ:1"),
        (EventName::SendToGrid, "Card:sendToGrid"),
    ];
    for (name, expected) in cases {
        assert_eq!(name.to_string(), expected);
    }

    assert!(EventName::RecenterGrid.is_card());
    assert!(EventName::CenterGrid.is_deck());
}

// =============================================================================
// Deck Event Tests
// =============================================================================

#[test]
fn test_card_event_carries_id() {
    let mut deck = CardDeck::new(DeckConfig::new(4), RecordingScheduler::new());
    let flips = log_on(&mut deck, EventName::Flip);

    deck.flip(CardId::new(3)).unwrap();
    assert!(flips.borrow().is_empty());
    deck.run_to_idle().unwrap();

    let flips = flips.borrow();
    assert_eq!(flips.len(), 1);
    assert_eq!(flips[0].card(), Some(CardId::new(3)));
    assert_eq!(flips[0].to_string(), "Card:flip [card_3]");
    assert!(deck.card(CardId::new(3)).unwrap().face_up);
}

#[test]
fn test_click_class() {
    let mut deck = CardDeck::new(DeckConfig::new(2), RecordingScheduler::new());
    let plain = log_on(&mut deck, EventName::CardClick(None));
    let tagged = log_on(&mut deck, EventName::CardClick(Some("draw".into())));

    deck.click(CardId::new(1), None).unwrap();
    deck.click(CardId::new(2), Some("draw")).unwrap();

    assert_eq!(plain.borrow().len(), 1);
    assert_eq!(tagged.borrow()[0].card(), Some(CardId::new(2)));
}

#[test]
fn test_center_grid_event_order() {
    let mut deck = CardDeck::new(DeckConfig::new(6), RecordingScheduler::new());
    for id in [5, 2] {
        deck.draw_to_grid(CardId::new(id), Point::default()).unwrap();
    }
    deck.run_to_idle().unwrap();

    let recenter = log_on(&mut deck, EventName::RecenterGrid);
    let centered = log_on(&mut deck, EventName::CenterGrid);

    deck.center_grid(Point::new(10.0, 0.0)).unwrap();
    let slots: Vec<(Option<CardId>, Option<usize>)> =
        recenter.borrow().iter().map(|e| (e.card(), e.slot)).collect();
    assert_eq!(slots, vec![(Some(CardId::new(5)), Some(0)), (Some(CardId::new(2)), Some(1))]);
    assert!(centered.borrow().is_empty());

    deck.run_to_idle().unwrap();
    assert_eq!(centered.borrow().len(), 1);
    assert_eq!(deck.grid_origin(), Some(Point::new(10.0, 0.0)));
}

#[test]
fn test_move_cards_away_payload() {
    let mut deck = CardDeck::new(DeckConfig::new(5), RecordingScheduler::new());
    let moved = log_on(&mut deck, EventName::MoveCardsAway);

    let cards = [CardId::new(1), CardId::new(4)];
    deck.move_cards_away(&cards).unwrap();
    deck.run_to_idle().unwrap();

    let moved = moved.borrow();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].cards.as_slice(), &cards);
}

//! Intent identifiers, descriptions and joined preference strings.

use stylesim::error::ConfigError;
use stylesim::preferences::{AtomicIntent, IntentSet};

#[test]
fn describe_joins_descriptions_in_declaration_order() {
    let forward = IntentSet::from([AtomicIntent::Concise, AtomicIntent::Organized]);
    let reversed = IntentSet::from([AtomicIntent::Organized, AtomicIntent::Concise]);
    assert_eq!(forward, reversed);
    assert_eq!(
        forward.describe(),
        format!(
            "{}, {}",
            AtomicIntent::Concise.description(),
            AtomicIntent::Organized.description()
        )
    );
    assert_eq!(forward.describe(), reversed.describe());
}

#[test]
fn empty_set_describes_as_empty_string() {
    let empty = IntentSet::new();
    assert!(empty.is_empty());
    assert_eq!(empty.describe(), "");
}

#[test]
fn duplicates_collapse() {
    let set = IntentSet::from([
        AtomicIntent::Teaching,
        AtomicIntent::Teaching,
        AtomicIntent::Technical,
    ]);
    assert_eq!(set.len(), 2);
    assert!(set.contains(AtomicIntent::Teaching));
}

#[test]
fn parse_ids_rejects_unknown_intent() {
    let err = IntentSet::parse_ids(&["concise", "sarcastic"]).expect_err("sarcastic is not an intent");
    assert_eq!(
        err,
        ConfigError::UnknownIntent {
            name: "sarcastic".to_owned()
        }
    );
}

#[test]
fn every_intent_round_trips_through_its_id() {
    for intent in AtomicIntent::ALL {
        let parsed: AtomicIntent = intent.id().parse().expect("id should parse");
        assert_eq!(parsed, intent);
        assert!(!intent.description().is_empty());
    }
}

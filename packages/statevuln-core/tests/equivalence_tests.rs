//! Equivalence oracles against a cached live implementation

mod common;

use common::*;
use prometheus::Registry;
use statevuln_core::config::{CacheConfig, EquivalenceConfig};
use statevuln_core::features::equivalence::{
    CountingRandomWordsOracle, EquivalenceOracle, HappyFlowOracle,
};
use statevuln_core::features::rules::HappyFlowCatalog;
use statevuln_core::features::sul_cache::{CacheStore, SulCache};
use statevuln_core::shared::models::MessageKind;
use statevuln_core::{MealyMachine, Response, Symbol};
use std::sync::Arc;

const SECOND_HELLO: usize = 6;
const SECOND_KEY_EXCHANGE: usize = 7;
const SECOND_CCS: usize = 8;

/// Hypothesis that keeps the renegotiated handshake in its own states
///
/// With `second_finished_ok` false, the second Finished leads to the error
/// state.
fn renegotiating_hypothesis(second_finished_ok: bool) -> MealyMachine {
    use MessageKind::*;

    let alphabet = rsa_alphabet();
    let mut m = MealyMachine::new(alphabet.clone(), 9, 0);
    for state in 0..9 {
        for symbol in alphabet.iter() {
            m.set_transition(state, *symbol, Response::IllegalTransition, ERROR);
        }
    }
    let flight = kinds(&[ServerHello, Certificate, ServerHelloDone]);
    let finished = kinds(&[ChangeCipherSpec, Finished]);
    m.set_transition(0, rsa_hello(), flight.clone(), 1);
    m.set_transition(1, Symbol::ClientKeyExchange, Response::silent(), 2);
    m.set_transition(2, Symbol::ChangeCipherSpec, Response::silent(), 3);
    m.set_transition(3, Symbol::Finished, finished.clone(), ESTABLISHED);
    m.set_transition(ESTABLISHED, rsa_hello(), flight, SECOND_HELLO);
    m.set_transition(SECOND_HELLO, Symbol::ClientKeyExchange, Response::silent(), SECOND_KEY_EXCHANGE);
    m.set_transition(SECOND_KEY_EXCHANGE, Symbol::ChangeCipherSpec, Response::silent(), SECOND_CCS);
    if second_finished_ok {
        m.set_transition(SECOND_CCS, Symbol::Finished, finished, ESTABLISHED);
    }
    m
}

fn cached_live() -> (SulCache<FakeSul>, Arc<SulCounters>) {
    let (live, counters) = FakeSul::new(rsa_server());
    let store = CacheStore::new(64, &Registry::new()).unwrap();
    (SulCache::new(live, store, &CacheConfig::default()), counters)
}

fn happy_flow_oracle() -> HappyFlowOracle {
    HappyFlowOracle::new(Arc::new(HappyFlowCatalog::from_flows(vec![rsa_happy_path()])))
}

#[test]
fn doubled_happy_flow_agrees_with_correct_hypothesis() {
    let (mut sul, counters) = cached_live();
    let found = happy_flow_oracle()
        .find_counterexample(&renegotiating_hypothesis(true), &mut sul)
        .unwrap();
    assert!(found.is_none());
    assert_eq!(counters.steps(), 8);
}

#[test]
fn doubled_happy_flow_catches_broken_second_finished() {
    let (mut sul, _) = cached_live();
    let ce = happy_flow_oracle()
        .find_counterexample(&renegotiating_hypothesis(false), &mut sul)
        .unwrap()
        .expect("second Finished must diverge");

    let mut doubled = rsa_happy_path();
    doubled.extend(rsa_happy_path());
    assert_eq!(ce.inputs, doubled);
    assert_eq!(ce.divergence_index(), 7);
    assert!(ce.live_outputs[7].contains(MessageKind::Finished));
}

#[test]
fn repeated_oracle_rounds_hit_the_cache() {
    let (mut sul, counters) = cached_live();
    let hypothesis = renegotiating_hypothesis(true);
    let mut oracle = happy_flow_oracle();
    oracle.find_counterexample(&hypothesis, &mut sul).unwrap();
    oracle.find_counterexample(&hypothesis, &mut sul).unwrap();
    assert_eq!(counters.pres(), 1);
    assert_eq!(sul.store().metrics().hits.get(), 8);
}

#[test]
fn random_words_are_reproducible() {
    let config = EquivalenceConfig::default()
        .min_length(1)
        .max_length(6)
        .random_queries(2_000)
        .seed(99);
    // Hypothesis wrongly expects an alert for the client's CCS
    let mut hypothesis = rsa_server();
    hypothesis.set_transition(2, Symbol::ChangeCipherSpec, kinds(&[MessageKind::Alert]), 3);
    let run = || {
        let (mut sul, _) = cached_live();
        CountingRandomWordsOracle::new(&config)
            .find_counterexample(&hypothesis, &mut sul)
            .unwrap()
    };
    let first = run();
    assert!(first.is_some());
    assert_eq!(first, run());
}

//! Hypotheses shared by the classifier tests

use crate::config::AnalysisConfig;
use crate::features::classifiers::ports::{AnalysisInput, PartialFindings};
use crate::features::rules::{HappyFlowCatalog, RuleBook};
use crate::shared::models::{
    Alphabet, HelloParams, MealyMachine, MessageKind, ProtocolRole, Response, SuiteCategory,
    Symbol,
};
use std::sync::Arc;

use MessageKind::*;

pub const ERROR: usize = 4;

pub fn ch() -> Symbol {
    Symbol::ClientHello(HelloParams::tls12(SuiteCategory::Rsa))
}

pub fn happy_path() -> Vec<Symbol> {
    vec![ch(), Symbol::ClientKeyExchange, Symbol::ChangeCipherSpec, Symbol::Finished]
}

pub fn alphabet() -> Alphabet {
    Alphabet::new([
        ch(),
        Symbol::ClientKeyExchange,
        Symbol::ChangeCipherSpec,
        Symbol::Finished,
        Symbol::Heartbeat,
        Symbol::ResetConnection,
    ])
}

/// Compliant TLS 1.2 RSA server
///
/// ```text
/// 0 --CH--> 1 --CKE--> 2 --CCS--> 3 --FIN--> 5 (established)
/// everything else -> 4 (error), RESET -> 0, HEARTBEAT loops
/// ```
pub fn rsa_server() -> MealyMachine {
    let alphabet = alphabet();
    let mut m = MealyMachine::new(alphabet.clone(), 6, 0);
    for state in 0..6 {
        for symbol in alphabet.iter() {
            m.set_transition(state, *symbol, Response::IllegalTransition, ERROR);
        }
        m.set_transition(state, Symbol::Heartbeat, Response::of_kinds(&[Heartbeat]), state);
        m.set_transition(state, Symbol::ResetConnection, Response::silent(), 0);
    }
    m.set_transition(ERROR, Symbol::Heartbeat, Response::IllegalTransition, ERROR);
    m.set_transition(0, ch(), Response::of_kinds(&[ServerHello, Certificate, ServerHelloDone]), 1);
    m.set_transition(1, Symbol::ClientKeyExchange, Response::silent(), 2);
    m.set_transition(2, Symbol::ChangeCipherSpec, Response::silent(), 3);
    m.set_transition(3, Symbol::Finished, Response::of_kinds(&[ChangeCipherSpec, Finished]), 5);
    m
}

pub fn input_for(machine: MealyMachine) -> AnalysisInput {
    let catalog = HappyFlowCatalog::for_alphabet(ProtocolRole::Server, machine.alphabet());
    AnalysisInput::new(
        Arc::new(machine),
        Arc::new(RuleBook::for_role(ProtocolRole::Server)),
        Arc::new(catalog),
        AnalysisConfig::default(),
    )
}

pub fn partial() -> PartialFindings {
    PartialFindings::default()
}

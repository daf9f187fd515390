use statevuln_core::shared::models::{HelloParams, MessageKind, SuiteCategory};
use statevuln_core::{Alphabet, MealyMachine, Response, Symbol};

pub const ERROR: usize = 4;
pub const ESTABLISHED: usize = 5;

pub fn rsa_hello() -> Symbol {
    Symbol::ClientHello(HelloParams::tls12(SuiteCategory::Rsa))
}

pub fn rsa_happy_path() -> Vec<Symbol> {
    vec![
        rsa_hello(),
        Symbol::ClientKeyExchange,
        Symbol::ChangeCipherSpec,
        Symbol::Finished,
    ]
}

pub fn rsa_alphabet() -> Alphabet {
    Alphabet::new(rsa_happy_path())
}

pub fn kinds(kinds: &[MessageKind]) -> Response {
    Response::of_kinds(kinds)
}

/// Compliant TLS 1.2 RSA server over `{CH, CKE, CCS, FIN}`
///
/// Renegotiation from the established state is answered with a fresh
/// server flight.
pub fn rsa_server() -> MealyMachine {
    use MessageKind::*;

    let alphabet = rsa_alphabet();
    let mut m = MealyMachine::new(alphabet.clone(), 6, 0);
    for state in 0..6 {
        for symbol in alphabet.iter() {
            m.set_transition(state, *symbol, Response::IllegalTransition, ERROR);
        }
    }
    let flight = kinds(&[ServerHello, Certificate, ServerHelloDone]);
    m.set_transition(0, rsa_hello(), flight.clone(), 1);
    m.set_transition(1, Symbol::ClientKeyExchange, Response::silent(), 2);
    m.set_transition(2, Symbol::ChangeCipherSpec, Response::silent(), 3);
    m.set_transition(3, Symbol::Finished, kinds(&[ChangeCipherSpec, Finished]), ESTABLISHED);
    m.set_transition(ESTABLISHED, rsa_hello(), flight, 1);
    m
}

/*
 * Happy-Flow Catalog
 *
 * Hand-curated, protocol-correct message sequences per role. The catalog is
 * built against a concrete alphabet: a flow survives only if every symbol it
 * uses is part of that alphabet.
 *
 * Flow groups:
 * - full handshakes (plain and client-authenticated)
 * - resumption flows (full handshake, reset, abbreviated handshake)
 * - sanity flows alternating two suite categories in one run
 */

use crate::shared::models::{
    Alphabet, HelloParams, ProtocolRole, ProtocolVersion, ResumptionKind, Symbol,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HappyFlowCatalog {
    flows: Vec<Vec<Symbol>>,
    sanity: Vec<Vec<Symbol>>,
}

impl HappyFlowCatalog {
    pub fn for_alphabet(role: ProtocolRole, alphabet: &Alphabet) -> Self {
        let (flows, sanity) = match role {
            ProtocolRole::Server => (server_flows(alphabet), server_sanity_flows(alphabet)),
            ProtocolRole::Client => (client_flows(alphabet), Vec::new()),
        };
        let keep = |flow: &Vec<Symbol>| !flow.is_empty() && alphabet.contains_all(flow);
        Self {
            flows: dedup(flows.into_iter().filter(keep).collect()),
            sanity: dedup(sanity.into_iter().filter(keep).collect()),
        }
    }

    /// Catalog with explicit flows, no alphabet filtering
    pub fn from_flows(flows: Vec<Vec<Symbol>>) -> Self {
        Self {
            flows,
            sanity: Vec::new(),
        }
    }

    pub fn flows(&self) -> &[Vec<Symbol>] {
        &self.flows
    }

    pub fn sanity_flows(&self) -> &[Vec<Symbol>] {
        &self.sanity
    }

    /// Happy flows followed by sanity flows
    pub fn all(&self) -> impl Iterator<Item = &Vec<Symbol>> {
        self.flows.iter().chain(self.sanity.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty() && self.sanity.is_empty()
    }
}

fn dedup(flows: Vec<Vec<Symbol>>) -> Vec<Vec<Symbol>> {
    let mut out: Vec<Vec<Symbol>> = Vec::with_capacity(flows.len());
    for flow in flows {
        if !out.contains(&flow) {
            out.push(flow);
        }
    }
    out
}

fn hellos(alphabet: &Alphabet, server_hello: bool) -> Vec<HelloParams> {
    alphabet
        .iter()
        .filter_map(|s| match (s, server_hello) {
            (Symbol::ClientHello(p), false) | (Symbol::ServerHello(p), true) => Some(*p),
            _ => None,
        })
        .collect()
}

fn tls12_full(params: HelloParams) -> Vec<Symbol> {
    vec![
        Symbol::ClientHello(params),
        Symbol::ClientKeyExchange,
        Symbol::ChangeCipherSpec,
        Symbol::Finished,
    ]
}

fn server_flows(alphabet: &Alphabet) -> Vec<Vec<Symbol>> {
    let mut flows = Vec::new();
    for params in hellos(alphabet, false) {
        let hello = Symbol::ClientHello(params);
        match params.version {
            ProtocolVersion::Tls12 => {
                let full = tls12_full(params);
                flows.push(full.clone());
                flows.push(vec![
                    hello,
                    Symbol::Certificate,
                    Symbol::ClientKeyExchange,
                    Symbol::CertificateVerify,
                    Symbol::ChangeCipherSpec,
                    Symbol::Finished,
                ]);
                for kind in [ResumptionKind::Tls12SessionId, ResumptionKind::Tls12Ticket] {
                    let mut resumed = full.clone();
                    resumed.extend([
                        Symbol::ResetConnection,
                        Symbol::ResumingHello(kind),
                        Symbol::ChangeCipherSpec,
                        Symbol::Finished,
                    ]);
                    flows.push(resumed);
                }
            }
            ProtocolVersion::Tls13 => {
                flows.push(vec![hello, Symbol::Finished]);
                flows.push(vec![
                    hello,
                    Symbol::Certificate,
                    Symbol::CertificateVerify,
                    Symbol::Finished,
                ]);
                flows.push(vec![
                    hello,
                    Symbol::Finished,
                    Symbol::ResetConnection,
                    Symbol::ResumingHello(ResumptionKind::Tls13Psk),
                    Symbol::Finished,
                ]);
                flows.push(vec![
                    hello,
                    Symbol::Finished,
                    Symbol::ResetConnection,
                    Symbol::ResumingHello(ResumptionKind::Tls13EarlyData),
                    Symbol::ApplicationData,
                    Symbol::EndOfEarlyData,
                    Symbol::Finished,
                ]);
            }
        }
    }
    flows
}

/// Full handshakes with two different suite categories back to back
fn server_sanity_flows(alphabet: &Alphabet) -> Vec<Vec<Symbol>> {
    let tls12: Vec<HelloParams> = hellos(alphabet, false)
        .into_iter()
        .filter(|p| p.version == ProtocolVersion::Tls12)
        .collect();
    let mut flows = Vec::new();
    for first in &tls12 {
        for second in &tls12 {
            if first.suite == second.suite {
                continue;
            }
            let mut flow = tls12_full(*first);
            flow.push(Symbol::ResetConnection);
            flow.extend(tls12_full(*second));
            flows.push(flow);
        }
    }
    flows
}

fn client_flows(alphabet: &Alphabet) -> Vec<Vec<Symbol>> {
    let mut flows = Vec::new();
    for params in hellos(alphabet, true) {
        let hello = Symbol::ServerHello(params);
        match params.version {
            ProtocolVersion::Tls12 => {
                let mut flight = vec![hello, Symbol::Certificate];
                if params.suite.is_ephemeral() {
                    flight.push(Symbol::ServerKeyExchange);
                }
                let mut plain = flight.clone();
                plain.extend([Symbol::ServerHelloDone, Symbol::ChangeCipherSpec, Symbol::Finished]);
                flows.push(plain);

                let mut authenticated = flight;
                authenticated.extend([
                    Symbol::CertificateRequest,
                    Symbol::ServerHelloDone,
                    Symbol::ChangeCipherSpec,
                    Symbol::Finished,
                ]);
                flows.push(authenticated);
            }
            ProtocolVersion::Tls13 => {
                let tail = [Symbol::Certificate, Symbol::CertificateVerify, Symbol::Finished];
                let mut plain = vec![hello, Symbol::EncryptedExtensions];
                plain.extend(tail);
                flows.push(plain.clone());

                let mut retried = vec![Symbol::HelloRetryRequest];
                retried.extend(plain);
                flows.push(retried);

                let mut authenticated =
                    vec![hello, Symbol::EncryptedExtensions, Symbol::CertificateRequest];
                authenticated.extend(tail);
                flows.push(authenticated);
            }
        }
    }
    flows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::SuiteCategory;

    #[test]
    fn test_flows_filtered_to_alphabet() {
        let ch = Symbol::ClientHello(HelloParams::tls12(SuiteCategory::Rsa));
        let alphabet = Alphabet::new([
            ch,
            Symbol::ClientKeyExchange,
            Symbol::ChangeCipherSpec,
            Symbol::Finished,
        ]);
        let catalog = HappyFlowCatalog::for_alphabet(ProtocolRole::Server, &alphabet);
        assert_eq!(
            catalog.flows(),
            &[vec![
                ch,
                Symbol::ClientKeyExchange,
                Symbol::ChangeCipherSpec,
                Symbol::Finished
            ]]
        );
        assert!(catalog.sanity_flows().is_empty());
    }

    #[test]
    fn test_sanity_flows_pair_suites() {
        let rsa = Symbol::ClientHello(HelloParams::tls12(SuiteCategory::Rsa));
        let ecdhe = Symbol::ClientHello(HelloParams::tls12(SuiteCategory::Ecdhe));
        let alphabet = Alphabet::new([
            rsa,
            ecdhe,
            Symbol::ClientKeyExchange,
            Symbol::ChangeCipherSpec,
            Symbol::Finished,
            Symbol::ResetConnection,
        ]);
        let catalog = HappyFlowCatalog::for_alphabet(ProtocolRole::Server, &alphabet);
        assert_eq!(catalog.sanity_flows().len(), 2);
        assert!(catalog.sanity_flows()[0].contains(&Symbol::ResetConnection));
    }

    #[test]
    fn test_client_role_uses_server_hellos() {
        let sh = Symbol::ServerHello(HelloParams::tls13());
        let alphabet = Alphabet::new([
            sh,
            Symbol::EncryptedExtensions,
            Symbol::Certificate,
            Symbol::CertificateVerify,
            Symbol::Finished,
        ]);
        let catalog = HappyFlowCatalog::for_alphabet(ProtocolRole::Client, &alphabet);
        assert_eq!(catalog.flows().len(), 1);
        assert_eq!(catalog.flows()[0][0], sh);
    }
}

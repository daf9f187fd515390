//! Rule tables for a client under test (the learner plays the server)

use crate::features::context::ContextProperty::*;
use crate::features::context::Prop::{Is, Not};
use crate::features::rules::domain::{ExpectedMessage as M, ExpectedResponse as R, LetterChain as C};
use crate::shared::models::MessageKind as K;
use crate::shared::models::SymbolType::*;

pub fn tls12_chains() -> Vec<C> {
    vec![
        C::simple(ResetConnection, ServerHello).required(),
        C::simple(ServerHello, Certificate).required(),
        C::simple(Certificate, ServerKeyExchange)
            .when(&[Is(EphemeralKeyExchange)])
            .required(),
        C::simple(Certificate, ServerHelloDone)
            .when(&[Not(EphemeralKeyExchange)])
            .required(),
        C::simple(Certificate, CertificateRequest).when(&[Not(EphemeralKeyExchange)]),
        C::multi(ServerKeyExchange, &[ServerHelloDone, CertificateRequest]).required(),
        C::simple(CertificateRequest, ServerHelloDone).required(),
        C::simple(ServerHelloDone, ChangeCipherSpec)
            .when(&[Is(PeerFinishedReceived)])
            .required(),
        C::simple(ChangeCipherSpec, Finished)
            .when(&[Is(HandshakeUnfinished)])
            .required(),
        // Established connection
        C::pool(Finished, &[ApplicationData, HelloRequest, Heartbeat])
            .when(&[Is(HandshakeFinishedCorrectly)]),
        C::simple(HelloRequest, ServerHello).when(&[Is(HandshakeUnfinished)]),
        C::simple(Any, HelloRequest).when(&[Is(Tls12Flow)]),
        // Application data racing a renegotiation
        C::simple(Any, ApplicationData).when(&[Is(HandshakeUnfinished), Is(HandshakeCompletedOnce)]),
        C::simple(Any, ResetConnection),
        C::simple(Any, Heartbeat),
    ]
}

pub fn tls13_chains() -> Vec<C> {
    vec![
        C::multi(ResetConnection, &[ServerHello, HelloRetryRequest]).required(),
        C::simple(HelloRetryRequest, ServerHello).required(),
        C::simple(ServerHello, EncryptedExtensions).required(),
        C::multi(EncryptedExtensions, &[Certificate, CertificateRequest]).required(),
        C::simple(CertificateRequest, Certificate).required(),
        C::simple(Certificate, CertificateVerify).required(),
        C::simple(CertificateVerify, Finished).required(),
        // Middlebox compatibility
        C::multi(ServerHello, &[ChangeCipherSpec]).when(&[Is(HandshakeUnfinished)]),
        C::multi(HelloRetryRequest, &[ChangeCipherSpec]).when(&[Is(HandshakeUnfinished)]),
        // Established connection
        C::pool(
            Finished,
            &[ApplicationData, KeyUpdate, NewSessionTicket, Heartbeat],
        )
        .when(&[Is(HandshakeFinishedCorrectly)]),
        C::simple(Any, ResetConnection),
        C::simple(Any, Heartbeat),
    ]
}

pub fn tls12_responses() -> Vec<R> {
    vec![
        R::new(ResetConnection, &[M::optional(K::ClientHello)]),
        R::nothing(ServerHello),
        R::nothing(Certificate),
        R::nothing(ServerKeyExchange),
        R::nothing(CertificateRequest),
        R::new(
            ServerHelloDone,
            &[
                M::one(K::ClientKeyExchange),
                M::one(K::ChangeCipherSpec),
                M::one(K::Finished),
            ],
        )
        .when(&[Not(ClientAuthRequested)]),
        R::new(
            ServerHelloDone,
            &[
                M::one(K::Certificate),
                M::one(K::ClientKeyExchange),
                M::optional(K::CertificateVerify),
                M::one(K::ChangeCipherSpec),
                M::one(K::Finished),
            ],
        )
        .when(&[Is(ClientAuthRequested)]),
        R::nothing(ChangeCipherSpec),
        R::nothing(Finished),
        R::nothing(ApplicationData),
        R::new(HelloRequest, &[M::optional(K::ClientHello)]),
        // Refused renegotiation
        R::new(HelloRequest, &[M::one(K::Alert)]),
        R::new(Heartbeat, &[M::optional(K::Heartbeat)]),
    ]
}

pub fn tls13_responses() -> Vec<R> {
    vec![
        R::new(ResetConnection, &[M::optional(K::ClientHello)]),
        R::new(
            HelloRetryRequest,
            &[M::optional(K::ChangeCipherSpec), M::one(K::ClientHello)],
        ),
        R::new(ServerHello, &[M::optional(K::ChangeCipherSpec)]),
        R::nothing(EncryptedExtensions),
        R::nothing(CertificateRequest),
        R::nothing(Certificate),
        R::nothing(CertificateVerify),
        R::nothing(ChangeCipherSpec),
        R::new(
            Finished,
            &[M::optional(K::ChangeCipherSpec), M::one(K::Finished)],
        )
        .when(&[Not(HandshakeFinishedCorrectly), Not(ClientAuthRequested)]),
        R::new(
            Finished,
            &[
                M::optional(K::ChangeCipherSpec),
                M::one(K::Certificate),
                M::optional(K::CertificateVerify),
                M::one(K::Finished),
            ],
        )
        .when(&[Not(HandshakeFinishedCorrectly), Is(ClientAuthRequested)]),
        R::nothing(Finished).when(&[Is(HandshakeFinishedCorrectly)]),
        R::nothing(ApplicationData),
        R::nothing(NewSessionTicket),
        R::new(KeyUpdate, &[M::optional(K::KeyUpdate)]),
        R::new(Heartbeat, &[M::optional(K::Heartbeat)]),
    ]
}

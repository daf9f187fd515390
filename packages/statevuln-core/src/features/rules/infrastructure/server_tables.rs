//! Rule tables for a server under test (the learner plays the client)

use crate::features::context::ContextProperty::*;
use crate::features::context::Prop::{Is, Not};
use crate::features::rules::domain::{ExpectedMessage as M, ExpectedResponse as R, LetterChain as C};
use crate::shared::models::MessageKind as K;
use crate::shared::models::SymbolType::*;

pub fn tls12_chains() -> Vec<C> {
    vec![
        // Connection start
        C::simple(ResetConnection, ClientHello).required(),
        C::simple(ResetConnection, ResumingHello),
        // Full handshake
        C::simple(ClientHello, ClientKeyExchange)
            .when(&[Is(Tls12Flow), Not(ClientAuthRequested)])
            .required(),
        C::simple(ClientHello, Certificate)
            .when(&[Is(ClientAuthRequested)])
            .required(),
        C::simple(Certificate, ClientKeyExchange).required(),
        C::simple(ClientKeyExchange, CertificateVerify)
            .when(&[Is(ClientAuthRequested), Is(CertificateSent)])
            .required(),
        C::simple(ClientKeyExchange, ChangeCipherSpec)
            .when(&[Not(ClientAuthRequested)])
            .required(),
        // Empty client certificate: no verify message follows
        C::simple(ClientKeyExchange, ChangeCipherSpec).when(&[Is(ClientAuthRequested)]),
        C::simple(CertificateVerify, ChangeCipherSpec).required(),
        C::simple(ChangeCipherSpec, Finished)
            .when(&[Is(HandshakeUnfinished)])
            .required(),
        // Abbreviated handshake
        C::simple(ResumingHello, ChangeCipherSpec)
            .when(&[Is(InResumptionFlow)])
            .required(),
        // Established connection
        C::pool(Finished, &[ApplicationData, Heartbeat, PaddingOracleProbe])
            .when(&[Is(HandshakeFinishedCorrectly)]),
        C::multi(Finished, &[ClientHello, ResumingHello]).when(&[
            Is(HandshakeFinishedCorrectly),
            Not(RenegotiationRejected),
        ]),
        C::simple(ApplicationData, ClientHello).when(&[
            Is(HandshakeFinishedCorrectly),
            Not(RenegotiationRejected),
        ]),
        C::simple(Any, ApplicationData).when(&[Is(HandshakeUnfinished), Is(HandshakeCompletedOnce)]),
        C::simple(Any, ResetConnection),
        C::simple(Any, Heartbeat),
        // Attack probes
        C::simple(ClientHello, BleichenbacherProbe).when(&[Is(RsaKeyExchange)]),
        C::simple(ClientHello, InvalidCurveProbe).when(&[Is(EphemeralKeyExchange)]),
        C::multi(BleichenbacherProbe, &[ChangeCipherSpec]),
        C::multi(InvalidCurveProbe, &[ChangeCipherSpec]),
    ]
}

pub fn tls13_chains() -> Vec<C> {
    vec![
        C::simple(ResetConnection, ClientHello).required(),
        C::simple(ResetConnection, ResumingHello),
        C::simple(ClientHello, ClientHello)
            .when(&[Is(HelloRetryExchanged)])
            .required(),
        C::simple(ClientHello, Finished)
            .when(&[Not(ClientAuthRequested), Not(HelloRetryExchanged)])
            .required(),
        C::simple(ClientHello, Certificate)
            .when(&[Is(ClientAuthRequested)])
            .required(),
        C::simple(Certificate, CertificateVerify).required(),
        // Empty client certificate
        C::simple(Certificate, Finished),
        C::simple(CertificateVerify, Finished).required(),
        // Middlebox compatibility
        C::simple(AnyClientHello, ChangeCipherSpec).when(&[Is(HandshakeUnfinished)]),
        // Resumption and early data
        C::simple(ResumingHello, Finished)
            .when(&[Is(InResumptionFlow), Not(EarlyDataOffered)])
            .required(),
        C::simple(ResumingHello, ApplicationData).when(&[Is(EarlyDataOffered)]),
        C::simple(ApplicationData, ApplicationData).when(&[Is(EarlyDataOffered)]),
        C::multi(ResumingHello, &[EndOfEarlyData])
            .when(&[Is(EarlyDataOffered)])
            .required(),
        C::simple(ApplicationData, EndOfEarlyData).when(&[Is(EarlyDataOffered)]),
        C::simple(EndOfEarlyData, Finished).required(),
        // Established connection
        C::pool(Finished, &[ApplicationData, KeyUpdate, Heartbeat])
            .when(&[Is(HandshakeFinishedCorrectly)]),
        C::simple(Any, ResetConnection),
        C::simple(Any, Heartbeat),
    ]
}

pub fn tls12_responses() -> Vec<R> {
    vec![
        R::new(
            ClientHello,
            &[
                M::one(K::ServerHello),
                M::one(K::Certificate),
                M::one(K::ServerKeyExchange),
                M::optional(K::CertificateRequest),
                M::one(K::ServerHelloDone),
            ],
        )
        .when(&[Is(EphemeralKeyExchange)]),
        R::new(
            ClientHello,
            &[
                M::one(K::ServerHello),
                M::one(K::Certificate),
                M::optional(K::CertificateRequest),
                M::one(K::ServerHelloDone),
            ],
        )
        .when(&[Is(RsaKeyExchange)]),
        // Refused renegotiation
        R::new(ClientHello, &[M::one(K::Alert)]).when(&[Is(HandshakeCompletedOnce)]),
        R::new(
            ResumingHello,
            &[
                M::one(K::ServerHello),
                M::one(K::ChangeCipherSpec),
                M::one(K::Finished),
            ],
        ),
        R::nothing(Certificate),
        R::nothing(ClientKeyExchange),
        R::nothing(CertificateVerify),
        R::nothing(ChangeCipherSpec),
        R::new(
            Finished,
            &[M::one(K::ChangeCipherSpec), M::one(K::Finished)],
        )
        .when(&[Not(HandshakeFinishedCorrectly)]),
        R::nothing(Finished).when(&[Is(HandshakeFinishedCorrectly)]),
        R::nothing(ApplicationData),
        R::nothing(ResetConnection),
        R::new(Heartbeat, &[M::optional(K::Heartbeat)]),
        R::new(AnyProbe, &[M::optional(K::Alert)]),
    ]
}

pub fn tls13_responses() -> Vec<R> {
    vec![
        R::new(
            ClientHello,
            &[
                M::one(K::ServerHello),
                M::optional(K::ChangeCipherSpec),
                M::one(K::EncryptedExtensions),
                M::optional(K::CertificateRequest),
                M::one(K::Certificate),
                M::one(K::CertificateVerify),
                M::one(K::Finished),
            ],
        ),
        R::new(
            ClientHello,
            &[M::one(K::HelloRetryRequest), M::optional(K::ChangeCipherSpec)],
        )
        .when(&[Not(HelloRetryExchanged)]),
        R::new(
            ResumingHello,
            &[
                M::one(K::ServerHello),
                M::optional(K::ChangeCipherSpec),
                M::one(K::EncryptedExtensions),
                M::one(K::Finished),
            ],
        ),
        R::nothing(Certificate),
        R::nothing(CertificateVerify),
        R::nothing(ChangeCipherSpec),
        R::nothing(EndOfEarlyData),
        R::nothing(Finished),
        R::nothing(ApplicationData),
        R::nothing(ResetConnection),
        R::new(KeyUpdate, &[M::optional(K::KeyUpdate)]),
        R::new(Heartbeat, &[M::optional(K::Heartbeat)]),
    ]
}

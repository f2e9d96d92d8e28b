// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::identifiers::{CredentialTypeIdentifier, IssuerIdentifier};
use claims::{assert_err, assert_ok};

#[test]
fn test_issuer_projection() {
    let cred_type: CredentialTypeIdentifier = assert_ok!("pbdf.gemeente.address".parse());
    assert_eq!(cred_type.as_str(), "pbdf.gemeente.address");
    assert_eq!(cred_type.issuer_identifier().as_str(), "pbdf.gemeente");
}

#[test]
fn test_malformed_identifiers() {
    assert_err!("".parse::<CredentialTypeIdentifier>());
    assert_err!("pbdf.gemeente".parse::<CredentialTypeIdentifier>());
    assert_err!("a.b.c.d".parse::<CredentialTypeIdentifier>());
    assert_err!("a..c".parse::<CredentialTypeIdentifier>());
    assert_err!("pbdf".parse::<IssuerIdentifier>());
    assert_err!("pbdf.".parse::<IssuerIdentifier>());
}

#[test]
fn test_identifier_serde() {
    let cred_type: CredentialTypeIdentifier = assert_ok!("irma-demo.mijn.ageLower".parse());
    let mut encoded = Vec::new();
    assert_ok!(ciborium::into_writer(&cred_type, &mut encoded));
    let decoded: CredentialTypeIdentifier = assert_ok!(ciborium::from_reader(&encoded[..]));
    assert_eq!(cred_type, decoded);
}

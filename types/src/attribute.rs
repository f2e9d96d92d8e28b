// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A revocation attribute: the big integer folded into the accumulator when
/// the credential carrying it is revoked. The integer is carried as its raw
/// big-endian bytes so clones are cheap and the SQL and CBOR representations
/// coincide; the accumulator algebra is the only consumer of its numeric
/// value.
#[derive(Clone, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationAttribute(Bytes);

impl RevocationAttribute {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl From<Vec<u8>> for RevocationAttribute {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl AsRef<[u8]> for RevocationAttribute {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RevocationAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RevocationAttribute({})", hex::encode(&self.0))
    }
}

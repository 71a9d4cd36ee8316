use ciborium::value::{Integer, Value as CborValue};
use ring::signature::{self, UnparsedPublicKey};

use crate::passkey::errors::PasskeyError;

pub(super) const ES256_ALG: i64 = -7;
pub(super) const RS256_ALG: i64 = -257;

const COSE_KTY_EC2: i64 = 2;
const COSE_KTY_RSA: i64 = 3;

/// A credential public key decoded from its COSE_Key encoding.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum CosePublicKey {
    /// P-256 point, stored as an uncompressed SEC1 point (0x04 || x || y)
    Es256 { point: Vec<u8> },
    /// PKCS#1 v1.5 with SHA-256
    Rs256 { n: Vec<u8>, e: Vec<u8> },
}

fn int(value: &Integer) -> Option<i64> {
    i64::try_from(i128::from(*value)).ok()
}

impl CosePublicKey {
    pub(super) fn from_cose(bytes: &[u8]) -> Result<Self, PasskeyError> {
        let value: CborValue = ciborium::de::from_reader(bytes)
            .map_err(|e| PasskeyError::Format(format!("Invalid public key CBOR: {e}")))?;

        let CborValue::Map(map) = value else {
            return Err(PasskeyError::Format("Public key is not a CBOR map".into()));
        };

        let mut kty = None;
        let mut alg = None;
        let mut params: Vec<(i64, Vec<u8>)> = Vec::new();

        for (k, v) in map {
            let CborValue::Integer(k) = k else { continue };
            match (int(&k), v) {
                (Some(1), CborValue::Integer(v)) => kty = int(&v),
                (Some(3), CborValue::Integer(v)) => alg = int(&v),
                (Some(label), CborValue::Bytes(b)) if label < 0 => params.push((label, b)),
                _ => {}
            }
        }

        let param = |label: i64| {
            params
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, b)| b.clone())
                .ok_or_else(|| PasskeyError::Format(format!("Missing COSE parameter {label}")))
        };

        match (kty, alg) {
            (Some(COSE_KTY_EC2), Some(ES256_ALG)) => {
                let (x, y) = (param(-2)?, param(-3)?);
                if x.len() != 32 || y.len() != 32 {
                    return Err(PasskeyError::Format(
                        "Invalid P-256 coordinate length".into(),
                    ));
                }
                let mut point = Vec::with_capacity(65);
                point.push(0x04);
                point.extend_from_slice(&x);
                point.extend_from_slice(&y);
                Ok(Self::Es256 { point })
            }
            (Some(COSE_KTY_RSA), Some(RS256_ALG)) => Ok(Self::Rs256 {
                n: param(-1)?,
                e: param(-2)?,
            }),
            (kty, alg) => Err(PasskeyError::Format(format!(
                "Unsupported key type {kty:?} with algorithm {alg:?}"
            ))),
        }
    }

    pub(super) fn alg(&self) -> i64 {
        match self {
            Self::Es256 { .. } => ES256_ALG,
            Self::Rs256 { .. } => RS256_ALG,
        }
    }

    pub(super) fn verify(&self, signed_data: &[u8], sig: &[u8]) -> Result<(), PasskeyError> {
        let result = match self {
            Self::Es256 { point } => {
                UnparsedPublicKey::new(&signature::ECDSA_P256_SHA256_ASN1, point)
                    .verify(signed_data, sig)
            }
            Self::Rs256 { n, e } => signature::RsaPublicKeyComponents { n, e }.verify(
                &signature::RSA_PKCS1_2048_8192_SHA256,
                signed_data,
                sig,
            ),
        };

        result.map_err(|_| {
            PasskeyError::Verification(
                "Signature verification failed. For more details, run with RUST_LOG=debug".into(),
            )
        })
    }
}

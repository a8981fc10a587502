//! FIDO2 response verification.
//!
//! Implements the structural and cryptographic checks of the WebAuthn
//! verification procedure for ES256 credentials: collected client data,
//! authenticator data, attestation statements (`none` and packed
//! self-attestation), and assertion signatures over
//! `authenticatorData || SHA-256(clientDataJSON)`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ciborium::value::Integer;
use ciborium::Value;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::{CeremonyError, Result};
use crate::rp::RelyingParty;
use crate::verifier::{
    AuthenticationResponse, CredentialVerifier, RegistrationResponse, VerifiedCredential,
};

/// COSE algorithm identifier for ES256 (ECDSA w/ SHA-256 on P-256).
pub const COSE_ALG_ES256: i64 = -7;

const TYPE_CREATE: &str = "webauthn.create";
const TYPE_GET: &str = "webauthn.get";

// Authenticator data flag bits.
const FLAG_USER_PRESENT: u8 = 0x01;
const FLAG_USER_VERIFIED: u8 = 0x04;
const FLAG_ATTESTED_CREDENTIAL_DATA: u8 = 0x40;

// COSE key labels and expected values for an EC2/P-256 key.
const COSE_KTY: i128 = 1;
const COSE_ALG: i128 = 3;
const COSE_CRV: i128 = -1;
const COSE_X: i128 = -2;
const COSE_Y: i128 = -3;
const KTY_EC2: i128 = 2;
const CRV_P256: i128 = 1;

/// Extract the challenge bytes from raw clientDataJSON.
///
/// Used at the transport boundary to fill the `client_challenge` payload
/// field before the ceremony runs. Returns `None` when the JSON or the
/// base64url encoding is malformed.
pub fn client_challenge(client_data_json: &[u8]) -> Option<Vec<u8>> {
    let client_data: ClientData = serde_json::from_slice(client_data_json).ok()?;
    URL_SAFE_NO_PAD.decode(&client_data.challenge).ok()
}

/// The stateless FIDO2 verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fido2Verifier;

impl Fido2Verifier {
    pub fn new() -> Self {
        Self
    }

    fn check_attestation(
        &self,
        response: &RegistrationResponse,
        expected_challenge: &[u8],
        rp: &RelyingParty,
    ) -> std::result::Result<VerifiedCredential, String> {
        check_client_data(
            &response.client_data_json,
            TYPE_CREATE,
            expected_challenge,
            rp,
        )?;

        let (fmt, att_stmt, auth_data_raw) = parse_attestation_object(&response.attestation_object)?;
        let auth_data = parse_authenticator_data(&auth_data_raw)?;
        check_rp_id_hash(&auth_data, rp)?;
        if !auth_data.user_present() {
            return Err("user-present flag not set".into());
        }

        let user_verified = auth_data.user_verified();
        let attested = auth_data
            .attested
            .ok_or("no attested credential data in authenticator data")?;
        // Only keys this verifier can check later are accepted at all.
        let key = verifying_key_from_cose(&attested.public_key)?;

        match fmt.as_str() {
            "none" => {
                let empty = att_stmt.as_map().map(|m| m.is_empty()).unwrap_or(false);
                if !empty {
                    return Err("attestation format \"none\" carries a statement".into());
                }
            }
            "packed" => {
                let client_data_hash = Sha256::digest(&response.client_data_json);
                check_packed_statement(&att_stmt, &auth_data_raw, client_data_hash.as_slice(), &key)?;
            }
            other => return Err(format!("unsupported attestation format \"{other}\"")),
        }

        tracing::debug!(
            fmt = %fmt,
            user_verified = user_verified,
            sign_count = auth_data.sign_count,
            "attestation accepted"
        );
        Ok(VerifiedCredential {
            credential_id: attested.credential_id,
            public_key: attested.public_key,
            sign_count: auth_data.sign_count,
        })
    }

    fn check_assertion(
        &self,
        response: &AuthenticationResponse,
        public_key: &[u8],
        expected_challenge: &[u8],
        rp: &RelyingParty,
    ) -> std::result::Result<u32, String> {
        check_client_data(&response.client_data_json, TYPE_GET, expected_challenge, rp)?;

        let auth_data = parse_authenticator_data(&response.authenticator_data)?;
        check_rp_id_hash(&auth_data, rp)?;
        if !auth_data.user_present() {
            return Err("user-present flag not set".into());
        }

        let key = verifying_key_from_cose(public_key)?;
        let signature = Signature::from_der(&response.signature)
            .map_err(|e| format!("malformed assertion signature: {e}"))?;

        let mut message = response.authenticator_data.clone();
        message.extend_from_slice(Sha256::digest(&response.client_data_json).as_slice());
        key.verify(&message, &signature)
            .map_err(|_| "assertion signature verification failed".to_string())?;

        tracing::debug!(
            user_verified = auth_data.user_verified(),
            sign_count = auth_data.sign_count,
            "assertion accepted"
        );
        Ok(auth_data.sign_count)
    }
}

impl CredentialVerifier for Fido2Verifier {
    fn verify_attestation(
        &self,
        response: &RegistrationResponse,
        expected_challenge: &[u8],
        rp: &RelyingParty,
    ) -> Result<VerifiedCredential> {
        self.check_attestation(response, expected_challenge, rp)
            .map_err(CeremonyError::AttestationInvalid)
    }

    fn verify_assertion(
        &self,
        response: &AuthenticationResponse,
        public_key: &[u8],
        expected_challenge: &[u8],
        rp: &RelyingParty,
    ) -> Result<u32> {
        self.check_assertion(response, public_key, expected_challenge, rp)
            .map_err(CeremonyError::AssertionInvalid)
    }
}

#[derive(Debug, serde::Deserialize)]
struct ClientData {
    #[serde(rename = "type")]
    ceremony_type: String,
    challenge: String,
    origin: String,
}

fn check_client_data(
    raw: &[u8],
    expected_type: &str,
    expected_challenge: &[u8],
    rp: &RelyingParty,
) -> std::result::Result<(), String> {
    let client_data: ClientData =
        serde_json::from_slice(raw).map_err(|e| format!("malformed clientDataJSON: {e}"))?;

    if client_data.ceremony_type != expected_type {
        return Err(format!(
            "unexpected client data type \"{}\"",
            client_data.ceremony_type
        ));
    }
    let presented = URL_SAFE_NO_PAD
        .decode(&client_data.challenge)
        .map_err(|e| format!("challenge is not base64url: {e}"))?;
    if presented != expected_challenge {
        return Err("client data challenge does not match".into());
    }
    if !rp.allows_origin(&client_data.origin) {
        return Err(format!("origin \"{}\" is not allowed", client_data.origin));
    }
    Ok(())
}

struct AuthenticatorData {
    rp_id_hash: [u8; 32],
    flags: u8,
    sign_count: u32,
    attested: Option<AttestedCredential>,
}

struct AttestedCredential {
    credential_id: Vec<u8>,
    public_key: Vec<u8>,
}

impl AuthenticatorData {
    fn user_present(&self) -> bool {
        self.flags & FLAG_USER_PRESENT != 0
    }

    fn user_verified(&self) -> bool {
        self.flags & FLAG_USER_VERIFIED != 0
    }
}

fn parse_authenticator_data(raw: &[u8]) -> std::result::Result<AuthenticatorData, String> {
    if raw.len() < 37 {
        return Err("authenticator data truncated".into());
    }
    let mut rp_id_hash = [0u8; 32];
    rp_id_hash.copy_from_slice(&raw[..32]);
    let flags = raw[32];
    let sign_count = u32::from_be_bytes([raw[33], raw[34], raw[35], raw[36]]);

    let attested = if flags & FLAG_ATTESTED_CREDENTIAL_DATA != 0 {
        Some(parse_attested_credential(&raw[37..])?)
    } else {
        None
    };

    Ok(AuthenticatorData {
        rp_id_hash,
        flags,
        sign_count,
        attested,
    })
}

fn parse_attested_credential(raw: &[u8]) -> std::result::Result<AttestedCredential, String> {
    // aaguid (16) + credential ID length (2)
    if raw.len() < 18 {
        return Err("attested credential data truncated".into());
    }
    let id_len = u16::from_be_bytes([raw[16], raw[17]]) as usize;
    let rest = &raw[18..];
    if rest.len() < id_len {
        return Err("credential ID truncated".into());
    }
    let credential_id = rest[..id_len].to_vec();
    if credential_id.is_empty() {
        return Err("empty credential ID".into());
    }

    // The COSE key is one CBOR value; extension data may follow it.
    let key_value: Value = ciborium::de::from_reader(&rest[id_len..])
        .map_err(|e| format!("malformed COSE key: {e}"))?;
    let mut public_key = Vec::new();
    ciborium::ser::into_writer(&key_value, &mut public_key)
        .map_err(|e| format!("COSE key re-encoding failed: {e}"))?;

    Ok(AttestedCredential {
        credential_id,
        public_key,
    })
}

fn parse_attestation_object(
    raw: &[u8],
) -> std::result::Result<(String, Value, Vec<u8>), String> {
    let value: Value = ciborium::de::from_reader(raw)
        .map_err(|e| format!("malformed attestation object: {e}"))?;
    let map = value
        .as_map()
        .ok_or("attestation object is not a CBOR map")?;

    let mut fmt = None;
    let mut att_stmt = None;
    let mut auth_data = None;
    for (key, val) in map {
        match key.as_text() {
            Some("fmt") => fmt = val.as_text().map(str::to_string),
            Some("attStmt") => att_stmt = Some(val.clone()),
            Some("authData") => auth_data = val.as_bytes().cloned(),
            _ => {}
        }
    }

    Ok((
        fmt.ok_or("attestation object has no fmt")?,
        att_stmt.ok_or("attestation object has no attStmt")?,
        auth_data.ok_or("attestation object has no authData")?,
    ))
}

fn check_rp_id_hash(
    auth_data: &AuthenticatorData,
    rp: &RelyingParty,
) -> std::result::Result<(), String> {
    let expected = Sha256::digest(rp.id().as_bytes());
    if auth_data.rp_id_hash.as_slice() != expected.as_slice() {
        return Err("RP ID hash does not match".into());
    }
    Ok(())
}

/// Verify a packed self-attestation statement (no certificate chain).
fn check_packed_statement(
    att_stmt: &Value,
    auth_data_raw: &[u8],
    client_data_hash: &[u8],
    key: &VerifyingKey,
) -> std::result::Result<(), String> {
    let map = att_stmt.as_map().ok_or("attStmt is not a CBOR map")?;

    let mut alg = None;
    let mut sig = None;
    let mut has_x5c = false;
    for (k, v) in map {
        match k.as_text() {
            Some("alg") => alg = v.as_integer().map(i128::from),
            Some("sig") => sig = v.as_bytes().cloned(),
            Some("x5c") => has_x5c = true,
            _ => {}
        }
    }

    if has_x5c {
        return Err("packed attestation with a certificate chain is not supported".into());
    }
    if alg != Some(i128::from(COSE_ALG_ES256)) {
        return Err("unsupported attestation algorithm".into());
    }
    let sig = sig.ok_or("attStmt has no signature")?;
    let signature =
        Signature::from_der(&sig).map_err(|e| format!("malformed attestation signature: {e}"))?;

    let mut message = auth_data_raw.to_vec();
    message.extend_from_slice(client_data_hash);
    key.verify(&message, &signature)
        .map_err(|_| "attestation signature verification failed".to_string())
}

/// Parse a COSE EC2/P-256 key into a verifying key.
fn verifying_key_from_cose(cose: &[u8]) -> std::result::Result<VerifyingKey, String> {
    let value: Value =
        ciborium::de::from_reader(cose).map_err(|e| format!("malformed COSE key: {e}"))?;
    let map = value.as_map().ok_or("COSE key is not a CBOR map")?;

    let mut kty = None;
    let mut alg = None;
    let mut crv = None;
    let mut x = None;
    let mut y = None;
    for (key, val) in map {
        let Some(label) = key.as_integer().map(i128::from) else {
            continue;
        };
        match label {
            COSE_KTY => kty = val.as_integer().map(i128::from),
            COSE_ALG => alg = val.as_integer().map(i128::from),
            COSE_CRV => crv = val.as_integer().map(i128::from),
            COSE_X => x = val.as_bytes().cloned(),
            COSE_Y => y = val.as_bytes().cloned(),
            _ => {}
        }
    }

    if kty != Some(KTY_EC2) {
        return Err("unsupported COSE key type".into());
    }
    if alg != Some(i128::from(COSE_ALG_ES256)) {
        return Err("unsupported COSE algorithm".into());
    }
    if crv != Some(CRV_P256) {
        return Err("unsupported COSE curve".into());
    }
    let x = x.ok_or("COSE key has no x coordinate")?;
    let y = y.ok_or("COSE key has no y coordinate")?;
    if x.len() != 32 || y.len() != 32 {
        return Err("COSE coordinates must be 32 bytes".into());
    }

    let mut sec1 = Vec::with_capacity(65);
    sec1.push(0x04);
    sec1.extend_from_slice(&x);
    sec1.extend_from_slice(&y);
    VerifyingKey::from_sec1_bytes(&sec1).map_err(|e| format!("invalid P-256 point: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::signature::Signer;
    use p256::ecdsa::SigningKey;
    use p256::elliptic_curve::sec1::ToEncodedPoint;
    use rand::rngs::OsRng;

    const ORIGIN: &str = "https://localhost:5000";
    const CRED_ID: &[u8] = b"test-credential-id";

    fn test_rp() -> RelyingParty {
        RelyingParty::new("localhost", "Test RP", &[ORIGIN]).unwrap()
    }

    fn client_data_json(ceremony_type: &str, challenge: &[u8], origin: &str) -> Vec<u8> {
        serde_json::json!({
            "type": ceremony_type,
            "challenge": URL_SAFE_NO_PAD.encode(challenge),
            "origin": origin,
        })
        .to_string()
        .into_bytes()
    }

    fn cose_key(key: &VerifyingKey) -> Vec<u8> {
        let point = key.to_encoded_point(false);
        let map = Value::Map(vec![
            (Value::Integer(Integer::from(1i64)), Value::Integer(Integer::from(2i64))),
            (Value::Integer(Integer::from(3i64)), Value::Integer(Integer::from(-7i64))),
            (Value::Integer(Integer::from(-1i64)), Value::Integer(Integer::from(1i64))),
            (
                Value::Integer(Integer::from(-2i64)),
                Value::Bytes(point.x().unwrap().as_slice().to_vec()),
            ),
            (
                Value::Integer(Integer::from(-3i64)),
                Value::Bytes(point.y().unwrap().as_slice().to_vec()),
            ),
        ]);
        let mut out = Vec::new();
        ciborium::ser::into_writer(&map, &mut out).unwrap();
        out
    }

    fn authenticator_data(
        rp_id: &str,
        flags: u8,
        sign_count: u32,
        attested: Option<(&[u8], &[u8])>,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(Sha256::digest(rp_id.as_bytes()).as_slice());
        out.push(flags);
        out.extend_from_slice(&sign_count.to_be_bytes());
        if let Some((credential_id, cose)) = attested {
            out.extend_from_slice(&[0u8; 16]); // aaguid
            out.extend_from_slice(&(credential_id.len() as u16).to_be_bytes());
            out.extend_from_slice(credential_id);
            out.extend_from_slice(cose);
        }
        out
    }

    fn attestation_object(fmt: &str, att_stmt: Value, auth_data: &[u8]) -> Vec<u8> {
        let map = Value::Map(vec![
            (Value::Text("fmt".into()), Value::Text(fmt.into())),
            (Value::Text("attStmt".into()), att_stmt),
            (
                Value::Text("authData".into()),
                Value::Bytes(auth_data.to_vec()),
            ),
        ]);
        let mut out = Vec::new();
        ciborium::ser::into_writer(&map, &mut out).unwrap();
        out
    }

    fn registration_response(
        challenge: &[u8],
        origin: &str,
        ceremony_type: &str,
        fmt: &str,
        att_stmt: Value,
        auth_data: &[u8],
    ) -> RegistrationResponse {
        RegistrationResponse {
            client_challenge: challenge.to_vec(),
            client_data_json: client_data_json(ceremony_type, challenge, origin),
            attestation_object: attestation_object(fmt, att_stmt, auth_data),
        }
    }

    #[test]
    fn test_none_attestation_accepted() {
        let signing_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(signing_key.verifying_key());
        let auth_data = authenticator_data("localhost", 0x41, 3, Some((CRED_ID, &cose)));
        let challenge = b"registration-challenge";
        let response = registration_response(
            challenge,
            ORIGIN,
            TYPE_CREATE,
            "none",
            Value::Map(vec![]),
            &auth_data,
        );

        let verified = Fido2Verifier::new()
            .verify_attestation(&response, challenge, &test_rp())
            .unwrap();
        assert_eq!(verified.credential_id, CRED_ID);
        assert_eq!(verified.public_key, cose);
        assert_eq!(verified.sign_count, 3);
    }

    #[test]
    fn test_packed_self_attestation_accepted() {
        let signing_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(signing_key.verifying_key());
        let auth_data = authenticator_data("localhost", 0x41, 0, Some((CRED_ID, &cose)));
        let challenge = b"registration-challenge";
        let client_data = client_data_json(TYPE_CREATE, challenge, ORIGIN);

        let mut message = auth_data.clone();
        message.extend_from_slice(Sha256::digest(&client_data).as_slice());
        let signature: Signature = signing_key.sign(&message);
        let att_stmt = Value::Map(vec![
            (Value::Text("alg".into()), Value::Integer(Integer::from(-7i64))),
            (
                Value::Text("sig".into()),
                Value::Bytes(signature.to_der().as_bytes().to_vec()),
            ),
        ]);

        let response = RegistrationResponse {
            client_challenge: challenge.to_vec(),
            client_data_json: client_data,
            attestation_object: attestation_object("packed", att_stmt, &auth_data),
        };

        let verified = Fido2Verifier::new()
            .verify_attestation(&response, challenge, &test_rp())
            .unwrap();
        assert_eq!(verified.credential_id, CRED_ID);
    }

    #[test]
    fn test_attestation_rejects_wrong_origin() {
        let signing_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(signing_key.verifying_key());
        let auth_data = authenticator_data("localhost", 0x41, 0, Some((CRED_ID, &cose)));
        let challenge = b"challenge";
        let response = registration_response(
            challenge,
            "https://evil.example",
            TYPE_CREATE,
            "none",
            Value::Map(vec![]),
            &auth_data,
        );

        let err = Fido2Verifier::new()
            .verify_attestation(&response, challenge, &test_rp())
            .unwrap_err();
        assert!(matches!(err, CeremonyError::AttestationInvalid(_)));
    }

    #[test]
    fn test_attestation_rejects_wrong_ceremony_type() {
        let signing_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(signing_key.verifying_key());
        let auth_data = authenticator_data("localhost", 0x41, 0, Some((CRED_ID, &cose)));
        let challenge = b"challenge";
        let response = registration_response(
            challenge,
            ORIGIN,
            TYPE_GET,
            "none",
            Value::Map(vec![]),
            &auth_data,
        );

        let err = Fido2Verifier::new()
            .verify_attestation(&response, challenge, &test_rp())
            .unwrap_err();
        assert!(matches!(err, CeremonyError::AttestationInvalid(_)));
    }

    #[test]
    fn test_attestation_rejects_challenge_mismatch() {
        let signing_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(signing_key.verifying_key());
        let auth_data = authenticator_data("localhost", 0x41, 0, Some((CRED_ID, &cose)));
        let response = registration_response(
            b"client-answered-this",
            ORIGIN,
            TYPE_CREATE,
            "none",
            Value::Map(vec![]),
            &auth_data,
        );

        let err = Fido2Verifier::new()
            .verify_attestation(&response, b"server-issued-that", &test_rp())
            .unwrap_err();
        assert!(matches!(err, CeremonyError::AttestationInvalid(_)));
    }

    #[test]
    fn test_attestation_rejects_wrong_rp_id_hash() {
        let signing_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(signing_key.verifying_key());
        let auth_data = authenticator_data("evil.example", 0x41, 0, Some((CRED_ID, &cose)));
        let challenge = b"challenge";
        let response = registration_response(
            challenge,
            ORIGIN,
            TYPE_CREATE,
            "none",
            Value::Map(vec![]),
            &auth_data,
        );

        let err = Fido2Verifier::new()
            .verify_attestation(&response, challenge, &test_rp())
            .unwrap_err();
        assert!(matches!(err, CeremonyError::AttestationInvalid(_)));
    }

    #[test]
    fn test_attestation_requires_user_present() {
        let signing_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(signing_key.verifying_key());
        // AT set, UP clear.
        let auth_data = authenticator_data("localhost", 0x40, 0, Some((CRED_ID, &cose)));
        let challenge = b"challenge";
        let response = registration_response(
            challenge,
            ORIGIN,
            TYPE_CREATE,
            "none",
            Value::Map(vec![]),
            &auth_data,
        );

        let err = Fido2Verifier::new()
            .verify_attestation(&response, challenge, &test_rp())
            .unwrap_err();
        assert!(matches!(err, CeremonyError::AttestationInvalid(_)));
    }

    #[test]
    fn test_attestation_rejects_unsupported_format() {
        let signing_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(signing_key.verifying_key());
        let auth_data = authenticator_data("localhost", 0x41, 0, Some((CRED_ID, &cose)));
        let challenge = b"challenge";
        let response = registration_response(
            challenge,
            ORIGIN,
            TYPE_CREATE,
            "fido-u2f",
            Value::Map(vec![]),
            &auth_data,
        );

        let err = Fido2Verifier::new()
            .verify_attestation(&response, challenge, &test_rp())
            .unwrap_err();
        assert!(matches!(err, CeremonyError::AttestationInvalid(_)));
    }

    fn assertion_response(
        signing_key: &SigningKey,
        challenge: &[u8],
        sign_count: u32,
    ) -> AuthenticationResponse {
        let auth_data = authenticator_data("localhost", FLAG_USER_PRESENT, sign_count, None);
        let client_data = client_data_json(TYPE_GET, challenge, ORIGIN);
        let mut message = auth_data.clone();
        message.extend_from_slice(Sha256::digest(&client_data).as_slice());
        let signature: Signature = signing_key.sign(&message);

        AuthenticationResponse {
            credential_id: CRED_ID.to_vec(),
            client_challenge: challenge.to_vec(),
            client_data_json: client_data,
            authenticator_data: auth_data,
            signature: signature.to_der().as_bytes().to_vec(),
            user_handle: None,
        }
    }

    #[test]
    fn test_assertion_accepted_with_reported_counter() {
        let signing_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(signing_key.verifying_key());
        let challenge = b"authentication-challenge";
        let response = assertion_response(&signing_key, challenge, 7);

        let reported = Fido2Verifier::new()
            .verify_assertion(&response, &cose, challenge, &test_rp())
            .unwrap();
        assert_eq!(reported, 7);
    }

    #[test]
    fn test_assertion_rejects_foreign_key() {
        let signing_key = SigningKey::random(&mut OsRng);
        let other_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(other_key.verifying_key());
        let challenge = b"authentication-challenge";
        let response = assertion_response(&signing_key, challenge, 1);

        let err = Fido2Verifier::new()
            .verify_assertion(&response, &cose, challenge, &test_rp())
            .unwrap_err();
        assert!(matches!(err, CeremonyError::AssertionInvalid(_)));
    }

    #[test]
    fn test_assertion_rejects_tampered_message() {
        let signing_key = SigningKey::random(&mut OsRng);
        let cose = cose_key(signing_key.verifying_key());
        let challenge = b"authentication-challenge";
        let mut response = assertion_response(&signing_key, challenge, 1);
        // Bump the reported counter after signing.
        let len = response.authenticator_data.len();
        response.authenticator_data[len - 1] ^= 0xff;

        let err = Fido2Verifier::new()
            .verify_assertion(&response, &cose, challenge, &test_rp())
            .unwrap_err();
        assert!(matches!(err, CeremonyError::AssertionInvalid(_)));
    }

    #[test]
    fn test_client_challenge_extraction() {
        let raw = client_data_json(TYPE_GET, b"some-challenge", ORIGIN);
        assert_eq!(client_challenge(&raw).unwrap(), b"some-challenge");
        assert!(client_challenge(b"not json").is_none());
    }

    #[test]
    fn test_cose_key_rejects_wrong_curve() {
        let signing_key = SigningKey::random(&mut OsRng);
        let point = signing_key.verifying_key().to_encoded_point(false);
        let map = Value::Map(vec![
            (Value::Integer(Integer::from(1i64)), Value::Integer(Integer::from(2i64))),
            (Value::Integer(Integer::from(3i64)), Value::Integer(Integer::from(-7i64))),
            // P-384 instead of P-256
            (Value::Integer(Integer::from(-1i64)), Value::Integer(Integer::from(2i64))),
            (
                Value::Integer(Integer::from(-2i64)),
                Value::Bytes(point.x().unwrap().as_slice().to_vec()),
            ),
            (
                Value::Integer(Integer::from(-3i64)),
                Value::Bytes(point.y().unwrap().as_slice().to_vec()),
            ),
        ]);
        let mut cose = Vec::new();
        ciborium::ser::into_writer(&map, &mut cose).unwrap();

        assert!(verifying_key_from_cose(&cose).is_err());
    }
}

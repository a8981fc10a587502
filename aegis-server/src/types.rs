//! Wire types for the WebAuthn REST API.
//!
//! Binary fields travel as base64url without padding and are decoded to
//! raw bytes here; the ceremony core only ever sees raw byte sequences.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use aegis_core::verifier::fido2::client_challenge;
use aegis_core::{
    AuthenticationOptions, AuthenticationResponse, RegistrationOptions, RegistrationResponse,
};

use crate::error::ApiError;

/// Base64url-encode bytes (no padding).
pub(crate) fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a base64url field, naming it in the error.
pub(crate) fn decode(field: &str, value: &str) -> Result<Vec<u8>, ApiError> {
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| ApiError::bad_request(format!("{field} is not base64url: {e}")))
}

fn ensure_public_key_type(credential_type: &str) -> Result<(), ApiError> {
    if credential_type != "public-key" {
        return Err(ApiError::bad_request(format!(
            "unsupported credential type \"{credential_type}\""
        )));
    }
    Ok(())
}

fn extract_client_challenge(client_data_json: &[u8]) -> Result<Vec<u8>, ApiError> {
    client_challenge(client_data_json)
        .ok_or_else(|| ApiError::bad_request("clientDataJSON has no decodable challenge"))
}

// ==================== Requests ====================

/// Request to start credential registration
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterBeginRequest {
    /// Username to register; created on first contact
    #[schema(example = "alice")]
    pub username: String,
}

/// Attestation response fields produced by `navigator.credentials.create`
#[derive(Debug, Deserialize, ToSchema)]
pub struct AttestationResponseBody {
    /// Base64url CBOR attestation object
    #[serde(rename = "attestationObject")]
    pub attestation_object: String,
    /// Base64url clientDataJSON
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
}

/// Request to complete credential registration
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterCompleteRequest {
    pub username: String,
    /// Credential ID (base64url)
    pub id: String,
    #[serde(rename = "rawId")]
    pub raw_id: String,
    /// Must be "public-key"
    #[serde(rename = "type")]
    pub credential_type: String,
    pub response: AttestationResponseBody,
}

impl RegisterCompleteRequest {
    /// Decode into the core registration payload.
    pub fn into_core(self) -> Result<(String, RegistrationResponse), ApiError> {
        ensure_public_key_type(&self.credential_type)?;
        let client_data_json = decode("clientDataJSON", &self.response.client_data_json)?;
        let attestation_object = decode("attestationObject", &self.response.attestation_object)?;
        let client_challenge = extract_client_challenge(&client_data_json)?;

        Ok((
            self.username,
            RegistrationResponse {
                client_challenge,
                client_data_json,
                attestation_object,
            },
        ))
    }
}

/// Request to start authentication
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthenticateBeginRequest {
    /// Username to authenticate; omit for the discoverable-credential flow
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: Option<String>,
}

/// Assertion response fields produced by `navigator.credentials.get`
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssertionResponseBody {
    /// Base64url authenticator data
    #[serde(rename = "authenticatorData")]
    pub authenticator_data: String,
    /// Base64url clientDataJSON
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    /// Base64url DER signature
    pub signature: String,
    /// Base64url user handle, when the authenticator discloses it
    #[serde(rename = "userHandle", default)]
    pub user_handle: Option<String>,
}

/// Request to complete authentication
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthenticateCompleteRequest {
    /// Credential ID (base64url)
    pub id: String,
    #[serde(rename = "rawId")]
    pub raw_id: String,
    /// Must be "public-key"
    #[serde(rename = "type")]
    pub credential_type: String,
    pub response: AssertionResponseBody,
}

impl AuthenticateCompleteRequest {
    /// Decode into the core authentication payload.
    pub fn into_core(self) -> Result<AuthenticationResponse, ApiError> {
        ensure_public_key_type(&self.credential_type)?;
        let credential_id = decode("rawId", &self.raw_id)?;
        let client_data_json = decode("clientDataJSON", &self.response.client_data_json)?;
        let authenticator_data =
            decode("authenticatorData", &self.response.authenticator_data)?;
        let signature = decode("signature", &self.response.signature)?;
        let user_handle = self
            .response
            .user_handle
            .as_deref()
            .map(|h| decode("userHandle", h))
            .transpose()?;
        let client_challenge = extract_client_challenge(&client_data_json)?;

        Ok(AuthenticationResponse {
            credential_id,
            client_challenge,
            client_data_json,
            authenticator_data,
            signature,
            user_handle,
        })
    }
}

// ==================== Responses ====================

/// Relying-party entity as sent to the client
#[derive(Debug, Serialize, ToSchema)]
pub struct RpEntityBody {
    pub id: String,
    pub name: String,
}

/// User entity as sent to the client
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEntityBody {
    /// Base64url user handle
    pub id: String,
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// One accepted public-key algorithm
#[derive(Debug, Serialize, ToSchema)]
pub struct CredentialParameterBody {
    /// Always "public-key"
    #[serde(rename = "type")]
    pub credential_type: &'static str,
    /// COSE algorithm identifier
    pub alg: i64,
}

/// Reference to an already-registered credential
#[derive(Debug, Serialize, ToSchema)]
pub struct CredentialDescriptorBody {
    /// Always "public-key"
    #[serde(rename = "type")]
    pub credential_type: &'static str,
    /// Base64url credential ID
    pub id: String,
}

/// Authenticator-selection hints for registration
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthenticatorSelectionBody {
    #[serde(rename = "authenticatorAttachment")]
    pub authenticator_attachment: &'static str,
    #[serde(rename = "userVerification")]
    pub user_verification: &'static str,
    #[serde(rename = "requireResidentKey")]
    pub require_resident_key: bool,
}

/// `PublicKeyCredentialCreationOptions` for the client
#[derive(Debug, Serialize, ToSchema)]
pub struct CreationOptionsBody {
    /// Base64url challenge
    pub challenge: String,
    pub rp: RpEntityBody,
    pub user: UserEntityBody,
    #[serde(rename = "pubKeyCredParams")]
    pub pub_key_cred_params: Vec<CredentialParameterBody>,
    #[serde(rename = "excludeCredentials")]
    pub exclude_credentials: Vec<CredentialDescriptorBody>,
    #[serde(rename = "authenticatorSelection")]
    pub authenticator_selection: AuthenticatorSelectionBody,
}

/// Response to `POST /register/begin`
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterBeginResponse {
    #[serde(rename = "publicKey")]
    pub public_key: CreationOptionsBody,
}

impl From<RegistrationOptions> for RegisterBeginResponse {
    fn from(options: RegistrationOptions) -> Self {
        Self {
            public_key: CreationOptionsBody {
                challenge: encode(&options.challenge),
                rp: RpEntityBody {
                    id: options.rp_id,
                    name: options.rp_name,
                },
                user: UserEntityBody {
                    id: encode(options.user.handle()),
                    name: options.user.name().to_string(),
                    display_name: options.user.display_name().to_string(),
                },
                pub_key_cred_params: options
                    .algorithms
                    .iter()
                    .map(|&alg| CredentialParameterBody {
                        credential_type: "public-key",
                        alg,
                    })
                    .collect(),
                exclude_credentials: options
                    .exclude_credentials
                    .iter()
                    .map(|id| CredentialDescriptorBody {
                        credential_type: "public-key",
                        id: encode(id),
                    })
                    .collect(),
                authenticator_selection: AuthenticatorSelectionBody {
                    authenticator_attachment: "cross-platform",
                    user_verification: "preferred",
                    require_resident_key: false,
                },
            },
        }
    }
}

/// Response to `POST /register/complete`
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterCompleteResponse {
    pub status: String,
    /// Base64url ID of the newly registered credential
    pub credential_id: String,
    pub username: String,
}

/// `PublicKeyCredentialRequestOptions` for the client
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestOptionsBody {
    /// Base64url challenge
    pub challenge: String,
    #[serde(rename = "allowCredentials")]
    pub allow_credentials: Vec<CredentialDescriptorBody>,
    /// Milliseconds the client should wait for the authenticator
    pub timeout: u32,
    #[serde(rename = "userVerification")]
    pub user_verification: &'static str,
    #[serde(rename = "rpId")]
    pub rp_id: String,
}

/// Response to `POST /authenticate/begin`
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthenticateBeginResponse {
    #[serde(rename = "publicKey")]
    pub public_key: RequestOptionsBody,
}

impl From<AuthenticationOptions> for AuthenticateBeginResponse {
    fn from(options: AuthenticationOptions) -> Self {
        Self {
            public_key: RequestOptionsBody {
                challenge: encode(&options.challenge),
                allow_credentials: options
                    .allow_credentials
                    .iter()
                    .map(|id| CredentialDescriptorBody {
                        credential_type: "public-key",
                        id: encode(id),
                    })
                    .collect(),
                timeout: options.timeout_ms,
                user_verification: "preferred",
                rp_id: options.rp_id,
            },
        }
    }
}

/// Response to `POST /authenticate/complete`
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthenticateCompleteResponse {
    pub status: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_data_with_challenge(challenge: &[u8]) -> String {
        let json = serde_json::json!({
            "type": "webauthn.get",
            "challenge": encode(challenge),
            "origin": "http://localhost:3000",
        });
        encode(json.to_string().as_bytes())
    }

    #[test]
    fn test_authenticate_complete_decodes_fields() {
        let request = AuthenticateCompleteRequest {
            id: encode(b"cred-1"),
            raw_id: encode(b"cred-1"),
            credential_type: "public-key".to_string(),
            response: AssertionResponseBody {
                authenticator_data: encode(b"auth-data"),
                client_data_json: client_data_with_challenge(b"challenge-bytes"),
                signature: encode(b"signature"),
                user_handle: None,
            },
        };

        let payload = request.into_core().unwrap();
        assert_eq!(payload.credential_id, b"cred-1");
        assert_eq!(payload.client_challenge, b"challenge-bytes");
        assert_eq!(payload.authenticator_data, b"auth-data");
        assert_eq!(payload.signature, b"signature");
        assert!(payload.user_handle.is_none());
    }

    #[test]
    fn test_wrong_credential_type_rejected() {
        let request = AuthenticateCompleteRequest {
            id: encode(b"cred-1"),
            raw_id: encode(b"cred-1"),
            credential_type: "password".to_string(),
            response: AssertionResponseBody {
                authenticator_data: encode(b"auth-data"),
                client_data_json: client_data_with_challenge(b"challenge"),
                signature: encode(b"signature"),
                user_handle: None,
            },
        };

        assert!(request.into_core().is_err());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let request = RegisterCompleteRequest {
            username: "alice".to_string(),
            id: encode(b"cred-1"),
            raw_id: encode(b"cred-1"),
            credential_type: "public-key".to_string(),
            response: AttestationResponseBody {
                attestation_object: "!!! not base64url !!!".to_string(),
                client_data_json: client_data_with_challenge(b"challenge"),
            },
        };

        assert!(request.into_core().is_err());
    }

    #[test]
    fn test_registration_options_round_trip_encoding() {
        let body = serde_json::to_value(RegisterBeginResponse {
            public_key: CreationOptionsBody {
                challenge: encode(b"challenge"),
                rp: RpEntityBody {
                    id: "localhost".into(),
                    name: "Aegis".into(),
                },
                user: UserEntityBody {
                    id: encode(b"handle"),
                    name: "alice".into(),
                    display_name: "alice".into(),
                },
                pub_key_cred_params: vec![CredentialParameterBody {
                    credential_type: "public-key",
                    alg: -7,
                }],
                exclude_credentials: vec![],
                authenticator_selection: AuthenticatorSelectionBody {
                    authenticator_attachment: "cross-platform",
                    user_verification: "preferred",
                    require_resident_key: false,
                },
            },
        })
        .unwrap();

        assert_eq!(body["publicKey"]["pubKeyCredParams"][0]["alg"], -7);
        assert_eq!(body["publicKey"]["rp"]["id"], "localhost");
        assert_eq!(
            body["publicKey"]["authenticatorSelection"]["userVerification"],
            "preferred"
        );
    }
}

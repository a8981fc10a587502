//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3.0 specification for the Aegis WebAuthn API.

use utoipa::OpenApi;

use crate::handlers::HealthResponse;
use crate::types::{
    AssertionResponseBody, AttestationResponseBody, AuthenticateBeginRequest,
    AuthenticateBeginResponse, AuthenticateCompleteRequest, AuthenticateCompleteResponse,
    AuthenticatorSelectionBody, CreationOptionsBody, CredentialDescriptorBody,
    CredentialParameterBody, RegisterBeginRequest, RegisterBeginResponse,
    RegisterCompleteRequest, RegisterCompleteResponse, RequestOptionsBody, RpEntityBody,
    UserEntityBody,
};

/// Aegis WebAuthn Relying Party - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aegis - WebAuthn Relying Party API",
        version = "0.1.0",
        description = r#"
## Passwordless authentication ceremonies

Aegis implements the server side of WebAuthn:

- **Registration** - enroll an authenticator's public-key credential
- **Authentication** - prove possession of a registered credential

Each ceremony is a begin/complete pair. `begin` issues a single-use,
time-bounded challenge; `complete` consumes it exactly once and verifies
the authenticator's response. Signature counters are checked on every
authentication to detect cloned authenticators.

All binary fields are base64url-encoded without padding.
"#,
        license(
            name = "MIT OR Apache-2.0",
            url = "https://github.com/aegis-rp/aegis/blob/main/LICENSE"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "WebAuthn", description = "Registration and authentication ceremonies"),
        (name = "Health", description = "Service health endpoint")
    ),
    paths(
        crate::handlers::webauthn::register_begin,
        crate::handlers::webauthn::register_complete,
        crate::handlers::webauthn::authenticate_begin,
        crate::handlers::webauthn::authenticate_complete,
        crate::handlers::health::health,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterBeginRequest,
            RegisterBeginResponse,
            RegisterCompleteRequest,
            RegisterCompleteResponse,
            AuthenticateBeginRequest,
            AuthenticateBeginResponse,
            AuthenticateCompleteRequest,
            AuthenticateCompleteResponse,
            AttestationResponseBody,
            AssertionResponseBody,
            CreationOptionsBody,
            RequestOptionsBody,
            RpEntityBody,
            UserEntityBody,
            CredentialParameterBody,
            CredentialDescriptorBody,
            AuthenticatorSelectionBody,
        )
    )
)]
pub struct ApiDoc;

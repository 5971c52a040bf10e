use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the trait used by signer as the signing credential.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is valid.
    fn is_valid(&self) -> bool;
}

/// SignRequest is the trait used by signer to sign the request.
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this builder.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request in place.
    ///
    /// Implementations must be free of I/O: the same request, credential and
    /// signing time always produce the same headers.
    fn sign_request(
        &self,
        ctx: &Context,
        req: &mut http::request::Parts,
        credential: &Self::Credential,
    ) -> Result<()>;
}

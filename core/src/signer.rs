use crate::{Context, Error, Result, SignRequest, SigningCredential};
use std::sync::Arc;

/// Signer is the main struct used to sign the request.
///
/// The credential is fixed at construction and never mutated, so a signer
/// can be shared freely between threads.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    credential: K,
    builder: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(ctx: Context, credential: K, builder: impl SignRequest<Credential = K>) -> Self {
        Self {
            ctx,
            credential,
            builder: Arc::new(builder),
        }
    }

    /// Get the credential used by this signer.
    pub fn credential(&self) -> &K {
        &self.credential
    }

    /// Signing request.
    pub fn sign(&self, req: &mut http::request::Parts) -> Result<()> {
        if !self.credential.is_valid() {
            return Err(Error::credential_invalid(
                "credential is not valid for signing",
            ));
        }

        self.builder
            .sign_request(&self.ctx, req, &self.credential)
    }
}

//! In-process authority backed by a tokio channel.
//!
//! `dispatch` enqueues the job and returns immediately. Whatever task owns the
//! receiving end plays the oracle node: it performs the off-chain check and
//! delivers the resulting [`Attestation`](crate::Attestation) to the registry.

use tokio::sync::mpsc;

use crate::{AttestationAuthority, OracleError, OracleRequest};

/// Authority that forwards every job into an unbounded channel.
pub struct ChannelAuthority {
    name: String,
    jobs: mpsc::UnboundedSender<OracleRequest>,
}

impl ChannelAuthority {
    /// Create the authority and the receiver its jobs arrive on.
    pub fn new(name: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<OracleRequest>) {
        let (jobs, rx) = mpsc::unbounded_channel();
        (
            Self {
                name: name.into(),
                jobs,
            },
            rx,
        )
    }
}

impl AttestationAuthority for ChannelAuthority {
    fn dispatch(&self, request: &OracleRequest) -> Result<(), OracleError> {
        self.jobs
            .send(request.clone())
            .map_err(|_| OracleError::Unavailable(format!("{} job queue closed", self.name)))?;
        tracing::debug!(
            authority = %self.name,
            handle = %request.handle,
            subject = %request.subject,
            "verification job queued"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

//! Registration as the game UI drives it.

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::audio::{AudioDeliveryService, PlaybackOutcome};
use crate::client::ApiClient;
use crate::error::Result;
use crate::types::RegisterResponse;

/// Result of [`register_and_welcome`].
#[derive(Debug)]
pub struct Registration {
    pub response: RegisterResponse,
    /// Background welcome clip; `None` when the backend did not accept the child.
    pub welcome: Option<JoinHandle<PlaybackOutcome>>,
}

impl Registration {
    pub fn accepted(&self) -> bool {
        self.response.ok
    }
}

/// Register a child and, once accepted, start the clip named after them.
///
/// Returns as soon as the backend answers. The clip plays on its own task and
/// its failures never reach the caller.
pub async fn register_and_welcome(
    client: &ApiClient,
    audio: &AudioDeliveryService,
    nome: &str,
    grade_label: &str,
    email_responsavel: &str,
) -> Result<Registration> {
    let response = client
        .register_child(nome, grade_label, email_responsavel)
        .await?;

    if !response.ok {
        debug!(nome, "Registration not accepted, skipping welcome clip");
        return Ok(Registration {
            response,
            welcome: None,
        });
    }

    let welcome = audio.reference_for_name(nome).map(|reference| {
        info!(nome, reference = reference.logical(), "Starting welcome clip");
        audio.spawn_play(reference)
    });

    Ok(Registration { response, welcome })
}

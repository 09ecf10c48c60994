use androfit_voice::VoiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Session has not been started")]
    NotStarted,

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error("Job dispatch error: {0}")]
    Dispatch(String),
}

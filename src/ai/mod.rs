//! AI narrative generation
//!
//! The narrative is optional decoration on top of a complete report: any
//! failure is logged and turned into [`Narrative::Unavailable`], and never
//! changes the exit status.

use crate::config::AiSettings;
use crate::error::Result;
use crate::report::{Narrative, Report};

mod client;
pub mod prompt;

pub use client::ChatClient;

/// A service that turns a report prompt into narrative text
pub trait NarrativeProvider {
    fn narrate(&self, prompt: &str) -> Result<String>;
}

/// Build the provider for the configured AI service
pub fn provider(settings: Option<&AiSettings>) -> Result<Option<Box<dyn NarrativeProvider>>> {
    let Some(settings) = settings else {
        return Ok(None);
    };
    Ok(Some(Box::new(ChatClient::new(settings)?)))
}

/// Ask `provider` for a narrative of `report`, in a single attempt
pub fn narrative(provider: Option<&dyn NarrativeProvider>, report: &Report) -> Narrative {
    let Some(provider) = provider else {
        return Narrative::Disabled;
    };
    match provider.narrate(&prompt::build(report)) {
        Ok(text) => Narrative::Available(text),
        Err(e) => {
            tracing::warn!(error = %e, "AI narrative unavailable");
            Narrative::Unavailable(e.to_string())
        }
    }
}

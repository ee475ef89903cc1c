//! Fallback strategy: ask the reasoning service for a directive.

use crate::ai::AiChat;
use crate::error::Result;
use crate::instruction::Directive;
use crate::json_scan;
use crate::provider::Provider;
use crate::resources::ResourceCatalog;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum PlannerOutcome {
    Directive(Directive),
    /// The service answered, but not with a valid directive. Shown, never run.
    Text(String),
    Empty,
}

pub struct PlannerParser<A> {
    ai: A,
    provider: Provider,
}

impl<A: AiChat> PlannerParser<A> {
    pub fn new(ai: A, provider: Provider) -> Self {
        Self { ai, provider }
    }

    pub fn ai(&self) -> &A {
        &self.ai
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn set_provider(&mut self, provider: Provider) {
        self.provider = provider;
    }

    pub async fn plan(&self, input: &str, catalog: &ResourceCatalog) -> Result<PlannerOutcome> {
        let prompt = build_prompt(input, catalog);
        let raw = self.ai.chat(self.provider, &prompt).await?;
        let outcome = interpret(&raw);
        debug!(?outcome, "planner outcome");
        Ok(outcome)
    }
}

/// Instructions sent to the reasoning service for one operator request.
pub fn build_prompt(input: &str, catalog: &ResourceCatalog) -> String {
    let mut prompt = String::new();

    prompt.push_str("Tu traduis les demandes d'un opérateur de chantier naval en appels à l'API moussAIllon.\n");
    prompt.push_str("Réponds avec EXACTEMENT UN objet JSON, sans texte autour, de l'une de ces deux formes:\n");
    prompt.push_str(r#"{"action":"mcp_call","method":"GET|POST|PUT|DELETE","path":"/ressource","query":{},"body":{}}"#);
    prompt.push('\n');
    prompt.push_str(r#"{"action":"reply","message":"texte de réponse"}"#);
    prompt.push_str("\n\n");
    prompt.push_str("`query` et `body` sont optionnels. Utilise `/ressource/search` avec {\"q\": ...} pour une recherche.\n");
    prompt.push_str("Ressources disponibles: ");
    prompt.push_str(&catalog.paths().join(", "));
    prompt.push_str("\n\n");
    prompt.push_str("Demande: ");
    prompt.push_str(input.trim());

    prompt
}

/// Reads a directive out of the raw reply; a fenced block is preferred.
pub fn interpret(raw: &str) -> PlannerOutcome {
    let directive = json_scan::fenced_block(raw)
        .and_then(json_scan::first_object)
        .and_then(Directive::from_value)
        .or_else(|| json_scan::first_object(raw).and_then(Directive::from_value));

    if let Some(directive) = directive {
        return PlannerOutcome::Directive(directive);
    }

    let text = raw.trim();
    if text.is_empty() {
        PlannerOutcome::Empty
    } else {
        PlannerOutcome::Text(text.to_string())
    }
}

//! Runs the resolution stages in strict precedence order.
//!
//! 1. `help`, 2. `resources`, 3. explicit syntax, 4. natural language,
//! 5. AI planner. The first stage that produces an outcome ends the turn;
//! an error from stages 3 and 4 is also terminal.

use crate::ai::AiChat;
use crate::error::{ChatError, Result};
use crate::instruction::{Directive, ParsedInstruction};
use crate::parser::{parse_explicit, NaturalLanguageParser, PlannerOutcome, PlannerParser};
use crate::provider::Provider;
use crate::resources::ResourceCatalog;
use tracing::{debug, info};

pub const HELP_TEXT: &str = "\
Commandes disponibles:
- help : affiche cette aide
- resources : liste les ressources de l'API
- METHODE /chemin [json] : appel direct, ex: GET /clients, POST /clients {\"nom\":\"Dupont\"}
- langage naturel, ex: liste les bateaux, supprime le client 12,
  cherche dupont dans les clients, crée un client {\"nom\":\"Dupont\"},
  modifie le moteur 3 {\"marque\":\"Yamaha\"}
Sinon, la demande est confiée à l'assistant IA.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Help,
    Resources,
    Explicit,
    NaturalLanguage,
    Planner,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Terminal text, nothing to execute.
    Reply(String),
    Execute(ParsedInstruction),
}

pub struct CommandResolver<A> {
    natural: NaturalLanguageParser,
    planner: PlannerParser<A>,
}

impl<A: AiChat> CommandResolver<A> {
    pub fn new(ai: A, provider: Provider, catalog: ResourceCatalog) -> Self {
        Self {
            natural: NaturalLanguageParser::new(catalog),
            planner: PlannerParser::new(ai, provider),
        }
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        self.natural.catalog()
    }

    pub fn provider(&self) -> Provider {
        self.planner.provider()
    }

    pub fn set_provider(&mut self, provider: Provider) {
        self.planner.set_provider(provider);
    }

    pub async fn resolve(&self, input: &str) -> Result<Resolution> {
        let (stage, resolution) = self.resolve_staged(input).await?;
        info!(?stage, "command resolved");
        Ok(resolution)
    }

    pub async fn resolve_staged(&self, input: &str) -> Result<(Stage, Resolution)> {
        let text = input.trim();

        if text.eq_ignore_ascii_case("help") || text.eq_ignore_ascii_case("aide") {
            return Ok((Stage::Help, Resolution::Reply(HELP_TEXT.to_string())));
        }
        if text.eq_ignore_ascii_case("resources") || text.eq_ignore_ascii_case("ressources") {
            return Ok((
                Stage::Resources,
                Resolution::Execute(ParsedInstruction::list_resources()),
            ));
        }
        if let Some(instruction) = parse_explicit(text)? {
            return Ok((Stage::Explicit, Resolution::Execute(instruction)));
        }
        if let Some(instruction) = self.natural.parse(text)? {
            return Ok((Stage::NaturalLanguage, Resolution::Execute(instruction)));
        }

        debug!("falling back to planner");
        let outcome = self
            .planner
            .plan(text, self.natural.catalog())
            .await
            .map_err(|e| not_understood(Some(&e)))?;

        let resolution = match outcome {
            PlannerOutcome::Directive(Directive::Reply { message }) => Resolution::Reply(message),
            PlannerOutcome::Directive(directive) => match directive.into_instruction() {
                Some(instruction) => Resolution::Execute(instruction),
                None => return Err(not_understood(None)),
            },
            PlannerOutcome::Text(text) => Resolution::Reply(text),
            PlannerOutcome::Empty => return Err(not_understood(None)),
        };
        Ok((Stage::Planner, resolution))
    }
}

fn not_understood(cause: Option<&ChatError>) -> ChatError {
    let mut message = "commande non comprise. Tapez 'help' pour voir les exemples.".to_string();
    if let Some(cause) = cause {
        message.push_str(&format!(" (IA: {})", cause));
    }
    ChatError::UnresolvedCommand(message)
}

//! Heuristic French (and a little English) command parser.
//!
//! Only the command part of the input, before the first `{`, is inspected for
//! the resource, the id and the verb. The JSON part is read from the original
//! text so its values keep their case.

use crate::error::{ChatError, Result};
use crate::instruction::{HttpMethod, ParsedInstruction};
use crate::json_scan::{self, Embedded};
use crate::resources::ResourceCatalog;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

const LIST_RESOURCES_PHRASES: &[&str] = &[
    "liste les ressources",
    "lister les ressources",
    "liste des ressources",
    "affiche les ressources",
    "quelles ressources",
    "ressources disponibles",
    "list resources",
    "show resources",
];

const DELETE_WORDS: &[&str] = &[
    "supprime", "supprimer", "supprimez", "efface", "effacer", "delete", "remove",
];
const CREATE_WORDS: &[&str] = &[
    "crée", "cree", "créer", "creer", "créez", "ajoute", "ajouter", "ajoutez", "nouveau",
    "nouvelle", "create", "add",
];
const UPDATE_WORDS: &[&str] = &[
    "modifie", "modifier", "modifiez", "change", "changer", "maj", "update",
];
const UPDATE_PHRASES: &[&str] = &["mets à jour", "met à jour", "mettre à jour", "mets a jour"];
const SEARCH_WORDS: &[&str] = &[
    "cherche", "chercher", "cherchez", "recherche", "rechercher", "trouve", "trouver", "search",
    "find",
];
const LIST_WORDS: &[&str] = &[
    "liste", "lister", "listez", "affiche", "afficher", "montre", "montrer", "voir", "list",
    "show",
];
const STOPWORDS: &[&str] = &[
    "le", "la", "les", "l", "un", "une", "des", "du", "de", "d", "dans", "pour", "par", "avec",
    "sur", "en", "au", "aux", "et", "ou", "qui", "tous", "toutes", "tout", "moi", "me", "nom",
    "nommé", "nommée", "appelé", "appelée", "the", "in", "for", "a", "an",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Delete,
    Create,
    Update,
    Search,
    List,
}

pub struct NaturalLanguageParser {
    catalog: ResourceCatalog,
}

impl NaturalLanguageParser {
    pub fn new(catalog: ResourceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn parse(&self, input: &str) -> Result<Option<ParsedInstruction>> {
        let original = input.trim();
        let head = match json_scan::first_brace(original) {
            Some(idx) => &original[..idx],
            None => original,
        };
        let head = head.to_lowercase();

        if LIST_RESOURCES_PHRASES.iter().any(|p| head.contains(p)) {
            return Ok(Some(ParsedInstruction::list_resources()));
        }

        let Some((path, keyword)) = self.catalog.resolve(&head) else {
            return Ok(None);
        };
        let words = words(&head);
        let id = extract_id(&head);

        match detect_verb(&head, &words) {
            Some(Verb::Delete) => Ok(id.map(|id| {
                ParsedInstruction::new(HttpMethod::Delete, format!("{}/{}", path, id))
            })),
            Some(Verb::Create) => {
                let body = require_body(original, &format!(
                    "Ajoutez un exemple JSON pour la création, ex: crée un client {}",
                    r#"{"nom":"Dupont"}"#
                ))?;
                Ok(Some(ParsedInstruction::new(HttpMethod::Post, path).with_body(body)))
            }
            Some(Verb::Update) => {
                let Some(id) = id else {
                    return Err(ChatError::syntax(
                        "Précisez l'identifiant à modifier, ex: modifie le client 12 {\"nom\":\"Durand\"}",
                    ));
                };
                let body = require_body(original, &format!(
                    "Ajoutez le JSON des champs à modifier, ex: modifie le client {} {}",
                    id, r#"{"nom":"Durand"}"#
                ))?;
                Ok(Some(
                    ParsedInstruction::new(HttpMethod::Put, format!("{}/{}", path, id)).with_body(body),
                ))
            }
            Some(Verb::Search) => {
                let query = search_terms(&words, keyword);
                if query.is_empty() {
                    return Err(ChatError::syntax(
                        "Précisez quoi chercher, ex: cherche dupont dans les clients",
                    ));
                }
                Ok(Some(
                    ParsedInstruction::new(HttpMethod::Get, format!("{}/search", path))
                        .with_query(json!({ "q": query })),
                ))
            }
            Some(Verb::List) => Ok(Some(ParsedInstruction::new(HttpMethod::Get, path))),
            None => Ok(id.map(|id| ParsedInstruction::new(HttpMethod::Get, format!("{}/{}", path, id)))),
        }
    }
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

fn extract_id(text: &str) -> Option<String> {
    static ID: OnceLock<Option<Regex>> = OnceLock::new();
    ID.get_or_init(|| Regex::new(r"\b(\d+)\b").ok())
        .as_ref()?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First matching verb in priority order: delete, create, update, search, list.
fn detect_verb(head: &str, words: &[&str]) -> Option<Verb> {
    let has = |set: &[&str]| words.iter().any(|w| set.contains(w));
    if has(DELETE_WORDS) {
        Some(Verb::Delete)
    } else if has(CREATE_WORDS) {
        Some(Verb::Create)
    } else if has(UPDATE_WORDS) || UPDATE_PHRASES.iter().any(|p| head.contains(p)) {
        Some(Verb::Update)
    } else if has(SEARCH_WORDS) {
        Some(Verb::Search)
    } else if has(LIST_WORDS) {
        Some(Verb::List)
    } else {
        None
    }
}

fn require_body(original: &str, missing: &str) -> Result<Value> {
    match json_scan::object_at_first_brace(original) {
        Embedded::Found(body) => Ok(body),
        Embedded::Absent => Err(ChatError::syntax(missing)),
        Embedded::Invalid(e) => Err(ChatError::syntax(format!("JSON invalide: {}", e))),
    }
}

/// What is left once the verb, stopwords and resource words are removed.
fn search_terms(words: &[&str], keyword: &str) -> String {
    words
        .iter()
        .copied()
        .filter(|w| !SEARCH_WORDS.contains(w))
        .filter(|w| !STOPWORDS.contains(w))
        .filter(|w| !w.contains(keyword))
        .collect::<Vec<_>>()
        .join(" ")
}

//! Lookup tables passed into the resolver and executor.
//!
//! Both tables are ordered; the first matching rule wins.

use serde::{Deserialize, Serialize};

/// Maps operator vocabulary to an API root path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRule {
    pub path: String,
    pub keywords: Vec<String>,
}

/// Maps an API path fragment to a console route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub fragment: String,
    pub route: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCatalog {
    rules: Vec<ResourceRule>,
}

impl ResourceCatalog {
    pub fn new(rules: Vec<ResourceRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ResourceRule] {
        &self.rules
    }

    /// Resource whose keyword appears in the (lower-cased) text.
    ///
    /// Returns the API path and the keyword that matched.
    pub fn resolve<'a>(&'a self, text: &str) -> Option<(&'a str, &'a str)> {
        self.rules.iter().find_map(|rule| {
            rule.keywords
                .iter()
                .find(|keyword| text.contains(keyword.as_str()))
                .map(|keyword| (rule.path.as_str(), keyword.as_str()))
        })
    }

    pub fn paths(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.path.as_str()).collect()
    }
}

impl Default for ResourceCatalog {
    fn default() -> Self {
        let rule = |path: &str, keywords: &[&str]| ResourceRule {
            path: path.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };
        Self::new(vec![
            rule("/clients", &["client"]),
            rule("/bateaux", &["bateau", "boat"]),
            rule("/moteurs", &["moteur", "engine"]),
            rule("/remorques", &["remorque", "trailer"]),
            rule("/forfaits", &["forfait", "package"]),
            rule("/services", &["service", "prestation"]),
            rule("/ventes", &["vente", "sale"]),
            rule("/techniciens", &["technicien", "technician"]),
            rule("/competences", &["compétence", "competence", "skill"]),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Console route for an API path, by substring match.
    pub fn destination(&self, path: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| path.contains(rule.fragment.as_str()))
            .map(|rule| rule.route.as_str())
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        let rule = |fragment: &str, route: &str| RouteRule {
            fragment: fragment.to_string(),
            route: route.to_string(),
        };
        // catalogue paths contain the client-owned fragments, keep them first
        Self::new(vec![
            rule("/catalogue/bateaux", "/catalogue/bateaux"),
            rule("/catalogue/moteurs", "/catalogue/moteurs"),
            rule("/catalogue/helices", "/catalogue/helices"),
            rule("/catalogue/remorques", "/catalogue/remorques"),
            rule("/catalogue/produits", "/catalogue/produits"),
            rule("/catalogue/fournisseurs", "/catalogue/fournisseurs"),
            rule("/bateaux", "/clients/bateaux"),
            rule("/moteurs", "/clients/moteurs"),
            rule("/remorques", "/clients/remorques"),
            rule("/clients", "/clients"),
            rule("/forfaits", "/forfaits"),
            rule("/services", "/prestations"),
            rule("/techniciens", "/prestations"),
            rule("/competences", "/prestations"),
            rule("/ventes", "/transactions"),
            rule("/transactions", "/transactions"),
            rule("/societe", "/societe"),
            rule("/users", "/utilisateurs"),
        ])
    }
}

// ==========================================
// Realty Ledger - Entity Resolver
// ==========================================
// Fuzzy name resolution against the development/broker/client
// registries. Normalization: lowercase, fold diacritics, drop the
// Portuguese linking words (de/da/do/dos/das), drop everything
// non-alphanumeric. Exact normalized equality always beats
// containment; containment ties resolve to the first registry
// entry and surface an ambiguity warning.
// ==========================================

use crate::domain::{Broker, Client, Development};

/// Outcome of one lookup. `ambiguous` is set when more than one
/// entry matched by containment and none matched exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    pub entity: Option<T>,
    pub ambiguous: bool,
}

impl<T> Resolution<T> {
    fn miss() -> Self {
        Self {
            entity: None,
            ambiguous: false,
        }
    }
}

/// Normalize a name for matching.
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .chars()
        .map(fold_diacritic)
        .collect();

    folded
        .split_whitespace()
        .filter(|word| !matches!(*word, "de" | "da" | "do" | "dos" | "das"))
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Fold the accented characters that actually occur in Brazilian
/// names; anything else passes through untouched.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

/// Two names match when their normalized forms are equal or one
/// contains the other.
pub fn names_match(a: &str, b: &str) -> bool {
    let na = normalize_name(a);
    let nb = normalize_name(b);
    if na.is_empty() || nb.is_empty() {
        return false;
    }
    na == nb || na.contains(&nb) || nb.contains(&na)
}

// ==========================================
// EntityResolver
// ==========================================
// Holds the registries in memory for the lifetime of one batch;
// loaded from the ledger store before the first row runs.
pub struct EntityResolver {
    developments: Vec<Development>,
    brokers: Vec<Broker>,
    clients: Vec<Client>,
}

impl EntityResolver {
    pub fn new(
        developments: Vec<Development>,
        brokers: Vec<Broker>,
        clients: Vec<Client>,
    ) -> Self {
        Self {
            developments,
            brokers,
            clients,
        }
    }

    pub fn resolve_development(&self, name: &str) -> Resolution<Development> {
        resolve(name, &self.developments, |d| &d.name)
    }

    pub fn resolve_broker(&self, name: &str) -> Resolution<Broker> {
        resolve(name, &self.brokers, |b| &b.name)
    }

    /// Client resolution is optional: a miss is a row warning for
    /// the caller, never an error.
    pub fn resolve_client(&self, name: &str) -> Resolution<Client> {
        resolve(name, &self.clients, |c| &c.full_name)
    }
}

fn resolve<T: Clone>(name: &str, registry: &[T], key: impl Fn(&T) -> &str) -> Resolution<T> {
    let target = normalize_name(name);
    if target.is_empty() {
        return Resolution::miss();
    }

    let mut first_contains: Option<&T> = None;
    let mut contains_hits = 0usize;

    for entry in registry {
        let candidate = normalize_name(key(entry));
        if candidate.is_empty() {
            continue;
        }
        if candidate == target {
            // Exact normalized match wins outright.
            return Resolution {
                entity: Some(entry.clone()),
                ambiguous: false,
            };
        }
        if candidate.contains(&target) || target.contains(&candidate) {
            contains_hits += 1;
            if first_contains.is_none() {
                first_contains = Some(entry);
            }
        }
    }

    Resolution {
        entity: first_contains.cloned(),
        ambiguous: contains_hits > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BrokerCategory;

    fn dev(id: &str, name: &str) -> Development {
        Development {
            id: id.to_string(),
            name: name.to_string(),
            roles: vec![],
        }
    }

    fn broker(id: &str, name: &str) -> Broker {
        Broker {
            id: id.to_string(),
            name: name.to_string(),
            category: BrokerCategory::External,
            personal_commission_pct: None,
            development_id: None,
            role_name: None,
        }
    }

    #[test]
    fn test_normalize_strips_articles_and_accents() {
        assert_eq!(normalize_name("Residencial das Águas"), "residencialaguas");
        assert_eq!(normalize_name("João de Souza"), "joaosouza");
        assert_eq!(normalize_name("OCEAN-VIEW!"), "oceanview");
    }

    #[test]
    fn test_containment_matches() {
        assert!(names_match("Ocean View", "Ocean View Residence"));
        assert!(names_match("ocean view residence", "Ocean View"));
        assert!(!names_match("Ocean View", "Harbor Point"));
    }

    #[test]
    fn test_exact_match_beats_substring() {
        let resolver = EntityResolver::new(
            vec![dev("d1", "Ocean View Premium"), dev("d2", "Ocean View")],
            vec![],
            vec![],
        );
        let hit = resolver.resolve_development("ocean view");
        assert_eq!(hit.entity.unwrap().id, "d2");
        assert!(!hit.ambiguous);
    }

    #[test]
    fn test_ambiguous_substring_flags_warning() {
        let resolver = EntityResolver::new(
            vec![],
            vec![broker("b1", "Ana Silva Santos"), broker("b2", "Ana Silva Costa")],
            vec![],
        );
        let hit = resolver.resolve_broker("Ana Silva");
        // First registry entry wins, but the ambiguity is surfaced.
        assert_eq!(hit.entity.unwrap().id, "b1");
        assert!(hit.ambiguous);
    }

    #[test]
    fn test_miss() {
        let resolver = EntityResolver::new(vec![dev("d1", "Ocean View")], vec![], vec![]);
        let hit = resolver.resolve_development("Harbor Point");
        assert!(hit.entity.is_none());
        assert!(!hit.ambiguous);
    }
}

//! Entity and topic extraction.
//!
//! Lexicon-driven extraction of dependencies, API endpoints, configuration
//! values, and people. Entities dedupe by name across patterns: the first
//! matching pattern fixes the kind, later mentions only extend the mention
//! list. All output is in first-mention order.

use crate::types::Message;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

// ============================================
// Entity model
// ============================================

/// Classification of an extracted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Framework,
    BackendFramework,
    Database,
    HttpClient,
    NpmPackage,
    PythonPackage,
    PythonImport,
    ApiEndpoint,
    Port,
    EnvVar,
    Secret,
    Person,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Framework => "framework",
            EntityKind::BackendFramework => "backend_framework",
            EntityKind::Database => "database",
            EntityKind::HttpClient => "http_client",
            EntityKind::NpmPackage => "npm_package",
            EntityKind::PythonPackage => "python_package",
            EntityKind::PythonImport => "python_import",
            EntityKind::ApiEndpoint => "api_endpoint",
            EntityKind::Port => "port",
            EntityKind::EnvVar => "env_var",
            EntityKind::Secret => "secret",
            EntityKind::Person => "person",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named thing mentioned in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    /// Orders of the messages mentioning this entity, in document order
    pub mentions: Vec<u32>,
}

impl Entity {
    pub fn mention_count(&self) -> usize {
        self.mentions.len()
    }
}

/// Record a mention, creating the entity on first sight.
fn record_mention(entities: &mut Vec<Entity>, name: &str, kind: EntityKind, order: u32) {
    match entities.iter_mut().find(|e| e.name == name) {
        Some(entity) => entity.mentions.push(order),
        None => entities.push(Entity {
            name: name.to_string(),
            kind,
            mentions: vec![order],
        }),
    }
}

// ============================================
// Dependencies
// ============================================

static DEPENDENCY_PATTERNS: LazyLock<Vec<(Regex, EntityKind, bool)>> = LazyLock::new(|| {
    // (pattern, kind, split captured text into package names)
    vec![
        (
            Regex::new(r"\b(react|vue|angular|svelte|next\.js|nuxt|gatsby)\b").unwrap(),
            EntityKind::Framework,
            false,
        ),
        (
            Regex::new(r"\b(express|fastapi|flask|django|rails|spring)\b").unwrap(),
            EntityKind::BackendFramework,
            false,
        ),
        (
            Regex::new(r"\b(postgresql|mysql|mongodb|redis|sqlite)\b").unwrap(),
            EntityKind::Database,
            false,
        ),
        (
            Regex::new(r"\b(axios|fetch|requests|urllib)\b").unwrap(),
            EntityKind::HttpClient,
            false,
        ),
        (
            Regex::new(r"npm install\s+([a-z0-9\-\s]+)").unwrap(),
            EntityKind::NpmPackage,
            true,
        ),
        (
            Regex::new(r"pip install\s+([a-z0-9\-_\s]+)").unwrap(),
            EntityKind::PythonPackage,
            true,
        ),
        (
            Regex::new(r"import\s+([a-z0-9_]+)").unwrap(),
            EntityKind::PythonImport,
            false,
        ),
        (
            Regex::new(r"from\s+([a-z0-9_]+)\s+import").unwrap(),
            EntityKind::PythonImport,
            false,
        ),
    ]
});

/// Extract software dependencies (frameworks, databases, installed packages).
pub fn extract_dependencies(messages: &[Message]) -> Vec<Entity> {
    let mut entities = Vec::new();

    for msg in messages {
        let lowered = msg.content.to_lowercase();
        for (pattern, kind, split) in DEPENDENCY_PATTERNS.iter() {
            for caps in pattern.captures_iter(&lowered) {
                let text = caps
                    .get(1)
                    .or_else(|| caps.get(0))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                if *split {
                    for name in text.split_whitespace() {
                        record_mention(&mut entities, name, *kind, msg.order);
                    }
                } else {
                    let name = text.trim();
                    if !name.is_empty() {
                        record_mention(&mut entities, name, *kind, msg.order);
                    }
                }
            }
        }
    }

    entities
}

// ============================================
// APIs
// ============================================

static API_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)(GET|POST|PUT|DELETE|PATCH)\s+(/[a-z0-9/\-_\{\}:]+)").unwrap(),
        Regex::new(r"(?i)https?://[a-z0-9\-\.]+\.[a-z]{2,}(/[a-z0-9/\-_]*)?").unwrap(),
        Regex::new(r"(?i)api\.[a-z0-9\-]+\.[a-z]{2,}").unwrap(),
        Regex::new(r"(?i)/api/v?\d+/[a-z0-9/\-_]+").unwrap(),
    ]
});

/// Extract API endpoints, URLs, and API domains.
pub fn extract_apis(messages: &[Message]) -> Vec<Entity> {
    let mut entities = Vec::new();

    for msg in messages {
        for pattern in API_PATTERNS.iter() {
            for m in pattern.find_iter(&msg.content) {
                record_mention(&mut entities, m.as_str(), EntityKind::ApiEndpoint, msg.order);
            }
        }
    }

    entities
}

// ============================================
// Config values
// ============================================

static CONFIG_PATTERNS: LazyLock<Vec<(Regex, EntityKind)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"PORT\s*=\s*(\d+)").unwrap(), EntityKind::Port),
        (Regex::new(r"port:\s*(\d+)").unwrap(), EntityKind::Port),
        (Regex::new(r"([A-Z_]+)=(\S+)").unwrap(), EntityKind::EnvVar),
        (
            Regex::new(r"API_KEY|SECRET_KEY|DATABASE_URL").unwrap(),
            EntityKind::Secret,
        ),
    ]
});

/// Extract configuration mentions: ports, env-var assignments, secret names.
///
/// The full matched text is the entity name, so `PORT=8080` and `PORT=9090`
/// are distinct entities.
pub fn extract_config_values(messages: &[Message]) -> Vec<Entity> {
    let mut entities = Vec::new();

    for msg in messages {
        for (pattern, kind) in CONFIG_PATTERNS.iter() {
            for m in pattern.find_iter(&msg.content) {
                record_mention(&mut entities, m.as_str(), *kind, msg.order);
            }
        }
    }

    entities
}

// ============================================
// People
// ============================================

static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([a-zA-Z0-9_\-]+)").unwrap());

/// Extract people from `@handle` mentions.
pub fn extract_people(messages: &[Message]) -> Vec<Entity> {
    let mut entities = Vec::new();

    for msg in messages {
        for caps in MENTION_PATTERN.captures_iter(&msg.content) {
            record_mention(&mut entities, &caps[1], EntityKind::Person, msg.order);
        }
    }

    entities
}

// ============================================
// Topics
// ============================================

static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z]{3,}\b").unwrap());

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "were", "be", "been", "being", "have", "has", "had",
        "do", "does", "did", "will", "would", "should", "could", "may", "might", "must", "can",
        "this", "that", "these", "those", "i", "you", "he", "she", "it", "we", "they", "what",
        "which", "who", "when", "where", "why", "how", "all", "each", "every", "both", "few",
        "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so",
        "than", "too", "very", "just",
    ]
    .into_iter()
    .collect()
});

/// Extract the top topics by word frequency.
///
/// Tokenizes to lowercase words of three or more letters, drops stop words,
/// keeps words mentioned at least `min_mentions` times, and returns up to 20
/// ordered by count (ties keep first-seen order).
pub fn extract_topics(messages: &[Message], min_mentions: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for msg in messages {
        let lowered = msg.content.to_lowercase();
        for m in WORD_PATTERN.find_iter(&lowered) {
            let word = m.as_str();
            if STOP_WORDS.contains(word) {
                continue;
            }
            let entry = counts.entry(word.to_string()).or_insert(0);
            if *entry == 0 {
                first_seen.push(word.to_string());
            }
            *entry += 1;
        }
    }

    let mut topics: Vec<String> = first_seen
        .into_iter()
        .filter(|w| counts[w] >= min_mentions)
        .collect();
    topics.sort_by(|a, b| counts[b].cmp(&counts[a]));
    topics.truncate(20);
    topics
}

// ============================================
// Catalog and summary
// ============================================

/// Every entity category extracted from one thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityCatalog {
    pub dependencies: Vec<Entity>,
    pub apis: Vec<Entity>,
    pub configs: Vec<Entity>,
    pub people: Vec<Entity>,
    pub topics: Vec<String>,
}

/// Run every extractor over the messages.
pub fn extract_all_entities(messages: &[Message]) -> EntityCatalog {
    EntityCatalog {
        dependencies: extract_dependencies(messages),
        apis: extract_apis(messages),
        configs: extract_config_values(messages),
        people: extract_people(messages),
        topics: extract_topics(messages, 2),
    }
}

/// Headline numbers for an [`EntityCatalog`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntitySummary {
    pub total_dependencies: usize,
    pub total_apis: usize,
    pub total_configs: usize,
    pub total_people: usize,
    pub total_topics: usize,
    pub most_mentioned_dependency: Option<String>,
    pub most_mentioned_api: Option<String>,
}

/// Summarize an entity catalog. Most-mentioned ties keep first-seen order.
pub fn entity_summary(catalog: &EntityCatalog) -> EntitySummary {
    EntitySummary {
        total_dependencies: catalog.dependencies.len(),
        total_apis: catalog.apis.len(),
        total_configs: catalog.configs.len(),
        total_people: catalog.people.len(),
        total_topics: catalog.topics.len(),
        most_mentioned_dependency: most_mentioned(&catalog.dependencies),
        most_mentioned_api: most_mentioned(&catalog.apis),
    }
}

fn most_mentioned(entities: &[Entity]) -> Option<String> {
    let mut best: Option<&Entity> = None;
    for entity in entities {
        if best.map_or(true, |b| entity.mention_count() > b.mention_count()) {
            best = Some(entity);
        }
    }
    best.map(|e| e.name.clone())
}

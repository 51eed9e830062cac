/// Minimal robots.txt evaluation.
///
/// Group selection: the group naming our agent token (case-insensitive substring of
/// the product token), else `*`. Within a group the longest matching rule wins and
/// `Allow` wins ties. `*` wildcards and a trailing `$` anchor are supported.
use reqwest::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    Allow(String),
    Disallow(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsPolicy {
    rules: Vec<Rule>,
}

impl RobotsPolicy {
    /// A policy that allows everything, used when robots.txt is missing.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn parse(content: &str, agent: &str) -> Self {
        let groups = parse_groups(content);
        let agent = product_token(agent);

        let named = groups.iter().find(|g| {
            g.agents
                .iter()
                .any(|a| a != "*" && !a.is_empty() && agent.contains(a.as_str()))
        });
        let chosen = named.or_else(|| groups.iter().find(|g| g.agents.iter().any(|a| a == "*")));

        Self {
            rules: chosen.map(|g| g.rules.clone()).unwrap_or_default(),
        }
    }

    /// Whether `path` (path plus optional query) may be fetched.
    pub fn is_allowed(&self, path: &str) -> bool {
        let mut best: Option<(usize, bool)> = None;
        for rule in &self.rules {
            let (pattern, allow) = match rule {
                Rule::Allow(p) => (p, true),
                Rule::Disallow(p) => (p, false),
            };
            if !pattern_matches(pattern, path) {
                continue;
            }
            let len = pattern.len();
            best = match best {
                Some((best_len, best_allow))
                    if best_len > len || (best_len == len && best_allow) =>
                {
                    Some((best_len, best_allow))
                }
                _ => Some((len, allow)),
            };
        }
        best.is_none_or(|(_, allow)| allow)
    }

    pub fn is_url_allowed(&self, url: &Url) -> bool {
        let path = match url.query() {
            Some(q) => format!("{}?{q}", url.path()),
            None => url.path().to_string(),
        };
        self.is_allowed(&path)
    }
}

/// The robots.txt location for the origin of `url`.
pub fn robots_url(url: &Url) -> Option<Url> {
    url.join("/robots.txt").ok()
}

/// `"wsg-check/0.1.0 (+https://…)"` → `"wsg-check"`, lower-cased.
fn product_token(agent: &str) -> String {
    agent
        .split(['/', ' '])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn parse_groups(content: &str) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut current = Group::default();
    let mut in_agent_lines = false;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if !in_agent_lines && !current.agents.is_empty() {
                    groups.push(std::mem::take(&mut current));
                }
                current.agents.push(value.to_ascii_lowercase());
                in_agent_lines = true;
            }
            "allow" | "disallow" => {
                in_agent_lines = false;
                if current.agents.is_empty() {
                    continue;
                }
                if value.is_empty() {
                    // empty Disallow allows everything; empty Allow means nothing
                    continue;
                }
                let rule = if key == "allow" {
                    Rule::Allow(value.to_string())
                } else {
                    Rule::Disallow(value.to_string())
                };
                current.rules.push(rule);
            }
            _ => in_agent_lines = false,
        }
    }
    if !current.agents.is_empty() {
        groups.push(current);
    }
    groups
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(p) => (p, true),
        None => (pattern, false),
    };

    let mut pieces = pattern.split('*');
    let Some(first) = pieces.next() else {
        return true;
    };
    let Some(mut rest) = path.strip_prefix(first) else {
        return false;
    };

    let pieces: Vec<&str> = pieces.collect();
    for (i, piece) in pieces.iter().enumerate() {
        let last = i + 1 == pieces.len();
        if last && anchored {
            return rest.ends_with(piece);
        }
        match rest.find(piece) {
            Some(at) => rest = &rest[at + piece.len()..],
            None => return false,
        }
    }
    !anchored || rest.is_empty()
}

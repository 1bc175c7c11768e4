use serde::{Deserialize, Serialize};

use crate::helpers::pluralize;

/// The two-valued domain every cell resolves to. Display text lives in
/// [`RoleLabels`]; the solver only ever sees this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Good,
    Bad,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Good, Role::Bad];

    pub fn complement(&self) -> Role {
        match self {
            Role::Good => Role::Bad,
            Role::Bad => Role::Good,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Role::Good => "good",
            Role::Bad => "bad",
        }
    }

    pub fn short(&self) -> char {
        match self {
            Role::Good => 'G',
            Role::Bad => 'B',
        }
    }
}

/// Display labels for the two roles, e.g. `innocent` / `criminal`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoleLabels {
    pub good: String,
    pub bad: String,
}

impl Default for RoleLabels {
    fn default() -> Self {
        Self {
            good: "innocent".to_string(),
            bad: "criminal".to_string(),
        }
    }
}

impl RoleLabels {
    pub fn new(good: impl Into<String>, bad: impl Into<String>) -> Self {
        Self {
            good: good.into(),
            bad: bad.into(),
        }
    }

    pub fn label(&self, role: Role) -> &str {
        match role {
            Role::Good => &self.good,
            Role::Bad => &self.bad,
        }
    }

    /// Singular label for `count == 1`, plural otherwise.
    pub fn noun(&self, role: Role, count: usize) -> String {
        if count == 1 {
            self.label(role).to_string()
        } else {
            pluralize(self.label(role))
        }
    }

    /// Case-insensitive; also accepts the canonical `good`/`bad` tokens.
    pub fn parse(&self, text: &str) -> Option<Role> {
        let text = text.trim();
        Role::ALL.into_iter().find(|role| {
            text.eq_ignore_ascii_case(self.label(*role)) || text.eq_ignore_ascii_case(role.token())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement() {
        assert_eq!(Role::Good.complement(), Role::Bad);
        assert_eq!(Role::Bad.complement().complement(), Role::Bad);
    }

    #[test]
    fn test_parse_labels() {
        let labels = RoleLabels::new("villager", "werewolf");
        assert_eq!(labels.parse("Villager"), Some(Role::Good));
        assert_eq!(labels.parse("werewolf"), Some(Role::Bad));
        assert_eq!(labels.parse("bad"), Some(Role::Bad));
        assert_eq!(labels.parse("vampire"), None);
    }

    #[test]
    fn test_noun() {
        let labels = RoleLabels::default();
        assert_eq!(labels.noun(Role::Good, 1), "innocent");
        assert_eq!(labels.noun(Role::Bad, 0), "criminals");
        assert_eq!(labels.noun(Role::Bad, 3), "criminals");
    }
}

use serde::{Deserialize, Serialize};

/// A semantic theme label with the text assets both extraction paths need:
/// `description` is what gets embedded for the vector index, `keywords` feed
/// the containment fallback when the embedding service is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeDef {
    pub label: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ThemeDef {
    /// Case-insensitive containment against the keyword list.
    #[must_use]
    pub fn matches_keywords(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(keywords: &[&str]) -> ThemeDef {
        ThemeDef {
            label: "resentment".to_string(),
            description: "unspoken grievances".to_string(),
            keywords: keywords.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let theme = theme(&["never", "Always"]);
        assert!(theme.matches_keywords("You NEVER listen"));
        assert!(theme.matches_keywords("it is always me"));
        assert!(!theme.matches_keywords("we are fine"));
    }

    #[test]
    fn empty_keyword_list_matches_nothing() {
        let theme = theme(&[]);
        assert!(!theme.matches_keywords("never"));
    }
}

use crate::activity::Activity;
use crate::error::{CatalogError, Result};
use crate::theme::ThemeDef;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const CATALOG_SCHEMA_VERSION: u32 = 1;

/// Default catalog shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    schema_version: u32,
    themes: Vec<ThemeDef>,
    activities: Vec<Activity>,
}

/// Immutable set of activity and theme definitions, loaded once at boot.
///
/// Activities keep their document order; that insertion index is the
/// deterministic tie-break key used everywhere downstream.
pub struct Catalog {
    activities: Vec<Activity>,
    themes: Vec<ThemeDef>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(raw)?;
        if document.schema_version != CATALOG_SCHEMA_VERSION {
            return Err(CatalogError::UnsupportedSchemaVersion(
                document.schema_version,
            ));
        }
        Self::from_parts(document.themes, document.activities)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        log::info!("Loading catalog from {:?}", path.as_ref());
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// The embedded default catalog. Infallible by construction; covered by
    /// a test so a broken asset fails CI, not boot.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn from_parts(themes: Vec<ThemeDef>, activities: Vec<Activity>) -> Result<Self> {
        let mut theme_labels = HashMap::new();
        for (idx, theme) in themes.iter().enumerate() {
            if theme_labels.insert(theme.label.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateTheme(theme.label.clone()));
            }
        }

        let mut by_id = HashMap::new();
        for (idx, activity) in activities.iter().enumerate() {
            if by_id.insert(activity.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateActivity(activity.id.clone()));
            }
            if activity.level_required == 0 {
                return Err(CatalogError::InvalidLevel {
                    id: activity.id.clone(),
                    level: activity.level_required,
                });
            }
            let range = activity.duration_minutes;
            if range.min == 0 || range.min > range.max {
                return Err(CatalogError::InvalidDuration {
                    id: activity.id.clone(),
                    min: range.min,
                    max: range.max,
                });
            }
            for theme in &activity.themes {
                if !theme_labels.contains_key(theme) {
                    return Err(CatalogError::UnknownTheme {
                        id: activity.id.clone(),
                        theme: theme.clone(),
                    });
                }
            }
        }

        log::info!(
            "Catalog loaded: {} activities, {} themes",
            activities.len(),
            themes.len()
        );

        Ok(Self {
            activities,
            themes,
            by_id,
        })
    }

    /// Activities in insertion order.
    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    #[must_use]
    pub fn themes(&self) -> &[ThemeDef] {
        &self.themes
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Activity> {
        self.by_id.get(id).map(|&idx| &self.activities[idx])
    }

    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

static REGISTRY: OnceCell<Arc<Catalog>> = OnceCell::new();

/// Install the process-wide catalog. Call once at boot; a second call is an
/// error so nothing can swap the registry under live requests.
pub fn install(catalog: Arc<Catalog>) -> Result<()> {
    REGISTRY
        .set(catalog)
        .map_err(|_| CatalogError::AlreadyInstalled)
}

/// The installed catalog, if any. Shared read-only; no locking needed.
#[must_use]
pub fn global() -> Option<Arc<Catalog>> {
    REGISTRY.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::DurationRange;
    use pretty_assertions::assert_eq;

    fn theme(label: &str) -> ThemeDef {
        ThemeDef {
            label: label.to_string(),
            description: format!("about {label}"),
            keywords: vec![],
        }
    }

    fn activity(id: &str, themes: &[&str], level: u32) -> Activity {
        Activity {
            id: id.to_string(),
            title: id.to_string(),
            description: format!("{id} description"),
            themes: themes.iter().map(ToString::to_string).collect(),
            tags: vec![],
            duration_minutes: DurationRange { min: 5, max: 10 },
            level_required: level,
            contraindications: vec![],
            debrief_questions: vec![],
        }
    }

    #[test]
    fn builtin_catalog_loads_and_validates() {
        let catalog = Catalog::builtin().expect("builtin catalog");
        assert!(catalog.len() >= 10);
        assert!(catalog.themes().len() >= 8);
        // Every activity id resolves back to its insertion index.
        for (idx, activity) in catalog.activities().iter().enumerate() {
            assert_eq!(catalog.index_of(&activity.id), Some(idx));
        }
    }

    #[test]
    fn duplicate_activity_ids_are_rejected() {
        let result = Catalog::from_parts(
            vec![theme("trust")],
            vec![activity("a", &["trust"], 1), activity("a", &["trust"], 1)],
        );
        assert!(matches!(result, Err(CatalogError::DuplicateActivity(id)) if id == "a"));
    }

    #[test]
    fn unknown_theme_reference_is_rejected() {
        let result = Catalog::from_parts(vec![theme("trust")], vec![activity("a", &["x"], 1)]);
        assert!(matches!(result, Err(CatalogError::UnknownTheme { .. })));
    }

    #[test]
    fn zero_level_is_rejected() {
        let result = Catalog::from_parts(vec![theme("trust")], vec![activity("a", &["trust"], 0)]);
        assert!(matches!(result, Err(CatalogError::InvalidLevel { .. })));
    }

    #[test]
    fn inverted_duration_is_rejected() {
        let mut bad = activity("a", &["trust"], 1);
        bad.duration_minutes = DurationRange { min: 30, max: 10 };
        let result = Catalog::from_parts(vec![theme("trust")], vec![bad]);
        assert!(matches!(result, Err(CatalogError::InvalidDuration { .. })));
    }

    #[test]
    fn catalog_loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, BUILTIN_CATALOG).expect("write catalog");

        let catalog = Catalog::from_file(&path).expect("load from file");
        assert_eq!(catalog.len(), Catalog::builtin().unwrap().len());
    }

    #[test]
    fn install_is_one_shot() {
        let catalog = Arc::new(Catalog::builtin().expect("builtin catalog"));
        install(catalog.clone()).expect("first install");
        assert!(global().is_some());
        assert!(matches!(
            install(catalog),
            Err(CatalogError::AlreadyInstalled)
        ));
    }

    #[test]
    fn wrong_schema_version_is_rejected() {
        let raw = r#"{"schema_version": 2, "themes": [], "activities": []}"#;
        assert!(matches!(
            Catalog::from_json_str(raw),
            Err(CatalogError::UnsupportedSchemaVersion(2))
        ));
    }
}

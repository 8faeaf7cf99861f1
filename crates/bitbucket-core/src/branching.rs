//! Effective branching model resolution.
//!
//! Bitbucket stores branching-model settings at project scope (defaults) and
//! at repository scope (overrides). The effective model overlays the
//! repository settings onto the project settings field by field.

use serde_json::{Map, Value};

/// Overlay repository-level settings onto project-level defaults.
///
/// - objects merge recursively, key by key
/// - a key missing from `repository`, or set to `null`, keeps the project value
/// - any other repository value (string, bool, number, array) replaces the
///   project value as a whole; `branch_types` is therefore taken from the
///   repository whenever it is present there
pub fn resolve_effective(project: &Value, repository: &Value) -> Value {
    match (project, repository) {
        (Value::Object(base), Value::Object(overrides)) => {
            Value::Object(merge_objects(base, overrides))
        }
        (base, Value::Null) => base.clone(),
        (_, overrides) => overrides.clone(),
    }
}

fn merge_objects(base: &Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overrides {
        if value.is_null() {
            continue;
        }
        let resolved = match merged.get(key) {
            Some(existing) => resolve_effective(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), resolved);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project() -> Value {
        json!({
            "development": {"name": "develop", "use_mainbranch": false},
            "production": {"name": "main", "use_mainbranch": true, "enabled": true},
            "branch_types": [
                {"kind": "feature", "prefix": "feature/", "enabled": true},
                {"kind": "bugfix", "prefix": "bugfix/", "enabled": true}
            ]
        })
    }

    #[test]
    fn test_repository_fields_take_precedence() {
        let repo = json!({
            "development": {"name": "dev"},
            "branch_types": [{"kind": "hotfix", "prefix": "hf/", "enabled": true}]
        });

        let effective = resolve_effective(&project(), &repo);

        assert_eq!(effective["development"]["name"], "dev");
        assert_eq!(effective["development"]["use_mainbranch"], false);
        assert_eq!(effective["production"]["name"], "main");
        assert_eq!(effective["branch_types"].as_array().unwrap().len(), 1);
        assert_eq!(effective["branch_types"][0]["kind"], "hotfix");
    }

    #[test]
    fn test_absent_or_null_fields_fall_through() {
        let repo = json!({
            "development": null,
            "production": {"name": null, "enabled": false}
        });

        let effective = resolve_effective(&project(), &repo);

        assert_eq!(effective["development"], project()["development"]);
        assert_eq!(effective["production"]["name"], "main");
        assert_eq!(effective["production"]["enabled"], false);
        assert_eq!(effective["branch_types"], project()["branch_types"]);
    }

    #[test]
    fn test_empty_overrides_yield_project() {
        assert_eq!(resolve_effective(&project(), &json!({})), project());
        assert_eq!(resolve_effective(&project(), &Value::Null), project());
    }

    #[test]
    fn test_repository_only_fields_are_kept() {
        let effective = resolve_effective(&json!({}), &json!({"is_valid": true}));
        assert_eq!(effective, json!({"is_valid": true}));
    }

    #[test]
    fn test_every_present_repository_field_wins() {
        // For each top-level subset of repository fields, every field present
        // in the overrides shows up verbatim and every other field is the
        // project value.
        let candidates = [
            ("development", json!({"name": "dev", "use_mainbranch": true})),
            ("production", json!({"name": "release", "use_mainbranch": false, "enabled": true})),
            ("branch_types", json!([])),
        ];

        for mask in 0..(1u8 << candidates.len()) {
            let mut repo = Map::new();
            for (i, (key, value)) in candidates.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    repo.insert(key.to_string(), value.clone());
                }
            }
            let effective = resolve_effective(&project(), &Value::Object(repo.clone()));

            for (key, _) in &candidates {
                match repo.get(*key) {
                    Some(value) => assert_eq!(&effective[*key], value, "mask {mask} key {key}"),
                    None => assert_eq!(effective[*key], project()[*key], "mask {mask} key {key}"),
                }
            }
        }
    }
}

//! Table naming
//!
//! Tables are named after their model. The default resolver kebab-cases the
//! model name, so `DatedModel` lives in `dated-model`.

use super::core_trait::Model;

/// Maps a model to the table its records live in
pub trait TableNameResolver: Send + Sync {
    fn table_name(&self, model: &dyn Model) -> String;
}

impl<F> TableNameResolver for F
where
    F: Fn(&dyn Model) -> String + Send + Sync,
{
    fn table_name(&self, model: &dyn Model) -> String {
        self(model)
    }
}

/// Default resolver: kebab-cased model name
#[derive(Debug, Clone, Copy, Default)]
pub struct KebabCaseTableNames;

impl TableNameResolver for KebabCaseTableNames {
    fn table_name(&self, model: &dyn Model) -> String {
        to_kebab_case(model.name())
    }
}

/// Convert an identifier to kebab-case.
///
/// Words break on lower-to-upper transitions, letter/digit boundaries, the end
/// of an acronym (`HTTPServer` -> `http-server`) and any non-alphanumeric
/// character.
pub fn to_kebab_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len() + 4);
    let mut pending_break = false;

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            pending_break = !result.is_empty();
            continue;
        }

        if i > 0 && !pending_break {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            pending_break = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_alphabetic() && c.is_ascii_digit())
                || (prev.is_ascii_digit() && c.is_alphabetic())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.map_or(false, |n| n.is_lowercase()));
        }

        if pending_break && !result.is_empty() {
            result.push('-');
        }
        pending_break = false;
        result.extend(c.to_lowercase());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::definition::{ModelDefinition, PropertyType};

    #[test]
    fn test_to_kebab_case() {
        assert_eq!(to_kebab_case("DatedModel"), "dated-model");
        assert_eq!(to_kebab_case("TestModel"), "test-model");
        assert_eq!(to_kebab_case("TestModel2"), "test-model-2");
        assert_eq!(to_kebab_case("HTTPServer"), "http-server");
        assert_eq!(to_kebab_case("user_profile"), "user-profile");
        assert_eq!(to_kebab_case("already-kebab"), "already-kebab");
        assert_eq!(to_kebab_case("Simple"), "simple");
    }

    #[test]
    fn test_custom_resolver_closure() {
        let model = ModelDefinition::builder("Widget")
            .primary_key("id", PropertyType::UniqueId)
            .build()
            .unwrap();

        let resolver = |m: &dyn Model| format!("app_{}", m.name().to_lowercase());
        assert_eq!(resolver.table_name(&model), "app_widget");
        assert_eq!(KebabCaseTableNames.table_name(&model), "widget");
    }
}

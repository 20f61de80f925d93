use cyr_schema::SchemaRegistry;

use crate::cli::SchemaArgs;

/// Handle `cyrisk schema [NAME]`.
pub fn handle(args: &SchemaArgs) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new()?;
    print!("{}", render(&registry, args.name.as_deref())?);
    Ok(())
}

fn render(registry: &SchemaRegistry, name: Option<&str>) -> anyhow::Result<String> {
    let Some(name) = name else {
        let mut names = registry.list().join("\n");
        names.push('\n');
        return Ok(names);
    };
    let Some(schema) = registry.get(name) else {
        anyhow::bail!(
            "unknown schema '{name}' (available: {})",
            registry.list().join(", ")
        );
    };
    let mut text = serde_json::to_string_pretty(schema)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_names_without_argument() {
        let registry = SchemaRegistry::new().expect("registry");
        let text = render(&registry, None).expect("render");
        for name in ["risk_analysis", "action_plan", "project_plan"] {
            assert!(text.lines().any(|line| line == name), "missing {name}");
        }
    }

    #[test]
    fn prints_named_schema_as_json() {
        let registry = SchemaRegistry::new().expect("registry");
        let text = render(&registry, Some("action_plan")).expect("render");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
        assert_eq!(Some(&value), registry.get("action_plan"));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let registry = SchemaRegistry::new().expect("registry");
        let error = render(&registry, Some("budget")).expect_err("unknown schema");
        assert!(error.to_string().starts_with("unknown schema 'budget'"));
    }
}

use std::fmt::Display;

use crate::error::{HarnessError, Result};

/// Resolves `%s`, `%d` and `%%` placeholders in a task definition template,
/// consuming `values` left to right.
pub fn resolve(template: &str, values: &[&dyn Display]) -> Result<String> {
    let mut resolved = String::with_capacity(template.len());
    let mut values = values.iter();
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            resolved.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => resolved.push('%'),
            Some(spec @ ('s' | 'd')) => {
                let value = values
                    .next()
                    .ok_or_else(|| {
                        HarnessError::Template(format!("missing value for %{} in '{}'", spec, template))
                    })?
                    .to_string();
                if spec == 'd' && value.parse::<i64>().is_err() {
                    return Err(HarnessError::Template(format!(
                        "%d expects an integer, got '{}'",
                        value
                    )));
                }
                resolved.push_str(&value);
            }
            Some(other) => {
                return Err(HarnessError::Template(format!(
                    "unsupported placeholder %{} in '{}'",
                    other, template
                )))
            }
            None => {
                return Err(HarnessError::Template(format!(
                    "dangling % at end of '{}'",
                    template
                )))
            }
        }
    }
    Ok(resolved)
}

use std::collections::HashMap;

use super::ShaderError;

const DELIM: &str = "%%";

/// Expands `%%KEY%%` placeholders and `%%include name%%` directives.
///
/// Directive text is trimmed; the first word selects the action. Includes are
/// expanded recursively from sources registered with [`ShaderProcessor::source`].
#[derive(Debug, Clone, Default)]
pub struct ShaderProcessor {
    globals: HashMap<String, String>,
    sources: HashMap<String, String>,
}

impl ShaderProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a placeholder value.
    pub fn global(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.globals.insert(key.into(), value.to_string());
        self
    }

    /// Registers an includable source.
    pub fn source(mut self, name: impl Into<String>, src: impl Into<String>) -> Self {
        self.sources.insert(name.into(), src.into());
        self
    }

    /// Expands `src`. `unit` names it in error messages and include chains.
    pub fn process(&self, unit: &str, src: &str) -> Result<String, ShaderError> {
        let mut out = String::with_capacity(src.len());
        let mut chain = vec![unit.to_owned()];
        self.expand(src, &mut chain, &mut out)?;
        Ok(out)
    }

    fn expand(&self, src: &str, chain: &mut Vec<String>, out: &mut String) -> Result<(), ShaderError> {
        let unit = chain.last().cloned().unwrap_or_default();
        let mut rest = src;

        while let Some(open) = rest.find(DELIM) {
            out.push_str(&rest[..open]);
            let body = &rest[open + DELIM.len()..];
            let close = body
                .find(DELIM)
                .ok_or_else(|| ShaderError::Unterminated { unit: unit.clone() })?;

            let mut words = body[..close].split_whitespace();
            match words.next() {
                None => return Err(ShaderError::EmptyDirective { unit: unit.clone() }),
                Some("include") => {
                    let name = words
                        .next()
                        .ok_or_else(|| ShaderError::MissingIncludeName { unit: unit.clone() })?;
                    self.include(name, chain, out)?;
                }
                Some(key) => {
                    let value = self.globals.get(key).ok_or_else(|| ShaderError::UnknownGlobal {
                        key: key.to_owned(),
                        unit: unit.clone(),
                    })?;
                    out.push_str(value);
                }
            }

            rest = &body[close + DELIM.len()..];
        }

        out.push_str(rest);
        Ok(())
    }

    fn include(&self, name: &str, chain: &mut Vec<String>, out: &mut String) -> Result<(), ShaderError> {
        if chain.iter().any(|c| c == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_owned());
            return Err(ShaderError::CircularInclude { chain: cycle });
        }
        let src = self.sources.get(name).ok_or_else(|| ShaderError::UnknownInclude {
            name: name.to_owned(),
            unit: chain.last().cloned().unwrap_or_default(),
        })?;

        chain.push(name.to_owned());
        self.expand(src, chain, out)?;
        chain.pop();
        Ok(())
    }
}

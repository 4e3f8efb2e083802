use crate::browser::driver::KeyEventKind;
use crate::error::Result;
use crate::tools::Interactor;
use serde::{Deserialize, Serialize};

/// Options for the type interaction
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TypeOptions {
    /// Readiness timeout in milliseconds (default: 5000)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl TypeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set readiness timeout
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeOutcome {
    pub selector: String,
    /// Characters sent, one key-down/key-up pair each
    pub chars_typed: usize,
    pub waited_ms: u64,
}

impl Interactor {
    /// Focus the element once ready, then send `text` one key at a time, in order
    pub async fn type_text(&self, selector: &str, text: &str, options: &TypeOptions) -> Result<TypeOutcome> {
        let target = self.resolve(selector).await?;
        let readiness = self.await_ready(selector, options.timeout_ms).await?;

        self.driver.focus(&target.handle).await?;

        let mut chars_typed = 0;
        for c in text.chars() {
            self.driver.dispatch_key_event(KeyEventKind::Down, c).await?;
            self.driver.dispatch_key_event(KeyEventKind::Up, c).await?;
            chars_typed += 1;
        }

        log::debug!("Typed {} characters into '{}'", chars_typed, selector);

        Ok(TypeOutcome { selector: selector.to_string(), chars_typed, waited_ms: readiness.elapsed_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_options() {
        let options: TypeOptions = serde_json::from_value(serde_json::json!({ "timeout_ms": 800 })).unwrap();
        assert_eq!(options.timeout_ms, Some(800));
        assert_eq!(TypeOptions::new().timeout_ms(800), options);
    }
}

//! Parse settings string sent by any client.
//!
//! The analyzer will check for specific keys that may affect its operation,
//! unknown keys are ignored.  The settings structure can then be used by the various modules.

use serde_json;
use crate::DYNERR;
use crate::lang::update_json_bool;
use super::Processor;
use super::handbook::parse_processor;

#[derive(Clone,Debug)]
pub struct Symbols {
    /// attach comments to definitions
    pub comments: bool
}
#[derive(Clone,Debug)]
pub struct Hovers {
    pub symbols: bool,
    pub mnemonics: bool
}
#[derive(Clone,Debug)]
pub struct Completions {
    pub lower_case: bool
}
#[derive(Clone,Debug)]
pub struct Settings {
    pub processor: Processor,
    pub symbols: Symbols,
    pub hovers: Hovers,
    pub completions: Completions
}

impl Settings {
    pub fn new() -> Self {
        Self {
            processor: Processor::Rcasm,
            symbols: Symbols {
                comments: true
            },
            hovers: Hovers {
                symbols: true,
                mnemonics: true
            },
            completions: Completions {
                lower_case: true
            }
        }
    }
}

/// Malformed JSON is an error, values of the wrong type leave the default in place.
pub fn parse(json: &str) -> Result<Settings,DYNERR> {
    let mut ans = Settings::new();
    let root = serde_json::from_str::<serde_json::Value>(json)?;
    if let Some(obj) = root.as_object() {
        for (key,val) in obj {
            match key.as_str() {
                "processor" => {
                    if let Some(p) = val.as_str().and_then(parse_processor) {
                        ans.processor = p;
                    }
                },
                "symbols" => {
                    update_json_bool(val,"comments",&mut ans.symbols.comments);
                },
                "hovers" => {
                    update_json_bool(val,"symbols",&mut ans.hovers.symbols);
                    update_json_bool(val,"mnemonics",&mut ans.hovers.mnemonics);
                },
                "completions" => {
                    update_json_bool(val,"lowerCase",&mut ans.completions.lower_case);
                },
                _ => {}
            }
        }
    }
    Ok(ans)
}

// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::board::Color;
use crate::fog::PromotionPolicy;

/// Search depth the automated player asks its engine for.
pub const DEFAULT_SEARCH_DEPTH: u8 = 3;

/// Settings for a `Session`. Every field is optional in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// The color the human plays; the automated player takes the other.
    pub human: Color,
    pub search_depth: u8,
    pub promotion: PromotionPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            human: Color::White,
            search_depth: DEFAULT_SEARCH_DEPTH,
            promotion: PromotionPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    #[inline]
    pub fn automated(&self) -> Color {
        !self.human
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.human, Color::White);
        assert_eq!(config.automated(), Color::Black);
        assert_eq!(config.search_depth, 3);
        assert_eq!(config.promotion, PromotionPolicy::AlwaysQueen);
    }
    #[test]
    fn test_overrides() {
        let json = r#"{"human": "Black", "search_depth": 2, "promotion": "FollowSuggestion"}"#;
        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.automated(), Color::White);
        assert_eq!(config.search_depth, 2);
        assert_eq!(config.promotion, PromotionPolicy::FollowSuggestion);
        assert_eq!(SessionConfig::from_json(&config.to_json().unwrap()).unwrap(), config);
    }
    #[test]
    fn test_rejects_unknown_color() {
        assert!(SessionConfig::from_json(r#"{"human": "Green"}"#).is_err());
    }
}

//! Card - 呼び出し側に返す構造化サマリ
//!
//! チャットプラットフォームの埋め込み表示に相当するが、
//! 特定プラットフォームの形式には依存しない。

use std::fmt;

use serde::{Deserialize, Serialize};

/// Card の 1 フィールド（名前 + 値）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardField {
    pub name: String,
    pub value: String,
}

/// Card は title / fields / optional image からなる表示単位
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<CardField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Card {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(CardField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn image(mut self, url: Option<String>) -> Self {
        self.image_url = url;
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        for field in &self.fields {
            writeln!(f, "{}: {}", field.name, field.value)?;
        }
        if let Some(url) = &self.image_url {
            writeln!(f, "[image] {url}")?;
        }
        if let Some(footer) = &self.footer {
            writeln!(f, "-- {footer}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_rendering_lists_fields_in_order() {
        let card = Card::new("Dune")
            .description("Spice.")
            .field("Runtime", "155 min")
            .field("Release Year", "2021")
            .footer("Votes: 0");
        let text = card.to_string();
        let runtime = text.find("Runtime").unwrap();
        let year = text.find("Release Year").unwrap();
        assert!(runtime < year);
        assert!(text.starts_with("== Dune =="));
        assert!(text.contains("-- Votes: 0"));
        assert!(!text.contains("[image]"));
    }
}

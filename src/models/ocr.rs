// src/models/ocr.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrPayload {
    #[serde(default, rename = "imageBase64")]
    pub image_base64: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct OcrResult {
    pub text: String,
}

/// One block of detected text as reported by the OCR provider.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TextBlock {
    #[serde(rename = "BlockType")]
    pub block_type: String,
    #[serde(rename = "Text", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl TextBlock {
    pub fn line(text: &str) -> Self {
        Self {
            block_type: "LINE".to_string(),
            text: Some(text.to_string()),
        }
    }

    pub fn is_line(&self) -> bool {
        self.block_type == "LINE"
    }
}

/// Joins the text of every LINE block in provider order, one per line.
pub fn assemble_text(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .filter(|block| block.is_line())
        .map(|block| block.text.as_deref().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> TextBlock {
        TextBlock {
            block_type: "WORD".to_string(),
            text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_only_line_blocks_are_kept() {
        let blocks = vec![TextBlock::line("A"), word("x"), TextBlock::line("B")];
        assert_eq!(assemble_text(&blocks), "A\nB");
    }

    #[test]
    fn test_result_is_trimmed() {
        let blocks = vec![TextBlock::line("  first"), TextBlock::line("last  ")];
        assert_eq!(assemble_text(&blocks), "first\nlast");
    }

    #[test]
    fn test_no_blocks_gives_empty_text() {
        let page = TextBlock {
            block_type: "PAGE".to_string(),
            text: None,
        };
        assert_eq!(assemble_text(&[]), "");
        assert_eq!(assemble_text(&[page]), "");
    }
}

use serde::{Deserialize, Serialize};

/// Category of a one-shot flash notice, used as a CSS class by the templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Danger,
    #[default]
    Info,
}

impl FlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Danger => "danger",
            FlashCategory::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "success" => Some(FlashCategory::Success),
            "danger" => Some(FlashCategory::Danger),
            "info" => Some(FlashCategory::Info),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_category_parse() {
        for category in [FlashCategory::Success, FlashCategory::Danger, FlashCategory::Info] {
            assert_eq!(FlashCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(FlashCategory::parse("DANGER"), Some(FlashCategory::Danger));
        assert_eq!(FlashCategory::parse("warning"), None);
    }
}

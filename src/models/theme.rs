use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resource;

pub const COLLECTION: &str = "settings";
pub const DOCUMENT_ID: &str = "theme";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    pub primary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub heading_font: String,
    pub body_font: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            primary_color: "#1f2937".to_string(),
            accent_color: "#c2410c".to_string(),
            background_color: "#fffaf5".to_string(),
            text_color: "#111827".to_string(),
            heading_font: "Playfair Display".to_string(),
            body_font: "Inter".to_string(),
            hero_image_url: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    pub primary_color: Option<String>,
    pub accent_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub heading_font: Option<String>,
    pub body_font: Option<String>,
    pub hero_image_url: Option<String>,
}

fn hex_color(field: &str, value: String) -> Result<String, AppError> {
    let value = value.trim().to_lowercase();
    let digits = value.strip_prefix('#').unwrap_or("");
    let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(value)
    } else {
        Err(AppError::validation(format!("{field} must be a hex colour like #aabbcc")))
    }
}

impl ThemeSettings {
    pub fn apply(&mut self, patch: ThemePatch) -> Result<usize, AppError> {
        let mut applied = 0;
        let colors = [
            ("primaryColor", patch.primary_color, &mut self.primary_color),
            ("accentColor", patch.accent_color, &mut self.accent_color),
            ("backgroundColor", patch.background_color, &mut self.background_color),
            ("textColor", patch.text_color, &mut self.text_color),
        ];
        for (field, value, slot) in colors {
            if let Some(value) = value {
                resource::set(slot, hex_color(field, value)?, &mut applied);
            }
        }
        if let Some(font) = patch.heading_font {
            resource::set(&mut self.heading_font, resource::text("headingFont", font)?, &mut applied);
        }
        if let Some(font) = patch.body_font {
            resource::set(&mut self.body_font, resource::text("bodyFont", font)?, &mut applied);
        }
        if let Some(url) = patch.hero_image_url {
            let url = if url.trim().is_empty() {
                None
            } else {
                Some(resource::url("heroImageUrl", url)?)
            };
            resource::set(&mut self.hero_image_url, url, &mut applied);
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("c", "#ABC".to_string()).unwrap(), "#abc");
        assert!(hex_color("c", "#a1b2c3".to_string()).is_ok());
        assert!(hex_color("c", "red".to_string()).is_err());
        assert!(hex_color("c", "#12345".to_string()).is_err());
    }

    #[test]
    fn test_apply_partial() {
        let mut theme = ThemeSettings::default();
        let applied = theme
            .apply(ThemePatch {
                accent_color: Some("#ff0000".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(applied, 1);
        assert_eq!(theme.accent_color, "#ff0000");
        assert_eq!(theme.primary_color, ThemeSettings::default().primary_color);
    }

    #[test]
    fn test_clear_hero_image() {
        let mut theme = ThemeSettings {
            hero_image_url: Some("https://cdn.example.com/hero.jpg".to_string()),
            ..Default::default()
        };
        theme
            .apply(ThemePatch {
                hero_image_url: Some(String::new()),
                ..Default::default()
            })
            .unwrap();
        assert!(theme.hero_image_url.is_none());
    }
}

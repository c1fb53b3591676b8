use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::codec::hex_to_packed_color;
use crate::error::{Result, SubburnError};
use crate::language::Language;

/// Typefaces shipped with the tool for right-to-left scripts. Selecting one
/// of them adds the bundled fonts directory to the renderer search path.
const RTL_TYPEFACES: &[&str] = &["Amiri"];

/// Characters with meaning inside the subtitles filter expression
const FONT_NAME_RESERVED: &[char] = &['\'', ',', ':', '=', '\\', ';', '[', ']'];

const RTL_FONT_SIZE: u32 = 36;
const STANDARD_FONT_SIZE: u32 = 20;

/// ASS border style accepted by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BorderStyle {
    /// Outline and drop shadow
    Outline = 1,
    /// Opaque box behind the text
    OpaqueBox = 3,
    /// Outline with a box
    OutlineBox = 4,
}

impl TryFrom<u8> for BorderStyle {
    type Error = SubburnError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(BorderStyle::Outline),
            3 => Ok(BorderStyle::OpaqueBox),
            4 => Ok(BorderStyle::OutlineBox),
            other => Err(SubburnError::Style(format!(
                "Invalid border_style {}. Valid values: 1, 3, 4",
                other
            ))),
        }
    }
}

impl From<BorderStyle> for u8 {
    fn from(style: BorderStyle) -> Self {
        style as u8
    }
}

/// `#RRGGBB` web color, validated on construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn new(value: &str) -> Result<Self> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SubburnError::Style(format!(
                "Invalid color '{}'. Expected #RRGGBB",
                value
            )));
        }
        Ok(Self(format!("#{}", digits)))
    }

    /// Packed `&HBBGGRR&` form
    pub fn packed(&self) -> String {
        hex_to_packed_color(&self.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = SubburnError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User-chosen subtitle rendering parameters.
///
/// Persisted as a flat JSON document. Unknown keys are ignored and missing
/// keys take the values of [`StyleConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub font_name: String,
    pub font_size: u32,
    pub primary_color: HexColor,
    pub outline_color: HexColor,
    pub back_color: HexColor,
    pub outline_width: u32,
    pub shadow: u32,
    pub border_style: BorderStyle,
    /// Translation target requested alongside the style, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<Language>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: STANDARD_FONT_SIZE,
            primary_color: HexColor("#FFFFFF".to_string()),
            outline_color: HexColor("#000000".to_string()),
            back_color: HexColor("#000000".to_string()),
            outline_width: 2,
            shadow: 1,
            border_style: BorderStyle::OpaqueBox,
            target_language: None,
        }
    }
}

impl StyleConfig {
    /// Defaults for right-to-left subtitles: the bundled typeface, larger
    /// text and a plain outline instead of a box.
    pub fn rtl_default() -> Self {
        Self {
            font_name: RTL_TYPEFACES[0].to_string(),
            font_size: RTL_FONT_SIZE,
            outline_width: 1,
            shadow: 1,
            border_style: BorderStyle::Outline,
            ..Self::default()
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SubburnError::Style(format!(
                "Failed to read style file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let style: Self = serde_json::from_str(content)
            .map_err(|e| SubburnError::Style(format!("Failed to parse style file: {}", e)))?;
        style.validate()?;
        Ok(style)
    }

    /// The font name is spliced into `force_style='...'`, so it must not
    /// carry the quoting or separator characters of the filter syntax.
    pub fn validate(&self) -> Result<()> {
        let name = self.font_name.trim();
        if name.is_empty() {
            return Err(SubburnError::Style("font_name must not be empty".to_string()));
        }
        if let Some(bad) = name.chars().find(|c| FONT_NAME_RESERVED.contains(c)) {
            return Err(SubburnError::Style(format!(
                "Invalid font_name '{}': '{}' is not allowed",
                self.font_name, bad
            )));
        }
        Ok(())
    }

    pub fn uses_rtl_typeface(&self) -> bool {
        RTL_TYPEFACES
            .iter()
            .any(|face| face.eq_ignore_ascii_case(self.font_name.trim()))
    }

    fn force_style(&self) -> String {
        format!(
            "FontName={},FontSize={},PrimaryColour={},OutlineColour={},BackColour={},Outline={},Shadow={},BorderStyle={}",
            self.font_name,
            self.font_size,
            self.primary_color.packed(),
            self.outline_color.packed(),
            self.back_color.packed(),
            self.outline_width,
            self.shadow,
            u8::from(self.border_style),
        )
    }
}

/// Turns a style configuration, or the language defaults, into the
/// parameter list appended to the `subtitles` filter.
#[derive(Debug, Clone)]
pub struct StyleResolver {
    fonts_dir: String,
}

impl StyleResolver {
    /// `fonts_dir` is relative to the burn-in working directory.
    pub fn new<S: Into<String>>(fonts_dir: S) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
        }
    }

    /// Resolve the filter parameters for one burn-in.
    ///
    /// An explicit style wins over language defaults. Without one, RTL
    /// languages get [`StyleConfig::rtl_default`] and everything else,
    /// including an unknown language, gets [`StyleConfig::default`].
    pub fn resolve(&self, style: Option<&StyleConfig>, language: Option<&str>) -> String {
        let defaulted;
        let style = match style {
            Some(style) => style,
            None => {
                let rtl = language
                    .and_then(|code| Language::from_code(code).ok())
                    .is_some_and(Language::is_rtl);
                defaulted = if rtl {
                    StyleConfig::rtl_default()
                } else {
                    StyleConfig::default()
                };
                &defaulted
            }
        };

        let mut params = vec!["charenc=UTF-8".to_string()];
        if style.uses_rtl_typeface() {
            params.push(format!("fontsdir='{}'", self.fonts_dir));
        }
        params.push(format!("force_style='{}'", style.force_style()));

        let expression = params.join(":");
        debug!("Resolved subtitle style: {}", expression);
        expression
    }
}

//! Configuration types for word-cloud generation.
//!
//! Every visual knob of a run lives in [`CloudConfig`], built via its
//! [`CloudConfigBuilder`]. One value is constructed per run and passed down
//! the pipeline; no stage reads ambient state.
//!
//! The builder setters clamp to the documented ranges (the same ranges the
//! CLI enforces through its value parsers) and [`CloudConfigBuilder::build`]
//! validates everything that cannot be clamped.

use crate::error::WordCloudError;
use crate::pipeline::tokenize::TokenizerOptions;
use crate::progress::ProgressCallback;
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// Inclusive bounds for [`CloudConfig::max_words`].
pub const MAX_WORDS_RANGE: (usize, usize) = (50, 300);
/// Inclusive bounds for [`CloudConfig::width`].
pub const WIDTH_RANGE: (u32, u32) = (400, 1200);
/// Inclusive bounds for [`CloudConfig::height`].
pub const HEIGHT_RANGE: (u32, u32) = (300, 800);
/// Upper bound for [`CloudConfig::top_n`].
pub const MAX_TOP_N: usize = 10;

/// Configuration for a single word-cloud run.
///
/// Built via [`CloudConfig::builder()`] or using [`CloudConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_wordcloud::{CloudConfig, Colormap, Shape};
///
/// let config = CloudConfig::builder()
///     .background("#000000".parse().unwrap())
///     .max_words(100)
///     .size(1000, 600)
///     .colormap(Colormap::Plasma)
///     .shape(Shape::Circle)
///     .build()
///     .unwrap();
/// assert_eq!(config.width, 1000);
/// ```
#[derive(Clone)]
pub struct CloudConfig {
    /// Canvas background colour. Default: `#ffffff`.
    pub background: HexColor,

    /// Maximum number of distinct words drawn. Range: 50–300. Default: 200.
    pub max_words: usize,

    /// Output width in pixels. Range: 400–1200. Default: 800.
    pub width: u32,

    /// Output height in pixels. Range: 300–800. Default: 400.
    pub height: u32,

    /// Palette words are coloured from. Default: [`Colormap::Viridis`].
    pub colormap: Colormap,

    /// Font used for every word. Default: the bundled font.
    pub font: FontChoice,

    /// Directory that [`FontChoice::File`] names are resolved against. Default: `fonts`.
    pub font_dir: PathBuf,

    /// Built-in mask shape. Ignored when `custom_mask` is set. Default: none.
    pub shape: Shape,

    /// Uploaded PNG mask. Takes precedence over `shape`.
    pub custom_mask: Option<Vec<u8>>,

    /// Directory holding the built-in shape images. Default: `masks`.
    pub mask_dir: PathBuf,

    /// Seed for placement and colour sampling. Default: 42.
    ///
    /// Identical text + identical config + identical seed produce a
    /// byte-identical image.
    pub seed: u64,

    /// Gap in pixels kept around every word. At most the shorter canvas side. Default: 2.
    pub margin: u32,

    /// Probability that a word is tried horizontally first. Range 0–1. Default: 0.9.
    pub prefer_horizontal: f64,

    /// Smallest font size the layout may shrink a word to. Default: 4.
    pub min_font_size: u32,

    /// Largest font size. `None` derives it from the two most frequent words.
    pub max_font_size: Option<u32>,

    /// Font-size decrement when a word does not fit. Default: 1.
    pub font_step: u32,

    /// How strongly frequency drives font size. 0 ranks only, 1 is linear. Default: 0.5.
    pub relative_scaling: f64,

    /// Tokenization rule shared by layout and reporting.
    pub tokenizer: TokenizerOptions,

    /// Rows kept in the frequency report. Range 1–10. Default: 10.
    pub top_n: usize,

    /// Optional observer for stage and per-word events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            background: HexColor::WHITE,
            max_words: 200,
            width: 800,
            height: 400,
            colormap: Colormap::default(),
            font: FontChoice::default(),
            font_dir: PathBuf::from("fonts"),
            shape: Shape::default(),
            custom_mask: None,
            mask_dir: PathBuf::from("masks"),
            seed: 42,
            margin: 2,
            prefer_horizontal: 0.9,
            min_font_size: 4,
            max_font_size: None,
            font_step: 1,
            relative_scaling: 0.5,
            tokenizer: TokenizerOptions::default(),
            top_n: 10,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudConfig")
            .field("background", &self.background)
            .field("max_words", &self.max_words)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("colormap", &self.colormap)
            .field("font", &self.font)
            .field("font_dir", &self.font_dir)
            .field("shape", &self.shape)
            .field(
                "custom_mask",
                &self.custom_mask.as_ref().map(|b| format!("<{} bytes>", b.len())),
            )
            .field("mask_dir", &self.mask_dir)
            .field("seed", &self.seed)
            .field("margin", &self.margin)
            .field("prefer_horizontal", &self.prefer_horizontal)
            .field("min_font_size", &self.min_font_size)
            .field("max_font_size", &self.max_font_size)
            .field("font_step", &self.font_step)
            .field("relative_scaling", &self.relative_scaling)
            .field("tokenizer", &self.tokenizer)
            .field("top_n", &self.top_n)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn GenerationProgressCallback>"),
            )
            .finish()
    }
}

impl CloudConfig {
    /// Create a new builder for `CloudConfig`.
    pub fn builder() -> CloudConfigBuilder {
        CloudConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check every field against its documented range.
    ///
    /// Called at the start of every run so a hand-assembled config cannot
    /// slip past the builder's checks.
    pub fn validate(&self) -> Result<(), WordCloudError> {
        let (lo, hi) = MAX_WORDS_RANGE;
        if !(lo..=hi).contains(&self.max_words) {
            return Err(WordCloudError::InvalidConfig(format!(
                "max_words must be {lo}–{hi}, got {}",
                self.max_words
            )));
        }
        let (lo, hi) = WIDTH_RANGE;
        if !(lo..=hi).contains(&self.width) {
            return Err(WordCloudError::InvalidConfig(format!(
                "width must be {lo}–{hi}, got {}",
                self.width
            )));
        }
        let (lo, hi) = HEIGHT_RANGE;
        if !(lo..=hi).contains(&self.height) {
            return Err(WordCloudError::InvalidConfig(format!(
                "height must be {lo}–{hi}, got {}",
                self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.prefer_horizontal) {
            return Err(WordCloudError::InvalidConfig(format!(
                "prefer_horizontal must be 0–1, got {}",
                self.prefer_horizontal
            )));
        }
        if !(0.0..=1.0).contains(&self.relative_scaling) {
            return Err(WordCloudError::InvalidConfig(format!(
                "relative_scaling must be 0–1, got {}",
                self.relative_scaling
            )));
        }
        if self.min_font_size == 0 {
            return Err(WordCloudError::InvalidConfig(
                "min_font_size must be ≥ 1".into(),
            ));
        }
        if self.font_step == 0 {
            return Err(WordCloudError::InvalidConfig("font_step must be ≥ 1".into()));
        }
        if let Some(max) = self.max_font_size {
            if max < self.min_font_size {
                return Err(WordCloudError::InvalidConfig(format!(
                    "max_font_size ({max}) is smaller than min_font_size ({})",
                    self.min_font_size
                )));
            }
        }
        if self.margin > self.width.min(self.height) {
            return Err(WordCloudError::InvalidConfig(format!(
                "margin ({}) is larger than the canvas ({}×{})",
                self.margin, self.width, self.height
            )));
        }
        if !(1..=MAX_TOP_N).contains(&self.top_n) {
            return Err(WordCloudError::InvalidConfig(format!(
                "top_n must be 1–{MAX_TOP_N}, got {}",
                self.top_n
            )));
        }
        Ok(())
    }
}

/// Builder for [`CloudConfig`].
#[derive(Debug)]
pub struct CloudConfigBuilder {
    config: CloudConfig,
}

impl CloudConfigBuilder {
    pub fn background(mut self, color: HexColor) -> Self {
        self.config.background = color;
        self
    }

    pub fn max_words(mut self, n: usize) -> Self {
        self.config.max_words = n.clamp(MAX_WORDS_RANGE.0, MAX_WORDS_RANGE.1);
        self
    }

    pub fn width(mut self, px: u32) -> Self {
        self.config.width = px.clamp(WIDTH_RANGE.0, WIDTH_RANGE.1);
        self
    }

    pub fn height(mut self, px: u32) -> Self {
        self.config.height = px.clamp(HEIGHT_RANGE.0, HEIGHT_RANGE.1);
        self
    }

    /// Set width and height together.
    pub fn size(self, width: u32, height: u32) -> Self {
        self.width(width).height(height)
    }

    pub fn colormap(mut self, colormap: Colormap) -> Self {
        self.config.colormap = colormap;
        self
    }

    pub fn font(mut self, font: FontChoice) -> Self {
        self.config.font = font;
        self
    }

    pub fn font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.font_dir = dir.into();
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.config.shape = shape;
        self
    }

    pub fn custom_mask(mut self, png_bytes: Vec<u8>) -> Self {
        self.config.custom_mask = Some(png_bytes);
        self
    }

    pub fn mask_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.mask_dir = dir.into();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn margin(mut self, px: u32) -> Self {
        self.config.margin = px;
        self
    }

    pub fn prefer_horizontal(mut self, p: f64) -> Self {
        self.config.prefer_horizontal = p.clamp(0.0, 1.0);
        self
    }

    pub fn min_font_size(mut self, px: u32) -> Self {
        self.config.min_font_size = px.max(1);
        self
    }

    pub fn max_font_size(mut self, px: u32) -> Self {
        self.config.max_font_size = Some(px);
        self
    }

    pub fn font_step(mut self, px: u32) -> Self {
        self.config.font_step = px.max(1);
        self
    }

    pub fn relative_scaling(mut self, rs: f64) -> Self {
        self.config.relative_scaling = rs.clamp(0.0, 1.0);
        self
    }

    pub fn tokenizer(mut self, options: TokenizerOptions) -> Self {
        self.config.tokenizer = options;
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.config.top_n = n.clamp(1, MAX_TOP_N);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CloudConfig, WordCloudError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Value types ──────────────────────────────────────────────────────────

/// An RGB colour written as a hex string (`#rrggbb` or `#rgb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    pub const WHITE: HexColor = HexColor([255, 255, 255]);
    pub const BLACK: HexColor = HexColor([0, 0, 0]);

    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb(self.0)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        HexColor::WHITE
    }
}

impl FromStr for HexColor {
    type Err = WordCloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let invalid = || {
            WordCloudError::InvalidConfig(format!(
                "'{s}' is not a hex colour (expected #rrggbb or #rgb)"
            ))
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(HexColor([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ])),
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    out[i] = channel(&format!("{c}{c}"))?;
                }
                Ok(HexColor(out))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl Serialize for HexColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Named colour palettes, using the matplotlib names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
    Cool,
    Hot,
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Colormap {
    /// Every palette in menu order.
    pub const ALL: [Colormap; 11] = [
        Colormap::Viridis,
        Colormap::Plasma,
        Colormap::Inferno,
        Colormap::Magma,
        Colormap::Cividis,
        Colormap::Cool,
        Colormap::Hot,
        Colormap::Spring,
        Colormap::Summer,
        Colormap::Autumn,
        Colormap::Winter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Colormap::Viridis => "viridis",
            Colormap::Plasma => "plasma",
            Colormap::Inferno => "inferno",
            Colormap::Magma => "magma",
            Colormap::Cividis => "cividis",
            Colormap::Cool => "cool",
            Colormap::Hot => "hot",
            Colormap::Spring => "spring",
            Colormap::Summer => "summer",
            Colormap::Autumn => "autumn",
            Colormap::Winter => "winter",
        }
    }
}

impl FromStr for Colormap {
    type Err = WordCloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Colormap::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| WordCloudError::InvalidConfig(format!("unknown colour scheme '{s}'")))
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in mask shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Unconstrained rectangular layout. (default)
    #[default]
    None,
    Circle,
    Heart,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::None, Shape::Circle, Shape::Heart];

    pub fn name(self) -> &'static str {
        match self {
            Shape::None => "none",
            Shape::Circle => "circle",
            Shape::Heart => "heart",
        }
    }

    /// File name of the backing image inside the mask directory.
    pub fn file_name(self) -> Option<String> {
        match self {
            Shape::None => None,
            other => Some(format!("{}.png", other.name())),
        }
    }
}

impl FromStr for Shape {
    type Err = WordCloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Shape::ALL
            .into_iter()
            .find(|shape| shape.name() == wanted)
            .ok_or_else(|| WordCloudError::InvalidConfig(format!("unknown shape '{s}'")))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which font to draw words with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontChoice {
    /// The font bundled with the crate. (default)
    #[default]
    Default,
    /// A `.ttf` file name inside [`CloudConfig::font_dir`].
    File(String),
}

impl FontChoice {
    /// Parse a menu value: `"Default"` (any case) or a file name.
    pub fn from_menu(value: &str) -> Self {
        let v = value.trim();
        if v.is_empty() || v.eq_ignore_ascii_case("default") {
            FontChoice::Default
        } else {
            FontChoice::File(v.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FontChoice::Default => "Default",
            FontChoice::File(name) => name,
        }
    }
}

/// List the `.ttf` files available in `dir`, sorted by name.
///
/// A missing or unreadable directory yields an empty list; the bundled
/// default font is always available regardless.
pub fn list_fonts(dir: impl AsRef<Path>) -> Vec<String> {
    let dir = dir.as_ref();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Font directory '{}' unreadable: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut fonts: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".ttf"))
        .collect();
    fonts.sort();
    fonts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_documented_values() {
        let c = CloudConfig::default();
        assert_eq!(c.background, HexColor::WHITE);
        assert_eq!(c.max_words, 200);
        assert_eq!((c.width, c.height), (800, 400));
        assert_eq!(c.colormap, Colormap::Viridis);
        assert_eq!(c.font, FontChoice::Default);
        assert_eq!(c.shape, Shape::None);
        assert_eq!(c.top_n, 10);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn builder_clamps_to_ranges() {
        let c = CloudConfig::builder()
            .max_words(10)
            .width(5000)
            .height(1)
            .build()
            .unwrap();
        assert_eq!(c.max_words, 50);
        assert_eq!(c.width, 1200);
        assert_eq!(c.height, 300);
    }

    #[test]
    fn validate_rejects_hand_built_out_of_range() {
        let c = CloudConfig {
            width: 100,
            ..CloudConfig::default()
        };
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("width"), "got: {err}");
    }

    #[test]
    fn huge_margin_is_rejected_at_build() {
        let err = CloudConfig::builder()
            .size(400, 300)
            .margin(u32::MAX)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("margin"), "got: {err}");

        let c = CloudConfig::builder().size(400, 300).margin(300).build().unwrap();
        assert_eq!(c.margin, 300);
    }

    #[test]
    fn top_n_is_capped_at_ten() {
        let c = CloudConfig::builder().top_n(50).build().unwrap();
        assert_eq!(c.top_n, MAX_TOP_N);
        assert_eq!(CloudConfig::builder().top_n(0).build().unwrap().top_n, 1);

        let hand_built = CloudConfig {
            top_n: 11,
            ..CloudConfig::default()
        };
        let err = hand_built.validate().unwrap_err();
        assert!(err.to_string().contains("top_n"), "got: {err}");
    }

    #[test]
    fn validate_rejects_inverted_font_sizes() {
        let c = CloudConfig {
            min_font_size: 20,
            max_font_size: Some(10),
            ..CloudConfig::default()
        };
        assert!(matches!(c.validate(), Err(WordCloudError::InvalidConfig(_))));
    }

    #[test]
    fn hex_color_parsing() {
        assert_eq!("#ffffff".parse::<HexColor>().unwrap(), HexColor::WHITE);
        assert_eq!("#1a2B3c".parse::<HexColor>().unwrap(), HexColor([0x1a, 0x2b, 0x3c]));
        assert_eq!("000".parse::<HexColor>().unwrap(), HexColor::BLACK);
        assert_eq!("#f0a".parse::<HexColor>().unwrap(), HexColor([0xff, 0x00, 0xaa]));
        assert!("#12345".parse::<HexColor>().is_err());
        assert!("#gggggg".parse::<HexColor>().is_err());
        assert!("".parse::<HexColor>().is_err());
    }

    #[test]
    fn hex_color_display_is_lowercase_long_form() {
        assert_eq!(HexColor([0xAB, 0x01, 0xFF]).to_string(), "#ab01ff");
    }

    #[test]
    fn hex_color_serde_as_string() {
        let json = serde_json::to_string(&HexColor([1, 2, 3])).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: HexColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HexColor([1, 2, 3]));
    }

    #[test]
    fn colormap_names_round_trip() {
        for c in Colormap::ALL {
            assert_eq!(c.name().parse::<Colormap>().unwrap(), c);
        }
        assert!("jet".parse::<Colormap>().is_err());
        assert_eq!("  Viridis ".parse::<Colormap>().unwrap(), Colormap::Viridis);
    }

    #[test]
    fn shape_file_names() {
        assert_eq!(Shape::None.file_name(), None);
        assert_eq!(Shape::Circle.file_name().as_deref(), Some("circle.png"));
        assert_eq!("Heart".parse::<Shape>().unwrap(), Shape::Heart);
    }

    #[test]
    fn font_choice_from_menu() {
        assert_eq!(FontChoice::from_menu("Default"), FontChoice::Default);
        assert_eq!(FontChoice::from_menu(""), FontChoice::Default);
        assert_eq!(
            FontChoice::from_menu("Lato.ttf"),
            FontChoice::File("Lato.ttf".into())
        );
    }

    #[test]
    fn list_fonts_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.ttf", "a.ttf", "readme.txt", "c.otf"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.ttf")).unwrap();
        assert_eq!(list_fonts(dir.path()), vec!["a.ttf", "b.ttf"]);
    }

    #[test]
    fn list_fonts_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_fonts(dir.path().join("nope")).is_empty());
    }

    #[test]
    fn debug_hides_mask_bytes() {
        let c = CloudConfig::builder().custom_mask(vec![0; 16]).build().unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<16 bytes>"), "got: {dbg}");
    }
}

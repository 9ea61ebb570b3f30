//! # Domain Models
//!
//! These structs represent one public link page: the Profile document and
//! everything embedded in it. The document is keyed in the store by its
//! public name; the name itself is never a field. Every nested structure
//! carries serde defaults so a partially-written document always
//! deserializes into a fully materialized value.

use serde::{Deserialize, Serialize};

/// The root document describing one public link page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    /// Identity of the account that may mutate this document.
    /// Assigned on first save and never transferred.
    pub owner_id: String,
    pub display_name: String,
    pub bio: String,
    /// Avatar asset URL; empty means "no avatar".
    pub image_url: String,
    /// Display order; duplicates per platform are allowed.
    pub socials: Vec<SocialLink>,
    /// The primary editable content, in display order. May be empty.
    pub blocks: Vec<ContentBlock>,
    pub theme: Theme,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            owner_id: String::new(),
            display_name: String::new(),
            bio: String::new(),
            image_url: String::new(),
            socials: Vec::new(),
            blocks: Vec::new(),
            theme: Theme::default(),
        }
    }
}

impl Profile {
    /// A fully-populated starter document: one welcome text block and one
    /// empty link button, default theme.
    pub fn blank() -> Self {
        Self {
            blocks: vec![
                ContentBlock::Text {
                    body: "Welcome to my page!".to_string(),
                },
                ContentBlock::Link {
                    title: "My Website".to_string(),
                    url: String::new(),
                    featured: false,
                },
            ],
            ..Self::default()
        }
    }

    pub fn blank_for(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            ..Self::blank()
        }
    }

    /// Toggles the featured flag on the link block at `index` as one atomic
    /// mutation: the flag flips on `index` and clears on every other block,
    /// so at most one block is ever featured.
    pub fn toggle_featured(&mut self, index: usize) {
        let target_was_featured = matches!(
            self.blocks.get(index),
            Some(ContentBlock::Link { featured: true, .. })
        );
        for (i, block) in self.blocks.iter_mut().enumerate() {
            if let ContentBlock::Link { featured, .. } = block {
                *featured = i == index && !target_was_featured;
            }
        }
    }

    /// Index of the currently featured block, if any.
    pub fn featured_index(&self) -> Option<usize> {
        self.blocks.iter().position(|b| {
            matches!(b, ContentBlock::Link { featured: true, .. })
        })
    }
}

/// Visual configuration of a Profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub background: Background,
    pub container_color: String,
    pub button_color: String,
    pub text_color: String,
    pub button_style: ButtonStyle,
    pub font: Font,
    pub overlay: Overlay,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Background::default(),
            container_color: "#ffffff".to_string(),
            button_color: "#ffffff".to_string(),
            text_color: "#4f46e5".to_string(),
            button_style: ButtonStyle::Rounded,
            font: Font::Inter,
            overlay: Overlay::default(),
        }
    }
}

/// Page background. The active variant is selected by `kind`; the other
/// variants' fields stay populated so switching kind back and forth never
/// loses a user's earlier edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Background {
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    pub color: String,
    pub gradient_start: String,
    pub gradient_end: String,
    pub image_url: String,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            kind: BackgroundKind::Solid,
            color: "#f1f5f9".to_string(),
            gradient_start: "#e0e7ff".to_string(),
            gradient_end: "#e0f2fe".to_string(),
            image_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum BackgroundKind {
    Solid,
    Gradient,
    Image,
}

impl From<String> for BackgroundKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "gradient" => Self::Gradient,
            "image" => Self::Image,
            _ => Self::Solid,
        }
    }
}

/// Optional decorative layer: floating copies of a small image behind the
/// page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Overlay {
    pub enabled: bool,
    pub image_url: String,
}

/// Corner treatment for link buttons. Stored and round-tripped exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ButtonStyle {
    Rounded,
    Full,
    Square,
}

impl From<String> for ButtonStyle {
    fn from(s: String) -> Self {
        match s.as_str() {
            "full" => Self::Full,
            "square" => Self::Square,
            _ => Self::Rounded,
        }
    }
}

/// Closed set of page fonts. Unknown stored values fall back to Inter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum Font {
    Inter,
    Lato,
    SourceCodePro,
    Poppins,
    RobotoMono,
    PlayfairDisplay,
    Lora,
}

impl From<String> for Font {
    fn from(s: String) -> Self {
        match s.as_str() {
            "lato" => Self::Lato,
            "source-code-pro" => Self::SourceCodePro,
            "poppins" => Self::Poppins,
            "roboto-mono" => Self::RobotoMono,
            "playfair-display" => Self::PlayfairDisplay,
            "lora" => Self::Lora,
            _ => Self::Inter,
        }
    }
}

impl Font {
    /// CSS family for the named font.
    pub fn family(&self) -> &'static str {
        match self {
            Self::Inter => "'Inter', sans-serif",
            Self::Lato => "'Lato', sans-serif",
            Self::SourceCodePro => "'Source Code Pro', monospace",
            Self::Poppins => "'Poppins', sans-serif",
            Self::RobotoMono => "'Roboto Mono', monospace",
            Self::PlayfairDisplay => "'Playfair Display', serif",
            Self::Lora => "'Lora', serif",
        }
    }
}

/// One ordered unit of page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// A clickable button. `featured` marks the single attention-drawing
    /// block; see [`Profile::toggle_featured`].
    Link {
        #[serde(default)]
        title: String,
        #[serde(default)]
        url: String,
        #[serde(default)]
        featured: bool,
    },
    /// A video or animated-image reference.
    Video {
        #[serde(default)]
        url: String,
    },
    /// An opaque rich-content fragment, stored and replayed verbatim.
    /// No sanitization happens at this layer; the fragment is trusted input.
    Embed {
        #[serde(default)]
        html: String,
    },
    /// Literal multi-line text, whitespace-significant.
    Text {
        #[serde(default)]
        body: String,
    },
}

/// One entry of the social icon strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SocialLink {
    pub platform: SocialPlatform,
    pub url: String,
}

/// Recognized social platforms. Unrecognized values are preserved verbatim
/// in `Other` and render with the generic globe icon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(from = "String")]
pub enum SocialPlatform {
    #[default]
    Website,
    Github,
    Twitter,
    Linkedin,
    Instagram,
    Youtube,
    Facebook,
    Tiktok,
    Twitch,
    Pinterest,
    Discord,
    Other(String),
}

impl From<String> for SocialPlatform {
    fn from(s: String) -> Self {
        match s.as_str() {
            "website" => Self::Website,
            "github" => Self::Github,
            "twitter" => Self::Twitter,
            "linkedin" => Self::Linkedin,
            "instagram" => Self::Instagram,
            "youtube" => Self::Youtube,
            "facebook" => Self::Facebook,
            "tiktok" => Self::Tiktok,
            "twitch" => Self::Twitch,
            "pinterest" => Self::Pinterest,
            "discord" => Self::Discord,
            _ => Self::Other(s),
        }
    }
}

impl SocialPlatform {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Website => "website",
            Self::Github => "github",
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
            Self::Facebook => "facebook",
            Self::Tiktok => "tiktok",
            Self::Twitch => "twitch",
            Self::Pinterest => "pinterest",
            Self::Discord => "discord",
            Self::Other(s) => s,
        }
    }

    /// Icon name for the strip; unknown platforms get the globe.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Website | Self::Other(_) => "globe",
            Self::Github => "github",
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
            Self::Facebook => "facebook",
            Self::Tiktok => "music",
            Self::Twitch => "twitch",
            Self::Pinterest => "image",
            Self::Discord => "message-square",
        }
    }
}

impl Serialize for SocialPlatform {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Historical link shape from documents written before the block list
/// existed. Read-only; never written by current code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegacyLink {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub featured: Option<bool>,
}

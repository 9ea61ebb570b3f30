//! # Rendering Composer
//!
//! `compose` turns a Profile into a `VisualTree`: background layer, optional
//! decorative overlay, the page container with its ordered block list, and
//! the footer. It is a pure function with no I/O, cheap enough to call on
//! every keystroke for the live preview. Composition never fails; missing
//! or malformed optional fields degrade to documented placeholders.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::{Background, BackgroundKind, ButtonStyle, ContentBlock, Profile};

/// Number of floating copies in the overlay layer.
pub const OVERLAY_SPRITES: usize = 20;

/// Fixed attribution shown at the bottom of every page.
pub const ATTRIBUTION_LABEL: &str = "Powered by Linkpage";
pub const ATTRIBUTION_HREF: &str = "https://github.com/linkpage/linkpage";

/// The visual composition of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualTree {
    pub background: BackgroundLayer,
    /// Present only when the overlay is enabled and has an image.
    pub overlay: Option<OverlayLayer>,
    pub container: Container,
    pub attribution: Attribution,
    /// Public view only, and only when the page has a bound name.
    pub edit_path: Option<String>,
}

/// Outermost page layer, independent of the container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BackgroundLayer {
    Solid { color: String },
    Gradient { start: String, end: String },
    Image { url: String },
}

impl BackgroundLayer {
    /// Inline CSS for the layer.
    pub fn css(&self) -> String {
        match self {
            Self::Solid { color } => format!("background-color: {color};"),
            Self::Gradient { start, end } => format!(
                "background-image: linear-gradient(to bottom right, {start}, {end});"
            ),
            Self::Image { url } => format!(
                "background-image: url('{url}'); background-size: cover; background-position: center;"
            ),
        }
    }
}

/// Decorative layer of floating image copies. The placement is a pure
/// function of the image URL, so unrelated edits never reshuffle it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayer {
    pub image_url: String,
    pub sprites: Vec<OverlaySprite>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySprite {
    /// 0.0 to 100.0, percent of the viewport.
    pub top_pct: f32,
    pub left_pct: f32,
    /// 15 to 40.
    pub size_px: u32,
    /// 10.0 to 20.0 seconds.
    pub duration_s: f32,
    /// 0.0 to 5.0 seconds.
    pub delay_s: f32,
    /// 0.1 to 0.4.
    pub opacity: f32,
}

/// The fixed-aspect card carrying the page content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub color: String,
    pub font_family: &'static str,
    pub avatar: AvatarView,
    pub display_name: String,
    pub bio: String,
    pub socials: Vec<SocialIcon>,
    pub blocks: Vec<BlockView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AvatarView {
    Image(String),
    /// First character of the display name, possibly empty.
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialIcon {
    pub icon: &'static str,
    pub label: String,
    pub url: String,
}

/// Per-block render instruction, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BlockView {
    Button(ButtonView),
    Media(MediaView),
    /// A video block with no URL renders an explicit placeholder rather
    /// than a blank gap.
    MediaUnavailable,
    Embed(EmbedView),
    Paragraph(ParagraphView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonView {
    pub title: String,
    /// `None` renders the button visibly disabled, not omitted.
    pub href: Option<String>,
    pub featured: bool,
    pub corner_class: &'static str,
    pub button_color: String,
    pub text_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaView {
    pub url: String,
}

/// Replayed verbatim inside a clipped container. The fragment is trusted
/// input; there is no sanitization boundary at this layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedView {
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParagraphView {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    pub label: &'static str,
    pub href: &'static str,
}

/// Composes the visual tree for a profile. `page_key` is the public name
/// when rendering the public view; pass `None` for the editor preview and
/// for unsaved documents, which suppresses the edit affordance.
pub fn compose(profile: &Profile, page_key: Option<&str>) -> VisualTree {
    let theme = &profile.theme;
    let defaults = Background::default();

    let background = match theme.background.kind {
        BackgroundKind::Solid => BackgroundLayer::Solid {
            color: or_default(&theme.background.color, &defaults.color),
        },
        BackgroundKind::Gradient => BackgroundLayer::Gradient {
            start: or_default(&theme.background.gradient_start, &defaults.gradient_start),
            end: or_default(&theme.background.gradient_end, &defaults.gradient_end),
        },
        BackgroundKind::Image => BackgroundLayer::Image {
            url: theme.background.image_url.clone(),
        },
    };

    let overlay = if theme.overlay.enabled && !theme.overlay.image_url.is_empty() {
        Some(overlay_layer(&theme.overlay.image_url))
    } else {
        None
    };

    let avatar = if profile.image_url.is_empty() {
        AvatarView::Placeholder(
            profile
                .display_name
                .chars()
                .next()
                .map(String::from)
                .unwrap_or_default(),
        )
    } else {
        AvatarView::Image(profile.image_url.clone())
    };

    let socials = profile
        .socials
        .iter()
        .map(|social| SocialIcon {
            icon: social.platform.icon(),
            label: social.platform.as_str().to_string(),
            url: social.url.clone(),
        })
        .collect();

    let corner_class = match theme.button_style {
        ButtonStyle::Rounded => "rounded",
        ButtonStyle::Full => "pill",
        ButtonStyle::Square => "square",
    };

    let blocks = profile
        .blocks
        .iter()
        .map(|block| match block {
            ContentBlock::Link { title, url, featured } => BlockView::Button(ButtonView {
                title: if title.is_empty() && url.is_empty() {
                    "Link (no URL provided)".to_string()
                } else {
                    title.clone()
                },
                href: if url.is_empty() { None } else { Some(url.clone()) },
                featured: *featured,
                corner_class,
                button_color: or_default(&theme.button_color, "#ffffff"),
                text_color: or_default(&theme.text_color, "#4f46e5"),
            }),
            ContentBlock::Video { url } => {
                if url.is_empty() {
                    BlockView::MediaUnavailable
                } else {
                    BlockView::Media(MediaView { url: url.clone() })
                }
            }
            ContentBlock::Embed { html } => BlockView::Embed(EmbedView { html: html.clone() }),
            ContentBlock::Text { body } => {
                BlockView::Paragraph(ParagraphView { body: body.clone() })
            }
        })
        .collect();

    VisualTree {
        background,
        overlay,
        container: Container {
            color: or_default(&theme.container_color, "#ffffff"),
            font_family: theme.font.family(),
            avatar,
            display_name: profile.display_name.clone(),
            bio: profile.bio.clone(),
            socials,
            blocks,
        },
        attribution: Attribution {
            label: ATTRIBUTION_LABEL,
            href: ATTRIBUTION_HREF,
        },
        edit_path: page_key.map(|name| format!("/edit/{name}")),
    }
}

/// Derives the overlay layout from the image URL alone. Same URL, same
/// layout; a new URL reseeds every sprite.
fn overlay_layer(image_url: &str) -> OverlayLayer {
    let sprites = (0..OVERLAY_SPRITES)
        .map(|index| sprite_for(image_url, index))
        .collect();
    OverlayLayer {
        image_url: image_url.to_string(),
        sprites,
    }
}

fn sprite_for(image_url: &str, index: usize) -> OverlaySprite {
    let mut hasher = Sha256::new();
    hasher.update(image_url.as_bytes());
    hasher.update([index as u8]);
    let digest = hasher.finalize();

    let frac = |hi: u8, lo: u8| f32::from(u16::from_be_bytes([hi, lo])) / f32::from(u16::MAX);

    OverlaySprite {
        top_pct: frac(digest[0], digest[1]) * 100.0,
        left_pct: frac(digest[2], digest[3]) * 100.0,
        size_px: 15 + u32::from(digest[4] % 26),
        duration_s: 10.0 + frac(digest[5], digest[6]) * 10.0,
        delay_s: frac(digest[7], digest[8]) * 5.0,
        opacity: 0.1 + frac(digest[9], digest[10]) * 0.3,
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

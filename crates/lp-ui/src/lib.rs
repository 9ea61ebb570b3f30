//! # lp-ui
//!
//! Askama templates turning a composed [`VisualTree`] into HTML. The
//! templates render structure only; styling stays minimal and structural.

use askama::Template;
use lp_core::render::{AvatarView, BlockView, VisualTree};

/// The public page and the editor preview share this template; the tree
/// decides whether an edit affordance appears.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    pub title: &'a str,
    pub tree: &'a VisualTree,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate<'a> {
    pub name: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lp_core::migrate::normalize;
    use lp_core::models::{ContentBlock, Profile};
    use lp_core::render::compose;
    use serde_json::json;

    #[test]
    fn disabled_button_is_present_but_not_a_link() {
        let mut profile = Profile::blank();
        profile.blocks = vec![ContentBlock::Link {
            title: "Site".into(),
            url: String::new(),
            featured: false,
        }];
        let tree = compose(&profile, None);
        let html = PageTemplate { title: "Site", tree: &tree }.render().unwrap();
        assert!(html.contains("disabled"));
        assert!(html.contains("Site"));
        assert!(!html.contains("href=\"\""));
    }

    #[test]
    fn embed_html_is_replayed_verbatim() {
        let mut profile = Profile::blank();
        profile.blocks = vec![ContentBlock::Embed {
            html: "<iframe src=\"https://v.example\"></iframe>".into(),
        }];
        let tree = compose(&profile, None);
        let html = PageTemplate { title: "t", tree: &tree }.render().unwrap();
        assert!(html.contains("<iframe src=\"https://v.example\"></iframe>"));
    }

    #[test]
    fn text_blocks_are_escaped() {
        let mut profile = Profile::blank();
        profile.blocks = vec![ContentBlock::Text {
            body: "<script>alert(1)</script>".into(),
        }];
        let tree = compose(&profile, None);
        let html = PageTemplate { title: "t", tree: &tree }.render().unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn overlay_renders_all_sprites() {
        let profile = normalize(json!({
            "theme": { "overlay": { "enabled": true, "imageUrl": "https://cdn.example/i.png" } }
        }));
        let tree = compose(&profile, None);
        let html = PageTemplate { title: "t", tree: &tree }.render().unwrap();
        assert_eq!(html.matches("class=\"sprite\"").count(), 20);
    }

    #[test]
    fn edit_affordance_only_on_public_view() {
        let profile = Profile::blank();
        let preview = compose(&profile, None);
        let html = PageTemplate { title: "t", tree: &preview }.render().unwrap();
        assert!(!html.contains("Edit this page"));

        let public = compose(&profile, Some("my-page"));
        let html = PageTemplate { title: "t", tree: &public }.render().unwrap();
        assert!(html.contains("/edit/my-page"));
    }

    #[test]
    fn not_found_page_names_the_missing_page() {
        let html = NotFoundTemplate { name: "ghost" }.render().unwrap();
        assert!(html.contains("ghost"));
    }
}

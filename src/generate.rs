//! HTML gallery generation.
//!
//! Stage 4 of the build pipeline. Renders the reconciled photo list as a
//! single page and writes the files that page needs:
//!
//! ```text
//! album/
//! ├── index.html          # The gallery page
//! ├── assets/
//! │   ├── style.css       # Layout + color themes
//! │   └── gallery.js      # Tag filter + lightbox
//! └── favicon.ico         # Anything from `include`, copied verbatim
//! ```
//!
//! ## Page structure
//!
//! - Header with title and subtitle.
//! - Tag filter: one button per tag class (`tag-0`, `tag-1`, ...), plus "All".
//! - Thumbnail grid in capture-time order. Each figure links to its slide and
//!   carries the slide size in `data-size`, so the lightbox can lay out the
//!   slide before it loads. Photos without a slide and thumbnail (failed
//!   transforms) are left out.
//! - Footer with the build date.
//! - Optional raw HTML from `head_content` / `body_content`, inserted before
//!   `</head>` and `</body>` unescaped.
//!
//! The color theme is a body class (`theme-blue`, ...) defined in the
//! stylesheet.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating with
//! automatic escaping.

use crate::config::GalleryConfig;
use crate::metadata::format_build_date;
use crate::reconcile::TagClass;
use crate::types::{OutputLayout, PhotoRecord, Variant};
use chrono::{DateTime, Local};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read {path}: {source}")]
    Content {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to include {path}: {source}")]
    Include {
        path: PathBuf,
        source: std::io::Error,
    },
}

const CSS: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/gallery.js");

pub const STYLESHEET: &str = "style.css";
pub const SCRIPT: &str = "gallery.js";

const FALLBACK_TITLE: &str = "Photos";

/// Everything the page template needs.
#[derive(Debug)]
pub struct Page<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub color: &'a str,
    pub photos: &'a [PhotoRecord],
    pub tags: &'a [TagClass],
    /// Already formatted, e.g. `Saturday, May 4, 2019`.
    pub built_at: String,
    pub head_content: Option<String>,
    pub body_content: Option<String>,
}

/// Render the gallery page, write it with its assets, and copy includes.
pub fn write_site(
    layout: &OutputLayout,
    config: &GalleryConfig,
    photos: &[PhotoRecord],
    tags: &[TagClass],
    built_at: DateTime<Local>,
) -> Result<(), GenerateError> {
    let page = Page {
        title: &config.title,
        subtitle: &config.subtitle,
        color: &config.color,
        photos,
        tags,
        built_at: format_build_date(built_at),
        head_content: read_content(config.head_content.as_deref())?,
        body_content: read_content(config.body_content.as_deref())?,
    };

    fs::write(layout.index_path(), render_index(&page).into_string())?;

    let assets = layout.assets_dir();
    fs::create_dir_all(&assets)?;
    fs::write(assets.join(STYLESHEET), CSS)?;
    fs::write(assets.join(SCRIPT), JS)?;

    copy_includes(layout.root(), &config.include)
}

fn read_content(path: Option<&Path>) -> Result<Option<String>, GenerateError> {
    path.map(|path| {
        fs::read_to_string(path).map_err(|source| GenerateError::Content {
            path: path.to_path_buf(),
            source,
        })
    })
    .transpose()
}

/// Copy each file into `root` under its own file name.
pub fn copy_includes(root: &Path, includes: &[PathBuf]) -> Result<(), GenerateError> {
    for path in includes {
        let include_err = |source| GenerateError::Include {
            path: path.clone(),
            source,
        };
        let name = path.file_name().ok_or_else(|| {
            include_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no file name",
            ))
        })?;
        fs::copy(path, root.join(name)).map_err(include_err)?;
    }
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

fn is_displayable(photo: &PhotoRecord) -> bool {
    photo.slide.is_produced() && photo.thumb.is_produced()
}

fn size_attr(variant: &Variant) -> String {
    format!("{}x{}", variant.width, variant.height)
}

/// Renders the "All" button followed by one button per tag.
fn tag_filter(tags: &[TagClass]) -> Markup {
    html! {
        nav.tag-filter {
            button.tag-button.active type="button" data-tag="all" { "All" }
            @for tag in tags {
                button.tag-button type="button" data-tag=(tag.class_name) { (tag.tag) }
            }
        }
    }
}

/// Renders one grid cell: thumbnail linking to the slide, with caption.
fn photo_figure(photo: &PhotoRecord) -> Markup {
    let mut classes = vec!["photo".to_string()];
    classes.extend(photo.tag_names.iter().cloned());

    html! {
        figure class=(classes.join(" ")) id=(photo.stable_id) {
            a href=(photo.slide.relative_path)
                data-size=(size_attr(&photo.slide))
                data-original=[photo.original.is_produced().then_some(&photo.original.relative_path)] {
                img src=(photo.thumb.relative_path)
                    width=(photo.thumb.width)
                    height=(photo.thumb.height)
                    alt=(photo.caption)
                    loading="lazy";
            }
            figcaption {
                span.caption { (photo.caption) }
                @if !photo.author.is_empty() {
                    span.author { (photo.author) }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderer
// ============================================================================

pub fn render_index(page: &Page) -> Markup {
    let title = if page.title.is_empty() {
        FALLBACK_TITLE
    } else {
        page.title
    };

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href={ "assets/" (STYLESHEET) };
                @if let Some(head) = &page.head_content {
                    (PreEscaped(head))
                }
            }
            body class={ "theme-" (page.color) } {
                header.album-header {
                    h1 { (title) }
                    @if !page.subtitle.is_empty() {
                        h2 { (page.subtitle) }
                    }
                }
                @if !page.tags.is_empty() {
                    (tag_filter(page.tags))
                }
                main.photo-grid {
                    @for photo in page.photos.iter().filter(|p| is_displayable(p)) {
                        (photo_figure(photo))
                    }
                }
                footer.album-footer {
                    "Built " (page.built_at)
                }
                div.lightbox hidden {
                    button.lightbox-close type="button" aria-label="Close" { "×" }
                    button.lightbox-prev type="button" aria-label="Previous" { "‹" }
                    img.lightbox-image alt="";
                    button.lightbox-next type="button" aria-label="Next" { "›" }
                    p.lightbox-caption {}
                }
                script src={ "assets/" (SCRIPT) } {}
                @if let Some(body) = &page.body_content {
                    (PreEscaped(body))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{produced_record, record};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn page<'a>(photos: &'a [PhotoRecord], tags: &'a [TagClass]) -> Page<'a> {
        Page {
            title: "Summer",
            subtitle: "",
            color: "blue",
            photos,
            tags,
            built_at: "Saturday, May 4, 2019".to_string(),
            head_content: None,
            body_content: None,
        }
    }

    fn tag(tag: &str, class_name: &str) -> TagClass {
        TagClass {
            tag: tag.to_string(),
            class_name: class_name.to_string(),
        }
    }

    // =========================================================================
    // render_index
    // =========================================================================

    #[test]
    fn renders_doctype_title_and_theme() {
        let html = render_index(&page(&[], &[])).into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Summer</title>"));
        assert!(html.contains(r#"<body class="theme-blue">"#));
        assert!(html.contains("Built Saturday, May 4, 2019"));
        assert!(!html.contains("<h2>"));
    }

    #[test]
    fn empty_title_falls_back() {
        let mut p = page(&[], &[]);
        p.title = "";
        let html = render_index(&p).into_string();
        assert!(html.contains("<title>Photos</title>"));
    }

    #[test]
    fn subtitle_rendered_when_set() {
        let mut p = page(&[], &[]);
        p.subtitle = "By the sea";
        assert!(render_index(&p).into_string().contains("<h2>By the sea</h2>"));
    }

    #[test]
    fn figure_links_thumbnail_to_slide() {
        let mut photo = produced_record("/in/a.jpg", "aaaa", 0, "photo-a");
        photo.caption = "Harbour".into();
        photo.author = "Ana".into();
        let photos = [photo];

        let html = render_index(&page(&photos, &[])).into_string();

        assert!(html.contains(r#"id="photo-a""#));
        assert!(html.contains(r#"href="slides/photo-a.jpg""#));
        assert!(html.contains(r#"data-size="1200x900""#));
        assert!(html.contains(r#"data-original="originals/photo-a.jpg""#));
        assert!(html.contains(r#"src="thumbs/photo-a.jpg""#));
        assert!(html.contains(r#"width="300""#));
        assert!(html.contains(r#"<span class="caption">Harbour</span>"#));
        assert!(html.contains(r#"<span class="author">Ana</span>"#));
    }

    #[test]
    fn photos_without_variants_are_skipped() {
        let photos = [
            record("/in/failed.jpg", "ffff", 0),
            produced_record("/in/ok.jpg", "aaaa", 1, "photo-a"),
        ];

        let html = render_index(&page(&photos, &[])).into_string();

        assert_eq!(html.matches("<figure").count(), 1);
        assert!(html.contains("photo-a"));
    }

    #[test]
    fn photos_keep_list_order() {
        let photos = [
            produced_record("/in/b.jpg", "bbbb", 0, "photo-b"),
            produced_record("/in/a.jpg", "aaaa", 1, "photo-a"),
        ];

        let html = render_index(&page(&photos, &[])).into_string();

        let b = html.find(r#"id="photo-b""#).unwrap();
        let a = html.find(r#"id="photo-a""#).unwrap();
        assert!(b < a);
    }

    #[test]
    fn tag_classes_on_figures_and_filter() {
        let mut photo = produced_record("/in/a.jpg", "aaaa", 0, "photo-a");
        photo.tags = vec!["sea".into(), "boats".into()];
        photo.tag_names = vec!["tag-0".into(), "tag-1".into()];
        let photos = [photo];
        let tags = [tag("sea", "tag-0"), tag("boats", "tag-1")];

        let html = render_index(&page(&photos, &tags)).into_string();

        assert!(html.contains(r#"class="photo tag-0 tag-1""#));
        assert!(html.contains(r#"data-tag="all""#));
        assert!(html.contains(r#"data-tag="tag-1">boats</button>"#));
    }

    #[test]
    fn no_filter_without_tags() {
        let html = render_index(&page(&[], &[])).into_string();
        assert!(!html.contains("tag-filter"));
    }

    #[test]
    fn captions_are_escaped() {
        let mut photo = produced_record("/in/a.jpg", "aaaa", 0, "photo-a");
        photo.caption = "<script>alert(1)</script>".into();
        let photos = [photo];

        let html = render_index(&page(&photos, &[])).into_string();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn head_and_body_content_are_raw() {
        let mut p = page(&[], &[]);
        p.head_content = Some("<meta name=\"x\" content=\"y\">".into());
        p.body_content = Some("<script>track()</script>".into());

        let html = render_index(&p).into_string();

        let head = html.find("<meta name=\"x\"").unwrap();
        assert!(head < html.find("</head>").unwrap());
        let body = html.find("<script>track()</script>").unwrap();
        assert!(body < html.find("</body>").unwrap());
    }

    // =========================================================================
    // write_site
    // =========================================================================

    #[test]
    fn write_site_writes_index_assets_and_includes() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let favicon = tmp.path().join("favicon.ico");
        fs::write(&favicon, b"icon").unwrap();
        let head = tmp.path().join("head.html");
        fs::write(&head, "<meta name=\"included\">").unwrap();

        let config = GalleryConfig {
            title: "Trip".into(),
            include: vec![favicon],
            head_content: Some(head),
            ..GalleryConfig::default()
        };
        let built_at = Local.with_ymd_and_hms(2019, 5, 4, 12, 0, 0).unwrap();
        let layout = OutputLayout::new(&out);

        write_site(&layout, &config, &[], &[], built_at).unwrap();

        let index = fs::read_to_string(layout.index_path()).unwrap();
        assert!(index.contains("<title>Trip</title>"));
        assert!(index.contains("<meta name=\"included\">"));
        assert!(index.contains("Saturday, May 4, 2019"));
        assert_eq!(fs::read_to_string(out.join("assets/style.css")).unwrap(), CSS);
        assert_eq!(fs::read_to_string(out.join("assets/gallery.js")).unwrap(), JS);
        assert_eq!(fs::read(out.join("favicon.ico")).unwrap(), b"icon");
    }

    #[test]
    fn missing_head_content_is_error() {
        let tmp = TempDir::new().unwrap();
        let config = GalleryConfig {
            head_content: Some(tmp.path().join("missing.html")),
            ..GalleryConfig::default()
        };

        let result = write_site(&OutputLayout::new(tmp.path()), &config, &[], &[], Local::now());
        assert!(matches!(result, Err(GenerateError::Content { .. })));
    }

    #[test]
    fn missing_include_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = copy_includes(tmp.path(), &[tmp.path().join("nope.txt")]);
        assert!(matches!(result, Err(GenerateError::Include { .. })));
    }
}

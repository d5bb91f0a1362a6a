//! HTML rendering.
//!
//! Pages share one shell: the site title, a sidebar with the five pages and
//! the page body. Markup is built with maud, so text from configuration,
//! uploads or the store is escaped on interpolation.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use portfolio_common::paths::accept_attribute;

use crate::config::ProfileConfig;
use crate::gallery::{GridLayout, ImageCard, Level, Notification};

use super::Page;

pub const SITE_TITLE: &str = "Actress Portfolio";

const STYLE: &str = "\
body{margin:0;font-family:sans-serif;display:flex;min-height:100vh}\
nav{width:14rem;background:#f1f3f6;border-right:2px solid #e0e0e0;padding:1rem}\
nav ul{list-style:none;padding:0}nav li{margin:.4rem 0}\
nav a{color:#333;text-decoration:none}nav a.active{font-weight:bold}\
main{flex:1;padding:1rem 2rem}\
.notice{padding:.5rem 1rem;margin:.4rem 0;border-radius:4px}\
.notice.success{background:#e6f4ea;color:#1e4620}\
.notice.error{background:#fdecea;color:#611a15}\
.grid{display:flex;gap:1rem}.grid .column{flex:1;display:flex;flex-direction:column;gap:1rem}\
figure{margin:0}figure img{width:100%;height:auto}figcaption{text-align:center;color:#555}";

/// Wrap a page body in the site shell.
pub fn shell(current: Option<Page>, body: Markup) -> Markup {
    let title = match current {
        Some(page) => format!("{} | {}", page.title(), SITE_TITLE),
        None => SITE_TITLE.to_string(),
    };

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                nav {
                    h2 { "Navigation" }
                    ul {
                        @for page in Page::ALL {
                            li {
                                a href=(page.path())
                                    class=[(Some(page) == current).then_some("active")] {
                                    (page.title())
                                }
                            }
                        }
                    }
                }
                main {
                    h1 { (SITE_TITLE) }
                    (body)
                }
            }
        }
    }
}

/// Render one of the static pages. The gallery has its own renderer.
pub fn static_page(page: Page, profile: &ProfileConfig) -> Markup {
    let body = match page {
        Page::Home => html! {
            p { "I'm " (profile.name) ", a professional actress with a passion for storytelling." }
        },
        Page::About => html! {
            p { (profile.biography) }
        },
        Page::Filmography => html! {
            ul.filmography {
                @for credit in &profile.filmography {
                    li { (credit) }
                }
            }
        },
        Page::Contact => {
            let contact = &profile.contact;
            html! {
                p { "For booking and inquiries, please reach out through the following channels:" }
                p { "Email: " (contact.email) }
                p { "Phone: " (contact.phone) }
                p { "Agent: " (contact.agent_name) " - " (contact.agent_email) }
            }
        }
        Page::Gallery => return gallery(&[], None),
    };

    shell(
        Some(page),
        html! {
            h2 { (page.heading()) }
            (body)
        },
    )
}

fn notifications(items: &[Notification]) -> Markup {
    html! {
        @for notice in items {
            @let level = match notice.level {
                Level::Success => "success",
                Level::Error => "error",
            };
            div class={ "notice " (level) } { (notice.message) }
        }
    }
}

fn grid(layout: &GridLayout<ImageCard>) -> Markup {
    html! {
        div.grid {
            @for column in &layout.columns {
                div.column {
                    @for cell in column {
                        figure {
                            img src={ "/gallery/images/" (cell.item.id) }
                                alt=(cell.item.name)
                                width=(cell.item.width)
                                height=(cell.item.height);
                            figcaption { (cell.item.name) }
                        }
                    }
                }
            }
        }
    }
}

/// Render the gallery page.
///
/// `shown` is the laid-out gallery when the visitor asked to see it.
pub fn gallery(notices: &[Notification], shown: Option<&GridLayout<ImageCard>>) -> Markup {
    shell(
        Some(Page::Gallery),
        html! {
            h2 { (Page::Gallery.heading()) }
            (notifications(notices))
            form method="post" action="/gallery" enctype="multipart/form-data" {
                label {
                    "Upload Images "
                    input type="file" name="files" multiple accept=(accept_attribute());
                }
                " "
                button type="submit" { "Upload" }
            }
            form method="get" action="/gallery" {
                button type="submit" name="show" value="true" { "Show Images" }
            }
            @if let Some(layout) = shown {
                @if layout.is_empty() {
                    p { "No images yet." }
                } @else {
                    (grid(layout))
                }
            }
        },
    )
}

/// Render the 404 page.
pub fn not_found(path: &str) -> Markup {
    shell(
        None,
        html! {
            h2 { "Page not found" }
            p { "There is no page at " (path) "." }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::layout;
    use portfolio_common::ImageId;

    fn card(id: i64, name: &str) -> ImageCard {
        ImageCard {
            id: ImageId::from(id),
            name: name.to_string(),
            width: 10,
            height: 20,
            mode: "RGB",
        }
    }

    #[test]
    fn test_shell_marks_current_page() {
        let html = shell(Some(Page::About), html! {}).into_string();
        assert!(html.contains("<a href=\"/about\" class=\"active\">About</a>"));
        assert!(html.contains("<a href=\"/\">Home</a>"));
        assert!(html.contains("<title>About | Actress Portfolio</title>"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_static_pages_use_profile() {
        let mut profile = ProfileConfig::default();
        profile.name = "Jane <Doe>".to_string();

        let home = static_page(Page::Home, &profile).into_string();
        assert!(home.contains("Welcome to My Portfolio"));
        assert!(home.contains("I'm Jane &lt;Doe&gt;, a professional actress"));

        let films = static_page(Page::Filmography, &profile).into_string();
        assert!(films.contains("<li>Film Title 1 - Role - Year</li>"));
        assert!(films.contains("<li>Film Title 2 - Role - Year</li>"));

        let contact = static_page(Page::Contact, &profile).into_string();
        assert!(contact.contains("Email: [actress_email@example.com]"));
        assert!(contact.contains("Agent: [Agent Name] - [agent_contact@example.com]"));
    }

    #[test]
    fn test_gallery_without_images() {
        let html = gallery(&[], None).into_string();
        assert!(html.contains("name=\"files\""));
        assert!(html.contains("accept=\".heic,.heif,.hif,"));
        assert!(html.contains("Show Images"));
        assert!(!html.contains("class=\"grid\""));
    }

    #[test]
    fn test_gallery_empty_store() {
        let html = gallery(&[], Some(&layout(Vec::<ImageCard>::new()))).into_string();
        assert!(html.contains("No images yet."));
    }

    #[test]
    fn test_gallery_grid() {
        let cards = vec![card(1, "a.jpg"), card(2, "b.png"), card(5, "c<d>.jpg"), card(9, "d.jpg")];
        let html = gallery(&[], Some(&layout(cards))).into_string();

        assert_eq!(html.matches("<div class=\"column\">").count(), 3);
        assert!(html.contains("src=\"/gallery/images/9\""));
        assert!(html.contains("<figcaption>c&lt;d&gt;.jpg</figcaption>"));

        let first_column_end = html.find("</div><div class=\"column\">").unwrap();
        let first_column = &html[..first_column_end];
        assert!(first_column.contains("a.jpg"));
        assert!(first_column.contains("d.jpg"));
        assert!(!first_column.contains("b.png"));
    }

    #[test]
    fn test_gallery_notifications() {
        let notices = vec![
            Notification::success("a.jpg saved to database."),
            Notification::error("b.gif was not uploaded: unsupported file type image/gif"),
        ];
        let html = gallery(&notices, None).into_string();
        assert!(html.contains("<div class=\"notice success\">a.jpg saved to database.</div>"));
        assert!(html.contains("<div class=\"notice error\">b.gif was not uploaded"));
    }

    #[test]
    fn test_interpolated_text_is_escaped() {
        let html = not_found("/<script>").into_string();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));

        let notices = vec![Notification::error("<b>bold</b>.heic was not uploaded")];
        let html = gallery(&notices, None).into_string();
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;.heic"));
    }
}

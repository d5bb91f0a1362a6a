//! Site pages and their HTML rendering.

pub mod render;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The five pages of the site, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    About,
    Gallery,
    Filmography,
    Contact,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown page: {0}")]
pub struct UnknownPage(pub String);

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::About,
        Page::Gallery,
        Page::Filmography,
        Page::Contact,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::About => "about",
            Page::Gallery => "gallery",
            Page::Filmography => "filmography",
            Page::Contact => "contact",
        }
    }

    /// URL path of the page.
    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::About => "/about",
            Page::Gallery => "/gallery",
            Page::Filmography => "/filmography",
            Page::Contact => "/contact",
        }
    }

    /// Navigation label.
    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::About => "About",
            Page::Gallery => "Gallery",
            Page::Filmography => "Filmography",
            Page::Contact => "Contact",
        }
    }

    /// Page header.
    pub fn heading(self) -> &'static str {
        match self {
            Page::Home => "Welcome to My Portfolio",
            Page::About => "About Me",
            Page::Gallery => "Gallery",
            Page::Filmography => "Filmography",
            Page::Contact => "Contact Information",
        }
    }

    pub fn nav_entry(self) -> NavEntry {
        NavEntry {
            slug: self.slug(),
            title: self.title(),
            path: self.path(),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim().trim_matches('/').to_lowercase();
        if slug.is_empty() {
            return Ok(Page::Home);
        }
        Page::ALL
            .into_iter()
            .find(|page| page.slug() == slug)
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

/// One sidebar link, as served by `/api/pages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub slug: &'static str,
    pub title: &'static str,
    pub path: &'static str,
}

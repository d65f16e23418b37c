//! Page model and the renderer seam.
//!
//! Handlers produce a [`Page`] and a template name; how it becomes bytes is
//! up to the [`Renderer`]. The built-in [`JsonRenderer`] serves the page
//! model as JSON for API clients and external front-ends.

use serde::Serialize;
use serde_json::Value;

use crate::error::{PoolwatchError, Result};

/// Main menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavEntry {
    Dashboard,
    Status,
    Statistics,
    Logs,
    About,
    Enclosure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nav {
    /// Highlighted menu entry, `None` for pages outside the menu.
    pub active: Option<NavEntry>,
    pub root: String,
}

/// Pool tab on the status pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubNav {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub nav: Nav,
    pub subnav: Vec<SubNav>,
    pub data: Value,
}

impl Page {
    pub fn new<T: Serialize>(nav: Nav, subnav: Vec<SubNav>, data: &T) -> Result<Self> {
        let data = serde_json::to_value(data)
            .map_err(|e| PoolwatchError::render(format!("serializing page data: {}", e)))?;
        Ok(Self { nav, subnav, data })
    }
}

/// Turns a page into a response body.
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, page: &Page) -> Result<String>;

    /// Content type of the rendered body
    fn content_type(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    template: &'a str,
    #[serde(flatten)]
    page: &'a Page,
}

impl Renderer for JsonRenderer {
    fn render(&self, template: &str, page: &Page) -> Result<String> {
        let doc = JsonDocument { template, page };
        let body = if self.pretty {
            serde_json::to_string_pretty(&doc)
        } else {
            serde_json::to_string(&doc)
        };
        body.map_err(|e| PoolwatchError::render(format!("{}: {}", template, e)))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

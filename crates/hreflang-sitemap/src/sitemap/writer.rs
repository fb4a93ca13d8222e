//! Sitemap XML serialization and file output.

use super::assembler::Sitemap;
use crate::error::{Result, SitemapError};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::path::Path;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Render a sitemap as an indented `urlset` document with XML declaration.
///
/// Empty `lastmod` values and empty alternate blocks produce no elements.
pub fn render_sitemap(sitemap: &Sitemap) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(
        &mut writer,
        Event::Start(
            BytesStart::new("urlset")
                .with_attributes([("xmlns", SITEMAP_NS), ("xmlns:xhtml", XHTML_NS)]),
        ),
    )?;

    for url in &sitemap.urls {
        emit(&mut writer, Event::Start(BytesStart::new("url")))?;
        text_element(&mut writer, "loc", &url.loc)?;
        if let Some(lastmod) = url.lastmod.as_deref().filter(|d| !d.is_empty()) {
            text_element(&mut writer, "lastmod", lastmod)?;
        }
        for link in &url.alternates {
            emit(
                &mut writer,
                Event::Empty(BytesStart::new("xhtml:link").with_attributes([
                    ("rel", "alternate"),
                    ("hreflang", link.hreflang.as_str()),
                    ("href", link.href.as_str()),
                ])),
            )?;
        }
        emit(&mut writer, Event::End(BytesEnd::new("url")))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("urlset")))?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|e| SitemapError::XmlWrite(e.to_string()))?;
    xml.push('\n');
    Ok(xml)
}

/// Render and write a sitemap, creating the parent directory.
pub async fn write_sitemap(path: &Path, sitemap: &Sitemap) -> Result<()> {
    let xml = render_sitemap(sitemap)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SitemapError::io(parent, e))?;
    }
    tokio::fs::write(path, xml)
        .await
        .map_err(|e| SitemapError::io(path, e))
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| SitemapError::XmlWrite(e.to_string()))
}

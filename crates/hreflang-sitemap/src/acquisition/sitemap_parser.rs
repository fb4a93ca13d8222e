//! Sitemap XML parsing.
//!
//! Reads a `urlset` document into a flat list of [`SitemapEntry`] values.
//! A sitemap with a single `<url>` still yields a one-element list.

use crate::error::{Result, SitemapError};
use crate::hreflang::{href_for, AlternateLink};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// One `<url>` element of a source sitemap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapEntry {
    /// `<loc>`; absent entries are skipped by the resolver.
    pub loc: Option<String>,
    pub lastmod: Option<String>,
    /// `<xhtml:link hreflang=".." href=".."/>` children.
    pub alternates: Vec<AlternateLink>,
}

impl SitemapEntry {
    /// The alternate URL this entry declares for `lang`, if any.
    pub fn alternate_for(&self, lang: &str) -> Option<&str> {
        href_for(&self.alternates, lang)
    }
}

/// Namespace of the `<xhtml:link>` alternates.
const XHTML_NS: &[u8] = b"http://www.w3.org/1999/xhtml";

#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Loc,
    Lastmod,
}

/// Role of an element given its name, namespace and nesting.
#[derive(Clone, Copy, PartialEq)]
enum Tag {
    Urlset,
    Url,
    Loc,
    Lastmod,
    Link,
    Other,
}

fn classify(
    e: &BytesStart<'_>,
    ns: &ResolveResult<'_>,
    level: usize,
    url_level: Option<usize>,
) -> Tag {
    let unprefixed = e.name().prefix().is_none();
    let in_url = url_level.is_some_and(|u| level == u + 1);

    match e.local_name().as_ref() {
        b"urlset" if unprefixed && level == 1 => Tag::Urlset,
        b"url" if unprefixed && level == 2 && url_level.is_none() => Tag::Url,
        b"loc" if unprefixed && in_url => Tag::Loc,
        b"lastmod" if unprefixed && in_url => Tag::Lastmod,
        b"link" if in_url && is_xhtml(ns) => Tag::Link,
        _ => Tag::Other,
    }
}

/// Bound to the XHTML namespace, or carrying an undeclared `xhtml:` prefix.
fn is_xhtml(ns: &ResolveResult<'_>) -> bool {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => *uri == XHTML_NS,
        ResolveResult::Unknown(prefix) => prefix.as_slice() == b"xhtml",
        ResolveResult::Unbound => false,
    }
}

/// Parse a sitemap document.
///
/// Only `loc`, `lastmod` and `xhtml:link` that are direct children of a
/// `<url>` count; extension elements such as `<image:loc>` are ignored.
/// Fails on malformed XML and on documents without a `urlset` root
/// (sitemap indexes, HTML error pages).
pub fn parse_sitemap(xml: &str) -> Result<Vec<SitemapEntry>> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut saw_urlset = false;
    let mut current: Option<SitemapEntry> = None;
    let mut url_level: Option<usize> = None;
    let mut depth = 0usize;
    let mut field = Field::None;
    let mut buf = Vec::new();

    loop {
        let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) => {
                depth += 1;
                field = Field::None;
                match classify(e, &ns, depth, url_level) {
                    Tag::Urlset => saw_urlset = true,
                    Tag::Url => {
                        url_level = Some(depth);
                        current = Some(SitemapEntry::default());
                    }
                    Tag::Loc => field = Field::Loc,
                    Tag::Lastmod => field = Field::Lastmod,
                    Tag::Link => {
                        if let Some(entry) = current.as_mut() {
                            push_link(e, entry);
                        }
                    }
                    Tag::Other => {}
                }
            }
            Event::Empty(ref e) => match classify(e, &ns, depth + 1, url_level) {
                Tag::Urlset => saw_urlset = true,
                Tag::Url => entries.push(SitemapEntry::default()),
                Tag::Link => {
                    if let Some(entry) = current.as_mut() {
                        push_link(e, entry);
                    }
                }
                _ => {}
            },
            Event::Text(ref e) => {
                let text = e.unescape().unwrap_or_default().trim().to_string();
                set_field(current.as_mut(), field, text);
            }
            Event::CData(ref e) => {
                let text = String::from_utf8_lossy(e).trim().to_string();
                set_field(current.as_mut(), field, text);
            }
            Event::End(_) => {
                if url_level == Some(depth) {
                    url_level = None;
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
                depth = depth.saturating_sub(1);
                field = Field::None;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_urlset {
        return Err(SitemapError::MissingField { field: "urlset" });
    }

    Ok(entries)
}

fn set_field(entry: Option<&mut SitemapEntry>, field: Field, text: String) {
    let Some(entry) = entry else {
        return;
    };
    if text.is_empty() {
        return;
    }
    match field {
        Field::Loc => entry.loc = Some(text),
        Field::Lastmod => entry.lastmod = Some(text),
        Field::None => {}
    }
}

fn push_link(e: &BytesStart<'_>, entry: &mut SitemapEntry) {
    let mut rel = None;
    let mut hreflang = None;
    let mut href = None;

    for attr in e.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        match attr.key.local_name().as_ref() {
            b"rel" => rel = Some(value),
            b"hreflang" => hreflang = Some(value),
            b"href" => href = Some(value),
            _ => {}
        }
    }

    if rel.as_deref().is_some_and(|r| r != "alternate") {
        return;
    }
    if let (Some(hreflang), Some(href)) = (hreflang, href) {
        entry.alternates.push(AlternateLink { hreflang, href });
    }
}

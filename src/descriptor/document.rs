/*
Copyright 2017 Takashi Ogura

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/
//! XML documents with XInclude, internal entities and literal result stylesheets resolved

use roxmltree::{Document, ParsingOptions};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::*;

pub const XINCLUDE_NAMESPACE: &str = "http://www.w3.org/2001/XInclude";
pub const XSLT_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";
const MAX_INCLUDE_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
}

/// Owned XML element which remembers the directory of the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Content>,
    base_dir: PathBuf,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `relative` resolved against the directory of this element's file
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    pub fn children(&self) -> &[Content] {
        &self.children
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Text of this element and all of its descendants
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, text: &mut String) {
        for child in &self.children {
            match child {
                Content::Text(t) => text.push_str(t),
                Content::Element(element) => element.collect_text(text),
            }
        }
    }

    /// Descendants in document order, not including `self`
    pub fn descendants(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        for element in self.elements() {
            found.push(element);
            found.extend(element.descendants());
        }
        found
    }

    /// Elements reached by `path` from any descendant, like `//a/b` in XPath
    pub fn find_all(&self, path: &[&str]) -> Vec<&Element> {
        let (first, rest) = match path.split_first() {
            Some(split) => split,
            None => return Vec::new(),
        };
        let mut found = Vec::new();
        for element in self.descendants() {
            if element.name == *first {
                element.follow(rest, &mut found);
            }
        }
        found
    }

    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }

    fn follow<'a>(&'a self, path: &[&str], found: &mut Vec<&'a Element>) {
        match path.split_first() {
            None => found.push(self),
            Some((first, rest)) => {
                for element in self.elements().filter(|element| element.name == *first) {
                    element.follow(rest, found);
                }
            }
        }
    }
}

/// Read an XML file into an `Element` tree
///
/// Internal DTD entities are substituted and `xi:include` elements are
/// replaced by the included document (`parse="xml"`) or text (`parse="text"`).
/// A stylesheet root is applied to itself before the tree is returned.
pub fn load_document(path: &Path) -> Result<Element> {
    load_with_depth(path, 0)
}

/// Parse XML text as if it was read from a file in `base_dir`
pub fn parse_document(text: &str, base_dir: &Path) -> Result<Element> {
    parse_with_depth(text, base_dir, base_dir, 0)
}

fn load_with_depth(path: &Path, depth: usize) -> Result<Element> {
    let text = fs::read_to_string(path).map_err(|e| Error::load(path, e))?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    parse_with_depth(&text, &base_dir, path, depth)
}

fn parse_with_depth(text: &str, base_dir: &Path, origin: &Path, depth: usize) -> Result<Element> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(text, options).map_err(|e| Error::load(origin, e))?;
    let root = convert(document.root_element(), base_dir, depth)?;
    if is_stylesheet(&root) {
        apply_stylesheet(&root, origin)
    } else {
        Ok(root)
    }
}

fn convert(node: roxmltree::Node<'_, '_>, base_dir: &Path, depth: usize) -> Result<Element> {
    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            let tag = child.tag_name();
            if tag.namespace() == Some(XINCLUDE_NAMESPACE) && tag.name() == "include" {
                children.push(include(&child, base_dir, depth)?);
            } else {
                children.push(Content::Element(convert(child, base_dir, depth)?));
            }
        } else if child.is_text() {
            if let Some(text) = child.text() {
                children.push(Content::Text(text.to_owned()));
            }
        }
    }
    Ok(Element {
        name: node.tag_name().name().to_owned(),
        namespace: node.tag_name().namespace().map(str::to_owned),
        attributes: node
            .attributes()
            .map(|attribute| (attribute.name().to_owned(), attribute.value().to_owned()))
            .collect(),
        children,
        base_dir: base_dir.to_path_buf(),
    })
}

fn include(node: &roxmltree::Node<'_, '_>, base_dir: &Path, depth: usize) -> Result<Content> {
    let href = node
        .attribute("href")
        .ok_or_else(|| Error::load(base_dir, "xi:include without href"))?;
    let path = base_dir.join(href);
    if depth >= MAX_INCLUDE_DEPTH {
        return Err(Error::load(&path, "xi:include nested too deeply"));
    }
    match node.attribute("parse").unwrap_or("xml") {
        "xml" => Ok(Content::Element(load_with_depth(&path, depth + 1)?)),
        "text" => Ok(Content::Text(
            fs::read_to_string(&path).map_err(|e| Error::load(&path, e))?,
        )),
        parse => Err(Error::load(&path, format!("unsupported parse=\"{}\"", parse))),
    }
}

fn is_stylesheet(root: &Element) -> bool {
    matches!(root.name(), "stylesheet" | "transform")
        && root.attribute("version") == Some("1.0")
        && root.namespace() == Some(XSLT_NAMESPACE)
}

/// Apply a stylesheet made of one `match="/"` template of literal result elements
fn apply_stylesheet(stylesheet: &Element, origin: &Path) -> Result<Element> {
    let template = stylesheet
        .elements()
        .find(|element| {
            element.namespace() == Some(XSLT_NAMESPACE)
                && element.name() == "template"
                && element.attribute("match") == Some("/")
        })
        .ok_or_else(|| Error::load(origin, "stylesheet has no template for \"/\""))?;
    let mut roots = transform(template.children(), origin)?
        .into_iter()
        .filter_map(|content| match content {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        });
    match (roots.next(), roots.next()) {
        (Some(root), None) => Ok(root),
        (None, _) => Err(Error::load(origin, "stylesheet produced no element")),
        (Some(_), Some(_)) => Err(Error::load(origin, "stylesheet produced more than one root")),
    }
}

fn transform(children: &[Content], origin: &Path) -> Result<Vec<Content>> {
    let mut output = Vec::new();
    for child in children {
        match child {
            // whitespace only text is stripped from stylesheets
            Content::Text(text) if text.trim().is_empty() => {}
            Content::Text(text) => output.push(Content::Text(text.clone())),
            Content::Element(element) if element.namespace() == Some(XSLT_NAMESPACE) => {
                match element.name() {
                    "text" => output.push(Content::Text(element.text())),
                    instruction => {
                        return Err(Error::load(
                            origin,
                            format!("unsupported XSLT instruction xsl:{}", instruction),
                        ))
                    }
                }
            }
            Content::Element(element) => output.push(Content::Element(Element {
                name: element.name.clone(),
                namespace: element.namespace.clone(),
                attributes: element.attributes.clone(),
                children: transform(&element.children, origin)?,
                base_dir: element.base_dir.clone(),
            })),
        }
    }
    Ok(output)
}

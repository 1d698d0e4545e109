//! Producing host elements.
//!
//! Pages are generated ahead of time; these render the custom tags the binders
//! later pick up. The descriptor travels as the element's text, so it only
//! needs `&` and `<` escaped to survive the HTML parser.

use crate::Error;
use crate::descriptor::Descriptor;

/// `<tag name=".." index="..">{descriptor}</tag>`
pub fn input_element(
    tag: &str,
    name: &str,
    index: usize,
    descriptor: &Descriptor,
) -> Result<String, Error> {
    let mut html = open_tag(tag, name, index);
    html.push_str(&escape_text(&descriptor.to_json()?));
    close_tag(&mut html, tag);
    Ok(html)
}

/// `<tag name=".." index=".."></tag>`
pub fn action_element(tag: &str, name: &str, index: usize) -> String {
    let mut html = open_tag(tag, name, index);
    close_tag(&mut html, tag);
    html
}

fn open_tag(tag: &str, name: &str, index: usize) -> String {
    format!(r#"<{tag} name="{}" index="{index}">"#, escape_attribute(name))
}

fn close_tag(html: &mut String, tag: &str) {
    html.push_str("</");
    html.push_str(tag);
    html.push('>');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

//! Markup serialization, used by the test scaffolding and demos. Attributes
//! serialize in document order; empty non-void elements self-close.

use super::*;

impl Document {
    pub fn markup(&self, node: NodeId) -> String {
        match self.kind(node) {
            NodeKind::Document | NodeKind::Fragment => {
                let mut out = String::new();
                for child in self.children(node) {
                    out.push_str(&self.markup(*child));
                }
                out
            }
            NodeKind::DocumentType {
                name,
                public_id,
                system_id,
            } => match (public_id.is_empty(), system_id.is_empty()) {
                (false, _) => {
                    format!("<!DOCTYPE {name} PUBLIC \"{public_id}\" \"{system_id}\">")
                }
                (true, false) => format!("<!DOCTYPE {name} SYSTEM \"{system_id}\">"),
                (true, true) => format!("<!DOCTYPE {name}>"),
            },
            NodeKind::Text(data) => escape_text(data),
            NodeKind::Comment(data) => format!("<!--{data}-->"),
            NodeKind::Cdata(data) => format!("<![CDATA[{data}]]>"),
            NodeKind::Pi { target, data } => {
                if data.is_empty() {
                    format!("<?{target}?>")
                } else {
                    format!("<?{target} {data}?>")
                }
            }
            NodeKind::Attr(attr) => {
                format!("{}=\"{}\"", attr.name.qualified(), escape_attr(&attr.value))
            }
            NodeKind::Element(element) => {
                let mut out = String::new();
                out.push('<');
                out.push_str(&element.name.qualified());
                for attr in self.attrs(node) {
                    if let Some(data) = self.attr_data(*attr) {
                        out.push(' ');
                        out.push_str(&data.name.qualified());
                        out.push_str("=\"");
                        out.push_str(&escape_attr(&data.value));
                        out.push('"');
                    }
                }
                if self.children(node).is_empty() {
                    out.push_str("/>");
                    return out;
                }
                out.push('>');
                for child in self.children(node) {
                    out.push_str(&self.markup(*child));
                }
                out.push_str("</");
                out.push_str(&element.name.qualified());
                out.push('>');
                out
            }
        }
    }
}

pub(crate) fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

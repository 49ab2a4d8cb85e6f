//! Placeholder rendering for messages, webhook URLs and webhook bodies
//!
//! Supported placeholders (whitespace inside the braces is ignored):
//!
//! | Placeholder          | Value                   |
//! |----------------------|-------------------------|
//! | `{{ .Domain }}`      | Updated hostname        |
//! | `{{ .CurrentIP }}`   | Newly applied address   |
//! | `{{ .IPType }}`      | `IPv4` or `IPv6`        |
//!
//! Unknown placeholders are left untouched.

use dnsync_core::config::IpType;
use std::net::IpAddr;

/// Values substituted into a template
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub domain: &'a str,
    pub current_ip: IpAddr,
    pub ip_type: IpType,
}

impl<'a> TemplateContext<'a> {
    pub fn new(domain: &'a str, current_ip: IpAddr, ip_type: IpType) -> Self {
        Self {
            domain,
            current_ip,
            ip_type,
        }
    }

    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            ".Domain" => Some(self.domain.to_string()),
            ".CurrentIP" => Some(self.current_ip.to_string()),
            ".IPType" => Some(self.ip_type.to_string()),
            _ => None,
        }
    }
}

/// Render `template` with the values of `ctx`
pub fn render(template: &str, ctx: &TemplateContext<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            // Unterminated placeholder: copy verbatim
            out.push_str(&rest[start..]);
            return out;
        };

        match ctx.lookup(after_open[..end].trim()) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}

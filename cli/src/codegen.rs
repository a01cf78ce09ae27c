//! Templates for the files `ice-rpc init` writes.

use heck::{ToSnakeCase, ToUpperCamelCase};
use ice_rpc::MethodSet;
use std::collections::HashMap;

/// Everything the client module template needs.
pub struct ClientTemplate<'a> {
    pub source_name: &'a str,
    pub crate_path: &'a str,
    pub client_name: &'a str,
    pub type_id: Option<&'a str>,
    pub methods: &'a MethodSet,
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// `self`, `Self`, `super` and `crate` cannot be raw identifiers.
const RESERVED: &[&str] = &["self", "super", "crate"];

/// Associated functions every `ice_client!` struct already has.
const CLIENT_FUNCTIONS: &[&str] = &["new", "dispatcher", "reconnect", "tcp"];

/// Rust function name for a remote operation name.
pub fn method_ident(remote: &str) -> String {
    let snake = remote.to_snake_case();
    if RESERVED.contains(&snake.as_str()) {
        format!("{snake}_")
    } else if KEYWORDS.contains(&snake.as_str()) {
        format!("r#{snake}")
    } else if snake.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{snake}")
    } else {
        snake
    }
}

/// Default client struct name for an interface, e.g. `IBusiness` ->
/// `IBusinessClient`.
pub fn client_name(interface: &str) -> String {
    format!("{}Client", interface.to_upper_camel_case())
}

/// The method list artifact: a tab-indented JSON array.
pub fn render_method_list(methods: &MethodSet) -> Result<String, serde_json::Error> {
    let mut out = methods.to_json_pretty()?;
    out.push('\n');
    Ok(out)
}

/// The client module: one `ice_client!` invocation.
pub fn render_client_module(template: &ClientTemplate<'_>) -> Result<String, String> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut entries = String::new();
    for remote in template.methods.iter() {
        let ident = method_ident(remote);
        if CLIENT_FUNCTIONS.contains(&ident.as_str()) {
            return Err(format!(
                "operation `{remote}` maps to `{ident}`, which the generated client already defines"
            ));
        }
        if let Some(previous) = seen.insert(ident.clone(), remote) {
            return Err(format!(
                "operations `{previous}` and `{remote}` both map to `{ident}`"
            ));
        }
        entries.push_str(&format!("        \"{remote}\" => {ident},\n"));
    }

    let (doc, type_id) = match template.type_id {
        Some(type_id) => (
            format!("    /// Client for `{type_id}`.\n"),
            format!(": \"{type_id}\""),
        ),
        None => (String::new(), String::new()),
    };

    Ok(format!(
        r#"//! Generated by ice-rpc from `{source}`. Do not edit.
//!
//! ```ignore
//! let client = {client}::tcp(&config);
//! let result = client.{example}(serde_json::json!({{}})).await?;
//! ```

{krate}::ice_client! {{
{doc}    pub struct {client}{type_id} {{
{entries}    }}
}}
"#,
        source = template.source_name,
        krate = template.crate_path,
        client = template.client_name,
        example = template
            .methods
            .iter()
            .next()
            .map(method_ident)
            .unwrap_or_else(|| "reconnect".to_string()),
        doc = doc,
        type_id = type_id,
        entries = entries,
    ))
}

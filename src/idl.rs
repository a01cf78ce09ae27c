//! Scanner for `.ice` interface definitions.
//!
//! Only what code generation needs is recognized: `module` and `interface`
//! nesting, and operations declared as `void Name(...)`. Everything else
//! (types, parameters, metadata) is skipped.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Enclosing modules, outermost first
    pub modules: Vec<String>,
    pub name: String,
    /// Operation names in declaration order
    pub methods: Vec<String>,
}

impl Interface {
    /// Scoped type id, e.g. `::business::IBusiness`
    pub fn type_id(&self) -> String {
        let mut id = String::new();
        for module in &self.modules {
            id.push_str("::");
            id.push_str(module);
        }
        id.push_str("::");
        id.push_str(&self.name);
        id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IceFile {
    pub interfaces: Vec<Interface>,
}

impl IceFile {
    /// All operation names in source order.
    pub fn method_names(&self) -> Vec<String> {
        self.interfaces
            .iter()
            .flat_map(|interface| interface.methods.iter().cloned())
            .collect()
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Punct(char),
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split source into identifiers and punctuation, dropping whitespace,
/// comments and string literals.
fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = '\0';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' => {
                let mut escaped = false;
                for (_, c) in chars.by_ref() {
                    match c {
                        _ if escaped => escaped = false,
                        '\\' => escaped = true,
                        '"' => break,
                        _ => {}
                    }
                }
            }
            c if is_ident_char(c) => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !is_ident_char(next) {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Ident(&source[start..end]));
            }
            other => tokens.push(Token::Punct(other)),
        }
    }
    tokens
}

enum Scope {
    Module(String),
    Interface(usize),
    Other,
}

/// Parse `.ice` source into its interfaces and their `void` operations.
pub fn parse(source: &str) -> IceFile {
    let tokens = tokenize(source);
    let mut file = IceFile::default();
    let mut scopes: Vec<Scope> = Vec::new();
    // Scope opened by the next `{`, set by a `module` or `interface` header.
    let mut opening: Option<Scope> = None;
    let mut i = 0;

    while i < tokens.len() {
        match (&tokens[i], tokens.get(i + 1)) {
            (Token::Ident("module"), Some(Token::Ident(name))) => {
                opening = Some(Scope::Module((*name).to_string()));
                i += 2;
                continue;
            }
            (Token::Ident("interface" | "class"), Some(Token::Ident(name))) => {
                // Forward declarations end with `;` and never open a scope.
                let modules = scopes
                    .iter()
                    .filter_map(|s| match s {
                        Scope::Module(m) => Some(m.clone()),
                        _ => None,
                    })
                    .collect();
                file.interfaces.push(Interface {
                    modules,
                    name: (*name).to_string(),
                    methods: Vec::new(),
                });
                opening = Some(Scope::Interface(file.interfaces.len() - 1));
                i += 2;
                continue;
            }
            (Token::Punct('{'), _) => {
                scopes.push(opening.take().unwrap_or(Scope::Other));
            }
            (Token::Punct('}'), _) => {
                scopes.pop();
            }
            (Token::Punct(';'), _) => {
                if let Some(Scope::Interface(_)) = opening.take() {
                    file.interfaces.pop();
                }
            }
            (Token::Ident("void"), Some(Token::Ident(name)))
                if matches!(tokens.get(i + 2), Some(Token::Punct('('))) =>
            {
                if let Some(Scope::Interface(index)) = scopes.last() {
                    file.interfaces[*index].methods.push((*name).to_string());
                }
                i += 2;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    file
}

/// Operation names declared in `source`, in order.
pub fn extract_method_names(source: &str) -> Vec<String> {
    parse(source).method_names()
}

//! `#[shape(...)]` attribute parsing.

use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitInt, LitStr, Token};

/// Case conversion applied by `rename_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    SnakeCase,
    CamelCase,
    LowerCase,
    UpperCase,
    ScreamingSnakeCase,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        match lit.value().as_str() {
            "snake_case" => Ok(Self::SnakeCase),
            "camelCase" => Ok(Self::CamelCase),
            "lowercase" => Ok(Self::LowerCase),
            "UPPERCASE" => Ok(Self::UpperCase),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnakeCase),
            other => Err(syn::Error::new(
                lit.span(),
                format!(
                    "unknown rename rule `{other}`, expected one of \
                     snake_case, camelCase, lowercase, UPPERCASE, SCREAMING_SNAKE_CASE"
                ),
            )),
        }
    }

    /// Rename a field or variant identifier.
    pub fn apply(self, ident: &str) -> String {
        let words = split_words(ident);
        match self {
            Self::SnakeCase => words.join("_"),
            Self::ScreamingSnakeCase => words.join("_").to_uppercase(),
            Self::LowerCase => words.concat(),
            Self::UpperCase => words.concat().to_uppercase(),
            Self::CamelCase => words
                .iter()
                .enumerate()
                .map(|(i, word)| if i == 0 { word.clone() } else { capitalize(word) })
                .collect(),
        }
    }
}

/// Lowercase words of a `snake_case` or `PascalCase` identifier.
fn split_words(ident: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in ident.chars() {
        if c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.extend(c.to_lowercase());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Doc comment lines joined with spaces.
pub fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let text = attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| {
            if let syn::Meta::NameValue(nv) = &a.meta {
                if let syn::Expr::Lit(lit) = &nv.value {
                    if let syn::Lit::Str(s) = &lit.lit {
                        return Some(s.value().trim().to_string());
                    }
                }
            }
            None
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

fn usize_value(meta: &ParseNestedMeta) -> syn::Result<usize> {
    let lit: LitInt = meta.value()?.parse()?;
    lit.base10_parse()
}

fn i64_value(meta: &ParseNestedMeta) -> syn::Result<i64> {
    let input = meta.value()?;
    let negative = input.peek(Token![-]);
    if negative {
        input.parse::<Token![-]>()?;
    }
    let lit: LitInt = input.parse()?;
    let magnitude: i128 = lit.base10_parse()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|_| syn::Error::new(lit.span(), "bound does not fit in i64"))
}

fn for_each_shape_attr(
    attrs: &[Attribute],
    mut f: impl FnMut(ParseNestedMeta) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs.iter().filter(|a| a.path().is_ident("shape")) {
        attr.parse_nested_meta(&mut f)?;
    }
    Ok(())
}

/// Attributes on the struct or enum itself.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    pub description: Option<String>,
    pub rename_all: Option<RenameRule>,
}

impl ContainerAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for_each_shape_attr(attrs, |meta| {
            if meta.path.is_ident("description") {
                out.description = Some(string_value(&meta)?);
            } else if meta.path.is_ident("rename_all") {
                let lit: LitStr = meta.value()?.parse()?;
                out.rename_all = Some(RenameRule::parse(&lit)?);
            } else {
                return Err(meta.error("unknown `shape` container attribute"));
            }
            Ok(())
        })?;
        if out.description.is_none() {
            out.description = doc_comment(attrs);
        }
        Ok(out)
    }
}

/// Attributes on a named field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    pub description: Option<String>,
    pub ignore: bool,
    pub default: bool,
    pub rename: Option<String>,
    pub pattern: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
}

impl FieldAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for_each_shape_attr(attrs, |meta| {
            let path = &meta.path;
            if path.is_ident("description") {
                out.description = Some(string_value(&meta)?);
            } else if path.is_ident("ignore") {
                out.ignore = true;
            } else if path.is_ident("default") {
                out.default = true;
            } else if path.is_ident("rename") {
                out.rename = Some(string_value(&meta)?);
            } else if path.is_ident("pattern") {
                out.pattern = Some(string_value(&meta)?);
            } else if path.is_ident("min_length") {
                out.min_length = Some(usize_value(&meta)?);
            } else if path.is_ident("max_length") {
                out.max_length = Some(usize_value(&meta)?);
            } else if path.is_ident("minimum") {
                out.minimum = Some(i64_value(&meta)?);
            } else if path.is_ident("maximum") {
                out.maximum = Some(i64_value(&meta)?);
            } else {
                return Err(meta.error("unknown `shape` field attribute"));
            }
            Ok(())
        })?;
        if out.description.is_none() {
            out.description = doc_comment(attrs);
        }
        Ok(out)
    }
}

/// Attributes on an enum variant.
#[derive(Debug, Default)]
pub struct VariantAttrs {
    pub rename: Option<String>,
}

impl VariantAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for_each_shape_attr(attrs, |meta| {
            if meta.path.is_ident("rename") {
                out.rename = Some(string_value(&meta)?);
            } else {
                return Err(meta.error("unknown `shape` variant attribute"));
            }
            Ok(())
        })?;
        Ok(out)
    }
}

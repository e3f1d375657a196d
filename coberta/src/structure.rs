use std::fs;
use std::path::Path;

use proc_macro2::LineColumn;
use syn::spanned::Spanned;

use crate::error::CobertaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourcePos {
    pub line: u32,
    pub col: u32,
}

impl SourcePos {
    fn from_line_column(position: LineColumn) -> SourcePos {
        // proc-macro2 columns are 0-based; the profile format counts from 1.
        SourcePos {
            line: position.line as u32,
            col: position.column as u32 + 1,
        }
    }
}

// One top-level function or method, spanning the whole declaration including
// its body. `receiver` is the base name of the impl self type for methods,
// absent for free functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub receiver: Option<String>,
    pub start: SourcePos,
    pub end: SourcePos,
}

pub trait StructureProvider {
    fn declarations(&self, path: &Path) -> Result<Vec<Declaration>, CobertaError>;
}

#[derive(Debug, Default)]
pub struct SynStructure;

impl StructureProvider for SynStructure {
    fn declarations(&self, path: &Path) -> Result<Vec<Declaration>, CobertaError> {
        let source = fs::read_to_string(path).map_err(|source| CobertaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        list_declarations(&source).map_err(|err| CobertaError::SourceParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

pub fn list_declarations(source: &str) -> Result<Vec<Declaration>, syn::Error> {
    let file = syn::parse_file(source)?;
    let mut declarations = Vec::new();
    for item in &file.items {
        match item {
            syn::Item::Fn(function_item) => {
                declarations.push(declaration_of(
                    function_item.sig.ident.to_string(),
                    None,
                    function_item.span(),
                ));
            }
            syn::Item::Impl(impl_item) => {
                let receiver = self_type_name(impl_item.self_ty.as_ref());
                for member in &impl_item.items {
                    if let syn::ImplItem::Fn(method_item) = member {
                        declarations.push(declaration_of(
                            method_item.sig.ident.to_string(),
                            receiver.clone(),
                            method_item.span(),
                        ));
                    }
                }
            }
            _ => {}
        }
    }
    Ok(declarations)
}

fn declaration_of(
    name: String,
    receiver: Option<String>,
    span: proc_macro2::Span,
) -> Declaration {
    Declaration {
        name,
        receiver,
        start: SourcePos::from_line_column(span.start()),
        end: SourcePos::from_line_column(span.end()),
    }
}

// `&Type1`, `&mut Type1` and path-qualified spellings all resolve to `Type1`,
// so shared and exclusive receivers of one type land in the same class.
fn self_type_name(self_type: &syn::Type) -> Option<String> {
    match self_type {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        syn::Type::Reference(reference) => self_type_name(&reference.elem),
        syn::Type::Group(group) => self_type_name(&group.elem),
        syn::Type::Paren(paren) => self_type_name(&paren.elem),
        _ => None,
    }
}

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]

use lazy_static::lazy_static;
use pegkit::compiler::parse_peg;
use pegkit::generators::gen_rust_token_stream;
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use regex::Regex;
use std::env;
use std::fs;
use std::path::PathBuf;
use syn::{Ident, ItemMod, Visibility};

lazy_static! {
    static ref ATTR_CONTENT: Option<Regex> =
        Regex::new("^filename\\s*=\\s*\"(?P<filename>[^\"]+)\"$").ok();
}

/// Fill an empty inline module with a parser generated from a grammar file
///
/// The file's path starts from the calling crate's `src` directory:
///
/// ```ignore
/// #[pegkit_grammar(filename = "grammars/calc.peg")]
/// mod calc {}
///
/// let value = calc::parse("1 + 2", &Extensions::new());
/// ```
#[proc_macro_attribute]
pub fn pegkit_grammar(attr: TokenStream, item: TokenStream) -> TokenStream {
    match expand(attr, item) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(message) => TokenStream::from(
            syn::Error::new(Span::call_site(), message).to_compile_error(),
        ),
    }
}

fn expand(attr: TokenStream, item: TokenStream) -> Result<proc_macro2::TokenStream, String> {
    let (mod_ident, mod_vis) = parse_input_mod(item)?;

    let grammar_file = parse_filename_attr(attr)?;

    if !grammar_file.exists() {
        return Err(format!(
            "Grammar file was not found at path '{}' (tip: path starts from your crate's \"src\" directory)",
            grammar_file.display()
        ));
    }

    let generated_rust = grammar_to_rust(&grammar_file)?;

    Ok(quote! {
        #mod_vis mod #mod_ident {
            #generated_rust
        }
    })
}

fn parse_input_mod(item: TokenStream) -> Result<(Ident, Visibility), String> {
    let item = syn::parse::<ItemMod>(item).map_err(|_| {
        "This macro must be used on a module which will be filled with the grammar's parser".to_string()
    })?;

    let empty_inline = matches!(&item.content, Some((_, items)) if items.is_empty());

    if !empty_inline {
        return Err(format!(
            "This macro must be used on an inline, empty module (e.g. 'mod {} {{}}')",
            item.ident
        ));
    }

    Ok((item.ident, item.vis))
}

fn parse_filename_attr(attr: TokenStream) -> Result<PathBuf, String> {
    let attr = attr.to_string();

    let filename = ATTR_CONTENT
        .as_ref()
        .and_then(|pattern| pattern.captures(&attr))
        .and_then(|captured| captured.name("filename"))
        .ok_or_else(|| {
            "Please provide a grammar file path under the form: #[pegkit_grammar(filename = \"<path>\")]"
                .to_string()
        })?;

    let manifest_dir = env::var("CARGO_MANIFEST_DIR")
        .map_err(|_| "Cannot locate the calling crate (CARGO_MANIFEST_DIR is not set)".to_string())?;

    let mut grammar_file = PathBuf::from(manifest_dir);
    grammar_file.push("src");
    grammar_file.push(filename.as_str());

    Ok(grammar_file)
}

fn grammar_to_rust(grammar_file: &PathBuf) -> Result<proc_macro2::TokenStream, String> {
    let grammar_src = fs::read_to_string(grammar_file)
        .map_err(|err| format!("Provided file could not be read: {}", err))?;

    let grammar =
        parse_peg(&grammar_src).map_err(|err| format!("Failed to compile grammar: {}", err))?;

    gen_rust_token_stream(&grammar).map_err(|err| format!("Failed to generate parser: {}", err))
}

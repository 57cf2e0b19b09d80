//! Procedural macros shared by the gpkgtiles crates.
//!
//! The only macro exported here is [`macro@context`], which wraps the body of a function
//! returning `anyhow::Result` and attaches a formatted context message to every error
//! leaving that function:
//!
//! ```ignore
//! #[context("adding tile {column}/{row} to '{}'", tile_set.table_name)]
//! fn add_tile(&self, tile_set: &TileSet, column: u32, row: u32) -> Result<Tile> { ... }
//! ```
//!
//! The format arguments are evaluated *after* the body ran, so they may only refer to
//! arguments that the body does not move (references and `Copy` values).

mod args;

use args::ContextArgs;
use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::{ToTokens, quote};
use syn::parse_macro_input;

#[proc_macro_attribute]
pub fn context(args: TokenStream, input: TokenStream) -> TokenStream {
	let ContextArgs {
		move_token,
		format_args,
	} = parse_macro_input!(args);
	let mut function = parse_macro_input!(input as syn::ItemFn);

	let syn::ReturnType::Type(_, return_type) = &function.sig.output else {
		return syn::Error::new_spanned(&function.sig, "#[context] requires a function returning Result")
			.to_compile_error()
			.into();
	};

	let body = &function.block;
	let err = Ident::new("err", Span::mixed_site());

	let wrapped = if function.sig.asyncness.is_some() {
		let result = Ident::new("result", Span::mixed_site());
		quote! {
			let #result: #return_type = async #move_token { #body }.await;
			#result.map_err(|#err| #err.context(format!(#format_args)).into())
		}
	} else {
		let once = Ident::new("once", Span::mixed_site());
		quote! {
			// Moving a non-`Copy` value into the closure makes it `FnOnce`,
			// so the body may consume its arguments.
			let #once = ::core::iter::empty::<()>();
			(#move_token || -> #return_type {
				::core::mem::drop(#once);
				#body
			})().map_err(|#err| #err.context(format!(#format_args)).into())
		}
	};

	function.block.stmts = vec![syn::Stmt::Expr(syn::Expr::Verbatim(wrapped), None)];
	function.into_token_stream().into()
}

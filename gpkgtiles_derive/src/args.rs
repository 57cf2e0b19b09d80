use proc_macro2::TokenStream;
use syn::{
	Token,
	parse::{Parse, ParseStream},
};

/// Arguments of `#[context(...)]`: an optional leading `move,` followed by `format!` arguments.
#[derive(Debug)]
pub struct ContextArgs {
	pub move_token: Option<Token![move]>,
	pub format_args: TokenStream,
}

impl Parse for ContextArgs {
	fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
		let move_token = if input.peek(Token![move]) {
			let token = input.parse()?;
			input.parse::<Token![,]>()?;
			Some(token)
		} else {
			None
		};
		if input.is_empty() {
			return Err(input.error("expected a format string"));
		}
		Ok(Self {
			move_token,
			format_args: input.parse()?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::ContextArgs;
	use syn::parse_str;

	#[test]
	fn format_string_only() {
		let args: ContextArgs = parse_str(r#""opening '{}'", path"#).unwrap();
		assert!(args.move_token.is_none());
		assert_eq!(args.format_args.to_string(), r#""opening '{}'" , path"#);
	}

	#[test]
	fn leading_move() {
		let args: ContextArgs = parse_str(r#"move, "tile {column}""#).unwrap();
		assert!(args.move_token.is_some());
		assert_eq!(args.format_args.to_string(), r#""tile {column}""#);
	}

	#[test]
	fn move_without_comma_is_rejected() {
		let err = parse_str::<ContextArgs>(r#"move "tile""#).unwrap_err();
		assert!(err.to_string().contains(','), "unexpected error: {err}");
	}

	#[test]
	fn empty_arguments_are_rejected() {
		let err = parse_str::<ContextArgs>("").unwrap_err();
		assert_eq!(err.to_string(), "expected a format string");
	}
}

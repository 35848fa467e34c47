use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derive macro that makes a struct usable as a mapper record.
///
/// Generates an implementation of `remap_api::Record`:
///
/// - `schema()` / `fields()`: field table in declaration order, with each
///   field's scalar kind and tags.
/// - `get(position)` / `set(position, value)`: positional access through
///   `remap_api::Value`.
/// - `empty()`: a fresh `Default` instance.
///
/// The struct must implement `Default` and `Debug`.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Default, Debug)]
/// pub struct Quote {
///     #[remap(remapper = "0", db = "quote_id")]
///     pub id: u64,
///
///     #[remap(remapper = "1,omit")]
///     pub bid: f64,
/// }
/// ```
///
/// Every `key = "text"` pair inside `#[remap(...)]` declares a tag: the key
/// is the tag name, the string is the tag text. Supported field types:
/// `bool`, `i8`..`i64`, `isize`, `u8`..`u64`, `usize`, `f32`, `f64`,
/// `String` and `remap_api::Value` (untyped).
#[proc_macro_derive(Record, attributes(remap))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record only supports structs",
            ));
        }
    };

    let mut info_tokens = Vec::new();
    let mut get_arms = Vec::new();
    let mut set_arms = Vec::new();

    for (position, field) in fields.iter().enumerate() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_name.unraw().to_string();
        let field_ty = &field.ty;

        // Parse #[remap(tag = "text", ...)] attributes.
        let mut tag_names = Vec::new();
        let mut tag_texts = Vec::new();
        for attr in &field.attrs {
            if !attr.path().is_ident("remap") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let tag = meta
                    .path
                    .get_ident()
                    .ok_or_else(|| meta.error("expected a tag name"))?
                    .unraw()
                    .to_string();
                let text: LitStr = meta.value()?.parse()?;
                if tag_names.contains(&tag) {
                    return Err(meta.error(format!("tag '{tag}' declared twice")));
                }
                tag_names.push(tag);
                tag_texts.push(text.value());
                Ok(())
            })?;
        }

        info_tokens.push(quote! {
            ::remap_api::FieldInfo {
                name: #field_name_str,
                kind: <#field_ty as ::remap_api::Scalar>::KIND,
                tags: &[ #( (#tag_names, #tag_texts) ),* ],
            }
        });

        get_arms.push(quote! {
            #position => ::core::option::Option::Some(
                ::remap_api::Scalar::into_value(::core::clone::Clone::clone(&self.#field_name))
            ),
        });

        set_arms.push(quote! {
            #position => {
                self.#field_name = <#field_ty as ::remap_api::Scalar>::from_value(value)?;
                ::core::result::Result::Ok(())
            }
        });
    }

    let expanded = quote! {
        impl ::remap_api::Record for #name {
            fn schema() -> &'static [::remap_api::FieldInfo] {
                static FIELDS: &[::remap_api::FieldInfo] = &[
                    #(#info_tokens),*
                ];
                FIELDS
            }

            fn fields(&self) -> &'static [::remap_api::FieldInfo] {
                <Self as ::remap_api::Record>::schema()
            }

            fn empty(&self) -> ::std::boxed::Box<dyn ::remap_api::Record> {
                ::std::boxed::Box::new(<Self as ::core::default::Default>::default())
            }

            fn get(&self, position: usize) -> ::core::option::Option<::remap_api::Value> {
                match position {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set(
                &mut self,
                position: usize,
                value: ::remap_api::Value,
            ) -> ::core::result::Result<(), ::remap_api::ValueError> {
                match position {
                    #(#set_arms)*
                    _ => ::core::result::Result::Err(
                        ::remap_api::ValueError::NoSuchPosition(position)
                    ),
                }
            }
        }
    };

    Ok(TokenStream::from(expanded))
}

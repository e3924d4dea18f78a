use proc_macro::{self, TokenStream};
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use super::utils::{get_enum_width, get_member_symbol};

pub fn derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let name = &ast.ident;
    match ast.data {
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(syn::FieldsNamed { ref named, .. }), ..
        }) => {
            let fields = named;

            let ty_widths = fields.iter().map(|f| {
                let ty = &f.ty;
                quote! { <#ty as ::cdcflow::Payload>::WIDTH }
            });

            // fields for `port_decls`.
            let port_decls_fields = fields.iter().map(|f| {
                let name = f.ident.as_ref().expect("named field");
                let ty = &f.ty;
                let symbol = get_member_symbol(&f.attrs, name);

                match symbol {
                    None => quote! { (None, <#ty as ::cdcflow::Payload>::port_decls()) },
                    Some(symbol) => {
                        quote! { (Some(#symbol.to_string()), <#ty as ::cdcflow::Payload>::port_decls()) }
                    }
                }
            });

            let expanded = quote! {
                impl #impl_generics ::cdcflow::Payload for #name #ty_generics #where_clause {
                    const WIDTH: usize = 0 #(+ #ty_widths)*;
                    fn port_decls() -> ::cdcflow::PortDecls {
                        ::cdcflow::PortDecls::Struct(vec![
                            #(#port_decls_fields,)*
                        ])
                    }
                }
            };

            expanded.into()
        }
        syn::Data::Enum(syn::DataEnum { ref variants, .. }) => {
            let variant_count = variants.iter().count();
            assert!(variant_count > 0, "{name}: Empty enums cannot be derived as `Payload`");
            for variant in variants {
                let variant_name = &variant.ident;
                assert!(
                    matches!(variant.fields, syn::Fields::Unit),
                    "{name}::{variant_name}: Only unit variants are allowed in a `Payload` enum"
                );
            }

            // Without an explicit width the enum takes `clog2(variants)` bits, and at least one.
            let width = match get_enum_width(&ast.attrs) {
                Some(width) => {
                    let width =
                        width.base10_parse::<usize>().unwrap_or_else(|_| panic!("{name}: Enum width should be usize"));
                    assert!(
                        variant_count <= 1 << width,
                        "{name}: {variant_count} variants do not fit in {width} bits"
                    );
                    quote! { #width }
                }
                None if variant_count == 1 => quote! { 1 },
                None => quote! { ::cdcflow::clog2(#variant_count) },
            };

            let expanded = quote! {
                impl #impl_generics ::cdcflow::Payload for #name #ty_generics #where_clause {
                    const WIDTH: usize = #width;
                    fn port_decls() -> ::cdcflow::PortDecls {
                        ::cdcflow::PortDecls::Bits(Self::WIDTH)
                    }
                }
            };

            expanded.into()
        }
        _ => panic!("{name}: `Payload` can only be derived for structs with named fields and unit enums"),
    }
}

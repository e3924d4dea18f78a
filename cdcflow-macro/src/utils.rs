use syn::{Attribute, Ident, Lit, LitInt};

pub(super) fn get_enum_width(attrs: &[Attribute]) -> Option<LitInt> {
    for attr in attrs {
        if let Ok(syn::Meta::List(nvs)) = attr.parse_meta() {
            if nvs.path.is_ident("width") {
                return nvs.nested.iter().find_map(|nv| match nv {
                    syn::NestedMeta::Lit(syn::Lit::Int(width)) => Some(width.clone()),
                    _ => None,
                });
            }
        }
    }
    None
}

/// Returns the port name of a member: the `#[member(name = "..")]` override if present, the member
/// identifier otherwise. An empty override yields `None`, merging the member into its parent's name.
pub(super) fn get_member_symbol(attrs: &[Attribute], name: &Ident) -> Option<Lit> {
    for attr in attrs {
        let nvs = match attr.parse_meta() {
            Ok(syn::Meta::List(nvs)) if nvs.path.is_ident("member") => nvs,
            _ => continue,
        };

        let meta = nvs.nested.iter().find_map(|nv| match nv {
            syn::NestedMeta::Meta(syn::Meta::NameValue(nv)) if nv.path.is_ident("name") => Some(nv.lit.clone()),
            _ => None,
        });

        let meta = match meta {
            Some(meta) => meta,
            None => continue,
        };

        return match meta {
            Lit::Str(ref s) => {
                if s.value().is_empty() {
                    None
                } else {
                    Some(meta)
                }
            }
            lit => panic!("expected string, found {:?}", lit),
        };
    }
    Some(Lit::new(proc_macro2::Literal::string(&format!("{}", name))))
}

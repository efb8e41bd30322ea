use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::quote;
use syn::{Attribute, Data, DeriveInput, LitStr, Token, parse_macro_input};

/// Macro that will generate Connection and Edge structs for you to use when returning lists.
///
/// For a struct `Todo`, generates `TodoRelayConnection` (GraphQL `TodoConnection`) and
/// `TodoRelayEdge` (GraphQL `TodoEdge`), along with the conversions from the connections built by
/// the `Paginator`.
#[proc_macro_derive(RelayConnection)]
pub fn macro_relay_connection_node(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let out = match input.data {
        Data::Struct(_s) => {
            let connection_gql_name = format!("{}Connection", input.ident);
            let connection_gql_desc = format!("Connection type for {}.", input.ident);
            let edge_gql_name = format!("{}Edge", input.ident);
            let edge_gql_desc = format!("Edge type for {}.", input.ident);
            let connection_name = Ident::new(
                &format!("{}RelayConnection", input.ident),
                Span::call_site(),
            );
            let edge_name = Ident::new(&format!("{}RelayEdge", input.ident), Span::call_site());
            let struct_name = input.ident;

            quote! {
                #[derive(juniper::GraphQLObject, Debug, Clone, Eq, PartialEq)]
                #[graphql(
                    name = #connection_gql_name,
                    description = #connection_gql_desc
                )]
                pub struct #connection_name {
                    /// Number of nodes matching the query, ignoring pagination.
                    pub total_count: i32,
                    pub edges: Vec<#edge_name>,
                    pub page_info: juniper_relay_pagination::PageInfo,
                }

                impl juniper_relay_pagination::RelayConnection for #connection_name {
                    type EdgeType = #edge_name;
                    type NodeType = #struct_name;

                    fn from_connection(
                        connection: juniper_relay_pagination::Connection<#struct_name>
                    ) -> Self {
                        Self {
                            total_count: connection.total_count,
                            edges: connection.edges.into_iter().map(|edge| {
                                <#edge_name as juniper_relay_pagination::RelayEdge>::new(
                                    edge.node,
                                    edge.cursor
                                )
                            }).collect(),
                            page_info: connection.page_info,
                        }
                    }
                }

                impl From<juniper_relay_pagination::Connection<#struct_name>> for #connection_name {
                    fn from(connection: juniper_relay_pagination::Connection<#struct_name>) -> Self {
                        <Self as juniper_relay_pagination::RelayConnection>::from_connection(connection)
                    }
                }

                #[derive(juniper::GraphQLObject, Debug, Clone, Eq, PartialEq)]
                #[graphql(
                    name = #edge_gql_name,
                    description = #edge_gql_desc
                )]
                pub struct #edge_name {
                    pub node: #struct_name,
                    pub cursor: juniper_relay_pagination::Cursor,
                }

                impl juniper_relay_pagination::RelayEdge for #edge_name {
                    type NodeType = #struct_name;
                    fn new(node: Self::NodeType, cursor: juniper_relay_pagination::Cursor) -> Self {
                        Self { node, cursor }
                    }
                }
            }
        }
        _ => quote! {},
    };

    out.into()
}

/// Macro for extending an order-field Enum with the traits required for it to be looked up in an
/// `OrderRegistry`.
///
/// Implements `Display` and `FromStr` using the variant's GraphQL name: the `#[graphql(name)]`
/// override if present, otherwise the variant name in SCREAMING_SNAKE_CASE, as Juniper names
/// enum values.
///
/// Allows:
///
/// ```nocompile
/// use juniper_relay_pagination::OrderFieldName;
///
/// #[derive(GraphQLEnum, OrderFieldName)]
/// enum TodoOrderField {
///     CreatedAt,
///     Priority,
/// }
/// ```
///
/// `TodoOrderField::CreatedAt.to_string()` is now `"CREATED_AT"`, matching the field registered as
/// `OrderField::new("CREATED_AT", ...)`.
///
#[proc_macro_derive(OrderFieldName)]
pub fn macro_order_field_name(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let out = match input.data {
        Data::Enum(e) => {
            let enum_name = input.ident;
            let names = match e
                .variants
                .iter()
                .map(|v| {
                    let name = graphql_name(&v.attrs)?
                        .unwrap_or_else(|| upper_snake_case(&v.ident.to_string()));
                    Ok((v.ident.clone(), name))
                })
                .collect::<syn::Result<Vec<_>>>()
            {
                Ok(names) => names,
                Err(err) => return err.to_compile_error().into(),
            };

            let display_variants = names.iter().map(|(v, name)| {
                quote! {
                    #enum_name::#v => { write!(f, #name) }
                }
            });
            let fromstr_variants = names.iter().map(|(v, name)| {
                quote! {
                    #name => Ok(#enum_name::#v)
                }
            });

            quote! {
                impl std::fmt::Display for #enum_name {
                    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                        match self {
                            #(#display_variants),*
                        }
                    }
                }

                impl std::str::FromStr for #enum_name {
                    type Err = String;
                    fn from_str(s: &str) -> Result<Self, Self::Err> {
                        match s {
                            #(#fromstr_variants),*,
                            other => Err(format!("{} is not a valid order field", other))
                        }
                    }
                }
            }
        }
        _ => quote! {},
    };

    out.into()
}

/// Reads the `name` out of a `#[graphql(...)]` attribute.
fn graphql_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("graphql")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
            } else if meta.input.peek(Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }
    Ok(name)
}

fn upper_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let mut prev: Option<char> = None;
    for c in ident.chars() {
        if c.is_uppercase()
            && let Some(p) = prev
            && (p.is_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.extend(c.to_uppercase());
        prev = Some(c);
    }
    out
}

//! Cursor connections for paginated listings.
//!
//! A cursor is the base64 encoding of `cursor:<id>`; clients must treat it as
//! opaque.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use juniper::GraphQLObject;

use super::Context;
use crate::models::{Customer, Keyed, Order, Page, PageRequest, Product};
use crate::services::{ValidationError, validation};

const CURSOR_PREFIX: &str = "cursor:";

/// Encode an entity key as a cursor.
#[must_use]
pub fn encode_cursor(key: i32) -> String {
    STANDARD.encode(format!("{CURSOR_PREFIX}{key}"))
}

/// Decode a cursor produced by [`encode_cursor`].
///
/// # Errors
///
/// Returns [`ValidationError::InvalidCursor`] for anything else.
pub fn decode_cursor(cursor: &str) -> Result<i32, ValidationError> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|_| ValidationError::InvalidCursor)?;
    let text = String::from_utf8(bytes).map_err(|_| ValidationError::InvalidCursor)?;
    text.strip_prefix(CURSOR_PREFIX)
        .and_then(|key| key.parse().ok())
        .ok_or(ValidationError::InvalidCursor)
}

/// Build a page request from connection arguments.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPageSize`] or
/// [`ValidationError::InvalidCursor`].
pub fn page_request(
    ctx: &Context,
    first: Option<i32>,
    after: Option<&str>,
) -> Result<PageRequest, ValidationError> {
    let after = after.map(decode_cursor).transpose()?;
    let settings = ctx.settings();
    validation::page_request(
        first,
        after,
        settings.default_page_size,
        settings.max_page_size,
    )
}

/// Pagination state of a connection.
#[derive(Debug, Clone, PartialEq, Eq, GraphQLObject)]
pub struct PageInfo {
    pub has_next_page: bool,
    /// Cursor of the last edge, `null` for an empty page.
    pub end_cursor: Option<String>,
}

impl PageInfo {
    fn of<T: Keyed>(page: &Page<T>) -> Self {
        Self {
            has_next_page: page.has_next_page,
            end_cursor: page.end_key().map(encode_cursor),
        }
    }
}

macro_rules! define_connection {
    ($(#[$meta:meta])* $connection:ident, $edge:ident, $node:ty) => {
        /// An edge in a cursor connection.
        #[derive(Debug, Clone, GraphQLObject)]
        #[graphql(context = Context)]
        pub struct $edge {
            pub cursor: String,
            pub node: $node,
        }

        $(#[$meta])*
        #[derive(Debug, Clone, GraphQLObject)]
        #[graphql(context = Context)]
        pub struct $connection {
            pub edges: Vec<$edge>,
            pub page_info: PageInfo,
        }

        impl From<Page<$node>> for $connection {
            fn from(page: Page<$node>) -> Self {
                let page_info = PageInfo::of(&page);
                let edges = page
                    .items
                    .into_iter()
                    .map(|node| $edge {
                        cursor: encode_cursor(node.key()),
                        node,
                    })
                    .collect();
                Self { edges, page_info }
            }
        }
    };
}

define_connection!(
    /// A page of customers, ascending by ID.
    CustomerConnection,
    CustomerEdge,
    Customer
);
define_connection!(
    /// A page of products, ascending by ID.
    ProductConnection,
    ProductEdge,
    Product
);
define_connection!(
    /// A page of orders, ascending by ID.
    OrderConnection,
    OrderEdge,
    Order
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip() {
        assert_eq!(decode_cursor(&encode_cursor(42)), Ok(42));
    }

    #[test]
    fn test_cursor_is_opaque_base64() {
        assert_eq!(encode_cursor(1), "Y3Vyc29yOjE=");
    }

    #[test]
    fn test_rejects_foreign_cursor() {
        assert_eq!(decode_cursor("not base64!"), Err(ValidationError::InvalidCursor));
        let raw = STANDARD.encode("offset:5");
        assert_eq!(decode_cursor(&raw), Err(ValidationError::InvalidCursor));
    }
}

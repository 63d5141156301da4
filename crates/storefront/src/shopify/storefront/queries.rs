//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] with its
//! document, `Variables`, and `ResponseData` in a module named after it, the
//! same layout `#[derive(GraphQLQuery)]` generates. Wire types mirror the
//! selection sets exactly; `conversions` maps them to domain types.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

macro_rules! image_fields {
    () => {
        "url altText width height"
    };
}

macro_rules! money_fields {
    () => {
        "amount currencyCode"
    };
}

macro_rules! variant_fragment {
    () => {
        concat!(
            "fragment ProductVariantFields on ProductVariant {\n",
            "  id\n  title\n  availableForSale\n  sku\n",
            "  selectedOptions { name value }\n",
            "  image { ",
            image_fields!(),
            " }\n",
            "  price { ",
            money_fields!(),
            " }\n",
            "  compareAtPrice { ",
            money_fields!(),
            " }\n",
            "}\n"
        )
    };
}

/// Shared wire shapes.
pub mod common {
    use super::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Money {
        pub amount: String,
        pub currency_code: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Image {
        pub url: String,
        pub alt_text: Option<String>,
        pub width: Option<i64>,
        pub height: Option<i64>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Nodes<T> {
        pub nodes: Vec<T>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct UserError {
        pub field: Option<Vec<String>>,
        pub message: String,
    }
}

// =============================================================================
// ProductPage
// =============================================================================

/// Product detail query: product, media, variants, and shop metadata.
pub struct ProductPage;

pub mod product_page {
    use super::common::{Image, Money, Nodes};
    use super::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "ProductPage";

    pub const QUERY: &str = concat!(
        "query ProductPage($id: ID!, $variantCount: Int!, $country: CountryCode, $language: LanguageCode)\n",
        "  @inContext(country: $country, language: $language) {\n",
        "  product(id: $id) {\n",
        "    id\n    handle\n    title\n    vendor\n    description\n    descriptionHtml\n",
        "    options { name optionValues { name } }\n",
        "    media(first: 7) { nodes { ... on MediaImage { image { ",
        image_fields!(),
        " } } } }\n",
        "    variants(first: $variantCount) { nodes { ...ProductVariantFields } }\n",
        "    seo { title description }\n",
        "  }\n",
        "  shop {\n",
        "    name\n",
        "    primaryDomain { url host }\n",
        "    shippingPolicy { handle body }\n",
        "    refundPolicy { handle body }\n",
        "  }\n",
        "}\n",
        variant_fragment!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub id: String,
        pub variant_count: i64,
        pub country: String,
        pub language: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<Product>,
        pub shop: Shop,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Product {
        pub id: String,
        pub handle: String,
        pub title: String,
        pub vendor: String,
        pub description: String,
        pub description_html: String,
        pub options: Vec<ProductOption>,
        pub media: Nodes<MediaNode>,
        pub variants: Nodes<Variant>,
        pub seo: Seo,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductOption {
        pub name: String,
        pub option_values: Vec<OptionValue>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct OptionValue {
        pub name: String,
    }

    /// Non-image media (video, 3D models) comes back as an empty object.
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct MediaNode {
        #[serde(default)]
        pub image: Option<Image>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variant {
        pub id: String,
        pub title: String,
        pub available_for_sale: bool,
        pub sku: Option<String>,
        pub selected_options: Vec<SelectedOption>,
        pub image: Option<Image>,
        pub price: Money,
        pub compare_at_price: Option<Money>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct SelectedOption {
        pub name: String,
        pub value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Seo {
        pub title: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Shop {
        pub name: String,
        pub primary_domain: PrimaryDomain,
        pub shipping_policy: Option<ShopPolicy>,
        pub refund_policy: Option<ShopPolicy>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct PrimaryDomain {
        pub url: String,
        pub host: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ShopPolicy {
        pub handle: String,
        pub body: String,
    }
}

impl GraphQLQuery for ProductPage {
    type Variables = product_page::Variables;
    type ResponseData = product_page::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: product_page::QUERY,
            operation_name: product_page::OPERATION_NAME,
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// Product listing for the home page swimlane and product index.
pub struct Products;

pub mod products {
    use super::common::{Image, Money, Nodes};
    use super::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "Products";

    pub const QUERY: &str = concat!(
        "query Products($first: Int!, $country: CountryCode, $language: LanguageCode)\n",
        "  @inContext(country: $country, language: $language) {\n",
        "  products(first: $first, sortKey: BEST_SELLING) {\n",
        "    nodes {\n",
        "      id\n      handle\n      title\n      vendor\n      availableForSale\n",
        "      featuredImage { ",
        image_fields!(),
        " }\n",
        "      priceRange { minVariantPrice { ",
        money_fields!(),
        " } }\n",
        "      compareAtPriceRange { minVariantPrice { ",
        money_fields!(),
        " } }\n",
        "    }\n",
        "  }\n",
        "}\n"
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
        pub country: String,
        pub language: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Nodes<Product>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Product {
        pub id: String,
        pub handle: String,
        pub title: String,
        pub vendor: String,
        pub available_for_sale: bool,
        pub featured_image: Option<Image>,
        pub price_range: PriceRange,
        pub compare_at_price_range: PriceRange,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PriceRange {
        pub min_variant_price: Money,
    }
}

impl GraphQLQuery for Products {
    type Variables = products::Variables;
    type ResponseData = products::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: products::QUERY,
            operation_name: products::OPERATION_NAME,
        }
    }
}

// =============================================================================
// CartCreate
// =============================================================================

/// Creates the one-line cart whose `checkoutUrl` is the hosted checkout.
pub struct CartCreate;

pub mod cart_create {
    use super::common::UserError;
    use super::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "CartCreate";

    pub const QUERY: &str = concat!(
        "mutation CartCreate($input: CartInput!, $country: CountryCode, $language: LanguageCode)\n",
        "  @inContext(country: $country, language: $language) {\n",
        "  cartCreate(input: $input) {\n",
        "    cart { id checkoutUrl }\n",
        "    userErrors { field message }\n",
        "  }\n",
        "}\n"
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
        pub country: String,
        pub language: String,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartInput {
        pub lines: Vec<CartLineInput>,
        pub buyer_identity: CartBuyerIdentityInput,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineInput {
        pub merchandise_id: String,
        pub quantity: i64,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartBuyerIdentityInput {
        pub country_code: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<CartCreatePayload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartCreatePayload {
        pub cart: Option<Cart>,
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cart {
        pub id: String,
        pub checkout_url: String,
    }
}

impl GraphQLQuery for CartCreate {
    type Variables = cart_create::Variables;
    type ResponseData = cart_create::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: cart_create::QUERY,
            operation_name: cart_create::OPERATION_NAME,
        }
    }
}

// =============================================================================
// CartDiscountCodesUpdate
// =============================================================================

/// Replaces the discount codes on an existing cart.
pub struct CartDiscountCodesUpdate;

pub mod cart_discount_codes_update {
    use super::common::UserError;
    use super::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "CartDiscountCodesUpdate";

    pub const QUERY: &str = concat!(
        "mutation CartDiscountCodesUpdate($cartId: ID!, $discountCodes: [String!]!) {\n",
        "  cartDiscountCodesUpdate(cartId: $cartId, discountCodes: $discountCodes) {\n",
        "    cart { id discountCodes { code applicable } }\n",
        "    userErrors { field message }\n",
        "  }\n",
        "}\n"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub discount_codes: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_discount_codes_update: Option<CartDiscountCodesUpdatePayload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartDiscountCodesUpdatePayload {
        pub cart: Option<Cart>,
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cart {
        pub id: String,
        pub discount_codes: Vec<DiscountCode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct DiscountCode {
        pub code: String,
        pub applicable: bool,
    }
}

impl GraphQLQuery for CartDiscountCodesUpdate {
    type Variables = cart_discount_codes_update::Variables;
    type ResponseData = cart_discount_codes_update::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: cart_discount_codes_update::QUERY,
            operation_name: cart_discount_codes_update::OPERATION_NAME,
        }
    }
}

//! Demo catalog models
//!
//! The item, user, offer and invoice messages of the demo API, plus one
//! parameter schema per operation. Parameter schemas mix path, query,
//! header and body fields; the binder resolves each from its source.

use serde_json::json;

use crate::schema::{FieldSpec, FieldType, Pattern, SchemaRegistry, SchemaResult, SchemaSpec};

pub const ITEM: &str = "Item";
pub const ITEM2: &str = "Item2";
pub const ITEM4: &str = "Item4";
pub const ITEM5: &str = "Item5";
pub const ITEM6: &str = "Item6";
pub const ITEM7: &str = "Item7";
pub const ITEM8: &str = "Item8";
pub const ITEM10: &str = "Item10";
pub const ITEM11: &str = "Item11";
pub const IMAGE: &str = "Image";
pub const IMAGE6: &str = "Image6";
pub const USER: &str = "User";
pub const USER_IN: &str = "UserIn";
pub const USER_OUT: &str = "UserOut";
pub const OFFER: &str = "Offer";
pub const INVOICE: &str = "Invoice";
pub const INVOICE_EVENT: &str = "InvoiceEvent";
pub const INVOICE_EVENT_RECEIVED: &str = "InvoiceEventReceived";

/// Variants of the `model_name` path parameter.
pub const MODEL_NAMES: [&str; 3] = ["alexnet", "resnet", "lenet"];

/// Operation parameter schemas.
pub mod params {
    pub const READ_ITEM: &str = "ReadItemParams";
    pub const QUERY_LIST: &str = "QueryListParams";
    pub const DEFAULT_QUERY_LIST: &str = "DefaultQueryListParams";
    pub const DESCRIBED_QUERY: &str = "DescribedQueryParams";
    pub const ALIASED_QUERY: &str = "AliasedQueryParams";
    pub const DEPRECATED_QUERY: &str = "DeprecatedQueryParams";
    pub const USER_PATH: &str = "UserPathParams";
    pub const MODEL: &str = "ModelParams";
    pub const FILE_PATH: &str = "FilePathParams";
    pub const LIST_ITEMS: &str = "ListItemsParams";
    pub const CREATE_ITEM: &str = "CreateItemParams";
    pub const REPLACE_ITEM: &str = "ReplaceItemParams";
    pub const ITEM_PATH_QUERY: &str = "ItemPathQueryParams";
    pub const BOUNDED_ITEM: &str = "BoundedItemParams";
    pub const SIZED_ITEM: &str = "SizedItemParams";
    pub const OPTIONAL_BODY: &str = "OptionalBodyParams";
    pub const MULTI_BODY: &str = "MultiBodyParams";
    pub const IMPORTANCE_BODY: &str = "ImportanceBodyParams";
    pub const EMBEDDED_ITEM: &str = "EmbeddedItemParams";
    pub const EMBEDDED_ITEM2: &str = "EmbeddedItem2Params";
    pub const NESTED_ITEM: &str = "NestedItemParams";
    pub const CREATE_OFFER: &str = "CreateOfferParams";
    pub const IMAGES_BODY: &str = "ImagesBodyParams";
    pub const INDEX_WEIGHTS: &str = "IndexWeightsParams";
    pub const USER_AGENT_HEADER: &str = "UserAgentHeaderParams";
    pub const DEVICE_HEADER: &str = "DeviceHeaderParams";
    pub const TOKEN_HEADERS: &str = "TokenHeaderParams";
    pub const CREATE_USER: &str = "CreateUserParams";
    pub const STORED_ITEM: &str = "StoredItemParams";
    pub const TEAPOT_ITEM: &str = "TeapotItemParams";
    pub const COMMON: &str = "CommonParams";
    pub const CREATE_INVOICE: &str = "CreateInvoiceParams";
    pub const TIMESTAMPED_ITEM: &str = "TimestampedItemParams";
    pub const TASK: &str = "TaskParams";
    pub const QUERY_CHECK: &str = "QueryCheckParams";
}

/// Builds a registry holding every catalog schema.
pub fn catalog_registry() -> SchemaResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    register_models(&mut registry)?;
    register_params(&mut registry)?;
    Ok(registry)
}

fn string() -> FieldType {
    FieldType::String
}

fn description() -> FieldSpec {
    FieldSpec::new("description", string()).default_null()
}

fn tax() -> FieldSpec {
    FieldSpec::new("tax", FieldType::Float).default_null()
}

fn tag_set() -> FieldSpec {
    FieldSpec::new("tags", FieldType::set(string())).default(json!([]))
}

/// Registers the message models.
pub fn register_models(registry: &mut SchemaRegistry) -> SchemaResult<()> {
    let models = [
        SchemaSpec::builder(ITEM)
            .field(FieldSpec::new("name", string()))
            .field(description())
            .field(FieldSpec::new("price", FieldType::Float))
            .field(tax())
            .build()?,
        SchemaSpec::builder(USER)
            .field(FieldSpec::new("username", string()))
            .field(FieldSpec::new("full_name", string()).default_null())
            .build()?,
        SchemaSpec::builder(ITEM2)
            .field(FieldSpec::new("name", string()))
            .field(
                FieldSpec::new("description", string())
                    .default_null()
                    .title("The description of the item")
                    .max_length(300),
            )
            .field(
                FieldSpec::new("price", FieldType::Float)
                    .gt(0.0)
                    .description("The price must be greater than zero"),
            )
            .field(tax())
            .build()?,
        SchemaSpec::builder(ITEM4)
            .field(FieldSpec::new("name", string()))
            .field(description())
            .field(FieldSpec::new("price", FieldType::Float))
            .field(tax())
            .field(FieldSpec::new("tags", FieldType::sequence(string())).default(json!([])))
            .field(FieldSpec::new("tags2", FieldType::set(string())).default(json!([])))
            .build()?,
        SchemaSpec::builder(IMAGE)
            .field(FieldSpec::new("url", string()))
            .field(FieldSpec::new("name", string()))
            .build()?,
        SchemaSpec::builder(ITEM5)
            .field(FieldSpec::new("name", string()))
            .field(description())
            .field(FieldSpec::new("price", FieldType::Float))
            .field(tax())
            .field(tag_set())
            .field(FieldSpec::new("image", FieldType::object(IMAGE)).default_null())
            .build()?,
        SchemaSpec::builder(IMAGE6)
            .description("An image with a validated http(s) URL")
            .field(FieldSpec::new("url", FieldType::Url))
            .field(FieldSpec::new("name", string()))
            .build()?,
        SchemaSpec::builder(ITEM6)
            .field(FieldSpec::new("name", string()))
            .field(description())
            .field(FieldSpec::new("price", FieldType::Float))
            .field(tax())
            .field(tag_set())
            .field(FieldSpec::new("image", FieldType::object(IMAGE6)).default_null())
            .build()?,
        SchemaSpec::builder(ITEM7)
            .field(FieldSpec::new("name", string()))
            .field(description())
            .field(FieldSpec::new("price", FieldType::Float))
            .field(tax())
            .field(tag_set())
            .field(FieldSpec::new("images", FieldType::sequence(FieldType::object(IMAGE6))).default_null())
            .build()?,
        SchemaSpec::builder(ITEM8)
            .field(FieldSpec::new("name", string()))
            .field(description())
            .field(FieldSpec::new("price", FieldType::Float))
            .field(tax())
            .field(tag_set())
            .field(FieldSpec::new("images", FieldType::sequence(FieldType::object(IMAGE6))).default_null())
            .build()?,
        SchemaSpec::builder(OFFER)
            .field(FieldSpec::new("name", string()))
            .field(description())
            .field(FieldSpec::new("price", FieldType::Float))
            .field(FieldSpec::new("items", FieldType::sequence(FieldType::object(ITEM8))))
            .build()?,
        SchemaSpec::builder(USER_IN)
            .field(FieldSpec::new("username", string()))
            .field(FieldSpec::new("password", string()))
            .field(FieldSpec::new("email", FieldType::Email))
            .field(FieldSpec::new("full_name", string()).default_null())
            .build()?,
        SchemaSpec::builder(USER_OUT)
            .field(FieldSpec::new("username", string()))
            .field(FieldSpec::new("email", FieldType::Email))
            .field(FieldSpec::new("full_name", string()).default_null())
            .build()?,
        SchemaSpec::builder(ITEM10)
            .field(FieldSpec::new("name", string()))
            .field(description())
            .field(FieldSpec::new("price", FieldType::Float))
            .field(FieldSpec::new("tax", FieldType::Float).default(json!(10.5)))
            .field(FieldSpec::new("tags", FieldType::sequence(string())).default(json!([])))
            .field(FieldSpec::new("image", FieldType::object(IMAGE)))
            .build()?,
        SchemaSpec::builder(INVOICE)
            .field(FieldSpec::new("id", string()))
            .field(FieldSpec::new("title", string()).default_null())
            .field(FieldSpec::new("customer", string()))
            .field(FieldSpec::new("total", FieldType::Float))
            .build()?,
        SchemaSpec::builder(INVOICE_EVENT)
            .field(FieldSpec::new("description", string()))
            .field(FieldSpec::new("paid", FieldType::Bool))
            .build()?,
        SchemaSpec::builder(INVOICE_EVENT_RECEIVED)
            .field(FieldSpec::new("ok", FieldType::Bool))
            .build()?,
        SchemaSpec::builder(ITEM11)
            .field(FieldSpec::new("title", string()))
            .field(FieldSpec::new("timestamp", FieldType::Datetime))
            .field(description())
            .build()?,
    ];

    for model in models {
        registry.define(model)?;
    }
    Ok(())
}

fn item_id() -> FieldSpec {
    FieldSpec::path("item_id", FieldType::Int).title("The ID of the item to get")
}

fn search_query() -> FieldSpec {
    FieldSpec::query("q", string())
        .title("Query string")
        .description("Query string for the items to search in the database that have a good match")
}

/// Registers one parameter schema per demo operation.
pub fn register_params(registry: &mut SchemaRegistry) -> SchemaResult<()> {
    let fixed_query = Pattern::new("^fixedquery$")?;

    let schemas = [
        SchemaSpec::builder(params::READ_ITEM)
            .field(FieldSpec::path("item_id", FieldType::Int))
            .field(
                FieldSpec::query("q", string())
                    .min_length(3)
                    .max_length(50)
                    .pattern(fixed_query.clone()),
            )
            .field(FieldSpec::query("short", FieldType::Bool).default(json!(false)))
            .build()?,
        SchemaSpec::builder(params::QUERY_LIST)
            .field(FieldSpec::query("q", FieldType::sequence(string())).default_null())
            .build()?,
        SchemaSpec::builder(params::DEFAULT_QUERY_LIST)
            .field(FieldSpec::query("q", FieldType::sequence(string())).default(json!(["foo", "bar"])))
            .build()?,
        SchemaSpec::builder(params::DESCRIBED_QUERY)
            .field(search_query().default_null().min_length(3))
            .build()?,
        SchemaSpec::builder(params::ALIASED_QUERY)
            .field(FieldSpec::query("q", string()).default_null().alias("item-query"))
            .build()?,
        SchemaSpec::builder(params::DEPRECATED_QUERY)
            .field(
                search_query()
                    .default_null()
                    .alias("item-query")
                    .min_length(3)
                    .max_length(50)
                    .pattern(fixed_query)
                    .deprecated(),
            )
            .build()?,
        SchemaSpec::builder(params::USER_PATH)
            .field(FieldSpec::path("user_id", string()))
            .build()?,
        SchemaSpec::builder(params::MODEL)
            .field(FieldSpec::path("model_name", FieldType::enumeration(MODEL_NAMES)))
            .build()?,
        SchemaSpec::builder(params::FILE_PATH)
            .field(FieldSpec::path("file_path", string()))
            .build()?,
        SchemaSpec::builder(params::LIST_ITEMS)
            .field(FieldSpec::query("skip", FieldType::Int).default(json!(0)))
            .field(FieldSpec::query("limit", FieldType::Int).default(json!(10)))
            .build()?,
        SchemaSpec::builder(params::CREATE_ITEM)
            .field(FieldSpec::new("item", FieldType::object(ITEM)))
            .build()?,
        SchemaSpec::builder(params::REPLACE_ITEM)
            .field(FieldSpec::path("item_id", FieldType::Int))
            .field(FieldSpec::new("item", FieldType::object(ITEM)))
            .build()?,
        SchemaSpec::builder(params::ITEM_PATH_QUERY)
            .field(item_id())
            .field(FieldSpec::query("q", string()).default_null().alias("item-query"))
            .build()?,
        SchemaSpec::builder(params::BOUNDED_ITEM)
            .field(item_id().ge(1.0).le(100.0))
            .field(FieldSpec::query("q", string()))
            .build()?,
        SchemaSpec::builder(params::SIZED_ITEM)
            .field(item_id().ge(0.0).le(1000.0))
            .field(FieldSpec::query("q", string()))
            .field(FieldSpec::query("size", FieldType::Float).gt(0.0).lt(10.5))
            .build()?,
        SchemaSpec::builder(params::OPTIONAL_BODY)
            .field(item_id().ge(0.0).le(1000.0))
            .field(FieldSpec::query("q", string()).default_null())
            .field(FieldSpec::new("item", FieldType::object(ITEM)).default_null())
            .build()?,
        SchemaSpec::builder(params::MULTI_BODY)
            .field(FieldSpec::path("item_id", FieldType::Int))
            .field(FieldSpec::new("item", FieldType::object(ITEM)))
            .field(FieldSpec::new("user", FieldType::object(USER)))
            .build()?,
        SchemaSpec::builder(params::IMPORTANCE_BODY)
            .field(FieldSpec::path("item_id", FieldType::Int))
            .field(FieldSpec::new("item", FieldType::object(ITEM)))
            .field(FieldSpec::new("user", FieldType::object(USER)))
            .field(FieldSpec::new("importance", FieldType::Int))
            .build()?,
        SchemaSpec::builder(params::EMBEDDED_ITEM)
            .field(FieldSpec::path("item_id", FieldType::Int))
            .field(FieldSpec::new("item", FieldType::object(ITEM)).embed())
            .build()?,
        SchemaSpec::builder(params::EMBEDDED_ITEM2)
            .field(FieldSpec::path("item_id", FieldType::Int))
            .field(FieldSpec::new("item", FieldType::object(ITEM2)).embed())
            .build()?,
        SchemaSpec::builder(params::NESTED_ITEM)
            .field(FieldSpec::path("item_id", FieldType::Int))
            .field(FieldSpec::new("item", FieldType::object(ITEM7)))
            .build()?,
        SchemaSpec::builder(params::CREATE_OFFER)
            .field(FieldSpec::new("offer", FieldType::object(OFFER)))
            .build()?,
        SchemaSpec::builder(params::IMAGES_BODY)
            .field(FieldSpec::new("images", FieldType::sequence(FieldType::object(IMAGE6))))
            .build()?,
        SchemaSpec::builder(params::INDEX_WEIGHTS)
            .field(FieldSpec::new("weights", FieldType::mapping(FieldType::Int, FieldType::Float)))
            .build()?,
        SchemaSpec::builder(params::USER_AGENT_HEADER)
            .field(FieldSpec::header("user_agent", string()).default_null())
            .build()?,
        SchemaSpec::builder(params::DEVICE_HEADER)
            .field(FieldSpec::header("device", string()).alias("X-Liftit-Device"))
            .build()?,
        SchemaSpec::builder(params::TOKEN_HEADERS)
            .field(FieldSpec::header("x_token", FieldType::sequence(string())).default_null())
            .build()?,
        SchemaSpec::builder(params::CREATE_USER)
            .field(FieldSpec::new("user", FieldType::object(USER_IN)))
            .build()?,
        SchemaSpec::builder(params::STORED_ITEM)
            .field(FieldSpec::path("item_id", string()))
            .build()?,
        SchemaSpec::builder(params::TEAPOT_ITEM)
            .field(FieldSpec::path("item_id", FieldType::Int))
            .build()?,
        SchemaSpec::builder(params::COMMON)
            .field(FieldSpec::query("q", string()).default_null())
            .field(FieldSpec::query("skip", FieldType::Int).default(json!(0)))
            .field(FieldSpec::query("limit", FieldType::Int).default(json!(100)))
            .build()?,
        SchemaSpec::builder(params::CREATE_INVOICE)
            .field(FieldSpec::new("invoice", FieldType::object(INVOICE)))
            .field(FieldSpec::query("callback_url", FieldType::Url).default_null())
            .build()?,
        SchemaSpec::builder(params::TIMESTAMPED_ITEM)
            .field(FieldSpec::path("id", string()))
            .field(FieldSpec::new("item", FieldType::object(ITEM11)))
            .build()?,
        SchemaSpec::builder(params::TASK)
            .field(FieldSpec::path("task_id", string()))
            .build()?,
        SchemaSpec::builder(params::QUERY_CHECK)
            .field(FieldSpec::query("q", string()).default(json!("")))
            .build()?,
    ];

    for schema in schemas {
        registry.define(schema)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_builds_and_resolves() {
        let registry = catalog_registry().unwrap();
        assert!(registry.check_references().is_ok());
        assert!(registry.contains(ITEM10));
        assert!(registry.contains(params::READ_ITEM));
    }

    #[test]
    fn test_item_shape() {
        let registry = catalog_registry().unwrap();
        let item = registry.get(ITEM).unwrap();
        let names: Vec<&str> = item.field_names().collect();
        assert_eq!(names, vec!["name", "description", "price", "tax"]);
        assert!(item.field("name").unwrap().is_required());
        assert!(!item.field("tax").unwrap().is_required());
    }

    #[test]
    fn test_register_twice_fails() {
        let mut registry = catalog_registry().unwrap();
        let err = register_models(&mut registry).unwrap_err();
        assert_eq!(err.code(), "MG_DUPLICATE_SCHEMA");
    }
}

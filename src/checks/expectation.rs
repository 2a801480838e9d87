//! Assertions evaluated against an endpoint response.

use std::fmt;

use serde_json::Value;

use crate::http::ApiResponse;

/// Accepted forms of the body-level `status_code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCodeValue {
    /// `200` or `"200"`.
    Ok200,
    /// `true` or `"true"`.
    True,
}

impl StatusCodeValue {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Ok200 => value.as_u64() == Some(200) || value.as_str() == Some("200"),
            Self::True => value.as_bool() == Some(true) || value.as_str() == Some("true"),
        }
    }
}

/// One assertion about a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// The HTTP status equals the given code.
    HttpStatus(u16),
    /// The body's `status_code` field has the given value.
    StatusCode(StatusCodeValue),
    /// The raw body contains the given text.
    BodyContains(&'static str),
    /// `data.title` is a non-blank string.
    DetailTitle,
    /// `data[0].title` is a non-blank string.
    FirstTitle,
    /// Some element of `data` has a non-blank `title`.
    AnyTitle,
    /// `data` is a non-empty array.
    DataNotEmpty,
    /// `data` is a non-empty array whose every element has the named
    /// non-blank string field.
    EveryItemHas(&'static str),
    /// Every badge in `data` carries a name, level, rank and credit count.
    Badges,
    /// Every order has a positive id and at least one well-formed
    /// subscription item exists.
    Orders,
}

impl Expectation {
    /// Whether the expectation holds for `response`.
    #[must_use]
    pub fn holds(self, response: &ApiResponse) -> bool {
        match self {
            Self::HttpStatus(code) => response.status == code,
            Self::StatusCode(expected) => response
                .pointer("status_code")
                .is_some_and(|value| expected.matches(value)),
            Self::BodyContains(needle) => response.body.contains(needle),
            Self::DetailTitle => response.pointer("data.title").is_some_and(non_blank),
            Self::FirstTitle => response.pointer("data.0.title").is_some_and(non_blank),
            Self::AnyTitle => data_items(response)
                .is_some_and(|items| items.iter().any(|item| item.get("title").is_some_and(non_blank))),
            Self::DataNotEmpty => data_items(response).is_some_and(|items| !items.is_empty()),
            Self::EveryItemHas(field) => data_items(response).is_some_and(|items| {
                !items.is_empty() && items.iter().all(|item| item.get(field).is_some_and(non_blank))
            }),
            Self::Badges => data_items(response)
                .is_some_and(|items| !items.is_empty() && items.iter().all(badge_is_complete)),
            Self::Orders => data_items(response).is_some_and(|orders| orders_are_valid(orders)),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP status {code}"),
            Self::StatusCode(StatusCodeValue::Ok200) => f.write_str("status_code is 200"),
            Self::StatusCode(StatusCodeValue::True) => f.write_str("status_code is true"),
            Self::BodyContains(needle) => write!(f, "body contains '{needle}'"),
            Self::DetailTitle => f.write_str("detail title present"),
            Self::FirstTitle => f.write_str("first title present"),
            Self::AnyTitle => f.write_str("at least one title present"),
            Self::DataNotEmpty => f.write_str("data not empty"),
            Self::EveryItemHas(field) => write!(f, "every item has '{field}'"),
            Self::Badges => f.write_str("badge fields present"),
            Self::Orders => f.write_str("orders carry a valid subscription"),
        }
    }
}

/// The `data` array of the response body, if there is one.
pub(crate) fn data_items(response: &ApiResponse) -> Option<&Vec<Value>> {
    response.pointer("data").and_then(Value::as_array)
}

/// A string with at least one non-whitespace character.
pub(crate) fn non_blank(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.trim().is_empty())
}

/// Loose truthiness: anything but null, false, zero and the empty string.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn positive(value: &Value) -> bool {
    value.as_f64().is_some_and(|f| f > 0.0)
}

fn badge_is_complete(item: &Value) -> bool {
    let Some(badge) = item.get("badge") else {
        return false;
    };
    ["name", "level_name", "required_credits"]
        .iter()
        .all(|field| badge.get(field).is_some_and(truthy))
        && badge.get("level_rank").is_some()
}

fn orders_are_valid(orders: &[Value]) -> bool {
    let mut saw_subscription = false;
    for order in orders {
        if !order.get("id").is_some_and(positive) {
            return false;
        }
        let items = order
            .get("order_items")
            .and_then(Value::as_array)
            .map_or(&[] as &[Value], Vec::as_slice);
        for item in items.iter().filter(|item| is_subscription(item)) {
            let details = item.get("item_details");
            let valid = details
                .and_then(|d| d.get("subscription_name"))
                .is_some_and(non_blank)
                && details.and_then(|d| d.get("plan_duration")).is_some_and(positive)
                && item.get("discount_type").is_some_and(non_blank);
            if !valid {
                return false;
            }
            saw_subscription = true;
        }
    }
    saw_subscription
}

fn is_subscription(item: &Value) -> bool {
    item.get("item_type")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.eq_ignore_ascii_case("subscription"))
}

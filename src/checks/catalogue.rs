//! The post-login endpoint catalogue, in execution order.

use super::EndpointCheck;
use super::expectation::Expectation::{
    AnyTitle, Badges, BodyContains, DataNotEmpty, DetailTitle, EveryItemHas, FirstTitle,
    HttpStatus, Orders, StatusCode,
};
use super::expectation::{Expectation, StatusCodeValue};
use crate::http::{BearerScheme, Method};

const OK: Expectation = HttpStatus(200);
const CODE_200: Expectation = StatusCode(StatusCodeValue::Ok200);
const CODE_TRUE: Expectation = StatusCode(StatusCodeValue::True);

const TITLED: &[Expectation] = &[OK, FirstTitle];
const TITLED_200: &[Expectation] = &[OK, CODE_200, FirstTitle];
const LISTING: &[Expectation] = &[OK, CODE_200, DataNotEmpty, FirstTitle];

const RELATED_CONTENT_PATH: &str = "/api/dashboard/related_content/";
const RELATED_CONTENT_BODY: &str = r#"{"masterclass_id":135}"#;
const PROFILE_PATH: &str = "/api/user/myprofile/";

const fn get(
    name: &'static str,
    path: &'static str,
    expectations: &'static [Expectation],
) -> EndpointCheck {
    EndpointCheck {
        name,
        method: Method::Get,
        path,
        body: None,
        bearer: BearerScheme::Lowercase,
        send_app_type: true,
        send_accept: true,
        expectations,
    }
}

const fn post(
    name: &'static str,
    path: &'static str,
    body: &'static str,
    expectations: &'static [Expectation],
) -> EndpointCheck {
    EndpointCheck {
        method: Method::Post,
        body: Some(body),
        ..get(name, path, expectations)
    }
}

const fn track(name: &'static str, body: &'static str) -> EndpointCheck {
    post(name, "/api/dashboard/get_track/", body, TITLED_200)
}

const fn without_accept(check: EndpointCheck) -> EndpointCheck {
    EndpointCheck {
        send_accept: false,
        ..check
    }
}

/// Every post-login check, in the order a stress iteration runs them.
pub static CATALOGUE: [EndpointCheck; 27] = [
    without_accept(get("Profile API", PROFILE_PATH, &[OK, CODE_TRUE])),
    post(
        "Related Course API",
        RELATED_CONTENT_PATH,
        RELATED_CONTENT_BODY,
        &[OK, AnyTitle],
    ),
    get(
        "Course Details API",
        "/api/masterclass/details/?id=128",
        &[OK, DetailTitle, CODE_200],
    ),
    get(
        "Complimentary Course API",
        "/api/complimentary-course/?course_type=masterclass&page=1",
        TITLED,
    ),
    track(
        "Masterclass Track 1 API",
        r#"{"track":"enable_for_human_skills_in_the_age_of_ai"}"#,
    ),
    track("Masterclass Track 2 API", r#"{"track":"enable_for_ai_leadership"}"#),
    track("Masterclass Track 3 API", r#"{"track":"enable_for_generative_ai"}"#),
    without_accept(get(
        "Subscription API",
        "/api/promotion/subscription/",
        &[OK, CODE_200, EveryItemHas("subscription_name")],
    )),
    get(
        "Podcast Track 1 API",
        "/api/v2/tracks/6/courses/?course_type=podcast&page=1",
        TITLED,
    ),
    get(
        "Podcast Track 2 API",
        "/api/v2/tracks/7/courses/?course_type=podcast&page=1",
        TITLED,
    ),
    get(
        "Podcast Track 3 API",
        "/api/v2/tracks/8/courses/?course_type=podcast&page=1",
        TITLED,
    ),
    get(
        "Complimentary Podcast Course API",
        "/api/complimentary-course/?course_type=podcast&page=1",
        TITLED,
    ),
    get(
        "Essential Podcast Course API",
        "/api/dashboard/latest_podcast/?course_type=podcast&page=1",
        TITLED,
    ),
    get(
        "Nano Track 1 API",
        "/api/v2/tracks/6/courses/?course_type=nano_learning&page=1",
        TITLED,
    ),
    get(
        "Nano Track 2 API",
        "/api/v2/tracks/7/courses/?course_type=nano_learning&page=1",
        TITLED,
    ),
    get(
        "Nano Track 3 API",
        "/api/v2/tracks/8/courses/?course_type=nano_learning&page=1",
        TITLED,
    ),
    get("Nano Learning Page 1 API", "/api/nano_learning/?page=1", LISTING),
    get("Nano Learning Page 2 API", "/api/nano_learning/?page=2", LISTING),
    get("Nano Learning Page 3 API", "/api/nano_learning/?page=3", LISTING),
    EndpointCheck {
        send_app_type: false,
        ..get("Caira Badge Page API", "/api/user-badges/", &[OK, Badges])
    },
    get(
        "Course Library MM1 API",
        "/api/v2/library/?type=masterclass&page=1",
        LISTING,
    ),
    get(
        "Course Library MM2 API",
        "/api/v2/library/?type=masterclass&page=2",
        LISTING,
    ),
    get(
        "Course Library Podcast1 API",
        "/api/v2/library/?type=podcast&page=1",
        LISTING,
    ),
    get(
        "Course Library Podcast2 API",
        "/api/v2/library/?type=podcast&page=2",
        LISTING,
    ),
    get(
        "Course Library Nano1 API",
        "/api/v2/library/?type=nano&page=1",
        LISTING,
    ),
    get(
        "Course Library Nano2 API",
        "/api/v2/library/?type=nano&page=2",
        LISTING,
    ),
    get(
        "My Orders API",
        "/api/user/order/my_orders/",
        &[OK, CODE_TRUE, DataNotEmpty, Orders],
    ),
];

/// Number of leading catalogue entries run by the core scenario.
pub const CORE_STEP_COUNT: usize = 13;

/// The smoke scenario's only step.
pub static RELATED_CONTENT_SMOKE: EndpointCheck = EndpointCheck {
    bearer: BearerScheme::Canonical,
    ..post(
        "Related Content Smoke",
        RELATED_CONTENT_PATH,
        RELATED_CONTENT_BODY,
        &[OK, BodyContains("title")],
    )
};

/// One-off profile request made after login in the smoke scenario.
pub static PROFILE_PREFLIGHT: EndpointCheck = EndpointCheck {
    bearer: BearerScheme::Canonical,
    send_accept: false,
    ..get("Profile Preflight", PROFILE_PATH, &[OK])
};

/// Looks up a check by its step name.
#[must_use]
pub fn find(name: &str) -> Option<&'static EndpointCheck> {
    CATALOGUE
        .iter()
        .chain([&RELATED_CONTENT_SMOKE, &PROFILE_PREFLIGHT])
        .find(|check| check.name == name)
}

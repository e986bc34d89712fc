//! Behavioural coverage for the engine with in-memory providers.

use std::cell::RefCell;

use microscore_core::{Coordinate, ScoreResult};
use microscore_data::overpass::{OverpassElement, OverpassResponse};
use microscore_data::test_support::{Reply, StubGeocodeSource, StubOverpassTransport};
use microscore_data::{EngineConfig, MicroScoreEngine, Pacing};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const ADDRESS: &str = "Gorriti 450, Palermo";
const FIRST_VARIANT: &str = "Gorriti 450, Palermo, CABA, Argentina";
const FIRST_MIRROR: &str = "https://first.example/api/interpreter";
const SECOND_MIRROR: &str = "https://second.example/api/interpreter";

fn origin() -> Coordinate {
    Coordinate::new(-34.5889, -58.4301)
}

#[derive(Default)]
struct World {
    located: bool,
    rules: Vec<Rule>,
    result: Option<ScoreResult>,
    requests: Vec<(String, String)>,
}

enum Rule {
    Endpoint(&'static str, Reply),
    Query(&'static str, Reply),
}

#[fixture]
fn world() -> RefCell<World> {
    RefCell::new(World::default())
}

// --- Given steps ---

#[given("a geocoder that knows no addresses")]
fn geocoder_knows_nothing(#[from(world)] world: &RefCell<World>) {
    world.borrow_mut().located = false;
}

#[given("a geocoder that knows the address")]
fn geocoder_knows_address(#[from(world)] world: &RefCell<World>) {
    world.borrow_mut().located = true;
}

#[given("a park about 55 metres from it")]
fn park_next_door(#[from(world)] world: &RefCell<World>) {
    let park = OverpassResponse::new(vec![OverpassElement::way(
        11,
        origin().latitude + 0.0005,
        origin().longitude,
    )]);
    world
        .borrow_mut()
        .rules
        .push(Rule::Query("leisure", Reply::Elements(park)));
}

#[given("the first mirror rate-limits every request")]
fn first_mirror_refuses(#[from(world)] world: &RefCell<World>) {
    // Endpoint rules must win over query rules.
    world
        .borrow_mut()
        .rules
        .insert(0, Rule::Endpoint(FIRST_MIRROR, Reply::Status(429)));
}

// --- When steps ---

#[when("the address is scored")]
fn score_address(#[from(world)] world: &RefCell<World>) {
    let mut state = world.borrow_mut();

    let mut geocoder = StubGeocodeSource::new();
    if state.located {
        geocoder = geocoder.with_match(FIRST_VARIANT, origin());
    }
    let mut transport = StubOverpassTransport::new();
    for rule in state.rules.drain(..) {
        transport = match rule {
            Rule::Endpoint(endpoint, reply) => transport.on_endpoint(endpoint, reply),
            Rule::Query(needle, reply) => transport.on_query(needle, reply),
        };
    }
    let config = EngineConfig {
        overpass_endpoints: vec![FIRST_MIRROR.to_owned(), SECOND_MIRROR.to_owned()],
        retry_rounds: 1,
        pacing: Pacing::immediate(),
        ..EngineConfig::default()
    };
    let engine = MicroScoreEngine::with_sources(geocoder, transport, &config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime should build");
    let result = runtime.block_on(engine.score_address(ADDRESS));

    state.result = Some(result);
    state.requests = engine.resolver().client().transport().requests();
}

// --- Then steps ---

#[then("the result has no coordinate and no score")]
fn nothing_resolved(#[from(world)] world: &RefCell<World>) {
    let state = world.borrow();
    let result = state.result.expect("address should have been scored");
    assert_eq!(result, ScoreResult::unresolved());
}

#[then("the result carries the geocoded coordinate")]
fn coordinate_resolved(#[from(world)] world: &RefCell<World>) {
    let state = world.borrow();
    let result = state.result.expect("address should have been scored");
    assert_eq!(result.coordinate(), Some(origin()));
}

#[then("the micro-score is 70")]
fn score_is_seventy(#[from(world)] world: &RefCell<World>) {
    let state = world.borrow();
    let result = state.result.expect("address should have been scored");
    assert_eq!(result.micro_score(), Some(70));
}

#[then("the second mirror answered the park query")]
fn second_mirror_answered(#[from(world)] world: &RefCell<World>) {
    let state = world.borrow();
    let park_requests: Vec<&str> = state
        .requests
        .iter()
        .filter(|(_, query)| query.contains("leisure"))
        .map(|(endpoint, _)| endpoint.as_str())
        .collect();
    assert_eq!(park_requests, vec![FIRST_MIRROR, SECOND_MIRROR]);
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/engine.feature", name = $title)]
        fn $fn_name(world: RefCell<World>) {
            let _ = world;
        }
    };
}

register_scenario!(unknown_address, "an address the geocoder cannot find");
register_scenario!(park_next_door_scores, "a located address with a park next door");
register_scenario!(mirror_failover, "the first mirror refuses every request");

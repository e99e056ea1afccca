//! When steps for handoff guard BDD scenarios.

use super::world::GuardWorld;
use handoff_guard::validation::domain::Metadata;
use rstest_bdd_macros::when;
use serde_json::json;

#[when(r#""{source}" sends customer id "{customer}" to "{target}""#)]
fn send_customer_id(
    world: &mut GuardWorld,
    source: String,
    customer: String,
    target: String,
) -> Result<(), eyre::Report> {
    world.send(&source, &target, json!({"customer_id": customer}), Metadata::new())
}

#[when(r#""{source}" sends a client record with SSN "{ssn}" to "{target}""#)]
fn send_client_record(
    world: &mut GuardWorld,
    source: String,
    ssn: String,
    target: String,
) -> Result<(), eyre::Report> {
    world.send(
        &source,
        &target,
        json!({"client": {"name": "Ada", "ssn": ssn}}),
        Metadata::new(),
    )
}

#[when(r#""{source}" sends an amount of {amount:u64} to "{target}""#)]
fn send_amount(
    world: &mut GuardWorld,
    source: String,
    amount: u64,
    target: String,
) -> Result<(), eyre::Report> {
    world.send(&source, &target, json!({"amount": amount}), Metadata::new())
}

#[when(r#""{source}" sends an approved amount of {amount:u64} to "{target}""#)]
fn send_approved_amount(
    world: &mut GuardWorld,
    source: String,
    amount: u64,
    target: String,
) -> Result<(), eyre::Report> {
    let mut metadata = Metadata::new();
    metadata.insert("human_approved".to_owned(), json!(true));
    world.send(&source, &target, json!({"amount": amount}), metadata)
}

#[when(r#""{source}" sends a note to "{target}""#)]
fn send_note(world: &mut GuardWorld, source: String, target: String) -> Result<(), eyre::Report> {
    world.send(&source, &target, json!({"note": "status update"}), Metadata::new())
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Navigation sessions driven against a real sqlite-backed store.

use anyhow::Result;
use renta_app::{
    DataWidget, EntityType, FieldValue, NavCommand, NavEvent, NavSession, Pane, RecordId,
    ScreenKind,
};
use renta_db::Store;

fn demo_store() -> Result<Store> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    assert!(store.seed_demo_data()?);
    Ok(store)
}

fn set_field(session: &mut NavSession, field: &str, value: FieldValue) {
    let slot = session
        .form
        .slots
        .iter_mut()
        .find(|slot| slot.field == field)
        .unwrap_or_else(|| panic!("form has no field {field}"));
    slot.widget.set_data(&value);
}

#[test]
fn session_opens_with_the_first_row_bound() -> Result<()> {
    let store = demo_store()?;
    let session = NavSession::new(&store, ScreenKind::Reservation)?;

    assert_eq!(session.master.total(), 4);
    assert_eq!(session.master.selected_id(), Some(RecordId::new(1)));
    assert_eq!(session.form.id_text, "1");
    assert_eq!(session.detail.total(), 2);
    assert!(session.attachments.is_empty());
    Ok(())
}

#[test]
fn stepping_wraps_and_reloads_details() -> Result<()> {
    let store = demo_store()?;
    let mut session = NavSession::new(&store, ScreenKind::Reservation)?;

    session.dispatch(&store, NavCommand::StepMaster(-1))?;
    assert_eq!(session.master.selected_id(), Some(RecordId::new(4)));
    assert_eq!(session.form.id_text, "4");
    assert_eq!(session.detail.total(), 2);

    session.dispatch(&store, NavCommand::StepMaster(1))?;
    assert_eq!(session.master.selected_id(), Some(RecordId::new(1)));
    Ok(())
}

#[test]
fn detail_pane_switches_the_form_entity() -> Result<()> {
    let store = demo_store()?;
    let mut session = NavSession::new(&store, ScreenKind::Reservation)?;

    session.dispatch(&store, NavCommand::StepDetail(1))?;
    assert_eq!(session.active, Pane::Detail);
    assert_eq!(session.active_entity(), EntityType::Service);
    assert_eq!(session.form.entity(), EntityType::Service);
    Ok(())
}

#[test]
fn search_filters_master_rows_in_memory() -> Result<()> {
    let store = demo_store()?;
    let mut session = NavSession::new(&store, ScreenKind::Customer)?;
    assert_eq!(session.master.total(), 3);

    session.dispatch(
        &store,
        NavCommand::Search {
            pane: Pane::Master,
            text: "Ana".to_owned(),
        },
    )?;
    assert_eq!(session.master.total(), 1);
    assert_eq!(session.form.id_text, "1");

    session.dispatch(
        &store,
        NavCommand::Search {
            pane: Pane::Master,
            text: "no such guest".to_owned(),
        },
    )?;
    assert_eq!(session.master.total(), 0);
    assert!(session.form.id_text.is_empty());
    assert_eq!(session.detail.total(), 0);

    session.dispatch(
        &store,
        NavCommand::Search {
            pane: Pane::Master,
            text: String::new(),
        },
    )?;
    assert_eq!(session.master.total(), 3);
    Ok(())
}

#[test]
fn save_new_customer_persists_through_the_store() -> Result<()> {
    let store = demo_store()?;
    let mut session = NavSession::new(&store, ScreenKind::Customer)?;

    session.dispatch(&store, NavCommand::NewRecord(Pane::Master))?;
    assert!(session.form.is_new());

    set_field(&mut session, "first_name", FieldValue::Text("Nina".to_owned()));
    set_field(&mut session, "last_name", FieldValue::Text("Park".to_owned()));
    set_field(&mut session, "country_id", FieldValue::Id(RecordId::new(1)));
    set_field(&mut session, "city_id", FieldValue::Id(RecordId::new(1)));

    let events = session.dispatch(&store, NavCommand::Save)?;
    assert!(events.contains(&NavEvent::Status("saved".to_owned())));
    assert_eq!(session.master.total(), 4);

    let created = store
        .get_record(EntityType::Customer, RecordId::new(4))?
        .expect("saved customer");
    assert_eq!(
        created.values.get("first_name"),
        Some(&FieldValue::Text("Nina".to_owned())),
    );
    assert!(created.entity_id.is_some());
    Ok(())
}

#[test]
fn save_rejects_a_form_missing_required_fields() -> Result<()> {
    let store = demo_store()?;
    let mut session = NavSession::new(&store, ScreenKind::Customer)?;

    session.dispatch(&store, NavCommand::NewRecord(Pane::Master))?;
    set_field(&mut session, "first_name", FieldValue::Text("Nina".to_owned()));

    assert!(session.dispatch(&store, NavCommand::Save).is_err());
    assert!(session.form.is_new(), "failed save should not bind a row");
    Ok(())
}

#[test]
fn delete_requires_confirmation() -> Result<()> {
    let store = demo_store()?;
    let mut session = NavSession::new(&store, ScreenKind::Customer)?;

    let events = session.dispatch(
        &store,
        NavCommand::Delete {
            pane: Pane::Master,
            confirmed: false,
        },
    )?;
    assert_eq!(events, vec![NavEvent::Status("delete cancelled".to_owned())]);
    assert_eq!(session.master.total(), 3);

    session.dispatch(
        &store,
        NavCommand::Delete {
            pane: Pane::Master,
            confirmed: true,
        },
    )?;
    assert_eq!(session.master.total(), 2);
    Ok(())
}

#[test]
fn attachments_round_trip_through_the_session() -> Result<()> {
    let store = demo_store()?;
    let mut session = NavSession::new(&store, ScreenKind::Reservation)?;

    session.dispatch(
        &store,
        NavCommand::Attach(vec!["/docs/booking-confirmation.pdf".to_owned()]),
    )?;
    assert_eq!(session.attachments, ["/docs/booking-confirmation.pdf"]);

    // A fresh session sees the same attachment list.
    let reopened = NavSession::new(&store, ScreenKind::Reservation)?;
    assert_eq!(reopened.attachments, ["/docs/booking-confirmation.pdf"]);

    session.dispatch(
        &store,
        NavCommand::Detach(vec!["/docs/booking-confirmation.pdf".to_owned()]),
    )?;
    assert!(session.attachments.is_empty());
    Ok(())
}

#[test]
fn clear_form_keeps_the_record_id() -> Result<()> {
    let store = demo_store()?;
    let mut session = NavSession::new(&store, ScreenKind::Customer)?;

    session.dispatch(&store, NavCommand::ClearForm)?;
    assert_eq!(session.form.id_text, "1");
    let first = &session.form.slots[0];
    assert_eq!(first.widget.data(), FieldValue::Text(String::new()));
    Ok(())
}

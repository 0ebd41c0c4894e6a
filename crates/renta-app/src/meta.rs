// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Field and widget registry for the seven business entity types.
//!
//! Each entity declares a field list plus a widget list. The two lists are
//! deliberately not the same length: `Action` entries open a lookup editor
//! for the preceding combo and consume no field of their own.

use crate::model::{ComboSource, EntityType, FieldType, WidgetKind};

/// Number of form display slots available on screen. Entities with fewer
/// data-bound fields leave the trailing slots hidden.
pub const FORM_SLOTS: usize = 12;

use ComboSource as Cs;
use WidgetKind::{Action, Combo, Date, DecimalSpin, IntSpin, Text, Time};

const PERSON_FIELDS: [&str; 9] = [
    "first_name",
    "last_name",
    "phone",
    "email",
    "language",
    "country_id",
    "city_id",
    "address",
    "zip_code",
];

const PERSON_WIDGETS: [WidgetKind; 11] = [
    Text,
    Text,
    Text,
    Text,
    Text,
    Combo(Cs::Country),
    Action(Cs::Country),
    Combo(Cs::City),
    Action(Cs::City),
    Text,
    Text,
];

const AGENCY_FIELDS: [&str; 10] = [
    "agency_name",
    "phone",
    "contact_person",
    "cp_phone",
    "email",
    "website",
    "country_id",
    "city_id",
    "address",
    "zip_code",
];

const AGENCY_WIDGETS: [WidgetKind; 12] = [
    Text,
    Text,
    Text,
    Text,
    Text,
    Text,
    Combo(Cs::Country),
    Action(Cs::Country),
    Combo(Cs::City),
    Action(Cs::City),
    Text,
    Text,
];

const APARTMENT_FIELDS: [&str; 9] = [
    "apartment_name",
    "phone",
    "owner_id",
    "max_guests",
    "country_id",
    "city_id",
    "address",
    "zip_code",
    "parking_spaces",
];

const APARTMENT_WIDGETS: [WidgetKind; 11] = [
    Text,
    Text,
    Combo(Cs::Owner),
    IntSpin,
    Combo(Cs::Country),
    Action(Cs::Country),
    Combo(Cs::City),
    Action(Cs::City),
    Text,
    Text,
    IntSpin,
];

const EMPLOYEE_FIELDS: [&str; 11] = [
    "first_name",
    "last_name",
    "phone",
    "email",
    "e_category_id",
    "start_date",
    "end_date",
    "country_id",
    "city_id",
    "address",
    "zip_code",
];

const EMPLOYEE_WIDGETS: [WidgetKind; 14] = [
    Text,
    Text,
    Text,
    Text,
    Combo(Cs::EmployeeCategory),
    Action(Cs::EmployeeCategory),
    Date,
    Date,
    Combo(Cs::Country),
    Action(Cs::Country),
    Combo(Cs::City),
    Action(Cs::City),
    Text,
    Text,
];

const RESERVATION_FIELDS: [&str; 9] = [
    "customer_id",
    "agency_id",
    "apartment_id",
    "checkin_date",
    "checkout_date",
    "guests",
    "amount",
    "tax",
    "deposit",
];

const RESERVATION_WIDGETS: [WidgetKind; 9] = [
    Combo(Cs::Customer),
    Combo(Cs::Agency),
    Combo(Cs::Apartment),
    Date,
    Date,
    IntSpin,
    DecimalSpin,
    DecimalSpin,
    DecimalSpin,
];

const SERVICE_FIELDS: [&str; 8] = [
    "reservation_id",
    "s_category_id",
    "s_type_id",
    "employee_id",
    "date",
    "time",
    "hours",
    "extra_price",
];

const SERVICE_WIDGETS: [WidgetKind; 10] = [
    Combo(Cs::Reservation),
    Combo(Cs::ServiceCategory),
    Action(Cs::ServiceCategory),
    Combo(Cs::ServiceType),
    Action(Cs::ServiceType),
    Combo(Cs::Employee),
    Date,
    Time,
    Time,
    DecimalSpin,
];

/// Data-bound field names for a business entity, in form order.
///
/// Panics for lookup types: they are edited through the reference editors
/// and never get a full form built for them.
pub fn field_names(entity: EntityType) -> &'static [&'static str] {
    match entity {
        EntityType::Customer | EntityType::Owner => &PERSON_FIELDS,
        EntityType::Agency => &AGENCY_FIELDS,
        EntityType::Apartment => &APARTMENT_FIELDS,
        EntityType::Employee => &EMPLOYEE_FIELDS,
        EntityType::Reservation => &RESERVATION_FIELDS,
        EntityType::Service => &SERVICE_FIELDS,
        other => panic!("no form metadata for {}", other.as_str()),
    }
}

/// Widget list for a business entity. Longer than `field_names` whenever
/// the entity carries action buttons.
pub fn widget_kinds(entity: EntityType) -> &'static [WidgetKind] {
    match entity {
        EntityType::Customer | EntityType::Owner => &PERSON_WIDGETS,
        EntityType::Agency => &AGENCY_WIDGETS,
        EntityType::Apartment => &APARTMENT_WIDGETS,
        EntityType::Employee => &EMPLOYEE_WIDGETS,
        EntityType::Reservation => &RESERVATION_WIDGETS,
        EntityType::Service => &SERVICE_WIDGETS,
        other => panic!("no form metadata for {}", other.as_str()),
    }
}

/// Columns persisted for an entity, with their storage types. Business
/// entities append the `notes` column that lives outside the form registry;
/// lookup entities list their name (and for cities, parent country) columns.
pub fn persisted_fields(entity: EntityType) -> Vec<(&'static str, FieldType)> {
    match entity {
        EntityType::Country => vec![("country_name", FieldType::Text)],
        EntityType::City => vec![
            ("city_name", FieldType::Text),
            ("country_id", FieldType::ForeignKey),
        ],
        EntityType::EmployeeCategory => vec![("e_category_name", FieldType::Text)],
        EntityType::ServiceType => vec![("s_type_name", FieldType::Text)],
        EntityType::ServiceCategory => vec![("s_category_name", FieldType::Text)],
        business => {
            let names = field_names(business);
            let mut fields: Vec<(&'static str, FieldType)> = widget_kinds(business)
                .iter()
                .filter(|kind| !kind.is_action())
                .enumerate()
                .map(|(index, kind)| (names[index], kind.field_type()))
                .collect();
            fields.push(("notes", FieldType::Text));
            fields
        }
    }
}

/// Fields that must be present and non-empty before a save is accepted.
pub fn required_fields(entity: EntityType) -> &'static [&'static str] {
    match entity {
        EntityType::Customer | EntityType::Owner => {
            &["first_name", "last_name", "country_id", "city_id"]
        }
        EntityType::Agency => &["agency_name", "country_id", "city_id"],
        EntityType::Apartment => &["apartment_name", "owner_id", "country_id", "city_id"],
        EntityType::Employee => &[
            "first_name",
            "last_name",
            "e_category_id",
            "country_id",
            "city_id",
        ],
        EntityType::Reservation => &["customer_id", "agency_id", "apartment_id"],
        EntityType::Service => &[
            "reservation_id",
            "s_category_id",
            "s_type_id",
            "employee_id",
        ],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityType, FieldType, WidgetKind};

    const BUSINESS: [EntityType; 7] = [
        EntityType::Customer,
        EntityType::Owner,
        EntityType::Agency,
        EntityType::Apartment,
        EntityType::Employee,
        EntityType::Reservation,
        EntityType::Service,
    ];

    #[test]
    fn widget_list_covers_every_field_exactly_once() {
        for entity in BUSINESS {
            let data_widgets = widget_kinds(entity)
                .iter()
                .filter(|kind| !kind.is_action())
                .count();
            assert_eq!(
                data_widgets,
                field_names(entity).len(),
                "{}",
                entity.as_str(),
            );
        }
    }

    #[test]
    fn no_entity_starts_with_an_action() {
        for entity in BUSINESS {
            assert!(!widget_kinds(entity)[0].is_action(), "{}", entity.as_str());
        }
    }

    #[test]
    fn actions_follow_a_matching_combo() {
        for entity in BUSINESS {
            let widgets = widget_kinds(entity);
            for (index, kind) in widgets.iter().enumerate() {
                if let WidgetKind::Action(source) = kind {
                    assert_eq!(
                        widgets[index - 1],
                        WidgetKind::Combo(*source),
                        "{} widget {index}",
                        entity.as_str(),
                    );
                }
            }
        }
    }

    #[test]
    fn forms_fit_in_the_slot_pool() {
        for entity in BUSINESS {
            assert!(field_names(entity).len() <= FORM_SLOTS, "{}", entity.as_str());
        }
    }

    #[test]
    fn persisted_fields_end_with_notes() {
        for entity in BUSINESS {
            let fields = persisted_fields(entity);
            assert_eq!(fields.last(), Some(&("notes", FieldType::Text)));
            assert_eq!(fields.len(), field_names(entity).len() + 1);
        }
    }

    #[test]
    fn lookup_persisted_fields_name_their_label_column() {
        assert_eq!(
            persisted_fields(EntityType::Country),
            vec![("country_name", FieldType::Text)],
        );
        assert_eq!(
            persisted_fields(EntityType::City),
            vec![
                ("city_name", FieldType::Text),
                ("country_id", FieldType::ForeignKey),
            ],
        );
    }

    #[test]
    fn required_fields_are_registered() {
        for entity in BUSINESS {
            let names = field_names(entity);
            for required in required_fields(entity) {
                assert!(names.contains(required), "{} {required}", entity.as_str());
            }
        }
    }

    #[test]
    #[should_panic(expected = "no form metadata")]
    fn lookup_form_metadata_panics() {
        field_names(EntityType::Country);
    }
}

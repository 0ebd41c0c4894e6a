// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::macros::format_description;
use time::{Date, Time};

use crate::ids::*;

/// Record kinds the engine knows about. The first seven own a row in the
/// shared `entity` table; the rest are plain lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Customer,
    Owner,
    Agency,
    Apartment,
    Employee,
    Reservation,
    Service,
    Country,
    City,
    EmployeeCategory,
    ServiceType,
    ServiceCategory,
}

impl EntityType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Owner => "owner",
            Self::Agency => "agency",
            Self::Apartment => "apartment",
            Self::Employee => "employee",
            Self::Reservation => "reservation",
            Self::Service => "service",
            Self::Country => "country",
            Self::City => "city",
            Self::EmployeeCategory => "employee_category",
            Self::ServiceType => "service_type",
            Self::ServiceCategory => "service_category",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(Self::Customer),
            "owner" => Some(Self::Owner),
            "agency" => Some(Self::Agency),
            "apartment" => Some(Self::Apartment),
            "employee" => Some(Self::Employee),
            "reservation" => Some(Self::Reservation),
            "service" => Some(Self::Service),
            "country" => Some(Self::Country),
            "city" => Some(Self::City),
            "employee_category" => Some(Self::EmployeeCategory),
            "service_type" => Some(Self::ServiceType),
            "service_category" => Some(Self::ServiceCategory),
            _ => None,
        }
    }

    /// Whether rows of this type hang off the shared `entity` hub and can
    /// carry document attachments.
    pub const fn has_shared_identity(self) -> bool {
        matches!(
            self,
            Self::Customer
                | Self::Owner
                | Self::Agency
                | Self::Apartment
                | Self::Employee
                | Self::Reservation
                | Self::Service
        )
    }
}

/// The seven master/detail screens. Each pairs a master entity with the
/// detail entity shown underneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenKind {
    Reservation,
    Service,
    Customer,
    Employee,
    Agency,
    Owner,
    Apartment,
}

impl ScreenKind {
    pub const ALL: [Self; 7] = [
        Self::Reservation,
        Self::Service,
        Self::Customer,
        Self::Employee,
        Self::Agency,
        Self::Owner,
        Self::Apartment,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reservation => "reservation",
            Self::Service => "service",
            Self::Customer => "customer",
            Self::Employee => "employee",
            Self::Agency => "agency",
            Self::Owner => "owner",
            Self::Apartment => "apartment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reservation" => Some(Self::Reservation),
            "service" => Some(Self::Service),
            "customer" => Some(Self::Customer),
            "employee" => Some(Self::Employee),
            "agency" => Some(Self::Agency),
            "owner" => Some(Self::Owner),
            "apartment" => Some(Self::Apartment),
            _ => None,
        }
    }

    pub const fn master_entity(self) -> EntityType {
        match self {
            Self::Reservation => EntityType::Reservation,
            Self::Service => EntityType::Service,
            Self::Customer => EntityType::Customer,
            Self::Employee => EntityType::Employee,
            Self::Agency => EntityType::Agency,
            Self::Owner => EntityType::Owner,
            Self::Apartment => EntityType::Apartment,
        }
    }

    pub const fn detail_entity(self) -> EntityType {
        match self {
            Self::Reservation => EntityType::Service,
            Self::Service => EntityType::Reservation,
            Self::Customer => EntityType::Reservation,
            Self::Employee => EntityType::Service,
            Self::Agency => EntityType::Reservation,
            Self::Owner => EntityType::Apartment,
            Self::Apartment => EntityType::Reservation,
        }
    }
}

/// Lookup source a combo (or its companion edit button) draws options from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboSource {
    Country,
    City,
    Customer,
    Owner,
    Agency,
    Apartment,
    Employee,
    Reservation,
    EmployeeCategory,
    ServiceType,
    ServiceCategory,
}

impl ComboSource {
    pub const fn entity_type(self) -> EntityType {
        match self {
            Self::Country => EntityType::Country,
            Self::City => EntityType::City,
            Self::Customer => EntityType::Customer,
            Self::Owner => EntityType::Owner,
            Self::Agency => EntityType::Agency,
            Self::Apartment => EntityType::Apartment,
            Self::Employee => EntityType::Employee,
            Self::Reservation => EntityType::Reservation,
            Self::EmployeeCategory => EntityType::EmployeeCategory,
            Self::ServiceType => EntityType::ServiceType,
            Self::ServiceCategory => EntityType::ServiceCategory,
        }
    }
}

/// Storage-level type of a persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Integer,
    Decimal,
    Date,
    Time,
    ForeignKey,
}

/// Widget flavor declared for one metadata entry. `Action` entries do not
/// carry a field of their own; they ride along in the preceding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetKind {
    Text,
    Combo(ComboSource),
    IntSpin,
    DecimalSpin,
    Date,
    Time,
    Action(ComboSource),
}

impl WidgetKind {
    pub const fn is_action(self) -> bool {
        matches!(self, Self::Action(_))
    }

    pub const fn field_type(self) -> FieldType {
        match self {
            Self::Text => FieldType::Text,
            Self::Combo(_) | Self::Action(_) => FieldType::ForeignKey,
            Self::IntSpin => FieldType::Integer,
            Self::DecimalSpin => FieldType::Decimal,
            Self::Date => FieldType::Date,
            Self::Time => FieldType::Time,
        }
    }
}

/// One field value as it travels between the form, the navigation layer and
/// storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(Date),
    Time(Time),
    Id(RecordId),
}

impl FieldValue {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Id(_) => "id",
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Decimal(value) => value.to_string(),
            Self::Date(value) => format_date(*value),
            Self::Time(value) => format_time(*value),
            Self::Id(value) => value.get().to_string(),
        }
    }
}

/// Field-name to value map for one record, keyed by registry field names.
pub type FieldValues = BTreeMap<&'static str, FieldValue>;

/// One business record pulled out of storage.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordInstance {
    pub id: RecordId,
    pub entity_id: Option<EntityId>,
    pub values: FieldValues,
}

/// Display-ready query result. The id column always comes first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_id(&self, index: usize) -> Option<RecordId> {
        let cell = self.rows.get(index)?.first()?;
        cell.parse::<i64>().ok().map(RecordId::new)
    }
}

/// One combo entry: row id plus its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboOption {
    pub id: RecordId,
    pub label: String,
}

/// A file attached to a shared-identity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub entity_id: EntityId,
    pub file_path: String,
}

/// Phone/email pair shared by people, agencies and apartments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
}

impl ContactInfo {
    pub fn apply(&self, values: &mut FieldValues) {
        values.insert("phone", FieldValue::Text(self.phone.clone()));
        values.insert("email", FieldValue::Text(self.email.clone()));
    }
}

/// Street address pair shared by every located entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressInfo {
    pub address: String,
    pub zip_code: String,
}

impl AddressInfo {
    pub fn apply(&self, values: &mut FieldValues) {
        values.insert("address", FieldValue::Text(self.address.clone()));
        values.insert("zip_code", FieldValue::Text(self.zip_code.clone()));
    }
}

pub fn format_date(value: Date) -> String {
    value
        .format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "2000-01-01".to_owned())
}

pub fn format_time(value: Time) -> String {
    value
        .format(&format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| "00:00".to_owned())
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw, &format_description!("[year]-[month]-[day]")).ok()
}

pub fn parse_time(raw: &str) -> Option<Time> {
    if let Ok(value) = Time::parse(raw, &format_description!("[hour]:[minute]:[second]")) {
        return Some(value);
    }
    Time::parse(raw, &format_description!("[hour]:[minute]")).ok()
}

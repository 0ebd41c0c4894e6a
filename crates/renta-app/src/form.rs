// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Form construction and data binding.
//!
//! A form is built from the widget registry with a single running slot
//! index. Action entries step the index back one, attach themselves to the
//! slot holding their companion combo, and step forward again, so they
//! never consume a field or a slot of their own.

use time::macros::{date, time};
use time::{Date, Time};

use crate::error::{EngineError, EngineResult};
use crate::ids::RecordId;
use crate::meta;
use crate::model::{
    ComboOption, ComboSource, EntityType, FieldType, FieldValue, FieldValues, RecordInstance,
    WidgetKind,
};

/// Id-field text shown while composing a record that does not exist yet.
pub const NEW_RECORD_MARKER: &str = "(new)";

const DEFAULT_DATE: Date = date!(2000 - 01 - 01);
const MIDNIGHT: Time = time!(00:00);
const DECIMAL_MAX: f64 = 1_000_000.0;

/// Common surface of every editable widget.
pub trait DataWidget {
    fn set_data(&mut self, value: &FieldValue);
    fn data(&self) -> FieldValue;
    fn clear_data(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextEdit {
    pub value: String,
}

impl DataWidget for TextEdit {
    fn set_data(&mut self, value: &FieldValue) {
        self.value = value.display();
    }

    fn data(&self) -> FieldValue {
        FieldValue::Text(self.value.clone())
    }

    fn clear_data(&mut self) {
        self.value.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComboBox {
    pub source: ComboSource,
    pub options: Vec<ComboOption>,
    pub selected: Option<RecordId>,
}

impl ComboBox {
    pub fn new(source: ComboSource) -> Self {
        Self {
            source,
            options: Vec::new(),
            selected: None,
        }
    }

    pub fn set_options(&mut self, options: Vec<ComboOption>) {
        self.options = options;
        if let Some(selected) = self.selected
            && !self.options.iter().any(|option| option.id == selected)
        {
            self.selected = None;
        }
    }

    pub fn selected_label(&self) -> Option<&str> {
        let selected = self.selected?;
        self.options
            .iter()
            .find(|option| option.id == selected)
            .map(|option| option.label.as_str())
    }
}

impl DataWidget for ComboBox {
    fn set_data(&mut self, value: &FieldValue) {
        let id = match value {
            FieldValue::Id(id) => Some(*id),
            FieldValue::Integer(raw) => Some(RecordId::new(*raw)),
            _ => None,
        };
        // Selecting an id missing from the options leaves the combo blank.
        self.selected = id.filter(|id| self.options.iter().any(|option| option.id == *id));
    }

    fn data(&self) -> FieldValue {
        match self.selected {
            Some(id) => FieldValue::Id(id),
            None => FieldValue::Null,
        }
    }

    fn clear_data(&mut self) {
        self.selected = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpinBox {
    pub value: i64,
}

impl DataWidget for SpinBox {
    fn set_data(&mut self, value: &FieldValue) {
        self.value = match value {
            FieldValue::Integer(raw) => *raw,
            _ => 0,
        };
    }

    fn data(&self) -> FieldValue {
        FieldValue::Integer(self.value)
    }

    fn clear_data(&mut self) {
        self.value = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecimalBox {
    pub value: f64,
}

impl DataWidget for DecimalBox {
    fn set_data(&mut self, value: &FieldValue) {
        self.value = match value {
            FieldValue::Decimal(raw) => raw.clamp(0.0, DECIMAL_MAX),
            FieldValue::Integer(raw) => (*raw as f64).clamp(0.0, DECIMAL_MAX),
            _ => 0.0,
        };
    }

    fn data(&self) -> FieldValue {
        FieldValue::Decimal(self.value)
    }

    fn clear_data(&mut self) {
        self.value = 0.0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEdit {
    pub value: Date,
}

impl Default for DateEdit {
    fn default() -> Self {
        Self {
            value: DEFAULT_DATE,
        }
    }
}

impl DataWidget for DateEdit {
    fn set_data(&mut self, value: &FieldValue) {
        self.value = match value {
            FieldValue::Date(raw) => *raw,
            _ => DEFAULT_DATE,
        };
    }

    fn data(&self) -> FieldValue {
        FieldValue::Date(self.value)
    }

    fn clear_data(&mut self) {
        self.value = DEFAULT_DATE;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEdit {
    pub value: Time,
}

impl Default for TimeEdit {
    fn default() -> Self {
        Self { value: MIDNIGHT }
    }
}

impl DataWidget for TimeEdit {
    fn set_data(&mut self, value: &FieldValue) {
        self.value = match value {
            FieldValue::Time(raw) => *raw,
            _ => MIDNIGHT,
        };
    }

    fn data(&self) -> FieldValue {
        FieldValue::Time(self.value)
    }

    fn clear_data(&mut self) {
        self.value = MIDNIGHT;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormWidget {
    Text(TextEdit),
    Combo(ComboBox),
    IntSpin(SpinBox),
    DecimalSpin(DecimalBox),
    Date(DateEdit),
    Time(TimeEdit),
}

impl FormWidget {
    fn for_kind(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Text => Self::Text(TextEdit::default()),
            WidgetKind::Combo(source) => Self::Combo(ComboBox::new(source)),
            WidgetKind::IntSpin => Self::IntSpin(SpinBox::default()),
            WidgetKind::DecimalSpin => Self::DecimalSpin(DecimalBox::default()),
            WidgetKind::Date => Self::Date(DateEdit::default()),
            WidgetKind::Time => Self::Time(TimeEdit::default()),
            WidgetKind::Action(_) => unreachable!("action entries never become widgets"),
        }
    }

    pub fn as_combo(&self) -> Option<&ComboBox> {
        match self {
            Self::Combo(combo) => Some(combo),
            _ => None,
        }
    }
}

impl DataWidget for FormWidget {
    fn set_data(&mut self, value: &FieldValue) {
        match self {
            Self::Text(widget) => widget.set_data(value),
            Self::Combo(widget) => widget.set_data(value),
            Self::IntSpin(widget) => widget.set_data(value),
            Self::DecimalSpin(widget) => widget.set_data(value),
            Self::Date(widget) => widget.set_data(value),
            Self::Time(widget) => widget.set_data(value),
        }
    }

    fn data(&self) -> FieldValue {
        match self {
            Self::Text(widget) => widget.data(),
            Self::Combo(widget) => widget.data(),
            Self::IntSpin(widget) => widget.data(),
            Self::DecimalSpin(widget) => widget.data(),
            Self::Date(widget) => widget.data(),
            Self::Time(widget) => widget.data(),
        }
    }

    fn clear_data(&mut self) {
        match self {
            Self::Text(widget) => widget.clear_data(),
            Self::Combo(widget) => widget.clear_data(),
            Self::IntSpin(widget) => widget.clear_data(),
            Self::DecimalSpin(widget) => widget.clear_data(),
            Self::Date(widget) => widget.clear_data(),
            Self::Time(widget) => widget.clear_data(),
        }
    }
}

/// One visible form slot: a field-bound widget plus the optional action
/// button sharing the slot.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSlot {
    pub field: &'static str,
    pub widget: FormWidget,
    pub action: Option<ComboSource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    entity: EntityType,
    pub slots: Vec<FormSlot>,
    pub id_text: String,
    pub notes: TextEdit,
}

impl Form {
    /// Walk the widget registry with the running slot index.
    pub fn build(entity: EntityType) -> Self {
        let names = meta::field_names(entity);
        let mut slots: Vec<FormSlot> = Vec::new();
        let mut index = 0usize;
        for kind in meta::widget_kinds(entity) {
            if let WidgetKind::Action(source) = kind {
                index -= 1;
                slots[index].action = Some(*source);
            } else {
                debug_assert_eq!(index, slots.len());
                slots.push(FormSlot {
                    field: names[index],
                    widget: FormWidget::for_kind(*kind),
                    action: None,
                });
            }
            index += 1;
        }
        Self {
            entity,
            slots,
            id_text: String::new(),
            notes: TextEdit::default(),
        }
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn hidden_slots(&self) -> usize {
        meta::FORM_SLOTS - self.slots.len()
    }

    /// Distinct combo sources this form needs options for, in slot order.
    pub fn combo_sources(&self) -> Vec<ComboSource> {
        let mut sources = Vec::new();
        for slot in &self.slots {
            if let Some(combo) = slot.widget.as_combo()
                && !sources.contains(&combo.source)
            {
                sources.push(combo.source);
            }
        }
        sources
    }

    pub fn set_combo_options(&mut self, source: ComboSource, options: &[ComboOption]) {
        for slot in &mut self.slots {
            if let FormWidget::Combo(combo) = &mut slot.widget
                && combo.source == source
            {
                combo.set_options(options.to_vec());
            }
        }
    }

    /// Load the record into the widgets, id field and notes field.
    pub fn bind(&mut self, instance: &RecordInstance) {
        self.id_text = instance.id.to_string();
        for slot in &mut self.slots {
            let value = instance
                .values
                .get(slot.field)
                .cloned()
                .unwrap_or(FieldValue::Null);
            slot.widget.set_data(&value);
        }
        let notes = instance
            .values
            .get("notes")
            .cloned()
            .unwrap_or(FieldValue::Null);
        self.notes.set_data(&notes);
    }

    /// Reset widgets to their defaults without touching the id field.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.widget.clear_data();
        }
        self.notes.clear_data();
    }

    /// Clear the widgets and mark the form as composing a new record.
    pub fn set_new(&mut self) {
        self.clear();
        self.id_text = NEW_RECORD_MARKER.to_owned();
    }

    pub fn is_new(&self) -> bool {
        self.id_text == NEW_RECORD_MARKER
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.id_text.parse::<i64>().ok().map(RecordId::new)
    }

    /// Collect widget values plus notes. The id field is never extracted.
    pub fn extract(&self) -> FieldValues {
        let mut values = FieldValues::new();
        for slot in &self.slots {
            values.insert(slot.field, slot.widget.data());
        }
        values.insert("notes", self.notes.data());
        values
    }
}

/// Reject values that cannot be persisted: missing required fields and
/// values whose kind does not match the declared field type.
pub fn validate(entity: EntityType, values: &FieldValues) -> EngineResult<()> {
    for required in meta::required_fields(entity) {
        let missing = match values.get(required) {
            None | Some(FieldValue::Null) => true,
            Some(FieldValue::Text(text)) => text.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            return Err(EngineError::validation(*required, "value is required"));
        }
    }

    for (field, field_type) in meta::persisted_fields(entity) {
        let Some(value) = values.get(field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let compatible = matches!(
            (field_type, value),
            (FieldType::Text, FieldValue::Text(_))
                | (FieldType::Integer, FieldValue::Integer(_))
                | (FieldType::Decimal, FieldValue::Decimal(_))
                | (FieldType::Decimal, FieldValue::Integer(_))
                | (FieldType::Date, FieldValue::Date(_))
                | (FieldType::Time, FieldValue::Time(_))
                | (FieldType::ForeignKey, FieldValue::Id(_))
                | (FieldType::ForeignKey, FieldValue::Integer(_))
        );
        if !compatible {
            return Err(EngineError::validation(
                field,
                format!("expected {field_type:?}, got {}", value.kind_name()),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RecordId;
    use crate::meta;
    use time::macros::{date, time};

    fn options(ids: &[i64]) -> Vec<ComboOption> {
        ids.iter()
            .map(|id| ComboOption {
                id: RecordId::new(*id),
                label: format!("option {id}"),
            })
            .collect()
    }

    #[test]
    fn slots_follow_field_order_for_every_entity() {
        for entity in [
            EntityType::Customer,
            EntityType::Owner,
            EntityType::Agency,
            EntityType::Apartment,
            EntityType::Employee,
            EntityType::Reservation,
            EntityType::Service,
        ] {
            let form = Form::build(entity);
            let fields: Vec<&str> = form.slots.iter().map(|slot| slot.field).collect();
            assert_eq!(fields, meta::field_names(entity), "{}", entity.as_str());
            assert!(form.slots.len() + form.hidden_slots() == meta::FORM_SLOTS);
        }
    }

    #[test]
    fn actions_share_their_combo_slot() {
        let form = Form::build(EntityType::Customer);
        let country_slot = &form.slots[5];
        assert_eq!(country_slot.field, "country_id");
        assert_eq!(country_slot.action, Some(ComboSource::Country));
        let city_slot = &form.slots[6];
        assert_eq!(city_slot.field, "city_id");
        assert_eq!(city_slot.action, Some(ComboSource::City));
        // Plain slots carry no action.
        assert_eq!(form.slots[0].action, None);
    }

    #[test]
    fn service_form_places_category_and_type_actions() {
        let form = Form::build(EntityType::Service);
        assert_eq!(form.slots.len(), 8);
        assert_eq!(form.slots[1].action, Some(ComboSource::ServiceCategory));
        assert_eq!(form.slots[2].action, Some(ComboSource::ServiceType));
        assert_eq!(form.slots[3].action, None);
    }

    #[test]
    fn bind_extract_round_trip() {
        let mut form = Form::build(EntityType::Reservation);
        for source in form.combo_sources() {
            form.set_combo_options(source, &options(&[1, 2, 3]));
        }

        let mut values = FieldValues::new();
        values.insert("customer_id", FieldValue::Id(RecordId::new(2)));
        values.insert("agency_id", FieldValue::Id(RecordId::new(1)));
        values.insert("apartment_id", FieldValue::Id(RecordId::new(3)));
        values.insert("checkin_date", FieldValue::Date(date!(2025 - 08 - 01)));
        values.insert("checkout_date", FieldValue::Date(date!(2025 - 08 - 08)));
        values.insert("guests", FieldValue::Integer(4));
        values.insert("amount", FieldValue::Decimal(640.0));
        values.insert("tax", FieldValue::Decimal(67.2));
        values.insert("deposit", FieldValue::Decimal(100.0));
        values.insert("notes", FieldValue::Text("sea view".to_owned()));

        form.bind(&RecordInstance {
            id: RecordId::new(11),
            entity_id: None,
            values: values.clone(),
        });

        assert_eq!(form.id_text, "11");
        assert_eq!(form.record_id(), Some(RecordId::new(11)));
        assert!(!form.is_new());
        assert_eq!(form.extract(), values);
    }

    #[test]
    fn binding_an_unknown_combo_id_leaves_the_combo_blank() {
        let mut form = Form::build(EntityType::Reservation);
        form.set_combo_options(ComboSource::Customer, &options(&[1, 2]));

        let mut values = FieldValues::new();
        values.insert("customer_id", FieldValue::Id(RecordId::new(99)));
        form.bind(&RecordInstance {
            id: RecordId::new(1),
            entity_id: None,
            values,
        });

        assert_eq!(form.extract().get("customer_id"), Some(&FieldValue::Null));
    }

    #[test]
    fn clear_keeps_id_but_resets_widget_defaults() {
        let mut form = Form::build(EntityType::Service);
        form.id_text = "7".to_owned();
        form.notes.set_data(&FieldValue::Text("late checkout".to_owned()));
        form.clear();

        assert_eq!(form.id_text, "7");
        let extracted = form.extract();
        assert_eq!(
            extracted.get("date"),
            Some(&FieldValue::Date(date!(2000 - 01 - 01))),
        );
        assert_eq!(extracted.get("time"), Some(&FieldValue::Time(time!(00:00))));
        assert_eq!(extracted.get("notes"), Some(&FieldValue::Text(String::new())));
    }

    #[test]
    fn set_new_marks_the_form() {
        let mut form = Form::build(EntityType::Customer);
        form.id_text = "4".to_owned();
        form.set_new();
        assert!(form.is_new());
        assert_eq!(form.record_id(), None);
        assert_eq!(form.id_text, NEW_RECORD_MARKER);
    }

    #[test]
    fn validation_requires_combo_selections() {
        let form = Form::build(EntityType::Reservation);
        let values = form.extract();
        let error = validate(EntityType::Reservation, &values).unwrap_err();
        assert_eq!(
            error,
            EngineError::validation("customer_id", "value is required"),
        );
    }

    #[test]
    fn validation_rejects_type_mismatches() {
        let mut values = FieldValues::new();
        values.insert("first_name", FieldValue::Text("Ana".to_owned()));
        values.insert("last_name", FieldValue::Text("Puig".to_owned()));
        values.insert("country_id", FieldValue::Id(RecordId::new(1)));
        values.insert("city_id", FieldValue::Id(RecordId::new(1)));
        values.insert("phone", FieldValue::Integer(5551234));
        let error = validate(EntityType::Customer, &values).unwrap_err();
        assert!(matches!(error, EngineError::Validation { field, .. } if field == "phone"));
    }

    #[test]
    fn validation_rejects_blank_required_text() {
        let mut values = FieldValues::new();
        values.insert("agency_name", FieldValue::Text("   ".to_owned()));
        values.insert("country_id", FieldValue::Id(RecordId::new(1)));
        values.insert("city_id", FieldValue::Id(RecordId::new(1)));
        let error = validate(EntityType::Agency, &values).unwrap_err();
        assert_eq!(
            error,
            EngineError::validation("agency_name", "value is required"),
        );
    }
}

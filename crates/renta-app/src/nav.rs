// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Master/detail navigation state machine.
//!
//! `NavSession` owns the two table panes, the active form and the
//! attachment list for the selected record. Commands go in, events come
//! out; all data flows through the `Datasource` seam so the session never
//! touches storage directly.

use crate::error::{EngineError, EngineResult};
use crate::form::{self, Form};
use crate::ids::{EntityId, RecordId};
use crate::model::{
    ComboOption, ComboSource, Document, EntityType, FieldValues, RecordInstance, ScreenKind,
    TableData,
};

/// Storage boundary the navigation layer drives.
pub trait Datasource {
    fn master_rows(&self, screen: ScreenKind) -> EngineResult<TableData>;
    fn detail_rows(&self, screen: ScreenKind, master_id: RecordId) -> EngineResult<TableData>;
    fn combo_options(&self, source: ComboSource) -> EngineResult<Vec<ComboOption>>;
    fn get_record(&self, entity: EntityType, id: RecordId)
    -> EngineResult<Option<RecordInstance>>;
    fn create_record(&self, entity: EntityType, values: &FieldValues) -> EngineResult<RecordId>;
    fn update_record(
        &self,
        entity: EntityType,
        id: RecordId,
        values: &FieldValues,
    ) -> EngineResult<()>;
    fn delete_record(&self, entity: EntityType, id: RecordId) -> EngineResult<()>;
    fn list_documents(&self, entity_id: EntityId) -> EngineResult<Vec<Document>>;
    fn add_documents(&self, entity_id: EntityId, paths: &[String]) -> EngineResult<()>;
    fn remove_documents(&self, entity_id: EntityId, paths: &[String]) -> EngineResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Master,
    Detail,
}

/// One table pane: loaded rows, current selection and search text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TablePane {
    pub data: TableData,
    pub selected: Option<usize>,
    pub search: String,
}

impl TablePane {
    fn set_rows(&mut self, data: TableData) {
        self.selected = if data.rows.is_empty() { None } else { Some(0) };
        self.data = data;
    }

    fn clear(&mut self) {
        self.data = TableData::default();
        self.selected = None;
    }

    pub fn total(&self) -> usize {
        self.data.row_count()
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.data.row_id(self.selected?)
    }

    /// Move the selection, wrapping past either end.
    fn step(&mut self, delta: i64) {
        let count = self.data.row_count();
        if count == 0 {
            self.selected = None;
            return;
        }
        let current = self.selected.unwrap_or(0) as i64;
        let next = (current + delta).rem_euclid(count as i64) as usize;
        self.selected = Some(next);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavCommand {
    SelectScreen(ScreenKind),
    StepMaster(i64),
    StepDetail(i64),
    Search { pane: Pane, text: String },
    NewRecord(Pane),
    Save,
    Delete { pane: Pane, confirmed: bool },
    ClearForm,
    Cancel,
    Attach(Vec<String>),
    Detach(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    ScreenChanged(ScreenKind),
    RowsChanged(Pane),
    SelectionChanged(Pane),
    FormChanged,
    AttachmentsChanged,
    Status(String),
}

#[derive(Debug)]
pub struct NavSession {
    screen: ScreenKind,
    pub master: TablePane,
    pub detail: TablePane,
    pub active: Pane,
    pub form: Form,
    pub attachments: Vec<String>,
    bound_entity: Option<EntityId>,
}

impl NavSession {
    pub fn new(ds: &impl Datasource, screen: ScreenKind) -> EngineResult<Self> {
        let mut session = Self {
            screen,
            master: TablePane::default(),
            detail: TablePane::default(),
            active: Pane::Master,
            form: Form::build(screen.master_entity()),
            attachments: Vec::new(),
            bound_entity: None,
        };
        session.dispatch(ds, NavCommand::SelectScreen(screen))?;
        Ok(session)
    }

    pub fn screen(&self) -> ScreenKind {
        self.screen
    }

    /// Entity edited by the form, following the active pane.
    pub fn active_entity(&self) -> EntityType {
        match self.active {
            Pane::Master => self.screen.master_entity(),
            Pane::Detail => self.screen.detail_entity(),
        }
    }

    pub fn dispatch(
        &mut self,
        ds: &impl Datasource,
        command: NavCommand,
    ) -> EngineResult<Vec<NavEvent>> {
        match command {
            NavCommand::SelectScreen(screen) => self.select_screen(ds, screen),
            NavCommand::StepMaster(delta) => self.step_master(ds, delta),
            NavCommand::StepDetail(delta) => self.step_detail(ds, delta),
            NavCommand::Search { pane, text } => self.search(ds, pane, text),
            NavCommand::NewRecord(pane) => self.new_record(ds, pane),
            NavCommand::Save => self.save(ds),
            NavCommand::Delete { pane, confirmed } => self.delete(ds, pane, confirmed),
            NavCommand::ClearForm => {
                self.form.clear();
                Ok(vec![NavEvent::FormChanged])
            }
            NavCommand::Cancel => self.cancel(ds),
            NavCommand::Attach(paths) => self.attach(ds, paths),
            NavCommand::Detach(paths) => self.detach(ds, paths),
        }
    }

    fn select_screen(
        &mut self,
        ds: &impl Datasource,
        screen: ScreenKind,
    ) -> EngineResult<Vec<NavEvent>> {
        self.screen = screen;
        self.master.search.clear();
        self.detail.search.clear();
        self.active = Pane::Master;
        self.load_master(ds)?;
        self.load_detail(ds)?;
        self.rebuild_form(ds)?;
        self.load_form_data(ds)?;
        Ok(vec![
            NavEvent::ScreenChanged(screen),
            NavEvent::RowsChanged(Pane::Master),
            NavEvent::RowsChanged(Pane::Detail),
            NavEvent::FormChanged,
        ])
    }

    fn step_master(&mut self, ds: &impl Datasource, delta: i64) -> EngineResult<Vec<NavEvent>> {
        self.active = Pane::Master;
        self.detail.search.clear();
        self.master.step(delta);
        self.load_detail(ds)?;
        self.rebuild_form(ds)?;
        self.load_form_data(ds)?;
        Ok(vec![
            NavEvent::SelectionChanged(Pane::Master),
            NavEvent::RowsChanged(Pane::Detail),
            NavEvent::FormChanged,
        ])
    }

    fn step_detail(&mut self, ds: &impl Datasource, delta: i64) -> EngineResult<Vec<NavEvent>> {
        self.active = Pane::Detail;
        self.detail.step(delta);
        self.rebuild_form(ds)?;
        self.load_form_data(ds)?;
        Ok(vec![
            NavEvent::SelectionChanged(Pane::Detail),
            NavEvent::FormChanged,
        ])
    }

    fn search(
        &mut self,
        ds: &impl Datasource,
        pane: Pane,
        text: String,
    ) -> EngineResult<Vec<NavEvent>> {
        let switched = self.active != pane;
        if switched && pane == Pane::Master {
            self.detail.search.clear();
        }
        self.active = pane;

        match pane {
            Pane::Master => {
                self.master.search = text;
                self.load_master(ds)?;
                if switched {
                    self.rebuild_form(ds)?;
                }
                self.load_form_data(ds)?;
                if self.master.total() > 0 {
                    self.load_detail(ds)?;
                } else {
                    self.detail.clear();
                }
                Ok(vec![
                    NavEvent::RowsChanged(Pane::Master),
                    NavEvent::RowsChanged(Pane::Detail),
                    NavEvent::FormChanged,
                ])
            }
            Pane::Detail => {
                self.detail.search = text;
                self.load_detail(ds)?;
                if switched {
                    self.rebuild_form(ds)?;
                }
                self.load_form_data(ds)?;
                Ok(vec![
                    NavEvent::RowsChanged(Pane::Detail),
                    NavEvent::FormChanged,
                ])
            }
        }
    }

    fn new_record(&mut self, ds: &impl Datasource, pane: Pane) -> EngineResult<Vec<NavEvent>> {
        if self.active != pane {
            self.active = pane;
            if pane == Pane::Master {
                self.detail.search.clear();
            }
            self.rebuild_form(ds)?;
        }
        self.form.set_new();
        self.attachments.clear();
        self.bound_entity = None;
        Ok(vec![NavEvent::FormChanged])
    }

    fn save(&mut self, ds: &impl Datasource) -> EngineResult<Vec<NavEvent>> {
        let entity = self.active_entity();
        let values = self.form.extract();
        form::validate(entity, &values)?;

        if self.form.is_new() {
            ds.create_record(entity, &values)?;
        } else if let Some(id) = self.form.record_id() {
            ds.update_record(entity, id, &values)?;
        } else {
            return Err(EngineError::validation("id", "no record selected"));
        }

        // Reload the screen from scratch, landing on the first master row.
        self.master.search.clear();
        self.detail.search.clear();
        self.active = Pane::Master;
        self.load_master(ds)?;
        self.load_detail(ds)?;
        self.rebuild_form(ds)?;
        self.load_form_data(ds)?;
        Ok(vec![
            NavEvent::Status("saved".to_owned()),
            NavEvent::RowsChanged(Pane::Master),
            NavEvent::RowsChanged(Pane::Detail),
            NavEvent::FormChanged,
        ])
    }

    fn delete(
        &mut self,
        ds: &impl Datasource,
        pane: Pane,
        confirmed: bool,
    ) -> EngineResult<Vec<NavEvent>> {
        if !confirmed {
            return Ok(vec![NavEvent::Status("delete cancelled".to_owned())]);
        }

        match pane {
            Pane::Master => {
                let Some(id) = self.master.selected_id() else {
                    return Ok(Vec::new());
                };
                ds.delete_record(self.screen.master_entity(), id)?;
                self.load_master(ds)?;
                self.load_detail(ds)?;
                self.load_form_data(ds)?;
                Ok(vec![
                    NavEvent::Status("deleted".to_owned()),
                    NavEvent::RowsChanged(Pane::Master),
                    NavEvent::RowsChanged(Pane::Detail),
                    NavEvent::FormChanged,
                ])
            }
            Pane::Detail => {
                let Some(id) = self.detail.selected_id() else {
                    return Ok(Vec::new());
                };
                ds.delete_record(self.screen.detail_entity(), id)?;
                self.load_detail(ds)?;
                self.load_form_data(ds)?;
                Ok(vec![
                    NavEvent::Status("deleted".to_owned()),
                    NavEvent::RowsChanged(Pane::Detail),
                    NavEvent::FormChanged,
                ])
            }
        }
    }

    fn cancel(&mut self, ds: &impl Datasource) -> EngineResult<Vec<NavEvent>> {
        if self.active == Pane::Master {
            self.detail.search.clear();
            self.load_detail(ds)?;
        }
        self.rebuild_form(ds)?;
        self.load_form_data(ds)?;
        Ok(vec![NavEvent::FormChanged])
    }

    fn attach(&mut self, ds: &impl Datasource, paths: Vec<String>) -> EngineResult<Vec<NavEvent>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        let Some(entity_id) = self.bound_entity else {
            return Ok(vec![NavEvent::Status("no record selected".to_owned())]);
        };
        ds.add_documents(entity_id, &paths)?;
        self.reload_attachments(ds, entity_id)?;
        Ok(vec![NavEvent::AttachmentsChanged])
    }

    fn detach(&mut self, ds: &impl Datasource, paths: Vec<String>) -> EngineResult<Vec<NavEvent>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        let Some(entity_id) = self.bound_entity else {
            return Ok(vec![NavEvent::Status("no record selected".to_owned())]);
        };
        ds.remove_documents(entity_id, &paths)?;
        self.reload_attachments(ds, entity_id)?;
        Ok(vec![NavEvent::AttachmentsChanged])
    }

    fn load_master(&mut self, ds: &impl Datasource) -> EngineResult<()> {
        let mut rows = ds.master_rows(self.screen)?;
        apply_search(&mut rows, &self.master.search);
        self.master.set_rows(rows);
        Ok(())
    }

    fn load_detail(&mut self, ds: &impl Datasource) -> EngineResult<()> {
        match self.master.selected_id() {
            Some(master_id) => {
                let mut rows = ds.detail_rows(self.screen, master_id)?;
                apply_search(&mut rows, &self.detail.search);
                self.detail.set_rows(rows);
            }
            None => self.detail.clear(),
        }
        Ok(())
    }

    fn rebuild_form(&mut self, ds: &impl Datasource) -> EngineResult<()> {
        let mut form = Form::build(self.active_entity());
        for source in form.combo_sources() {
            let options = ds.combo_options(source)?;
            form.set_combo_options(source, &options);
        }
        self.form = form;
        Ok(())
    }

    fn load_form_data(&mut self, ds: &impl Datasource) -> EngineResult<()> {
        let pane = match self.active {
            Pane::Master => &self.master,
            Pane::Detail => &self.detail,
        };
        let instance = match pane.selected_id() {
            Some(id) => ds.get_record(self.active_entity(), id)?,
            None => None,
        };

        match instance {
            Some(instance) => {
                self.form.bind(&instance);
                self.bound_entity = instance.entity_id;
                match instance.entity_id {
                    Some(entity_id) => self.reload_attachments(ds, entity_id)?,
                    None => self.attachments.clear(),
                }
            }
            None => {
                self.form.clear();
                self.form.id_text.clear();
                self.bound_entity = None;
                self.attachments.clear();
            }
        }
        Ok(())
    }

    fn reload_attachments(&mut self, ds: &impl Datasource, entity_id: EntityId) -> EngineResult<()> {
        self.attachments = ds
            .list_documents(entity_id)?
            .into_iter()
            .map(|document| document.file_path)
            .collect();
        Ok(())
    }
}

/// Substring match over every displayed cell. Empty text keeps all rows.
fn apply_search(data: &mut TableData, text: &str) {
    if text.is_empty() {
        return;
    }
    data.rows.retain(|row| row.iter().any(|cell| cell.contains(text)));
}

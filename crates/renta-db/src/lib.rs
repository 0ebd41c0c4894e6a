// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use renta_app::{
    AddressInfo, ComboOption, ComboSource, ContactInfo, Datasource, Document, DocumentId,
    EngineError, EngineResult, EntityId, EntityType, FieldType, FieldValue, FieldValues,
    RecordId, RecordInstance, ScreenKind, TableData, format_date, format_time, meta, parse_date,
    parse_time,
};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::Date;
use time::macros::{date, time};

pub mod catalog;

use catalog::QuerySpec;

pub const APP_NAME: &str = "renta";

const DEFAULT_EMPLOYEE_CATEGORIES: [&str; 2] = ["Host", "Cleaner"];

const DEFAULT_SERVICE_TYPES: [&str; 4] = ["Day-time", "Night-time", "Weekend", "Holiday"];

const DEFAULT_SERVICE_CATEGORIES: [&str; 4] = ["Check-in", "Check-out", "Cleaning", "Extra"];

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("entity", &["id"]),
    ("document", &["id", "foreign_entity_id", "file_path"]),
    ("country", &["id", "country_name"]),
    ("city", &["id", "city_name", "country_id"]),
    ("employee_category", &["id", "e_category_name"]),
    ("service_type", &["id", "s_type_name"]),
    ("service_category", &["id", "s_category_name"]),
    (
        "customer",
        &[
            "id",
            "entity_id",
            "first_name",
            "last_name",
            "phone",
            "email",
            "language",
            "country_id",
            "city_id",
            "address",
            "zip_code",
            "notes",
        ],
    ),
    (
        "owner",
        &[
            "id",
            "entity_id",
            "first_name",
            "last_name",
            "phone",
            "email",
            "language",
            "country_id",
            "city_id",
            "address",
            "zip_code",
            "notes",
        ],
    ),
    (
        "agency",
        &[
            "id",
            "entity_id",
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
            "notes",
        ],
    ),
    (
        "apartment",
        &[
            "id",
            "entity_id",
            "apartment_name",
            "phone",
            "owner_id",
            "max_guests",
            "country_id",
            "city_id",
            "address",
            "zip_code",
            "parking_spaces",
            "notes",
        ],
    ),
    (
        "employee",
        &[
            "id",
            "entity_id",
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
            "notes",
        ],
    ),
    (
        "reservation",
        &[
            "id",
            "entity_id",
            "customer_id",
            "agency_id",
            "apartment_id",
            "checkin_date",
            "checkout_date",
            "guests",
            "amount",
            "tax",
            "deposit",
            "notes",
        ],
    ),
    (
        "service",
        &[
            "id",
            "entity_id",
            "reservation_id",
            "s_category_id",
            "s_type_id",
            "employee_id",
            "date",
            "time",
            "hours",
            "extra_price",
            "notes",
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_employee_category_name",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_employee_category_name ON employee_category (e_category_name);",
    },
    RequiredIndex {
        name: "idx_service_type_name",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_service_type_name ON service_type (s_type_name);",
    },
    RequiredIndex {
        name: "idx_service_category_name",
        create_sql: "CREATE UNIQUE INDEX IF NOT EXISTS idx_service_category_name ON service_category (s_category_name);",
    },
    RequiredIndex {
        name: "idx_document_entity",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_document_entity ON document (foreign_entity_id);",
    },
    RequiredIndex {
        name: "idx_city_country_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_city_country_id ON city (country_id);",
    },
    RequiredIndex {
        name: "idx_apartment_owner_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_apartment_owner_id ON apartment (owner_id);",
    },
    RequiredIndex {
        name: "idx_reservation_customer_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_reservation_customer_id ON reservation (customer_id);",
    },
    RequiredIndex {
        name: "idx_reservation_agency_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_reservation_agency_id ON reservation (agency_id);",
    },
    RequiredIndex {
        name: "idx_reservation_apartment_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_reservation_apartment_id ON reservation (apartment_id);",
    },
    RequiredIndex {
        name: "idx_service_reservation_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_service_reservation_id ON service (reservation_id);",
    },
    RequiredIndex {
        name: "idx_service_employee_id",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_service_employee_id ON service (employee_id);",
    },
];

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }

        ensure_required_indexes(&self.conn)?;

        self.seed_defaults()?;
        Ok(())
    }

    pub fn seed_defaults(&self) -> Result<()> {
        for category in DEFAULT_EMPLOYEE_CATEGORIES {
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO employee_category (e_category_name) VALUES (?)",
                    params![category],
                )
                .with_context(|| format!("insert default employee category {category}"))?;
        }

        for service_type in DEFAULT_SERVICE_TYPES {
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO service_type (s_type_name) VALUES (?)",
                    params![service_type],
                )
                .with_context(|| format!("insert default service type {service_type}"))?;
        }

        for category in DEFAULT_SERVICE_CATEGORIES {
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO service_category (s_category_name) VALUES (?)",
                    params![category],
                )
                .with_context(|| format!("insert default service category {category}"))?;
        }
        Ok(())
    }

    pub fn master_rows(&self, screen: ScreenKind) -> Result<TableData> {
        let spec = QuerySpec::master(screen);
        self.query_table(&spec, &[])
            .with_context(|| format!("load {} master rows", screen.as_str()))
    }

    pub fn detail_rows(&self, screen: ScreenKind, master_id: RecordId) -> Result<TableData> {
        let spec = QuerySpec::detail(screen);
        self.query_table(&spec, &[Value::Integer(master_id.get())])
            .with_context(|| format!("load {} detail rows", screen.as_str()))
    }

    fn query_table(&self, spec: &QuerySpec, params: &[Value]) -> Result<TableData> {
        let sql = spec.sql();
        let mut stmt = self.conn.prepare(&sql).context("prepare catalog query")?;
        let column_count = spec.columns.len();
        let rows = stmt
            .query_map(params_from_iter(params.iter().cloned()), |row| {
                let mut cells = Vec::with_capacity(column_count);
                for index in 0..column_count {
                    cells.push(value_ref_to_string(row.get_ref(index)?));
                }
                Ok(cells)
            })
            .context("run catalog query")?;
        Ok(TableData {
            columns: spec.column_names(),
            rows: rows
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("collect catalog rows")?,
        })
    }

    pub fn combo_options(&self, source: ComboSource) -> Result<Vec<ComboOption>> {
        let sql = combo_sql(source);
        let mut stmt = self
            .conn
            .prepare(sql)
            .with_context(|| format!("prepare {} combo query", source.entity_type().as_str()))?;
        let rows = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let label: String = row.get(1)?;
                Ok(ComboOption {
                    id: RecordId::new(id),
                    label,
                })
            })
            .context("query combo options")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect combo options")
    }

    pub fn get_record(&self, entity: EntityType, id: RecordId) -> Result<Option<RecordInstance>> {
        let fields = meta::persisted_fields(entity);
        let shared = entity.has_shared_identity();

        let mut columns: Vec<&str> = vec!["id"];
        if shared {
            columns.push("entity_id");
        }
        columns.extend(fields.iter().map(|(name, _)| *name));
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            columns.join(", "),
            entity.as_str(),
        );

        let raw = self
            .conn
            .query_row(&sql, params![id.get()], |row| {
                let mut cells: Vec<Value> = Vec::with_capacity(columns.len());
                for index in 0..columns.len() {
                    cells.push(row.get_ref(index)?.into());
                }
                Ok(cells)
            })
            .optional()
            .with_context(|| format!("load {} {}", entity.as_str(), id.get()))?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let mut cells = raw.into_iter();
        let record_id = match cells.next() {
            Some(Value::Integer(value)) => RecordId::new(value),
            other => bail!("unexpected id value {other:?} for {}", entity.as_str()),
        };
        let entity_id = if shared {
            match cells.next() {
                Some(Value::Integer(value)) => Some(EntityId::new(value)),
                other => bail!("unexpected entity_id value {other:?} for {}", entity.as_str()),
            }
        } else {
            None
        };

        let mut values = FieldValues::new();
        for ((field, field_type), cell) in fields.iter().copied().zip(cells) {
            let value = value_to_field(field_type, cell)
                .with_context(|| format!("read column {field} of {}", entity.as_str()))?;
            values.insert(field, value);
        }

        Ok(Some(RecordInstance {
            id: record_id,
            entity_id,
            values,
        }))
    }

    /// Insert a record. Shared-identity entities first get an `entity` row
    /// whose id is stamped on the business row; the whole sequence runs in
    /// one transaction.
    pub fn create_record(&self, entity: EntityType, values: &FieldValues) -> Result<RecordId> {
        let fields = meta::persisted_fields(entity);
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin create transaction")?;

        let mut columns: Vec<&str> = Vec::new();
        let mut bound: Vec<Value> = Vec::new();
        if entity.has_shared_identity() {
            tx.execute("INSERT INTO entity DEFAULT VALUES", [])
                .context("insert entity row")?;
            columns.push("entity_id");
            bound.push(Value::Integer(tx.last_insert_rowid()));
        }
        for (field, _) in fields.iter().copied() {
            columns.push(field);
            bound.push(field_to_sql(values.get(field).unwrap_or(&FieldValue::Null)));
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            entity.as_str(),
            columns.join(", "),
        );
        tx.execute(&sql, params_from_iter(bound))
            .with_context(|| format!("insert {}", entity.as_str()))?;
        let id = tx.last_insert_rowid();
        tx.commit().context("commit create transaction")?;
        Ok(RecordId::new(id))
    }

    /// Returns false when no row with the given id exists.
    pub fn update_record(
        &self,
        entity: EntityType,
        id: RecordId,
        values: &FieldValues,
    ) -> Result<bool> {
        let fields = meta::persisted_fields(entity);
        let assignments = fields
            .iter()
            .map(|(field, _)| format!("{field} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE id = ?",
            entity.as_str(),
        );

        let mut bound: Vec<Value> = fields
            .iter()
            .map(|(field, _)| field_to_sql(values.get(field).unwrap_or(&FieldValue::Null)))
            .collect();
        bound.push(Value::Integer(id.get()));

        let affected = self
            .conn
            .execute(&sql, params_from_iter(bound))
            .with_context(|| format!("update {} {}", entity.as_str(), id.get()))?;
        Ok(affected > 0)
    }

    /// Remove the business row together with its entity row. Attached
    /// documents go with the entity row through the cascade.
    pub fn delete_record(&self, entity: EntityType, id: RecordId) -> Result<bool> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin delete transaction")?;

        let affected = if entity.has_shared_identity() {
            let sql = format!("SELECT entity_id FROM {} WHERE id = ?", entity.as_str());
            let entity_id: Option<i64> = tx
                .query_row(&sql, params![id.get()], |row| row.get(0))
                .optional()
                .with_context(|| format!("find entity row of {} {}", entity.as_str(), id.get()))?;
            match entity_id {
                Some(entity_id) => tx
                    .execute("DELETE FROM entity WHERE id = ?", params![entity_id])
                    .with_context(|| format!("delete {} {}", entity.as_str(), id.get()))?,
                None => 0,
            }
        } else {
            let sql = format!("DELETE FROM {} WHERE id = ?", entity.as_str());
            tx.execute(&sql, params![id.get()])
                .with_context(|| format!("delete {} {}", entity.as_str(), id.get()))?
        };

        tx.commit().context("commit delete transaction")?;
        Ok(affected > 0)
    }

    pub fn list_documents(&self, entity_id: EntityId) -> Result<Vec<Document>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT id, foreign_entity_id, file_path
                FROM document
                WHERE foreign_entity_id = ?
                ORDER BY id ASC
                ",
            )
            .context("prepare documents query")?;
        let rows = stmt
            .query_map(params![entity_id.get()], |row| {
                let id: i64 = row.get(0)?;
                let foreign_entity_id: i64 = row.get(1)?;
                Ok(Document {
                    id: DocumentId::new(id),
                    entity_id: EntityId::new(foreign_entity_id),
                    file_path: row.get(2)?,
                })
            })
            .context("query documents")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect documents")
    }

    pub fn add_documents(&self, entity_id: EntityId, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin attach transaction")?;
        for path in paths {
            tx.execute(
                "INSERT INTO document (foreign_entity_id, file_path) VALUES (?, ?)",
                params![entity_id.get(), path],
            )
            .with_context(|| format!("attach document {path}"))?;
        }
        tx.commit().context("commit attach transaction")
    }

    pub fn remove_documents(&self, entity_id: EntityId, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin detach transaction")?;
        for path in paths {
            tx.execute(
                "DELETE FROM document WHERE foreign_entity_id = ? AND file_path = ?",
                params![entity_id.get(), path],
            )
            .with_context(|| format!("detach document {path}"))?;
        }
        tx.commit().context("commit detach transaction")
    }

    fn lookup_id(&self, entity: EntityType, column: &str, name: &str) -> Result<RecordId> {
        let sql = format!("SELECT id FROM {} WHERE {column} = ?", entity.as_str());
        let id: i64 = self
            .conn
            .query_row(&sql, params![name], |row| row.get(0))
            .with_context(|| format!("find {} named {name}", entity.as_str()))?;
        Ok(RecordId::new(id))
    }

    /// Install a small deterministic dataset through the regular record
    /// repository. Returns false when business data already exists.
    pub fn seed_demo_data(&self) -> Result<bool> {
        let customers: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM customer", [], |row| row.get(0))
            .context("count customers")?;
        if customers > 0 {
            return Ok(false);
        }

        let spain = self.create_record(EntityType::Country, &lookup_row("country_name", "Spain"))?;
        let france =
            self.create_record(EntityType::Country, &lookup_row("country_name", "France"))?;
        let madrid = self.create_record(EntityType::City, &city_row("Madrid", spain))?;
        let barcelona = self.create_record(EntityType::City, &city_row("Barcelona", spain))?;
        let paris = self.create_record(EntityType::City, &city_row("Paris", france))?;

        let host = self.lookup_id(EntityType::EmployeeCategory, "e_category_name", "Host")?;
        let cleaner = self.lookup_id(EntityType::EmployeeCategory, "e_category_name", "Cleaner")?;
        let day_time = self.lookup_id(EntityType::ServiceType, "s_type_name", "Day-time")?;
        let weekend = self.lookup_id(EntityType::ServiceType, "s_type_name", "Weekend")?;
        let check_in = self.lookup_id(EntityType::ServiceCategory, "s_category_name", "Check-in")?;
        let check_out =
            self.lookup_id(EntityType::ServiceCategory, "s_category_name", "Check-out")?;

        let marta = self.create_record(
            EntityType::Owner,
            &person_row(
                "Marta",
                "Soler",
                "Spanish",
                &ContactInfo {
                    phone: "+34 600 111 222".to_owned(),
                    email: "marta.soler@example.com".to_owned(),
                },
                &AddressInfo {
                    address: "Calle Mayor 12".to_owned(),
                    zip_code: "28013".to_owned(),
                },
                spain,
                madrid,
            ),
        )?;
        let jean = self.create_record(
            EntityType::Owner,
            &person_row(
                "Jean",
                "Petit",
                "French",
                &ContactInfo {
                    phone: "+33 6 11 22 33 44".to_owned(),
                    email: "jean.petit@example.com".to_owned(),
                },
                &AddressInfo {
                    address: "Rue Cler 8".to_owned(),
                    zip_code: "75007".to_owned(),
                },
                france,
                paris,
            ),
        )?;

        let sunway = self.create_record(
            EntityType::Agency,
            &agency_row("Sunway Rentals", "Pilar Vega", spain, madrid),
        )?;
        let horizon = self.create_record(
            EntityType::Agency,
            &agency_row("Bleu Horizon", "Amelie Roche", france, paris),
        )?;

        let gran_via = self.create_record(
            EntityType::Apartment,
            &apartment_row("Gran Via Loft", marta, 4, 1, spain, madrid),
        )?;
        let eixample = self.create_record(
            EntityType::Apartment,
            &apartment_row("Eixample Flat", marta, 6, 0, spain, barcelona),
        )?;
        let rue_cler = self.create_record(
            EntityType::Apartment,
            &apartment_row("Rue Cler Studio", jean, 2, 0, france, paris),
        )?;

        let rosa = self.create_record(
            EntityType::Employee,
            &employee_row("Rosa", "Marin", host, spain, madrid),
        )?;
        let pavel = self.create_record(
            EntityType::Employee,
            &employee_row("Pavel", "Novak", cleaner, spain, barcelona),
        )?;

        let ana = self.create_record(
            EntityType::Customer,
            &person_row(
                "Ana",
                "Puig",
                "Spanish",
                &ContactInfo {
                    phone: "+34 600 555 666".to_owned(),
                    email: "ana.puig@example.com".to_owned(),
                },
                &AddressInfo {
                    address: "Paseo del Prado 3".to_owned(),
                    zip_code: "28014".to_owned(),
                },
                spain,
                madrid,
            ),
        )?;
        let luc = self.create_record(
            EntityType::Customer,
            &person_row(
                "Luc",
                "Blanc",
                "French",
                &ContactInfo {
                    phone: "+33 6 55 66 77 88".to_owned(),
                    email: "luc.blanc@example.com".to_owned(),
                },
                &AddressInfo {
                    address: "Avenue Foch 21".to_owned(),
                    zip_code: "75116".to_owned(),
                },
                france,
                paris,
            ),
        )?;
        let greta = self.create_record(
            EntityType::Customer,
            &person_row(
                "Greta",
                "Weiss",
                "German",
                &ContactInfo {
                    phone: "+49 151 1234567".to_owned(),
                    email: "greta.weiss@example.com".to_owned(),
                },
                &AddressInfo {
                    address: "Carrer de Mallorca 40".to_owned(),
                    zip_code: "08013".to_owned(),
                },
                spain,
                barcelona,
            ),
        )?;

        let bookings = [
            (ana, sunway, gran_via, date!(2026 - 06 - 05), date!(2026 - 06 - 12), 2, 95.0),
            (luc, horizon, rue_cler, date!(2026 - 06 - 20), date!(2026 - 06 - 27), 2, 120.0),
            (greta, sunway, eixample, date!(2026 - 07 - 01), date!(2026 - 07 - 15), 5, 140.0),
            (ana, sunway, eixample, date!(2026 - 08 - 10), date!(2026 - 08 - 14), 4, 150.0),
        ];

        for (customer, agency, apartment, checkin, checkout, guests, rate) in bookings {
            let reservation = self.create_record(
                EntityType::Reservation,
                &reservation_row(customer, agency, apartment, checkin, checkout, guests, rate),
            )?;
            self.create_record(
                EntityType::Service,
                &service_row(reservation, check_in, day_time, rosa, checkin),
            )?;
            self.create_record(
                EntityType::Service,
                &service_row(reservation, check_out, weekend, pavel, checkout),
            )?;
        }

        Ok(true)
    }
}

impl Datasource for Store {
    fn master_rows(&self, screen: ScreenKind) -> EngineResult<TableData> {
        Store::master_rows(self, screen).map_err(storage_error)
    }

    fn detail_rows(&self, screen: ScreenKind, master_id: RecordId) -> EngineResult<TableData> {
        Store::detail_rows(self, screen, master_id).map_err(storage_error)
    }

    fn combo_options(&self, source: ComboSource) -> EngineResult<Vec<ComboOption>> {
        Store::combo_options(self, source).map_err(storage_error)
    }

    fn get_record(
        &self,
        entity: EntityType,
        id: RecordId,
    ) -> EngineResult<Option<RecordInstance>> {
        Store::get_record(self, entity, id).map_err(storage_error)
    }

    fn create_record(&self, entity: EntityType, values: &FieldValues) -> EngineResult<RecordId> {
        Store::create_record(self, entity, values).map_err(storage_error)
    }

    fn update_record(
        &self,
        entity: EntityType,
        id: RecordId,
        values: &FieldValues,
    ) -> EngineResult<()> {
        match Store::update_record(self, entity, id, values) {
            Ok(true) => Ok(()),
            Ok(false) => Err(EngineError::NotFound {
                entity: entity.as_str(),
                id: id.get(),
            }),
            Err(error) => Err(storage_error(error)),
        }
    }

    fn delete_record(&self, entity: EntityType, id: RecordId) -> EngineResult<()> {
        match Store::delete_record(self, entity, id) {
            Ok(true) => Ok(()),
            Ok(false) => Err(EngineError::NotFound {
                entity: entity.as_str(),
                id: id.get(),
            }),
            Err(error) => Err(storage_error(error)),
        }
    }

    fn list_documents(&self, entity_id: EntityId) -> EngineResult<Vec<Document>> {
        Store::list_documents(self, entity_id).map_err(storage_error)
    }

    fn add_documents(&self, entity_id: EntityId, paths: &[String]) -> EngineResult<()> {
        Store::add_documents(self, entity_id, paths).map_err(storage_error)
    }

    fn remove_documents(&self, entity_id: EntityId, paths: &[String]) -> EngineResult<()> {
        Store::remove_documents(self, entity_id, paths).map_err(storage_error)
    }
}

fn storage_error(error: anyhow::Error) -> EngineError {
    EngineError::Storage(format!("{error:#}"))
}

const fn combo_sql(source: ComboSource) -> &'static str {
    match source {
        ComboSource::Country => "SELECT id, country_name FROM country ORDER BY id ASC",
        ComboSource::City => "SELECT id, city_name FROM city ORDER BY id ASC",
        ComboSource::Customer => {
            "SELECT id, first_name || ' ' || last_name FROM customer ORDER BY id ASC"
        }
        ComboSource::Owner => {
            "SELECT id, first_name || ' ' || last_name FROM owner ORDER BY id ASC"
        }
        ComboSource::Agency => "SELECT id, agency_name FROM agency ORDER BY id ASC",
        ComboSource::Apartment => "SELECT id, apartment_name FROM apartment ORDER BY id ASC",
        ComboSource::Employee => {
            "SELECT id, first_name || ' ' || last_name FROM employee ORDER BY id ASC"
        }
        ComboSource::Reservation => {
            "SELECT id, CAST(id AS TEXT) FROM reservation ORDER BY id ASC"
        }
        ComboSource::EmployeeCategory => {
            "SELECT id, e_category_name FROM employee_category ORDER BY id ASC"
        }
        ComboSource::ServiceType => "SELECT id, s_type_name FROM service_type ORDER BY id ASC",
        ComboSource::ServiceCategory => {
            "SELECT id, s_category_name FROM service_category ORDER BY id ASC"
        }
    }
}

fn lookup_row(field: &'static str, name: &str) -> FieldValues {
    let mut values = FieldValues::new();
    values.insert(field, FieldValue::Text(name.to_owned()));
    values
}

fn city_row(name: &str, country: RecordId) -> FieldValues {
    let mut values = lookup_row("city_name", name);
    values.insert("country_id", FieldValue::Id(country));
    values
}

fn person_row(
    first: &str,
    last: &str,
    language: &str,
    contact: &ContactInfo,
    address: &AddressInfo,
    country: RecordId,
    city: RecordId,
) -> FieldValues {
    let mut values = FieldValues::new();
    values.insert("first_name", FieldValue::Text(first.to_owned()));
    values.insert("last_name", FieldValue::Text(last.to_owned()));
    values.insert("language", FieldValue::Text(language.to_owned()));
    contact.apply(&mut values);
    address.apply(&mut values);
    values.insert("country_id", FieldValue::Id(country));
    values.insert("city_id", FieldValue::Id(city));
    values
}

fn agency_row(name: &str, contact_person: &str, country: RecordId, city: RecordId) -> FieldValues {
    let mut values = FieldValues::new();
    values.insert("agency_name", FieldValue::Text(name.to_owned()));
    values.insert("contact_person", FieldValue::Text(contact_person.to_owned()));
    values.insert("cp_phone", FieldValue::Text(String::new()));
    values.insert("website", FieldValue::Text(String::new()));
    ContactInfo::default().apply(&mut values);
    AddressInfo::default().apply(&mut values);
    values.insert("country_id", FieldValue::Id(country));
    values.insert("city_id", FieldValue::Id(city));
    values
}

fn apartment_row(
    name: &str,
    owner: RecordId,
    max_guests: i64,
    parking_spaces: i64,
    country: RecordId,
    city: RecordId,
) -> FieldValues {
    let mut values = FieldValues::new();
    values.insert("apartment_name", FieldValue::Text(name.to_owned()));
    values.insert("phone", FieldValue::Text(String::new()));
    values.insert("owner_id", FieldValue::Id(owner));
    values.insert("max_guests", FieldValue::Integer(max_guests));
    values.insert("parking_spaces", FieldValue::Integer(parking_spaces));
    AddressInfo::default().apply(&mut values);
    values.insert("country_id", FieldValue::Id(country));
    values.insert("city_id", FieldValue::Id(city));
    values
}

fn employee_row(
    first: &str,
    last: &str,
    category: RecordId,
    country: RecordId,
    city: RecordId,
) -> FieldValues {
    let mut values = FieldValues::new();
    values.insert("first_name", FieldValue::Text(first.to_owned()));
    values.insert("last_name", FieldValue::Text(last.to_owned()));
    ContactInfo::default().apply(&mut values);
    values.insert("e_category_id", FieldValue::Id(category));
    values.insert("start_date", FieldValue::Date(date!(2026 - 01 - 01)));
    values.insert("end_date", FieldValue::Date(date!(2026 - 12 - 31)));
    AddressInfo::default().apply(&mut values);
    values.insert("country_id", FieldValue::Id(country));
    values.insert("city_id", FieldValue::Id(city));
    values
}

fn reservation_row(
    customer: RecordId,
    agency: RecordId,
    apartment: RecordId,
    checkin: Date,
    checkout: Date,
    guests: i64,
    nightly_rate: f64,
) -> FieldValues {
    let nights = (checkout - checkin).whole_days() as f64;
    let amount = nights * nightly_rate;
    let mut values = FieldValues::new();
    values.insert("customer_id", FieldValue::Id(customer));
    values.insert("agency_id", FieldValue::Id(agency));
    values.insert("apartment_id", FieldValue::Id(apartment));
    values.insert("checkin_date", FieldValue::Date(checkin));
    values.insert("checkout_date", FieldValue::Date(checkout));
    values.insert("guests", FieldValue::Integer(guests));
    values.insert("amount", FieldValue::Decimal(amount));
    values.insert("tax", FieldValue::Decimal(amount * 0.10));
    values.insert("deposit", FieldValue::Decimal(100.0));
    values
}

fn service_row(
    reservation: RecordId,
    category: RecordId,
    service_type: RecordId,
    employee: RecordId,
    day: Date,
) -> FieldValues {
    let mut values = FieldValues::new();
    values.insert("reservation_id", FieldValue::Id(reservation));
    values.insert("s_category_id", FieldValue::Id(category));
    values.insert("s_type_id", FieldValue::Id(service_type));
    values.insert("employee_id", FieldValue::Id(employee));
    values.insert("date", FieldValue::Date(day));
    values.insert("time", FieldValue::Time(time!(10:00)));
    values.insert("hours", FieldValue::Time(time!(01:00)));
    values.insert("extra_price", FieldValue::Decimal(0.0));
    values
}

fn field_to_sql(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Text(text) => Value::Text(text.clone()),
        FieldValue::Integer(raw) => Value::Integer(*raw),
        FieldValue::Decimal(raw) => Value::Real(*raw),
        FieldValue::Date(raw) => Value::Text(format_date(*raw)),
        FieldValue::Time(raw) => Value::Text(format_time(*raw)),
        FieldValue::Id(id) => Value::Integer(id.get()),
    }
}

fn value_to_field(field_type: FieldType, value: Value) -> Result<FieldValue> {
    match (field_type, value) {
        (_, Value::Null) => Ok(FieldValue::Null),
        (FieldType::Text, Value::Text(text)) => Ok(FieldValue::Text(text)),
        (FieldType::Integer, Value::Integer(raw)) => Ok(FieldValue::Integer(raw)),
        (FieldType::Decimal, Value::Real(raw)) => Ok(FieldValue::Decimal(raw)),
        (FieldType::Decimal, Value::Integer(raw)) => Ok(FieldValue::Decimal(raw as f64)),
        (FieldType::Date, Value::Text(raw)) => parse_date(&raw)
            .map(FieldValue::Date)
            .ok_or_else(|| anyhow!("unsupported date format {raw:?}")),
        (FieldType::Time, Value::Text(raw)) => parse_time(&raw)
            .map(FieldValue::Time)
            .ok_or_else(|| anyhow!("unsupported time format {raw:?}")),
        (FieldType::ForeignKey, Value::Integer(raw)) => Ok(FieldValue::Id(RecordId::new(raw))),
        (expected, other) => bail!("expected {expected:?}, got {other:?}"),
    }
}

fn value_ref_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Text(value) => String::from_utf8_lossy(value).into_owned(),
        ValueRef::Blob(value) => format!("{value:?}"),
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("RENTA_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set RENTA_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("renta.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; use a renta-compatible database or migrate first"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; run migration before launching",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; run migration before launching",
            missing.join(", ")
        );
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

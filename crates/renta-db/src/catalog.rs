// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Master and detail query catalog.
//!
//! Every master query projects a screen's rows with foreign keys joined out
//! to display names. Detail queries are never written by hand: each one is
//! derived from some screen's master query by dropping columns and adding a
//! correlation predicate with a single positional parameter.

use renta_app::ScreenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryColumn {
    pub expr: &'static str,
    pub alias: &'static str,
}

const fn col(expr: &'static str, alias: &'static str) -> QueryColumn {
    QueryColumn { expr, alias }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub columns: Vec<QueryColumn>,
    pub from: &'static str,
    pub joins: Vec<&'static str>,
    pub correlation: Option<&'static str>,
}

impl QuerySpec {
    pub fn master(screen: ScreenKind) -> Self {
        match screen {
            ScreenKind::Reservation => Self {
                columns: vec![
                    col("r.id", "id"),
                    col("c.first_name || ' ' || c.last_name", "customer"),
                    col("a.agency_name", "agency_name"),
                    col("ap.apartment_name", "apartment_name"),
                    col("r.checkin_date", "checkin_date"),
                    col("r.checkout_date", "checkout_date"),
                    col("r.guests", "guests"),
                    col("r.amount", "amount"),
                    col("r.tax", "tax"),
                    col("r.deposit", "deposit"),
                    col("r.notes", "notes"),
                ],
                from: "reservation r",
                joins: vec![
                    "JOIN customer c ON r.customer_id = c.id",
                    "JOIN agency a ON r.agency_id = a.id",
                    "JOIN apartment ap ON r.apartment_id = ap.id",
                ],
                correlation: None,
            },
            ScreenKind::Service => Self {
                columns: vec![
                    col("s.id", "id"),
                    col("sc.s_category_name", "s_category_name"),
                    col("st.s_type_name", "s_type_name"),
                    col("e.first_name || ' ' || e.last_name", "employee"),
                    col("s.date", "date"),
                    col("s.time", "time"),
                    col("s.hours", "hours"),
                    col("s.extra_price", "extra_price"),
                    col("s.notes", "notes"),
                ],
                from: "service s",
                joins: vec![
                    "JOIN reservation r ON s.reservation_id = r.id",
                    "JOIN service_category sc ON s.s_category_id = sc.id",
                    "JOIN service_type st ON s.s_type_id = st.id",
                    "JOIN employee e ON s.employee_id = e.id",
                ],
                correlation: None,
            },
            ScreenKind::Customer => Self {
                columns: vec![
                    col("c.id", "id"),
                    col("c.first_name", "first_name"),
                    col("c.last_name", "last_name"),
                    col("c.phone", "phone"),
                    col("c.email", "email"),
                    col("c.language", "language"),
                    col("co.country_name", "country_name"),
                    col("ci.city_name", "city_name"),
                    col("c.address", "address"),
                    col("c.zip_code", "zip_code"),
                    col("c.notes", "notes"),
                ],
                from: "customer c",
                joins: vec![
                    "JOIN country co ON c.country_id = co.id",
                    "JOIN city ci ON c.city_id = ci.id",
                ],
                correlation: None,
            },
            ScreenKind::Employee => Self {
                columns: vec![
                    col("e.id", "id"),
                    col("e.first_name", "first_name"),
                    col("e.last_name", "last_name"),
                    col("e.phone", "phone"),
                    col("e.email", "email"),
                    col("ec.e_category_name", "e_category_name"),
                    col("e.start_date", "start_date"),
                    col("e.end_date", "end_date"),
                    col("co.country_name", "country_name"),
                    col("ci.city_name", "city_name"),
                    col("e.address", "address"),
                    col("e.zip_code", "zip_code"),
                    col("e.notes", "notes"),
                ],
                from: "employee e",
                joins: vec![
                    "JOIN employee_category ec ON e.e_category_id = ec.id",
                    "JOIN country co ON e.country_id = co.id",
                    "JOIN city ci ON e.city_id = ci.id",
                ],
                correlation: None,
            },
            ScreenKind::Agency => Self {
                columns: vec![
                    col("a.id", "id"),
                    col("a.agency_name", "agency_name"),
                    col("a.phone", "phone"),
                    col("a.contact_person", "contact_person"),
                    col("a.cp_phone", "cp_phone"),
                    col("a.email", "email"),
                    col("a.website", "website"),
                    col("co.country_name", "country_name"),
                    col("ci.city_name", "city_name"),
                    col("a.address", "address"),
                    col("a.zip_code", "zip_code"),
                    col("a.notes", "notes"),
                ],
                from: "agency a",
                joins: vec![
                    "JOIN country co ON a.country_id = co.id",
                    "JOIN city ci ON a.city_id = ci.id",
                ],
                correlation: None,
            },
            ScreenKind::Owner => Self {
                columns: vec![
                    col("o.id", "id"),
                    col("o.first_name", "first_name"),
                    col("o.last_name", "last_name"),
                    col("o.phone", "phone"),
                    col("o.email", "email"),
                    col("o.language", "language"),
                    col("co.country_name", "country_name"),
                    col("ci.city_name", "city_name"),
                    col("o.address", "address"),
                    col("o.zip_code", "zip_code"),
                    col("o.notes", "notes"),
                ],
                from: "owner o",
                joins: vec![
                    "JOIN country co ON o.country_id = co.id",
                    "JOIN city ci ON o.city_id = ci.id",
                ],
                correlation: None,
            },
            ScreenKind::Apartment => Self {
                columns: vec![
                    col("ap.id", "id"),
                    col("ap.apartment_name", "apartment_name"),
                    col("ap.phone", "phone"),
                    col("o.first_name || ' ' || o.last_name", "owner"),
                    col("ap.max_guests", "max_guests"),
                    col("co.country_name", "country_name"),
                    col("ci.city_name", "city_name"),
                    col("ap.address", "address"),
                    col("ap.zip_code", "zip_code"),
                    col("ap.parking_spaces", "parking_spaces"),
                    col("ap.notes", "notes"),
                ],
                from: "apartment ap",
                joins: vec![
                    "JOIN owner o ON ap.owner_id = o.id",
                    "JOIN country co ON ap.country_id = co.id",
                    "JOIN city ci ON ap.city_id = ci.id",
                ],
                correlation: None,
            },
        }
    }

    /// Detail queries reproject a master query and correlate it on the
    /// screen's master row id.
    pub fn detail(screen: ScreenKind) -> Self {
        match screen {
            ScreenKind::Reservation => Self::master(ScreenKind::Service).correlated("r.id = ?"),
            ScreenKind::Service => {
                let mut spec = Self::master(ScreenKind::Reservation);
                spec.joins.push("JOIN service s ON s.reservation_id = r.id");
                spec.correlated("s.id = ?")
            }
            ScreenKind::Customer => Self::master(ScreenKind::Reservation)
                .without("customer")
                .correlated("c.id = ?"),
            ScreenKind::Employee => Self::master(ScreenKind::Service)
                .without("employee")
                .correlated("e.id = ?"),
            ScreenKind::Agency => Self::master(ScreenKind::Reservation)
                .without("agency_name")
                .correlated("a.id = ?"),
            ScreenKind::Owner => Self::master(ScreenKind::Apartment)
                .without("owner")
                .correlated("o.id = ?"),
            ScreenKind::Apartment => Self::master(ScreenKind::Reservation)
                .without("apartment_name")
                .correlated("ap.id = ?"),
        }
    }

    fn without(mut self, alias: &str) -> Self {
        self.columns.retain(|column| column.alias != alias);
        self
    }

    fn correlated(mut self, predicate: &'static str) -> Self {
        self.correlation = Some(predicate);
        self
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.alias.to_owned())
            .collect()
    }

    pub fn sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|column| format!("{} AS {}", column.expr, column.alias))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {columns} FROM {}", self.from);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if let Some(predicate) = self.correlation {
            sql.push_str(" WHERE ");
            sql.push_str(predicate);
        }
        sql.push_str(" ORDER BY id ASC");
        sql
    }
}

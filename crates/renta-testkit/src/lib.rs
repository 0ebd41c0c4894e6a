// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use renta_app::{AddressInfo, ContactInfo, FieldValue, FieldValues, RecordId};
use std::path::PathBuf;
use time::{Date, Duration, Month, Time};

const FIRST_NAMES: [&str; 16] = [
    "Ana", "Luc", "Marta", "Jean", "Greta", "Pavel", "Rosa", "Nico", "Ines", "Hugo", "Clara",
    "Diego", "Elena", "Marc", "Sofia", "Tomas",
];
const LAST_NAMES: [&str; 16] = [
    "Puig", "Blanc", "Soler", "Petit", "Weiss", "Novak", "Marin", "Costa", "Ferrer", "Moreau",
    "Vidal", "Roca", "Laurent", "Serra", "Dubois", "Pons",
];
const LANGUAGES: [&str; 6] = ["Spanish", "French", "English", "German", "Italian", "Dutch"];

const STREET_NAMES: [&str; 12] = [
    "Calle Mayor",
    "Gran Via",
    "Paseo del Prado",
    "Rue Cler",
    "Avenue Foch",
    "Carrer de Mallorca",
    "Plaza Nueva",
    "Rambla Catalunya",
    "Rue de Rivoli",
    "Calle Serrano",
    "Passeig de Gracia",
    "Boulevard Saint-Michel",
];

const EMAIL_DOMAINS: [&str; 4] = [
    "example.com",
    "mail.example.net",
    "rentals.example.org",
    "stay.example.io",
];

const AGENCY_ADJECTIVES: [&str; 8] = [
    "Sunway", "Bleu", "Costa", "Urban", "Prime", "Vista", "Mediterra", "Capital",
];
const AGENCY_SUFFIXES: [&str; 5] = ["Rentals", "Horizon", "Stays", "Lettings", "Properties"];

const APARTMENT_STYLES: [&str; 8] = [
    "Loft", "Flat", "Studio", "Penthouse", "Duplex", "Attic", "Garden Flat", "Suite",
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic generator of record field maps for the rental screens.
/// Same seed, same sequence of rows.
#[derive(Debug, Clone)]
pub struct RentalFaker {
    rng: DeterministicRng,
}

impl RentalFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// Customer and owner rows share one shape.
    pub fn person(&mut self, country: RecordId, city: RecordId) -> FieldValues {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);

        let mut values = FieldValues::new();
        values.insert("first_name", FieldValue::Text(first.to_owned()));
        values.insert("last_name", FieldValue::Text(last.to_owned()));
        values.insert(
            "language",
            FieldValue::Text(self.pick(&LANGUAGES).to_owned()),
        );
        self.contact(first, last).apply(&mut values);
        self.street_address().apply(&mut values);
        values.insert("country_id", FieldValue::Id(country));
        values.insert("city_id", FieldValue::Id(city));
        values
    }

    pub fn agency(&mut self, country: RecordId, city: RecordId) -> FieldValues {
        let name = format!(
            "{} {}",
            self.pick(&AGENCY_ADJECTIVES),
            self.pick(&AGENCY_SUFFIXES),
        );
        let contact_first = self.pick(&FIRST_NAMES);
        let contact_last = self.pick(&LAST_NAMES);

        let mut values = FieldValues::new();
        values.insert("agency_name", FieldValue::Text(name.clone()));
        values.insert(
            "contact_person",
            FieldValue::Text(format!("{contact_first} {contact_last}")),
        );
        values.insert("cp_phone", FieldValue::Text(self.phone()));
        values.insert(
            "website",
            FieldValue::Text(format!(
                "https://{}.example.com",
                name.to_ascii_lowercase().replace(' ', "-"),
            )),
        );
        self.contact(contact_first, contact_last).apply(&mut values);
        self.street_address().apply(&mut values);
        values.insert("country_id", FieldValue::Id(country));
        values.insert("city_id", FieldValue::Id(city));
        values
    }

    pub fn apartment(
        &mut self,
        owner: RecordId,
        country: RecordId,
        city: RecordId,
    ) -> FieldValues {
        let mut values = FieldValues::new();
        values.insert(
            "apartment_name",
            FieldValue::Text(format!(
                "{} {}",
                self.pick(&STREET_NAMES),
                self.pick(&APARTMENT_STYLES),
            )),
        );
        values.insert("phone", FieldValue::Text(self.phone()));
        values.insert("owner_id", FieldValue::Id(owner));
        values.insert(
            "max_guests",
            FieldValue::Integer(self.int_range(1, 8)),
        );
        values.insert(
            "parking_spaces",
            FieldValue::Integer(self.int_range(0, 2)),
        );
        self.street_address().apply(&mut values);
        values.insert("country_id", FieldValue::Id(country));
        values.insert("city_id", FieldValue::Id(city));
        values
    }

    pub fn employee(
        &mut self,
        category: RecordId,
        country: RecordId,
        city: RecordId,
    ) -> FieldValues {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let start = self.date_in_year(REFERENCE_YEAR - 1);

        let mut values = FieldValues::new();
        values.insert("first_name", FieldValue::Text(first.to_owned()));
        values.insert("last_name", FieldValue::Text(last.to_owned()));
        self.contact(first, last).apply(&mut values);
        values.insert("e_category_id", FieldValue::Id(category));
        values.insert("start_date", FieldValue::Date(start));
        values.insert(
            "end_date",
            FieldValue::Date(start + Duration::days(self.int_range(180, 720))),
        );
        self.street_address().apply(&mut values);
        values.insert("country_id", FieldValue::Id(country));
        values.insert("city_id", FieldValue::Id(city));
        values
    }

    pub fn reservation(
        &mut self,
        customer: RecordId,
        agency: RecordId,
        apartment: RecordId,
    ) -> FieldValues {
        let checkin = self.date_in_year(REFERENCE_YEAR);
        let nights = self.int_range(2, 21);
        let checkout = checkin + Duration::days(nights);
        let nightly_rate = self.int_range(60, 220) as f64;
        let amount = nights as f64 * nightly_rate;

        let mut values = FieldValues::new();
        values.insert("customer_id", FieldValue::Id(customer));
        values.insert("agency_id", FieldValue::Id(agency));
        values.insert("apartment_id", FieldValue::Id(apartment));
        values.insert("checkin_date", FieldValue::Date(checkin));
        values.insert("checkout_date", FieldValue::Date(checkout));
        values.insert("guests", FieldValue::Integer(self.int_range(1, 6)));
        values.insert("amount", FieldValue::Decimal(amount));
        values.insert("tax", FieldValue::Decimal(amount * 0.10));
        values.insert("deposit", FieldValue::Decimal(100.0));
        values
    }

    pub fn service(
        &mut self,
        reservation: RecordId,
        category: RecordId,
        service_type: RecordId,
        employee: RecordId,
    ) -> FieldValues {
        let mut values = FieldValues::new();
        values.insert("reservation_id", FieldValue::Id(reservation));
        values.insert("s_category_id", FieldValue::Id(category));
        values.insert("s_type_id", FieldValue::Id(service_type));
        values.insert("employee_id", FieldValue::Id(employee));
        values.insert(
            "date",
            FieldValue::Date(self.date_in_year(REFERENCE_YEAR)),
        );
        values.insert("time", FieldValue::Time(self.day_time()));
        values.insert(
            "hours",
            FieldValue::Time(Time::from_hms(self.int_range(1, 4) as u8, 0, 0).expect("valid hours")),
        );
        values.insert(
            "extra_price",
            FieldValue::Decimal(self.int_range(0, 80) as f64),
        );
        values
    }

    pub fn date_in_year(&mut self, year: i32) -> Date {
        let month = Month::try_from(self.int_range(1, 12) as u8).expect("valid month");
        let day = self.int_range(1, 28) as u8;
        Date::from_calendar_date(year, month, day).expect("valid calendar date")
    }

    fn day_time(&mut self) -> Time {
        Time::from_hms(self.int_range(8, 20) as u8, 0, 0).expect("valid time of day")
    }

    fn contact(&mut self, first: &str, last: &str) -> ContactInfo {
        ContactInfo {
            phone: self.phone(),
            email: format!(
                "{}.{}@{}",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase(),
                self.pick(&EMAIL_DOMAINS),
            ),
        }
    }

    fn street_address(&mut self) -> AddressInfo {
        AddressInfo {
            address: format!("{} {}", self.pick(&STREET_NAMES), self.int_range(1, 120)),
            zip_code: format!("{:05}", self.int_range(10_000, 99_999)),
        }
    }

    fn phone(&mut self) -> String {
        format!(
            "+34 {:03} {:03} {:03}",
            self.int_range(600, 699),
            self.int_range(100, 999),
            self.int_range(100, 999),
        )
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as u64;
        min + (self.rng.next_u64() % span) as i64
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("renta.db");
    Ok((dir, db_path))
}

pub fn reference_year() -> i32 {
    REFERENCE_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_generates_the_same_rows() {
        let mut left = RentalFaker::new(42);
        let mut right = RentalFaker::new(42);
        let country = RecordId::new(1);
        let city = RecordId::new(1);
        assert_eq!(left.person(country, city), right.person(country, city));
    }

    #[test]
    fn person_rows_carry_contact_and_address_fields() {
        let mut faker = RentalFaker::new(1);
        let person = faker.person(RecordId::new(1), RecordId::new(2));
        for field in [
            "first_name",
            "last_name",
            "phone",
            "email",
            "language",
            "country_id",
            "city_id",
            "address",
            "zip_code",
        ] {
            assert!(person.contains_key(field), "missing {field}");
        }
        assert_eq!(person.get("country_id"), Some(&FieldValue::Id(RecordId::new(1))));
    }

    #[test]
    fn reservation_checkout_follows_checkin() {
        let mut faker = RentalFaker::new(7);
        let booking =
            faker.reservation(RecordId::new(1), RecordId::new(1), RecordId::new(1));
        let checkin = match booking.get("checkin_date") {
            Some(FieldValue::Date(value)) => *value,
            other => panic!("unexpected checkin {other:?}"),
        };
        let checkout = match booking.get("checkout_date") {
            Some(FieldValue::Date(value)) => *value,
            other => panic!("unexpected checkout {other:?}"),
        };
        assert!(checkout > checkin);
    }

    #[test]
    fn reservation_tax_is_ten_percent_of_amount() {
        let mut faker = RentalFaker::new(9);
        let booking =
            faker.reservation(RecordId::new(2), RecordId::new(2), RecordId::new(2));
        let amount = match booking.get("amount") {
            Some(FieldValue::Decimal(value)) => *value,
            other => panic!("unexpected amount {other:?}"),
        };
        let tax = match booking.get("tax") {
            Some(FieldValue::Decimal(value)) => *value,
            other => panic!("unexpected tax {other:?}"),
        };
        assert!((tax - amount * 0.10).abs() < 1e-9);
    }

    #[test]
    fn employee_dates_form_a_range() {
        let mut faker = RentalFaker::new(11);
        let employee = faker.employee(RecordId::new(1), RecordId::new(1), RecordId::new(1));
        let start = match employee.get("start_date") {
            Some(FieldValue::Date(value)) => *value,
            other => panic!("unexpected start {other:?}"),
        };
        let end = match employee.get("end_date") {
            Some(FieldValue::Date(value)) => *value,
            other => panic!("unexpected end {other:?}"),
        };
        assert!(end > start);
    }

    #[test]
    fn variety_across_seeds() {
        let mut names = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let mut faker = RentalFaker::new(seed);
            let agency = faker.agency(RecordId::new(1), RecordId::new(1));
            if let Some(FieldValue::Text(name)) = agency.get("agency_name") {
                names.insert(name.clone());
            }
        }
        assert!(names.len() >= 8, "got {}", names.len());
    }

    #[test]
    fn temp_db_path_lives_inside_its_temp_dir() {
        let (dir, path) = temp_db_path().unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path.ends_with("renta.db"));
    }
}

//! Database schema definitions and seed dataset
//!
//! The DDL text is authoritative and shared verbatim by both backends so the
//! development file and the production database stay schema-compatible.

use crate::value::SqlValue;
use crate::Result;

/// SQL to create the drivers table
pub const CREATE_DRIVERS_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS drivers (
      id TEXT PRIMARY KEY,
      name TEXT NOT NULL,
      department TEXT NOT NULL
    )"#;

/// SQL to create the vehicles table
pub const CREATE_VEHICLES_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS vehicles (
      id TEXT PRIMARY KEY,
      model TEXT NOT NULL,
      isCheckedOut BOOLEAN DEFAULT FALSE,
      currentDriver TEXT,
      FOREIGN KEY (currentDriver) REFERENCES drivers (id)
    )"#;

/// SQL to create the history table
pub const CREATE_HISTORY_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS history (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      vehicleId TEXT NOT NULL,
      driverId TEXT NOT NULL,
      checkoutTime DATETIME DEFAULT CURRENT_TIMESTAMP,
      returnTime DATETIME,
      FOREIGN KEY (vehicleId) REFERENCES vehicles (id),
      FOREIGN KEY (driverId) REFERENCES drivers (id)
    )"#;

/// SQL to create the users table
pub const CREATE_USERS_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS users (
      id TEXT PRIMARY KEY,
      username TEXT NOT NULL UNIQUE,
      password TEXT NOT NULL,
      role TEXT NOT NULL CHECK (role IN ('admin', 'driver')),
      driverId TEXT,
      driverName TEXT,
      FOREIGN KEY (driverId) REFERENCES drivers (id)
    )"#;

/// All schema creation statements, in foreign-key dependency order
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![
        CREATE_DRIVERS_TABLE,
        CREATE_VEHICLES_TABLE,
        CREATE_HISTORY_TABLE,
        CREATE_USERS_TABLE,
    ]
}

/// Default credentials for the bootstrap admin account
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// bcrypt cost factor for the seeded admin password
pub const SEED_HASH_COST: u32 = 10;

const INSERT_DRIVER: &str = "INSERT INTO drivers (id, name, department) VALUES (?, ?, ?)";
const INSERT_VEHICLE: &str = "INSERT INTO vehicles (id, model, isCheckedOut) VALUES (?, ?, FALSE)";
const INSERT_USER: &str = "INSERT INTO users (id, username, password, role) VALUES (?, ?, ?, ?)";

/// The fixed bootstrap rows: two drivers, four vehicles (none checked out),
/// and one admin user whose password is hashed at seed time.
///
/// Never stores the default password in plaintext.
pub fn seed_statements() -> Result<Vec<(&'static str, Vec<SqlValue>)>> {
    let hashed = bcrypt::hash(DEFAULT_ADMIN_PASSWORD, SEED_HASH_COST)?;

    Ok(vec![
        (
            INSERT_DRIVER,
            vec!["1".into(), "Luan Oliveira de Brito Nunes".into(), "Administração".into()],
        ),
        (
            INSERT_DRIVER,
            vec!["2".into(), "José Borges".into(), "Motorista".into()],
        ),
        (INSERT_VEHICLE, vec!["RSB7C87".into(), "NISSAN VERSA".into()]),
        (INSERT_VEHICLE, vec!["QKE1B38".into(), "HILUX MARCELO".into()]),
        (INSERT_VEHICLE, vec!["QKI7G71".into(), "PRESIDÊNCIA".into()]),
        (INSERT_VEHICLE, vec!["QKE1B6".into(), "HILUX ADMINISTRAÇÃO".into()]),
        (
            INSERT_USER,
            vec![
                DEFAULT_ADMIN_USERNAME.into(),
                DEFAULT_ADMIN_USERNAME.into(),
                hashed.into(),
                "admin".into(),
            ],
        ),
    ])
}

/// Probe used to decide whether seed rows are already present
pub const SEED_PROBE: &str = "SELECT COUNT(*) FROM drivers";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order_satisfies_foreign_keys() {
        let stmts = all_schema_statements();
        assert_eq!(stmts.len(), 4);
        assert!(stmts[0].contains("drivers"));
        assert!(stmts[1].contains("vehicles"));
        assert!(stmts[2].contains("history"));
        assert!(stmts[3].contains("users"));
    }

    #[test]
    fn test_seed_password_is_hashed() {
        let seeds = seed_statements().unwrap();
        let (_, user_params) = seeds.last().unwrap();
        let SqlValue::Text(stored) = &user_params[2] else {
            panic!("password parameter should be text");
        };
        assert_ne!(stored, DEFAULT_ADMIN_PASSWORD);
        assert!(bcrypt::verify(DEFAULT_ADMIN_PASSWORD, stored).unwrap());
    }

    #[test]
    fn test_seed_row_counts() {
        let seeds = seed_statements().unwrap();
        let drivers = seeds.iter().filter(|(sql, _)| sql.contains("INTO drivers")).count();
        let vehicles = seeds.iter().filter(|(sql, _)| sql.contains("INTO vehicles")).count();
        let users = seeds.iter().filter(|(sql, _)| sql.contains("INTO users")).count();
        assert_eq!((drivers, vehicles, users), (2, 4, 1));
    }
}

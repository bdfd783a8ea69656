// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client repository.

use uuid::Uuid;

use crate::models::Client;
use crate::store::{BankStore, StoreResult};

/// Queries and inserts for clients.
pub struct ClientRepository<'a> {
    store: &'a BankStore,
}

impl<'a> ClientRepository<'a> {
    pub fn new(store: &'a BankStore) -> Self {
        Self { store }
    }

    /// Insert a new client.
    pub fn create(&self, client: &Client) -> StoreResult<()> {
        self.store.insert_client(client)
    }

    /// Look up a client by id.
    pub fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Client>> {
        self.store.get_client(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn create_then_find() {
        let dir = tempfile::tempdir().unwrap();
        let store = BankStore::open(&dir.path().join("test.redb")).unwrap();
        let repo = ClientRepository::new(&store);

        let client = Client {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            birth_date: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            gender: "F".into(),
            address: "London".into(),
            phone: "+44000000000".into(),
            email: "ada@example.com".into(),
            nationality: "GB".into(),
        };
        repo.create(&client).unwrap();

        assert_eq!(repo.find_by_id(client.id).unwrap().unwrap(), client);
        assert!(repo.find_by_id(Uuid::new_v4()).unwrap().is_none());
    }
}

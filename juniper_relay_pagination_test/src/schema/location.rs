use juniper::{GraphQLObject, ID};
use juniper_relay_pagination::{CursorValue, OrderField, OrderSpec, Record, RelayConnection};

/// "Database" row for a location.
#[derive(Debug, Clone)]
pub struct LocationRow {
    pub id: String,
    pub name: String,
}

impl Record for LocationRow {
    fn column(&self, name: &str) -> Option<CursorValue> {
        match name {
            "id" => Some(self.id.clone().into()),
            "name" => Some(self.name.clone().into()),
            _ => None,
        }
    }
}

/// GraphQL type for a location.
#[derive(GraphQLObject, RelayConnection, Debug, Eq, PartialEq, Clone)]
pub struct Location {
    pub id: ID,
    pub name: String,
}

/// Implement From to give a cleaner experience;
impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: ID::new(row.id),
            name: row.name,
        }
    }
}

/// Locations are only ever listed by their (string) identifier.
pub fn location_order() -> OrderSpec<LocationRow> {
    OrderSpec::new(OrderField::new("ID", "id", |row: &LocationRow| {
        row.id.clone().into()
    }))
}

// ----------- Test data ------------------

pub fn get_location_test_data() -> Vec<LocationRow> {
    vec![
        LocationRow {
            id: "esquies-nest".to_string(),
            name: "Esquie's Nest".to_string(),
        },
        LocationRow {
            id: "flying-waters".to_string(),
            name: "Flying Waters".to_string(),
        },
        LocationRow {
            id: "lumiere".to_string(),
            name: "Lumière".to_string(),
        },
        LocationRow {
            id: "monocos-station".to_string(),
            name: "Monoco's Station".to_string(),
        },
    ]
}

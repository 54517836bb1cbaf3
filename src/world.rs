//! Host world capabilities
//!
//! The service never walks the host's entity model itself. It asks a
//! [`WorldView`] who is where.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::display::Location;

/// Stable identity of a connected client (the player name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who is in which world, and where
pub trait WorldView: Send + Sync + 'static {
    /// Every client currently in `world`
    fn players_in_world(&self, world: &str) -> Vec<ClientId>;

    /// Clients in the same world within `radius` blocks of `location`
    fn nearby_players(&self, location: &Location, radius: f64) -> Vec<ClientId>;
}

/// [`WorldView`] backed by a position table
///
/// Hosts that already track positions elsewhere implement the trait
/// directly; this one suits tests and simple embeddings.
#[derive(Debug, Default)]
pub struct StaticWorld {
    positions: RwLock<HashMap<ClientId, Location>>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place or move a client
    pub fn place(&self, client: impl Into<ClientId>, location: Location) {
        self.positions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(client.into(), location);
    }

    pub fn remove(&self, client: &ClientId) -> Option<Location> {
        self.positions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(client)
    }

    pub fn location_of(&self, client: &ClientId) -> Option<Location> {
        self.positions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(client)
            .cloned()
    }
}

impl WorldView for StaticWorld {
    fn players_in_world(&self, world: &str) -> Vec<ClientId> {
        let positions = self.positions.read().unwrap_or_else(|e| e.into_inner());
        let mut players: Vec<ClientId> = positions
            .iter()
            .filter(|(_, loc)| loc.world == world)
            .map(|(client, _)| client.clone())
            .collect();
        players.sort();
        players
    }

    fn nearby_players(&self, location: &Location, radius: f64) -> Vec<ClientId> {
        let radius_sq = radius * radius;
        let positions = self.positions.read().unwrap_or_else(|e| e.into_inner());
        let mut players: Vec<ClientId> = positions
            .iter()
            .filter(|(_, loc)| {
                loc.world == location.world && loc.distance_sq(location) <= radius_sq
            })
            .map(|(client, _)| client.clone())
            .collect();
        players.sort();
        players
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_players_in_world() {
        let world = StaticWorld::new();
        world.place("alice", Location::new("world", 0, 64, 0));
        world.place("bob", Location::new("nether", 0, 64, 0));

        assert_eq!(world.players_in_world("world"), vec![ClientId::from("alice")]);
        assert!(world.players_in_world("end").is_empty());
    }

    #[test]
    fn test_nearby_players() {
        let world = StaticWorld::new();
        let origin = Location::new("world", 0, 64, 0);
        world.place("near", Location::new("world", 100, 64, 0));
        world.place("far", Location::new("world", 300, 64, 0));
        world.place("elsewhere", Location::new("nether", 0, 64, 0));

        assert_eq!(
            world.nearby_players(&origin, 256.0),
            vec![ClientId::from("near")]
        );
    }

    #[test]
    fn test_move_and_remove() {
        let world = StaticWorld::new();
        let alice = ClientId::from("alice");
        world.place(alice.clone(), Location::new("world", 0, 0, 0));
        world.place(alice.clone(), Location::new("nether", 0, 0, 0));

        assert_eq!(world.location_of(&alice).unwrap().world, "nether");
        assert!(world.remove(&alice).is_some());
        assert!(world.players_in_world("nether").is_empty());
    }
}

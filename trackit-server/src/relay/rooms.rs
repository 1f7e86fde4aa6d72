//! Room membership table
//!
//! Rooms exist implicitly: a room appears when its first member joins and
//! disappears when its last member leaves. Membership is indexed both ways
//! so a disconnect can drop every room of a connection without scanning.

use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Default)]
pub struct RoomTable {
    /// room name → member connection ids
    rooms: HashMap<String, BTreeSet<String>>,
    /// connection id → rooms it belongs to
    memberships: HashMap<String, HashSet<String>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room; returns `false` if it was already a member
    pub fn join(&mut self, conn_id: &str, room: &str) -> bool {
        let added = self
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn_id.to_string());
        if added {
            self.memberships
                .entry(conn_id.to_string())
                .or_default()
                .insert(room.to_string());
        }
        added
    }

    /// Remove a connection from a room; returns `false` if it was not a member
    pub fn leave(&mut self, conn_id: &str, room: &str) -> bool {
        let removed = match self.rooms.get_mut(room) {
            Some(members) => {
                let removed = members.remove(conn_id);
                if members.is_empty() {
                    self.rooms.remove(room);
                }
                removed
            }
            None => false,
        };

        if removed {
            if let Some(rooms) = self.memberships.get_mut(conn_id) {
                rooms.remove(room);
                if rooms.is_empty() {
                    self.memberships.remove(conn_id);
                }
            }
        }
        removed
    }

    /// Drop every membership of a connection, returning the rooms it left
    pub fn remove_connection(&mut self, conn_id: &str) -> Vec<String> {
        let Some(rooms) = self.memberships.remove(conn_id) else {
            return Vec::new();
        };

        for room in &rooms {
            if let Some(members) = self.rooms.get_mut(room) {
                members.remove(conn_id);
                if members.is_empty() {
                    self.rooms.remove(room);
                }
            }
        }

        let mut left: Vec<String> = rooms.into_iter().collect();
        left.sort();
        left
    }

    /// Members of a room in id order; empty for a room nobody has joined
    pub fn members(&self, room: &str) -> Vec<String> {
        self.rooms
            .get(room)
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Rooms a connection belongs to, sorted
    pub fn rooms_of(&self, conn_id: &str) -> Vec<String> {
        let mut rooms: Vec<String> = self
            .memberships
            .get(conn_id)
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }
}
